use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use form_spec::form_spec_schema;

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    /// Write the schema to a file instead of stdout
    #[arg(long, value_name = "schema.json")]
    pub out: Option<PathBuf>,
}

pub fn run(args: &SchemaArgs) -> Result<ExitCode> {
    let text = serde_json::to_string_pretty(&form_spec_schema())?;
    match &args.out {
        Some(path) => fs::write(path, format!("{text}\n"))
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", text),
    }
    Ok(ExitCode::SUCCESS)
}
