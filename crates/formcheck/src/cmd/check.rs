use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use form_spec::validate_config;

use super::{SpecSource, print_json};

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub source: SpecSource,
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn run(args: &CheckArgs) -> Result<ExitCode> {
    let spec = super::read_spec(&args.source.spec)?;
    let report = validate_config(&spec);

    if args.json {
        print_json(&report)?;
    } else if report.valid {
        println!("{}: ok", spec.id);
    } else {
        println!("{}: {} issue(s)", spec.id, report.issues.len());
        for issue in &report.issues {
            println!("  {}", issue);
        }
    }

    Ok(if report.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
