use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::{
    self, check::CheckArgs, deps::DepsArgs, pages::PagesArgs, schema::SchemaArgs,
    validate::ValidateArgs,
};

#[derive(Parser, Debug)]
#[command(
    name = "formcheck",
    about = "Validate form configurations and the data submitted against them",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a data document against a form configuration
    Validate(ValidateArgs),
    /// Report defects in a form configuration
    Check(CheckArgs),
    /// Print which fields are re-checked when another field changes
    Deps(DepsArgs),
    /// List visible wizard pages and whether each one is valid
    Pages(PagesArgs),
    /// Print the JSON Schema of the configuration format
    Schema(SchemaArgs),
}

/// Exit code 1 means the input was read but did not pass.
pub fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Validate(args) => cmd::validate::run(&args),
        Commands::Check(args) => cmd::check::run(&args),
        Commands::Deps(args) => cmd::deps::run(&args),
        Commands::Pages(args) => cmd::pages::run(&args),
        Commands::Schema(args) => cmd::schema::run(&args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_validate_command() {
        let cli = Cli::try_parse_from([
            "formcheck",
            "validate",
            "--spec",
            "form.json",
            "--data",
            "data.json",
            "--forms",
            "forms",
            "--json",
        ])
        .expect("expected CLI to parse");
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.source.spec, std::path::PathBuf::from("form.json"));
                assert_eq!(args.data, std::path::PathBuf::from("data.json"));
                assert_eq!(
                    args.forms.as_deref(),
                    Some(std::path::Path::new("forms"))
                );
                assert!(args.json);
                assert!(!args.payload);
            }
            _ => panic!("expected validate args"),
        }
    }

    #[test]
    fn parses_deps_command() {
        let cli = Cli::try_parse_from(["formcheck", "deps", "--spec", "form.json"])
            .expect("expected CLI to parse");
        match cli.command {
            Commands::Deps(args) => {
                assert_eq!(args.source.spec, std::path::PathBuf::from("form.json"));
                assert!(!args.json);
            }
            _ => panic!("expected deps args"),
        }
    }

    #[test]
    fn validate_requires_data() {
        assert!(Cli::try_parse_from(["formcheck", "validate", "--spec", "form.json"]).is_err());
    }
}
