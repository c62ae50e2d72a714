use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use form_spec::{ValidationEnv, ValidatorRegistry, build_submission, validate_form};

use super::{SpecSource, load_forms, print_json, read_json};

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: SpecSource,
    /// Data document to validate (JSON)
    #[arg(long, value_name = "data.json")]
    pub data: PathBuf,
    /// Directory of forms that `formref` fields may embed
    #[arg(long, value_name = "DIR")]
    pub forms: Option<PathBuf>,
    /// Print the submission payload instead of the report when the data is valid
    #[arg(long, default_value_t = false)]
    pub payload: bool,
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn run(args: &ValidateArgs) -> Result<ExitCode> {
    let spec = args.source.load()?;
    let data = read_json(&args.data)?;
    let forms = match &args.forms {
        Some(dir) => load_forms(dir)?,
        None => BTreeMap::new(),
    };
    let validators = ValidatorRegistry::new();
    let env = ValidationEnv::new(&validators).with_forms(&forms);
    let result = validate_form(&spec, &data, &env);

    if args.payload && result.valid {
        print_json(&build_submission(&spec, &data))?;
        return Ok(ExitCode::SUCCESS);
    }

    if args.json {
        print_json(&result)?;
    } else if result.valid {
        println!("{}: valid", spec.id);
    } else {
        println!("{}: {} error(s)", spec.id, result.errors.len());
        for error in &result.errors {
            println!("  {}", error);
        }
    }

    Ok(if result.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
