use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use form_spec::{ValidationEnv, ValidatorRegistry, resolve_visibility, validate_page, visible_pages};
use serde::Serialize;

use super::{SpecSource, print_json, read_json};

#[derive(Args, Debug, Clone)]
pub struct PagesArgs {
    #[command(flatten)]
    pub source: SpecSource,
    #[arg(long, value_name = "data.json")]
    pub data: PathBuf,
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageSummary {
    id: String,
    title: Option<String>,
    valid: bool,
    error_count: usize,
    /// Fields listed on the page whose conditions currently hide them.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    hidden: Vec<String>,
}

pub fn run(args: &PagesArgs) -> Result<ExitCode> {
    let spec = args.source.load()?;
    let data = read_json(&args.data)?;
    let validators = ValidatorRegistry::new();
    let env = ValidationEnv::new(&validators);
    let visibility = resolve_visibility(&spec, &data);

    let summaries = visible_pages(&spec, &data)
        .into_iter()
        .map(|page| {
            let result = validate_page(&spec, page, &data, &env);
            let hidden = spec
                .fields
                .iter()
                .filter(|field| !field.archived && page.contains(field))
                .filter(|field| visibility.get(&field.name) == Some(&false))
                .map(|field| field.name.clone())
                .collect();
            PageSummary {
                id: page.id.clone(),
                title: page.title.clone(),
                valid: result.valid,
                error_count: result.errors.len(),
                hidden,
            }
        })
        .collect::<Vec<_>>();

    if args.json {
        print_json(&summaries)?;
    } else {
        for (index, page) in summaries.iter().enumerate() {
            let status = if page.valid {
                "valid".to_string()
            } else {
                format!("{} error(s)", page.error_count)
            };
            if page.hidden.is_empty() {
                println!("{}. {} ({})", index + 1, page.id, status);
            } else {
                println!(
                    "{}. {} ({}; hidden: {})",
                    index + 1,
                    page.id,
                    status,
                    page.hidden.join(", ")
                );
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
