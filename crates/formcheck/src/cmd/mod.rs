pub mod check;
pub mod deps;
pub mod pages;
pub mod schema;
pub mod validate;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use form_spec::{FormSpec, parse_config, validate_config};
use serde::Serialize;
use serde_json::Value;

#[derive(Args, Debug, Clone)]
pub struct SpecSource {
    /// Form configuration (JSON)
    #[arg(long, value_name = "form.json")]
    pub spec: PathBuf,
}

impl SpecSource {
    /// Parses the configuration. Defects are logged, not fatal: evaluation
    /// tolerates them and `check` is where they are reported.
    pub fn load(&self) -> Result<FormSpec> {
        let spec = read_spec(&self.spec)?;
        for issue in validate_config(&spec).issues {
            tracing::warn!(path = %issue.path, "{}", issue.message);
        }
        Ok(spec)
    }
}

fn read_spec(path: &Path) -> Result<FormSpec> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_config(&raw).with_context(|| format!("invalid form configuration {}", path.display()))
}

pub fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Every `*.json` form in `dir`, keyed by form id, for `formref` fields.
pub fn load_forms(dir: &Path) -> Result<BTreeMap<String, FormSpec>> {
    let mut forms = BTreeMap::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let spec = read_spec(&path)?;
        if let Some(previous) = forms.insert(spec.id.clone(), spec) {
            tracing::warn!(form_id = %previous.id, file = %path.display(), "form id declared twice; last file wins");
        }
    }
    Ok(forms)
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
