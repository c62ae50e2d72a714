use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use form_spec::{DependencyGraph, build_dependencies};

use super::{SpecSource, print_json};

#[derive(Args, Debug, Clone)]
pub struct DepsArgs {
    #[command(flatten)]
    pub source: SpecSource,
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn run(args: &DepsArgs) -> Result<ExitCode> {
    let spec = args.source.load()?;
    let graph = build_dependencies(&spec);
    if args.json {
        print_json(&graph)?;
    } else {
        for line in edge_lines(&graph) {
            println!("{}", line);
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// One `referenced -> dependent` line per edge: form edges, then same-row
/// edges as `structure.column`, then `$form.` references into rows.
fn edge_lines(graph: &DependencyGraph) -> Vec<String> {
    let mut lines = Vec::new();
    for (referenced, dependents) in &graph.form {
        for dependent in dependents {
            lines.push(format!("{} -> {}", referenced, dependent));
        }
    }
    for (structure, columns) in graph.tables.iter().chain(&graph.datagrids) {
        for (referenced, dependents) in columns {
            for dependent in dependents {
                lines.push(format!(
                    "{structure}.{referenced} -> {structure}.{dependent}"
                ));
            }
        }
    }
    for (referenced, columns) in &graph.cross {
        for column in columns {
            lines.push(format!(
                "$form.{} -> {}.{}",
                referenced, column.field, column.column
            ));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use form_spec::{ConditionSpec, FieldSpec, FieldType, FormSpec, TableConfig};
    use serde_json::json;

    use super::*;

    #[test]
    fn renders_every_edge_kind() {
        let spec = FormSpec::new(
            "f",
            vec![
                FieldSpec::new("country", FieldType::Select),
                FieldSpec::new("state", FieldType::Text)
                    .with_condition(ConditionSpec::equals("country", json!("us"))),
                FieldSpec {
                    table_config: Some(TableConfig {
                        columns: vec![
                            FieldSpec::new("kind", FieldType::Select),
                            FieldSpec::new("detail", FieldType::Text)
                                .with_condition(ConditionSpec::equals("kind", json!("other"))),
                            FieldSpec::new("tax", FieldType::Text).with_condition(
                                ConditionSpec::equals("$form.country", json!("us")),
                            ),
                        ],
                    }),
                    ..FieldSpec::new("items", FieldType::Table)
                },
            ],
        );
        assert_eq!(
            edge_lines(&build_dependencies(&spec)),
            vec![
                "country -> state",
                "items.kind -> items.detail",
                "$form.country -> items.tax",
            ]
        );
    }
}
