//! Loading and construction-time checks for form configuration.

use std::collections::BTreeSet;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spec::{ConditionSpec, FieldSpec, FieldType, FormSpec, RuleSpec, RuleType};
use crate::value::bound;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse form configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("form configuration has {} issue(s); first: {}", .issues.len(), first_issue(.issues))]
    Invalid { issues: Vec<ConfigIssue> },
}

fn first_issue(issues: &[ConfigIssue]) -> String {
    issues
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// One defect found in a configuration, addressed like `fields[2].validations[0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConfigIssue {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ConfigReport {
    pub valid: bool,
    #[serde(default)]
    pub issues: Vec<ConfigIssue>,
}

pub fn parse_config(raw: &str) -> Result<FormSpec, ConfigError> {
    Ok(serde_json::from_str(raw)?)
}

/// Parses and checks a configuration, rejecting it when any issue is found.
pub fn load_config(raw: &str) -> Result<FormSpec, ConfigError> {
    let spec = parse_config(raw)?;
    let report = validate_config(&spec);
    if report.valid {
        Ok(spec)
    } else {
        Err(ConfigError::Invalid {
            issues: report.issues,
        })
    }
}

/// Construction-time checks. Evaluation tolerates every defect reported here;
/// this is where they surface to the form author.
pub fn validate_config(spec: &FormSpec) -> ConfigReport {
    let mut issues = Vec::new();

    if spec.id.trim().is_empty() {
        push(&mut issues, "id", "form id must not be empty");
    }

    check_fields(&spec.fields, "fields", &mut issues);

    let mut section_ids = BTreeSet::new();
    for (index, section) in spec.sections.iter().enumerate() {
        let path = format!("sections[{}]", index);
        if !section_ids.insert(section.id.as_str()) {
            push(&mut issues, &path, format!("duplicate section id '{}'", section.id));
        }
        if let Some(condition) = &section.condition {
            check_condition(condition, &format!("{}.condition", path), &mut issues);
        }
    }

    for (index, field) in spec.fields.iter().enumerate() {
        if let Some(section) = &field.section_id
            && !section_ids.contains(section.as_str())
        {
            push(
                &mut issues,
                &format!("fields[{}].sectionId", index),
                format!("unknown section '{}'", section),
            );
        }
    }

    if let Some(wizard) = &spec.wizard {
        let mut page_ids = BTreeSet::new();
        for (index, page) in wizard.pages.iter().enumerate() {
            let path = format!("wizard.pages[{}]", index);
            if !page_ids.insert(page.id.as_str()) {
                push(&mut issues, &path, format!("duplicate page id '{}'", page.id));
            }
            if let Some(condition) = &page.condition {
                check_condition(condition, &format!("{}.condition", path), &mut issues);
            }
            for section in &page.sections {
                if !section_ids.contains(section.as_str()) {
                    push(&mut issues, &path, format!("unknown section '{}'", section));
                }
            }
            for name in &page.fields {
                if spec.field(name).is_none() {
                    push(&mut issues, &path, format!("unknown field '{}'", name));
                }
            }
        }
    }

    ConfigReport {
        valid: issues.is_empty(),
        issues,
    }
}

fn check_fields(fields: &[FieldSpec], base: &str, issues: &mut Vec<ConfigIssue>) {
    let mut names = BTreeSet::new();
    for (index, field) in fields.iter().enumerate() {
        let path = format!("{}[{}]", base, index);
        if field.name.trim().is_empty() {
            push(issues, &path, "field name must not be empty");
        } else if !names.insert(field.name.as_str()) {
            push(issues, &path, format!("duplicate field name '{}'", field.name));
        }
        if let Some(condition) = &field.condition {
            check_condition(condition, &format!("{}.condition", path), issues);
        }
        for (rule_index, rule) in field.validations.iter().enumerate() {
            check_rule(rule, &format!("{}.validations[{}]", path, rule_index), issues);
        }
        if let Some(validator) = &field.async_validator
            && validator.name.trim().is_empty()
        {
            push(issues, &format!("{}.asyncValidator", path), "async validator name must not be empty");
        }
        check_structure(field, &path, issues);
    }
}

fn check_structure(field: &FieldSpec, path: &str, issues: &mut Vec<ConfigIssue>) {
    match field.kind {
        FieldType::Table => match &field.table_config {
            Some(config) => {
                check_fields(&config.columns, &format!("{}.tableConfig.columns", path), issues)
            }
            None => push(issues, path, "table field requires tableConfig"),
        },
        FieldType::Datagrid => match &field.datagrid_config {
            Some(config) => {
                check_fields(&config.columns, &format!("{}.datagridConfig.columns", path), issues);
                let mut row_ids = BTreeSet::new();
                for row in &config.rows {
                    if !row_ids.insert(row.id.as_str()) {
                        push(issues, path, format!("duplicate datagrid row '{}'", row.id));
                    }
                }
            }
            None => push(issues, path, "datagrid field requires datagridConfig"),
        },
        FieldType::Formref => {
            if field
                .formref_config
                .as_ref()
                .is_none_or(|config| config.form_id.trim().is_empty())
            {
                push(issues, path, "formref field requires formrefConfig.formId");
            }
        }
        _ => {}
    }
}

fn check_rule(rule: &RuleSpec, path: &str, issues: &mut Vec<ConfigIssue>) {
    match &rule.kind {
        RuleType::MinLength | RuleType::MaxLength | RuleType::Min | RuleType::Max => {
            if bound(rule.value.as_ref()).is_none() {
                push(issues, path, format!("{} rule requires a numeric value", rule.kind));
            }
        }
        RuleType::Pattern => match rule.value.as_ref().and_then(|value| value.as_str()) {
            Some(pattern) => {
                if let Err(err) = Regex::new(pattern) {
                    push(issues, path, format!("malformed pattern: {}", err));
                }
            }
            None => push(issues, path, "pattern rule requires a string value"),
        },
        RuleType::Custom => {
            if rule
                .custom_validator_name
                .as_deref()
                .is_none_or(|name| name.trim().is_empty())
            {
                push(issues, path, "custom rule requires customValidatorName");
            }
        }
        RuleType::Other(kind) => push(issues, path, format!("unknown rule type '{}'", kind)),
        RuleType::Required | RuleType::Email => {}
    }
    if let Some(condition) = &rule.condition {
        check_condition(condition, &format!("{}.condition", path), issues);
    }
}

fn check_condition(condition: &ConditionSpec, path: &str, issues: &mut Vec<ConfigIssue>) {
    if condition.target().trim().is_empty() {
        push(issues, path, "condition field must not be empty");
    }
    if !condition.operator.is_known() {
        push(
            issues,
            path,
            format!("unknown condition operator '{}'", condition.operator),
        );
    }
}

fn push(issues: &mut Vec<ConfigIssue>, path: &str, message: impl Into<String>) {
    issues.push(ConfigIssue {
        path: path.to_string(),
        message: message.into(),
    });
}
