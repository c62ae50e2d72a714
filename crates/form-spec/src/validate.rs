use serde_json::{Map, Value};

use crate::compose::embedded_form;
use crate::condition::evaluate_opt;
use crate::registry::ValidationEnv;
use crate::result::{FieldValidationError, ValidationResult};
use crate::rules::{RuleContext, evaluate_rule};
use crate::spec::{FieldSpec, FieldType, FormSpec, RuleSpec, RuleType};
use crate::value::{is_blank, lookup};
use crate::visibility::field_visible;

/// Validates every visible, non-archived field of `spec` against `data`.
///
/// Never fails: configuration defects are logged and treated as passing, so
/// the verdict only reflects the data.
pub fn validate_form(spec: &FormSpec, data: &Value, env: &ValidationEnv<'_>) -> ValidationResult {
    let mut errors = Vec::new();
    for field in &spec.fields {
        if field.archived || !field_visible(spec, field, data) {
            continue;
        }
        collect_field_errors(field, lookup(data, &field.name), data, env, "", &mut errors);
    }
    ValidationResult::from_errors(errors)
}

/// Validates a single field value in isolation (no visibility gating).
pub fn validate_field_value(
    field: &FieldSpec,
    value: Option<&Value>,
    form_data: &Value,
    env: &ValidationEnv<'_>,
) -> Vec<FieldValidationError> {
    let mut errors = Vec::new();
    if !field.archived {
        collect_field_errors(field, value, form_data, env, "", &mut errors);
    }
    errors
}

pub(crate) fn collect_field_errors(
    field: &FieldSpec,
    value: Option<&Value>,
    form_data: &Value,
    env: &ValidationEnv<'_>,
    prefix: &str,
    errors: &mut Vec<FieldValidationError>,
) {
    let path = format!("{}{}", prefix, field.name);
    let ctx = RuleContext::new(form_data, env.validators);
    match field.kind {
        FieldType::Info => {}
        FieldType::Formref => validate_embedded(field, value, env, &path, errors),
        FieldType::Table => validate_table(field, value, &ctx, &path, errors),
        FieldType::Datagrid => validate_datagrid(field, value, &ctx, &path, errors),
        FieldType::Phone => validate_phone(field, value, &ctx, &path, errors),
        FieldType::Daterange => validate_daterange(field, value, &ctx, &path, errors),
        _ => run_rules(field, value, &ctx, &path, errors),
    }
}

fn run_rules(
    field: &FieldSpec,
    value: Option<&Value>,
    ctx: &RuleContext<'_>,
    path: &str,
    errors: &mut Vec<FieldValidationError>,
) {
    for rule in &field.validations {
        if !evaluate_rule(value, rule, field, ctx) {
            errors.push(rule_error(path, rule));
        }
    }
}

fn rule_error(path: &str, rule: &RuleSpec) -> FieldValidationError {
    FieldValidationError::from_rule(path, rule.failure_message(), rule.kind.clone())
}

fn validate_table(
    field: &FieldSpec,
    value: Option<&Value>,
    ctx: &RuleContext<'_>,
    path: &str,
    errors: &mut Vec<FieldValidationError>,
) {
    let Some(config) = &field.table_config else {
        tracing::warn!(field = %field.name, "table field without tableConfig; skipped");
        return;
    };
    let Some(rows) = value.and_then(Value::as_array) else {
        return;
    };

    for (index, row) in rows.iter().enumerate() {
        if !row.is_object() {
            continue;
        }
        // An all-empty row is not a partial submission.
        if config
            .columns
            .iter()
            .all(|column| is_blank(lookup(row, &column.name)))
        {
            continue;
        }
        let row_ctx = ctx.with_row(row);
        for column in &config.columns {
            if !evaluate_opt(column.condition.as_ref(), ctx.form_data, Some(row)) {
                continue;
            }
            let cell_path = format!("{}[{}].{}", path, index, column.name);
            run_rules(column, lookup(row, &column.name), &row_ctx, &cell_path, errors);
        }
    }
}

fn validate_datagrid(
    field: &FieldSpec,
    value: Option<&Value>,
    ctx: &RuleContext<'_>,
    path: &str,
    errors: &mut Vec<FieldValidationError>,
) {
    let Some(config) = &field.datagrid_config else {
        tracing::warn!(field = %field.name, "datagrid field without datagridConfig; skipped");
        return;
    };
    let empty_row = Value::Object(Map::new());

    for row_label in &config.rows {
        let row = value
            .and_then(|grid| lookup(grid, &row_label.id))
            .filter(|row| row.is_object())
            .unwrap_or(&empty_row);
        let row_ctx = ctx.with_row(row);
        for column in config.columns.iter().filter(|column| !column.computed) {
            if !evaluate_opt(column.condition.as_ref(), ctx.form_data, Some(row)) {
                continue;
            }
            let cell_path = format!("{}.{}.{}", path, row_label.id, column.name);
            run_rules(column, lookup(row, &column.name), &row_ctx, &cell_path, errors);
        }
    }
}

fn validate_phone(
    field: &FieldSpec,
    value: Option<&Value>,
    ctx: &RuleContext<'_>,
    path: &str,
    errors: &mut Vec<FieldValidationError>,
) {
    // A bare string is accepted as the number part.
    let number = match value {
        Some(Value::Object(_)) => value.and_then(|phone| lookup(phone, "number")),
        other => other,
    };
    run_rules(field, number, ctx, path, errors);
}

fn validate_daterange(
    field: &FieldSpec,
    value: Option<&Value>,
    ctx: &RuleContext<'_>,
    path: &str,
    errors: &mut Vec<FieldValidationError>,
) {
    let from = value.and_then(|range| lookup(range, "fromDate"));
    let to = value.and_then(|range| lookup(range, "toDate"));
    let to_optional = field
        .daterange_config
        .as_ref()
        .is_some_and(|config| config.to_date_optional);

    for rule in &field.validations {
        if !evaluate_opt(rule.condition.as_ref(), ctx.form_data, ctx.row_data) {
            continue;
        }
        let passed = match rule.kind {
            RuleType::Required => !is_blank(from) && (to_optional || !is_blank(to)),
            RuleType::Custom => evaluate_rule(value, rule, field, ctx),
            _ => evaluate_rule(from, rule, field, ctx) && evaluate_rule(to, rule, field, ctx),
        };
        if !passed {
            errors.push(rule_error(path, rule));
        }
    }
}

fn validate_embedded(
    field: &FieldSpec,
    value: Option<&Value>,
    env: &ValidationEnv<'_>,
    path: &str,
    errors: &mut Vec<FieldValidationError>,
) {
    let Some(embedded) = embedded_form(field, env.forms) else {
        return;
    };
    let empty = Value::Object(Map::new());
    let sub_data = value.filter(|value| value.is_object()).unwrap_or(&empty);
    let prefix = format!("{}.", path);

    for child in &embedded.fields {
        if child.archived || !field_visible(&embedded, child, sub_data) {
            continue;
        }
        collect_field_errors(child, lookup(sub_data, &child.name), sub_data, env, &prefix, errors);
    }
}
