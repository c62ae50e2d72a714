use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::condition::evaluate_opt;
use crate::registry::ValidatorRegistry;
use crate::spec::{FieldSpec, RuleSpec, RuleType};
use crate::value::{as_number, as_text, bound, is_blank, length_of};

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Compiled `pattern` rules keyed by source; malformed patterns are not kept.
static PATTERNS: Lazy<Mutex<HashMap<String, Regex>>> = Lazy::new(|| Mutex::new(HashMap::new()));

fn compiled_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    let mut cache = PATTERNS.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(regex) = cache.get(pattern) {
        return Ok(regex.clone());
    }
    let regex = Regex::new(pattern)?;
    cache.insert(pattern.to_string(), regex.clone());
    Ok(regex)
}

/// Data a rule may consult besides the value under test.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub form_data: &'a Value,
    pub row_data: Option<&'a Value>,
    pub validators: &'a ValidatorRegistry,
}

impl<'a> RuleContext<'a> {
    pub fn new(form_data: &'a Value, validators: &'a ValidatorRegistry) -> Self {
        Self {
            form_data,
            row_data: None,
            validators,
        }
    }

    pub fn with_row(self, row_data: &'a Value) -> Self {
        Self {
            row_data: Some(row_data),
            ..self
        }
    }
}

/// Returns `true` when `value` satisfies `rule`, or when the rule does not
/// apply. Never panics; configuration defects are logged and pass.
pub fn evaluate_rule(
    value: Option<&Value>,
    rule: &RuleSpec,
    field: &FieldSpec,
    ctx: &RuleContext<'_>,
) -> bool {
    if !evaluate_opt(rule.condition.as_ref(), ctx.form_data, ctx.row_data) {
        return true;
    }

    // Empty input only ever fails `required`.
    let Some(value) = value.filter(|value| !is_blank(Some(value))) else {
        return !matches!(rule.kind, RuleType::Required);
    };

    match &rule.kind {
        RuleType::Required => true,
        RuleType::Email => as_text(value).is_none_or(|text| EMAIL.is_match(&text)),
        RuleType::MinLength => compare_length(value, rule, field, |len, min| len >= min),
        RuleType::MaxLength => compare_length(value, rule, field, |len, max| len <= max),
        RuleType::Min => compare_number(value, rule, field, |number, min| number >= min),
        RuleType::Max => compare_number(value, rule, field, |number, max| number <= max),
        RuleType::Pattern => matches_pattern(value, rule, field),
        RuleType::Custom => run_custom(value, rule, field, ctx),
        RuleType::Other(kind) => {
            tracing::debug!(field = %field.name, rule = %kind, "unrecognised rule type passes");
            true
        }
    }
}

fn compare_length(
    value: &Value,
    rule: &RuleSpec,
    field: &FieldSpec,
    check: impl Fn(f64, f64) -> bool,
) -> bool {
    let Some(limit) = bound(rule.value.as_ref()) else {
        tracing::warn!(field = %field.name, rule = %rule.kind, "rule has no numeric value; skipped");
        return true;
    };
    length_of(value).is_none_or(|len| check(len as f64, limit))
}

fn compare_number(
    value: &Value,
    rule: &RuleSpec,
    field: &FieldSpec,
    check: impl Fn(f64, f64) -> bool,
) -> bool {
    let Some(limit) = bound(rule.value.as_ref()) else {
        tracing::warn!(field = %field.name, rule = %rule.kind, "rule has no numeric value; skipped");
        return true;
    };
    as_number(value).is_none_or(|number| check(number, limit))
}

fn matches_pattern(value: &Value, rule: &RuleSpec, field: &FieldSpec) -> bool {
    let Some(pattern) = rule.value.as_ref().and_then(Value::as_str) else {
        tracing::warn!(field = %field.name, "pattern rule without a string value; skipped");
        return true;
    };
    let regex = match compiled_pattern(pattern) {
        Ok(regex) => regex,
        Err(err) => {
            tracing::warn!(
                field = %field.name,
                pattern,
                error = %err,
                "malformed pattern; rule skipped"
            );
            return true;
        }
    };
    as_text(value).is_none_or(|text| regex.is_match(&text))
}

fn run_custom(value: &Value, rule: &RuleSpec, field: &FieldSpec, ctx: &RuleContext<'_>) -> bool {
    let Some(name) = rule.custom_validator_name.as_deref() else {
        tracing::warn!(field = %field.name, "custom rule without customValidatorName; skipped");
        return true;
    };
    let Some(validator) = ctx.validators.get(name) else {
        tracing::warn!(field = %field.name, validator = name, "custom validator not registered; skipped");
        return true;
    };
    let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
        validator.validate(
            Some(value),
            rule.custom_validator_params.as_ref(),
            field,
            ctx.form_data,
        )
    }));
    outcome.unwrap_or_else(|_| {
        tracing::warn!(field = %field.name, validator = name, "custom validator panicked; value rejected");
        false
    })
}

/// True when the field carries a `required` rule whose condition currently holds.
pub fn is_required(field: &FieldSpec, form_data: &Value, row_data: Option<&Value>) -> bool {
    field.validations.iter().any(|rule| {
        matches!(rule.kind, RuleType::Required)
            && evaluate_opt(rule.condition.as_ref(), form_data, row_data)
    })
}
