use serde_json::Value;

use crate::spec::{ConditionOperator, ConditionSpec};
use crate::value::{is_condition_empty, lookup, strict_equals};

/// Evaluates a condition against form data, or against a row when one is
/// supplied. `$form.`-prefixed fields always read form data.
pub fn evaluate(condition: &ConditionSpec, form_data: &Value, row_data: Option<&Value>) -> bool {
    let scope = match row_data {
        Some(row) if !condition.is_form_scoped() => row,
        _ => form_data,
    };
    let actual = lookup(scope, condition.target());

    match &condition.operator {
        ConditionOperator::Equals => strict_equals(actual, condition.value.as_ref()),
        ConditionOperator::NotEquals => !strict_equals(actual, condition.value.as_ref()),
        ConditionOperator::IsEmpty => is_condition_empty(actual),
        ConditionOperator::IsNotEmpty => !is_condition_empty(actual),
        ConditionOperator::Other(operator) => {
            tracing::warn!(
                field = %condition.field,
                operator = %operator,
                "unknown condition operator; treating condition as met"
            );
            true
        }
    }
}

/// A missing condition is always met.
pub fn evaluate_opt(
    condition: Option<&ConditionSpec>,
    form_data: &Value,
    row_data: Option<&Value>,
) -> bool {
    condition.is_none_or(|condition| evaluate(condition, form_data, row_data))
}
