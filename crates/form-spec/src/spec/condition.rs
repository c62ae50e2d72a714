use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Prefix that forces a condition to read form-level data from inside a row.
pub const FORM_SCOPE_PREFIX: &str = "$form.";

wire_enum! {
    /// Comparison applied by a [`ConditionSpec`].
    pub enum ConditionOperator {
        Equals => "equals",
        NotEquals => "notEquals",
        IsEmpty => "isEmpty",
        IsNotEmpty => "isNotEmpty",
    }
}

/// Predicate gating a rule's applicability or a field/section/page's visibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConditionSpec {
    pub field: String,
    pub operator: ConditionOperator,
    /// `Some(Value::Null)` for an explicit `null`, `None` when the key is absent.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<Value>")]
    pub value: Option<Value>,
}

impl ConditionSpec {
    pub fn new(field: impl Into<String>, operator: ConditionOperator) -> Self {
        Self {
            field: field.into(),
            operator,
            value: None,
        }
    }

    pub fn equals(field: impl Into<String>, value: Value) -> Self {
        Self {
            value: Some(value),
            ..Self::new(field, ConditionOperator::Equals)
        }
    }

    /// True when the referenced field is addressed with the `$form.` prefix.
    pub fn is_form_scoped(&self) -> bool {
        self.field.starts_with(FORM_SCOPE_PREFIX)
    }

    /// Field name with any `$form.` prefix removed.
    pub fn target(&self) -> &str {
        self.field
            .strip_prefix(FORM_SCOPE_PREFIX)
            .unwrap_or(&self.field)
    }
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
