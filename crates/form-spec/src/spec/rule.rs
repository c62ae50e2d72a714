use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::condition::ConditionSpec;

wire_enum! {
    /// Kind of check a [`RuleSpec`] performs.
    pub enum RuleType {
        Required => "required",
        Email => "email",
        MinLength => "minLength",
        MaxLength => "maxLength",
        Min => "min",
        Max => "max",
        Pattern => "pattern",
        Custom => "custom",
    }
}

/// One validation rule attached to a field or a table/datagrid column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuleSpec {
    #[serde(rename = "type")]
    pub kind: RuleType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_validator_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_validator_params: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionSpec>,
}

impl RuleSpec {
    pub fn new(kind: RuleType, message: impl Into<String>) -> Self {
        Self {
            kind,
            value: None,
            message: message.into(),
            custom_validator_name: None,
            custom_validator_params: None,
            condition: None,
        }
    }

    pub fn required(message: impl Into<String>) -> Self {
        Self::new(RuleType::Required, message)
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_condition(mut self, condition: ConditionSpec) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn custom(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            custom_validator_name: Some(name.into()),
            ..Self::new(RuleType::Custom, message)
        }
    }

    /// Message reported when the rule fails; falls back to a generic text when
    /// the configuration left it blank.
    pub fn failure_message(&self) -> String {
        if !self.message.trim().is_empty() {
            return self.message.clone();
        }
        match self.kind {
            RuleType::Required => "This field is required".into(),
            RuleType::Email => "Please enter a valid email address".into(),
            RuleType::MinLength => format!("Minimum length is {}", bound_text(&self.value)),
            RuleType::MaxLength => format!("Maximum length is {}", bound_text(&self.value)),
            RuleType::Min => format!("Minimum value is {}", bound_text(&self.value)),
            RuleType::Max => format!("Maximum value is {}", bound_text(&self.value)),
            RuleType::Pattern => "Invalid format".into(),
            RuleType::Custom | RuleType::Other(_) => "Invalid value".into(),
        }
    }
}

fn bound_text(value: &Option<Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => "?".into(),
    }
}
