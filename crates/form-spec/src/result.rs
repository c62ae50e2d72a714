use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::RuleType;

/// Error attached to one addressable value: `name`, `table[row].column`,
/// `grid.rowId.column` or `formref.child`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
    /// Absent for external errors, which do not come from a rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<RuleType>,
}

impl FieldValidationError {
    pub fn from_rule(field: impl Into<String>, message: impl Into<String>, rule: RuleType) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule),
        }
    }

    pub fn external(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Top-level field the error belongs to, stripping row and column segments.
    pub fn root_field(&self) -> &str {
        let end = self
            .field
            .find(['[', '.'])
            .unwrap_or(self.field.len());
        &self.field[..end]
    }
}

impl std::fmt::Display for FieldValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.rule {
            Some(rule) => write!(f, "{}: {} ({})", self.field, self.message, rule),
            None => write!(f, "{}: {}", self.field, self.message),
        }
    }
}

/// Verdict of a validation pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<FieldValidationError>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<FieldValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn errors_for<'a>(
        &'a self,
        field: &'a str,
    ) -> impl Iterator<Item = &'a FieldValidationError> + 'a {
        self.errors
            .iter()
            .filter(move |error| error.root_field() == field)
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = FieldValidationError>) {
        self.errors.extend(errors);
        self.valid = self.errors.is_empty();
    }
}
