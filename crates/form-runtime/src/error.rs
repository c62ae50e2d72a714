use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("field '{0}' has no async validator")]
    NotAsync(String),
    #[error("async validator '{name}' failed: {reason}")]
    Fault { name: String, reason: String },
    #[error("async validator '{0}' panicked")]
    Panicked(String),
    #[error("async validator '{name}' timed out after {limit:?}")]
    Timeout { name: String, limit: Duration },
    #[error("form configuration error: {0}")]
    Config(#[from] form_spec::ConfigError),
}

impl RuntimeError {
    /// Error an [`AsyncValidator`](crate::AsyncValidator) returns when its
    /// backing call could not produce a verdict.
    pub fn fault(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fault {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Faults surface as a generic external error; misuse errors do not.
    pub fn is_validator_fault(&self) -> bool {
        matches!(
            self,
            Self::Fault { .. } | Self::Panicked(_) | Self::Timeout { .. }
        )
    }
}
