//! Asynchronous collaborators the host registers by name.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use form_spec::FieldSpec;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RuntimeError;

/// Result of one async validator call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AsyncVerdict {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AsyncVerdict {
    pub fn valid() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }
}

/// Validator needing a round trip, e.g. a uniqueness lookup on a server.
#[async_trait]
pub trait AsyncValidator: Send + Sync {
    async fn validate(
        &self,
        value: &Value,
        params: Option<&Value>,
        field: &FieldSpec,
        form_data: &Value,
    ) -> Result<AsyncVerdict, RuntimeError>;
}

#[derive(Clone, Default)]
pub struct AsyncValidatorRegistry {
    validators: BTreeMap<String, Arc<dyn AsyncValidator>>,
}

impl AsyncValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<V>(&mut self, name: impl Into<String>, validator: V)
    where
        V: AsyncValidator + 'static,
    {
        let name = name.into();
        if self
            .validators
            .insert(name.clone(), Arc::new(validator))
            .is_some()
        {
            tracing::warn!(validator = %name, "async validator re-registered; previous one replaced");
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn AsyncValidator>> {
        self.validators.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }
}

impl fmt::Debug for AsyncValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.validators.keys()).finish()
    }
}

/// One suggestion offered for an autocomplete field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteOption {
    pub value: String,
    pub label: String,
}

impl AutocompleteOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Source of suggestions for `autocomplete` fields.
#[async_trait]
pub trait AutocompleteSource: Send + Sync {
    async fn fetch(
        &self,
        search: &str,
        params: Option<&Value>,
        field: &FieldSpec,
        form_data: &Value,
    ) -> Result<Vec<AutocompleteOption>, RuntimeError>;
}

#[derive(Clone, Default)]
pub struct AutocompleteRegistry {
    sources: BTreeMap<String, Arc<dyn AutocompleteSource>>,
}

impl AutocompleteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<S>(&mut self, name: impl Into<String>, source: S)
    where
        S: AutocompleteSource + 'static,
    {
        let name = name.into();
        if self.sources.insert(name.clone(), Arc::new(source)).is_some() {
            tracing::warn!(source = %name, "autocomplete source re-registered; previous one replaced");
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    /// Options from the named source. A missing, failing or panicking source
    /// yields no options.
    pub async fn search(
        &self,
        name: &str,
        search: &str,
        params: Option<&Value>,
        field: &FieldSpec,
        form_data: &Value,
    ) -> Vec<AutocompleteOption> {
        let Some(source) = self.sources.get(name) else {
            tracing::warn!(source = %name, field = %field.name, "autocomplete source not registered");
            return Vec::new();
        };
        let call = AssertUnwindSafe(source.fetch(search, params, field, form_data)).catch_unwind();
        match call.await {
            Ok(Ok(options)) => options,
            Ok(Err(err)) => {
                tracing::warn!(source = %name, field = %field.name, error = %err, "autocomplete fetch failed");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(source = %name, field = %field.name, "autocomplete source panicked");
                Vec::new()
            }
        }
    }
}

impl fmt::Debug for AutocompleteRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.sources.keys()).finish()
    }
}
