//! Collaborators injected into every validation pass.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::spec::{FieldSpec, FormSpec};

/// Synchronous custom check referenced by `customValidatorName`.
pub trait NamedValidator: Send + Sync {
    fn validate(
        &self,
        value: Option<&Value>,
        params: Option<&Value>,
        field: &FieldSpec,
        form_data: &Value,
    ) -> bool;
}

struct FnValidator<F>(F);

impl<F> NamedValidator for FnValidator<F>
where
    F: Fn(Option<&Value>, Option<&Value>, &FieldSpec, &Value) -> bool + Send + Sync,
{
    fn validate(
        &self,
        value: Option<&Value>,
        params: Option<&Value>,
        field: &FieldSpec,
        form_data: &Value,
    ) -> bool {
        (self.0)(value, params, field, form_data)
    }
}

/// Name -> validator lookup. Registration is last-write-wins.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: BTreeMap<String, Arc<dyn NamedValidator>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<V>(&mut self, name: impl Into<String>, validator: V)
    where
        V: NamedValidator + 'static,
    {
        let name = name.into();
        if self
            .validators
            .insert(name.clone(), Arc::new(validator))
            .is_some()
        {
            tracing::warn!(validator = %name, "custom validator re-registered; previous one replaced");
        }
    }

    pub fn register_fn<F>(&mut self, name: impl Into<String>, check: F)
    where
        F: Fn(Option<&Value>, Option<&Value>, &FieldSpec, &Value) -> bool + Send + Sync + 'static,
    {
        self.register(name, FnValidator(check));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn NamedValidator>> {
        self.validators.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.validators.keys().map(String::as_str)
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.validators.keys()).finish()
    }
}

/// Supplies the form embedded by a `formref` field.
pub trait FormResolver {
    fn resolve(&self, form_id: &str) -> Option<FormSpec>;
}

/// Resolver for hosts without embedded forms.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoForms;

impl FormResolver for NoForms {
    fn resolve(&self, _form_id: &str) -> Option<FormSpec> {
        None
    }
}

impl FormResolver for BTreeMap<String, FormSpec> {
    fn resolve(&self, form_id: &str) -> Option<FormSpec> {
        self.get(form_id).cloned()
    }
}

/// Everything a validation pass needs beyond the form and its data.
#[derive(Clone, Copy)]
pub struct ValidationEnv<'a> {
    pub validators: &'a ValidatorRegistry,
    pub forms: &'a dyn FormResolver,
}

impl<'a> ValidationEnv<'a> {
    pub fn new(validators: &'a ValidatorRegistry) -> Self {
        Self {
            validators,
            forms: &NoForms,
        }
    }

    pub fn with_forms(self, forms: &'a dyn FormResolver) -> Self {
        Self { forms, ..self }
    }
}
