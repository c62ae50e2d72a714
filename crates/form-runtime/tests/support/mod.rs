#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use form_runtime::{AsyncValidator, AsyncValidatorRegistry, AsyncVerdict, RuntimeError};
use form_spec::{FieldSpec, FormSpec, parse_config};
use serde_json::Value;

pub fn signup() -> FormSpec {
    parse_config(include_str!("../fixtures/signup.json")).expect("fixture parses")
}

/// Rejects the value "taken" and records every value it was asked about.
#[derive(Clone, Default)]
pub struct Directory {
    pub seen: Arc<Mutex<Vec<Value>>>,
}

impl Directory {
    pub fn seen(&self) -> Vec<Value> {
        self.seen.lock().expect("lock").clone()
    }
}

#[async_trait]
impl AsyncValidator for Directory {
    async fn validate(
        &self,
        value: &Value,
        _params: Option<&Value>,
        _field: &FieldSpec,
        _form_data: &Value,
    ) -> Result<AsyncVerdict, RuntimeError> {
        self.seen.lock().expect("lock").push(value.clone());
        if value == "taken" {
            Ok(AsyncVerdict::invalid("Username is taken"))
        } else {
            Ok(AsyncVerdict::valid())
        }
    }
}

pub struct Unreachable;

#[async_trait]
impl AsyncValidator for Unreachable {
    async fn validate(
        &self,
        _value: &Value,
        _params: Option<&Value>,
        _field: &FieldSpec,
        _form_data: &Value,
    ) -> Result<AsyncVerdict, RuntimeError> {
        Err(RuntimeError::fault("emailDomain", "connection refused"))
    }
}

pub struct Exploding;

#[async_trait]
impl AsyncValidator for Exploding {
    async fn validate(
        &self,
        _value: &Value,
        _params: Option<&Value>,
        _field: &FieldSpec,
        _form_data: &Value,
    ) -> Result<AsyncVerdict, RuntimeError> {
        panic!("validator bug");
    }
}

pub struct Sluggish;

#[async_trait]
impl AsyncValidator for Sluggish {
    async fn validate(
        &self,
        _value: &Value,
        _params: Option<&Value>,
        _field: &FieldSpec,
        _form_data: &Value,
    ) -> Result<AsyncVerdict, RuntimeError> {
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok(AsyncVerdict::valid())
    }
}

pub fn registry(directory: &Directory) -> AsyncValidatorRegistry {
    let mut validators = AsyncValidatorRegistry::new();
    validators.register("usernameFree", directory.clone());
    validators.register("emailDomain", directory.clone());
    validators.register("companyKnown", directory.clone());
    validators
}
