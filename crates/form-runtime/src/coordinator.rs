//! Per-field state machine for validators that need a round trip.
//!
//! The coordinator owns no timer and spawns nothing. The host reports input
//! together with the current [`Instant`], collects due [`Dispatch`]es from
//! [`AsyncCoordinator::poll`], runs them and hands every outcome back to
//! [`AsyncCoordinator::complete`]. Each qualifying input bumps the field's
//! generation; an outcome carrying an older generation is dropped on arrival.

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use form_spec::value::{is_blank, lookup};
use form_spec::{
    AsyncTrigger, DEFAULT_DEBOUNCE_MS, FieldSpec, FieldValidationError, FormSpec, field_visible,
    is_required,
};
use futures::FutureExt;
use futures::future::join_all;
use serde_json::Value;

use crate::error::RuntimeError;
use crate::registry::{AsyncValidatorRegistry, AsyncVerdict};

/// External error recorded when a validator errors, panics or times out.
pub const VALIDATION_FAILED: &str = "Validation failed";
const INVALID_VALUE: &str = "Invalid value";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncValidationState {
    Idle,
    /// Waiting for the debounce window to close.
    Pending { deadline: Instant },
    Validating,
    Resolved { valid: bool },
}

impl AsyncValidationState {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Pending { .. } | Self::Validating)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Used when a field's `asyncValidator` sets no `debounceMs`.
    pub default_debounce: Duration,
    /// Bound on a single validator call; elapsed calls count as faults.
    pub timeout: Option<Duration>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            default_debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            timeout: None,
        }
    }
}

/// A validator call the host should run now.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub field: String,
    pub generation: u64,
    pub value: Value,
}

#[derive(Debug, Clone)]
struct Track {
    field: FieldSpec,
    trigger: AsyncTrigger,
    debounce: Duration,
    state: AsyncValidationState,
    value: Option<Value>,
    generation: u64,
}

impl Track {
    fn dispatch(&self) -> Dispatch {
        Dispatch {
            field: self.field.name.clone(),
            generation: self.generation,
            value: self.value.clone().unwrap_or(Value::Null),
        }
    }

    /// Empty input on a field that is not required never reaches the validator.
    fn skips(&self, form_data: &Value) -> bool {
        is_blank(self.value.as_ref()) && !is_required(&self.field, form_data, None)
    }
}

#[derive(Debug, Default)]
pub struct AsyncCoordinator {
    config: CoordinatorConfig,
    tracks: BTreeMap<String, Track>,
    errors: BTreeMap<String, String>,
}

impl AsyncCoordinator {
    /// Tracks every non-archived top-level field carrying an `asyncValidator`.
    pub fn new(spec: &FormSpec, config: CoordinatorConfig) -> Self {
        let tracks = spec
            .fields
            .iter()
            .filter(|field| !field.archived)
            .filter_map(|field| {
                let validator = field.async_validator.as_ref()?;
                let debounce = validator
                    .debounce_ms
                    .map(Duration::from_millis)
                    .unwrap_or(config.default_debounce);
                Some((
                    field.name.clone(),
                    Track {
                        field: field.clone(),
                        trigger: validator.trigger,
                        debounce,
                        state: AsyncValidationState::Idle,
                        value: None,
                        generation: 0,
                    },
                ))
            })
            .collect();
        Self {
            config,
            tracks,
            errors: BTreeMap::new(),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.tracks.keys().map(String::as_str)
    }

    pub fn tracks(&self, field: &str) -> bool {
        self.tracks.contains_key(field)
    }

    pub fn state(&self, field: &str) -> Option<AsyncValidationState> {
        self.tracks.get(field).map(|track| track.state)
    }

    /// Records a new value. Change-triggered fields restart their debounce
    /// window. Blur-triggered fields wait for the next blur, but an edit still
    /// supersedes their in-flight call.
    pub fn on_change(
        &mut self,
        field: &str,
        value: Option<&Value>,
        form_data: &Value,
        now: Instant,
    ) -> Result<(), RuntimeError> {
        let track = self
            .tracks
            .get_mut(field)
            .ok_or_else(|| RuntimeError::NotAsync(field.to_string()))?;
        let changed = track.value.as_ref() != value;
        track.value = value.cloned();
        if track.trigger != AsyncTrigger::Change {
            if changed {
                track.generation += 1;
                if track.state == AsyncValidationState::Validating {
                    track.state = AsyncValidationState::Idle;
                }
                if track.skips(form_data) {
                    track.state = AsyncValidationState::Idle;
                    self.errors.remove(field);
                }
            }
            return Ok(());
        }

        track.generation += 1;
        if track.skips(form_data) {
            track.state = AsyncValidationState::Idle;
            self.errors.remove(field);
        } else {
            track.state = AsyncValidationState::Pending {
                deadline: now + track.debounce,
            };
        }
        Ok(())
    }

    /// Focus left `field`. Blur-triggered fields dispatch right away with the
    /// value currently in `form_data`; change-triggered fields ignore blur.
    pub fn on_blur(&mut self, field: &str, form_data: &Value) -> Result<Option<Dispatch>, RuntimeError> {
        let track = self
            .tracks
            .get_mut(field)
            .ok_or_else(|| RuntimeError::NotAsync(field.to_string()))?;
        if track.trigger != AsyncTrigger::Blur {
            return Ok(None);
        }

        track.generation += 1;
        track.value = lookup(form_data, field).cloned();
        if track.skips(form_data) {
            track.state = AsyncValidationState::Idle;
            self.errors.remove(field);
            return Ok(None);
        }
        track.state = AsyncValidationState::Validating;
        Ok(Some(track.dispatch()))
    }

    /// Dispatches every field whose debounce window closed at or before `now`.
    pub fn poll(&mut self, now: Instant) -> Vec<Dispatch> {
        let mut due = Vec::new();
        for track in self.tracks.values_mut() {
            if let AsyncValidationState::Pending { deadline } = track.state
                && deadline <= now
            {
                track.state = AsyncValidationState::Validating;
                due.push(track.dispatch());
            }
        }
        due
    }

    /// Earliest debounce deadline still open.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tracks
            .values()
            .filter_map(|track| match track.state {
                AsyncValidationState::Pending { deadline } => Some(deadline),
                _ => None,
            })
            .min()
    }

    /// Applies the outcome of `dispatch`. Returns `false` when the dispatch was
    /// superseded and its outcome discarded.
    pub fn complete(
        &mut self,
        dispatch: &Dispatch,
        outcome: Result<AsyncVerdict, RuntimeError>,
    ) -> bool {
        let Some(track) = self.tracks.get_mut(&dispatch.field) else {
            tracing::debug!(field = %dispatch.field, "async result for an untracked field dropped");
            return false;
        };
        if track.generation != dispatch.generation {
            tracing::debug!(
                field = %dispatch.field,
                dispatched = dispatch.generation,
                current = track.generation,
                "superseded async result discarded"
            );
            return false;
        }

        let valid = match outcome {
            Ok(verdict) if verdict.valid => {
                self.errors.remove(&dispatch.field);
                true
            }
            Ok(verdict) => {
                let message = verdict
                    .message
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| INVALID_VALUE.to_string());
                self.errors.insert(dispatch.field.clone(), message);
                false
            }
            Err(err) => {
                tracing::warn!(field = %dispatch.field, error = %err, "async validation failed");
                self.errors
                    .insert(dispatch.field.clone(), VALIDATION_FAILED.to_string());
                false
            }
        };
        track.state = AsyncValidationState::Resolved { valid };
        true
    }

    /// True while any field is pending or validating; submission waits.
    pub fn is_busy(&self) -> bool {
        self.tracks.values().any(|track| track.state.is_busy())
    }

    pub fn external_error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// External errors keyed by field name, without a rule tag.
    pub fn external_errors(&self) -> Vec<FieldValidationError> {
        self.errors
            .iter()
            .map(|(field, message)| FieldValidationError::external(field, message))
            .collect()
    }

    /// Records an error produced outside the rule set, e.g. by a server round trip.
    pub fn set_external_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(field.into(), message.into());
    }

    pub fn clear_external_error(&mut self, field: &str) {
        self.errors.remove(field);
    }

    /// Runs the validator named by the dispatched field. An unregistered
    /// validator passes with a warning.
    pub async fn run(
        &self,
        dispatch: &Dispatch,
        validators: &AsyncValidatorRegistry,
        form_data: &Value,
    ) -> Result<AsyncVerdict, RuntimeError> {
        let track = self
            .tracks
            .get(&dispatch.field)
            .ok_or_else(|| RuntimeError::NotAsync(dispatch.field.clone()))?;
        invoke(&track.field, &dispatch.value, validators, form_data, self.config.timeout).await
    }

    /// Runs every visible async field to completion, concurrently, and
    /// returns whether all of them passed. Earlier in-flight dispatches are
    /// superseded.
    pub async fn validate_all_async(
        &mut self,
        spec: &FormSpec,
        validators: &AsyncValidatorRegistry,
        form_data: &Value,
    ) -> bool {
        let mut dispatches = Vec::new();
        for field in spec.fields.iter().filter(|field| !field.archived) {
            let Some(track) = self.tracks.get_mut(&field.name) else {
                continue;
            };
            track.generation += 1;
            track.value = lookup(form_data, &field.name).cloned();
            if !field_visible(spec, field, form_data) || track.skips(form_data) {
                track.state = AsyncValidationState::Idle;
                self.errors.remove(&field.name);
                continue;
            }
            track.state = AsyncValidationState::Validating;
            dispatches.push(track.dispatch());
        }

        let outcomes = join_all(
            dispatches
                .iter()
                .map(|dispatch| self.run(dispatch, validators, form_data)),
        )
        .await;

        let mut all_valid = true;
        for (dispatch, outcome) in dispatches.iter().zip(outcomes) {
            let valid = matches!(&outcome, Ok(verdict) if verdict.valid);
            self.complete(dispatch, outcome);
            all_valid &= valid;
        }
        all_valid
    }
}

async fn invoke(
    field: &FieldSpec,
    value: &Value,
    validators: &AsyncValidatorRegistry,
    form_data: &Value,
    timeout: Option<Duration>,
) -> Result<AsyncVerdict, RuntimeError> {
    let spec = field
        .async_validator
        .as_ref()
        .ok_or_else(|| RuntimeError::NotAsync(field.name.clone()))?;
    let Some(validator) = validators.get(&spec.name) else {
        tracing::warn!(field = %field.name, validator = %spec.name, "async validator not registered; value accepted");
        return Ok(AsyncVerdict::valid());
    };

    let call = AssertUnwindSafe(validator.validate(value, spec.params.as_ref(), field, form_data))
        .catch_unwind();
    let caught = match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| RuntimeError::Timeout {
                name: spec.name.clone(),
                limit,
            })?,
        None => call.await,
    };
    caught.map_err(|_| RuntimeError::Panicked(spec.name.clone()))?
}
