//! Mutable form state owned by one interactive host.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use form_spec::value::lookup;
use form_spec::{
    DependencyGraph, FieldValidationError, FormSpec, ValidationEnv, ValidationResult,
    ValidatorRegistry, WizardCursor, WizardPage, build_dependencies, build_submission,
    field_visible, load_config, page_fields, validate_field_value, validate_form,
};
use futures::future::join_all;
use serde_json::{Map, Value};

use crate::coordinator::{AsyncCoordinator, CoordinatorConfig, Dispatch};
use crate::error::RuntimeError;
use crate::registry::{AsyncValidatorRegistry, AsyncVerdict, AutocompleteOption, AutocompleteRegistry};

/// Form data plus everything derived from it: the dependency graph, the
/// async coordinator, per-field errors and the wizard position.
///
/// Every mutation takes `&mut self`; hosts sharing a session across threads
/// wrap it in a mutex.
#[derive(Debug)]
pub struct FormSession {
    spec: FormSpec,
    data: Value,
    graph: DependencyGraph,
    validators: ValidatorRegistry,
    async_validators: AsyncValidatorRegistry,
    autocomplete: AutocompleteRegistry,
    forms: BTreeMap<String, FormSpec>,
    config: CoordinatorConfig,
    coordinator: AsyncCoordinator,
    cursor: WizardCursor,
    touched: BTreeSet<String>,
    field_errors: BTreeMap<String, Vec<FieldValidationError>>,
}

impl FormSession {
    pub fn new(spec: FormSpec) -> Self {
        let config = CoordinatorConfig::default();
        Self {
            graph: build_dependencies(&spec),
            coordinator: AsyncCoordinator::new(&spec, config),
            spec,
            data: Value::Object(Map::new()),
            validators: ValidatorRegistry::new(),
            async_validators: AsyncValidatorRegistry::new(),
            autocomplete: AutocompleteRegistry::new(),
            forms: BTreeMap::new(),
            config,
            cursor: WizardCursor::new(),
            touched: BTreeSet::new(),
            field_errors: BTreeMap::new(),
        }
    }

    /// Parses and checks a configuration before opening a session on it.
    pub fn from_json(raw: &str) -> Result<Self, RuntimeError> {
        Ok(Self::new(load_config(raw)?))
    }

    pub fn with_validators(mut self, validators: ValidatorRegistry) -> Self {
        self.validators = validators;
        self
    }

    pub fn with_async_validators(mut self, validators: AsyncValidatorRegistry) -> Self {
        self.async_validators = validators;
        self
    }

    pub fn with_autocomplete(mut self, sources: AutocompleteRegistry) -> Self {
        self.autocomplete = sources;
        self
    }

    /// Forms that `formref` fields may embed, keyed by form id.
    pub fn with_forms(mut self, forms: BTreeMap<String, FormSpec>) -> Self {
        self.forms = forms;
        self
    }

    pub fn with_config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self.coordinator = AsyncCoordinator::new(&self.spec, config);
        self
    }

    /// Replaces the data wholesale; nothing is re-validated or touched.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self.cursor.sync(&self.spec, &self.data);
        self
    }

    pub fn spec(&self) -> &FormSpec {
        &self.spec
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn coordinator(&self) -> &AsyncCoordinator {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut AsyncCoordinator {
        &mut self.coordinator
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    fn env(&self) -> ValidationEnv<'_> {
        ValidationEnv::new(&self.validators).with_forms(&self.forms)
    }

    /// Swaps in a new configuration. The dependency graph and async state
    /// are rebuilt from scratch; touched fields are re-checked.
    pub fn set_spec(&mut self, spec: FormSpec) {
        self.graph = build_dependencies(&spec);
        self.coordinator = AsyncCoordinator::new(&spec, self.config);
        self.spec = spec;
        self.touched.retain(|name| self.spec.field(name).is_some());
        self.field_errors.clear();
        let touched = self.touched.iter().cloned().collect::<Vec<_>>();
        for name in touched {
            self.revalidate(&name);
        }
        self.cursor.sync(&self.spec, &self.data);
    }

    /// Stores `value` under `field` and re-checks the field plus every field
    /// whose rules or visibility read it. Dependents are re-checked without
    /// being marked touched. Returns the names that were re-checked.
    pub fn set_value(
        &mut self,
        field: &str,
        value: Value,
        now: Instant,
    ) -> Result<BTreeSet<String>, RuntimeError> {
        if self.spec.field(field).is_none() {
            return Err(RuntimeError::UnknownField(field.to_string()));
        }
        if !self.data.is_object() {
            self.data = Value::Object(Map::new());
        }
        if let Some(object) = self.data.as_object_mut() {
            object.insert(field.to_string(), value);
        }

        if self.coordinator.tracks(field) {
            self.coordinator
                .on_change(field, lookup(&self.data, field), &self.data, now)?;
        }

        let mut rechecked = self.graph.affected_by(field);
        rechecked.insert(field.to_string());
        for name in &rechecked {
            self.revalidate(name);
        }
        self.cursor.sync(&self.spec, &self.data);
        Ok(rechecked)
    }

    /// Focus left `field`: marks it touched, re-checks it and returns the
    /// async dispatch a blur-triggered validator needs.
    pub fn blur(&mut self, field: &str) -> Result<Option<Dispatch>, RuntimeError> {
        if self.spec.field(field).is_none() {
            return Err(RuntimeError::UnknownField(field.to_string()));
        }
        self.touched.insert(field.to_string());
        self.revalidate(field);
        if self.coordinator.tracks(field) {
            return self.coordinator.on_blur(field, &self.data);
        }
        Ok(None)
    }

    fn revalidate(&mut self, name: &str) {
        let Some(field) = self.spec.field(name) else {
            return;
        };
        let errors = if field_visible(&self.spec, field, &self.data) {
            validate_field_value(field, lookup(&self.data, name), &self.data, &self.env())
        } else {
            Vec::new()
        };
        self.field_errors.insert(name.to_string(), errors);
    }

    /// Errors from the last re-check of `field`, including nested paths.
    pub fn field_errors(&self, field: &str) -> &[FieldValidationError] {
        self.field_errors
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn poll(&mut self, now: Instant) -> Vec<Dispatch> {
        self.coordinator.poll(now)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.coordinator.next_deadline()
    }

    pub async fn run(&self, dispatch: &Dispatch) -> Result<AsyncVerdict, RuntimeError> {
        self.coordinator
            .run(dispatch, &self.async_validators, &self.data)
            .await
    }

    pub fn complete(
        &mut self,
        dispatch: &Dispatch,
        outcome: Result<AsyncVerdict, RuntimeError>,
    ) -> bool {
        self.coordinator.complete(dispatch, outcome)
    }

    /// Runs `dispatches` concurrently and applies their outcomes. Returns how
    /// many outcomes were applied rather than discarded as superseded.
    pub async fn run_dispatches(&mut self, dispatches: Vec<Dispatch>) -> usize {
        let outcomes = join_all(dispatches.iter().map(|dispatch| self.run(dispatch))).await;
        let mut applied = 0;
        for (dispatch, outcome) in dispatches.iter().zip(outcomes) {
            if self.coordinator.complete(dispatch, outcome) {
                applied += 1;
            }
        }
        applied
    }

    /// Synchronous verdict for the whole form merged with the external
    /// errors of visible fields.
    pub fn result(&self) -> ValidationResult {
        let mut result = validate_form(&self.spec, &self.data, &self.env());
        let external = self
            .coordinator
            .external_errors()
            .into_iter()
            .filter(|error| {
                self.spec
                    .field(&error.field)
                    .is_none_or(|field| !field.archived && field_visible(&self.spec, field, &self.data))
            });
        result.extend(external);
        result
    }

    /// Submission is allowed only with no async check pending or running and
    /// no error left.
    pub fn can_submit(&self) -> bool {
        !self.coordinator.is_busy() && self.result().valid
    }

    /// Runs every async validator to completion, then builds the submission
    /// payload. Returns the failing verdict when anything is invalid.
    pub async fn submit(&mut self) -> Result<Value, ValidationResult> {
        let async_valid = self
            .coordinator
            .validate_all_async(&self.spec, &self.async_validators, &self.data)
            .await;
        let result = self.result();
        if !async_valid || !result.valid {
            self.touched
                .extend(result.errors.iter().map(|error| error.root_field().to_string()));
            return Err(result);
        }
        Ok(build_submission(&self.spec, &self.data))
    }

    pub async fn autocomplete(
        &self,
        field: &str,
        source: &str,
        search: &str,
        params: Option<&Value>,
    ) -> Result<Vec<AutocompleteOption>, RuntimeError> {
        let spec = self
            .spec
            .field(field)
            .ok_or_else(|| RuntimeError::UnknownField(field.to_string()))?;
        Ok(self
            .autocomplete
            .search(source, search, params, spec, &self.data)
            .await)
    }

    pub fn current_page_index(&self) -> usize {
        self.cursor.current()
    }

    pub fn current_page(&self) -> Option<&WizardPage> {
        self.cursor.current_page(&self.spec, &self.data)
    }

    /// Moves the wizard. A refused forward move marks the current page's
    /// fields touched so their errors show.
    pub fn go_to_page(&mut self, target: usize) -> bool {
        let env = ValidationEnv::new(&self.validators).with_forms(&self.forms);
        if self.cursor.go_to_page(target, &self.spec, &self.data, &env) {
            return true;
        }
        let names = self
            .cursor
            .current_page(&self.spec, &self.data)
            .map(|page| {
                page_fields(&self.spec, page, &self.data)
                    .into_iter()
                    .map(|field| field.name.clone())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        for name in names {
            self.revalidate(&name);
            self.touched.insert(name);
        }
        false
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.cursor.current() + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        match self.cursor.current().checked_sub(1) {
            Some(target) => self.go_to_page(target),
            None => false,
        }
    }
}
