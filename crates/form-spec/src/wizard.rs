//! Page-level visibility and validity for multi-page forms.

use serde_json::Value;

use crate::registry::ValidationEnv;
use crate::result::ValidationResult;
use crate::spec::{FieldSpec, FormSpec, WizardPage};
use crate::validate::collect_field_errors;
use crate::value::lookup;
use crate::visibility::{field_visible, page_visible};

/// Visible pages in display order. Pages sharing an `order` keep their
/// declaration order.
pub fn visible_pages<'a>(spec: &'a FormSpec, data: &Value) -> Vec<&'a WizardPage> {
    let mut pages = spec
        .wizard
        .iter()
        .flat_map(|wizard| wizard.pages.iter())
        .filter(|page| page_visible(page, data))
        .collect::<Vec<_>>();
    pages.sort_by_key(|page| page.order);
    pages
}

/// Clamps a page index into `[0, visible_count)`; zero when nothing is visible.
pub fn clamp_page_index(index: usize, visible_count: usize) -> usize {
    index.min(visible_count.saturating_sub(1))
}

/// Visible, non-archived fields shown on `page`.
pub fn page_fields<'a>(spec: &'a FormSpec, page: &WizardPage, data: &Value) -> Vec<&'a FieldSpec> {
    spec.fields
        .iter()
        .filter(|field| page.contains(field))
        .filter(|field| !field.archived && field_visible(spec, field, data))
        .collect()
}

pub fn validate_page(
    spec: &FormSpec,
    page: &WizardPage,
    data: &Value,
    env: &ValidationEnv<'_>,
) -> ValidationResult {
    let mut errors = Vec::new();
    for field in page_fields(spec, page, data) {
        collect_field_errors(field, lookup(data, &field.name), data, env, "", &mut errors);
    }
    ValidationResult::from_errors(errors)
}

/// Current position in a wizard. The host owns the cursor; every move is
/// checked against the form and data passed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WizardCursor {
    current: usize,
}

impl WizardCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Re-clamps the index after data changes altered page visibility.
    pub fn sync(&mut self, spec: &FormSpec, data: &Value) {
        self.current = clamp_page_index(self.current, visible_pages(spec, data).len());
    }

    pub fn current_page<'a>(&self, spec: &'a FormSpec, data: &Value) -> Option<&'a WizardPage> {
        let pages = visible_pages(spec, data);
        pages
            .get(clamp_page_index(self.current, pages.len()))
            .copied()
    }

    pub fn validate_current_page(
        &self,
        spec: &FormSpec,
        data: &Value,
        env: &ValidationEnv<'_>,
    ) -> ValidationResult {
        match self.current_page(spec, data) {
            Some(page) => validate_page(spec, page, data, env),
            None => ValidationResult::from_errors(Vec::new()),
        }
    }

    /// Moves to `target`. Forward moves require the current page to be valid
    /// unless the wizard allows free navigation; backward moves never
    /// validate. Returns `false`, leaving the index untouched, on refusal.
    pub fn go_to_page(
        &mut self,
        target: usize,
        spec: &FormSpec,
        data: &Value,
        env: &ValidationEnv<'_>,
    ) -> bool {
        let count = visible_pages(spec, data).len();
        if target >= count {
            return false;
        }
        let current = clamp_page_index(self.current, count);
        let free = spec
            .wizard
            .as_ref()
            .is_some_and(|wizard| wizard.allow_free_navigation);

        if target > current && !free && !self.validate_current_page(spec, data, env).valid {
            tracing::debug!(from = current, to = target, "wizard navigation refused; page invalid");
            return false;
        }
        self.current = target;
        true
    }

    pub fn next(&mut self, spec: &FormSpec, data: &Value, env: &ValidationEnv<'_>) -> bool {
        let count = visible_pages(spec, data).len();
        let target = clamp_page_index(self.current, count) + 1;
        self.go_to_page(target, spec, data, env)
    }

    pub fn previous(&mut self, spec: &FormSpec, data: &Value, env: &ValidationEnv<'_>) -> bool {
        let count = visible_pages(spec, data).len();
        match clamp_page_index(self.current, count).checked_sub(1) {
            Some(target) => self.go_to_page(target, spec, data, env),
            None => false,
        }
    }

    pub fn is_last(&self, spec: &FormSpec, data: &Value) -> bool {
        let count = visible_pages(spec, data).len();
        clamp_page_index(self.current, count) + 1 >= count
    }
}
