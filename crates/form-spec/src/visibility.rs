use std::collections::BTreeMap;

use serde_json::Value;

use crate::condition::evaluate_opt;
use crate::spec::{FieldSpec, FormSpec, SectionSpec, WizardPage};

pub type VisibilityMap = BTreeMap<String, bool>;

pub fn section_visible(section: &SectionSpec, data: &Value) -> bool {
    evaluate_opt(section.condition.as_ref(), data, None)
}

pub fn page_visible(page: &WizardPage, data: &Value) -> bool {
    evaluate_opt(page.condition.as_ref(), data, None)
}

/// A field is visible when its own condition holds and its section, if it
/// names a known one, is visible.
pub fn field_visible(spec: &FormSpec, field: &FieldSpec, data: &Value) -> bool {
    if !evaluate_opt(field.condition.as_ref(), data, None) {
        return false;
    }
    field
        .section_id
        .as_deref()
        .and_then(|id| spec.section(id))
        .is_none_or(|section| section_visible(section, data))
}

/// Visibility of every field, keyed by name.
pub fn resolve_visibility(spec: &FormSpec, data: &Value) -> VisibilityMap {
    spec.fields
        .iter()
        .map(|field| (field.name.clone(), field_visible(spec, field, data)))
        .collect()
}
