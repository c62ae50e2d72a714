use crate::registry::FormResolver;
use crate::spec::{FieldSpec, FormSpec};

/// Resolves the form embedded by a `formref` field.
///
/// Nested `info` and `formref` fields are dropped so embedding stays one level
/// deep and reference cycles cannot recurse. A missing target is logged and
/// yields `None`; the embedded fields are then simply not validated.
pub fn embedded_form(field: &FieldSpec, forms: &dyn FormResolver) -> Option<FormSpec> {
    let Some(config) = &field.formref_config else {
        tracing::warn!(field = %field.name, "formref field without formrefConfig; skipped");
        return None;
    };
    let Some(mut form) = forms.resolve(&config.form_id) else {
        tracing::warn!(
            field = %field.name,
            form_id = %config.form_id,
            "referenced form not found; embedded fields omitted"
        );
        return None;
    };
    form.fields.retain(|child| child.kind.is_input());
    Some(form)
}

