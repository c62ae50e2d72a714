use serde_json::{Map, Value};

use crate::spec::{FieldType, FormSpec};
use crate::value::{is_blank, lookup};

/// Payload sent on submit: values of the form's input fields present in
/// `data`. Archived fields are kept only when they already hold data; keys
/// the form does not declare are dropped.
pub fn build_submission(spec: &FormSpec, data: &Value) -> Value {
    let mut payload = Map::new();
    for field in &spec.fields {
        if matches!(field.kind, FieldType::Info) {
            continue;
        }
        let Some(value) = lookup(data, &field.name) else {
            continue;
        };
        if field.archived && is_blank(Some(value)) {
            continue;
        }
        payload.insert(field.name.clone(), value.clone());
    }
    Value::Object(payload)
}
