use form_spec::{ConditionOperator, ConditionSpec, evaluate_condition};
use serde_json::json;

fn condition(field: &str, operator: &str, value: Option<serde_json::Value>) -> ConditionSpec {
    ConditionSpec {
        field: field.into(),
        operator: ConditionOperator::from(operator),
        value,
    }
}

#[test]
fn equals_uses_form_data_without_row() {
    let form = json!({ "country": "NL" });
    assert!(evaluate_condition(
        &condition("country", "equals", Some(json!("NL"))),
        &form,
        None
    ));
    assert!(!evaluate_condition(
        &condition("country", "equals", Some(json!("BE"))),
        &form,
        None
    ));
    assert!(evaluate_condition(
        &condition("country", "notEquals", Some(json!("BE"))),
        &form,
        None
    ));
}

#[test]
fn plain_names_resolve_against_the_row_first() {
    let form = json!({ "role": "admin" });
    let row = json!({ "role": "primary" });
    let cond = condition("role", "equals", Some(json!("primary")));
    assert!(evaluate_condition(&cond, &form, Some(&row)));
    assert!(!evaluate_condition(&cond, &form, None));
}

#[test]
fn form_prefix_escapes_the_row() {
    let form = json!({ "region": "eu" });
    let row = json!({ "region": "us" });
    let cond = condition("$form.region", "equals", Some(json!("eu")));
    assert!(evaluate_condition(&cond, &form, Some(&row)));
}

#[test]
fn missing_field_behaves_like_null_for_emptiness() {
    let absent = json!({});
    let null = json!({ "x": null });
    for operator in ["isEmpty", "isNotEmpty"] {
        let cond = condition("x", operator, None);
        assert_eq!(
            evaluate_condition(&cond, &absent, None),
            evaluate_condition(&cond, &null, None),
            "operator {operator}"
        );
    }
    assert!(evaluate_condition(&condition("x", "isEmpty", None), &absent, None));
}

#[test]
fn missing_field_never_equals_a_defined_value() {
    let data = json!({});
    assert!(!evaluate_condition(
        &condition("x", "equals", Some(json!(null))),
        &data,
        None
    ));
    assert!(!evaluate_condition(
        &condition("x", "equals", Some(json!(""))),
        &data,
        None
    ));
    assert!(evaluate_condition(&condition("x", "equals", None), &data, None));
}

#[test]
fn empty_string_is_empty_but_empty_array_is_not() {
    let data = json!({ "text": "", "list": [] });
    assert!(evaluate_condition(&condition("text", "isEmpty", None), &data, None));
    assert!(!evaluate_condition(&condition("list", "isEmpty", None), &data, None));
    assert!(evaluate_condition(&condition("list", "isNotEmpty", None), &data, None));
}

#[test]
fn numeric_equality_ignores_representation() {
    let data = json!({ "units": 1000.0 });
    assert!(evaluate_condition(
        &condition("units", "equals", Some(json!(1000))),
        &data,
        None
    ));
}

#[test]
fn unknown_operator_fails_open() {
    let data = json!({ "x": 1 });
    let cond = condition("x", "greaterThan", Some(json!(5)));
    assert_eq!(cond.operator, ConditionOperator::Other("greaterThan".into()));
    assert!(evaluate_condition(&cond, &data, None));
}

#[test]
fn explicit_null_value_survives_parsing() {
    let parsed: ConditionSpec =
        serde_json::from_value(json!({ "field": "x", "operator": "equals", "value": null }))
            .expect("condition parses");
    assert_eq!(parsed.value, Some(json!(null)));
    assert!(evaluate_condition(&parsed, &json!({ "x": null }), None));

    let absent: ConditionSpec =
        serde_json::from_value(json!({ "field": "x", "operator": "equals" })).expect("parses");
    assert_eq!(absent.value, None);
}
