use std::collections::BTreeMap;

use form_spec::{
    FieldSpec, FieldType, FormRefConfig, FormSpec, RuleSpec, RuleType, TableConfig,
    ValidationEnv, ValidatorRegistry, parse_config, validate_field_value, validate_form,
};
use serde_json::{Value, json};

fn onboarding() -> FormSpec {
    parse_config(include_str!("fixtures/vendor_onboarding.json")).expect("fixture parses")
}

fn valid_data() -> Value {
    json!({
        "companyName": "Acme",
        "contactEmail": "ops@acme.test",
        "paymentMethod": "card",
        "region": "us",
        "phone": { "countryCode": "+1", "number": "5550100" },
        "contractPeriod": { "fromDate": "2026-01-01" },
        "contacts": [],
        "capacity": { "q1": { "units": 10 }, "q2": { "units": 0 } }
    })
}

fn fields_of(result: &form_spec::ValidationResult) -> Vec<&str> {
    result
        .errors
        .iter()
        .map(|error| error.field.as_str())
        .collect()
}

#[test]
fn email_example_reports_only_required() {
    let spec = FormSpec::new(
        "signup",
        vec![
            FieldSpec::new("email", FieldType::Email)
                .with_rule(RuleSpec::required("Email is required"))
                .with_rule(RuleSpec::new(RuleType::Email, "Email is invalid")),
        ],
    );
    let validators = ValidatorRegistry::new();
    let result = validate_form(&spec, &json!({}), &ValidationEnv::new(&validators));

    assert!(!result.valid);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].field, "email");
    assert_eq!(result.errors[0].message, "Email is required");
    assert_eq!(result.errors[0].rule, Some(RuleType::Required));
}

#[test]
fn fixture_accepts_complete_data() {
    let validators = ValidatorRegistry::new();
    let result = validate_form(&onboarding(), &valid_data(), &ValidationEnv::new(&validators));
    assert!(result.valid, "unexpected errors: {:?}", result.errors);
}

#[test]
fn archived_and_info_fields_never_error() {
    let validators = ValidatorRegistry::new();
    let result = validate_form(&onboarding(), &json!({}), &ValidationEnv::new(&validators));
    let fields = fields_of(&result);
    assert!(!fields.contains(&"legacyCode"));
    assert!(!fields.contains(&"notice"));
}

#[test]
fn hidden_section_fields_are_skipped() {
    let validators = ValidatorRegistry::new();
    let env = ValidationEnv::new(&validators);
    let spec = onboarding();

    let result = validate_form(&spec, &valid_data(), &env);
    assert!(!fields_of(&result).contains(&"iban"));

    let mut data = valid_data();
    data["paymentMethod"] = json!("wire");
    let result = validate_form(&spec, &data, &env);
    assert_eq!(fields_of(&result), vec!["iban"]);
}

#[test]
fn conditional_required_follows_other_field() {
    let validators = ValidatorRegistry::new();
    let env = ValidationEnv::new(&validators);
    let mut data = valid_data();
    data["region"] = json!("eu");
    let result = validate_form(&onboarding(), &data, &env);
    assert_eq!(fields_of(&result), vec!["vatNumber"]);
}

#[test]
fn all_empty_table_rows_are_skipped() {
    let validators = ValidatorRegistry::new();
    let mut data = valid_data();
    data["contacts"] = json!([
        { "name": "", "email": null },
        {},
    ]);
    let result = validate_form(&onboarding(), &data, &ValidationEnv::new(&validators));
    assert!(result.valid, "unexpected errors: {:?}", result.errors);
}

#[test]
fn partial_table_row_reports_cell_path() {
    let validators = ValidatorRegistry::new();
    let mut data = valid_data();
    data["contacts"] = json!([
        { "name": "Ann", "email": "ann@acme.test" },
        { "email": "bob@acme.test" },
    ]);
    let result = validate_form(&onboarding(), &data, &ValidationEnv::new(&validators));
    assert_eq!(fields_of(&result), vec!["contacts[1].name"]);
    assert_eq!(result.errors[0].message, "Contact name is required");
}

#[test]
fn table_conditions_read_the_row_and_form_prefix() {
    let validators = ValidatorRegistry::new();
    let mut data = valid_data();
    data["region"] = json!("eu");
    data["vatNumber"] = json!("NL001");
    data["contacts"] = json!([
        { "name": "Ann", "role": "primary", "vatId": "X1" },
        { "name": "Bob", "role": "backup", "email": "not-an-email" },
    ]);
    let result = validate_form(&onboarding(), &data, &ValidationEnv::new(&validators));
    assert_eq!(
        fields_of(&result),
        vec![
            "contacts[0].email",
            "contacts[1].email",
            "contacts[1].vatId"
        ]
    );
}

#[test]
fn datagrid_skips_computed_columns_and_paths_by_row_id() {
    let validators = ValidatorRegistry::new();
    let mut data = valid_data();
    data["capacity"] = json!({
        "q1": { "units": -1 },
        "q2": { "units": 1000 }
    });
    let result = validate_form(&onboarding(), &data, &ValidationEnv::new(&validators));
    assert_eq!(
        fields_of(&result),
        vec!["capacity.q1.units", "capacity.q2.notes"]
    );
}

#[test]
fn phone_rules_apply_to_number_only() {
    let validators = ValidatorRegistry::new();
    let env = ValidationEnv::new(&validators);
    let spec = onboarding();
    let phone = spec.field("phone").expect("phone field");

    let errors = validate_field_value(phone, Some(&json!({ "countryCode": "+31" })), &json!({}), &env);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].rule, Some(RuleType::Required));

    let errors = validate_field_value(
        phone,
        Some(&json!({ "countryCode": "+31", "number": "123" })),
        &json!({}),
        &env,
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].rule, Some(RuleType::MinLength));
}

#[test]
fn daterange_required_honours_optional_end() {
    let validators = ValidatorRegistry::new();
    let env = ValidationEnv::new(&validators);
    let spec = onboarding();
    let mut range = spec.field("contractPeriod").expect("daterange").clone();

    let open_ended = json!({ "fromDate": "2026-01-01", "toDate": "" });
    assert!(validate_field_value(&range, Some(&open_ended), &json!({}), &env).is_empty());
    let no_start = json!({ "toDate": "2026-12-31" });
    assert_eq!(validate_field_value(&range, Some(&no_start), &json!({}), &env).len(), 1);

    range.daterange_config = None;
    assert_eq!(validate_field_value(&range, Some(&open_ended), &json!({}), &env).len(), 1);
}

#[test]
fn table_without_config_degrades_to_no_errors() {
    let validators = ValidatorRegistry::new();
    let table = FieldSpec::new("rows", FieldType::Table).with_rule(RuleSpec::required("x"));
    let errors = validate_field_value(
        &table,
        Some(&json!([{ "a": 1 }])),
        &json!({}),
        &ValidationEnv::new(&validators),
    );
    assert!(errors.is_empty());
}

#[test]
fn non_object_data_is_treated_as_empty() {
    let validators = ValidatorRegistry::new();
    let spec = FormSpec::new(
        "odd",
        vec![FieldSpec::new("a", FieldType::Text).with_rule(RuleSpec::required("a"))],
    );
    let result = validate_form(&spec, &json!("not an object"), &ValidationEnv::new(&validators));
    assert_eq!(fields_of(&result), vec!["a"]);
}

fn address_form() -> FormSpec {
    let mut nested = FieldSpec::new("loop", FieldType::Formref);
    nested.formref_config = Some(FormRefConfig {
        form_id: "address".into(),
    });
    FormSpec::new(
        "address",
        vec![
            FieldSpec::new("street", FieldType::Text).with_rule(RuleSpec::required("Street")),
            FieldSpec::new("note", FieldType::Info),
            nested,
        ],
    )
}

#[test]
fn formref_walks_embedded_fields_with_prefix() {
    let forms = BTreeMap::from([("address".to_string(), address_form())]);
    let mut billing = FieldSpec::new("billing", FieldType::Formref);
    billing.formref_config = Some(FormRefConfig {
        form_id: "address".into(),
    });
    let spec = FormSpec::new("order", vec![billing]);
    let validators = ValidatorRegistry::new();
    let env = ValidationEnv::new(&validators).with_forms(&forms);

    let result = validate_form(&spec, &json!({ "billing": {} }), &env);
    assert_eq!(fields_of(&result), vec!["billing.street"]);

    let result = validate_form(&spec, &json!({ "billing": { "street": "Main" } }), &env);
    assert!(result.valid);
}

#[test]
fn missing_formref_target_is_not_an_error() {
    let mut orphan = FieldSpec::new("orphan", FieldType::Formref);
    orphan.formref_config = Some(FormRefConfig {
        form_id: "gone".into(),
    });
    let spec = FormSpec::new("order", vec![orphan]);
    let validators = ValidatorRegistry::new();
    let result = validate_form(&spec, &json!({}), &ValidationEnv::new(&validators));
    assert!(result.valid);
}

#[test]
fn column_rules_see_the_row() {
    let mut validators = ValidatorRegistry::new();
    validators.register_fn("matchesRowKind", |value, _, field, form| {
        assert_eq!(field.name, "code");
        assert_eq!(form["mode"], json!("strict"));
        value.and_then(Value::as_str).is_some_and(|code| code.starts_with("K-"))
    });
    let table = FieldSpec {
        table_config: Some(TableConfig {
            columns: vec![
                FieldSpec::new("code", FieldType::Text)
                    .with_rule(RuleSpec::custom("matchesRowKind", "bad code")),
            ],
        }),
        ..FieldSpec::new("items", FieldType::Table)
    };
    let spec = FormSpec::new("codes", vec![table]);
    let data = json!({ "mode": "strict", "items": [{ "code": "K-1" }, { "code": "X-2" }] });
    let result = validate_form(&spec, &data, &ValidationEnv::new(&validators));
    assert_eq!(fields_of(&result), vec!["items[1].code"]);
}
