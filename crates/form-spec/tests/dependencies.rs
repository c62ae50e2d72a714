use std::collections::BTreeSet;

use form_spec::{ColumnRef, FormSpec, build_dependencies, parse_config};

fn onboarding() -> FormSpec {
    parse_config(include_str!("fixtures/vendor_onboarding.json")).expect("fixture parses")
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[test]
fn rule_conditions_create_form_level_edges() {
    let graph = build_dependencies(&onboarding());
    assert_eq!(graph.form_id, "vendor-onboarding");
    assert_eq!(
        graph.dependents("region").collect::<Vec<_>>(),
        vec!["vatNumber"]
    );
}

#[test]
fn section_and_page_conditions_fan_out_to_their_fields() {
    let graph = build_dependencies(&onboarding());
    // Banking section and the bank page both gate `iban`.
    assert_eq!(
        graph.dependents("paymentMethod").collect::<Vec<_>>(),
        vec!["iban"]
    );
}

#[test]
fn same_row_references_stay_inside_the_structure() {
    let graph = build_dependencies(&onboarding());
    assert_eq!(
        graph.row_dependents("contacts", "role").collect::<Vec<_>>(),
        vec!["email"]
    );
    assert_eq!(
        graph.row_dependents("capacity", "units").collect::<Vec<_>>(),
        vec!["notes"]
    );
    assert!(graph.tables.contains_key("contacts"));
    assert!(graph.datagrids.contains_key("capacity"));
    assert!(graph.dependents("role").next().is_none());
}

#[test]
fn form_prefixed_references_cross_into_rows() {
    let graph = build_dependencies(&onboarding());
    assert_eq!(
        graph.cross_dependents("region").cloned().collect::<Vec<_>>(),
        vec![ColumnRef {
            field: "contacts".into(),
            column: "vatId".into(),
        }]
    );
    assert_eq!(graph.affected_by("region"), set(&["contacts", "vatNumber"]));
}

#[test]
fn unrelated_fields_have_no_dependents() {
    let graph = build_dependencies(&onboarding());
    assert!(graph.affected_by("companyName").is_empty());
}

#[test]
fn graph_is_rebuilt_per_spec() {
    let spec = onboarding();
    let graph = build_dependencies(&spec);
    assert!(graph.is_built_for(&spec));

    let other = FormSpec::new("other", Vec::new());
    assert!(!graph.is_built_for(&other));
    assert!(build_dependencies(&other).is_empty());
}

#[test]
fn archived_fields_are_not_dependents() {
    let mut spec = onboarding();
    if let Some(field) = spec.fields.iter_mut().find(|field| field.name == "vatNumber") {
        field.archived = true;
    }
    let graph = build_dependencies(&spec);
    assert!(graph.dependents("region").next().is_none());
}
