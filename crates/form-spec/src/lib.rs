#![allow(missing_docs)]

pub mod compose;
pub mod condition;
pub mod config;
pub mod deps;
pub mod registry;
pub mod result;
pub mod rules;
pub mod spec;
pub mod submission;
pub mod validate;
pub mod value;
pub mod visibility;
pub mod wizard;

pub use compose::embedded_form;
pub use condition::evaluate as evaluate_condition;
pub use config::{
    ConfigError, ConfigIssue, ConfigReport, load_config, parse_config, validate_config,
};
pub use deps::{ColumnRef, DependencyGraph, build_dependencies};
pub use registry::{FormResolver, NamedValidator, NoForms, ValidationEnv, ValidatorRegistry};
pub use result::{FieldValidationError, ValidationResult};
pub use rules::{RuleContext, evaluate_rule, is_required};
pub use spec::{
    AsyncTrigger, AsyncValidatorSpec, ConditionOperator, ConditionSpec, DEFAULT_DEBOUNCE_MS,
    DatagridConfig, DatagridRow, DateRangeConfig, FieldSpec, FieldType, FormRefConfig, FormSpec, RuleSpec,
    RuleType, SectionSpec, TableConfig, WizardPage, WizardSpec,
};
pub use submission::build_submission;
pub use validate::{validate_field_value, validate_form};
pub use visibility::{VisibilityMap, field_visible, page_visible, resolve_visibility, section_visible};
pub use wizard::{WizardCursor, clamp_page_index, page_fields, validate_page, visible_pages};

/// JSON Schema describing the form configuration wire format.
pub fn form_spec_schema() -> schemars::Schema {
    schemars::schema_for!(FormSpec)
}
