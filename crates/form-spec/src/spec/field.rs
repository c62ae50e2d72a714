use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::condition::ConditionSpec;
use super::rule::RuleSpec;

/// Debounce applied to change-triggered async validators when none is configured.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

wire_enum! {
    /// Supported field kinds. Structural kinds carry a non-scalar value.
    pub enum FieldType {
        Text => "text",
        Textarea => "textarea",
        Email => "email",
        Number => "number",
        Date => "date",
        Select => "select",
        Radio => "radio",
        Checkbox => "checkbox",
        Autocomplete => "autocomplete",
        File => "file",
        Info => "info",
        Table => "table",
        Datagrid => "datagrid",
        Phone => "phone",
        Daterange => "daterange",
        Formref => "formref",
    }
}

impl Default for FieldType {
    fn default() -> Self {
        FieldType::Text
    }
}

impl FieldType {
    /// Info blocks and form references never hold a scalar input value.
    pub fn is_input(&self) -> bool {
        !matches!(self, FieldType::Info | FieldType::Formref)
    }
}

/// Columns of a table; each row of the value is an object keyed by column name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    #[serde(default)]
    pub columns: Vec<FieldSpec>,
}

/// Declared row of a datagrid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatagridRow {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Fixed grid of rows x columns; the value maps row id to a column object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatagridConfig {
    #[serde(default)]
    pub columns: Vec<FieldSpec>,
    #[serde(default)]
    pub rows: Vec<DatagridRow>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeConfig {
    #[serde(default)]
    pub to_date_optional: bool,
}

/// Embeds another form, resolved by id at validation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormRefConfig {
    pub form_id: String,
}

/// When the host should run a field's async validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum AsyncTrigger {
    #[default]
    Blur,
    Change,
}

/// Binds a field to a named asynchronous validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AsyncValidatorSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(default)]
    pub trigger: AsyncTrigger,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
}

/// Definition of a single field, or of a column when nested in a table/datagrid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validations: Vec<RuleSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionSpec>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    /// Datagrid columns only: derived values that are never user input.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub computed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_config: Option<TableConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datagrid_config: Option<DatagridConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daterange_config: Option<DateRangeConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formref_config: Option<FormRefConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub async_validator: Option<AsyncValidatorSpec>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldType) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn with_rule(mut self, rule: RuleSpec) -> Self {
        self.validations.push(rule);
        self
    }

    pub fn with_condition(mut self, condition: ConditionSpec) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Table and datagrid columns, empty for every other kind.
    pub fn columns(&self) -> &[FieldSpec] {
        match self.kind {
            FieldType::Table => self
                .table_config
                .as_ref()
                .map(|config| config.columns.as_slice())
                .unwrap_or_default(),
            FieldType::Datagrid => self
                .datagrid_config
                .as_ref()
                .map(|config| config.columns.as_slice())
                .unwrap_or_default(),
            _ => &[],
        }
    }
}
