//! Which fields must be re-checked when another field's value changes.
//!
//! The graph is derived from every condition in a [`FormSpec`]: rule
//! conditions, field and column visibility, section visibility and wizard
//! page visibility. It is built once per form and never patched; a new form
//! needs a new graph.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::spec::{ConditionSpec, FieldSpec, FieldType, FormSpec};

/// A column of a table or datagrid field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ColumnRef {
    pub field: String,
    pub column: String,
}

type EdgeMap = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DependencyGraph {
    /// Id of the form the graph was built from.
    pub form_id: String,
    /// Form-level field -> form-level fields whose rules or visibility read it.
    pub form: EdgeMap,
    /// Table field -> (column -> same-row columns that read it).
    pub tables: BTreeMap<String, EdgeMap>,
    /// Datagrid field -> (column -> same-row columns that read it).
    pub datagrids: BTreeMap<String, EdgeMap>,
    /// Form-level field -> row columns that read it through `$form.`.
    pub cross: BTreeMap<String, BTreeSet<ColumnRef>>,
}

impl DependencyGraph {
    pub fn dependents(&self, field: &str) -> impl Iterator<Item = &str> {
        self.form
            .get(field)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Same-row columns of `structure` that read `column`.
    pub fn row_dependents(&self, structure: &str, column: &str) -> impl Iterator<Item = &str> {
        self.tables
            .get(structure)
            .or_else(|| self.datagrids.get(structure))
            .and_then(|columns| columns.get(column))
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn cross_dependents(&self, field: &str) -> impl Iterator<Item = &ColumnRef> {
        self.cross.get(field).into_iter().flatten()
    }

    /// Top-level fields to re-validate after `field` changed: direct
    /// dependents plus every structure holding a `$form.` reference to it.
    pub fn affected_by(&self, field: &str) -> BTreeSet<String> {
        self.dependents(field)
            .map(str::to_string)
            .chain(
                self.cross_dependents(field)
                    .map(|column| column.field.clone()),
            )
            .filter(|name| name != field)
            .collect()
    }

    pub fn is_built_for(&self, spec: &FormSpec) -> bool {
        self.form_id == spec.id
    }

    pub fn is_empty(&self) -> bool {
        self.form.is_empty()
            && self.tables.is_empty()
            && self.datagrids.is_empty()
            && self.cross.is_empty()
    }
}

pub fn build_dependencies(spec: &FormSpec) -> DependencyGraph {
    let mut graph = DependencyGraph {
        form_id: spec.id.clone(),
        ..DependencyGraph::default()
    };

    for field in spec.fields.iter().filter(|field| !field.archived) {
        for condition in conditions_of(field) {
            add_edge(&mut graph.form, condition.target(), &field.name);
        }
        match field.kind {
            FieldType::Table => scan_columns(&mut graph, field, Structure::Table),
            FieldType::Datagrid => scan_columns(&mut graph, field, Structure::Datagrid),
            _ => {}
        }
    }

    for section in &spec.sections {
        let Some(condition) = &section.condition else {
            continue;
        };
        for field in spec.fields.iter().filter(|field| {
            !field.archived && field.section_id.as_deref() == Some(section.id.as_str())
        }) {
            add_edge(&mut graph.form, condition.target(), &field.name);
        }
    }

    for page in spec.wizard.iter().flat_map(|wizard| wizard.pages.iter()) {
        let Some(condition) = &page.condition else {
            continue;
        };
        for field in spec
            .fields
            .iter()
            .filter(|field| !field.archived && page.contains(field))
        {
            add_edge(&mut graph.form, condition.target(), &field.name);
        }
    }

    tracing::debug!(
        form_id = %spec.id,
        form_edges = graph.form.len(),
        cross_edges = graph.cross.len(),
        "dependency graph built"
    );
    graph
}

#[derive(Clone, Copy)]
enum Structure {
    Table,
    Datagrid,
}

fn scan_columns(graph: &mut DependencyGraph, field: &FieldSpec, structure: Structure) {
    for column in field.columns() {
        for condition in conditions_of(column) {
            if condition.is_form_scoped() {
                graph
                    .cross
                    .entry(condition.target().to_string())
                    .or_default()
                    .insert(ColumnRef {
                        field: field.name.clone(),
                        column: column.name.clone(),
                    });
                continue;
            }
            let rows = match structure {
                Structure::Table => &mut graph.tables,
                Structure::Datagrid => &mut graph.datagrids,
            };
            add_edge(
                rows.entry(field.name.clone()).or_default(),
                condition.target(),
                &column.name,
            );
        }
    }
}

/// The field's own visibility condition followed by its rule conditions.
fn conditions_of(field: &FieldSpec) -> impl Iterator<Item = &ConditionSpec> {
    field.condition.iter().chain(
        field
            .validations
            .iter()
            .filter_map(|rule| rule.condition.as_ref()),
    )
}

fn add_edge(map: &mut EdgeMap, referenced: &str, dependent: &str) {
    if referenced == dependent {
        return;
    }
    map.entry(referenced.to_string())
        .or_default()
        .insert(dependent.to_string());
}
