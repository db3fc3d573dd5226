//! The `Record` trait implemented by every resource schema.

use crate::draft::FieldSpec;
use crate::identity::{RecordId, ResourceKind};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// A tabular column: logical field key plus header label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
}

impl Column {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// One entity of a remote collection.
///
/// Implementors are plain serde structs whose non-id fields are optional, so
/// partial server payloads decode cleanly. Field access for filtering and
/// export goes through [`Record::field_values`] using logical keys, which may
/// reach into embedded documents (`course.name`) or fan out over nested lists
/// (`subject` on an attendance sheet).
pub trait Record: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: ResourceKind;

    fn id(&self) -> &RecordId;

    /// All values of a logical field. Missing fields yield an empty vec;
    /// multi-valued fields yield one entry per element.
    fn field_values(&self, field: &str) -> Vec<String>;

    /// Table and export columns, in display order.
    fn columns() -> &'static [Column];

    /// Fields offered by the edit modal.
    fn editable_fields() -> &'static [FieldSpec];

    /// Fields offered by the create modal.
    fn creatable_fields() -> &'static [FieldSpec] {
        Self::editable_fields()
    }

    /// Fields matched by the screen's free-text search box.
    fn search_fields() -> &'static [&'static str];

    /// Human-readable label used in confirmations and notifications.
    fn display_name(&self) -> String;

    /// Single display cell for a column key.
    fn cell(&self, key: &str) -> String {
        self.field_values(key).join(", ")
    }

    /// Export columns; the table columns unless the export fans out.
    fn export_columns() -> &'static [Column] {
        Self::columns()
    }

    /// Flat rows handed to the exporter, keyed by export column. One row per
    /// record unless the resource fans out (attendance exports one row per
    /// entry).
    fn export_rows(&self) -> Vec<BTreeMap<String, String>> {
        let row = Self::export_columns()
            .iter()
            .map(|column| (column.key.to_string(), self.cell(column.key)))
            .collect();
        vec![row]
    }

    /// Look up a field by wire name among the edit or create fields.
    fn field_spec(name: &str, creating: bool) -> Option<&'static FieldSpec> {
        let fields = if creating {
            Self::creatable_fields()
        } else {
            Self::editable_fields()
        };
        fields.iter().find(|spec| spec.name == name)
    }
}

/// Push an optional string into a value list.
pub(crate) fn opt(value: &Option<String>) -> Vec<String> {
    value.iter().cloned().collect()
}
