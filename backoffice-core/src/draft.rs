//! Editable drafts and field coercion.
//!
//! A draft is the partial record a modal edits before submission. Values are
//! coerced to the field's declared kind as they are entered; anything beyond
//! that (required fields, uniqueness, formats) is the server's call and comes
//! back as a validation error.

use crate::error::EditError;
use crate::record::Record;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Declared wire type of an editable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Bool,
    /// Comma-separated input, sent as a JSON array of strings.
    List,
    /// `YYYY-MM-DD`, sent as a string.
    Date,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Bool => "true/false",
            FieldKind::List => "comma-separated list",
            FieldKind::Date => "YYYY-MM-DD",
        };
        f.write_str(name)
    }
}

/// An editable field: wire name, display label and kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { name, label, kind }
    }

    pub const fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Text)
    }
}

/// Coerce raw user input into the JSON value sent for a field.
pub fn coerce(spec: &FieldSpec, raw: &str) -> Result<Value, EditError> {
    let trimmed = raw.trim();
    let invalid = || EditError::Coercion {
        field: spec.name.to_string(),
        expected: spec.kind,
        value: raw.to_string(),
    };

    match spec.kind {
        FieldKind::Text => Ok(Value::String(raw.to_string())),
        _ if trimmed.is_empty() => Ok(Value::Null),
        FieldKind::Number => {
            if let Ok(int) = trimmed.parse::<i64>() {
                return Ok(Value::from(int));
            }
            trimmed
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(invalid)
        }
        FieldKind::Bool => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "0" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
        FieldKind::List => Ok(Value::Array(
            trimmed
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| Value::String(item.to_string()))
                .collect(),
        )),
        FieldKind::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(|_| Value::String(trimmed.to_string()))
            .map_err(|_| invalid()),
    }
}

/// Field map edited by a modal and sent as the create/update payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Draft(Map<String, Value>);

impl Draft {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Full snapshot of a record, used by the view modal.
    pub fn snapshot<R: Record>(record: &R) -> Self {
        match serde_json::to_value(record) {
            Ok(Value::Object(map)) => Self(map),
            _ => Self::new(),
        }
    }

    /// The editable subset of a record, used to seed the edit modal.
    pub fn editable<R: Record>(record: &R) -> Self {
        let mut snapshot = Self::snapshot(record);
        snapshot.0.retain(|key, value| {
            !value.is_null() && R::editable_fields().iter().any(|spec| spec.name == key)
        });
        snapshot
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Coerce and store a field value.
    pub fn set(&mut self, spec: &FieldSpec, raw: &str) -> Result<(), EditError> {
        let value = coerce(spec, raw)?;
        self.0.insert(spec.name.to_string(), value);
        Ok(())
    }

    /// Store an already-typed value without coercion.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Value rendered back into the form it is typed in.
    pub fn display(&self, name: &str) -> String {
        self.0.get(name).map(display_value).unwrap_or_default()
    }

    /// JSON object payload.
    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Flattened `(name, text)` pairs for multipart bodies; nested values are
    /// sent as JSON text.
    pub fn text_fields(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), text)
            })
            .collect()
    }
}

pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRICE: FieldSpec = FieldSpec::new("price", "Price", FieldKind::Number);
    const PAID: FieldSpec = FieldSpec::new("isAdvancePayment", "Advance paid", FieldKind::Bool);
    const SUBJECTS: FieldSpec = FieldSpec::new("subjects", "Subjects", FieldKind::List);
    const DATE: FieldSpec = FieldSpec::new("date", "Date", FieldKind::Date);

    #[test]
    fn test_number_coercion() {
        assert_eq!(coerce(&PRICE, "42").unwrap(), Value::from(42));
        assert_eq!(coerce(&PRICE, " 12.5 ").unwrap(), serde_json::json!(12.5));
        assert_eq!(coerce(&PRICE, "").unwrap(), Value::Null);
        assert!(matches!(
            coerce(&PRICE, "forty"),
            Err(EditError::Coercion { expected: FieldKind::Number, .. })
        ));
    }

    #[test]
    fn test_bool_coercion() {
        assert_eq!(coerce(&PAID, "Yes").unwrap(), Value::Bool(true));
        assert_eq!(coerce(&PAID, "0").unwrap(), Value::Bool(false));
        assert!(coerce(&PAID, "maybe").is_err());
    }

    #[test]
    fn test_list_coercion_drops_blank_items() {
        assert_eq!(
            coerce(&SUBJECTS, "rust, go,, sql ").unwrap(),
            serde_json::json!(["rust", "go", "sql"])
        );
    }

    #[test]
    fn test_date_coercion() {
        assert_eq!(
            coerce(&DATE, "2024-03-01").unwrap(),
            Value::String("2024-03-01".into())
        );
        assert!(coerce(&DATE, "01/03/2024").is_err());
    }

    #[test]
    fn test_text_keeps_raw_input() {
        let spec = FieldSpec::text("name", "Name");
        assert_eq!(coerce(&spec, "  Ada ").unwrap(), Value::String("  Ada ".into()));
    }

    #[test]
    fn test_text_fields_skip_nulls() {
        let mut draft = Draft::new();
        draft.set(&FieldSpec::text("name", "Name"), "Rust 101").unwrap();
        draft.set(&PRICE, "").unwrap();
        draft.set(&SUBJECTS, "a,b").unwrap();
        let fields = draft.text_fields();
        assert_eq!(
            fields,
            vec![
                ("name".to_string(), "Rust 101".to_string()),
                ("subjects".to_string(), "[\"a\",\"b\"]".to_string()),
            ]
        );
        assert_eq!(draft.display("subjects"), "a, b");
    }
}
