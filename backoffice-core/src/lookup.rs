//! Choices for form fields that reference another collection.
//!
//! A [`FieldBinding`] ties a draft field to a [`Relation`]; the form offers
//! that relation's [`FieldOption`]s and stores either the picked id or its
//! label.

use crate::error::ClientResult;
use crate::identity::RecordId;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// A collection other forms pick values from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Relation {
    Enrollments,
    Mentors,
    Courses,
}

impl Relation {
    pub fn title(&self) -> &'static str {
        match self {
            Relation::Enrollments => "enrollments",
            Relation::Mentors => "mentors",
            Relation::Courses => "courses",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// What a bound field keeps from the picked option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stores {
    Id,
    Label,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBinding {
    pub field: &'static str,
    pub relation: Relation,
    pub stores: Stores,
}

impl FieldBinding {
    pub const fn new(field: &'static str, relation: Relation, stores: Stores) -> Self {
        Self {
            field,
            relation,
            stores,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOption {
    pub id: RecordId,
    pub label: String,
}

impl FieldOption {
    pub fn new(id: impl Into<RecordId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    pub fn value(&self, stores: Stores) -> &str {
        match stores {
            Stores::Id => self.id.as_str(),
            Stores::Label => &self.label,
        }
    }

    /// Build an option from one raw document of `relation`. Documents
    /// without an `_id` are skipped; a missing label falls back to the id.
    pub fn from_document(relation: Relation, doc: &Value) -> Option<Self> {
        let id = doc.get("_id").and_then(Value::as_str)?;
        let text = |key: &str| match doc.get(key) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        let label = match relation {
            Relation::Enrollments => match (text("batchName"), text("batchNumber")) {
                (name, number) if number.is_empty() => name,
                (name, number) => format!("{} ({})", name, number),
            },
            Relation::Mentors => format!("{} {}", text("firstName"), text("lastName"))
                .trim()
                .to_string(),
            Relation::Courses => text("name"),
        };
        let label = if label.is_empty() { id.to_string() } else { label };
        Some(Self::new(id, label))
    }
}

/// Step through `options` from the one whose value is `current`. Starts at
/// the first (or last, going back) when nothing matches.
pub fn step_option<'a>(
    options: &'a [FieldOption],
    stores: Stores,
    current: &str,
    forward: bool,
) -> Option<&'a FieldOption> {
    if options.is_empty() {
        return None;
    }
    let len = options.len();
    let next = match options.iter().position(|o| o.value(stores) == current) {
        Some(index) if forward => (index + 1) % len,
        Some(index) => (index + len - 1) % len,
        None if forward => 0,
        None => len - 1,
    };
    options.get(next)
}

/// Fetches the options of a relation.
#[async_trait]
pub trait LookupSource: Send + Sync {
    async fn options(&self, relation: Relation) -> ClientResult<Vec<FieldOption>>;
}
