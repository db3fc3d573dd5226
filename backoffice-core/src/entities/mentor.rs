use super::{lenient_string, ref_or_id};
use crate::draft::{FieldKind, FieldSpec};
use crate::entities::CourseRef;
use crate::identity::{RecordId, ResourceKind};
use crate::record::{opt, Column, Record};
use serde::{Deserialize, Serialize};

/// Mentor with the batches they teach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mentor {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub expertise: Option<String>,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub assigned_courses: Vec<Batch>,
    #[serde(default)]
    pub enrolled_batches: Vec<Batch>,
}

impl Mentor {
    /// `firstName lastName`, the field the mentor search box matches.
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

/// A course batch a mentor is assigned to or enrolled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    #[serde(rename = "_id", default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub batch_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub batch_number: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "ref_or_id")]
    pub course_id: Option<CourseRef>,
}

impl Batch {
    pub fn label(&self) -> String {
        let name = self.batch_name.as_deref().unwrap_or("Unnamed batch");
        match &self.batch_number {
            Some(number) => format!("{} ({})", name, number),
            None => name.to_string(),
        }
    }
}

/// Mentor embedded in another document (course module, attendance sheet).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorRef {
    #[serde(rename = "_id", default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub expertise: Option<String>,
}

impl MentorRef {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

impl From<RecordId> for MentorRef {
    fn from(id: RecordId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }
}

fn full_name(first: &Option<String>, last: &Option<String>) -> String {
    let first = first.as_deref().unwrap_or("");
    let last = last.as_deref().unwrap_or("");
    format!("{} {}", first, last).trim().to_string()
}

const COLUMNS: &[Column] = &[
    Column::new("name", "Name"),
    Column::new("email", "Email"),
    Column::new("expertise", "Expertise"),
    Column::new("subjects", "Subjects"),
    Column::new("batches", "Batches"),
];

const EDITABLE: &[FieldSpec] = &[
    FieldSpec::text("firstName", "First name"),
    FieldSpec::text("lastName", "Last name"),
    FieldSpec::text("email", "Email"),
    FieldSpec::text("phoneNumber", "Phone"),
    FieldSpec::text("expertise", "Expertise"),
    FieldSpec::new("subjects", "Subjects", FieldKind::List),
];

impl Record for Mentor {
    const KIND: ResourceKind = ResourceKind::Mentor;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn field_values(&self, field: &str) -> Vec<String> {
        match field {
            "id" => vec![self.id.to_string()],
            "name" => vec![self.full_name()],
            "firstName" => opt(&self.first_name),
            "lastName" => opt(&self.last_name),
            "email" => opt(&self.email),
            "phoneNumber" => opt(&self.phone_number),
            "expertise" => opt(&self.expertise),
            "subjects" => self.subjects.clone(),
            "batches" => vec![self.enrolled_batches.len().to_string()],
            "batchNames" => self.enrolled_batches.iter().map(Batch::label).collect(),
            _ => Vec::new(),
        }
    }

    fn cell(&self, key: &str) -> String {
        let value = self.field_values(key).join(", ");
        match key {
            "expertise" | "subjects" if value.is_empty() => "N/A".to_string(),
            _ => value,
        }
    }

    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn editable_fields() -> &'static [FieldSpec] {
        EDITABLE
    }

    fn search_fields() -> &'static [&'static str] {
        &["name"]
    }

    fn display_name(&self) -> String {
        let name = self.full_name();
        if name.is_empty() {
            self.id.to_string()
        } else {
            name
        }
    }
}
