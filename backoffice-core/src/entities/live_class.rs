use super::id_of_ref;
use crate::draft::{FieldKind, FieldSpec};
use crate::identity::{RecordId, ResourceKind};
use crate::record::{opt, Column, Record};
use serde::{Deserialize, Serialize};

/// Scheduled live class for an enrollment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveClass {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default, deserialize_with = "id_of_ref")]
    pub enrollment_id: Option<RecordId>,
    #[serde(default, deserialize_with = "id_of_ref")]
    pub mentor_id: Option<RecordId>,
    #[serde(default)]
    pub subject_name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub timing: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

const COLUMNS: &[Column] = &[
    Column::new("className", "Class"),
    Column::new("subjectName", "Subject"),
    Column::new("date", "Date"),
    Column::new("timing", "Timing"),
    Column::new("link", "Link"),
];

const EDITABLE: &[FieldSpec] = &[
    FieldSpec::text("className", "Class name"),
    FieldSpec::text("enrollmentId", "Enrollment id"),
    FieldSpec::text("mentorId", "Mentor id"),
    FieldSpec::text("subjectName", "Subject"),
    FieldSpec::new("date", "Date", FieldKind::Date),
    FieldSpec::text("timing", "Timing"),
    FieldSpec::text("link", "Meeting link"),
];

impl Record for LiveClass {
    const KIND: ResourceKind = ResourceKind::LiveClass;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn field_values(&self, field: &str) -> Vec<String> {
        match field {
            "id" => vec![self.id.to_string()],
            "className" => opt(&self.class_name),
            "enrollmentId" => self.enrollment_id.iter().map(|id| id.to_string()).collect(),
            "mentorId" => self.mentor_id.iter().map(|id| id.to_string()).collect(),
            "subjectName" => opt(&self.subject_name),
            "date" => opt(&self.date),
            "timing" => opt(&self.timing),
            "link" => opt(&self.link),
            _ => Vec::new(),
        }
    }

    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn editable_fields() -> &'static [FieldSpec] {
        EDITABLE
    }

    fn search_fields() -> &'static [&'static str] {
        &["className", "subjectName"]
    }

    fn display_name(&self) -> String {
        self.class_name.clone().unwrap_or_else(|| self.id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_populated_refs_collapse_to_ids() {
        let class: LiveClass = serde_json::from_value(serde_json::json!({
            "_id": "l1",
            "className": "Hooks deep dive",
            "enrollmentId": { "_id": "e7", "batchName": "FS-Jan" },
            "mentorId": "m1"
        }))
        .unwrap();
        assert_eq!(class.enrollment_id, Some(RecordId::new("e7")));
        assert_eq!(class.mentor_id, Some(RecordId::new("m1")));
        assert_eq!(class.cell("enrollmentId"), "e7");
    }
}
