use super::{format_day, ref_or_id, timestamp};
use crate::draft::FieldSpec;
use crate::entities::MentorRef;
use crate::identity::{RecordId, ResourceKind, Timestamp};
use crate::record::{Column, Record};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One mentor's attendance sheet: a list of per-student entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(default, deserialize_with = "ref_or_id")]
    pub mentor_id: Option<MentorRef>,
    #[serde(default)]
    pub attendance: Vec<AttendanceEntry>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub enrollment_id: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub timing: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl AttendanceEntry {
    pub fn is_present(&self) -> bool {
        self.status.as_deref() == Some("present")
    }

    pub fn is_absent(&self) -> bool {
        self.status.as_deref() == Some("absent")
    }
}

impl AttendanceRecord {
    pub fn mentor_name(&self) -> String {
        self.mentor_id
            .as_ref()
            .map(MentorRef::full_name)
            .unwrap_or_default()
    }

    pub fn present_count(&self) -> usize {
        self.attendance.iter().filter(|e| e.is_present()).count()
    }

    pub fn absent_count(&self) -> usize {
        self.attendance.iter().filter(|e| e.is_absent()).count()
    }

    fn entry_values(&self, pick: impl Fn(&AttendanceEntry) -> Option<&String>) -> Vec<String> {
        self.attendance.iter().filter_map(pick).cloned().collect()
    }
}

/// Totals across a set of attendance sheets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceSummary {
    pub records: usize,
    pub present: usize,
    pub absent: usize,
    pub subjects: BTreeSet<String>,
}

impl AttendanceSummary {
    pub fn of<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> Self {
        let mut summary = Self::default();
        for record in records {
            summary.records += 1;
            summary.present += record.present_count();
            summary.absent += record.absent_count();
            summary
                .subjects
                .extend(record.attendance.iter().filter_map(|e| e.subject.clone()));
        }
        summary
    }
}

const COLUMNS: &[Column] = &[
    Column::new("mentor", "Mentor"),
    Column::new("mentorEmail", "Mentor Email"),
    Column::new("entries", "Entries"),
    Column::new("present", "Present"),
    Column::new("absent", "Absent"),
];

const EXPORT_COLUMNS: &[Column] = &[
    Column::new("Mentor Name", "Mentor Name"),
    Column::new("Mentor Email", "Mentor Email"),
    Column::new("Student Name", "Student Name"),
    Column::new("Enrollment ID", "Enrollment ID"),
    Column::new("Subject", "Subject"),
    Column::new("Date", "Date"),
    Column::new("Timing", "Timing"),
    Column::new("Status", "Status"),
    Column::new("Record Date", "Record Date"),
];

impl Record for AttendanceRecord {
    const KIND: ResourceKind = ResourceKind::Attendance;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn field_values(&self, field: &str) -> Vec<String> {
        match field {
            "id" => vec![self.id.to_string()],
            "mentor" => vec![self.mentor_name()],
            "mentorEmail" => self
                .mentor_id
                .as_ref()
                .and_then(|m| m.email.clone())
                .into_iter()
                .collect(),
            "entries" => vec![self.attendance.len().to_string()],
            "present" => vec![self.present_count().to_string()],
            "absent" => vec![self.absent_count().to_string()],
            "subject" => self.entry_values(|e| e.subject.as_ref()),
            "date" => self.entry_values(|e| e.date.as_ref()),
            "studentName" => self.entry_values(|e| e.student_name.as_ref()),
            "status" => self.entry_values(|e| e.status.as_ref()),
            "createdAt" => timestamp(&self.created_at),
            _ => Vec::new(),
        }
    }

    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn export_columns() -> &'static [Column] {
        EXPORT_COLUMNS
    }

    fn export_rows(&self) -> Vec<BTreeMap<String, String>> {
        let mentor = self.mentor_name();
        let mentor_email = self
            .mentor_id
            .as_ref()
            .and_then(|m| m.email.clone())
            .unwrap_or_default();
        let record_date = self
            .created_at
            .map(|ts| ts.format("%d/%m/%Y %H:%M:%S").to_string())
            .unwrap_or_default();

        self.attendance
            .iter()
            .map(|entry| {
                let cells = [
                    ("Mentor Name", mentor.clone()),
                    ("Mentor Email", mentor_email.clone()),
                    ("Student Name", entry.student_name.clone().unwrap_or_default()),
                    ("Enrollment ID", entry.enrollment_id.clone().unwrap_or_default()),
                    ("Subject", entry.subject.clone().unwrap_or_default()),
                    ("Date", entry.date.as_deref().map(format_day).unwrap_or_default()),
                    ("Timing", entry.timing.clone().unwrap_or_default()),
                    ("Status", entry.status.clone().unwrap_or_default()),
                    ("Record Date", record_date.clone()),
                ];
                cells
                    .into_iter()
                    .map(|(key, value)| (key.to_string(), value))
                    .collect()
            })
            .collect()
    }

    fn editable_fields() -> &'static [FieldSpec] {
        &[]
    }

    fn search_fields() -> &'static [&'static str] {
        &["subject"]
    }

    fn display_name(&self) -> String {
        let mentor = self.mentor_name();
        if mentor.is_empty() {
            self.id.to_string()
        } else {
            format!("Attendance by {}", mentor)
        }
    }
}
