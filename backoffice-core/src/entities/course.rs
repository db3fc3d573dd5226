use super::{lenient_string, ref_or_id, timestamp};
use crate::draft::{FieldKind, FieldSpec};
use crate::entities::MentorRef;
use crate::identity::{RecordId, ResourceKind, Timestamp};
use crate::record::{opt, Column, Record};
use serde::{Deserialize, Serialize};

/// A sellable course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub no_of_lessons: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub no_of_students: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

/// Course embedded in a batch or module document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRef {
    #[serde(rename = "_id", default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub duration: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl From<RecordId> for CourseRef {
    fn from(id: RecordId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }
}

/// Curriculum of one course as taught by one mentor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseModule {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(default, deserialize_with = "ref_or_id")]
    pub course_id: Option<CourseRef>,
    #[serde(default)]
    pub mentor_name: Option<String>,
    #[serde(default, deserialize_with = "ref_or_id")]
    pub mentor_id: Option<MentorRef>,
    #[serde(default)]
    pub modules: Vec<ModuleSection>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSection {
    #[serde(default)]
    pub subject_name: Option<String>,
    #[serde(default)]
    pub topics: Vec<Topic>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    #[serde(default)]
    pub topic_name: Option<String>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub duration: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
}

impl CourseModule {
    pub fn course_name(&self) -> Option<&str> {
        self.course_id.as_ref().and_then(|c| c.name.as_deref())
    }

    pub fn lesson_count(&self) -> usize {
        self.modules
            .iter()
            .flat_map(|m| m.topics.iter())
            .map(|t| t.lessons.len())
            .sum()
    }
}

const COURSE_COLUMNS: &[Column] = &[
    Column::new("name", "Name"),
    Column::new("category", "Category"),
    Column::new("mode", "Mode"),
    Column::new("price", "Price"),
    Column::new("duration", "Duration"),
];

const COURSE_EDITABLE: &[FieldSpec] = &[
    FieldSpec::text("name", "Name"),
    FieldSpec::text("description", "Description"),
    FieldSpec::text("mode", "Mode"),
    FieldSpec::text("category", "Category"),
    FieldSpec::new("price", "Price", FieldKind::Number),
    FieldSpec::text("duration", "Duration"),
    FieldSpec::new("noOfLessons", "Lessons", FieldKind::Number),
    FieldSpec::new("noOfStudents", "Students", FieldKind::Number),
];

impl Record for Course {
    const KIND: ResourceKind = ResourceKind::Course;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn field_values(&self, field: &str) -> Vec<String> {
        match field {
            "id" => vec![self.id.to_string()],
            "name" => opt(&self.name),
            "description" => opt(&self.description),
            "mode" => opt(&self.mode),
            "category" => opt(&self.category),
            "price" => opt(&self.price),
            "duration" => opt(&self.duration),
            "noOfLessons" => opt(&self.no_of_lessons),
            "noOfStudents" => opt(&self.no_of_students),
            "createdAt" => timestamp(&self.created_at),
            _ => Vec::new(),
        }
    }

    fn columns() -> &'static [Column] {
        COURSE_COLUMNS
    }

    fn editable_fields() -> &'static [FieldSpec] {
        COURSE_EDITABLE
    }

    fn search_fields() -> &'static [&'static str] {
        &["name"]
    }

    fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.id.to_string())
    }
}

const MODULE_COLUMNS: &[Column] = &[
    Column::new("course", "Course"),
    Column::new("mentor", "Mentor"),
    Column::new("modules", "Modules"),
    Column::new("lessons", "Lessons"),
    Column::new("createdAt", "Created"),
];

const MODULE_EDITABLE: &[FieldSpec] = &[FieldSpec::text("mentorName", "Mentor name")];

impl Record for CourseModule {
    const KIND: ResourceKind = ResourceKind::CourseModule;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn field_values(&self, field: &str) -> Vec<String> {
        match field {
            "id" => vec![self.id.to_string()],
            "course" => self.course_name().map(str::to_string).into_iter().collect(),
            "category" => self
                .course_id
                .as_ref()
                .and_then(|c| c.category.clone())
                .into_iter()
                .collect(),
            "mentor" | "mentorName" => opt(&self.mentor_name),
            "mentorEmail" => self
                .mentor_id
                .as_ref()
                .and_then(|m| m.email.clone())
                .into_iter()
                .collect(),
            "modules" => vec![self.modules.len().to_string()],
            "lessons" => vec![self.lesson_count().to_string()],
            "subjects" => self
                .modules
                .iter()
                .filter_map(|m| m.subject_name.clone())
                .collect(),
            "createdAt" => self
                .created_at
                .iter()
                .map(|ts| ts.format("%d/%m/%Y").to_string())
                .collect(),
            _ => Vec::new(),
        }
    }

    fn columns() -> &'static [Column] {
        MODULE_COLUMNS
    }

    fn editable_fields() -> &'static [FieldSpec] {
        MODULE_EDITABLE
    }

    fn search_fields() -> &'static [&'static str] {
        &["course", "mentor", "id"]
    }

    fn display_name(&self) -> String {
        match (self.course_name(), self.mentor_name.as_deref()) {
            (Some(course), Some(mentor)) => format!("{} / {}", course, mentor),
            (Some(course), None) => course.to_string(),
            _ => self.id.to_string(),
        }
    }
}
