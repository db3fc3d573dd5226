use super::{lenient_string, timestamp};
use crate::draft::{FieldKind, FieldSpec};
use crate::identity::{RecordId, ResourceKind, Timestamp};
use crate::record::{opt, Column, Record};
use serde::{Deserialize, Serialize};

/// Platform user (student or staff) as listed by the admin user screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mobile: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub zipcode: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub year_of_passed_out: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub experience: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub advance_payment: Option<f64>,
    #[serde(default)]
    pub is_advance_payment: Option<bool>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

const COLUMNS: &[Column] = &[
    Column::new("name", "Name"),
    Column::new("email", "Email"),
    Column::new("mobile", "Phone"),
    Column::new("course", "Course"),
    Column::new("role", "Role"),
];

const EXPORT_COLUMNS: &[Column] = &[
    Column::new("id", "id"),
    Column::new("name", "name"),
    Column::new("email", "email"),
    Column::new("mobile", "phone"),
    Column::new("course", "course"),
    Column::new("role", "role"),
    Column::new("createdAt", "createdAt"),
    Column::new("updatedAt", "updatedAt"),
];

const EDITABLE: &[FieldSpec] = &[
    FieldSpec::text("name", "Name"),
    FieldSpec::text("email", "Email"),
    FieldSpec::text("mobile", "Phone"),
    FieldSpec::text("city", "City"),
    FieldSpec::text("zipcode", "Zipcode"),
    FieldSpec::new("dateOfBirth", "Date of birth", FieldKind::Date),
    FieldSpec::text("course", "Course"),
    FieldSpec::text("role", "Role"),
];

const CREATABLE: &[FieldSpec] = &[
    FieldSpec::text("name", "Name"),
    FieldSpec::text("mobile", "Mobile"),
    FieldSpec::text("email", "Email"),
    FieldSpec::text("courseId", "Course id"),
    FieldSpec::text("course", "Course"),
    FieldSpec::text("degree", "Degree"),
    FieldSpec::text("department", "Department"),
    FieldSpec::text("yearOfPassedOut", "Year of passing"),
    FieldSpec::text("company", "Company"),
    FieldSpec::text("role", "Role"),
    FieldSpec::text("experience", "Experience"),
    FieldSpec::text("transactionId", "Transaction id"),
    FieldSpec::new("advancePayment", "Advance payment", FieldKind::Number),
    FieldSpec::new("isAdvancePayment", "Advance paid", FieldKind::Bool),
];

impl Record for User {
    const KIND: ResourceKind = ResourceKind::User;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn field_values(&self, field: &str) -> Vec<String> {
        match field {
            "id" => vec![self.id.to_string()],
            "name" => opt(&self.name),
            "email" => opt(&self.email),
            "mobile" | "phone" => opt(&self.mobile),
            "city" => opt(&self.city),
            "zipcode" => opt(&self.zipcode),
            "dateOfBirth" => opt(&self.date_of_birth),
            "course" => opt(&self.course),
            "role" => opt(&self.role),
            "degree" => opt(&self.degree),
            "department" => opt(&self.department),
            "company" => opt(&self.company),
            "createdAt" => timestamp(&self.created_at),
            "updatedAt" => timestamp(&self.updated_at),
            _ => Vec::new(),
        }
    }

    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn export_columns() -> &'static [Column] {
        EXPORT_COLUMNS
    }

    fn editable_fields() -> &'static [FieldSpec] {
        EDITABLE
    }

    fn creatable_fields() -> &'static [FieldSpec] {
        CREATABLE
    }

    fn search_fields() -> &'static [&'static str] {
        &["name"]
    }

    fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.id.to_string())
    }
}
