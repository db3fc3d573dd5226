//! Resource schemas.
//!
//! One typed record per remote collection. Every non-id field is optional
//! because the server omits unset fields. Embedded references (`courseId`,
//! `mentorId`) arrive either populated or as a bare id string; both decode.

mod attendance;
mod course;
mod live_class;
mod mentor;
mod user;

pub use attendance::{AttendanceEntry, AttendanceRecord, AttendanceSummary};
pub use course::{Course, CourseModule, CourseRef, Lesson, ModuleSection, Topic};
pub use live_class::LiveClass;
pub use mentor::{Batch, Mentor, MentorRef};
pub use user::User;

use crate::identity::{RecordId, Timestamp};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept a string, number or bool where the schema wants text.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RefOrId<T> {
    Id(String),
    Doc(T),
}

/// Embedded document that may be unpopulated (bare id string).
pub(crate) fn ref_or_id<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + From<RecordId>,
{
    Ok(match Option::<RefOrId<T>>::deserialize(deserializer)? {
        None => None,
        Some(RefOrId::Id(id)) => Some(T::from(RecordId::new(id))),
        Some(RefOrId::Doc(doc)) => Some(doc),
    })
}

#[derive(Deserialize)]
struct IdOnly {
    #[serde(rename = "_id")]
    id: String,
}

/// Reference kept only as an id, whether or not the server populated it.
pub(crate) fn id_of_ref<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<RefOrId<IdOnly>>::deserialize(deserializer)? {
            None => None,
            Some(RefOrId::Id(id)) => Some(RecordId::new(id)),
            Some(RefOrId::Doc(doc)) => Some(RecordId::new(doc.id)),
        },
    )
}

pub(crate) fn timestamp(value: &Option<Timestamp>) -> Vec<String> {
    value.iter().map(|ts| ts.to_rfc3339()).collect()
}

/// Render a server date (`2024-03-01` or a full ISO timestamp) as `dd/mm/yyyy`.
pub(crate) fn format_day(raw: &str) -> String {
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return ts.format("%d/%m/%Y").to_string();
    }
    if let Ok(day) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return day.format("%d/%m/%Y").to_string();
    }
    raw.to_string()
}
