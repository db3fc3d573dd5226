//! Identity types for back-office records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Server-assigned record identifier.
///
/// The remote API issues opaque string ids (`_id` on the wire). They are
/// stable across fetches and never generated locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Resource discriminator, one per remote collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    User,
    Mentor,
    CourseModule,
    Course,
    Attendance,
    LiveClass,
}

impl ResourceKind {
    pub fn all() -> &'static [ResourceKind] {
        &[
            ResourceKind::User,
            ResourceKind::Mentor,
            ResourceKind::CourseModule,
            ResourceKind::Course,
            ResourceKind::Attendance,
            ResourceKind::LiveClass,
        ]
    }

    /// Configuration key and default REST path segment.
    pub fn key(&self) -> &'static str {
        match self {
            ResourceKind::User => "users",
            ResourceKind::Mentor => "mentors",
            ResourceKind::CourseModule => "course-modules",
            ResourceKind::Course => "courses",
            ResourceKind::Attendance => "attendance",
            ResourceKind::LiveClass => "liveclasses",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ResourceKind::User => "Users",
            ResourceKind::Mentor => "Mentors",
            ResourceKind::CourseModule => "Course Modules",
            ResourceKind::Course => "Courses",
            ResourceKind::Attendance => "Attendance",
            ResourceKind::LiveClass => "Live Classes",
        }
    }

    pub fn from_key(key: &str) -> Option<ResourceKind> {
        Self::all().iter().copied().find(|kind| kind.key() == key)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_serializes_as_plain_string() {
        let id = RecordId::new("64f1c0ffee");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"64f1c0ffee\"");
    }

    #[test]
    fn test_resource_kind_key_roundtrip() {
        for kind in ResourceKind::all() {
            assert_eq!(ResourceKind::from_key(kind.key()), Some(*kind));
        }
        assert_eq!(ResourceKind::from_key("nope"), None);
    }
}
