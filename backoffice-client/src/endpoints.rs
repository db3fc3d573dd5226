//! Per-resource route tables.
//!
//! The back-office API is not uniformly RESTful, so every resource carries its
//! own paths plus the keys its responses use. Paths are relative to the API
//! base URL; `{id}` is replaced with the target record id. A missing route
//! means the operation is not offered for that resource.

use backoffice_core::{MutationKind, RecordId, ResourceKind};
use serde::{Deserialize, Serialize};

/// Body encoding for create requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyFormat {
    #[default]
    Json,
    /// `multipart/form-data` with one text part per draft field.
    Multipart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEndpoints {
    pub list: Option<String>,
    pub create: Option<String>,
    pub update: Option<String>,
    pub delete: Option<String>,
    /// Envelope key holding the collection.
    pub list_key: String,
    /// Envelope keys that may hold a created or updated record, tried in order.
    pub record_keys: Vec<String>,
    pub create_body: BodyFormat,
}

impl ResourceEndpoints {
    /// `GET/POST /{resource}`, `PUT/DELETE /{resource}/{id}`.
    pub fn rest(resource: &str) -> Self {
        let item = format!("{}/{{id}}", resource);
        Self {
            list: Some(resource.to_string()),
            create: Some(resource.to_string()),
            update: Some(item.clone()),
            delete: Some(item),
            list_key: "data".to_string(),
            record_keys: vec!["data".to_string()],
            create_body: BodyFormat::Json,
        }
    }

    fn read_only(list: &str) -> Self {
        Self {
            create: None,
            update: None,
            delete: None,
            ..Self::rest(list)
        }
    }

    /// Routes of the production back-office API.
    pub fn defaults(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::User => Self {
                list: Some("allusers".into()),
                create: Some("register-by-admin".into()),
                update: Some("updateusers/{id}".into()),
                delete: Some("deleteusers/{id}".into()),
                record_keys: vec!["updatedUser".into(), "user".into(), "data".into()],
                ..Self::rest("users")
            },
            ResourceKind::Mentor => Self {
                list: Some("mentors/with-batches".into()),
                create: None,
                update: Some("our-mentor/mentor/{id}".into()),
                delete: Some("our-mentor/mentor/{id}".into()),
                ..Self::rest("mentors")
            },
            ResourceKind::CourseModule => Self::rest("course-modules"),
            ResourceKind::Course => Self {
                create: Some("create-course".into()),
                create_body: BodyFormat::Multipart,
                ..Self::read_only("allcourses")
            },
            ResourceKind::Attendance => Self {
                list_key: "attendance".into(),
                ..Self::read_only("allattendance")
            },
            ResourceKind::LiveClass => Self {
                create: Some("createliveclass".into()),
                ..Self::read_only("liveclasses")
            },
        }
    }

    /// Apply configured overrides. An empty path disables the operation.
    pub fn with_overrides(mut self, overrides: &EndpointOverrides) -> Self {
        fn apply(slot: &mut Option<String>, value: &Option<String>) {
            if let Some(path) = value {
                *slot = if path.trim().is_empty() {
                    None
                } else {
                    Some(path.trim().to_string())
                };
            }
        }
        apply(&mut self.list, &overrides.list);
        apply(&mut self.create, &overrides.create);
        apply(&mut self.update, &overrides.update);
        apply(&mut self.delete, &overrides.delete);
        if let Some(key) = &overrides.list_key {
            self.list_key = key.clone();
        }
        if let Some(key) = &overrides.record_key {
            self.record_keys.retain(|k| k != key);
            self.record_keys.insert(0, key.clone());
        }
        if let Some(format) = overrides.create_body {
            self.create_body = format;
        }
        self
    }

    pub fn supports(&self, kind: MutationKind) -> bool {
        match kind {
            MutationKind::Create => self.create.is_some(),
            MutationKind::Update => self.update.is_some(),
            MutationKind::Delete => self.delete.is_some(),
        }
    }

    /// Fill `{id}` into a path template.
    pub fn item_path(template: &str, id: &RecordId) -> String {
        template.replace("{id}", id.as_str())
    }
}

/// Route overrides as they appear in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointOverrides {
    #[serde(default)]
    pub list: Option<String>,
    #[serde(default)]
    pub create: Option<String>,
    #[serde(default)]
    pub update: Option<String>,
    #[serde(default)]
    pub delete: Option<String>,
    #[serde(default)]
    pub list_key: Option<String>,
    #[serde(default)]
    pub record_key: Option<String>,
    #[serde(default)]
    pub create_body: Option<BodyFormat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_resources_offer_no_mutations() {
        let attendance = ResourceEndpoints::defaults(ResourceKind::Attendance);
        assert_eq!(attendance.list.as_deref(), Some("allattendance"));
        assert_eq!(attendance.list_key, "attendance");
        assert!(!attendance.supports(MutationKind::Create));
        assert!(!attendance.supports(MutationKind::Delete));
    }

    #[test]
    fn test_course_create_is_multipart() {
        let courses = ResourceEndpoints::defaults(ResourceKind::Course);
        assert_eq!(courses.create.as_deref(), Some("create-course"));
        assert_eq!(courses.create_body, BodyFormat::Multipart);
        assert!(!courses.supports(MutationKind::Update));
    }

    #[test]
    fn test_item_path_fills_id() {
        let users = ResourceEndpoints::defaults(ResourceKind::User);
        let path = ResourceEndpoints::item_path(users.update.as_deref().unwrap(), &"64ab".into());
        assert_eq!(path, "updateusers/64ab");
    }

    #[test]
    fn test_overrides_replace_and_disable() {
        let overrides = EndpointOverrides {
            list: Some("v2/mentors".into()),
            delete: Some(String::new()),
            record_key: Some("mentor".into()),
            ..EndpointOverrides::default()
        };
        let mentors = ResourceEndpoints::defaults(ResourceKind::Mentor).with_overrides(&overrides);
        assert_eq!(mentors.list.as_deref(), Some("v2/mentors"));
        assert!(!mentors.supports(MutationKind::Delete));
        assert!(mentors.supports(MutationKind::Update));
        assert_eq!(mentors.record_keys, vec!["mentor".to_string(), "data".to_string()]);
    }

    #[test]
    fn test_rest_convention() {
        let modules = ResourceEndpoints::defaults(ResourceKind::CourseModule);
        assert_eq!(modules.list.as_deref(), Some("course-modules"));
        assert_eq!(modules.delete.as_deref(), Some("course-modules/{id}"));
    }
}
