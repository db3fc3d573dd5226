//! Filter criteria and the derived filtered view.
//!
//! Criteria are named predicates ANDed together. A missing key matches
//! everything, so screens only insert the filters the user actually set.

use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single named filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// Case-insensitive substring match against any value of any listed field.
    Contains { fields: Vec<String>, needle: String },
    /// Exact match against any value of one field.
    Equals { field: String, value: String },
}

impl Predicate {
    pub fn contains<I, S>(fields: I, needle: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Contains {
            fields: fields.into_iter().map(Into::into).collect(),
            needle: needle.into(),
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// An empty search box matches every record.
    pub fn is_match_all(&self) -> bool {
        matches!(self, Self::Contains { needle, .. } if needle.is_empty())
    }

    pub fn matches<R: Record>(&self, record: &R) -> bool {
        match self {
            Self::Contains { fields, needle } => {
                if needle.is_empty() {
                    return true;
                }
                let needle = needle.to_lowercase();
                fields.iter().any(|field| {
                    record
                        .field_values(field)
                        .iter()
                        .any(|value| value.to_lowercase().contains(&needle))
                })
            }
            Self::Equals { field, value } => {
                record.field_values(field).iter().any(|v| v == value)
            }
        }
    }
}

/// Named predicates, ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterCriteria {
    predicates: BTreeMap<String, Predicate>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one criterion to a set about to be merged. A match-all predicate
    /// is kept so that merging it clears the key on the receiving side.
    pub fn with(mut self, key: impl Into<String>, predicate: Predicate) -> Self {
        self.predicates.insert(key.into(), predicate);
        self
    }

    /// Insert or replace one criterion. A match-all predicate removes the key.
    pub fn set(&mut self, key: impl Into<String>, predicate: Predicate) {
        let key = key.into();
        if predicate.is_match_all() {
            self.predicates.remove(&key);
        } else {
            self.predicates.insert(key, predicate);
        }
    }

    /// Merge another set of criteria into this one, key by key.
    pub fn merge(&mut self, other: FilterCriteria) {
        for (key, predicate) in other.predicates {
            self.set(key, predicate);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Predicate> {
        self.predicates.remove(key)
    }

    pub fn clear(&mut self) {
        self.predicates.clear();
    }

    pub fn get(&self, key: &str) -> Option<&Predicate> {
        self.predicates.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Predicate)> {
        self.predicates.iter()
    }

    pub fn matches<R: Record>(&self, record: &R) -> bool {
        self.predicates.values().all(|p| p.matches(record))
    }

    /// The filtered view: the matching subset, in collection order.
    pub fn apply<'a, R: Record>(&self, records: &'a [R]) -> Vec<&'a R> {
        records.iter().filter(|r| self.matches(*r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::User;
    use crate::identity::RecordId;

    fn user(id: &str, name: &str, role: &str) -> User {
        serde_json::from_value(serde_json::json!({ "_id": id, "name": name, "role": role }))
            .unwrap()
    }

    fn users() -> Vec<User> {
        vec![
            user("1", "A", "student"),
            user("2", "B", "mentor"),
            user("3", "C", "student"),
        ]
    }

    #[test]
    fn test_case_insensitive_name_search() {
        let records = users();
        let criteria = FilterCriteria::new().with("search", Predicate::contains(["name"], "b"));
        let view = criteria.apply(&records);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, RecordId::new("2"));
    }

    #[test]
    fn test_empty_criteria_matches_all_in_order() {
        let records = users();
        let view = FilterCriteria::new().apply(&records);
        let ids: Vec<&str> = view.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_predicates_are_anded() {
        let records = users();
        let criteria = FilterCriteria::new()
            .with("role", Predicate::equals("role", "student"))
            .with("search", Predicate::contains(["name"], "c"));
        let view = criteria.apply(&records);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id.as_str(), "3");
    }

    #[test]
    fn test_equals_is_exact() {
        let records = users();
        let criteria = FilterCriteria::new().with("role", Predicate::equals("role", "Student"));
        assert!(criteria.apply(&records).is_empty());
    }

    #[test]
    fn test_merging_empty_needle_removes_key() {
        let mut criteria = FilterCriteria::new().with("search", Predicate::contains(["name"], "a"));
        criteria.merge(FilterCriteria::new().with("role", Predicate::equals("role", "mentor")));
        assert_eq!(criteria.len(), 2);

        criteria.merge(FilterCriteria::new().with("search", Predicate::contains(["name"], "")));
        assert_eq!(criteria.len(), 1);
        assert!(criteria.get("search").is_none());
        assert!(criteria.get("role").is_some());
    }

    #[test]
    fn test_match_all_criterion_matches_everything() {
        let records = users();
        let criteria = FilterCriteria::new().with("search", Predicate::contains(["name"], ""));
        assert_eq!(criteria.apply(&records).len(), 3);
    }
}
