//! Platform overview.
//!
//! The dashboard is one read-only document: headline counts, today's figures,
//! active-student windows and two insight tables. It is fetched whole and
//! paged locally, five rows per table.

use crate::entities::{format_day, lenient_string};
use crate::error::ClientResult;
use crate::identity::RecordId;
use crate::paging::{paginate, PageWindow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Rows per insight table page.
pub const INSIGHT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(5) {
    Some(size) => size,
    None => unreachable!(),
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Totals {
    pub students: u64,
    pub courses: u64,
    pub mentors: u64,
    pub categories: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TodayStats {
    pub todays_enrollments: u64,
    pub completed_courses_today: u64,
    pub revenue_today: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveStudents {
    pub daily: u64,
    pub weekly: u64,
    pub monthly: u64,
}

/// Recently registered student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInsight {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mobile: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl StudentInsight {
    pub const HEADERS: [&'static str; 4] = ["Name", "Email", "Mobile", "Account Created"];

    pub fn cells(&self) -> [String; 4] {
        [
            self.name.clone().unwrap_or_default(),
            self.email.clone().unwrap_or_default(),
            self.mobile.clone().unwrap_or_default(),
            self.created_at.as_deref().map(format_day).unwrap_or_default(),
        ]
    }
}

/// Recently joined mentor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorInsight {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub expertise: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl MentorInsight {
    pub const HEADERS: [&'static str; 2] = ["Expertise", "Joined Date"];

    pub fn cells(&self) -> [String; 2] {
        [
            self.expertise.clone().unwrap_or_default(),
            self.created_at.as_deref().map(format_day).unwrap_or_default(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InsightTables {
    pub student_insights_data: Vec<StudentInsight>,
    pub mentor_insights_data: Vec<MentorInsight>,
}

/// Everything `GET /dashboard` returns under `data`. Missing sections decode
/// as zeros and empty tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardSummary {
    pub totals: Totals,
    pub today_stats: TodayStats,
    pub active_students: ActiveStudents,
    pub tables: InsightTables,
}

impl DashboardSummary {
    pub fn students(&self) -> &[StudentInsight] {
        &self.tables.student_insights_data
    }

    pub fn mentors(&self) -> &[MentorInsight] {
        &self.tables.mentor_insights_data
    }

    pub fn student_window(&self, page_index: usize) -> PageWindow {
        paginate(self.students().len(), INSIGHT_PAGE_SIZE, page_index)
    }

    pub fn mentor_window(&self, page_index: usize) -> PageWindow {
        paginate(self.mentors().len(), INSIGHT_PAGE_SIZE, page_index)
    }

    /// Headline figures as label/value pairs, in display order.
    pub fn stat_rows(&self) -> [Vec<(&'static str, String)>; 3] {
        let totals = &self.totals;
        let today = &self.today_stats;
        let active = &self.active_students;
        [
            vec![
                ("Total Students", totals.students.to_string()),
                ("Total Courses", totals.courses.to_string()),
                ("Total Mentors", totals.mentors.to_string()),
                ("Total Categories", totals.categories.to_string()),
            ],
            vec![
                ("Today's Enrollments", today.todays_enrollments.to_string()),
                ("Completed Courses", today.completed_courses_today.to_string()),
                ("Revenue from Courses", format_rupees(today.revenue_today)),
            ],
            vec![
                ("Daily Active Students", active.daily.to_string()),
                ("Weekly Active Students", active.weekly.to_string()),
                ("Monthly Active Students", active.monthly.to_string()),
            ],
        ]
    }
}

/// `₹1,23,456` style grouping: last three digits, then pairs.
pub fn format_rupees(amount: f64) -> String {
    let whole = amount.max(0.0).round() as u64;
    let digits = whole.to_string();
    let (head, tail) = digits.split_at(digits.len().saturating_sub(3));
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (left, right) = rest.split_at(rest.len() - 2);
        groups.push(right);
        rest = left;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();
    groups.push(tail);
    format!("₹{}", groups.join(","))
}

/// Read access to the dashboard document.
#[async_trait]
pub trait DashboardSource: Send + Sync {
    async fn summary(&self) -> ClientResult<DashboardSummary>;
}
