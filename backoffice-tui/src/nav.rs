//! Navigation and screen switching utilities.

use backoffice_core::ResourceKind;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum View {
    #[default]
    Dashboard,
    Users,
    Mentors,
    CourseModules,
    Courses,
    Attendance,
    LiveClasses,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self.resource() {
            Some(kind) => kind.title(),
            None => "Dashboard",
        }
    }

    /// The resource listed by this view; the dashboard lists none.
    pub fn resource(&self) -> Option<ResourceKind> {
        match self {
            View::Dashboard => None,
            View::Users => Some(ResourceKind::User),
            View::Mentors => Some(ResourceKind::Mentor),
            View::CourseModules => Some(ResourceKind::CourseModule),
            View::Courses => Some(ResourceKind::Course),
            View::Attendance => Some(ResourceKind::Attendance),
            View::LiveClasses => Some(ResourceKind::LiveClass),
        }
    }

    pub fn for_resource(kind: ResourceKind) -> View {
        match kind {
            ResourceKind::User => View::Users,
            ResourceKind::Mentor => View::Mentors,
            ResourceKind::CourseModule => View::CourseModules,
            ResourceKind::Course => View::Courses,
            ResourceKind::Attendance => View::Attendance,
            ResourceKind::LiveClass => View::LiveClasses,
        }
    }

    pub fn all() -> &'static [View] {
        &[
            View::Dashboard,
            View::Users,
            View::Mentors,
            View::CourseModules,
            View::Courses,
            View::Attendance,
            View::LiveClasses,
        ]
    }

    pub fn index(&self) -> usize {
        Self::all()
            .iter()
            .position(|v| v == self)
            .unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<View> {
        Self::all().get(index).copied()
    }

    pub fn next(&self) -> View {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    pub fn previous(&self) -> View {
        let all = Self::all();
        let idx = self.index();
        let prev = if idx == 0 { all.len() - 1 } else { idx - 1 };
        all[prev]
    }
}


impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
