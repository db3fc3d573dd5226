//! Event types for the console event loop.
//!
//! Network work runs on spawned tasks; their results come back here as
//! [`Completion`]s tagged with the screen they belong to.

use backoffice_core::{
    AttendanceRecord, ClientResult, Course, CourseModule, DashboardSummary, FieldOption, LiveClass,
    Mentor, Mutation, Record, Relation, SessionToken, User,
};
use crossterm::event::KeyEvent;
use std::sync::Arc;

#[derive(Debug)]
pub enum TuiEvent {
    Input(KeyEvent),
    Tick,
    Resize { width: u16, height: u16 },
    /// A spawned task finished. `mount` identifies the screen instance that
    /// started it; results for an unmounted screen are dropped.
    Completed { mount: u64, completion: Completion },
}

/// Result of a spawned refresh or submission.
#[derive(Debug)]
pub enum Done<R> {
    Refresh {
        generation: u64,
        result: ClientResult<Arc<Vec<R>>>,
    },
    Submit {
        token: SessionToken,
        result: ClientResult<Mutation<R>>,
    },
}

#[derive(Debug)]
pub enum Completion {
    Dashboard {
        generation: u64,
        result: ClientResult<DashboardSummary>,
    },
    /// Choices for a form field bound to `relation`.
    Options {
        relation: Relation,
        result: ClientResult<Vec<FieldOption>>,
    },
    Users(Done<User>),
    Mentors(Done<Mentor>),
    CourseModules(Done<CourseModule>),
    Courses(Done<Course>),
    Attendance(Done<AttendanceRecord>),
    LiveClasses(Done<LiveClass>),
}

/// Records that have a screen in the console.
pub trait Routed: Record {
    fn completion(done: Done<Self>) -> Completion;

    /// The inverse of [`Routed::completion`]; other screens' results are
    /// handed back unchanged.
    fn extract(completion: Completion) -> Result<Done<Self>, Completion>;
}

macro_rules! routed {
    ($($record:ty => $variant:ident),* $(,)?) => {
        $(
            impl Routed for $record {
                fn completion(done: Done<Self>) -> Completion {
                    Completion::$variant(done)
                }

                fn extract(completion: Completion) -> Result<Done<Self>, Completion> {
                    match completion {
                        Completion::$variant(done) => Ok(done),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

routed! {
    User => Users,
    Mentor => Mentors,
    CourseModule => CourseModules,
    Course => Courses,
    AttendanceRecord => Attendance,
    LiveClass => LiveClasses,
}
