//! Back-office Core - Records and List Management
//!
//! Typed record schemas for every remote resource the console manages, plus
//! the list-management core shared by every screen: filtering, pagination,
//! the collection store, the editing state machine and tabular export. The
//! read-only platform overview lives in [`dashboard`].
//!
//! Nothing in this crate performs I/O. Remote access goes through the
//! [`ResourceClient`] trait, implemented over HTTP by `backoffice-client`.

pub mod dashboard;
pub mod draft;
pub mod editing;
pub mod entities;
pub mod error;
pub mod export;
pub mod filter;
pub mod identity;
pub mod lookup;
pub mod paging;
pub mod record;
pub mod remote;
pub mod store;

pub use dashboard::{
    ActiveStudents, DashboardSource, DashboardSummary, InsightTables, MentorInsight,
    StudentInsight, TodayStats, Totals, INSIGHT_PAGE_SIZE,
};
pub use draft::{Draft, FieldKind, FieldSpec};
pub use editing::{
    EditingController, EditingMode, EditingSession, SessionToken, SubmitOutcome, SubmitTicket,
};
pub use entities::{
    AttendanceEntry, AttendanceRecord, AttendanceSummary, Batch, Course, CourseModule, CourseRef,
    LiveClass, Mentor, MentorRef, ModuleSection, User,
};
pub use error::{ClientError, ClientResult, EditError, ExportError};
pub use export::{ExportArtifact, ExportFormat, ExportRequest, Exporter};
pub use filter::{FilterCriteria, Predicate};
pub use identity::{RecordId, ResourceKind, Timestamp};
pub use lookup::{step_option, FieldBinding, FieldOption, LookupSource, Relation, Stores};
pub use paging::{paginate, PageRequest, PageWindow};
pub use record::{Column, Record};
pub use remote::{Mutation, MutationKind, MutationPlan, ResourceClient};
pub use store::{ListStore, RefreshOutcome, RefreshTicket};
