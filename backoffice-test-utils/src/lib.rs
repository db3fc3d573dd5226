//! Back-office Test Utilities
//!
//! Shared test infrastructure for the workspace:
//! - An in-memory `ResourceClient` with call counting, failure injection and
//!   response gating
//! - In-memory `DashboardSource` and `LookupSource`
//! - Proptest generators for record collections and filters
//! - Fixtures for every resource
//! - Assertions over client results and filtered views

pub use backoffice_core::{
    AttendanceRecord, ClientError, ClientResult, Course, CourseModule, DashboardSource,
    DashboardSummary, Draft, FieldOption, LiveClass, LookupSource, Mentor, MutationKind, Record,
    RecordId, Relation, ResourceClient, User,
};

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

// ============================================================================
// MOCK CLIENT
// ============================================================================

/// Operations the mock counts and can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

impl Operation {
    fn index(self) -> usize {
        match self {
            Operation::List => 0,
            Operation::Create => 1,
            Operation::Update => 2,
            Operation::Delete => 3,
        }
    }
}

struct MockState<R> {
    records: Mutex<Vec<R>>,
    failures: Mutex<HashMap<Operation, VecDeque<ClientError>>>,
    unsupported: Mutex<Vec<MutationKind>>,
    calls: [AtomicUsize; 4],
    next_id: AtomicU64,
    gate: watch::Sender<bool>,
}

/// In-memory server for one resource.
///
/// Mutations change the served collection, so a refresh after a mutation sees
/// it. Clones share state, which lets a test keep a handle while the store owns
/// another.
pub struct MockResourceClient<R> {
    state: Arc<MockState<R>>,
}

impl<R> Clone for MockResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<R: Record> MockResourceClient<R> {
    pub fn new(records: Vec<R>) -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            state: Arc::new(MockState {
                records: Mutex::new(records),
                failures: Mutex::new(HashMap::new()),
                unsupported: Mutex::new(Vec::new()),
                calls: Default::default(),
                next_id: AtomicU64::new(1),
                gate,
            }),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Shared handle suitable for `ListStore::new`.
    pub fn shared(&self) -> Arc<dyn ResourceClient<R>> {
        Arc::new(self.clone())
    }

    /// Number of calls started for an operation, including gated ones.
    pub fn calls(&self, operation: Operation) -> usize {
        self.state.calls[operation.index()].load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.state
            .calls
            .iter()
            .map(|c| c.load(Ordering::SeqCst))
            .sum()
    }

    /// Queue an error for the next call of `operation`.
    pub fn fail_next(&self, operation: Operation, error: ClientError) {
        lock(&self.state.failures)
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    pub fn set_unsupported(&self, kind: MutationKind) {
        lock(&self.state.unsupported).push(kind);
    }

    /// Replace the served collection.
    pub fn set_records(&self, records: Vec<R>) {
        *lock(&self.state.records) = records;
    }

    pub fn records(&self) -> Vec<R> {
        lock(&self.state.records).clone()
    }

    /// Hold every call at its start until [`MockResourceClient::resume`].
    pub fn pause(&self) {
        self.state.gate.send_replace(false);
    }

    pub fn resume(&self) {
        self.state.gate.send_replace(true);
    }

    async fn enter(&self, operation: Operation) -> ClientResult<()> {
        self.state.calls[operation.index()].fetch_add(1, Ordering::SeqCst);
        let mut gate = self.state.gate.subscribe();
        if gate.wait_for(|open| *open).await.is_err() {
            return Err(ClientError::network("mock server shut down"));
        }
        match lock(&self.state.failures)
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<R: Record> ResourceClient<R> for MockResourceClient<R> {
    async fn list(&self) -> ClientResult<Vec<R>> {
        self.enter(Operation::List).await?;
        Ok(self.records())
    }

    async fn create(&self, draft: &Draft) -> ClientResult<R> {
        self.enter(Operation::Create).await?;
        let id = RecordId::new(format!(
            "mock-{}",
            self.state.next_id.fetch_add(1, Ordering::SeqCst)
        ));
        let record = materialize::<R>(&id, None, draft)?;
        lock(&self.state.records).push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &RecordId, draft: &Draft) -> ClientResult<Option<R>> {
        self.enter(Operation::Update).await?;
        let mut records = lock(&self.state.records);
        let slot = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| ClientError::NotFound { id: id.clone() })?;
        let updated = materialize(id, Some(&*slot), draft)?;
        *slot = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: &RecordId) -> ClientResult<()> {
        self.enter(Operation::Delete).await?;
        let mut records = lock(&self.state.records);
        let index = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| ClientError::NotFound { id: id.clone() })?;
        records.remove(index);
        Ok(())
    }

    fn supports(&self, kind: MutationKind) -> bool {
        !lock(&self.state.unsupported).contains(&kind)
    }
}

#[derive(Default)]
struct DashboardState {
    summary: Mutex<DashboardSummary>,
    failures: Mutex<VecDeque<ClientError>>,
    calls: AtomicUsize,
}

/// In-memory dashboard document. Clones share state.
#[derive(Clone, Default)]
pub struct MockDashboardSource {
    state: Arc<DashboardState>,
}

impl MockDashboardSource {
    pub fn new(summary: DashboardSummary) -> Self {
        let source = Self::default();
        source.set_summary(summary);
        source
    }

    pub fn shared(&self) -> Arc<dyn DashboardSource> {
        Arc::new(self.clone())
    }

    pub fn set_summary(&self, summary: DashboardSummary) {
        *lock(&self.state.summary) = summary;
    }

    pub fn fail_next(&self, error: ClientError) {
        lock(&self.state.failures).push_back(error);
    }

    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DashboardSource for MockDashboardSource {
    async fn summary(&self) -> ClientResult<DashboardSummary> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = lock(&self.state.failures).pop_front() {
            return Err(err);
        }
        Ok(lock(&self.state.summary).clone())
    }
}

#[derive(Default)]
struct LookupState {
    options: Mutex<BTreeMap<Relation, Vec<FieldOption>>>,
    failures: Mutex<VecDeque<ClientError>>,
    calls: Mutex<BTreeMap<Relation, usize>>,
}

/// In-memory field options per relation. Relations never set serve an
/// empty list. Clones share state.
#[derive(Clone, Default)]
pub struct MockLookupSource {
    state: Arc<LookupState>,
}

impl MockLookupSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(&self) -> Arc<dyn LookupSource> {
        Arc::new(self.clone())
    }

    pub fn set_options(&self, relation: Relation, options: Vec<FieldOption>) {
        lock(&self.state.options).insert(relation, options);
    }

    pub fn fail_next(&self, error: ClientError) {
        lock(&self.state.failures).push_back(error);
    }

    pub fn calls(&self, relation: Relation) -> usize {
        lock(&self.state.calls).get(&relation).copied().unwrap_or(0)
    }
}

#[async_trait]
impl LookupSource for MockLookupSource {
    async fn options(&self, relation: Relation) -> ClientResult<Vec<FieldOption>> {
        *lock(&self.state.calls).entry(relation).or_default() += 1;
        if let Some(err) = lock(&self.state.failures).pop_front() {
            return Err(err);
        }
        Ok(lock(&self.state.options).get(&relation).cloned().unwrap_or_default())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Lay a draft over an existing record (or nothing) and decode it as `R`.
fn materialize<R: Record>(id: &RecordId, base: Option<&R>, draft: &Draft) -> ClientResult<R> {
    let mut object = match base.map(serde_json::to_value) {
        Some(Ok(Value::Object(map))) => map,
        _ => Map::new(),
    };
    if let Value::Object(fields) = draft.to_json() {
        object.extend(fields);
    }
    object.insert("_id".to_string(), Value::String(id.to_string()));
    serde_json::from_value(Value::Object(object)).map_err(|e| ClientError::Validation {
        message: e.to_string(),
        fields: BTreeMap::new(),
    })
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for record collections and filters.

    use super::*;
    use proptest::prelude::*;

    /// A short mixed-case name.
    pub fn arb_name() -> impl Strategy<Value = String> {
        "[A-Za-z]{1,8}( [A-Za-z]{1,8})?"
    }

    pub fn arb_role() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            Just(Some("student".to_string())),
            Just(Some("mentor".to_string())),
            Just(Some("admin".to_string())),
        ]
    }

    /// A search needle, sometimes empty.
    pub fn arb_needle() -> impl Strategy<Value = String> {
        "[a-zA-Z]{0,3}"
    }

    /// Users with unique ids `u0..un` in generation order.
    pub fn arb_users(max: usize) -> impl Strategy<Value = Vec<User>> {
        prop::collection::vec((arb_name(), arb_role()), 0..max).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (name, role))| {
                    let mut user = fixtures::user(&format!("u{i}"), &name);
                    user.role = role;
                    user
                })
                .collect()
        })
    }

    /// Mentors with unique ids and zero to three subjects.
    pub fn arb_mentors(max: usize) -> impl Strategy<Value = Vec<Mentor>> {
        let subject = prop_oneof![
            Just("React".to_string()),
            Just("Node".to_string()),
            Just("Python".to_string()),
            Just("SQL".to_string()),
        ];
        prop::collection::vec(
            (arb_name(), arb_name(), prop::collection::vec(subject, 0..3)),
            0..max,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (first, last, subjects))| {
                    let subjects: Vec<&str> = subjects.iter().map(String::as_str).collect();
                    fixtures::mentor(&format!("m{i}"), &first, &last, &subjects)
                })
                .collect()
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built records for common scenarios.

    use super::*;
    use serde_json::json;

    fn decode<R: Record>(value: Value) -> R {
        match serde_json::from_value(value) {
            Ok(record) => record,
            Err(e) => panic!("fixture does not decode as {}: {e}", R::KIND),
        }
    }

    pub fn user(id: &str, name: &str) -> User {
        decode(json!({
            "_id": id,
            "name": name,
            "email": format!("{}@example.com", id),
            "role": "student",
        }))
    }

    /// `n` users named `user 1` .. `user n` with ids `1` .. `n`.
    pub fn users(n: usize) -> Vec<User> {
        (1..=n)
            .map(|i| user(&i.to_string(), &format!("user {i}")))
            .collect()
    }

    pub fn mentor(id: &str, first: &str, last: &str, subjects: &[&str]) -> Mentor {
        decode(json!({
            "_id": id,
            "firstName": first,
            "lastName": last,
            "email": format!("{}@example.com", id),
            "subjects": subjects,
            "enrolledBatches": [
                { "_id": format!("{}-b1", id), "batchName": "FS-Jan", "batchNumber": "1", "category": "Web" }
            ],
        }))
    }

    pub fn course(id: &str, name: &str) -> Course {
        decode(json!({ "_id": id, "name": name, "mode": "online", "price": 24999 }))
    }

    pub fn course_module(id: &str, course: &str, mentor: &str) -> CourseModule {
        decode(json!({
            "_id": id,
            "courseId": { "_id": format!("c-{}", id), "name": course, "category": "Web" },
            "mentorName": mentor,
            "modules": [
                { "subjectName": "HTML", "topics": [ { "topicName": "Tags", "lessons": [ { "name": "Intro" } ] } ] }
            ],
            "createdAt": "2024-01-15T10:00:00Z",
        }))
    }

    /// An attendance sheet with one entry per `(student, subject, status)`.
    pub fn attendance_sheet(id: &str, mentor: (&str, &str), entries: &[(&str, &str, &str)]) -> AttendanceRecord {
        let entries: Vec<Value> = entries
            .iter()
            .enumerate()
            .map(|(i, (student, subject, status))| {
                json!({
                    "studentName": student,
                    "enrollmentId": format!("E{}", i + 1),
                    "subject": subject,
                    "date": "2024-03-01",
                    "timing": "10:00-11:00",
                    "status": status,
                })
            })
            .collect();
        decode(json!({
            "_id": id,
            "mentorId": { "_id": format!("m-{}", id), "firstName": mentor.0, "lastName": mentor.1 },
            "attendance": entries,
            "createdAt": "2024-03-01T09:30:00Z",
        }))
    }

    /// A dashboard with `students` student rows and `mentors` mentor rows.
    pub fn dashboard(students: usize, mentors: usize) -> DashboardSummary {
        let students: Vec<Value> = (1..=students)
            .map(|i| {
                json!({
                    "_id": format!("s{i}"),
                    "name": format!("student {i}"),
                    "email": format!("s{i}@example.com"),
                    "mobile": format!("90000000{:02}", i),
                    "createdAt": "2024-03-01T09:30:00.000Z",
                })
            })
            .collect();
        let mentors: Vec<Value> = (1..=mentors)
            .map(|i| json!({ "_id": format!("m{i}"), "expertise": format!("subject {i}"), "createdAt": "2024-02-10" }))
            .collect();
        match serde_json::from_value(json!({
            "totals": { "students": students.len(), "courses": 4, "mentors": mentors.len(), "categories": 2 },
            "todayStats": { "todaysEnrollments": 3, "completedCoursesToday": 1, "revenueToday": 74997 },
            "activeStudents": { "daily": 5, "weekly": 12, "monthly": 30 },
            "tables": { "studentInsightsData": students, "mentorInsightsData": mentors },
        })) {
            Ok(summary) => summary,
            Err(e) => panic!("dashboard fixture does not decode: {e}"),
        }
    }

    pub fn live_class(id: &str, class_name: &str, subject: &str) -> LiveClass {
        decode(json!({
            "_id": id,
            "className": class_name,
            "subjectName": subject,
            "date": "2024-04-02",
            "timing": "18:00",
            "link": "https://meet.example.com/abc",
        }))
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over client results and derived views.

    use super::*;

    #[track_caller]
    pub fn assert_network_error<T: std::fmt::Debug>(result: &ClientResult<T>) {
        match result {
            Err(ClientError::Network { .. }) => {}
            other => panic!("Expected Network error, got: {:?}", other),
        }
    }

    #[track_caller]
    pub fn assert_server_error<T: std::fmt::Debug>(result: &ClientResult<T>, status: Option<u16>) {
        match result {
            Err(ClientError::Server { status: s, .. }) => {
                assert_eq!(*s, status, "Wrong status in Server error");
            }
            other => panic!("Expected Server error, got: {:?}", other),
        }
    }

    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &ClientResult<T>, id: &str) {
        match result {
            Err(ClientError::NotFound { id: missing }) => assert_eq!(missing.as_str(), id),
            other => panic!("Expected NotFound for {}, got: {:?}", id, other),
        }
    }

    /// Assert a validation error that names `field`.
    #[track_caller]
    pub fn assert_validation_field<T: std::fmt::Debug>(result: &ClientResult<T>, field: &str) {
        match result {
            Err(err @ ClientError::Validation { .. }) => assert!(
                err.field_error(field).is_some(),
                "Validation error has no message for {}: {:?}",
                field,
                err
            ),
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    /// Assert `view` is an order-preserving subsequence of `collection`.
    #[track_caller]
    pub fn assert_subsequence<R: Record>(view: &[&R], collection: &[R]) {
        let mut remaining = collection.iter();
        for record in view {
            assert!(
                remaining.any(|candidate| candidate.id() == record.id()),
                "{} is missing from the collection or out of order",
                record.id()
            );
        }
    }

    pub fn ids<R: Record>(records: &[&R]) -> Vec<String> {
        records.iter().map(|r| r.id().to_string()).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
