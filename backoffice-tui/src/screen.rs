//! Resource screens.
//!
//! A [`Screen`] is mounted when its view becomes active and dropped when the
//! user switches away. It owns the list store and editing controller for its
//! resource plus the transient input state of the table and modal. Network
//! calls run on spawned tasks and report back through the event channel.

use crate::events::{Completion, Done, Routed, TuiEvent};
use crate::keys::{Action, InputMode};
use crate::nav::View;
use crate::notifications::{Notification, NotificationAction, NotificationLevel};
use crate::theme::Theme;
use crate::views;
use backoffice_core::{
    step_option, AttendanceRecord, AttendanceSummary, ClientResult, Column, Course, CourseModule,
    EditingController, EditingMode, ExportFormat, ExportRequest, Exporter, FieldBinding,
    FieldOption, FieldSpec, FilterCriteria, LiveClass, ListStore, LookupSource, Mentor, Mutation,
    MutationKind, Predicate, Record, RefreshOutcome, Relation, ResourceClient, Stores, SubmitOutcome,
    User,
};
use ratatui::{layout::Rect, Frame};
use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Filter key for the cycling choice filter (`f`).
pub const CHOICE_KEY: &str = "choice";

/// Per-resource screen behaviour beyond the record schema.
pub trait ScreenRecord: Routed {
    /// Field whose distinct values are offered by the choice filter.
    fn choice_field() -> Option<&'static str> {
        None
    }

    /// Form fields whose value is picked from another collection.
    fn field_bindings() -> &'static [FieldBinding] {
        &[]
    }

    /// Fields listed by the view modal.
    fn detail_columns() -> &'static [Column] {
        Self::columns()
    }

    /// Nested rows listed under the view modal's fields, with a status.
    fn detail_entries(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Summary figures over the filtered view, shown above the table.
    fn summary(records: &[&Self]) -> Vec<(&'static str, String)> {
        let _ = records;
        Vec::new()
    }
}

impl ScreenRecord for User {
    fn choice_field() -> Option<&'static str> {
        Some("role")
    }

    fn field_bindings() -> &'static [FieldBinding] {
        const BINDINGS: &[FieldBinding] = &[
            FieldBinding::new("courseId", Relation::Courses, Stores::Id),
            FieldBinding::new("course", Relation::Courses, Stores::Label),
        ];
        BINDINGS
    }

    fn detail_columns() -> &'static [Column] {
        Self::export_columns()
    }
}

impl ScreenRecord for Mentor {}

impl ScreenRecord for CourseModule {}

impl ScreenRecord for Course {
    fn choice_field() -> Option<&'static str> {
        Some("category")
    }
}

impl ScreenRecord for AttendanceRecord {
    fn choice_field() -> Option<&'static str> {
        Some("subject")
    }

    fn detail_entries(&self) -> Vec<(String, String)> {
        self.attendance
            .iter()
            .map(|entry| {
                let describe = [
                    entry.student_name.as_deref(),
                    entry.enrollment_id.as_deref(),
                    entry.subject.as_deref(),
                    entry.date.as_deref(),
                    entry.timing.as_deref(),
                ]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" · ");
                (describe, entry.status.clone().unwrap_or_default())
            })
            .collect()
    }

    fn summary(records: &[&Self]) -> Vec<(&'static str, String)> {
        let summary = AttendanceSummary::of(records.iter().copied());
        vec![
            ("Sheets", summary.records.to_string()),
            ("Present", summary.present.to_string()),
            ("Absent", summary.absent.to_string()),
            ("Subjects", summary.subjects.len().to_string()),
        ]
    }
}

impl ScreenRecord for LiveClass {
    fn choice_field() -> Option<&'static str> {
        Some("subjectName")
    }

    fn field_bindings() -> &'static [FieldBinding] {
        const BINDINGS: &[FieldBinding] = &[
            FieldBinding::new("enrollmentId", Relation::Enrollments, Stores::Id),
            FieldBinding::new("mentorId", Relation::Mentors, Stores::Id),
        ];
        BINDINGS
    }
}

/// Where a screen sends its work and writes its exports.
pub struct ScreenContext<'a> {
    pub events: &'a mpsc::Sender<TuiEvent>,
    pub export_dir: &'a Path,
}

/// Cursor and input buffer of the edit/create modal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub field: usize,
    /// Text being typed into the selected field.
    pub input: Option<String>,
    /// Why the last typed value was rejected.
    pub error: Option<String>,
}

/// Object-safe face of a screen, so the app can hold whichever is mounted.
pub trait ScreenOps {
    fn view(&self) -> View;
    fn mount_id(&self) -> u64;
    fn input_mode(&self) -> InputMode;
    /// No modal, search box or field input is open.
    fn is_idle(&self) -> bool;
    fn is_loading(&self) -> bool;
    /// Records in the loaded collection, before filtering.
    fn record_count(&self) -> usize;
    fn start_refresh(&mut self, ctx: &ScreenContext<'_>);
    fn handle(&mut self, action: Action, ctx: &ScreenContext<'_>) -> Option<Notification>;
    /// Apply a spawned task's result. Results for other resources are
    /// dropped.
    fn complete(&mut self, completion: Completion) -> Option<Notification>;
    fn render(&self, f: &mut Frame<'_>, area: Rect, theme: &Theme);
}

pub struct Screen<R: ScreenRecord> {
    mount: u64,
    store: ListStore<R>,
    editing: EditingController<R>,
    cursor: usize,
    search: Option<String>,
    /// Value the choice filter currently pins.
    choice: Option<String>,
    form: FormState,
    lookups: Option<Arc<dyn LookupSource>>,
    options: BTreeMap<Relation, Vec<FieldOption>>,
    options_pending: BTreeSet<Relation>,
}

impl<R: ScreenRecord> Screen<R> {
    pub fn new(client: Arc<dyn ResourceClient<R>>, page_size: NonZeroUsize, mount: u64) -> Self {
        debug!(resource = %R::KIND, mount, page_size = page_size.get(), "Screen mounted");
        Self {
            mount,
            store: ListStore::new(client, page_size),
            editing: EditingController::new(),
            cursor: 0,
            search: None,
            choice: None,
            form: FormState::default(),
            lookups: None,
            options: BTreeMap::new(),
            options_pending: BTreeSet::new(),
        }
    }

    /// Offer choices for bound form fields from `lookups`.
    pub fn with_lookups(mut self, lookups: Arc<dyn LookupSource>) -> Self {
        self.lookups = Some(lookups);
        self
    }

    pub fn store(&self) -> &ListStore<R> {
        &self.store
    }

    pub fn editing(&self) -> &EditingController<R> {
        &self.editing
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Search box contents while it has focus.
    pub fn search_input(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn selected(&self) -> Option<R> {
        self.store.page().get(self.cursor).map(|r| (*r).clone())
    }

    /// Fields shown by the open modal.
    pub fn form_fields(&self) -> &'static [FieldSpec] {
        match self.editing.mode() {
            Some(EditingMode::Creating) => R::creatable_fields(),
            Some(EditingMode::Editing { .. }) => R::editable_fields(),
            _ => &[],
        }
    }

    /// Binding of a field shown by the open form.
    pub fn binding(&self, field: &str) -> Option<FieldBinding> {
        if !self.form_fields().iter().any(|spec| spec.name == field) {
            return None;
        }
        R::field_bindings().iter().copied().find(|b| b.field == field)
    }

    /// Loaded choices for a bound form field.
    pub fn field_options(&self, field: &str) -> Option<&[FieldOption]> {
        let binding = self.binding(field)?;
        self.options.get(&binding.relation).map(Vec::as_slice)
    }

    /// Label of the option a bound field currently holds.
    pub fn option_label(&self, field: &str, value: &str) -> Option<&str> {
        let stores = self.binding(field)?.stores;
        self.field_options(field)?
            .iter()
            .find(|option| option.value(stores) == value)
            .map(|option| option.label.as_str())
    }

    /// Distinct values of the choice field across the loaded collection.
    pub fn choices(&self) -> Vec<String> {
        let Some(field) = R::choice_field() else {
            return Vec::new();
        };
        self.store
            .records()
            .iter()
            .flat_map(|record| record.field_values(field))
            .filter(|value| !value.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn choice(&self) -> Option<&str> {
        self.choice.as_deref()
    }

    fn clamp_cursor(&mut self) {
        let len = self.store.page_window().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    fn spawn_refresh(&mut self, ctx: &ScreenContext<'_>) {
        if self.store.is_loading() {
            debug!(resource = %R::KIND, "Refresh already in flight");
            return;
        }
        let ticket = self.store.refresh();
        let generation = ticket.generation();
        let events = ctx.events.clone();
        let mount = self.mount;
        tokio::spawn(async move {
            let result = ticket.wait().await;
            let completion = R::completion(Done::Refresh { generation, result });
            let _ = events.send(TuiEvent::Completed { mount, completion }).await;
        });
    }

    /// Fetch the choices of every relation the open form binds to, once per
    /// mount.
    fn load_options(&mut self, ctx: &ScreenContext<'_>) {
        let Some(lookups) = &self.lookups else {
            return;
        };
        let relations: BTreeSet<Relation> = self
            .form_fields()
            .iter()
            .filter_map(|spec| self.binding(spec.name))
            .map(|binding| binding.relation)
            .filter(|relation| {
                !self.options.contains_key(relation) && !self.options_pending.contains(relation)
            })
            .collect();
        for relation in relations {
            debug!(resource = %R::KIND, %relation, "Loading field options");
            self.options_pending.insert(relation);
            let lookups = Arc::clone(lookups);
            let events = ctx.events.clone();
            let mount = self.mount;
            tokio::spawn(async move {
                let result = lookups.options(relation).await;
                let completion = Completion::Options { relation, result };
                let _ = events.send(TuiEvent::Completed { mount, completion }).await;
            });
        }
    }

    fn apply_options(
        &mut self,
        relation: Relation,
        result: ClientResult<Vec<FieldOption>>,
    ) -> Option<Notification> {
        self.options_pending.remove(&relation);
        match result {
            Ok(options) => {
                debug!(resource = %R::KIND, %relation, count = options.len(), "Field options loaded");
                self.options.insert(relation, options);
                None
            }
            Err(err) => {
                warn!(resource = %R::KIND, %relation, error = %err, "Field options failed");
                Some(Notification::new(
                    NotificationLevel::Warning,
                    format!("Could not load {} to choose from: {}", relation, err),
                ))
            }
        }
    }

    /// Put the next (or previous) option into the selected bound field.
    fn pick_option(&mut self, forward: bool) {
        let Some(spec) = self.form_fields().get(self.form.field) else {
            return;
        };
        let Some(binding) = self.binding(spec.name) else {
            return;
        };
        let current = self
            .editing
            .session()
            .map(|session| session.draft().display(spec.name))
            .unwrap_or_default();
        let picked = self
            .options
            .get(&binding.relation)
            .and_then(|options| step_option(options, binding.stores, &current, forward))
            .map(|option| option.value(binding.stores).to_string());
        let Some(value) = picked else {
            return;
        };
        match self.editing.update_draft_field(spec.name, &value) {
            Ok(()) => self.form.error = None,
            Err(err) => self.form.error = Some(err.to_string()),
        }
    }

    fn spawn_submit(&mut self, ctx: &ScreenContext<'_>) -> Option<Notification> {
        let ticket = match self.editing.begin_submit() {
            Ok(ticket) => ticket,
            Err(err) => return Some(Notification::new(NotificationLevel::Warning, err.to_string())),
        };
        let client = Arc::clone(self.store.client());
        let events = ctx.events.clone();
        let mount = self.mount;
        tokio::spawn(async move {
            let result = ticket.plan.execute(client.as_ref()).await;
            let completion = R::completion(Done::Submit {
                token: ticket.token,
                result,
            });
            let _ = events.send(TuiEvent::Completed { mount, completion }).await;
        });
        None
    }

    fn apply_done(&mut self, done: Done<R>) -> Option<Notification> {
        match done {
            Done::Refresh { generation, result } => {
                match self.store.complete_refresh(generation, result) {
                    RefreshOutcome::Applied { count } => {
                        self.clamp_cursor();
                        info!(resource = %R::KIND, count, "Collection loaded");
                        None
                    }
                    RefreshOutcome::Failed(err) => {
                        warn!(resource = %R::KIND, error = %err, "Refresh failed");
                        let action = if err.is_retryable() {
                            NotificationAction::Retry(View::for_resource(R::KIND))
                        } else {
                            NotificationAction::Dismiss
                        };
                        Some(
                            Notification::new(
                                NotificationLevel::Error,
                                format!("Failed to load {}: {}", R::KIND.title(), err),
                            )
                            .with_action(action),
                        )
                    }
                    RefreshOutcome::Stale => None,
                }
            }
            Done::Submit { token, result } => {
                match self.editing.finish_submit(token, result, &mut self.store) {
                    SubmitOutcome::Completed(mutation) => {
                        self.form = FormState::default();
                        self.clamp_cursor();
                        Some(Notification::success(describe(&mutation)))
                    }
                    SubmitOutcome::Failed(err) => Some(Notification::error(format!(
                        "Failed to {} {}: {}",
                        self.editing
                            .session()
                            .map(|s| match s.mode() {
                                EditingMode::Creating => MutationKind::Create.verb(),
                                EditingMode::ConfirmingDelete { .. } => MutationKind::Delete.verb(),
                                _ => MutationKind::Update.verb(),
                            })
                            .unwrap_or("save"),
                        R::KIND.title().to_lowercase(),
                        err
                    ))),
                    SubmitOutcome::Discarded { patched: true } => {
                        self.clamp_cursor();
                        Some(Notification::new(
                            NotificationLevel::Info,
                            "An earlier change finished and was applied",
                        ))
                    }
                    SubmitOutcome::Discarded { patched: false } => None,
                }
            }
        }
    }

    fn handle_search(&mut self, action: Action) {
        let Some(buffer) = self.search.as_mut() else {
            return;
        };
        match action {
            Action::Input(c) => buffer.push(c),
            Action::Backspace => {
                buffer.pop();
            }
            Action::Confirm => {
                self.search = None;
                return;
            }
            Action::Cancel => {
                self.search = None;
                self.store.set_search("");
                self.cursor = 0;
                return;
            }
            _ => return,
        }
        let needle = buffer.clone();
        self.store.set_search(needle);
        self.cursor = 0;
    }

    fn handle_field_input(&mut self, action: Action) {
        let Some(buffer) = self.form.input.as_mut() else {
            return;
        };
        match action {
            Action::Input(c) => buffer.push(c),
            Action::Backspace => {
                buffer.pop();
            }
            Action::Cancel => {
                self.form.input = None;
                self.form.error = None;
            }
            Action::Confirm => {
                let raw = buffer.clone();
                let Some(spec) = self.form_fields().get(self.form.field) else {
                    self.form.input = None;
                    return;
                };
                match self.editing.update_draft_field(spec.name, &raw) {
                    Ok(()) => {
                        self.form.input = None;
                        self.form.error = None;
                    }
                    Err(err) => self.form.error = Some(err.to_string()),
                }
            }
            _ => {}
        }
    }

    fn handle_modal(&mut self, action: Action, ctx: &ScreenContext<'_>) -> Option<Notification> {
        let fields = self.form_fields().len();
        match action {
            Action::MoveDown if fields > 0 => {
                self.form.field = (self.form.field + 1) % fields;
            }
            Action::MoveUp if fields > 0 => {
                self.form.field = (self.form.field + fields - 1) % fields;
            }
            Action::NextPage => self.pick_option(true),
            Action::PrevPage => self.pick_option(false),
            Action::EditItem => {
                let viewing = match self.editing.mode() {
                    Some(EditingMode::Viewing { record }) => Some(record.clone()),
                    _ => None,
                };
                if let Some(record) = viewing {
                    return self.open_edit(record, ctx);
                }
                let accepts = self
                    .editing
                    .session()
                    .is_some_and(|s| s.mode().accepts_draft() && !s.is_in_flight());
                if accepts {
                    if let (Some(spec), Some(session)) =
                        (self.form_fields().get(self.form.field), self.editing.session())
                    {
                        self.form.input = Some(session.draft().display(spec.name));
                        self.form.error = None;
                    }
                }
            }
            Action::Confirm => {
                let submittable = self
                    .editing
                    .mode()
                    .is_some_and(|mode| mode.can_submit());
                if submittable {
                    return self.spawn_submit(ctx);
                }
            }
            Action::Cancel => {
                let _ = self.editing.cancel();
                self.form = FormState::default();
            }
            _ => {}
        }
        None
    }

    fn open_edit(&mut self, record: R, ctx: &ScreenContext<'_>) -> Option<Notification> {
        if !self.store.supports(MutationKind::Update) {
            return Some(unsupported::<R>(MutationKind::Update));
        }
        self.editing.open_edit(record);
        self.form = FormState::default();
        self.load_options(ctx);
        None
    }

    fn cycle_choice(&mut self) -> Option<Notification> {
        let Some(field) = R::choice_field() else {
            return Some(Notification::new(
                NotificationLevel::Info,
                format!("{} has no choice filter", R::KIND.title()),
            ));
        };
        // Step from the pinned value, so a reload that adds or drops
        // values never shifts the filter onto a different one.
        let mut choices = self.choices().into_iter();
        let next = match self.choice.as_deref() {
            None => choices.next(),
            Some(current) => choices.find(|value| value == current).and_then(|_| choices.next()),
        };
        self.cursor = 0;
        match &next {
            Some(value) => self.store.set_filter(
                FilterCriteria::new().with(CHOICE_KEY, Predicate::equals(field, value.clone())),
            ),
            None => self.store.remove_filter(CHOICE_KEY),
        }
        self.choice = next;
        None
    }

    fn handle_list(&mut self, action: Action, ctx: &ScreenContext<'_>) -> Option<Notification> {
        match action {
            Action::MoveDown => {
                let len = self.store.page_window().len();
                if len > 0 {
                    self.cursor = (self.cursor + 1).min(len - 1);
                }
            }
            Action::MoveUp => self.cursor = self.cursor.saturating_sub(1),
            Action::NextPage => {
                self.store.next_page();
                self.cursor = 0;
            }
            Action::PrevPage => {
                self.store.prev_page();
                self.cursor = 0;
            }
            Action::OpenSearch => self.search = Some(self.store.search_text().to_string()),
            Action::CycleFilter => return self.cycle_choice(),
            Action::ClearFilter => {
                self.store.clear_filter();
                self.choice = None;
                self.cursor = 0;
            }
            Action::ViewItem | Action::Confirm => {
                if let Some(record) = self.selected() {
                    self.editing.open_view(record);
                }
            }
            Action::EditItem => {
                if let Some(record) = self.selected() {
                    return self.open_edit(record, ctx);
                }
            }
            Action::NewItem => {
                if !self.store.supports(MutationKind::Create) {
                    return Some(unsupported::<R>(MutationKind::Create));
                }
                self.editing.open_create();
                self.form = FormState::default();
                self.load_options(ctx);
            }
            Action::DeleteItem => {
                if !self.store.supports(MutationKind::Delete) {
                    return Some(unsupported::<R>(MutationKind::Delete));
                }
                if let Some(record) = self.selected() {
                    self.editing
                        .open_delete_confirm(record.id().clone(), record.display_name());
                }
            }
            Action::Refresh => self.spawn_refresh(ctx),
            Action::Export => return Some(self.export(ctx.export_dir)),
            _ => {}
        }
        None
    }

    /// Write the filtered view as CSV into `dir`.
    pub fn export_to(&self, dir: &Path) -> Result<(PathBuf, usize), crate::error::TuiError> {
        let records = self.store.filtered();
        let artifact = Exporter::export(&records, &ExportRequest::new(ExportFormat::Csv))?;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&artifact.filename);
        std::fs::write(&path, &artifact.data)?;
        info!(
            resource = %R::KIND,
            path = %path.display(),
            rows = artifact.row_count,
            bytes = artifact.size_bytes(),
            "Export written"
        );
        Ok((path, artifact.row_count))
    }

    fn export(&self, dir: &Path) -> Notification {
        match self.export_to(dir) {
            Ok((path, rows)) => {
                Notification::success(format!("Exported {} rows to {}", rows, path.display()))
            }
            Err(err) => {
                warn!(resource = %R::KIND, error = %err, "Export failed");
                Notification::error(format!("Export failed: {}", err))
            }
        }
    }
}

impl<R: ScreenRecord> ScreenOps for Screen<R> {
    fn view(&self) -> View {
        View::for_resource(R::KIND)
    }

    fn mount_id(&self) -> u64 {
        self.mount
    }

    fn input_mode(&self) -> InputMode {
        if self.search.is_some() || self.form.input.is_some() {
            InputMode::Text
        } else {
            InputMode::Normal
        }
    }

    fn is_idle(&self) -> bool {
        self.search.is_none() && self.form.input.is_none() && !self.editing.is_open()
    }

    fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    fn record_count(&self) -> usize {
        self.store.records().len()
    }

    fn start_refresh(&mut self, ctx: &ScreenContext<'_>) {
        self.spawn_refresh(ctx);
    }

    fn handle(&mut self, action: Action, ctx: &ScreenContext<'_>) -> Option<Notification> {
        if self.search.is_some() {
            self.handle_search(action);
            None
        } else if self.form.input.is_some() {
            self.handle_field_input(action);
            None
        } else if self.editing.is_open() {
            self.handle_modal(action, ctx)
        } else {
            self.handle_list(action, ctx)
        }
    }

    fn complete(&mut self, completion: Completion) -> Option<Notification> {
        if let Completion::Options { relation, result } = completion {
            return self.apply_options(relation, result);
        }
        match R::extract(completion) {
            Ok(done) => self.apply_done(done),
            Err(other) => {
                debug!(resource = %R::KIND, completion = ?other, "Dropping result for another screen");
                None
            }
        }
    }

    fn render(&self, f: &mut Frame<'_>, area: Rect, theme: &Theme) {
        views::list::render(f, self, area, theme);
        if self.editing.is_open() {
            views::modal::render(f, self, area, theme);
        }
    }
}

fn unsupported<R: ScreenRecord>(kind: MutationKind) -> Notification {
    Notification::new(
        NotificationLevel::Info,
        format!("{} cannot {} records", R::KIND.title(), kind.verb()),
    )
}

fn describe<R: ScreenRecord>(mutation: &Mutation<R>) -> String {
    let subject = match mutation {
        Mutation::Created(record) | Mutation::Updated(record) => record.display_name(),
        Mutation::Patched { id, .. } | Mutation::Deleted(id) => id.to_string(),
    };
    format!("{} {}", subject, mutation.kind().past_tense())
}
