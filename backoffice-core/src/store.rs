//! The list state store.
//!
//! One store per mounted screen. It owns the last fetched collection, the
//! loading and error flags, the filter criteria and the page position, and
//! derives the filtered view and page window on every read.
//!
//! Refreshes are split in two so the caller can drive the network future
//! wherever it likes (inline, or on a spawned task feeding an event loop):
//! [`ListStore::refresh`] hands out a [`RefreshTicket`] and
//! [`ListStore::complete_refresh`] applies its result. While a refresh is in
//! flight every further `refresh()` returns a clone of the same ticket.
//! Mutations patched in while a refresh is in flight are replayed over its
//! result, since the server may have answered `list()` before they landed.

use crate::draft::Draft;
use crate::error::{ClientError, ClientResult};
use crate::filter::{FilterCriteria, Predicate};
use crate::identity::RecordId;
use crate::paging::{PageRequest, PageWindow};
use crate::record::Record;
use crate::remote::{Mutation, MutationKind, ResourceClient};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::debug;

/// Filter key used by the screen's free-text search box.
pub const SEARCH_KEY: &str = "search";

type SharedList<R> = Shared<BoxFuture<'static, ClientResult<Arc<Vec<R>>>>>;

/// Handle on an in-flight refresh. Cloning shares the same network call.
#[derive(Clone)]
pub struct RefreshTicket<R: Record> {
    generation: u64,
    future: SharedList<R>,
}

impl<R: Record> RefreshTicket<R> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait for the shared `list()` call.
    pub async fn wait(self) -> ClientResult<Arc<Vec<R>>> {
        self.future.await
    }
}

impl<R: Record> std::fmt::Debug for RefreshTicket<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTicket")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// What applying a refresh result did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The collection was replaced.
    Applied { count: usize },
    /// The fetch failed; the previous collection is still served.
    Failed(ClientError),
    /// The result belongs to a refresh that was already applied or was
    /// superseded by `reset()`; it was dropped.
    Stale,
}

pub struct ListStore<R: Record> {
    client: Arc<dyn ResourceClient<R>>,
    collection: Vec<R>,
    loading: bool,
    loaded: bool,
    error: Option<ClientError>,
    criteria: FilterCriteria,
    page: PageRequest,
    generation: u64,
    in_flight: Option<RefreshTicket<R>>,
    /// Mutations applied since the in-flight refresh started.
    replay: Vec<Mutation<R>>,
}

impl<R: Record> ListStore<R> {
    pub fn new(client: Arc<dyn ResourceClient<R>>, page_size: NonZeroUsize) -> Self {
        Self {
            client,
            collection: Vec::new(),
            loading: false,
            loaded: false,
            error: None,
            criteria: FilterCriteria::new(),
            page: PageRequest::new(page_size),
            generation: 0,
            in_flight: None,
            replay: Vec::new(),
        }
    }

    pub fn client(&self) -> &Arc<dyn ResourceClient<R>> {
        &self.client
    }

    pub fn supports(&self, kind: MutationKind) -> bool {
        self.client.supports(kind)
    }

    /// The collection as last fetched, in server order.
    pub fn records(&self) -> &[R] {
        &self.collection
    }

    pub fn find(&self, id: &RecordId) -> Option<&R> {
        self.collection.iter().find(|r| r.id() == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether any fetch has succeeded since creation or the last reset.
    pub fn has_loaded(&self) -> bool {
        self.loaded
    }

    pub fn error(&self) -> Option<&ClientError> {
        self.error.as_ref()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a refresh, or join the one already in flight.
    pub fn refresh(&mut self) -> RefreshTicket<R> {
        if let Some(ticket) = &self.in_flight {
            debug!(resource = %R::KIND, generation = ticket.generation, "Joining in-flight refresh");
            return ticket.clone();
        }

        self.generation += 1;
        self.loading = true;
        let client = Arc::clone(&self.client);
        let future = async move { client.list().await.map(Arc::new) }
            .boxed()
            .shared();
        let ticket = RefreshTicket {
            generation: self.generation,
            future,
        };
        debug!(resource = %R::KIND, generation = self.generation, "Refresh started");
        self.in_flight = Some(ticket.clone());
        self.replay.clear();
        ticket
    }

    /// Apply the result of a refresh started by [`ListStore::refresh`].
    pub fn complete_refresh(
        &mut self,
        generation: u64,
        result: ClientResult<Arc<Vec<R>>>,
    ) -> RefreshOutcome {
        match &self.in_flight {
            Some(ticket) if ticket.generation == generation => {}
            _ => {
                debug!(resource = %R::KIND, generation, "Dropping stale refresh result");
                return RefreshOutcome::Stale;
            }
        }
        self.in_flight = None;
        self.loading = false;
        let replay = std::mem::take(&mut self.replay);

        match result {
            Ok(records) => {
                self.collection = Arc::try_unwrap(records).unwrap_or_else(|shared| (*shared).clone());
                let replayed = replay.len();
                for mutation in replay {
                    self.patch_in(mutation);
                }
                self.loaded = true;
                self.error = None;
                self.clamp_page();
                debug!(
                    resource = %R::KIND,
                    count = self.collection.len(),
                    replayed,
                    "Collection replaced"
                );
                RefreshOutcome::Applied {
                    count: self.collection.len(),
                }
            }
            Err(err) => {
                debug!(resource = %R::KIND, error = %err, kept = self.collection.len(), "Refresh failed");
                self.error = Some(err.clone());
                RefreshOutcome::Failed(err)
            }
        }
    }

    /// Refresh and apply in one step.
    pub async fn refresh_now(&mut self) -> RefreshOutcome {
        let ticket = self.refresh();
        let generation = ticket.generation();
        let result = ticket.wait().await;
        self.complete_refresh(generation, result)
    }

    /// Merge criteria into the current filter and go back to page 1.
    pub fn set_filter(&mut self, criteria: FilterCriteria) {
        self.criteria.merge(criteria);
        self.page.reset();
    }

    /// Set the free-text search over the resource's search fields.
    pub fn set_search(&mut self, needle: impl Into<String>) {
        let predicate = Predicate::contains(R::search_fields().iter().copied(), needle);
        self.set_filter(FilterCriteria::new().with(SEARCH_KEY, predicate));
    }

    pub fn search_text(&self) -> &str {
        match self.criteria.get(SEARCH_KEY) {
            Some(Predicate::Contains { needle, .. }) => needle,
            _ => "",
        }
    }

    /// Drop one criterion and go back to page 1.
    pub fn remove_filter(&mut self, key: &str) {
        if self.criteria.remove(key).is_some() {
            self.page.reset();
        }
    }

    pub fn clear_filter(&mut self) {
        self.criteria.clear();
        self.page.reset();
    }

    /// The filtered view: matching records in collection order.
    pub fn filtered(&self) -> Vec<&R> {
        self.criteria.apply(&self.collection)
    }

    pub fn page_window(&self) -> PageWindow {
        self.page.window(self.filtered().len())
    }

    /// Records on the current page.
    pub fn page(&self) -> Vec<&R> {
        let filtered = self.filtered();
        let window = self.page.window(filtered.len());
        window.slice(&filtered).to_vec()
    }

    pub fn page_size(&self) -> usize {
        self.page.page_size()
    }

    pub fn set_page(&mut self, page_index: usize) {
        let total = self.filtered().len();
        self.page.go_to(page_index, total);
    }

    pub fn next_page(&mut self) {
        let total = self.filtered().len();
        self.page.next(total);
    }

    pub fn prev_page(&mut self) {
        let total = self.filtered().len();
        self.page.previous(total);
    }

    pub fn set_page_size(&mut self, page_size: NonZeroUsize) {
        let total = self.filtered().len();
        self.page.set_page_size(page_size, total);
    }

    /// Patch a confirmed remote mutation into the collection.
    ///
    /// Returns whether the collection changed. Updates and deletes of ids
    /// that are not loaded are no-ops.
    pub fn apply_mutation(&mut self, mutation: Mutation<R>) -> bool {
        if self.in_flight.is_some() {
            self.replay.push(mutation.clone());
        }
        let changed = self.patch_in(mutation);
        if changed {
            self.clamp_page();
        }
        changed
    }

    /// Every arm is idempotent, so replaying over a list that already
    /// reflects the mutation changes nothing.
    fn patch_in(&mut self, mutation: Mutation<R>) -> bool {
        match mutation {
            Mutation::Created(record) => {
                match self.position(record.id()) {
                    Some(index) => self.collection[index] = record,
                    None => self.collection.push(record),
                }
                true
            }
            Mutation::Updated(record) => match self.position(record.id()) {
                Some(index) => {
                    self.collection[index] = record;
                    true
                }
                None => false,
            },
            Mutation::Patched { id, draft } => {
                let patched = self
                    .position(&id)
                    .and_then(|index| Some((index, patch(&self.collection[index], &draft)?)));
                match patched {
                    Some((index, record)) => {
                        self.collection[index] = record;
                        true
                    }
                    None => false,
                }
            }
            Mutation::Deleted(id) => match self.position(&id) {
                Some(index) => {
                    self.collection.remove(index);
                    true
                }
                None => false,
            },
        }
    }

    /// Forget everything and invalidate any refresh still in flight.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.in_flight = None;
        self.replay.clear();
        self.collection.clear();
        self.loading = false;
        self.loaded = false;
        self.error = None;
        self.criteria.clear();
        self.page.reset();
    }

    fn position(&self, id: &RecordId) -> Option<usize> {
        self.collection.iter().position(|r| r.id() == id)
    }

    fn clamp_page(&mut self) {
        let total = self.filtered().len();
        self.page.clamp(total);
    }
}

/// Lay a submitted draft over the loaded record. `None` if the result no
/// longer decodes, in which case the record is left as loaded.
fn patch<R: Record>(current: &R, draft: &Draft) -> Option<R> {
    let Ok(Value::Object(mut object)) = serde_json::to_value(current) else {
        return None;
    };
    if let Value::Object(fields) = draft.to_json() {
        object.extend(fields);
    }
    match serde_json::from_value(Value::Object(object)) {
        Ok(record) => Some(record),
        Err(err) => {
            debug!(resource = %R::KIND, id = %current.id(), error = %err, "Draft does not patch cleanly");
            None
        }
    }
}
