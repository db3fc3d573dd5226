//! The modal editing state machine.
//!
//! At most one [`EditingSession`] is open at a time; opening another modal
//! replaces it. Submission is split into [`EditingController::begin_submit`]
//! and [`EditingController::finish_submit`] so the network call can run off
//! the interaction loop. Every session carries a fresh [`SessionToken`]; a
//! result whose token no longer matches the open session is late and does not
//! touch the modal.

use crate::draft::Draft;
use crate::error::{ClientError, ClientResult, EditError};
use crate::identity::RecordId;
use crate::record::Record;
use crate::remote::{Mutation, MutationPlan};
use crate::store::ListStore;
use tracing::debug;

/// Identifies one opened modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(u64);

/// Which modal is open and what it targets.
#[derive(Debug, Clone, PartialEq)]
pub enum EditingMode<R> {
    Viewing { record: R },
    Editing { record: R },
    Creating,
    ConfirmingDelete { id: RecordId, label: String },
}

impl<R: Record> EditingMode<R> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Viewing { .. } => "viewing",
            Self::Editing { .. } => "editing",
            Self::Creating => "creating",
            Self::ConfirmingDelete { .. } => "confirming delete",
        }
    }

    pub fn target_id(&self) -> Option<&RecordId> {
        match self {
            Self::Viewing { record } | Self::Editing { record } => Some(record.id()),
            Self::Creating => None,
            Self::ConfirmingDelete { id, .. } => Some(id),
        }
    }

    pub fn accepts_draft(&self) -> bool {
        matches!(self, Self::Editing { .. } | Self::Creating)
    }

    pub fn can_submit(&self) -> bool {
        !matches!(self, Self::Viewing { .. })
    }
}

/// The open modal.
#[derive(Debug, Clone)]
pub struct EditingSession<R> {
    token: SessionToken,
    mode: EditingMode<R>,
    draft: Draft,
    in_flight: bool,
    last_error: Option<ClientError>,
}

impl<R: Record> EditingSession<R> {
    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn mode(&self) -> &EditingMode<R> {
        &self.mode
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    /// Server validation message for one draft field.
    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.last_error.as_ref().and_then(|e| e.field_error(field))
    }

    pub fn target_id(&self) -> Option<&RecordId> {
        self.mode.target_id()
    }

    /// The target vanished server-side; only `cancel()` is left.
    pub fn is_target_missing(&self) -> bool {
        self.last_error
            .as_ref()
            .is_some_and(ClientError::is_not_found)
    }
}

/// A submission that has been started and must be finished with the same
/// token.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitTicket {
    pub token: SessionToken,
    pub plan: MutationPlan,
}

/// How a finished submission affected the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<R> {
    /// The mutation succeeded, was patched into the store, and the modal closed.
    Completed(Mutation<R>),
    /// The mutation failed; the modal is still open with `last_error` set.
    Failed(ClientError),
    /// The session this result belonged to is gone. `patched` says whether a
    /// successful mutation was still applied to the store.
    Discarded { patched: bool },
}

pub struct EditingController<R> {
    session: Option<EditingSession<R>>,
    next_token: u64,
}

impl<R: Record> Default for EditingController<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> EditingController<R> {
    pub fn new() -> Self {
        Self {
            session: None,
            next_token: 0,
        }
    }

    pub fn session(&self) -> Option<&EditingSession<R>> {
        self.session.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn mode(&self) -> Option<&EditingMode<R>> {
        self.session.as_ref().map(|s| &s.mode)
    }

    pub fn open_view(&mut self, record: R) -> SessionToken {
        let draft = Draft::snapshot(&record);
        self.open(EditingMode::Viewing { record }, draft)
    }

    pub fn open_edit(&mut self, record: R) -> SessionToken {
        let draft = Draft::editable(&record);
        self.open(EditingMode::Editing { record }, draft)
    }

    pub fn open_create(&mut self) -> SessionToken {
        self.open(EditingMode::Creating, Draft::new())
    }

    pub fn open_delete_confirm(&mut self, id: RecordId, label: impl Into<String>) -> SessionToken {
        let label = label.into();
        self.open(EditingMode::ConfirmingDelete { id, label }, Draft::new())
    }

    fn open(&mut self, mode: EditingMode<R>, draft: Draft) -> SessionToken {
        if let Some(previous) = self.session.take() {
            debug!(
                resource = %R::KIND,
                mode = previous.mode.name(),
                in_flight = previous.in_flight,
                "Force-closing modal"
            );
        }
        self.next_token += 1;
        let token = SessionToken(self.next_token);
        debug!(resource = %R::KIND, mode = mode.name(), "Modal opened");
        self.session = Some(EditingSession {
            token,
            mode,
            draft,
            in_flight: false,
            last_error: None,
        });
        token
    }

    /// Coerce and store one draft field.
    pub fn update_draft_field(&mut self, name: &str, raw: &str) -> Result<(), EditError> {
        let session = self.session.as_mut().ok_or(EditError::NoSession)?;
        if !session.mode.accepts_draft() {
            return Err(EditError::InvalidState {
                operation: "edit a field",
                mode: session.mode.name(),
            });
        }
        if session.in_flight {
            return Err(EditError::AlreadyInFlight);
        }
        let creating = matches!(session.mode, EditingMode::Creating);
        let spec = R::field_spec(name, creating).ok_or_else(|| EditError::UnknownField {
            field: name.to_string(),
        })?;
        session.draft.set(spec, raw)
    }

    /// Mark the session in flight and hand out the mutation to send.
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, EditError> {
        let session = self.session.as_mut().ok_or(EditError::NoSession)?;
        if !session.mode.can_submit() {
            return Err(EditError::InvalidState {
                operation: "submit",
                mode: session.mode.name(),
            });
        }
        if session.in_flight {
            return Err(EditError::AlreadyInFlight);
        }
        if let Some(ClientError::NotFound { id }) = &session.last_error {
            return Err(EditError::TargetMissing { id: id.clone() });
        }

        let plan = match &session.mode {
            EditingMode::Editing { record } => MutationPlan::Update {
                id: record.id().clone(),
                draft: session.draft.clone(),
            },
            EditingMode::Creating => MutationPlan::Create {
                draft: session.draft.clone(),
            },
            EditingMode::ConfirmingDelete { id, .. } => MutationPlan::Delete { id: id.clone() },
            EditingMode::Viewing { .. } => {
                return Err(EditError::InvalidState {
                    operation: "submit",
                    mode: session.mode.name(),
                })
            }
        };
        session.in_flight = true;
        session.last_error = None;
        debug!(resource = %R::KIND, kind = %plan.kind(), "Submit started");
        Ok(SubmitTicket {
            token: session.token,
            plan,
        })
    }

    /// Apply the result of a submission started with `begin_submit`.
    pub fn finish_submit(
        &mut self,
        token: SessionToken,
        result: ClientResult<Mutation<R>>,
        store: &mut ListStore<R>,
    ) -> SubmitOutcome<R> {
        let current = self
            .session
            .as_ref()
            .is_some_and(|s| s.token == token && s.in_flight);

        match result {
            Ok(mutation) => {
                // The server has applied it either way; mirror it locally.
                store.apply_mutation(mutation.clone());
                if current {
                    self.session = None;
                    debug!(resource = %R::KIND, kind = %mutation.kind(), id = %mutation.id(), "Submit completed");
                    SubmitOutcome::Completed(mutation)
                } else {
                    debug!(resource = %R::KIND, id = %mutation.id(), "Late submit result patched");
                    SubmitOutcome::Discarded { patched: true }
                }
            }
            Err(err) => {
                let Some(session) = self.session.as_mut().filter(|_| current) else {
                    debug!(resource = %R::KIND, error = %err, "Late submit failure dropped");
                    return SubmitOutcome::Discarded { patched: false };
                };
                debug!(resource = %R::KIND, error = %err, "Submit failed");
                session.in_flight = false;
                session.last_error = Some(err.clone());
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Submit through the store's client and apply the result.
    pub async fn submit(&mut self, store: &mut ListStore<R>) -> Result<SubmitOutcome<R>, EditError> {
        let ticket = self.begin_submit()?;
        let client = store.client().clone();
        let result = ticket.plan.execute(client.as_ref()).await;
        Ok(self.finish_submit(ticket.token, result, store))
    }

    /// Close the open modal, discarding the draft. No network call.
    pub fn cancel(&mut self) -> Result<(), EditError> {
        let session = self.session.take().ok_or(EditError::NoSession)?;
        debug!(resource = %R::KIND, mode = session.mode.name(), "Modal cancelled");
        Ok(())
    }
}
