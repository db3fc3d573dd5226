//! Remote collection access.
//!
//! [`ResourceClient`] is the seam between the list-management core and the
//! transport. Implementations classify failures into [`ClientError`] and never
//! touch local state; the store and the editing controller decide what to do
//! with the outcome.

use crate::draft::Draft;
use crate::error::{ClientError, ClientResult};
use crate::identity::RecordId;
use crate::record::Record;
use async_trait::async_trait;
use std::fmt;

/// Typed list/create/update/delete access to one resource endpoint.
#[async_trait]
pub trait ResourceClient<R: Record>: Send + Sync {
    /// Fetch the whole collection in server order. Idempotent.
    async fn list(&self) -> ClientResult<Vec<R>>;

    /// Create a record from a partial payload. Never retried implicitly.
    async fn create(&self, draft: &Draft) -> ClientResult<R>;

    /// Update a record; the server owns computed fields. `None` means the
    /// server acknowledged the change without echoing the record.
    async fn update(&self, id: &RecordId, draft: &Draft) -> ClientResult<Option<R>>;

    async fn delete(&self, id: &RecordId) -> ClientResult<()>;

    /// Whether the endpoint offers this kind of mutation at all.
    fn supports(&self, kind: MutationKind) -> bool {
        let _ = kind;
        true
    }
}

/// The three mutation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            Self::Create => "created",
            Self::Update => "updated",
            Self::Delete => "deleted",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// A confirmed remote mutation, ready to be patched into a store.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<R> {
    Created(R),
    Updated(R),
    /// An update the server acknowledged without returning the record; the
    /// draft is laid over the loaded copy.
    Patched { id: RecordId, draft: Draft },
    Deleted(RecordId),
}

impl<R: Record> Mutation<R> {
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Created(_) => MutationKind::Create,
            Self::Updated(_) | Self::Patched { .. } => MutationKind::Update,
            Self::Deleted(_) => MutationKind::Delete,
        }
    }

    pub fn id(&self) -> &RecordId {
        match self {
            Self::Created(record) | Self::Updated(record) => record.id(),
            Self::Patched { id, .. } | Self::Deleted(id) => id,
        }
    }
}

/// A mutation the editing controller has decided to send.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationPlan {
    Create { draft: Draft },
    Update { id: RecordId, draft: Draft },
    Delete { id: RecordId },
}

impl MutationPlan {
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Create { .. } => MutationKind::Create,
            Self::Update { .. } => MutationKind::Update,
            Self::Delete { .. } => MutationKind::Delete,
        }
    }

    pub fn target(&self) -> Option<&RecordId> {
        match self {
            Self::Create { .. } => None,
            Self::Update { id, .. } | Self::Delete { id } => Some(id),
        }
    }

    /// Send the plan through a client. Unsupported operations fail without
    /// touching the network.
    pub async fn execute<R: Record>(
        &self,
        client: &dyn ResourceClient<R>,
    ) -> ClientResult<Mutation<R>> {
        if !client.supports(self.kind()) {
            return Err(ClientError::Unsupported {
                resource: R::KIND,
                operation: self.kind().verb(),
            });
        }
        match self {
            Self::Create { draft } => client.create(draft).await.map(Mutation::Created),
            Self::Update { id, draft } => {
                let updated = client.update(id, draft).await?;
                Ok(match updated {
                    Some(record) => Mutation::Updated(record),
                    None => Mutation::Patched {
                        id: id.clone(),
                        draft: draft.clone(),
                    },
                })
            }
            Self::Delete { id } => client
                .delete(id)
                .await
                .map(|()| Mutation::Deleted(id.clone())),
        }
    }
}
