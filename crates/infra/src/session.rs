//! Document session: staged writes, identity map, specification queries.
//!
//! A session is the working memory of one unit of work. Mutations are staged
//! as [`PendingOp`]s and reach the backend only when [`DocumentSession::save_changes`]
//! commits the whole batch atomically. Reads follow document-session rules:
//!
//! - `load` sees staged writes first (read-your-writes), then the identity
//!   map, then the backend; backend hits are registered in the identity map.
//! - `query` always reads the backend; staged, uncommitted changes are never
//!   visible to specification queries. Tracked query results are registered
//!   as identity-map snapshots; `untracked()` queries leave no trace.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value as JsonValue;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use uuid::Uuid;

use shopforge_core::{ExpectedRevision, Specification, evaluate};

use crate::document_store::{
    DocumentBackend, DocumentEntity, PendingOp, StoreError, stamp_revision,
};

#[derive(Default)]
struct SessionState {
    /// At most one pending operation per document; restaging replaces the
    /// earlier operation in place, preserving batch order.
    pending: Vec<PendingOp>,
    /// Snapshots of documents observed from the backend, per doc type.
    identity: HashMap<&'static str, HashMap<Uuid, JsonValue>>,
}

/// Working memory of one unit of work over a [`DocumentBackend`].
pub struct DocumentSession {
    backend: Arc<dyn DocumentBackend>,
    state: Mutex<SessionState>,
}

impl DocumentSession {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            backend,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Number of staged operations awaiting `save_changes`.
    pub fn pending_op_count(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.pending.len())
            .unwrap_or(0)
    }

    /// Stage a first save. The commit expects no document to exist yet and
    /// writes revision 1.
    pub fn stage_insert<T: DocumentEntity>(&self, entity: &T) -> Result<(), StoreError> {
        let body = serde_json::to_value(entity)?;
        self.stage(PendingOp::Upsert {
            doc_type: T::DOC_TYPE,
            id: entity.document_id(),
            expected: ExpectedRevision::NoDocument,
            body,
        })
    }

    /// Stage an update guarded by the entity's loaded revision.
    ///
    /// A never-saved instance stages `Exact(0)`, which no stored document
    /// satisfies; the commit reports it as a conflict.
    pub fn stage_update<T: DocumentEntity>(&self, entity: &T) -> Result<(), StoreError> {
        let body = serde_json::to_value(entity)?;
        self.stage(PendingOp::Upsert {
            doc_type: T::DOC_TYPE,
            id: entity.document_id(),
            expected: ExpectedRevision::Exact(entity.document_revision()),
            body,
        })
    }

    /// Stage a deletion. Deleting a missing document is a no-op at commit.
    pub fn stage_delete<T: DocumentEntity>(&self, entity: &T) -> Result<(), StoreError> {
        self.stage_delete_by_id::<T>(entity.document_id())
    }

    pub fn stage_delete_by_id<T: DocumentEntity>(&self, id: Uuid) -> Result<(), StoreError> {
        self.stage(PendingOp::Delete {
            doc_type: T::DOC_TYPE,
            id,
        })
    }

    fn stage(&self, op: PendingOp) -> Result<(), StoreError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        let slot = state
            .pending
            .iter_mut()
            .find(|pending| pending.doc_type() == op.doc_type() && pending.id() == op.id());
        match slot {
            Some(pending) => *pending = op,
            None => state.pending.push(op),
        }
        Ok(())
    }

    /// Load one document by id.
    ///
    /// Staged upserts are visible (and staged deletes hide the document)
    /// before the identity map and the backend are consulted.
    pub async fn load<T: DocumentEntity>(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Option<T>, StoreError> {
        {
            let state = self
                .state
                .lock()
                .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

            for op in &state.pending {
                if op.doc_type() != T::DOC_TYPE || op.id() != id {
                    continue;
                }
                return match op {
                    PendingOp::Upsert { body, .. } => {
                        Ok(Some(serde_json::from_value(body.clone())?))
                    }
                    PendingOp::Delete { .. } => Ok(None),
                };
            }

            if let Some(body) = state
                .identity
                .get(T::DOC_TYPE)
                .and_then(|documents| documents.get(&id))
            {
                return Ok(Some(serde_json::from_value(body.clone())?));
            }
        }

        match self.backend.load(T::DOC_TYPE, id, cancel).await? {
            Some(document) => {
                let entity: T = serde_json::from_value(document.body.clone())?;
                let mut state = self
                    .state
                    .lock()
                    .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
                state
                    .identity
                    .entry(T::DOC_TYPE)
                    .or_default()
                    .insert(id, document.body);
                Ok(Some(entity))
            }
            None => Ok(None),
        }
    }

    /// Evaluate a specification against the backend's documents.
    pub async fn query<T: DocumentEntity>(
        &self,
        spec: Specification<T>,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>, StoreError> {
        let documents = self.backend.load_all(T::DOC_TYPE, cancel).await?;
        let mut entities = Vec::with_capacity(documents.len());
        for document in documents {
            entities.push(serde_json::from_value(document.body)?);
        }

        let results = evaluate(entities, &spec)?;

        if spec.is_tracked() {
            let mut state = self
                .state
                .lock()
                .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
            let identity = state.identity.entry(T::DOC_TYPE).or_default();
            for entity in &results {
                identity.insert(entity.document_id(), serde_json::to_value(entity)?);
            }
        }

        Ok(results)
    }

    /// Count backend documents matching the specification's filter.
    /// Ordering and paging are ignored; `None` counts everything.
    pub async fn count<T: DocumentEntity>(
        &self,
        spec: Option<&Specification<T>>,
        cancel: &CancellationToken,
    ) -> Result<usize, StoreError> {
        let documents = self.backend.load_all(T::DOC_TYPE, cancel).await?;
        let mut count = 0;
        for document in documents {
            let entity: T = serde_json::from_value(document.body)?;
            if spec.is_none_or(|spec| spec.matches(&entity)) {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Whether any backend document matches the specification's filter.
    pub async fn exists<T: DocumentEntity>(
        &self,
        spec: &Specification<T>,
        cancel: &CancellationToken,
    ) -> Result<bool, StoreError> {
        let documents = self.backend.load_all(T::DOC_TYPE, cancel).await?;
        for document in documents {
            let entity: T = serde_json::from_value(document.body)?;
            if spec.matches(&entity) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Commit all staged operations in one atomic batch.
    ///
    /// On success the batch is cleared and the identity map is refreshed with
    /// the revisions the backend stamped. On failure nothing was applied and
    /// the batch is dropped; a session is scoped to one unit of work and is
    /// not retried.
    #[instrument(skip(self, cancel), fields(op_count), err)]
    pub async fn save_changes(&self, cancel: &CancellationToken) -> Result<(), StoreError> {
        let ops = {
            let mut state = self
                .state
                .lock()
                .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
            std::mem::take(&mut state.pending)
        };
        tracing::Span::current().record("op_count", ops.len());
        if ops.is_empty() {
            return Ok(());
        }

        // Mirror the revisions the backend will stamp, applied only after the
        // commit succeeds.
        let mut refreshed: Vec<(&'static str, Uuid, Option<JsonValue>)> =
            Vec::with_capacity(ops.len());
        for op in &ops {
            match op {
                PendingOp::Upsert {
                    doc_type,
                    id,
                    expected,
                    body,
                } => {
                    let mut body = body.clone();
                    stamp_revision(&mut body, expected.next());
                    refreshed.push((doc_type, *id, Some(body)));
                }
                PendingOp::Delete { doc_type, id } => refreshed.push((doc_type, *id, None)),
            }
        }

        self.backend.commit(ops, cancel).await?;

        let mut state = self
            .state
            .lock()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        for (doc_type, id, body) in refreshed {
            match body {
                Some(body) => {
                    state.identity.entry(doc_type).or_default().insert(id, body);
                }
                None => {
                    if let Some(documents) = state.identity.get_mut(doc_type) {
                        documents.remove(&id);
                    }
                }
            }
        }
        Ok(())
    }
}
