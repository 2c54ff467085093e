//! In-memory document store for tests and development.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::backend::{DocumentBackend, PendingOp, StoreError, StoredDocument, stamp_revision};

/// Thread-safe in-memory document store.
///
/// Documents live in per-type maps behind a single `RwLock`. Commit validates
/// every revision expectation under the write lock before applying anything,
/// so a conflicting batch leaves the store untouched.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, HashMap<Uuid, StoredDocument>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents of a type. Test helper.
    pub fn document_count(&self, doc_type: &str) -> usize {
        self.collections
            .read()
            .map(|collections| collections.get(doc_type).map_or(0, HashMap::len))
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentBackend for InMemoryDocumentStore {
    async fn load(
        &self,
        doc_type: &str,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Option<StoredDocument>, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        Ok(collections
            .get(doc_type)
            .and_then(|documents| documents.get(&id))
            .cloned())
    }

    async fn load_all(
        &self,
        doc_type: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        let mut documents: Vec<StoredDocument> = collections
            .get(doc_type)
            .map(|documents| documents.values().cloned().collect())
            .unwrap_or_default();

        // Stable order for callers that do not sort.
        documents.sort_by_key(|document| document.id);
        Ok(documents)
    }

    async fn commit(
        &self,
        ops: Vec<PendingOp>,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        // Validate every revision expectation before any write lands.
        for op in &ops {
            if let PendingOp::Upsert {
                doc_type,
                id,
                expected,
                ..
            } = op
            {
                let current = collections
                    .get(*doc_type)
                    .and_then(|documents| documents.get(id))
                    .map(|document| document.revision);
                if !expected.matches(current) {
                    return Err(StoreError::conflict(doc_type, *id));
                }
            }
        }

        for op in ops {
            match op {
                PendingOp::Upsert {
                    doc_type,
                    id,
                    expected,
                    mut body,
                } => {
                    let revision = expected.next();
                    stamp_revision(&mut body, revision);
                    collections.entry(doc_type.to_string()).or_default().insert(
                        id,
                        StoredDocument {
                            id,
                            revision,
                            body,
                            updated_at: Utc::now(),
                        },
                    );
                }
                PendingOp::Delete { doc_type, id } => {
                    if let Some(documents) = collections.get_mut(doc_type) {
                        documents.remove(&id);
                    }
                }
            }
        }

        Ok(())
    }
}
