//! Storage-facing contract of the document store.
//!
//! A backend knows nothing about domain types: it loads and commits
//! [`StoredDocument`]s addressed by a `doc_type` discriminator and a UUID.
//! Typed access on top of this (identity map, staged writes, specification
//! evaluation) lives in [`crate::session`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use shopforge_core::{ExpectedRevision, SpecError};

/// Binds an aggregate type to its persisted document form.
///
/// Implemented in this crate for the catalog aggregates; the store itself
/// only ever sees the `doc_type` string and the serialized body.
pub trait DocumentEntity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection discriminator, e.g. `"catalog.product"`.
    const DOC_TYPE: &'static str;

    /// Document identity within the collection.
    fn document_id(&self) -> Uuid;

    /// Revision of the stored document this instance was loaded from.
    /// Zero for a never-saved instance.
    fn document_revision(&self) -> u64;
}

/// A document as held by a backend.
///
/// The row's `revision` is authoritative; commit stamps the same value into
/// the body's `revision` field so deserialized aggregates always agree with
/// the row.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: Uuid,
    pub revision: u64,
    pub body: JsonValue,
    pub updated_at: DateTime<Utc>,
}

/// A buffered mutation, applied when a session's batch is committed.
#[derive(Debug, Clone)]
pub enum PendingOp {
    /// Insert or replace a document, guarded by a revision expectation.
    Upsert {
        doc_type: &'static str,
        id: Uuid,
        expected: ExpectedRevision,
        body: JsonValue,
    },
    /// Remove a document. Deleting a missing document is a no-op.
    Delete { doc_type: &'static str, id: Uuid },
}

impl PendingOp {
    pub fn doc_type(&self) -> &'static str {
        match self {
            PendingOp::Upsert { doc_type, .. } | PendingOp::Delete { doc_type, .. } => doc_type,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            PendingOp::Upsert { id, .. } | PendingOp::Delete { id, .. } => *id,
        }
    }
}

/// Document store operation error.
///
/// These are **infrastructure errors** (storage, concurrency, cancellation)
/// as opposed to domain errors (validation, invariants).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Optimistic concurrency check failed; nothing from the batch was
    /// applied.
    #[error("optimistic concurrency check failed for {doc_type} document {id}")]
    Conflict { doc_type: String, id: Uuid },

    /// The operation's cancellation token fired before storage was touched.
    #[error("operation cancelled")]
    Cancelled,

    /// A document body could not be serialized or deserialized.
    #[error("document serialization failed: {0}")]
    Serialization(String),

    /// The specification handed to a query is structurally unusable.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Backend failure (connection, pool, lock poisoning).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn conflict(doc_type: &str, id: Uuid) -> Self {
        StoreError::Conflict {
            doc_type: doc_type.to_string(),
            id,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<SpecError> for StoreError {
    fn from(err: SpecError) -> Self {
        StoreError::InvalidQuery(err.to_string())
    }
}

/// Async persistence boundary for schemaless documents.
///
/// ## Implementation Requirements
///
/// Implementations must:
/// - check the cancellation token before touching storage
/// - enforce the revision expectation carried by each [`PendingOp::Upsert`]
/// - apply `commit` batches atomically (every operation lands or none do)
///
/// ## Commit Semantics
///
/// `Upsert` with `NoDocument` expects absence and writes revision 1;
/// `Exact(n)` expects the stored revision to be exactly `n` and writes
/// `n + 1`. Revision checks are evaluated against the pre-commit state, so
/// batches carry at most one operation per document (sessions guarantee
/// this by replacing restaged operations in place).
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Load one document, `None` when absent.
    async fn load(
        &self,
        doc_type: &str,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Option<StoredDocument>, StoreError>;

    /// Load every document of a type. Callers evaluate specifications over
    /// the result.
    async fn load_all(
        &self,
        doc_type: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Apply a batch of pending operations atomically.
    async fn commit(
        &self,
        ops: Vec<PendingOp>,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError>;
}

/// Stamp a committed revision into a document body.
///
/// Both backends call this while applying an upsert; non-object bodies are
/// left untouched.
pub fn stamp_revision(body: &mut JsonValue, revision: u64) {
    if let Some(object) = body.as_object_mut() {
        object.insert("revision".to_string(), JsonValue::from(revision));
    }
}
