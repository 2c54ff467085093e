//! Schemaless document store boundary.
//!
//! This module defines an infrastructure-facing abstraction for persisting
//! aggregates as JSON documents without making any storage assumptions.
//! Aggregates are stored whole (owned entities and value objects embedded),
//! one document per aggregate root, addressed by `(doc_type, id)`.

pub mod backend;
pub mod in_memory;
pub mod postgres;

pub use backend::{
    DocumentBackend, DocumentEntity, PendingOp, StoreError, StoredDocument, stamp_revision,
};
pub use in_memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
