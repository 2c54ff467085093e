//! Infrastructure layer: document persistence, sessions, repositories.

pub mod document_store;
pub mod documents;
pub mod product_repository;
pub mod repository;
pub mod session;
pub mod unit_of_work;

pub use document_store::{
    DocumentBackend, DocumentEntity, InMemoryDocumentStore, PendingOp, PostgresDocumentStore,
    StoreError, StoredDocument,
};
pub use product_repository::ProductRepository;
pub use repository::Repository;
pub use session::DocumentSession;
pub use unit_of_work::UnitOfWork;
