//! Document bindings for the catalog aggregates.

use uuid::Uuid;

use shopforge_catalog::{Category, Product};
use shopforge_core::AggregateRoot;

use crate::document_store::DocumentEntity;

impl DocumentEntity for Product {
    const DOC_TYPE: &'static str = "catalog.product";

    fn document_id(&self) -> Uuid {
        *self.id().as_uuid()
    }

    fn document_revision(&self) -> u64 {
        self.revision()
    }
}

impl DocumentEntity for Category {
    const DOC_TYPE: &'static str = "catalog.category";

    fn document_id(&self) -> Uuid {
        *self.id().as_uuid()
    }

    fn document_revision(&self) -> u64 {
        self.revision()
    }
}
