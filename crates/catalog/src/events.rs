use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopforge_core::{CategoryId, ProductId};
use shopforge_events::Event;

/// Event: a product was added to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub product_id: ProductId,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: a category was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCreated {
    pub category_id: CategoryId,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Domain events queued by catalog aggregates at factory time and drained by
/// command handlers after a successful save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogEvent {
    ProductCreated(ProductCreated),
    CategoryCreated(CategoryCreated),
}

impl Event for CatalogEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CatalogEvent::ProductCreated(_) => "catalog.product.created",
            CatalogEvent::CategoryCreated(_) => "catalog.category.created",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CatalogEvent::ProductCreated(e) => e.occurred_at,
            CatalogEvent::CategoryCreated(e) => e.occurred_at,
        }
    }
}
