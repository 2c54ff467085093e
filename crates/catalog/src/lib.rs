//! `shopforge-catalog` — the catalog domain.
//!
//! Two aggregates: [`Product`] (with embedded [`Variant`] entities,
//! [`ProductAttribute`] value objects and [`ProductCategory`] associations)
//! and [`Category`]. Aggregates validate their own invariants in factories
//! and mutators, and queue creation events for the application layer to
//! announce after a successful save.

pub mod attribute;
pub mod category;
pub mod events;
pub mod product;
pub mod specs;
pub mod variant;

pub use attribute::ProductAttribute;
pub use category::Category;
pub use events::{CatalogEvent, CategoryCreated, ProductCreated};
pub use product::{Product, ProductCategory};
pub use variant::Variant;
