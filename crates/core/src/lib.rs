//! `shopforge-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! strongly-typed identifiers, the domain error model, entity/aggregate/value
//! object traits, and the query-specification machinery shared by every
//! repository.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod paging;
pub mod spec;
pub mod value_object;

pub use aggregate::{AggregateRoot, ExpectedRevision};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CategoryId, ProductId, VariantId};
pub use paging::PaginatedResult;
pub use spec::{SpecError, Specification, evaluate};
pub use value_object::ValueObject;
