//! `shopforge-events` — domain event announcement.
//!
//! Events here are **announcements**: after a unit of work commits, command
//! handlers drain the events their aggregates queued and publish them on an
//! [`EventBus`] for interested subscribers (notification handlers, cache
//! invalidation, tests). The bus distributes; it does not store. The document
//! store remains the source of truth.

pub mod bus;
pub mod envelope;
pub mod event;

pub use bus::{EventBus, InMemoryBusError, InMemoryEventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
