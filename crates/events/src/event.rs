use chrono::{DateTime, Utc};

/// A domain event: an immutable fact about something that already happened.
///
/// Implementors are plain data. The trait only exposes the metadata the
/// announcement layer needs to build an envelope.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name (e.g. "catalog.product.created").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
