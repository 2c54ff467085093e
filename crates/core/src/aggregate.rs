//! Aggregate root trait and the optimistic-concurrency revision expectation.

/// Aggregate root marker + minimal interface.
///
/// Aggregates are the unit of persistence: one document per aggregate root,
/// with owned entities and value objects embedded. This trait is intentionally
/// small so the catalog can model state transitions however it likes without
/// bringing in any storage concerns.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Revision of the stored document this state was loaded from.
    ///
    /// Zero for a freshly created aggregate that has never been saved. The
    /// store increments this by one on every successful save.
    fn revision(&self) -> u64;
}

/// Optimistic-concurrency expectation checked by the store at save time.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedRevision {
    /// Require that no document exists yet (first save of a new aggregate).
    NoDocument,
    /// Require the stored document to be at an exact revision.
    Exact(u64),
}

impl ExpectedRevision {
    /// `current` is the stored revision, or `None` when no document exists.
    pub fn matches(self, current: Option<u64>) -> bool {
        match (self, current) {
            (ExpectedRevision::NoDocument, None) => true,
            (ExpectedRevision::Exact(expected), Some(actual)) => expected == actual,
            _ => false,
        }
    }

    /// The revision a successful save will write.
    pub fn next(self) -> u64 {
        match self {
            ExpectedRevision::NoDocument => 1,
            ExpectedRevision::Exact(v) => v + 1,
        }
    }
}
