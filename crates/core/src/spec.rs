//! Composable query specifications.
//!
//! A [`Specification`] bundles everything a repository needs to answer a
//! query: an optional filter predicate, include hints, a primary sort order
//! with optional tie-breaks, a paging window, and a tracking flag. It is
//! built with chainable combinators and then handed to a repository; plain
//! closures carry the filtering and ordering logic, so specifications compose
//! without any query-provider coupling.
//!
//! Construction is append-only: once built, a specification is immutable
//! configuration. Consumers should build a fresh specification per call.

use std::cmp::Ordering;

use thiserror::Error;

/// Error raised when a specification is structurally unusable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// `then_by` clauses are meaningless without a primary ordering.
    #[error("tie-break ordering requires a primary ordering")]
    TieBreakWithoutOrder,
}

type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;
type Comparator<T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// A composable query over documents of type `T`.
pub struct Specification<T> {
    filter: Option<Predicate<T>>,
    includes: Vec<&'static str>,
    order: Option<Comparator<T>>,
    then_by: Vec<Comparator<T>>,
    page: Option<(usize, usize)>,
    tracked: bool,
}

impl<T> Specification<T> {
    /// An empty specification: matches everything, no ordering, no paging,
    /// results tracked.
    pub fn new() -> Self {
        Self {
            filter: None,
            includes: Vec::new(),
            order: None,
            then_by: Vec::new(),
            page: None,
            tracked: true,
        }
    }

    /// Set the filter predicate. At most one filter applies; the last call
    /// wins.
    pub fn filter(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Record an include/expand hint (e.g. `"variants"`).
    ///
    /// Document-backed stores embed owned entities inline and ignore these;
    /// they are carried for adapters with referential structure.
    pub fn include(mut self, path: &'static str) -> Self {
        self.includes.push(path);
        self
    }

    /// Primary ascending order by the extracted key.
    pub fn order_by<K, F>(mut self, key: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.order = Some(key_comparator(key, false));
        self
    }

    /// Primary descending order by the extracted key.
    pub fn order_by_desc<K, F>(mut self, key: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.order = Some(key_comparator(key, true));
        self
    }

    /// Ascending tie-break applied where all previous orders compare equal.
    /// Tie-breaks accumulate in call order.
    pub fn then_by<K, F>(mut self, key: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.then_by.push(key_comparator(key, false));
        self
    }

    /// Descending tie-break.
    pub fn then_by_desc<K, F>(mut self, key: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.then_by.push(key_comparator(key, true));
        self
    }

    /// Paging window: drop `skip` items, keep at most `take`. Applied last,
    /// after filtering and ordering.
    pub fn page(mut self, skip: usize, take: usize) -> Self {
        self.page = Some((skip, take));
        self
    }

    /// Disable mutation tracking for the results of this query.
    pub fn untracked(mut self) -> Self {
        self.tracked = false;
        self
    }

    /// Apply the filter alone (vacuously true when absent). Used by count
    /// and existence queries, which ignore ordering and paging.
    pub fn matches(&self, item: &T) -> bool {
        match &self.filter {
            Some(predicate) => predicate(item),
            None => true,
        }
    }

    pub fn is_tracked(&self) -> bool {
        self.tracked
    }

    pub fn include_paths(&self) -> &[&'static str] {
        &self.includes
    }

    pub fn paging(&self) -> Option<(usize, usize)> {
        self.page
    }

    pub fn has_filter(&self) -> bool {
        self.filter.is_some()
    }
}

impl<T> Default for Specification<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> core::fmt::Debug for Specification<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Specification")
            .field("filter", &self.filter.is_some())
            .field("includes", &self.includes)
            .field("ordered", &self.order.is_some())
            .field("tie_breaks", &self.then_by.len())
            .field("page", &self.page)
            .field("tracked", &self.tracked)
            .finish()
    }
}

fn key_comparator<T, K, F>(key: F, descending: bool) -> Comparator<T>
where
    K: Ord,
    F: Fn(&T) -> K + Send + Sync + 'static,
{
    Box::new(move |a, b| {
        let ordering = key(a).cmp(&key(b));
        if descending { ordering.reverse() } else { ordering }
    })
}

/// Evaluate a specification against an in-memory collection.
///
/// Applies, in fixed order: filter, primary order, tie-breaks (stable sort),
/// paging window. A window past the end of the results yields an empty page,
/// never an error.
pub fn evaluate<T>(items: Vec<T>, spec: &Specification<T>) -> Result<Vec<T>, SpecError> {
    if spec.order.is_none() && !spec.then_by.is_empty() {
        return Err(SpecError::TieBreakWithoutOrder);
    }

    let mut matched: Vec<T> = match &spec.filter {
        Some(predicate) => items.into_iter().filter(|item| predicate(item)).collect(),
        None => items,
    };

    if let Some(primary) = &spec.order {
        matched.sort_by(|a, b| {
            let mut ordering = primary(a, b);
            for tie in &spec.then_by {
                if ordering != Ordering::Equal {
                    break;
                }
                ordering = tie(a, b);
            }
            ordering
        });
    }

    Ok(match spec.page {
        Some((skip, take)) => matched.into_iter().skip(skip).take(take).collect(),
        None => matched,
    })
}
