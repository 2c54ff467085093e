//! Value object trait: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity** - they are defined
//! entirely by their attribute values. Two value objects with the same values are
//! considered equal.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// create a new one with the new values.
///
/// Implementors define their own equality directly on (possibly normalized)
/// fields - e.g. a product attribute compares its name and value lower-cased,
/// and a category association compares by category id alone. The normalization
/// lives in the `PartialEq`/`Hash` impls themselves, not in a reflective
/// component list.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
