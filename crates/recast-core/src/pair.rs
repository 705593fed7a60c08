//! Convertible type pair.
//!
//! A [`ConvertiblePair`] is the (source, target) identity under which
//! converters are indexed and looked up. Equality and hashing are by the two
//! type keys, so a pair computed anywhere matches the registry's own key.

use std::fmt;

use crate::TypeKey;

/// An ordered (source type, target type) pair.
///
/// Used as the registry key and as the declaration contract of converters:
/// a converter declares the set of pairs it can handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConvertiblePair {
    /// Source type key.
    pub source: TypeKey,
    /// Target type key.
    pub target: TypeKey,
}

impl ConvertiblePair {
    /// Create a pair from source and target keys.
    #[inline]
    pub const fn new(source: TypeKey, target: TypeKey) -> Self {
        Self { source, target }
    }

    /// Create a pair from source and target type names.
    #[inline]
    pub const fn of(source: &str, target: &str) -> Self {
        Self::new(TypeKey::from_name(source), TypeKey::from_name(target))
    }
}

impl fmt::Debug for ConvertiblePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConvertiblePair({} -> {})", self.source, self.target)
    }
}

impl fmt::Display for ConvertiblePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}
