//! Deterministic hash-based type identity.
//!
//! This module provides [`TypeKey`], a 64-bit hash that uniquely identifies a
//! type participating in conversion. Unlike sequential IDs, keys are computed
//! deterministically from qualified type names, enabling:
//!
//! - Forward references (a pair can be declared before its types are known)
//! - No registration order dependencies
//! - Same name = same key, across threads and processes
//! - Single map lookups (no secondary name→id maps)
//!
//! # Key Computation
//!
//! Uses XXHash64 with a domain-mixing constant so type keys cannot collide
//! with hashes computed for other purposes from the same byte strings.
//!
//! # Examples
//!
//! ```
//! use recast_core::TypeKey;
//!
//! let int_key = TypeKey::from_name("int");
//! let same_key = TypeKey::from_name("int");
//! assert_eq!(int_key, same_key);  // Deterministic
//!
//! let qualified = TypeKey::from_name("app::Order");
//! assert_ne!(int_key, qualified);
//! ```

use std::fmt;

use xxhash_rust::const_xxh64::xxh64;

/// Domain-mixing constant folded into every type key.
///
/// Keeps type keys distinct from raw xxh64 output over the same name, so a
/// key can never be confused with a plain content hash.
const TYPE_DOMAIN: u64 = 0x61c3b2f0a94d7e58;

/// A deterministic 64-bit hash identifying a type.
///
/// Computed from the qualified type name. The same input always produces the
/// same key, so identities can be computed anywhere without consulting a
/// registry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeKey(pub u64);

impl TypeKey {
    /// Empty/invalid key constant.
    pub const EMPTY: TypeKey = TypeKey(0);

    /// Create a type key from a qualified type name.
    ///
    /// The same name always produces the same key. Const, so well-known keys
    /// can be declared as constants (see [`builtin`]).
    ///
    /// # Examples
    ///
    /// ```
    /// use recast_core::TypeKey;
    ///
    /// const ORDER: TypeKey = TypeKey::from_name("app::Order");
    /// assert_eq!(ORDER, TypeKey::from_name("app::Order"));
    /// ```
    #[inline]
    pub const fn from_name(name: &str) -> Self {
        TypeKey(TYPE_DOMAIN ^ xxh64(name.as_bytes(), 0))
    }

    /// Check if this is the empty/invalid key.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({:#018x})", self.0)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Well-known keys for the built-in value types.
///
/// These are what [`crate::Value::type_key`] reports for non-object values,
/// and what descriptor constructors use for container raw types.
pub mod builtin {
    use super::TypeKey;

    /// Key for the null literal type.
    pub const NULL: TypeKey = TypeKey::from_name("null");

    /// Key for `bool`.
    pub const BOOL: TypeKey = TypeKey::from_name("bool");

    /// Key for `int` (64-bit signed integer).
    pub const INT: TypeKey = TypeKey::from_name("int");

    /// Key for `uint` (64-bit unsigned integer).
    pub const UINT: TypeKey = TypeKey::from_name("uint");

    /// Key for `float` (64-bit floating point).
    pub const FLOAT: TypeKey = TypeKey::from_name("float");

    /// Key for `string`.
    pub const STRING: TypeKey = TypeKey::from_name("string");

    /// Key for `bytes`.
    pub const BYTES: TypeKey = TypeKey::from_name("bytes");

    /// Key for the sequence container type.
    pub const LIST: TypeKey = TypeKey::from_name("list");

    /// Key for the ordered map container type.
    pub const MAP: TypeKey = TypeKey::from_name("map");

    /// Key for the abstract numeric base type (`int`, `uint` and `float`
    /// are registered beneath it).
    pub const NUMBER: TypeKey = TypeKey::from_name("number");

    /// Key for the universal root type. Every lineage ends here, so any
    /// value is assignable to an `object` target.
    pub const OBJECT: TypeKey = TypeKey::from_name("object");
}
