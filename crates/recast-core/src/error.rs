//! Error types for the conversion engine.
//!
//! The taxonomy keeps the three outcomes of a conversion distinct at every
//! boundary:
//!
//! ```text
//! RegistrationError - type-space configuration errors
//! ResolveError      - failures while *selecting* a converter
//! ConversionError   - failures while *running* one (or finding none)
//! ```
//!
//! `can_convert` maps every failure to `false`; `convert` surfaces them.

use thiserror::Error;

use crate::{ConvertiblePair, TypeKey};

/// Errors during type-space configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A type with the same key is already registered.
    #[error("duplicate type: {0}")]
    DuplicateType(String),

    /// A referenced type key has no entry.
    #[error("unknown type: {0}")]
    UnknownType(TypeKey),
}

/// Failures while selecting a converter for a pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A conditional converter's match predicate failed abnormally during
    /// the hierarchy walk. Propagated rather than treated as a non-match,
    /// so a predicate bug cannot silently skip the only correct converter.
    #[error("match predicate failed for {pair}: {message}")]
    Predicate {
        /// The candidate pair being tested when the predicate failed.
        pair: ConvertiblePair,
        /// Predicate-supplied detail.
        message: String,
    },
}

impl ResolveError {
    /// Create a predicate failure for the given candidate pair.
    pub fn predicate(pair: ConvertiblePair, message: impl Into<String>) -> Self {
        ResolveError::Predicate {
            pair,
            message: message.into(),
        }
    }
}

/// Failures reported by `convert`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// No converter, explicit or no-op, resolves for the pair.
    #[error("no converter found for {pair}")]
    ConverterNotFound {
        /// The unresolvable pair.
        pair: ConvertiblePair,
    },

    /// A converter was found and invoked but failed.
    #[error("conversion {pair} failed: {cause}")]
    ConversionFailed {
        /// The pair being converted when the failure occurred.
        pair: ConvertiblePair,
        /// The underlying failure.
        #[source]
        cause: Box<ConversionError>,
    },

    /// The source value cannot be represented in the target type.
    #[error("invalid value: {detail}")]
    InvalidValue {
        /// What was wrong with the value.
        detail: String,
    },

    /// A converter received a value kind it does not handle.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected value kind.
        expected: &'static str,
        /// Actual value kind.
        actual: &'static str,
    },

    /// An absent value was given for a non-nullable target.
    #[error("null value not allowed for target {target}")]
    NullNotAllowed {
        /// The rejecting target type.
        target: TypeKey,
    },

    /// Element-wise conversion revisited a descriptor pair already being
    /// converted on the current call stack.
    #[error("cyclic conversion detected for {pair}")]
    CyclicConversion {
        /// The revisited pair.
        pair: ConvertiblePair,
    },

    /// Resolution itself failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl ConversionError {
    /// Create an invalid-value failure.
    pub fn invalid(detail: impl Into<String>) -> Self {
        ConversionError::InvalidValue {
            detail: detail.into(),
        }
    }

    /// Wrap an underlying failure for the given pair.
    pub fn failed(pair: ConvertiblePair, cause: ConversionError) -> Self {
        ConversionError::ConversionFailed {
            pair,
            cause: Box::new(cause),
        }
    }
}
