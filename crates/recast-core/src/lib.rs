//! Core types for the recast conversion engine.
//!
//! This crate holds the leaf data model shared by the registry and the
//! engine: hash-based type identity ([`TypeKey`]), type-space entries
//! ([`ClassInfo`], [`InterfaceInfo`]), type occurrence descriptions
//! ([`TypeDescriptor`]), the dynamic [`Value`] model, the registry key
//! ([`ConvertiblePair`]), and the error taxonomy.

mod descriptor;
mod entries;
mod error;
mod pair;
mod type_key;
mod value;

pub use descriptor::{Shape, TypeDescriptor};
pub use entries::{ClassInfo, InterfaceInfo};
pub use error::{ConversionError, RegistrationError, ResolveError};
pub use pair::ConvertiblePair;
pub use type_key::{builtin, TypeKey};
pub use value::{ObjectValue, Value};
