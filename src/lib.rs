//! recast - a runtime type-conversion resolution engine.
//!
//! Given a value of a known source type and a target type, the engine finds
//! and applies the best-matching conversion, including element-wise
//! conversion of collections and maps. Resolution walks the source and
//! target type hierarchies for the most specific registered converter,
//! applies optional match predicates, and caches outcomes per concrete type
//! pair for hot-path lookups.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use recast::prelude::*;
//!
//! let types = Arc::new(TypeSpace::with_builtins());
//! let service = ConversionService::with_defaults(types);
//!
//! let source = TypeDescriptor::collection(TypeDescriptor::scalar(builtin::STRING));
//! let target = TypeDescriptor::collection(TypeDescriptor::scalar(builtin::INT));
//! let strings = Value::List(vec![Value::str("1"), Value::str("2")]);
//!
//! let ints = service.convert(&strings, &source, &target).unwrap();
//! assert_eq!(ints, Value::List(vec![Value::Int(1), Value::Int(2)]));
//! ```
//!
//! # Phases
//!
//! Configuration is single-threaded: build a [`TypeSpace`], create the
//! service, register converters. Afterwards the service is shared read-only;
//! resolution is safe from any number of threads and never takes an
//! exclusive lock on the hot path.

mod cache;
pub mod converters;
mod engine;
mod service;
pub mod structural;

pub use service::ConversionService;

// Re-export the registry and core surface at the crate root.
pub use recast_registry::{
    builtin, Adapter, ClassInfo, ConversionError, Converter, ConverterFactory, ConverterRegistry,
    ConvertiblePair, ConvertScope, ConvertView, FnConverter, GenericConverter, InterfaceInfo,
    ObjectValue, RegistrationError, ResolveError, Shape, TypeDescriptor, TypeKey, TypeSpace,
    Value,
};

/// Convenience imports for typical use.
pub mod prelude {
    pub use crate::service::ConversionService;
    pub use recast_registry::{
        builtin, ClassInfo, ConversionError, Converter, ConverterFactory, ConvertiblePair,
        ConvertScope, ConvertView, FnConverter, GenericConverter, InterfaceInfo, ObjectValue,
        RegistrationError, ResolveError, Shape, TypeDescriptor, TypeKey, TypeSpace, Value,
    };
}
