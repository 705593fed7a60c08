//! Registry crate for the recast conversion engine.
//!
//! Holds the two configuration-phase stores the resolution engine reads
//! from: the [`TypeSpace`] (hierarchy information and memoized lineages) and
//! the [`ConverterRegistry`] (pair-indexed adapters), together with the
//! converter SPI and its normalization layer.

mod adapter;
mod converter_registry;
mod type_space;

pub use adapter::{
    Adapter, Converter, ConverterFactory, ConvertScope, ConvertView, FnConverter,
    GenericConverter,
};
pub use converter_registry::ConverterRegistry;
pub use type_space::TypeSpace;

// Re-export the core data model so engine-side callers need one import path.
pub use recast_core::{
    builtin, ClassInfo, ConversionError, ConvertiblePair, InterfaceInfo, ObjectValue,
    RegistrationError, ResolveError, Shape, TypeDescriptor, TypeKey, Value,
};
