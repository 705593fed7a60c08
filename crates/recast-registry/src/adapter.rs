//! Converter SPI and the adapter normalization layer.
//!
//! Three converter shapes exist at the API surface:
//!
//! - [`Converter`] - a strongly-typed point-to-point converter for one pair
//! - [`ConverterFactory`] - produces target-specific converters for a whole
//!   range of target subtypes
//! - [`GenericConverter`] - declares an arbitrary pair set and may carry a
//!   match predicate over full type descriptors
//!
//! All three are normalized into one internal [`Adapter`] at registration
//! time, so the hot resolution path dispatches on a tag decided once instead
//! of re-discovering the shape per lookup.
//!
//! [`ConvertScope`] is the recursion context handed to generic converters:
//! it gives element-wise converters access back into the engine and guards
//! against converters that re-enter themselves with unchanged descriptors.

use std::fmt;
use std::sync::Arc;

use recast_core::{
    ConversionError, ConvertiblePair, ResolveError, TypeDescriptor, TypeKey, Value,
};

/// A point-to-point converter for exactly one pair.
///
/// `convert` is never invoked with [`Value::Null`]; absent values are
/// short-circuited before any converter runs. Implementations must be safe
/// for unlimited concurrent invocation.
pub trait Converter: Send + Sync {
    /// The single pair this converter handles.
    fn pair(&self) -> ConvertiblePair;

    /// Convert the value.
    fn convert(&self, value: &Value) -> Result<Value, ConversionError>;
}

/// A factory producing converters for a range of target subtypes.
///
/// The declared range pair's target is the range *base* type. When the
/// concrete target is a subtype of the base, the engine asks the factory for
/// a target-specific converter; the produced converter is cached per concrete
/// target key, because it differs per subtype.
pub trait ConverterFactory: Send + Sync {
    /// The (source, range base) pair this factory covers.
    fn range(&self) -> ConvertiblePair;

    /// Produce a converter for a concrete target within the range.
    ///
    /// Returning `None` means the factory cannot serve this target; the
    /// hierarchy search continues past it.
    fn create(&self, target: TypeKey) -> Option<Arc<dyn Converter>>;
}

/// A multi-pair converter, optionally conditional.
pub trait GenericConverter: Send + Sync {
    /// The pairs this converter handles.
    fn pairs(&self) -> Vec<ConvertiblePair>;

    /// Match predicate consulted with full type descriptors during
    /// resolution. Unconditional converters keep the default.
    ///
    /// An `Err` is propagated as a resolution failure, never treated as a
    /// non-match.
    fn matches(
        &self,
        _source: &TypeDescriptor,
        _target: &TypeDescriptor,
        _view: &dyn ConvertView,
    ) -> Result<bool, ResolveError> {
        Ok(true)
    }

    /// Convert the value. Element-wise converters recurse through `scope`.
    fn convert(
        &self,
        value: &Value,
        source: &TypeDescriptor,
        target: &TypeDescriptor,
        scope: &mut ConvertScope<'_>,
    ) -> Result<Value, ConversionError>;
}

/// Read access back into the engine, for predicates and recursion.
///
/// Implemented by the conversion service; converters only ever see it behind
/// a reference.
pub trait ConvertView: Send + Sync {
    /// Whether a conversion between the described types can be resolved.
    fn can_convert(&self, source: &TypeDescriptor, target: &TypeDescriptor) -> bool;

    /// Resolve and run a conversion within an existing scope.
    ///
    /// Errors are returned raw; the public facade wraps them once at the
    /// outermost boundary.
    fn convert_in(
        &self,
        value: &Value,
        source: &TypeDescriptor,
        target: &TypeDescriptor,
        scope: &mut ConvertScope<'_>,
    ) -> Result<Value, ConversionError>;
}

/// Recursion context for one top-level conversion.
///
/// Tracks the descriptor pairs currently being converted on this call stack.
/// Re-entering a pair that is already in flight fails with
/// [`ConversionError::CyclicConversion`] instead of looping forever. Nested
/// homogeneous containers are fine: their element descriptors shrink at each
/// level, so the frames differ.
pub struct ConvertScope<'a> {
    view: &'a dyn ConvertView,
    stack: Vec<(TypeDescriptor, TypeDescriptor)>,
}

impl<'a> ConvertScope<'a> {
    /// Create a fresh scope over the given view.
    pub fn new(view: &'a dyn ConvertView) -> Self {
        Self {
            view,
            stack: Vec::new(),
        }
    }

    /// Whether a conversion between the described types can be resolved.
    pub fn can_convert(&self, source: &TypeDescriptor, target: &TypeDescriptor) -> bool {
        self.view.can_convert(source, target)
    }

    /// Resolve and run a nested conversion.
    pub fn convert(
        &mut self,
        value: &Value,
        source: &TypeDescriptor,
        target: &TypeDescriptor,
    ) -> Result<Value, ConversionError> {
        self.enter(source, target)?;
        let view = self.view;
        let result = view.convert_in(value, source, target, self);
        self.stack.pop();
        result
    }

    /// Run a specific adapter within this scope.
    ///
    /// Used by the facade for the outermost frame, where the adapter has
    /// already been resolved.
    pub fn convert_with(
        &mut self,
        adapter: &Adapter,
        value: &Value,
        source: &TypeDescriptor,
        target: &TypeDescriptor,
    ) -> Result<Value, ConversionError> {
        self.enter(source, target)?;
        let result = adapter.convert(value, source, target, self);
        self.stack.pop();
        result
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn enter(
        &mut self,
        source: &TypeDescriptor,
        target: &TypeDescriptor,
    ) -> Result<(), ConversionError> {
        if self
            .stack
            .iter()
            .any(|(s, t)| s == source && t == target)
        {
            return Err(ConversionError::CyclicConversion {
                pair: ConvertiblePair::new(source.raw(), target.raw()),
            });
        }
        self.stack.push((source.clone(), target.clone()));
        Ok(())
    }
}

/// A [`Converter`] built from a closure.
pub struct FnConverter<F> {
    pair: ConvertiblePair,
    func: F,
}

impl<F> FnConverter<F>
where
    F: Fn(&Value) -> Result<Value, ConversionError> + Send + Sync,
{
    /// Create a converter for (source, target) from a conversion function.
    pub fn new(source: TypeKey, target: TypeKey, func: F) -> Self {
        Self {
            pair: ConvertiblePair::new(source, target),
            func,
        }
    }
}

impl<F> Converter for FnConverter<F>
where
    F: Fn(&Value) -> Result<Value, ConversionError> + Send + Sync,
{
    fn pair(&self) -> ConvertiblePair {
        self.pair
    }

    fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        (self.func)(value)
    }
}

enum AdapterKind {
    Simple(Arc<dyn Converter>),
    Factory(Arc<dyn ConverterFactory>),
    Generic(Arc<dyn GenericConverter>),
}

/// Internal uniform representation of a registered conversion unit.
///
/// Owned by the registry once registered; the engine never mutates one.
pub struct Adapter {
    pairs: Vec<ConvertiblePair>,
    kind: AdapterKind,
}

impl Adapter {
    /// Normalize a single-pair converter.
    pub fn simple(converter: Arc<dyn Converter>) -> Self {
        Self {
            pairs: vec![converter.pair()],
            kind: AdapterKind::Simple(converter),
        }
    }

    /// Normalize a converter factory. The declared pair's target is the
    /// range base type.
    pub fn factory(factory: Arc<dyn ConverterFactory>) -> Self {
        Self {
            pairs: vec![factory.range()],
            kind: AdapterKind::Factory(factory),
        }
    }

    /// Normalize a generic converter, indexing it once per declared pair.
    pub fn generic(converter: Arc<dyn GenericConverter>) -> Self {
        Self {
            pairs: converter.pairs(),
            kind: AdapterKind::Generic(converter),
        }
    }

    /// Wrap a factory-produced converter as a standalone adapter for its
    /// concrete pair.
    pub fn materialized(converter: Arc<dyn Converter>) -> Self {
        Self::simple(converter)
    }

    /// The pairs this adapter is registered under.
    pub fn pairs(&self) -> &[ConvertiblePair] {
        &self.pairs
    }

    /// Whether this adapter is a converter factory.
    pub fn is_factory(&self) -> bool {
        matches!(self.kind, AdapterKind::Factory(_))
    }

    /// Ask a factory adapter for a target-specific converter.
    ///
    /// Returns `None` for non-factory adapters and for targets the factory
    /// declines.
    pub fn create_for(&self, target: TypeKey) -> Option<Arc<dyn Converter>> {
        match &self.kind {
            AdapterKind::Factory(factory) => factory.create(target),
            _ => None,
        }
    }

    /// Evaluate the match predicate for the given descriptors.
    ///
    /// Simple and factory adapters are unconditional.
    pub fn matches(
        &self,
        source: &TypeDescriptor,
        target: &TypeDescriptor,
        view: &dyn ConvertView,
    ) -> Result<bool, ResolveError> {
        match &self.kind {
            AdapterKind::Simple(_) | AdapterKind::Factory(_) => Ok(true),
            AdapterKind::Generic(generic) => generic.matches(source, target, view),
        }
    }

    /// Run the conversion.
    pub fn convert(
        &self,
        value: &Value,
        source: &TypeDescriptor,
        target: &TypeDescriptor,
        scope: &mut ConvertScope<'_>,
    ) -> Result<Value, ConversionError> {
        match &self.kind {
            AdapterKind::Simple(converter) => converter.convert(value),
            AdapterKind::Factory(factory) => match factory.create(target.raw()) {
                Some(converter) => converter.convert(value),
                None => Err(ConversionError::ConverterNotFound {
                    pair: ConvertiblePair::new(source.raw(), target.raw()),
                }),
            },
            AdapterKind::Generic(generic) => generic.convert(value, source, target, scope),
        }
    }
}

impl fmt::Debug for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            AdapterKind::Simple(_) => "simple",
            AdapterKind::Factory(_) => "factory",
            AdapterKind::Generic(_) => "generic",
        };
        f.debug_struct("Adapter")
            .field("kind", &kind)
            .field("pairs", &self.pairs)
            .finish()
    }
}
