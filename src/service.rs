//! ConversionService - the public facade.
//!
//! Thin orchestration over the resolution engine: input validation, the
//! absent-value short-circuit, and error wrapping. Registration methods take
//! `&mut self`, which confines registry mutation to the single-threaded
//! configuration phase; after the service is shared, only the interior
//! resolution cache mutates.

use std::sync::Arc;

use tracing::debug;

use recast_registry::{
    Adapter, ConversionError, Converter, ConverterFactory, ConverterRegistry, ConvertiblePair,
    ConvertScope, ConvertView, FnConverter, GenericConverter, TypeDescriptor, TypeKey, TypeSpace,
    Value,
};

use crate::cache::{Resolution, ResolutionCache};
use crate::{converters, engine, structural};

/// The conversion service facade.
///
/// Created over a configured [`TypeSpace`], populated with converters during
/// the configuration phase, then shared read-only with caller threads.
pub struct ConversionService {
    pub(crate) types: Arc<TypeSpace>,
    pub(crate) registry: ConverterRegistry,
    pub(crate) cache: ResolutionCache,
}

impl ConversionService {
    /// Create a service with no converters registered.
    ///
    /// Only the implicit no-op fallback applies until converters are added.
    pub fn new(types: Arc<TypeSpace>) -> Self {
        Self {
            types,
            registry: ConverterRegistry::new(),
            cache: ResolutionCache::new(),
        }
    }

    /// Create a service with the structural converter family and the default
    /// scalar suite registered.
    pub fn with_defaults(types: Arc<TypeSpace>) -> Self {
        let mut service = Self::new(types);
        structural::register_defaults(&mut service);
        converters::register_defaults(&mut service);
        service
    }

    /// The type space this service resolves against.
    pub fn type_space(&self) -> &TypeSpace {
        &self.types
    }

    /// Register a single-pair converter.
    pub fn add_converter(&mut self, converter: impl Converter + 'static) {
        self.register(Adapter::simple(Arc::new(converter)));
    }

    /// Register a single-pair converter from a closure.
    pub fn add_converter_fn<F>(&mut self, source: TypeKey, target: TypeKey, func: F)
    where
        F: Fn(&Value) -> Result<Value, ConversionError> + Send + Sync + 'static,
    {
        self.register(Adapter::simple(Arc::new(FnConverter::new(
            source, target, func,
        ))));
    }

    /// Register a converter factory for a target type range.
    pub fn add_converter_factory(&mut self, factory: impl ConverterFactory + 'static) {
        self.register(Adapter::factory(Arc::new(factory)));
    }

    /// Register a multi-pair (optionally conditional) converter.
    pub fn add_generic_converter(&mut self, converter: impl GenericConverter + 'static) {
        self.register(Adapter::generic(Arc::new(converter)));
    }

    /// Remove all converters registered for exactly this pair.
    pub fn remove_convertible(&mut self, source: TypeKey, target: TypeKey) -> bool {
        let removed = self.registry.remove(ConvertiblePair::new(source, target));
        if removed {
            self.invalidate();
        }
        removed
    }

    fn register(&mut self, adapter: Adapter) {
        self.registry.register(Arc::new(adapter));
        self.invalidate();
    }

    fn invalidate(&self) {
        debug!("cleared resolution cache");
        self.cache.clear();
    }

    /// Drop all cached resolution outcomes.
    ///
    /// Cache entries are derived, never authoritative; clearing affects
    /// performance only.
    pub fn clear_cache(&self) {
        self.invalidate();
    }

    /// Whether a conversion between the described types can be resolved.
    ///
    /// Never fails: resolution errors (including predicate failures) report
    /// as "not convertible".
    pub fn can_convert(&self, source: &TypeDescriptor, target: &TypeDescriptor) -> bool {
        matches!(
            engine::resolve(self, source, target),
            Ok(Resolution::Found(_) | Resolution::NoOp)
        )
    }

    /// Shortcut for plain scalar descriptors.
    pub fn can_convert_keys(&self, source: TypeKey, target: TypeKey) -> bool {
        self.can_convert(
            &TypeDescriptor::scalar(source),
            &TypeDescriptor::scalar(target),
        )
    }

    /// Convert a value between the described types.
    ///
    /// An absent value short-circuits without invoking any adapter: the
    /// target must accept absence, and the result is absent. Otherwise the
    /// engine resolves an adapter; no adapter is
    /// [`ConversionError::ConverterNotFound`], and any failure surfaced by
    /// the chosen adapter is wrapped as
    /// [`ConversionError::ConversionFailed`] carrying the original cause.
    pub fn convert(
        &self,
        value: &Value,
        source: &TypeDescriptor,
        target: &TypeDescriptor,
    ) -> Result<Value, ConversionError> {
        if value.is_null() {
            return if target.is_nullable() {
                Ok(Value::Null)
            } else {
                Err(ConversionError::NullNotAllowed {
                    target: target.raw(),
                })
            };
        }

        let pair = ConvertiblePair::new(source.raw(), target.raw());
        match engine::resolve(self, source, target)? {
            Resolution::NoOp => Ok(value.clone()),
            Resolution::NotFound => Err(ConversionError::ConverterNotFound { pair }),
            Resolution::Found(adapter) => {
                let mut scope = ConvertScope::new(self as &dyn ConvertView);
                scope
                    .convert_with(&adapter, value, source, target)
                    .map_err(|cause| ConversionError::failed(pair, cause))
            }
        }
    }

    /// Convert a value to a target raw type, inferring the source descriptor
    /// from the runtime value.
    pub fn convert_to(&self, value: &Value, target: TypeKey) -> Result<Value, ConversionError> {
        let source = TypeDescriptor::for_value(value);
        let target = TypeDescriptor::scalar(target);
        self.convert(value, &source, &target)
    }
}

impl std::fmt::Debug for ConversionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionService")
            .field("types", &self.types)
            .field("registered_pairs", &self.registry.pair_count())
            .finish()
    }
}

impl ConvertView for ConversionService {
    fn can_convert(&self, source: &TypeDescriptor, target: &TypeDescriptor) -> bool {
        ConversionService::can_convert(self, source, target)
    }

    fn convert_in(
        &self,
        value: &Value,
        source: &TypeDescriptor,
        target: &TypeDescriptor,
        scope: &mut ConvertScope<'_>,
    ) -> Result<Value, ConversionError> {
        if value.is_null() {
            return if target.is_nullable() {
                Ok(Value::Null)
            } else {
                Err(ConversionError::NullNotAllowed {
                    target: target.raw(),
                })
            };
        }
        match engine::resolve(self, source, target)? {
            Resolution::NoOp => Ok(value.clone()),
            Resolution::NotFound => Err(ConversionError::ConverterNotFound {
                pair: ConvertiblePair::new(source.raw(), target.raw()),
            }),
            Resolution::Found(adapter) => adapter.convert(value, source, target, scope),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recast_registry::{builtin, ResolveError};

    fn empty_service() -> ConversionService {
        ConversionService::new(Arc::new(TypeSpace::with_builtins()))
    }

    fn parse_int(value: &Value) -> Result<Value, ConversionError> {
        match value {
            Value::Str(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| ConversionError::invalid(e.to_string())),
            other => Err(ConversionError::TypeMismatch {
                expected: "string",
                actual: other.kind_name(),
            }),
        }
    }

    #[test]
    fn registered_converter_is_used() {
        let mut service = empty_service();
        service.add_converter_fn(builtin::STRING, builtin::INT, parse_int);

        let source = TypeDescriptor::scalar(builtin::STRING);
        let target = TypeDescriptor::scalar(builtin::INT);
        assert!(service.can_convert(&source, &target));
        assert_eq!(
            service.convert(&Value::str("42"), &source, &target).unwrap(),
            Value::Int(42)
        );
    }

    #[test]
    fn unregistered_pair_not_convertible() {
        let service = empty_service();
        let a = TypeDescriptor::scalar(TypeKey::from_name("CustomA"));
        let b = TypeDescriptor::scalar(TypeKey::from_name("CustomB"));

        assert!(!service.can_convert(&a, &b));
        let err = service.convert(&Value::Int(1), &a, &b).unwrap_err();
        assert!(matches!(err, ConversionError::ConverterNotFound { .. }));
    }

    #[test]
    fn null_short_circuits_without_adapter() {
        let mut service = empty_service();
        // A converter that would panic the test if invoked with null.
        service.add_converter_fn(builtin::STRING, builtin::INT, |value| {
            assert!(!value.is_null(), "adapter must not see null");
            parse_int(value)
        });

        let source = TypeDescriptor::scalar(builtin::STRING);
        let target = TypeDescriptor::scalar(builtin::INT);
        assert_eq!(
            service.convert(&Value::Null, &source, &target).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn null_rejected_by_non_nullable_target() {
        let service = empty_service();
        let source = TypeDescriptor::scalar(builtin::STRING);
        let target = TypeDescriptor::scalar(builtin::INT).not_null();

        let err = service.convert(&Value::Null, &source, &target).unwrap_err();
        assert!(matches!(err, ConversionError::NullNotAllowed { .. }));
    }

    #[test]
    fn adapter_failure_wrapped_with_pair() {
        let mut service = empty_service();
        service.add_converter_fn(builtin::STRING, builtin::INT, parse_int);

        let source = TypeDescriptor::scalar(builtin::STRING);
        let target = TypeDescriptor::scalar(builtin::INT);
        let err = service
            .convert(&Value::str("abc"), &source, &target)
            .unwrap_err();
        match err {
            ConversionError::ConversionFailed { pair, cause } => {
                assert_eq!(pair, ConvertiblePair::new(builtin::STRING, builtin::INT));
                assert!(matches!(*cause, ConversionError::InvalidValue { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // A runtime failure does not make the pair unconvertible.
        assert!(service.can_convert(&source, &target));
    }

    #[test]
    fn noop_fallback_returns_value_unchanged() {
        let service = empty_service();
        let source = TypeDescriptor::scalar(builtin::STRING);
        let target = TypeDescriptor::scalar(builtin::STRING);

        assert!(service.can_convert(&source, &target));
        assert_eq!(
            service.convert(&Value::str("as-is"), &source, &target).unwrap(),
            Value::str("as-is")
        );
    }

    #[test]
    fn explicit_converter_preempts_noop() {
        let mut service = empty_service();
        service.add_converter_fn(builtin::STRING, builtin::STRING, |value| match value {
            Value::Str(s) => Ok(Value::Str(s.to_uppercase())),
            other => Err(ConversionError::TypeMismatch {
                expected: "string",
                actual: other.kind_name(),
            }),
        });

        let desc = TypeDescriptor::scalar(builtin::STRING);
        assert_eq!(
            service.convert(&Value::str("abc"), &desc, &desc).unwrap(),
            Value::str("ABC")
        );
    }

    #[test]
    fn registration_invalidates_cached_not_found() {
        let mut service = empty_service();
        let source = TypeDescriptor::scalar(builtin::STRING);
        let target = TypeDescriptor::scalar(builtin::INT);

        // Prime the cache with the "no adapter" sentinel.
        assert!(!service.can_convert(&source, &target));
        service.add_converter_fn(builtin::STRING, builtin::INT, parse_int);
        assert!(service.can_convert(&source, &target));
    }

    #[test]
    fn removal_invalidates_cached_adapter() {
        let mut service = empty_service();
        service.add_converter_fn(builtin::STRING, builtin::INT, parse_int);
        let source = TypeDescriptor::scalar(builtin::STRING);
        let target = TypeDescriptor::scalar(builtin::INT);

        assert!(service.can_convert(&source, &target));
        assert!(service.remove_convertible(builtin::STRING, builtin::INT));
        assert!(!service.can_convert(&source, &target));
        assert!(!service.remove_convertible(builtin::STRING, builtin::INT));
    }

    #[test]
    fn resolution_is_deterministic() {
        let mut service = empty_service();
        service.add_converter_fn(builtin::STRING, builtin::INT, parse_int);
        service.add_converter_fn(builtin::STRING, builtin::INT, |_| Ok(Value::Int(-1)));

        let source = TypeDescriptor::scalar(builtin::STRING);
        let target = TypeDescriptor::scalar(builtin::INT);
        // First registration wins, cached or not.
        for _ in 0..3 {
            assert_eq!(
                service.convert(&Value::str("5"), &source, &target).unwrap(),
                Value::Int(5)
            );
        }
        service.cache.clear();
        assert_eq!(
            service.convert(&Value::str("5"), &source, &target).unwrap(),
            Value::Int(5)
        );
    }

    #[test]
    fn convert_to_infers_source_descriptor() {
        let mut service = empty_service();
        service.add_converter_fn(builtin::INT, builtin::STRING, |value| match value {
            Value::Int(i) => Ok(Value::Str(i.to_string())),
            other => Err(ConversionError::TypeMismatch {
                expected: "int",
                actual: other.kind_name(),
            }),
        });

        assert_eq!(
            service.convert_to(&Value::Int(12), builtin::STRING).unwrap(),
            Value::str("12")
        );
    }

    struct FailingPredicate;

    impl GenericConverter for FailingPredicate {
        fn pairs(&self) -> Vec<ConvertiblePair> {
            vec![ConvertiblePair::new(builtin::STRING, builtin::INT)]
        }

        fn matches(
            &self,
            source: &TypeDescriptor,
            target: &TypeDescriptor,
            _view: &dyn ConvertView,
        ) -> Result<bool, ResolveError> {
            Err(ResolveError::predicate(
                ConvertiblePair::new(source.raw(), target.raw()),
                "predicate exploded",
            ))
        }

        fn convert(
            &self,
            _value: &Value,
            _source: &TypeDescriptor,
            _target: &TypeDescriptor,
            _scope: &mut ConvertScope<'_>,
        ) -> Result<Value, ConversionError> {
            unreachable!("never selected")
        }
    }

    #[test]
    fn predicate_failure_propagates_from_convert() {
        let mut service = empty_service();
        service.add_generic_converter(FailingPredicate);

        let source = TypeDescriptor::scalar(builtin::STRING);
        let target = TypeDescriptor::scalar(builtin::INT);
        let err = service
            .convert(&Value::str("1"), &source, &target)
            .unwrap_err();
        assert!(matches!(err, ConversionError::Resolve(_)));
        // can_convert maps the same condition to false instead of failing.
        assert!(!service.can_convert(&source, &target));
    }
}
