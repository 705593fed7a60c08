//! Structural converters for container pairs.
//!
//! Members of the generic-converter family registered under the builtin
//! container pairs, so the ordered hierarchy search prefers them over the
//! identity fallback. Each converts element-wise by recursively resolving a
//! converter for the element descriptors, and fails the whole operation on
//! the first failing element. Partial results are never returned.
//!
//! The target element type always comes from the target descriptor's
//! declared element type, never from inspecting produced values.

use recast_registry::{
    builtin, ConversionError, ConvertiblePair, ConvertScope, ConvertView, GenericConverter,
    ResolveError, TypeDescriptor, Value,
};

use crate::engine::is_wildcard;
use crate::service::ConversionService;

/// Register the structural family into a service.
pub(crate) fn register_defaults(service: &mut ConversionService) {
    service.add_generic_converter(CollectionToCollection);
    service.add_generic_converter(MapToMap);
    service.add_generic_converter(ValueToCollection);
    service.add_generic_converter(CollectionToValue);
}

/// The declared element descriptor when it says something, otherwise one
/// inferred from the element value itself.
fn element_descriptor(declared: Option<&TypeDescriptor>, item: &Value) -> TypeDescriptor {
    match declared {
        Some(descriptor) if !is_wildcard(descriptor) => descriptor.clone(),
        _ => TypeDescriptor::for_value(item),
    }
}

fn elements_convertible(
    declared: Option<&TypeDescriptor>,
    target: &TypeDescriptor,
    view: &dyn ConvertView,
) -> bool {
    match declared {
        Some(source) if !is_wildcard(source) => {
            is_wildcard(target) || view.can_convert(source, target)
        }
        // Source element type unknown: decided per element during convert.
        _ => true,
    }
}

/// Converts a collection to a collection, element by element.
pub struct CollectionToCollection;

impl GenericConverter for CollectionToCollection {
    fn pairs(&self) -> Vec<ConvertiblePair> {
        vec![ConvertiblePair::new(builtin::LIST, builtin::LIST)]
    }

    fn matches(
        &self,
        source: &TypeDescriptor,
        target: &TypeDescriptor,
        view: &dyn ConvertView,
    ) -> Result<bool, ResolveError> {
        let Some(target_element) = target.element() else {
            // Element type unknown on the target side: not convertible here,
            // the identity fallback may still pass the value through.
            return Ok(false);
        };
        // An unknown source element type is decided per element at runtime.
        Ok(elements_convertible(source.element(), target_element, view))
    }

    fn convert(
        &self,
        value: &Value,
        source: &TypeDescriptor,
        target: &TypeDescriptor,
        scope: &mut ConvertScope<'_>,
    ) -> Result<Value, ConversionError> {
        let Value::List(items) = value else {
            return Err(ConversionError::TypeMismatch {
                expected: "list",
                actual: value.kind_name(),
            });
        };
        let target_element = target
            .element()
            .ok_or_else(|| ConversionError::invalid("target collection has no element type"))?;

        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let item_descriptor = element_descriptor(source.element(), item);
            out.push(scope.convert(item, &item_descriptor, target_element)?);
        }
        Ok(Value::List(out))
    }
}

/// Converts a map to a map, converting keys and values independently.
pub struct MapToMap;

impl GenericConverter for MapToMap {
    fn pairs(&self) -> Vec<ConvertiblePair> {
        vec![ConvertiblePair::new(builtin::MAP, builtin::MAP)]
    }

    fn matches(
        &self,
        source: &TypeDescriptor,
        target: &TypeDescriptor,
        view: &dyn ConvertView,
    ) -> Result<bool, ResolveError> {
        let (Some(target_key), Some(target_value)) = (target.map_key(), target.map_value()) else {
            return Ok(false);
        };
        Ok(elements_convertible(source.map_key(), target_key, view)
            && elements_convertible(source.map_value(), target_value, view))
    }

    fn convert(
        &self,
        value: &Value,
        source: &TypeDescriptor,
        target: &TypeDescriptor,
        scope: &mut ConvertScope<'_>,
    ) -> Result<Value, ConversionError> {
        let Value::Map(entries) = value else {
            return Err(ConversionError::TypeMismatch {
                expected: "map",
                actual: value.kind_name(),
            });
        };
        let target_key = target
            .map_key()
            .ok_or_else(|| ConversionError::invalid("target map has no key type"))?;
        let target_value = target
            .map_value()
            .ok_or_else(|| ConversionError::invalid("target map has no value type"))?;

        let mut out = Vec::with_capacity(entries.len());
        for (key, val) in entries {
            let key_descriptor = element_descriptor(source.map_key(), key);
            let value_descriptor = element_descriptor(source.map_value(), val);
            let converted_key = scope.convert(key, &key_descriptor, target_key)?;
            let converted_value = scope.convert(val, &value_descriptor, target_value)?;
            out.push((converted_key, converted_value));
        }
        Ok(Value::Map(out))
    }
}

/// Wraps a single value into a one-element collection.
pub struct ValueToCollection;

impl GenericConverter for ValueToCollection {
    fn pairs(&self) -> Vec<ConvertiblePair> {
        vec![ConvertiblePair::new(builtin::OBJECT, builtin::LIST)]
    }

    fn matches(
        &self,
        source: &TypeDescriptor,
        target: &TypeDescriptor,
        view: &dyn ConvertView,
    ) -> Result<bool, ResolveError> {
        // Collections convert through the element-wise converter, not by
        // wrapping.
        if source.element().is_some()
            || source.is_map()
            || source.raw() == builtin::LIST
            || source.raw() == builtin::MAP
        {
            return Ok(false);
        }
        let Some(target_element) = target.element() else {
            return Ok(false);
        };
        Ok(is_wildcard(target_element) || view.can_convert(source, target_element))
    }

    fn convert(
        &self,
        value: &Value,
        source: &TypeDescriptor,
        target: &TypeDescriptor,
        scope: &mut ConvertScope<'_>,
    ) -> Result<Value, ConversionError> {
        let target_element = target
            .element()
            .ok_or_else(|| ConversionError::invalid("target collection has no element type"))?;
        let converted = scope.convert(value, source, target_element)?;
        Ok(Value::List(vec![converted]))
    }
}

/// Converts a collection to a single value via its sole element.
pub struct CollectionToValue;

impl GenericConverter for CollectionToValue {
    fn pairs(&self) -> Vec<ConvertiblePair> {
        vec![ConvertiblePair::new(builtin::LIST, builtin::OBJECT)]
    }

    fn matches(
        &self,
        source: &TypeDescriptor,
        target: &TypeDescriptor,
        view: &dyn ConvertView,
    ) -> Result<bool, ResolveError> {
        // A wildcard target takes the whole collection as-is through the
        // identity fallback; container targets have dedicated converters.
        if is_wildcard(target)
            || target.element().is_some()
            || target.is_map()
            || target.raw() == builtin::LIST
            || target.raw() == builtin::MAP
        {
            return Ok(false);
        }
        Ok(elements_convertible(source.element(), target, view))
    }

    fn convert(
        &self,
        value: &Value,
        source: &TypeDescriptor,
        target: &TypeDescriptor,
        scope: &mut ConvertScope<'_>,
    ) -> Result<Value, ConversionError> {
        let Value::List(items) = value else {
            return Err(ConversionError::TypeMismatch {
                expected: "list",
                actual: value.kind_name(),
            });
        };
        match items.first() {
            Some(first) => {
                let item_descriptor = element_descriptor(source.element(), first);
                scope.convert(first, &item_descriptor, target)
            }
            None if target.is_nullable() => Ok(Value::Null),
            None => Err(ConversionError::invalid(
                "cannot convert an empty collection to a single value",
            )),
        }
    }
}
