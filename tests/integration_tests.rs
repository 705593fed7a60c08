//! End-to-end tests over the public conversion surface.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use recast::prelude::*;

fn scalar(key: TypeKey) -> TypeDescriptor {
    TypeDescriptor::scalar(key)
}

fn list_of(key: TypeKey) -> TypeDescriptor {
    TypeDescriptor::collection(scalar(key))
}

/// A small zoo hierarchy: `Cat` extends `Animal` and implements `Pet`.
fn zoo_space() -> (TypeSpace, TypeKey, TypeKey, TypeKey) {
    let mut space = TypeSpace::with_builtins();

    let pet = InterfaceInfo::new("Pet");
    let pet_key = pet.key;
    space.register_interface(pet).unwrap();

    let animal = ClassInfo::new("Animal");
    let animal_key = animal.key;
    space.register_class(animal).unwrap();

    let cat = ClassInfo::new("Cat")
        .with_base(animal_key)
        .with_interface(pet_key);
    let cat_key = cat.key;
    space.register_class(cat).unwrap();

    (space, cat_key, animal_key, pet_key)
}

fn cat_value(cat_key: TypeKey, name: &str) -> Value {
    Value::object(cat_key, name.to_string())
}

fn name_of(value: &Value) -> String {
    match value {
        Value::Object(obj) => obj.downcast_ref::<String>().cloned().unwrap_or_default(),
        other => panic!("expected object, got {other:?}"),
    }
}

#[test]
fn registered_converter_matches_direct_invocation() {
    let (space, cat_key, _, _) = zoo_space();
    let converter = FnConverter::new(cat_key, builtin::STRING, |value| match value {
        Value::Object(obj) => {
            let name = obj
                .downcast_ref::<String>()
                .ok_or_else(|| ConversionError::invalid("not a cat"))?;
            Ok(Value::Str(format!("cat:{name}")))
        }
        other => Err(ConversionError::TypeMismatch {
            expected: "object",
            actual: other.kind_name(),
        }),
    });

    let value = cat_value(cat_key, "miso");
    let direct = converter.convert(&value).unwrap();

    let mut service = ConversionService::new(Arc::new(space));
    service.add_converter(converter);

    assert!(service.can_convert(&scalar(cat_key), &scalar(builtin::STRING)));
    let via_service = service
        .convert(&value, &scalar(cat_key), &scalar(builtin::STRING))
        .unwrap();
    assert_eq!(via_service, direct);
    assert_eq!(via_service, Value::str("cat:miso"));
}

#[test]
fn specificity_prefers_concrete_class_over_interface() {
    let (space, cat_key, _, pet_key) = zoo_space();
    let mut service = ConversionService::new(Arc::new(space));
    service.add_converter_fn(pet_key, builtin::STRING, |_| Ok(Value::str("pet")));
    service.add_converter_fn(cat_key, builtin::STRING, |_| Ok(Value::str("cat")));

    let out = service
        .convert(
            &cat_value(cat_key, "miso"),
            &scalar(cat_key),
            &scalar(builtin::STRING),
        )
        .unwrap();
    assert_eq!(out, Value::str("cat"));

    // With the class-level pair removed, resolution falls back to the
    // interface-level converter.
    assert!(service.remove_convertible(cat_key, builtin::STRING));
    let out = service
        .convert(
            &cat_value(cat_key, "miso"),
            &scalar(cat_key),
            &scalar(builtin::STRING),
        )
        .unwrap();
    assert_eq!(out, Value::str("pet"));
}

#[test]
fn source_specificity_dominates_target_specificity() {
    let (mut space, cat_key, animal_key, _) = zoo_space();

    let json = InterfaceInfo::new("Json");
    let json_key = json.key;
    space.register_interface(json).unwrap();

    let doc = ClassInfo::new("Doc").with_interface(json_key);
    let doc_key = doc.key;
    space.register_class(doc).unwrap();

    let mut service = ConversionService::new(Arc::new(space));
    // (Animal -> Doc) is more target-specific, (Cat -> Json) more
    // source-specific; the source side dominates.
    service.add_converter_fn(animal_key, doc_key, |_| Ok(Value::str("animal->doc")));
    service.add_converter_fn(cat_key, json_key, |_| Ok(Value::str("cat->json")));

    let out = service
        .convert(
            &cat_value(cat_key, "miso"),
            &scalar(cat_key),
            &scalar(doc_key),
        )
        .unwrap();
    assert_eq!(out, Value::str("cat->json"));
}

#[test]
fn noop_fallback_for_subtype_target() {
    let (space, cat_key, animal_key, pet_key) = zoo_space();
    let service = ConversionService::new(Arc::new(space));

    let value = cat_value(cat_key, "miso");
    for target in [cat_key, animal_key, pet_key, builtin::OBJECT] {
        assert!(service.can_convert(&scalar(cat_key), &scalar(target)));
        let out = service
            .convert(&value, &scalar(cat_key), &scalar(target))
            .unwrap();
        assert_eq!(out, value, "no-op must return the value unchanged");
    }

    // Not assignable the other way: no adapter, no fallback.
    assert!(!service.can_convert(&scalar(animal_key), &scalar(cat_key)));
    let err = service
        .convert(
            &Value::object(animal_key, ()),
            &scalar(animal_key),
            &scalar(cat_key),
        )
        .unwrap_err();
    assert!(matches!(err, ConversionError::ConverterNotFound { .. }));
}

#[test]
fn factory_sub_adapter_created_once_per_concrete_target() {
    struct CountingFactory {
        created: Arc<AtomicUsize>,
    }

    impl ConverterFactory for CountingFactory {
        fn range(&self) -> ConvertiblePair {
            ConvertiblePair::new(builtin::STRING, builtin::NUMBER)
        }

        fn create(&self, target: TypeKey) -> Option<Arc<dyn Converter>> {
            self.created.fetch_add(1, Ordering::SeqCst);
            if target == builtin::INT {
                Some(Arc::new(FnConverter::new(
                    builtin::STRING,
                    builtin::INT,
                    |value| match value {
                        Value::Str(s) => s
                            .parse::<i64>()
                            .map(Value::Int)
                            .map_err(|e| ConversionError::invalid(e.to_string())),
                        other => Err(ConversionError::TypeMismatch {
                            expected: "string",
                            actual: other.kind_name(),
                        }),
                    },
                )))
            } else if target == builtin::FLOAT {
                Some(Arc::new(FnConverter::new(
                    builtin::STRING,
                    builtin::FLOAT,
                    |value| match value {
                        Value::Str(s) => s
                            .parse::<f64>()
                            .map(Value::Float)
                            .map_err(|e| ConversionError::invalid(e.to_string())),
                        other => Err(ConversionError::TypeMismatch {
                            expected: "string",
                            actual: other.kind_name(),
                        }),
                    },
                )))
            } else {
                None
            }
        }
    }

    let created = Arc::new(AtomicUsize::new(0));
    let mut service = ConversionService::new(Arc::new(TypeSpace::with_builtins()));
    service.add_converter_factory(CountingFactory {
        created: Arc::clone(&created),
    });

    let source = scalar(builtin::STRING);
    let int_target = scalar(builtin::INT);
    let float_target = scalar(builtin::FLOAT);

    assert_eq!(
        service.convert(&Value::str("1"), &source, &int_target).unwrap(),
        Value::Int(1)
    );
    assert_eq!(
        service.convert(&Value::str("2"), &source, &int_target).unwrap(),
        Value::Int(2)
    );
    // The int sub-adapter was materialized once and then served from cache.
    assert_eq!(created.load(Ordering::SeqCst), 1);

    assert_eq!(
        service
            .convert(&Value::str("2.5"), &source, &float_target)
            .unwrap(),
        Value::Float(2.5)
    );
    assert_eq!(created.load(Ordering::SeqCst), 2);
}

#[test]
fn conditional_converter_consults_target_annotations() {
    struct UppercaseMarked;

    impl GenericConverter for UppercaseMarked {
        fn pairs(&self) -> Vec<ConvertiblePair> {
            vec![ConvertiblePair::new(builtin::STRING, builtin::STRING)]
        }

        fn matches(
            &self,
            _source: &TypeDescriptor,
            target: &TypeDescriptor,
            _view: &dyn ConvertView,
        ) -> Result<bool, ResolveError> {
            Ok(target.has_annotation("uppercase"))
        }

        fn convert(
            &self,
            value: &Value,
            _source: &TypeDescriptor,
            _target: &TypeDescriptor,
            _scope: &mut ConvertScope<'_>,
        ) -> Result<Value, ConversionError> {
            match value {
                Value::Str(s) => Ok(Value::Str(s.to_uppercase())),
                other => Err(ConversionError::TypeMismatch {
                    expected: "string",
                    actual: other.kind_name(),
                }),
            }
        }
    }

    let mut service = ConversionService::new(Arc::new(TypeSpace::with_builtins()));
    service.add_generic_converter(UppercaseMarked);

    let source = scalar(builtin::STRING);
    let plain = scalar(builtin::STRING);
    let marked = scalar(builtin::STRING).with_annotation("uppercase");

    // Unannotated target: the predicate rejects, identity applies.
    assert_eq!(
        service.convert(&Value::str("abc"), &source, &plain).unwrap(),
        Value::str("abc")
    );
    // Annotated target: the conditional converter is selected.
    assert_eq!(
        service.convert(&Value::str("abc"), &source, &marked).unwrap(),
        Value::str("ABC")
    );
    // And again the other way round, to catch stale cache entries.
    assert_eq!(
        service.convert(&Value::str("xyz"), &source, &plain).unwrap(),
        Value::str("xyz")
    );
}

#[test]
fn reentrant_converter_fails_instead_of_looping() {
    struct Reentrant;

    impl GenericConverter for Reentrant {
        fn pairs(&self) -> Vec<ConvertiblePair> {
            vec![ConvertiblePair::new(builtin::STRING, builtin::INT)]
        }

        fn convert(
            &self,
            value: &Value,
            source: &TypeDescriptor,
            target: &TypeDescriptor,
            scope: &mut ConvertScope<'_>,
        ) -> Result<Value, ConversionError> {
            // Recurses with unchanged descriptors.
            scope.convert(value, source, target)
        }
    }

    let mut service = ConversionService::new(Arc::new(TypeSpace::with_builtins()));
    service.add_generic_converter(Reentrant);

    let err = service
        .convert(
            &Value::str("1"),
            &scalar(builtin::STRING),
            &scalar(builtin::INT),
        )
        .unwrap_err();
    match err {
        ConversionError::ConversionFailed { cause, .. } => {
            assert!(matches!(*cause, ConversionError::CyclicConversion { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn default_service_collection_round_trip() {
    let service = ConversionService::with_defaults(Arc::new(TypeSpace::with_builtins()));
    let strings = Value::List(vec![Value::str("1"), Value::str("2"), Value::str("3")]);

    let ints = service
        .convert(&strings, &list_of(builtin::STRING), &list_of(builtin::INT))
        .unwrap();
    assert_eq!(
        ints,
        Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );

    let back = service
        .convert(&ints, &list_of(builtin::INT), &list_of(builtin::STRING))
        .unwrap();
    assert_eq!(back, strings);
}

#[test]
fn default_service_map_conversion() {
    let service = ConversionService::with_defaults(Arc::new(TypeSpace::with_builtins()));
    let source = TypeDescriptor::map(scalar(builtin::STRING), scalar(builtin::STRING));
    let target = TypeDescriptor::map(scalar(builtin::STRING), scalar(builtin::FLOAT));

    let value = Value::Map(vec![
        (Value::str("pi"), Value::str("3.14")),
        (Value::str("e"), Value::str("2.71")),
    ]);
    let out = service.convert(&value, &source, &target).unwrap();
    assert_eq!(
        out,
        Value::Map(vec![
            (Value::str("pi"), Value::Float(3.14)),
            (Value::str("e"), Value::Float(2.71)),
        ])
    );
}

#[test]
fn deep_nesting_converts_to_data_depth() {
    let service = ConversionService::with_defaults(Arc::new(TypeSpace::with_builtins()));
    let source = TypeDescriptor::collection(TypeDescriptor::collection(list_of(builtin::STRING)));
    let target = TypeDescriptor::collection(TypeDescriptor::collection(list_of(builtin::INT)));

    let value = Value::List(vec![Value::List(vec![Value::List(vec![
        Value::str("1"),
        Value::str("2"),
    ])])]);
    let out = service.convert(&value, &source, &target).unwrap();
    assert_eq!(
        out,
        Value::List(vec![Value::List(vec![Value::List(vec![
            Value::Int(1),
            Value::Int(2),
        ])])])
    );
}

#[test]
fn convert_to_uses_runtime_value_type() {
    let service = ConversionService::with_defaults(Arc::new(TypeSpace::with_builtins()));

    assert_eq!(
        service.convert_to(&Value::str("42"), builtin::INT).unwrap(),
        Value::Int(42)
    );
    assert_eq!(
        service.convert_to(&Value::Int(42), builtin::STRING).unwrap(),
        Value::str("42")
    );
    // Absent values short-circuit.
    assert_eq!(
        service.convert_to(&Value::Null, builtin::INT).unwrap(),
        Value::Null
    );
}

#[test]
fn late_registration_flips_cached_not_found() {
    let (space, cat_key, _, _) = zoo_space();
    let mut service = ConversionService::new(Arc::new(space));

    let source = scalar(cat_key);
    let target = scalar(builtin::STRING);
    // Prime the cache with the "no adapter" sentinel.
    assert!(!service.can_convert(&source, &target));
    let err = service
        .convert(&cat_value(cat_key, "miso"), &source, &target)
        .unwrap_err();
    assert!(matches!(err, ConversionError::ConverterNotFound { .. }));

    service.add_converter_fn(cat_key, builtin::STRING, |value| {
        Ok(Value::Str(match value {
            Value::Object(obj) => obj
                .downcast_ref::<String>()
                .cloned()
                .unwrap_or_default(),
            _ => String::new(),
        }))
    });

    assert!(service.can_convert(&source, &target));
    let out = service
        .convert(&cat_value(cat_key, "miso"), &source, &target)
        .unwrap();
    assert_eq!(out, Value::str("miso"));
}

#[test]
fn shared_service_resolves_from_many_threads() {
    let service = Arc::new(ConversionService::with_defaults(Arc::new(
        TypeSpace::with_builtins(),
    )));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = Arc::clone(&service);
            std::thread::spawn(move || {
                for n in 0..100 {
                    let text = Value::Str(format!("{}", i * 100 + n));
                    let out = service
                        .convert(
                            &text,
                            &TypeDescriptor::scalar(builtin::STRING),
                            &TypeDescriptor::scalar(builtin::INT),
                        )
                        .unwrap();
                    assert_eq!(out, Value::Int((i * 100 + n) as i64));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn element_failure_reports_first_bad_element() {
    let service = ConversionService::with_defaults(Arc::new(TypeSpace::with_builtins()));
    let strings = Value::List(vec![Value::str("1"), Value::str("two"), Value::str("3")]);

    let err = service
        .convert(&strings, &list_of(builtin::STRING), &list_of(builtin::INT))
        .unwrap_err();
    // The failure names the element pair that broke, wrapped for the caller.
    let text = err.to_string();
    assert!(text.contains("failed"), "unexpected message: {text}");
}

#[test]
fn object_name_helper_round_trip() {
    let (space, cat_key, _, _) = zoo_space();
    let service = ConversionService::new(Arc::new(space));

    // No-op through the object root keeps the payload intact.
    let value = cat_value(cat_key, "miso");
    let out = service
        .convert(&value, &scalar(cat_key), &scalar(builtin::OBJECT))
        .unwrap();
    assert_eq!(name_of(&out), "miso");
}
