//! Type descriptors.
//!
//! A [`TypeDescriptor`] describes a type *occurrence*: the raw type, whether
//! the location accepts an absent value, the element/key/value types of
//! container occurrences, and any marker annotations attached to the
//! location. Descriptors come from declared type information (a field or
//! parameter signature), not from inspecting a runtime value, though
//! [`TypeDescriptor::for_value`] can infer one when nothing better exists.
//!
//! Container shape is a tagged enum, so the element descriptors exist exactly
//! when the shape calls for them.

use rustc_hash::FxHashSet;

use crate::{builtin, TypeKey, Value};

/// Container shape of a type occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// Plain, non-container occurrence.
    Scalar,
    /// Fixed homogeneous sequence.
    Array {
        /// Element type descriptor.
        element: Box<TypeDescriptor>,
    },
    /// Growable sequence.
    Collection {
        /// Element type descriptor.
        element: Box<TypeDescriptor>,
    },
    /// Ordered key/value entries.
    Map {
        /// Key type descriptor.
        key: Box<TypeDescriptor>,
        /// Value type descriptor.
        value: Box<TypeDescriptor>,
    },
}

/// An immutable description of a type occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    raw: TypeKey,
    shape: Shape,
    nullable: bool,
    annotations: FxHashSet<String>,
}

impl TypeDescriptor {
    /// Describe a plain scalar occurrence of the given type.
    pub fn scalar(raw: TypeKey) -> Self {
        Self {
            raw,
            shape: Shape::Scalar,
            nullable: true,
            annotations: FxHashSet::default(),
        }
    }

    /// Describe an array occurrence with the given element type.
    pub fn array(element: TypeDescriptor) -> Self {
        Self {
            raw: builtin::LIST,
            shape: Shape::Array {
                element: Box::new(element),
            },
            nullable: true,
            annotations: FxHashSet::default(),
        }
    }

    /// Describe a collection occurrence with the given element type.
    pub fn collection(element: TypeDescriptor) -> Self {
        Self::collection_of(builtin::LIST, element)
    }

    /// Describe a collection occurrence with an explicit raw container type.
    pub fn collection_of(raw: TypeKey, element: TypeDescriptor) -> Self {
        Self {
            raw,
            shape: Shape::Collection {
                element: Box::new(element),
            },
            nullable: true,
            annotations: FxHashSet::default(),
        }
    }

    /// Describe a map occurrence with the given key and value types.
    pub fn map(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        Self::map_of(builtin::MAP, key, value)
    }

    /// Describe a map occurrence with an explicit raw container type.
    pub fn map_of(raw: TypeKey, key: TypeDescriptor, value: TypeDescriptor) -> Self {
        Self {
            raw,
            shape: Shape::Map {
                key: Box::new(key),
                value: Box::new(value),
            },
            nullable: true,
            annotations: FxHashSet::default(),
        }
    }

    /// Mark this occurrence as rejecting absent values.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Attach a marker annotation.
    ///
    /// Annotations are opaque to the engine; conditional converters consult
    /// them through [`TypeDescriptor::has_annotation`].
    pub fn with_annotation(mut self, marker: impl Into<String>) -> Self {
        self.annotations.insert(marker.into());
        self
    }

    /// Infer a descriptor from a runtime value.
    ///
    /// Containers get their element descriptor from the first entry when one
    /// exists; an empty container falls back to the `object` wildcard, which
    /// lets elements pass through unconverted.
    pub fn for_value(value: &Value) -> Self {
        match value {
            Value::List(items) => {
                let element = match items.first() {
                    Some(first) => Self::for_value(first),
                    None => Self::scalar(builtin::OBJECT),
                };
                Self::collection(element)
            }
            Value::Map(entries) => {
                let (key, val) = match entries.first() {
                    Some((k, v)) => (Self::for_value(k), Self::for_value(v)),
                    None => (Self::scalar(builtin::OBJECT), Self::scalar(builtin::OBJECT)),
                };
                Self::map(key, val)
            }
            other => Self::scalar(other.type_key()),
        }
    }

    /// The raw type key of this occurrence.
    #[inline]
    pub fn raw(&self) -> TypeKey {
        self.raw
    }

    /// The container shape.
    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Whether this occurrence accepts an absent value.
    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Whether this is an array occurrence.
    pub fn is_array(&self) -> bool {
        matches!(self.shape, Shape::Array { .. })
    }

    /// Whether this is a collection occurrence.
    pub fn is_collection(&self) -> bool {
        matches!(self.shape, Shape::Collection { .. })
    }

    /// Whether this is a map occurrence.
    pub fn is_map(&self) -> bool {
        matches!(self.shape, Shape::Map { .. })
    }

    /// The element descriptor of an array or collection occurrence.
    pub fn element(&self) -> Option<&TypeDescriptor> {
        match &self.shape {
            Shape::Array { element } | Shape::Collection { element } => Some(element),
            _ => None,
        }
    }

    /// The key descriptor of a map occurrence.
    pub fn map_key(&self) -> Option<&TypeDescriptor> {
        match &self.shape {
            Shape::Map { key, .. } => Some(key),
            _ => None,
        }
    }

    /// The value descriptor of a map occurrence.
    pub fn map_value(&self) -> Option<&TypeDescriptor> {
        match &self.shape {
            Shape::Map { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Check for a marker annotation.
    pub fn has_annotation(&self, marker: &str) -> bool {
        self.annotations.contains(marker)
    }
}
