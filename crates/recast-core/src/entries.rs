//! Type-space entries.
//!
//! These describe the hierarchy position of a user type: a class with an
//! optional base class and a set of implemented interfaces, or an interface
//! with the interfaces it extends. The engine never introspects values for
//! hierarchy information; callers declare it once during configuration.

use crate::TypeKey;

/// Entry for a class-like type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    /// Qualified name.
    pub name: String,
    /// Type key for identity (computed from the name).
    pub key: TypeKey,
    /// Base class key (single inheritance).
    pub base: Option<TypeKey>,
    /// Implemented interface keys, in declaration order.
    pub interfaces: Vec<TypeKey>,
}

impl ClassInfo {
    /// Create a class entry with no base class and no interfaces.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let key = TypeKey::from_name(&name);
        Self {
            name,
            key,
            base: None,
            interfaces: Vec::new(),
        }
    }

    /// Set the base class.
    pub fn with_base(mut self, base: TypeKey) -> Self {
        self.base = Some(base);
        self
    }

    /// Add an implemented interface.
    pub fn with_interface(mut self, interface: TypeKey) -> Self {
        self.interfaces.push(interface);
        self
    }
}

/// Entry for an interface type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceInfo {
    /// Qualified name.
    pub name: String,
    /// Type key for identity (computed from the name).
    pub key: TypeKey,
    /// Extended interface keys, in declaration order.
    pub extends: Vec<TypeKey>,
}

impl InterfaceInfo {
    /// Create an interface entry that extends nothing.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let key = TypeKey::from_name(&name);
        Self {
            name,
            key,
            extends: Vec::new(),
        }
    }

    /// Add an extended interface.
    pub fn with_extends(mut self, interface: TypeKey) -> Self {
        self.extends.push(interface);
        self
    }
}
