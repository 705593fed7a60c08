//! TypeSpace - hierarchy storage and lineage computation.
//!
//! The engine never introspects values for hierarchy information. Instead,
//! the configuration phase registers [`ClassInfo`] and [`InterfaceInfo`]
//! entries here, and resolution asks for a type's *lineage*: the ordered
//! list of type keys the hierarchy search walks for that type.
//!
//! # Lineage Order
//!
//! 1. The type itself, then each superclass up to the root.
//! 2. Interfaces, breadth-first: each class's own declared interfaces before
//!    the superclass's interfaces, then extended interfaces level by level.
//!    Interfaces reachable through multiple paths are visited once,
//!    first-seen order winning.
//! 3. The universal `object` type, last.
//!
//! Lineages are memoized per key behind a read/write lock, so the hot
//! resolution path is a read lock plus an `Arc` clone.
//!
//! # Thread Safety
//!
//! Registration is single-threaded configuration-phase work. After
//! configuration the space is read-only and safe to share; the memo map is
//! the only interior mutability and tolerates concurrent first-writes.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use recast_core::{builtin, ClassInfo, InterfaceInfo, RegistrationError, TypeKey};

/// Storage for type hierarchy information.
#[derive(Default)]
pub struct TypeSpace {
    classes: FxHashMap<TypeKey, ClassInfo>,
    interfaces: FxHashMap<TypeKey, InterfaceInfo>,
    names: FxHashMap<TypeKey, String>,
    lineages: RwLock<FxHashMap<TypeKey, Arc<[TypeKey]>>>,
}

impl TypeSpace {
    /// Create an empty type space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a type space with the builtin value types registered.
    ///
    /// `int`, `uint` and `float` are registered beneath the abstract
    /// `number` base, so converters and factories can target the whole
    /// numeric range with one declared pair.
    pub fn with_builtins() -> Self {
        let mut space = Self::new();
        for name in ["bool", "string", "bytes", "list", "map", "number", "object"] {
            space.register_builtin(ClassInfo::new(name));
        }
        for name in ["int", "uint", "float"] {
            space.register_builtin(ClassInfo::new(name).with_base(builtin::NUMBER));
        }
        space
    }

    /// Builtins are always registered (no duplicate check).
    fn register_builtin(&mut self, entry: ClassInfo) {
        self.names.insert(entry.key, entry.name.clone());
        self.classes.insert(entry.key, entry);
    }

    /// Register a class entry.
    ///
    /// Returns an error if a type with the same key already exists.
    pub fn register_class(&mut self, entry: ClassInfo) -> Result<(), RegistrationError> {
        if self.contains(entry.key) {
            return Err(RegistrationError::DuplicateType(entry.name));
        }
        debug!(name = %entry.name, key = %entry.key, "registered class");
        self.names.insert(entry.key, entry.name.clone());
        self.classes.insert(entry.key, entry);
        self.lineages.write().clear();
        Ok(())
    }

    /// Register an interface entry.
    ///
    /// Returns an error if a type with the same key already exists.
    pub fn register_interface(&mut self, entry: InterfaceInfo) -> Result<(), RegistrationError> {
        if self.contains(entry.key) {
            return Err(RegistrationError::DuplicateType(entry.name));
        }
        debug!(name = %entry.name, key = %entry.key, "registered interface");
        self.names.insert(entry.key, entry.name.clone());
        self.interfaces.insert(entry.key, entry);
        self.lineages.write().clear();
        Ok(())
    }

    /// Check if a type is registered.
    pub fn contains(&self, key: TypeKey) -> bool {
        self.classes.contains_key(&key) || self.interfaces.contains_key(&key)
    }

    /// Get a registered type's name.
    pub fn name_of(&self, key: TypeKey) -> Option<&str> {
        self.names.get(&key).map(String::as_str)
    }

    /// Get the number of registered types.
    pub fn type_count(&self) -> usize {
        self.classes.len() + self.interfaces.len()
    }

    /// The ordered hierarchy walk list for a type.
    ///
    /// Unregistered keys are treated as leaf types: their lineage is the key
    /// itself followed by `object`.
    pub fn lineage(&self, key: TypeKey) -> Arc<[TypeKey]> {
        if let Some(lineage) = self.lineages.read().get(&key) {
            return Arc::clone(lineage);
        }
        let computed: Arc<[TypeKey]> = self.compute_lineage(key).into();
        // Two threads may compute the same lineage concurrently; the result
        // is identical, so first-insert wins.
        Arc::clone(
            self.lineages
                .write()
                .entry(key)
                .or_insert(computed),
        )
    }

    /// Check whether a source type is assignable to a target type.
    pub fn is_assignable(&self, source: TypeKey, target: TypeKey) -> bool {
        source == target || self.lineage(source).contains(&target)
    }

    fn compute_lineage(&self, key: TypeKey) -> Vec<TypeKey> {
        let mut order = Vec::new();
        let mut seen = FxHashSet::default();

        // Class chain: the type itself, then superclasses up to the root.
        let mut chain = Vec::new();
        let mut current = Some(key);
        while let Some(k) = current {
            if !seen.insert(k) {
                // Inheritance cycle in the configuration; stop walking.
                break;
            }
            chain.push(k);
            current = self.classes.get(&k).and_then(|c| c.base);
        }
        order.extend(chain.iter().copied());

        // Interfaces, breadth-first. Seed with each chain entry's declared
        // interfaces in chain order, so a class's own interfaces come before
        // its superclass's.
        let mut queue = VecDeque::new();
        for k in &chain {
            if let Some(class) = self.classes.get(k) {
                queue.extend(class.interfaces.iter().copied());
            }
            if let Some(interface) = self.interfaces.get(k) {
                queue.extend(interface.extends.iter().copied());
            }
        }
        while let Some(i) = queue.pop_front() {
            if !seen.insert(i) {
                continue;
            }
            order.push(i);
            if let Some(info) = self.interfaces.get(&i) {
                queue.extend(info.extends.iter().copied());
            }
        }

        if key != builtin::OBJECT && seen.insert(builtin::OBJECT) {
            order.push(builtin::OBJECT);
        }

        order
    }
}

impl std::fmt::Debug for TypeSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeSpace")
            .field("classes", &self.classes.len())
            .field("interfaces", &self.interfaces.len())
            .finish()
    }
}
