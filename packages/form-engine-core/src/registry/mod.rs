//! Component type registry.

mod definition;

pub use definition::{
    ComponentDefinition, ComponentKind, ConfigValidator, TransformConfigFn, TransformPropsFn,
};

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::components::register_builtin_components;

/// Mapping from type name to component definition.
///
/// Cloning yields a handle to the same registry. Independent engines
/// construct independent registries.
#[derive(Default, Clone)]
pub struct ComponentRegistry {
    definitions: Arc<RwLock<HashMap<String, Arc<ComponentDefinition>>>>,
}

impl ComponentRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            definitions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Creates a registry holding the built-in component types.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        register_builtin_components(&registry);
        registry
    }

    /// Registers a definition under `type_name`.
    ///
    /// An existing registration is replaced (last registration wins).
    ///
    /// # Arguments
    /// * `type_name` - Value of the `type` field selecting this definition
    /// * `definition` - Component definition
    ///
    /// # Returns
    /// The replaced definition, if any.
    pub fn register(
        &self,
        type_name: impl Into<String>,
        definition: ComponentDefinition,
    ) -> Option<Arc<ComponentDefinition>> {
        let type_name = type_name.into();
        let previous = self
            .definitions
            .write()
            .insert(type_name.clone(), Arc::new(definition));
        if previous.is_some() {
            tracing::warn!(
                type_name = %type_name,
                "component type already registered, overwriting"
            );
        }
        previous
    }

    /// Looks up the definition for a type.
    ///
    /// The returned handle does not hold the registry lock.
    pub fn lookup(&self, type_name: &str) -> Option<Arc<ComponentDefinition>> {
        self.definitions.read().get(type_name).cloned()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.definitions.read().contains_key(type_name)
    }

    /// Returns all registered type names, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.definitions.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Removes a registration.
    ///
    /// # Returns
    /// `true` if the type was removed, `false` if it wasn't found.
    pub fn remove(&self, type_name: &str) -> bool {
        self.definitions.write().remove(type_name).is_some()
    }

    pub fn len(&self) -> usize {
        self.definitions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.read().is_empty()
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}
