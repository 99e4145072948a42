use std::{collections::HashMap, fmt::Debug, sync::Arc};

use crate::{
    errors::{BuildError, ResolveError},
    factories::Provider,
    types::{DependencyInfo, Key, Scope},
};

/// A registered rule for producing the value of one key
#[derive(Clone)]
pub struct Binding {
    pub key: Key,
    /// Which scope instance may cache the built value
    pub scope: Scope,
    /// Resolved in this order before the provider runs
    pub dependencies: Vec<DependencyInfo>,
    pub provider: Provider,
}
impl Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("scope", &self.scope)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Key to binding map of one component, optionally chained to its parent's
///
/// Filled once while the graph is built, read-only afterwards.
pub struct BindingRegistry {
    /// Scope tag this registry's component introduces
    scope: Scope,
    bindings: HashMap<Key, Arc<Binding>>,
    parent: Option<Arc<BindingRegistry>>,
}
impl Debug for BindingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.bindings.keys().collect();
        keys.sort();
        f.debug_struct("BindingRegistry")
            .field("scope", &self.scope)
            .field("bindings", &keys)
            .field("parent", &self.parent)
            .finish()
    }
}

impl BindingRegistry {
    /// Registry of the root component
    pub fn root() -> Self {
        Self {
            scope: Scope::Root,
            bindings: HashMap::new(),
            parent: None,
        }
    }

    /// Registry of a child component introducing `scope`
    pub fn child(parent: Arc<BindingRegistry>, scope: Scope) -> Self {
        Self {
            scope,
            bindings: HashMap::new(),
            parent: Some(parent),
        }
    }

    pub fn register(
        &mut self,
        key: Key,
        scope: Scope,
        dependencies: Vec<DependencyInfo>,
        provider: Provider,
    ) -> Result<(), BuildError> {
        self.insert(Binding {
            key,
            scope,
            dependencies,
            provider,
        })
    }

    /// Adds a binding, keys must be unique across the whole registry chain
    pub fn insert(&mut self, binding: Binding) -> Result<(), BuildError> {
        if self.contains(&binding.key) {
            return Err(BuildError::DuplicateBinding(binding.key));
        }

        self.bindings.insert(binding.key, Arc::new(binding));
        Ok(())
    }

    /// Looks up `key` here, then in the ancestors
    pub fn lookup(&self, key: &Key) -> Result<&Arc<Binding>, ResolveError> {
        let mut registry = Some(self);
        while let Some(current) = registry {
            if let Some(binding) = current.bindings.get(key) {
                return Ok(binding);
            }
            registry = current.parent.as_deref();
        }

        Err(ResolveError::MissingBinding {
            key: *key,
            required_by: None,
        })
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.lookup(key).is_ok()
    }

    /// True if `scope` belongs to this registry's component or one of its ancestors
    pub fn hosts(&self, scope: Scope) -> bool {
        self.depth_of(scope).is_some()
    }

    /// Position of `scope` in the chain counted from the root component, longer lived scopes come first
    pub fn depth_of(&self, scope: Scope) -> Option<usize> {
        let mut chain = Vec::new();
        let mut registry = Some(self);
        while let Some(current) = registry {
            chain.push(current.scope);
            registry = current.parent.as_deref();
        }

        chain.iter().rev().position(|candidate| *candidate == scope)
    }

    /// Bindings registered directly in this registry
    pub fn bindings(&self) -> impl Iterator<Item = &Arc<Binding>> {
        self.bindings.values()
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn parent(&self) -> Option<&Arc<BindingRegistry>> {
        self.parent.as_ref()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
