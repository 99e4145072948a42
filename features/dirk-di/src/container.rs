use std::{any::type_name, collections::HashSet, fmt::Debug, sync::Arc};

use crate::{
    errors::{RequireError, ResolveError, ScopeError},
    graph::GraphResolver,
    registry::BindingRegistry,
    resolver::Dependencies,
    scope::{ScopeInstance, ScopeManager},
    single_instance::SingleInstanceFactory,
    types::{DependencyInfo, Injectable, Instance, Key, Scope},
};

/// A registry paired with the scope instance values are resolved against
///
/// Cheap to clone, all clones share the same scope instance.
#[derive(Clone)]
pub struct Container(pub(crate) Arc<ContainerInner>);
pub(crate) struct ContainerInner {
    registry: Arc<BindingRegistry>,
    scope: ScopeInstance,
    scopes: Arc<ScopeManager>,
    single_instance_keys: Arc<HashSet<Key>>,
}
impl Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("scope", &self.0.scope)
            .field("bindings", &self.0.registry.len())
            .finish()
    }
}

/// Blueprint of a child container: a validated registry plus the scope it introduces
#[derive(Debug, Clone)]
pub struct Subcomponent {
    pub(crate) registry: Arc<BindingRegistry>,
    pub(crate) single_instance_keys: Arc<HashSet<Key>>,
}
impl Subcomponent {
    pub fn scope(&self) -> Scope {
        self.registry.scope()
    }

    pub fn registry(&self) -> &Arc<BindingRegistry> {
        &self.registry
    }
}

impl Container {
    /// The root container, resolving against the root scope instance
    pub(crate) fn root(registry: Arc<BindingRegistry>, scopes: Arc<ScopeManager>) -> Self {
        let scope = scopes.root().clone();
        Self(Arc::new(ContainerInner {
            registry,
            scope,
            scopes,
            single_instance_keys: Arc::default(),
        }))
    }

    /// Opens a new child scope instance described by `subcomponent`
    pub fn child(&self, subcomponent: &Subcomponent) -> Result<Container, ScopeError> {
        let built_against = subcomponent.registry.parent();
        if !built_against.is_some_and(|parent| Arc::ptr_eq(parent, &self.0.registry)) {
            return Err(ScopeError::ParentMismatch(subcomponent.scope()));
        }

        let scope = self
            .0
            .scopes
            .create_child_scope(&self.0.scope, subcomponent.scope())?;

        Ok(Self(Arc::new(ContainerInner {
            registry: subcomponent.registry.clone(),
            scope,
            scopes: self.0.scopes.clone(),
            single_instance_keys: subcomponent.single_instance_keys.clone(),
        })))
    }

    pub fn resolve(&self, key: &Key) -> Result<Instance, ResolveError> {
        self.resolver().resolve(key, &self.0.scope)
    }

    pub fn resolve_all(&self, dependencies: &[DependencyInfo]) -> Result<Dependencies, ResolveError> {
        self.resolver().resolve_all(dependencies, &self.0.scope)
    }

    /// Attempts to get the requested type
    pub fn require<T: Injectable>(&self) -> Result<Arc<T>, ResolveError> {
        self.require_key(&Key::of::<T>())
    }

    pub fn require_key<T: Injectable>(&self, key: &Key) -> Result<Arc<T>, ResolveError> {
        let instance = self.resolve(key)?;
        instance.downcast().map_err(|actual_type| {
            RequireError::DowncastFailed {
                required_type: type_name::<T>(),
                actual_type,
            }
            .into()
        })
    }

    pub fn resolver(&self) -> GraphResolver<'_> {
        GraphResolver::new(&self.0.registry)
    }

    /// Factory handing out the one value this container's scope owns per configured key
    pub fn single_instance_factory(&self) -> SingleInstanceFactory {
        SingleInstanceFactory::new(self.clone(), self.0.single_instance_keys.clone())
    }

    pub fn registry(&self) -> &Arc<BindingRegistry> {
        &self.0.registry
    }

    pub fn scope(&self) -> &ScopeInstance {
        &self.0.scope
    }

    pub fn scopes(&self) -> &Arc<ScopeManager> {
        &self.0.scopes
    }

    /// Tears down this container's scope instance, see [ScopeManager::destroy]
    pub fn destroy(&self) {
        self.0.scopes.destroy(&self.0.scope);
    }

    pub fn is_destroyed(&self) -> bool {
        self.0.scope.is_destroyed()
    }
}
