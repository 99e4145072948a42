use std::sync::Arc;

use crate::{
    registry::Binding,
    resolver::{Dependencies, Resolver},
    types::{DependencyInfo, DynError, Injectable, Instance, Key, Scope, TypeInfo},
};

/// Type erased provider body: resolved dependencies in, built value out
pub type Provider = Arc<dyn Fn(&Dependencies) -> Result<Instance, DynError> + Send + Sync>;

/// A Factory providing instances of a given type
///
/// Factories must not call back into the container, everything they need is
/// declared in [InstanceFactory::get_dependencies] and handed to `construct`.
pub trait InstanceFactory: Send + Sync + 'static {
    type Provides: Injectable;

    /// Returns the typeinfo about the factory's provided type
    fn supplies() -> TypeInfo {
        TypeInfo::of::<Self::Provides>()
    }

    /// Returns a list of dependencies the factory requires to supply it's type
    fn get_dependencies() -> Vec<DependencyInfo>;

    /// Constructs a new instance of the factory's provided type
    fn construct(&self, deps: &Dependencies) -> Result<Self::Provides, DynError>;
}

/// Turns any [InstanceFactory] into a binding for `scope`
pub(crate) fn factory_binding<Factory: InstanceFactory>(scope: Scope, factory: Factory) -> Binding {
    let provider: Provider = Arc::new(move |deps: &Dependencies| -> Result<Instance, DynError> {
        // Forward the call to the specific implementation
        factory.construct(deps).map(Instance::new)
    });

    Binding {
        key: Key::of::<Factory::Provides>(),
        scope,
        dependencies: Factory::get_dependencies(),
        provider,
    }
}

/// Binding from a closure taking its dependencies as a [Resolver]
pub(crate) fn fn_binding<T, D, E, F>(key: Key, scope: Scope, provide: F) -> Binding
where
    T: Injectable,
    D: Resolver + 'static,
    E: Into<DynError> + 'static,
    F: Fn(D) -> Result<T, E> + Send + Sync + 'static,
{
    let provider: Provider = Arc::new(move |deps: &Dependencies| -> Result<Instance, DynError> {
        let resolved = D::resolve(deps)?;
        provide(resolved).map(Instance::new).map_err(Into::into)
    });

    Binding {
        key,
        scope,
        dependencies: D::dependencies(),
        provider,
    }
}

/// Binding handing out clones of an existing instance
pub(crate) fn instance_binding(key: Key, scope: Scope, instance: Instance) -> Binding {
    let provider: Provider =
        Arc::new(move |_: &Dependencies| -> Result<Instance, DynError> { Ok(instance.clone()) });

    Binding {
        key,
        scope,
        dependencies: Vec::new(),
        provider,
    }
}
