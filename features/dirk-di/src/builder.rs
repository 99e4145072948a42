use std::sync::Arc;

use crate::{
    container::{Container, Subcomponent},
    dependency_graph,
    dispatch::{DispatchingInjector, InjectionTarget},
    errors::BuildError,
    factories::{self, InstanceFactory, Provider},
    registry::{Binding, BindingRegistry},
    resolver::Resolver,
    scope::ScopeManager,
    types::{DependencyInfo, DynError, Injectable, Instance, Key, Scope, TypeInfo},
};

//////////////////////////////////////////////////////////////////////
//
// The graph is built in three steps.
// 1. Modules collect bindings: key, scope, dependencies and provider
// 2. The ContainerBuilder installs modules and subcomponents (one per dispatch target)
// 3. `build` registers everything, validates each registry once and hands out the Component

/// A set of bindings installed together
#[derive(Default)]
pub struct Module {
    pub(crate) bindings: Vec<Binding>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `key` to a raw provider
    pub fn bind(
        mut self,
        key: Key,
        scope: Scope,
        dependencies: Vec<DependencyInfo>,
        provider: Provider,
    ) -> Self {
        self.bindings.push(Binding {
            key,
            scope,
            dependencies,
            provider,
        });
        self
    }

    /// Binds `T` to a function of its dependencies
    ///
    /// The dependency list is taken from `D`, e.g. `(Arc<NameService>, Option<Arc<Settings>>)`.
    pub fn provide<T, D, F>(self, scope: Scope, provide: F) -> Self
    where
        T: Injectable,
        D: Resolver + 'static,
        F: Fn(D) -> T + Send + Sync + 'static,
    {
        self.try_provide(scope, move |deps: D| Ok::<_, DynError>(provide(deps)))
    }

    /// Like [Module::provide], for providers which can fail
    pub fn try_provide<T, D, E, F>(self, scope: Scope, provide: F) -> Self
    where
        T: Injectable,
        D: Resolver + 'static,
        E: Into<DynError> + 'static,
        F: Fn(D) -> Result<T, E> + Send + Sync + 'static,
    {
        self.try_provide_key(Key::of::<T>(), scope, provide)
    }

    /// Like [Module::try_provide], binding a qualified key
    pub fn try_provide_key<T, D, E, F>(mut self, key: Key, scope: Scope, provide: F) -> Self
    where
        T: Injectable,
        D: Resolver + 'static,
        E: Into<DynError> + 'static,
        F: Fn(D) -> Result<T, E> + Send + Sync + 'static,
    {
        self.bindings
            .push(factories::fn_binding(key, scope, provide));
        self
    }

    /// Binds an already built value, shared process wide
    pub fn add_instance<T: Injectable>(self, instance: T) -> Self {
        self.add_instance_in(Scope::Root, instance)
    }

    /// Binds an already built value in `scope`, for modules installed into a subcomponent
    pub fn add_instance_in<T: Injectable>(mut self, scope: Scope, instance: T) -> Self {
        self.bindings.push(factories::instance_binding(
            Key::of::<T>(),
            scope,
            Instance::new(instance),
        ));
        self
    }

    pub fn add_factory<Factory: InstanceFactory>(mut self, scope: Scope, factory: Factory) -> Self {
        self.bindings
            .push(factories::factory_binding(scope, factory));
        self
    }

    /// Merges another module's bindings into this one
    pub fn include(mut self, other: Module) -> Self {
        self.bindings.extend(other.bindings);
        self
    }
}

/// Describes the child component a dispatch target is injected from
pub struct SubcomponentBuilder {
    scope: Scope,
    bindings: Vec<Binding>,
    single_instance_keys: Vec<Key>,
}

impl SubcomponentBuilder {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            bindings: Vec::new(),
            single_instance_keys: Vec::new(),
        }
    }

    pub fn install(mut self, module: Module) -> Self {
        self.bindings.extend(module.bindings);
        self
    }

    /// Lets the component's single instance factory serve `T`
    pub fn single_instance<T: Injectable>(self) -> Self {
        self.single_instance_key(Key::of::<T>())
    }

    pub fn single_instance_key(mut self, key: Key) -> Self {
        self.single_instance_keys.push(key);
        self
    }

    fn build(self, parent: &Arc<BindingRegistry>) -> Result<Subcomponent, BuildError> {
        let mut registry = BindingRegistry::child(parent.clone(), self.scope);
        for binding in self.bindings {
            registry.insert(binding)?;
        }

        dependency_graph::check(&registry, &self.single_instance_keys)?;

        Ok(Subcomponent {
            registry: Arc::new(registry),
            single_instance_keys: Arc::new(self.single_instance_keys.into_iter().collect()),
        })
    }
}

/// Built application graph: the root container and the injector routing to its children
#[derive(Debug)]
pub struct Component {
    pub container: Container,
    pub injector: DispatchingInjector,
}
impl Component {
    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn injector(&self) -> &DispatchingInjector {
        &self.injector
    }
}

#[derive(Default)]
pub struct ContainerBuilder {
    /// Bindings of the root component
    bindings: Vec<Binding>,
    /// One subcomponent per dispatch target
    subcomponents: Vec<(TypeInfo, SubcomponentBuilder)>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(mut self, module: Module) -> Self {
        self.bindings.extend(module.bindings);
        self
    }

    /// Registers the child component targets of type `Target` are injected from
    pub fn subcomponent<Target: InjectionTarget>(self, subcomponent: SubcomponentBuilder) -> Self {
        self.subcomponent_for(TypeInfo::of::<Target>(), subcomponent)
    }

    pub fn subcomponent_for(mut self, token: TypeInfo, subcomponent: SubcomponentBuilder) -> Self {
        self.subcomponents.push((token, subcomponent));
        self
    }

    pub fn build(self) -> Result<Component, BuildError> {
        let ContainerBuilder {
            bindings,
            subcomponents,
        } = self;

        tracing::debug!(
            "Building graph with {} root bindings and {} subcomponents",
            bindings.len(),
            subcomponents.len()
        );

        let mut registry = BindingRegistry::root();
        for binding in bindings {
            registry.insert(binding)?;
        }
        dependency_graph::check(&registry, &[])?;
        let registry = Arc::new(registry);

        let container = Container::root(registry.clone(), Arc::new(ScopeManager::new()));
        let mut injector = DispatchingInjector::new(container.clone());

        for (token, subcomponent) in subcomponents {
            let subcomponent = subcomponent.build(&registry)?;
            tracing::debug!(
                "Registered {token} with {} bindings in scope {}",
                subcomponent.registry.len(),
                subcomponent.scope()
            );
            injector.register(token, subcomponent)?;
        }

        Ok(Component {
            container,
            injector,
        })
    }
}
