use std::{
    collections::HashSet,
    sync::{Arc, PoisonError},
};

use crate::{
    errors::ResolveError,
    registry::{Binding, BindingRegistry},
    resolver::Dependencies,
    scope::ScopeInstance,
    types::{DependencyInfo, Instance, Key},
};

/// Resolves keys against a scope instance, building and caching missing values
///
/// Every top-level call runs in two phases. Planning walks the graph depth first,
/// tracking the keys currently being resolved to detect cycles, and collects every
/// binding that is not cached yet in dependency order. Construction then runs the
/// providers in that order. Nothing is built unless the whole plan is valid.
pub struct GraphResolver<'a> {
    registry: &'a BindingRegistry,
}

/// A binding to build and the scope instance which will own the value
struct Step<'a> {
    binding: Arc<Binding>,
    owner: &'a ScopeInstance,
}

#[derive(Default)]
struct Plan<'a> {
    steps: Vec<Step<'a>>,
    /// Keys already planned or found cached
    visited: HashSet<Key>,
    /// Keys currently being resolved, in resolution order
    resolving: Vec<Key>,
}

impl<'a> GraphResolver<'a> {
    pub fn new(registry: &'a BindingRegistry) -> Self {
        Self { registry }
    }

    pub fn resolve(&self, key: &Key, scope: &ScopeInstance) -> Result<Instance, ResolveError> {
        let dependency = DependencyInfo::required(*key);
        let resolved = self.resolve_all(std::slice::from_ref(&dependency), scope)?;

        resolved
            .get(key)
            .cloned()
            .ok_or(ResolveError::MissingBinding {
                key: *key,
                required_by: None,
            })
    }

    /// Resolves a whole dependency list in one pass, shared dependencies are planned once
    pub fn resolve_all(
        &self,
        dependencies: &[DependencyInfo],
        scope: &ScopeInstance,
    ) -> Result<Dependencies, ResolveError> {
        for dependency in dependencies {
            scope.ensure_alive(&dependency.key)?;
        }

        let mut plan = Plan::default();
        for dependency in dependencies {
            self.plan(dependency, None, scope, &mut plan)?;
        }

        tracing::trace!(
            "Planned {} constructions for {} dependencies in scope {}",
            plan.steps.len(),
            dependencies.len(),
            scope.id()
        );

        for step in &plan.steps {
            self.construct(step)?;
        }

        self.collect(dependencies, scope)
    }

    fn plan<'s>(
        &self,
        dependency: &DependencyInfo,
        required_by: Option<&Key>,
        scope: &'s ScopeInstance,
        plan: &mut Plan<'s>,
    ) -> Result<(), ResolveError> {
        let key = &dependency.key;

        if plan.resolving.contains(key) {
            let start = plan
                .resolving
                .iter()
                .position(|resolving| resolving == key)
                .unwrap_or_default();
            let mut chain = plan.resolving[start..].to_vec();
            chain.push(*key);
            return Err(ResolveError::CyclicDependency { chain });
        }

        let binding = match self.registry.lookup(key) {
            Ok(binding) => binding,
            Err(_) if dependency.optional => return Ok(()),
            Err(_) => {
                tracing::error!("Tried to resolve an unbound key: {key}");
                return Err(ResolveError::MissingBinding {
                    key: *key,
                    required_by: required_by.copied(),
                });
            }
        };

        let owner = scope
            .owner_of(binding.scope)
            .ok_or(ResolveError::MissingScope {
                key: *key,
                scope: binding.scope,
            })?;

        if plan.visited.contains(key) {
            return Ok(());
        }

        if owner.cached(key)?.is_some() {
            tracing::trace!("Cache hit for {key} in scope {}", owner.id());
            plan.visited.insert(*key);
            return Ok(());
        }

        // Dependencies are resolved from the instance that will own the value,
        // a value never captures anything shorter lived than itself
        plan.resolving.push(*key);
        for next in &binding.dependencies {
            self.plan(next, Some(key), owner, plan)?;
        }
        plan.resolving.pop();

        plan.visited.insert(*key);
        plan.steps.push(Step {
            binding: binding.clone(),
            owner,
        });

        Ok(())
    }

    /// Builds one planned binding unless another caller published it first
    fn construct(&self, step: &Step<'_>) -> Result<(), ResolveError> {
        let binding = &step.binding;
        let key = &binding.key;

        let lock = step.owner.construction_lock(key);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        if step.owner.cached(key)?.is_some() {
            tracing::trace!("{key} was built concurrently in scope {}", step.owner.id());
            return Ok(());
        }

        // Dependencies were planned before this step, they are cached by now
        let dependencies = self.collect(&binding.dependencies, step.owner)?;

        let instance =
            (binding.provider)(&dependencies).map_err(|error| ResolveError::ProviderFailed {
                key: *key,
                error: Arc::new(error),
            })?;

        tracing::debug!(
            "Constructed instance of {key} in scope {} {}",
            binding.scope,
            step.owner.id()
        );
        step.owner.store(*key, instance)
    }

    /// Reads already built values out of their owning scope instances
    fn collect(
        &self,
        dependencies: &[DependencyInfo],
        scope: &ScopeInstance,
    ) -> Result<Dependencies, ResolveError> {
        let mut collected = Dependencies::new();

        for dependency in dependencies {
            let key = &dependency.key;
            let binding = match self.registry.lookup(key) {
                Ok(binding) => binding,
                Err(_) if dependency.optional => continue,
                Err(e) => return Err(e),
            };
            let owner = scope
                .owner_of(binding.scope)
                .ok_or(ResolveError::MissingScope {
                    key: *key,
                    scope: binding.scope,
                })?;
            let instance = owner.cached(key)?.ok_or(ResolveError::ScopeDestroyed {
                key: *key,
                scope: owner.id(),
            })?;

            collected.insert(*key, instance);
        }

        Ok(collected)
    }
}
