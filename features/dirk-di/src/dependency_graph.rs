use std::collections::HashSet;

use thiserror::Error;

use crate::{
    registry::{Binding, BindingRegistry},
    types::{Key, Scope},
};

/// Validates a registry once, when the graph is built
///
/// Checks every binding registered directly in `registry`, following
/// dependencies into the ancestors as needed. `single_instance_keys` are keys a
/// single instance factory of this component must be able to serve.
pub fn check(
    registry: &BindingRegistry,
    single_instance_keys: &[Key],
) -> Result<(), DependencyGraphErrors> {
    let mut checked = HashSet::new();
    let mut errors = Vec::new();

    let mut bindings: Vec<_> = registry.bindings().collect();
    bindings.sort_by_key(|binding| binding.key);

    for binding in bindings {
        // Values of other scopes would be cached in instances shared with sibling components
        if binding.scope != registry.scope() {
            errors.push(DependencyGraphError::ScopeNotHosted {
                key: binding.key,
                scope: binding.scope,
                component: registry.scope(),
            });
        }

        let mut dependency_chain = Vec::new();
        check_recurse(
            registry,
            &mut checked,
            &mut errors,
            &mut dependency_chain,
            binding,
        );
    }

    for key in single_instance_keys {
        if !registry.contains(key) {
            errors.push(DependencyGraphError::MissingSingleInstance { key: *key });
        }
    }

    if !errors.is_empty() {
        return Err(DependencyGraphErrors { errors });
    }

    return Ok(());

    fn check_recurse(
        registry: &BindingRegistry,
        checked: &mut HashSet<Key>,
        errors: &mut Vec<DependencyGraphError>,
        dependency_chain: &mut Vec<Key>,
        binding: &Binding,
    ) {
        // Circular Dependency Check
        if let Some(start) = dependency_chain.iter().position(|key| *key == binding.key) {
            let mut chain = dependency_chain[start..].to_vec();
            chain.push(binding.key); // Add current so chain is complete

            errors.push(DependencyGraphError::CircularDependency {
                from: chain[0],
                to: binding.key,
                chain,
            });
            return;
        }

        // Skip other checks if already checked
        if !checked.insert(binding.key) {
            return;
        };

        dependency_chain.push(binding.key);

        for dependency in &binding.dependencies {
            let Ok(next) = registry.lookup(&dependency.key) else {
                if !dependency.optional {
                    errors.push(DependencyGraphError::MissingDependency {
                        dependency: dependency.key,
                        required_by: binding.key,
                    });
                }

                continue;
            };

            let narrows = match (registry.depth_of(binding.scope), registry.depth_of(next.scope)) {
                (Some(own), Some(dependency)) => dependency > own,
                _ => false,
            };
            if narrows {
                errors.push(DependencyGraphError::ScopeNarrowing {
                    key: binding.key,
                    dependency: next.key,
                    scope: next.scope,
                });
            }

            check_recurse(registry, checked, errors, dependency_chain, next);
        }

        dependency_chain.pop();
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyGraphError {
    #[error("'{required_by}' needs '{dependency}' but it is missing")]
    MissingDependency { dependency: Key, required_by: Key },
    #[error("A Circular Dependency exists between '{from}' and '{to}' through {chain:?}")]
    CircularDependency { from: Key, to: Key, chain: Vec<Key> },
    /// A component may only bind values of its own scope
    #[error("'{key}' is bound in scope '{scope}' but component '{component}' only binds its own scope")]
    ScopeNotHosted {
        key: Key,
        scope: Scope,
        component: Scope,
    },
    /// A binding depends on a value of a shorter lived scope
    #[error("'{key}' depends on '{dependency}' which only lives in the shorter scope '{scope}'")]
    ScopeNarrowing {
        key: Key,
        dependency: Key,
        scope: Scope,
    },
    #[error("Single instance factory serves '{key}' but it has no binding")]
    MissingSingleInstance { key: Key },
}
impl std::fmt::Display for DependencyGraphErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut display = Vec::new();
        display.push("The dependency graph had one or more errors:".to_string());
        for error in &self.errors {
            display.push(format!("- {}", error));
        }
        f.write_str(&display.join("\n"))
    }
}

#[derive(Error, Debug, Clone)]
pub struct DependencyGraphErrors {
    pub errors: Vec<DependencyGraphError>,
}
