use std::sync::Arc;

use thiserror::Error;

use crate::{
    dependency_graph::DependencyGraphErrors,
    dispatch::SessionId,
    scope::ScopeId,
    types::{DynError, Key, Scope, TypeInfo},
};

/// Errors while building the graph, fatal to graph construction
#[derive(Error, Debug, Clone)]
pub enum BuildError {
    /// Two bindings share a key within one registry chain
    #[error("A binding has been registered twice: '{0}'")]
    DuplicateBinding(Key),
    /// Two dispatch entries share a target token
    #[error("A dispatch entry has been registered twice for target '{0}'")]
    DuplicateTarget(TypeInfo),
    /// There are issues with the dependency graph
    #[error(transparent)]
    DependencyGraph(#[from] DependencyGraphErrors),
}

/// Errors while resolving a key against a scope instance
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    #[error("No binding for '{key}'{}", required_by.map(|r| format!(" (required by '{r}')")).unwrap_or_default())]
    MissingBinding {
        key: Key,
        required_by: Option<Key>,
    },
    #[error("Circular dependency while resolving '{}': {}", chain.first().map(ToString::to_string).unwrap_or_default(), format_chain(chain))]
    CyclicDependency { chain: Vec<Key> },
    #[error("Tried to resolve '{key}' against destroyed scope {scope}")]
    ScopeDestroyed { key: Key, scope: ScopeId },
    #[error("'{key}' is bound in scope '{scope}' but no such scope is active")]
    MissingScope { key: Key, scope: Scope },
    #[error("Provider for '{key}' failed - error: {error}")]
    ProviderFailed { key: Key, error: Arc<DynError> },
    #[error(transparent)]
    Require(#[from] RequireError),
}

fn format_chain(chain: &[Key]) -> String {
    chain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors when extracting a typed value out of resolved dependencies
#[derive(Error, Debug, Clone)]
pub enum RequireError {
    /// The required key was not among the resolved dependencies
    #[error("The required type '{0}' was not resolved.")]
    TypeMissing(Key),

    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
}

/// Errors when creating child scopes
#[derive(Error, Debug, Clone)]
pub enum ScopeError {
    #[error("Can not create a child of destroyed scope {0}")]
    ParentDestroyed(ScopeId),
    #[error("Child scopes can not carry the Root tag")]
    RootTag,
    #[error("Subcomponent for scope '{0}' was not built against this container's registry")]
    ParentMismatch(Scope),
}

/// Errors surfaced by the dispatching injector and single instance factories
#[derive(Error, Debug, Clone)]
pub enum InjectError {
    #[error("No injector registered for target '{0}'")]
    UnknownTarget(TypeInfo),
    #[error("The single instance factory does not serve '{0}'")]
    UnsupportedKey(Key),
    #[error("Session {0} has already ended")]
    SessionEnded(SessionId),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error(transparent)]
    Require(#[from] RequireError),
}
