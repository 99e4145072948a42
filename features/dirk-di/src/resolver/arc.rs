use std::sync::Arc;

use crate::{
    errors::RequireError,
    resolver::{Dependencies, Resolver},
    types::{DependencyInfo, Injectable, Key},
};

impl<T: Injectable> Resolver for Arc<T> {
    fn resolve(deps: &Dependencies) -> Result<Self, RequireError> {
        deps.require::<T>()
    }

    fn dependencies() -> Vec<DependencyInfo> {
        vec![DependencyInfo::required(Key::of::<T>())]
    }
}

impl<Resolvable: Resolver> Resolver for Option<Resolvable> {
    fn resolve(deps: &Dependencies) -> Result<Self, RequireError> {
        match Resolvable::resolve(deps) {
            Ok(resolved) => Ok(Some(resolved)),
            // If the required type is not bound, Option does not fail
            Err(RequireError::TypeMissing(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn dependencies() -> Vec<DependencyInfo> {
        Resolvable::dependencies()
            .into_iter()
            .map(|original| DependencyInfo {
                optional: true,
                ..original
            })
            .collect()
    }
}
