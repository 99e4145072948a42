use std::{collections::HashMap, sync::Arc};

use crate::{
    errors::RequireError,
    types::{DependencyInfo, Injectable, Instance, Key},
};

pub mod arc;

/// Resolved dependency values handed to a provider or an injection target
#[derive(Debug, Default, Clone)]
pub struct Dependencies {
    resolved: HashMap<Key, Instance>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: Key, instance: Instance) {
        self.resolved.insert(key, instance);
    }

    /// Raw access by key, `None` if the key was optional and unbound
    pub fn get(&self, key: &Key) -> Option<&Instance> {
        self.resolved.get(key)
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.resolved.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    pub fn require<T: Injectable>(&self) -> Result<Arc<T>, RequireError> {
        self.require_key(&Key::of::<T>())
    }

    pub fn require_named<T: Injectable>(
        &self,
        qualifier: &'static str,
    ) -> Result<Arc<T>, RequireError> {
        self.require_key(&Key::named::<T>(qualifier))
    }

    pub fn require_key<T: Injectable>(&self, key: &Key) -> Result<Arc<T>, RequireError> {
        let instance = self
            .resolved
            .get(key)
            .ok_or(RequireError::TypeMissing(*key))?;

        instance
            .downcast()
            .map_err(|actual_type| RequireError::DowncastFailed {
                required_type: std::any::type_name::<T>(),
                actual_type,
            })
    }

    pub fn resolve<R: Resolver>(&self) -> Result<R, RequireError> {
        R::resolve(self)
    }
}

/// Typed extraction of values out of [Dependencies]
///
/// `dependencies` must list every key `resolve` reads, it is used as the
/// declared dependency list of typed providers.
pub trait Resolver: Sized {
    fn resolve(deps: &Dependencies) -> Result<Self, RequireError>;

    fn dependencies() -> Vec<DependencyInfo>;
}

macro_rules! impl_resolver_tuple {
    ($($name:ident),*) => {
        impl<$($name: Resolver),*> Resolver for ($($name,)*) {
            #[allow(unused_variables)]
            fn resolve(deps: &Dependencies) -> Result<Self, RequireError> {
                Ok(($($name::resolve(deps)?,)*))
            }

            fn dependencies() -> Vec<DependencyInfo> {
                #[allow(unused_mut)]
                let mut all = Vec::new();
                $(all.extend($name::dependencies());)*
                all
            }
        }
    };
}

impl_resolver_tuple!();
impl_resolver_tuple!(A);
impl_resolver_tuple!(A, B);
impl_resolver_tuple!(A, B, C);
impl_resolver_tuple!(A, B, C, D);
impl_resolver_tuple!(A, B, C, D, E);
impl_resolver_tuple!(A, B, C, D, E, F);
impl_resolver_tuple!(A, B, C, D, E, F, G);
impl_resolver_tuple!(A, B, C, D, E, F, G, H);
