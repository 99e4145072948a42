use std::{any::type_name, collections::HashSet, fmt::Debug, sync::Arc};

use crate::{
    container::Container,
    errors::{InjectError, RequireError},
    types::{Injectable, Instance, Key},
};

/// Hands out the one value a scope owns for each key it was configured for
///
/// Values are built through the graph on the first request and come from the
/// scope's cache afterwards. The factory is bound to its container's scope:
/// once that scope is destroyed every request fails.
#[derive(Clone)]
pub struct SingleInstanceFactory {
    container: Container,
    supported: Arc<HashSet<Key>>,
}
impl Debug for SingleInstanceFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleInstanceFactory")
            .field("scope", &self.container.scope().id())
            .field("supported", &self.supported)
            .finish()
    }
}

impl SingleInstanceFactory {
    pub(crate) fn new(container: Container, supported: Arc<HashSet<Key>>) -> Self {
        Self {
            container,
            supported,
        }
    }

    pub fn get<T: Injectable>(&self) -> Result<Arc<T>, InjectError> {
        let instance = self.get_key(&Key::of::<T>())?;
        instance.downcast().map_err(|actual_type| {
            RequireError::DowncastFailed {
                required_type: type_name::<T>(),
                actual_type,
            }
            .into()
        })
    }

    pub fn get_key(&self, key: &Key) -> Result<Instance, InjectError> {
        if !self.supports(key) {
            tracing::error!("Single instance factory was asked for unsupported key {key}");
            return Err(InjectError::UnsupportedKey(*key));
        }

        Ok(self.container.resolve(key)?)
    }

    pub fn supports(&self, key: &Key) -> bool {
        self.supported.contains(key)
    }
}
