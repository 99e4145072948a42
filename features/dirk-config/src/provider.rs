use std::{
    any::Any,
    collections::HashMap,
    fmt::Debug,
    sync::Arc,
};

use dirk_di::{Module, TypeInfo};

use crate::errors::ConfigError;

/// A provider to register all configs.
///
/// Configs are registered and retrieved by type. Once filled, the provider is
/// installed into the graph with [ConfigProvider::into_module] and configs are
/// injected through [crate::config::Config].
#[derive(Default)]
pub struct ConfigProvider {
    configs: HashMap<TypeInfo, Arc<dyn Any + Send + Sync + 'static>>,
}
impl Debug for ConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.configs.keys().map(|info| info.type_name).collect();
        names.sort();
        f.debug_struct("ConfigProvider")
            .field("configs", &names)
            .finish()
    }
}

impl ConfigProvider {
    /// Initializes an empty Config Provider
    pub fn initialize() -> Self {
        Self::default()
    }

    /// Retrieve a config with specified type.
    ///
    /// Returns `Ok(None)` if no config of this type was registered.
    pub fn get_config<T: Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>, ConfigError> {
        let type_info = TypeInfo::of::<T>();

        self.configs
            .get(&type_info)
            .map(|entry| entry.clone().downcast())
            .transpose()
            .map_err(|_| ConfigError::ConfigMissing(type_info))
    }

    /// Like [ConfigProvider::get_config], treating an unregistered type as an error
    pub fn require_config<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ConfigError> {
        self.get_config()?
            .ok_or(ConfigError::ConfigMissing(TypeInfo::of::<T>()))
    }

    /// Add a config to the registry.
    ///
    /// If the config type is already registered, it will return a
    /// [`ConfigError`] runtime error
    pub fn add_config<T: Send + Sync + 'static>(
        &mut self,
        config: T,
    ) -> Result<&mut Self, ConfigError> {
        let type_info = TypeInfo::of::<T>();

        if self.configs.contains_key(&type_info) {
            return Err(ConfigError::ConfigAlreadyRegistered(type_info));
        }

        tracing::debug!("Registered config {type_info}");
        self.configs.insert(type_info, Arc::new(config));
        Ok(self)
    }

    /// Can optionally add a config to the registry.
    ///
    /// If the config provided is `Some(T)`, it will be the same as calling [`ConfigProvider::add_config`]
    /// If the config provided is `None`, then the function just returns `Ok(self)` for chaining
    pub fn maybe_add_config<T: Send + Sync + 'static>(
        &mut self,
        config: Option<T>,
    ) -> Result<&mut Self, ConfigError> {
        match config {
            Some(c) => self.add_config(c),
            None => Ok(self),
        }
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Binds this provider as a root instance, making every config injectable
    pub fn into_module(self) -> Module {
        Module::new().add_instance(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq)]
    struct Formatting {
        count: u32,
    }

    #[rstest]
    fn registered_config_is_returned() {
        let mut provider = ConfigProvider::initialize();
        provider.add_config(Formatting { count: 4 }).unwrap();

        let config = provider.get_config::<Formatting>().unwrap();

        assert_eq!(config.as_deref(), Some(&Formatting { count: 4 }));
    }

    #[rstest]
    fn unregistered_config_is_none() {
        let provider = ConfigProvider::initialize();

        assert!(provider.get_config::<Formatting>().unwrap().is_none());
        assert_eq!(
            provider.require_config::<Formatting>().unwrap_err(),
            ConfigError::ConfigMissing(TypeInfo::of::<Formatting>())
        );
    }

    #[rstest]
    fn second_registration_is_rejected() {
        let mut provider = ConfigProvider::initialize();
        provider.add_config(Formatting { count: 4 }).unwrap();

        let result = provider.add_config(Formatting { count: 5 });

        assert_eq!(
            result.unwrap_err(),
            ConfigError::ConfigAlreadyRegistered(TypeInfo::of::<Formatting>())
        );
        assert_eq!(provider.require_config::<Formatting>().unwrap().count, 4);
    }

    #[rstest]
    #[case(Some(Formatting { count: 1 }), 1)]
    #[case(None, 0)]
    fn maybe_add_config_skips_none(#[case] config: Option<Formatting>, #[case] expected: usize) {
        let mut provider = ConfigProvider::initialize();

        provider.maybe_add_config(config).unwrap();

        assert_eq!(provider.len(), expected);
    }
}
