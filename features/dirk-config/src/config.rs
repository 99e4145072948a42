use std::{ops::Deref, sync::Arc};

use dirk_di::{Dependencies, DependencyInfo, Key, RequireError, Resolver};

use crate::provider::ConfigProvider;

/// A wrapper type to allow for config injections
///
/// Resolves through the [ConfigProvider] bound in the graph, so providers can
/// declare configs like any other dependency.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
///
/// use dirk_config::{config::Config, provider::ConfigProvider};
/// use dirk_di::{ContainerBuilder, Module, Scope};
///
/// struct FormatterConfig {
///     count: u32,
/// }
///
/// struct Formatter(String);
///
/// let mut configs = ConfigProvider::initialize();
/// configs.add_config(FormatterConfig { count: 4 }).unwrap();
///
/// let component = ContainerBuilder::new()
///     .install(configs.into_module())
///     .install(Module::new().provide(Scope::Root, |(config,): (Config<FormatterConfig>,)| {
///         Formatter(format!("{} items", config.count))
///     }))
///     .build()
///     .unwrap();
///
/// let formatter = component.container().require::<Formatter>().unwrap();
/// assert_eq!(formatter.0, "4 items");
/// ```
pub struct Config<T> {
    inner: Arc<T>,
}
impl<T> Deref for Config<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
impl<T> Config<T> {
    pub fn inner(&self) -> Arc<T> {
        self.inner.clone()
    }

    pub fn into_inner(self) -> Arc<T> {
        self.inner
    }
}

impl<T: Send + Sync + 'static> Resolver for Config<T> {
    fn resolve(deps: &Dependencies) -> Result<Self, RequireError> {
        let config_provider = deps.require::<ConfigProvider>()?;

        let config = config_provider.get_config::<T>().ok().flatten().ok_or_else(|| {
            tracing::error!("Config {} is not registered", std::any::type_name::<T>());
            RequireError::TypeMissing(Key::of::<T>())
        })?;

        Ok(Config { inner: config })
    }

    fn dependencies() -> Vec<DependencyInfo> {
        vec![DependencyInfo::required(Key::of::<ConfigProvider>())]
    }
}
