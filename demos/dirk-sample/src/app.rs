use std::sync::Arc;

use dirk_config::{Config, ConfigProvider};
use dirk_di::{Component, ContainerBuilder, Module, Scope};

use crate::{errors::SampleError, main_screen};

/// Application wide settings
pub struct AppConfig {
    pub service_name: String,
}

/// Settings of the main screen
pub struct MainScreenConfig {
    pub formatter_count: u32,
}

/// Provides the name shown across the application
pub trait NameService: Send + Sync {
    fn name(&self) -> &str;
}

struct StaticNameService {
    name: String,
}
impl NameService for StaticNameService {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Name service shared by every screen
pub type SharedNameService = Arc<Box<dyn NameService>>;

pub fn default_configs() -> Result<ConfigProvider, SampleError> {
    let mut configs = ConfigProvider::initialize();
    configs
        .add_config(AppConfig {
            service_name: "Dagger Test!".to_string(),
        })?
        .add_config(MainScreenConfig { formatter_count: 4 })?;
    Ok(configs)
}

/// Root bindings
pub fn app_module() -> Module {
    Module::new().provide(
        Scope::Root,
        |(config,): (Config<AppConfig>,)| -> Box<dyn NameService> {
            Box::new(StaticNameService {
                name: config.service_name.clone(),
            })
        },
    )
}

/// Builds the application graph: root bindings plus one subcomponent per screen
pub fn build_component(configs: ConfigProvider) -> Result<Component, SampleError> {
    let component = ContainerBuilder::new()
        .install(configs.into_module())
        .install(app_module())
        .subcomponent::<main_screen::MainScreen>(main_screen::subcomponent())
        .build()?;

    tracing::info!(
        "Application graph ready with targets {:?}",
        component.injector().targets()
    );
    Ok(component)
}
