//! Dirk Config provides a registry of configs that can be injected into the
//! rest of the graph.
//!
//! Dirk Config is split into two major parts:
//! 1. ConfigProvider: Used to create the registry of all configs
//! 2. Config<T>: A wrapper type to be able to resolve and retrieve configs
//!
//! # Examples
//!
//! ```rust
//! use dirk_config::provider::ConfigProvider;
//!
//! struct AppConfig {
//!     app_name: String,
//!     formatter_count: u32,
//! }
//!
//! let mut config_provider = ConfigProvider::initialize();
//! config_provider
//!     .add_config(AppConfig {
//!         app_name: "Dirk Sample".to_string(),
//!         formatter_count: 4,
//!     })
//!     .unwrap();
//!
//! let retrieved = config_provider.get_config::<AppConfig>().unwrap().unwrap();
//! assert_eq!(retrieved.app_name, "Dirk Sample");
//! assert_eq!(retrieved.formatter_count, 4);
//! ```
//!
//! Dirk Config consists of the following components:
//!
//! 1. Config - for declaring a struct as a config and handling resolution
//! 2. Provider - for creating a registry of configs, adding and retrieving configs
//! 3. Errors - for config errors

pub mod config;
pub mod errors;
pub mod provider;

pub use config::Config;
pub use errors::ConfigError;
pub use provider::ConfigProvider;
