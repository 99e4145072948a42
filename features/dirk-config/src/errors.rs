use dirk_di::TypeInfo;

/// Errors when registering or retrieving a config
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The required config type was never registered
    #[error("The config type '{0}' is not registered")]
    ConfigMissing(TypeInfo),

    /// A config of this type is already registered
    #[error("The config type '{0}' is already registered")]
    ConfigAlreadyRegistered(TypeInfo),
}
