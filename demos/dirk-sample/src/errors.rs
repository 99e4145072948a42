use dirk_config::ConfigError;
use dirk_di::{BuildError, InjectError};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum SampleError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Inject(#[from] InjectError),
    /// A screen asked for a view model its component does not provide
    #[error("Unknown ViewModel class: {0}")]
    UnknownViewModel(&'static str),
    /// A screen was used before it was injected
    #[error("Screen '{0}' has not been injected")]
    NotInjected(&'static str),
}
