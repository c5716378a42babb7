use crate::config::ConfigError;
use crate::options::OptionsError;
use thiserror::Error;

/// Top-level error type for the dragon-options library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("options error: {0}")]
    Options(#[from] OptionsError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
