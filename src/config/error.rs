use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading, interpolating, or binding configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    // Sources
    #[error("config file '{0}' is required but does not exist")]
    FileNotFound(PathBuf),

    #[error("could not read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config file '{path}' is not valid TOML: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A prefixed environment variable whose value is not valid UTF-8.
    #[error("environment variable '{0}' does not hold valid UTF-8")]
    NonUnicodeEnv(String),

    // Interpolation
    #[error("`${{...}}` references form a cycle")]
    CircularReference,

    #[error("`${{{0}}}` does not point at any config value")]
    ReferenceNotFound(String),

    #[error("`${{{0}}}` is not a dotted path")]
    InvalidReferencePath(String),

    #[error("`${{{0}}}` points at a table or array, only scalars can be interpolated")]
    NonScalarReference(String),

    #[error("`${{` without a closing '}}'")]
    UnclosedReference,

    // Binding
    #[error("config does not match the target type: {0}")]
    DeserializeError(#[from] toml::de::Error),

    #[error("binding target could not be represented as TOML: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// Binding needs a struct-like target whose fields map to keys.
    #[error("cannot bind a config section onto `{0}`, which is not a table")]
    NonTableTarget(&'static str),
}
