//! Configuration loading and management.

mod builder;
mod env;
mod error;
mod file;
mod resolve;
mod section;
mod source;

pub use builder::Config;
pub use env::EnvSource;
pub use error::ConfigError;
pub use file::FileSource;
pub use section::ConfigSection;
pub use source::{ConfigEntry, ConfigSource};
