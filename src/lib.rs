pub mod config;
pub mod context;
mod error;
pub mod options;
pub mod writer;

pub use config::{Config, ConfigError, ConfigSection};
pub use context::{AppContext, FromContext};
pub use error::Error;
pub use options::{ConfigureOptions, OptionsError, OptionsRegistry, OptionsResolver};
