//! Application context: the configuration tree and the frozen options
//! registry, shared by every component built at startup.

use crate::config::ConfigSection;
use crate::options::{OptionsRegistry, OptionsResolver};
use crate::Error;

/// A component that builds itself from the application context, typically
/// by resolving the options it needs once at construction time.
pub trait FromContext: Sized {
    fn from_context(ctx: &AppContext) -> Result<Self, Error>;
}

/// Central application context holding the loaded configuration and the
/// options resolver.
///
/// ## Example
///
/// ```no_run
/// use dragon_options::writer::{add_console_writer_from_config, ConsoleWriter};
/// use dragon_options::{AppContext, Config};
///
/// let config = Config::builder()
///     .with_file("config.toml", true)
///     .load()?;
///
/// let ctx = AppContext::builder()
///     .with_options(|options| add_console_writer_from_config(options, &config))
///     .with_config(config)
///     .build();
///
/// let writer: ConsoleWriter = ctx.get()?;
/// writer.write(&mut std::io::stdout())?;
/// # Ok::<(), dragon_options::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct AppContext {
    config: ConfigSection,
    options: OptionsResolver,
}

impl AppContext {
    /// Creates a new builder for constructing an `AppContext`.
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::default()
    }

    /// The root configuration section. Empty when none was attached.
    pub fn config(&self) -> &ConfigSection {
        &self.config
    }

    pub fn options(&self) -> &OptionsResolver {
        &self.options
    }

    /// Resolves a configured instance of `T`.
    pub fn resolve<T: Default + 'static>(&self) -> Result<T, Error> {
        Ok(self.options.resolve()?)
    }

    /// Constructs a component from this context.
    pub fn get<S: FromContext>(&self) -> Result<S, Error> {
        S::from_context(self)
    }
}

/// Builder for constructing an [`AppContext`].
///
/// Options are registered here during startup; [`build`](Self::build) freezes
/// the registry.
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct AppContextBuilder {
    config: ConfigSection,
    registry: OptionsRegistry,
}

impl AppContextBuilder {
    /// Attaches the loaded configuration.
    pub fn with_config(mut self, config: ConfigSection) -> Self {
        self.config = config;
        self
    }

    /// Registers options recipes. May be called any number of times; recipes
    /// keep their registration order across calls.
    pub fn with_options<F>(mut self, register: F) -> Self
    where
        F: FnOnce(&mut OptionsRegistry),
    {
        register(&mut self.registry);
        self
    }

    /// Builds the `AppContext`.
    pub fn build(self) -> AppContext {
        tracing::debug!(registry = ?self.registry, "application context built");
        AppContext {
            config: self.config,
            options: self.registry.into_resolver(),
        }
    }
}
