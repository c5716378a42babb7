//! Typed options: recipes registered per type at startup, applied in order
//! on every resolution.

mod error;
mod registry;
mod resolver;

use std::fmt;

pub use error::{BoxError, OptionsError};
pub use registry::OptionsRegistry;
pub use resolver::OptionsResolver;

/// Reusable configuration logic for an options type, registered with
/// [`OptionsRegistry::configure_options`].
///
/// ```
/// use dragon_options::{ConfigureOptions, OptionsRegistry};
///
/// #[derive(Default)]
/// struct AppSettings {
///     option: String,
/// }
///
/// struct ConfigureGlobal;
///
/// impl ConfigureOptions<AppSettings> for ConfigureGlobal {
///     fn configure(&self, options: &mut AppSettings) {
///         options.option = "Option from: Global".into();
///     }
/// }
///
/// let mut registry = OptionsRegistry::new();
/// registry.configure_options::<AppSettings, _>(ConfigureGlobal);
///
/// let settings: AppSettings = registry.into_resolver().resolve()?;
/// assert_eq!(settings.option, "Option from: Global");
/// # Ok::<(), dragon_options::OptionsError>(())
/// ```
pub trait ConfigureOptions<T>: Send + Sync + 'static {
    fn configure(&self, options: &mut T);
}

/// When a recipe runs. Every `Configure` recipe of a type runs before any of
/// its `PostConfigure` recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Configure,
    PostConfigure,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Configure => f.write_str("configure"),
            Stage::PostConfigure => f.write_str("post-configure"),
        }
    }
}
