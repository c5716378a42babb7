//! A small options-driven component: writes a configured message followed by
//! an application-wide setting.
//!
//! Options can come from code ([`add_console_writer`]) or from a
//! `[ConsoleWriter]` config section ([`add_console_writer_from_config`]).
//! Both paths also register [`ConfigureAppSettings`].

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::config::ConfigSection;
use crate::context::{AppContext, FromContext};
use crate::options::{ConfigureOptions, OptionsRegistry};
use crate::Error;

/// Config section read by [`add_console_writer_from_config`].
pub const SECTION: &str = "ConsoleWriter";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleWriterOptions {
    pub message: String,
}

/// Settings shared across components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub option: String,
}

/// Global recipe for [`AppSettings`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigureAppSettings;

impl ConfigureOptions<AppSettings> for ConfigureAppSettings {
    fn configure(&self, options: &mut AppSettings) {
        options.option = "Option from: ConfigureAppSettings".to_string();
    }
}

/// Registers the writer's options from code.
pub fn add_console_writer<F>(registry: &mut OptionsRegistry, setup: F)
where
    F: Fn(&mut ConsoleWriterOptions) + Send + Sync + 'static,
{
    registry
        .configure::<ConsoleWriterOptions, _>(setup)
        .configure_options::<AppSettings, _>(ConfigureAppSettings);
}

/// Registers the writer's options from configuration.
///
/// `config` may be the root (the `ConsoleWriter` child is used) or the
/// writer's own section.
pub fn add_console_writer_from_config(registry: &mut OptionsRegistry, config: &ConfigSection) {
    registry
        .bind::<ConsoleWriterOptions>(config.or_section(SECTION))
        .configure_options::<AppSettings, _>(ConfigureAppSettings);
}

/// Writes the configured message and option. Options are read once, when
/// the writer is built.
#[derive(Debug, Clone)]
pub struct ConsoleWriter {
    options: ConsoleWriterOptions,
    settings: AppSettings,
}

impl ConsoleWriter {
    pub fn new(options: ConsoleWriterOptions, settings: AppSettings) -> Self {
        Self { options, settings }
    }

    pub fn options(&self) -> &ConsoleWriterOptions {
        &self.options
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn write<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "{}", self.options.message)?;
        writeln!(out, "{}", self.settings.option)
    }
}

impl FromContext for ConsoleWriter {
    fn from_context(ctx: &AppContext) -> Result<Self, Error> {
        Ok(Self::new(ctx.resolve()?, ctx.resolve()?))
    }
}
