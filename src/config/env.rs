//! Environment variable configuration source.

use std::ffi::OsString;

use toml::Value;

use super::source::{ConfigEntry, ConfigSource};
use super::ConfigError;

/// A configuration source that reads prefixed environment variables.
///
/// `MYAPP__DATABASE__PORT=5432` with prefix `MYAPP` and separator `__` lands
/// at `database.port` as an integer. Path segments are lowercased; they still
/// merge onto differently-cased keys from files.
///
/// Variables outside the prefix are never inspected, so a non-UTF-8 entry
/// elsewhere in the environment is harmless.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    separator: String,
}

impl EnvSource {
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        assert!(!separator.is_empty(), "separator must not be empty");
        Self {
            prefix: prefix.into(),
            separator,
        }
    }

    /// Maps a variable name to its config path, `None` when the name is
    /// outside the prefix or names nothing after it.
    fn config_path(&self, name: &str) -> Option<Vec<String>> {
        let rest = name
            .strip_prefix(self.prefix.as_str())?
            .strip_prefix(self.separator.as_str())?;
        if rest.is_empty() {
            return None;
        }
        Some(rest.split(self.separator.as_str()).map(str::to_lowercase).collect())
    }

    fn entry(&self, name: OsString, value: OsString) -> Result<Option<ConfigEntry>, ConfigError> {
        let Some(name) = name.to_str() else {
            return Ok(None);
        };
        let Some(path) = self.config_path(name) else {
            return Ok(None);
        };
        let value = value
            .into_string()
            .map_err(|_| ConfigError::NonUnicodeEnv(name.to_string()))?;

        tracing::trace!(var = name, path = %path.join("."), "config entry from environment");
        Ok(Some(ConfigEntry::at_path(path, typed_value(&value))))
    }
}

impl ConfigSource for EnvSource {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        std::env::vars_os()
            .filter_map(|(name, value)| self.entry(name, value).transpose())
            .collect()
    }
}

/// Reads a raw variable as the most specific TOML scalar: boolean, integer,
/// float (only with a decimal point), then string.
///
/// Binding converts scalars back to the field's type, so a numeric-looking
/// value still lands in a `String` field.
fn typed_value(raw: &str) -> Value {
    match raw.to_ascii_lowercase().as_str() {
        "true" => return Value::Boolean(true),
        "false" => return Value::Boolean(false),
        _ => {}
    }

    let unsigned = raw.strip_prefix('-').unwrap_or(raw);
    let parsed = if !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit()) {
        raw.parse::<i64>().ok().map(Value::Integer)
    } else if raw.contains('.') {
        raw.parse::<f64>().ok().map(Value::Float)
    } else {
        None
    };

    parsed.unwrap_or_else(|| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_value() {
        assert_eq!(typed_value("TRUE"), Value::Boolean(true));
        assert_eq!(typed_value("false"), Value::Boolean(false));
        assert_eq!(typed_value("-42"), Value::Integer(-42));
        assert_eq!(typed_value("1.5"), Value::Float(1.5));
        assert_eq!(typed_value("1.2.3"), Value::String("1.2.3".into()));
        assert_eq!(typed_value("-"), Value::String("-".into()));
        assert_eq!(typed_value("99999999999999999999"), Value::String("99999999999999999999".into()));
        assert_eq!(typed_value("hello"), Value::String("hello".into()));
    }

    #[test]
    fn test_config_path() {
        let source = EnvSource::new("APP", "__");

        assert_eq!(
            source.config_path("APP__ConsoleWriter__Message"),
            Some(vec!["consolewriter".to_string(), "message".to_string()])
        );
        assert_eq!(source.config_path("APP__"), None);
        assert_eq!(source.config_path("APPX__KEY"), None);
        assert_eq!(source.config_path("OTHER__KEY"), None);
    }

    #[test]
    fn test_env_source_maps_prefixed_vars() {
        std::env::set_var("DRAGON_OPTS_ENV_TEST__CONSOLEWRITER__MESSAGE", "from env");
        std::env::set_var("DRAGON_OPTS_ENV_TEST__", "ignored");

        let source = EnvSource::new("DRAGON_OPTS_ENV_TEST", "__");
        let entries = source.entries().unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, vec!["consolewriter", "message"]);
        assert_eq!(entries[0].value, Value::String("from env".into()));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_variables() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let invalid = OsStr::from_bytes(b"\xff\xfe");
        std::env::set_var("DRAGON_OPTS_UNRELATED_BYTES", invalid);
        std::env::set_var(OsStr::from_bytes(b"DRAGON_OPTS_\xff_NAME"), "value");
        std::env::set_var("DRAGON_OPTS_BYTES_TEST__GOOD", "1");

        let entries = EnvSource::new("DRAGON_OPTS_BYTES_TEST", "__").entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].value, Value::Integer(1));

        std::env::set_var("DRAGON_OPTS_BAD_VALUE_TEST__MESSAGE", invalid);
        let result = EnvSource::new("DRAGON_OPTS_BAD_VALUE_TEST", "__").entries();
        assert!(matches!(
            result,
            Err(ConfigError::NonUnicodeEnv(name)) if name == "DRAGON_OPTS_BAD_VALUE_TEST__MESSAGE"
        ));
    }

    #[test]
    #[should_panic(expected = "separator must not be empty")]
    fn test_env_source_rejects_empty_separator() {
        let _ = EnvSource::new("APP", "");
    }
}
