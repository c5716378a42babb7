//! Navigable view over the merged configuration tree.

use serde::de::DeserializeOwned;
use serde::Serialize;
use toml::{Table, Value};

use super::source::{existing_key, lookup};
use super::ConfigError;

/// A node of the loaded configuration: the table found at a dotted path.
///
/// Sections never fail to exist. Asking for a key that is missing (or that
/// holds a scalar) yields an empty section, which binds as a no-op.
///
/// ```
/// use dragon_options::ConfigSection;
///
/// let root = ConfigSection::from_toml_str(r#"
///     [ConsoleWriter]
///     Message = "Hello"
/// "#)?;
///
/// let writer = root.section("consolewriter");
/// assert_eq!(writer.path(), "ConsoleWriter");
/// assert_eq!(writer.get("message").and_then(|v| v.as_str()), Some("Hello"));
/// # Ok::<(), dragon_options::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSection {
    path: Vec<String>,
    table: Table,
}

impl ConfigSection {
    /// Wraps a merged table as the root section.
    pub fn root(table: Table) -> Self {
        Self {
            path: Vec::new(),
            table,
        }
    }

    /// Parses a TOML document into a root section without reference resolution.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(Self::root(toml::from_str(s)?))
    }

    /// The dotted path of this section, empty for the root.
    pub fn path(&self) -> String {
        self.path.join(".")
    }

    /// The last path segment, `None` for the root.
    pub fn key(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Whether this section holds any keys.
    pub fn exists(&self) -> bool {
        !self.table.is_empty()
    }

    pub fn as_table(&self) -> &Table {
        &self.table
    }

    /// Looks up a direct child value, ignoring ASCII case.
    pub fn get(&self, key: &str) -> Option<&Value> {
        lookup(&self.table, key)
    }

    /// Returns the child section at `key`, which may be dotted (`a.b.c`).
    ///
    /// Path segments take the casing found in the tree when a key matches.
    pub fn section(&self, key: &str) -> ConfigSection {
        let mut path = self.path.clone();
        let mut current = Some(&self.table);

        for segment in key.split('.') {
            let found = current.and_then(|table| {
                table
                    .iter()
                    .find(|(k, _)| k.as_str() == segment)
                    .or_else(|| table.iter().find(|(k, _)| k.eq_ignore_ascii_case(segment)))
            });
            match found {
                Some((k, value)) => {
                    path.push(k.clone());
                    current = value.as_table();
                }
                None => {
                    path.push(segment.to_string());
                    current = None;
                }
            }
        }

        ConfigSection {
            path,
            table: current.cloned().unwrap_or_default(),
        }
    }

    /// Returns `self` if it already points below the root, otherwise the
    /// child section at `key`.
    ///
    /// Lets a component accept either the whole configuration or the section
    /// meant for it.
    pub fn or_section(&self, key: &str) -> ConfigSection {
        if self.is_root() {
            self.section(key)
        } else {
            self.clone()
        }
    }

    /// Deserializes the whole section into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        Ok(Value::Table(self.table.clone()).try_into()?)
    }

    /// Copies the keys present in this section onto the matching fields of
    /// `target`. Fields with no matching key keep their current value.
    ///
    /// Scalars are converted to the kind of value the field already holds
    /// where that is lossless: `42` binds into a string field as `"42"`, and
    /// `"8080"` binds into an integer field as `8080`.
    pub fn bind_into<T>(&self, target: &mut T) -> Result<(), ConfigError>
    where
        T: Serialize + DeserializeOwned,
    {
        if !self.exists() {
            return Ok(());
        }

        let Value::Table(mut current) = Value::try_from(&*target)? else {
            return Err(ConfigError::NonTableTarget(std::any::type_name::<T>()));
        };
        bind_table(&mut current, &self.table);
        *target = Value::Table(current).try_into()?;
        Ok(())
    }
}

/// Merges `overlay` onto the serialized form of a binding target.
fn bind_table(target: &mut Table, overlay: &Table) {
    for (key, incoming) in overlay {
        let key = existing_key(target, key);
        match (target.get_mut(&key), incoming) {
            (Some(Value::Table(current)), Value::Table(nested)) => bind_table(current, nested),
            (Some(current), incoming) => {
                let converted = convert_scalar(current, incoming.clone());
                *current = converted;
            }
            (None, incoming) => {
                target.insert(key, incoming.clone());
            }
        }
    }
}

/// Converts `incoming` to the type of `current` when the conversion is
/// exact; otherwise returns it unchanged and lets deserialization decide.
fn convert_scalar(current: &Value, incoming: Value) -> Value {
    match (current, incoming) {
        (Value::String(_), Value::Integer(i)) => Value::String(i.to_string()),
        (Value::String(_), Value::Float(f)) => Value::String(f.to_string()),
        (Value::String(_), Value::Boolean(b)) => Value::String(b.to_string()),
        (Value::String(_), Value::Datetime(dt)) => Value::String(dt.to_string()),
        (Value::Integer(_), Value::String(s)) => s.trim().parse().map_or(Value::String(s), Value::Integer),
        (Value::Float(_), Value::Integer(i)) => Value::Float(i as f64),
        (Value::Float(_), Value::String(s)) => s.trim().parse().map_or(Value::String(s), Value::Float),
        (Value::Boolean(_), Value::String(s)) => match s.to_ascii_lowercase().as_str() {
            "true" => Value::Boolean(true),
            "false" => Value::Boolean(false),
            _ => Value::String(s),
        },
        (_, incoming) => incoming,
    }
}
