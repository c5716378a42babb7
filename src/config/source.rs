use toml::{Table, Value};

use super::ConfigError;

/// A value contributed by a [`ConfigSource`], placed at `path` in the merged tree.
///
/// An empty path means the value is a table merged at the root.
#[derive(Debug, Clone)]
pub struct ConfigEntry {
    pub path: Vec<String>,
    pub value: Value,
}

impl ConfigEntry {
    pub fn root(table: Table) -> Self {
        Self {
            path: Vec::new(),
            value: Value::Table(table),
        }
    }

    pub fn at_path(path: Vec<String>, value: Value) -> Self {
        Self { path, value }
    }
}

/// A layer in the configuration loading pipeline.
pub trait ConfigSource: Send + Sync + std::fmt::Debug {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError>;
}

pub(crate) fn merge_at_path(table: &mut Table, path: &[String], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        if let Value::Table(overlay) = value {
            deep_merge(table, overlay);
        }
        return;
    };

    let key = existing_key(table, first);

    if rest.is_empty() {
        match (table.get_mut(&key), value) {
            (Some(Value::Table(base)), Value::Table(overlay)) => deep_merge(base, overlay),
            (_, value) => {
                table.insert(key, value);
            }
        }
        return;
    }

    if !matches!(table.get(&key), Some(Value::Table(_))) {
        table.insert(key.clone(), Value::Table(Table::new()));
    }

    if let Some(Value::Table(nested)) = table.get_mut(&key) {
        merge_at_path(nested, rest, value);
    }
}

/// Merges `overlay` into `base`. Nested tables merge recursively, everything
/// else (arrays included) is replaced.
pub(crate) fn deep_merge(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        let key = existing_key(base, &key);
        match (base.get_mut(&key), value) {
            (Some(Value::Table(base_table)), Value::Table(overlay_table)) => {
                deep_merge(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Returns the key already present in `table` that matches `key` ignoring
/// ASCII case, or `key` itself when there is none.
pub(crate) fn existing_key(table: &Table, key: &str) -> String {
    if table.contains_key(key) {
        return key.to_string();
    }
    table
        .keys()
        .find(|k| k.eq_ignore_ascii_case(key))
        .cloned()
        .unwrap_or_else(|| key.to_string())
}

/// Case-insensitive lookup, preferring an exact match.
pub(crate) fn lookup<'a>(table: &'a Table, key: &str) -> Option<&'a Value> {
    table.get(key).or_else(|| {
        table
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_table(toml_str: &str) -> Table {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_deep_merge_nested_tables() {
        let mut base = make_table(
            r#"
            [server]
            host = "localhost"
            port = 8080
            "#,
        );
        let overlay = make_table(
            r#"
            [server]
            port = 9090
            "#,
        );
        deep_merge(&mut base, overlay);

        assert_eq!(base["server"]["host"].as_str(), Some("localhost"));
        assert_eq!(base["server"]["port"].as_integer(), Some(9090));
    }

    #[test]
    fn test_deep_merge_replaces_arrays() {
        let mut base = make_table(r#"hosts = ["a", "b"]"#);
        deep_merge(&mut base, make_table(r#"hosts = ["c"]"#));

        assert_eq!(base["hosts"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_merge_keeps_existing_key_casing() {
        let mut base = make_table(
            r#"
            [ConsoleWriter]
            Message = "from file"
            "#,
        );
        let path = vec!["consolewriter".to_string(), "message".to_string()];
        merge_at_path(&mut base, &path, Value::String("from env".into()));

        assert_eq!(base.len(), 1);
        assert_eq!(
            base["ConsoleWriter"]["Message"].as_str(),
            Some("from env")
        );
    }

    #[test]
    fn test_merge_at_path_creates_tables() {
        let mut base = Table::new();
        let path = vec!["database".to_string(), "port".to_string()];
        merge_at_path(&mut base, &path, Value::Integer(5432));

        assert_eq!(base["database"]["port"].as_integer(), Some(5432));
    }

    #[test]
    fn test_merge_at_path_replaces_scalar_with_table() {
        let mut base = make_table(r#"database = "sqlite""#);
        let path = vec!["database".to_string(), "host".to_string()];
        merge_at_path(&mut base, &path, Value::String("db".into()));

        assert_eq!(base["database"]["host"].as_str(), Some("db"));
    }

    #[test]
    fn test_lookup_ignores_case() {
        let table = make_table(r#"Message = "hi""#);

        assert_eq!(lookup(&table, "message").and_then(Value::as_str), Some("hi"));
        assert!(lookup(&table, "missing").is_none());
    }
}
