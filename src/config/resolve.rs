//! `${section.key}` interpolation over the merged configuration table.
//!
//! Lookups follow the same case-insensitive key matching as section access.
//! `$$` produces a literal `$`, so `$${name}` is left as `${name}`.
//!
//! Each string is expanded once, recursively: a referenced string is itself
//! expanded before it is spliced in, and spliced text is never scanned again.

use toml::{Table, Value};

use super::ConfigError;

/// Expands every reference in `table`.
///
/// References are read from the table as it was before expansion. A string
/// that reaches itself through its references is reported as circular.
pub(crate) fn resolve_references(table: &mut Table) -> Result<(), ConfigError> {
    let root = table.clone();
    expand_table(table, &root, Some(""))
}

/// `prefix` is the dotted path of `table`, or `None` for tables inside arrays,
/// which references cannot address.
fn expand_table(table: &mut Table, root: &Table, prefix: Option<&str>) -> Result<(), ConfigError> {
    for (key, value) in table.iter_mut() {
        let path = prefix.map(|p| if p.is_empty() { key.clone() } else { format!("{p}.{key}") });
        expand_value(value, root, path)?;
    }
    Ok(())
}

fn expand_value(value: &mut Value, root: &Table, path: Option<String>) -> Result<(), ConfigError> {
    match value {
        Value::String(s) if s.contains('$') => {
            let mut visiting: Vec<String> = path.into_iter().collect();
            *s = expand(s, root, &mut visiting)?;
        }
        Value::Table(t) => expand_table(t, root, path.as_deref())?,
        Value::Array(items) => {
            for item in items.iter_mut() {
                expand_value(item, root, None)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Expands `raw`. `visiting` holds the canonical paths of the strings
/// currently being expanded, outermost first.
fn expand(raw: &str, root: &Table, visiting: &mut Vec<String>) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            out.push('$');
            rest = tail;
        } else if let Some(body) = after.strip_prefix('{') {
            let end = body.find('}').ok_or(ConfigError::UnclosedReference)?;
            out.push_str(&referenced(root, &body[..end], visiting)?);
            rest = &body[end + 1..];
        } else {
            out.push('$');
            rest = after;
        }
    }
    out.push_str(rest);

    Ok(out)
}

/// Renders the scalar at a dotted `path`, expanding it first if it is a string.
fn referenced(root: &Table, path: &str, visiting: &mut Vec<String>) -> Result<String, ConfigError> {
    let (canonical, value) = find(root, path)?;

    match value {
        Value::String(s) => {
            if visiting.contains(&canonical) {
                return Err(ConfigError::CircularReference);
            }
            visiting.push(canonical);
            let expanded = expand(s, root, visiting);
            visiting.pop();
            expanded
        }
        Value::Integer(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Boolean(b) => Ok(b.to_string()),
        Value::Datetime(dt) => Ok(dt.to_string()),
        Value::Array(_) | Value::Table(_) => Err(ConfigError::NonScalarReference(path.to_string())),
    }
}

/// Looks up a dotted `path`, returning it spelled with the keys found in the
/// table so that differently-cased references to one value compare equal.
fn find<'a>(root: &'a Table, path: &str) -> Result<(String, &'a Value), ConfigError> {
    if path.split('.').any(str::is_empty) {
        return Err(ConfigError::InvalidReferencePath(path.to_string()));
    }

    let not_found = || ConfigError::ReferenceNotFound(path.to_string());
    let mut canonical = Vec::new();
    let mut table = root;
    let mut found = None;

    for segment in path.split('.') {
        if found.is_some() {
            table = found.and_then(Value::as_table).ok_or_else(not_found)?;
        }
        let (key, value) = table
            .get_key_value(segment)
            .or_else(|| table.iter().find(|(k, _)| k.eq_ignore_ascii_case(segment)))
            .ok_or_else(not_found)?;
        canonical.push(key.as_str());
        found = Some(value);
    }

    let value = found.ok_or_else(not_found)?;
    Ok((canonical.join("."), value))
}
