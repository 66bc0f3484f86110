//! Bring an older configuration file up to the current layout.
//!
//! Older files may lack keys added in later releases. `missing_fields`
//! reports them and `migrate_config` writes them back with their defaults,
//! leaving every key the user already set untouched.

use super::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

fn read_mapping(path: &Path) -> AppResult<Mapping> {
    let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
    match serde_yaml::from_str::<Value>(&content)
        .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?
    {
        Value::Mapping(m) => Ok(m),
        Value::Null => Ok(Mapping::new()),
        _ => Err(AppError::Config(format!(
            "{}: top level must be a mapping",
            path.display()
        ))),
    }
}

fn defaults_mapping() -> AppResult<Mapping> {
    match serde_yaml::to_value(Config::default()).map_err(|_| AppError::ConfigSave)? {
        Value::Mapping(m) => Ok(m),
        _ => Err(AppError::Other("default config is not a mapping".into())),
    }
}

/// Merge missing keys of `defaults` into `target`, recursing into nested
/// mappings. Returns the dotted names of the keys that were added.
fn merge_missing(target: &mut Mapping, defaults: &Mapping, prefix: &str) -> Vec<String> {
    let mut added = Vec::new();

    for (key, default_value) in defaults {
        let name = match key.as_str() {
            Some(k) if prefix.is_empty() => k.to_string(),
            Some(k) => format!("{prefix}.{k}"),
            None => continue,
        };

        if !target.contains_key(key) {
            target.insert(key.clone(), default_value.clone());
            added.push(name);
            continue;
        }

        if let (Some(Value::Mapping(inner)), Value::Mapping(inner_defaults)) =
            (target.get_mut(key), default_value)
        {
            added.extend(merge_missing(inner, inner_defaults, &name));
        }
    }

    added
}

/// List configuration keys missing from the file at `path`.
pub fn missing_fields(path: &Path) -> AppResult<Vec<String>> {
    let mut current = read_mapping(path)?;
    Ok(merge_missing(&mut current, &defaults_mapping()?, ""))
}

/// Fill missing keys with defaults and rewrite the file.
/// Returns `true` when the file changed.
pub fn migrate_config(path: &Path) -> AppResult<bool> {
    let mut current = read_mapping(path)?;
    let added = merge_missing(&mut current, &defaults_mapping()?, "");

    if added.is_empty() {
        info("Configuration is up to date.");
        return Ok(false);
    }

    let yaml = serde_yaml::to_string(&Value::Mapping(current)).map_err(|_| AppError::ConfigSave)?;
    fs::write(path, yaml)?;

    success(format!("Configuration migrated, added: {}", added.join(", ")));
    Ok(true)
}
