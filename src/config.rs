//! Host-supplied property editor configuration.
//!
//! Hosts hand the editor an opaque configuration object. Depending on the host
//! it either answers lookups by alias itself, is an ordered list of
//! `{alias, value}` pairs, or is a plain key to value mapping.
//! [`PropertyConfig`] exposes each of those access shapes and [`read_option`]
//! probes them in turn.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Alias of the option holding the display template.
pub const FORMAT_ALIAS: &str = "format";

/// Error returned by a configuration that fails to answer a lookup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration could not look up the alias.
    #[error("could not look up configuration value {alias:?}: {reason}")]
    Lookup {
        /// Alias being looked up.
        alias: String,
        /// What went wrong.
        reason: String,
    },
}

/// A single `{alias, value}` configuration pair.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ConfigEntry {
    /// Option alias.
    pub alias: String,
    /// Option value.
    #[serde(default)]
    pub value: Value,
}

impl ConfigEntry {
    /// Create a configuration pair.
    #[must_use]
    pub fn new(alias: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            alias: alias.into(),
            value: value.into(),
        }
    }
}

/// Access shapes a host configuration may support.
///
/// Every shape defaults to "not supported" (`None`), so implementors only
/// provide the one they have.
pub trait PropertyConfig {
    /// Capability-style lookup, which may fail.
    fn value_by_alias(&self, _alias: &str) -> Option<Result<Option<Value>, ConfigError>> {
        None
    }

    /// Ordered `{alias, value}` pairs.
    fn entries(&self) -> Option<Cow<'_, [ConfigEntry]>> {
        None
    }

    /// Plain key lookup. The outer `Option` is `None` when the shape is not
    /// supported, the inner one when the key is missing.
    fn get(&self, _alias: &str) -> Option<Option<Value>> {
        None
    }
}

impl PropertyConfig for Vec<ConfigEntry> {
    fn entries(&self) -> Option<Cow<'_, [ConfigEntry]>> {
        Some(Cow::Borrowed(self.as_slice()))
    }
}

impl PropertyConfig for Map<String, Value> {
    fn get(&self, alias: &str) -> Option<Option<Value>> {
        Some(Map::get(self, alias).cloned())
    }
}

impl<S: std::hash::BuildHasher> PropertyConfig for HashMap<String, Value, S> {
    fn get(&self, alias: &str) -> Option<Option<Value>> {
        Some(HashMap::get(self, alias).cloned())
    }
}

impl PropertyConfig for Value {
    fn entries(&self) -> Option<Cow<'_, [ConfigEntry]>> {
        let Value::Array(items) = self else {
            return None;
        };
        // Items that are not pairs are skipped.
        let entries = items
            .iter()
            .filter_map(|item| ConfigEntry::deserialize(item).ok())
            .collect();
        Some(Cow::Owned(entries))
    }

    fn get(&self, alias: &str) -> Option<Option<Value>> {
        match self {
            Value::Object(map) => PropertyConfig::get(map, alias),
            _ => None,
        }
    }
}

/// Read a configuration option as text, falling back on any miss or failure.
///
/// Shapes are probed in order: capability lookup, ordered pairs, plain
/// mapping. A failing capability lookup is swallowed and the remaining shapes
/// are tried. Null values count as missing.
///
/// # Examples
///
/// ```
/// use date_only::config::{read_option, ConfigEntry};
///
/// let config = vec![ConfigEntry::new("format", "D MMM YYYY")];
/// assert_eq!(read_option(Some(&config), "format", "DD"), "D MMM YYYY");
/// assert_eq!(read_option(Some(&config), "other", "DD"), "DD");
/// assert_eq!(read_option(None, "format", "DD"), "DD");
/// ```
#[must_use]
pub fn read_option(config: Option<&dyn PropertyConfig>, alias: &str, fallback: &str) -> String {
    let Some(config) = config else {
        return fallback.to_string();
    };

    match config.value_by_alias(alias) {
        Some(Ok(value)) => return text_or(value, fallback),
        Some(Err(err)) => log::debug!("Ignoring configuration lookup failure: {err}"),
        None => {}
    }

    if let Some(entries) = config.entries() {
        let value = entries
            .iter()
            .find(|entry| entry.alias == alias)
            .map(|entry| entry.value.clone());
        return text_or(value, fallback);
    }

    if let Some(value) = config.get(alias) {
        return text_or(value, fallback);
    }

    fallback.to_string()
}

fn text_or(value: Option<Value>, fallback: &str) -> String {
    match value {
        None | Some(Value::Null) => fallback.to_string(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

/// Load a host configuration file.
///
/// Files with a `.json` extension are read as JSON, anything else as TOML. A
/// missing file yields an empty configuration.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load(path: &Path) -> anyhow::Result<Value> {
    log::debug!(
        "Checking if configuration file exists at {}...",
        path.display()
    );
    if !path.exists() {
        log::warn!(
            "Could not find configuration at {}, so using an empty configuration...",
            path.display()
        );
        return Ok(Value::Object(Map::new()));
    }

    log::debug!("Loading configuration from {}...", path.display());
    let content = fs::read_to_string(path).context("could not read configuration file")?;
    let config: Value = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content).context("could not deserialize configuration file")?
    } else {
        let table: toml::Table =
            toml::from_str(&content).context("could not deserialize configuration file")?;
        serde_json::to_value(table).context("could not convert configuration file")?
    };
    log::trace!("Loaded configuration: {config:#?}");
    Ok(config)
}
