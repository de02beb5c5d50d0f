//! Engine configuration.

use std::collections::BTreeMap;
use std::env;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// Default limit on nested extends, include and tag rerenders.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Engine settings. Deserializable, with every field optional.
///
/// ```
/// let config: beard::EngineConfig = serde_json::from_str(r#"{
///     "root": "/site",
///     "shortcuts": { "header": { "tag": "component", "path": "/components/header" } }
/// }"#).unwrap();
/// assert_eq!(config.max_depth, beard::config::DEFAULT_MAX_DEPTH);
/// assert_eq!(config.shortcuts["header"].tag, "component");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EngineConfig {
    /// Directory `~` paths and relative top-level renders resolve against.
    pub root: Option<String>,
    /// Recompile templates on every access.
    pub development: bool,
    pub max_depth: usize,
    /// Shortcut alias to tag and fixed path.
    pub shortcuts: BTreeMap<String, ShortcutConfig>,
}

/// What a `{{@alias}}` shortcut expands to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutConfig {
    pub tag: String,
    pub path: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            root: None,
            development: false,
            max_depth: DEFAULT_MAX_DEPTH,
            shortcuts: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `BEARD_ENV`, `BEARD_ROOT` and `BEARD_MAX_DEPTH`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(mode) = lookup("BEARD_ENV") {
            config.development = mode.eq_ignore_ascii_case("development");
        }
        if let Some(root) = lookup("BEARD_ROOT").filter(|r| !r.is_empty()) {
            config.root = Some(root);
        }
        if let Some(depth) = lookup("BEARD_MAX_DEPTH") {
            config.max_depth = depth
                .parse()
                .map_err(|_| Error::Config(format!("BEARD_MAX_DEPTH is not a number: {}", depth)))?;
        }
        config.validate()?;
        if config.development {
            warn!("development mode: templates are recompiled on every render");
        }
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::Config("max_depth must be at least 1".to_string()));
        }
        for (alias, shortcut) in &self.shortcuts {
            if alias.is_empty() || alias.chars().any(char::is_whitespace) {
                return Err(Error::Config(format!("invalid shortcut alias `{}`", alias)));
            }
            if shortcut.path.is_empty() {
                return Err(Error::Config(format!("shortcut `{}` has an empty path", alias)));
            }
        }
        Ok(())
    }
}
