//! TOML configuration file.
//!
//! ```toml
//! [search]
//! min_confidence = 0.7
//! suggestion_limit = 3
//!
//! [search.edit_distance]
//! long_word_distance = 1
//!
//! [cache]
//! enabled = false
//!
//! [traversal]
//! max_depth = 3
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use wcm_core::{CacheSettings, DEFAULT_MAX_DEPTH};
use wcm_model::SearchOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalSettings {
    pub max_depth: usize,
}

impl Default for TraversalSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub search: SearchOptions,
    pub cache: CacheSettings,
    pub traversal: TraversalSettings,
}

impl AppConfig {
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("parse config")
    }
}

/// Loads the config file, or defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let config = AppConfig::from_toml(&contents)
        .with_context(|| format!("load config: {}", path.display()))?;
    info!(path = %path.display(), "configuration loaded");
    Ok(config)
}
