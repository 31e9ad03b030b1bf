//! Resolver configuration.
//!
//! Settings can be built in code or loaded from a TOML file:
//!
//! ```toml
//! mode = "deduplicated"
//! cache_enabled = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the resolver walks a calendar's inheritance graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMode {
    /// Path-scoped depth-first walk. A shared ancestor reached through several
    /// parents is merged once per path, so its sources and chain entries repeat.
    #[default]
    Compatible,
    /// Explicit graph walk. Every calendar and module is merged exactly once.
    Deduplicated,
}

/// Resolver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Graph walk strategy.
    pub mode: ResolutionMode,

    /// Whether top-level results are memoized per calendar id.
    pub cache_enabled: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            mode: ResolutionMode::Compatible,
            cache_enabled: true,
        }
    }
}

impl ResolverConfig {
    /// Creates a configuration with the given mode.
    pub fn new(mode: ResolutionMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Builder: set the resolution mode.
    pub fn with_mode(mut self, mode: ResolutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder: enable or disable the resolution cache.
    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Parses a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads a configuration from a TOML file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}
