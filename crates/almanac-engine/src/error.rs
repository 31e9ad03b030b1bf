//! Engine error types.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for resolution.
pub type EngineResult<T> = Result<T, ResolveError>;

/// The kind of specification a missing identifier referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecKind {
    /// A calendar, referenced as a resolution root or through `extends`.
    Calendar,
    /// A module, referenced through `uses`.
    Module,
}

impl SpecKind {
    /// Returns a human-readable name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calendar => "calendar",
            Self::Module => "module",
        }
    }
}

impl fmt::Display for SpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that abort resolution.
///
/// Both variants are configuration-authoring defects. They are never retried
/// and nothing is cached for the failing request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A referenced calendar or module is absent from the registry.
    #[error("{kind} not found: {id}")]
    NotFound { kind: SpecKind, id: String },

    /// An identifier reappeared along a single traversal path.
    ///
    /// `path` lists the traversal from the root and ends with the repeated id.
    #[error("circular dependency: {}", .path.join(" -> "))]
    CircularDependency { path: Vec<String> },
}

impl ResolveError {
    /// Creates a not-found error for a calendar.
    pub fn calendar_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: SpecKind::Calendar,
            id: id.into(),
        }
    }

    /// Creates a not-found error for a module.
    pub fn module_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: SpecKind::Module,
            id: id.into(),
        }
    }

    /// Creates a circular dependency error from the current path and the repeated id.
    pub fn cycle(path: &[String], repeated: &str) -> Self {
        let mut path = path.to_vec();
        path.push(repeated.to_string());
        Self::CircularDependency { path }
    }
}

/// Errors that can occur while loading resolver configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
