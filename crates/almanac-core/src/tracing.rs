//! Log output setup.
//!
//! The library crates only emit through the `tracing` facade. Binaries and
//! services embedding the engine call [`init_tracing`] once at startup:
//!
//! ```ignore
//! use almanac_core::tracing::{TracingConfig, init_tracing};
//!
//! // `-vv` on a command-line tool
//! init_tracing(TracingConfig::from_verbosity(2))?;
//!
//! // JSON lines for a long-running service
//! init_tracing(TracingConfig::service())?;
//! ```
//!
//! `RUST_LOG` overrides the configured level unless an explicit filter
//! directive is set on the config.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TracingError {
    /// A global subscriber is already installed.
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// The filter directive did not parse.
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingOutputFormat {
    /// Multi-line, human oriented.
    #[default]
    Pretty,
    /// One line per event.
    Compact,
    /// One JSON object per event.
    Json,
}

/// Subscriber settings.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for `almanac*` targets when neither `RUST_LOG` nor `env_filter` is set.
    pub default_level: Level,
    pub output_format: TracingOutputFormat,
    /// Source file and line on every event.
    pub include_location: bool,
    pub include_target: bool,
    pub include_timestamp: bool,
    /// Emit span open/close events, e.g. around each `resolve` call.
    pub include_span_events: bool,
    /// Explicit filter directive; wins over `RUST_LOG` and `default_level`.
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::INFO,
            output_format: TracingOutputFormat::Pretty,
            include_location: false,
            include_target: true,
            include_timestamp: true,
            include_span_events: false,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Compact debug output without timestamps, for interactive debugging.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            output_format: TracingOutputFormat::Compact,
            include_location: true,
            include_timestamp: false,
            ..Self::default()
        }
    }

    /// JSON output with locations and span events, for log collectors.
    #[must_use]
    pub fn service() -> Self {
        Self {
            output_format: TracingOutputFormat::Json,
            include_location: true,
            include_span_events: true,
            ..Self::default()
        }
    }

    /// Compact output whose level follows a `-v` count (0 = warn, 3+ = trace).
    #[must_use]
    pub fn from_verbosity(verbosity: u8) -> Self {
        let default_level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            default_level,
            output_format: TracingOutputFormat::Compact,
            include_location: verbosity >= 3,
            include_timestamp: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.output_format = format;
        self
    }

    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// The filter this config installs, before `RUST_LOG` is consulted.
    pub fn default_directive(&self) -> String {
        match &self.env_filter {
            Some(filter) => filter.clone(),
            None => format!("almanac={}", self.default_level),
        }
    }

    fn filter(&self) -> Result<EnvFilter, TracingError> {
        match &self.env_filter {
            Some(filter) => Ok(EnvFilter::try_new(filter)?),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.default_directive()))),
        }
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let span_events = if self.include_span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };
        let layer = fmt::layer()
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_target(self.include_target)
            .with_span_events(span_events);

        match (self.output_format, self.include_timestamp) {
            (TracingOutputFormat::Pretty, _) => layer.pretty().boxed(),
            (TracingOutputFormat::Compact, true) => layer.compact().boxed(),
            (TracingOutputFormat::Compact, false) => layer.compact().without_time().boxed(),
            (TracingOutputFormat::Json, _) => layer.json().boxed(),
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// # Errors
///
/// Fails if a global subscriber is already set or if `env_filter` is not a
/// valid directive.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.filter()?;
    let subscriber = tracing_subscriber::registry().with(config.fmt_layer().with_filter(filter));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TracingConfig::default();
        assert_eq!(config.default_level, Level::INFO);
        assert_eq!(config.output_format, TracingOutputFormat::Pretty);
        assert!(config.include_timestamp);
        assert!(!config.include_span_events);
        assert_eq!(config.default_directive(), "almanac=INFO");
    }

    #[test]
    fn presets() {
        let cli = TracingConfig::cli_debug();
        assert_eq!(cli.default_level, Level::DEBUG);
        assert_eq!(cli.output_format, TracingOutputFormat::Compact);
        assert!(!cli.include_timestamp);

        let service = TracingConfig::service();
        assert_eq!(service.output_format, TracingOutputFormat::Json);
        assert!(service.include_span_events);
        assert!(service.include_location);
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(TracingConfig::from_verbosity(0).default_level, Level::WARN);
        assert_eq!(TracingConfig::from_verbosity(1).default_level, Level::INFO);
        assert_eq!(TracingConfig::from_verbosity(2).default_level, Level::DEBUG);

        let config = TracingConfig::from_verbosity(5);
        assert_eq!(config.default_level, Level::TRACE);
        assert!(config.include_location);
    }

    #[test]
    fn explicit_filter_wins() {
        let config = TracingConfig::default()
            .with_level(Level::WARN)
            .with_env_filter("almanac_engine=trace");
        assert_eq!(config.default_directive(), "almanac_engine=trace");
        assert!(config.filter().is_ok());
    }

    #[test]
    fn invalid_filter_is_an_error() {
        let config = TracingConfig::default().with_env_filter("almanac=verbose");
        assert!(matches!(config.filter(), Err(TracingError::EnvFilter(_))));
    }

    #[test]
    fn output_format_serde() {
        let format: TracingOutputFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, TracingOutputFormat::Json);
        assert_eq!(
            serde_json::to_string(&TracingOutputFormat::Compact).unwrap(),
            "\"compact\""
        );
    }
}
