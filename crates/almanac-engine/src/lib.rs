//! Resolution engine: resolver, cache, merge, classification.
//!
//! This crate turns declarative calendar specifications into classified events:
//! - Inheritance resolution over `extends`/`uses` with cycle detection
//! - Per-session caching of resolved specifications
//! - Overlay merge primitives for composing specifications
//! - Delta application and occurrence classification
//!
//! # Example
//!
//! ```rust
//! use almanac_core::{CalendarSpec, EventType, InMemoryRegistry, Occurrence};
//! use almanac_engine::{SpecResolver, classify};
//! use chrono::NaiveDate;
//!
//! let registry = InMemoryRegistry::new()
//!     .with_calendar(CalendarSpec::new("base").with_classification("christmas", EventType::Closed))
//!     .with_calendar(CalendarSpec::new("nyse").extending("base"));
//!
//! let mut resolver = SpecResolver::new(registry);
//! let spec = resolver.resolve("nyse")?;
//!
//! let day = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
//! let events = classify(&[Occurrence::new("christmas", day, "Christmas Day")], &spec);
//! assert_eq!(events[0].event_type, EventType::Closed);
//! # Ok::<(), almanac_engine::ResolveError>(())
//! ```

mod cache;
mod classifier;
mod config;
mod deltas;
mod error;
mod graph;
mod merge;
mod resolver;


pub use cache::ResolutionCache;
pub use classifier::{ClassificationSource, OccurrenceClassifier, classify};
pub use config::{ResolutionMode, ResolverConfig};
pub use deltas::{DELTA_PROVENANCE, apply_deltas};
pub use error::{ConfigError, EngineResult, ResolveError, SpecKind};
pub use graph::InheritanceGraph;
pub use merge::{merge_classifications, merge_event_sources, merge_specs};
pub use resolver::SpecResolver;
