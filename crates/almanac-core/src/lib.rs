//! Core types: calendar specs, weekend policy, occurrences, events, registry

pub mod event;
pub mod range;
pub mod registry;
pub mod spec;
pub mod tracing;
pub mod weekend;

pub use event::{Event, EventType, Occurrence, UnknownEventType};
pub use range::{DateRange, RangeError};
pub use registry::{InMemoryRegistry, SpecRegistry};
pub use spec::{
    CalendarMetadata, CalendarSpec, ClassificationMap, Delta, EventSource, GeneratorRef,
    ModuleSpec, ResolvedSpec, ResolvedSpecBuilder, calendar_link, module_link,
};
pub use weekend::WeekendPolicy;

pub use crate::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
