//! Specification types.
//!
//! This module provides the declarative building blocks of a calendar:
//! - [`CalendarSpec`]: A named calendar with parents, modules, sources and overrides
//! - [`ModuleSpec`]: A reusable bundle of event sources and weekend policy
//! - [`EventSource`]: A rule producing occurrences, with a default classification
//! - [`Delta`]: A point-in-time override keyed by occurrence key and date
//! - [`ResolvedSpec`]: The flattened result of resolving a calendar's inheritance graph

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::event::EventType;
use crate::weekend::WeekendPolicy;

/// Occurrence key → classification.
pub type ClassificationMap = BTreeMap<String, EventType>;

/// Opaque handle to an occurrence generator.
///
/// The engine never interprets it; the occurrence-generation collaborator
/// maps it back to a concrete rule (fixed date, nth weekday, lunar, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratorRef(String);

impl GeneratorRef {
    /// Creates a new generator reference.
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Returns the reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeneratorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A reusable occurrence-generation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSource {
    /// Key, unique within one specification layer.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Generator this source delegates to.
    #[serde(default)]
    pub generator: GeneratorRef,
    /// Classification used when no override applies.
    #[serde(default)]
    pub default_classification: EventType,
}

impl EventSource {
    /// Creates a new event source with a `CLOSED` default and no generator.
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            generator: GeneratorRef::default(),
            default_classification: EventType::Closed,
        }
    }

    /// Builder method to set the generator reference.
    pub fn with_generator(mut self, generator: impl Into<String>) -> Self {
        self.generator = GeneratorRef::new(generator);
        self
    }

    /// Builder method to set the default classification.
    pub fn with_default_classification(mut self, classification: EventType) -> Self {
        self.default_classification = classification;
        self
    }
}

/// A point-in-time override layered on top of inherited content.
///
/// Every consumer matches this exhaustively, so adding a variant is a
/// compile-time visible change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Delta {
    /// Introduces an occurrence, optionally with its own classification.
    Add {
        key: String,
        date: NaiveDate,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        classification: Option<EventType>,
    },
    /// Changes the classification of an existing occurrence.
    Reclassify {
        key: String,
        date: NaiveDate,
        classification: EventType,
    },
    /// Suppresses a generated occurrence.
    Remove { key: String, date: NaiveDate },
}

impl Delta {
    /// Creates an unclassified `Add` delta.
    pub fn add(key: impl Into<String>, date: NaiveDate) -> Self {
        Self::Add {
            key: key.into(),
            date,
            name: None,
            classification: None,
        }
    }

    /// Creates an `Add` delta carrying its own classification.
    pub fn add_classified(
        key: impl Into<String>,
        date: NaiveDate,
        name: impl Into<String>,
        classification: EventType,
    ) -> Self {
        Self::Add {
            key: key.into(),
            date,
            name: Some(name.into()),
            classification: Some(classification),
        }
    }

    /// Creates a `Reclassify` delta.
    pub fn reclassify(key: impl Into<String>, date: NaiveDate, classification: EventType) -> Self {
        Self::Reclassify {
            key: key.into(),
            date,
            classification,
        }
    }

    /// Creates a `Remove` delta.
    pub fn remove(key: impl Into<String>, date: NaiveDate) -> Self {
        Self::Remove {
            key: key.into(),
            date,
        }
    }

    /// The occurrence key this delta targets.
    pub fn key(&self) -> &str {
        match self {
            Self::Add { key, .. } | Self::Reclassify { key, .. } | Self::Remove { key, .. } => key,
        }
    }

    /// The date this delta targets.
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Add { date, .. } | Self::Reclassify { date, .. } | Self::Remove { date, .. } => {
                *date
            }
        }
    }

    /// The classification override carried by this delta, if any.
    pub fn classification_override(&self) -> Option<EventType> {
        match self {
            Self::Add { classification, .. } => *classification,
            Self::Reclassify { classification, .. } => Some(*classification),
            Self::Remove { .. } => None,
        }
    }
}

/// Descriptive metadata for a calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarMetadata {
    /// Display name.
    pub name: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Additional attributes (timezone, country code, ...).
    pub attributes: BTreeMap<String, String>,
}

impl CalendarMetadata {
    /// Creates metadata with a display name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to add an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// The declarative definition of one named calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSpec {
    /// Calendar identifier.
    pub id: String,
    /// Parent calendars, merged in order before this calendar's own content.
    #[serde(default)]
    pub extends: Vec<String>,
    /// Modules contributing event sources and weekend policy.
    #[serde(default)]
    pub uses: Vec<String>,
    /// Event sources defined by this calendar.
    #[serde(default)]
    pub event_sources: Vec<EventSource>,
    /// Explicit key-level classifications.
    #[serde(default)]
    pub classifications: ClassificationMap,
    /// Point-in-time overrides.
    #[serde(default)]
    pub deltas: Vec<Delta>,
    /// Descriptive metadata.
    #[serde(default)]
    pub metadata: CalendarMetadata,
}

impl CalendarSpec {
    /// Creates an empty calendar specification.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            extends: Vec::new(),
            uses: Vec::new(),
            event_sources: Vec::new(),
            classifications: ClassificationMap::new(),
            deltas: Vec::new(),
            metadata: CalendarMetadata::default(),
        }
    }

    /// Builder method to add a parent calendar.
    pub fn extending(mut self, parent: impl Into<String>) -> Self {
        self.extends.push(parent.into());
        self
    }

    /// Builder method to add a module.
    pub fn using(mut self, module: impl Into<String>) -> Self {
        self.uses.push(module.into());
        self
    }

    /// Builder method to add an event source.
    pub fn with_source(mut self, source: EventSource) -> Self {
        self.event_sources.push(source);
        self
    }

    /// Builder method to set an explicit classification.
    pub fn with_classification(mut self, key: impl Into<String>, classification: EventType) -> Self {
        self.classifications.insert(key.into(), classification);
        self
    }

    /// Builder method to add a delta.
    pub fn with_delta(mut self, delta: Delta) -> Self {
        self.deltas.push(delta);
        self
    }

    /// Builder method to set metadata.
    pub fn with_metadata(mut self, metadata: CalendarMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A reusable, non-calendar-specific bundle composed via `uses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSpec {
    /// Module identifier.
    pub id: String,
    /// Event sources contributed by the module.
    #[serde(default)]
    pub event_sources: Vec<EventSource>,
    /// Weekend-day fragment, if the module defines one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekend: Option<WeekendPolicy>,
}

impl ModuleSpec {
    /// Creates an empty module.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            event_sources: Vec::new(),
            weekend: None,
        }
    }

    /// Builder method to add an event source.
    pub fn with_source(mut self, source: EventSource) -> Self {
        self.event_sources.push(source);
        self
    }

    /// Builder method to set the weekend fragment.
    pub fn with_weekend(mut self, weekend: WeekendPolicy) -> Self {
        self.weekend = Some(weekend);
        self
    }
}

/// Resolution chain entry for a calendar layer.
pub fn calendar_link(id: &str) -> String {
    format!("calendar:{id}")
}

/// Resolution chain entry for a module layer.
pub fn module_link(id: &str) -> String {
    format!("module:{id}")
}

/// The flattened, immutable result of resolving a calendar.
///
/// Built once through [`ResolvedSpecBuilder`] and only read afterwards.
/// Deserialization goes through the builder as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ResolvedSpecFields")]
pub struct ResolvedSpec {
    id: String,
    metadata: CalendarMetadata,
    weekend_policy: WeekendPolicy,
    event_sources: Vec<EventSource>,
    classifications: ClassificationMap,
    deltas: Vec<Delta>,
    resolution_chain: Vec<String>,
}

impl ResolvedSpec {
    /// Starts building a resolved specification for `id`.
    pub fn builder(id: impl Into<String>) -> ResolvedSpecBuilder {
        ResolvedSpecBuilder::new(id)
    }

    /// The calendar identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The calendar's own metadata.
    pub fn metadata(&self) -> &CalendarMetadata {
        &self.metadata
    }

    /// The effective weekend policy.
    pub fn weekend_policy(&self) -> WeekendPolicy {
        self.weekend_policy
    }

    /// Merged event sources in merge order. May contain repeated keys.
    pub fn event_sources(&self) -> &[EventSource] {
        &self.event_sources
    }

    /// Merged key-level classifications.
    pub fn classifications(&self) -> &ClassificationMap {
        &self.classifications
    }

    /// All deltas, in layer order.
    pub fn deltas(&self) -> &[Delta] {
        &self.deltas
    }

    /// Every layer visited during resolution, in visitation order.
    pub fn resolution_chain(&self) -> &[String] {
        &self.resolution_chain
    }

    /// Explicit classification for `key`, if any.
    pub fn classification(&self, key: &str) -> Option<EventType> {
        self.classifications.get(key).copied()
    }

    /// The effective event source for `key`: the last one merged.
    pub fn event_source(&self, key: &str) -> Option<&EventSource> {
        self.event_sources.iter().rev().find(|s| s.key == key)
    }
}

/// Wire form of [`ResolvedSpec`], before the builder's normalization.
#[derive(Deserialize)]
struct ResolvedSpecFields {
    id: String,
    #[serde(default)]
    metadata: CalendarMetadata,
    #[serde(default)]
    weekend_policy: WeekendPolicy,
    #[serde(default)]
    event_sources: Vec<EventSource>,
    #[serde(default)]
    classifications: ClassificationMap,
    #[serde(default)]
    deltas: Vec<Delta>,
    #[serde(default)]
    resolution_chain: Vec<String>,
}

impl From<ResolvedSpecFields> for ResolvedSpec {
    fn from(fields: ResolvedSpecFields) -> Self {
        ResolvedSpecBuilder::new(fields.id)
            .metadata(fields.metadata)
            .weekend_policy(fields.weekend_policy)
            .event_sources(fields.event_sources)
            .classifications(fields.classifications)
            .deltas(fields.deltas)
            .resolution_chain(fields.resolution_chain)
            .build()
    }
}

/// Builder for [`ResolvedSpec`].
#[derive(Debug, Clone)]
pub struct ResolvedSpecBuilder {
    spec: ResolvedSpec,
}

impl ResolvedSpecBuilder {
    /// Creates a builder with empty collections and the default weekend.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            spec: ResolvedSpec {
                id: id.into(),
                metadata: CalendarMetadata::default(),
                weekend_policy: WeekendPolicy::sat_sun(),
                event_sources: Vec::new(),
                classifications: ClassificationMap::new(),
                deltas: Vec::new(),
                resolution_chain: Vec::new(),
            },
        }
    }

    /// Sets the metadata.
    pub fn metadata(mut self, metadata: CalendarMetadata) -> Self {
        self.spec.metadata = metadata;
        self
    }

    /// Sets the weekend policy. An empty policy resolves to Saturday/Sunday.
    pub fn weekend_policy(mut self, policy: WeekendPolicy) -> Self {
        self.spec.weekend_policy = policy.or_default_weekend();
        self
    }

    /// Sets the event sources.
    pub fn event_sources(mut self, sources: Vec<EventSource>) -> Self {
        self.spec.event_sources = sources;
        self
    }

    /// Sets the classification map.
    pub fn classifications(mut self, classifications: ClassificationMap) -> Self {
        self.spec.classifications = classifications;
        self
    }

    /// Sets the deltas.
    pub fn deltas(mut self, deltas: Vec<Delta>) -> Self {
        self.spec.deltas = deltas;
        self
    }

    /// Sets the resolution chain.
    pub fn resolution_chain(mut self, chain: Vec<String>) -> Self {
        self.spec.resolution_chain = chain;
        self
    }

    /// Finishes the build.
    pub fn build(self) -> ResolvedSpec {
        self.spec
    }
}
