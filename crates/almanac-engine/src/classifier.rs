//! Occurrence classification.
//!
//! Turns raw occurrences into typed [`Event`]s. The first matching rule wins:
//! 1. a delta override for the exact (key, date) pair
//! 2. an explicit key-level classification from the resolved spec
//! 3. the event source's default classification
//! 4. `CLOSED`
//!
//! Classification never fails. Incomplete override data degrades to the next
//! rule instead of aborting the run.

use std::collections::HashMap;
use std::fmt;

use almanac_core::{ClassificationMap, DateRange, Event, EventType, Occurrence, ResolvedSpec};
use chrono::NaiveDate;
use tracing::trace;

/// Which rule produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassificationSource {
    /// A `Reclassify` or classified `Add` delta for the exact date.
    Delta,
    /// The resolved spec's key-level classification map.
    Explicit,
    /// The event source's default classification.
    SourceDefault,
    /// No rule matched.
    Fallback,
}

impl ClassificationSource {
    /// Returns a short name for logs and metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delta => "delta",
            Self::Explicit => "explicit",
            Self::SourceDefault => "source_default",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ClassificationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies occurrences against one resolved specification.
///
/// Lookups are built once in [`OccurrenceClassifier::new`]; classifying does
/// not mutate anything.
#[derive(Debug)]
pub struct OccurrenceClassifier<'a> {
    overrides: HashMap<&'a str, HashMap<NaiveDate, EventType>>,
    explicit: &'a ClassificationMap,
    source_defaults: HashMap<&'a str, EventType>,
}

impl<'a> OccurrenceClassifier<'a> {
    /// Builds the lookups for `spec`.
    ///
    /// Later deltas and later event sources overwrite earlier ones for the
    /// same key (and date).
    pub fn new(spec: &'a ResolvedSpec) -> Self {
        let mut overrides: HashMap<&str, HashMap<NaiveDate, EventType>> = HashMap::new();
        for delta in spec.deltas() {
            if let Some(classification) = delta.classification_override() {
                overrides
                    .entry(delta.key())
                    .or_default()
                    .insert(delta.date(), classification);
            }
        }

        let source_defaults = spec
            .event_sources()
            .iter()
            .map(|source| (source.key.as_str(), source.default_classification))
            .collect();

        Self {
            overrides,
            explicit: spec.classifications(),
            source_defaults,
        }
    }

    /// Resolves the classification of one occurrence and reports which rule matched.
    pub fn resolve(&self, occurrence: &Occurrence) -> (EventType, ClassificationSource) {
        let key = occurrence.key.as_str();

        if let Some(classification) = self
            .overrides
            .get(key)
            .and_then(|by_date| by_date.get(&occurrence.date))
        {
            return (*classification, ClassificationSource::Delta);
        }
        if let Some(classification) = self.explicit.get(key) {
            return (*classification, ClassificationSource::Explicit);
        }
        if let Some(classification) = self.source_defaults.get(key) {
            return (*classification, ClassificationSource::SourceDefault);
        }
        (EventType::Closed, ClassificationSource::Fallback)
    }

    /// Classifies a single occurrence.
    pub fn classify_one(&self, occurrence: &Occurrence) -> Event {
        let (event_type, source) = self.resolve(occurrence);
        trace!(
            key = %occurrence.key,
            date = %occurrence.date,
            event_type = %event_type,
            rule = %source,
            "Classified occurrence"
        );
        Event::from_occurrence(occurrence, event_type)
    }

    /// Classifies occurrences, preserving input order.
    pub fn classify(&self, occurrences: &[Occurrence]) -> Vec<Event> {
        occurrences.iter().map(|o| self.classify_one(o)).collect()
    }

    /// Classifies the occurrences that fall inside `range`, preserving order.
    pub fn classify_in_range(&self, occurrences: &[Occurrence], range: &DateRange) -> Vec<Event> {
        occurrences
            .iter()
            .filter(|o| range.contains(o.date))
            .map(|o| self.classify_one(o))
            .collect()
    }
}

/// Classifies `occurrences` against `spec`, preserving input order.
pub fn classify(occurrences: &[Occurrence], spec: &ResolvedSpec) -> Vec<Event> {
    OccurrenceClassifier::new(spec).classify(occurrences)
}
