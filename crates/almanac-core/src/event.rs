//! Occurrence and event types.
//!
//! This module provides the types that flow through classification:
//! - [`EventType`]: The closed set of classifications an event can carry
//! - [`Occurrence`]: A raw (key, date) instance produced by an event source
//! - [`Event`]: A classified occurrence, the final output of the engine

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The classification of a calendar event.
///
/// Variants are declared in their canonical order. The derived `Ord` is a
/// tie-break for presentation sorting, not a severity ranking.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// The calendar is closed for the whole day.
    #[default]
    Closed,
    /// The calendar closes earlier than usual.
    EarlyClose,
    /// The calendar opens later than usual.
    LateOpen,
    /// Informational date that does not affect business hours.
    Notable,
    /// Marks the boundary of a period (quarter end, settlement cycle, ...).
    PeriodMarker,
}

impl EventType {
    /// All variants in canonical order.
    pub const ALL: [EventType; 5] = [
        Self::Closed,
        Self::EarlyClose,
        Self::LateOpen,
        Self::Notable,
        Self::PeriodMarker,
    ];

    /// Returns the canonical textual form, as used in specification files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "CLOSED",
            Self::EarlyClose => "EARLY_CLOSE",
            Self::LateOpen => "LATE_OPEN",
            Self::Notable => "NOTABLE",
            Self::PeriodMarker => "PERIOD_MARKER",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown event type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event type: {0}")]
pub struct UnknownEventType(pub String);

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownEventType(s.to_string()))
    }
}

/// A single concrete instance produced by an event source.
///
/// Occurrences are generated outside the engine and carry no classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occurrence {
    /// Key of the event source that produced this occurrence.
    pub key: String,
    /// The date the occurrence falls on.
    pub date: NaiveDate,
    /// Display name.
    pub name: String,
    /// Origin marker (which generator or delta produced it).
    pub provenance: String,
}

impl Occurrence {
    /// Creates a new occurrence with an empty provenance.
    pub fn new(key: impl Into<String>, date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            date,
            name: name.into(),
            provenance: String::new(),
        }
    }

    /// Builder method to set provenance.
    pub fn with_provenance(mut self, provenance: impl Into<String>) -> Self {
        self.provenance = provenance.into();
        self
    }
}

/// A classified calendar event.
///
/// Events sort by date, then type, then description. Provenance only breaks
/// the remaining ties so that ordering stays consistent with equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    /// The date of the event.
    pub date: NaiveDate,
    /// The resolved classification.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Human-readable description.
    pub description: String,
    /// Origin marker copied from the occurrence.
    pub provenance: String,
}

impl Event {
    /// Creates a new event.
    pub fn new(
        date: NaiveDate,
        event_type: EventType,
        description: impl Into<String>,
        provenance: impl Into<String>,
    ) -> Self {
        Self {
            date,
            event_type,
            description: description.into(),
            provenance: provenance.into(),
        }
    }

    /// Builds an event from an occurrence and its resolved classification.
    pub fn from_occurrence(occurrence: &Occurrence, event_type: EventType) -> Self {
        Self {
            date: occurrence.date,
            event_type,
            description: occurrence.name.clone(),
            provenance: occurrence.provenance.clone(),
        }
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date
            .cmp(&other.date)
            .then_with(|| self.event_type.cmp(&other.event_type))
            .then_with(|| self.description.cmp(&other.description))
            .then_with(|| self.provenance.cmp(&other.provenance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod event_type {
        use super::*;

        #[test]
        fn canonical_order() {
            let mut types = vec![
                EventType::PeriodMarker,
                EventType::Notable,
                EventType::Closed,
                EventType::LateOpen,
                EventType::EarlyClose,
            ];
            types.sort();
            assert_eq!(types, EventType::ALL.to_vec());
        }

        #[test]
        fn default_is_closed() {
            assert_eq!(EventType::default(), EventType::Closed);
        }

        #[test]
        fn parse_and_display() {
            for t in EventType::ALL {
                assert_eq!(t.to_string().parse::<EventType>(), Ok(t));
            }
            assert_eq!("early_close".parse::<EventType>(), Ok(EventType::EarlyClose));
            assert_eq!(
                "HALF_DAY".parse::<EventType>(),
                Err(UnknownEventType("HALF_DAY".to_string()))
            );
        }

        #[test]
        fn serde_uses_screaming_snake_case() {
            let json = serde_json::to_string(&EventType::PeriodMarker).unwrap();
            assert_eq!(json, "\"PERIOD_MARKER\"");
            let parsed: EventType = serde_json::from_str("\"LATE_OPEN\"").unwrap();
            assert_eq!(parsed, EventType::LateOpen);
        }
    }

    mod occurrence {
        use super::*;

        #[test]
        fn builder_pattern() {
            let occ = Occurrence::new("christmas", date(2024, 12, 25), "Christmas Day")
                .with_provenance("fixed:12-25");
            assert_eq!(occ.key, "christmas");
            assert_eq!(occ.date, date(2024, 12, 25));
            assert_eq!(occ.name, "Christmas Day");
            assert_eq!(occ.provenance, "fixed:12-25");
        }
    }

    mod event {
        use super::*;

        #[test]
        fn from_occurrence_copies_fields() {
            let occ = Occurrence::new("christmas", date(2024, 12, 25), "Christmas Day")
                .with_provenance("fixed:12-25");
            let event = Event::from_occurrence(&occ, EventType::Closed);
            assert_eq!(event.date, occ.date);
            assert_eq!(event.description, "Christmas Day");
            assert_eq!(event.provenance, "fixed:12-25");
            assert_eq!(event.event_type, EventType::Closed);
        }

        #[test]
        fn ordering_date_then_type_then_description() {
            let mut events = vec![
                Event::new(date(2024, 12, 26), EventType::Closed, "Boxing Day", ""),
                Event::new(date(2024, 12, 24), EventType::Notable, "B", ""),
                Event::new(date(2024, 12, 24), EventType::EarlyClose, "Z", ""),
                Event::new(date(2024, 12, 24), EventType::Notable, "A", ""),
            ];
            events.sort();

            let summary: Vec<_> = events
                .iter()
                .map(|e| (e.date.format("%m-%d").to_string(), e.description.as_str()))
                .collect();
            assert_eq!(
                summary,
                vec![
                    ("12-24".to_string(), "Z"),
                    ("12-24".to_string(), "A"),
                    ("12-24".to_string(), "B"),
                    ("12-26".to_string(), "Boxing Day"),
                ]
            );
        }

        #[test]
        fn serde_renames_event_type() {
            let event = Event::new(date(2024, 7, 4), EventType::Closed, "Independence Day", "us");
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["type"], "CLOSED");
            assert_eq!(value["date"], "2024-07-04");
        }
    }
}
