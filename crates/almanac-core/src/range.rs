//! Date ranges for range-aware callers.
//!
//! [`DateRange`] is an inclusive `[start, end]` span of calendar dates. It is
//! validated on construction so every instance satisfies `start <= end`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when constructing a [`DateRange`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// The start date lies after the end date.
    #[error("invalid date range: start {start} is after end {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },
}

/// An inclusive range of dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = RangeError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Creates a new range.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::StartAfterEnd`] if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::StartAfterEnd { start, end });
        }
        Ok(Self { start, end })
    }

    /// A range covering a single day.
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// First date of the range (inclusive).
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last date of the range (inclusive).
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Checks if a date falls within the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Iterates over every date in the range.
    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rejects_start_after_end() {
        let err = DateRange::new(date(2024, 12, 31), date(2024, 1, 1)).unwrap_err();
        assert_eq!(
            err,
            RangeError::StartAfterEnd {
                start: date(2024, 12, 31),
                end: date(2024, 1, 1),
            }
        );
        assert!(err.to_string().contains("2024-12-31"));
    }

    #[test]
    fn single_day_range() {
        let range = DateRange::single(date(2024, 2, 29));
        assert_eq!(range.days(), 1);
        assert!(range.contains(date(2024, 2, 29)));
        assert!(!range.contains(date(2024, 3, 1)));
    }

    #[test]
    fn contains_is_inclusive() {
        let range = DateRange::new(date(2024, 12, 24), date(2024, 12, 26)).unwrap();
        assert!(range.contains(date(2024, 12, 24)));
        assert!(range.contains(date(2024, 12, 26)));
        assert!(!range.contains(date(2024, 12, 23)));
        assert!(!range.contains(date(2024, 12, 27)));
    }

    #[test]
    fn iterates_every_day() {
        let range = DateRange::new(date(2024, 2, 27), date(2024, 3, 1)).unwrap();
        let days: Vec<_> = range.iter().collect();
        assert_eq!(
            days,
            vec![
                date(2024, 2, 27),
                date(2024, 2, 28),
                date(2024, 2, 29),
                date(2024, 3, 1)
            ]
        );
        assert_eq!(range.days(), 4);
    }

    #[test]
    fn deserialize_validates() {
        let ok: DateRange =
            serde_json::from_str(r#"{"start":"2024-01-01","end":"2024-12-31"}"#).unwrap();
        assert_eq!(ok.days(), 366);

        let bad = serde_json::from_str::<DateRange>(r#"{"start":"2025-01-01","end":"2024-12-31"}"#);
        assert!(bad.is_err());
    }
}
