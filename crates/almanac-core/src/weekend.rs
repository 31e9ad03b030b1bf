//! Weekend policy.
//!
//! A [`WeekendPolicy`] is the set of week-days a calendar treats as
//! non-business days. Calendars collect fragments from their parents and
//! modules and union them; an empty union falls back to Saturday/Sunday.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// A set of week-days treated as non-business days.
///
/// Stored as a bitmask indexed by `Weekday::num_days_from_monday`, so
/// iteration is always Monday-first regardless of insertion order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Weekday>", into = "Vec<Weekday>")]
pub struct WeekendPolicy {
    mask: u8,
}

impl WeekendPolicy {
    /// An empty policy (no weekend days contributed).
    pub const fn empty() -> Self {
        Self { mask: 0 }
    }

    /// The canonical Saturday/Sunday weekend.
    pub fn sat_sun() -> Self {
        Self::from_days([Weekday::Sat, Weekday::Sun])
    }

    /// Creates a policy from the given days.
    pub fn from_days(days: impl IntoIterator<Item = Weekday>) -> Self {
        let mut policy = Self::empty();
        for day in days {
            policy.insert(day);
        }
        policy
    }

    /// Adds a day to the policy.
    pub fn insert(&mut self, day: Weekday) {
        self.mask |= bit(day);
    }

    /// Builder method to add a day.
    pub fn with_day(mut self, day: Weekday) -> Self {
        self.insert(day);
        self
    }

    /// Returns the union of both policies.
    pub fn union(&self, other: &WeekendPolicy) -> Self {
        Self {
            mask: self.mask | other.mask,
        }
    }

    /// Returns true if `day` is part of the weekend.
    pub fn contains(&self, day: Weekday) -> bool {
        self.mask & bit(day) != 0
    }

    /// Returns true if `date` falls on a weekend day.
    pub fn is_weekend(&self, date: NaiveDate) -> bool {
        self.contains(date.weekday())
    }

    /// Returns true if no days are set.
    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    /// Returns the number of weekend days.
    pub fn len(&self) -> usize {
        self.mask.count_ones() as usize
    }

    /// Returns `self`, or the Saturday/Sunday default when empty.
    pub fn or_default_weekend(self) -> Self {
        if self.is_empty() { Self::sat_sun() } else { self }
    }

    /// Iterates over the weekend days, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        WEEK.into_iter().filter(|day| self.contains(*day))
    }
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn bit(day: Weekday) -> u8 {
    1 << day.num_days_from_monday()
}

impl From<Vec<Weekday>> for WeekendPolicy {
    fn from(days: Vec<Weekday>) -> Self {
        Self::from_days(days)
    }
}

impl From<WeekendPolicy> for Vec<Weekday> {
    fn from(policy: WeekendPolicy) -> Self {
        policy.iter().collect()
    }
}

impl FromIterator<Weekday> for WeekendPolicy {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        Self::from_days(iter)
    }
}

impl fmt::Display for WeekendPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days: Vec<String> = self.iter().map(|d| d.to_string()).collect();
        write!(f, "[{}]", days.join(", "))
    }
}
