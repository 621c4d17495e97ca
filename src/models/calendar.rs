//! Calendars and off-time intervals.
//!
//! # Time Model
//! Times are integer minutes on the same axis as task starts and the
//! planning horizon. The consumer defines the epoch.

use serde::{Deserialize, Serialize};

use super::CalendarId;

/// A block of time off, `[start, start + duration)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffInterval {
    /// Interval start (inclusive).
    pub start: i64,
    /// Length of the interval.
    pub duration: i64,
}

impl OffInterval {
    /// Creates a new off-interval.
    pub fn new(start: i64, duration: i64) -> Self {
        Self { start, duration }
    }

    /// Interval end (exclusive).
    #[inline]
    pub fn end(&self) -> i64 {
        self.start + self.duration
    }

    /// Whether a time falls within this interval.
    #[inline]
    pub fn contains(&self, time: i64) -> bool {
        time >= self.start && time < self.end()
    }
}

/// A named calendar shared by one or more people.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calendar {
    /// Calendar identifier.
    pub id: CalendarId,
    /// Human-readable name.
    pub name: String,
    /// Start times of zero-duration fixed blocks.
    pub fixed: Vec<i64>,
    /// Periods off work.
    pub offs: Vec<OffInterval>,
}

impl Calendar {
    /// Creates an empty calendar.
    pub fn new(id: CalendarId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            fixed: Vec::new(),
            offs: Vec::new(),
        }
    }

    /// Adds an off-interval.
    pub fn with_off(mut self, start: i64, duration: i64) -> Self {
        self.offs.push(OffInterval::new(start, duration));
        self
    }

    /// Whether a time falls in any off-interval of this calendar.
    pub fn is_off(&self, time: i64) -> bool {
        self.offs.iter().any(|o| o.contains(time))
    }
}
