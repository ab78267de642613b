//! Interval and time slot value types.
//!
//! Both types hold instants (`DateTime<Utc>`), so comparisons never depend on
//! the offset a timestamp was originally written with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// True when the interval covers no time (`start >= end`).
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Two intervals intersect when they share some positive-length span.
    /// Touching endpoints do not count.
    pub fn intersects(&self, other: &Interval) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Truncate this interval to fit inside `window`.
    pub fn clip_to(&self, window: &Interval) -> Interval {
        Interval {
            start: self.start.max(window.start),
            end: self.end.min(window.end),
        }
    }
}

/// A labeled slice of a query window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub free: bool,
}

impl TimeSlot {
    pub fn free(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            free: true,
        }
    }

    pub fn busy(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            free: false,
        }
    }

    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }

    pub fn duration_minutes(&self) -> i64 {
        self.interval().duration_minutes()
    }
}
