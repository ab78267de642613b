//! Domain types exchanged between the tool layer and the calendar service.

use chrono::{DateTime, FixedOffset, Utc};
use freebusy_engine::Interval;
use serde::Serialize;

use crate::error::{CalendarError, ErrorCode, Result};

pub const DEFAULT_MAX_RESULTS: u32 = 50;
pub const MAX_RESULTS_LIMIT: u32 = 250;

pub const EVENT_STATUS_CONFIRMED: &str = "confirmed";
pub const EVENT_STATUS_CANCELLED: &str = "cancelled";

/// A calendar event as reported back to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub id: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    /// True for date-only events; their times are midnight in the calendar's
    /// configured time zone.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub all_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarInfo {
    pub id: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub timezone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// A validated query range: `start` is strictly before `end`.
///
/// Every entry point that takes a start/end pair goes through
/// [`TimeRange::new`], so inverted or empty ranges never reach the calendar
/// API or the free/busy engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
}

impl TimeRange {
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Result<Self> {
        if start >= end {
            return Err(CalendarError::invalid_input(
                ErrorCode::InvalidTimeRange,
                "Start time must be before end time",
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    pub fn end(&self) -> DateTime<FixedOffset> {
        self.end
    }

    /// The caller's offset, used to render results in their own local time.
    pub fn offset(&self) -> FixedOffset {
        *self.start.offset()
    }

    pub fn to_interval(&self) -> Interval {
        Interval::new(self.start.with_timezone(&Utc), self.end.with_timezone(&Utc))
    }
}

/// A request to create an event.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub summary: String,
    pub description: Option<String>,
    pub range: TimeRange,
    pub location: Option<String>,
    pub attendees: Vec<String>,
}

impl NewEvent {
    pub fn validate(&self) -> Result<()> {
        if self.summary.trim().is_empty() {
            return Err(CalendarError::invalid_input(
                ErrorCode::InvalidEventData,
                "Event summary is required",
            ));
        }
        validate_attendees(&self.attendees)
    }
}

/// A partial update. `None` leaves a field untouched; `Some("")` clears a
/// text field; `Some(vec![])` removes all attendees.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventUpdate {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: Option<DateTime<FixedOffset>>,
    pub end_time: Option<DateTime<FixedOffset>>,
    pub attendees: Option<Vec<String>>,
}

impl EventUpdate {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.attendees.is_none()
    }

    /// Checks what can be checked without the stored event: a title cannot
    /// be cleared, a supplied start/end pair must be ordered, and attendees
    /// must look like email addresses.
    pub fn validate(&self) -> Result<()> {
        if matches!(&self.summary, Some(s) if s.trim().is_empty()) {
            return Err(CalendarError::invalid_input(
                ErrorCode::InvalidEventData,
                "Event summary cannot be cleared",
            ));
        }
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            TimeRange::new(start, end)?;
        }
        if let Some(attendees) = &self.attendees {
            validate_attendees(attendees)?;
        }
        Ok(())
    }
}

fn validate_attendees(attendees: &[String]) -> Result<()> {
    for email in attendees {
        if !email.contains('@') {
            return Err(CalendarError::invalid_input(
                ErrorCode::InvalidEventData,
                format!("Invalid email format: {}", email),
            ));
        }
    }
    Ok(())
}
