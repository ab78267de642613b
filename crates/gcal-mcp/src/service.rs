//! The calendar access seam used by the tool layer.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use freebusy_engine::TimeSlot;

use crate::error::Result;
use crate::models::{CalendarInfo, Event, EventUpdate, NewEvent, TimeRange};

/// A text search over a calendar, optionally bounded in time.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub query: String,
    pub start: Option<DateTime<FixedOffset>>,
    pub end: Option<DateTime<FixedOffset>>,
    pub max_results: u32,
}

/// Operations the MCP tools need from a calendar backend.
///
/// Implementations resolve their own calendar ID from configuration; only
/// availability checks may target a different calendar.
#[async_trait]
pub trait CalendarService: Send + Sync {
    /// Free/busy slots tiling `range`. `calendar_id` overrides the configured
    /// calendar when present.
    async fn check_availability(
        &self,
        calendar_id: Option<&str>,
        range: TimeRange,
    ) -> Result<Vec<TimeSlot>>;

    async fn create_event(&self, event: &NewEvent) -> Result<Event>;

    async fn list_events(&self, range: TimeRange, max_results: u32) -> Result<Vec<Event>>;

    async fn update_event(&self, event_id: &str, update: &EventUpdate) -> Result<Event>;

    async fn delete_event(&self, event_id: &str) -> Result<()>;

    async fn calendar_info(&self) -> Result<CalendarInfo>;

    async fn search_events(&self, query: &SearchQuery) -> Result<Vec<Event>>;
}
