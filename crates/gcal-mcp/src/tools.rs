//! Tool layer: argument parsing, validation, and response formatting.
//!
//! Each tool takes its deserialized arguments, turns them into domain values,
//! calls the [`CalendarService`], and renders a pretty-printed JSON document.
//! Timestamps in responses are written in the caller's own UTC offset.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use freebusy_engine::TimeSlot;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::calculator::{self, CalculatorError, Operation};
use crate::error::{CalendarError, ErrorCode, Result};
use crate::models::{
    EventUpdate, NewEvent, TimeRange, DEFAULT_MAX_RESULTS, MAX_RESULTS_LIMIT,
};
use crate::service::{CalendarService, SearchQuery};

// ── Arguments ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CalculateArgs {
    #[schemars(description = "The operation to perform (add, subtract, multiply, divide)")]
    pub operation: Operation,
    #[schemars(description = "First number")]
    pub x: f64,
    #[schemars(description = "Second number")]
    pub y: f64,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CheckAvailabilityArgs {
    #[schemars(
        description = "The start of the time window to check, in RFC3339 format (e.g., 2024-07-22T09:00:00Z)."
    )]
    pub start_time: String,
    #[schemars(
        description = "The end of the time window to check, in RFC3339 format (e.g., 2024-07-22T17:00:00Z)."
    )]
    pub end_time: String,
    #[schemars(
        description = "Specific calendar ID to check. Defaults to the configured calendar if not provided."
    )]
    #[serde(default)]
    pub calendar_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateEventArgs {
    #[schemars(description = "The title/summary of the event.")]
    pub title: String,
    #[schemars(description = "The start time for the event, in RFC3339 format.")]
    pub start_time: String,
    #[schemars(description = "The end time for the event, in RFC3339 format.")]
    pub end_time: String,
    #[schemars(description = "A description for the event.")]
    #[serde(default)]
    pub description: Option<String>,
    #[schemars(description = "The location for the event.")]
    #[serde(default)]
    pub location: Option<String>,
    #[schemars(description = "Comma-separated list of attendee email addresses.")]
    #[serde(default)]
    pub attendees: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListEventsArgs {
    #[schemars(description = "The start of the time window to list events, in RFC3339 format.")]
    pub start_time: String,
    #[schemars(description = "The end of the time window to list events, in RFC3339 format.")]
    pub end_time: String,
    #[schemars(description = "Maximum number of events to return (default: 50, max: 250).")]
    #[serde(default)]
    pub max_results: Option<f64>,
}

/// Omitted fields are left unchanged. An empty string clears `description`,
/// `location`, or `attendees`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateEventArgs {
    #[schemars(description = "The ID of the event to update.")]
    pub event_id: String,
    #[schemars(description = "New title for the event.")]
    #[serde(default)]
    pub title: Option<String>,
    #[schemars(description = "New start time for the event, in RFC3339 format.")]
    #[serde(default)]
    pub start_time: Option<String>,
    #[schemars(description = "New end time for the event, in RFC3339 format.")]
    #[serde(default)]
    pub end_time: Option<String>,
    #[schemars(description = "New description for the event. An empty string clears it.")]
    #[serde(default)]
    pub description: Option<String>,
    #[schemars(description = "New location for the event. An empty string clears it.")]
    #[serde(default)]
    pub location: Option<String>,
    #[schemars(
        description = "Comma-separated list of attendee email addresses. An empty string removes all attendees."
    )]
    #[serde(default)]
    pub attendees: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteEventArgs {
    #[schemars(description = "The ID of the event to delete.")]
    pub event_id: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchEventsArgs {
    #[schemars(description = "Search query to match against event titles and descriptions.")]
    pub query: String,
    #[schemars(description = "Optional start time to limit search, in RFC3339 format.")]
    #[serde(default)]
    pub start_time: Option<String>,
    #[schemars(description = "Optional end time to limit search, in RFC3339 format.")]
    #[serde(default)]
    pub end_time: Option<String>,
    #[schemars(description = "Maximum number of events to return (default: 50, max: 250).")]
    #[serde(default)]
    pub max_results: Option<f64>,
}

// ── Parsing helpers ─────────────────────────────────────────────────────────

/// Parse an RFC 3339 timestamp supplied in argument `field`.
pub fn parse_time(field: &str, raw: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw.trim()).map_err(|e| CalendarError::InvalidInput {
        code: ErrorCode::InvalidTimeFormat,
        message: format!("Invalid {} format. Please use RFC3339 format", field),
        details: Some(format!("{:?}: {}", raw, e)),
    })
}

/// Like [`parse_time`], but an absent or blank value is `None`.
pub fn parse_optional_time(field: &str, raw: Option<&str>) -> Result<Option<DateTime<FixedOffset>>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_time(field, value).map(Some),
    }
}

/// Split a comma-separated attendee list, dropping blanks.
pub fn parse_attendees(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Values outside `1..=250` (after truncation) fall back to the default.
pub fn clamp_max_results(requested: Option<f64>) -> u32 {
    match requested.map(f64::trunc) {
        Some(n) if n >= 1.0 && n <= f64::from(MAX_RESULTS_LIMIT) => n as u32,
        _ => DEFAULT_MAX_RESULTS,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn rfc3339(t: DateTime<FixedOffset>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Serialize)]
struct SlotView {
    start: String,
    end: String,
    free: bool,
}

fn slot_view(slot: &TimeSlot, offset: &FixedOffset) -> SlotView {
    SlotView {
        start: rfc3339(slot.start.with_timezone(offset)),
        end: rfc3339(slot.end.with_timezone(offset)),
        free: slot.free,
    }
}

fn pretty(value: &serde_json::Value) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CalendarError::internal("Failed to render response", Some(e.to_string())))
}

// ── Tools ───────────────────────────────────────────────────────────────────

/// Runs tool calls against an optional calendar backend.
///
/// The server starts even when the calendar cannot be reached (for example,
/// missing credentials); calendar tools then fail with a service-unavailable
/// error while `calculate` keeps working.
#[derive(Clone)]
pub struct ToolManager {
    service: Option<Arc<dyn CalendarService>>,
}

impl ToolManager {
    pub fn new(service: Option<Arc<dyn CalendarService>>) -> Self {
        Self { service }
    }

    pub fn has_calendar(&self) -> bool {
        self.service.is_some()
    }

    fn service(&self) -> Result<&dyn CalendarService> {
        self.service.as_deref().ok_or_else(|| {
            CalendarError::internal(
                "Calendar service unavailable. Please check your Google Calendar credentials configuration.",
                None,
            )
        })
    }

    pub fn calculate(&self, args: CalculateArgs) -> std::result::Result<String, CalculatorError> {
        info!(tool = "calculate", operation = ?args.operation, "tool called");
        let result = calculator::calculate(args.operation, args.x, args.y)?;
        Ok(calculator::format_result(result))
    }

    pub async fn check_availability(&self, args: CheckAvailabilityArgs) -> Result<String> {
        info!(tool = "check_google_calendar", "tool called");
        let service = self.service()?;
        let range = TimeRange::new(
            parse_time("start_time", &args.start_time)?,
            parse_time("end_time", &args.end_time)?,
        )?;
        let calendar_id = non_blank(args.calendar_id);

        let slots = service
            .check_availability(calendar_id.as_deref(), range)
            .await?;

        let offset = range.offset();
        let slots: Vec<SlotView> = slots.iter().map(|s| slot_view(s, &offset)).collect();
        pretty(&json!({
            "time_range": {
                "start": rfc3339(range.start()),
                "end": rfc3339(range.end()),
            },
            "time_slots": slots,
        }))
    }

    pub async fn create_event(&self, args: CreateEventArgs) -> Result<String> {
        info!(tool = "create_calendar_event", "tool called");
        let service = self.service()?;
        let event = NewEvent {
            summary: args.title.trim().to_string(),
            description: non_blank(args.description),
            range: TimeRange::new(
                parse_time("start_time", &args.start_time)?,
                parse_time("end_time", &args.end_time)?,
            )?,
            location: non_blank(args.location),
            attendees: args.attendees.as_deref().map(parse_attendees).unwrap_or_default(),
        };
        event.validate()?;

        let created = service.create_event(&event).await?;
        pretty(&json!({
            "success": true,
            "message": format!("Successfully created event '{}'", created.summary),
            "event": created,
        }))
    }

    pub async fn list_events(&self, args: ListEventsArgs) -> Result<String> {
        info!(tool = "list_calendar_events", "tool called");
        let service = self.service()?;
        let range = TimeRange::new(
            parse_time("start_time", &args.start_time)?,
            parse_time("end_time", &args.end_time)?,
        )?;

        let events = service
            .list_events(range, clamp_max_results(args.max_results))
            .await?;
        pretty(&json!({
            "time_range": {
                "start": rfc3339(range.start()),
                "end": rfc3339(range.end()),
            },
            "event_count": events.len(),
            "events": events,
        }))
    }

    pub async fn update_event(&self, args: UpdateEventArgs) -> Result<String> {
        info!(tool = "update_calendar_event", event_id = %args.event_id, "tool called");
        let service = self.service()?;
        let event_id = args.event_id.trim();
        if event_id.is_empty() {
            return Err(CalendarError::invalid_input(
                ErrorCode::InvalidEventData,
                "Event ID is required",
            ));
        }

        let update = EventUpdate {
            summary: args.title.map(|t| t.trim().to_string()),
            description: args.description,
            location: args.location,
            start_time: parse_optional_time("start_time", args.start_time.as_deref())?,
            end_time: parse_optional_time("end_time", args.end_time.as_deref())?,
            attendees: args.attendees.as_deref().map(parse_attendees),
        };
        if update.is_empty() {
            return Err(CalendarError::invalid_input(
                ErrorCode::InvalidEventData,
                "No fields to update",
            ));
        }
        update.validate()?;

        let updated = service.update_event(event_id, &update).await?;
        pretty(&json!({
            "success": true,
            "message": format!("Successfully updated event '{}'", updated.summary),
            "event": updated,
        }))
    }

    pub async fn delete_event(&self, args: DeleteEventArgs) -> Result<String> {
        info!(tool = "delete_calendar_event", event_id = %args.event_id, "tool called");
        let service = self.service()?;
        let event_id = args.event_id.trim();
        if event_id.is_empty() {
            return Err(CalendarError::invalid_input(
                ErrorCode::InvalidEventData,
                "Event ID is required",
            ));
        }

        service.delete_event(event_id).await?;
        pretty(&json!({
            "success": true,
            "message": format!("Successfully deleted event with ID: {}", event_id),
        }))
    }

    pub async fn search_events(&self, args: SearchEventsArgs) -> Result<String> {
        info!(tool = "search_calendar_events", "tool called");
        let service = self.service()?;
        let query = args.query.trim().to_string();
        if query.is_empty() {
            return Err(CalendarError::invalid_input(
                ErrorCode::InvalidEventData,
                "Search query is required",
            ));
        }

        let start = parse_optional_time("start_time", args.start_time.as_deref())?;
        let end = parse_optional_time("end_time", args.end_time.as_deref())?;
        if let (Some(start), Some(end)) = (start, end) {
            TimeRange::new(start, end)?;
        }

        let search = SearchQuery {
            query,
            start,
            end,
            max_results: clamp_max_results(args.max_results),
        };
        let events = service.search_events(&search).await?;

        let mut response = json!({
            "query": search.query,
            "event_count": events.len(),
            "events": events,
        });
        if start.is_some() || end.is_some() {
            let mut range = serde_json::Map::new();
            if let Some(start) = start {
                range.insert("start".into(), rfc3339(start).into());
            }
            if let Some(end) = end {
                range.insert("end".into(), rfc3339(end).into());
            }
            response["time_range"] = range.into();
        }
        pretty(&response)
    }

    pub async fn calendar_info(&self) -> Result<String> {
        info!(tool = "get_calendar_info", "tool called");
        let info = self.service()?.calendar_info().await?;
        pretty(&json!(info))
    }
}
