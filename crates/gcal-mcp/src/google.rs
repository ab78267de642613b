//! Google Calendar v3 REST client.
//!
//! Talks to the Events and Calendars resources over `reqwest` with a bearer
//! token from [`Credentials`]. Responses are converted into the crate's
//! domain types; busy periods for availability checks are handed to
//! `freebusy-engine`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use freebusy_engine::{compute_time_slots, Interval, TimeSlot};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::Credentials;
use crate::config::Config;
use crate::error::{CalendarError, ErrorCode, Result};
use crate::models::{
    CalendarInfo, Event, EventUpdate, NewEvent, TimeRange, EVENT_STATUS_CANCELLED,
    EVENT_STATUS_CONFIRMED, MAX_RESULTS_LIMIT,
};
use crate::service::{CalendarService, SearchQuery};

// ── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Attendee {
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GoogleEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transparency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<Attendee>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<GoogleEvent>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarResource {
    id: String,
    #[serde(default)]
    summary: String,
    description: Option<String>,
    time_zone: Option<String>,
    location: Option<String>,
}

/// What a request was about, for not-found messages.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Target<'a> {
    Calendar(&'a str),
    Event(&'a str),
}

/// Parameters for one `events.list` call.
#[derive(Debug, Default)]
struct ListParams {
    time_min: Option<String>,
    time_max: Option<String>,
    query: Option<String>,
    max_results: u32,
    page_token: Option<String>,
}

impl ListParams {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("maxResults", self.max_results.to_string()),
        ];
        if let Some(t) = &self.time_min {
            params.push(("timeMin", t.clone()));
        }
        if let Some(t) = &self.time_max {
            params.push(("timeMax", t.clone()));
        }
        if let Some(q) = &self.query {
            params.push(("q", q.clone()));
        }
        if let Some(token) = &self.page_token {
            params.push(("pageToken", token.clone()));
        }
        params
    }
}

// ── Client ──────────────────────────────────────────────────────────────────

pub struct GoogleCalendar {
    http: reqwest::Client,
    api_base: Url,
    calendar_id: String,
    time_zone: Tz,
    token: String,
}

impl GoogleCalendar {
    /// Build a client from validated configuration.
    ///
    /// # Errors
    /// Returns an `Authentication` error when the credentials cannot be read
    /// or carry no access token, and `Internal` when the API base URL or the
    /// HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let credentials = Credentials::load(&config.credentials)?;
        let token = credentials.bearer_token()?.to_string();

        let api_base = Url::parse(&config.api_base).map_err(|e| {
            CalendarError::internal(
                format!("Invalid API base URL: {}", config.api_base),
                Some(e.to_string()),
            )
        })?;
        if api_base.cannot_be_a_base() {
            return Err(CalendarError::internal(
                format!("Invalid API base URL: {}", config.api_base),
                None,
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("gcal-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                CalendarError::internal("Failed to build HTTP client", Some(e.to_string()))
            })?;

        debug!(
            kind = ?credentials.kind(),
            client_email = credentials.client_email().unwrap_or("<none>"),
            calendar_id = %config.calendar_id,
            "google calendar client ready"
        );

        Ok(Self {
            http,
            api_base,
            calendar_id: config.calendar_id.clone(),
            time_zone: config.time_zone,
            token,
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        // `new` rejects cannot-be-a-base URLs, so segments are always available.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn events_url(&self, calendar_id: &str) -> Url {
        self.url(&["calendars", calendar_id, "events"])
    }

    fn event_url(&self, event_id: &str) -> Url {
        self.url(&["calendars", self.calendar_id.as_str(), "events", event_id])
    }

    async fn send(&self, request: RequestBuilder, action: &str, target: Target<'_>) -> Result<Response> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| transport_error(action, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(%status, action, "google calendar request failed");
        Err(status_error(status, &body, action, target))
    }

    async fn send_json<T>(&self, request: RequestBuilder, action: &str, target: Target<'_>) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.send(request, action, target)
            .await?
            .json::<T>()
            .await
            .map_err(|e| transport_error(action, e))
    }

    async fn list_page(&self, calendar_id: &str, params: &ListParams) -> Result<EventsPage> {
        let request = self
            .http
            .get(self.events_url(calendar_id))
            .query(&params.to_query());
        self.send_json(request, "retrieve events", Target::Calendar(calendar_id))
            .await
    }

    fn convert_all(&self, items: Vec<GoogleEvent>) -> Vec<Event> {
        items
            .into_iter()
            .filter_map(|raw| {
                let id = raw.id.clone().unwrap_or_default();
                let event = to_event(raw, self.time_zone);
                if event.is_none() {
                    warn!(event_id = %id, "skipping event with unreadable start/end");
                }
                event
            })
            .collect()
    }
}

#[async_trait]
impl CalendarService for GoogleCalendar {
    async fn check_availability(
        &self,
        calendar_id: Option<&str>,
        range: TimeRange,
    ) -> Result<Vec<TimeSlot>> {
        let calendar_id = calendar_id.unwrap_or(self.calendar_id.as_str());
        let mut params = ListParams {
            time_min: Some(range.start().to_rfc3339()),
            time_max: Some(range.end().to_rfc3339()),
            max_results: MAX_RESULTS_LIMIT,
            ..ListParams::default()
        };

        let mut busy = Vec::new();
        loop {
            let page = self.list_page(calendar_id, &params).await?;
            for item in page.items.iter().filter(|e| blocks_time(e)) {
                match busy_interval(item, self.time_zone) {
                    Some(interval) => busy.push(interval),
                    None => warn!(
                        event_id = item.id.as_deref().unwrap_or_default(),
                        "skipping busy event with unreadable start/end"
                    ),
                }
            }
            match page.next_page_token {
                Some(token) => params.page_token = Some(token),
                None => break,
            }
        }

        debug!(calendar_id, busy = busy.len(), "computing availability");
        Ok(compute_time_slots(range.to_interval(), &busy)?)
    }

    async fn create_event(&self, event: &NewEvent) -> Result<Event> {
        event.validate()?;

        let body = new_event_body(event, self.time_zone);
        let request = self
            .http
            .post(self.events_url(&self.calendar_id))
            .json(&body);
        let created: GoogleEvent = self
            .send_json(request, "create event", Target::Calendar(&self.calendar_id))
            .await?;

        let created = to_event(created, self.time_zone).ok_or_else(|| {
            CalendarError::internal("Calendar returned an unreadable event", None)
        })?;
        info!(event_id = %created.id, "created event");
        Ok(created)
    }

    async fn list_events(&self, range: TimeRange, max_results: u32) -> Result<Vec<Event>> {
        let params = ListParams {
            time_min: Some(range.start().to_rfc3339()),
            time_max: Some(range.end().to_rfc3339()),
            max_results,
            ..ListParams::default()
        };
        let page = self.list_page(&self.calendar_id, &params).await?;
        Ok(self.convert_all(page.items))
    }

    async fn update_event(&self, event_id: &str, update: &EventUpdate) -> Result<Event> {
        if event_id.trim().is_empty() {
            return Err(CalendarError::invalid_input(
                ErrorCode::InvalidEventData,
                "Event ID is required",
            ));
        }
        update.validate()?;

        let target = Target::Event(event_id);
        let mut existing: Value = self
            .send_json(self.http.get(self.event_url(event_id)), "retrieve event", target)
            .await?;

        apply_update(&mut existing, update, self.time_zone);
        check_event_order(&existing, self.time_zone)?;

        let request = self.http.put(self.event_url(event_id)).json(&existing);
        let updated: GoogleEvent = self.send_json(request, "update event", target).await?;

        let updated = to_event(updated, self.time_zone).ok_or_else(|| {
            CalendarError::internal("Calendar returned an unreadable event", None)
        })?;
        info!(event_id, "updated event");
        Ok(updated)
    }

    async fn delete_event(&self, event_id: &str) -> Result<()> {
        if event_id.trim().is_empty() {
            return Err(CalendarError::invalid_input(
                ErrorCode::InvalidEventData,
                "Event ID is required",
            ));
        }

        self.send(
            self.http.delete(self.event_url(event_id)),
            "delete event",
            Target::Event(event_id),
        )
        .await?;
        info!(event_id, "deleted event");
        Ok(())
    }

    async fn calendar_info(&self) -> Result<CalendarInfo> {
        let request = self.http.get(self.url(&["calendars", self.calendar_id.as_str()]));
        let resource: CalendarResource = self
            .send_json(
                request,
                "retrieve calendar",
                Target::Calendar(&self.calendar_id),
            )
            .await?;

        Ok(CalendarInfo {
            id: resource.id,
            summary: resource.summary,
            description: resource.description.filter(|d| !d.is_empty()),
            timezone: resource
                .time_zone
                .unwrap_or_else(|| self.time_zone.name().to_string()),
            location: resource.location.filter(|l| !l.is_empty()),
        })
    }

    async fn search_events(&self, query: &SearchQuery) -> Result<Vec<Event>> {
        if query.query.trim().is_empty() {
            return Err(CalendarError::invalid_input(
                ErrorCode::InvalidEventData,
                "Search query is required",
            ));
        }

        let params = ListParams {
            time_min: query.start.map(|t| t.to_rfc3339()),
            time_max: query.end.map(|t| t.to_rfc3339()),
            query: Some(query.query.clone()),
            max_results: query.max_results,
            page_token: None,
        };
        let page = self.list_page(&self.calendar_id, &params).await?;
        Ok(self.convert_all(page.items))
    }
}

// ── Conversions ─────────────────────────────────────────────────────────────

/// Resolve an API date/time into an instant. Date-only values are midnight in
/// `tz`; the flag reports whether that happened.
pub(crate) fn resolve_time(value: &EventDateTime, tz: Tz) -> Option<(DateTime<FixedOffset>, bool)> {
    if let Some(raw) = &value.date_time {
        return DateTime::parse_from_rfc3339(raw).ok().map(|t| (t, false));
    }
    let date = NaiveDate::parse_from_str(value.date.as_deref()?, "%Y-%m-%d").ok()?;
    Some((start_of_day(date, tz)?.fixed_offset(), true))
}

/// First instant of `date` in `tz`. Where a DST gap swallows midnight (for
/// example America/Havana on 2024-03-10) the day starts when the gap ends.
fn start_of_day(date: NaiveDate, tz: Tz) -> Option<DateTime<Tz>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    // Gaps fall on quarter-hour boundaries and never exceed a few hours.
    (0..=16)
        .map(|quarter| midnight + Duration::minutes(15 * quarter))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
}

/// Convert an API event, or `None` when its start or end cannot be read.
pub(crate) fn to_event(raw: GoogleEvent, tz: Tz) -> Option<Event> {
    let (start_time, all_day) = resolve_time(raw.start.as_ref()?, tz)?;
    let (end_time, _) = resolve_time(raw.end.as_ref()?, tz)?;
    let parse = |s: &Option<String>| {
        s.as_deref()
            .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
    };

    Some(Event {
        id: raw.id.clone().unwrap_or_default(),
        summary: raw.summary.clone().unwrap_or_default(),
        description: raw.description.clone().filter(|d| !d.is_empty()),
        start_time,
        end_time,
        all_day,
        location: raw.location.clone().filter(|l| !l.is_empty()),
        attendees: raw
            .attendees
            .iter()
            .flatten()
            .map(|a| a.email.clone())
            .collect(),
        status: raw
            .status
            .clone()
            .unwrap_or_else(|| EVENT_STATUS_CONFIRMED.to_string()),
        created_at: parse(&raw.created),
        updated_at: parse(&raw.updated),
    })
}

/// Cancelled and "show as available" events do not occupy time.
pub(crate) fn blocks_time(event: &GoogleEvent) -> bool {
    event.status.as_deref() != Some(EVENT_STATUS_CANCELLED)
        && event.transparency.as_deref() != Some("transparent")
}

pub(crate) fn busy_interval(event: &GoogleEvent, tz: Tz) -> Option<Interval> {
    let (start, _) = resolve_time(event.start.as_ref()?, tz)?;
    let (end, _) = resolve_time(event.end.as_ref()?, tz)?;
    Some(Interval::new(start.with_timezone(&Utc), end.with_timezone(&Utc)))
}

fn timed(t: DateTime<FixedOffset>, tz: Tz) -> EventDateTime {
    EventDateTime {
        date_time: Some(t.to_rfc3339()),
        date: None,
        time_zone: Some(tz.name().to_string()),
    }
}

fn attendee_list(emails: &[String]) -> Vec<Attendee> {
    emails
        .iter()
        .map(|email| Attendee {
            email: email.clone(),
        })
        .collect()
}

pub(crate) fn new_event_body(event: &NewEvent, tz: Tz) -> GoogleEvent {
    GoogleEvent {
        summary: Some(event.summary.clone()),
        description: event.description.clone(),
        location: event.location.clone(),
        start: Some(timed(event.range.start(), tz)),
        end: Some(timed(event.range.end(), tz)),
        attendees: (!event.attendees.is_empty()).then(|| attendee_list(&event.attendees)),
        ..GoogleEvent::default()
    }
}

/// Apply a partial update to the raw event JSON. Fields the update does not
/// mention, and fields this crate does not model, are left as they were.
pub(crate) fn apply_update(event: &mut Value, update: &EventUpdate, tz: Tz) {
    let Some(obj) = event.as_object_mut() else {
        return;
    };

    let mut set_text = |key: &str, value: &Option<String>| match value.as_deref() {
        None => {}
        Some("") => {
            obj.remove(key);
        }
        Some(text) => {
            obj.insert(key.to_string(), Value::String(text.to_string()));
        }
    };
    set_text("summary", &update.summary);
    set_text("description", &update.description);
    set_text("location", &update.location);

    if let Some(start) = update.start_time {
        obj.insert("start".into(), json_value(&timed(start, tz)));
    }
    if let Some(end) = update.end_time {
        obj.insert("end".into(), json_value(&timed(end, tz)));
    }
    if let Some(attendees) = &update.attendees {
        obj.insert("attendees".into(), json_value(&attendee_list(attendees)));
    }
}

fn json_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// After an update, the stored event must still end after it starts.
fn check_event_order(event: &Value, tz: Tz) -> Result<()> {
    let read = |key: &str| {
        serde_json::from_value::<EventDateTime>(event.get(key)?.clone())
            .ok()
            .and_then(|t| resolve_time(&t, tz))
            .map(|(t, _)| t)
    };
    match (read("start"), read("end")) {
        (Some(start), Some(end)) => TimeRange::new(start, end).map(|_| ()),
        _ => Ok(()),
    }
}

// ── Error mapping ───────────────────────────────────────────────────────────

fn transport_error(action: &str, err: reqwest::Error) -> CalendarError {
    if err.is_timeout() {
        CalendarError::timeout(format!("Timed out trying to {}", action))
    } else if err.is_decode() {
        CalendarError::internal(
            format!("Unexpected response while trying to {}", action),
            Some(err.to_string()),
        )
    } else {
        CalendarError::network(format!("Failed to {}", action), err)
    }
}

/// Map a non-success API status to the error taxonomy.
pub(crate) fn status_error(
    status: StatusCode,
    body: &str,
    action: &str,
    target: Target<'_>,
) -> CalendarError {
    let snippet: String = body.chars().take(512).collect();
    let quota = ["rateLimitExceeded", "userRateLimitExceeded", "quotaExceeded"]
        .iter()
        .any(|reason| body.contains(reason));

    match status {
        StatusCode::UNAUTHORIZED => CalendarError::authentication(
            ErrorCode::InvalidCredentials,
            "Google rejected the access token",
            Some(snippet),
        ),
        StatusCode::FORBIDDEN if quota => {
            CalendarError::quota_exceeded(format!("API quota exceeded trying to {}", action))
        }
        StatusCode::FORBIDDEN => {
            CalendarError::permission_denied(format!("Permission denied to {}", action))
        }
        StatusCode::NOT_FOUND | StatusCode::GONE => match target {
            Target::Event(id) => {
                CalendarError::not_found(ErrorCode::EventNotFound, format!("Event not found: {}", id))
            }
            Target::Calendar(id) => CalendarError::not_found(
                ErrorCode::CalendarNotFound,
                format!("Calendar not found: {}", id),
            ),
        },
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
            CalendarError::conflict(format!("Conflict trying to {}", action))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            CalendarError::quota_exceeded(format!("API quota exceeded trying to {}", action))
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            CalendarError::timeout(format!("Timed out trying to {}", action))
        }
        _ => CalendarError::internal(
            format!("Failed to {}", action),
            Some(format!("HTTP {}: {}", status, snippet)),
        ),
    }
}
