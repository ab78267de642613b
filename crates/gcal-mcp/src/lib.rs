//! # gcal-mcp
//!
//! An MCP tool server that lets AI agents work with a Google Calendar:
//! check free/busy availability, and create, list, update, delete, and search
//! events. Availability is computed by [`freebusy_engine`], so agents get an
//! ordered list of free and busy slots covering the requested window instead
//! of a raw event list.
//!
//! ## Modules
//!
//! - [`config`] — Environment-driven configuration
//! - [`auth`] — Credentials file parsing
//! - [`models`] — Events, time ranges, and update requests
//! - [`service`] — The `CalendarService` seam
//! - [`google`] — Google Calendar v3 REST client
//! - [`tools`] — Tool argument parsing and response formatting
//! - [`calculator`] — The `calculate` tool
//! - [`server`] — MCP server wiring
//! - [`error`] — Error taxonomy

pub mod auth;
pub mod calculator;
pub mod config;
pub mod error;
pub mod google;
pub mod models;
pub mod server;
pub mod service;
pub mod tools;

pub use config::Config;
pub use error::{CalendarError, ErrorCode, ErrorResponse, ErrorType};
pub use google::GoogleCalendar;
pub use server::CalendarServer;
pub use service::{CalendarService, SearchQuery};
pub use tools::ToolManager;
