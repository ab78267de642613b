//! Runtime configuration for the calendar server.
//!
//! Values come from environment variables (optionally seeded from a `.env`
//! file by the binary). The configuration is validated once at startup and is
//! immutable afterwards; collaborators receive it by reference.

use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;

use crate::error::{CalendarError, Result};

pub const DEFAULT_CALENDAR_ID: &str = "primary";
pub const DEFAULT_TIME_ZONE: &str = "UTC";
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_SERVER_NAME: &str = "Google Calendar MCP Server";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Log verbosity accepted in `LOG_LEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    /// The `tracing` filter directive for this level. `tracing` has no fatal
    /// level, so `Fatal` maps to `error`.
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error | LogLevel::Fatal => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "fatal" => Ok(LogLevel::Fatal),
            _ => Err(format!(
                "Invalid log level: {}. Valid levels are: debug, info, warn, error, fatal",
                s
            )),
        }
    }
}

/// Deployment environment accepted in `ENVIRONMENT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
    Test,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            _ => Err(format!(
                "Invalid environment: {}. Valid environments are: development, staging, production, test",
                s
            )),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
            Environment::Test => "test",
        };
        f.write_str(name)
    }
}

#[derive(Clone)]
pub struct Config {
    /// Inline credentials JSON, or a path to a credentials file.
    pub credentials: String,
    pub calendar_id: String,
    pub time_zone: Tz,
    pub api_base: String,
    pub http_timeout: Duration,
    pub server_name: String,
    pub server_version: String,
    pub log_level: LogLevel,
    pub environment: Environment,
    pub debug: bool,
}

impl Config {
    /// Build from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    ///
    /// Every validation problem is collected and reported together in one
    /// [`CalendarError::Configuration`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let mut problems = Vec::new();

        let credentials = get("GOOGLE_CALENDAR_CREDENTIALS_JSON").unwrap_or_default();
        if credentials.is_empty() {
            problems.push("GOOGLE_CALENDAR_CREDENTIALS_JSON is required".to_string());
        } else if !credentials.trim_start().starts_with('{') && !Path::new(&credentials).exists()
        {
            problems.push(format!("Credentials file not found: {}", credentials));
        }

        let calendar_id = get("GOOGLE_CALENDAR_ID")
            .unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string())
            .trim()
            .to_string();
        if calendar_id.is_empty() {
            problems.push("Calendar ID cannot be empty".to_string());
        }

        let tz_name = get("GOOGLE_CALENDAR_TIMEZONE").unwrap_or_else(|| DEFAULT_TIME_ZONE.into());
        let time_zone = match tz_name.parse::<Tz>() {
            Ok(tz) => tz,
            Err(_) => {
                problems.push(format!("Invalid timezone: {}", tz_name));
                Tz::UTC
            }
        };

        let api_base = get("GOOGLE_CALENDAR_API_BASE")
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let http_timeout = match get("GOOGLE_CALENDAR_HTTP_TIMEOUT_SECS") {
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    problems.push(format!("Invalid HTTP timeout: {}", raw));
                    Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)
                }
            },
        };

        let log_level = get("LOG_LEVEL")
            .unwrap_or_else(|| "info".to_string())
            .parse::<LogLevel>()
            .unwrap_or_else(|problem| {
                problems.push(problem);
                LogLevel::Info
            });

        let environment = get("ENVIRONMENT")
            .unwrap_or_else(|| "development".to_string())
            .parse::<Environment>()
            .unwrap_or_else(|problem| {
                problems.push(problem);
                Environment::Development
            });

        if !problems.is_empty() {
            return Err(CalendarError::Configuration { problems });
        }

        Ok(Self {
            credentials,
            calendar_id,
            time_zone,
            api_base,
            http_timeout,
            server_name: get("MCP_SERVER_NAME").unwrap_or_else(|| DEFAULT_SERVER_NAME.into()),
            server_version: get("MCP_SERVER_VERSION")
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").into()),
            log_level,
            environment,
            debug: get("DEBUG").and_then(|v| parse_bool(&v)).unwrap_or(false),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Default `tracing` filter directive. `DEBUG=true` wins over `LOG_LEVEL`.
    pub fn log_directive(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            self.log_level.as_directive()
        }
    }
}

/// Redacted: credentials are never printed.
impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config{{calendar_id: {}, time_zone: {}, environment: {}, debug: {}}}",
            self.calendar_id, self.time_zone, self.environment, self.debug
        )
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("credentials", &"<redacted>")
            .field("calendar_id", &self.calendar_id)
            .field("time_zone", &self.time_zone)
            .field("api_base", &self.api_base)
            .field("http_timeout", &self.http_timeout)
            .field("server_name", &self.server_name)
            .field("server_version", &self.server_version)
            .field("log_level", &self.log_level)
            .field("environment", &self.environment)
            .field("debug", &self.debug)
            .finish()
    }
}

/// Accepts the usual spellings of a boolean; anything else is `None`.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "yes" | "on" => Some(true),
        "0" | "f" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
