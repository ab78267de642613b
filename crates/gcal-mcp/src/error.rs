//! Error taxonomy for calendar tool operations.
//!
//! Every failure visible to an MCP client is one variant of [`CalendarError`].
//! Each variant carries a stable [`ErrorCode`] and maps to one [`ErrorType`],
//! and the whole error can be rendered as a serializable [`ErrorResponse`].

use std::fmt;

use freebusy_engine::FreeBusyError;
use serde::Serialize;
use thiserror::Error;

/// Broad category of a failure, as reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorType {
    #[serde(rename = "NOT_FOUND")]
    NotFound,
    #[serde(rename = "PERMISSION_DENIED")]
    PermissionDenied,
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput,
    #[serde(rename = "QUOTA_EXCEEDED")]
    QuotaExceeded,
    #[serde(rename = "INTERNAL_ERROR")]
    Internal,
    #[serde(rename = "AUTHENTICATION_ERROR")]
    Authentication,
    #[serde(rename = "NETWORK_ERROR")]
    Network,
    #[serde(rename = "TIMEOUT_ERROR")]
    Timeout,
    #[serde(rename = "CONFLICT_ERROR")]
    Conflict,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::NotFound => "NOT_FOUND",
            ErrorType::PermissionDenied => "PERMISSION_DENIED",
            ErrorType::InvalidInput => "INVALID_INPUT",
            ErrorType::QuotaExceeded => "QUOTA_EXCEEDED",
            ErrorType::Internal => "INTERNAL_ERROR",
            ErrorType::Authentication => "AUTHENTICATION_ERROR",
            ErrorType::Network => "NETWORK_ERROR",
            ErrorType::Timeout => "TIMEOUT_ERROR",
            ErrorType::Conflict => "CONFLICT_ERROR",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    EventNotFound,
    CalendarNotFound,
    InvalidTimeFormat,
    InvalidTimeRange,
    MissingCredentials,
    InvalidCredentials,
    ApiQuotaExceeded,
    PermissionDenied,
    NetworkTimeout,
    ServiceUnavailable,
    InvalidEventData,
    EventConflict,
    ConfigurationError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::EventNotFound => "EVENT_NOT_FOUND",
            ErrorCode::CalendarNotFound => "CALENDAR_NOT_FOUND",
            ErrorCode::InvalidTimeFormat => "INVALID_TIME_FORMAT",
            ErrorCode::InvalidTimeRange => "INVALID_TIME_RANGE",
            ErrorCode::MissingCredentials => "MISSING_CREDENTIALS",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::ApiQuotaExceeded => "API_QUOTA_EXCEEDED",
            ErrorCode::PermissionDenied => "PERMISSION_DENIED",
            ErrorCode::NetworkTimeout => "NETWORK_TIMEOUT",
            ErrorCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorCode::InvalidEventData => "INVALID_EVENT_DATA",
            ErrorCode::EventConflict => "EVENT_CONFLICT",
            ErrorCode::ConfigurationError => "CONFIGURATION_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by configuration loading, credential handling, the
/// calendar service, and tool argument validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalendarError {
    #[error("{code}: {message}")]
    NotFound { code: ErrorCode, message: String },

    #[error("{code}: {message}")]
    PermissionDenied { code: ErrorCode, message: String },

    #[error("{code}: {message}")]
    InvalidInput {
        code: ErrorCode,
        message: String,
        details: Option<String>,
    },

    #[error("{code}: {message}")]
    QuotaExceeded { code: ErrorCode, message: String },

    #[error("{code}: {message}{}", caused_by(.cause))]
    Authentication {
        code: ErrorCode,
        message: String,
        cause: Option<String>,
    },

    #[error("{code}: {message}{}", caused_by(.cause))]
    Network {
        code: ErrorCode,
        message: String,
        cause: Option<String>,
    },

    #[error("{code}: {message}")]
    Timeout { code: ErrorCode, message: String },

    #[error("{code}: {message}")]
    Conflict { code: ErrorCode, message: String },

    #[error("{code}: {message}{}", caused_by(.cause))]
    Internal {
        code: ErrorCode,
        message: String,
        cause: Option<String>,
    },

    /// All configuration problems found in a single validation pass.
    #[error("CONFIGURATION_ERROR: Invalid configuration: {}", .problems.join("; "))]
    Configuration { problems: Vec<String> },
}

fn caused_by(cause: &Option<String>) -> String {
    match cause {
        Some(cause) => format!(" (caused by: {})", cause),
        None => String::new(),
    }
}

impl CalendarError {
    pub fn not_found(code: ErrorCode, message: impl Into<String>) -> Self {
        CalendarError::NotFound {
            code,
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        CalendarError::PermissionDenied {
            code: ErrorCode::PermissionDenied,
            message: message.into(),
        }
    }

    pub fn invalid_input(code: ErrorCode, message: impl Into<String>) -> Self {
        CalendarError::InvalidInput {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        CalendarError::QuotaExceeded {
            code: ErrorCode::ApiQuotaExceeded,
            message: message.into(),
        }
    }

    pub fn authentication(
        code: ErrorCode,
        message: impl Into<String>,
        cause: Option<String>,
    ) -> Self {
        CalendarError::Authentication {
            code,
            message: message.into(),
            cause,
        }
    }

    pub fn network(message: impl Into<String>, cause: impl fmt::Display) -> Self {
        CalendarError::Network {
            code: ErrorCode::ServiceUnavailable,
            message: message.into(),
            cause: Some(cause.to_string()),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        CalendarError::Timeout {
            code: ErrorCode::NetworkTimeout,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        CalendarError::Conflict {
            code: ErrorCode::EventConflict,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>, cause: Option<String>) -> Self {
        CalendarError::Internal {
            code: ErrorCode::ServiceUnavailable,
            message: message.into(),
            cause,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CalendarError::NotFound { code, .. }
            | CalendarError::PermissionDenied { code, .. }
            | CalendarError::InvalidInput { code, .. }
            | CalendarError::QuotaExceeded { code, .. }
            | CalendarError::Authentication { code, .. }
            | CalendarError::Network { code, .. }
            | CalendarError::Timeout { code, .. }
            | CalendarError::Conflict { code, .. }
            | CalendarError::Internal { code, .. } => *code,
            CalendarError::Configuration { .. } => ErrorCode::ConfigurationError,
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            CalendarError::NotFound { .. } => ErrorType::NotFound,
            CalendarError::PermissionDenied { .. } => ErrorType::PermissionDenied,
            CalendarError::InvalidInput { .. } | CalendarError::Configuration { .. } => {
                ErrorType::InvalidInput
            }
            CalendarError::QuotaExceeded { .. } => ErrorType::QuotaExceeded,
            CalendarError::Authentication { .. } => ErrorType::Authentication,
            CalendarError::Network { .. } => ErrorType::Network,
            CalendarError::Timeout { .. } => ErrorType::Timeout,
            CalendarError::Conflict { .. } => ErrorType::Conflict,
            CalendarError::Internal { .. } => ErrorType::Internal,
        }
    }

    pub fn details(&self) -> Option<&str> {
        match self {
            CalendarError::InvalidInput { details, .. } => details.as_deref(),
            _ => None,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.code(),
            message: self.to_string(),
            error_type: self.error_type(),
            details: self.details().map(str::to_string),
        }
    }
}

impl From<FreeBusyError> for CalendarError {
    fn from(err: FreeBusyError) -> Self {
        CalendarError::InvalidInput {
            code: ErrorCode::InvalidEventData,
            message: "Calendar returned an event that ends before it starts".to_string(),
            details: Some(err.to_string()),
        }
    }
}

/// Wire shape of an error returned from a tool call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

pub type Result<T> = std::result::Result<T, CalendarError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn display_includes_code_and_cause() {
        let err = CalendarError::internal("Failed to retrieve events", Some("boom".into()));
        assert_eq!(
            err.to_string(),
            "SERVICE_UNAVAILABLE: Failed to retrieve events (caused by: boom)"
        );

        let err = CalendarError::not_found(ErrorCode::EventNotFound, "Event not found: abc");
        assert_eq!(err.to_string(), "EVENT_NOT_FOUND: Event not found: abc");
    }

    #[test]
    fn configuration_lists_every_problem() {
        let err = CalendarError::Configuration {
            problems: vec!["a is required".into(), "b is invalid".into()],
        };
        assert_eq!(err.code(), ErrorCode::ConfigurationError);
        assert_eq!(err.error_type(), ErrorType::InvalidInput);
        assert!(err.to_string().ends_with("a is required; b is invalid"));
    }

    #[test]
    fn response_serializes_type_and_skips_empty_details() {
        let resp = CalendarError::quota_exceeded("Rate limit exceeded").to_response();
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["code"], "API_QUOTA_EXCEEDED");
        assert_eq!(json["type"], "QUOTA_EXCEEDED");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn malformed_interval_maps_to_invalid_input_with_details() {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 11, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        let err: CalendarError = FreeBusyError::MalformedInterval {
            index: 3,
            start,
            end,
        }
        .into();

        assert_eq!(err.code(), ErrorCode::InvalidEventData);
        assert_eq!(err.error_type(), ErrorType::InvalidInput);
        let details = err.details().unwrap();
        assert!(details.contains("#3"), "details: {}", details);
        assert!(details.contains("2026-03-02 11:00:00 UTC"), "details: {}", details);
    }
}
