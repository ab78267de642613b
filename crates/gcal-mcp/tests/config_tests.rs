//! Integration tests for environment-driven configuration.

use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

use gcal_mcp::config::{Environment, LogLevel};
use gcal_mcp::{CalendarError, Config, ErrorCode};

const INLINE_TOKEN: &str = r#"{"access_token": "ya29.test"}"#;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

fn problems(err: CalendarError) -> Vec<String> {
    match err {
        CalendarError::Configuration { problems } => problems,
        other => panic!("expected configuration error, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Defaults and overrides
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn defaults_apply_when_only_credentials_are_set() {
    let config =
        Config::from_lookup(lookup(&[("GOOGLE_CALENDAR_CREDENTIALS_JSON", INLINE_TOKEN)])).unwrap();

    assert_eq!(config.calendar_id, "primary");
    assert_eq!(config.time_zone, chrono_tz::UTC);
    assert_eq!(config.api_base, "https://www.googleapis.com/calendar/v3");
    assert_eq!(config.http_timeout, Duration::from_secs(30));
    assert_eq!(config.server_name, "Google Calendar MCP Server");
    assert_eq!(config.log_level, LogLevel::Info);
    assert_eq!(config.environment, Environment::Development);
    assert!(config.is_development());
    assert!(!config.debug);
    assert_eq!(config.log_directive(), "info");
}

#[test]
fn overrides_are_read() {
    let config = Config::from_lookup(lookup(&[
        ("GOOGLE_CALENDAR_CREDENTIALS_JSON", INLINE_TOKEN),
        ("GOOGLE_CALENDAR_ID", "team@group.calendar.google.com"),
        ("GOOGLE_CALENDAR_TIMEZONE", "America/New_York"),
        ("GOOGLE_CALENDAR_API_BASE", "http://localhost:8080/v3/"),
        ("GOOGLE_CALENDAR_HTTP_TIMEOUT_SECS", "5"),
        ("MCP_SERVER_NAME", "cal"),
        ("MCP_SERVER_VERSION", "9.9.9"),
        ("LOG_LEVEL", "WARN"),
        ("ENVIRONMENT", "production"),
        ("DEBUG", "true"),
    ]))
    .unwrap();

    assert_eq!(config.calendar_id, "team@group.calendar.google.com");
    assert_eq!(config.time_zone, chrono_tz::America::New_York);
    assert_eq!(config.api_base, "http://localhost:8080/v3");
    assert_eq!(config.http_timeout, Duration::from_secs(5));
    assert_eq!(config.server_name, "cal");
    assert_eq!(config.server_version, "9.9.9");
    assert_eq!(config.log_level, LogLevel::Warn);
    assert!(config.is_production());
    assert_eq!(config.log_directive(), "debug");
}

#[test]
fn empty_values_count_as_unset() {
    let config = Config::from_lookup(lookup(&[
        ("GOOGLE_CALENDAR_CREDENTIALS_JSON", INLINE_TOKEN),
        ("GOOGLE_CALENDAR_ID", ""),
        ("LOG_LEVEL", ""),
    ]))
    .unwrap();
    assert_eq!(config.calendar_id, "primary");
    assert_eq!(config.log_level, LogLevel::Info);
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn every_problem_is_reported() {
    let err = Config::from_lookup(lookup(&[
        ("GOOGLE_CALENDAR_TIMEZONE", "Mars/Olympus_Mons"),
        ("LOG_LEVEL", "verbose"),
        ("ENVIRONMENT", "qa"),
    ]))
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ConfigurationError);

    let problems = problems(err);
    assert_eq!(problems.len(), 4);
    assert!(problems[0].contains("GOOGLE_CALENDAR_CREDENTIALS_JSON is required"));
    assert!(problems.iter().any(|p| p.contains("Invalid timezone: Mars/Olympus_Mons")));
    assert!(problems.iter().any(|p| p.contains("Invalid log level: verbose")));
    assert!(problems.iter().any(|p| p.contains("Invalid environment: qa")));
}

#[test]
fn missing_credentials_file_is_a_problem() {
    let err = Config::from_lookup(lookup(&[(
        "GOOGLE_CALENDAR_CREDENTIALS_JSON",
        "/definitely/not/here/credentials.json",
    )]))
    .unwrap_err();
    assert_eq!(
        problems(err),
        vec!["Credentials file not found: /definitely/not/here/credentials.json"]
    );
}

#[test]
fn credentials_file_path_is_accepted() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(INLINE_TOKEN.as_bytes()).unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let config =
        Config::from_lookup(lookup(&[("GOOGLE_CALENDAR_CREDENTIALS_JSON", path.as_str())])).unwrap();
    assert_eq!(config.credentials, path);
}

#[test]
fn zero_timeout_is_rejected() {
    let err = Config::from_lookup(lookup(&[
        ("GOOGLE_CALENDAR_CREDENTIALS_JSON", INLINE_TOKEN),
        ("GOOGLE_CALENDAR_HTTP_TIMEOUT_SECS", "0"),
    ]))
    .unwrap_err();
    assert_eq!(problems(err), vec!["Invalid HTTP timeout: 0"]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Env files and redaction
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn env_file_entries_feed_the_lookup() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "GOOGLE_CALENDAR_CREDENTIALS_JSON='{}'", INLINE_TOKEN).unwrap();
    writeln!(file, "GOOGLE_CALENDAR_TIMEZONE=Europe/Berlin").unwrap();
    writeln!(file, "# comment").unwrap();
    writeln!(file, "ENVIRONMENT=staging").unwrap();

    let vars: HashMap<String, String> = dotenvy::from_path_iter(file.path())
        .unwrap()
        .map(|item| item.unwrap())
        .collect();
    let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();

    assert_eq!(config.time_zone, chrono_tz::Europe::Berlin);
    assert_eq!(config.environment, Environment::Staging);
}

#[test]
fn display_and_debug_hide_credentials() {
    let config =
        Config::from_lookup(lookup(&[("GOOGLE_CALENDAR_CREDENTIALS_JSON", INLINE_TOKEN)])).unwrap();
    let shown = format!("{} {:?}", config, config);
    assert!(!shown.contains("ya29.test"));
    assert!(shown.contains("<redacted>"));
    assert!(shown.contains("primary"));
}
