//! Credential loading for the Google Calendar API.
//!
//! Credentials are supplied either as inline JSON or as a path to a JSON file.
//! The file is classified by its shape; a bearer token is then taken from a
//! pre-issued `access_token` (or `token`) field. No OAuth consent or JWT
//! exchange is performed here.

use std::fmt;
use std::fs;

use serde::Deserialize;

use crate::error::{CalendarError, ErrorCode, Result};

/// The shape of a credentials document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    /// `"type": "service_account"` key file.
    ServiceAccount,
    /// `"type": "authorized_user"` file, as written by gcloud and most
    /// OAuth helpers.
    AuthorizedUser,
    /// OAuth client secrets (`installed` or `web` section).
    OAuthClient,
    /// A bare `{"access_token": "..."}` document.
    AccessToken,
}

#[derive(Deserialize)]
struct RawCredentials {
    #[serde(rename = "type")]
    kind: Option<String>,
    client_email: Option<String>,
    access_token: Option<String>,
    token: Option<String>,
    installed: Option<serde_json::Value>,
    web: Option<serde_json::Value>,
}

#[derive(Clone)]
pub struct Credentials {
    kind: CredentialKind,
    client_email: Option<String>,
    access_token: Option<String>,
}

impl Credentials {
    /// Load from a config value: inline JSON when it starts with `{`, a file
    /// path otherwise.
    pub fn load(source: &str) -> Result<Self> {
        let source = source.trim();
        if source.is_empty() {
            return Err(CalendarError::authentication(
                ErrorCode::MissingCredentials,
                "No credentials provided",
                None,
            ));
        }

        if source.starts_with('{') {
            return Self::parse(source);
        }

        let contents = fs::read_to_string(source).map_err(|e| {
            let code = if e.kind() == std::io::ErrorKind::NotFound {
                ErrorCode::MissingCredentials
            } else {
                ErrorCode::InvalidCredentials
            };
            CalendarError::authentication(
                code,
                format!("Failed to read credentials file: {}", source),
                Some(e.to_string()),
            )
        })?;
        Self::parse(&contents)
    }

    pub fn parse(json: &str) -> Result<Self> {
        let raw: RawCredentials = serde_json::from_str(json).map_err(|e| {
            CalendarError::authentication(
                ErrorCode::InvalidCredentials,
                "Credentials are not valid JSON",
                Some(e.to_string()),
            )
        })?;

        let kind = match raw.kind.as_deref() {
            Some("service_account") => CredentialKind::ServiceAccount,
            Some("authorized_user") => CredentialKind::AuthorizedUser,
            _ if raw.installed.is_some() || raw.web.is_some() => CredentialKind::OAuthClient,
            _ if raw.access_token.is_some() => CredentialKind::AccessToken,
            other => {
                return Err(CalendarError::authentication(
                    ErrorCode::InvalidCredentials,
                    format!(
                        "Unrecognized credentials type: {}",
                        other.unwrap_or("<missing>")
                    ),
                    None,
                ))
            }
        };

        let access_token = raw
            .access_token
            .or(raw.token)
            .filter(|t| !t.trim().is_empty());

        Ok(Self {
            kind,
            client_email: raw.client_email,
            access_token,
        })
    }

    pub fn kind(&self) -> CredentialKind {
        self.kind
    }

    pub fn client_email(&self) -> Option<&str> {
        self.client_email.as_deref()
    }

    /// The bearer token to send with API requests.
    pub fn bearer_token(&self) -> Result<&str> {
        if let Some(token) = &self.access_token {
            return Ok(token.as_str());
        }

        let message = match self.kind {
            CredentialKind::ServiceAccount => {
                "Service account key has no access_token; token exchange is not performed, \
                 supply a pre-issued access token"
            }
            CredentialKind::OAuthClient => {
                "OAuth2 flow not implemented. Please supply credentials with an access token"
            }
            CredentialKind::AuthorizedUser | CredentialKind::AccessToken => {
                "Credentials do not contain an access token"
            }
        };
        Err(CalendarError::authentication(
            ErrorCode::InvalidCredentials,
            message,
            None,
        ))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("kind", &self.kind)
            .field("client_email", &self.client_email)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
