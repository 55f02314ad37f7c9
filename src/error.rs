//! Error types for the Yahoo Fantasy Football CLI

use std::path::PathBuf;

use thiserror::Error;


pub type Result<T> = std::result::Result<T, FflError>;

/// Failures of the OAuth token lifecycle.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authorization code is required")]
    MissingCode,

    #[error("Authorization code rejected ({status}): {message}")]
    CodeRejected { status: u16, message: String },

    #[error("Refresh token rejected ({status}): {message}. Run `yahoo-ffl auth` to re-authorize")]
    RefreshRejected { status: u16, message: String },

    #[error("Token endpoint returned {status}: {message}")]
    TokenEndpoint { status: u16, message: String },

    #[error("Not authorized. Run `yahoo-ffl auth` first")]
    NotAuthorized,

    #[error("Malformed token response: {0}")]
    MalformedTokenResponse(String),
}

/// Failures talking to the Fantasy Sports REST API.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Yahoo API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected Yahoo API response from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },
}

impl ApiError {
    pub fn malformed(endpoint: impl Into<String>, reason: impl ToString) -> Self {
        ApiError::Malformed {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }

    /// HTTP status carried by the error, if it came from a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Malformed { .. } => None,
        }
    }
}

/// Failures loading the credentials file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Credentials file not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("Credentials file {} is invalid: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },

    #[error("Credential `{field}` is empty or missing")]
    MissingField { field: &'static str },
}

#[derive(Error, Debug)]
pub enum FflError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Failed to parse number: {0}")]
    InvalidNumber(#[from] std::num::ParseIntError),

    #[error("Invalid {kind} key: {value}")]
    InvalidKey { kind: &'static str, value: String },

    #[error("League key not provided, {env_var} not set, and no football league found for this account")]
    NoLeague { env_var: String },

    #[error("Could not determine playoff start week for league {league_key}")]
    NoPlayoffStartWeek { league_key: String },

    #[error("Week {week} is not a playoff week. Playoffs start at week {playoff_start_week}")]
    NotPlayoffWeek { week: u16, playoff_start_week: u16 },
}

impl FflError {
    /// Whether this error means the user has to run the authorization flow again.
    pub fn requires_reauthorization(&self) -> bool {
        matches!(
            self,
            FflError::Auth(AuthError::NotAuthorized | AuthError::RefreshRejected { .. })
        )
    }
}
