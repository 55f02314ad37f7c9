//! Credential store: OAuth client credentials and file locations.
//!
//! Credentials come from a small JSON file:
//!
//! ```json
//! { "client_id": "...", "client_secret": "...", "redirect_uri": "oob" }
//! ```
//!
//! `YAHOO_CLIENT_ID`, `YAHOO_CLIENT_SECRET` and `YAHOO_REDIRECT_URI` override
//! the file values (a `.env` file is honoured). When both id and secret are
//! provided by the environment the file may be absent.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::cache::data_dir;
use crate::error::ConfigError;

pub const CLIENT_ID_ENV_VAR: &str = "YAHOO_CLIENT_ID";
pub const CLIENT_SECRET_ENV_VAR: &str = "YAHOO_CLIENT_SECRET";
pub const REDIRECT_URI_ENV_VAR: &str = "YAHOO_REDIRECT_URI";
pub const CREDENTIALS_FILE_ENV_VAR: &str = "YAHOO_FFL_CREDENTIALS";
pub const TOKEN_FILE_ENV_VAR: &str = "YAHOO_FFL_TOKEN_FILE";

/// Out-of-band redirect: Yahoo shows the code to the user instead of redirecting.
pub const DEFAULT_REDIRECT_URI: &str = "oob";

#[derive(Debug, Deserialize)]
struct CredentialsFile {
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
}

/// OAuth client credentials registered with the Yahoo Developer Network.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Load credentials from a JSON file only.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::resolve(path, |_| None)
    }

    /// Load credentials from `path`, applying environment overrides.
    pub fn from_env_and_file(path: &Path) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::resolve(path, |name| std::env::var(name).ok())
    }

    /// Resolve credentials from `path` and a variable lookup.
    ///
    /// An unreadable or malformed file is always an error, even when the
    /// lookup could supply every field.
    pub fn resolve<F>(path: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_id = lookup(CLIENT_ID_ENV_VAR).filter(|v| !v.trim().is_empty());
        let env_secret = lookup(CLIENT_SECRET_ENV_VAR).filter(|v| !v.trim().is_empty());
        let env_redirect = lookup(REDIRECT_URI_ENV_VAR).filter(|v| !v.trim().is_empty());

        let file = match std::fs::read_to_string(path) {
            Ok(contents) => Some(serde_json::from_str::<CredentialsFile>(&contents).map_err(
                |e| ConfigError::Invalid {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                },
            )?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if env_id.is_none() || env_secret.is_none() {
                    return Err(ConfigError::Missing {
                        path: path.to_path_buf(),
                    });
                }
                None
            }
            Err(e) => {
                return Err(ConfigError::Invalid {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        };

        let (file_id, file_secret, file_redirect) = match file {
            Some(f) => (f.client_id, f.client_secret, f.redirect_uri),
            None => (None, None, None),
        };

        let client_id = non_empty(env_id.or(file_id))
            .ok_or(ConfigError::MissingField { field: "client_id" })?;
        let client_secret = non_empty(env_secret.or(file_secret)).ok_or(
            ConfigError::MissingField {
                field: "client_secret",
            },
        )?;
        let redirect_uri = non_empty(env_redirect.or(file_redirect))
            .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string());

        Ok(Self {
            client_id,
            client_secret,
            redirect_uri,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `credentials.json` in the working directory unless overridden.
pub fn default_credentials_path() -> PathBuf {
    std::env::var(CREDENTIALS_FILE_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("credentials.json"))
}

/// Path: ~/.cache/yahoo-ffl/oauth_tokens.json unless overridden.
pub fn default_token_path() -> PathBuf {
    std::env::var(TOKEN_FILE_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_dir().join("oauth_tokens.json"))
}
