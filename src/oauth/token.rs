//! Access/refresh token and its on-disk form.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, SubsecRound, Utc};
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::cache::{try_read_to_string, write_string_atomic};
use crate::error::AuthError;
use crate::Result;

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

fn default_token_type() -> String {
    "bearer".to_string()
}

/// `expires_at` is stored as unix seconds. Older files may carry a float.
mod unix_seconds {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(at.timestamp())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Float(f64),
        }

        let secs = match Raw::deserialize(d)? {
            Raw::Int(secs) => secs,
            Raw::Float(secs) => secs as i64,
        };
        DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {secs}")))
    }
}

/// Credentials for authenticated API calls.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(with = "unix_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Token {
    /// True once `now` is within `margin` of expiry.
    pub fn expires_within(&self, margin: Duration, now: DateTime<Utc>) -> bool {
        self.expires_at - margin <= now
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Attach the bearer header to an outgoing request.
    pub fn authorize_request(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.access_token)
    }
}

/// Body of a successful token-endpoint response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    /// Build a [`Token`] issued at `now`, keeping `previous_refresh` when the
    /// endpoint does not rotate the refresh token.
    pub fn into_token(
        self,
        previous_refresh: Option<&str>,
        now: DateTime<Utc>,
    ) -> std::result::Result<Token, AuthError> {
        if self.access_token.trim().is_empty() {
            return Err(AuthError::MalformedTokenResponse(
                "empty access_token".to_string(),
            ));
        }

        let refresh_token = self
            .refresh_token
            .filter(|t| !t.is_empty())
            .or_else(|| previous_refresh.map(str::to_string))
            .ok_or_else(|| AuthError::MalformedTokenResponse("missing refresh_token".to_string()))?;

        let expires_in = self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        if expires_in <= 0 {
            return Err(AuthError::MalformedTokenResponse(format!(
                "expires_in must be positive, got {expires_in}"
            )));
        }
        // Whole seconds, matching the on-disk form.
        let expires_at = Duration::try_seconds(expires_in)
            .and_then(|lifetime| now.trunc_subsecs(0).checked_add_signed(lifetime))
            .ok_or_else(|| {
                AuthError::MalformedTokenResponse(format!("expires_in out of range: {expires_in}"))
            })?;

        Ok(Token {
            access_token: self.access_token,
            refresh_token,
            token_type: self.token_type.unwrap_or_else(default_token_type),
            expires_at,
        })
    }
}

/// JSON token file, replaced atomically on every write.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persisted token, if any. A corrupt file is treated as no token.
    pub fn load(&self) -> Option<Token> {
        let contents = try_read_to_string(&self.path)?;
        match serde_json::from_str::<Token>(&contents) {
            Ok(token) => {
                debug!("Loaded token from {}", self.path.display());
                Some(token)
            }
            Err(e) => {
                warn!("Ignoring unreadable token file {}: {e}", self.path.display());
                None
            }
        }
    }

    pub fn save(&self, token: &Token) -> Result<()> {
        let json = serde_json::to_string_pretty(token)?;
        write_string_atomic(&self.path, &json)?;
        debug!("Saved token to {}", self.path.display());
        Ok(())
    }

    /// Remove the token file. Missing files are fine.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
