//! Token lifecycle against the Yahoo OAuth 2.0 endpoints.
//!
//! States: unauthenticated until `authorize` succeeds (or a token file is
//! found), authenticated afterwards. A refresh token the endpoint rejects
//! drops the session back to unauthenticated and deletes the token file.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use super::token::{Token, TokenResponse, TokenStore};
use crate::config::Credentials;
use crate::error::AuthError;
use crate::Result;

pub const YAHOO_AUTHORIZATION_URL: &str = "https://api.login.yahoo.com/oauth2/request_auth";
pub const YAHOO_TOKEN_URL: &str = "https://api.login.yahoo.com/oauth2/get_token";

/// Tokens are refreshed this many seconds before they expire.
pub const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthEndpoints {
    pub authorization_url: String,
    pub token_url: String,
}

impl Default for OAuthEndpoints {
    fn default() -> Self {
        Self {
            authorization_url: YAHOO_AUTHORIZATION_URL.to_string(),
            token_url: YAHOO_TOKEN_URL.to_string(),
        }
    }
}

#[derive(Debug)]
enum SessionState {
    Unauthenticated,
    Authenticated(Token),
}

/// Outcome of a token-endpoint call that reached the server.
enum TokenReply {
    Issued(TokenResponse),
    Rejected { status: u16, message: String },
}

#[derive(Deserialize)]
struct TokenErrorBody {
    error: Option<String>,
    error_description: Option<String>,
}

pub struct OAuthSession {
    credentials: Credentials,
    endpoints: OAuthEndpoints,
    store: TokenStore,
    http: Client,
    margin: Duration,
    state: Mutex<SessionState>,
}

impl OAuthSession {
    /// Session for `credentials`, resuming from the token file when present.
    pub fn new(credentials: Credentials, store: TokenStore) -> Self {
        let state = match store.load() {
            Some(token) => SessionState::Authenticated(token),
            None => SessionState::Unauthenticated,
        };

        Self {
            credentials,
            endpoints: OAuthEndpoints::default(),
            store,
            http: Client::new(),
            margin: Duration::seconds(REFRESH_MARGIN_SECS),
            state: Mutex::new(state),
        }
    }

    pub fn with_endpoints(mut self, endpoints: OAuthEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn token_path(&self) -> &Path {
        self.store.path()
    }

    /// Consent URL the user opens to obtain an authorization code.
    pub fn authorization_url(&self) -> Result<String> {
        let state = uuid::Uuid::new_v4().simple().to_string();
        let url = Url::parse_with_params(
            &self.endpoints.authorization_url,
            &[
                ("client_id", self.credentials.client_id.as_str()),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
                ("response_type", "code"),
                ("state", state.as_str()),
            ],
        )?;
        Ok(url.into())
    }

    /// Exchange an authorization code for a token and persist it.
    pub async fn authorize(&self, code: &str) -> Result<Token> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AuthError::MissingCode.into());
        }

        let mut state = self.state.lock().await;
        let form = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("redirect_uri", self.credentials.redirect_uri.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
        ];

        let now = Utc::now();
        let token = match self.post_token_form(&form).await? {
            TokenReply::Issued(response) => response.into_token(None, now)?,
            TokenReply::Rejected { status, message } => {
                return Err(AuthError::CodeRejected { status, message }.into());
            }
        };

        self.store.save(&token)?;
        *state = SessionState::Authenticated(token.clone());
        info!("Authorized, token saved to {}", self.store.path().display());
        Ok(token)
    }

    /// Current token, refreshed first when it is about to expire.
    pub async fn ensure_valid(&self) -> Result<Token> {
        self.ensure_valid_at(Utc::now()).await
    }

    /// [`ensure_valid`](Self::ensure_valid) with an explicit clock.
    pub async fn ensure_valid_at(&self, now: DateTime<Utc>) -> Result<Token> {
        let mut state = self.state.lock().await;
        let token = match &*state {
            SessionState::Unauthenticated => return Err(AuthError::NotAuthorized.into()),
            SessionState::Authenticated(token) => token.clone(),
        };

        if !token.expires_within(self.margin, now) {
            return Ok(token);
        }

        debug!("Access token expires at {}, refreshing", token.expires_at);
        let fresh = self.refresh_locked(&mut state, &token.refresh_token, now).await?;
        if fresh.is_expired(now) {
            return Err(AuthError::MalformedTokenResponse(
                "refreshed token is already expired".to_string(),
            )
            .into());
        }
        Ok(fresh)
    }

    /// Refresh unconditionally, e.g. after the API answered 401.
    pub async fn refresh(&self) -> Result<Token> {
        let mut state = self.state.lock().await;
        let refresh_token = match &*state {
            SessionState::Unauthenticated => return Err(AuthError::NotAuthorized.into()),
            SessionState::Authenticated(token) => token.refresh_token.clone(),
        };

        self.refresh_locked(&mut state, &refresh_token, Utc::now())
            .await
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(*self.state.lock().await, SessionState::Authenticated(_))
    }

    pub async fn current_token(&self) -> Option<Token> {
        match &*self.state.lock().await {
            SessionState::Authenticated(token) => Some(token.clone()),
            SessionState::Unauthenticated => None,
        }
    }

    async fn refresh_locked(
        &self,
        state: &mut SessionState,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Token> {
        let form = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("redirect_uri", self.credentials.redirect_uri.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        match self.post_token_form(&form).await? {
            TokenReply::Issued(response) => {
                let token = response.into_token(Some(refresh_token), now)?;
                self.store.save(&token)?;
                *state = SessionState::Authenticated(token.clone());
                info!("Refreshed access token, expires at {}", token.expires_at);
                Ok(token)
            }
            TokenReply::Rejected { status, message } => {
                warn!("Refresh token rejected ({status}), clearing saved token");
                *state = SessionState::Unauthenticated;
                if let Err(e) = self.store.clear() {
                    warn!("Could not remove token file: {e}");
                }
                Err(AuthError::RefreshRejected { status, message }.into())
            }
        }
    }

    /// POST a grant to the token endpoint.
    ///
    /// Only a refused grant counts as a rejection: 400/401, or an OAuth
    /// error code naming the grant or client. Rate limits, proxy errors and
    /// 5xx leave the session alone.
    async fn post_token_form(&self, form: &[(&str, &str)]) -> Result<TokenReply> {
        let response = self
            .http
            .post(&self.endpoints.token_url)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let parsed = serde_json::from_str::<TokenResponse>(&body)
                .map_err(|e| AuthError::MalformedTokenResponse(e.to_string()))?;
            return Ok(TokenReply::Issued(parsed));
        }

        let (code, message) = token_error(&body);
        if is_grant_rejection(status, code.as_deref()) {
            Ok(TokenReply::Rejected {
                status: status.as_u16(),
                message,
            })
        } else {
            Err(AuthError::TokenEndpoint {
                status: status.as_u16(),
                message,
            }
            .into())
        }
    }
}

/// OAuth error codes that mean the grant itself was refused.
const GRANT_REJECTION_CODES: &[&str] = &["invalid_grant", "invalid_client", "unauthorized_client"];

fn is_grant_rejection(status: StatusCode, code: Option<&str>) -> bool {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => true,
        s if s.is_client_error() => code.is_some_and(|c| GRANT_REJECTION_CODES.contains(&c)),
        _ => false,
    }
}

/// OAuth `error` code, if any, and a human-readable message.
fn token_error(body: &str) -> (Option<String>, String) {
    if let Ok(parsed) = serde_json::from_str::<TokenErrorBody>(body) {
        let code = parsed.error.clone();
        if let Some(message) = parsed.error_description.or(parsed.error) {
            return (code, message);
        }
    }
    (None, body.chars().take(200).collect())
}
