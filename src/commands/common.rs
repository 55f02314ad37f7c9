//! Shared setup for commands: credentials, session, client and store.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::{
    cli::GlobalArgs,
    config::{default_credentials_path, default_token_path, Credentials},
    error::FflError,
    oauth::{OAuthSession, TokenStore},
    storage::{LeagueStore, SharedStore},
    yahoo::FantasyClient,
    LeagueKey, Result, LEAGUE_KEY_ENV_VAR,
};

/// File locations and cache behaviour for one CLI invocation.
#[derive(Debug, Clone)]
pub struct ContextOptions {
    pub credentials: PathBuf,
    pub token_file: PathBuf,
    pub database: PathBuf,
    pub refresh: bool,
}

impl ContextOptions {
    pub fn from_global(global: &GlobalArgs) -> Self {
        Self {
            credentials: global
                .credentials
                .clone()
                .unwrap_or_else(default_credentials_path),
            token_file: global.token_file.clone().unwrap_or_else(default_token_path),
            database: LeagueStore::database_path(),
            refresh: global.refresh,
        }
    }

    /// Credentials from file and environment. Runs before any network call.
    pub fn load_credentials(&self) -> Result<Credentials> {
        debug!("Loading credentials from {}", self.credentials.display());
        Ok(Credentials::from_env_and_file(&self.credentials)?)
    }

    /// OAuth session with the persisted token, if any.
    pub fn session(&self) -> Result<OAuthSession> {
        let credentials = self.load_credentials()?;
        Ok(OAuthSession::new(
            credentials,
            TokenStore::new(&self.token_file),
        ))
    }
}

/// Resources most commands need.
pub struct CommandContext {
    pub client: Arc<FantasyClient>,
    pub store: SharedStore,
}

impl CommandContext {
    pub fn new(options: &ContextOptions) -> Result<Self> {
        let session = Arc::new(options.session()?);
        let store: SharedStore = Arc::new(Mutex::new(LeagueStore::open(&options.database)?));
        let client = FantasyClient::new(session)
            .with_store(store.clone())
            .force_refresh(options.refresh);

        Ok(Self {
            client: Arc::new(client),
            store,
        })
    }
}

/// Open the league database without touching credentials.
pub fn open_store(options: &ContextOptions) -> Result<LeagueStore> {
    LeagueStore::open(&options.database)
}

/// League key from the argument, else from `YAHOO_FFL_LEAGUE_KEY`.
pub fn configured_league_key(league_key: Option<LeagueKey>) -> Result<Option<LeagueKey>> {
    if league_key.is_some() {
        return Ok(league_key);
    }
    match std::env::var(LEAGUE_KEY_ENV_VAR) {
        Ok(value) if !value.trim().is_empty() => Ok(Some(value.parse()?)),
        _ => Ok(None),
    }
}

/// Configured league key, or the user's most recent football league.
pub async fn resolve_league_key(
    client: &FantasyClient,
    league_key: Option<LeagueKey>,
) -> Result<LeagueKey> {
    if let Some(key) = configured_league_key(league_key)? {
        return Ok(key);
    }

    info!("No league key configured, looking up football leagues");
    let league = client
        .find_football_leagues()
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| FflError::NoLeague {
            env_var: LEAGUE_KEY_ENV_VAR.to_string(),
        })?;
    info!("Using league {} ({} {})", league.league_key, league.name, league.season);
    Ok(league.league_key)
}
