//! Yahoo Fantasy Football CLI Library
//!
//! League statistics for Yahoo Fantasy Football: an OAuth 2.0 session that
//! keeps its token fresh, a typed client for the Fantasy Sports REST API,
//! derived stats, a CLI and a small web dashboard.
//!
//! ## Features
//!
//! - **OAuth Session**: authorization code flow, persisted tokens, refresh
//!   60 seconds before expiry
//! - **API Client**: games, leagues, settings, teams, standings, weekly scoreboards
//!   and transactions
//! - **Derived Stats**: all-play records, expected wins, playoff summaries and
//!   weekly roster activity
//! - **Prior-season Cache**: SQLite-backed cache for seasons that can no longer change
//! - **Nickname Overrides**: names for managers Yahoo reports as hidden
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use yahoo_ffl::{config::Credentials, oauth::{OAuthSession, TokenStore}, yahoo::FantasyClient};
//!
//! # async fn example() -> yahoo_ffl::Result<()> {
//! let credentials = Credentials::load("credentials.json".as_ref())?;
//! let session = OAuthSession::new(credentials, TokenStore::new("oauth_tokens.json"));
//! let client = FantasyClient::new(Arc::new(session));
//!
//! for league in client.find_football_leagues().await? {
//!     let summary = client.get_teams_summary(&league.league_key).await?;
//!     println!("{} {}: {} teams", league.season, league.name, summary.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Configuration
//!
//! Set your league key to skip league discovery:
//! ```bash
//! export YAHOO_FFL_LEAGUE_KEY=449.l.621700
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod oauth;
pub mod storage;
pub mod web;
pub mod yahoo;

// Re-export commonly used types
pub use cli::types::{GameKey, LeagueKey, Season, TeamKey, Week};
pub use error::{ApiError, AuthError, ConfigError, FflError, Result};

pub const LEAGUE_KEY_ENV_VAR: &str = "YAHOO_FFL_LEAGUE_KEY";
