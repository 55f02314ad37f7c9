//! Web dashboard: HTML pages with charts plus a small JSON API.
//!
//! - `/`                      dashboard (standings summary, weekly and roster charts)
//! - `/playoffs`              playoff page
//! - `/api/league`            league info
//! - `/api/teams`             standings with expected records
//! - `/api/weekly`            weekly results (`?start_week=&end_week=`)
//! - `/api/weekly/transactions` cumulative moves, trades and FAAB per week
//! - `/api/playoffs`          per-team playoff totals
//! - `/api/playoffs/weekly`   weekly results of playoff weeks
//! - `/api/playoffs/scoreboard` one playoff week (`?week=`)
//! - `/health`                liveness and authorization state

pub mod handlers;
pub mod templates;


use std::sync::Arc;

use axum::{routing::get, Router};
use tracing::info;

use crate::{yahoo::FantasyClient, LeagueKey, Result};

/// Shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<FantasyClient>,
    pub league_key: LeagueKey,
}

impl AppState {
    pub fn new(client: Arc<FantasyClient>, league_key: LeagueKey) -> Self {
        Self { client, league_key }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/playoffs", get(handlers::playoffs_page))
        .route("/api/league", get(handlers::api_league))
        .route("/api/teams", get(handlers::api_teams))
        .route("/api/weekly", get(handlers::api_weekly))
        .route("/api/weekly/transactions", get(handlers::api_weekly_transactions))
        .route("/api/playoffs", get(handlers::api_playoffs))
        .route("/api/playoffs/weekly", get(handlers::api_playoffs_weekly))
        .route("/api/playoffs/scoreboard", get(handlers::api_playoff_scoreboard))
        .route("/health", get(handlers::health))
        .with_state(state)
}

/// Bind `host:port` and serve until Ctrl-C.
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Dashboard listening on http://{addr}");
    println!("Serving {} at http://{addr} (Ctrl-C to stop)", state.league_key);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Could not listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
