//! Route handlers and error-to-response mapping.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::{templates, AppState};
use crate::{
    error::{ApiError, AuthError, FflError},
    yahoo::{
        compute::weekly_results, LeagueInfo, Matchup, PlayoffTeamStats, TeamSummary,
        WeeklyTeamResult, WeeklyTransactionStats,
    },
    Week,
};

type ApiResult<T> = std::result::Result<Json<T>, FflError>;

/// Status code and machine-readable code for an error.
pub fn error_status(err: &FflError) -> (StatusCode, &'static str) {
    match err {
        FflError::Auth(AuthError::MissingCode) => (StatusCode::BAD_REQUEST, "missing_code"),
        FflError::Auth(_) => (StatusCode::UNAUTHORIZED, "not_authorized"),
        FflError::Api(ApiError::Status { .. }) => (StatusCode::BAD_GATEWAY, "yahoo_error"),
        FflError::Api(ApiError::Malformed { .. }) => (StatusCode::BAD_GATEWAY, "yahoo_malformed"),
        FflError::Http(_) => (StatusCode::BAD_GATEWAY, "upstream_unreachable"),
        FflError::NotPlayoffWeek { .. } => (StatusCode::BAD_REQUEST, "not_playoff_week"),
        FflError::NoPlayoffStartWeek { .. } => (StatusCode::NOT_FOUND, "no_playoffs"),
        FflError::NoLeague { .. } => (StatusCode::NOT_FOUND, "no_league"),
        FflError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    }
}

impl IntoResponse for FflError {
    fn into_response(self) -> Response {
        let (status, code) = error_status(&self);
        if status.is_server_error() {
            error!("Request failed: {self}");
        }

        let body = json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

fn error_page(err: FflError) -> Response {
    let (status, _) = error_status(&err);
    error!("Page failed: {err}");
    (status, Html(templates::error_page(&err.to_string()))).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct WeekRange {
    pub start_week: Option<Week>,
    pub end_week: Option<Week>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WeekQuery {
    pub week: Option<Week>,
}

pub async fn dashboard(State(state): State<AppState>) -> Response {
    let load = async {
        let overview = state.client.get_league_overview(&state.league_key).await?;
        let activity = state
            .client
            .weekly_transaction_stats_for(&overview.league, &overview.teams, None, None)
            .await?;
        Ok::<_, FflError>(templates::dashboard(
            &overview.league,
            &overview.summary,
            &weekly_results(&overview.matchups),
            &activity,
        ))
    };

    match load.await {
        Ok(page) => Html(page).into_response(),
        Err(e) => error_page(e),
    }
}

pub async fn playoffs_page(State(state): State<AppState>) -> Response {
    let load = async {
        let info = state.client.get_league_info(&state.league_key).await?;
        let stats = state
            .client
            .get_all_teams_playoff_stats(&state.league_key)
            .await?;
        Ok::<_, FflError>(templates::playoffs(&info, &stats))
    };

    match load.await {
        Ok(page) => Html(page).into_response(),
        Err(e) => error_page(e),
    }
}

pub async fn api_league(State(state): State<AppState>) -> ApiResult<LeagueInfo> {
    Ok(Json(state.client.get_league_info(&state.league_key).await?))
}

pub async fn api_teams(State(state): State<AppState>) -> ApiResult<Vec<TeamSummary>> {
    Ok(Json(state.client.get_teams_summary(&state.league_key).await?))
}

pub async fn api_weekly(
    State(state): State<AppState>,
    Query(range): Query<WeekRange>,
) -> ApiResult<Vec<WeeklyTeamResult>> {
    let rows = state
        .client
        .get_weekly_results(&state.league_key, range.start_week, range.end_week)
        .await?;
    Ok(Json(rows))
}

pub async fn api_weekly_transactions(
    State(state): State<AppState>,
    Query(range): Query<WeekRange>,
) -> ApiResult<Vec<WeeklyTransactionStats>> {
    let rows = state
        .client
        .get_weekly_transaction_stats(&state.league_key, range.start_week, range.end_week)
        .await?;
    Ok(Json(rows))
}

pub async fn api_playoffs(State(state): State<AppState>) -> ApiResult<Vec<PlayoffTeamStats>> {
    Ok(Json(
        state
            .client
            .get_all_teams_playoff_stats(&state.league_key)
            .await?,
    ))
}

pub async fn api_playoffs_weekly(
    State(state): State<AppState>,
) -> ApiResult<Vec<WeeklyTeamResult>> {
    Ok(Json(
        state
            .client
            .get_playoff_weekly_stats(&state.league_key)
            .await?,
    ))
}

pub async fn api_playoff_scoreboard(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> ApiResult<Vec<Matchup>> {
    Ok(Json(
        state
            .client
            .get_playoff_scoreboard(&state.league_key, query.week)
            .await?,
    ))
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "league_key": state.league_key,
        "authenticated": state.client.session().is_authenticated().await,
    }))
}
