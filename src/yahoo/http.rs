//! Authenticated client for the Yahoo Fantasy Sports REST API.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::compute::{
    apply_all_play, first_incomplete_week, is_prior_season, playoff_rows, playoff_team_stats,
    resolve_week_range, team_summaries, weekly_results, weekly_transaction_stats,
};
use super::parse;
use super::types::*;
use crate::cli::types::{GameKey, LeagueKey, Season, Week};
use crate::core::cache::{CachedData, LeagueCache, LeagueCacheKey};
use crate::error::{ApiError, FflError};
use crate::oauth::{OAuthSession, Token};
use crate::storage::SharedStore;
use crate::Result;

#[cfg(test)]
mod tests;

/// Base path for the Fantasy Sports v2 API.
pub const YAHOO_API_BASE_URL: &str = "https://fantasysports.yahooapis.com/fantasy/v2";

const MEMORY_CACHE_ENTRIES: usize = 128;

pub struct FantasyClient {
    http: Client,
    session: Arc<OAuthSession>,
    base_url: String,
    cache: Option<LeagueCache>,
    store: Option<SharedStore>,
    force_refresh: bool,
}

impl FantasyClient {
    pub fn new(session: Arc<OAuthSession>) -> Self {
        Self {
            http: Client::new(),
            session,
            base_url: YAHOO_API_BASE_URL.to_string(),
            cache: None,
            store: None,
            force_refresh: false,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Enable the prior-season cache and nickname overrides.
    pub fn with_store(mut self, store: SharedStore) -> Self {
        self.cache = Some(LeagueCache::new(store.clone(), MEMORY_CACHE_ENTRIES));
        self.store = Some(store);
        self
    }

    /// Skip cache reads (fresh data is still written back).
    pub fn force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }

    pub fn session(&self) -> &Arc<OAuthSession> {
        &self.session
    }

    async fn send(&self, url: &str, token: &Token) -> Result<Response> {
        let request = self.http.get(url).query(&[("format", "json")]);
        Ok(token.authorize_request(request).send().await?)
    }

    /// GET `path` under the base URL and decode the JSON body.
    ///
    /// A 401 triggers one token refresh and one retry.
    async fn get_json(&self, path: &str) -> Result<Value> {
        let url = format!("{}/{path}", self.base_url.trim_end_matches('/'));
        debug!("GET {url}");

        let token = self.session.ensure_valid().await?;
        let mut response = self.send(&url, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            info!("Yahoo answered 401 for {path}, refreshing token and retrying");
            match self.session.refresh().await {
                Ok(token) => response = self.send(&url, &token).await?,
                Err(e) => {
                    let body = response.text().await.unwrap_or_default();
                    return Err(ApiError::Status {
                        status: StatusCode::UNAUTHORIZED.as_u16(),
                        message: format!("{} (token refresh failed: {e})", api_error_message(&body)),
                    }
                    .into());
                }
            }
        }

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: api_error_message(&body),
            }
            .into());
        }

        decode_body(&body, path)
    }

    /// Serve `data` from the prior-season cache or fetch it, storing the
    /// result when the league's season is over. `known` saves a settings
    /// lookup when the caller already has the league info.
    async fn cached<T, F, Fut>(
        &self,
        league_key: &LeagueKey,
        data: CachedData,
        known: Option<&LeagueInfo>,
        fetch: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let Some(cache) = &self.cache else {
            return fetch().await;
        };

        let cache_key = LeagueCacheKey::new(league_key, data);
        if !self.force_refresh {
            if let Some(hit) = cache.get::<T>(&cache_key) {
                return Ok(hit);
            }
        }

        let value = fetch().await?;
        let prior = match known {
            Some(info) => is_prior_season(info, Utc::now().date_naive()),
            None => is_prior_season(&self.get_league_info(league_key).await?, Utc::now().date_naive()),
        };
        if prior {
            cache.put(cache_key, &value);
        }
        Ok(value)
    }

    /// League info when a store is attached, for cache and nickname decisions.
    async fn info_for_store(&self, league_key: &LeagueKey) -> Result<Option<LeagueInfo>> {
        if self.store.is_none() {
            return Ok(None);
        }
        Ok(Some(self.get_league_info(league_key).await?))
    }

    fn nickname_override(&self, team_name: &str, league_key: &LeagueKey, season: Season) -> Option<String> {
        let store = self.store.as_ref()?.lock().ok()?;
        match store.get_nickname(team_name, league_key, season) {
            Ok(nickname) => nickname,
            Err(e) => {
                warn!("Nickname lookup failed for {team_name}: {e}");
                None
            }
        }
    }

    fn apply_override(&self, nickname: &mut String, team_name: &str, info: &LeagueInfo) {
        if nickname.as_str() != HIDDEN_MANAGER {
            return;
        }
        if let Some(replacement) = self.nickname_override(team_name, &info.league_key, info.season) {
            *nickname = replacement;
        }
    }

    fn apply_team_overrides<'t>(&self, info: &LeagueInfo, teams: impl Iterator<Item = &'t mut Team>) {
        for team in teams {
            self.apply_override(&mut team.manager_nickname, &team.name, info);
        }
    }

    fn apply_matchup_overrides(&self, matchups: &mut [Matchup], info: &LeagueInfo) {
        for m in matchups.iter_mut() {
            for side in [&mut m.team1, &mut m.team2] {
                self.apply_override(&mut side.manager_nickname, &side.name, info);
            }
        }
    }

    /// Games the logged-in user has played.
    pub async fn get_user_games(&self) -> Result<Vec<Game>> {
        let path = "users;use_login=1/games";
        parse::parse_games(&self.get_json(path).await?, path)
    }

    pub async fn get_leagues(&self, game_key: &GameKey) -> Result<Vec<League>> {
        let path = format!("users;use_login=1/games;game_keys={game_key}/leagues");
        parse::parse_leagues(&self.get_json(&path).await?, &path)
    }

    /// Every football league of the user, newest season first.
    pub async fn find_football_leagues(&self) -> Result<Vec<League>> {
        let mut leagues = Vec::new();
        for game in self.get_user_games().await?.into_iter().filter(Game::is_football) {
            debug!("Looking up leagues for {} {}", game.name, game.season);
            leagues.extend(self.get_leagues(&game.game_key).await?);
        }
        leagues.sort_by(|a, b| b.season.cmp(&a.season));
        Ok(leagues)
    }

    /// League metadata including the settings summary.
    pub async fn get_league_info(&self, league_key: &LeagueKey) -> Result<LeagueInfo> {
        let cache_key = LeagueCacheKey::new(league_key, CachedData::LeagueInfo);
        if let (Some(cache), false) = (&self.cache, self.force_refresh) {
            if let Some(hit) = cache.get::<LeagueInfo>(&cache_key) {
                return Ok(hit);
            }
        }

        let path = format!("league/{league_key}/settings");
        let info = parse::parse_league_info(&self.get_json(&path).await?, &path)?;

        if let Some(cache) = &self.cache {
            if is_prior_season(&info, Utc::now().date_naive()) {
                cache.put(cache_key, &info);
            }
        }
        Ok(info)
    }

    async fn teams_for(&self, league_key: &LeagueKey, known: Option<&LeagueInfo>) -> Result<Vec<Team>> {
        let path = format!("league/{league_key}/teams");
        let mut teams = parse::parse_teams(&self.get_json(&path).await?, &path)?;

        let any_hidden = teams.iter().any(|t| t.manager_nickname == HIDDEN_MANAGER);
        if any_hidden && self.store.is_some() {
            match known {
                Some(info) => self.apply_team_overrides(info, teams.iter_mut()),
                None => {
                    let info = self.get_league_info(league_key).await?;
                    self.apply_team_overrides(&info, teams.iter_mut());
                }
            }
        }
        Ok(teams)
    }

    pub async fn get_league_teams(&self, league_key: &LeagueKey) -> Result<Vec<Team>> {
        self.teams_for(league_key, None).await
    }

    async fn standings_for(
        &self,
        league_key: &LeagueKey,
        known: Option<&LeagueInfo>,
    ) -> Result<Vec<TeamStanding>> {
        let mut standings = self
            .cached(league_key, CachedData::Standings, known, || async move {
                let path = format!("league/{league_key}/standings");
                parse::parse_standings(&self.get_json(&path).await?, &path)
            })
            .await?;
        if let Some(info) = known {
            self.apply_team_overrides(info, standings.iter_mut().map(|s| &mut s.team));
        }
        Ok(standings)
    }

    pub async fn get_league_standings(&self, league_key: &LeagueKey) -> Result<Vec<TeamStanding>> {
        let info = self.info_for_store(league_key).await?;
        self.standings_for(league_key, info.as_ref()).await
    }

    async fn scoreboard_week(
        &self,
        league_key: &LeagueKey,
        week: Week,
        known: Option<&LeagueInfo>,
    ) -> Result<Vec<Matchup>> {
        self.cached(league_key, CachedData::Scoreboard(week.as_u16()), known, || async move {
            let path = format!("league/{league_key}/scoreboard;week={week}");
            parse::parse_scoreboard(&self.get_json(&path).await?, &path, week)
        })
        .await
    }

    /// Matchups of a single week, without all-play records.
    pub async fn get_league_scoreboard(&self, league_key: &LeagueKey, week: Week) -> Result<Vec<Matchup>> {
        let info = self.info_for_store(league_key).await?;
        let mut matchups = self.scoreboard_week(league_key, week, info.as_ref()).await?;
        if let Some(info) = &info {
            self.apply_matchup_overrides(&mut matchups, info);
        }
        Ok(matchups)
    }

    async fn matchups_for(
        &self,
        info: &LeagueInfo,
        start: Option<Week>,
        end: Option<Week>,
    ) -> Result<Vec<Matchup>> {
        let mut matchups = Vec::new();
        for week in resolve_week_range(info, start, end) {
            matchups.extend(self.scoreboard_week(&info.league_key, week, Some(info)).await?);
        }
        apply_all_play(&mut matchups);
        if self.store.is_some() {
            self.apply_matchup_overrides(&mut matchups, info);
        }
        Ok(matchups)
    }

    /// Matchups for `start..=end` (league schedule by default, capped at the
    /// current week) with all-play records filled in.
    pub async fn get_weekly_matchups(
        &self,
        league_key: &LeagueKey,
        start: Option<Week>,
        end: Option<Week>,
    ) -> Result<Vec<Matchup>> {
        let info = self.get_league_info(league_key).await?;
        self.matchups_for(&info, start, end).await
    }

    /// One row per team and week for `start..=end`.
    pub async fn get_weekly_results(
        &self,
        league_key: &LeagueKey,
        start: Option<Week>,
        end: Option<Week>,
    ) -> Result<Vec<WeeklyTeamResult>> {
        let matchups = self.get_weekly_matchups(league_key, start, end).await?;
        Ok(weekly_results(&matchups))
    }

    /// Standings plus expected records from `matchups` (all weeks so far).
    async fn summary_for(&self, info: &LeagueInfo, matchups: &[Matchup]) -> Result<Vec<TeamSummary>> {
        let standings = self.standings_for(&info.league_key, Some(info)).await?;
        Ok(team_summaries(
            standings,
            &weekly_results(matchups),
            first_incomplete_week(info),
        ))
    }

    /// Standings with expected wins/losses over completed weeks.
    pub async fn get_teams_summary(&self, league_key: &LeagueKey) -> Result<Vec<TeamSummary>> {
        let info = self.get_league_info(league_key).await?;
        let matchups = self.matchups_for(&info, None, None).await?;
        self.summary_for(&info, &matchups).await
    }

    /// League info, teams, standings summary and every matchup so far, with
    /// each scoreboard fetched once.
    pub async fn get_league_overview(&self, league_key: &LeagueKey) -> Result<LeagueOverview> {
        let league = self.get_league_info(league_key).await?;
        let teams = self.teams_for(league_key, Some(&league)).await?;
        let matchups = self.matchups_for(&league, None, None).await?;
        let summary = self.summary_for(&league, &matchups).await?;

        Ok(LeagueOverview {
            league,
            teams,
            summary,
            matchups,
        })
    }

    async fn transactions_for(&self, league_key: &LeagueKey, known: Option<&LeagueInfo>) -> Result<Vec<Transaction>> {
        self.cached(league_key, CachedData::Transactions, known, || async move {
            let path = format!("league/{league_key}/transactions");
            parse::parse_transactions(&self.get_json(&path).await?, &path)
        })
        .await
    }

    /// Adds, drops and trades of the league, newest first.
    pub async fn get_league_transactions(&self, league_key: &LeagueKey) -> Result<Vec<Transaction>> {
        let info = self.info_for_store(league_key).await?;
        self.transactions_for(league_key, info.as_ref()).await
    }

    /// Cumulative moves, trades and FAAB of `teams` for `start..=end`
    /// (league schedule by default, capped at the current week).
    pub async fn weekly_transaction_stats_for(
        &self,
        info: &LeagueInfo,
        teams: &[Team],
        start: Option<Week>,
        end: Option<Week>,
    ) -> Result<Vec<WeeklyTransactionStats>> {
        let transactions = self.transactions_for(&info.league_key, Some(info)).await?;
        let weeks = resolve_week_range(info, start, end);
        debug!(
            "Aggregating {} transactions over {} weeks",
            transactions.len(),
            weeks.len()
        );
        Ok(weekly_transaction_stats(info, teams, &transactions, &weeks))
    }

    /// Weekly roster activity for every team in the league.
    pub async fn get_weekly_transaction_stats(
        &self,
        league_key: &LeagueKey,
        start: Option<Week>,
        end: Option<Week>,
    ) -> Result<Vec<WeeklyTransactionStats>> {
        let info = self.get_league_info(league_key).await?;
        let teams = self.teams_for(league_key, Some(&info)).await?;
        self.weekly_transaction_stats_for(&info, &teams, start, end).await
    }

    fn playoff_start(info: &LeagueInfo) -> Result<Week> {
        info.playoff_start_week()
            .ok_or_else(|| FflError::NoPlayoffStartWeek {
                league_key: info.league_key.to_string(),
            })
    }

    pub async fn get_playoff_start_week(&self, league_key: &LeagueKey) -> Result<Week> {
        Self::playoff_start(&self.get_league_info(league_key).await?)
    }

    async fn playoff_results(&self, info: &LeagueInfo) -> Result<(Week, Vec<WeeklyTeamResult>)> {
        let start = Self::playoff_start(info)?;
        let matchups = self.matchups_for(info, Some(start), None).await?;
        Ok((start, playoff_rows(weekly_results(&matchups), start)))
    }

    /// Weekly rows of playoff weeks only.
    pub async fn get_playoff_weekly_stats(&self, league_key: &LeagueKey) -> Result<Vec<WeeklyTeamResult>> {
        let info = self.get_league_info(league_key).await?;
        Ok(self.playoff_results(&info).await?.1)
    }

    /// Matchups of one playoff week, the current week by default.
    ///
    /// Fails with [`FflError::NotPlayoffWeek`] when that week is before the
    /// playoffs, whether it was given or defaulted.
    pub async fn get_playoff_scoreboard(
        &self,
        league_key: &LeagueKey,
        week: Option<Week>,
    ) -> Result<Vec<Matchup>> {
        let info = self.get_league_info(league_key).await?;
        let start = Self::playoff_start(&info)?;
        let week = week.unwrap_or(info.current_week);
        if week < start {
            return Err(FflError::NotPlayoffWeek {
                week: week.as_u16(),
                playoff_start_week: start.as_u16(),
            });
        }

        let mut matchups = self.scoreboard_week(league_key, week, Some(&info)).await?;
        if self.store.is_some() {
            self.apply_matchup_overrides(&mut matchups, &info);
        }
        Ok(matchups)
    }

    /// Playoff totals for every team in the league.
    pub async fn get_all_teams_playoff_stats(&self, league_key: &LeagueKey) -> Result<Vec<PlayoffTeamStats>> {
        let info = self.get_league_info(league_key).await?;
        let (start, results) = self.playoff_results(&info).await?;
        let teams = self.teams_for(league_key, Some(&info)).await?;
        Ok(playoff_team_stats(&teams, &results, start, info.end_week))
    }
}

/// Yahoo's error description, or the start of the body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error")?.get("description")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().chars().take(200).collect())
}

fn decode_body(body: &str, endpoint: &str) -> Result<Value> {
    let trimmed = body.trim_start();
    if trimmed.is_empty() {
        return Err(ApiError::malformed(endpoint, "empty response body").into());
    }
    if trimmed.starts_with('<') {
        return Err(ApiError::malformed(endpoint, "XML returned instead of JSON").into());
    }
    serde_json::from_str(trimmed)
        .map_err(|e| FflError::from(ApiError::malformed(endpoint, format!("invalid JSON: {e}"))))
}
