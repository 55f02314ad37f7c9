//! API client tests against mocked Yahoo endpoints

use super::*;
use crate::config::Credentials;
use crate::error::AuthError;
use crate::oauth::{OAuthEndpoints, TokenStore};
use crate::storage::{LeagueStore, NicknameMapping};
use crate::yahoo::test_fixtures::*;
use chrono::{Datelike, Duration};
use serde_json::json;
use std::sync::Mutex;
use tempfile::TempDir;
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

const LEAGUE: &str = "449.l.621700";
const API: &str = "/fantasy/v2";

struct Harness {
    server: MockServer,
    client: FantasyClient,
    _dir: TempDir,
}

fn fresh_token(access: &str) -> Token {
    Token {
        access_token: access.to_string(),
        refresh_token: "R1".to_string(),
        token_type: "bearer".to_string(),
        expires_at: Utc::now() + Duration::seconds(3600),
    }
}

async fn harness_with(token: Option<Token>, store: Option<SharedStore>, force: bool) -> Harness {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let tokens = TokenStore::new(dir.path().join("oauth_tokens.json"));
    if let Some(t) = &token {
        tokens.save(t).unwrap();
    }

    let session = OAuthSession::new(Credentials::new("id", "secret", "oob"), tokens).with_endpoints(
        OAuthEndpoints {
            authorization_url: format!("{}/oauth2/request_auth", server.uri()),
            token_url: format!("{}/oauth2/get_token", server.uri()),
        },
    );

    let mut client = FantasyClient::new(Arc::new(session))
        .with_base_url(format!("{}{API}", server.uri()))
        .force_refresh(force);
    if let Some(store) = store {
        client = client.with_store(store);
    }

    Harness {
        server,
        client,
        _dir: dir,
    }
}

async fn harness() -> Harness {
    harness_with(Some(fresh_token("T1")), None, false).await
}

fn league() -> LeagueKey {
    LEAGUE.parse().unwrap()
}

fn memory_store() -> SharedStore {
    Arc::new(Mutex::new(LeagueStore::in_memory().unwrap()))
}

async fn mount_json(server: &MockServer, endpoint: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("{API}/{endpoint}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_settings(server: &MockServer, fixture: &LeagueFixture<'_>) {
    mount_json(
        server,
        &format!("league/{}/settings", fixture.league_key),
        league_settings_response(fixture),
    )
    .await;
}

async fn mount_week(server: &MockServer, week: u16, is_playoffs: bool) {
    let pairs = [
        ((1, "Dunder Mifflin", 100.0 + f64::from(week)), (2, "Sabre", 90.0)),
        ((3, "Stranglers", 80.0), (4, "Nard Dogs", 110.0)),
    ];
    mount_json(
        server,
        &format!("league/{LEAGUE}/scoreboard;week={week}"),
        scoreboard_response(LEAGUE, week, is_playoffs, &pairs),
    )
    .await;
}

fn teams_body() -> Value {
    teams_response(
        LEAGUE,
        &[
            (1, "Dunder Mifflin", "Michael"),
            (2, "Sabre", "--hidden--"),
            (3, "Stranglers", "Dwight"),
            (4, "Nard Dogs", "Andy"),
        ],
    )
}

#[tokio::test]
async fn test_requests_carry_bearer_and_json_format() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/league/{LEAGUE}/teams")))
        .and(header("authorization", "Bearer T1"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(teams_body()))
        .expect(1)
        .mount(&h.server)
        .await;

    let teams = h.client.get_league_teams(&league()).await.unwrap();
    assert_eq!(teams.len(), 4);
    // No store configured: hidden nicknames stay hidden.
    assert_eq!(teams[1].manager_nickname, HIDDEN_MANAGER);
}

#[tokio::test]
async fn test_persistent_401_is_api_error() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/league/{LEAGUE}/teams")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"lang": "en-us", "description": "Please provide valid credentials."}
        })))
        .expect(2)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth2/get_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "T2", "refresh_token": "R2", "expires_in": 3600
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    match h.client.get_league_teams(&league()).await.unwrap_err() {
        FflError::Api(err) => {
            assert_eq!(err.status(), Some(401));
            assert!(err.to_string().contains("valid credentials"));
        }
        other => panic!("Expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_401_with_failed_refresh_is_still_api_error() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/league/{LEAGUE}/teams")))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth2/get_token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})))
        .mount(&h.server)
        .await;

    let err = h.client.get_league_teams(&league()).await.unwrap_err();
    assert!(matches!(err, FflError::Api(ApiError::Status { status: 401, .. })));
    assert!(!h.client.session().is_authenticated().await);
}

#[tokio::test]
async fn test_401_refreshes_and_retries_once() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/league/{LEAGUE}/teams")))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/league/{LEAGUE}/teams")))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(teams_body()))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth2/get_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "T2", "expires_in": 3600
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let teams = h.client.get_league_teams(&league()).await.unwrap();
    assert_eq!(teams.len(), 4);
    let token = h.client.session().current_token().await.unwrap();
    assert_eq!(token.access_token, "T2");
    assert_eq!(token.refresh_token, "R1");
}

#[tokio::test]
async fn test_server_error_status_and_message() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/league/{LEAGUE}/standings")))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal failure"))
        .mount(&h.server)
        .await;

    match h.client.get_league_standings(&league()).await.unwrap_err() {
        FflError::Api(ApiError::Status { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Internal failure");
        }
        other => panic!("Expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn test_xml_and_empty_bodies_are_malformed() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/users;use_login=1/games")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<?xml version=\"1.0\"?><fantasy_content/>"))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/league/{LEAGUE}/teams")))
        .respond_with(ResponseTemplate::new(200).set_body_string("   "))
        .mount(&h.server)
        .await;

    let err = h.client.get_user_games().await.unwrap_err();
    assert!(matches!(err, FflError::Api(ApiError::Malformed { ref reason, .. }) if reason.contains("XML")));

    let err = h.client.get_league_teams(&league()).await.unwrap_err();
    assert!(matches!(err, FflError::Api(ApiError::Malformed { ref reason, .. }) if reason.contains("empty")));
}

#[tokio::test]
async fn test_unauthenticated_client_makes_no_request() {
    let h = harness_with(None, None, false).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(teams_body()))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h.client.get_league_teams(&league()).await.unwrap_err();
    assert!(matches!(err, FflError::Auth(AuthError::NotAuthorized)));
}

#[tokio::test]
async fn test_find_football_leagues_newest_first() {
    let h = harness().await;
    mount_json(
        &h.server,
        "users;use_login=1/games",
        games_response(&[
            ("423", "nfl", "Football", "2023"),
            ("431", "mlb", "Baseball", "2024"),
            ("449", "nfl", "Football", "2024"),
        ]),
    )
    .await;
    mount_json(
        &h.server,
        "users;use_login=1/games;game_keys=423/leagues",
        leagues_response("423", &[("423.l.5", "Old League", "2023")]),
    )
    .await;
    mount_json(
        &h.server,
        "users;use_login=1/games;game_keys=449/leagues",
        leagues_response("449", &[(LEAGUE, "The Office League", "2024")]),
    )
    .await;

    let leagues = h.client.find_football_leagues().await.unwrap();
    let keys: Vec<&str> = leagues.iter().map(|l| l.league_key.as_str()).collect();
    assert_eq!(keys, vec![LEAGUE, "423.l.5"]);
}

#[tokio::test]
async fn test_playoff_weekly_stats_cover_playoff_weeks_only() {
    let h = harness().await;
    mount_settings(&h.server, &LeagueFixture::default()).await;
    for week in 15..=17 {
        mount_week(&h.server, week, true).await;
    }

    assert_eq!(
        h.client.get_playoff_start_week(&league()).await.unwrap(),
        Week::new(15)
    );

    let rows = h.client.get_playoff_weekly_stats(&league()).await.unwrap();
    let mut weeks: Vec<u16> = rows.iter().map(|r| r.week.as_u16()).collect();
    weeks.dedup();
    assert_eq!(weeks, vec![15, 16, 17]);
    assert_eq!(rows.len(), 12);
    assert!(rows.iter().all(|r| r.is_playoff));
}

#[tokio::test]
async fn test_all_teams_playoff_stats() {
    let h = harness().await;
    mount_settings(&h.server, &LeagueFixture::default()).await;
    mount_json(&h.server, &format!("league/{LEAGUE}/teams"), teams_body()).await;
    for week in 15..=17 {
        mount_week(&h.server, week, true).await;
    }

    let stats = h.client.get_all_teams_playoff_stats(&league()).await.unwrap();
    assert_eq!(stats.len(), 4);

    let dunder = &stats[0];
    assert_eq!(dunder.team_name, "Dunder Mifflin");
    assert_eq!(dunder.playoff_start_week, Week::new(15));
    assert_eq!(dunder.playoff_end_week, Week::new(17));
    assert_eq!((dunder.games, dunder.wins, dunder.losses), (3, 3, 0));
    assert!((dunder.points_for - (115.0 + 116.0 + 117.0)).abs() < 1e-9);

    let stranglers = &stats[2];
    assert_eq!((stranglers.wins, stranglers.losses), (0, 3));
}

#[tokio::test]
async fn test_playoff_scoreboard_rejects_regular_season_week() {
    let h = harness().await;
    mount_settings(&h.server, &LeagueFixture::default()).await;

    match h
        .client
        .get_playoff_scoreboard(&league(), Some(Week::new(14)))
        .await
        .unwrap_err()
    {
        FflError::NotPlayoffWeek {
            week,
            playoff_start_week,
        } => {
            assert_eq!(week, 14);
            assert_eq!(playoff_start_week, 15);
        }
        other => panic!("Expected NotPlayoffWeek, got {other:?}"),
    }
}

#[tokio::test]
async fn test_playoff_scoreboard_defaults_to_current_week() {
    let h = harness().await;
    mount_settings(&h.server, &LeagueFixture::default()).await;
    mount_week(&h.server, 17, true).await;

    let matchups = h.client.get_playoff_scoreboard(&league(), None).await.unwrap();
    assert_eq!(matchups.len(), 2);
    assert_eq!(matchups[0].week, Week::new(17));
}

#[tokio::test]
async fn test_missing_playoff_start_week() {
    let h = harness().await;
    mount_settings(
        &h.server,
        &LeagueFixture {
            playoff_start_week: None,
            ..Default::default()
        },
    )
    .await;

    let err = h.client.get_playoff_weekly_stats(&league()).await.unwrap_err();
    assert!(matches!(err, FflError::NoPlayoffStartWeek { .. }));
}

#[tokio::test]
async fn test_weekly_matchups_stop_at_current_week() {
    let h = harness().await;
    mount_settings(
        &h.server,
        &LeagueFixture {
            current_week: 2,
            ..Default::default()
        },
    )
    .await;
    mount_week(&h.server, 1, false).await;
    mount_week(&h.server, 2, false).await;

    let matchups = h.client.get_weekly_matchups(&league(), None, None).await.unwrap();
    assert_eq!(matchups.len(), 4);
    // Week 1: Nard Dogs 110 tops Dunder Mifflin 101, Sabre 90, Stranglers 80.
    assert_eq!(matchups[1].team2.name, "Nard Dogs");
    assert_eq!(matchups[1].team2.record_percentage_vs_all, 100.0);
    assert!((matchups[0].team1.record_percentage_vs_all - 200.0 / 3.0).abs() < 1e-9);
    assert_eq!(matchups[1].team1.record_percentage_vs_all, 0.0);
}

#[tokio::test]
async fn test_teams_summary_counts_completed_weeks() {
    let h = harness().await;
    mount_settings(
        &h.server,
        &LeagueFixture {
            current_week: 3,
            ..Default::default()
        },
    )
    .await;
    for week in 1..=3 {
        mount_week(&h.server, week, false).await;
    }
    mount_json(
        &h.server,
        &format!("league/{LEAGUE}/standings"),
        standings_response(
            LEAGUE,
            &[StandingRow {
                id: 4,
                name: "Nard Dogs",
                nickname: "Andy",
                wins: 2,
                losses: 0,
                percentage: "1.000",
                points_for: "220",
                points_against: 160.0,
            }],
        ),
    )
    .await;

    let summary = h.client.get_teams_summary(&league()).await.unwrap();
    assert_eq!(summary.len(), 1);
    let andy = &summary[0];
    // Weeks 1 and 2 completed; 110 beats 90 and 80 but not 101/102.
    assert_eq!((andy.expected_wins, andy.expected_losses), (2.0, 0.0));
    assert_eq!(andy.expected_win_percentage, 100.0);
    assert_eq!(andy.win_percentage_difference, 0.0);
}

#[tokio::test]
async fn test_nickname_override_applied_to_hidden_managers() {
    let store = memory_store();
    store
        .lock()
        .unwrap()
        .set_nickname(&NicknameMapping {
            team_name: "Sabre".to_string(),
            league_key: league(),
            season: Season::new(2024),
            manager_nickname: "Jo".to_string(),
        })
        .unwrap();

    let h = harness_with(Some(fresh_token("T1")), Some(store), false).await;
    mount_settings(&h.server, &LeagueFixture::default()).await;
    mount_json(&h.server, &format!("league/{LEAGUE}/teams"), teams_body()).await;
    mount_week(&h.server, 16, true).await;

    let teams = h.client.get_league_teams(&league()).await.unwrap();
    assert_eq!(teams[1].manager_nickname, "Jo");
    assert_eq!(teams[0].manager_nickname, "Michael");

    let matchups = h.client.get_league_scoreboard(&league(), Week::new(16)).await.unwrap();
    assert_eq!(matchups[0].team2.manager_nickname, "Jo");
    // No override stored for this team.
    assert_eq!(matchups[0].team1.manager_nickname, HIDDEN_MANAGER);
}

#[tokio::test]
async fn test_prior_season_is_served_from_cache() {
    let store = memory_store();
    let old_season = LeagueFixture {
        season: "2019",
        is_finished: true,
        ..Default::default()
    };

    let h = harness_with(Some(fresh_token("T1")), Some(store.clone()), false).await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/league/{LEAGUE}/settings")))
        .respond_with(ResponseTemplate::new(200).set_body_json(league_settings_response(&old_season)))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/league/{LEAGUE}/scoreboard;week=16")))
        .respond_with(ResponseTemplate::new(200).set_body_json(scoreboard_response(
            LEAGUE,
            16,
            true,
            &[((1, "A", 1.0), (2, "B", 2.0))],
        )))
        .expect(1)
        .mount(&h.server)
        .await;

    for _ in 0..2 {
        let info = h.client.get_league_info(&league()).await.unwrap();
        assert_eq!(info.season, Season::new(2019));
        let matchups = h.client.get_league_scoreboard(&league(), Week::new(16)).await.unwrap();
        assert_eq!(matchups[0].winner, "B");
    }

    let cached = store.lock().unwrap().list_cache_entries(Some(LEAGUE)).unwrap();
    let types: Vec<&str> = cached.iter().map(|e| e.data_type.as_str()).collect();
    assert_eq!(types, vec!["league_info", "scoreboard_w16"]);
}

#[tokio::test]
async fn test_force_refresh_bypasses_cache_reads() {
    let store = memory_store();
    let current = LeagueFixture {
        season: "2019",
        ..Default::default()
    };

    let h = harness_with(Some(fresh_token("T1")), Some(store), true).await;
    Mock::given(method("GET"))
        .and(path(format!("{API}/league/{LEAGUE}/settings")))
        .respond_with(ResponseTemplate::new(200).set_body_json(league_settings_response(&current)))
        .expect(2)
        .mount(&h.server)
        .await;

    h.client.get_league_info(&league()).await.unwrap();
    h.client.get_league_info(&league()).await.unwrap();
}

async fn mount_once(server: &MockServer, endpoint: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("{API}/{endpoint}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

fn standings_body() -> Value {
    standings_response(
        LEAGUE,
        &[StandingRow {
            id: 4,
            name: "Nard Dogs",
            nickname: "Andy",
            wins: 2,
            losses: 0,
            percentage: "1.000",
            points_for: "220",
            points_against: 160.0,
        }],
    )
}

#[tokio::test]
async fn test_league_overview_fetches_each_endpoint_once() {
    // A running season, so nothing is served from the cache.
    let season = Utc::now().year().to_string();
    let fixture = LeagueFixture {
        season: &season,
        current_week: 3,
        ..Default::default()
    };

    let h = harness_with(Some(fresh_token("T1")), Some(memory_store()), false).await;
    mount_once(&h.server, &format!("league/{LEAGUE}/settings"), league_settings_response(&fixture)).await;
    mount_once(&h.server, &format!("league/{LEAGUE}/teams"), teams_body()).await;
    mount_once(&h.server, &format!("league/{LEAGUE}/standings"), standings_body()).await;
    for week in 1..=3u16 {
        let pairs = [((1, "Dunder Mifflin", 100.0), (2, "Sabre", 90.0 + f64::from(week)))];
        mount_once(
            &h.server,
            &format!("league/{LEAGUE}/scoreboard;week={week}"),
            scoreboard_response(LEAGUE, week, false, &pairs),
        )
        .await;
    }

    let overview = h.client.get_league_overview(&league()).await.unwrap();
    assert_eq!(overview.league.current_week, Week::new(3));
    assert_eq!(overview.teams.len(), 4);
    assert_eq!(overview.matchups.len(), 3);
    assert_eq!(overview.summary.len(), 1);
    assert_eq!(overview.summary[0].standing.team.name, "Nard Dogs");
    // Mock expectations are checked when the server drops.
}

fn transactions_body() -> Value {
    transactions_response(
        LEAGUE,
        vec![
            trade_transaction(LEAGUE, 4, 1, 3, 1727179200),
            add_transaction(LEAGUE, 3, 2, 1726660800, "pending", Some(5)),
            drop_transaction(LEAGUE, 2, 4, 1726660800),
            add_transaction(LEAGUE, 1, 2, 1725624000, "successful", Some(12)),
        ],
    )
}

#[tokio::test]
async fn test_league_transactions() {
    let h = harness().await;
    mount_json(&h.server, &format!("league/{LEAGUE}/transactions"), transactions_body()).await;

    let transactions = h.client.get_league_transactions(&league()).await.unwrap();
    assert_eq!(transactions.len(), 4);
    assert_eq!(transactions[0].transaction_type, TransactionType::Trade);
    assert_eq!(transactions[3].faab_bid, 12);
}

#[tokio::test]
async fn test_weekly_transaction_stats() {
    let h = harness().await;
    mount_settings(
        &h.server,
        &LeagueFixture {
            current_week: 3,
            ..Default::default()
        },
    )
    .await;
    mount_json(&h.server, &format!("league/{LEAGUE}/teams"), teams_body()).await;
    mount_json(&h.server, &format!("league/{LEAGUE}/transactions"), transactions_body()).await;

    let rows = h
        .client
        .get_weekly_transaction_stats(&league(), None, None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 12);

    let at = |week: u16, team: &str| {
        rows.iter()
            .find(|r| r.week == Week::new(week) && r.team_name == team)
            .map(|r| (r.number_of_moves, r.number_of_trades, r.faab_spent, r.faab_balance))
            .unwrap()
    };
    // League starts Thursday 2024-09-05; weeks turn over on Tuesdays.
    assert_eq!(at(1, "Sabre"), (1, 0, 12, 88));
    // The pending bid counts as a move but spends nothing.
    assert_eq!(at(2, "Sabre"), (2, 0, 12, 88));
    assert_eq!(at(2, "Nard Dogs"), (1, 0, 0, 100));
    assert_eq!(at(2, "Dunder Mifflin"), (0, 0, 0, 100));
    assert_eq!(at(3, "Dunder Mifflin"), (0, 1, 0, 100));
    assert_eq!(at(3, "Stranglers"), (0, 1, 0, 100));

    let week_two = h
        .client
        .get_weekly_transaction_stats(&league(), Some(Week::new(2)), Some(Week::new(2)))
        .await
        .unwrap();
    assert_eq!(week_two.len(), 4);
    assert!(week_two.iter().all(|r| r.week == Week::new(2)));
}

#[test]
fn test_api_error_message_prefers_yahoo_description() {
    let body = r#"{"error": {"lang": "en-us", "description": "League not found"}}"#;
    assert_eq!(api_error_message(body), "League not found");

    let long = "x".repeat(500);
    assert_eq!(api_error_message(&long).len(), 200);
}
