//! Yahoo-shaped response bodies for tests.

use serde_json::{json, Map, Value};

/// `{"0": {inner: a}, "1": {inner: b}, "count": 2}`
pub fn numbered(inner: &str, items: Vec<Value>) -> Value {
    let mut obj = Map::new();
    let count = items.len();
    for (i, item) in items.into_iter().enumerate() {
        obj.insert(i.to_string(), json!({ inner: item }));
    }
    obj.insert("count".to_string(), json!(count));
    Value::Object(obj)
}

fn team_info(league_key: &str, id: u32, name: &str, nickname: &str) -> Value {
    json!([
        {"team_key": format!("{league_key}.t.{id}")},
        {"team_id": id.to_string()},
        {"name": name},
        [],
        {"url": format!("https://football.fantasysports.yahoo.com/f1/0/{id}")},
        {"team_logos": [{"team_logo": {"size": "large", "url": "https://example.invalid/logo.png"}}]},
        [],
        {"waiver_priority": 3},
        {"faab_balance": "87"},
        {"number_of_moves": 12},
        {"number_of_trades": "1"},
        {"managers": [{"manager": {"manager_id": id.to_string(), "nickname": nickname, "guid": "ABC"}}]}
    ])
}

fn user_envelope(games: Value) -> Value {
    json!({
        "fantasy_content": {
            "xml:lang": "en-US",
            "users": {
                "0": {"user": [{"guid": "GUID123"}, {"games": games}]},
                "count": 1
            },
            "time": "25.1ms",
            "copyright": "Data provided by Yahoo!"
        }
    })
}

/// `users;use_login=1/games` with `(game_key, code, name, season)` rows.
pub fn games_response(games: &[(&str, &str, &str, &str)]) -> Value {
    let items = games
        .iter()
        .map(|(key, code, name, season)| {
            json!([{
                "game_key": key,
                "game_id": key,
                "name": name,
                "code": code,
                "type": "full",
                "url": "https://football.fantasysports.yahoo.com/f1",
                "season": season,
                "is_game_over": 0
            }])
        })
        .collect();
    user_envelope(numbered("game", items))
}

/// `users;use_login=1/games;game_keys={game}/leagues` with `(league_key, name, season)` rows.
pub fn leagues_response(game_key: &str, leagues: &[(&str, &str, &str)]) -> Value {
    let league_items = leagues
        .iter()
        .map(|(key, name, season)| {
            json!([{
                "league_key": key,
                "league_id": key.rsplit('.').next().unwrap_or_default(),
                "name": name,
                "season": season,
                "num_teams": 10
            }])
        })
        .collect();
    let game = json!([
        {"game_key": game_key, "code": "nfl", "name": "Football", "season": "2024", "type": "full"},
        {"leagues": numbered("league", league_items)}
    ]);
    user_envelope(numbered("game", vec![game]))
}

pub struct LeagueFixture<'a> {
    pub league_key: &'a str,
    pub season: &'a str,
    pub current_week: u16,
    pub start_week: u16,
    pub end_week: u16,
    pub playoff_start_week: Option<u16>,
    pub is_finished: bool,
}

impl Default for LeagueFixture<'_> {
    fn default() -> Self {
        Self {
            league_key: "449.l.621700",
            season: "2024",
            current_week: 17,
            start_week: 1,
            end_week: 17,
            playoff_start_week: Some(15),
            is_finished: false,
        }
    }
}

fn league_meta(f: &LeagueFixture) -> Value {
    let mut meta = json!({
        "league_key": f.league_key,
        "league_id": f.league_key.rsplit('.').next().unwrap_or_default(),
        "name": "The Office League",
        "url": "https://football.fantasysports.yahoo.com/f1/621700",
        "draft_status": "postdraft",
        "num_teams": 4,
        "scoring_type": "head",
        "league_type": "private",
        "current_week": f.current_week,
        "start_week": f.start_week.to_string(),
        "start_date": "2024-09-05",
        "end_week": f.end_week.to_string(),
        "end_date": "2024-12-30",
        "game_code": "nfl",
        "season": f.season
    });
    if f.is_finished {
        meta["is_finished"] = json!(1);
    }
    meta
}

/// `league/{key}/settings`
pub fn league_settings_response(f: &LeagueFixture) -> Value {
    let mut settings = json!({
        "draft_type": "live",
        "uses_playoff": "1",
        "num_playoff_teams": "4",
        "waiver_type": "FR",
        "uses_faab": "1"
    });
    if let Some(week) = f.playoff_start_week {
        settings["playoff_start_week"] = json!(week.to_string());
    }
    json!({
        "fantasy_content": {
            "league": [league_meta(f), {"settings": [settings]}]
        }
    })
}

/// `league/{key}/teams` with `(team_id, name, nickname)` rows.
pub fn teams_response(league_key: &str, teams: &[(u32, &str, &str)]) -> Value {
    let f = LeagueFixture {
        league_key,
        ..Default::default()
    };
    let items = teams
        .iter()
        .map(|(id, name, nickname)| json!([team_info(league_key, *id, name, nickname)]))
        .collect();
    json!({
        "fantasy_content": {
            "league": [league_meta(&f), {"teams": numbered("team", items)}]
        }
    })
}

pub struct StandingRow<'a> {
    pub id: u32,
    pub name: &'a str,
    pub nickname: &'a str,
    pub wins: u16,
    pub losses: u16,
    pub percentage: &'a str,
    pub points_for: &'a str,
    pub points_against: f64,
}

/// `league/{key}/standings`
pub fn standings_response(league_key: &str, rows: &[StandingRow]) -> Value {
    let f = LeagueFixture {
        league_key,
        ..Default::default()
    };
    let items = rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            json!([
                team_info(league_key, r.id, r.name, r.nickname),
                {"team_points": {"coverage_type": "season", "season": "2024", "total": r.points_for}},
                {"team_standings": {
                    "rank": i + 1,
                    "playoff_seed": (i + 1).to_string(),
                    "outcome_totals": {
                        "wins": r.wins,
                        "losses": r.losses.to_string(),
                        "ties": 0,
                        "percentage": r.percentage
                    },
                    "points_for": r.points_for,
                    "points_against": r.points_against
                }}
            ])
        })
        .collect();
    json!({
        "fantasy_content": {
            "league": [league_meta(&f), {"standings": [{"teams": numbered("team", items)}]}]
        }
    })
}

fn matchup_team(league_key: &str, week: u16, id: u32, name: &str, points: f64) -> Value {
    json!([
        team_info(league_key, id, name, "--hidden--"),
        {
            "team_points": {"coverage_type": "week", "week": week.to_string(), "total": format!("{points:.2}")},
            "team_projected_points": {"coverage_type": "week", "week": week.to_string(), "total": "100.00"}
        }
    ])
}

/// `league/{key}/scoreboard;week={week}` with `((id, name, points), (id, name, points))` pairs.
pub fn scoreboard_response(
    league_key: &str,
    week: u16,
    is_playoffs: bool,
    pairs: &[((u32, &str, f64), (u32, &str, f64))],
) -> Value {
    let f = LeagueFixture {
        league_key,
        ..Default::default()
    };
    let matchups = pairs
        .iter()
        .map(|((id1, n1, p1), (id2, n2, p2))| {
            json!({
                "week": week.to_string(),
                "week_start": "2024-09-05",
                "status": "postevent",
                "is_playoffs": if is_playoffs { "1" } else { "0" },
                "is_consolation": "0",
                "0": {"teams": numbered("team", vec![
                    matchup_team(league_key, week, *id1, n1, *p1),
                    matchup_team(league_key, week, *id2, n2, *p2),
                ])}
            })
        })
        .collect();
    json!({
        "fantasy_content": {
            "league": [
                league_meta(&f),
                {"scoreboard": {"0": {"matchups": numbered("matchup", matchups)}, "week": week}}
            ]
        }
    })
}

fn transaction_player(id: u32, name: &str, data: Value) -> Value {
    json!([
        [
            {"player_key": format!("449.p.{id}")},
            {"player_id": id.to_string()},
            {"name": {"full": name, "first": name, "last": name}},
            {"editorial_team_abbr": "KC"},
            {"display_position": "WR"},
            {"position_type": "O"}
        ],
        {"transaction_data": data}
    ])
}

/// An `add` picked up by team `team_id`, with a FAAB bid when given.
pub fn add_transaction(
    league_key: &str,
    id: u32,
    team_id: u32,
    timestamp: i64,
    status: &str,
    faab_bid: Option<u32>,
) -> Value {
    let mut meta = json!({
        "transaction_key": format!("{league_key}.tr.{id}"),
        "transaction_id": id.to_string(),
        "type": "add",
        "status": status,
        "timestamp": timestamp.to_string()
    });
    if let Some(bid) = faab_bid {
        meta["faab_bid"] = json!(bid.to_string());
    }
    // Yahoo wraps a single player's data in a list here.
    let data = json!([{
        "type": "add",
        "source_type": "freeagents",
        "destination_type": "team",
        "destination_team_key": format!("{league_key}.t.{team_id}"),
        "destination_team_name": format!("Team {team_id}")
    }]);
    json!([meta, {"players": numbered("player", vec![transaction_player(id, "Added Player", data)])}])
}

/// A `drop` by team `team_id`.
pub fn drop_transaction(league_key: &str, id: u32, team_id: u32, timestamp: i64) -> Value {
    let data = json!({
        "type": "drop",
        "source_type": "team",
        "source_team_key": format!("{league_key}.t.{team_id}"),
        "source_team_name": format!("Team {team_id}"),
        "destination_type": "waivers"
    });
    json!([
        {
            "transaction_key": format!("{league_key}.tr.{id}"),
            "transaction_id": id.to_string(),
            "type": "drop",
            "status": "successful",
            "timestamp": timestamp.to_string()
        },
        {"players": numbered("player", vec![transaction_player(id, "Dropped Player", data)])}
    ])
}

/// A `trade` between `trader` and `tradee`, one player each way.
pub fn trade_transaction(league_key: &str, id: u32, trader: u32, tradee: u32, timestamp: i64) -> Value {
    let trader_key = format!("{league_key}.t.{trader}");
    let tradee_key = format!("{league_key}.t.{tradee}");
    let leg = |player: u32, from: &str, to: &str| {
        transaction_player(
            player,
            "Traded Player",
            json!([{
                "type": "trade",
                "source_type": "team",
                "source_team_key": from,
                "destination_type": "team",
                "destination_team_key": to
            }]),
        )
    };
    json!([
        {
            "transaction_key": format!("{league_key}.tr.{id}"),
            "transaction_id": id.to_string(),
            "type": "trade",
            "status": "successful",
            "timestamp": timestamp.to_string(),
            "trader_team_key": trader_key,
            "trader_team_name": format!("Team {trader}"),
            "tradee_team_key": tradee_key,
            "tradee_team_name": format!("Team {tradee}")
        },
        {"players": numbered("player", vec![
            leg(id * 10, &trader_key, &tradee_key),
            leg(id * 10 + 1, &tradee_key, &trader_key),
        ])}
    ])
}

/// `league/{key}/transactions` wrapping transactions built above.
pub fn transactions_response(league_key: &str, transactions: Vec<Value>) -> Value {
    let f = LeagueFixture {
        league_key,
        ..Default::default()
    };
    json!({
        "fantasy_content": {
            "league": [league_meta(&f), {"transactions": numbered("transaction", transactions)}]
        }
    })
}
