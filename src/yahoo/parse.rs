//! Yahoo's JSON envelope to typed records.
//!
//! Everything sits under `fantasy_content`. Collections are objects keyed
//! `"0"`, `"1"`, ... next to a `"count"`; each entity is an array whose first
//! element is a list of single-key objects holding its fields, followed by
//! sub-resources (`settings`, `teams`, `team_points`, ...).
//!
//! Required fields that are missing fail with [`ApiError::Malformed`].

use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};

use super::compute::matchup_winner;
use super::types::*;
use crate::cli::types::{GameKey, LeagueKey, Season, TeamKey, Week};
use crate::error::{ApiError, FflError};
use crate::Result;


type Fields = Map<String, Value>;

/// Entity fields plus the endpoint they came from, for error messages.
struct Record<'a> {
    fields: Fields,
    endpoint: &'a str,
    kind: &'static str,
}

impl<'a> Record<'a> {
    fn new(entity: &Value, endpoint: &'a str, kind: &'static str) -> Self {
        Self {
            fields: merge_fields(entity),
            endpoint,
            kind,
        }
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    fn missing(&self, key: &str) -> FflError {
        malformed(self.endpoint, format!("{} without `{key}`", self.kind))
    }

    fn string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(value_string)
    }

    fn required_string(&self, key: &str) -> Result<String> {
        self.string(key).ok_or_else(|| self.missing(key))
    }

    fn number(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(value_u64)
    }

    fn required_week(&self, key: &str) -> Result<Week> {
        self.number(key)
            .and_then(|n| u16::try_from(n).ok())
            .map(Week::new)
            .ok_or_else(|| self.missing(key))
    }

    fn required_season(&self) -> Result<Season> {
        self.number("season")
            .and_then(|n| u16::try_from(n).ok())
            .map(Season::new)
            .ok_or_else(|| self.missing("season"))
    }

    fn flag(&self, key: &str) -> bool {
        self.get(key).map(value_bool).unwrap_or(false)
    }

    fn date(&self, key: &str) -> Option<NaiveDate> {
        self.string(key)
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
    }

    fn key<K>(&self, key: &str) -> Result<K>
    where
        K: std::str::FromStr<Err = FflError>,
    {
        let raw = self.required_string(key)?;
        raw.parse::<K>()
            .map_err(|e| malformed(self.endpoint, format!("{}: {e}", self.kind)))
    }

    /// Like [`key`](Self::key), but an absent field is `None`.
    fn optional_key<K>(&self, key: &str) -> Result<Option<K>>
    where
        K: std::str::FromStr<Err = FflError>,
    {
        match self.string(key) {
            Some(_) => self.key(key).map(Some),
            None => Ok(None),
        }
    }
}

fn malformed(endpoint: &str, reason: impl ToString) -> FflError {
    ApiError::malformed(endpoint, reason).into()
}

fn value_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_u64().unwrap_or(0) != 0,
        Value::String(s) => matches!(s.trim(), "1" | "true"),
        _ => false,
    }
}

/// Values stored under `inner` in a numbered collection, in index order.
fn numbered<'v>(collection: &'v Value, inner: &str) -> Vec<&'v Value> {
    let Some(obj) = collection.as_object() else {
        return Vec::new();
    };

    let mut entries: Vec<(u32, &Value)> = obj
        .iter()
        .filter_map(|(k, v)| Some((k.parse::<u32>().ok()?, v.get(inner)?)))
        .collect();
    // Keys arrive in string order ("10" before "2").
    entries.sort_by_key(|(index, _)| *index);
    entries.into_iter().map(|(_, v)| v).collect()
}

/// Merge an entity's single-key objects, at any list depth, into one map.
fn merge_fields(entity: &Value) -> Fields {
    let mut fields = Map::new();
    collect_fields(entity, &mut fields);
    fields
}

fn collect_fields(value: &Value, out: &mut Fields) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_fields(item, out);
            }
        }
        Value::Object(obj) => {
            for (k, v) in obj {
                out.insert(k.clone(), v.clone());
            }
        }
        _ => {}
    }
}

fn fantasy_content<'v>(root: &'v Value, endpoint: &str) -> Result<&'v Value> {
    root.get("fantasy_content")
        .ok_or_else(|| malformed(endpoint, "missing fantasy_content"))
}

/// The logged-in user's entity under `users`.
fn user_record<'a>(root: &Value, endpoint: &'a str) -> Result<Record<'a>> {
    let content = fantasy_content(root, endpoint)?;
    let users = content
        .get("users")
        .ok_or_else(|| malformed(endpoint, "missing users"))?;
    let user = numbered(users, "user")
        .into_iter()
        .next()
        .ok_or_else(|| malformed(endpoint, "no user in response"))?;
    Ok(Record::new(user, endpoint, "user"))
}

fn league_record<'a>(root: &Value, endpoint: &'a str) -> Result<Record<'a>> {
    let league = fantasy_content(root, endpoint)?
        .get("league")
        .ok_or_else(|| malformed(endpoint, "missing league"))?;
    Ok(Record::new(league, endpoint, "league"))
}

fn parse_game(record: &Record) -> Result<Game> {
    Ok(Game {
        game_key: record.key::<GameKey>("game_key")?,
        code: record.string("code").unwrap_or_default(),
        name: record.required_string("name")?,
        season: record.required_season()?,
        game_type: record.string("type").unwrap_or_default(),
    })
}

/// Games of `users;use_login=1/games`.
pub fn parse_games(root: &Value, endpoint: &str) -> Result<Vec<Game>> {
    let user = user_record(root, endpoint)?;
    let games = user.get("games").ok_or_else(|| user.missing("games"))?;

    numbered(games, "game")
        .into_iter()
        .map(|game| parse_game(&Record::new(game, endpoint, "game")))
        .collect()
}

/// Leagues of `users;use_login=1/games;game_keys={key}/leagues`.
pub fn parse_leagues(root: &Value, endpoint: &str) -> Result<Vec<League>> {
    let user = user_record(root, endpoint)?;
    let games = user.get("games").ok_or_else(|| user.missing("games"))?;

    let mut leagues = Vec::new();
    for game in numbered(games, "game") {
        let game = Record::new(game, endpoint, "game");
        let Some(collection) = game.get("leagues") else {
            continue;
        };
        for league in numbered(collection, "league") {
            let league = Record::new(league, endpoint, "league");
            leagues.push(League {
                league_key: league.key::<LeagueKey>("league_key")?,
                name: league.required_string("name")?,
                season: league.required_season()?,
            });
        }
    }
    Ok(leagues)
}

fn parse_settings(league: &Record) -> Option<LeagueSettingsSummary> {
    let settings = Record::new(league.get("settings")?, league.endpoint, "settings");
    Some(LeagueSettingsSummary {
        draft_status: league.string("draft_status"),
        waiver_type: settings.string("waiver_type"),
        playoff_start_week: settings
            .number("playoff_start_week")
            .and_then(|n| u16::try_from(n).ok())
            .filter(|n| *n > 0)
            .map(Week::new),
        num_playoff_teams: settings
            .number("num_playoff_teams")
            .and_then(|n| u16::try_from(n).ok()),
        uses_faab: settings.flag("uses_faab"),
    })
}

/// League metadata of `league/{key}` or `league/{key}/settings`.
pub fn parse_league_info(root: &Value, endpoint: &str) -> Result<LeagueInfo> {
    let league = league_record(root, endpoint)?;
    let start_week = league.required_week("start_week")?;
    let end_week = league.required_week("end_week")?;

    Ok(LeagueInfo {
        league_key: league.key::<LeagueKey>("league_key")?,
        league_id: league.string("league_id").unwrap_or_default(),
        name: league.required_string("name")?,
        season: league.required_season()?,
        num_teams: league
            .number("num_teams")
            .and_then(|n| u16::try_from(n).ok())
            .unwrap_or_default(),
        scoring_type: league.string("scoring_type").unwrap_or_default(),
        league_type: league.string("league_type").unwrap_or_default(),
        current_week: league
            .required_week("current_week")
            .unwrap_or(start_week),
        start_week,
        end_week,
        start_date: league.date("start_date"),
        end_date: league.date("end_date"),
        is_finished: league.flag("is_finished"),
        settings: parse_settings(&league),
    })
}

fn manager_nickname(record: &Record) -> String {
    record
        .get("managers")
        .and_then(|managers| managers.as_array()?.first()?.get("manager")?.get("nickname"))
        .and_then(value_string)
        .unwrap_or_default()
}

fn parse_team(record: &Record) -> Result<Team> {
    Ok(Team {
        team_key: record.key::<TeamKey>("team_key")?,
        team_id: record.string("team_id").unwrap_or_default(),
        name: record.required_string("name")?,
        manager_nickname: manager_nickname(record),
        number_of_moves: record
            .number("number_of_moves")
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or_default(),
        number_of_trades: record
            .number("number_of_trades")
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or_default(),
        faab_balance: record
            .number("faab_balance")
            .and_then(|n| u32::try_from(n).ok()),
    })
}

/// Teams of `league/{key}/teams`.
pub fn parse_teams(root: &Value, endpoint: &str) -> Result<Vec<Team>> {
    let league = league_record(root, endpoint)?;
    let teams = league.get("teams").ok_or_else(|| league.missing("teams"))?;

    numbered(teams, "team")
        .into_iter()
        .map(|team| parse_team(&Record::new(team, endpoint, "team")))
        .collect()
}

/// Standings of `league/{key}/standings`, in Yahoo's order.
pub fn parse_standings(root: &Value, endpoint: &str) -> Result<Vec<TeamStanding>> {
    let league = league_record(root, endpoint)?;
    let standings = league
        .get("standings")
        .ok_or_else(|| league.missing("standings"))?;
    let standings = Record::new(standings, endpoint, "standings");
    let teams = standings
        .get("teams")
        .ok_or_else(|| standings.missing("teams"))?;

    numbered(teams, "team")
        .into_iter()
        .map(|team| {
            let record = Record::new(team, endpoint, "team");
            let team = parse_team(&record)?;
            let totals = record
                .get("team_standings")
                .ok_or_else(|| record.missing("team_standings"))?;
            let outcomes = totals.get("outcome_totals").unwrap_or(&Value::Null);

            let count = |v: Option<&Value>| {
                v.and_then(value_u64)
                    .and_then(|n| u16::try_from(n).ok())
                    .unwrap_or_default()
            };

            Ok(TeamStanding {
                team,
                rank: totals
                    .get("rank")
                    .and_then(value_u64)
                    .and_then(|n| u16::try_from(n).ok()),
                wins: count(outcomes.get("wins")),
                losses: count(outcomes.get("losses")),
                ties: count(outcomes.get("ties")),
                win_percentage: outcomes
                    .get("percentage")
                    .and_then(value_f64)
                    .unwrap_or_default(),
                points_for: totals
                    .get("points_for")
                    .and_then(value_f64)
                    .unwrap_or_default(),
                points_against: totals
                    .get("points_against")
                    .and_then(value_f64)
                    .unwrap_or_default(),
            })
        })
        .collect()
}

fn parse_matchup_side(team: &Value, endpoint: &str) -> Result<MatchupSide> {
    let record = Record::new(team, endpoint, "matchup team");
    let points = record
        .get("team_points")
        .and_then(|p| p.get("total"))
        .and_then(value_f64)
        .unwrap_or_default();

    Ok(MatchupSide {
        team_key: record.key::<TeamKey>("team_key")?,
        name: record.required_string("name")?,
        manager_nickname: manager_nickname(&record),
        points,
        record_percentage_vs_all: 0.0,
    })
}

/// Matchups of `league/{key}/scoreboard;week={week}`.
///
/// `record_percentage_vs_all` is left at zero; see
/// [`apply_all_play`](super::compute::apply_all_play).
pub fn parse_scoreboard(root: &Value, endpoint: &str, week: Week) -> Result<Vec<Matchup>> {
    let league = league_record(root, endpoint)?;
    let scoreboard = league
        .get("scoreboard")
        .ok_or_else(|| league.missing("scoreboard"))?;
    let matchups = scoreboard
        .get("0")
        .and_then(|s| s.get("matchups"))
        .or_else(|| scoreboard.get("matchups"))
        .ok_or_else(|| malformed(endpoint, "scoreboard without matchups"))?;

    numbered(matchups, "matchup")
        .into_iter()
        .map(|matchup| {
            let teams = matchup
                .get("0")
                .and_then(|m| m.get("teams"))
                .or_else(|| matchup.get("teams"))
                .ok_or_else(|| malformed(endpoint, "matchup without teams"))?;

            let mut sides = numbered(teams, "team")
                .into_iter()
                .map(|team| parse_matchup_side(team, endpoint))
                .collect::<Result<Vec<_>>>()?;
            if sides.len() != 2 {
                return Err(malformed(
                    endpoint,
                    format!("matchup with {} teams", sides.len()),
                ));
            }
            let team2 = sides.pop().ok_or_else(|| malformed(endpoint, "matchup"))?;
            let team1 = sides.pop().ok_or_else(|| malformed(endpoint, "matchup"))?;

            let week = matchup
                .get("week")
                .and_then(value_u64)
                .and_then(|n| u16::try_from(n).ok())
                .map(Week::new)
                .unwrap_or(week);

            Ok(Matchup {
                week,
                is_playoffs: matchup.get("is_playoffs").map(value_bool).unwrap_or(false),
                winner: matchup_winner(&team1, &team2),
                team1,
                team2,
            })
        })
        .collect()
}

fn parse_transaction_player(record: &Record) -> Result<TransactionPlayer> {
    // A single object for one player, a list of them otherwise.
    let data = record
        .get("transaction_data")
        .map(|d| Record::new(d, record.endpoint, "transaction data"));
    let data_key = |key: &str| -> Result<Option<TeamKey>> {
        match &data {
            Some(d) => d.optional_key(key),
            None => Ok(None),
        }
    };

    Ok(TransactionPlayer {
        player_key: record.required_string("player_key")?,
        name: record
            .get("name")
            .and_then(|n| n.get("full"))
            .and_then(value_string)
            .unwrap_or_default(),
        move_type: data
            .as_ref()
            .and_then(|d| d.string("type"))
            .unwrap_or_default(),
        source_team_key: data_key("source_team_key")?,
        destination_team_key: data_key("destination_team_key")?,
    })
}

fn parse_transaction(record: &Record) -> Result<Transaction> {
    let players = match record.get("players") {
        Some(players) => numbered(players, "player")
            .into_iter()
            .map(|p| parse_transaction_player(&Record::new(p, record.endpoint, "transaction player")))
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    Ok(Transaction {
        transaction_key: record.required_string("transaction_key")?,
        transaction_type: TransactionType::from_yahoo(&record.required_string("type")?),
        status: record.string("status").unwrap_or_default(),
        timestamp: record
            .number("timestamp")
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        faab_bid: record
            .number("faab_bid")
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or_default(),
        trader_team_key: record.optional_key("trader_team_key")?,
        tradee_team_key: record.optional_key("tradee_team_key")?,
        players,
    })
}

/// Transactions of `league/{key}/transactions`, in Yahoo's order (newest first).
pub fn parse_transactions(root: &Value, endpoint: &str) -> Result<Vec<Transaction>> {
    let league = league_record(root, endpoint)?;
    let transactions = league
        .get("transactions")
        .ok_or_else(|| league.missing("transactions"))?;

    numbered(transactions, "transaction")
        .into_iter()
        .map(|t| parse_transaction(&Record::new(t, endpoint, "transaction")))
        .collect()
}
