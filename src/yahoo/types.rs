//! Typed records built from Yahoo Fantasy responses.

use crate::cli::types::{GameKey, LeagueKey, Season, TeamKey, Week};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;


/// Nickname Yahoo reports for managers who hide their profile.
pub const HIDDEN_MANAGER: &str = "--hidden--";

/// FAAB budget every team starts the season with.
pub const STARTING_FAAB_BUDGET: u32 = 100;

/// One fantasy game (sport + season) the user plays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub game_key: GameKey,
    pub code: String,
    pub name: String,
    pub season: Season,
    pub game_type: String,
}

impl Game {
    pub fn is_football(&self) -> bool {
        let name = self.name.to_lowercase();
        name.contains("football")
            || name.contains("nfl")
            || self.code.eq_ignore_ascii_case("nfl")
            || self.game_type.to_lowercase().contains("football")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub league_key: LeagueKey,
    pub name: String,
    pub season: Season,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueSettingsSummary {
    pub draft_status: Option<String>,
    pub waiver_type: Option<String>,
    pub playoff_start_week: Option<Week>,
    pub num_playoff_teams: Option<u16>,
    pub uses_faab: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueInfo {
    pub league_key: LeagueKey,
    pub league_id: String,
    pub name: String,
    pub season: Season,
    pub num_teams: u16,
    pub scoring_type: String,
    pub league_type: String,
    pub current_week: Week,
    pub start_week: Week,
    pub end_week: Week,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_finished: bool,
    pub settings: Option<LeagueSettingsSummary>,
}

impl LeagueInfo {
    pub fn playoff_start_week(&self) -> Option<Week> {
        self.settings.as_ref()?.playoff_start_week
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub team_key: TeamKey,
    pub team_id: String,
    pub name: String,
    pub manager_nickname: String,
    pub number_of_moves: u32,
    pub number_of_trades: u32,
    pub faab_balance: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStanding {
    #[serde(flatten)]
    pub team: Team,
    pub rank: Option<u16>,
    pub wins: u16,
    pub losses: u16,
    pub ties: u16,
    /// As reported by Yahoo: a fraction such as `0.643`.
    pub win_percentage: f64,
    pub points_for: f64,
    pub points_against: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupSide {
    pub team_key: TeamKey,
    pub name: String,
    pub manager_nickname: String,
    pub points: f64,
    pub record_percentage_vs_all: f64,
}

/// Team name of the winner, or this for equal scores.
pub const TIE: &str = "Tie";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub week: Week,
    pub is_playoffs: bool,
    pub team1: MatchupSide,
    pub team2: MatchupSide,
    pub winner: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Tie,
}

impl Outcome {
    pub fn from_points(points_for: f64, points_against: f64) -> Self {
        if points_for > points_against {
            Outcome::Win
        } else if points_for < points_against {
            Outcome::Loss
        } else {
            Outcome::Tie
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Win => "W",
            Outcome::Loss => "L",
            Outcome::Tie => "T",
        };
        f.write_str(s)
    }
}

/// One team's result in one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTeamResult {
    pub team_key: TeamKey,
    pub team_name: String,
    pub week: Week,
    pub points_for: f64,
    pub points_against: f64,
    pub outcome: Outcome,
    pub is_playoff: bool,
    pub record_percentage_vs_all: f64,
}

/// Standing plus luck indicators derived from all-play records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    #[serde(flatten)]
    pub standing: TeamStanding,
    pub expected_wins: f64,
    pub expected_losses: f64,
    pub expected_win_percentage: f64,
    /// Actual minus expected win percentage, in percentage points.
    pub win_percentage_difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayoffTeamStats {
    pub team_key: TeamKey,
    pub team_name: String,
    pub playoff_start_week: Week,
    pub playoff_end_week: Week,
    pub games: u16,
    pub wins: u16,
    pub losses: u16,
    pub ties: u16,
    pub points_for: f64,
    pub points_against: f64,
    /// Season totals as Yahoo reports them for the team.
    pub number_of_moves: u32,
    pub number_of_trades: u32,
    pub faab_balance: Option<u32>,
    pub faab_spent: Option<u32>,
    pub weeks: Vec<WeeklyTeamResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "add")]
    Add,
    #[serde(rename = "drop")]
    Drop,
    #[serde(rename = "add/drop")]
    AddDrop,
    #[serde(rename = "trade")]
    Trade,
    #[serde(rename = "commish")]
    Commish,
    #[serde(rename = "other")]
    Other,
}

impl TransactionType {
    /// Map Yahoo's `type` field. Unknown kinds become [`TransactionType::Other`].
    pub fn from_yahoo(kind: &str) -> Self {
        match kind.trim() {
            "add" => TransactionType::Add,
            "drop" => TransactionType::Drop,
            "add/drop" => TransactionType::AddDrop,
            "trade" => TransactionType::Trade,
            "commish" => TransactionType::Commish,
            _ => TransactionType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Add => "add",
            TransactionType::Drop => "drop",
            TransactionType::AddDrop => "add/drop",
            TransactionType::Trade => "trade",
            TransactionType::Commish => "commish",
            TransactionType::Other => "other",
        }
    }

    /// Adds and drops count toward a team's roster moves.
    pub fn is_move(&self) -> bool {
        matches!(
            self,
            TransactionType::Add | TransactionType::Drop | TransactionType::AddDrop
        )
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One player's part in a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPlayer {
    pub player_key: String,
    pub name: String,
    /// `add`, `drop` or `trade` as listed in the player's transaction data.
    pub move_type: String,
    pub source_team_key: Option<TeamKey>,
    pub destination_team_key: Option<TeamKey>,
}

impl TransactionPlayer {
    /// Team on the receiving end, else the team giving the player up.
    pub fn team_key(&self) -> Option<&TeamKey> {
        self.destination_team_key
            .as_ref()
            .or(self.source_team_key.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_key: String,
    pub transaction_type: TransactionType,
    pub status: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub faab_bid: u32,
    pub trader_team_key: Option<TeamKey>,
    pub tradee_team_key: Option<TeamKey>,
    pub players: Vec<TransactionPlayer>,
}

impl Transaction {
    pub fn is_successful(&self) -> bool {
        self.status == "successful"
    }

    /// Teams the transaction counts for, each once.
    ///
    /// Trades count for the trading teams, everything else for the teams
    /// named in the players' transaction data.
    pub fn team_keys(&self) -> Vec<TeamKey> {
        let candidates: Vec<&TeamKey> = match self.transaction_type {
            TransactionType::Trade => self
                .trader_team_key
                .iter()
                .chain(self.tradee_team_key.iter())
                .collect(),
            _ => self.players.iter().filter_map(TransactionPlayer::team_key).collect(),
        };

        let mut keys: Vec<TeamKey> = Vec::with_capacity(candidates.len());
        for key in candidates {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        keys
    }
}

/// Cumulative roster activity of one team through one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyTransactionStats {
    pub team_key: TeamKey,
    pub team_name: String,
    pub week: Week,
    pub number_of_moves: u32,
    pub number_of_trades: u32,
    pub faab_spent: u32,
    pub faab_balance: u32,
}

/// Everything the `run` report and the dashboard show for a league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueOverview {
    pub league: LeagueInfo,
    pub teams: Vec<Team>,
    pub summary: Vec<TeamSummary>,
    pub matchups: Vec<Matchup>,
}
