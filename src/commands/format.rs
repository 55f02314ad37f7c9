//! Plain-text tables for terminal output.

use std::fmt::Write;

use serde::Serialize;

use crate::{
    storage::{CacheEntry, NicknameMapping},
    yahoo::{LeagueInfo, Matchup, PlayoffTeamStats, Team, TeamSummary, WeeklyTransactionStats},
    Result,
};

const RULE_WIDTH: usize = 50;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn or_na<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "N/A".to_string())
}

/// Pretty JSON for `--json` output.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn format_league_info(info: &LeagueInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "LEAGUE INFORMATION");
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "League Name: {}", info.name);
    let _ = writeln!(out, "League Key: {}", info.league_key);
    let _ = writeln!(out, "League ID: {}", info.league_id);
    let _ = writeln!(out, "Season: {}", info.season);
    let _ = writeln!(out, "Number of Teams: {}", info.num_teams);
    let _ = writeln!(out, "Scoring Type: {}", info.scoring_type);
    let _ = writeln!(out, "League Type: {}", info.league_type);
    let _ = writeln!(
        out,
        "Weeks: {}-{} (current {}){}",
        info.start_week,
        info.end_week,
        info.current_week,
        if info.is_finished { ", finished" } else { "" }
    );

    if let Some(settings) = &info.settings {
        let _ = writeln!(out);
        let _ = writeln!(out, "Settings:");
        let _ = writeln!(out, "  Draft Status: {}", or_na(settings.draft_status.as_ref()));
        let _ = writeln!(out, "  Waiver Type: {}", or_na(settings.waiver_type.as_ref()));
        let _ = writeln!(out, "  Playoff Start Week: {}", or_na(settings.playoff_start_week));
        let _ = writeln!(out, "  Playoff Teams: {}", or_na(settings.num_playoff_teams));
    }
    out
}

pub fn format_teams(teams: &[Team]) -> String {
    if teams.is_empty() {
        return "No teams found\n".to_string();
    }

    let mut out = format!("Teams in League ({}):\n", teams.len());
    for team in teams {
        let _ = writeln!(
            out,
            "  - {} ({}) managed by {}, {} moves, {} trades{}",
            team.name,
            team.team_key,
            team.manager_nickname,
            team.number_of_moves,
            team.number_of_trades,
            team.faab_balance
                .map(|b| format!(", FAAB ${b}"))
                .unwrap_or_default(),
        );
    }
    out
}

pub fn format_summary(summary: &[TeamSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<4} {:<24} {:<16} {:<8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "Rank", "Team", "Manager", "Record", "Win%", "PF", "PA", "xW-xL", "xWin%", "Diff"
    );
    for row in summary {
        let s = &row.standing;
        let _ = writeln!(
            out,
            "{:<4} {:<24} {:<16} {:<8} {:>8.3} {:>8.2} {:>8.2} {:>8} {:>8.3} {:>+8.3}",
            or_na(s.rank),
            s.team.name,
            s.team.manager_nickname,
            format!("{}-{}-{}", s.wins, s.losses, s.ties),
            s.win_percentage,
            s.points_for,
            s.points_against,
            format!("{}-{}", row.expected_wins, row.expected_losses),
            row.expected_win_percentage,
            row.win_percentage_difference,
        );
    }
    out
}

pub fn format_matchups(matchups: &[Matchup]) -> String {
    if matchups.is_empty() {
        return "No matchups found\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<5} {:<24} {:>8} {:>7}   {:<24} {:>8} {:>7}   Winner",
        "Week", "Team 1", "Points", "All%", "Team 2", "Points", "All%"
    );
    for m in matchups {
        let _ = writeln!(
            out,
            "{:<5} {:<24} {:>8.2} {:>7.1}   {:<24} {:>8.2} {:>7.1}   {}{}",
            m.week.as_u16(),
            m.team1.name,
            m.team1.points,
            m.team1.record_percentage_vs_all,
            m.team2.name,
            m.team2.points,
            m.team2.record_percentage_vs_all,
            m.winner,
            if m.is_playoffs { " (playoffs)" } else { "" },
        );
    }
    out
}

pub fn format_playoff_stats(stats: &[PlayoffTeamStats]) -> String {
    let Some(first) = stats.first() else {
        return "No playoff data\n".to_string();
    };

    let mut out = format!(
        "Playoffs: weeks {}-{}\n",
        first.playoff_start_week, first.playoff_end_week
    );
    let _ = writeln!(
        out,
        "{:<24} {:>5} {:>8} {:>8} {:>8} {:>5} {:>6} {:>5}  Weeks",
        "Team", "Games", "Record", "PF", "PA", "Moves", "Trades", "FAAB"
    );
    for team in stats {
        let weeks = team
            .weeks
            .iter()
            .map(|w| format!("{}:{}", w.week, w.outcome))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(
            out,
            "{:<24} {:>5} {:>8} {:>8.2} {:>8.2} {:>5} {:>6} {:>5}  {}",
            team.team_name,
            team.games,
            format!("{}-{}-{}", team.wins, team.losses, team.ties),
            team.points_for,
            team.points_against,
            team.number_of_moves,
            team.number_of_trades,
            or_na(team.faab_balance),
            weeks,
        );
    }
    out
}

pub fn format_transaction_stats(rows: &[WeeklyTransactionStats]) -> String {
    if rows.is_empty() {
        return "No roster activity\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<5} {:<24} {:>5} {:>6} {:>10} {:>12}",
        "Week", "Team", "Moves", "Trades", "FAAB Spent", "FAAB Balance"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<5} {:<24} {:>5} {:>6} {:>10} {:>12}",
            row.week.as_u16(),
            row.team_name,
            row.number_of_moves,
            row.number_of_trades,
            row.faab_spent,
            row.faab_balance,
        );
    }
    out
}

pub fn format_nicknames(mappings: &[NicknameMapping]) -> String {
    if mappings.is_empty() {
        return "No nickname overrides stored\n".to_string();
    }

    let mut out = String::new();
    for m in mappings {
        let _ = writeln!(
            out,
            "{} {} {:<24} -> {}",
            m.league_key, m.season, m.team_name, m.manager_nickname
        );
    }
    out
}

pub fn format_cache_entries(entries: &[CacheEntry]) -> String {
    if entries.is_empty() {
        return "Cache is empty\n".to_string();
    }

    let mut out = String::new();
    for e in entries {
        let cached_at = chrono::DateTime::from_timestamp(e.cached_at, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| e.cached_at.to_string());
        let _ = writeln!(
            out,
            "{:<16} {:<16} {:>9} bytes  {}",
            e.league_key, e.data_type, e.size_bytes, cached_at
        );
    }
    out
}
