//! Derived statistics: matchup winners, all-play records, expected wins,
//! playoff aggregates and weekly roster activity.

use chrono::{Datelike, Duration, NaiveDate};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::types::*;
use crate::cli::types::{TeamKey, Week};


/// Round to three decimals, the precision shown for percentages.
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Name of the higher-scoring side, or [`TIE`].
pub fn matchup_winner(team1: &MatchupSide, team2: &MatchupSide) -> String {
    if team1.points > team2.points {
        team1.name.clone()
    } else if team2.points > team1.points {
        team2.name.clone()
    } else {
        TIE.to_string()
    }
}

/// Share of the week's other scores that `points` beats, as a percentage.
///
/// `week_points` includes the team's own score.
pub fn all_play_percentage(points: f64, week_points: &[f64]) -> f64 {
    let teams = week_points.len();
    if teams <= 1 {
        return 0.0;
    }
    let beaten = week_points.iter().filter(|&&other| points > other).count();
    beaten as f64 / (teams - 1) as f64 * 100.0
}

/// Fill `record_percentage_vs_all` on both sides of every matchup.
pub fn apply_all_play(matchups: &mut [Matchup]) {
    let mut by_week: BTreeMap<Week, Vec<f64>> = BTreeMap::new();
    for m in matchups.iter() {
        let week = by_week.entry(m.week).or_default();
        week.push(m.team1.points);
        week.push(m.team2.points);
    }

    matchups.par_iter_mut().for_each(|m| {
        if let Some(points) = by_week.get(&m.week) {
            m.team1.record_percentage_vs_all = all_play_percentage(m.team1.points, points);
            m.team2.record_percentage_vs_all = all_play_percentage(m.team2.points, points);
        }
    });
}

/// Flatten matchups into one row per team and week.
///
/// Sorted by week, then by all-play record (best first). A team listed twice
/// in one week keeps its first row.
pub fn weekly_results(matchups: &[Matchup]) -> Vec<WeeklyTeamResult> {
    let mut seen: HashSet<(Week, TeamKey)> = HashSet::new();
    let mut rows = Vec::with_capacity(matchups.len() * 2);

    for m in matchups {
        for (side, opponent) in [(&m.team1, &m.team2), (&m.team2, &m.team1)] {
            if !seen.insert((m.week, side.team_key.clone())) {
                continue;
            }
            rows.push(WeeklyTeamResult {
                team_key: side.team_key.clone(),
                team_name: side.name.clone(),
                week: m.week,
                points_for: side.points,
                points_against: opponent.points,
                outcome: Outcome::from_points(side.points, opponent.points),
                is_playoff: m.is_playoffs,
                record_percentage_vs_all: side.record_percentage_vs_all,
            });
        }
    }

    rows.sort_by(|a, b| {
        a.week.cmp(&b.week).then(
            b.record_percentage_vs_all
                .total_cmp(&a.record_percentage_vs_all),
        )
    });
    rows
}

/// Expected wins and losses per team over weeks before `first_incomplete`.
///
/// A week counts as an expected win above 50% all-play, a loss below it,
/// and neither at exactly 50%.
pub fn expected_record(
    results: &[WeeklyTeamResult],
    first_incomplete: Week,
) -> HashMap<TeamKey, (f64, f64)> {
    let mut expected: HashMap<TeamKey, (f64, f64)> = HashMap::new();
    for row in results.iter().filter(|r| r.week < first_incomplete) {
        let entry = expected.entry(row.team_key.clone()).or_default();
        if row.record_percentage_vs_all > 50.0 {
            entry.0 += 1.0;
        } else if row.record_percentage_vs_all < 50.0 {
            entry.1 += 1.0;
        }
    }
    expected
}

/// Yahoo reports win percentage as a fraction; values above 1 are already percentages.
pub fn win_percentage_as_percent(value: f64) -> f64 {
    if value <= 1.0 {
        value * 100.0
    } else {
        value
    }
}

/// Attach expected-record columns to each standing.
pub fn team_summaries(
    standings: Vec<TeamStanding>,
    results: &[WeeklyTeamResult],
    first_incomplete: Week,
) -> Vec<TeamSummary> {
    let expected = expected_record(results, first_incomplete);

    standings
        .into_iter()
        .map(|standing| {
            let (wins, losses) = expected
                .get(&standing.team.team_key)
                .copied()
                .unwrap_or_default();
            let games = wins + losses;

            let (expected_win_percentage, win_percentage_difference) = if games > 0.0 {
                let expected_pct = wins / games * 100.0;
                let actual_pct = win_percentage_as_percent(standing.win_percentage);
                (round3(expected_pct), round3(actual_pct - expected_pct))
            } else {
                (0.0, 0.0)
            };

            TeamSummary {
                standing,
                expected_wins: wins,
                expected_losses: losses,
                expected_win_percentage,
                win_percentage_difference,
            }
        })
        .collect()
}

/// Keep only rows in `start..` (playoff weeks).
pub fn playoff_rows(results: Vec<WeeklyTeamResult>, start: Week) -> Vec<WeeklyTeamResult> {
    results.into_iter().filter(|r| r.week >= start).collect()
}

/// Aggregate playoff rows per team, in the order of `teams`.
pub fn playoff_team_stats(
    teams: &[Team],
    results: &[WeeklyTeamResult],
    start: Week,
    end: Week,
) -> Vec<PlayoffTeamStats> {
    teams
        .iter()
        .map(|team| {
            let mut weeks: Vec<WeeklyTeamResult> = results
                .iter()
                .filter(|r| r.team_key == team.team_key && r.week >= start && r.week <= end)
                .cloned()
                .collect();
            weeks.sort_by_key(|r| r.week);

            let count = |outcome: Outcome| {
                weeks.iter().filter(|r| r.outcome == outcome).count() as u16
            };

            PlayoffTeamStats {
                team_key: team.team_key.clone(),
                team_name: team.name.clone(),
                playoff_start_week: start,
                playoff_end_week: end,
                games: weeks.len() as u16,
                wins: count(Outcome::Win),
                losses: count(Outcome::Loss),
                ties: count(Outcome::Tie),
                points_for: weeks.iter().map(|r| r.points_for).sum(),
                points_against: weeks.iter().map(|r| r.points_against).sum(),
                number_of_moves: team.number_of_moves,
                number_of_trades: team.number_of_trades,
                faab_balance: team.faab_balance,
                faab_spent: team
                    .faab_balance
                    .map(|balance| STARTING_FAAB_BUDGET.saturating_sub(balance)),
                weeks,
            }
        })
        .collect()
}

/// Fantasy week a transaction made on `day` falls in.
///
/// Weeks run Tuesday to Monday. Week 1 starts on the first Tuesday on or
/// after the league's start date; anything earlier counts as week 1.
pub fn transaction_week(league_start: NaiveDate, day: NaiveDate) -> Week {
    let to_tuesday = (8 - i64::from(league_start.weekday().num_days_from_monday())) % 7;
    let first_tuesday = league_start + Duration::days(to_tuesday);
    let since_tuesday = (i64::from(day.weekday().num_days_from_monday()) + 6) % 7;
    let week_tuesday = day - Duration::days(since_tuesday);

    let week = (week_tuesday - first_tuesday).num_days().div_euclid(7) + 1;
    Week::new(u16::try_from(week.max(1)).unwrap_or(u16::MAX))
}

#[derive(Debug, Default, Clone, Copy)]
struct Activity {
    moves: u32,
    trades: u32,
    faab_spent: u32,
}

/// Cumulative moves, trades and FAAB per team for each of `weeks`.
///
/// Counts run from the start of the season, so week N includes every
/// transaction up to and including week N. Transactions without a
/// timestamp, or in leagues without a start date, are not counted. Teams of
/// other leagues are ignored. Rows come week by week in the order of `teams`.
pub fn weekly_transaction_stats(
    info: &LeagueInfo,
    teams: &[Team],
    transactions: &[Transaction],
    weeks: &[Week],
) -> Vec<WeeklyTransactionStats> {
    let mut per_team: HashMap<TeamKey, Vec<(Week, Activity)>> = HashMap::new();

    if let Some(start_date) = info.start_date {
        for transaction in transactions {
            let Some(at) = transaction.timestamp else {
                continue;
            };
            let week = transaction_week(start_date, at.date_naive());
            let delta = Activity {
                moves: u32::from(transaction.transaction_type.is_move()),
                trades: u32::from(transaction.transaction_type == TransactionType::Trade),
                faab_spent: if transaction.is_successful() {
                    transaction.faab_bid
                } else {
                    0
                },
            };

            for team_key in transaction.team_keys() {
                if team_key.league_key() != info.league_key {
                    continue;
                }
                per_team.entry(team_key).or_default().push((week, delta));
            }
        }
    }

    let mut weeks = weeks.to_vec();
    weeks.sort();
    weeks.dedup();

    let mut rows = Vec::with_capacity(weeks.len() * teams.len());
    for week in weeks {
        for team in teams {
            let totals = per_team
                .get(&team.team_key)
                .map(|events| {
                    events
                        .iter()
                        .filter(|(at, _)| *at <= week)
                        .fold(Activity::default(), |acc, (_, d)| Activity {
                            moves: acc.moves + d.moves,
                            trades: acc.trades + d.trades,
                            faab_spent: acc.faab_spent + d.faab_spent,
                        })
                })
                .unwrap_or_default();

            rows.push(WeeklyTransactionStats {
                team_key: team.team_key.clone(),
                team_name: team.name.clone(),
                week,
                number_of_moves: totals.moves,
                number_of_trades: totals.trades,
                faab_spent: totals.faab_spent,
                faab_balance: STARTING_FAAB_BUDGET.saturating_sub(totals.faab_spent),
            });
        }
    }
    rows
}

/// Weeks to request: defaults to the league schedule, never past the current week.
pub fn resolve_week_range(
    info: &LeagueInfo,
    start: Option<Week>,
    end: Option<Week>,
) -> Vec<Week> {
    let start = start.unwrap_or(info.start_week).max(Week::new(1));
    let end = end.unwrap_or(info.end_week).min(info.current_week);
    (start.as_u16()..=end.as_u16()).map(Week::new).collect()
}

/// First week whose results may still change.
pub fn first_incomplete_week(info: &LeagueInfo) -> Week {
    if info.is_finished {
        Week::new(info.end_week.as_u16().saturating_add(1))
    } else {
        info.current_week
    }
}

/// Whether a league's season is over, so its data never changes again.
///
/// NFL seasons end by February: last year's season counts as finished from
/// March on. A finished league that has reached its last week also counts.
pub fn is_prior_season(info: &LeagueInfo, today: NaiveDate) -> bool {
    let season = i32::from(info.season.as_u16());
    let year = today.year();

    if season < year - 1 {
        return true;
    }
    if season == year - 1 && today.month() > 2 {
        return true;
    }
    info.is_finished && info.current_week >= info.end_week
}
