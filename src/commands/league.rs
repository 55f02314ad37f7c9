//! League reports: `run`, `standings`, `matchups` and `playoffs`.

use serde::Serialize;
use tracing::info;

use super::{
    common::{resolve_league_key, CommandContext, ContextOptions},
    format::{
        format_league_info, format_matchups, format_playoff_stats, format_summary, format_teams,
        format_transaction_stats, to_json,
    },
};
use crate::{
    cli::LeagueArgs,
    yahoo::{FantasyClient, Matchup, PlayoffTeamStats},
    FflError, LeagueKey, Result, Week,
};

#[derive(Debug, Serialize)]
pub struct PlayoffReport {
    pub week: Option<Week>,
    pub matchups: Vec<Matchup>,
    pub teams: Vec<PlayoffTeamStats>,
}

/// Fetch league info, teams, the standings summary and all matchups.
pub async fn handle_run(options: &ContextOptions, args: LeagueArgs) -> Result<()> {
    let ctx = CommandContext::new(options)?;
    let client = &ctx.client;
    let league_key = resolve_league_key(client, args.league_key).await?;
    let report = client.get_league_overview(&league_key).await?;

    if args.json {
        println!("{}", to_json(&report)?);
    } else {
        println!("{}", format_league_info(&report.league));
        println!("{}", format_teams(&report.teams));
        println!("Standings Summary:");
        println!("{}", format_summary(&report.summary));
        println!("Weekly Matchups:");
        print!("{}", format_matchups(&report.matchups));
    }
    Ok(())
}

pub async fn handle_standings(options: &ContextOptions, args: LeagueArgs) -> Result<()> {
    let ctx = CommandContext::new(options)?;
    let league_key = resolve_league_key(&ctx.client, args.league_key).await?;
    let summary = ctx.client.get_teams_summary(&league_key).await?;

    if args.json {
        println!("{}", to_json(&summary)?);
    } else {
        print!("{}", format_summary(&summary));
    }
    Ok(())
}

pub async fn handle_matchups(
    options: &ContextOptions,
    args: LeagueArgs,
    start_week: Option<Week>,
    end_week: Option<Week>,
) -> Result<()> {
    let ctx = CommandContext::new(options)?;
    let league_key = resolve_league_key(&ctx.client, args.league_key).await?;
    let matchups = ctx
        .client
        .get_weekly_matchups(&league_key, start_week, end_week)
        .await?;

    if args.json {
        println!("{}", to_json(&matchups)?);
    } else {
        print!("{}", format_matchups(&matchups));
    }
    Ok(())
}

/// Matchups for `playoffs`.
///
/// Without an explicit week, a league still in its regular season has no
/// playoff scoreboard yet: that gives no matchups instead of an error.
pub async fn playoff_matchups(
    client: &FantasyClient,
    league_key: &LeagueKey,
    week: Option<Week>,
) -> Result<Vec<Matchup>> {
    match client.get_playoff_scoreboard(league_key, week).await {
        Err(FflError::NotPlayoffWeek {
            week: current,
            playoff_start_week,
        }) if week.is_none() => {
            info!("Week {current} is before the playoffs (week {playoff_start_week}), skipping the scoreboard");
            Ok(Vec::new())
        }
        other => other,
    }
}

/// Matchups of one playoff week and every team's playoff totals.
pub async fn handle_playoffs(
    options: &ContextOptions,
    args: LeagueArgs,
    week: Option<Week>,
) -> Result<()> {
    let ctx = CommandContext::new(options)?;
    let league_key = resolve_league_key(&ctx.client, args.league_key).await?;

    let report = PlayoffReport {
        week,
        matchups: playoff_matchups(&ctx.client, &league_key, week).await?,
        teams: ctx.client.get_all_teams_playoff_stats(&league_key).await?,
    };

    if args.json {
        println!("{}", to_json(&report)?);
    } else {
        if let Some(first) = report.matchups.first() {
            println!("Playoff Week {}:", first.week);
            println!("{}", format_matchups(&report.matchups));
        }
        print!("{}", format_playoff_stats(&report.teams));
    }
    Ok(())
}

/// Cumulative moves, trades and FAAB per team and week.
pub async fn handle_transactions(
    options: &ContextOptions,
    args: LeagueArgs,
    start_week: Option<Week>,
    end_week: Option<Week>,
) -> Result<()> {
    let ctx = CommandContext::new(options)?;
    let league_key = resolve_league_key(&ctx.client, args.league_key).await?;
    let rows = ctx
        .client
        .get_weekly_transaction_stats(&league_key, start_week, end_week)
        .await?;

    if args.json {
        println!("{}", to_json(&rows)?);
    } else {
        print!("{}", format_transaction_stats(&rows));
    }
    Ok(())
}
