//! CLI argument definitions and parsing.

pub mod types;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use types::{LeagueKey, Season, Week};

/// Options shared by every subcommand.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Log more (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Ignore cached prior-season data (fresh responses are still cached).
    #[clap(long, global = true)]
    pub refresh: bool,

    /// Credentials file (or set `YAHOO_FFL_CREDENTIALS`). Default: ./credentials.json
    #[clap(long, global = true)]
    pub credentials: Option<PathBuf>,

    /// Token file (or set `YAHOO_FFL_TOKEN_FILE`).
    #[clap(long, global = true)]
    pub token_file: Option<PathBuf>,
}

/// League selection and output format.
#[derive(Debug, Args)]
pub struct LeagueArgs {
    /// League key such as `449.l.621700` (or set `YAHOO_FFL_LEAGUE_KEY`).
    /// Defaults to your most recent football league.
    #[clap(long, short)]
    pub league_key: Option<LeagueKey>,

    /// Output results as JSON instead of tables.
    #[clap(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
#[clap(
    name = "yahoo-ffl",
    version,
    about = "Yahoo Fantasy Football league stats"
)]
pub struct YahooFfl {
    #[clap(flatten)]
    pub global: GlobalArgs,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Authorize this app with Yahoo (OAuth 2.0 authorization code flow).
    ///
    /// Prints the authorization URL and reads the code from stdin unless
    /// `--code` is given.
    Auth {
        /// Authorization code shown by Yahoo after granting access.
        #[clap(long)]
        code: Option<String>,
    },

    /// Print league info, teams, the standings summary and weekly matchups.
    Run {
        #[clap(flatten)]
        league: LeagueArgs,
    },

    /// Standings with expected wins/losses from all-play records.
    Standings {
        #[clap(flatten)]
        league: LeagueArgs,
    },

    /// Weekly matchups with scores, winners and all-play records.
    Matchups {
        #[clap(flatten)]
        league: LeagueArgs,

        /// First week (default: the league's start week).
        #[clap(long)]
        start_week: Option<Week>,

        /// Last week (default: the league's end week, capped at the current week).
        #[clap(long)]
        end_week: Option<Week>,
    },

    /// Playoff matchups for one week plus per-team playoff totals.
    Playoffs {
        #[clap(flatten)]
        league: LeagueArgs,

        /// Playoff week (default: the current week).
        #[clap(long, short)]
        week: Option<Week>,
    },

    /// Cumulative roster moves, trades and FAAB per team and week.
    Transactions {
        #[clap(flatten)]
        league: LeagueArgs,

        /// First week (default: the league's start week).
        #[clap(long)]
        start_week: Option<Week>,

        /// Last week (default: the league's end week, capped at the current week).
        #[clap(long)]
        end_week: Option<Week>,
    },

    /// Serve the league dashboard over HTTP.
    Serve {
        /// League key (or set `YAHOO_FFL_LEAGUE_KEY`).
        #[clap(long, short)]
        league_key: Option<LeagueKey>,

        #[clap(long, default_value = "127.0.0.1")]
        host: String,

        #[clap(long, default_value_t = 5000)]
        port: u16,
    },

    /// Manage manager nickname overrides for hidden managers.
    Nickname {
        #[clap(subcommand)]
        cmd: NicknameCmd,
    },

    /// Inspect or clear the prior-season league cache.
    Cache {
        #[clap(subcommand)]
        cmd: CacheCmd,
    },
}

#[derive(Debug, Subcommand)]
pub enum NicknameCmd {
    /// Set the nickname shown for a team's manager.
    Set {
        /// Team name exactly as Yahoo shows it.
        team_name: String,

        manager_nickname: String,

        #[clap(long, short)]
        league_key: LeagueKey,

        #[clap(long, short)]
        season: Season,
    },

    /// List stored nicknames.
    List {
        #[clap(long, short)]
        league_key: Option<LeagueKey>,
    },

    /// Remove a stored nickname.
    Remove {
        team_name: String,

        #[clap(long, short)]
        league_key: LeagueKey,

        #[clap(long, short)]
        season: Season,
    },
}

#[derive(Debug, Subcommand)]
pub enum CacheCmd {
    /// List cached entries.
    List {
        #[clap(long, short)]
        league_key: Option<String>,
    },

    /// Delete cached entries (all by default).
    Clear {
        #[clap(long, short)]
        league_key: Option<String>,

        /// Data type such as `standings`, `league_info` or `scoreboard_w3`.
        #[clap(long)]
        data_type: Option<String>,
    },
}
