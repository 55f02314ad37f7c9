//! Entry point: parse CLI and dispatch to command handlers.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use yahoo_ffl::{
    cli::{Commands, YahooFfl},
    commands::{
        auth::handle_auth,
        cache::handle_cache,
        league::{
            handle_matchups, handle_playoffs, handle_run, handle_standings, handle_transactions,
        },
        nickname::handle_nickname,
        serve::handle_serve,
        ContextOptions,
    },
    logging, FflError,
};

/// Run the CLI.
#[tokio::main]
async fn main() -> ExitCode {
    let app = YahooFfl::parse();
    logging::init(app.global.verbose);

    match run(app).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            // Auth errors already name the fix; a lingering 401 does not.
            if let Some(FflError::Api(api)) = e.downcast_ref::<FflError>() {
                if api.status() == Some(401) {
                    eprintln!("Run `yahoo-ffl auth` to authorize again.");
                }
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(app: YahooFfl) -> anyhow::Result<()> {
    let options = ContextOptions::from_global(&app.global);

    match app.command {
        Commands::Auth { code } => handle_auth(&options, code)
            .await
            .context("authorization failed")?,

        Commands::Run { league } => handle_run(&options, league).await?,

        Commands::Standings { league } => handle_standings(&options, league).await?,

        Commands::Matchups {
            league,
            start_week,
            end_week,
        } => handle_matchups(&options, league, start_week, end_week).await?,

        Commands::Playoffs { league, week } => handle_playoffs(&options, league, week).await?,

        Commands::Transactions {
            league,
            start_week,
            end_week,
        } => handle_transactions(&options, league, start_week, end_week).await?,

        Commands::Serve {
            league_key,
            host,
            port,
        } => handle_serve(&options, league_key, &host, port)
            .await
            .with_context(|| format!("web server on {host}:{port} failed"))?,

        Commands::Nickname { cmd } => handle_nickname(&options, cmd)?,

        Commands::Cache { cmd } => handle_cache(&options, cmd)?,
    }

    Ok(())
}
