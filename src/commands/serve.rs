//! `serve`: the web dashboard.

use tracing::info;

use super::common::{resolve_league_key, CommandContext, ContextOptions};
use crate::{web, LeagueKey, Result};

pub async fn handle_serve(
    options: &ContextOptions,
    league_key: Option<LeagueKey>,
    host: &str,
    port: u16,
) -> Result<()> {
    let ctx = CommandContext::new(options)?;
    let league_key = resolve_league_key(&ctx.client, league_key).await?;
    info!("Serving league {league_key}");

    web::serve(web::AppState::new(ctx.client, league_key), host, port).await
}
