//! `cache`: inspect and clear the prior-season league cache.

use super::{
    common::{open_store, ContextOptions},
    format::format_cache_entries,
};
use crate::{cli::CacheCmd, Result};

pub fn handle_cache(options: &ContextOptions, cmd: CacheCmd) -> Result<()> {
    let store = open_store(options)?;

    match cmd {
        CacheCmd::List { league_key } => {
            print!(
                "{}",
                format_cache_entries(&store.list_cache_entries(league_key.as_deref())?)
            );
        }
        CacheCmd::Clear {
            league_key,
            data_type,
        } => {
            let removed = store.clear_cache(league_key.as_deref(), data_type.as_deref())?;
            println!("✓ Removed {removed} cached entries");
        }
    }
    Ok(())
}
