//! `nickname`: manager nickname overrides for hidden managers.

use super::{
    common::{open_store, ContextOptions},
    format::format_nicknames,
};
use crate::{cli::NicknameCmd, storage::NicknameMapping, Result};

pub fn handle_nickname(options: &ContextOptions, cmd: NicknameCmd) -> Result<()> {
    let store = open_store(options)?;

    match cmd {
        NicknameCmd::Set {
            team_name,
            manager_nickname,
            league_key,
            season,
        } => {
            store.set_nickname(&NicknameMapping {
                team_name: team_name.clone(),
                league_key,
                season,
                manager_nickname: manager_nickname.clone(),
            })?;
            println!("✓ {team_name} is now managed by {manager_nickname}");
        }
        NicknameCmd::List { league_key } => {
            print!("{}", format_nicknames(&store.list_nicknames(league_key.as_ref())?));
        }
        NicknameCmd::Remove {
            team_name,
            league_key,
            season,
        } => {
            if store.remove_nickname(&team_name, &league_key, season)? {
                println!("✓ Removed nickname for {team_name}");
            } else {
                println!("No nickname stored for {team_name} in {league_key} {season}");
            }
        }
    }
    Ok(())
}
