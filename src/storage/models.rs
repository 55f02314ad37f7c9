//! Data models for the storage layer

use crate::cli::types::{LeagueKey, Season};
use serde::{Deserialize, Serialize};

/// One row of the prior-season league cache (payload omitted)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub league_key: String,
    pub data_type: String,
    pub cached_at: i64,
    pub size_bytes: usize,
}

/// Manager nickname override for a team whose manager Yahoo hides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NicknameMapping {
    pub team_name: String,
    pub league_key: LeagueKey,
    pub season: Season,
    pub manager_nickname: String,
}
