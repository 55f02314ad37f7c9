//! Database schema and connection management

use crate::core::cache::data_dir;
use crate::Result;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Database connection for cached league data and nickname overrides
pub struct LeagueStore {
    pub(crate) conn: Connection,
}

impl LeagueStore {
    /// Open the default database and ensure tables exist
    pub fn open_default() -> Result<Self> {
        Self::open(&Self::database_path())
    }

    /// Open (or create) a database at `path` and ensure tables exist
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// In-memory database, used by tests and `--no-cache` runs
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Path: ~/.cache/yahoo-ffl/league.db
    pub fn database_path() -> PathBuf {
        data_dir().join("league.db")
    }

    /// Initialize the database schema
    pub(crate) fn initialize_schema(&mut self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS league_cache (
                league_key TEXT NOT NULL,
                data_type TEXT NOT NULL,
                payload TEXT NOT NULL,
                cached_at INTEGER NOT NULL,
                PRIMARY KEY (league_key, data_type)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS manager_nicknames (
                team_name TEXT NOT NULL,
                league_key TEXT NOT NULL,
                season INTEGER NOT NULL,
                manager_nickname TEXT NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (team_name, league_key, season)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_league_cache_type
             ON league_cache(data_type)",
            [],
        )?;

        Ok(())
    }
}
