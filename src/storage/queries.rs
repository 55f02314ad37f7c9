//! League cache and nickname queries

use super::{models::*, schema::LeagueStore};
use crate::cli::types::{LeagueKey, Season};
use crate::Result;
use rusqlite::{params, OptionalExtension, Row};

impl LeagueStore {
    /// Raw JSON payload for one cached data type of a league
    pub fn get_cached_payload(&self, league_key: &str, data_type: &str) -> Result<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM league_cache WHERE league_key = ? AND data_type = ?",
                params![league_key, data_type],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(payload)
    }

    /// Insert or replace a cached payload
    pub fn put_cached_payload(&self, league_key: &str, data_type: &str, payload: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        self.conn.execute(
            "INSERT OR REPLACE INTO league_cache (league_key, data_type, payload, cached_at)
             VALUES (?, ?, ?, ?)",
            params![league_key, data_type, payload, now],
        )?;
        Ok(())
    }

    /// List cache entries, optionally for a single league
    pub fn list_cache_entries(&self, league_key: Option<&str>) -> Result<Vec<CacheEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT league_key, data_type, cached_at, LENGTH(payload) FROM league_cache
             WHERE (?1 IS NULL OR league_key = ?1)
             ORDER BY league_key, data_type",
        )?;

        let rows = stmt.query_map(params![league_key], |row| {
            Ok(CacheEntry {
                league_key: row.get(0)?,
                data_type: row.get(1)?,
                cached_at: row.get(2)?,
                size_bytes: row.get::<_, i64>(3)? as usize,
            })
        })?;

        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Delete cache rows matching the given filters; `None` matches everything.
    /// Returns the number of rows removed.
    pub fn clear_cache(&self, league_key: Option<&str>, data_type: Option<&str>) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM league_cache
             WHERE (?1 IS NULL OR league_key = ?1)
               AND (?2 IS NULL OR data_type = ?2)",
            params![league_key, data_type],
        )?;
        Ok(removed)
    }

    /// Insert or update a manager nickname override
    pub fn set_nickname(&self, mapping: &NicknameMapping) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        self.conn.execute(
            "INSERT OR REPLACE INTO manager_nicknames
             (team_name, league_key, season, manager_nickname, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            params![
                mapping.team_name,
                mapping.league_key.as_str(),
                mapping.season.as_u16(),
                mapping.manager_nickname,
                now
            ],
        )?;
        Ok(())
    }

    /// Nickname override for a team in a given league season
    pub fn get_nickname(
        &self,
        team_name: &str,
        league_key: &LeagueKey,
        season: Season,
    ) -> Result<Option<String>> {
        let nickname = self
            .conn
            .query_row(
                "SELECT manager_nickname FROM manager_nicknames
                 WHERE team_name = ? AND league_key = ? AND season = ?",
                params![team_name, league_key.as_str(), season.as_u16()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(nickname)
    }

    /// All overrides, optionally restricted to one league
    pub fn list_nicknames(&self, league_key: Option<&LeagueKey>) -> Result<Vec<NicknameMapping>> {
        let mut stmt = self.conn.prepare(
            "SELECT team_name, league_key, season, manager_nickname FROM manager_nicknames
             WHERE (?1 IS NULL OR league_key = ?1)
             ORDER BY league_key, season, team_name",
        )?;

        let rows = stmt.query_map(
            params![league_key.map(|k| k.as_str())],
            Self::row_to_nickname,
        )?;

        let mut mappings = Vec::new();
        for row in rows {
            // Rows with an unparseable league key are skipped.
            if let Some(mapping) = row? {
                mappings.push(mapping);
            }
        }
        Ok(mappings)
    }

    /// Remove an override. Returns true if a row was deleted.
    pub fn remove_nickname(
        &self,
        team_name: &str,
        league_key: &LeagueKey,
        season: Season,
    ) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM manager_nicknames
             WHERE team_name = ? AND league_key = ? AND season = ?",
            params![team_name, league_key.as_str(), season.as_u16()],
        )?;
        Ok(removed > 0)
    }

    fn row_to_nickname(row: &Row) -> rusqlite::Result<Option<NicknameMapping>> {
        let league_key: String = row.get(1)?;
        let Ok(league_key) = league_key.parse::<LeagueKey>() else {
            return Ok(None);
        };
        Ok(Some(NicknameMapping {
            team_name: row.get(0)?,
            league_key,
            season: Season::new(row.get(2)?),
            manager_nickname: row.get(3)?,
        }))
    }
}
