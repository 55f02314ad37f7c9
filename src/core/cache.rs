//! Two-tier league cache plus file helpers.
//!
//! - L1: in-memory LRU keyed by league and data type
//! - L2: the SQLite `league_cache` table (see `storage`)
//!
//! Only data of finished seasons is written here, so entries never go stale
//! and nothing expires on its own. `yahoo-ffl cache clear` removes them.

use lru::LruCache;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{
    fs,
    io::{Read, Write},
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{debug, warn};

use crate::storage::SharedStore;
use crate::LeagueKey;

/// Path: ~/.cache/yahoo-ffl
pub fn data_dir() -> PathBuf {
    let base = dirs::cache_dir().unwrap_or_else(|| {
        let mut home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.push(".cache");
        home
    });
    base.join("yahoo-ffl")
}

/// Try to read a file into a String
pub fn try_read_to_string(path: &Path) -> Option<String> {
    let mut f = fs::File::open(path).ok()?;
    let mut s = String::new();

    f.read_to_string(&mut s).ok()?;

    Some(s)
}

/// Write a string next to `path` and rename it into place.
///
/// Readers see either the old or the new contents, never a torn file.
pub fn write_string_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(format!(".{}.tmp", uuid::Uuid::new_v4().simple()));
    let tmp = path.with_file_name(tmp_name);

    let result = (|| -> std::io::Result<()> {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(contents.as_bytes())?;
        f.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

/// Kinds of league data kept in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CachedData {
    LeagueInfo,
    Standings,
    Scoreboard(u16),
    Transactions,
}

impl CachedData {
    /// Name stored in the `data_type` column.
    pub fn data_type(&self) -> String {
        match self {
            CachedData::LeagueInfo => "league_info".to_string(),
            CachedData::Standings => "standings".to_string(),
            CachedData::Scoreboard(week) => format!("scoreboard_w{week}"),
            CachedData::Transactions => "transactions".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LeagueCacheKey {
    pub league_key: LeagueKey,
    pub data: CachedData,
}

impl LeagueCacheKey {
    pub fn new(league_key: &LeagueKey, data: CachedData) -> Self {
        Self {
            league_key: league_key.clone(),
            data,
        }
    }
}

/// Bounded in-memory LRU map.
pub struct MemoryCache<K, V>
where
    K: std::hash::Hash + Eq,
{
    entries: Mutex<LruCache<K, V>>,
    capacity: usize,
}

impl<K, V> MemoryCache<K, V>
where
    K: std::hash::Hash + Eq,
    V: Clone,
{
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
            capacity: cap.get(),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    pub fn put(&self, key: K, value: V) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.put(key, value);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    /// (entries, capacity)
    pub fn stats(&self) -> (usize, usize) {
        let len = self.entries.lock().map(|e| e.len()).unwrap_or(0);
        (len, self.capacity)
    }
}

/// Prior-season league cache: LRU in front of the SQLite store.
pub struct LeagueCache {
    memory: MemoryCache<LeagueCacheKey, Value>,
    store: SharedStore,
}

impl LeagueCache {
    pub fn new(store: SharedStore, memory_capacity: usize) -> Self {
        Self {
            memory: MemoryCache::new(memory_capacity),
            store,
        }
    }

    /// Get an item (memory first, then the database). Unreadable entries count as misses.
    pub fn get<T: DeserializeOwned>(&self, key: &LeagueCacheKey) -> Option<T> {
        let value = match self.memory.get(key) {
            Some(value) => value,
            None => {
                let stored = {
                    let store = self.store.lock().ok()?;
                    store.get_cached_payload(key.league_key.as_str(), &key.data.data_type())
                };
                let value = match stored {
                    Ok(Some(payload)) => serde_json::from_str::<Value>(&payload).ok()?,
                    Ok(None) => return None,
                    Err(e) => {
                        warn!("Reading league cache failed: {e}");
                        return None;
                    }
                };
                self.memory.put(key.clone(), value.clone());
                value
            }
        };

        match serde_json::from_value(value) {
            Ok(parsed) => {
                debug!(
                    "Cache hit for {} {}",
                    key.league_key,
                    key.data.data_type()
                );
                Some(parsed)
            }
            Err(e) => {
                warn!("Ignoring unreadable cache entry: {e}");
                None
            }
        }
    }

    /// Put an item into both tiers. Failures are logged, not returned.
    pub fn put<T: Serialize>(&self, key: LeagueCacheKey, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                warn!("Could not serialize cache entry: {e}");
                return;
            }
        };

        if let Ok(store) = self.store.lock() {
            if let Err(e) = store.put_cached_payload(
                key.league_key.as_str(),
                &key.data.data_type(),
                &value.to_string(),
            ) {
                warn!("Writing league cache failed: {e}");
            }
        }

        self.memory.put(key, value);
    }

    pub fn clear_memory(&self) {
        self.memory.clear();
    }

    pub fn memory_stats(&self) -> (usize, usize) {
        self.memory.stats()
    }
}
