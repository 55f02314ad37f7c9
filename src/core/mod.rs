//! Core utilities for the Yahoo Fantasy Football CLI
//!
//! - `cache`: data directory, file helpers and the prior-season league cache

pub mod cache;

// Re-export commonly used items for convenience
pub use cache::{
    data_dir, try_read_to_string, write_string_atomic, CachedData, LeagueCache,
    LeagueCacheKey, MemoryCache,
};
