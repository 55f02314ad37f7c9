//! Storage layer for the Yahoo Fantasy Football CLI
//!
//! A small SQLite database under the cache directory, organized into:
//! - `models`: Data structures
//! - `schema`: Database connection and schema management
//! - `queries`: League cache and manager nickname operations

pub mod models;
pub mod queries;
pub mod schema;


use std::sync::{Arc, Mutex};

// Re-export the main types and database struct for easy access
pub use models::*;
pub use schema::LeagueStore;

/// Store handle shared between the API client and the web server.
pub type SharedStore = Arc<Mutex<LeagueStore>>;
