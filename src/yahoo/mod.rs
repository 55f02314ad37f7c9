//! Yahoo Fantasy Sports API: client, response parsing and derived stats.

pub mod compute;
pub mod http;
pub mod parse;
pub mod types;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use http::{FantasyClient, YAHOO_API_BASE_URL};
pub use types::*;
