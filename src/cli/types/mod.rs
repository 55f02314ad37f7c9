//! Type-safe wrappers for Yahoo Fantasy keys, seasons and weeks.

pub mod ids;
pub mod time;

pub use ids::{GameKey, LeagueKey, TeamKey};
pub use time::{Season, Week};
