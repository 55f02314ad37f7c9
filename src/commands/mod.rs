//! Command implementations for the Yahoo Fantasy Football CLI

pub mod auth;
pub mod cache;
pub mod common;
pub mod format;
pub mod league;
pub mod nickname;
pub mod serve;


pub use common::{configured_league_key, resolve_league_key, CommandContext, ContextOptions};
