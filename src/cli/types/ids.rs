//! Key types for Yahoo Fantasy resources.
//!
//! Yahoo identifies games, leagues and teams with dotted keys:
//! `449` (game), `449.l.12345` (league), `449.l.12345.t.3` (team).

use crate::error::{FflError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn is_number(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

/// Type-safe wrapper for Yahoo game keys (one game per sport and season).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameKey(String);

impl GameKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for GameKey {
    type Err = FflError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        // Game keys are numeric ids, or sport codes such as `nfl` for the current season.
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(FflError::InvalidKey {
                kind: "game",
                value: s.to_string(),
            });
        }
        Ok(Self(s.to_string()))
    }
}

/// Type-safe wrapper for Yahoo league keys (`{game}.l.{league_id}`).
///
/// # Examples
///
/// ```rust
/// use yahoo_ffl::LeagueKey;
///
/// let key: LeagueKey = "449.l.12345".parse().unwrap();
/// assert_eq!(key.game_key(), "449");
/// assert_eq!(key.league_id(), "12345");
/// assert!("449.12345".parse::<LeagueKey>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LeagueKey(String);

impl LeagueKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn game_key(&self) -> &str {
        self.0.split('.').next().unwrap_or_default()
    }

    pub fn league_id(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or_default()
    }
}

impl fmt::Display for LeagueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LeagueKey {
    type Err = FflError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            [game, "l", id] if is_number(game) && is_number(id) => Ok(Self(s.to_string())),
            _ => Err(FflError::InvalidKey {
                kind: "league",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for LeagueKey {
    type Error = FflError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<LeagueKey> for String {
    fn from(key: LeagueKey) -> Self {
        key.0
    }
}

/// Type-safe wrapper for Yahoo team keys (`{game}.l.{league_id}.t.{team_id}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TeamKey(String);

impl TeamKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The league this team belongs to.
    pub fn league_key(&self) -> LeagueKey {
        let mut parts = self.0.splitn(4, '.');
        let game = parts.next().unwrap_or_default();
        let _ = parts.next();
        let league = parts.next().unwrap_or_default();
        LeagueKey(format!("{game}.l.{league}"))
    }

    pub fn team_id(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or_default()
    }
}

impl fmt::Display for TeamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TeamKey {
    type Err = FflError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            [game, "l", league, "t", team]
                if is_number(game) && is_number(league) && is_number(team) =>
            {
                Ok(Self(s.to_string()))
            }
            _ => Err(FflError::InvalidKey {
                kind: "team",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for TeamKey {
    type Error = FflError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TeamKey> for String {
    fn from(key: TeamKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_league_key_parse() {
        let key: LeagueKey = "449.l.621700".parse().unwrap();
        assert_eq!(key.as_str(), "449.l.621700");
        assert_eq!(key.game_key(), "449");
        assert_eq!(key.league_id(), "621700");
        assert_eq!(key.to_string(), "449.l.621700");
    }

    #[test]
    fn test_league_key_trims_whitespace() {
        let key: LeagueKey = "  449.l.1 \n".parse().unwrap();
        assert_eq!(key.as_str(), "449.l.1");
    }

    #[test]
    fn test_league_key_rejects_bad_shapes() {
        for bad in ["", "449", "449.l", "449.t.1", "nfl.l.1", "449.l.1.t.2", "449.l.x"] {
            let err = bad.parse::<LeagueKey>().unwrap_err();
            match err {
                FflError::InvalidKey { kind, .. } => assert_eq!(kind, "league"),
                other => panic!("Expected InvalidKey, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_team_key_league_key() {
        let team: TeamKey = "449.l.621700.t.3".parse().unwrap();
        assert_eq!(team.team_id(), "3");
        assert_eq!(team.league_key().as_str(), "449.l.621700");
    }

    #[test]
    fn test_team_key_rejects_league_key() {
        assert!("449.l.621700".parse::<TeamKey>().is_err());
    }

    #[test]
    fn test_league_key_serde_round_trip_validates() {
        let key: LeagueKey = serde_json::from_str("\"449.l.5\"").unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"449.l.5\"");
        assert!(serde_json::from_str::<LeagueKey>("\"garbage\"").is_err());
    }

    #[test]
    fn test_game_key_parse() {
        assert_eq!("449".parse::<GameKey>().unwrap().as_str(), "449");
        assert_eq!("nfl".parse::<GameKey>().unwrap().as_str(), "nfl");
        assert!("44.9".parse::<GameKey>().is_err());
    }
}
