//! Supported TextArena games.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EnvError;

/// Games the adapter accepts. Anything else is rejected before the engine is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Game {
    /// Team word-guessing game.
    Codenames,
    /// Simultaneous troop allocation over battlefields.
    ColonelBlotto,
    /// Iterated prisoner's dilemma with three players.
    ThreePlayerIpd,
}

/// The allow-list, in canonical order.
pub const SUPPORTED_GAMES: [Game; 3] = [Game::Codenames, Game::ColonelBlotto, Game::ThreePlayerIpd];

impl Game {
    /// Engine-facing identifier.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Codenames => "codenames",
            Self::ColonelBlotto => "colonel_blotto",
            Self::ThreePlayerIpd => "three_player_ipd",
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Game {
    type Err = EnvError;

    /// Case-insensitive lookup.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let name = raw.to_lowercase();
        SUPPORTED_GAMES
            .into_iter()
            .find(|game| game.as_str() == name)
            .ok_or(EnvError::UnsupportedGame(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("CodeNames".parse::<Game>().unwrap(), Game::Codenames);
        assert_eq!(
            "THREE_PLAYER_IPD".parse::<Game>().unwrap(),
            Game::ThreePlayerIpd
        );
    }

    #[test]
    fn unknown_game_reports_lowercased_name() {
        let err = "Chess".parse::<Game>().unwrap_err();
        assert!(matches!(err, EnvError::UnsupportedGame(ref name) if name == "chess"));
        assert_eq!(err.to_string(), "Unsupported TextArena game: chess");
    }
}
