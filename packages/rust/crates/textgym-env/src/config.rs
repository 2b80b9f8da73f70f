//! Environment configuration and per-episode settings.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{EnvError, EnvResult};
use crate::game::Game;

/// Per-sample keyword arguments. Anything other than `game` and `max_turns` is
/// forwarded verbatim to the engine.
pub type Extras = Map<String, Value>;

/// Turn ceiling used when the extras do not set one.
pub const DEFAULT_MAX_TURNS: u32 = 20;

const GAME_KEY: &str = "game";
const MAX_TURNS_KEY: &str = "max_turns";

/// Environment-level configuration shared by every sample of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Game selected for every episode; per-sample extras are used when the key is
    /// absent. A present key always wins, even when it is `null` or not a string.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub game: Option<Value>,
    /// Remaining keys, kept for environments that read them.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl EnvConfig {
    /// Config pinned to one game.
    #[must_use]
    pub fn for_game(game: impl Into<String>) -> Self {
        Self {
            game: Some(Value::String(game.into())),
            other: Map::new(),
        }
    }
}

// keeps an explicit `null` as `Some(Value::Null)` so key presence is preserved
fn present_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

fn game_name(value: Value) -> String {
    match value {
        Value::String(game) => game,
        other => other.to_string(),
    }
}

/// Immutable settings resolved once when an environment is built.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeConfig {
    /// Validated game.
    pub game: Game,
    /// Turn ceiling reported to orchestrators.
    pub max_turns: u32,
    /// Engine keyword arguments (never contains `game` or `max_turns`).
    pub game_kwargs: Extras,
}

impl EpisodeConfig {
    /// Resolve the game and turn ceiling from the config and the extras.
    ///
    /// The config's `game` wins; otherwise `game` is taken out of the extras.
    ///
    /// # Errors
    ///
    /// - [`EnvError::MissingGame`] when no game is named anywhere.
    /// - [`EnvError::UnsupportedGame`] when the name is not in the allow-list.
    /// - [`EnvError::InvalidMaxTurns`] when `max_turns` is not a non-negative integer.
    pub fn resolve(env_config: &EnvConfig, extras: Option<Extras>) -> EnvResult<Self> {
        let mut extras = extras.unwrap_or_default();

        let raw_game = match (&env_config.game, extras.remove(GAME_KEY)) {
            (Some(game), _) => game_name(game.clone()),
            (None, Some(game)) => game_name(game),
            (None, None) => return Err(EnvError::MissingGame),
        };
        let game: Game = raw_game.parse()?;

        let max_turns = match extras.remove(MAX_TURNS_KEY) {
            None => DEFAULT_MAX_TURNS,
            Some(value) => value
                .as_u64()
                .and_then(|turns| u32::try_from(turns).ok())
                .ok_or(EnvError::InvalidMaxTurns(value))?,
        };

        Ok(Self {
            game,
            max_turns,
            game_kwargs: extras,
        })
    }
}
