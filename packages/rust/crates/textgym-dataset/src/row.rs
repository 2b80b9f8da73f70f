//! Dataset row layout and fixed generation constants.

use serde::{Deserialize, Serialize};
use textgym_env::{ChatMessage, Conversation, Game};

/// Games cycled through, in order, when generating rows.
pub const GAMES: [Game; 3] = [Game::Codenames, Game::ColonelBlotto, Game::ThreePlayerIpd];

/// System prompt placed before every game's first observation.
pub const SYSTEM_PROMPT: &str = "You are playing a TextArena game. Respond with your move.";

/// Turn ceiling recorded in every row.
pub const DATASET_MAX_TURNS: i64 = 20;

/// Name of the training split file.
pub const TRAIN_FILE: &str = "train.parquet";

/// Name of the validation split file.
pub const VALIDATION_FILE: &str = "validation.parquet";

/// One training prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRow {
    /// System prompt plus the game's first observation.
    pub prompt: Conversation,
    /// Environment class used to rebuild the environment at training time.
    pub env_class: String,
    /// Game identifier.
    pub game: String,
    /// Turn ceiling for the episode.
    pub max_turns: i64,
}

/// Game used for the `index`-th row.
#[must_use]
pub fn game_for_index(index: usize) -> Game {
    GAMES[index % GAMES.len()]
}

/// Prompt handed to `init` for every row.
#[must_use]
pub fn system_prompt() -> ChatMessage {
    ChatMessage::system(SYSTEM_PROMPT)
}
