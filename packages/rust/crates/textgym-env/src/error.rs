//! Error types for environment construction.
//!
//! Library crates use `thiserror` for explicit error enums. Errors raised by the
//! game engine while an episode runs are plain `anyhow::Error` values and are
//! returned to the caller untouched; they only appear here when the engine fails
//! while the game instance is being created.

use thiserror::Error;

/// Result alias for environment construction.
pub type EnvResult<T> = Result<T, EnvError>;

/// Failures raised while building an environment.
///
/// Configuration variants mean the caller asked for something invalid.
/// Dependency variants mean the engine is not installed or is incompatible.
#[derive(Error, Debug)]
pub enum EnvError {
    /// Neither the environment config nor the extras name a game.
    #[error("`game` field is required in env_config or extras")]
    MissingGame,

    /// The game name is not in the supported set.
    #[error("Unsupported TextArena game: {0}")]
    UnsupportedGame(String),

    /// `max_turns` was present but is not a non-negative integer.
    #[error("`max_turns` must be a non-negative integer, got {0}")]
    InvalidMaxTurns(serde_json::Value),

    /// No environment is registered under this class tag.
    #[error("Unknown environment class: {0}")]
    UnknownEnvClass(String),

    /// The engine package is not available in the module registry.
    #[error("The `{package}` package is required to use this environment")]
    MissingDependency {
        /// Package that was looked up.
        package: String,
    },

    /// The engine package exists but exposes none of the known factory names.
    #[error("Could not locate a game creation function in the `{package}` package")]
    NoFactory {
        /// Package that was probed.
        package: String,
    },

    /// The engine factory itself failed.
    #[error(transparent)]
    Engine(anyhow::Error),
}

impl EnvError {
    /// `true` for failures caused by the engine installation rather than by the
    /// caller's configuration.
    #[must_use]
    pub fn is_dependency_error(&self) -> bool {
        matches!(self, Self::MissingDependency { .. } | Self::NoFactory { .. })
    }

    /// `true` for failures caused by invalid configuration.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::MissingGame
                | Self::UnsupportedGame(_)
                | Self::InvalidMaxTurns(_)
                | Self::UnknownEnvClass(_)
        )
    }
}
