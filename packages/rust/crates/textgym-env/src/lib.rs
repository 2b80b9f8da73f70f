//! textgym-env - TextArena games behind a uniform text environment
//!
//! Wraps a game from an external engine package and exposes it through
//! [`TextEnv`]: `init` seeds a chat transcript with the first observation and
//! `step` turns every move into an assistant message followed by the engine's
//! reply as a user message.
//!
//! # Architecture
//!
//! ```text
//! textgym-env/src/
//! ├── lib.rs        # Re-exports (this file)
//! ├── error.rs      # EnvError enum
//! ├── message.rs    # ChatMessage / Role / Conversation
//! ├── game.rs       # Supported game allow-list
//! ├── config.rs     # EnvConfig, extras, EpisodeConfig resolution
//! ├── engine.rs     # Engine contract, factory probing, module registry
//! ├── process.rs    # Out-of-process engine bridge (JSON lines)
//! ├── env.rs        # TextEnv trait and StepOutput
//! ├── textarena.rs  # TextArenaEnv adapter
//! ├── registry.rs   # env_class -> constructor
//! └── rollout.rs    # Turn-limited episode driver
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use textgym_env::{ChatMessage, EnvConfig, ModuleRegistry, TextArenaEnv, TextEnv};
//!
//! let mut env = TextArenaEnv::new(&EnvConfig::for_game("codenames"), None, &modules)?;
//! let (prompt, _info) = env.init(&[ChatMessage::system("Respond with your move.")])?;
//! let out = env.step("[clue] fruit 2")?;
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod config;
mod engine;
mod env;
mod error;
mod game;
mod message;
mod process;
mod registry;
pub mod rollout;
#[doc(hidden)]
pub mod test_support;
mod textarena;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use config::{DEFAULT_MAX_TURNS, EnvConfig, EpisodeConfig, Extras};
pub use engine::{
    ArenaGame, ArenaModule, FACTORY_CANDIDATES, GameStep, Info, MakeFn, ModuleRegistry,
    ResetOutput, TEXTARENA_PACKAGE, normalize_reset, resolve_factory,
};
pub use env::{StepOutput, TextEnv};
pub use error::{EnvError, EnvResult};
pub use game::{Game, SUPPORTED_GAMES};
pub use message::{ChatMessage, Conversation, Role};
pub use process::{
    EngineCommand, EngineLaunchError, PROCESS_ENTRY_POINT, ProcessGame, ProcessModule,
};
pub use registry::{EnvConstructor, EnvRegistry};
pub use rollout::{EpisodeSummary, run_episode};
pub use textarena::{TEXTARENA_ENV_CLASS, TextArenaEnv};
