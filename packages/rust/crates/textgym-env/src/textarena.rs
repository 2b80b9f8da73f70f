//! TextArena adapter.
//!
//! Pairs the acting model with a TextArena game. Only the games in
//! [`SUPPORTED_GAMES`](crate::SUPPORTED_GAMES) are accepted. The game is chosen by
//! the environment config or, per sample, by the `game` extra. `max_turns` sets the
//! ceiling reported to orchestrators; all other extras go to the game factory.

use std::fmt;

use crate::config::{EnvConfig, EpisodeConfig, Extras};
use crate::engine::{
    ArenaGame, Info, ModuleRegistry, TEXTARENA_PACKAGE, normalize_reset, resolve_factory,
};
use crate::env::{StepOutput, TextEnv};
use crate::error::{EnvError, EnvResult};
use crate::game::Game;
use crate::message::{ChatMessage, Conversation};
use crate::process::EngineLaunchError;

/// Environment class tag used in datasets and the environment registry.
pub const TEXTARENA_ENV_CLASS: &str = "textarena";

/// One TextArena game behind the [`TextEnv`] interface.
pub struct TextArenaEnv {
    config: EpisodeConfig,
    game: Box<dyn ArenaGame>,
    chat_history: Conversation,
    turns: u32,
}

impl TextArenaEnv {
    /// Validate the configuration, resolve the engine factory and create the game.
    ///
    /// Configuration is checked before the engine is looked up, so an unsupported
    /// game never reaches it.
    ///
    /// # Errors
    ///
    /// Configuration errors from [`EpisodeConfig::resolve`], dependency errors when
    /// the `textarena` package is missing or incompatible (including an engine program
    /// that does not exist), and [`EnvError::Engine`] when the factory fails.
    pub fn new(
        env_config: &EnvConfig,
        extras: Option<Extras>,
        modules: &ModuleRegistry,
    ) -> EnvResult<Self> {
        let config = EpisodeConfig::resolve(env_config, extras)?;

        let module = modules.import(TEXTARENA_PACKAGE)?;
        let make = resolve_factory(TEXTARENA_PACKAGE, module.as_ref())?;
        let game = make(config.game.as_str(), &config.game_kwargs).map_err(factory_error)?;

        tracing::debug!(
            game = %config.game,
            max_turns = config.max_turns,
            kwargs = config.game_kwargs.len(),
            "created textarena game"
        );

        Ok(Self {
            config,
            game,
            chat_history: Conversation::new(),
            turns: 0,
        })
    }

    /// Selected game.
    #[must_use]
    pub fn game(&self) -> Game {
        self.config.game
    }

    /// Resolved episode settings.
    #[must_use]
    pub fn episode_config(&self) -> &EpisodeConfig {
        &self.config
    }

    /// Full transcript: the init prompt, then actions and observations in call order.
    #[must_use]
    pub fn chat_history(&self) -> &[ChatMessage] {
        &self.chat_history
    }
}

impl TextEnv for TextArenaEnv {
    fn init(&mut self, prompt: &[ChatMessage]) -> anyhow::Result<(Conversation, Info)> {
        let (observation, info) = normalize_reset(self.game.reset()?);

        self.chat_history = prompt.to_vec();
        let mut conversation = prompt.to_vec();
        if let Some(first) = ChatMessage::observation(observation) {
            self.chat_history.push(first.clone());
            conversation.push(first);
        }
        tracing::debug!(
            game = %self.config.game,
            messages = conversation.len(),
            "episode initialized"
        );
        Ok((conversation, info))
    }

    fn step(&mut self, action: &str) -> anyhow::Result<StepOutput> {
        self.turns += 1;
        self.chat_history.push(ChatMessage::assistant(action));

        let step = self.game.step(action)?;
        let observations: Vec<ChatMessage> = ChatMessage::observation(step.observation)
            .into_iter()
            .collect();
        self.chat_history.extend(observations.iter().cloned());

        tracing::debug!(
            game = %self.config.game,
            turn = self.turns,
            reward = step.reward,
            done = step.done,
            "step applied"
        );

        Ok(StepOutput {
            observations,
            reward: step.reward,
            done: step.done,
            metadata: step.info,
            postprocessed_action: Some(action.to_string()),
        })
    }

    fn close(&mut self) -> anyhow::Result<()> {
        self.game.close()
    }

    fn turns(&self) -> u32 {
        self.turns
    }

    fn max_turns(&self) -> u32 {
        self.config.max_turns
    }
}

/// A missing engine binary means the package is not installed; anything else is an
/// engine failure.
fn factory_error(error: anyhow::Error) -> EnvError {
    match error.downcast_ref::<EngineLaunchError>() {
        Some(launch) if launch.is_not_found() => {
            tracing::warn!(error = %launch, "textarena engine program not found");
            EnvError::MissingDependency {
                package: TEXTARENA_PACKAGE.to_string(),
            }
        }
        _ => EnvError::Engine(error),
    }
}

impl fmt::Debug for TextArenaEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextArenaEnv")
            .field("config", &self.config)
            .field("turns", &self.turns)
            .field("chat_history", &self.chat_history.len())
            .finish_non_exhaustive()
    }
}
