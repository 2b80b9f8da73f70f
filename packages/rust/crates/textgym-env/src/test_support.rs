//! Scripted engine for integration tests.
//!
//! `ScriptedModule` stands in for an installed engine package: it exposes one
//! entry point, records every factory call, and hands out games that replay a
//! fixed reset result and step sequence.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::bail;

use crate::config::Extras;
use crate::engine::{ArenaGame, ArenaModule, GameStep, Info, MakeFn, ResetOutput};

/// One factory call seen by a [`ScriptedModule`].
#[derive(Debug, Clone, PartialEq)]
pub struct MakeCall {
    /// Game name passed to the factory.
    pub game: String,
    /// Keyword arguments passed to the factory.
    pub kwargs: Extras,
}

#[derive(Debug, Clone)]
enum ResetScript {
    Fixed(ResetOutput),
    GameName,
}

/// Engine package replaying a script.
#[derive(Clone)]
pub struct ScriptedModule {
    entry_point: &'static str,
    reset: ResetScript,
    steps: Vec<GameStep>,
    step_error: Option<String>,
    calls: Arc<Mutex<Vec<MakeCall>>>,
}

impl ScriptedModule {
    /// Module whose games observe `reset_observation` and then follow `steps`.
    #[must_use]
    pub fn new(reset_observation: &str, steps: Vec<GameStep>) -> Self {
        Self {
            entry_point: "make",
            reset: ResetScript::Fixed(ResetOutput::Observation(reset_observation.to_string())),
            steps,
            step_error: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Games whose first observation is `Welcome to <game>`.
    #[must_use]
    pub fn echoing_game_name() -> Self {
        Self {
            reset: ResetScript::GameName,
            ..Self::new("", Vec::new())
        }
    }

    /// Return `(observation, info)` from reset instead of a bare observation.
    #[must_use]
    pub fn with_reset_info(mut self, info: Info) -> Self {
        let observation = match self.reset {
            ResetScript::Fixed(
                ResetOutput::Observation(observation) | ResetOutput::WithInfo(observation, _),
            ) => observation,
            ResetScript::GameName => String::new(),
        };
        self.reset = ResetScript::Fixed(ResetOutput::WithInfo(observation, info));
        self
    }

    /// Expose the factory under a different entry point name.
    #[must_use]
    pub fn with_entry_point(mut self, name: &'static str) -> Self {
        self.entry_point = name;
        self
    }

    /// Every step fails with `message`.
    #[must_use]
    pub fn with_step_error(mut self, message: &str) -> Self {
        self.step_error = Some(message.to_string());
        self
    }

    /// Factory calls made so far.
    #[must_use]
    pub fn calls(&self) -> Vec<MakeCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl ArenaModule for ScriptedModule {
    fn entry_point(&self, name: &str) -> Option<MakeFn> {
        if name != self.entry_point {
            return None;
        }
        let script = self.clone();
        let make: MakeFn = Arc::new(
            move |game: &str, kwargs: &Extras| -> anyhow::Result<Box<dyn ArenaGame>> {
                if let Ok(mut calls) = script.calls.lock() {
                    calls.push(MakeCall {
                        game: game.to_string(),
                        kwargs: kwargs.clone(),
                    });
                }
                Ok(Box::new(ScriptedGame {
                    game: game.to_string(),
                    reset: script.reset.clone(),
                    steps: script.steps.iter().cloned().collect(),
                    step_error: script.step_error.clone(),
                }))
            },
        );
        Some(make)
    }
}

/// Game instance created by [`ScriptedModule`].
#[derive(Debug)]
pub struct ScriptedGame {
    game: String,
    reset: ResetScript,
    steps: VecDeque<GameStep>,
    step_error: Option<String>,
}

impl ArenaGame for ScriptedGame {
    fn reset(&mut self) -> anyhow::Result<ResetOutput> {
        Ok(match &self.reset {
            ResetScript::Fixed(output) => output.clone(),
            ResetScript::GameName => ResetOutput::Observation(format!("Welcome to {}", self.game)),
        })
    }

    fn step(&mut self, action: &str) -> anyhow::Result<GameStep> {
        if let Some(message) = &self.step_error {
            bail!("{message}");
        }
        Ok(self.steps.pop_front().unwrap_or_else(|| GameStep {
            observation: format!("{} ignored {action}", self.game),
            reward: 0.0,
            done: false,
            info: Info::new(),
        }))
    }
}

/// Step result helper.
#[must_use]
pub fn game_step(observation: &str, reward: f64, done: bool) -> GameStep {
    GameStep {
        observation: observation.to_string(),
        reward,
        done,
        info: Info::new(),
    }
}
