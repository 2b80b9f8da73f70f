//! Uniform text environment interface used by training loops.

use serde::{Deserialize, Serialize};

use crate::engine::Info;
use crate::message::{ChatMessage, Conversation};

/// What one `step` produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutput {
    /// New messages for the transcript (zero or one for TextArena).
    pub observations: Vec<ChatMessage>,
    /// Reward for the action.
    pub reward: f64,
    /// Whether the episode has finished.
    pub done: bool,
    /// Environment metadata.
    pub metadata: Info,
    /// The action after any environment-specific rewriting.
    pub postprocessed_action: Option<String>,
}

/// A multi-turn environment that speaks chat messages.
pub trait TextEnv {
    /// Start an episode. `prompt` holds the caller's setup messages; the returned
    /// conversation extends it with the first observation, if any.
    ///
    /// # Errors
    ///
    /// Whatever the underlying game raises.
    fn init(&mut self, prompt: &[ChatMessage]) -> anyhow::Result<(Conversation, Info)>;

    /// Apply one action.
    ///
    /// # Errors
    ///
    /// Whatever the underlying game raises.
    fn step(&mut self, action: &str) -> anyhow::Result<StepOutput>;

    /// Release resources held by the environment.
    ///
    /// # Errors
    ///
    /// Whatever the underlying game raises.
    fn close(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Number of `step` calls so far.
    fn turns(&self) -> u32;

    /// Configured turn ceiling.
    fn max_turns(&self) -> u32;
}
