//! Episode driver that enforces the turn ceiling.
//!
//! Environments only count turns; stopping at `max_turns` is done here.

use crate::env::TextEnv;
use crate::message::{ChatMessage, Conversation};

/// Outcome of one driven episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    /// Steps taken.
    pub turns: u32,
    /// Sum of step rewards.
    pub total_reward: f64,
    /// The environment reported completion.
    pub done: bool,
    /// Stopped by the turn ceiling before completion.
    pub truncated: bool,
    /// Prompt, first observation, then every action and observation.
    pub conversation: Conversation,
}

/// Run `env` from `init(prompt)` until it reports `done` or reaches its turn ceiling.
///
/// `policy` sees the conversation so far and returns the next action.
///
/// # Errors
///
/// The first error raised by the environment; the episode is abandoned.
pub fn run_episode<E, P>(
    env: &mut E,
    prompt: &[ChatMessage],
    mut policy: P,
) -> anyhow::Result<EpisodeSummary>
where
    E: TextEnv + ?Sized,
    P: FnMut(&[ChatMessage]) -> String,
{
    let (mut conversation, _info) = env.init(prompt)?;
    let mut total_reward = 0.0;
    let mut done = false;

    while !done && env.turns() < env.max_turns() {
        let action = policy(&conversation);
        let output = env.step(&action)?;
        conversation.push(ChatMessage::assistant(
            output.postprocessed_action.unwrap_or(action),
        ));
        conversation.extend(output.observations);
        total_reward += output.reward;
        done = output.done;
    }

    let summary = EpisodeSummary {
        turns: env.turns(),
        total_reward,
        done,
        truncated: !done,
        conversation,
    };
    tracing::debug!(
        turns = summary.turns,
        total_reward = summary.total_reward,
        truncated = summary.truncated,
        "episode finished"
    );
    Ok(summary)
}
