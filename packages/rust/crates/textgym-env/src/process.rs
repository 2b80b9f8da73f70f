//! Engine bridge over a child process.
//!
//! The engine runs out of process and speaks newline-delimited JSON on
//! stdin/stdout. Every game gets its own process; requests are strictly
//! request/reply:
//!
//! ```text
//! -> {"op":"make","game":"codenames","kwargs":{}}   <- {"ok":true}
//! -> {"op":"reset"}                                 <- {"ok":true,"observation":"...","info":{}}
//! -> {"op":"step","action":"..."}
//!                          <- {"ok":true,"observation":"...","reward":0.0,"done":false,"info":{}}
//! -> {"op":"close"}                                 <- {"ok":true}
//! ```
//!
//! A reset reply without `info` is the bare-observation shape. Step replies must carry
//! `reward` and `done`. `{"ok":false,"error":"..."}` becomes an engine error.
//!
//! A launch failure is reported as [`EngineLaunchError`], so callers can tell a missing
//! engine binary apart from an engine that failed.

use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::Arc;

use anyhow::{Context, bail};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Extras;
use crate::engine::{ArenaGame, ArenaModule, GameStep, Info, MakeFn, ResetOutput};

/// Entry point exposed by [`ProcessModule`].
pub const PROCESS_ENTRY_POINT: &str = "make";

/// Program and arguments that start the engine bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineCommand {
    /// Executable to launch.
    pub program: String,
    /// Arguments passed to the executable.
    #[serde(default)]
    pub args: Vec<String>,
}

/// The engine program could not be started.
#[derive(Debug, Error)]
#[error("failed to launch engine `{program}`")]
pub struct EngineLaunchError {
    /// Program that was launched.
    pub program: String,
    /// Underlying spawn failure.
    #[source]
    pub source: io::Error,
}

impl EngineLaunchError {
    /// The program does not exist, i.e. the engine is not installed.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.source.kind() == io::ErrorKind::NotFound
    }
}

/// Engine package backed by an external process.
#[derive(Debug, Clone)]
pub struct ProcessModule {
    command: Arc<EngineCommand>,
}

impl ProcessModule {
    /// Module launching `command` for every new game.
    #[must_use]
    pub fn new(command: EngineCommand) -> Self {
        Self {
            command: Arc::new(command),
        }
    }

    /// The launch command.
    #[must_use]
    pub fn command(&self) -> &EngineCommand {
        &self.command
    }
}

impl ArenaModule for ProcessModule {
    fn entry_point(&self, name: &str) -> Option<MakeFn> {
        if name != PROCESS_ENTRY_POINT {
            return None;
        }
        let command = Arc::clone(&self.command);
        let make: MakeFn = Arc::new(
            move |game: &str, kwargs: &Extras| -> anyhow::Result<Box<dyn ArenaGame>> {
                let game = ProcessGame::spawn(&command, game, kwargs)?;
                Ok(Box::new(game))
            },
        );
        Some(make)
    }
}

type PipeChannel = JsonLineChannel<BufReader<ChildStdout>, ChildStdin>;

/// A game living in a child process.
pub struct ProcessGame {
    child: Child,
    // None once closed
    channel: Option<PipeChannel>,
}

impl ProcessGame {
    /// Launch the engine and create `game` inside it.
    ///
    /// # Errors
    ///
    /// [`EngineLaunchError`] when the program cannot be started, otherwise broken pipes
    /// or an engine refusing the `make` request.
    pub fn spawn(command: &EngineCommand, game: &str, kwargs: &Extras) -> anyhow::Result<Self> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| EngineLaunchError {
                program: command.program.clone(),
                source,
            })?;
        let stdin = child.stdin.take().context("engine stdin is not piped")?;
        let stdout = child.stdout.take().context("engine stdout is not piped")?;

        let mut process = Self {
            child,
            channel: Some(JsonLineChannel::new(BufReader::new(stdout), stdin)),
        };
        // a refused make drops `process`, which kills the child
        process.channel()?.make(game, kwargs)?;
        tracing::debug!(
            program = %command.program,
            pid = process.child.id(),
            game,
            "engine process started"
        );
        Ok(process)
    }

    fn channel(&mut self) -> anyhow::Result<&mut PipeChannel> {
        self.channel
            .as_mut()
            .context("engine process is already closed")
    }
}

impl ArenaGame for ProcessGame {
    fn reset(&mut self) -> anyhow::Result<ResetOutput> {
        self.channel()?.reset()
    }

    fn step(&mut self, action: &str) -> anyhow::Result<GameStep> {
        self.channel()?.step(action)
    }

    fn close(&mut self) -> anyhow::Result<()> {
        let Some(mut channel) = self.channel.take() else {
            return Ok(());
        };
        let reply = channel.close();
        // closes stdin so the engine sees EOF
        drop(channel);
        if let Err(error) = reply {
            terminate(&mut self.child);
            return Err(error);
        }
        self.child.wait().context("failed to wait for engine process")?;
        Ok(())
    }
}

impl Drop for ProcessGame {
    fn drop(&mut self) {
        if self.channel.is_some() {
            terminate(&mut self.child);
        }
    }
}

fn terminate(child: &mut Child) {
    if let Err(error) = child.kill() {
        tracing::debug!(error = %error, "engine process already exited");
    }
    let _ = child.wait();
}

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Request<'a> {
    Make { game: &'a str, kwargs: &'a Extras },
    Reset,
    Step { action: &'a str },
    Close,
}

#[derive(Debug, Deserialize)]
struct Status {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResetReply {
    #[serde(default)]
    observation: Option<String>,
    #[serde(default)]
    info: Option<Info>,
}

#[derive(Debug, Deserialize)]
struct StepReply {
    #[serde(default)]
    observation: Option<String>,
    reward: f64,
    done: bool,
    #[serde(default)]
    info: Option<Info>,
}

/// Request/reply JSON lines over any reader/writer pair.
struct JsonLineChannel<R, W> {
    reader: R,
    writer: W,
    line: String,
}

impl<R: BufRead, W: Write> JsonLineChannel<R, W> {
    fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            line: String::new(),
        }
    }

    fn call<T: DeserializeOwned>(&mut self, request: &Request<'_>) -> anyhow::Result<T> {
        serde_json::to_writer(&mut self.writer, request)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;

        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            bail!("engine closed its output before replying");
        }
        let line = self.line.trim_end();
        let reply: serde_json::Value = serde_json::from_str(line)
            .with_context(|| format!("malformed engine reply: {line}"))?;
        let status = Status::deserialize(&reply)
            .with_context(|| format!("malformed engine reply: {line}"))?;
        if !status.ok {
            bail!(
                "{}",
                status
                    .error
                    .unwrap_or_else(|| "engine request failed".to_string())
            );
        }
        serde_json::from_value(reply).with_context(|| format!("malformed engine reply: {line}"))
    }

    fn make(&mut self, game: &str, kwargs: &Extras) -> anyhow::Result<()> {
        self.call::<IgnoredAny>(&Request::Make { game, kwargs })?;
        Ok(())
    }

    fn reset(&mut self) -> anyhow::Result<ResetOutput> {
        let reply: ResetReply = self.call(&Request::Reset)?;
        let observation = reply.observation.unwrap_or_default();
        Ok(match reply.info {
            Some(info) => ResetOutput::WithInfo(observation, info),
            None => ResetOutput::Observation(observation),
        })
    }

    fn step(&mut self, action: &str) -> anyhow::Result<GameStep> {
        let reply: StepReply = self.call(&Request::Step { action })?;
        Ok(GameStep {
            observation: reply.observation.unwrap_or_default(),
            reward: reply.reward,
            done: reply.done,
            info: reply.info.unwrap_or_default(),
        })
    }

    fn close(&mut self) -> anyhow::Result<()> {
        self.call::<IgnoredAny>(&Request::Close)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use serde_json::json;

    use super::*;

    fn channel(replies: &str) -> JsonLineChannel<Cursor<Vec<u8>>, Vec<u8>> {
        JsonLineChannel::new(Cursor::new(replies.as_bytes().to_vec()), Vec::new())
    }

    fn sent(channel: &JsonLineChannel<Cursor<Vec<u8>>, Vec<u8>>) -> Vec<serde_json::Value> {
        String::from_utf8(channel.writer.clone())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn requests_are_tagged_json_lines() {
        let mut ch = channel(concat!(
            "{\"ok\":true}\n",
            "{\"ok\":true,\"observation\":\"o\",\"reward\":1.5,\"done\":true}\n",
        ));
        let mut kwargs = Extras::new();
        kwargs.insert("seed".into(), json!(4));
        ch.make("codenames", &kwargs).unwrap();
        let step = ch.step("guess apple").unwrap();

        assert_eq!(
            sent(&ch),
            vec![
                json!({"op": "make", "game": "codenames", "kwargs": {"seed": 4}}),
                json!({"op": "step", "action": "guess apple"}),
            ]
        );
        assert_eq!(step.observation, "o");
        assert!((step.reward - 1.5).abs() < f64::EPSILON);
        assert!(step.done);
        assert!(step.info.is_empty());
    }

    #[test]
    fn reset_shape_follows_info_presence() {
        let mut ch = channel(concat!(
            "{\"ok\":true,\"observation\":\"a\"}\n",
            "{\"ok\":true,\"observation\":null,\"info\":{\"p\":1}}\n",
        ));
        assert_eq!(ch.reset().unwrap(), ResetOutput::Observation("a".into()));
        match ch.reset().unwrap() {
            ResetOutput::WithInfo(obs, info) => {
                assert!(obs.is_empty());
                assert_eq!(info.get("p"), Some(&json!(1)));
            }
            other => panic!("unexpected reset shape: {other:?}"),
        }
    }

    #[test]
    fn engine_errors_surface_message() {
        let mut ch = channel("{\"ok\":false,\"error\":\"illegal move\"}\n");
        let err = ch.step("pass").unwrap_err();
        assert_eq!(err.to_string(), "illegal move");
    }

    #[test]
    fn step_reply_without_reward_or_done_is_malformed() {
        let mut ch = channel("{\"ok\":true,\"observation\":\"x\"}\n");
        let err = ch.step("pass").unwrap_err();
        assert!(err.to_string().starts_with("malformed engine reply"));
        assert!(format!("{err:#}").contains("reward"));

        let mut ch = channel("{\"ok\":true,\"observation\":\"x\",\"reward\":0.0}\n");
        let err = ch.step("pass").unwrap_err();
        assert!(format!("{err:#}").contains("done"));
    }

    #[test]
    fn missing_program_is_not_found() {
        let command = EngineCommand {
            program: "/nonexistent/textarena-engine".into(),
            args: Vec::new(),
        };
        let err = ProcessGame::spawn(&command, "codenames", &Extras::new())
            .err()
            .unwrap();
        let launch = err.downcast_ref::<EngineLaunchError>().unwrap();
        assert!(launch.is_not_found());
        assert_eq!(launch.program, "/nonexistent/textarena-engine");
    }

    #[test]
    fn eof_is_an_error() {
        let mut ch = channel("");
        assert!(ch.reset().is_err());
    }

    #[test]
    fn only_make_is_exposed() {
        let module = ProcessModule::new(EngineCommand {
            program: "engine".into(),
            args: Vec::new(),
        });
        assert!(module.entry_point("make").is_some());
        assert!(module.entry_point("make_game").is_none());
    }
}
