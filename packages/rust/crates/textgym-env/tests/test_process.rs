//! Tests for the out-of-process engine bridge.
//!
//! A small `sh` script plays the engine side of the JSON-lines protocol.

#![allow(missing_docs)]
#![cfg(unix)]

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use textgym_env::{
    ChatMessage, EngineCommand, EnvConfig, EnvError, ModuleRegistry, ProcessModule,
    TEXTARENA_PACKAGE, TextArenaEnv, TextEnv,
};

const FAKE_ENGINE: &str = r#"
while IFS= read -r line; do
  case "$line" in
    *'"op":"make"'*) echo '{"ok":true}' ;;
    *'"op":"reset"'*) echo '{"ok":true,"observation":"You are Player 0","info":{"player_id":0}}' ;;
    *'"op":"step"'*) echo '{"ok":true,"observation":"Player 1 defected","reward":-1.0,"done":false,"info":{"round":1}}' ;;
    *'"op":"close"'*) echo '{"ok":true}'; exit 0 ;;
    *) echo '{"ok":false,"error":"unknown op"}' ;;
  esac
done
"#;

fn engine_modules(dir: &Path) -> ModuleRegistry {
    let script = dir.join("engine.sh");
    std::fs::write(&script, FAKE_ENGINE).expect("write engine script");
    let command = EngineCommand {
        program: "sh".to_string(),
        args: vec![script.display().to_string()],
    };
    ModuleRegistry::new().with_module(TEXTARENA_PACKAGE, Arc::new(ProcessModule::new(command)))
}

#[test]
fn test_process_engine_round_trip() {
    let tmp = TempDir::new().expect("tempdir");
    let modules = engine_modules(tmp.path());

    let mut env = TextArenaEnv::new(&EnvConfig::for_game("three_player_ipd"), None, &modules)
        .expect("construct env");
    let (prompt, info) = env.init(&[]).expect("init");
    assert_eq!(prompt, vec![ChatMessage::user("You are Player 0")]);
    assert_eq!(info.get("player_id"), Some(&serde_json::json!(0)));

    let out = env.step("[defect]").expect("step");
    assert_eq!(out.observations, vec![ChatMessage::user("Player 1 defected")]);
    assert!((out.reward + 1.0).abs() < f64::EPSILON);
    assert_eq!(out.metadata.get("round"), Some(&serde_json::json!(1)));

    env.close().expect("close");
}

fn command_modules(program: String) -> ModuleRegistry {
    let command = EngineCommand {
        program,
        args: Vec::new(),
    };
    ModuleRegistry::new().with_module(TEXTARENA_PACKAGE, Arc::new(ProcessModule::new(command)))
}

#[test]
fn test_missing_engine_binary_is_dependency_error() {
    let modules = command_modules("/nonexistent/textarena-engine".to_string());
    let err = TextArenaEnv::new(&EnvConfig::for_game("codenames"), None, &modules).unwrap_err();
    assert!(matches!(err, EnvError::MissingDependency { ref package } if package == "textarena"));
    assert!(err.is_dependency_error());
    assert!(!err.is_config_error());
}

#[test]
fn test_unlaunchable_engine_is_engine_error() {
    // a directory exists but cannot be executed
    let tmp = TempDir::new().expect("tempdir");
    let modules = command_modules(tmp.path().display().to_string());
    let err = TextArenaEnv::new(&EnvConfig::for_game("codenames"), None, &modules).unwrap_err();
    assert!(matches!(err, EnvError::Engine(_)));
    assert!(!err.is_dependency_error());
    assert!(err.to_string().contains("failed to launch engine"));
}

#[test]
fn test_step_reply_missing_reward_fails() {
    let tmp = TempDir::new().expect("tempdir");
    let script = tmp.path().join("engine.sh");
    std::fs::write(
        &script,
        r#"
while IFS= read -r line; do
  case "$line" in
    *'"op":"step"'*) echo '{"ok":true,"observation":"x"}' ;;
    *) echo '{"ok":true,"observation":"start"}' ;;
  esac
done
"#,
    )
    .expect("write engine script");
    let command = EngineCommand {
        program: "sh".to_string(),
        args: vec![script.display().to_string()],
    };
    let modules =
        ModuleRegistry::new().with_module(TEXTARENA_PACKAGE, Arc::new(ProcessModule::new(command)));

    let mut env = TextArenaEnv::new(&EnvConfig::for_game("codenames"), None, &modules)
        .expect("construct env");
    env.init(&[]).expect("init");
    let err = env.step("[pass]").unwrap_err();
    assert!(err.to_string().starts_with("malformed engine reply"));
    assert_eq!(env.turns(), 1);
}
