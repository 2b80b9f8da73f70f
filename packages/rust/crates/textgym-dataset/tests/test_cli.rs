//! Integration tests for the `textarena-dataset` binary.

#![allow(missing_docs)]

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;
use textgym_dataset::{TRAIN_FILE, VALIDATION_FILE, load_rows};

fn dataset_cmd(project_root: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_textarena-dataset"));
    cmd.env("PRJ_ROOT", project_root)
        .env("PRJ_CONFIG_HOME", project_root.join(".config"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_zero_examples_writes_empty_splits() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    let out = tmp.path().join("out");

    let output = dataset_cmd(tmp.path())
        .arg("--output_dir")
        .arg(&out)
        .arg("--num_examples")
        .arg("0")
        .output()?;

    assert!(
        output.status.success(),
        "textarena-dataset failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout)?;
    assert_eq!(
        stdout.trim(),
        format!("Wrote dataset with 0 samples to {}", out.display())
    );
    assert!(out.join(TRAIN_FILE).is_file());
    assert!(out.join(VALIDATION_FILE).is_file());
    Ok(())
}

#[test]
fn test_missing_engine_exits_with_error() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    let output = dataset_cmd(tmp.path())
        .arg("--output_dir")
        .arg(tmp.path().join("out"))
        .arg("--num_examples")
        .arg("1")
        .output()?;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("textarena"), "unexpected stderr: {stderr}");
    assert!(!tmp.path().join("out").join(TRAIN_FILE).exists());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_configured_engine_produces_rows() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    let script = tmp.path().join("engine.sh");
    std::fs::write(
        &script,
        r#"
while IFS= read -r line; do
  case "$line" in
    *'"op":"reset"'*) echo '{"ok":true,"observation":"Your move"}' ;;
    *) echo '{"ok":true}' ;;
  esac
done
"#,
    )?;
    let conf = tmp.path().join("packages/conf");
    std::fs::create_dir_all(&conf)?;
    std::fs::write(
        conf.join("settings.yaml"),
        format!(
            "engine:\n  command: sh\n  args: [\"{}\"]\n",
            script.display()
        ),
    )?;

    let out = tmp.path().join("data");
    let output = dataset_cmd(tmp.path())
        .arg("--output_dir")
        .arg(&out)
        .arg("--num_examples")
        .arg("3")
        .output()?;
    assert!(
        output.status.success(),
        "textarena-dataset failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let train = load_rows(&out.join(TRAIN_FILE))?;
    let validation = load_rows(&out.join(VALIDATION_FILE))?;
    assert_eq!(train.len(), 3);
    assert_eq!(train, validation);
    let games: Vec<&str> = train.iter().map(|row| row.game.as_str()).collect();
    assert_eq!(games, vec!["codenames", "colonel_blotto", "three_player_ipd"]);
    assert!(train.iter().all(|row| row.prompt.len() == 2 && row.prompt[1].content == "Your move"));
    Ok(())
}
