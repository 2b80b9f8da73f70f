//! textarena-dataset CLI: pre-generate TextArena prompts as Parquet splits.
//!
//! The engine is launched from `engine.command` in settings.yaml
//! (`<PRJ_ROOT>/packages/conf/settings.yaml`, overridden by
//! `<PRJ_CONFIG_HOME>/textgym/settings.yaml`).
//!
//! Logging: set `RUST_LOG=textgym_dataset=debug` (or `warn`, `info`) to adjust stderr logs.

mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use textgym_dataset::{expand_home, generate_dataset, load_runtime_settings};

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG overrides; else info for both crates
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("textgym_dataset=info,textgym_env=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let settings = load_runtime_settings();
    let modules = settings.module_registry();
    let output_dir = expand_home(&cli.output_dir);

    let summary = generate_dataset(&output_dir, cli.num_examples, &modules)?;
    println!(
        "Wrote dataset with {} samples to {}",
        summary.rows,
        summary.output_dir.display()
    );
    Ok(())
}
