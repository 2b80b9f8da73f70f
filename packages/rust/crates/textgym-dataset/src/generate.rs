//! Dataset generation: one fresh environment per row, first observation only.

use std::path::{Path, PathBuf};

use serde_json::Value;
use textgym_env::{EnvConfig, Extras, ModuleRegistry, TEXTARENA_ENV_CLASS, TextArenaEnv, TextEnv};

use crate::columnar::write_rows;
use crate::error::{DatasetError, DatasetResult};
use crate::row::{
    DATASET_MAX_TURNS, DatasetRow, TRAIN_FILE, VALIDATION_FILE, game_for_index, system_prompt,
};

/// What [`generate_dataset`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSummary {
    /// Rows in each split.
    pub rows: usize,
    /// Directory holding the splits.
    pub output_dir: PathBuf,
    /// Training split path.
    pub train_path: PathBuf,
    /// Validation split path.
    pub validation_path: PathBuf,
}

/// Build `num_examples` rows, cycling through the game rotation.
///
/// # Errors
///
/// Environment construction errors, or whatever the engine raises during `init`.
pub fn build_rows(num_examples: usize, modules: &ModuleRegistry) -> DatasetResult<Vec<DatasetRow>> {
    let env_config = EnvConfig::default();
    let prompt = [system_prompt()];
    let mut rows = Vec::with_capacity(num_examples);

    for index in 0..num_examples {
        let game = game_for_index(index);
        let mut extras = Extras::new();
        extras.insert("game".to_string(), Value::String(game.as_str().to_string()));

        let mut env = TextArenaEnv::new(&env_config, Some(extras), modules)?;
        let (conversation, _info) = env.init(&prompt).map_err(DatasetError::Game)?;
        rows.push(DatasetRow {
            prompt: conversation,
            env_class: TEXTARENA_ENV_CLASS.to_string(),
            game: game.as_str().to_string(),
            max_turns: DATASET_MAX_TURNS,
        });
        tracing::debug!(index, game = %game, "built dataset row");
    }
    Ok(rows)
}

/// Write `rows` as identical train and validation splits under `output_dir`,
/// creating the directory if needed.
///
/// # Errors
///
/// Filesystem or Parquet encoding failures.
pub fn write_splits(rows: &[DatasetRow], output_dir: &Path) -> DatasetResult<DatasetSummary> {
    std::fs::create_dir_all(output_dir)?;
    let train_path = output_dir.join(TRAIN_FILE);
    let validation_path = output_dir.join(VALIDATION_FILE);
    write_rows(&train_path, rows)?;
    write_rows(&validation_path, rows)?;

    Ok(DatasetSummary {
        rows: rows.len(),
        output_dir: output_dir.to_path_buf(),
        train_path,
        validation_path,
    })
}

/// Build and write a dataset of `num_examples` rows.
///
/// # Errors
///
/// See [`build_rows`] and [`write_splits`].
pub fn generate_dataset(
    output_dir: &Path,
    num_examples: usize,
    modules: &ModuleRegistry,
) -> DatasetResult<DatasetSummary> {
    tracing::info!(
        num_examples,
        output_dir = %output_dir.display(),
        "generating textarena dataset"
    );
    let rows = build_rows(num_examples, modules)?;
    let summary = write_splits(&rows, output_dir)?;
    tracing::info!(rows = summary.rows, "dataset written");
    Ok(summary)
}
