//! textgym-dataset - TextArena prompt dataset generator
//!
//! Builds one row per sample by starting a fresh TextArena environment, seeding
//! it with a fixed system prompt and keeping the game's first observation. Rows
//! are written as identical `train.parquet` and `validation.parquet` splits.
//!
//! # Architecture
//!
//! ```text
//! textgym-dataset/src/
//! ├── lib.rs       # Re-exports (this file)
//! ├── main.rs      # `textarena-dataset` binary
//! ├── cli.rs       # clap arguments
//! ├── error.rs     # DatasetError enum
//! ├── row.rs       # Row layout and game rotation
//! ├── generate.rs  # Row building and split writing
//! ├── columnar.rs  # Arrow/Parquet encoding
//! ├── settings.rs  # YAML runtime settings (engine command)
//! └── paths.rs     # `~` expansion
//! ```

mod columnar;
mod error;
mod generate;
mod paths;
mod row;
mod settings;

pub use columnar::{
    CONTENT_FIELD, ENV_CLASS_COLUMN, GAME_COLUMN, MAX_TURNS_COLUMN, PROMPT_COLUMN, ROLE_FIELD,
    dataset_schema, load_rows, rows_to_record_batch, write_rows,
};
pub use error::{DatasetError, DatasetResult};
pub use generate::{DatasetSummary, build_rows, generate_dataset, write_splits};
pub use paths::{DEFAULT_OUTPUT_DIR, expand_home};
pub use row::{
    DATASET_MAX_TURNS, DatasetRow, GAMES, SYSTEM_PROMPT, TRAIN_FILE, VALIDATION_FILE,
    game_for_index, system_prompt,
};
pub use settings::{
    EngineSettings, RuntimeSettings, load_runtime_settings, load_runtime_settings_from_paths,
    runtime_settings_paths,
};
