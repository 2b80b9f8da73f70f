//! Error types for dataset generation.

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use textgym_env::EnvError;
use thiserror::Error;

/// Result alias for dataset operations.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Failures while building or writing a dataset. Underlying errors pass through as-is.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Environment construction failed.
    #[error(transparent)]
    Env(#[from] EnvError),

    /// The game engine failed during `init`.
    #[error(transparent)]
    Game(anyhow::Error),

    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Arrow array construction failure.
    #[error(transparent)]
    Arrow(#[from] ArrowError),

    /// Parquet encoding or decoding failure.
    #[error(transparent)]
    Parquet(#[from] ParquetError),

    /// A Parquet file does not have the dataset layout.
    #[error("Unexpected dataset column `{0}`")]
    Column(String),
}
