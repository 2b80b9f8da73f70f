//! Arrow/Parquet encoding of dataset rows.
//!
//! Layout:
//! - `prompt`: `List<Struct<role: Utf8, content: Utf8>>`
//! - `env_class`: `Utf8`
//! - `game`: `Utf8`
//! - `max_turns`: `Int64`

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Int64Array, ListArray, StringArray, StructArray};
use arrow::buffer::OffsetBuffer;
use arrow::datatypes::{DataType, Field, FieldRef, Fields, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use textgym_env::{ChatMessage, Role};

use crate::error::{DatasetError, DatasetResult};
use crate::row::DatasetRow;

/// Prompt column name
pub const PROMPT_COLUMN: &str = "prompt";
/// Environment class column name
pub const ENV_CLASS_COLUMN: &str = "env_class";
/// Game column name
pub const GAME_COLUMN: &str = "game";
/// Turn ceiling column name
pub const MAX_TURNS_COLUMN: &str = "max_turns";
/// Role field inside each prompt message
pub const ROLE_FIELD: &str = "role";
/// Content field inside each prompt message
pub const CONTENT_FIELD: &str = "content";

fn message_fields() -> Fields {
    Fields::from(vec![
        Field::new(ROLE_FIELD, DataType::Utf8, false),
        Field::new(CONTENT_FIELD, DataType::Utf8, false),
    ])
}

fn message_item_field() -> FieldRef {
    Arc::new(Field::new("item", DataType::Struct(message_fields()), true))
}

/// Arrow schema of a dataset split.
#[must_use]
pub fn dataset_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(PROMPT_COLUMN, DataType::List(message_item_field()), false),
        Field::new(ENV_CLASS_COLUMN, DataType::Utf8, false),
        Field::new(GAME_COLUMN, DataType::Utf8, false),
        Field::new(MAX_TURNS_COLUMN, DataType::Int64, false),
    ]))
}

/// Encode rows as a single record batch.
///
/// # Errors
///
/// Returns an error when Arrow array or `RecordBatch` construction fails.
pub fn rows_to_record_batch(rows: &[DatasetRow]) -> Result<RecordBatch, ArrowError> {
    // flattened iterators have no exact size, so collect before building arrays
    let messages: Vec<&ChatMessage> = rows.iter().flat_map(|row| row.prompt.iter()).collect();
    let roles = StringArray::from(
        messages
            .iter()
            .map(|msg| msg.role.as_str())
            .collect::<Vec<&str>>(),
    );
    let contents = StringArray::from(
        messages
            .iter()
            .map(|msg| msg.content.as_str())
            .collect::<Vec<&str>>(),
    );
    let message_array = StructArray::try_new(
        message_fields(),
        vec![Arc::new(roles) as ArrayRef, Arc::new(contents)],
        None,
    )?;

    let offsets = OffsetBuffer::<i32>::from_lengths(rows.iter().map(|row| row.prompt.len()));
    let prompt = ListArray::try_new(message_item_field(), offsets, Arc::new(message_array), None)?;
    let env_class = StringArray::from_iter_values(rows.iter().map(|row| row.env_class.as_str()));
    let game = StringArray::from_iter_values(rows.iter().map(|row| row.game.as_str()));
    let max_turns = Int64Array::from_iter_values(rows.iter().map(|row| row.max_turns));

    RecordBatch::try_new(
        dataset_schema(),
        vec![
            Arc::new(prompt) as ArrayRef,
            Arc::new(env_class),
            Arc::new(game),
            Arc::new(max_turns),
        ],
    )
}

/// Write `rows` to a Snappy-compressed Parquet file at `path`.
///
/// # Errors
///
/// Returns an error when encoding fails or the file cannot be written.
pub fn write_rows(path: &Path, rows: &[DatasetRow]) -> DatasetResult<()> {
    let batch = rows_to_record_batch(rows)?;
    let file = File::create(path)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "wrote parquet split");
    Ok(())
}

/// Read a split written by [`write_rows`].
///
/// # Errors
///
/// Returns an error when the file cannot be read or does not match [`dataset_schema`].
pub fn load_rows(path: &Path) -> DatasetResult<Vec<DatasetRow>> {
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let mut rows = Vec::new();
    for batch in reader {
        rows.extend(batch_to_rows(&batch?)?);
    }
    Ok(rows)
}

fn batch_to_rows(batch: &RecordBatch) -> DatasetResult<Vec<DatasetRow>> {
    let prompt = column::<ListArray>(batch.column_by_name(PROMPT_COLUMN), PROMPT_COLUMN)?;
    let env_class =
        column::<StringArray>(batch.column_by_name(ENV_CLASS_COLUMN), ENV_CLASS_COLUMN)?;
    let game = column::<StringArray>(batch.column_by_name(GAME_COLUMN), GAME_COLUMN)?;
    let max_turns =
        column::<Int64Array>(batch.column_by_name(MAX_TURNS_COLUMN), MAX_TURNS_COLUMN)?;

    (0..batch.num_rows())
        .map(|index| -> DatasetResult<DatasetRow> {
            let messages = prompt.value(index);
            Ok(DatasetRow {
                prompt: decode_messages(&messages)?,
                env_class: env_class.value(index).to_string(),
                game: game.value(index).to_string(),
                max_turns: max_turns.value(index),
            })
        })
        .collect()
}

fn decode_messages(messages: &ArrayRef) -> DatasetResult<Vec<ChatMessage>> {
    let messages = column::<StructArray>(Some(messages), PROMPT_COLUMN)?;
    let roles = column::<StringArray>(messages.column_by_name(ROLE_FIELD), ROLE_FIELD)?;
    let contents = column::<StringArray>(messages.column_by_name(CONTENT_FIELD), CONTENT_FIELD)?;

    (0..messages.len())
        .map(|index| -> DatasetResult<ChatMessage> {
            let role = Role::parse(roles.value(index))
                .ok_or_else(|| DatasetError::Column(ROLE_FIELD.to_string()))?;
            Ok(ChatMessage::new(role, contents.value(index)))
        })
        .collect()
}

fn column<'a, T: Array + 'static>(array: Option<&'a ArrayRef>, name: &str) -> DatasetResult<&'a T> {
    array
        .and_then(|array| array.as_any().downcast_ref::<T>())
        .ok_or_else(|| DatasetError::Column(name.to_string()))
}
