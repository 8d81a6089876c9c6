//! Format-agnostic table helpers

use std::fs::File;
use std::path::Path;
use std::time::Instant;

use arrow::csv::WriterBuilder;
use arrow::datatypes::FieldRef;
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};
use serde_arrow::schema::{SchemaLike, TracingOptions};

use crate::config::SourceConfig;
use crate::error::util::ensure_parent_dir;
use crate::error::{LongevityError, Result};
use crate::utils::io::csv::read_csv_table;
use crate::utils::io::parquet::{read_parquet, write_parquet};
use crate::utils::logging::log_operation_complete;

/// On-disk table format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Parquet,
}

impl TableFormat {
    /// `.parquet` and `.pq` are Parquet; everything else is delimited text
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("parquet" | "pq") => Self::Parquet,
            _ => Self::Csv,
        }
    }

    /// File extension written for this format
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
        }
    }
}

/// Read a table in either format
///
/// Parquet columns keep their stored types; callers that need strings should
/// store string columns.
pub fn read_table(path: &Path, source: &SourceConfig) -> Result<Vec<RecordBatch>> {
    match TableFormat::from_path(path) {
        TableFormat::Parquet => read_parquet(path, source.batch_size),
        TableFormat::Csv => read_csv_table(path, source),
    }
}

/// Convert serializable rows to a record batch
///
/// The schema comes from the row type, so an empty slice still produces a
/// batch with the right columns.
pub fn rows_to_batch<'de, T>(rows: &[T]) -> Result<RecordBatch>
where
    T: Serialize + Deserialize<'de>,
{
    let fields =
        Vec::<FieldRef>::from_type::<T>(TracingOptions::default().allow_null_fields(true))?;
    Ok(serde_arrow::to_record_batch(&fields, &rows)?)
}

/// Write a record batch as Parquet or CSV according to the extension
pub fn write_table(path: &Path, batch: &RecordBatch) -> Result<()> {
    match TableFormat::from_path(path) {
        TableFormat::Parquet => write_parquet(path, batch),
        TableFormat::Csv => {
            let start = Instant::now();
            ensure_parent_dir(path)?;
            let file = File::create(path)?;
            let mut writer = WriterBuilder::new().with_header(true).build(file);
            writer.write(batch)?;
            log_operation_complete("Wrote", path, batch.num_rows(), Some(start.elapsed()));
            Ok(())
        }
    }
}

/// Convert rows and write them in one step
pub fn write_rows<'de, T>(path: &Path, rows: &[T]) -> Result<()>
where
    T: Serialize + Deserialize<'de>,
{
    let batch = rows_to_batch(rows)?;
    write_table(path, &batch)
}

/// Write a value as pretty-printed JSON
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let file = File::create(path)
        .map_err(|e| LongevityError::load(path, format!("Failed to create file: {e}")))?;
    serde_json::to_writer_pretty(file, value)?;
    log::info!("Wrote {}", path.display());
    Ok(())
}
