//! Delimited source tables
//!
//! Every column is read as nullable `Utf8`. Type interpretation belongs to
//! the normalizer, so nothing here guesses at dates or numbers.

use std::io::Seek;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;

use crate::config::SourceConfig;
use crate::error::Result;
use crate::error::util::safe_open_file;
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Read a delimited table with all columns as strings
///
/// Column names are taken from the header (trimmed, surrounding quotes
/// removed). Without a header the names are `column_1`, `column_2`, ...
pub fn read_csv_table(path: &Path, source: &SourceConfig) -> Result<Vec<RecordBatch>> {
    let start = Instant::now();
    log_operation_start("Reading delimited table", path);

    let mut file = safe_open_file(path, "source table")?;
    let format = Format::default()
        .with_header(source.has_header)
        .with_delimiter(source.delimiter_byte()?);

    let (inferred, _) = format.infer_schema(&mut file, Some(1))?;
    let schema = Arc::new(string_schema(&inferred));
    file.rewind()?;

    let reader = ReaderBuilder::new(schema)
        .with_format(format)
        .with_batch_size(source.batch_size)
        .build(file)?;
    let batches = reader.collect::<std::result::Result<Vec<_>, ArrowError>>()?;

    let rows = batches.iter().map(RecordBatch::num_rows).sum();
    log_operation_complete("Read", path, rows, Some(start.elapsed()));
    Ok(batches)
}

/// Read only the header of a delimited table
///
/// Used to recognise a source by its columns before loading it.
pub fn read_header(path: &Path, source: &SourceConfig) -> Result<Schema> {
    let mut file = safe_open_file(path, "source table")?;
    let format = Format::default()
        .with_header(source.has_header)
        .with_delimiter(source.delimiter_byte()?);
    let (inferred, _) = format.infer_schema(&mut file, Some(0))?;
    Ok(string_schema(&inferred))
}

/// Same field names, every type replaced by nullable `Utf8`
fn string_schema(inferred: &Schema) -> Schema {
    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|f| {
            let name = f.name().trim().trim_matches('"').trim();
            Field::new(name, DataType::Utf8, true)
        })
        .collect();
    Schema::new(fields)
}
