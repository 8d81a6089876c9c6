//! Field extraction utilities for Arrow record batches
//!
//! Source tables are read with every column typed as `Utf8`; these helpers
//! fetch those columns by name and pull trimmed, non-empty values out of them.

use arrow::array::{Array, StringArray};
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;

use crate::error::{LongevityError, Result};

/// Get a string column that must exist
///
/// # Errors
/// Returns a schema error if the column is missing or is not `Utf8`.
pub fn required_string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    optional_string_column(batch, name)?
        .ok_or_else(|| LongevityError::schema(format!("Missing required column: {name}")))
}

/// Get a string column that may be absent
///
/// # Errors
/// Returns a schema error if the column exists but is not `Utf8`.
pub fn optional_string_column<'a>(
    batch: &'a RecordBatch,
    name: &str,
) -> Result<Option<&'a StringArray>> {
    let Some(column) = batch.column_by_name(name) else {
        return Ok(None);
    };
    column
        .as_any()
        .downcast_ref::<StringArray>()
        .map(Some)
        .ok_or_else(|| {
            LongevityError::schema(format!(
                "Column {name} is {} rather than Utf8",
                column.data_type()
            ))
        })
}

/// Index of the first column matching any candidate name, ignoring ASCII case
#[must_use]
pub fn find_column_index(schema: &Schema, candidates: &[&str]) -> Option<usize> {
    candidates.iter().find_map(|candidate| {
        schema
            .fields()
            .iter()
            .position(|f| f.name().eq_ignore_ascii_case(candidate))
    })
}

/// Get a string column by any of its accepted names, ignoring ASCII case
///
/// # Errors
/// Returns a schema error if the matched column is not `Utf8`.
pub fn find_string_column<'a>(
    batch: &'a RecordBatch,
    candidates: &[&str],
) -> Result<Option<&'a StringArray>> {
    let schema = batch.schema();
    let Some(index) = find_column_index(&schema, candidates) else {
        return Ok(None);
    };
    optional_string_column(batch, schema.field(index).name())
}

/// Extract a trimmed value; null and blank cells are `None`
#[must_use]
pub fn string_value(array: &StringArray, row: usize) -> Option<String> {
    if row >= array.len() || array.is_null(row) {
        return None;
    }
    let value = array.value(row).trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Extract a value from a column that may be absent
#[must_use]
pub fn optional_value(array: Option<&StringArray>, row: usize) -> Option<String> {
    array.and_then(|a| string_value(a, row))
}
