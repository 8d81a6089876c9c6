//! Table input and output
//!
//! Sources are read from delimited text into Arrow record batches. Outputs
//! are built from serializable rows with `serde_arrow` and written as
//! Parquet or CSV depending on the file extension.

pub mod csv;
pub mod parquet;
pub mod table;

pub use csv::{read_csv_table, read_header};
pub use parquet::{read_parquet, write_parquet};
pub use table::{TableFormat, read_table, rows_to_batch, write_json, write_rows, write_table};
