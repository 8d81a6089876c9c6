//! Biographical data sources
//!
//! A source reads a delimited table into Arrow record batches (every column
//! `Utf8`) and maps its columns onto [`RawRecord`]s. Supported tables:
//!
//! - Retrosheet biofile
//! - Lahman `People`
//! - Lahman `HallOfFame` (induction events)
//! - the correction table
//!
//! [`load_inputs_async`] reads the tables a run needs concurrently.

pub mod biofile;
pub mod corrections;
pub mod factory;
pub mod lahman;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Instant;

use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use log::{info, warn};
use tokio::runtime::{Handle, RuntimeFlavor};

use crate::config::{PipelineConfig, SourceConfig};
use crate::error::{LongevityError, Result};
use crate::models::RawRecord;
use crate::normalize::CorrectionTable;
use crate::utils::arrow::find_column_index;
use crate::utils::io::read_table;
use crate::utils::logging::log_warning;

pub use biofile::BiofileSource;
pub use corrections::CorrectionSource;
pub use factory::{SourceKind, detect_source, source_from_name, source_from_path};
pub use lahman::{HallOfFameSource, InductionTable, LahmanPeopleSource};

/// Base trait for table loaders
pub trait SourceLoader: Send + Sync {
    /// Short name used in logs and audits
    fn source_name(&self) -> &'static str;

    /// Columns that must be present (matched ignoring ASCII case)
    fn required_columns(&self) -> &'static [&'static str];

    /// Load the table and check its columns
    fn load(&self, path: &Path, config: &SourceConfig) -> Result<Vec<RecordBatch>> {
        let batches = read_table(path, config)?;
        check_columns(self.source_name(), self.required_columns(), &batches, path)?;
        Ok(batches)
    }

    /// Load the table on the blocking pool
    fn load_async<'a>(
        &'a self,
        path: &'a Path,
        config: &'a SourceConfig,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RecordBatch>>> + Send + 'a>> {
        let name = self.source_name();
        let required = self.required_columns();
        Box::pin(async move {
            let metadata = tokio::fs::metadata(path)
                .await
                .map_err(|e| LongevityError::load(path, format!("Failed to access path: {e}")))?;
            if !metadata.is_file() {
                return Err(LongevityError::load(path, "Path is not a file"));
            }

            let owned_path = path.to_path_buf();
            let owned_config = config.clone();
            let batches =
                tokio::task::spawn_blocking(move || read_table(&owned_path, &owned_config))
                    .await
                    .map_err(|e| LongevityError::load(path, format!("Task join error: {e}")))??;

            check_columns(name, required, &batches, path)?;
            Ok(batches)
        })
    }
}

/// Rows extracted from a biographical table
#[derive(Debug, Clone, Default)]
pub struct SourceExtract {
    /// One raw record per row that carries a subject id
    pub records: Vec<RawRecord>,
    /// Rows seen
    pub rows_read: usize,
    /// Rows skipped for having no subject id
    pub rows_without_id: usize,
}

impl SourceExtract {
    pub(crate) fn push(&mut self, record: Option<RawRecord>) {
        self.rows_read += 1;
        match record {
            Some(record) => self.records.push(record),
            None => self.rows_without_id += 1,
        }
    }
}

/// A loader whose rows describe individuals
pub trait BiographicalSource: SourceLoader {
    /// Map every row of the batches to a raw record
    fn to_raw_records(&self, batches: &[RecordBatch]) -> Result<SourceExtract>;
}

/// Fail if any batch lacks a required column
fn check_columns(
    name: &str,
    required: &[&str],
    batches: &[RecordBatch],
    path: &Path,
) -> Result<()> {
    let Some(first) = batches.first() else {
        log_warning(&format!("{name} table has no rows"), Some(path));
        return Ok(());
    };
    let schema = first.schema();
    let missing = required
        .iter()
        .filter(|column| find_column_index(&schema, &[**column]).is_none())
        .join(", ");
    if missing.is_empty() {
        Ok(())
    } else {
        Err(LongevityError::load(
            path,
            format!("{name} table is missing columns: {missing}"),
        ))
    }
}

/// Paths of the tables for one run
#[derive(Debug, Clone, Default)]
pub struct InputPaths {
    /// Biographical table (biofile or People)
    pub people: PathBuf,
    /// Source name; detected from the file when `None`
    pub source: Option<String>,
    /// Lahman `HallOfFame` table
    pub hall_of_fame: Option<PathBuf>,
    /// Correction table
    pub corrections: Option<PathBuf>,
}

impl InputPaths {
    /// Inputs with only a biographical table
    #[must_use]
    pub fn new(people: impl Into<PathBuf>) -> Self {
        Self {
            people: people.into(),
            ..Self::default()
        }
    }

    /// Set the Hall of Fame table
    #[must_use]
    pub fn with_hall_of_fame(mut self, path: impl Into<PathBuf>) -> Self {
        self.hall_of_fame = Some(path.into());
        self
    }

    /// Set the correction table
    #[must_use]
    pub fn with_corrections(mut self, path: impl Into<PathBuf>) -> Self {
        self.corrections = Some(path.into());
        self
    }

    /// Force a source by name
    #[must_use]
    pub fn with_source(mut self, name: &str) -> Self {
        self.source = Some(name.to_string());
        self
    }
}

/// Everything the pipeline reads from disk
#[derive(Debug, Clone, Default)]
pub struct LoadedInputs {
    /// Name of the biographical source that was used
    pub source_name: String,
    /// Raw rows, with inductions already applied
    pub extract: SourceExtract,
    /// Induction table, when supplied
    pub inductions: Option<InductionTable>,
    /// Correction table (empty when not supplied)
    pub corrections: CorrectionTable,
}

/// Load all inputs, reading the tables concurrently
pub async fn load_inputs_async(inputs: &InputPaths, config: &PipelineConfig) -> Result<LoadedInputs> {
    let start = Instant::now();
    let source = match &inputs.source {
        Some(name) => source_from_name(name)?,
        None => source_from_path(&inputs.people, &config.source)?,
    };
    info!(
        "Loading {} table from {}",
        source.source_name(),
        inputs.people.display()
    );

    let people = source.load_async(&inputs.people, &config.source);
    let hall_of_fame = async {
        match &inputs.hall_of_fame {
            Some(path) => HallOfFameSource
                .load_async(path, &config.source)
                .await
                .map(Some),
            None => Ok(None),
        }
    };
    let corrections = async {
        match &inputs.corrections {
            Some(path) => CorrectionSource
                .load_async(path, &config.source)
                .await
                .map(Some),
            None => Ok(None),
        }
    };

    let (people, hall_of_fame, corrections) =
        futures::try_join!(people, hall_of_fame, corrections)?;

    let mut extract = source.to_raw_records(&people)?;
    if extract.rows_without_id > 0 {
        warn!(
            "Skipped {} {} rows without a subject id",
            extract.rows_without_id,
            source.source_name()
        );
    }

    let inductions = hall_of_fame
        .map(|batches| {
            InductionTable::from_batches(&batches, config.hall_of_fame_category.as_deref())
        })
        .transpose()?;
    if let Some(table) = &inductions {
        let marked = table.apply(&mut extract.records);
        info!(
            "Applied {} inductions ({} subjects in the induction table)",
            marked,
            table.len()
        );
    }

    let corrections = corrections
        .map(|batches| CorrectionTable::from_batches(&batches))
        .transpose()?
        .unwrap_or_default();
    if !corrections.is_empty() {
        info!("Loaded {} corrections", corrections.len());
    }

    info!(
        "Loaded {} raw records in {:?}",
        extract.records.len(),
        start.elapsed()
    );
    Ok(LoadedInputs {
        source_name: source.source_name().to_string(),
        extract,
        inductions,
        corrections,
    })
}

/// Load all inputs, blocking the current thread
///
/// Inside a multi-threaded runtime the worker is handed over with
/// `block_in_place`. A current-thread runtime has no worker to spare, so the
/// load runs on a scoped thread with its own runtime.
pub fn load_inputs(inputs: &InputPaths, config: &PipelineConfig) -> Result<LoadedInputs> {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| handle.block_on(load_inputs_async(inputs, config)))
        }
        Ok(_) => std::thread::scope(|scope| {
            scope
                .spawn(|| load_on_new_runtime(inputs, config))
                .join()
                .map_err(|_| LongevityError::validation("Input loading thread panicked"))?
        }),
        Err(_) => load_on_new_runtime(inputs, config),
    }
}

fn load_on_new_runtime(inputs: &InputPaths, config: &PipelineConfig) -> Result<LoadedInputs> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(load_inputs_async(inputs, config))
}
