//! Validation functions for the matching algorithm

use rustc_hash::FxHashSet;

use crate::error::{LongevityError, Result};
use crate::models::{BiographicalRecord, LifeStatus};

/// Validate the inputs of a matching run
///
/// Every record needs exactly one life status, and subject ids must be
/// unique because pairs refer to subjects by id.
pub fn validate_inputs(records: &[BiographicalRecord], statuses: &[LifeStatus]) -> Result<()> {
    if records.len() != statuses.len() {
        return Err(LongevityError::validation(format!(
            "{} records but {} life statuses",
            records.len(),
            statuses.len()
        )));
    }

    let mut seen = FxHashSet::default();
    for record in records {
        if record.subject_id.is_empty() {
            return Err(LongevityError::validation("Record with empty subject id"));
        }
        if !seen.insert(record.subject_id.as_str()) {
            return Err(LongevityError::validation(format!(
                "Duplicate subject id in matching input: {}",
                record.subject_id
            )));
        }
    }
    Ok(())
}
