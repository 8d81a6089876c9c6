//! Enumerated record-specific corrections.
//!
//! Known data-entry errors are fixed in exactly one place: a finite table keyed
//! by (subject id, field) that is applied to the raw record before any
//! parsing. Nothing downstream special-cases individual subjects.

use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{LongevityError, Result};
use crate::models::{RawRecord, RecordField};
use crate::utils::arrow::{optional_string_column, required_string_column, string_value};

/// One correction: replace `field` of `subject_id` with `value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    /// Subject to correct
    pub subject_id: String,
    /// Field to overwrite
    pub field: RecordField,
    /// Replacement text; `None` clears the field
    pub value: Option<String>,
    /// Free-text justification, kept for auditing
    pub note: Option<String>,
}

impl Correction {
    /// Create a correction that sets a value
    #[must_use]
    pub fn set(subject_id: &str, field: RecordField, value: &str) -> Self {
        Self {
            subject_id: subject_id.to_string(),
            field,
            value: Some(value.to_string()),
            note: None,
        }
    }

    /// Create a correction that clears a value
    #[must_use]
    pub fn clear(subject_id: &str, field: RecordField) -> Self {
        Self {
            subject_id: subject_id.to_string(),
            field,
            value: None,
            note: None,
        }
    }

    /// Attach a note
    #[must_use]
    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }
}

/// The complete set of corrections for a run
#[derive(Debug, Clone, Default)]
pub struct CorrectionTable {
    by_subject: FxHashMap<String, SmallVec<[Correction; 2]>>,
    len: usize,
}

impl CorrectionTable {
    /// An empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a list of corrections
    ///
    /// Two corrections for the same (subject, field) are rejected: the table
    /// must say unambiguously what each fix is.
    pub fn from_corrections(corrections: impl IntoIterator<Item = Correction>) -> Result<Self> {
        let mut table = Self::new();
        for correction in corrections {
            table.insert(correction)?;
        }
        Ok(table)
    }

    /// Build a table from record batches with `subject_id`, `field`, `value`
    /// and optional `note` columns
    pub fn from_batches(batches: &[RecordBatch]) -> Result<Self> {
        let mut table = Self::new();
        for batch in batches {
            let subjects = required_string_column(batch, "subject_id")?;
            let fields = required_string_column(batch, "field")?;
            let values = required_string_column(batch, "value")?;
            let notes = optional_string_column(batch, "note")?;

            for row in 0..batch.num_rows() {
                let Some(subject_id) = string_value(subjects, row) else {
                    return Err(LongevityError::validation(format!(
                        "Correction row {row} has no subject_id"
                    )));
                };
                let Some(field_name) = string_value(fields, row) else {
                    return Err(LongevityError::validation(format!(
                        "Correction for {subject_id} has no field"
                    )));
                };
                table.insert(Correction {
                    subject_id,
                    field: field_name.parse()?,
                    value: string_value(values, row),
                    note: notes.and_then(|n| string_value(n, row)),
                })?;
            }
        }
        Ok(table)
    }

    fn insert(&mut self, correction: Correction) -> Result<()> {
        let entries = self
            .by_subject
            .entry(correction.subject_id.clone())
            .or_default();
        if entries.iter().any(|c| c.field == correction.field) {
            return Err(LongevityError::validation(format!(
                "Duplicate correction for {} / {}",
                correction.subject_id, correction.field
            )));
        }
        entries.push(correction);
        self.len += 1;
        Ok(())
    }

    /// Number of corrections in the table
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the table is empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Look up the correction for one field of one subject
    #[must_use]
    pub fn lookup(&self, subject_id: &str, field: RecordField) -> Option<&Correction> {
        self.by_subject
            .get(subject_id)
            .and_then(|entries| entries.iter().find(|c| c.field == field))
    }

    /// All corrections, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &Correction> {
        self.by_subject.values().flat_map(|entries| entries.iter())
    }

    /// Apply every correction for this record's subject
    ///
    /// Returns the fields that were overwritten.
    pub fn apply(&self, raw: &mut RawRecord) -> SmallVec<[RecordField; 2]> {
        let mut applied = SmallVec::new();
        let Some(entries) = self.by_subject.get(&raw.subject_id) else {
            return applied;
        };
        // The subject id is the lookup key; rewriting it goes last.
        let (id_fixes, field_fixes): (SmallVec<[&Correction; 2]>, SmallVec<[&Correction; 2]>) =
            entries
                .iter()
                .partition(|c| c.field == RecordField::SubjectId);
        for correction in field_fixes.into_iter().chain(id_fixes) {
            raw.set(correction.field, correction.value.clone());
            applied.push(correction.field);
        }
        applied
    }
}
