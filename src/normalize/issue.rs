//! Field-level normalization failures
//!
//! A failure never stops a run. It nulls the field, is recorded against the
//! subject, and is counted in the audit.

use serde::{Deserialize, Serialize};

use crate::models::RecordField;

/// Why a single field value could not be normalized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ParseFailure {
    /// The text does not match any accepted layout
    #[error("unrecognized format: {0:?}")]
    Unrecognized(String),

    /// A component is not a number or is out of its range
    #[error("invalid component: {0}")]
    InvalidComponent(String),

    /// Year outside the accepted window
    #[error("year {0} out of range")]
    YearOutOfRange(i32),

    /// Components are individually valid but do not form a calendar date
    #[error("no such calendar date: {0}")]
    InvalidDate(String),

    /// A measurement that parsed but cannot be right
    #[error("implausible value: {0}")]
    Implausible(String),
}

/// A failed field on a specific record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    /// Subject whose field failed
    pub subject_id: String,
    /// The field that failed
    pub field: RecordField,
    /// The raw text after corrections were applied
    pub raw: String,
    /// Why it failed
    pub failure: ParseFailure,
}

/// A broken ordering between two dates on one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderViolation {
    /// Subject with out-of-order dates
    pub subject_id: String,
    /// Field expected to come first
    pub earlier: RecordField,
    /// Field expected to come later; `None` means the as-of date
    pub later: Option<RecordField>,
}
