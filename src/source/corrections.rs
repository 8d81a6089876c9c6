//! Loader for the correction table (`subject_id,field,value[,note]`)

use crate::source::SourceLoader;

/// Loader for the correction table
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrectionSource;

impl SourceLoader for CorrectionSource {
    fn source_name(&self) -> &'static str {
        "corrections"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &["subject_id", "field", "value"]
    }
}
