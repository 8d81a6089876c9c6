//! Resolve a biographical source by name, file name or header

use std::path::Path;
use std::sync::Arc;

use arrow::datatypes::Schema;
use log::debug;

use crate::config::SourceConfig;
use crate::error::{LongevityError, Result};
use crate::source::{BiofileSource, BiographicalSource, LahmanPeopleSource};
use crate::utils::arrow::find_column_index;
use crate::utils::io::{TableFormat, read_header};

/// The supported biographical tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Biofile,
    LahmanPeople,
}

impl SourceKind {
    /// The loader for this kind
    #[must_use]
    pub fn loader(self) -> Arc<dyn BiographicalSource> {
        match self {
            Self::Biofile => Arc::new(BiofileSource),
            Self::LahmanPeople => Arc::new(LahmanPeopleSource),
        }
    }
}

/// Create a source from its name
pub fn source_from_name(name: &str) -> Result<Arc<dyn BiographicalSource>> {
    match name.trim().to_lowercase().as_str() {
        "biofile" | "retrosheet" => Ok(SourceKind::Biofile.loader()),
        "lahman" | "people" | "master" => Ok(SourceKind::LahmanPeople.loader()),
        _ => Err(LongevityError::config(format!("Unknown source: {name}"))),
    }
}

/// Recognise a table from its columns
#[must_use]
pub fn detect_source(schema: &Schema) -> Option<SourceKind> {
    let has = |name: &str| find_column_index(schema, &[name]).is_some();
    if has("birthYear") && has("playerID") {
        Some(SourceKind::LahmanPeople)
    } else if has("BIRTHDATE") && (has("PLAYERID") || has("id")) {
        Some(SourceKind::Biofile)
    } else {
        None
    }
}

/// Create a source for a file, from its name or else its header
pub fn source_from_path(path: &Path, config: &SourceConfig) -> Result<Arc<dyn BiographicalSource>> {
    if let Some(name) = path.file_stem().and_then(|f| f.to_str()) {
        let lower = name.to_lowercase();
        if lower.contains("biofile") {
            return Ok(SourceKind::Biofile.loader());
        } else if lower.contains("people") || lower.contains("master") {
            return Ok(SourceKind::LahmanPeople.loader());
        }
    }

    if TableFormat::from_path(path) == TableFormat::Csv {
        let header = read_header(path, config)?;
        if let Some(kind) = detect_source(&header) {
            debug!("Detected {kind:?} layout in {}", path.display());
            return Ok(kind.loader());
        }
    }

    Err(LongevityError::load(
        path,
        "Could not determine the source type; pass the source name explicitly",
    ))
}
