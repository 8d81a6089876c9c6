//! Utility functions for error handling
//!
//! File helpers that attach the path and purpose to load failures. A load
//! failure is fatal for the run, so the message has to say which table broke.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{LongevityError, Result};

/// Safely open a file with rich error information
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    validate_file(path, purpose)?;

    fs::File::open(path).map_err(|e| {
        let message = match e.kind() {
            io::ErrorKind::PermissionDenied => {
                format!("Permission denied while opening {purpose}")
            }
            io::ErrorKind::NotFound => {
                format!("File disappeared before it could be opened for {purpose}")
            }
            _ => format!("Failed to open file for {purpose}: {e}"),
        };
        LongevityError::load(path, message)
    })
}

/// Check that a path exists and is a regular file
pub fn validate_file(path: &Path, purpose: &str) -> Result<()> {
    if !path.exists() {
        return Err(LongevityError::load(
            path,
            format!("File not found (needed for {purpose})"),
        ));
    }

    if !path.is_file() {
        return Err(LongevityError::load(
            path,
            format!("Path is not a file (expected {purpose})"),
        ));
    }

    Ok(())
}

/// Create the parent directory of an output path if it does not exist yet
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Safely read a file to string with rich error information
pub fn safe_read_to_string(path: &Path, purpose: &str) -> Result<String> {
    let mut file = safe_open_file(path, purpose)?;

    let mut content = String::new();
    io::Read::read_to_string(&mut file, &mut content).map_err(|e| {
        let message = match e.kind() {
            io::ErrorKind::InvalidData => {
                format!("{purpose} contains invalid UTF-8 data")
            }
            _ => format!("Failed to read {purpose}: {e}"),
        };
        LongevityError::load(path, message)
    })?;

    Ok(content)
}
