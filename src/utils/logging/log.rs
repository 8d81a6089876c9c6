//! Logging helpers with a consistent message shape for file operations

use std::path::Path;
use std::time::Duration;

/// Log the start of a file operation
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{} {}", operation, path.display());
}

/// Log the completion of a file operation
///
/// `rows` is the number of table rows read or written.
pub fn log_operation_complete(operation: &str, path: &Path, rows: usize, elapsed: Option<Duration>) {
    match elapsed {
        Some(duration) => log::info!(
            "{} {} rows {} {} in {:?}",
            operation,
            rows,
            preposition(operation),
            path.display(),
            duration
        ),
        None => log::info!(
            "{} {} rows {} {}",
            operation,
            rows,
            preposition(operation),
            path.display()
        ),
    }
}

/// Log a warning, optionally tied to a path
pub fn log_warning(message: &str, path: Option<&Path>) {
    if let Some(path) = path {
        log::warn!("{}: {}", message, path.display());
    } else {
        log::warn!("{message}");
    }
}

fn preposition(operation: &str) -> &'static str {
    if operation.to_lowercase().starts_with("wr") {
        "to"
    } else {
        "from"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preposition() {
        assert_eq!(preposition("Wrote"), "to");
        assert_eq!(preposition("Read"), "from");
    }
}
