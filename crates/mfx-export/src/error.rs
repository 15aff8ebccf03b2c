//! Error types for export runs.

use thiserror::Error;

/// Errors surfaced to the caller of an export run.
///
/// Per-entry and per-cell degradations (unavailable forms, non-UTF-8 output)
/// are absorbed during the run and reported through `RunStats` instead.
#[derive(Debug, Error)]
pub enum ExportError {
    /// No export is registered under this name.
    #[error("export '{name}' is not registered")]
    ExportNotFound { name: String },

    /// Writing the delimited document failed.
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExportError::ExportNotFound {
            name: "Contacts".to_string(),
        };
        assert_eq!(err.to_string(), "export 'Contacts' is not registered");
    }
}
