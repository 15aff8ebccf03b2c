//! Error types for the export data model.

use thiserror::Error;

/// Errors raised while building model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Export or column name is empty after trimming.
    #[error("{kind} name must not be empty")]
    EmptyName { kind: &'static str },

    /// Field identifier is empty after trimming.
    #[error("invalid field id '{0}'")]
    InvalidFieldId(String),

    /// Column name appears twice in an explicit column map.
    #[error("column '{name}' is already defined")]
    DuplicateColumn { name: String },
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelError::DuplicateColumn {
            name: "Email".to_string(),
        };
        assert_eq!(err.to_string(), "column 'Email' is already defined");

        let err = ModelError::EmptyName { kind: "export" };
        assert_eq!(err.to_string(), "export name must not be empty");
    }
}
