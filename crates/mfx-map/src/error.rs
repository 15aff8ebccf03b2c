//! Error types for registry operations.

use mfx_model::ModelError;
use thiserror::Error;

/// Errors from building or registering export definitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// An export with this name is already registered.
    #[error("export name '{name}' has already been registered")]
    DuplicateName { name: String },

    /// The definition itself is malformed.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
