//! Error types for ML data pipelines

use std::io;
use thiserror::Error;

/// Result type for ML data pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for ML data pipeline operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Index out of bounds
    #[error("Index out of bounds: index {index}, length {len}")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Length of the indexed sequence
        len: usize,
    },

    /// Named field does not exist
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Two components produced the same field name
    #[error("Field name already exists: {0}")]
    DuplicateField(String),

    /// Data type mismatch
    #[error("Data type mismatch: {0}")]
    TypeMismatch(String),

    /// Transformation error
    #[error("Transformation error: {0}")]
    TransformationError(String),

    /// Error raised by a user-supplied callback
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Shorthand for [`Error::IndexOutOfBounds`]
    pub fn out_of_bounds(index: usize, len: usize) -> Self {
        Error::IndexOutOfBounds { index, len }
    }
}
