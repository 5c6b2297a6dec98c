//! Error types for resource path handling

use thiserror::Error;

/// Errors that can occur when mapping between resource and file paths
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResourceError {
    /// Pack identifier is empty, too long or not alphanumeric
    #[error("Invalid pack id {0:?}: expected 1-64 ASCII alphanumeric characters")]
    InvalidPackId(String),

    /// File is not below the pack root
    #[error("Path {path} is outside pack root {root}")]
    OutsideRoot {
        /// Offending file path
        path: String,
        /// Pack root
        root: String,
    },

    /// Relative path is empty after normalization
    #[error("Empty relative path for {0}")]
    EmptyPath(String),
}

/// Type alias for resource path results
pub type Result<T> = std::result::Result<T, ResourceError>;
