//! Error types for the tag store document

use thiserror::Error;

/// Errors that can occur when parsing or building a tag store document
#[derive(Error, Debug)]
pub enum TagError {
    /// JSON parsing or serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Type alias for tag store results
pub type Result<T> = std::result::Result<T, TagError>;
