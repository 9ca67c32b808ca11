//! Error types for Gridkit

use thiserror::Error;

/// Core error type for grid operations
#[derive(Error, Debug)]
pub enum GridError {
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Invalid limit: {0} (must be greater than zero)")]
    InvalidLimit(usize),

    #[error("Serialization error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("Cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl GridError {
    /// Create a fetch error from anything printable.
    pub fn fetch(message: impl std::fmt::Display) -> Self {
        Self::Fetch(message.to_string())
    }
}

/// Result type alias for grid operations
pub type GridResult<T> = std::result::Result<T, GridError>;
