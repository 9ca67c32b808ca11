//! Error types for polling

use thiserror::Error;

/// A failed poll run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    #[error("Poll handler failed: {0}")]
    Handler(String),
}

impl PollError {
    pub fn handler(error: impl std::fmt::Display) -> Self {
        Self::Handler(error.to_string())
    }
}

pub type PollResult<T> = std::result::Result<T, PollError>;
