//! Error types for taskgrove core operations
//!
//! Every core operation returns one of three typed failures. The HTTP
//! layer maps them to status codes; nothing in the core ever panics on
//! bad input.

use thiserror::Error;

/// Result alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Typed failures produced by the store and its components
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Unknown group/task id, or an unrecognized sort/type/period keyword
    #[error("not found: {0}")]
    NotFound(String),

    /// Empty required field or a reference to a nonexistent group
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Duplicate/colliding id, no-op state transition, or a deletion
    /// blocked by dependents
    #[error("conflict: {0}")]
    Conflict(String),
}

impl Error {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Error::Conflict(msg.into())
    }
}
