use std::fmt::Debug;
use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SmartTreeError {
    /// Malformed construction or query parameters. Raised before any mutation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Descent could not resolve a node containing the requested point.
    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, SmartTreeError>;
