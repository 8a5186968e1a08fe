//! Error types for the Crosslight core
//!
//! ## Table of Contents
//! - **Error**: failure conditions surfaced to the transport layer
//! - **Result**: Type alias for `Result<T, Error>`

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure conditions of the core.
///
/// None of these are fatal. Every operation either succeeds or reports
/// exactly one of them to its caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed input to an operation that validates its arguments
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown agent or intersection id
    #[error("not found: {0}")]
    NotFound(String),
}
