//! Error types for the allocation model.

use solver_mip::MipError;
use thiserror::Error;

/// Errors raised while loading, formulating or reporting an allocation.
#[derive(Error, Debug)]
pub enum AllocError {
    /// Instance data failed validation
    #[error("Invalid allocation data: {0}")]
    InvalidData(String),

    /// Solution vector does not match the instance
    #[error("Solution mismatch: {0}")]
    SolutionMismatch(String),

    /// Reading or writing a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the MILP layer
    #[error("Solver error: {0}")]
    Solver(#[from] MipError),
}

/// Result type for allocation operations.
pub type AllocResult<T> = Result<T, AllocError>;
