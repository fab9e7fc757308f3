//! Error types for the MIP solver.

use solver_lp::LpError;
use thiserror::Error;

/// Errors that can occur during MIP solving.
///
/// Only malformed input aborts a solve. Oracle failures on individual nodes
/// fathom the node and the search carries on.
#[derive(Error, Debug)]
pub enum MipError {
    /// Problem validation failed
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    /// LP relaxation oracle failed
    #[error("Oracle failed: {0}")]
    OracleError(String),

    /// Internal solver error
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Error bubbled up from the LP layer
    #[error("LP error: {0}")]
    Lp(#[from] LpError),
}

/// Result type for MIP operations.
pub type MipResult<T> = Result<T, MipError>;
