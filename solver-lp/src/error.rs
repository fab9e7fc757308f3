//! Error types for the LP layer.

use thiserror::Error;

/// Errors raised before or during an LP solve.
///
/// Infeasibility and unboundedness are *statuses*, not errors; this type only
/// covers malformed input and internal breakdowns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LpError {
    /// Problem dimensions or values are inconsistent.
    #[error("Invalid LP: {0}")]
    InvalidProblem(String),

    /// The tableau picked up non-finite values during pivoting.
    #[error("Numerical breakdown: {0}")]
    Numerical(String),
}

/// Result type for LP operations.
pub type LpResult<T> = Result<T, LpError>;
