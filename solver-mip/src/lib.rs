//! Mixed-integer linear programming layer for fleetmip.
//!
//! Branch-and-cut over LP relaxations for problems whose design vector is an
//! integer block followed by a continuous block:
//!
//! - Best-bound node selection on an arena-backed frontier
//! - Branching on the most fractional integer variable
//! - Gomory fractional cuts, optionally lifted from the integer sub-system
//! - Termination on a relative gap to the root relaxation
//!
//! The LP solver is injected through [`LpOracle`]; [`SimplexOracle`] wraps the
//! dense simplex from `solver-lp`.
//!
//! # Example
//!
//! ```
//! use nalgebra::DMatrix;
//! use solver_mip::{solve_milp, MilpProblem, MipSettings};
//!
//! // max 5x0 + 4x1  s.t.  6x0 + 4x1 <= 24,  x0 + 2x1 <= 6,  x integer
//! let prob = MilpProblem::new(
//!     vec![-5.0, -4.0],
//!     vec![],
//!     DMatrix::from_row_slice(2, 2, &[6.0, 4.0, 1.0, 2.0]),
//!     vec![24.0, 6.0],
//!     vec![0.0, 0.0],
//!     vec![f64::INFINITY, f64::INFINITY],
//! )
//! .unwrap();
//!
//! let sol = solve_milp(&prob, &MipSettings::default().with_gap_tol(0.0)).unwrap();
//! assert!(sol.success);
//! assert!((sol.obj_val + 20.0).abs() < 1e-6);
//! ```

#![warn(missing_docs)]

pub mod cuts;
pub mod error;
pub mod model;
pub mod oracle;
pub mod search;
pub mod settings;

pub use cuts::{
    CutPlaneAdapter, CutSource, GomoryCutGenerator, GomorySettings, GomoryStats, LinearCut,
};
pub use error::{MipError, MipResult};
pub use model::{
    Candidate, MilpProblem, MilpSolution, NodeOutcome, NodeRecord, RowPartition, StopReason,
    TerminationState,
};
pub use oracle::{LpOracle, OracleResult, OracleStatus, Relaxation, SimplexOracle};
pub use search::BranchAndCut;
pub use settings::MipSettings;

/// Solve a MILP with the built-in simplex oracle.
pub fn solve_milp(prob: &MilpProblem, settings: &MipSettings) -> MipResult<MilpSolution> {
    let oracle = SimplexOracle::new(settings.simplex.clone());
    solve_milp_with(prob, oracle, settings)
}

/// Solve a MILP with a caller-supplied oracle.
pub fn solve_milp_with<O: LpOracle>(
    prob: &MilpProblem,
    oracle: O,
    settings: &MipSettings,
) -> MipResult<MilpSolution> {
    BranchAndCut::new(oracle, settings.clone()).solve(prob)
}
