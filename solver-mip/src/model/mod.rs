//! Problem and solution types for the MILP solver.

mod problem;
mod solution;

pub(crate) use problem::row_touches_integers;
pub use problem::{MilpProblem, RowPartition};
pub use solution::{
    Candidate, IncumbentTracker, MilpSolution, NodeOutcome, NodeRecord, StopReason,
    TerminationState,
};
