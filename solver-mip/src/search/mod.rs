//! Branch-and-cut search tree management.

mod branching;
mod engine;
mod frontier;
mod node;

pub use branching::{select_branch_var, BranchDecision, BranchRow};
pub use engine::BranchAndCut;
pub use frontier::Frontier;
pub use node::{FathomReason, NodeId, NodeStatus, Subproblem, TreeId};
