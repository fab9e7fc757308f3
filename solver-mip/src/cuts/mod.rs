//! Cutting planes for the branch-and-cut search.
//!
//! This module provides:
//! - The linear cut record shared by branching rows and cuts
//! - Gomory fractional cuts from the relaxation tableau
//! - The adapter lifting integer sub-system cuts to the full space

mod cut;
pub mod gomory;
mod lifting;

pub use cut::{CutSource, LinearCut};
pub use gomory::{GomoryCutGenerator, GomorySettings, GomoryStats};
pub use lifting::CutPlaneAdapter;
