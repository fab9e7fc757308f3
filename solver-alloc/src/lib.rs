//! Airline fleet allocation on top of the fleetmip branch-and-cut solver.
//!
//! An instance assigns one-way trips of each aircraft type to each route and
//! the passengers carried on them, minimizing operating cost net of ticket
//! revenue. [`formulate`] turns [`AllocationData`] into a [`MilpProblem`]
//! whose integer block is the trip counts; [`AllocationReport`] turns the
//! solution back into round-trip figures.
//!
//! ```no_run
//! use solver_alloc::{solve_allocation, AllocationData};
//! use solver_mip::MipSettings;
//!
//! let data = AllocationData::load("data/two_routes.json").unwrap();
//! let outcome = solve_allocation(&data, &MipSettings::default()).unwrap();
//! if let Some(report) = &outcome.report {
//!     println!("profit {}", report.profit);
//! }
//! ```
//!
//! [`MilpProblem`]: solver_mip::MilpProblem

#![warn(missing_docs)]

pub mod data;
pub mod error;
pub mod formulate;
pub mod report;

pub use data::{AircraftType, AllocationData, Route};
pub use error::{AllocError, AllocResult};
pub use formulate::formulate;
pub use report::{AllocationReport, RouteAllocation, RouteSummary, TypeSummary};

use solver_mip::{solve_milp, MilpSolution, MipSettings};

/// Search result together with its report.
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    /// Raw branch-and-cut result.
    pub solution: MilpSolution,

    /// Report for the incumbent, if one was found.
    pub report: Option<AllocationReport>,
}

/// Formulate, solve and report an allocation instance.
pub fn solve_allocation(data: &AllocationData, settings: &MipSettings) -> AllocResult<AllocationOutcome> {
    let prob = formulate(data)?;
    let solution = solve_milp(&prob, settings)?;

    let report = if solution.success {
        Some(AllocationReport::from_solution(data, &solution.x)?)
    } else {
        log::warn!("No feasible allocation found ({})", solution.stop_reason);
        None
    };

    Ok(AllocationOutcome { solution, report })
}
