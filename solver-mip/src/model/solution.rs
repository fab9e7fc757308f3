//! MILP solution types.

use std::fmt;

use crate::cuts::GomoryStats;

/// Global state of the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationState {
    /// No integer-feasible point accepted yet.
    Searching,

    /// At least one incumbent, gap above tolerance.
    FeasibleFound,

    /// Incumbent within the gap tolerance of the root relaxation.
    FeasibleWithinGap,
}

impl TerminationState {
    /// Returns true if a feasible solution was found.
    pub fn has_solution(&self) -> bool {
        !matches!(self, TerminationState::Searching)
    }
}

impl fmt::Display for TerminationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationState::Searching => write!(f, "Searching"),
            TerminationState::FeasibleFound => write!(f, "Feasible"),
            TerminationState::FeasibleWithinGap => write!(f, "Feasible within gap"),
        }
    }
}

/// Why the search loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every node was solved or fathomed.
    FrontierExhausted,

    /// Incumbent reached the gap tolerance.
    GapClosed,

    /// Oracle-call cap reached.
    NodeLimit,

    /// Wall-clock cap reached.
    TimeLimit,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::FrontierExhausted => write!(f, "frontier exhausted"),
            StopReason::GapClosed => write!(f, "gap closed"),
            StopReason::NodeLimit => write!(f, "node limit"),
            StopReason::TimeLimit => write!(f, "time limit"),
        }
    }
}

/// A point with its objective value.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Point in the full variable space.
    pub x: Vec<f64>,

    /// Objective value at `x`.
    pub obj_val: f64,
}

/// What happened to a node once it left the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeOutcome {
    /// Integral and accepted as incumbent.
    Accepted,

    /// Split into two children.
    Branched,

    /// Discarded.
    Fathomed,
}

/// One entry of the per-node log.
#[derive(Debug, Clone)]
pub struct NodeRecord {
    /// Decimal path label (root = 1).
    pub tree_id: String,

    /// Depth in the tree.
    pub depth: usize,

    /// Bound the node was selected with.
    pub parent_bound: f64,

    /// LP value of the node (None when the oracle had no optimum).
    pub lp_bound: Option<f64>,

    /// Classification.
    pub outcome: NodeOutcome,
}

/// Complete MILP solution with diagnostics.
#[derive(Debug, Clone)]
pub struct MilpSolution {
    /// True if an integer-feasible point was found.
    pub success: bool,

    /// Final search state.
    pub termination: TerminationState,

    /// Why the loop ended.
    pub stop_reason: StopReason,

    /// Best integer-feasible point (empty if none).
    pub x: Vec<f64>,

    /// Objective of the best point (+inf if none).
    pub obj_val: f64,

    /// Every accepted incumbent, in acceptance order.
    pub candidates: Vec<Candidate>,

    /// Root LP relaxation (None if the root had no optimum).
    pub root_relaxation: Option<Candidate>,

    /// Number of LP oracle invocations.
    pub oracle_calls: u64,

    /// Number of nodes split into children.
    pub nodes_branched: u64,

    /// Number of nodes discarded.
    pub nodes_fathomed: u64,

    /// Number of cuts appended by the cut-plane pass.
    pub cuts_added: u64,

    /// Lifted cuts the adapter produced.
    pub cuts_lifted: u64,

    /// Gomory generator statistics (all zero when the cut pass is off).
    pub gomory_stats: GomoryStats,

    /// Relative gap between incumbent and root relaxation.
    pub gap: f64,

    /// Total solve time in milliseconds.
    pub solve_time_ms: u64,

    /// Per-node log (empty unless enabled in settings).
    pub node_log: Vec<NodeRecord>,
}

impl MilpSolution {
    /// Root relaxation objective, if the root was solved.
    pub fn root_bound(&self) -> Option<f64> {
        self.root_relaxation.as_ref().map(|r| r.obj_val)
    }

    /// Compute the relative gap `|incumbent - root| / |root|`.
    ///
    /// The denominator is floored at 1e-10 so a zero root value does not
    /// divide by zero.
    pub fn compute_gap(incumbent: f64, root: f64) -> f64 {
        if incumbent.is_infinite() || root.is_infinite() {
            return f64::INFINITY;
        }
        let denom = root.abs().max(1e-10);
        (incumbent - root).abs() / denom
    }
}

/// Tracks the best known integer-feasible solution (incumbent) and every
/// point ever accepted.
#[derive(Debug, Clone)]
pub struct IncumbentTracker {
    /// Current best solution (if any).
    pub solution: Option<Vec<f64>>,

    /// Objective value of incumbent.
    /// Initialized to +inf for minimization.
    pub obj_val: f64,

    /// Accepted candidates in order.
    pub history: Vec<Candidate>,
}

impl Default for IncumbentTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl IncumbentTracker {
    /// Create a new incumbent tracker.
    pub fn new() -> Self {
        Self {
            solution: None,
            obj_val: f64::INFINITY,
            history: Vec::new(),
        }
    }

    /// Check if we have an incumbent.
    pub fn has_incumbent(&self) -> bool {
        self.solution.is_some()
    }

    /// True if `obj` is strictly better than the incumbent.
    pub fn improves(&self, obj: f64) -> bool {
        obj < self.obj_val
    }

    /// Try to update incumbent with a new solution.
    ///
    /// Returns true if the incumbent was replaced.
    pub fn update(&mut self, x: &[f64], obj: f64) -> bool {
        if !self.improves(obj) {
            return false;
        }
        self.solution = Some(x.to_vec());
        self.obj_val = obj;
        self.history.push(Candidate {
            x: x.to_vec(),
            obj_val: obj,
        });
        true
    }

    /// Number of accepted updates.
    pub fn update_count(&self) -> usize {
        self.history.len()
    }

    /// Gap to the root relaxation value.
    pub fn gap(&self, root: f64) -> f64 {
        MilpSolution::compute_gap(self.obj_val, root)
    }

    /// Check if the gap is within tolerance.
    pub fn gap_closed(&self, root: f64, tol: f64) -> bool {
        self.has_incumbent() && self.gap(root) <= tol
    }
}
