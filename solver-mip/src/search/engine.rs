//! Branch-and-cut search controller.

use std::time::Instant;

use super::{select_branch_var, FathomReason, Frontier, NodeStatus, Subproblem};
use crate::cuts::CutPlaneAdapter;
use crate::error::{MipError, MipResult};
use crate::model::{
    Candidate, IncumbentTracker, MilpProblem, MilpSolution, NodeOutcome, NodeRecord, StopReason,
    TerminationState,
};
use crate::oracle::{LpOracle, OracleResult, OracleStatus};
use crate::settings::MipSettings;

/// Mutable state of one search.
struct SearchState {
    /// Pending nodes.
    frontier: Frontier,

    /// Best integer-feasible point.
    incumbent: IncumbentTracker,

    /// Root LP relaxation, set on the first solve.
    root_relaxation: Option<Candidate>,

    /// Global state.
    termination: TerminationState,

    /// Oracle invocations.
    oracle_calls: u64,

    /// Nodes split into children.
    nodes_branched: u64,

    /// Nodes discarded.
    nodes_fathomed: u64,

    /// Cuts appended.
    cuts_added: u64,

    /// Per-node log.
    node_log: Vec<NodeRecord>,

    /// Start time.
    start_time: Instant,
}

impl SearchState {
    fn new() -> Self {
        Self {
            frontier: Frontier::new(),
            incumbent: IncumbentTracker::new(),
            root_relaxation: None,
            termination: TerminationState::Searching,
            oracle_calls: 0,
            nodes_branched: 0,
            nodes_fathomed: 0,
            cuts_added: 0,
            node_log: Vec::new(),
            start_time: Instant::now(),
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    fn root_bound(&self) -> Option<f64> {
        self.root_relaxation.as_ref().map(|r| r.obj_val)
    }
}

/// Branch-and-cut search over LP relaxations.
///
/// The oracle is injected at construction; any [`LpOracle`] works,
/// including closures.
pub struct BranchAndCut<O: LpOracle> {
    /// Relaxation oracle.
    oracle: O,

    /// Settings.
    settings: MipSettings,
}

impl<O: LpOracle> BranchAndCut<O> {
    /// Create a new search controller.
    pub fn new(oracle: O, settings: MipSettings) -> Self {
        Self { oracle, settings }
    }

    /// Borrow the oracle.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Settings in use.
    pub fn settings(&self) -> &MipSettings {
        &self.settings
    }

    /// Run the search on `prob`.
    ///
    /// Fails only on malformed input. Infeasible problems come back as a
    /// solution with `success == false`.
    pub fn solve(&mut self, prob: &MilpProblem) -> MipResult<MilpSolution> {
        prob.validate()?;

        let objective = prob.objective();
        let mut state = SearchState::new();
        let mut adapter = self.settings.cut_planes.then(|| {
            CutPlaneAdapter::new(
                self.settings.gomory.clone(),
                prob.num_integers(),
                prob.ineq_rows.clone(),
                prob.eq_rows.clone(),
            )
        });

        let root_id = state.frontier.next_id();
        state.frontier.push(Subproblem::root(root_id, prob));

        if self.settings.verbose {
            log::info!(
                "Branch-and-cut: {} vars ({} integer), {} rows, {} equalities, cuts {}",
                prob.num_vars(),
                prob.num_integers(),
                prob.a.nrows(),
                prob.a_eq.nrows(),
                if self.settings.cut_planes { "on" } else { "off" }
            );
        }

        let stop_reason = loop {
            if state.termination == TerminationState::FeasibleWithinGap {
                break StopReason::GapClosed;
            }
            if let Some(max) = self.settings.max_nodes {
                if state.oracle_calls >= max && !state.frontier.is_empty() {
                    break StopReason::NodeLimit;
                }
            }
            if let Some(limit) = self.settings.time_limit_ms {
                if state.elapsed_ms() >= limit && !state.frontier.is_empty() {
                    break StopReason::TimeLimit;
                }
            }
            let Some(node) = state.frontier.pop() else {
                break StopReason::FrontierExhausted;
            };

            self.process_node(node, prob, &objective, &mut state, adapter.as_mut())?;

            if self.settings.verbose && state.oracle_calls % self.settings.log_freq.max(1) == 0 {
                log::info!(
                    "{:>7} calls | frontier {:>6} | incumbent {:>14.6e} | root {:>14.6e}",
                    state.oracle_calls,
                    state.frontier.len(),
                    state.incumbent.obj_val,
                    state.root_bound().unwrap_or(f64::NAN)
                );
            }
        };

        Ok(self.finish(state, stop_reason, adapter.as_ref()))
    }

    /// Solve one node and classify it.
    fn process_node(
        &mut self,
        mut node: Subproblem,
        prob: &MilpProblem,
        objective: &[f64],
        state: &mut SearchState,
        adapter: Option<&mut CutPlaneAdapter>,
    ) -> MipResult<()> {
        let selected_bound = node.parent_bound;
        let result = match self.oracle.solve(&node.relaxation(objective)) {
            Ok(result) => result,
            Err(e) => {
                log::warn!("Oracle failed at tree {}: {}", node.tree_id, e);
                OracleResult::without_point(OracleStatus::Error)
            }
        };
        state.oracle_calls += 1;

        let (mut x, obj) = match result.status {
            OracleStatus::Optimal => match result.x {
                Some(x)
                    if x.len() == prob.num_vars()
                        && result.obj_val.is_finite()
                        && x.iter().all(|v| v.is_finite()) =>
                {
                    (x, result.obj_val)
                }
                _ => {
                    log::warn!(
                        "Oracle reported an optimum without a usable point at tree {}",
                        node.tree_id
                    );
                    self.fathom(&mut node, state, selected_bound, None, FathomReason::OracleError);
                    return Ok(());
                }
            },
            status => {
                let reason = match status {
                    OracleStatus::Infeasible => FathomReason::Infeasible,
                    OracleStatus::Unbounded => FathomReason::Unbounded,
                    OracleStatus::IterationLimit => FathomReason::IterationLimit,
                    _ => FathomReason::OracleError,
                };
                self.fathom(&mut node, state, selected_bound, None, reason);
                return Ok(());
            }
        };

        prob.snap_integers(&mut x, self.settings.int_feas_tol);
        node.parent_bound = obj;
        node.status = NodeStatus::Solved;

        if state.oracle_calls == 1 {
            state.root_relaxation = Some(Candidate {
                x: x.clone(),
                obj_val: obj,
            });
            log::debug!("Root relaxation: obj = {}", obj);
        }

        if !state.incumbent.improves(obj) {
            node.solution = Some(x);
            self.fathom(&mut node, state, selected_bound, Some(obj), FathomReason::Bound);
            return Ok(());
        }

        if prob.is_integer_feasible(&x, self.settings.int_feas_tol) {
            self.accept(node, x, obj, state, selected_bound);
            return Ok(());
        }

        // Optional tightening before branching
        if let Some(adapter) = adapter {
            if node.depth > 0 || self.settings.cut_at_root {
                if let Some(cut) = adapter.separate(&x, &node.a, &node.b, &node.a_eq, &node.b_eq) {
                    log::debug!(
                        "Applying {} at tree {}: {}",
                        cut.name.as_deref().unwrap_or("cut"),
                        node.tree_id,
                        cut
                    );
                    node.append_row(&cut);
                    state.cuts_added += 1;
                } else {
                    log::debug!("No cut applied at tree {}", node.tree_id);
                }
            }
        }

        let Some(decision) = select_branch_var(&x, prob.num_integers()) else {
            return Err(MipError::InternalError(format!(
                "no fractional variable at tree {} despite integrality residual {:.3e}",
                node.tree_id,
                prob.integrality_residual(&x)
            )));
        };
        log::debug!(
            "Branching at tree {} at x{} = {}",
            node.tree_id,
            decision.var,
            decision.value
        );

        node.solution = Some(x);
        node.status = NodeStatus::Branched;
        state.nodes_branched += 1;
        self.record(state, &node, selected_bound, Some(obj), NodeOutcome::Branched);

        for (branch, row) in [(1, decision.down), (2, decision.up)] {
            let id = state.frontier.next_id();
            let mut child = node.child(id, branch);
            row.apply(&mut child);
            if child.has_empty_domain() {
                log::debug!("Tree {} has an empty domain", child.tree_id);
                let bound = child.parent_bound;
                self.fathom(&mut child, state, bound, None, FathomReason::EmptyDomain);
            } else {
                state.frontier.push(child);
            }
        }

        Ok(())
    }

    /// Accept an integral node as the new incumbent.
    fn accept(
        &self,
        mut node: Subproblem,
        x: Vec<f64>,
        obj: f64,
        state: &mut SearchState,
        selected_bound: f64,
    ) {
        state.incumbent.update(&x, obj);
        state.termination = TerminationState::FeasibleFound;
        node.status = NodeStatus::Accepted;
        node.solution = Some(x);
        self.record(state, &node, selected_bound, Some(obj), NodeOutcome::Accepted);

        let gap = state
            .root_bound()
            .map_or(f64::INFINITY, |root| state.incumbent.gap(root));
        log::info!(
            "New incumbent at tree {}: obj = {:.6}, gap = {:.2}%",
            node.tree_id,
            obj,
            gap * 100.0
        );

        if gap <= self.settings.gap_tol {
            state.termination = TerminationState::FeasibleWithinGap;
            log::info!(
                "Incumbent within {:.1}% of the root relaxation",
                self.settings.gap_tol * 100.0
            );
        } else if self.settings.prune_on_incumbent {
            let pruned = state.frontier.prune_dominated(obj);
            state.nodes_fathomed += pruned as u64;
            if pruned > 0 {
                log::debug!("Pruned {} pending nodes by bound", pruned);
            }
        }
    }

    fn fathom(
        &self,
        node: &mut Subproblem,
        state: &mut SearchState,
        selected_bound: f64,
        lp_bound: Option<f64>,
        reason: FathomReason,
    ) {
        node.status = NodeStatus::Fathomed(reason);
        state.nodes_fathomed += 1;
        log::debug!("Fathomed tree {}: {:?}", node.tree_id, reason);
        self.record(state, node, selected_bound, lp_bound, NodeOutcome::Fathomed);
    }

    fn record(
        &self,
        state: &mut SearchState,
        node: &Subproblem,
        parent_bound: f64,
        lp_bound: Option<f64>,
        outcome: NodeOutcome,
    ) {
        if self.settings.record_nodes {
            state.node_log.push(NodeRecord {
                tree_id: node.tree_id.to_string(),
                depth: node.depth,
                parent_bound,
                lp_bound,
                outcome,
            });
        }
    }

    fn finish(
        &self,
        state: SearchState,
        stop_reason: StopReason,
        adapter: Option<&CutPlaneAdapter>,
    ) -> MilpSolution {
        let gap = state
            .root_bound()
            .map_or(f64::INFINITY, |root| state.incumbent.gap(root));
        let solve_time_ms = state.elapsed_ms();
        let success = state.incumbent.has_incumbent();

        match state.termination {
            TerminationState::Searching => log::info!(
                "No solution found ({}) after {} oracle calls",
                stop_reason,
                state.oracle_calls
            ),
            TerminationState::FeasibleFound => log::info!(
                "Solution found but not within {:.1}% of the root relaxation ({}): obj = {:.6}, {} oracle calls",
                self.settings.gap_tol * 100.0,
                stop_reason,
                state.incumbent.obj_val,
                state.oracle_calls
            ),
            TerminationState::FeasibleWithinGap => log::info!(
                "Solution found within {:.1}% of the root relaxation: obj = {:.6}, {} oracle calls",
                self.settings.gap_tol * 100.0,
                state.incumbent.obj_val,
                state.oracle_calls
            ),
        }

        MilpSolution {
            success,
            termination: state.termination,
            stop_reason,
            x: state.incumbent.solution.unwrap_or_default(),
            obj_val: state.incumbent.obj_val,
            candidates: state.incumbent.history,
            root_relaxation: state.root_relaxation,
            oracle_calls: state.oracle_calls,
            nodes_branched: state.nodes_branched,
            nodes_fathomed: state.nodes_fathomed,
            cuts_added: state.cuts_added,
            cuts_lifted: adapter.map_or(0, |a| a.cuts_lifted() as u64),
            gomory_stats: adapter.map(|a| a.stats().clone()).unwrap_or_default(),
            gap,
            solve_time_ms,
            node_log: state.node_log,
        }
    }
}
