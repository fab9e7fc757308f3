//! Integration tests for the branch-and-cut search.

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use nalgebra::DMatrix;
use solver_mip::{
    solve_milp, solve_milp_with, MilpProblem, MipError, MipResult, MipSettings, NodeOutcome,
    OracleResult, OracleStatus, Relaxation, SimplexOracle, StopReason, TerminationState,
};

const INF: f64 = f64::INFINITY;

/// Exhaustive search settings with the node log on.
fn exhaustive() -> MipSettings {
    let mut settings = MipSettings::default().with_gap_tol(0.0).with_node_log();
    settings.cut_planes = false;
    settings
}

/// Binary knapsack:
///
/// max 3x0 + 2x1 + 4x2
/// s.t. 2x0 + x1 + 3x2 <= 4
///      x binary
fn knapsack() -> MilpProblem {
    MilpProblem::new(
        vec![-3.0, -2.0, -4.0],
        vec![],
        DMatrix::from_row_slice(1, 3, &[2.0, 1.0, 3.0]),
        vec![4.0],
        vec![0.0; 3],
        vec![1.0; 3],
    )
    .unwrap()
}

/// Two routes flown by one aircraft type. Trips x0, x1 are integer,
/// passengers p0, p1 continuous.
///
/// min 2000x0 + 3100x1 - 100p0 - 150p1
/// s.t. p0 <= 250, p1 <= 450               (demand)
///      -p0 <= -50, -p1 <= -90             (minimum service)
///      3.5x0 + 5x1 <= 48                  (fleet utilization)
///      -100x0 + p0 <= 0, -100x1 + p1 <= 0 (seat capacity)
///      0 <= x <= 10, p >= 0
fn two_routes() -> MilpProblem {
    #[rustfmt::skip]
    let a = DMatrix::from_row_slice(7, 4, &[
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
        0.0, 0.0, -1.0, 0.0,
        0.0, 0.0, 0.0, -1.0,
        3.5, 5.0, 0.0, 0.0,
        -100.0, 0.0, 1.0, 0.0,
        0.0, -100.0, 0.0, 1.0,
    ]);
    MilpProblem::new(
        vec![2000.0, 3100.0],
        vec![-100.0, -150.0],
        a,
        vec![250.0, 450.0, -50.0, -90.0, 48.0, 0.0, 0.0],
        vec![0.0; 4],
        vec![10.0, 10.0, INF, INF],
    )
    .unwrap()
}

#[test]
fn test_knapsack_optimum() {
    let prob = knapsack();
    let sol = solve_milp(&prob, &exhaustive()).unwrap();

    assert!(sol.success);
    assert_eq!(sol.stop_reason, StopReason::FrontierExhausted);
    assert!((sol.obj_val + 6.0).abs() < 1e-6, "obj = {}", sol.obj_val);
    assert!((sol.x[1] - 1.0).abs() < 1e-6);
    assert!((sol.x[2] - 1.0).abs() < 1e-6);
    assert!(prob.is_feasible(&sol.x, 1e-6));
}

#[test]
fn test_two_route_allocation_trace() {
    let prob = two_routes();
    let sol = solve_milp(&prob, &exhaustive().with_gap_tol(0.03)).unwrap();

    assert!(sol.success);
    let expected = [3.0, 5.0, 250.0, 450.0];
    for (got, want) in sol.x.iter().zip(expected) {
        assert!((got - want).abs() < 1e-6, "x = {:?}", sol.x);
    }
    assert!((sol.obj_val + 71000.0).abs() < 1e-6);

    let root = sol.root_relaxation.as_ref().unwrap();
    assert!((root.obj_val + 73550.0).abs() < 1e-6);
    assert!((root.x[0] - 2.5).abs() < 1e-6);
    assert!((root.x[1] - 4.5).abs() < 1e-6);

    // Root, 11, 111, 112, 12, 121, 122
    assert_eq!(sol.oracle_calls, 7);
    let values: Vec<f64> = sol.candidates.iter().map(|c| c.obj_val).collect();
    assert_eq!(values.len(), 3);
    assert!((values[0] + 63600.0).abs() < 1e-6);
    assert!((values[1] + 68000.0).abs() < 1e-6);
    assert!((values[2] + 71000.0).abs() < 1e-6);

    // 2550 / 73550 is just above 3%
    assert_eq!(sol.termination, TerminationState::FeasibleFound);
    assert_eq!(sol.stop_reason, StopReason::FrontierExhausted);
    assert!(sol.gap > 0.03);

    let order: Vec<&str> = sol.node_log.iter().map(|r| r.tree_id.as_str()).collect();
    assert_eq!(order, vec!["1", "11", "111", "112", "12", "121", "122"]);
    assert_eq!(sol.node_log[5].outcome, NodeOutcome::Fathomed);
}

#[test]
fn test_gap_rule_stops_early() {
    let prob = two_routes();
    let sol = solve_milp(&prob, &exhaustive().with_gap_tol(0.08)).unwrap();

    // -68000 is within 8% of -73550, found on the fourth solve
    assert_eq!(sol.termination, TerminationState::FeasibleWithinGap);
    assert_eq!(sol.stop_reason, StopReason::GapClosed);
    assert_eq!(sol.oracle_calls, 4);
    assert!((sol.obj_val + 68000.0).abs() < 1e-6);
    assert!(sol.gap <= 0.08);
}

#[test]
fn test_infeasible_problem() {
    // 2x0 = 1 with x0 integer
    let prob = MilpProblem::new(
        vec![1.0],
        vec![],
        DMatrix::from_row_slice(2, 1, &[2.0, -2.0]),
        vec![1.0, -1.0],
        vec![0.0],
        vec![10.0],
    )
    .unwrap();
    let sol = solve_milp(&prob, &exhaustive()).unwrap();

    assert!(!sol.success);
    assert_eq!(sol.termination, TerminationState::Searching);
    assert!(sol.x.is_empty());
    assert!(sol.candidates.is_empty());
    assert_eq!(sol.obj_val, INF);
    assert_eq!(sol.oracle_calls, 3);
    assert_eq!(sol.nodes_branched, 1);
    assert_eq!(sol.nodes_fathomed, 2);
}

#[test]
fn test_iteration_limit_is_never_an_incumbent() {
    let mut calls = 0;
    let oracle = |_: &Relaxation<'_>| -> MipResult<OracleResult> {
        calls += 1;
        Ok(OracleResult::without_point(OracleStatus::IterationLimit))
    };
    let sol = solve_milp_with(&knapsack(), oracle, &exhaustive()).unwrap();

    assert!(!sol.success);
    assert!(sol.root_relaxation.is_none());
    assert_eq!(sol.oracle_calls, 1);
    assert_eq!(sol.nodes_fathomed, 1);
    assert_eq!(calls, 1);
}

#[test]
fn test_oracle_errors_fathom_only_the_node() {
    // Solve normally except for the up branch, whose oracle call fails
    let prob = two_routes();
    let mut inner = solver_mip::SimplexOracle::default();
    let oracle = move |r: &Relaxation<'_>| -> MipResult<OracleResult> {
        let up_branch = r.b.len() == 8 && r.b[7] < 0.0;
        if up_branch {
            return Err(MipError::OracleError("injected".to_string()));
        }
        solver_mip::LpOracle::solve(&mut inner, r)
    };
    let sol = solve_milp_with(&prob, oracle, &exhaustive()).unwrap();

    // Only the x0 <= 2 subtree is explored: best is (2, 5) at -68000
    assert!(sol.success);
    assert!((sol.obj_val + 68000.0).abs() < 1e-6);
    assert!(prob.is_feasible(&sol.x, 1e-6));
}

#[test]
fn test_node_limit_returns_partial_result() {
    let prob = two_routes();
    let sol = solve_milp(&prob, &exhaustive().with_max_nodes(3)).unwrap();

    assert_eq!(sol.stop_reason, StopReason::NodeLimit);
    assert_eq!(sol.oracle_calls, 3);
    assert!(sol.success);
    assert_eq!(sol.termination, TerminationState::FeasibleFound);
    assert!((sol.obj_val + 63600.0).abs() < 1e-6);
}

#[test]
fn test_malformed_input_fails_fast() {
    let mut prob = knapsack();
    prob.b.push(1.0);

    let mut called = false;
    let oracle = |_: &Relaxation<'_>| -> MipResult<OracleResult> {
        called = true;
        Ok(OracleResult::infeasible())
    };
    let err = solve_milp_with(&prob, oracle, &exhaustive());
    assert!(matches!(err, Err(MipError::InvalidProblem(_))));
    assert!(!called);
}

#[test]
fn test_equality_constraints() {
    // min -x0 - 2x1 + y  s.t. x0 + x1 + y = 3.5, x0 - x1 <= 0.5, x integer, y >= 0
    let prob = MilpProblem::new(
        vec![-1.0, -2.0],
        vec![1.0],
        DMatrix::from_row_slice(1, 3, &[1.0, -1.0, 0.0]),
        vec![0.5],
        vec![0.0; 3],
        vec![INF; 3],
    )
    .unwrap()
    .with_equalities(DMatrix::from_row_slice(1, 3, &[1.0, 1.0, 1.0]), vec![3.5])
    .unwrap();

    let sol = solve_milp(&prob, &exhaustive()).unwrap();
    assert!(sol.success);
    assert!(prob.is_feasible(&sol.x, 1e-6));
    // x1 = 3, x0 = 0, y = 0.5
    assert!((sol.obj_val + 5.5).abs() < 1e-6, "obj = {}", sol.obj_val);
}

#[test]
fn test_bound_monotonicity_and_improving_incumbents() {
    let prob = two_routes();
    let sol = solve_milp(&prob, &exhaustive()).unwrap();

    let bounds: HashMap<&str, f64> = sol
        .node_log
        .iter()
        .filter_map(|r| r.lp_bound.map(|b| (r.tree_id.as_str(), b)))
        .collect();
    for (id, bound) in &bounds {
        if id.len() > 1 {
            let parent = bounds[&id[..id.len() - 1]];
            assert!(*bound >= parent - 1e-9, "tree {}: {} < parent {}", id, bound, parent);
        }
    }

    for pair in sol.candidates.windows(2) {
        assert!(pair[1].obj_val < pair[0].obj_val);
    }
    for cand in &sol.candidates {
        assert!(prob.is_feasible(&cand.x, 1e-6));
    }
}

#[test]
fn test_prune_on_incumbent_keeps_result() {
    let prob = two_routes();
    let mut settings = exhaustive();
    settings.prune_on_incumbent = true;
    let pruned = solve_milp(&prob, &settings).unwrap();
    let plain = solve_milp(&prob, &exhaustive()).unwrap();

    assert!((pruned.obj_val - plain.obj_val).abs() < 1e-6);
    assert!(pruned.oracle_calls <= plain.oracle_calls);
}

#[test]
fn test_non_finite_point_is_fathomed() {
    let oracle = |_: &Relaxation<'_>| -> MipResult<OracleResult> {
        Ok(OracleResult::optimal(vec![f64::NAN, 0.0, 0.0], -1.0))
    };
    let sol = solve_milp_with(&knapsack(), oracle, &exhaustive().with_max_nodes(20)).unwrap();

    assert!(!sol.success);
    assert_eq!(sol.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(sol.oracle_calls, 1);
    assert_eq!(sol.nodes_branched, 0);
    assert_eq!(sol.nodes_fathomed, 1);
    assert!(sol.root_relaxation.is_none());
    assert_eq!(sol.node_log[0].outcome, NodeOutcome::Fathomed);
}

#[test]
fn test_time_limit_before_first_solve() {
    let sol = solve_milp(&knapsack(), &exhaustive().with_time_limit(0.0)).unwrap();

    assert!(!sol.success);
    assert_eq!(sol.stop_reason, StopReason::TimeLimit);
    assert_eq!(sol.termination, TerminationState::Searching);
    assert_eq!(sol.oracle_calls, 0);
}

#[test]
fn test_time_limit_keeps_incumbent() {
    // Root (x2 = 1/3) branches; tree 11 is integral at -5 and takes longer
    // than the limit, so the search stops with 12 still pending
    let mut inner = SimplexOracle::default();
    let mut calls = 0;
    let oracle = move |r: &Relaxation<'_>| -> MipResult<OracleResult> {
        calls += 1;
        if calls == 2 {
            thread::sleep(Duration::from_millis(200));
        }
        solver_mip::LpOracle::solve(&mut inner, r)
    };
    let sol = solve_milp_with(&knapsack(), oracle, &exhaustive().with_time_limit(0.1)).unwrap();

    assert_eq!(sol.stop_reason, StopReason::TimeLimit);
    assert!(sol.success);
    assert_eq!(sol.termination, TerminationState::FeasibleFound);
    assert_eq!(sol.oracle_calls, 2);
    assert!((sol.obj_val + 5.0).abs() < 1e-6);
    assert!(knapsack().is_feasible(&sol.x, 1e-6));
}

#[test]
fn test_cut_planes_keep_feasibility() {
    let mut settings = exhaustive();
    settings.cut_planes = true;
    settings.cut_at_root = true;

    for prob in [knapsack(), two_routes()] {
        let reference = solve_milp(&prob, &exhaustive()).unwrap();
        let sol = solve_milp(&prob, &settings).unwrap();

        // Cut rows only ever live on subproblems; accepted points satisfy the original rows
        for cand in &sol.candidates {
            assert!(prob.is_feasible(&cand.x, 1e-6));
            assert!(prob.is_integer_feasible(&cand.x, 1e-6));
            assert!(cand.obj_val >= reference.obj_val - 1e-6);
        }
        if sol.termination == TerminationState::FeasibleWithinGap {
            assert!(sol.gap <= settings.gap_tol);
        }
    }
}

#[test]
fn test_cut_pass_skips_root_by_default() {
    let prob = two_routes();
    let mut settings = exhaustive();
    settings.cut_planes = true;
    let skipped = solve_milp(&prob, &settings).unwrap();
    settings.cut_at_root = true;
    let at_root = solve_milp(&prob, &settings).unwrap();

    assert!(skipped.cuts_added > 0);
    assert!(at_root.cuts_added > skipped.cuts_added);
    for sol in [&skipped, &at_root] {
        assert!((sol.obj_val + 71000.0).abs() < 1e-6);
        assert_eq!(sol.cuts_lifted, sol.cuts_added);
        assert_eq!(sol.gomory_stats.cuts_generated as u64, sol.cuts_added);
    }

    // Every branched node is offered to the generator, except the root by default
    assert_eq!(skipped.gomory_stats.calls as u64, skipped.nodes_branched - 1);
    assert_eq!(at_root.gomory_stats.calls as u64, at_root.nodes_branched);

    let plain = solve_milp(&prob, &exhaustive()).unwrap();
    assert_eq!(plain.cuts_added, 0);
    assert_eq!(plain.gomory_stats.calls, 0);
}
