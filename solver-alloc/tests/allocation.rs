//! End-to-end allocation tests on the bundled instances.

use std::path::PathBuf;

use solver_alloc::{formulate, solve_allocation, AllocError, AllocationData, AllocationReport};
use solver_mip::{MipSettings, StopReason, TerminationState};

fn instance(name: &str) -> AllocationData {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name);
    AllocationData::load(path).unwrap()
}

fn settings() -> MipSettings {
    let mut settings = MipSettings::default();
    settings.cut_planes = false;
    settings
}

#[test]
fn test_two_routes_one_type() {
    let data = instance("two_routes.json");
    let outcome = solve_allocation(&data, &settings()).unwrap();
    let sol = &outcome.solution;

    assert!(sol.success);
    let expected = [3.0, 5.0, 250.0, 450.0];
    for (got, want) in sol.x.iter().zip(expected) {
        assert!((got - want).abs() < 1e-6, "x = {:?}", sol.x);
    }
    assert!((sol.obj_val + 71000.0).abs() < 1e-6);
    assert!((sol.root_bound().unwrap() + 73550.0).abs() < 1e-6);
    assert_eq!(sol.oracle_calls, 7);
    assert_eq!(sol.candidates.len(), 3);
    assert_eq!(sol.termination, TerminationState::FeasibleFound);
    assert_eq!(sol.stop_reason, StopReason::FrontierExhausted);

    let report = outcome.report.unwrap();
    assert_eq!(report.detail_trips, vec![vec![6.0, 10.0]]);
    assert!((report.profit - 142000.0).abs() < 1e-6);
    assert_eq!(report.types[0].fleet_used, 3.0);
}

#[test]
fn test_three_routes_two_types() {
    let data = instance("three_routes.json");
    let prob = formulate(&data).unwrap();
    assert_eq!(prob.num_vars(), 12);
    assert_eq!(prob.a.nrows(), 6 + 2 + 6);

    let outcome = solve_allocation(&data, &settings()).unwrap();
    let sol = &outcome.solution;
    assert!(sol.success);
    assert!(prob.is_feasible(&sol.x, 1e-6));
    if sol.termination == TerminationState::FeasibleWithinGap {
        assert!(sol.gap <= 0.03);
    }

    // The report is the round-trip image of the one-way objective
    let report = outcome.report.unwrap();
    assert!((report.profit + 2.0 * sol.obj_val).abs() < 1e-3);
    for (j, route) in report.routes.iter().enumerate() {
        assert!(route.pax <= 2.0 * data.routes[j].demand + 1e-6);
        assert!(route.pax >= 0.4 * data.routes[j].demand - 1e-6);
    }
    for (k, t) in report.types.iter().enumerate() {
        assert!(t.pax <= t.seat_capacity + 1e-6);
        assert!(t.trips <= 2.0 * data.aircraft[k].max_trips * data.num_routes() as f64);
    }
}

#[test]
fn test_exhaustive_search_is_no_worse() {
    let data = instance("three_routes.json");
    let gap = solve_allocation(&data, &settings()).unwrap().solution;
    let full = solve_allocation(&data, &settings().with_gap_tol(0.0)).unwrap().solution;

    assert!(full.success);
    assert_eq!(full.stop_reason, StopReason::FrontierExhausted);
    assert!(full.obj_val <= gap.obj_val + 1e-6);
}

#[test]
fn test_node_limit_without_incumbent() {
    let data = instance("two_routes.json");
    let outcome = solve_allocation(&data, &settings().with_max_nodes(1)).unwrap();

    assert!(!outcome.solution.success);
    assert_eq!(outcome.solution.stop_reason, StopReason::NodeLimit);
    assert!(outcome.report.is_none());
}

#[test]
fn test_invalid_instance() {
    let mut data = instance("two_routes.json");
    data.doc.push(vec![1.0, 1.0]);
    assert!(matches!(formulate(&data), Err(AllocError::InvalidData(_))));

    let err = AllocationReport::from_solution(&instance("two_routes.json"), &[]);
    assert!(matches!(err, Err(AllocError::SolutionMismatch(_))));
}
