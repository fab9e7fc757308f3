//! Compare plain branching with the Gomory cut pass on random packing MILPs.
//!
//! Run with: cargo run --release -p solver-mip --example simple_bench

use std::time::Instant;

use nalgebra::DMatrix;
use solver_mip::{solve_milp, MilpProblem, MipSettings};

/// Random multi-dimensional knapsack with general integer variables:
///
/// max  cᵀx
/// s.t. A x <= b,  0 <= x <= 5,  x integer
fn random_packing(n: usize, m: usize, seed: u64) -> MilpProblem {
    let mut rng_state = seed;
    let mut rand = || -> f64 {
        rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((rng_state >> 33) as f64) / (u32::MAX as f64)
    };

    let c: Vec<f64> = (0..n).map(|_| -(1.0 + (rand() * 9.0).floor())).collect();
    let a = DMatrix::from_fn(m, n, |_, _| (rand() * 6.0).floor());
    let b: Vec<f64> = (0..m)
        .map(|i| (a.row(i).sum() * 0.6).floor().max(1.0))
        .collect();

    MilpProblem::new(c, vec![], a, b, vec![0.0; n], vec![5.0; n])
        .expect("generated problem is well formed")
}

fn run(name: &str, prob: &MilpProblem, settings: &MipSettings) {
    let start = Instant::now();
    match solve_milp(prob, settings) {
        Ok(sol) => println!(
            "  {:<10} obj {:>10.2}  gap {:>6.2}%  LPs {:>6}  cuts {:>4}  {:>8.1} ms  ({})",
            name,
            sol.obj_val,
            sol.gap * 100.0,
            sol.oracle_calls,
            sol.cuts_added,
            start.elapsed().as_secs_f64() * 1000.0,
            sol.termination
        ),
        Err(e) => println!("  {:<10} error: {}", name, e),
    }
}

fn main() {
    println!("=== Branch-and-cut on random packing problems ===\n");

    let plain = MipSettings::default().with_gap_tol(0.0).with_cut_planes(false);
    let cuts = plain.clone().with_cut_planes(true);

    for (n, m, seed) in [(6, 3, 1), (8, 4, 7), (10, 5, 42), (12, 6, 2024)] {
        println!("n = {}, m = {} (seed {})", n, m, seed);
        let prob = random_packing(n, m, seed);
        run("branching", &prob, &plain);
        run("cuts", &prob, &cuts);
        println!();
    }
}
