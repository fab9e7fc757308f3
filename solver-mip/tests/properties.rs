//! Property-based tests for cut validity and branching.
//!
//! Instances are small packing systems with integer data so every integer
//! point can be enumerated:
//! - Gomory cuts never remove an integer point of the system
//! - A cut from a nondegenerate vertex removes that vertex
//! - Branch rows split the integers of a variable into two disjoint sets
//! - The search reaches the enumerated optimum when run to completion

use nalgebra::DMatrix;
use proptest::prelude::*;
use solver_lp::{LpProblem, LpStatus, SimplexSettings};
use solver_mip::search::select_branch_var;
use solver_mip::{solve_milp, GomoryCutGenerator, MilpProblem, MipSettings};

/// `max cᵀx` over `A x <= b`, `0 <= x <= upper`, with integer data.
#[derive(Debug, Clone)]
struct Packing {
    n: usize,
    a: DMatrix<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    upper: i32,
}

impl Packing {
    /// Constraint rows followed by one bound row `x_j <= upper` per variable.
    fn with_bound_rows(&self) -> (DMatrix<f64>, Vec<f64>) {
        let m = self.a.nrows();
        let mut a = self.a.clone().insert_rows(m, self.n, 0.0);
        let mut b = self.b.clone();
        for j in 0..self.n {
            a[(m + j, j)] = 1.0;
            b.push(self.upper as f64);
        }
        (a, b)
    }

    /// Every integer point of the box, feasible or not.
    fn grid(&self) -> Vec<Vec<f64>> {
        let side = (self.upper + 1) as usize;
        let total = side.pow(self.n as u32);
        (0..total)
            .map(|mut idx| {
                (0..self.n)
                    .map(|_| {
                        let v = idx % side;
                        idx /= side;
                        v as f64
                    })
                    .collect()
            })
            .collect()
    }

    fn satisfies(a: &DMatrix<f64>, b: &[f64], x: &[f64]) -> bool {
        (0..a.nrows()).all(|i| {
            let lhs: f64 = x.iter().enumerate().map(|(j, v)| a[(i, j)] * v).sum();
            lhs <= b[i] + 1e-9
        })
    }
}

fn packing() -> impl Strategy<Value = Packing> {
    (2usize..=3, 1usize..=3)
        .prop_flat_map(|(n, m)| {
            (
                Just(n),
                Just(m),
                prop::collection::vec(0i32..=4, n * m),
                prop::collection::vec(3i32..=15, m),
                prop::collection::vec(1i32..=5, n),
                2i32..=4,
            )
        })
        .prop_map(|(n, m, a, b, c, upper)| Packing {
            n,
            a: DMatrix::from_row_iterator(m, n, a.into_iter().map(f64::from)),
            b: b.into_iter().map(f64::from).collect(),
            c: c.into_iter().map(f64::from).collect(),
            upper,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Cuts keep every integer point and remove nondegenerate vertices
    #[test]
    fn gomory_cut_is_valid(p in packing()) {
        let (a, b) = p.with_bound_rows();
        let n = p.n;
        let lp = LpProblem::new(
            p.c.iter().map(|c| -c).collect(),
            a.clone(),
            b.clone(),
            vec![0.0; n],
            vec![f64::INFINITY; n],
        );
        let sol = solver_lp::solve(&lp, &SimplexSettings::default()).unwrap();
        prop_assert_eq!(sol.status, LpStatus::Optimal);
        let x = sol.x;

        let mut gen = GomoryCutGenerator::default();
        let Some(cut) = gen.derive_cut(&x, &a, &b, &DMatrix::zeros(0, n), &[]) else {
            return Ok(());
        };

        for z in p.grid() {
            if Packing::satisfies(&a, &b, &z) {
                prop_assert!(
                    !cut.is_violated(&z, 1e-6),
                    "cut {} removes integer point {:?}", cut, z
                );
            }
        }

        // With one positive column per row the basis is square and the
        // selected row has unit entries on it.
        let positives = x
            .iter()
            .copied()
            .chain((0..a.nrows()).map(|i| b[i] - (0..n).map(|j| a[(i, j)] * x[j]).sum::<f64>()))
            .filter(|&v| v > 1e-6)
            .count();
        if positives == a.nrows() && gen.stats().lstsq_fallbacks == 0 {
            prop_assert!(cut.is_violated(&x, 1e-7), "cut {} keeps {:?}", cut, x);
        }
    }

    /// Each integer value satisfies exactly one branch row, the point none
    #[test]
    fn branch_rows_partition_integers(
        x in prop::collection::vec(-20.0f64..20.0, 1..6),
        k in 0usize..6,
    ) {
        let k = k.min(x.len());
        let Some(d) = select_branch_var(&x, k) else {
            prop_assert!(x[..k].iter().all(|v| v.fract() == 0.0));
            return Ok(());
        };

        prop_assert!(d.var < k);
        prop_assert!(x[..k].iter().all(|v| v.abs().fract() <= x[d.var].abs().fract()));
        prop_assert!(!d.down.admits(d.value));
        prop_assert!(!d.up.admits(d.value));
        for v in -25..=25 {
            let v = v as f64;
            prop_assert!(d.down.admits(v) != d.up.admits(v), "value {}", v);
        }
    }

    /// Searching to completion finds the enumerated optimum
    #[test]
    fn search_reaches_enumerated_optimum(p in packing()) {
        let n = p.n;
        let prob = MilpProblem::new(
            p.c.iter().map(|c| -c).collect(),
            vec![],
            p.a.clone(),
            p.b.clone(),
            vec![0.0; n],
            vec![p.upper as f64; n],
        )
        .unwrap();

        let best = p
            .grid()
            .into_iter()
            .filter(|z| Packing::satisfies(&p.a, &p.b, z))
            .map(|z| prob.objective_value(&z))
            .fold(f64::INFINITY, f64::min);

        let mut settings = MipSettings::default().with_gap_tol(0.0);
        settings.cut_planes = false;
        let sol = solve_milp(&prob, &settings).unwrap();

        prop_assert!(sol.success);
        prop_assert!((sol.obj_val - best).abs() < 1e-6, "found {} expected {}", sol.obj_val, best);
        prop_assert!(prob.is_feasible(&sol.x, 1e-6));
    }
}
