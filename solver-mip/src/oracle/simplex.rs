//! LP oracle backed by the dense simplex in `solver-lp`.

use solver_lp::{solve, LpProblem, LpStatus, SimplexSettings};

use super::{LpOracle, OracleResult, OracleStatus, Relaxation};
use crate::error::MipResult;

/// Relaxation oracle using `solver_lp::solve`.
#[derive(Debug, Clone, Default)]
pub struct SimplexOracle {
    /// Simplex settings.
    settings: SimplexSettings,

    /// Relaxations solved.
    solves: u64,

    /// Pivots across all solves.
    pivots: u64,
}

impl SimplexOracle {
    /// Create a new simplex oracle.
    pub fn new(settings: SimplexSettings) -> Self {
        Self {
            settings,
            solves: 0,
            pivots: 0,
        }
    }

    /// Number of relaxations solved.
    pub fn solves(&self) -> u64 {
        self.solves
    }

    /// Total simplex pivots.
    pub fn pivots(&self) -> u64 {
        self.pivots
    }
}

impl LpOracle for SimplexOracle {
    fn solve(&mut self, relaxation: &Relaxation<'_>) -> MipResult<OracleResult> {
        let lp = LpProblem::new(
            relaxation.objective.to_vec(),
            relaxation.a.clone(),
            relaxation.b.to_vec(),
            relaxation.lb.to_vec(),
            relaxation.ub.to_vec(),
        )
        .with_equalities(relaxation.a_eq.clone(), relaxation.b_eq.to_vec());

        let sol = solve(&lp, &self.settings)?;
        self.solves += 1;
        self.pivots += sol.iterations as u64;

        let result = match sol.status {
            LpStatus::Optimal => OracleResult::optimal(sol.x, sol.obj_val),
            LpStatus::Infeasible => OracleResult::infeasible(),
            LpStatus::Unbounded => OracleResult::without_point(OracleStatus::Unbounded),
            LpStatus::IterationLimit => OracleResult::without_point(OracleStatus::IterationLimit),
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::DMatrix;

    use super::*;

    #[test]
    fn test_simplex_oracle() {
        // min -x0 - x1 s.t. x0 + 2x1 <= 4, 3x0 + x1 <= 6
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 1.0]);
        let a_eq = DMatrix::zeros(0, 2);
        let relax = Relaxation {
            objective: &[-1.0, -1.0],
            a: &a,
            b: &[4.0, 6.0],
            a_eq: &a_eq,
            b_eq: &[],
            lb: &[0.0, 0.0],
            ub: &[f64::INFINITY, f64::INFINITY],
        };

        let mut oracle = SimplexOracle::default();
        let res = oracle.solve(&relax).unwrap();
        let (x, obj) = res.optimum().unwrap();

        assert!((x[0] - 1.6).abs() < 1e-9);
        assert!((x[1] - 1.2).abs() < 1e-9);
        assert!((obj + 2.8).abs() < 1e-9);
        assert_eq!(oracle.solves(), 1);
        assert!(oracle.pivots() > 0);
    }

    #[test]
    fn test_status_mapping() {
        let a = DMatrix::from_row_slice(2, 1, &[1.0, -1.0]);
        let a_eq = DMatrix::zeros(0, 1);
        let relax = Relaxation {
            objective: &[1.0],
            a: &a,
            b: &[1.0, -2.0],
            a_eq: &a_eq,
            b_eq: &[],
            lb: &[0.0],
            ub: &[f64::INFINITY],
        };

        let mut oracle = SimplexOracle::default();
        let res = oracle.solve(&relax).unwrap();
        assert_eq!(res.status, OracleStatus::Infeasible);
        assert!(res.x.is_none());
    }
}
