//! LP problem data, settings and results.

use std::fmt;

use nalgebra::DMatrix;

use crate::error::{LpError, LpResult};

/// Linear program in inequality/equality form:
///
/// ```text
/// minimize    cᵀx
/// subject to  A_ub x <= b_ub
///             A_eq x  = b_eq
///             lb <= x <= ub
/// ```
///
/// Bounds may be infinite. Either constraint block may have zero rows.
#[derive(Debug, Clone)]
pub struct LpProblem {
    /// Objective coefficients (length n).
    pub c: Vec<f64>,

    /// Inequality matrix (m_ub × n).
    pub a_ub: DMatrix<f64>,

    /// Inequality right-hand side (length m_ub).
    pub b_ub: Vec<f64>,

    /// Equality matrix (m_eq × n).
    pub a_eq: DMatrix<f64>,

    /// Equality right-hand side (length m_eq).
    pub b_eq: Vec<f64>,

    /// Lower bounds (may be -inf).
    pub lb: Vec<f64>,

    /// Upper bounds (may be +inf).
    pub ub: Vec<f64>,
}

impl LpProblem {
    /// Create an LP with only inequality rows and the given bounds.
    pub fn new(c: Vec<f64>, a_ub: DMatrix<f64>, b_ub: Vec<f64>, lb: Vec<f64>, ub: Vec<f64>) -> Self {
        let n = c.len();
        Self {
            c,
            a_ub,
            b_ub,
            a_eq: DMatrix::zeros(0, n),
            b_eq: Vec::new(),
            lb,
            ub,
        }
    }

    /// Attach an equality block.
    pub fn with_equalities(mut self, a_eq: DMatrix<f64>, b_eq: Vec<f64>) -> Self {
        self.a_eq = a_eq;
        self.b_eq = b_eq;
        self
    }

    /// Number of variables.
    pub fn num_vars(&self) -> usize {
        self.c.len()
    }

    /// Number of inequality rows.
    pub fn num_inequalities(&self) -> usize {
        self.b_ub.len()
    }

    /// Number of equality rows.
    pub fn num_equalities(&self) -> usize {
        self.b_eq.len()
    }

    /// Validate dimensions and values.
    pub fn validate(&self) -> LpResult<()> {
        let n = self.num_vars();
        if n == 0 {
            return Err(LpError::InvalidProblem("objective is empty".to_string()));
        }

        check_block("A_ub", &self.a_ub, &self.b_ub, n)?;
        check_block("A_eq", &self.a_eq, &self.b_eq, n)?;

        if self.lb.len() != n {
            return Err(LpError::InvalidProblem(format!(
                "lb has length {}, expected {}",
                self.lb.len(),
                n
            )));
        }
        if self.ub.len() != n {
            return Err(LpError::InvalidProblem(format!(
                "ub has length {}, expected {}",
                self.ub.len(),
                n
            )));
        }

        if let Some(j) = self.c.iter().position(|v| !v.is_finite()) {
            return Err(LpError::InvalidProblem(format!(
                "objective coefficient {} is not finite",
                j
            )));
        }
        for j in 0..n {
            if self.lb[j].is_nan() || self.ub[j].is_nan() {
                return Err(LpError::InvalidProblem(format!("bound on x{} is NaN", j)));
            }
            if self.lb[j] == f64::INFINITY || self.ub[j] == f64::NEG_INFINITY {
                return Err(LpError::InvalidProblem(format!(
                    "bounds on x{} exclude every finite value",
                    j
                )));
            }
        }

        Ok(())
    }

    /// Evaluate the objective at a point.
    pub fn objective(&self, x: &[f64]) -> f64 {
        self.c.iter().zip(x).map(|(c, x)| c * x).sum()
    }

    /// Largest constraint or bound violation of `x`.
    pub fn max_violation(&self, x: &[f64]) -> f64 {
        let mut worst = 0.0_f64;
        for i in 0..self.a_ub.nrows() {
            let lhs: f64 = (0..x.len()).map(|j| self.a_ub[(i, j)] * x[j]).sum();
            worst = worst.max(lhs - self.b_ub[i]);
        }
        for i in 0..self.a_eq.nrows() {
            let lhs: f64 = (0..x.len()).map(|j| self.a_eq[(i, j)] * x[j]).sum();
            worst = worst.max((lhs - self.b_eq[i]).abs());
        }
        for (j, &xj) in x.iter().enumerate() {
            worst = worst.max(self.lb[j] - xj).max(xj - self.ub[j]);
        }
        worst
    }
}

fn check_block(name: &str, a: &DMatrix<f64>, b: &[f64], n: usize) -> LpResult<()> {
    if a.nrows() != b.len() {
        return Err(LpError::InvalidProblem(format!(
            "{} has {} rows but rhs has length {}",
            name,
            a.nrows(),
            b.len()
        )));
    }
    if a.nrows() > 0 && a.ncols() != n {
        return Err(LpError::InvalidProblem(format!(
            "{} has {} cols, expected {}",
            name,
            a.ncols(),
            n
        )));
    }
    if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
        return Err(LpError::InvalidProblem(format!("{} contains non-finite values", name)));
    }
    Ok(())
}

/// Simplex settings.
#[derive(Debug, Clone)]
pub struct SimplexSettings {
    /// Maximum pivots across both phases.
    pub max_iter: usize,

    /// Smallest pivot element accepted by the ratio test.
    pub pivot_tol: f64,

    /// Reduced-cost threshold for optimality.
    pub opt_tol: f64,

    /// Phase-1 objective above this means infeasible.
    pub feas_tol: f64,

    /// Consecutive degenerate pivots before switching to Bland's rule.
    pub degenerate_run: usize,
}

impl Default for SimplexSettings {
    fn default() -> Self {
        // Allow environment variable override for the pivot cap
        let max_iter = std::env::var("FLEETMIP_SIMPLEX_MAX_ITER")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(50_000);

        Self {
            max_iter,
            pivot_tol: 1e-9,
            opt_tol: 1e-9,
            feas_tol: 1e-7,
            degenerate_run: 50,
        }
    }
}

/// LP solve status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpStatus {
    /// Optimal vertex found.
    Optimal,

    /// No point satisfies the constraints.
    Infeasible,

    /// Objective decreases without bound.
    Unbounded,

    /// Pivot cap reached before a conclusion.
    IterationLimit,
}

impl fmt::Display for LpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LpStatus::Optimal => write!(f, "Optimal"),
            LpStatus::Infeasible => write!(f, "Infeasible"),
            LpStatus::Unbounded => write!(f, "Unbounded"),
            LpStatus::IterationLimit => write!(f, "Iteration Limit"),
        }
    }
}

/// LP solve result.
#[derive(Debug, Clone)]
pub struct LpSolution {
    /// Solve status.
    pub status: LpStatus,

    /// Primal point (empty unless `status == Optimal`).
    pub x: Vec<f64>,

    /// Objective value (`+inf` when infeasible, `-inf` when unbounded).
    pub obj_val: f64,

    /// Pivots performed.
    pub iterations: usize,
}

impl LpSolution {
    pub(crate) fn without_point(status: LpStatus, iterations: usize) -> Self {
        let obj_val = match status {
            LpStatus::Unbounded => f64::NEG_INFINITY,
            LpStatus::IterationLimit => f64::NAN,
            _ => f64::INFINITY,
        };
        Self {
            status,
            x: Vec::new(),
            obj_val,
            iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> LpProblem {
        LpProblem::new(
            vec![1.0, 1.0],
            DMatrix::from_row_slice(1, 2, &[1.0, 1.0]),
            vec![4.0],
            vec![0.0, 0.0],
            vec![f64::INFINITY, 3.0],
        )
    }

    #[test]
    fn test_validate_ok() {
        assert!(small().validate().is_ok());
    }

    #[test]
    fn test_validate_dimensions() {
        let mut lp = small();
        lp.b_ub.push(1.0);
        assert!(lp.validate().is_err());

        let mut lp = small();
        lp.lb.pop();
        assert!(lp.validate().is_err());

        let lp = LpProblem::new(vec![], DMatrix::zeros(0, 0), vec![], vec![], vec![]);
        assert!(lp.validate().is_err());
    }

    #[test]
    fn test_max_violation() {
        let lp = small();
        assert_eq!(lp.max_violation(&[1.0, 1.0]), 0.0);
        assert!((lp.max_violation(&[3.0, 2.0]) - 1.0).abs() < 1e-12);
        assert!((lp.max_violation(&[0.0, 3.5]) - 0.5).abs() < 1e-12);
    }
}
