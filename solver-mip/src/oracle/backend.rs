//! LP relaxation oracle trait and types.

use std::fmt;

use nalgebra::DMatrix;

use crate::error::MipResult;

/// Status reported by an LP relaxation oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleStatus {
    /// Optimal solution found.
    Optimal,

    /// Relaxation is infeasible (node can be fathomed).
    Infeasible,

    /// Relaxation is unbounded.
    Unbounded,

    /// Oracle stopped before reaching a conclusion.
    IterationLimit,

    /// Oracle failed.
    Error,
}

impl fmt::Display for OracleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleStatus::Optimal => write!(f, "Optimal"),
            OracleStatus::Infeasible => write!(f, "Infeasible"),
            OracleStatus::Unbounded => write!(f, "Unbounded"),
            OracleStatus::IterationLimit => write!(f, "Iteration Limit"),
            OracleStatus::Error => write!(f, "Error"),
        }
    }
}

/// Result from solving one LP relaxation.
#[derive(Debug, Clone)]
pub struct OracleResult {
    /// Solve status.
    pub status: OracleStatus,

    /// Optimal point, present only when `status == Optimal`.
    pub x: Option<Vec<f64>>,

    /// Objective value (meaningful only when `status == Optimal`).
    pub obj_val: f64,
}

impl OracleResult {
    /// Create an optimal result.
    pub fn optimal(x: Vec<f64>, obj_val: f64) -> Self {
        Self {
            status: OracleStatus::Optimal,
            x: Some(x),
            obj_val,
        }
    }

    /// Create a result without a usable point.
    pub fn without_point(status: OracleStatus) -> Self {
        let obj_val = match status {
            OracleStatus::Unbounded => f64::NEG_INFINITY,
            _ => f64::INFINITY,
        };
        Self {
            status,
            x: None,
            obj_val,
        }
    }

    /// Create an infeasible result.
    pub fn infeasible() -> Self {
        Self::without_point(OracleStatus::Infeasible)
    }

    /// The point and value, if the relaxation was solved to optimality.
    pub fn optimum(&self) -> Option<(&[f64], f64)> {
        match (&self.status, &self.x) {
            (OracleStatus::Optimal, Some(x)) => Some((x.as_slice(), self.obj_val)),
            _ => None,
        }
    }
}

/// One LP relaxation handed to an oracle:
///
/// ```text
/// min  cᵀx  s.t.  A x <= b,  Aeq x = beq,  lb <= x <= ub
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Relaxation<'a> {
    /// Objective coefficients.
    pub objective: &'a [f64],

    /// Inequality matrix.
    pub a: &'a DMatrix<f64>,

    /// Inequality right-hand side.
    pub b: &'a [f64],

    /// Equality matrix (possibly zero rows).
    pub a_eq: &'a DMatrix<f64>,

    /// Equality right-hand side.
    pub b_eq: &'a [f64],

    /// Lower bounds.
    pub lb: &'a [f64],

    /// Upper bounds.
    pub ub: &'a [f64],
}

impl Relaxation<'_> {
    /// Number of variables.
    pub fn num_vars(&self) -> usize {
        self.objective.len()
    }
}

/// Trait for LP relaxation oracles.
///
/// The engine owns its oracle and calls it once per node. Implementations
/// report infeasibility and friends through [`OracleStatus`]; an `Err` is
/// treated by the engine like [`OracleStatus::Error`].
///
/// Closures of the right shape are oracles too, which keeps test doubles
/// short:
///
/// ```
/// use solver_mip::{LpOracle, MipResult, OracleResult, Relaxation};
///
/// fn takes_oracle<O: LpOracle>(_: O) {}
///
/// takes_oracle(|_: &Relaxation<'_>| -> MipResult<OracleResult> {
///     Ok(OracleResult::infeasible())
/// });
/// ```
pub trait LpOracle {
    /// Solve one relaxation.
    fn solve(&mut self, relaxation: &Relaxation<'_>) -> MipResult<OracleResult>;
}

impl<F> LpOracle for F
where
    F: FnMut(&Relaxation<'_>) -> MipResult<OracleResult>,
{
    fn solve(&mut self, relaxation: &Relaxation<'_>) -> MipResult<OracleResult> {
        self(relaxation)
    }
}
