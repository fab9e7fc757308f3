//! MILP problem representation.

use nalgebra::DMatrix;

use crate::error::{MipError, MipResult};

/// Split of constraint rows into those touching only continuous variables and
/// those with at least one integer-block coefficient.
///
/// The cut-plane adapter separates only on integer-involving rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowPartition {
    /// Rows whose integer-block coefficients are all zero.
    pub continuous: Vec<usize>,

    /// Rows with a nonzero integer-block coefficient.
    pub integer: Vec<usize>,
}

impl RowPartition {
    /// Create a partition from explicit index sets.
    pub fn new(continuous: Vec<usize>, integer: Vec<usize>) -> Self {
        Self { continuous, integer }
    }

    /// Classify every row of `a` by its integer-block coefficients.
    pub fn classify(a: &DMatrix<f64>, num_integers: usize) -> Self {
        let mut partition = Self::default();
        for i in 0..a.nrows() {
            if row_touches_integers(a, i, num_integers) {
                partition.integer.push(i);
            } else {
                partition.continuous.push(i);
            }
        }
        partition
    }

    /// Number of rows covered.
    pub fn len(&self) -> usize {
        self.continuous.len() + self.integer.len()
    }

    /// True if the partition covers no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn validate(&self, name: &str, rows: usize) -> MipResult<()> {
        let mut seen = vec![false; rows];
        for &i in self.continuous.iter().chain(&self.integer) {
            if i >= rows {
                return Err(MipError::InvalidProblem(format!(
                    "{} partition names row {} but only {} rows exist",
                    name, i, rows
                )));
            }
            if seen[i] {
                return Err(MipError::InvalidProblem(format!(
                    "{} partition lists row {} twice",
                    name, i
                )));
            }
            seen[i] = true;
        }
        if let Some(i) = seen.iter().position(|&s| !s) {
            return Err(MipError::InvalidProblem(format!(
                "{} partition does not cover row {}",
                name, i
            )));
        }
        Ok(())
    }
}

/// True if row `i` of `a` has a nonzero coefficient in the first
/// `num_integers` columns.
pub(crate) fn row_touches_integers(a: &DMatrix<f64>, i: usize, num_integers: usize) -> bool {
    (0..num_integers.min(a.ncols())).any(|j| a[(i, j)] != 0.0)
}

/// Mixed-integer linear program.
///
/// ```text
/// minimize    obj_intᵀ x_int + obj_conᵀ x_con
/// subject to  A x <= b
///             Aeq x = beq
///             lb <= x <= ub
///             x_int integer
/// ```
///
/// The design vector is `x = [x_int; x_con]`: the first `obj_int.len()`
/// columns are integer-constrained, the rest are continuous.
#[derive(Debug, Clone)]
pub struct MilpProblem {
    /// Objective over the integer block.
    pub obj_int: Vec<f64>,

    /// Objective over the continuous block.
    pub obj_con: Vec<f64>,

    /// Inequality matrix (m × n).
    pub a: DMatrix<f64>,

    /// Inequality right-hand side.
    pub b: Vec<f64>,

    /// Equality matrix (m_eq × n), possibly with zero rows.
    pub a_eq: DMatrix<f64>,

    /// Equality right-hand side.
    pub b_eq: Vec<f64>,

    /// Lower bounds.
    pub lb: Vec<f64>,

    /// Upper bounds.
    pub ub: Vec<f64>,

    /// Partition of the inequality rows.
    pub ineq_rows: RowPartition,

    /// Partition of the equality rows.
    pub eq_rows: RowPartition,
}

impl MilpProblem {
    /// Create a MILP with inequality rows only.
    ///
    /// Rows are partitioned automatically from their integer-block
    /// coefficients. Dimensions are validated here.
    pub fn new(
        obj_int: Vec<f64>,
        obj_con: Vec<f64>,
        a: DMatrix<f64>,
        b: Vec<f64>,
        lb: Vec<f64>,
        ub: Vec<f64>,
    ) -> MipResult<Self> {
        let n = obj_int.len() + obj_con.len();
        let ineq_rows = RowPartition::classify(&a, obj_int.len());
        let prob = Self {
            obj_int,
            obj_con,
            a,
            b,
            a_eq: DMatrix::zeros(0, n),
            b_eq: Vec::new(),
            lb,
            ub,
            ineq_rows,
            eq_rows: RowPartition::default(),
        };
        prob.validate()?;
        Ok(prob)
    }

    /// Attach an equality block.
    pub fn with_equalities(mut self, a_eq: DMatrix<f64>, b_eq: Vec<f64>) -> MipResult<Self> {
        self.eq_rows = RowPartition::classify(&a_eq, self.num_integers());
        self.a_eq = a_eq;
        self.b_eq = b_eq;
        self.validate()?;
        Ok(self)
    }

    /// Replace the automatic row partitions with caller-supplied ones.
    pub fn with_row_partition(mut self, ineq: RowPartition, eq: RowPartition) -> MipResult<Self> {
        self.ineq_rows = ineq;
        self.eq_rows = eq;
        self.validate()?;
        Ok(self)
    }

    /// Validate dimensions, values and partitions.
    pub fn validate(&self) -> MipResult<()> {
        let n = self.num_vars();
        if n == 0 {
            return Err(MipError::InvalidProblem("objective is empty".to_string()));
        }

        check_block("A", &self.a, &self.b, n)?;
        check_block("Aeq", &self.a_eq, &self.b_eq, n)?;

        if self.lb.len() != n || self.ub.len() != n {
            return Err(MipError::InvalidProblem(format!(
                "bounds have lengths ({}, {}), expected {}",
                self.lb.len(),
                self.ub.len(),
                n
            )));
        }

        if let Some(j) = self.objective().iter().position(|c| !c.is_finite()) {
            return Err(MipError::InvalidProblem(format!(
                "objective coefficient {} is not finite",
                j
            )));
        }

        for j in 0..n {
            let (lb, ub) = (self.lb[j], self.ub[j]);
            if lb.is_nan() || ub.is_nan() {
                return Err(MipError::InvalidProblem(format!("bound on x{} is NaN", j)));
            }
            if lb > ub {
                return Err(MipError::InvalidProblem(format!(
                    "x{} has lower bound {} above upper bound {}",
                    j, lb, ub
                )));
            }
            if lb == f64::INFINITY || ub == f64::NEG_INFINITY {
                return Err(MipError::InvalidProblem(format!(
                    "bounds on x{} exclude every finite value",
                    j
                )));
            }
        }

        self.ineq_rows.validate("inequality", self.a.nrows())?;
        self.eq_rows.validate("equality", self.a_eq.nrows())?;
        Ok(())
    }

    /// Number of variables.
    pub fn num_vars(&self) -> usize {
        self.obj_int.len() + self.obj_con.len()
    }

    /// Number of integer-block variables.
    pub fn num_integers(&self) -> usize {
        self.obj_int.len()
    }

    /// Full objective `[obj_int; obj_con]`.
    pub fn objective(&self) -> Vec<f64> {
        let mut c = Vec::with_capacity(self.num_vars());
        c.extend_from_slice(&self.obj_int);
        c.extend_from_slice(&self.obj_con);
        c
    }

    /// Objective value at `x`.
    pub fn objective_value(&self, x: &[f64]) -> f64 {
        self.obj_int
            .iter()
            .chain(&self.obj_con)
            .zip(x)
            .map(|(c, x)| c * x)
            .sum()
    }

    /// Euclidean norm of the distance of each integer-block coordinate to its
    /// nearest integer.
    pub fn integrality_residual(&self, x: &[f64]) -> f64 {
        x[..self.num_integers()]
            .iter()
            .map(|v| (v - v.round()).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    /// Check if the integer block is integral within tolerance.
    pub fn is_integer_feasible(&self, x: &[f64], tol: f64) -> bool {
        self.integrality_residual(x) <= tol
    }

    /// Snap integer-block coordinates within `tol` of an integer onto it.
    pub fn snap_integers(&self, x: &mut [f64], tol: f64) {
        for v in x[..self.num_integers()].iter_mut() {
            let r = v.round();
            if (*v - r).abs() <= tol {
                *v = r;
            }
        }
    }

    /// Largest constraint or bound violation of `x`.
    pub fn max_violation(&self, x: &[f64]) -> f64 {
        let mut worst = 0.0_f64;
        for i in 0..self.a.nrows() {
            worst = worst.max(row_dot(&self.a, i, x) - self.b[i]);
        }
        for i in 0..self.a_eq.nrows() {
            worst = worst.max((row_dot(&self.a_eq, i, x) - self.b_eq[i]).abs());
        }
        for (j, &xj) in x.iter().enumerate() {
            worst = worst.max(self.lb[j] - xj).max(xj - self.ub[j]);
        }
        worst
    }

    /// Check constraints, bounds and integrality within `tol`.
    pub fn is_feasible(&self, x: &[f64], tol: f64) -> bool {
        x.len() == self.num_vars() && self.max_violation(x) <= tol && self.is_integer_feasible(x, tol)
    }
}

/// Dot product of row `i` of `a` with `x`.
fn row_dot(a: &DMatrix<f64>, i: usize, x: &[f64]) -> f64 {
    x.iter().enumerate().map(|(j, v)| a[(i, j)] * v).sum()
}

fn check_block(name: &str, a: &DMatrix<f64>, b: &[f64], n: usize) -> MipResult<()> {
    if a.nrows() != b.len() {
        return Err(MipError::InvalidProblem(format!(
            "{} has {} rows but rhs has length {}",
            name,
            a.nrows(),
            b.len()
        )));
    }
    if a.ncols() != n {
        return Err(MipError::InvalidProblem(format!(
            "{} has {} cols, expected {}",
            name,
            a.ncols(),
            n
        )));
    }
    if a.iter().chain(b).any(|v| !v.is_finite()) {
        return Err(MipError::InvalidProblem(format!(
            "{} contains non-finite values",
            name
        )));
    }
    Ok(())
}
