//! Cut-plane adapter: separate on the integer sub-system, lift to full space.
//!
//! For `x = [x_int; x_con]` the rows with integer-block coefficients are
//! restricted to the integer columns, with the continuous contribution moved
//! to the right-hand side at its current value:
//!
//! ```text
//! A_int x_int <= b - A_con x_con
//! ```
//!
//! A Gomory cut `cᵀx_int <= r` on that system is lifted with a unit
//! coefficient on every continuous column: `cᵀx_int + Σ x_con <= r + Σ x_con*`.

use nalgebra::DMatrix;

use super::{CutSource, GomoryCutGenerator, GomorySettings, GomoryStats, LinearCut};
use crate::model::{row_touches_integers, RowPartition};

/// Projects Gomory cuts between the integer sub-system and the full space.
#[derive(Debug, Clone)]
pub struct CutPlaneAdapter {
    /// Underlying generator.
    generator: GomoryCutGenerator,

    /// Integer-block width.
    num_integers: usize,

    /// Partition of the root inequality rows.
    ineq_rows: RowPartition,

    /// Partition of the root equality rows.
    eq_rows: RowPartition,

    /// Lifted cuts produced.
    cuts_lifted: usize,
}

impl CutPlaneAdapter {
    /// Create an adapter for problems whose first `num_integers` columns are
    /// integer, with the given root row partitions.
    pub fn new(
        settings: GomorySettings,
        num_integers: usize,
        ineq_rows: RowPartition,
        eq_rows: RowPartition,
    ) -> Self {
        Self {
            generator: GomoryCutGenerator::new(settings),
            num_integers,
            ineq_rows,
            eq_rows,
            cuts_lifted: 0,
        }
    }

    /// Generator statistics.
    pub fn stats(&self) -> &GomoryStats {
        self.generator.stats()
    }

    /// Number of lifted cuts produced.
    pub fn cuts_lifted(&self) -> usize {
        self.cuts_lifted
    }

    /// Integer-involving rows of a system that started from the root
    /// partition. Rows appended past the root are classified by their
    /// coefficients.
    pub fn integer_rows(&self, a: &DMatrix<f64>, root: &RowPartition) -> Vec<usize> {
        let root_rows = root.len();
        let mut rows: Vec<usize> = root.integer.iter().copied().filter(|&i| i < a.nrows()).collect();
        rows.sort_unstable();
        rows.extend((root_rows..a.nrows()).filter(|&i| row_touches_integers(a, i, self.num_integers)));
        rows
    }

    /// Derive a lifted cut for the full-space point `x`, or `None`.
    pub fn separate(
        &mut self,
        x: &[f64],
        a: &DMatrix<f64>,
        b: &[f64],
        a_eq: &DMatrix<f64>,
        b_eq: &[f64],
    ) -> Option<LinearCut> {
        let k = self.num_integers;
        if k == 0 || x.len() < k {
            return None;
        }
        let (x_int, x_con) = x.split_at(k);

        let ineq = self.integer_rows(a, &self.ineq_rows);
        let eq = self.integer_rows(a_eq, &self.eq_rows);
        let (a_int, b_int) = restrict(a, b, &ineq, k, x_con);
        let (a_eq_int, b_eq_int) = restrict(a_eq, b_eq, &eq, k, x_con);

        let cut = self
            .generator
            .derive_cut(x_int, &a_int, &b_int, &a_eq_int, &b_eq_int)?;

        let mut coefs = cut.coefs;
        coefs.extend(std::iter::repeat(1.0).take(x_con.len()));
        let rhs = cut.rhs + x_con.iter().sum::<f64>();

        self.cuts_lifted += 1;
        let name = format!("lifted_{}", self.cuts_lifted);
        Some(LinearCut::new(coefs, rhs, CutSource::Lifted).with_name(name))
    }
}

/// Integer columns of the selected rows, with the continuous part evaluated
/// at `x_con` and moved to the right-hand side.
fn restrict(
    a: &DMatrix<f64>,
    b: &[f64],
    rows: &[usize],
    k: usize,
    x_con: &[f64],
) -> (DMatrix<f64>, Vec<f64>) {
    let mut a_int = DMatrix::zeros(rows.len(), k);
    let mut b_int = Vec::with_capacity(rows.len());
    for (r, &i) in rows.iter().enumerate() {
        for j in 0..k {
            a_int[(r, j)] = a[(i, j)];
        }
        let con: f64 = x_con.iter().enumerate().map(|(j, v)| a[(i, k + j)] * v).sum();
        b_int.push(b[i] - con);
    }
    (a_int, b_int)
}
