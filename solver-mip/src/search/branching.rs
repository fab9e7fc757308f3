//! Branching variable selection and branch rows.

use super::Subproblem;
use crate::cuts::{CutSource, LinearCut};

/// One side of a branch, as the row `coef * x[var] <= rhs`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchRow {
    /// Variable index.
    pub var: usize,

    /// +1 for the down branch, -1 for the up branch.
    pub coef: f64,

    /// floor(value) for the down branch, -ceil(value) for the up branch.
    pub rhs: f64,
}

impl BranchRow {
    /// Down branch: x <= floor(value).
    pub fn down(var: usize, value: f64) -> Self {
        Self {
            var,
            coef: 1.0,
            rhs: value.floor(),
        }
    }

    /// Up branch: -x <= -ceil(value).
    pub fn up(var: usize, value: f64) -> Self {
        Self {
            var,
            coef: -1.0,
            rhs: -value.ceil(),
        }
    }

    /// Row over `n` variables.
    pub fn to_cut(&self, n: usize) -> LinearCut {
        let mut coefs = vec![0.0; n];
        coefs[self.var] = self.coef;
        LinearCut::new(coefs, self.rhs, CutSource::Branching { var: self.var })
    }

    /// Check if `value` satisfies this side.
    pub fn admits(&self, value: f64) -> bool {
        self.coef * value <= self.rhs
    }

    /// Append the row to `node` and tighten the matching bound.
    pub fn apply(&self, node: &mut Subproblem) {
        node.append_row(&self.to_cut(node.lb.len()));
        let bound = self.rhs / self.coef;
        if self.coef > 0.0 {
            node.ub[self.var] = node.ub[self.var].min(bound);
        } else {
            node.lb[self.var] = node.lb[self.var].max(bound);
        }
    }
}

/// A branching decision.
#[derive(Debug, Clone, Copy)]
pub struct BranchDecision {
    /// Variable to branch on.
    pub var: usize,

    /// Current (fractional) value.
    pub value: f64,

    /// Child 1: x <= floor(value).
    pub down: BranchRow,

    /// Child 2: x >= ceil(value).
    pub up: BranchRow,
}

impl BranchDecision {
    /// Decision for variable `var` at `value`.
    pub fn new(var: usize, value: f64) -> Self {
        Self {
            var,
            value,
            down: BranchRow::down(var, value),
            up: BranchRow::up(var, value),
        }
    }
}

/// Pick the integer-block variable with the largest fractional remainder
/// `|x_i| mod 1`. The first index wins ties.
///
/// Returns None if every remainder is zero.
pub fn select_branch_var(x: &[f64], num_integers: usize) -> Option<BranchDecision> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in x.iter().enumerate().take(num_integers) {
        let frac = v.abs().fract();
        if frac == 0.0 {
            continue;
        }
        if best.map_or(true, |(_, f)| frac > f) {
            best = Some((i, frac));
        }
    }
    best.map(|(i, _)| BranchDecision::new(i, x[i]))
}
