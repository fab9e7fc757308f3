//! Search node representation.

use std::fmt;

use nalgebra::DMatrix;

use crate::cuts::LinearCut;
use crate::model::MilpProblem;
use crate::oracle::Relaxation;

/// Arena index of a node, assigned in creation order.
pub type NodeId = usize;

/// Path label of a node: root is `1`, the children of `T` are `T1` and `T2`.
///
/// Stored as digits so deep trees never overflow an integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TreeId(Vec<u8>);

impl TreeId {
    /// Label of the root node.
    pub fn root() -> Self {
        TreeId(vec![1])
    }

    /// Label of child `branch` (1 = down, 2 = up).
    pub fn child(&self, branch: u8) -> Self {
        let mut digits = self.0.clone();
        digits.push(branch);
        TreeId(digits)
    }

    /// Label of the parent (None for the root).
    pub fn parent(&self) -> Option<Self> {
        if self.0.len() <= 1 {
            return None;
        }
        Some(TreeId(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Depth below the root.
    pub fn depth(&self) -> usize {
        self.0.len() - 1
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in &self.0 {
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

/// Why a node was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FathomReason {
    /// Relaxation infeasible.
    Infeasible,

    /// Relaxation unbounded.
    Unbounded,

    /// Oracle gave up before a conclusion.
    IterationLimit,

    /// Oracle failed.
    OracleError,

    /// Relaxation value cannot beat the incumbent.
    Bound,

    /// Branching emptied a variable domain.
    EmptyDomain,
}

/// Status of a search node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    /// Node is waiting on the frontier.
    Pending,

    /// Relaxation solved, not yet classified.
    Solved,

    /// Integral relaxation accepted as incumbent.
    Accepted,

    /// Children created.
    Branched,

    /// Node discarded.
    Fathomed(FathomReason),
}

/// A subproblem in the branch-and-cut tree.
///
/// Each node owns its constraint rows and bounds. Children are deep copies
/// with one extra row, so siblings never share buffers.
#[derive(Debug, Clone)]
pub struct Subproblem {
    /// Arena identifier.
    pub id: NodeId,

    /// Path label for diagnostics.
    pub tree_id: TreeId,

    /// Depth in the tree (0 for root).
    pub depth: usize,

    /// Inequality rows A x <= b (root rows, then appended rows).
    pub a: DMatrix<f64>,

    /// Inequality right-hand side.
    pub b: Vec<f64>,

    /// Equality rows.
    pub a_eq: DMatrix<f64>,

    /// Equality right-hand side.
    pub b_eq: Vec<f64>,

    /// Lower bounds.
    pub lb: Vec<f64>,

    /// Upper bounds.
    pub ub: Vec<f64>,

    /// LP value of this node once solved; before that the parent's value
    /// (root: -inf).
    pub parent_bound: f64,

    /// Last relaxation optimum.
    pub solution: Option<Vec<f64>>,

    /// Processing status.
    pub status: NodeStatus,
}

impl Subproblem {
    /// Create the root node from problem data.
    pub fn root(id: NodeId, prob: &MilpProblem) -> Self {
        Self {
            id,
            tree_id: TreeId::root(),
            depth: 0,
            a: prob.a.clone(),
            b: prob.b.clone(),
            a_eq: prob.a_eq.clone(),
            b_eq: prob.b_eq.clone(),
            lb: prob.lb.clone(),
            ub: prob.ub.clone(),
            parent_bound: f64::NEG_INFINITY,
            solution: None,
            status: NodeStatus::Pending,
        }
    }

    /// Create child `branch` (1 or 2) carrying this node's arrays and bound.
    pub fn child(&self, id: NodeId, branch: u8) -> Self {
        Self {
            id,
            tree_id: self.tree_id.child(branch),
            depth: self.depth + 1,
            a: self.a.clone(),
            b: self.b.clone(),
            a_eq: self.a_eq.clone(),
            b_eq: self.b_eq.clone(),
            lb: self.lb.clone(),
            ub: self.ub.clone(),
            parent_bound: self.parent_bound,
            solution: None,
            status: NodeStatus::Pending,
        }
    }

    /// Borrow this node's system as an oracle input.
    pub fn relaxation<'a>(&'a self, objective: &'a [f64]) -> Relaxation<'a> {
        Relaxation {
            objective,
            a: &self.a,
            b: &self.b,
            a_eq: &self.a_eq,
            b_eq: &self.b_eq,
            lb: &self.lb,
            ub: &self.ub,
        }
    }

    /// Append `cutᵀx <= rhs` as a new inequality row.
    pub fn append_row(&mut self, cut: &LinearCut) {
        let m = self.a.nrows();
        let n = self.a.ncols();
        let a = std::mem::replace(&mut self.a, DMatrix::zeros(0, n));
        let mut a = a.insert_row(m, 0.0);
        for (j, &c) in cut.coefs.iter().enumerate().take(n) {
            a[(m, j)] = c;
        }
        self.a = a;
        self.b.push(cut.rhs);
    }

    /// Number of inequality rows.
    pub fn num_rows(&self) -> usize {
        self.b.len()
    }

    /// True if some variable has `lb > ub`.
    pub fn has_empty_domain(&self) -> bool {
        self.lb.iter().zip(&self.ub).any(|(l, u)| l > u)
    }

    /// Check if this node can be discarded against an incumbent value.
    pub fn can_prune(&self, incumbent_obj: f64) -> bool {
        self.parent_bound >= incumbent_obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cuts::CutSource;

    fn prob() -> MilpProblem {
        MilpProblem::new(
            vec![1.0],
            vec![1.0],
            DMatrix::from_row_slice(1, 2, &[1.0, 1.0]),
            vec![4.0],
            vec![0.0, 0.0],
            vec![5.0, 5.0],
        )
        .unwrap()
    }

    #[test]
    fn test_tree_ids() {
        let root = TreeId::root();
        assert_eq!(root.to_string(), "1");
        assert!(root.parent().is_none());

        let child = root.child(1).child(2);
        assert_eq!(child.to_string(), "112");
        assert_eq!(child.depth(), 2);
        assert_eq!(child.parent().unwrap().to_string(), "11");
    }

    #[test]
    fn test_child_is_independent_copy() {
        let mut root = Subproblem::root(0, &prob());
        root.parent_bound = -3.0;

        let mut child = root.child(1, 2);
        child.append_row(&LinearCut::new(vec![-1.0, 0.0], -2.0, CutSource::Branching { var: 0 }));
        child.lb[0] = 2.0;

        assert_eq!(child.num_rows(), 2);
        assert_eq!(child.a[(1, 0)], -1.0);
        assert_eq!(child.b, vec![4.0, -2.0]);
        assert_eq!(child.parent_bound, -3.0);
        assert_eq!(child.tree_id.to_string(), "12");

        // Parent untouched
        assert_eq!(root.num_rows(), 1);
        assert_eq!(root.lb[0], 0.0);
    }

    #[test]
    fn test_empty_domain_and_pruning() {
        let mut node = Subproblem::root(0, &prob());
        assert!(!node.has_empty_domain());
        node.lb[1] = 6.0;
        assert!(node.has_empty_domain());

        node.parent_bound = 10.0;
        assert!(node.can_prune(10.0));
        assert!(!node.can_prune(10.5));
    }
}
