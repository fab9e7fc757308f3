//! Linear cut representation.

use std::fmt;

/// Where a cut came from (for tracking and debugging).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutSource {
    /// Gomory fractional cut read off a tableau row.
    Gomory {
        /// Tableau row the cut was derived from.
        tableau_row: usize,
    },

    /// Gomory cut on the integer sub-system, lifted to the full space.
    Lifted,

    /// Branching row (x <= floor or -x <= -ceil).
    Branching {
        /// Branched variable.
        var: usize,
    },
}

/// A linear cut: aᵀx <= rhs.
#[derive(Debug, Clone)]
pub struct LinearCut {
    /// Coefficient vector (dense, length n).
    pub coefs: Vec<f64>,

    /// Right-hand side.
    pub rhs: f64,

    /// Optional name for debugging.
    pub name: Option<String>,

    /// Source of this cut.
    pub source: CutSource,
}

impl LinearCut {
    /// Create a new cut.
    pub fn new(coefs: Vec<f64>, rhs: f64, source: CutSource) -> Self {
        Self {
            coefs,
            rhs,
            name: None,
            source,
        }
    }

    /// Create a cut with a name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Compute violation: aᵀx - rhs (positive means violated).
    pub fn violation(&self, x: &[f64]) -> f64 {
        let lhs: f64 = self.coefs.iter().zip(x.iter()).map(|(a, x)| a * x).sum();
        lhs - self.rhs
    }

    /// Check if cut is violated by more than tolerance.
    pub fn is_violated(&self, x: &[f64], tol: f64) -> bool {
        self.violation(x) > tol
    }

    /// Check if cut has usable coefficients (not all zeros, finite).
    pub fn is_valid(&self) -> bool {
        let has_nonzero = self.coefs.iter().any(|&c| c != 0.0);
        let all_finite = self.coefs.iter().all(|c| c.is_finite()) && self.rhs.is_finite();
        has_nonzero && all_finite
    }

    /// Number of nonzero coefficients.
    pub fn nnz(&self) -> usize {
        self.coefs.iter().filter(|&&c| c != 0.0).count()
    }
}

impl fmt::Display for LinearCut {
    /// Renders as `2x0 - 1.5x3 <= 4`, skipping zero terms.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (j, &c) in self.coefs.iter().enumerate() {
            if c == 0.0 {
                continue;
            }
            let mag = c.abs();
            match (first, c < 0.0) {
                (true, true) => write!(f, "-")?,
                (true, false) => {}
                (false, true) => write!(f, " - ")?,
                (false, false) => write!(f, " + ")?,
            }
            if mag != 1.0 {
                write!(f, "{}", mag)?;
            }
            write!(f, "x{}", j)?;
            first = false;
        }
        if first {
            write!(f, "0")?;
        }
        write!(f, " <= {}", self.rhs)
    }
}
