//! Gomory fractional cut generation.
//!
//! Given a relaxation optimum `x` of `A x <= b, Aeq x = beq`, the system is
//! rewritten in equality form over `z = (x, s)` with slacks `s = b - A x`:
//!
//! ```text
//! [ A   I ] z = [ b   ]
//! [ Aeq 0 ]     [ beq ]
//! ```
//!
//! The columns with positive entries in `z` form the basis `B`, and
//! `T = B⁻¹ [M | rhs]` is the simplex tableau. A row `Σ t_j z_j = t_0` with
//! fractional `t_0` yields `Σ frac(t_j) z_j >= frac(t_0)`, which holds at every
//! nonnegative integer `z` and fails at the current point. Substituting
//! `s = b - A x` brings the cut back to the `x` space.
//!
//! Every tableau row is a linear combination of the system rows, so the cut
//! stays valid when the basis solve falls back to least squares.

use nalgebra::DMatrix;

use super::{CutSource, LinearCut};

/// Gomory generator settings.
#[derive(Debug, Clone)]
pub struct GomorySettings {
    /// Entries of the extended point above this are basic.
    pub basis_tol: f64,

    /// A tableau RHS further than this from an integer is fractional.
    pub frac_tol: f64,

    /// Cut coefficients and RHS within this of zero are cleared.
    pub zero_tol: f64,

    /// Tableau entries within this of an integer are snapped before the
    /// floor decomposition.
    pub snap_tol: f64,

    /// Singular values below this are treated as zero in least squares.
    pub svd_eps: f64,
}

impl Default for GomorySettings {
    fn default() -> Self {
        Self {
            basis_tol: 1e-6,
            frac_tol: 1e-6,
            zero_tol: 1e-8,
            snap_tol: 1e-9,
            svd_eps: 1e-12,
        }
    }
}

/// Statistics for Gomory cut generation.
#[derive(Debug, Default, Clone)]
pub struct GomoryStats {
    /// Calls to `derive_cut`.
    pub calls: usize,

    /// Cuts returned.
    pub cuts_generated: usize,

    /// Square bases that needed the least-squares fallback.
    pub lstsq_fallbacks: usize,

    /// Calls where no tableau row was fractional.
    pub no_fractional_row: usize,

    /// Candidate rows rejected as all-zero or non-finite.
    pub rejected: usize,
}

/// Gomory fractional cut generator.
///
/// Produces at most one cut per call.
#[derive(Debug, Clone, Default)]
pub struct GomoryCutGenerator {
    /// Settings.
    settings: GomorySettings,

    /// Statistics.
    stats: GomoryStats,
}

impl GomoryCutGenerator {
    /// Create a new Gomory cut generator.
    pub fn new(settings: GomorySettings) -> Self {
        Self {
            settings,
            stats: GomoryStats::default(),
        }
    }

    /// Get statistics.
    pub fn stats(&self) -> &GomoryStats {
        &self.stats
    }

    /// Derive one cut `coefsᵀ x <= rhs` excluding `x`, or `None` if the
    /// tableau has no fractional row or the candidate row is degenerate.
    ///
    /// `a` and `a_eq` must have `x.len()` columns (or zero rows).
    pub fn derive_cut(
        &mut self,
        x: &[f64],
        a: &DMatrix<f64>,
        b: &[f64],
        a_eq: &DMatrix<f64>,
        b_eq: &[f64],
    ) -> Option<LinearCut> {
        self.stats.calls += 1;

        let n = x.len();
        let m = a.nrows();
        let rows = m + a_eq.nrows();
        if rows == 0 || n == 0 {
            return None;
        }

        // Equality system over (x, s) plus its RHS as the last column
        let width = n + m + 1;
        let mut system = DMatrix::zeros(rows, width);
        for i in 0..m {
            for j in 0..n {
                system[(i, j)] = a[(i, j)];
            }
            system[(i, n + i)] = 1.0;
            system[(i, width - 1)] = b[i];
        }
        for i in 0..a_eq.nrows() {
            for j in 0..n {
                system[(m + i, j)] = a_eq[(i, j)];
            }
            system[(m + i, width - 1)] = b_eq[i];
        }

        let extended: Vec<f64> = x
            .iter()
            .copied()
            .chain((0..m).map(|i| b[i] - (0..n).map(|j| a[(i, j)] * x[j]).sum::<f64>()))
            .collect();
        let basis: Vec<usize> = extended
            .iter()
            .enumerate()
            .filter(|(_, &v)| v > self.settings.basis_tol)
            .map(|(j, _)| j)
            .collect();
        if basis.is_empty() {
            log::debug!("Gomory: empty basis, no cut");
            return None;
        }

        let tableau = self.solve_basis(&system.select_columns(&basis), &system)?;
        let Some(sel) = self.select_row(&tableau) else {
            self.stats.no_fractional_row += 1;
            log::debug!("Gomory: no fractional tableau row");
            return None;
        };

        // Floor/fraction decomposition of the selected row. The RHS entry is
        // flipped so the row reads aᵀz <= rhs.
        let snap = self.settings.snap_tol;
        let mut frac: Vec<f64> = tableau
            .row(sel)
            .iter()
            .map(|&v| {
                let r = v.round();
                let v = if (v - r).abs() <= snap { r } else { v };
                -(v - v.floor())
            })
            .collect();
        frac[width - 1] = -frac[width - 1];

        let (a_x, rest) = frac.split_at(n);
        let (a_s, t0) = (&rest[..m], rest[m]);

        // Eliminate slacks: a_x x + a_s (b - A x) <= -t0
        let zero = self.settings.zero_tol;
        let clean = |v: f64| if v.abs() <= zero { 0.0 } else { v };
        let coefs: Vec<f64> = (0..n)
            .map(|j| clean(a_x[j] - (0..m).map(|i| a_s[i] * a[(i, j)]).sum::<f64>()))
            .collect();
        let rhs = clean(-(t0 + (0..m).map(|i| a_s[i] * b[i]).sum::<f64>()));

        let cut = LinearCut::new(coefs, rhs, CutSource::Gomory { tableau_row: sel });
        if !cut.is_valid() {
            self.stats.rejected += 1;
            log::debug!("Gomory: candidate row from tableau row {} is degenerate", sel);
            return None;
        }

        self.stats.cuts_generated += 1;
        Some(cut)
    }

    /// Solve `B T = system`. Square bases use LU and fall back to least
    /// squares when singular; other shapes go straight to least squares.
    fn solve_basis(&mut self, basis: &DMatrix<f64>, system: &DMatrix<f64>) -> Option<DMatrix<f64>> {
        if basis.is_square() {
            if let Some(t) = basis.clone().lu().solve(system) {
                if t.iter().all(|v| v.is_finite()) {
                    return Some(t);
                }
            }
            self.stats.lstsq_fallbacks += 1;
            log::debug!("Gomory: singular basis, falling back to least squares");
        }

        match basis.clone().svd(true, true).solve(system, self.settings.svd_eps) {
            Ok(t) if t.iter().all(|v| v.is_finite()) => Some(t),
            Ok(_) => {
                log::debug!("Gomory: least-squares tableau is not finite");
                None
            }
            Err(e) => {
                log::debug!("Gomory: least-squares solve failed: {}", e);
                None
            }
        }
    }

    /// Row whose RHS has the largest fractional part among rows further than
    /// `frac_tol` from an integer. First row wins ties.
    fn select_row(&self, tableau: &DMatrix<f64>) -> Option<usize> {
        let last = tableau.ncols() - 1;
        let mut best: Option<(usize, f64)> = None;
        for i in 0..tableau.nrows() {
            let v = tableau[(i, last)];
            if (v - v.round()).abs() <= self.settings.frac_tol {
                continue;
            }
            let frac = v.abs().fract();
            if best.map_or(true, |(_, f)| frac > f) {
                best = Some((i, frac));
            }
        }
        best.map(|(i, _)| i)
    }
}
