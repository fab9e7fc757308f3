//! Dense two-phase bounded simplex.
//!
//! The LP is rewritten into equality standard form over nonnegative columns:
//!
//! ```text
//! x_j = lb_j + y_j          (finite lower bound; finite ub adds row y_j <= ub_j - lb_j)
//! x_j = ub_j - y_j          (only the upper bound is finite)
//! x_j = y⁺_j - y⁻_j         (free variable)
//! ```
//!
//! Every inequality row gets a slack, and rows whose slack cannot start basic
//! (negative rhs, equalities) get an artificial column. Phase 1 minimizes the
//! artificial sum, phase 2 the true objective with artificials barred from
//! entering.
//!
//! Pricing is Dantzig's most-negative reduced cost; after a run of degenerate
//! pivots the phase switches to Bland's rule, which cannot cycle.

use nalgebra::DMatrix;

use crate::error::{LpError, LpResult};
use crate::problem::{LpProblem, LpSolution, LpStatus, SimplexSettings};

/// How an original variable maps onto nonnegative tableau columns.
#[derive(Debug, Clone, Copy)]
enum ColumnMap {
    /// x = offset + y[col]
    Shifted { col: usize, offset: f64 },
    /// x = offset - y[col]
    Mirrored { col: usize, offset: f64 },
    /// x = y[pos] - y[neg]
    Split { pos: usize, neg: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Le,
    Eq,
}

struct RowSpec {
    coefs: Vec<f64>,
    rhs: f64,
    kind: RowKind,
}

/// Outcome of running one simplex phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhaseOutcome {
    Optimal,
    Unbounded,
    IterationLimit,
}

/// Dense simplex tableau. The last row holds reduced costs, the last column
/// the basic values; `t[(m, rhs)]` is minus the current objective.
struct Tableau {
    t: DMatrix<f64>,
    basis: Vec<usize>,
    m: usize,
    rhs: usize,
    art_start: usize,
    iterations: usize,
}

/// Solve an LP with the dense simplex method.
pub fn solve(prob: &LpProblem, settings: &SimplexSettings) -> LpResult<LpSolution> {
    prob.validate()?;

    let n = prob.num_vars();
    if (0..n).any(|j| prob.lb[j] > prob.ub[j]) {
        log::debug!("LP has crossed bounds; infeasible without pivoting");
        return Ok(LpSolution::without_point(LpStatus::Infeasible, 0));
    }

    let (maps, num_structural) = map_columns(prob);
    let rows = build_rows(prob, &maps, num_structural);
    let rhs_scale = rows.iter().map(|r| r.rhs.abs()).fold(1.0_f64, f64::max);
    let mut tab = Tableau::new(&rows, num_structural);

    // Phase 1: minimize the sum of artificials
    if tab.art_start < tab.rhs {
        tab.load_phase1_costs();
        let outcome = tab.run(settings, |_| true);
        tab.check_finite()?;
        if outcome == PhaseOutcome::IterationLimit {
            return Ok(LpSolution::without_point(LpStatus::IterationLimit, tab.iterations));
        }

        let infeasibility = -tab.t[(tab.m, tab.rhs)];
        if infeasibility > settings.feas_tol * rhs_scale {
            log::debug!("LP phase 1 ended with infeasibility {:.3e}", infeasibility);
            return Ok(LpSolution::without_point(LpStatus::Infeasible, tab.iterations));
        }
        tab.drive_out_artificials(settings.pivot_tol);
    }

    // Phase 2: the true objective
    let costs = structural_costs(prob, &maps, tab.rhs);
    tab.load_costs(&costs);
    let art_start = tab.art_start;
    let outcome = tab.run(settings, |j| j < art_start);
    tab.check_finite()?;

    match outcome {
        PhaseOutcome::IterationLimit => {
            Ok(LpSolution::without_point(LpStatus::IterationLimit, tab.iterations))
        }
        PhaseOutcome::Unbounded => {
            Ok(LpSolution::without_point(LpStatus::Unbounded, tab.iterations))
        }
        PhaseOutcome::Optimal => {
            let x = tab.recover_point(prob, &maps);
            let obj_val = prob.objective(&x);
            Ok(LpSolution {
                status: LpStatus::Optimal,
                x,
                obj_val,
                iterations: tab.iterations,
            })
        }
    }
}

fn map_columns(prob: &LpProblem) -> (Vec<ColumnMap>, usize) {
    let mut next = 0;
    let maps = (0..prob.num_vars())
        .map(|j| {
            let (lb, ub) = (prob.lb[j], prob.ub[j]);
            let map = if lb.is_finite() {
                ColumnMap::Shifted { col: next, offset: lb }
            } else if ub.is_finite() {
                ColumnMap::Mirrored { col: next, offset: ub }
            } else {
                next += 1;
                ColumnMap::Split { pos: next - 1, neg: next }
            };
            next += 1;
            map
        })
        .collect();
    (maps, next)
}

fn build_rows(prob: &LpProblem, maps: &[ColumnMap], num_structural: usize) -> Vec<RowSpec> {
    let n = prob.num_vars();
    let mut rows = Vec::with_capacity(prob.num_inequalities() + prob.num_equalities() + n);

    let mut translate = |a: &DMatrix<f64>, i: usize, rhs: f64, kind: RowKind| {
        let mut coefs = vec![0.0; num_structural];
        let mut rhs = rhs;
        for (j, map) in maps.iter().enumerate() {
            let a_ij = a[(i, j)];
            if a_ij == 0.0 {
                continue;
            }
            match *map {
                ColumnMap::Shifted { col, offset } => {
                    coefs[col] += a_ij;
                    rhs -= a_ij * offset;
                }
                ColumnMap::Mirrored { col, offset } => {
                    coefs[col] -= a_ij;
                    rhs -= a_ij * offset;
                }
                ColumnMap::Split { pos, neg } => {
                    coefs[pos] += a_ij;
                    coefs[neg] -= a_ij;
                }
            }
        }
        rows.push(RowSpec { coefs, rhs, kind });
    };

    for i in 0..prob.num_inequalities() {
        translate(&prob.a_ub, i, prob.b_ub[i], RowKind::Le);
    }
    for i in 0..prob.num_equalities() {
        translate(&prob.a_eq, i, prob.b_eq[i], RowKind::Eq);
    }

    // Finite upper bounds of shifted columns become y <= ub - lb
    for (j, map) in maps.iter().enumerate() {
        if let ColumnMap::Shifted { col, offset } = *map {
            if prob.ub[j].is_finite() {
                let mut coefs = vec![0.0; num_structural];
                coefs[col] = 1.0;
                rows.push(RowSpec {
                    coefs,
                    rhs: prob.ub[j] - offset,
                    kind: RowKind::Le,
                });
            }
        }
    }

    rows
}

fn structural_costs(prob: &LpProblem, maps: &[ColumnMap], width: usize) -> Vec<f64> {
    let mut costs = vec![0.0; width];
    for (j, map) in maps.iter().enumerate() {
        match *map {
            ColumnMap::Shifted { col, .. } => costs[col] = prob.c[j],
            ColumnMap::Mirrored { col, .. } => costs[col] = -prob.c[j],
            ColumnMap::Split { pos, neg } => {
                costs[pos] = prob.c[j];
                costs[neg] = -prob.c[j];
            }
        }
    }
    costs
}

impl Tableau {
    fn new(rows: &[RowSpec], num_structural: usize) -> Self {
        let m = rows.len();
        let num_slack = rows.iter().filter(|r| r.kind == RowKind::Le).count();
        let needs_artificial: Vec<bool> = rows
            .iter()
            .map(|r| r.kind == RowKind::Eq || r.rhs < 0.0)
            .collect();
        let num_art = needs_artificial.iter().filter(|&&a| a).count();

        let art_start = num_structural + num_slack;
        let rhs = art_start + num_art;
        let mut t = DMatrix::zeros(m + 1, rhs + 1);
        let mut basis = vec![0; m];

        let mut slack = num_structural;
        let mut art = art_start;
        for (i, row) in rows.iter().enumerate() {
            let sign = if row.rhs < 0.0 { -1.0 } else { 1.0 };
            for (j, &a) in row.coefs.iter().enumerate() {
                t[(i, j)] = sign * a;
            }
            t[(i, rhs)] = sign * row.rhs;

            if row.kind == RowKind::Le {
                t[(i, slack)] = sign;
                if !needs_artificial[i] {
                    basis[i] = slack;
                }
                slack += 1;
            }
            if needs_artificial[i] {
                t[(i, art)] = 1.0;
                basis[i] = art;
                art += 1;
            }
        }

        Self {
            t,
            basis,
            m,
            rhs,
            art_start,
            iterations: 0,
        }
    }

    fn load_phase1_costs(&mut self) {
        let mut costs = vec![0.0; self.rhs];
        for c in costs.iter_mut().skip(self.art_start) {
            *c = 1.0;
        }
        self.load_costs(&costs);
    }

    /// Write reduced costs `c_j - c_Bᵀ B⁻¹ a_j` into the objective row.
    fn load_costs(&mut self, costs: &[f64]) {
        let (m, rhs) = (self.m, self.rhs);
        for j in 0..rhs {
            self.t[(m, j)] = costs[j];
        }
        self.t[(m, rhs)] = 0.0;
        for i in 0..m {
            let cb = costs[self.basis[i]];
            if cb == 0.0 {
                continue;
            }
            for j in 0..=rhs {
                let v = self.t[(i, j)];
                self.t[(m, j)] -= cb * v;
            }
        }
    }

    fn run(&mut self, settings: &SimplexSettings, allowed: impl Fn(usize) -> bool) -> PhaseOutcome {
        let mut bland = false;
        let mut degenerate = 0;

        loop {
            let Some(q) = self.entering(settings.opt_tol, bland, &allowed) else {
                return PhaseOutcome::Optimal;
            };
            let Some(p) = self.leaving(q, settings.pivot_tol) else {
                return PhaseOutcome::Unbounded;
            };
            if self.iterations >= settings.max_iter {
                log::debug!("Simplex pivot cap {} reached", settings.max_iter);
                return PhaseOutcome::IterationLimit;
            }

            if self.t[(p, self.rhs)] <= settings.pivot_tol {
                degenerate += 1;
                if !bland && degenerate >= settings.degenerate_run {
                    log::debug!("Switching to Bland's rule after {} degenerate pivots", degenerate);
                    bland = true;
                }
            } else {
                degenerate = 0;
            }

            self.pivot(p, q);
            self.iterations += 1;
        }
    }

    fn entering(&self, tol: f64, bland: bool, allowed: &impl Fn(usize) -> bool) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for j in 0..self.rhs {
            if !allowed(j) {
                continue;
            }
            let d = self.t[(self.m, j)];
            if d >= -tol {
                continue;
            }
            if bland {
                return Some(j);
            }
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((j, d));
            }
        }
        best.map(|(j, _)| j)
    }

    fn leaving(&self, q: usize, tol: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for i in 0..self.m {
            let a = self.t[(i, q)];
            if a <= tol {
                continue;
            }
            let ratio = self.t[(i, self.rhs)].max(0.0) / a;
            best = match best {
                None => Some((i, ratio)),
                Some((bi, br)) => {
                    if ratio < br - 1e-12 || ((ratio - br).abs() <= 1e-12 && self.basis[i] < self.basis[bi]) {
                        Some((i, ratio))
                    } else {
                        Some((bi, br))
                    }
                }
            };
        }
        best.map(|(i, _)| i)
    }

    fn pivot(&mut self, p: usize, q: usize) {
        let width = self.rhs + 1;
        let piv = self.t[(p, q)];
        for j in 0..width {
            self.t[(p, j)] /= piv;
        }
        self.t[(p, q)] = 1.0;

        for i in 0..=self.m {
            if i == p {
                continue;
            }
            let factor = self.t[(i, q)];
            if factor == 0.0 {
                continue;
            }
            for j in 0..width {
                let v = self.t[(p, j)];
                self.t[(i, j)] -= factor * v;
            }
            self.t[(i, q)] = 0.0;
            if i < self.m && self.t[(i, self.rhs)] < 0.0 && self.t[(i, self.rhs)] > -1e-12 {
                self.t[(i, self.rhs)] = 0.0;
            }
        }
        self.basis[p] = q;
    }

    /// Pivot zero-level artificials out of the basis where a structural or
    /// slack column allows it. Rows with no such column are redundant and keep
    /// their artificial at zero.
    fn drive_out_artificials(&mut self, tol: f64) {
        for i in 0..self.m {
            if self.basis[i] < self.art_start {
                continue;
            }
            let replacement = (0..self.art_start).find(|&j| self.t[(i, j)].abs() > tol);
            match replacement {
                Some(j) => {
                    self.pivot(i, j);
                    self.iterations += 1;
                }
                None => log::debug!("Row {} is redundant", i),
            }
        }
    }

    fn check_finite(&self) -> LpResult<()> {
        if self.t.iter().all(|v| v.is_finite()) {
            Ok(())
        } else {
            Err(LpError::Numerical("tableau contains non-finite values".to_string()))
        }
    }

    fn recover_point(&self, prob: &LpProblem, maps: &[ColumnMap]) -> Vec<f64> {
        let mut y = vec![0.0; self.rhs];
        for (i, &col) in self.basis.iter().enumerate() {
            y[col] = self.t[(i, self.rhs)].max(0.0);
        }

        maps.iter()
            .enumerate()
            .map(|(j, map)| {
                let x = match *map {
                    ColumnMap::Shifted { col, offset } => offset + y[col],
                    ColumnMap::Mirrored { col, offset } => offset - y[col],
                    ColumnMap::Split { pos, neg } => y[pos] - y[neg],
                };
                x.clamp(prob.lb[j], prob.ub[j])
            })
            .collect()
    }
}
