//! MILP formulation of the allocation problem.
//!
//! Design vector, for `K` aircraft types and `J` routes:
//!
//! ```text
//! x = [trips_00 .. trips_(K-1)(J-1), pax_00 .. pax_(K-1)(J-1)]
//! ```
//!
//! with `trips_kj` (integer, one-way trips) at column `k·J + j` and
//! `pax_kj` (continuous, passengers) at `K·J + k·J + j`.
//!
//! Rows, in order:
//!
//! | block         | rows | row                                                  |
//! |---------------|------|------------------------------------------------------|
//! | upper demand  | J    | `Σ_k pax_kj <= demand_j`                             |
//! | lower demand  | J    | `-Σ_k pax_kj <= -0.2·demand_j`                       |
//! | utilization   | K    | `Σ_j (block_kj·(1 + MH_k) + turn)·trips_kj <= 12·fleet_k` |
//! | capacity      | K·J  | `-seats_k·trips_kj + pax_kj <= 0`                    |

use nalgebra::DMatrix;
use solver_mip::{MilpProblem, RowPartition};

use crate::data::AllocationData;
use crate::error::AllocResult;

/// Share of demand that must be carried on every route.
pub const MIN_SERVICE_FRACTION: f64 = 0.2;

/// Hours per day each aircraft can be scheduled.
pub const UTILIZATION_HOURS: f64 = 12.0;

/// Objective coefficients `(obj_int, obj_con)`.
///
/// Trips cost their operating cost plus fuel; passengers earn the ticket
/// price, so revenue enters negated.
pub fn objective(data: &AllocationData) -> (Vec<f64>, Vec<f64>) {
    let kj = data.num_types() * data.num_routes();
    let mut obj_int = vec![0.0; kj];
    let mut obj_con = vec![0.0; kj];
    for k in 0..data.num_types() {
        for j in 0..data.num_routes() {
            let col = data.col(k, j);
            obj_int[col] = data.doc[k][j] + data.fuel_cost * data.fuel_burn[k][j];
            obj_con[col] = -data.price[k][j];
        }
    }
    (obj_int, obj_con)
}

/// Inequality system `A x <= b`.
pub fn constraints(data: &AllocationData) -> (DMatrix<f64>, Vec<f64>) {
    let (nk, nj) = (data.num_types(), data.num_routes());
    let kj = nk * nj;
    let rows = 2 * nj + nk + kj;

    let mut a = DMatrix::zeros(rows, 2 * kj);
    let mut b = Vec::with_capacity(rows);

    // Demand
    for (j, route) in data.routes.iter().enumerate() {
        for k in 0..nk {
            a[(j, kj + data.col(k, j))] = 1.0;
        }
        b.push(route.demand);
    }
    for (j, route) in data.routes.iter().enumerate() {
        for k in 0..nk {
            a[(nj + j, kj + data.col(k, j))] = -1.0;
        }
        b.push(-MIN_SERVICE_FRACTION * route.demand);
    }

    // Utilization
    let base = 2 * nj;
    for (k, ac) in data.aircraft.iter().enumerate() {
        for j in 0..nj {
            a[(base + k, data.col(k, j))] =
                data.block_time[k][j] * (1.0 + ac.maintenance_ratio) + data.turnaround;
        }
        b.push(UTILIZATION_HOURS * ac.fleet);
    }

    // Capacity
    let base = 2 * nj + nk;
    for (k, ac) in data.aircraft.iter().enumerate() {
        for j in 0..nj {
            let row = base + data.col(k, j);
            a[(row, data.col(k, j))] = -ac.seats;
            a[(row, kj + data.col(k, j))] = 1.0;
            b.push(0.0);
        }
    }

    (a, b)
}

/// Variable bounds: trips in `[0, max_trips_k]`, passengers in `[0, inf)`.
pub fn bounds(data: &AllocationData) -> (Vec<f64>, Vec<f64>) {
    let kj = data.num_types() * data.num_routes();
    let mut ub = Vec::with_capacity(2 * kj);
    for ac in &data.aircraft {
        ub.extend(std::iter::repeat(ac.max_trips).take(data.num_routes()));
    }
    ub.extend(std::iter::repeat(f64::INFINITY).take(kj));
    (vec![0.0; 2 * kj], ub)
}

/// Demand rows touch passengers only; the rest involve trips.
pub fn row_partition(data: &AllocationData) -> RowPartition {
    let (nk, nj) = (data.num_types(), data.num_routes());
    let rows = 2 * nj + nk + nk * nj;
    RowPartition::new((0..2 * nj).collect(), (2 * nj..rows).collect())
}

/// Build the MILP for `data`.
pub fn formulate(data: &AllocationData) -> AllocResult<MilpProblem> {
    data.validate()?;

    let (obj_int, obj_con) = objective(data);
    let (a, b) = constraints(data);
    let (lb, ub) = bounds(data);

    let prob = MilpProblem::new(obj_int, obj_con, a, b, lb, ub)?
        .with_row_partition(row_partition(data), RowPartition::default())?;

    log::debug!(
        "Formulated allocation: {} variables ({} trips), {} rows",
        prob.num_vars(),
        prob.num_integers(),
        prob.a.nrows()
    );
    Ok(prob)
}
