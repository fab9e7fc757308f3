//! Post-solve allocation report.
//!
//! The solved model is one-way; the report covers round trips, so trips and
//! passengers are doubled before anything is aggregated.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::AllocationData;
use crate::error::{AllocError, AllocResult};

/// Solution values within this distance of zero are reported as zero.
const CLEAN_TOL: f64 = 1e-6;

/// Block hours in a day, for fleet usage.
const DAY_HOURS: f64 = 24.0;

/// Totals for one aircraft type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSummary {
    /// Type label.
    pub name: String,
    /// Round trips over all routes.
    pub trips: f64,
    /// Aircraft needed to fly them.
    pub fleet_used: f64,
    /// Fuel burned.
    pub fuel: f64,
    /// Operating cost, fuel excluded.
    pub doc: f64,
    /// Block hours flown.
    pub block_hours: f64,
    /// NOx emitted.
    pub nox: f64,
    /// Seats offered.
    pub seat_capacity: f64,
    /// Passengers carried.
    pub pax: f64,
    /// Passenger nautical miles.
    pub pax_miles: f64,
}

/// One aircraft type flying a route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteAllocation {
    /// Aircraft type index.
    pub aircraft: usize,
    /// Round trips.
    pub trips: f64,
    /// Passengers.
    pub pax: f64,
}

/// Totals for one route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSummary {
    /// Route label.
    pub name: String,
    /// Ticket revenue.
    pub revenue: f64,
    /// Operating plus fuel cost.
    pub cost: f64,
    /// Passengers.
    pub pax: f64,
    /// Revenue minus cost.
    pub profit: f64,
    /// Types flying the route.
    pub allocations: Vec<RouteAllocation>,
}

/// Allocation report for a solution vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationReport {
    /// Round trips per type and route.
    pub detail_trips: Vec<Vec<f64>>,
    /// Passengers per type and route.
    pub detail_pax: Vec<Vec<f64>>,
    /// Cost per type and route.
    pub cost_detail: Vec<Vec<f64>>,
    /// Revenue per type and route.
    pub revenue_detail: Vec<Vec<f64>>,
    /// Per-type totals.
    pub types: Vec<TypeSummary>,
    /// Per-route totals.
    pub routes: Vec<RouteSummary>,
    /// Total cost.
    pub total_cost: f64,
    /// Total revenue.
    pub total_revenue: f64,
    /// Total profit.
    pub profit: f64,
    /// Profit per passenger nautical mile, zero when nothing is flown.
    pub profit_per_pax_mile: f64,
}

impl AllocationReport {
    /// Build the report for the one-way solution `x` of `data`'s model.
    pub fn from_solution(data: &AllocationData, x: &[f64]) -> AllocResult<Self> {
        let (nk, nj) = (data.num_types(), data.num_routes());
        let kj = nk * nj;
        if x.len() != 2 * kj {
            return Err(AllocError::SolutionMismatch(format!(
                "solution has {} entries, the model has {}",
                x.len(),
                2 * kj
            )));
        }

        let clean = |v: f64| if v.abs() < CLEAN_TOL { 0.0 } else { v };
        let mut detail_trips = vec![vec![0.0; nj]; nk];
        let mut detail_pax = vec![vec![0.0; nj]; nk];
        for k in 0..nk {
            for j in 0..nj {
                let col = data.col(k, j);
                detail_trips[k][j] = 2.0 * clean(x[col]);
                detail_pax[k][j] = 2.0 * clean(x[kj + col]);
            }
        }

        let mut cost_detail = vec![vec![0.0; nj]; nk];
        let mut revenue_detail = vec![vec![0.0; nj]; nk];
        let mut types = Vec::with_capacity(nk);
        for (k, ac) in data.aircraft.iter().enumerate() {
            let trips = &detail_trips[k];
            let pax = &detail_pax[k];
            let weighted = |table: &[f64]| table.iter().zip(trips).map(|(c, t)| c * t).sum::<f64>();

            for j in 0..nj {
                cost_detail[k][j] =
                    data.doc[k][j] * trips[j] + data.fuel_burn[k][j] * data.fuel_cost * trips[j];
                revenue_detail[k][j] = data.price[k][j] * pax[j];
            }

            let hours: f64 = (0..nj)
                .map(|j| {
                    data.block_time[k][j] * (1.0 + ac.maintenance_ratio) * trips[j]
                        + trips[j] * data.turnaround
                })
                .sum();
            let nox: f64 = (0..nj).map(|j| data.nox_at(k, j) * trips[j]).sum();

            types.push(TypeSummary {
                name: ac.name.clone(),
                trips: trips.iter().sum(),
                fleet_used: (hours / DAY_HOURS).ceil(),
                fuel: weighted(&data.fuel_burn[k]),
                doc: weighted(&data.doc[k]),
                block_hours: weighted(&data.block_time[k]),
                nox,
                seat_capacity: ac.seats * trips.iter().sum::<f64>(),
                pax: pax.iter().sum(),
                pax_miles: pax.iter().zip(&data.routes).map(|(p, r)| p * r.distance).sum(),
            });
        }

        let mut routes = Vec::with_capacity(nj);
        let mut pax_miles = 0.0;
        for (j, route) in data.routes.iter().enumerate() {
            let revenue: f64 = (0..nk).map(|k| revenue_detail[k][j]).sum();
            let cost: f64 = (0..nk).map(|k| cost_detail[k][j]).sum();
            let pax: f64 = (0..nk).map(|k| detail_pax[k][j]).sum();
            pax_miles += pax * route.distance;

            let allocations = (0..nk)
                .filter(|&k| detail_trips[k][j] != 0.0)
                .map(|k| RouteAllocation {
                    aircraft: k,
                    trips: detail_trips[k][j],
                    pax: detail_pax[k][j],
                })
                .collect();

            routes.push(RouteSummary {
                name: route.name.clone(),
                revenue,
                cost,
                pax,
                profit: revenue - cost,
                allocations,
            });
        }

        let total_cost = types.iter().map(|t| t.doc + t.fuel * data.fuel_cost).sum();
        let total_revenue = routes.iter().map(|r| r.revenue).sum();
        let profit: f64 = routes.iter().map(|r| r.profit).sum();
        let profit_per_pax_mile = if pax_miles > 0.0 { profit / pax_miles } else { 0.0 };

        Ok(Self {
            detail_trips,
            detail_pax,
            cost_detail,
            revenue_detail,
            types,
            routes,
            total_cost,
            total_revenue,
            profit,
            profit_per_pax_mile,
        })
    }

    /// Save to JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> AllocResult<()> {
        let file = File::create(path.as_ref())?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_routes() -> AllocationData {
        AllocationData::from_json_str(
            r#"{
                "routes": [
                    {"name": "A", "demand": 250, "distance": 1000},
                    {"name": "B", "demand": 450, "distance": 1500}
                ],
                "aircraft": [
                    {"name": "narrowbody", "seats": 100, "fleet": 4, "max_trips": 10, "maintenance_ratio": 0.5}
                ],
                "block_time": [[2, 3]],
                "fuel_burn": [[500, 800]],
                "doc": [[1000, 1500]],
                "price": [[100, 150]],
                "nox": [[1, 2]],
                "turnaround": 0.5,
                "fuel_cost": 2
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip_report() {
        let data = two_routes();
        let report = AllocationReport::from_solution(&data, &[3.0, 5.0, 250.0, 450.0]).unwrap();

        assert_eq!(report.detail_trips, vec![vec![6.0, 10.0]]);
        assert_eq!(report.detail_pax, vec![vec![500.0, 900.0]]);

        let t = &report.types[0];
        assert_eq!(t.trips, 16.0);
        // (2·1.5·6 + 3) + (3·1.5·10 + 5) = 71 hours
        assert_eq!(t.fleet_used, 3.0);
        assert_eq!(t.fuel, 11000.0);
        assert_eq!(t.doc, 21000.0);
        assert_eq!(t.block_hours, 42.0);
        assert_eq!(t.nox, 26.0);
        assert_eq!(t.seat_capacity, 1600.0);
        assert_eq!(t.pax, 1400.0);
        assert_eq!(t.pax_miles, 1_850_000.0);

        assert_eq!(report.cost_detail, vec![vec![12000.0, 31000.0]]);
        assert_eq!(report.revenue_detail, vec![vec![50000.0, 135000.0]]);
        assert_eq!(report.routes[1].profit, 104000.0);
        assert_eq!(report.routes[0].allocations.len(), 1);
        assert_eq!(report.routes[0].allocations[0].trips, 6.0);

        assert_eq!(report.total_cost, 43000.0);
        assert_eq!(report.total_revenue, 185000.0);
        // Twice the one-way objective of -71000
        assert_eq!(report.profit, 142000.0);
        assert!((report.profit_per_pax_mile - 142000.0 / 1_850_000.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_allocation() {
        let data = two_routes();
        let report = AllocationReport::from_solution(&data, &[1e-9, 0.0, -1e-8, 0.0]).unwrap();

        assert_eq!(report.detail_trips, vec![vec![0.0, 0.0]]);
        assert_eq!(report.profit, 0.0);
        assert_eq!(report.profit_per_pax_mile, 0.0);
        assert!(report.routes.iter().all(|r| r.allocations.is_empty()));
        assert_eq!(report.types[0].fleet_used, 0.0);
    }

    #[test]
    fn test_length_mismatch() {
        let data = two_routes();
        assert!(matches!(
            AllocationReport::from_solution(&data, &[1.0, 2.0]),
            Err(AllocError::SolutionMismatch(_))
        ));
    }
}
