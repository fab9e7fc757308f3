//! Allocation instance data.
//!
//! Per-type × per-route tables are stored row-major as `table[k][j]` for
//! aircraft type `k` and route `j`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AllocError, AllocResult};

/// One route of the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// Route label.
    #[serde(default)]
    pub name: String,

    /// One-way passenger demand.
    pub demand: f64,

    /// Route distance in nautical miles.
    pub distance: f64,
}

/// One aircraft type of the fleet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AircraftType {
    /// Type label.
    #[serde(default)]
    pub name: String,

    /// Seats per aircraft.
    pub seats: f64,

    /// Aircraft available.
    pub fleet: f64,

    /// Upper bound on one-way trips per route.
    pub max_trips: f64,

    /// Maintenance hours per block hour.
    #[serde(default)]
    pub maintenance_ratio: f64,
}

/// A complete allocation instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationData {
    /// Routes, indexed by `j`.
    pub routes: Vec<Route>,

    /// Aircraft types, indexed by `k`.
    pub aircraft: Vec<AircraftType>,

    /// Block hours per trip.
    pub block_time: Vec<Vec<f64>>,

    /// Fuel burn per trip.
    pub fuel_burn: Vec<Vec<f64>>,

    /// Direct operating cost per trip, fuel excluded.
    pub doc: Vec<Vec<f64>>,

    /// Ticket price per passenger.
    pub price: Vec<Vec<f64>>,

    /// NOx emitted per trip.
    #[serde(default)]
    pub nox: Option<Vec<Vec<f64>>>,

    /// Turnaround hours added to every trip.
    pub turnaround: f64,

    /// Cost per unit of fuel.
    pub fuel_cost: f64,
}

impl AllocationData {
    /// Parse and validate an instance from a JSON string.
    pub fn from_json_str(json: &str) -> AllocResult<Self> {
        let data: Self = serde_json::from_str(json)?;
        data.validate()?;
        Ok(data)
    }

    /// Load and validate an instance from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> AllocResult<Self> {
        let file = File::open(path.as_ref())?;
        let data: Self = serde_json::from_reader(BufReader::new(file))?;
        data.validate()?;
        log::debug!(
            "Loaded {} with {} routes and {} aircraft types",
            path.as_ref().display(),
            data.num_routes(),
            data.num_types()
        );
        Ok(data)
    }

    /// Number of routes `J`.
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Number of aircraft types `K`.
    pub fn num_types(&self) -> usize {
        self.aircraft.len()
    }

    /// Column of type `k` on route `j` within a `K·J` block.
    pub fn col(&self, k: usize, j: usize) -> usize {
        k * self.num_routes() + j
    }

    /// NOx per trip, zero when the instance carries none.
    pub fn nox_at(&self, k: usize, j: usize) -> f64 {
        self.nox.as_ref().map_or(0.0, |t| t[k][j])
    }

    /// Check shapes, finiteness and signs.
    pub fn validate(&self) -> AllocResult<()> {
        let (k, j) = (self.num_types(), self.num_routes());
        if j == 0 {
            return Err(invalid("at least one route is required"));
        }
        if k == 0 {
            return Err(invalid("at least one aircraft type is required"));
        }

        for (idx, r) in self.routes.iter().enumerate() {
            nonneg(&format!("route {} demand", idx), r.demand)?;
            nonneg(&format!("route {} distance", idx), r.distance)?;
        }
        for (idx, a) in self.aircraft.iter().enumerate() {
            if !(a.seats.is_finite() && a.seats > 0.0) {
                return Err(invalid(format!("aircraft {} has {} seats", idx, a.seats)));
            }
            nonneg(&format!("aircraft {} fleet", idx), a.fleet)?;
            nonneg(&format!("aircraft {} max_trips", idx), a.max_trips)?;
            nonneg(&format!("aircraft {} maintenance_ratio", idx), a.maintenance_ratio)?;
        }

        check_table("block_time", &self.block_time, k, j, true)?;
        check_table("fuel_burn", &self.fuel_burn, k, j, true)?;
        check_table("doc", &self.doc, k, j, false)?;
        check_table("price", &self.price, k, j, false)?;
        if let Some(nox) = &self.nox {
            check_table("nox", nox, k, j, true)?;
        }

        nonneg("turnaround", self.turnaround)?;
        if !self.fuel_cost.is_finite() {
            return Err(invalid("fuel_cost is not finite"));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> AllocError {
    AllocError::InvalidData(msg.into())
}

fn nonneg(name: &str, v: f64) -> AllocResult<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{} must be finite and nonnegative, got {}", name, v)))
    }
}

fn check_table(name: &str, table: &[Vec<f64>], k: usize, j: usize, nonnegative: bool) -> AllocResult<()> {
    if table.len() != k {
        return Err(invalid(format!(
            "{} has {} rows, expected one per aircraft type ({})",
            name,
            table.len(),
            k
        )));
    }
    for (row_idx, row) in table.iter().enumerate() {
        if row.len() != j {
            return Err(invalid(format!(
                "{} row {} has {} entries, expected one per route ({})",
                name,
                row_idx,
                row.len(),
                j
            )));
        }
        for (col_idx, &v) in row.iter().enumerate() {
            if !v.is_finite() || (nonnegative && v < 0.0) {
                return Err(invalid(format!("{}[{}][{}] = {} is out of range", name, row_idx, col_idx, v)));
            }
        }
    }
    Ok(())
}
