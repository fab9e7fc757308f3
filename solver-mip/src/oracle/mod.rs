//! LP relaxation oracles.

mod backend;
mod simplex;

pub use backend::{LpOracle, OracleResult, OracleStatus, Relaxation};
pub use simplex::SimplexOracle;
