//! Dense LP relaxation solver.
//!
//! A small two-phase simplex used as the default relaxation oracle of the
//! branch-and-cut engine. Problems are stored densely with `nalgebra`; the
//! intended instances have tens to low hundreds of rows.
//!
//! # Example
//!
//! ```
//! use nalgebra::DMatrix;
//! use solver_lp::{solve, LpProblem, LpStatus, SimplexSettings};
//!
//! // min -x - y  s.t.  x + 2y <= 4,  3x + y <= 6,  x, y >= 0
//! let prob = LpProblem::new(
//!     vec![-1.0, -1.0],
//!     DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 1.0]),
//!     vec![4.0, 6.0],
//!     vec![0.0, 0.0],
//!     vec![f64::INFINITY, f64::INFINITY],
//! );
//! let sol = solve(&prob, &SimplexSettings::default()).unwrap();
//! assert_eq!(sol.status, LpStatus::Optimal);
//! assert!((sol.obj_val + 2.8).abs() < 1e-9);
//! ```

pub mod error;
pub mod problem;
pub mod simplex;

pub use error::{LpError, LpResult};
pub use problem::{LpProblem, LpSolution, LpStatus, SimplexSettings};
pub use simplex::solve;
