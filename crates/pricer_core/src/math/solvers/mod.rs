//! Root-finding solvers for numerical computation.
//!
//! ## Available Solvers
//!
//! - [`BisectionSolver`]: Deterministic bracketing method used for
//!   price-to-spread inversion
//!
//! ## Configuration
//!
//! Solvers use [`SolverConfig`] for configuring:
//! - `tolerance`: Bracket width at which the search stops (default: 1e-10)
//! - `max_iterations`: Maximum number of halvings (default: 100)
//!
//! ## Example
//!
//! ```
//! use pricer_core::math::solvers::{BisectionSolver, SolverConfig};
//!
//! // Solve x³ - x - 2 = 0 in bracket [1, 2]
//! let solver = BisectionSolver::new(SolverConfig::default());
//! let f = |x: f64| x * x * x - x - 2.0;
//!
//! let result = solver.find_root(f, 1.0, 2.0).unwrap();
//! assert!(f(result.root).abs() < 1e-8);
//! ```

mod bisection;
mod config;

pub use bisection::{BisectionResult, BisectionSolver};
pub use config::SolverConfig;
