//! Spread calibration.
//!
//! This module inverts a quoted CDS price into the flat spread that
//! reproduces it:
//! - [`SpreadCalibrator`]: Bisection on the quoted-price function
//! - [`SpreadCalibration`]: Solved spread with bracket diagnostics
//! - [`CalibrationError`]: Non-convergence, out-of-range targets, bad inputs
//!
//! # Calibration Flow
//!
//! ```text
//! Target price P* ──► g(s) = price(s) - P* ──► bisection on [low, high] ──► s*
//!                        │
//!                        ▼
//!              λ = s / (1 - R), PV01(λ)
//! ```
//!
//! # Example
//!
//! ```
//! use pricer_models::calibration::SpreadCalibrator;
//! use pricer_models::instruments::credit::ContractParameters;
//!
//! let params = ContractParameters::<f64>::builder().build().unwrap();
//! let calibrator = SpreadCalibrator::new(&params);
//!
//! // Par price: the solved spread equals the coupon.
//! let result = calibrator.calibrate(100.0).unwrap();
//! assert!((result.solved_spread - params.coupon()).abs() < 1e-9);
//! ```

mod error;
mod result;
pub mod spread;

pub use error::CalibrationError;
pub use result::SpreadCalibration;
pub use spread::{SpreadCalibrator, DEFAULT_SPREAD_BRACKET};
