//! Curve abstractions for discounting and credit risk calculations.
//!
//! This module provides:
//! - [`YieldCurve`]: Generic trait for discount factor and rate calculations
//! - [`FlatCurve`]: Constant rate yield curve implementation
//! - [`CreditCurve`]: Generic trait for hazard rate and survival probability calculations
//! - [`FlatHazardRateCurve`]: Constant hazard rate curve implementation
//! - [`hazard_from_pd`]: Flat hazard bootstrap from a cumulative default probability

mod credit;
mod flat;
mod traits;

pub use credit::{hazard_from_pd, CreditCurve, FlatHazardRateCurve};
pub use flat::FlatCurve;
pub use traits::YieldCurve;
