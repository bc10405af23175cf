//! Market data for rating-implied credit pricing.
//!
//! # Architecture
//!
//! Curves are generic over `T: Float`, so the same pricing code runs on
//! `f64` and `f32`. The rating table is plain `f64` data.
//!
//! # Components
//!
//! - [`ratings`]: Coarse credit ratings and the default-probability table
//! - [`curves`]: Flat yield and hazard curves, hazard bootstrap
//! - [`error`]: Market data error types (MarketDataError)
//!
//! # Example
//!
//! ```
//! use pricer_core::market_data::curves::{CreditCurve, FlatHazardRateCurve};
//! use pricer_core::market_data::ratings::{CreditRating, DefaultProbabilityTable};
//!
//! let table = DefaultProbabilityTable::standard();
//! let q = table.lookup(CreditRating::BB, 5).unwrap();
//!
//! let curve = FlatHazardRateCurve::from_default_probability(q, 5.0).unwrap();
//! let surv = curve.survival_probability(5.0).unwrap();
//! assert!((surv - (1.0 - q)).abs() < 1e-12);
//! ```

pub mod curves;
pub mod error;
pub mod ratings;

// Re-export commonly used types
pub use curves::{hazard_from_pd, CreditCurve, FlatCurve, FlatHazardRateCurve, YieldCurve};
pub use error::MarketDataError;
pub use ratings::{normalize_rating, CreditRating, DefaultProbabilityTable, HORIZONS};
