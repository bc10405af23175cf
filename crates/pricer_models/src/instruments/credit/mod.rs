//! Credit default swaps on single names and indices.
//!
//! This module provides:
//! - [`ContractParameters`]: Validated contract terms (maturity, frequency, rate, recovery, coupon)
//! - [`CdsPricer`]: Risky annuity, protection leg and spread measures from curves
//! - [`IndexAggregator`]: Index spreads from ratings or from constituent quotes
//! - [`IndexBasis`]: Market minus model basis
//!
//! # Examples
//!
//! ```
//! use pricer_core::market_data::curves::{FlatCurve, FlatHazardRateCurve};
//! use pricer_models::instruments::credit::{CdsPricer, ContractParameters};
//!
//! let params = ContractParameters::<f64>::builder()
//!     .maturity(5.0)
//!     .coupon(0.05)
//!     .build()
//!     .unwrap();
//!
//! let discount_curve = FlatCurve::new(params.rate());
//! let credit_curve = FlatHazardRateCurve::new(0.02);
//! let pricer = CdsPricer::new(&discount_curve, &credit_curve);
//!
//! let valuation = pricer.price(&params).unwrap();
//! assert!(valuation.fair_spread < params.coupon());
//! assert!(valuation.clean_price > 100.0);
//! ```

mod cds;
pub mod index;
mod pricing;

pub use cds::{
    ContractParameters, ContractParametersBuilder, DEFAULT_COUPON, DEFAULT_FREQUENCY,
    DEFAULT_MATURITY, DEFAULT_RATE, DEFAULT_RECOVERY,
};
pub use index::{
    ConstituentValuation, Exclusion, ExclusionReason, IndexAggregator, IndexBasis,
    IndexConstituent, IndexResult, RatingBucket, Weighting,
};
pub use pricing::{
    bond_equivalent_spread, clean_price, fair_spread_at_hazard, risky_annuity_at_hazard,
    value_at_hazard, value_from_default_probability, CdsPricer, CdsValuation,
    DEFAULT_PROTECTION_STEPS,
};
