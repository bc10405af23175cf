//! # pricer_core: Foundation for Rating-Implied CDS Pricing
//!
//! ## Layer 1 (Foundation) Role
//!
//! pricer_core serves as the bottom layer of the workspace, providing:
//! - Coarse credit ratings and rating normalisation (`market_data::ratings`)
//! - The cumulative default-probability table (`market_data::ratings`)
//! - Flat hazard and discount curves (`market_data::curves`)
//! - Bisection root-finding (`math::solvers`)
//! - Error types: `MarketDataError`, `SolverError`
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other pricer_* crates, with minimal external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - thiserror: Error derivation
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_core::market_data::curves::{hazard_from_pd, CreditCurve, FlatHazardRateCurve};
//! use pricer_core::market_data::ratings::{normalize_rating, DefaultProbabilityTable};
//!
//! let table = DefaultProbabilityTable::standard();
//! let rating = normalize_rating("BBB+").unwrap();
//! let q = table.lookup(rating, 5).unwrap();
//!
//! let lambda = hazard_from_pd(q, 5.0).unwrap();
//! let curve = FlatHazardRateCurve::new(lambda);
//! assert_eq!(curve.survival_probability(0.0).unwrap(), 1.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for `CreditRating` and `SolverConfig`

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod market_data;
pub mod math;
pub mod types;
