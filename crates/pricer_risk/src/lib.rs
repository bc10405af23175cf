//! # Pricer Risk (L3: Application)
//!
//! Portfolio tail risk for rating-driven credit portfolios.
//!
//! This crate provides:
//! - Portfolio construction from raw constituent rows (`portfolio`)
//! - One-factor Gaussian copula loss simulation (`copula`)
//! - Expected loss, VaR and expected shortfall (`statistics`)
//! - Correlation sweeps (`sweep`) and stressed index spreads (`stress`)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            pricer_risk (L3)             │
//! ├─────────────────────────────────────────┤
//! │  portfolio   - weights, PDs, exclusions │
//! │  copula      - L(F), seeded simulation  │
//! │  statistics  - EL, VaR, ES              │
//! │  sweep       - rho grid                 │
//! │  stress      - adverse-factor spreads   │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │           pricer_models (L2)            │
//! │  CDS valuation, Φ and Φ⁻¹               │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Reproducibility
//!
//! Factor draws are generated sequentially from a seeded [`rng::PricerRng`];
//! only the per-trial loss mapping runs on Rayon. Results do not depend on
//! the thread count.
//!
//! ## Example
//!
//! ```
//! use pricer_core::market_data::DefaultProbabilityTable;
//! use pricer_models::instruments::credit::IndexConstituent;
//! use pricer_risk::config::SimulationConfig;
//! use pricer_risk::copula::GaussianCopula;
//! use pricer_risk::portfolio::build_portfolio;
//! use pricer_risk::statistics::LossStatistics;
//!
//! let table = DefaultProbabilityTable::standard();
//! let rows = vec![
//!     IndexConstituent::new("Alpha").with_rating("BBB").with_weight(0.6),
//!     IndexConstituent::new("Beta").with_rating("BB").with_weight(0.4),
//! ];
//! let portfolio = build_portfolio(&rows, &table, 5).unwrap();
//!
//! let config = SimulationConfig::builder().n_trials(10_000).seed(42).build().unwrap();
//! let sample = GaussianCopula::new(0.2)
//!     .unwrap()
//!     .loss_distribution(&portfolio, 0.4, &config)
//!     .unwrap();
//! let stats = LossStatistics::from_sample(&sample, 0.99).unwrap();
//!
//! assert!(stats.expected_shortfall >= stats.value_at_risk);
//! assert!(stats.value_at_risk > stats.expected_loss);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Serialisation for portfolios, samples and result types

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod config;
pub mod copula;
pub mod error;
pub mod portfolio;
pub mod rng;
pub mod statistics;
pub mod stress;
pub mod sweep;

pub use error::{ConfigError, RiskError};
