//! Risk engine error types.
//!
//! This module provides structured error types for simulation
//! configuration and portfolio risk calculations.

use pricer_core::market_data::MarketDataError;
use pricer_models::instruments::CreditError;
use thiserror::Error;

/// Simulation configuration error.
///
/// These errors occur during construction when invalid parameters are provided.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Trial count outside the valid range [1, 10_000_000].
    #[error("Invalid trial count {0}: must be in range [1, 10_000_000]")]
    InvalidTrialCount(usize),

    /// Invalid parameter value with name and description.
    #[error("Invalid parameter '{name}': {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of the invalid value.
        value: String,
    },
}

/// Errors raised by the portfolio risk engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RiskError {
    /// Correlation outside [0, 1).
    #[error("Invalid correlation: rho = {rho} (must be in [0, 1))")]
    InvalidCorrelation {
        /// Offending correlation
        rho: f64,
    },

    /// Confidence level outside (0, 1).
    #[error("Invalid confidence level: alpha = {alpha} (must be in (0, 1))")]
    InvalidConfidence {
        /// Offending confidence level
        alpha: f64,
    },

    /// Loss statistics requested on an empty sample.
    #[error("Loss sample is empty")]
    EmptySample,

    /// Simulation configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Credit pricing or aggregation error.
    #[error(transparent)]
    Credit(#[from] CreditError),

    /// Market data error.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),
}
