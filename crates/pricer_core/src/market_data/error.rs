//! Market data error types.
//!
//! This module provides structured error handling for rating lookups,
//! default-probability conversion and curve queries.

use thiserror::Error;

/// Market data operation errors.
///
/// # Variants
///
/// - `UnknownRating`: Rating string does not normalise to a coarse grade
/// - `UnknownHorizon`: Horizon not in the table's fixed set
/// - `InvalidDefaultProbability`: Cumulative PD outside [0, 1)
/// - `InvalidMaturity`: Negative or zero time where a positive one is needed
/// - `InvalidParameter`: Any other out-of-domain numeric input
/// - `IncompleteTable`: A custom table is missing a (rating, horizon) cell
///
/// # Examples
///
/// ```
/// use pricer_core::market_data::MarketDataError;
///
/// let err = MarketDataError::UnknownHorizon { years: 6 };
/// assert!(format!("{}", err).contains("6"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// Rating does not map to a coarse grade.
    #[error("Unknown rating: '{raw}'")]
    UnknownRating {
        /// The raw rating string as supplied
        raw: String,
    },

    /// Horizon not present in the default-probability table.
    #[error("Unknown horizon: {years}y is not a tabulated horizon")]
    UnknownHorizon {
        /// The requested horizon in years
        years: u32,
    },

    /// Cumulative default probability outside [0, 1).
    #[error("Invalid default probability: Q = {q} (must be in [0, 1))")]
    InvalidDefaultProbability {
        /// The offending probability
        q: f64,
    },

    /// Invalid maturity (negative or zero time).
    #[error("Invalid maturity: t = {t}")]
    InvalidMaturity {
        /// The invalid maturity value
        t: f64,
    },

    /// Numeric parameter outside its domain.
    #[error("Invalid parameter '{name}': {value}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// The offending value
        value: f64,
    },

    /// Table construction left a cell empty.
    #[error("Incomplete table: no entry for {rating} at {years}y")]
    IncompleteTable {
        /// Coarse rating code
        rating: String,
        /// Missing horizon in years
        years: u32,
    },
}
