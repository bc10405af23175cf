//! Credit instrument error types.
//!
//! This module provides structured error handling for contract
//! construction, valuation, calibration and index aggregation.

use pricer_core::market_data::MarketDataError;
use thiserror::Error;

use crate::calibration::CalibrationError;

/// Credit pricing errors.
///
/// # Variants
/// - `MarketData`: Rating, horizon or default-probability failure
/// - `Calibration`: Spread calibration failure
/// - `DegenerateAggregation`: Every index constituent was excluded
/// - `InvalidContract`: Contract parameter validation failure
///
/// # Examples
/// ```
/// use pricer_models::instruments::CreditError;
///
/// let err = CreditError::DegenerateAggregation { excluded: 3 };
/// assert!(format!("{}", err).contains("3 excluded"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CreditError {
    /// Market data error.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    /// Calibration error.
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    /// No constituent survived validation.
    #[error("Degenerate aggregation: no valid constituents ({excluded} excluded)")]
    DegenerateAggregation {
        /// Number of excluded constituents
        excluded: usize,
    },

    /// Invalid contract parameter.
    #[error("Invalid contract parameter '{field}': {reason}")]
    InvalidContract {
        /// Name of the offending field
        field: &'static str,
        /// Description of the violated constraint
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_contract_display() {
        let err = CreditError::InvalidContract {
            field: "recovery",
            reason: "must be in [0, 1]".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Invalid contract parameter 'recovery': must be in [0, 1]"
        );
    }

    #[test]
    fn test_market_data_is_transparent() {
        let inner = MarketDataError::UnknownHorizon { years: 6 };
        let err: CreditError = inner.clone().into();
        assert_eq!(format!("{}", err), format!("{}", inner));
    }

    #[test]
    fn test_calibration_conversion() {
        let err: CreditError = CalibrationError::InvalidRecovery { recovery: 1.0 }.into();
        assert!(matches!(err, CreditError::Calibration(_)));
    }
}
