//! Calibration error types.
//!
//! Spread calibration inverts a quoted price into a flat spread by
//! bisection. Its failure modes carry the diagnostic state needed to
//! understand why the inversion failed (last bracket, price range).

use pricer_core::market_data::MarketDataError;
use pricer_core::types::SolverError;
use thiserror::Error;

/// Spread calibration error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// The iteration budget was exhausted before the bracket shrank below
    /// the tolerance.
    #[error(
        "Calibration did not converge after {iterations} iterations (last bracket [{low:.10}, {high:.10}])"
    )]
    NonConvergence {
        /// Number of iterations performed
        iterations: usize,
        /// Lower end of the last bracket
        low: f64,
        /// Upper end of the last bracket
        high: f64,
    },

    /// The target price lies outside the prices spanned by the spread bracket.
    #[error(
        "Target price {target:.6} outside attainable range [{min_price:.6}, {max_price:.6}]"
    )]
    TargetOutOfRange {
        /// Requested target price
        target: f64,
        /// Price at the upper end of the spread bracket
        min_price: f64,
        /// Price at the lower end of the spread bracket
        max_price: f64,
    },

    /// Recovery of 100% leaves the spread-to-hazard mapping undefined.
    #[error("Invalid recovery for calibration: R = {recovery} (must be < 1)")]
    InvalidRecovery {
        /// Offending recovery rate
        recovery: f64,
    },

    /// The bracket or solver configuration is unusable.
    #[error("Invalid calibration setup: {message}")]
    InvalidSetup {
        /// Description of the problem
        message: String,
    },

    /// NaN or Inf encountered while evaluating the price function.
    #[error("Numerical instability: {message}")]
    NumericalInstability {
        /// Description of the numerical issue
        message: String,
    },

    /// Market data error raised while pricing a trial spread.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),
}

impl From<SolverError> for CalibrationError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::MaxIterationsExceeded {
                iterations,
                low,
                high,
            } => CalibrationError::NonConvergence {
                iterations,
                low,
                high,
            },
            SolverError::NumericalInstability(message) => {
                CalibrationError::NumericalInstability { message }
            }
            other => CalibrationError::InvalidSetup {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_convergence_display() {
        let err = CalibrationError::NonConvergence {
            iterations: 5,
            low: 0.01,
            high: 0.02,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("5 iterations"));
        assert!(msg.contains("0.0100000000"));
    }

    #[test]
    fn test_from_solver_max_iterations() {
        let err: CalibrationError = SolverError::MaxIterationsExceeded {
            iterations: 3,
            low: 0.1,
            high: 0.2,
        }
        .into();
        assert_eq!(
            err,
            CalibrationError::NonConvergence {
                iterations: 3,
                low: 0.1,
                high: 0.2
            }
        );
    }

    #[test]
    fn test_from_solver_nan() {
        let err: CalibrationError =
            SolverError::NumericalInstability("NaN at midpoint".to_string()).into();
        assert!(matches!(err, CalibrationError::NumericalInstability { .. }));
    }

    #[test]
    fn test_from_solver_bracket() {
        let err: CalibrationError = SolverError::InvalidBracket { low: 1.0, high: 0.0 }.into();
        assert!(matches!(err, CalibrationError::InvalidSetup { .. }));
    }

    #[test]
    fn test_from_market_data() {
        let err: CalibrationError = MarketDataError::InvalidMaturity { t: -1.0 }.into();
        assert!(format!("{}", err).contains("Invalid maturity"));
    }
}
