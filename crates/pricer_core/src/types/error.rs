//! Error types for structured error handling.
//!
//! This module provides:
//! - `SolverError`: Errors from bracketing root-finders

use thiserror::Error;

/// Root-finding solver errors.
///
/// Provides structured error handling for the bracketing solvers used by
/// spread calibration.
///
/// # Variants
/// - `MaxIterationsExceeded`: Bracket still wider than tolerance when the budget ran out
/// - `NoBracket`: Function values at the endpoints share a sign
/// - `InvalidBracket`: Lower endpoint not strictly below the upper endpoint
/// - `NumericalInstability`: Objective returned NaN
///
/// # Examples
/// ```
/// use pricer_core::types::SolverError;
///
/// let err = SolverError::MaxIterationsExceeded { iterations: 100, low: 0.01, high: 0.02 };
/// assert!(format!("{}", err).contains("100 iterations"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Solver failed to converge within maximum iterations.
    #[error("Failed to converge after {iterations} iterations, last bracket [{low}, {high}]")]
    MaxIterationsExceeded {
        /// Number of iterations attempted
        iterations: usize,
        /// Lower end of the last bracket
        low: f64,
        /// Upper end of the last bracket
        high: f64,
    },

    /// No valid bracket (function values at endpoints have same sign).
    #[error("No bracket: f({a}) and f({b}) have same sign")]
    NoBracket {
        /// Left bracket endpoint
        a: f64,
        /// Right bracket endpoint
        b: f64,
    },

    /// Bracket endpoints are not ordered.
    #[error("Invalid bracket: [{low}, {high}]")]
    InvalidBracket {
        /// Lower endpoint
        low: f64,
        /// Upper endpoint
        high: f64,
    },

    /// Numerical instability during computation.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_iterations_display_carries_bracket() {
        let err = SolverError::MaxIterationsExceeded {
            iterations: 100,
            low: 0.25,
            high: 0.5,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("100 iterations"));
        assert!(msg.contains("[0.25, 0.5]"));
    }

    #[test]
    fn test_no_bracket_display() {
        let err = SolverError::NoBracket { a: 1.0, b: 2.0 };
        assert_eq!(format!("{}", err), "No bracket: f(1) and f(2) have same sign");
    }

    #[test]
    fn test_error_trait_implementation() {
        let err = SolverError::NumericalInstability("NaN objective".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
