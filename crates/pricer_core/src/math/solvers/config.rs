//! Solver configuration types.

use crate::types::SolverError;
use num_traits::Float;

/// Configuration for bracketing root-finders.
///
/// # Type Parameters
///
/// * `T` - Floating-point type for tolerance (e.g., `f64`)
///
/// # Example
///
/// ```
/// use pricer_core::math::solvers::SolverConfig;
///
/// let config: SolverConfig<f64> = SolverConfig::default();
/// assert_eq!(config.max_iterations, 100);
///
/// let custom = SolverConfig {
///     tolerance: 1e-12,
///     max_iterations: 200,
/// };
/// assert!(custom.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig<T: Float> {
    /// Convergence tolerance on the bracket width.
    ///
    /// Bisection stops once `high - low < tolerance`.
    pub tolerance: T,

    /// Maximum number of halvings before giving up.
    ///
    /// If the bracket is still wider than `tolerance` after this many
    /// iterations the solver returns `SolverError::MaxIterationsExceeded`.
    pub max_iterations: usize,
}

impl<T: Float> Default for SolverConfig<T> {
    /// Default values:
    /// - `tolerance`: 1e-10
    /// - `max_iterations`: 100
    fn default() -> Self {
        Self {
            tolerance: T::from(1e-10).unwrap_or_else(T::epsilon),
            max_iterations: 100,
        }
    }
}

impl<T: Float> SolverConfig<T> {
    /// Create a new configuration with specified values.
    ///
    /// # Panics
    ///
    /// Panics if `tolerance <= 0` or `max_iterations == 0`.
    ///
    /// # Example
    ///
    /// ```
    /// use pricer_core::math::solvers::SolverConfig;
    ///
    /// let config = SolverConfig::new(1e-12, 200);
    /// assert_eq!(config.max_iterations, 200);
    /// ```
    pub fn new(tolerance: T, max_iterations: usize) -> Self {
        assert!(tolerance > T::zero(), "tolerance must be positive");
        assert!(max_iterations > 0, "max_iterations must be > 0");
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Check the configuration without panicking.
    ///
    /// Used when the values come from user configuration.
    pub fn validate(&self) -> Result<(), SolverError> {
        if !(self.tolerance > T::zero()) {
            return Err(SolverError::NumericalInstability(format!(
                "tolerance must be positive, got {}",
                self.tolerance.to_f64().unwrap_or(f64::NAN)
            )));
        }
        if self.max_iterations == 0 {
            return Err(SolverError::NumericalInstability(
                "max_iterations must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
