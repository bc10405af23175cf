//! Bisection root-finding solver.

use super::SolverConfig;
use crate::types::SolverError;
use num_traits::Float;

/// Outcome of a converged bisection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BisectionResult<T: Float> {
    /// Midpoint of the final bracket.
    pub root: T,
    /// Number of halvings performed.
    pub iterations: usize,
    /// Lower end of the final bracket.
    pub low: T,
    /// Upper end of the final bracket.
    pub high: T,
}

/// Bisection root finder.
///
/// Halves a sign-changing bracket until its width falls below the configured
/// tolerance. Slower than Brent-style methods but its behaviour is fully
/// determined by the bracket and iteration budget, which makes calibrated
/// outputs reproducible.
///
/// At each midpoint `m`, the bracket keeps `[m, high]` when `f(m)` is on the
/// same side of zero as `f(low)` (including `f(m) == 0`), otherwise `[low, m]`.
/// The returned root is the midpoint of the final bracket.
///
/// # Example
///
/// ```
/// use pricer_core::math::solvers::{BisectionSolver, SolverConfig};
///
/// let solver = BisectionSolver::new(SolverConfig::default());
///
/// let f = |x: f64| x * x - 2.0;
/// let result = solver.find_root(f, 0.0, 2.0).unwrap();
/// assert!((result.root - std::f64::consts::SQRT_2).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct BisectionSolver<T: Float> {
    config: SolverConfig<T>,
}

impl<T: Float> BisectionSolver<T> {
    /// Create a new bisection solver with the given configuration.
    pub fn new(config: SolverConfig<T>) -> Self {
        Self { config }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: SolverConfig::default(),
        }
    }

    /// Return the solver configuration.
    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }

    /// Find a root of `f` in the bracket [low, high].
    ///
    /// # Arguments
    ///
    /// * `f` - Continuous function with a sign change on the bracket
    /// * `low` - Lower bracket endpoint
    /// * `high` - Upper bracket endpoint (must exceed `low`)
    ///
    /// # Returns
    ///
    /// * `Ok(BisectionResult)` - Final bracket narrower than the tolerance
    /// * `Err(SolverError::InvalidBracket)` - `low >= high`
    /// * `Err(SolverError::NoBracket)` - `f(low)` and `f(high)` share a strict sign
    /// * `Err(SolverError::NumericalInstability)` - `f` returned NaN
    /// * `Err(SolverError::MaxIterationsExceeded)` - Budget exhausted, carries the last bracket
    pub fn find_root<F>(&self, f: F, low: T, high: T) -> Result<BisectionResult<T>, SolverError>
    where
        F: Fn(T) -> T,
    {
        if !(low < high) {
            return Err(SolverError::InvalidBracket {
                low: to_f64(low),
                high: to_f64(high),
            });
        }

        let f_low = f(low);
        let f_high = f(high);
        if f_low.is_nan() || f_high.is_nan() {
            return Err(SolverError::NumericalInstability(
                "objective is NaN at a bracket endpoint".to_string(),
            ));
        }
        if f_low * f_high > T::zero() {
            return Err(SolverError::NoBracket {
                a: to_f64(low),
                b: to_f64(high),
            });
        }

        if f_low == T::zero() || f_high == T::zero() {
            let root = if f_low == T::zero() { low } else { high };
            return Ok(BisectionResult {
                root,
                iterations: 0,
                low: root,
                high: root,
            });
        }

        let two = T::one() + T::one();
        let mut low = low;
        let mut high = high;
        let mut iterations = 0;

        while iterations < self.config.max_iterations {
            if high - low < self.config.tolerance {
                break;
            }
            let mid = (low + high) / two;
            let f_mid = f(mid);
            if f_mid.is_nan() {
                return Err(SolverError::NumericalInstability(format!(
                    "objective is NaN at {}",
                    to_f64(mid)
                )));
            }
            if f_mid * f_low >= T::zero() {
                low = mid;
            } else {
                high = mid;
            }
            iterations += 1;
        }

        if high - low >= self.config.tolerance {
            return Err(SolverError::MaxIterationsExceeded {
                iterations,
                low: to_f64(low),
                high: to_f64(high),
            });
        }

        Ok(BisectionResult {
            root: (low + high) / two,
            iterations,
            low,
            high,
        })
    }
}

#[inline]
fn to_f64<T: Float>(x: T) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}
