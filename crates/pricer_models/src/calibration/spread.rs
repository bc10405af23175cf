//! Flat spread calibration by bisection.
//!
//! # Quoted Price
//!
//! A trial spread `s` is mapped to a flat hazard rate with the credit
//! triangle approximation and priced against the contract coupon:
//!
//! ```text
//! λ(s)     = s / (1 - R)
//! price(s) = 100 - (s - coupon) × PV01(λ(s)) × 100
//! ```
//!
//! The approximation ignores discounting and accrual effects in the
//! spread-to-hazard mapping; it is exact only in the continuous-premium,
//! zero-rate limit. `price(s)` is strictly decreasing in `s` over the
//! default bracket, so bisection on `price(s) - P*` has a unique root.

use pricer_core::math::solvers::{BisectionSolver, SolverConfig};
use tracing::debug;

use super::error::CalibrationError;
use super::result::SpreadCalibration;
use crate::instruments::credit::{risky_annuity_at_hazard, ContractParameters};

/// Default spread bracket `(low, high)`: 1bp to 10,000bp.
pub const DEFAULT_SPREAD_BRACKET: (f64, f64) = (0.0001, 1.0);

/// Bisection calibrator from quoted price to flat spread.
///
/// # Examples
///
/// ```
/// use pricer_core::math::solvers::SolverConfig;
/// use pricer_models::calibration::SpreadCalibrator;
/// use pricer_models::instruments::credit::ContractParameters;
///
/// let params = ContractParameters::<f64>::builder().build().unwrap();
/// let calibrator = SpreadCalibrator::new(&params)
///     .with_config(SolverConfig::new(1e-12, 200));
///
/// let price = calibrator.quoted_price(0.025).unwrap();
/// let result = calibrator.calibrate(price).unwrap();
/// assert!((result.solved_spread - 0.025).abs() < 1e-11);
/// ```
#[derive(Debug, Clone)]
pub struct SpreadCalibrator<'a> {
    params: &'a ContractParameters<f64>,
    config: SolverConfig<f64>,
    bracket: (f64, f64),
}

impl<'a> SpreadCalibrator<'a> {
    /// Create a calibrator with the default solver configuration
    /// (tolerance 1e-10, 100 iterations) and bracket.
    pub fn new(params: &'a ContractParameters<f64>) -> Self {
        Self {
            params,
            config: SolverConfig::default(),
            bracket: DEFAULT_SPREAD_BRACKET,
        }
    }

    /// Replace the solver configuration.
    pub fn with_config(mut self, config: SolverConfig<f64>) -> Self {
        self.config = config;
        self
    }

    /// Replace the spread bracket.
    pub fn with_bracket(mut self, low: f64, high: f64) -> Self {
        self.bracket = (low, high);
        self
    }

    /// Contract parameters being calibrated.
    pub fn params(&self) -> &ContractParameters<f64> {
        self.params
    }

    /// Solver configuration.
    pub fn config(&self) -> &SolverConfig<f64> {
        &self.config
    }

    /// Spread bracket `(low, high)`.
    pub fn bracket(&self) -> (f64, f64) {
        self.bracket
    }

    /// Hazard rate implied by a flat spread, `s / (1 - R)`.
    ///
    /// # Errors
    ///
    /// Returns `CalibrationError::InvalidRecovery` when `R = 1`.
    pub fn implied_hazard(&self, spread: f64) -> Result<f64, CalibrationError> {
        let lgd = self.params.loss_given_default();
        if lgd <= 0.0 {
            return Err(CalibrationError::InvalidRecovery {
                recovery: self.params.recovery(),
            });
        }
        Ok(spread / lgd)
    }

    /// Quoted price per 100 notional for a flat spread.
    ///
    /// # Returns
    ///
    /// * `Ok(f64)` - `100 - (s - coupon) × PV01(s / (1 - R)) × 100`
    /// * `Err(CalibrationError)` - Invalid recovery or curve failure
    pub fn quoted_price(&self, spread: f64) -> Result<f64, CalibrationError> {
        let hazard = self.implied_hazard(spread)?;
        let annuity = risky_annuity_at_hazard(self.params, hazard)?;
        Ok(100.0 - (spread - self.params.coupon()) * annuity * 100.0)
    }

    /// Calibrate the flat spread reproducing `target_price`.
    ///
    /// # Arguments
    ///
    /// * `target_price` - Quoted price per 100 notional
    ///
    /// # Returns
    ///
    /// * `Ok(SpreadCalibration)` - Solved spread and final bracket
    /// * `Err(CalibrationError::InvalidRecovery)` - `R = 1`
    /// * `Err(CalibrationError::TargetOutOfRange)` - Target not attainable inside the bracket
    /// * `Err(CalibrationError::NonConvergence)` - Budget exhausted before the tolerance was met
    pub fn calibrate(&self, target_price: f64) -> Result<SpreadCalibration, CalibrationError> {
        if !target_price.is_finite() {
            return Err(CalibrationError::NumericalInstability {
                message: format!("target price is not finite: {}", target_price),
            });
        }
        self.config.validate()?;

        let (low, high) = self.bracket;
        if !(low < high) {
            return Err(CalibrationError::InvalidSetup {
                message: format!("spread bracket [{}, {}] is empty", low, high),
            });
        }

        let price_low = self.quoted_price(low)?;
        let price_high = self.quoted_price(high)?;
        let (min_price, max_price) = (price_low.min(price_high), price_low.max(price_high));
        if target_price < min_price || target_price > max_price {
            return Err(CalibrationError::TargetOutOfRange {
                target: target_price,
                min_price,
                max_price,
            });
        }

        let objective =
            |s: f64| -> f64 { self.quoted_price(s).map_or(f64::NAN, |p| p - target_price) };

        let solver = BisectionSolver::new(self.config);
        let result = solver.find_root(objective, low, high)?;

        debug!(
            target_price,
            solved_spread = result.root,
            iterations = result.iterations,
            "spread calibration converged"
        );

        Ok(SpreadCalibration {
            solved_spread: result.root,
            target_price,
            iterations: result.iterations,
            bracket: (result.low, result.high),
        })
    }
}
