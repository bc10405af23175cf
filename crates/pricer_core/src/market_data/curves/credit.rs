//! Credit curve abstractions for credit risk calculations.
//!
//! This module provides:
//! - [`CreditCurve`]: Generic trait for hazard rate and survival probability calculations
//! - [`FlatHazardRateCurve`]: Constant hazard rate curve implementation
//! - [`hazard_from_pd`]: Bootstrap a flat hazard rate from a cumulative default probability
//!
//! # Flat Hazard Bootstrap
//!
//! A cumulative default probability Q(T) observed at a single horizon pins a
//! constant intensity over [0, T]:
//!
//! ```text
//! S(T) = 1 - Q(T) = exp(-λT)   =>   λ = -ln(1 - Q(T)) / T
//! ```
//!
//! Q(T) = 1 would imply an infinite intensity; it is rejected rather than
//! mapped to `+∞`, so a corrupt probability can never leak into pricing.

use crate::market_data::error::MarketDataError;
use num_traits::Float;

/// Generic credit curve trait for hazard rate and survival probability calculations.
///
/// # Contract
///
/// - `hazard_rate(t)` returns the instantaneous hazard rate λ(t) at time t
/// - `survival_probability(t)` returns P(τ > t) = exp(-∫₀ᵗ λ(s)ds)
/// - `default_probability(t)` returns P(τ ≤ t) = 1 - P(τ > t)
///
/// # Invariants
///
/// - λ(t) ≥ 0 for all t ≥ 0 (hazard rates are non-negative)
/// - P(τ > 0) = 1 (survival probability at time 0 is 1)
/// - P(τ > t) ≤ P(τ > s) for t ≥ s (survival probability is non-increasing)
///
/// # Example
///
/// ```
/// use pricer_core::market_data::curves::{CreditCurve, FlatHazardRateCurve};
///
/// let curve = FlatHazardRateCurve::new(0.01_f64);
/// let surv = curve.survival_probability(1.0).unwrap();
/// assert!(surv > 0.98 && surv < 1.0);
/// ```
pub trait CreditCurve<T: Float> {
    /// Return the instantaneous hazard rate at time `t`.
    ///
    /// # Returns
    ///
    /// * `Ok(λ(t))` - Hazard rate at time t
    /// * `Err(MarketDataError::InvalidMaturity)` - If t < 0
    fn hazard_rate(&self, t: T) -> Result<T, MarketDataError>;

    /// Return the survival probability P(τ > t).
    ///
    /// # Returns
    ///
    /// * `Ok(P(τ > t))` - Survival probability at time t
    /// * `Err(MarketDataError::InvalidMaturity)` - If t < 0
    fn survival_probability(&self, t: T) -> Result<T, MarketDataError>;

    /// Return the default probability P(τ ≤ t).
    ///
    /// # Default Implementation
    ///
    /// ```text
    /// P(τ ≤ t) = 1 - P(τ > t)
    /// ```
    fn default_probability(&self, t: T) -> Result<T, MarketDataError> {
        Ok(T::one() - self.survival_probability(t)?)
    }
}

/// Bootstrap a flat hazard rate from a cumulative default probability.
///
/// # Arguments
///
/// * `q` - Cumulative default probability Q(T), must lie in [0, 1)
/// * `maturity` - Horizon T in years, must be positive
///
/// # Returns
///
/// * `Ok(λ)` with λ = -ln(1 - Q(T)) / T
/// * `Err(MarketDataError::InvalidDefaultProbability)` - Q outside [0, 1) or NaN
/// * `Err(MarketDataError::InvalidMaturity)` - T ≤ 0
///
/// # Example
///
/// ```
/// use pricer_core::market_data::curves::hazard_from_pd;
///
/// // BBB, 5 years
/// let lambda = hazard_from_pd(0.0158_f64, 5.0).unwrap();
/// assert!((lambda - 0.003185).abs() < 1e-6);
///
/// assert!(hazard_from_pd(1.0_f64, 5.0).is_err());
/// ```
pub fn hazard_from_pd<T: Float>(q: T, maturity: T) -> Result<T, MarketDataError> {
    if !(q >= T::zero() && q < T::one()) {
        return Err(MarketDataError::InvalidDefaultProbability {
            q: q.to_f64().unwrap_or(f64::NAN),
        });
    }
    if !(maturity > T::zero()) {
        return Err(MarketDataError::InvalidMaturity {
            t: maturity.to_f64().unwrap_or(f64::NAN),
        });
    }
    Ok(-(T::one() - q).ln() / maturity)
}

/// Flat (constant) hazard rate curve.
///
/// The simplest credit curve where the hazard rate is constant over time:
///
/// ```text
/// λ(t) = λ
/// P(τ > t) = exp(-λt)
/// ```
///
/// # Example
///
/// ```
/// use pricer_core::market_data::curves::{CreditCurve, FlatHazardRateCurve};
///
/// let curve = FlatHazardRateCurve::new(0.01_f64); // 100bp hazard rate
///
/// let surv = curve.survival_probability(5.0).unwrap();
/// let expected = (-0.01_f64 * 5.0).exp();
/// assert!((surv - expected).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatHazardRateCurve<T: Float> {
    hazard_rate: T,
}

impl<T: Float> FlatHazardRateCurve<T> {
    /// Construct a flat hazard rate curve.
    ///
    /// The caller guarantees `hazard_rate >= 0`.
    #[inline]
    pub fn new(hazard_rate: T) -> Self {
        Self { hazard_rate }
    }

    /// Construct the curve implied by a cumulative default probability at `maturity`.
    ///
    /// See [`hazard_from_pd`] for the error cases.
    ///
    /// # Example
    ///
    /// ```
    /// use pricer_core::market_data::curves::{CreditCurve, FlatHazardRateCurve};
    ///
    /// let curve = FlatHazardRateCurve::from_default_probability(0.0652_f64, 5.0).unwrap();
    /// let q = curve.default_probability(5.0).unwrap();
    /// assert!((q - 0.0652).abs() < 1e-12);
    /// ```
    pub fn from_default_probability(q: T, maturity: T) -> Result<Self, MarketDataError> {
        hazard_from_pd(q, maturity).map(Self::new)
    }

    /// Return the constant hazard rate.
    #[inline]
    pub fn rate(&self) -> T {
        self.hazard_rate
    }
}

impl<T: Float> CreditCurve<T> for FlatHazardRateCurve<T> {
    fn hazard_rate(&self, t: T) -> Result<T, MarketDataError> {
        if t < T::zero() {
            return Err(MarketDataError::InvalidMaturity {
                t: t.to_f64().unwrap_or(0.0),
            });
        }
        Ok(self.hazard_rate)
    }

    fn survival_probability(&self, t: T) -> Result<T, MarketDataError> {
        if t < T::zero() {
            return Err(MarketDataError::InvalidMaturity {
                t: t.to_f64().unwrap_or(0.0),
            });
        }
        Ok((-self.hazard_rate * t).exp())
    }
}
