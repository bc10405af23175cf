//! CDS contract parameters.
//!
//! This module provides [`ContractParameters`], the immutable description of
//! a standardised single-name or index CDS contract:
//!
//! - **Maturity**: Contract tenor in years
//! - **Frequency**: Premium payments per year
//! - **Rate**: Continuously compounded risk-free rate
//! - **Recovery**: Recovery rate on default
//! - **Coupon**: Running coupon paid by the protection buyer
//!
//! # Example
//!
//! ```
//! use pricer_models::instruments::credit::ContractParameters;
//!
//! let params: ContractParameters<f64> = ContractParameters::builder()
//!     .maturity(5.0)
//!     .frequency(4)
//!     .rate(0.02)
//!     .recovery(0.4)
//!     .coupon(0.01)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(params.n_periods(), 20);
//! assert!((params.loss_given_default() - 0.6).abs() < 1e-12);
//! ```

use num_traits::Float;
use std::fmt;

use crate::instruments::error::CreditError;

/// Default contract tenor in years.
pub const DEFAULT_MATURITY: f64 = 5.0;

/// Default number of premium payments per year (quarterly).
pub const DEFAULT_FREQUENCY: u32 = 4;

/// Default continuously compounded risk-free rate.
pub const DEFAULT_RATE: f64 = 0.02;

/// Default recovery rate.
pub const DEFAULT_RECOVERY: f64 = 0.4;

/// Default running coupon (100bp).
pub const DEFAULT_COUPON: f64 = 0.01;

/// Immutable CDS contract parameters.
///
/// Use [`ContractParametersBuilder`] to construct instances. All fields are
/// validated once at build time, so pricing code never re-checks them.
///
/// # Invariants
///
/// - `maturity > 0` and finite
/// - `frequency > 0` and `maturity × frequency ≥ 1` (at least one premium period)
/// - `rate` finite
/// - `recovery ∈ [0, 1]`
/// - `coupon ≥ 0` and finite
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContractParameters<T: Float> {
    maturity: T,
    frequency: u32,
    rate: T,
    recovery: T,
    coupon: T,
}

impl<T: Float> ContractParameters<T> {
    /// Creates a new parameter builder, pre-populated with the standard
    /// 5y quarterly contract (r = 2%, R = 40%, coupon = 100bp).
    #[inline]
    pub fn builder() -> ContractParametersBuilder<T> {
        ContractParametersBuilder::default()
    }

    /// Contract maturity in years.
    #[inline]
    pub fn maturity(&self) -> T {
        self.maturity
    }

    /// Premium payments per year.
    #[inline]
    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// Continuously compounded risk-free rate.
    #[inline]
    pub fn rate(&self) -> T {
        self.rate
    }

    /// Recovery rate on default.
    #[inline]
    pub fn recovery(&self) -> T {
        self.recovery
    }

    /// Running coupon.
    #[inline]
    pub fn coupon(&self) -> T {
        self.coupon
    }

    /// Loss given default, `1 - R`.
    #[inline]
    pub fn loss_given_default(&self) -> T {
        T::one() - self.recovery
    }

    /// Number of premium periods, `⌊T × freq⌋`.
    #[inline]
    pub fn n_periods(&self) -> usize {
        (self.maturity * self.frequency_as_float())
            .floor()
            .to_usize()
            .unwrap_or(0)
    }

    /// Accrual fraction of one premium period, `1 / freq`.
    #[inline]
    pub fn accrual_fraction(&self) -> T {
        T::one() / self.frequency_as_float()
    }

    /// Returns a copy with a different coupon.
    ///
    /// # Errors
    ///
    /// Returns `CreditError::InvalidContract` if the coupon is negative or not finite.
    pub fn with_coupon(&self, coupon: T) -> Result<Self, CreditError> {
        let params = Self { coupon, ..*self };
        params.validate()?;
        Ok(params)
    }

    /// Validates the parameters.
    ///
    /// # Errors
    ///
    /// Returns `CreditError::InvalidContract` naming the offending field.
    pub fn validate(&self) -> Result<(), CreditError> {
        if !self.maturity.is_finite() || self.maturity <= T::zero() {
            return Err(invalid("maturity", "must be positive and finite"));
        }
        if self.frequency == 0 {
            return Err(invalid("frequency", "must be positive"));
        }
        if self.n_periods() == 0 {
            return Err(invalid(
                "frequency",
                "maturity × frequency must cover at least one premium period",
            ));
        }
        if !self.rate.is_finite() {
            return Err(invalid("rate", "must be finite"));
        }
        if !(self.recovery >= T::zero() && self.recovery <= T::one()) {
            return Err(invalid("recovery", "must be in [0, 1]"));
        }
        if !self.coupon.is_finite() || self.coupon < T::zero() {
            return Err(invalid("coupon", "must be non-negative and finite"));
        }
        Ok(())
    }

    #[inline]
    fn frequency_as_float(&self) -> T {
        T::from(self.frequency).unwrap_or_else(T::one)
    }
}

impl<T: Float + fmt::Display> fmt::Display for ContractParameters<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "T={}y freq={} r={} R={} coupon={}",
            self.maturity, self.frequency, self.rate, self.recovery, self.coupon
        )
    }
}

fn invalid(field: &'static str, reason: &str) -> CreditError {
    CreditError::InvalidContract {
        field,
        reason: reason.to_string(),
    }
}

/// Builder for [`ContractParameters`].
///
/// Unset fields fall back to the standard contract defaults.
///
/// # Examples
///
/// ```
/// use pricer_models::instruments::credit::ContractParameters;
///
/// let params = ContractParameters::<f64>::builder()
///     .maturity(10.0)
///     .recovery(0.25)
///     .build()
///     .unwrap();
///
/// assert_eq!(params.frequency(), 4);
/// assert_eq!(params.n_periods(), 40);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ContractParametersBuilder<T: Float> {
    maturity: T,
    frequency: u32,
    rate: T,
    recovery: T,
    coupon: T,
}

impl<T: Float> Default for ContractParametersBuilder<T> {
    fn default() -> Self {
        Self {
            maturity: T::from(DEFAULT_MATURITY).unwrap_or_else(T::one),
            frequency: DEFAULT_FREQUENCY,
            rate: T::from(DEFAULT_RATE).unwrap_or_else(T::zero),
            recovery: T::from(DEFAULT_RECOVERY).unwrap_or_else(T::zero),
            coupon: T::from(DEFAULT_COUPON).unwrap_or_else(T::zero),
        }
    }
}

impl<T: Float> ContractParametersBuilder<T> {
    /// Sets the maturity in years.
    #[inline]
    pub fn maturity(mut self, maturity: T) -> Self {
        self.maturity = maturity;
        self
    }

    /// Sets the number of premium payments per year.
    #[inline]
    pub fn frequency(mut self, frequency: u32) -> Self {
        self.frequency = frequency;
        self
    }

    /// Sets the continuously compounded risk-free rate.
    #[inline]
    pub fn rate(mut self, rate: T) -> Self {
        self.rate = rate;
        self
    }

    /// Sets the recovery rate.
    #[inline]
    pub fn recovery(mut self, recovery: T) -> Self {
        self.recovery = recovery;
        self
    }

    /// Sets the running coupon.
    #[inline]
    pub fn coupon(mut self, coupon: T) -> Self {
        self.coupon = coupon;
        self
    }

    /// Builds and validates the parameters.
    ///
    /// # Errors
    ///
    /// Returns `CreditError::InvalidContract` if any invariant is violated.
    pub fn build(self) -> Result<ContractParameters<T>, CreditError> {
        let params = ContractParameters {
            maturity: self.maturity,
            frequency: self.frequency,
            rate: self.rate,
            recovery: self.recovery,
            coupon: self.coupon,
        };
        params.validate()?;
        Ok(params)
    }
}
