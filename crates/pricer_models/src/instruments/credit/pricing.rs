//! CDS valuation engine.
//!
//! This module prices a standardised CDS contract from a discount curve and
//! a credit curve.
//!
//! # Pricing Model
//!
//! ## Premium Leg (Risky Annuity)
//!
//! Premium dates are `tᵢ = i/freq` for `i = 1..⌊T·freq⌋`. Survival over each
//! period is approximated by the trapezoidal average:
//! ```text
//! PV01 = Σ Δt × D(tᵢ) × ½(S(tᵢ₋₁) + S(tᵢ))
//! ```
//!
//! ## Protection Leg
//!
//! The default density `λ(t) S(t)` is integrated on a uniform grid of
//! `steps` points, right-endpoint rule:
//! ```text
//! PV_protection = Σ D(tᵢ) × (1 - R) × λ(tᵢ) × S(tᵢ) × Δt,   Δt = T / steps
//! ```
//!
//! ## Spread Measures
//!
//! ```text
//! fair     = PV_protection / PV01
//! upfront  = (coupon - fair) × PV01
//! be       = upfront / PV01 + coupon
//! price    = 100 × (1 + upfront)
//! ```
//!
//! A positive upfront means the running coupon exceeds the fair spread: the
//! coupon payer overpays and is compensated up front.
//!
//! # Example
//!
//! ```
//! use pricer_models::instruments::credit::{CdsPricer, ContractParameters};
//! use pricer_core::market_data::curves::{FlatCurve, FlatHazardRateCurve};
//!
//! let params = ContractParameters::<f64>::builder().build().unwrap();
//! let discount_curve = FlatCurve::new(params.rate());
//! let credit_curve = FlatHazardRateCurve::from_default_probability(0.0158, 5.0).unwrap();
//!
//! let pricer = CdsPricer::new(&discount_curve, &credit_curve);
//! let valuation = pricer.price(&params).unwrap();
//!
//! assert!((valuation.fair_spread - 0.0019158).abs() < 1e-6);
//! assert!(valuation.upfront > 0.0);
//! ```

use num_traits::Float;
use pricer_core::market_data::curves::{
    hazard_from_pd, CreditCurve, FlatCurve, FlatHazardRateCurve, YieldCurve,
};
use pricer_core::market_data::error::MarketDataError;

use super::cds::ContractParameters;

/// Default number of integration steps for the protection leg.
pub const DEFAULT_PROTECTION_STEPS: usize = 1000;

/// Full valuation of a CDS contract.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CdsValuation<T: Float> {
    /// Hazard rate at maturity.
    pub hazard_rate: T,
    /// Risky annuity (PV01 per unit spread).
    pub risky_annuity: T,
    /// Present value of the protection leg per unit notional.
    pub protection_leg_pv: T,
    /// Fair (par) spread.
    pub fair_spread: T,
    /// Upfront per unit notional, positive when coupon > fair spread.
    pub upfront: T,
    /// Bond-equivalent spread.
    pub bond_equivalent_spread: T,
    /// Clean price per 100 notional.
    pub clean_price: T,
}

/// CDS pricer using discount and credit curves.
///
/// # Type Parameters
///
/// * `T` - Floating-point type implementing `Float`
/// * `D` - Discount curve implementing `YieldCurve<T>`
/// * `C` - Credit curve implementing `CreditCurve<T>`
pub struct CdsPricer<'a, T: Float, D: YieldCurve<T>, C: CreditCurve<T>> {
    /// Discount curve for present value calculations.
    discount_curve: &'a D,
    /// Credit curve for survival probability calculations.
    credit_curve: &'a C,
    /// Number of protection-leg integration steps.
    protection_steps: usize,
    _phantom: std::marker::PhantomData<T>,
}

impl<'a, T: Float, D: YieldCurve<T>, C: CreditCurve<T>> CdsPricer<'a, T, D, C> {
    /// Create a new CDS pricer with the default protection-leg grid.
    ///
    /// # Arguments
    ///
    /// * `discount_curve` - Discount curve for discounting
    /// * `credit_curve` - Credit curve for survival probabilities
    pub fn new(discount_curve: &'a D, credit_curve: &'a C) -> Self {
        Self {
            discount_curve,
            credit_curve,
            protection_steps: DEFAULT_PROTECTION_STEPS,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Override the number of protection-leg integration steps used by
    /// [`CdsPricer::price`] and [`CdsPricer::fair_spread`].
    pub fn with_protection_steps(mut self, steps: usize) -> Self {
        self.protection_steps = steps;
        self
    }

    /// Calculate the risky annuity (PV01).
    ///
    /// # Returns
    ///
    /// * `Ok(T)` - Risky annuity, strictly positive for validated parameters
    /// * `Err(MarketDataError)` - If a curve cannot be evaluated
    pub fn risky_annuity(&self, params: &ContractParameters<T>) -> Result<T, MarketDataError> {
        let dt = params.accrual_fraction();
        let half = T::from(0.5).unwrap_or_else(T::zero);

        let mut pv01 = T::zero();
        let mut prev_survival = self.credit_curve.survival_probability(T::zero())?;

        for i in 1..=params.n_periods() {
            let t = dt * T::from(i).unwrap_or_else(T::zero);
            let df = self.discount_curve.discount_factor(t)?;
            let survival = self.credit_curve.survival_probability(t)?;
            pv01 = pv01 + dt * df * half * (prev_survival + survival);
            prev_survival = survival;
        }

        Ok(pv01)
    }

    /// Calculate the present value of the protection leg.
    ///
    /// # Arguments
    ///
    /// * `params` - Contract parameters
    /// * `steps` - Number of integration steps (must be positive)
    ///
    /// # Returns
    ///
    /// * `Ok(T)` - Protection leg PV per unit notional
    /// * `Err(MarketDataError::InvalidParameter)` - If `steps` is zero
    pub fn protection_leg_pv(
        &self,
        params: &ContractParameters<T>,
        steps: usize,
    ) -> Result<T, MarketDataError> {
        if steps == 0 {
            return Err(MarketDataError::InvalidParameter {
                name: "steps",
                value: 0.0,
            });
        }

        let lgd = params.loss_given_default();
        let dt = params.maturity() / T::from(steps).unwrap_or_else(T::one);

        let mut pv = T::zero();
        for i in 1..=steps {
            let t = dt * T::from(i).unwrap_or_else(T::zero);
            let df = self.discount_curve.discount_factor(t)?;
            let hazard = self.credit_curve.hazard_rate(t)?;
            let survival = self.credit_curve.survival_probability(t)?;
            pv = pv + df * lgd * hazard * survival * dt;
        }

        Ok(pv)
    }

    /// Calculate the fair (par) spread, protection PV divided by the risky annuity.
    ///
    /// # Returns
    ///
    /// * `Err(MarketDataError::InvalidParameter)` - If the annuity is not positive
    pub fn fair_spread(&self, params: &ContractParameters<T>) -> Result<T, MarketDataError> {
        let annuity = self.risky_annuity(params)?;
        let protection = self.protection_leg_pv(params, self.protection_steps)?;
        spread_over_annuity(protection, annuity)
    }

    /// Calculate the upfront for a given fair spread, `(coupon - fair) × PV01`.
    pub fn upfront(&self, params: &ContractParameters<T>, fair: T) -> Result<T, MarketDataError> {
        let annuity = self.risky_annuity(params)?;
        Ok((params.coupon() - fair) * annuity)
    }

    /// Price the contract, computing every measure in one pass.
    pub fn price(&self, params: &ContractParameters<T>) -> Result<CdsValuation<T>, MarketDataError> {
        let hazard_rate = self.credit_curve.hazard_rate(params.maturity())?;
        let annuity = self.risky_annuity(params)?;
        let protection = self.protection_leg_pv(params, self.protection_steps)?;
        let fair = spread_over_annuity(protection, annuity)?;
        let upfront = (params.coupon() - fair) * annuity;

        Ok(CdsValuation {
            hazard_rate,
            risky_annuity: annuity,
            protection_leg_pv: protection,
            fair_spread: fair,
            upfront,
            bond_equivalent_spread: bond_equivalent_spread(upfront, annuity, params.coupon()),
            clean_price: clean_price(upfront),
        })
    }
}

fn spread_over_annuity<T: Float>(protection: T, annuity: T) -> Result<T, MarketDataError> {
    if !(annuity > T::zero()) {
        return Err(MarketDataError::InvalidParameter {
            name: "risky_annuity",
            value: annuity.to_f64().unwrap_or(f64::NAN),
        });
    }
    Ok(protection / annuity)
}

/// Bond-equivalent spread, `upfront / PV01 + coupon`.
#[inline]
pub fn bond_equivalent_spread<T: Float>(upfront: T, annuity: T, coupon: T) -> T {
    upfront / annuity + coupon
}

/// Clean price per 100 notional, `100 × (1 + upfront)`.
#[inline]
pub fn clean_price<T: Float>(upfront: T) -> T {
    let hundred = T::from(100.0).unwrap_or_else(T::one);
    hundred * (T::one() + upfront)
}

/// Risky annuity under a flat hazard rate and the contract's flat rate.
///
/// # Examples
///
/// ```
/// use pricer_models::instruments::credit::{risky_annuity_at_hazard, ContractParameters};
///
/// let params = ContractParameters::<f64>::builder().rate(0.0).build().unwrap();
/// // No discounting, no default: PV01 equals the maturity.
/// let pv01 = risky_annuity_at_hazard(&params, 0.0).unwrap();
/// assert!((pv01 - 5.0).abs() < 1e-12);
/// ```
pub fn risky_annuity_at_hazard<T: Float>(
    params: &ContractParameters<T>,
    hazard: T,
) -> Result<T, MarketDataError> {
    let discount_curve = FlatCurve::new(params.rate());
    let credit_curve = FlatHazardRateCurve::new(hazard);
    CdsPricer::new(&discount_curve, &credit_curve).risky_annuity(params)
}

/// Fair spread under a flat hazard rate and the contract's flat rate.
pub fn fair_spread_at_hazard<T: Float>(
    params: &ContractParameters<T>,
    hazard: T,
) -> Result<T, MarketDataError> {
    let discount_curve = FlatCurve::new(params.rate());
    let credit_curve = FlatHazardRateCurve::new(hazard);
    CdsPricer::new(&discount_curve, &credit_curve).fair_spread(params)
}

/// Full valuation under a flat hazard rate and the contract's flat rate.
pub fn value_at_hazard<T: Float>(
    params: &ContractParameters<T>,
    hazard: T,
) -> Result<CdsValuation<T>, MarketDataError> {
    let discount_curve = FlatCurve::new(params.rate());
    let credit_curve = FlatHazardRateCurve::new(hazard);
    CdsPricer::new(&discount_curve, &credit_curve).price(params)
}

/// Full valuation from a cumulative default probability at the contract maturity.
///
/// # Errors
///
/// Propagates `InvalidDefaultProbability` when `q ∉ [0, 1)`.
pub fn value_from_default_probability<T: Float>(
    params: &ContractParameters<T>,
    q: T,
) -> Result<CdsValuation<T>, MarketDataError> {
    let hazard = hazard_from_pd(q, params.maturity())?;
    value_at_hazard(params, hazard)
}
