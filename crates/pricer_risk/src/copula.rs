//! One-factor Gaussian copula.
//!
//! # Model
//!
//! Name `i` defaults by the horizon when its latent variable
//! `√ρ F + √(1-ρ) εᵢ` falls below the threshold `Kᵢ = Φ⁻¹(Qᵢ)`. Given the
//! systematic factor `F`, defaults are independent with
//!
//! ```text
//! Qᵢ(T | F) = Φ((Kᵢ - √ρ F) / √(1 - ρ))
//! L(F)      = (1 - R) Σ wᵢ Qᵢ(T | F)
//! ```
//!
//! `L(F)` is the large-pool loss fraction. It is decreasing in `F`, so
//! low factor draws are the stressed states.
//!
//! # Simulation
//!
//! Factor draws come from one seeded [`PricerRng`] in trial order. The
//! per-trial loss mapping is pure and runs on the Rayon pool; the output
//! is identical for any thread count.

use pricer_models::analytical::{norm_cdf, norm_inv};
use rayon::prelude::*;
use tracing::debug;

use crate::config::SimulationConfig;
use crate::error::RiskError;
use crate::portfolio::{validate_recovery, Portfolio};
use crate::rng::PricerRng;

/// Conditional default probability `Φ((Φ⁻¹(q) - √ρ F) / √(1 - ρ))`.
///
/// `q ≤ 0` maps to 0 and `q ≥ 1` to 1. `rho` must be in [0, 1); this is
/// not checked here.
///
/// # Examples
///
/// ```
/// use pricer_risk::copula::conditional_default_probability;
///
/// // Without correlation the factor carries no information.
/// let q = conditional_default_probability(0.05, 0.0, -3.0);
/// assert!((q - 0.05).abs() < 1e-10);
/// ```
pub fn conditional_default_probability(q: f64, rho: f64, factor: f64) -> f64 {
    if q <= 0.0 {
        return 0.0;
    }
    if q >= 1.0 {
        return 1.0;
    }
    conditional_from_threshold(norm_inv(q), rho.sqrt(), (1.0 - rho).sqrt(), factor)
}

#[inline]
fn conditional_from_threshold(
    threshold: f64,
    sqrt_rho: f64,
    sqrt_one_minus_rho: f64,
    factor: f64,
) -> f64 {
    norm_cdf((threshold - sqrt_rho * factor) / sqrt_one_minus_rho)
}

/// One-factor Gaussian copula with a flat correlation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianCopula {
    rho: f64,
}

impl GaussianCopula {
    /// Create a copula with asset correlation `rho`.
    ///
    /// # Errors
    ///
    /// Returns `RiskError::InvalidCorrelation` unless `0 ≤ rho < 1`.
    pub fn new(rho: f64) -> Result<Self, RiskError> {
        if !(0.0..1.0).contains(&rho) {
            return Err(RiskError::InvalidCorrelation { rho });
        }
        Ok(Self { rho })
    }

    /// Asset correlation.
    #[inline]
    pub fn rho(&self) -> f64 {
        self.rho
    }

    /// Conditional default probability of one name.
    #[inline]
    pub fn conditional_default_probability(&self, q: f64, factor: f64) -> f64 {
        conditional_default_probability(q, self.rho, factor)
    }

    /// Loss fraction `L(F)` for a single factor value.
    ///
    /// # Errors
    ///
    /// `MarketDataError::InvalidParameter` unless `0 <= recovery <= 1`.
    pub fn portfolio_loss(
        &self,
        portfolio: &Portfolio,
        recovery: f64,
        factor: f64,
    ) -> Result<f64, RiskError> {
        Ok(LossKernel::new(portfolio, self.rho, recovery)?.loss(factor))
    }

    /// Loss fraction at the `alpha` quantile in the large-pool limit.
    ///
    /// Since `L(F)` is decreasing in `F`, the `alpha` loss quantile is
    /// `L(Φ⁻¹(1 - alpha))` (the Vasicek formula for a homogeneous pool).
    ///
    /// # Errors
    ///
    /// Returns `RiskError::InvalidConfidence` unless `0 < alpha < 1`, or
    /// `MarketDataError::InvalidParameter` for a recovery outside [0, 1].
    pub fn analytic_loss_quantile(
        &self,
        portfolio: &Portfolio,
        recovery: f64,
        alpha: f64,
    ) -> Result<f64, RiskError> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(RiskError::InvalidConfidence { alpha });
        }
        self.portfolio_loss(portfolio, recovery, norm_inv(1.0 - alpha))
    }

    /// Simulate the loss distribution.
    ///
    /// Draws `config.n_trials()` standard normal factors from a generator
    /// seeded with `config.seed()` and maps each to `L(F)`.
    ///
    /// # Errors
    ///
    /// Returns `RiskError::Config` if the configuration is invalid, or
    /// `MarketDataError::InvalidParameter` for a recovery outside [0, 1].
    pub fn loss_distribution(
        &self,
        portfolio: &Portfolio,
        recovery: f64,
        config: &SimulationConfig,
    ) -> Result<LossSample, RiskError> {
        config.validate()?;
        let kernel = LossKernel::new(portfolio, self.rho, recovery)?;

        let mut rng = PricerRng::from_seed(config.seed());
        let factors = rng.normal_draws(config.n_trials());

        let losses: Vec<f64> = factors.par_iter().map(|&f| kernel.loss(f)).collect();

        debug!(
            rho = self.rho,
            n_trials = config.n_trials(),
            names = portfolio.len(),
            seed = config.seed(),
            "loss distribution simulated"
        );

        Ok(LossSample {
            losses,
            rho: self.rho,
            seed: config.seed(),
        })
    }
}

/// Simulated portfolio loss fractions, one per trial, in draw order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LossSample {
    /// Loss fraction per trial.
    pub losses: Vec<f64>,
    /// Correlation used.
    pub rho: f64,
    /// Seed used for the factor draws.
    pub seed: u64,
}

impl LossSample {
    /// Number of trials.
    #[inline]
    pub fn len(&self) -> usize {
        self.losses.len()
    }

    /// True if no trials were drawn.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.losses.is_empty()
    }
}

/// Precomputed thresholds and weights for repeated `L(F)` evaluation.
struct LossKernel {
    terms: Vec<(f64, f64, f64)>,
    sqrt_rho: f64,
    sqrt_one_minus_rho: f64,
    lgd: f64,
}

impl LossKernel {
    fn new(portfolio: &Portfolio, rho: f64, recovery: f64) -> Result<Self, RiskError> {
        let lgd = 1.0 - validate_recovery(recovery)?;
        // (threshold, weight, q); threshold is unused at the boundaries.
        let terms = portfolio
            .entries()
            .iter()
            .map(|e| (norm_inv(e.default_probability), e.weight, e.default_probability))
            .collect();
        Ok(Self {
            terms,
            sqrt_rho: rho.sqrt(),
            sqrt_one_minus_rho: (1.0 - rho).sqrt(),
            lgd,
        })
    }

    #[inline]
    fn loss(&self, factor: f64) -> f64 {
        let weighted: f64 = self
            .terms
            .iter()
            .map(|&(threshold, weight, q)| {
                let conditional = if q <= 0.0 {
                    0.0
                } else {
                    conditional_from_threshold(
                        threshold,
                        self.sqrt_rho,
                        self.sqrt_one_minus_rho,
                        factor,
                    )
                };
                weight * conditional
            })
            .sum();
        self.lgd * weighted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::PortfolioEntry;
    use approx::assert_relative_eq;
    use pricer_core::market_data::{CreditRating, MarketDataError};
    use proptest::prelude::*;

    fn two_name() -> Portfolio {
        Portfolio::new(vec![
            PortfolioEntry {
                name: "A".to_string(),
                rating: CreditRating::BBB,
                default_probability: 0.0158,
                weight: 0.6,
            },
            PortfolioEntry {
                name: "B".to_string(),
                rating: CreditRating::BB,
                default_probability: 0.0652,
                weight: 0.4,
            },
        ])
        .unwrap()
    }

    fn small_config(n_trials: usize) -> SimulationConfig {
        SimulationConfig::builder()
            .n_trials(n_trials)
            .seed(42)
            .build()
            .unwrap()
    }

    // ========================================
    // Conditional Probability Tests
    // ========================================

    #[test]
    fn test_conditional_boundaries() {
        assert_eq!(conditional_default_probability(0.0, 0.3, -2.0), 0.0);
        assert_eq!(conditional_default_probability(1.0, 0.3, 2.0), 1.0);
    }

    #[test]
    fn test_conditional_at_zero_factor() {
        // F = 0 shifts only the scale: Φ(K / √(1-ρ))
        let q = 0.0652;
        let expected = norm_cdf(norm_inv(q) / (1.0_f64 - 0.3).sqrt());
        assert_relative_eq!(
            conditional_default_probability(q, 0.3, 0.0),
            expected,
            max_relative = 1e-14
        );
    }

    #[test]
    fn test_conditional_increases_as_factor_falls() {
        let high = conditional_default_probability(0.02, 0.4, 1.0);
        let low = conditional_default_probability(0.02, 0.4, -1.0);
        assert!(low > 0.02 && 0.02 > high);
    }

    // ========================================
    // Copula Construction Tests
    // ========================================

    #[test]
    fn test_invalid_correlation() {
        for rho in [-0.1, 1.0, 1.5, f64::NAN] {
            assert!(matches!(
                GaussianCopula::new(rho),
                Err(RiskError::InvalidCorrelation { .. })
            ));
        }
        assert!(GaussianCopula::new(0.0).is_ok());
        assert!(GaussianCopula::new(0.999).is_ok());
    }

    // ========================================
    // Loss Tests
    // ========================================

    #[test]
    fn test_zero_correlation_is_degenerate() {
        let portfolio = two_name();
        let copula = GaussianCopula::new(0.0).unwrap();
        let sample = copula
            .loss_distribution(&portfolio, 0.4, &small_config(1_000))
            .unwrap();

        let expected = portfolio.expected_loss(0.4).unwrap();
        for &loss in &sample.losses {
            assert_relative_eq!(loss, expected, max_relative = 1e-10);
        }
    }

    #[test]
    fn test_kernel_matches_direct_formula() {
        let portfolio = two_name();
        let copula = GaussianCopula::new(0.25).unwrap();
        for factor in [-3.0, -1.0, 0.0, 0.5, 2.5] {
            let direct = 0.6
                * portfolio
                    .entries()
                    .iter()
                    .map(|e| {
                        e.weight * conditional_default_probability(e.default_probability, 0.25, factor)
                    })
                    .sum::<f64>();
            assert_relative_eq!(
                copula.portfolio_loss(&portfolio, 0.4, factor).unwrap(),
                direct,
                max_relative = 1e-14
            );
        }
    }

    #[test]
    fn test_simulation_is_reproducible() {
        let portfolio = two_name();
        let copula = GaussianCopula::new(0.3).unwrap();
        let config = small_config(5_000);
        let a = copula.loss_distribution(&portfolio, 0.4, &config).unwrap();
        let b = copula.loss_distribution(&portfolio, 0.4, &config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 5_000);
        assert_eq!(a.seed, 42);
    }

    #[test]
    fn test_simulation_matches_sequential_mapping() {
        let portfolio = two_name();
        let copula = GaussianCopula::new(0.2).unwrap();
        let config = small_config(3_000);
        let sample = copula.loss_distribution(&portfolio, 0.4, &config).unwrap();

        let factors = PricerRng::from_seed(42).normal_draws(3_000);
        let sequential: Vec<f64> = factors
            .iter()
            .map(|&f| copula.portfolio_loss(&portfolio, 0.4, f).unwrap())
            .collect();
        assert_eq!(sample.losses, sequential);
    }

    #[test]
    fn test_analytic_quantile_validates_alpha() {
        let portfolio = two_name();
        let copula = GaussianCopula::new(0.2).unwrap();
        assert!(matches!(
            copula.analytic_loss_quantile(&portfolio, 0.4, 1.0),
            Err(RiskError::InvalidConfidence { .. })
        ));
        let q99 = copula.analytic_loss_quantile(&portfolio, 0.4, 0.99).unwrap();
        assert!(q99 > portfolio.expected_loss(0.4).unwrap());
    }

    #[test]
    fn test_recovery_outside_unit_interval_rejected() {
        let portfolio = two_name();
        let copula = GaussianCopula::new(0.2).unwrap();
        let config = small_config(100);

        for recovery in [-0.5, 1.2, f64::NAN] {
            assert!(matches!(
                copula.loss_distribution(&portfolio, recovery, &config),
                Err(RiskError::MarketData(MarketDataError::InvalidParameter { .. }))
            ));
            assert!(copula.analytic_loss_quantile(&portfolio, recovery, 0.99).is_err());
            assert!(copula.portfolio_loss(&portfolio, recovery, 0.0).is_err());
        }

        let full_recovery = copula.loss_distribution(&portfolio, 1.0, &config).unwrap();
        assert!(full_recovery.losses.iter().all(|&l| l == 0.0));
    }

    // ========================================
    // Property-based Tests
    // ========================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn test_conditional_in_unit_interval(
            q in 1e-6_f64..0.999,
            rho in 0.0_f64..0.99,
            factor in -6.0_f64..6.0,
        ) {
            let p = conditional_default_probability(q, rho, factor);
            prop_assert!((0.0..=1.0).contains(&p));
        }

        #[test]
        fn test_loss_decreasing_in_factor(
            rho in 0.01_f64..0.95,
            f1 in -4.0_f64..4.0,
            step in 0.01_f64..2.0,
        ) {
            let portfolio = two_name();
            let copula = GaussianCopula::new(rho).unwrap();
            let low = copula.portfolio_loss(&portfolio, 0.4, f1).unwrap();
            let high = copula.portfolio_loss(&portfolio, 0.4, f1 + step).unwrap();
            prop_assert!(low >= high);
            prop_assert!((0.0..=0.6).contains(&low));
        }
    }
}
