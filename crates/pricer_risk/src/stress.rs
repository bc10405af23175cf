//! Stressed index spreads under an adverse systematic factor.
//!
//! For a scenario `(ρ, α)` each name's default probability is replaced by
//! its copula-conditional value at the factor quantile `F = Φ⁻¹(α)`:
//!
//! ```text
//! Q_stress = Φ((Φ⁻¹(Q) - √ρ F) / √(1 - ρ))
//! ```
//!
//! The hazard rate is bootstrapped from `Q_stress` at the contract maturity,
//! the fair spread is priced per name and the index spread is the
//! weight-averaged fair spread.

use pricer_models::analytical::norm_inv;
use pricer_models::instruments::credit::{value_from_default_probability, ContractParameters};
use pricer_models::instruments::CreditError;
use rayon::prelude::*;
use tracing::debug;

use crate::copula::GaussianCopula;
use crate::error::RiskError;
use crate::portfolio::Portfolio;

/// A stress scenario: asset correlation and adverse factor quantile.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StressScenario {
    /// Asset correlation in [0, 1).
    pub rho: f64,
    /// Factor quantile in (0, 1); small values are severe.
    pub alpha: f64,
}

impl StressScenario {
    /// Create a scenario.
    pub const fn new(rho: f64, alpha: f64) -> Self {
        Self { rho, alpha }
    }

    /// Validate the scenario.
    ///
    /// # Errors
    ///
    /// - `RiskError::InvalidCorrelation` unless `0 ≤ rho < 1`
    /// - `RiskError::InvalidConfidence` unless `0 < alpha < 1`
    pub fn validate(&self) -> Result<(), RiskError> {
        GaussianCopula::new(self.rho)?;
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(RiskError::InvalidConfidence { alpha: self.alpha });
        }
        Ok(())
    }

    /// Adverse factor value `Φ⁻¹(alpha)`.
    #[inline]
    pub fn factor(&self) -> f64 {
        norm_inv(self.alpha)
    }
}

impl std::fmt::Display for StressScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rho={} alpha={}", self.rho, self.alpha)
    }
}

/// Default scenario grid, from benign to severe.
pub const DEFAULT_STRESS_SCENARIOS: [StressScenario; 4] = [
    StressScenario::new(0.0, 0.5),
    StressScenario::new(0.3, 0.1),
    StressScenario::new(0.4, 0.05),
    StressScenario::new(0.5, 0.01),
];

/// Stressed valuation of one name.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StressedName {
    /// Reference entity name.
    pub name: String,
    /// Normalised weight.
    pub weight: f64,
    /// Unstressed default probability.
    pub base_default_probability: f64,
    /// Conditional default probability under the scenario.
    pub stressed_default_probability: f64,
    /// Hazard rate bootstrapped from the stressed probability.
    pub hazard_rate: f64,
    /// Fair spread at the stressed hazard rate.
    pub fair_spread: f64,
}

/// Stressed index spread for one scenario.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StressResult {
    /// Scenario applied.
    pub scenario: StressScenario,
    /// Factor value `Φ⁻¹(alpha)`.
    pub factor: f64,
    /// Weighted fair spread across names.
    pub index_spread: f64,
    /// Per-name detail, in portfolio order.
    pub names: Vec<StressedName>,
}

impl StressResult {
    /// Index spread in basis points.
    #[inline]
    pub fn index_spread_bp(&self) -> f64 {
        self.index_spread * 10_000.0
    }
}

/// Price the index under one stress scenario.
///
/// # Errors
///
/// - `RiskError::InvalidCorrelation` / `InvalidConfidence` for a bad scenario
/// - `RiskError::Credit` if a stressed probability cannot be priced
///   (for example it rounds to 1)
pub fn stressed_index_spread(
    portfolio: &Portfolio,
    params: &ContractParameters<f64>,
    scenario: StressScenario,
) -> Result<StressResult, RiskError> {
    scenario.validate()?;
    let copula = GaussianCopula::new(scenario.rho)?;
    let factor = scenario.factor();

    let names = portfolio
        .entries()
        .iter()
        .map(|entry| {
            let stressed =
                copula.conditional_default_probability(entry.default_probability, factor);
            let valuation =
                value_from_default_probability(params, stressed).map_err(CreditError::from)?;
            Ok(StressedName {
                name: entry.name.clone(),
                weight: entry.weight,
                base_default_probability: entry.default_probability,
                stressed_default_probability: stressed,
                hazard_rate: valuation.hazard_rate,
                fair_spread: valuation.fair_spread,
            })
        })
        .collect::<Result<Vec<_>, RiskError>>()?;

    let index_spread = names.iter().map(|n| n.weight * n.fair_spread).sum();

    debug!(%scenario, factor, index_spread, "stress scenario priced");

    Ok(StressResult {
        scenario,
        factor,
        index_spread,
        names,
    })
}

/// Price the index under each scenario in parallel, preserving order.
///
/// # Errors
///
/// Returns the first error in scenario order.
pub fn run_stress_grid(
    portfolio: &Portfolio,
    params: &ContractParameters<f64>,
    scenarios: &[StressScenario],
) -> Result<Vec<StressResult>, RiskError> {
    scenarios
        .par_iter()
        .map(|&scenario| stressed_index_spread(portfolio, params, scenario))
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}
