//! Tail statistics of a simulated loss distribution.
//!
//! - Expected loss: sample mean
//! - VaR: linear-interpolation quantile at position `(N - 1)α` of the
//!   sorted sample (Hyndman-Fan type 7)
//! - ES: mean of the losses at or above VaR

use tracing::debug;

use crate::copula::LossSample;
use crate::error::RiskError;

/// Loss statistics at one confidence level.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LossStatistics {
    /// Mean loss fraction.
    pub expected_loss: f64,
    /// Loss quantile at `confidence`.
    pub value_at_risk: f64,
    /// Mean loss in the tail at or above VaR.
    pub expected_shortfall: f64,
    /// Confidence level used.
    pub confidence: f64,
    /// Number of trials.
    pub n_trials: usize,
}

impl LossStatistics {
    /// Compute EL, VaR and ES from a loss sample.
    ///
    /// # Errors
    ///
    /// - `RiskError::EmptySample` if the sample has no trials
    /// - `RiskError::InvalidConfidence` unless `0 < alpha < 1`
    ///
    /// # Examples
    ///
    /// ```
    /// use pricer_risk::copula::LossSample;
    /// use pricer_risk::statistics::LossStatistics;
    ///
    /// let sample = LossSample { losses: vec![0.0, 0.1, 0.2, 0.3, 0.4], rho: 0.2, seed: 1 };
    /// let stats = LossStatistics::from_sample(&sample, 0.5).unwrap();
    /// assert!((stats.value_at_risk - 0.2).abs() < 1e-15);
    /// assert!((stats.expected_shortfall - 0.3).abs() < 1e-15);
    /// ```
    pub fn from_sample(sample: &LossSample, alpha: f64) -> Result<Self, RiskError> {
        Self::from_losses(&sample.losses, alpha)
    }

    /// Compute EL, VaR and ES from raw loss fractions.
    ///
    /// # Errors
    ///
    /// Same as [`LossStatistics::from_sample`].
    pub fn from_losses(losses: &[f64], alpha: f64) -> Result<Self, RiskError> {
        if losses.is_empty() {
            return Err(RiskError::EmptySample);
        }
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(RiskError::InvalidConfidence { alpha });
        }

        let n = losses.len();
        let mut sorted = losses.to_vec();
        sorted.sort_by(f64::total_cmp);

        let expected_loss = shifted_mean(&sorted, sorted[0]);
        let value_at_risk = linear_quantile(&sorted, alpha);

        // The maximum is always at or above an interpolated quantile.
        let tail_start = sorted.partition_point(|&l| l < value_at_risk);
        let expected_shortfall = if tail_start < n {
            shifted_mean(&sorted[tail_start..], value_at_risk)
        } else {
            value_at_risk
        };

        debug!(
            n_trials = n,
            alpha,
            expected_loss,
            value_at_risk,
            expected_shortfall,
            "loss statistics"
        );

        Ok(Self {
            expected_loss,
            value_at_risk,
            expected_shortfall,
            confidence: alpha,
            n_trials: n,
        })
    }
}

/// Mean of `values` as `origin` plus the mean deviation from it.
///
/// Exact when every value equals `origin`.
fn shifted_mean(values: &[f64], origin: f64) -> f64 {
    let deviation: f64 = values.iter().map(|&v| v - origin).sum();
    origin + deviation / values.len() as f64
}

/// Type-7 quantile of an ascending, non-empty slice.
///
/// `alpha` is clamped to [0, 1].
pub fn linear_quantile(sorted: &[f64], alpha: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let h = (n - 1) as f64 * alpha.clamp(0.0, 1.0);
            let lo = h.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
        }
    }
}
