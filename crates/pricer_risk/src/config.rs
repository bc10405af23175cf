//! Copula simulation configuration.
//!
//! This module provides configuration types and builders for the
//! Gaussian-copula loss simulation.

use crate::error::ConfigError;

/// Maximum number of simulated factor draws.
pub const MAX_TRIALS: usize = 10_000_000;

/// Default number of simulated factor draws.
pub const DEFAULT_TRIALS: usize = 100_000;

/// Default seed.
pub const DEFAULT_SEED: u64 = 42;

/// Default tail confidence level for VaR and ES.
pub const DEFAULT_CONFIDENCE: f64 = 0.99;

/// Copula simulation configuration.
///
/// Immutable configuration specifying simulation parameters.
/// Use [`SimulationConfigBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust
/// use pricer_risk::config::SimulationConfig;
///
/// let config = SimulationConfig::builder()
///     .n_trials(50_000)
///     .seed(7)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.n_trials(), 50_000);
/// assert_eq!(config.confidence(), 0.99);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationConfig {
    /// Number of factor draws.
    n_trials: usize,
    /// Seed for the factor RNG.
    seed: u64,
    /// Tail confidence level.
    confidence: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_trials: DEFAULT_TRIALS,
            seed: DEFAULT_SEED,
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

impl SimulationConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::default()
    }

    /// Returns the number of factor draws.
    #[inline]
    pub fn n_trials(&self) -> usize {
        self.n_trials
    }

    /// Returns the RNG seed.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the tail confidence level.
    #[inline]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `n_trials` is 0 or greater than 10,000,000
    /// - `confidence` is not in (0, 1)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_trials == 0 || self.n_trials > MAX_TRIALS {
            return Err(ConfigError::InvalidTrialCount(self.n_trials));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(ConfigError::InvalidParameter {
                name: "confidence",
                value: format!("{} must be in (0, 1)", self.confidence),
            });
        }
        Ok(())
    }
}

/// Builder for [`SimulationConfig`].
///
/// Unset fields take the defaults: 100,000 trials, seed 42, 99% confidence.
#[derive(Clone, Debug, Default)]
pub struct SimulationConfigBuilder {
    n_trials: Option<usize>,
    seed: Option<u64>,
    confidence: Option<f64>,
}

impl SimulationConfigBuilder {
    /// Sets the number of factor draws.
    ///
    /// # Arguments
    ///
    /// * `n_trials` - Number of draws in [1, 10_000_000]
    #[inline]
    pub fn n_trials(mut self, n_trials: usize) -> Self {
        self.n_trials = Some(n_trials);
        self
    }

    /// Sets the seed for reproducibility.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the tail confidence level.
    ///
    /// # Arguments
    ///
    /// * `confidence` - Level in (0, 1), e.g. 0.99
    #[inline]
    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any value is out of range.
    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        let config = SimulationConfig {
            n_trials: self.n_trials.unwrap_or(DEFAULT_TRIALS),
            seed: self.seed.unwrap_or(DEFAULT_SEED),
            confidence: self.confidence.unwrap_or(DEFAULT_CONFIDENCE),
        };

        config.validate()?;
        Ok(config)
    }
}
