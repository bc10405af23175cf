//! Engine configuration management
//!
//! Loads configuration from a TOML file, then applies `CDS_*` environment
//! overrides, then command-line flags. Every stage ends in `validate()`.
//!
//! ```toml
//! [contract]
//! maturity = 5.0
//! frequency = 4
//! rate = 0.02
//! recovery = 0.4
//! coupon = 0.01
//!
//! [simulation]
//! n_trials = 100000
//! seed = 42
//! confidence = 0.99
//! correlations = [0.0, 0.1, 0.2, 0.3, 0.5]
//!
//! [aggregation]
//! weighting = "weighted"
//! spread_unit = "bp"
//!
//! [logging]
//! level = "info"
//! ```

use std::path::Path;
use std::str::FromStr;

use pricer_models::instruments::credit::{
    ContractParameters, Weighting, DEFAULT_COUPON, DEFAULT_FREQUENCY, DEFAULT_MATURITY,
    DEFAULT_RATE, DEFAULT_RECOVERY,
};
use pricer_models::instruments::CreditError;
use pricer_risk::config::{SimulationConfig, DEFAULT_CONFIDENCE, DEFAULT_SEED, DEFAULT_TRIALS};
use pricer_risk::sweep::DEFAULT_CORRELATIONS;
use serde::Deserialize;
use thiserror::Error;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid spread unit: {0}. Must be one of: decimal, bp")]
    InvalidSpreadUnit(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error("Invalid contract: {0}")]
    Contract(#[from] CreditError),

    #[error("Invalid simulation settings: {0}")]
    Simulation(#[from] pricer_risk::ConfigError),
}

/// Log levels supported by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Unit of spread columns in input files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpreadUnit {
    /// Spreads are decimal fractions (0.0125).
    #[default]
    Decimal,
    /// Spreads are basis points (125).
    Bp,
}

impl FromStr for SpreadUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "decimal" | "dec" => Ok(SpreadUnit::Decimal),
            "bp" | "bps" => Ok(SpreadUnit::Bp),
            _ => Err(ConfigError::InvalidSpreadUnit(s.to_string())),
        }
    }
}

impl SpreadUnit {
    /// Convert a raw spread in this unit to decimal.
    #[inline]
    pub fn to_decimal(&self, raw: f64) -> f64 {
        match self {
            SpreadUnit::Decimal => raw,
            SpreadUnit::Bp => raw / 10_000.0,
        }
    }
}

fn deserialize_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: FromStr<Err = ConfigError>,
{
    let s = String::deserialize(deserializer)?;
    T::from_str(&s).map_err(serde::de::Error::custom)
}

/// `[contract]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContractSection {
    /// Maturity in years
    pub maturity: f64,
    /// Premium payments per year
    pub frequency: u32,
    /// Flat risk-free rate
    pub rate: f64,
    /// Recovery rate
    pub recovery: f64,
    /// Running coupon (decimal)
    pub coupon: f64,
}

impl Default for ContractSection {
    fn default() -> Self {
        Self {
            maturity: DEFAULT_MATURITY,
            frequency: DEFAULT_FREQUENCY,
            rate: DEFAULT_RATE,
            recovery: DEFAULT_RECOVERY,
            coupon: DEFAULT_COUPON,
        }
    }
}

/// `[simulation]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    /// Number of factor draws
    pub n_trials: usize,
    /// RNG seed
    pub seed: u64,
    /// Tail confidence level
    pub confidence: f64,
    /// Correlation grid for sweeps
    pub correlations: Vec<f64>,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            n_trials: DEFAULT_TRIALS,
            seed: DEFAULT_SEED,
            confidence: DEFAULT_CONFIDENCE,
            correlations: DEFAULT_CORRELATIONS.to_vec(),
        }
    }
}

/// `[aggregation]` section.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct AggregationSection {
    /// Weighted or equal averaging
    pub weighting: Weighting,
    /// Unit of input spread columns
    #[serde(deserialize_with = "deserialize_from_str")]
    pub spread_unit: SpreadUnit,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Default log level; `RUST_LOG` takes precedence
    #[serde(deserialize_with = "deserialize_from_str")]
    pub level: LogLevel,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub contract: ContractSection,
    pub simulation: SimulationSection,
    pub aggregation: AggregationSection,
    pub logging: LoggingSection,
}

impl EngineConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Apply `CDS_*` environment variable overrides
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup (environment or test map)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CDS_MATURITY") {
            self.contract.maturity = parse_value("CDS_MATURITY", &v)?;
        }
        if let Some(v) = lookup("CDS_FREQUENCY") {
            self.contract.frequency = parse_value("CDS_FREQUENCY", &v)?;
        }
        if let Some(v) = lookup("CDS_RATE") {
            self.contract.rate = parse_value("CDS_RATE", &v)?;
        }
        if let Some(v) = lookup("CDS_RECOVERY") {
            self.contract.recovery = parse_value("CDS_RECOVERY", &v)?;
        }
        if let Some(v) = lookup("CDS_COUPON") {
            self.contract.coupon = parse_value("CDS_COUPON", &v)?;
        }
        if let Some(v) = lookup("CDS_TRIALS") {
            self.simulation.n_trials = parse_value("CDS_TRIALS", &v)?;
        }
        if let Some(v) = lookup("CDS_SEED") {
            self.simulation.seed = parse_value("CDS_SEED", &v)?;
        }
        if let Some(v) = lookup("CDS_LOG_LEVEL") {
            self.logging.level = LogLevel::from_str(&v)?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.contract_params()?;
        self.simulation_config()?;
        if let Some(&rho) = self
            .simulation
            .correlations
            .iter()
            .find(|rho| !(0.0..1.0).contains(*rho))
        {
            return Err(ConfigError::InvalidValue {
                key: "simulation.correlations",
                value: format!("{} is outside [0, 1)", rho),
            });
        }
        Ok(())
    }

    /// Validated contract parameters
    pub fn contract_params(&self) -> Result<ContractParameters<f64>, ConfigError> {
        let c = &self.contract;
        Ok(ContractParameters::builder()
            .maturity(c.maturity)
            .frequency(c.frequency)
            .rate(c.rate)
            .recovery(c.recovery)
            .coupon(c.coupon)
            .build()?)
    }

    /// Validated simulation configuration
    pub fn simulation_config(&self) -> Result<SimulationConfig, ConfigError> {
        let s = &self.simulation;
        Ok(SimulationConfig::builder()
            .n_trials(s.n_trials)
            .seed(s.seed)
            .confidence(s.confidence)
            .build()?)
    }
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. Environment variables
/// 2. Config file (explicit path, else `cdsrisk.toml` when present)
/// 3. Default values
///
/// Command-line flags are applied afterwards by each command.
pub fn build_config(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    let mut config = match path {
        Some(path) => EngineConfig::from_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                EngineConfig::from_file(default_path)?
            } else {
                EngineConfig::default()
            }
        }
    };

    config.apply_env()?;
    config.validate()?;
    Ok(config)
}

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "cdsrisk.toml";

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.contract.maturity, 5.0);
        assert_eq!(config.contract.frequency, 4);
        assert_eq!(config.contract.rate, 0.02);
        assert_eq!(config.contract.recovery, 0.4);
        assert_eq!(config.contract.coupon, 0.01);
        assert_eq!(config.simulation.n_trials, 100_000);
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.simulation.correlations, vec![0.0, 0.1, 0.2, 0.3, 0.5]);
        assert_eq!(config.aggregation.weighting, Weighting::Weighted);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
            [contract]
            maturity = 3.0
            coupon = 0.05

            [simulation]
            n_trials = 5000
            correlations = [0.25]

            [aggregation]
            weighting = "equal"
            spread_unit = "bp"

            [logging]
            level = "debug"
        "#;

        let config = EngineConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.contract.maturity, 3.0);
        assert_eq!(config.contract.coupon, 0.05);
        // Unspecified fields keep their defaults
        assert_eq!(config.contract.frequency, 4);
        assert_eq!(config.simulation.n_trials, 5000);
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.simulation.correlations, vec![0.25]);
        assert_eq!(config.aggregation.weighting, Weighting::Equal);
        assert_eq!(config.aggregation.spread_unit, SpreadUnit::Bp);
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_invalid_toml_level() {
        let result = EngineConfig::from_toml_str("[logging]\nlevel = \"loud\"\n");
        assert!(matches!(result, Err(ConfigError::FileError(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = EngineConfig::default();
        config
            .apply_overrides(lookup(&[
                ("CDS_MATURITY", "7"),
                ("CDS_RATE", "0.03"),
                ("CDS_RECOVERY", "0.25"),
                ("CDS_COUPON", "0.05"),
                ("CDS_FREQUENCY", "2"),
                ("CDS_TRIALS", "20000"),
                ("CDS_SEED", "7"),
                ("CDS_LOG_LEVEL", "WARN"),
            ]))
            .unwrap();

        assert_eq!(config.contract.maturity, 7.0);
        assert_eq!(config.contract.rate, 0.03);
        assert_eq!(config.contract.recovery, 0.25);
        assert_eq!(config.contract.coupon, 0.05);
        assert_eq!(config.contract.frequency, 2);
        assert_eq!(config.simulation.n_trials, 20_000);
        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_env_parse_failure() {
        let mut config = EngineConfig::default();
        let result = config.apply_overrides(lookup(&[("CDS_TRIALS", "many")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                key: "CDS_TRIALS",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EngineConfig::default();
        config.contract.recovery = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Contract(_))));

        let mut config = EngineConfig::default();
        config.simulation.n_trials = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Simulation(_))));

        let mut config = EngineConfig::default();
        config.simulation.correlations = vec![0.2, 1.0];
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("Info").unwrap(), LogLevel::Info);
        assert!(LogLevel::from_str("invalid").is_err());
        assert_eq!(format!("{}", LogLevel::Error), "error");
    }

    #[test]
    fn test_spread_unit() {
        assert_eq!(SpreadUnit::from_str("bps").unwrap(), SpreadUnit::Bp);
        assert_eq!(SpreadUnit::Bp.to_decimal(125.0), 0.0125);
        assert_eq!(SpreadUnit::Decimal.to_decimal(0.0125), 0.0125);
        assert!(SpreadUnit::from_str("percent").is_err());
    }
}
