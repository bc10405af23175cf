//! CLI error types.

use pricer_core::market_data::MarketDataError;
use pricer_models::calibration::CalibrationError;
use pricer_models::instruments::CreditError;
use pricer_risk::RiskError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by the command-line front end.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Invalid command-line argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Input rows could not be parsed.
    #[error("Input error in {source_name}: {message}")]
    Input {
        /// File or stream the rows came from.
        source_name: String,
        /// What went wrong.
        message: String,
    },

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parse failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parse or render failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Market data failure.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    /// Calibration failure.
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    /// Pricing or aggregation failure.
    #[error(transparent)]
    Credit(#[from] CreditError),

    /// Risk engine failure.
    #[error(transparent)]
    Risk(#[from] RiskError),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = CliError::FileNotFound("rows.csv".to_string());
        assert_eq!(err.to_string(), "File not found: rows.csv");

        let err = CliError::Input {
            source_name: "rows.csv".to_string(),
            message: "no weight column".to_string(),
        };
        assert_eq!(err.to_string(), "Input error in rows.csv: no weight column");
    }

    #[test]
    fn test_transparent_engine_errors() {
        let err: CliError = CreditError::DegenerateAggregation { excluded: 3 }.into();
        assert_eq!(
            err.to_string(),
            "Degenerate aggregation: no valid constituents (3 excluded)"
        );

        let err: CliError = RiskError::EmptySample.into();
        assert!(matches!(err, CliError::Risk(_)));
    }
}
