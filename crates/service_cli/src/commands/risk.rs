//! Risk command implementation
//!
//! Simulates portfolio loss statistics under the Gaussian copula, for one
//! correlation or across the configured correlation grid.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use pricer_core::market_data::ratings::horizon_from_maturity;
use pricer_core::market_data::DefaultProbabilityTable;
use pricer_models::instruments::credit::IndexConstituent;
use pricer_risk::portfolio::build_portfolio;
use pricer_risk::sweep::{correlation_sweep, SweepPoint};
use serde::Serialize;
use tracing::info;

use crate::config::EngineConfig;
use crate::loader::load_constituents;
use crate::output::{emit, OutputFormat, TableReport};
use crate::Result;

/// Arguments for `risk`
#[derive(Debug, Clone, Args)]
pub struct RiskArgs {
    /// Constituent file (CSV or JSON)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Single asset correlation; defaults to the configured grid
    #[arg(long)]
    pub rho: Option<f64>,

    /// Number of factor draws
    #[arg(short = 'n', long)]
    pub trials: Option<usize>,

    /// RNG seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Tail confidence level
    #[arg(long)]
    pub confidence: Option<f64>,
}

/// Copula risk report
#[derive(Debug, Clone, Serialize)]
pub struct RiskReport {
    pub names: usize,
    pub excluded: usize,
    pub horizon: u32,
    pub recovery: f64,
    pub n_trials: usize,
    pub seed: u64,
    pub confidence: f64,
    pub analytic_expected_loss: f64,
    pub points: Vec<SweepPoint>,
}

impl TableReport for RiskReport {
    fn write_table(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            out,
            "Names {} (excluded {}), horizon {}y, R={}, trials {}, seed {}",
            self.names, self.excluded, self.horizon, self.recovery, self.n_trials, self.seed
        )?;
        writeln!(out, "Analytic EL     {:.6}", self.analytic_expected_loss)?;
        writeln!(out)?;
        let pct = self.confidence * 100.0;
        writeln!(
            out,
            "{:>6}{:>12}{:>12}{:>12}{:>14}",
            "rho",
            "EL",
            format!("VaR{}", pct),
            format!("ES{}", pct),
            "Vasicek VaR"
        )?;
        for p in &self.points {
            writeln!(
                out,
                "{:>6.2}{:>12.6}{:>12.6}{:>12.6}{:>14.6}",
                p.rho,
                p.statistics.expected_loss,
                p.statistics.value_at_risk,
                p.statistics.expected_shortfall,
                p.analytic_value_at_risk
            )?;
        }
        Ok(())
    }
}

/// Apply command-line overrides to the simulation section
fn effective_config(args: &RiskArgs, config: &EngineConfig) -> Result<EngineConfig> {
    let mut config = config.clone();
    if let Some(trials) = args.trials {
        config.simulation.n_trials = trials;
    }
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(confidence) = args.confidence {
        config.simulation.confidence = confidence;
    }
    if let Some(rho) = args.rho {
        config.simulation.correlations = vec![rho];
    }
    config.validate()?;
    Ok(config)
}

/// Build the report from loaded rows
pub fn report(
    args: &RiskArgs,
    config: &EngineConfig,
    rows: &[IndexConstituent],
) -> Result<RiskReport> {
    let config = effective_config(args, config)?;
    let params = config.contract_params()?;
    let simulation = config.simulation_config()?;
    let horizon = horizon_from_maturity(params.maturity())?;

    let table = DefaultProbabilityTable::standard();
    let portfolio = build_portfolio(rows, &table, horizon)?;
    let recovery = params.recovery();

    let points = correlation_sweep(
        &portfolio,
        recovery,
        &config.simulation.correlations,
        &simulation,
    )?;

    Ok(RiskReport {
        names: portfolio.len(),
        excluded: portfolio.excluded(),
        horizon,
        recovery,
        n_trials: simulation.n_trials(),
        seed: simulation.seed(),
        confidence: simulation.confidence(),
        analytic_expected_loss: portfolio.expected_loss(recovery)?,
        points,
    })
}

/// Run the risk command
pub fn run(
    args: &RiskArgs,
    config: &EngineConfig,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    let rows = load_constituents(&args.input, config.aggregation.spread_unit)?;
    let report = report(args, config, &rows)?;
    info!(
        names = report.names,
        scenarios = report.points.len(),
        "copula risk complete"
    );
    emit(&report, format, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CliError;
    use approx::assert_relative_eq;

    fn args() -> RiskArgs {
        RiskArgs {
            input: PathBuf::from("unused.csv"),
            rho: None,
            trials: Some(5_000),
            seed: None,
            confidence: None,
        }
    }

    fn rows() -> Vec<IndexConstituent> {
        vec![
            IndexConstituent::new("Alpha").with_rating("BBB").with_weight(60.0),
            IndexConstituent::new("Beta").with_rating("BB").with_weight(40.0),
        ]
    }

    #[test]
    fn test_default_grid() {
        let report = report(&args(), &EngineConfig::default(), &rows()).unwrap();

        assert_eq!(report.points.len(), 5);
        assert_eq!(report.n_trials, 5_000);
        assert_eq!(report.seed, 42);
        assert_relative_eq!(
            report.analytic_expected_loss,
            0.6 * (0.6 * 0.0158 + 0.4 * 0.0652),
            max_relative = 1e-12
        );
        // rho = 0 is degenerate at the analytic EL
        assert_relative_eq!(
            report.points[0].statistics.value_at_risk,
            report.analytic_expected_loss,
            max_relative = 1e-10
        );
    }

    #[test]
    fn test_single_rho_override() {
        let mut args = args();
        args.rho = Some(0.35);
        let report = report(&args, &EngineConfig::default(), &rows()).unwrap();
        assert_eq!(report.points.len(), 1);
        assert_eq!(report.points[0].rho, 0.35);
    }

    #[test]
    fn test_invalid_rho_rejected() {
        let mut args = args();
        args.rho = Some(1.0);
        assert!(matches!(
            report(&args, &EngineConfig::default(), &rows()),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn test_json_output_shape() {
        let report = report(&args(), &EngineConfig::default(), &rows()).unwrap();
        let mut buffer = Vec::new();
        emit(&report, OutputFormat::Json, &mut buffer).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed["points"].as_array().unwrap().len(), 5);
        assert!(parsed["points"][4]["statistics"]["value_at_risk"].is_number());
    }
}
