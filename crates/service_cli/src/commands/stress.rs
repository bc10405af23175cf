//! Stress command implementation
//!
//! Prices the index spread under adverse systematic factor scenarios.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use pricer_core::market_data::ratings::horizon_from_maturity;
use pricer_core::market_data::DefaultProbabilityTable;
use pricer_models::instruments::credit::IndexConstituent;
use pricer_risk::portfolio::build_portfolio;
use pricer_risk::stress::{
    run_stress_grid, stressed_index_spread, StressResult, StressScenario,
    DEFAULT_STRESS_SCENARIOS,
};
use serde::Serialize;
use tracing::info;

use crate::config::EngineConfig;
use crate::loader::load_constituents;
use crate::output::{bp, emit, OutputFormat, TableReport};
use crate::Result;

/// Arguments for `stress`
#[derive(Debug, Clone, Args)]
pub struct StressArgs {
    /// Constituent file (CSV or JSON)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Scenario as RHO:ALPHA, e.g. 0.4:0.05; repeatable
    #[arg(short, long = "scenario", value_parser = parse_scenario)]
    pub scenarios: Vec<StressScenario>,
}

fn parse_scenario(raw: &str) -> std::result::Result<StressScenario, String> {
    let (rho, alpha) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected RHO:ALPHA, got '{}'", raw))?;
    let rho: f64 = rho
        .trim()
        .parse()
        .map_err(|_| format!("invalid rho '{}'", rho))?;
    let alpha: f64 = alpha
        .trim()
        .parse()
        .map_err(|_| format!("invalid alpha '{}'", alpha))?;
    let scenario = StressScenario::new(rho, alpha);
    scenario.validate().map_err(|e| e.to_string())?;
    Ok(scenario)
}

/// Stressed index spread report
#[derive(Debug, Clone, Serialize)]
pub struct StressReport {
    pub names: usize,
    pub excluded: usize,
    pub base_index_spread: f64,
    pub results: Vec<StressResult>,
}

impl TableReport for StressReport {
    fn write_table(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "Names {} (excluded {})", self.names, self.excluded)?;
        writeln!(out, "Base index      {} bp", bp(self.base_index_spread))?;
        writeln!(out)?;
        writeln!(
            out,
            "{:>6}{:>8}{:>10}{:>16}",
            "rho", "alpha", "factor", "Index (bp)"
        )?;
        for r in &self.results {
            writeln!(
                out,
                "{:>6.2}{:>8.3}{:>10.4}{:>16}",
                r.scenario.rho,
                r.scenario.alpha,
                r.factor,
                bp(r.index_spread)
            )?;
        }
        Ok(())
    }
}

/// Build the report from loaded rows
pub fn report(
    args: &StressArgs,
    config: &EngineConfig,
    rows: &[IndexConstituent],
) -> Result<StressReport> {
    let params = config.contract_params()?;
    let horizon = horizon_from_maturity(params.maturity())?;
    let table = DefaultProbabilityTable::standard();
    let portfolio = build_portfolio(rows, &table, horizon)?;

    let scenarios: &[StressScenario] = if args.scenarios.is_empty() {
        &DEFAULT_STRESS_SCENARIOS
    } else {
        &args.scenarios
    };
    let results = run_stress_grid(&portfolio, &params, scenarios)?;

    // rho = 0 leaves the default probabilities unchanged.
    let base_index_spread =
        stressed_index_spread(&portfolio, &params, StressScenario::new(0.0, 0.5))?.index_spread;

    Ok(StressReport {
        names: portfolio.len(),
        excluded: portfolio.excluded(),
        base_index_spread,
        results,
    })
}

/// Run the stress command
pub fn run(
    args: &StressArgs,
    config: &EngineConfig,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    let rows = load_constituents(&args.input, config.aggregation.spread_unit)?;
    let report = report(args, config, &rows)?;
    info!(scenarios = report.results.len(), "stress grid complete");
    emit(&report, format, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn args(scenarios: Vec<StressScenario>) -> StressArgs {
        StressArgs {
            input: PathBuf::from("unused.csv"),
            scenarios,
        }
    }

    fn rows() -> Vec<IndexConstituent> {
        vec![
            IndexConstituent::new("Alpha").with_rating("BBB").with_weight(0.6),
            IndexConstituent::new("Beta").with_rating("BB").with_weight(0.4),
        ]
    }

    #[test]
    fn test_default_grid() {
        let report = report(&args(Vec::new()), &EngineConfig::default(), &rows()).unwrap();

        assert_eq!(report.results.len(), 4);
        assert_relative_eq!(report.base_index_spread, 0.0043936, max_relative = 1e-3);
        assert!(report.results[3].index_spread > 10.0 * report.base_index_spread);
    }

    #[test]
    fn test_custom_scenarios() {
        let scenario = parse_scenario("0.25:0.02").unwrap();
        let report = report(&args(vec![scenario]), &EngineConfig::default(), &rows()).unwrap();
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].scenario, StressScenario::new(0.25, 0.02));
    }

    #[test]
    fn test_parse_scenario_errors() {
        assert!(parse_scenario("0.3").is_err());
        assert!(parse_scenario("x:0.1").is_err());
        assert!(parse_scenario("1.2:0.1").is_err());
        assert!(parse_scenario("0.3:1.0").is_err());
    }
}
