//! Calibrate command implementation
//!
//! Inverts a quoted price to a flat spread, either for a single price or
//! for the weighted average price of quoted constituents.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use pricer_core::market_data::DefaultProbabilityTable;
use pricer_core::math::solvers::SolverConfig;
use pricer_models::calibration::{SpreadCalibration, SpreadCalibrator};
use pricer_models::instruments::credit::{IndexAggregator, IndexConstituent, Weighting};
use serde::Serialize;
use tracing::info;

use super::index::IndexReport;
use crate::config::EngineConfig;
use crate::loader::load_constituents;
use crate::output::{bp, emit, OutputFormat, TableReport};
use crate::{CliError, Result};

/// Arguments for `calibrate`
#[derive(Debug, Clone, Args)]
pub struct CalibrateArgs {
    /// Constituent file with market spreads (CSV or JSON)
    #[arg(short, long, conflicts_with = "price")]
    pub input: Option<PathBuf>,

    /// Single quoted price per 100 notional
    #[arg(short, long)]
    pub price: Option<f64>,

    /// Use a simple mean instead of weights
    #[arg(long)]
    pub equal_weight: bool,

    /// Bisection tolerance on the spread bracket width
    #[arg(long, default_value_t = 1e-10)]
    pub tolerance: f64,

    /// Bisection iteration budget
    #[arg(long, default_value_t = 100)]
    pub max_iterations: usize,
}

/// Single-price calibration report
#[derive(Debug, Clone, Serialize)]
pub struct PriceCalibrationReport {
    pub coupon: f64,
    pub implied_hazard: f64,
    pub calibration: SpreadCalibration,
}

impl TableReport for PriceCalibrationReport {
    fn write_table(&self, out: &mut dyn Write) -> std::io::Result<()> {
        let c = &self.calibration;
        writeln!(out, "Target price    {:.4}", c.target_price)?;
        writeln!(out, "Coupon          {} bp", bp(self.coupon))?;
        writeln!(out, "Solved spread   {} bp", bp(c.solved_spread))?;
        writeln!(out, "Implied hazard  {:.6}", self.implied_hazard)?;
        writeln!(out, "Iterations      {}", c.iterations)?;
        writeln!(out, "Final bracket   [{:.12}, {:.12}]", c.bracket.0, c.bracket.1)
    }
}

fn solver_config(args: &CalibrateArgs) -> Result<SolverConfig<f64>> {
    let config = SolverConfig {
        tolerance: args.tolerance,
        max_iterations: args.max_iterations,
    };
    config
        .validate()
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
    Ok(config)
}

/// Calibrate a single quoted price
pub fn price_report(
    args: &CalibrateArgs,
    config: &EngineConfig,
    price: f64,
) -> Result<PriceCalibrationReport> {
    let params = config.contract_params()?;
    let calibrator = SpreadCalibrator::new(&params).with_config(solver_config(args)?);
    let calibration = calibrator.calibrate(price)?;
    let implied_hazard = calibrator.implied_hazard(calibration.solved_spread)?;

    Ok(PriceCalibrationReport {
        coupon: params.coupon(),
        implied_hazard,
        calibration,
    })
}

/// Calibrate the index from quoted constituents
pub fn quotes_report(
    args: &CalibrateArgs,
    config: &EngineConfig,
    rows: &[IndexConstituent],
) -> Result<IndexReport> {
    let params = config.contract_params()?;
    let table = DefaultProbabilityTable::standard();
    let weighting = if args.equal_weight {
        Weighting::Equal
    } else {
        config.aggregation.weighting
    };

    let result = IndexAggregator::new(&params, &table)
        .with_weighting(weighting)
        .with_solver_config(solver_config(args)?)
        .calibrate_from_quotes(rows)?;

    Ok(IndexReport {
        mode: "market",
        weighting,
        coupon: params.coupon(),
        result,
        buckets: Vec::new(),
        basis: None,
    })
}

/// Run the calibrate command
pub fn run(
    args: &CalibrateArgs,
    config: &EngineConfig,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    match (&args.input, args.price) {
        (None, Some(price)) => {
            let report = price_report(args, config, price)?;
            info!(
                solved_spread = report.calibration.solved_spread,
                iterations = report.calibration.iterations,
                "price calibration complete"
            );
            emit(&report, format, out)
        }
        (Some(path), None) => {
            let rows = load_constituents(path, config.aggregation.spread_unit)?;
            let report = quotes_report(args, config, &rows)?;
            emit(&report, format, out)
        }
        _ => Err(CliError::InvalidArgument(
            "exactly one of --input or --price is required".to_string(),
        )),
    }
}
