//! Spread command implementation
//!
//! Values a single-name CDS from a rating or a cumulative default
//! probability at the contract maturity.

use std::io::Write;

use clap::Args;
use pricer_core::market_data::ratings::horizon_from_maturity;
use pricer_core::market_data::{normalize_rating, CreditRating, DefaultProbabilityTable};
use pricer_models::instruments::credit::{value_from_default_probability, CdsValuation};
use serde::Serialize;
use tracing::info;

use crate::config::EngineConfig;
use crate::output::{bp, emit, OutputFormat, TableReport};
use crate::{CliError, Result};

/// Arguments for `spread`
#[derive(Debug, Clone, Args)]
pub struct SpreadArgs {
    /// Agency rating, e.g. BBB-
    #[arg(short, long, conflicts_with = "pd")]
    pub rating: Option<String>,

    /// Cumulative default probability at maturity
    #[arg(long)]
    pub pd: Option<f64>,
}

/// Single-name valuation report
#[derive(Debug, Clone, Serialize)]
pub struct SpreadReport {
    pub rating: Option<CreditRating>,
    pub default_probability: f64,
    pub contract: String,
    pub valuation: CdsValuation<f64>,
}

impl TableReport for SpreadReport {
    fn write_table(&self, out: &mut dyn Write) -> std::io::Result<()> {
        let v = &self.valuation;
        writeln!(out, "Contract        {}", self.contract)?;
        if let Some(rating) = self.rating {
            writeln!(out, "Rating          {}", rating)?;
        }
        writeln!(out, "Default prob    {:.6}", self.default_probability)?;
        writeln!(out, "Hazard rate     {:.6}", v.hazard_rate)?;
        writeln!(out, "Risky PV01      {:.6}", v.risky_annuity)?;
        writeln!(out, "Protection PV   {:.6}", v.protection_leg_pv)?;
        writeln!(out, "Fair spread     {} bp", bp(v.fair_spread))?;
        writeln!(out, "Upfront         {:.6}", v.upfront)?;
        writeln!(out, "BE spread       {} bp", bp(v.bond_equivalent_spread))?;
        writeln!(out, "Clean price     {:.4}", v.clean_price)
    }
}

/// Build the report without I/O
pub fn report(args: &SpreadArgs, config: &EngineConfig) -> Result<SpreadReport> {
    let params = config.contract_params()?;

    let (rating, default_probability) = match (&args.rating, args.pd) {
        (Some(raw), None) => {
            let rating = normalize_rating(raw).ok_or_else(|| {
                CliError::InvalidArgument(format!("unrecognised rating '{}'", raw))
            })?;
            let horizon = horizon_from_maturity(params.maturity())?;
            let q = DefaultProbabilityTable::standard().lookup(rating, horizon)?;
            (Some(rating), q)
        }
        (None, Some(q)) => (None, q),
        _ => {
            return Err(CliError::InvalidArgument(
                "exactly one of --rating or --pd is required".to_string(),
            ))
        }
    };

    let valuation = value_from_default_probability(&params, default_probability)?;
    Ok(SpreadReport {
        rating,
        default_probability,
        contract: params.to_string(),
        valuation,
    })
}

/// Run the spread command
pub fn run(
    args: &SpreadArgs,
    config: &EngineConfig,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    let report = report(args, config)?;
    info!(
        fair_spread = report.valuation.fair_spread,
        "single-name valuation complete"
    );
    emit(&report, format, out)
}
