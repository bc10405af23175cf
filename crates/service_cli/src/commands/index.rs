//! Index command implementation
//!
//! Replicates an index spread from constituent ratings.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use pricer_core::market_data::DefaultProbabilityTable;
use pricer_models::instruments::credit::{
    IndexAggregator, IndexBasis, IndexConstituent, IndexResult, RatingBucket, Weighting,
};
use serde::Serialize;
use tracing::info;

use crate::config::EngineConfig;
use crate::loader::load_constituents;
use crate::output::{bp, emit, OutputFormat, TableReport};
use crate::Result;

/// Arguments for `index`
#[derive(Debug, Clone, Args)]
pub struct IndexArgs {
    /// Constituent file (CSV or JSON)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Use a simple mean instead of weights
    #[arg(long)]
    pub equal_weight: bool,

    /// Observed index spread in bp, for the market-model basis
    #[arg(long)]
    pub market_spread_bp: Option<f64>,

    /// Include per-rating spread buckets
    #[arg(long)]
    pub by_rating: bool,
}

/// Index aggregation report
#[derive(Debug, Clone, Serialize)]
pub struct IndexReport {
    pub mode: &'static str,
    pub weighting: Weighting,
    pub coupon: f64,
    pub result: IndexResult,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buckets: Vec<RatingBucket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basis: Option<IndexBasis>,
}

impl TableReport for IndexReport {
    fn write_table(&self, out: &mut dyn Write) -> std::io::Result<()> {
        let r = &self.result;
        writeln!(out, "Mode            {} ({})", self.mode, self.weighting)?;
        writeln!(out, "Coupon          {} bp", bp(self.coupon))?;
        writeln!(out, "Included        {}", r.included)?;
        writeln!(out, "Excluded        {}", r.excluded)?;
        writeln!(out, "Index BE spread {} bp", bp(r.index_be_spread))?;
        writeln!(out, "Index flat      {} bp", bp(r.index_flat_spread))?;
        writeln!(out, "Index price     {:.4}", r.index_price)?;
        if let Some(solved) = r.solved_spread {
            writeln!(out, "Solved spread   {} bp", bp(solved))?;
        }
        if let Some(basis) = &self.basis {
            writeln!(
                out,
                "Basis           {:.2} bp (market {} bp, model {} bp)",
                basis.basis_bp(),
                bp(basis.market_spread),
                bp(basis.model_spread)
            )?;
        }
        if !self.buckets.is_empty() {
            writeln!(out)?;
            writeln!(out, "{:<8}{:>8}{:>12}{:>14}", "Rating", "Names", "Weight", "Fair (bp)")?;
            for b in &self.buckets {
                writeln!(
                    out,
                    "{:<8}{:>8}{:>12.4}{:>14}",
                    b.rating.as_str(),
                    b.count,
                    b.total_weight,
                    bp(b.fair_spread)
                )?;
            }
        }
        if !r.exclusions.is_empty() {
            writeln!(out)?;
            writeln!(out, "Excluded names:")?;
            for e in &r.exclusions {
                writeln!(out, "  {:<24} {}", e.name, e.reason)?;
            }
        }
        Ok(())
    }
}

/// Build the report from loaded rows
pub fn report(
    args: &IndexArgs,
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

    let aggregator = IndexAggregator::new(&params, &table).with_weighting(weighting);
    let result = aggregator.replicate_from_ratings(rows)?;
    let buckets = if args.by_rating {
        aggregator.spreads_by_rating(rows)?
    } else {
        Vec::new()
    };
    let basis = args
        .market_spread_bp
        .map(|market| IndexBasis::new(market / 10_000.0, result.index_flat_spread));

    Ok(IndexReport {
        mode: "ratings",
        weighting,
        coupon: params.coupon(),
        result,
        buckets,
        basis,
    })
}

/// Run the index command
pub fn run(
    args: &IndexArgs,
    config: &EngineConfig,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    let rows = load_constituents(&args.input, config.aggregation.spread_unit)?;
    let report = report(args, config, &rows)?;
    info!(
        included = report.result.included,
        excluded = report.result.excluded,
        index_flat_spread = report.result.index_flat_spread,
        "index replication complete"
    );
    emit(&report, format, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn args() -> IndexArgs {
        IndexArgs {
            input: PathBuf::from("unused.csv"),
            equal_weight: false,
            market_spread_bp: None,
            by_rating: false,
        }
    }

    fn rows() -> Vec<IndexConstituent> {
        vec![
            IndexConstituent::new("Alpha").with_rating("BBB").with_weight(0.6),
            IndexConstituent::new("Beta").with_rating("BB+").with_weight(0.4),
            IndexConstituent::new("Gamma").with_rating("NR").with_weight(1.0),
        ]
    }

    #[test]
    fn test_weighted_replication() {
        let report = report(&args(), &EngineConfig::default(), &rows()).unwrap();

        // Flat index spread equals the weighted fair spread.
        let expected = 0.6 * 0.0019158133679614362 + 0.4 * 0.00811030646353855;
        assert_relative_eq!(report.result.index_flat_spread, expected, max_relative = 1e-9);
        assert_eq!(report.result.included, 2);
        assert_eq!(report.result.excluded, 1);
        assert!(report.buckets.is_empty());
    }

    #[test]
    fn test_equal_weight_flag_and_extras() {
        let mut args = args();
        args.equal_weight = true;
        args.by_rating = true;
        args.market_spread_bp = Some(60.0);

        let report = report(&args, &EngineConfig::default(), &rows()).unwrap();
        let expected = 0.5 * (0.0019158133679614362 + 0.00811030646353855);
        assert_eq!(report.weighting, Weighting::Equal);
        assert_relative_eq!(report.result.index_flat_spread, expected, max_relative = 1e-9);
        assert_eq!(report.buckets.len(), 2);

        let basis = report.basis.unwrap();
        assert_relative_eq!(basis.basis, 0.006 - expected, max_relative = 1e-9);
    }

    #[test]
    fn test_table_lists_exclusions() {
        let report = report(&args(), &EngineConfig::default(), &rows()).unwrap();
        let mut buffer = Vec::new();
        emit(&report, OutputFormat::Table, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("Gamma"));
        assert!(text.contains("unknown rating 'NR'"));
    }
}
