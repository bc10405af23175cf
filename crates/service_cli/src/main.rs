//! cdsrisk - Command Line Operations for Rating-Implied CDS Pricing
//!
//! This is the operational entry point for the credit pricing and
//! portfolio risk libraries.
//!
//! # Commands
//!
//! - `cdsrisk spread --rating BBB` - Value a single-name CDS
//! - `cdsrisk index --input <file>` - Replicate an index from constituent ratings
//! - `cdsrisk calibrate --input <file> | --price <p>` - Invert quoted prices to a flat spread
//! - `cdsrisk risk --input <file>` - Copula loss statistics across correlations
//! - `cdsrisk stress --input <file>` - Stressed index spreads
//!
//! # Configuration
//!
//! Settings come from `--config` (or `cdsrisk.toml` in the working
//! directory), then `CDS_*` environment variables, then command flags
//! such as `--spread-unit`.
//! Logs go to stderr; `RUST_LOG` overrides the configured level.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod loader;
mod output;

pub use error::{CliError, Result};

use commands::{
    calibrate::CalibrateArgs, index::IndexArgs, risk::RiskArgs, spread::SpreadArgs,
    stress::StressArgs,
};
use config::{build_config, LogLevel, SpreadUnit};
use output::OutputFormat;

/// Rating-implied CDS pricing and credit portfolio risk
#[derive(Parser)]
#[command(name = "cdsrisk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Unit of spread columns in input files (decimal or bp)
    #[arg(long, global = true)]
    spread_unit: Option<SpreadUnit>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Value a single-name CDS from a rating or default probability
    Spread(SpreadArgs),

    /// Replicate an index spread from constituent ratings
    Index(IndexArgs),

    /// Calibrate a flat spread from a quoted price or constituent quotes
    Calibrate(CalibrateArgs),

    /// Simulate copula loss statistics
    Risk(RiskArgs),

    /// Price stressed index spreads
    Stress(StressArgs),
}

fn init_tracing(level: LogLevel, verbose: bool) {
    let default_level = if verbose {
        LogLevel::Debug
    } else {
        level
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = build_config(cli.config.as_deref())?;
    if let Some(unit) = cli.spread_unit {
        config.aggregation.spread_unit = unit;
    }
    init_tracing(config.logging.level, cli.verbose);

    info!("Configuration loaded");
    debug!(?config, "effective configuration");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Commands::Spread(args) => commands::spread::run(args, &config, cli.format, &mut out),
        Commands::Index(args) => commands::index::run(args, &config, cli.format, &mut out),
        Commands::Calibrate(args) => commands::calibrate::run(args, &config, cli.format, &mut out),
        Commands::Risk(args) => commands::risk::run(args, &config, cli.format, &mut out),
        Commands::Stress(args) => commands::stress::run(args, &config, cli.format, &mut out),
    }?;

    out.flush()?;
    Ok(())
}
