//! Report rendering as aligned text tables or JSON.

use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::Result;

/// Output format for command reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

/// A report that can be written as a text table.
pub trait TableReport {
    /// Write the table form of the report.
    fn write_table(&self, out: &mut dyn Write) -> std::io::Result<()>;
}

/// Write a report in the requested format.
pub fn emit<R>(report: &R, format: OutputFormat, out: &mut dyn Write) -> Result<()>
where
    R: Serialize + TableReport,
{
    match format {
        OutputFormat::Table => report.write_table(out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Decimal spread in basis points, two decimals.
pub fn bp(spread: f64) -> String {
    format!("{:.2}", spread * 10_000.0)
}
