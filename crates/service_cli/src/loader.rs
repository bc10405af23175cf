//! Constituent loading from CSV and JSON.
//!
//! Column lookup is case-insensitive. The rating is the first non-empty
//! value among [`RATING_COLUMNS`], in order. Weights come from `Wgt` or
//! `weight`, spreads from `cds_flat_spread` or `spread`, names from `name`
//! or `ticker`. Empty cells and `nan` are treated as missing; unparseable
//! numbers become NaN so the aggregator excludes the row with a reason.
//!
//! JSON input is either an array of records or an object holding the
//! array under `Data`.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use pricer_models::instruments::credit::IndexConstituent;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::SpreadUnit;
use crate::error::{CliError, Result};

/// Rating columns in priority order.
pub const RATING_COLUMNS: [&str; 4] = [
    "RATING",
    "RTG_SP_LT_LC_ISSUER_CREDIT",
    "RTG_MOODY_LONG_TERM",
    "RTG_EGAN_JONES_LOCAL_SR_UNSEC",
];

const NAME_COLUMNS: [&str; 3] = ["name", "ticker", "issuer"];
const WEIGHT_COLUMNS: [&str; 2] = ["wgt", "weight"];
const SPREAD_COLUMNS: [&str; 2] = ["cds_flat_spread", "spread"];

/// Input file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    /// Infer the format from the file extension; anything but `.json` is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => InputFormat::Json,
            _ => InputFormat::Csv,
        }
    }
}

/// Load constituents from a file.
pub fn load_constituents(path: &Path, unit: SpreadUnit) -> Result<Vec<IndexConstituent>> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }
    let source_name = path.display().to_string();
    let reader = BufReader::new(File::open(path)?);

    let rows = match InputFormat::from_path(path) {
        InputFormat::Csv => read_csv(reader, &source_name, unit)?,
        InputFormat::Json => read_json(reader, &source_name, unit)?,
    };

    info!(source = %source_name, rows = rows.len(), "constituents loaded");
    Ok(rows)
}

/// Read constituents from CSV with a header row.
pub fn read_csv<R: Read>(
    reader: R,
    source_name: &str,
    unit: SpreadUnit,
) -> Result<Vec<IndexConstituent>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
    let columns = ColumnMap::resolve(&headers);
    if columns.is_empty() {
        return Err(CliError::Input {
            source_name: source_name.to_string(),
            message: "no rating, weight or spread column found".to_string(),
        });
    }
    debug!(source = source_name, ?columns, "csv columns resolved");

    let mut rows = Vec::new();
    for (i, record) in csv_reader.records().enumerate() {
        let record = record?;
        let cell = |idx: usize| record.get(idx).and_then(clean_text);
        rows.push(columns.build(i, cell, unit));
    }
    Ok(rows)
}

/// Read constituents from JSON.
pub fn read_json<R: Read>(
    reader: R,
    source_name: &str,
    unit: SpreadUnit,
) -> Result<Vec<IndexConstituent>> {
    let value: Value = serde_json::from_reader(reader)?;
    let records = match &value {
        Value::Array(items) => items,
        Value::Object(map) => match find_key(map.keys().map(String::as_str), &["data"])
            .and_then(|key| map.get(key))
        {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(CliError::Input {
                    source_name: source_name.to_string(),
                    message: "expected an array of records or a \"Data\" array".to_string(),
                })
            }
        },
        _ => {
            return Err(CliError::Input {
                source_name: source_name.to_string(),
                message: "expected an array of records".to_string(),
            })
        }
    };

    let mut rows = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let Value::Object(map) = record else {
            return Err(CliError::Input {
                source_name: source_name.to_string(),
                message: format!("record {} is not an object", i + 1),
            });
        };
        let keys: Vec<String> = map.keys().cloned().collect();
        let columns = ColumnMap::resolve(&keys);
        let cell = |idx: usize| map.get(&keys[idx]).and_then(json_text);
        rows.push(columns.build(i, cell, unit));
    }
    Ok(rows)
}

/// Column positions resolved from a header.
#[derive(Debug, Default)]
struct ColumnMap {
    name: Option<usize>,
    ratings: Vec<usize>,
    weight: Option<usize>,
    spread: Option<usize>,
}

impl ColumnMap {
    fn resolve(headers: &[String]) -> Self {
        let position = |candidates: &[&str]| {
            candidates.iter().find_map(|c| {
                headers
                    .iter()
                    .position(|h| h.trim().eq_ignore_ascii_case(c))
            })
        };
        Self {
            name: position(&NAME_COLUMNS),
            ratings: RATING_COLUMNS
                .iter()
                .filter_map(|c| position(&[c]))
                .collect(),
            weight: position(&WEIGHT_COLUMNS),
            spread: position(&SPREAD_COLUMNS),
        }
    }

    fn is_empty(&self) -> bool {
        self.ratings.is_empty() && self.weight.is_none() && self.spread.is_none()
    }

    fn build<F>(&self, row: usize, cell: F, unit: SpreadUnit) -> IndexConstituent
    where
        F: Fn(usize) -> Option<String>,
    {
        let name = self
            .name
            .and_then(&cell)
            .unwrap_or_else(|| format!("row {}", row + 1));

        let mut constituent = IndexConstituent::new(name);
        if let Some(rating) = self.ratings.iter().find_map(|&idx| cell(idx)) {
            constituent = constituent.with_rating(rating);
        }
        if let Some(weight) = self.weight.and_then(&cell) {
            constituent = constituent.with_weight(parse_number(&weight));
        }
        if let Some(spread) = self.spread.and_then(&cell) {
            constituent = constituent.with_market_spread(unit.to_decimal(parse_number(&spread)));
        }
        constituent
    }
}

fn find_key<'a, I>(keys: I, candidates: &[&str]) -> Option<&'a str>
where
    I: Iterator<Item = &'a str> + Clone,
{
    candidates
        .iter()
        .find_map(|c| keys.clone().find(|k| k.eq_ignore_ascii_case(c)))
}

fn clean_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => clean_text(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_number(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(f64::NAN)
}
