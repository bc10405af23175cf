//! Credit portfolio construction.
//!
//! A [`Portfolio`] is an ordered list of names with a coarse rating, a
//! cumulative default probability at the risk horizon and a normalised
//! weight. Raw weights may be on any positive scale (notional, index
//! percentage); they are rescaled to sum to one.
//!
//! # Example
//!
//! ```
//! use pricer_core::market_data::DefaultProbabilityTable;
//! use pricer_models::instruments::credit::IndexConstituent;
//! use pricer_risk::portfolio::build_portfolio;
//!
//! let table = DefaultProbabilityTable::standard();
//! let rows = vec![
//!     IndexConstituent::new("Alpha").with_rating("BBB").with_weight(60.0),
//!     IndexConstituent::new("Beta").with_rating("BB").with_weight(40.0),
//!     IndexConstituent::new("Gamma").with_rating("n/a").with_weight(10.0),
//! ];
//!
//! let portfolio = build_portfolio(&rows, &table, 5).unwrap();
//! assert_eq!(portfolio.len(), 2);
//! assert_eq!(portfolio.excluded(), 1);
//! assert!((portfolio.entries()[0].weight - 0.6).abs() < 1e-12);
//! ```

use pricer_core::market_data::{normalize_rating, CreditRating, DefaultProbabilityTable, MarketDataError};
use pricer_models::instruments::credit::{Exclusion, ExclusionReason, IndexConstituent};
use pricer_models::instruments::CreditError;
use tracing::{debug, warn};

use crate::error::RiskError;

/// One name in a credit portfolio.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortfolioEntry {
    /// Reference entity name.
    pub name: String,
    /// Coarse rating.
    pub rating: CreditRating,
    /// Cumulative default probability at the horizon, in [0, 1).
    pub default_probability: f64,
    /// Normalised weight.
    pub weight: f64,
}

/// Immutable credit portfolio with normalised weights.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Portfolio {
    entries: Vec<PortfolioEntry>,
    exclusions: Vec<Exclusion>,
}

impl Portfolio {
    /// Build a portfolio from entries carrying raw weights.
    ///
    /// Weights are rescaled to sum to one.
    ///
    /// # Errors
    ///
    /// - `RiskError::MarketData(InvalidDefaultProbability)` if a PD is outside [0, 1)
    /// - `RiskError::MarketData(InvalidParameter)` if a weight is negative or not finite
    /// - `RiskError::Credit(DegenerateAggregation)` if there are no entries or the
    ///   weights sum to zero
    pub fn new(entries: Vec<PortfolioEntry>) -> Result<Self, RiskError> {
        Self::with_exclusions(entries, Vec::new())
    }

    fn with_exclusions(
        mut entries: Vec<PortfolioEntry>,
        exclusions: Vec<Exclusion>,
    ) -> Result<Self, RiskError> {
        for entry in &entries {
            let q = entry.default_probability;
            if !(0.0..1.0).contains(&q) {
                return Err(MarketDataError::InvalidDefaultProbability { q }.into());
            }
            if !(entry.weight.is_finite() && entry.weight >= 0.0) {
                return Err(MarketDataError::InvalidParameter {
                    name: "weight",
                    value: entry.weight,
                }
                .into());
            }
        }

        let total: f64 = entries.iter().map(|e| e.weight).sum();
        if entries.is_empty() || !(total > 0.0) {
            return Err(CreditError::DegenerateAggregation {
                excluded: exclusions.len(),
            }
            .into());
        }

        for entry in &mut entries {
            entry.weight /= total;
        }

        Ok(Self {
            entries,
            exclusions,
        })
    }

    /// Included names, in input order.
    #[inline]
    pub fn entries(&self) -> &[PortfolioEntry] {
        &self.entries
    }

    /// Excluded rows, in input order.
    #[inline]
    pub fn exclusions(&self) -> &[Exclusion] {
        &self.exclusions
    }

    /// Number of included names.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a constructed portfolio.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of excluded rows.
    #[inline]
    pub fn excluded(&self) -> usize {
        self.exclusions.len()
    }

    /// Unconditional expected loss fraction, `(1 - R) Σ wᵢ Qᵢ`.
    ///
    /// # Errors
    ///
    /// `MarketDataError::InvalidParameter` unless `0 <= recovery <= 1`.
    pub fn expected_loss(&self, recovery: f64) -> Result<f64, RiskError> {
        let lgd = 1.0 - validate_recovery(recovery)?;
        Ok(lgd
            * self
                .entries
                .iter()
                .map(|e| e.weight * e.default_probability)
                .sum::<f64>())
    }
}

/// Check that a recovery rate lies in [0, 1].
pub fn validate_recovery(recovery: f64) -> Result<f64, RiskError> {
    if (0.0..=1.0).contains(&recovery) {
        Ok(recovery)
    } else {
        Err(MarketDataError::InvalidParameter {
            name: "recovery",
            value: recovery,
        }
        .into())
    }
}

/// Build a portfolio from raw rows at a tabulated horizon.
///
/// Rows with a missing or unrecognised rating, or a missing, non-positive
/// or non-finite weight, are excluded and counted.
///
/// # Errors
///
/// - `RiskError::MarketData(UnknownHorizon)` if `horizon` is not tabulated
/// - `RiskError::Credit(DegenerateAggregation)` if every row is excluded
pub fn build_portfolio(
    rows: &[IndexConstituent],
    table: &DefaultProbabilityTable,
    horizon: u32,
) -> Result<Portfolio, RiskError> {
    // Fail on the horizon before screening any rows.
    table.lookup(CreditRating::AAA, horizon)?;

    let mut entries = Vec::with_capacity(rows.len());
    let mut exclusions = Vec::new();

    for row in rows {
        match screen(row) {
            Ok((rating, weight)) => {
                let default_probability = table.lookup(rating, horizon)?;
                entries.push(PortfolioEntry {
                    name: row.name.clone(),
                    rating,
                    default_probability,
                    weight,
                });
            }
            Err(reason) => {
                warn!(name = %row.name, %reason, "portfolio row excluded");
                exclusions.push(Exclusion {
                    name: row.name.clone(),
                    reason,
                });
            }
        }
    }

    debug!(
        included = entries.len(),
        excluded = exclusions.len(),
        horizon,
        "portfolio built"
    );

    Portfolio::with_exclusions(entries, exclusions)
}

fn screen(row: &IndexConstituent) -> Result<(CreditRating, f64), ExclusionReason> {
    let raw = row
        .rating
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or(ExclusionReason::MissingRating)?;
    let rating =
        normalize_rating(raw).ok_or_else(|| ExclusionReason::UnknownRating(raw.to_string()))?;
    let weight = row.weight.ok_or(ExclusionReason::MissingWeight)?;
    if !(weight.is_finite() && weight > 0.0) {
        return Err(ExclusionReason::InvalidWeight(weight));
    }
    Ok((rating, weight))
}
