//! Index aggregation from constituents.
//!
//! Two aggregation modes build an index-level spread from its components:
//!
//! - **Ratings replication** ([`IndexAggregator::replicate_from_ratings`]):
//!   each name's rating implies a default probability, hazard rate, fair
//!   spread and bond-equivalent spread. The bond-equivalent spreads are
//!   averaged and mapped back with `index_flat = 2 × coupon - index_be`.
//! - **Market-quote calibration** ([`IndexAggregator::calibrate_from_quotes`]):
//!   each name's observed flat spread is converted to a quoted price, the
//!   prices are averaged and the average is inverted to a single flat spread.
//!
//! Names with a missing or malformed rating, weight or spread are excluded
//! and counted; the averages run over included names only. Contract and
//! horizon errors are not per-name and propagate.
//!
//! # Example
//!
//! ```
//! use pricer_core::market_data::DefaultProbabilityTable;
//! use pricer_models::instruments::credit::{
//!     ContractParameters, IndexAggregator, IndexConstituent,
//! };
//!
//! let params = ContractParameters::<f64>::builder().build().unwrap();
//! let table = DefaultProbabilityTable::standard();
//! let aggregator = IndexAggregator::new(&params, &table);
//!
//! let rows = vec![
//!     IndexConstituent::new("Alpha").with_rating("BBB+").with_weight(0.6),
//!     IndexConstituent::new("Beta").with_rating("BB").with_weight(0.4),
//!     IndexConstituent::new("Gamma").with_rating("NR").with_weight(1.0),
//! ];
//!
//! let result = aggregator.replicate_from_ratings(&rows).unwrap();
//! assert_eq!(result.included, 2);
//! assert_eq!(result.excluded, 1);
//! assert!(result.solved_spread.is_none());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use pricer_core::market_data::ratings::horizon_from_maturity;
use pricer_core::market_data::{normalize_rating, CreditRating, DefaultProbabilityTable};
use pricer_core::math::solvers::SolverConfig;
use tracing::{info, warn};

use super::cds::ContractParameters;
use super::pricing::value_from_default_probability;
use crate::calibration::SpreadCalibrator;
use crate::instruments::error::CreditError;

/// One row of an index composition.
///
/// Every field other than the name is optional; which ones are required
/// depends on the aggregation mode and weighting.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexConstituent {
    /// Reference entity name.
    pub name: String,
    /// Raw agency rating, e.g. `"BBB-"`.
    pub rating: Option<String>,
    /// Raw weight (any positive scale, e.g. notional or index weight in %).
    pub weight: Option<f64>,
    /// Observed flat spread in decimal.
    pub market_spread: Option<f64>,
}

impl IndexConstituent {
    /// Create a constituent with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the raw rating.
    pub fn with_rating(mut self, rating: impl Into<String>) -> Self {
        self.rating = Some(rating.into());
        self
    }

    /// Set the raw weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Set the observed flat spread (decimal).
    pub fn with_market_spread(mut self, spread: f64) -> Self {
        self.market_spread = Some(spread);
        self
    }
}

/// How constituent measures are averaged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Weighting {
    /// Weighted average `Σ wᵢ xᵢ / Σ wᵢ`; names without a valid weight are excluded.
    #[default]
    Weighted,
    /// Simple mean; weights are ignored.
    Equal,
}

impl fmt::Display for Weighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weighting::Weighted => write!(f, "weighted"),
            Weighting::Equal => write!(f, "equal"),
        }
    }
}

/// Why a constituent was left out of an aggregate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExclusionReason {
    /// No rating supplied.
    MissingRating,
    /// Rating did not normalise to a coarse grade.
    UnknownRating(String),
    /// Weighted mode and no weight supplied.
    MissingWeight,
    /// Weight not finite or not positive.
    InvalidWeight(f64),
    /// Market mode and no spread supplied.
    MissingSpread,
    /// Spread not finite or negative.
    InvalidSpread(f64),
    /// Spread outside the calibration bracket, so its price cannot be inverted.
    SpreadOutsideBracket {
        /// Quoted spread
        spread: f64,
        /// Lower bracket end
        low: f64,
        /// Upper bracket end
        high: f64,
    },
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::MissingRating => write!(f, "missing rating"),
            ExclusionReason::UnknownRating(raw) => write!(f, "unknown rating '{}'", raw),
            ExclusionReason::MissingWeight => write!(f, "missing weight"),
            ExclusionReason::InvalidWeight(w) => write!(f, "invalid weight {}", w),
            ExclusionReason::MissingSpread => write!(f, "missing spread"),
            ExclusionReason::InvalidSpread(s) => write!(f, "invalid spread {}", s),
            ExclusionReason::SpreadOutsideBracket { spread, low, high } => {
                write!(f, "spread {} outside [{}, {}]", spread, low, high)
            }
        }
    }
}

/// A constituent left out of an aggregate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Exclusion {
    /// Constituent name.
    pub name: String,
    /// Reason for exclusion.
    pub reason: ExclusionReason,
}

/// Per-name measures that entered an aggregate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstituentValuation {
    /// Constituent name.
    pub name: String,
    /// Coarse rating (ratings mode, or when supplied alongside a quote).
    pub rating: Option<CreditRating>,
    /// Weight used in the average (1 under equal weighting).
    pub weight: f64,
    /// Hazard rate: bootstrapped from the rating, or `s / (1 - R)` for quotes.
    pub hazard_rate: f64,
    /// Fair spread (ratings mode) or observed spread (market mode).
    pub flat_spread: f64,
    /// Bond-equivalent spread.
    pub bond_equivalent_spread: f64,
    /// Price per 100 notional.
    pub price: f64,
}

/// Index-level aggregation output.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexResult {
    /// Average bond-equivalent spread.
    pub index_be_spread: f64,
    /// Index flat (par) spread.
    pub index_flat_spread: f64,
    /// Average price per 100 notional.
    pub index_price: f64,
    /// Calibrated flat spread (market-quote mode only).
    pub solved_spread: Option<f64>,
    /// Number of constituents in the aggregate.
    pub included: usize,
    /// Number of constituents excluded.
    pub excluded: usize,
    /// Included constituents, in input order.
    pub constituents: Vec<ConstituentValuation>,
    /// Excluded constituents, in input order.
    pub exclusions: Vec<Exclusion>,
}

/// Weighted-average fair spread of one rating bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatingBucket {
    /// Coarse rating.
    pub rating: CreditRating,
    /// Number of names in the bucket.
    pub count: usize,
    /// Total weight of the bucket.
    pub total_weight: f64,
    /// Weighted-average fair spread.
    pub fair_spread: f64,
}

/// Market minus model spread basis.
///
/// # Examples
///
/// ```
/// use pricer_models::instruments::credit::IndexBasis;
///
/// let basis = IndexBasis::new(0.0065, 0.0050);
/// assert!((basis.basis_bp() - 15.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexBasis {
    /// Observed index spread (decimal).
    pub market_spread: f64,
    /// Model index spread (decimal).
    pub model_spread: f64,
    /// `market - model` (decimal).
    pub basis: f64,
}

impl IndexBasis {
    /// Compute the basis between a market and a model spread.
    pub fn new(market_spread: f64, model_spread: f64) -> Self {
        Self {
            market_spread,
            model_spread,
            basis: market_spread - model_spread,
        }
    }

    /// Basis in basis points.
    #[inline]
    pub fn basis_bp(&self) -> f64 {
        self.basis * 10_000.0
    }

    /// Basis relative to the model spread, or `None` if the model spread is zero.
    pub fn relative(&self) -> Option<f64> {
        if self.model_spread == 0.0 {
            None
        } else {
            Some(self.basis / self.model_spread)
        }
    }
}

/// Aggregates constituent measures into index spreads.
#[derive(Debug, Clone)]
pub struct IndexAggregator<'a> {
    params: &'a ContractParameters<f64>,
    table: &'a DefaultProbabilityTable,
    weighting: Weighting,
    solver_config: SolverConfig<f64>,
}

impl<'a> IndexAggregator<'a> {
    /// Create an aggregator with weighted averaging and the default solver.
    ///
    /// # Arguments
    ///
    /// * `params` - Contract parameters (maturity must be a tabulated horizon
    ///   for ratings replication)
    /// * `table` - Default-probability table
    pub fn new(params: &'a ContractParameters<f64>, table: &'a DefaultProbabilityTable) -> Self {
        Self {
            params,
            table,
            weighting: Weighting::default(),
            solver_config: SolverConfig::default(),
        }
    }

    /// Set the weighting scheme.
    pub fn with_weighting(mut self, weighting: Weighting) -> Self {
        self.weighting = weighting;
        self
    }

    /// Set the solver configuration used by market-quote calibration.
    pub fn with_solver_config(mut self, config: SolverConfig<f64>) -> Self {
        self.solver_config = config;
        self
    }

    /// Weighting scheme in use.
    pub fn weighting(&self) -> Weighting {
        self.weighting
    }

    /// Replicate the index from constituent ratings.
    ///
    /// # Returns
    ///
    /// * `Ok(IndexResult)` - `solved_spread` is `None`
    /// * `Err(CreditError::DegenerateAggregation)` - Every name was excluded
    /// * `Err(CreditError::MarketData)` - Maturity is not a tabulated horizon
    pub fn replicate_from_ratings(
        &self,
        rows: &[IndexConstituent],
    ) -> Result<IndexResult, CreditError> {
        let horizon = horizon_from_maturity(self.params.maturity())?;

        let mut constituents = Vec::with_capacity(rows.len());
        let mut exclusions = Vec::new();

        for row in rows {
            let (rating, weight) = match self.screen_rating(row).and_then(|rating| {
                self.screen_weight(row).map(|weight| (rating, weight))
            }) {
                Ok(screened) => screened,
                Err(reason) => {
                    exclude(&mut exclusions, row, reason);
                    continue;
                }
            };

            let q = self.table.lookup(rating, horizon)?;
            let valuation = value_from_default_probability(self.params, q)?;
            constituents.push(ConstituentValuation {
                name: row.name.clone(),
                rating: Some(rating),
                weight,
                hazard_rate: valuation.hazard_rate,
                flat_spread: valuation.fair_spread,
                bond_equivalent_spread: valuation.bond_equivalent_spread,
                price: valuation.clean_price,
            });
        }

        if constituents.is_empty() {
            return Err(CreditError::DegenerateAggregation {
                excluded: exclusions.len(),
            });
        }

        let index_be_spread = weighted_mean(&constituents, |c| c.bond_equivalent_spread);
        let index_price = weighted_mean(&constituents, |c| c.price);
        let index_flat_spread = 2.0 * self.params.coupon() - index_be_spread;

        info!(
            included = constituents.len(),
            excluded = exclusions.len(),
            weighting = %self.weighting,
            index_flat_spread,
            "ratings replication complete"
        );

        Ok(IndexResult {
            index_be_spread,
            index_flat_spread,
            index_price,
            solved_spread: None,
            included: constituents.len(),
            excluded: exclusions.len(),
            constituents,
            exclusions,
        })
    }

    /// Calibrate the index from observed constituent spreads.
    ///
    /// Quotes outside the calibrator's spread bracket are excluded with
    /// [`ExclusionReason::SpreadOutsideBracket`], so the averaged price is
    /// always attainable.
    ///
    /// # Returns
    ///
    /// * `Ok(IndexResult)` - `index_flat_spread` equals `solved_spread`
    /// * `Err(CreditError::DegenerateAggregation)` - Every name was excluded
    /// * `Err(CreditError::Calibration)` - Inversion of the average price failed
    pub fn calibrate_from_quotes(
        &self,
        rows: &[IndexConstituent],
    ) -> Result<IndexResult, CreditError> {
        let calibrator = SpreadCalibrator::new(self.params).with_config(self.solver_config);
        let coupon = self.params.coupon();
        let bracket = calibrator.bracket();

        let mut constituents = Vec::with_capacity(rows.len());
        let mut exclusions = Vec::new();

        for row in rows {
            let (spread, weight) = match self.screen_spread(row, bracket).and_then(|spread| {
                self.screen_weight(row).map(|weight| (spread, weight))
            }) {
                Ok(screened) => screened,
                Err(reason) => {
                    exclude(&mut exclusions, row, reason);
                    continue;
                }
            };

            let hazard_rate = calibrator.implied_hazard(spread)?;
            let price = calibrator.quoted_price(spread)?;
            constituents.push(ConstituentValuation {
                name: row.name.clone(),
                rating: row.rating.as_deref().and_then(normalize_rating),
                weight,
                hazard_rate,
                flat_spread: spread,
                bond_equivalent_spread: 2.0 * coupon - spread,
                price,
            });
        }

        if constituents.is_empty() {
            return Err(CreditError::DegenerateAggregation {
                excluded: exclusions.len(),
            });
        }

        // Every included price lies inside the bracket's price range; the
        // clamp only absorbs rounding in the average.
        let (price_high, price_low) = (
            calibrator.quoted_price(bracket.1)?,
            calibrator.quoted_price(bracket.0)?,
        );
        let index_price = weighted_mean(&constituents, |c| c.price)
            .clamp(price_high.min(price_low), price_high.max(price_low));
        let calibration = calibrator.calibrate(index_price)?;
        let solved = calibration.solved_spread;

        info!(
            included = constituents.len(),
            excluded = exclusions.len(),
            weighting = %self.weighting,
            index_price,
            solved_spread = solved,
            iterations = calibration.iterations,
            "market-quote calibration complete"
        );

        Ok(IndexResult {
            index_be_spread: 2.0 * coupon - solved,
            index_flat_spread: solved,
            index_price,
            solved_spread: Some(solved),
            included: constituents.len(),
            excluded: exclusions.len(),
            constituents,
            exclusions,
        })
    }

    /// Weighted-average fair spread per coarse rating, best rating first.
    ///
    /// Names are screened as in ratings replication; under equal weighting
    /// every name counts once.
    pub fn spreads_by_rating(
        &self,
        rows: &[IndexConstituent],
    ) -> Result<Vec<RatingBucket>, CreditError> {
        let horizon = horizon_from_maturity(self.params.maturity())?;
        let mut buckets: BTreeMap<CreditRating, (usize, f64, f64)> = BTreeMap::new();

        for row in rows {
            let Ok(rating) = self.screen_rating(row) else {
                continue;
            };
            let Ok(weight) = self.screen_weight(row) else {
                continue;
            };
            let q = self.table.lookup(rating, horizon)?;
            let fair = value_from_default_probability(self.params, q)?.fair_spread;

            let entry = buckets.entry(rating).or_insert((0, 0.0, 0.0));
            entry.0 += 1;
            entry.1 += weight;
            entry.2 += weight * fair;
        }

        Ok(buckets
            .into_iter()
            .map(|(rating, (count, total_weight, weighted_sum))| RatingBucket {
                rating,
                count,
                total_weight,
                fair_spread: weighted_sum / total_weight,
            })
            .collect())
    }

    fn screen_rating(&self, row: &IndexConstituent) -> Result<CreditRating, ExclusionReason> {
        let raw = row
            .rating
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or(ExclusionReason::MissingRating)?;
        normalize_rating(raw).ok_or_else(|| ExclusionReason::UnknownRating(raw.to_string()))
    }

    fn screen_weight(&self, row: &IndexConstituent) -> Result<f64, ExclusionReason> {
        match self.weighting {
            Weighting::Equal => Ok(1.0),
            Weighting::Weighted => {
                let w = row.weight.ok_or(ExclusionReason::MissingWeight)?;
                if w.is_finite() && w > 0.0 {
                    Ok(w)
                } else {
                    Err(ExclusionReason::InvalidWeight(w))
                }
            }
        }
    }

    fn screen_spread(
        &self,
        row: &IndexConstituent,
        (low, high): (f64, f64),
    ) -> Result<f64, ExclusionReason> {
        let s = row.market_spread.ok_or(ExclusionReason::MissingSpread)?;
        if !(s.is_finite() && s >= 0.0) {
            return Err(ExclusionReason::InvalidSpread(s));
        }
        if s < low || s > high {
            return Err(ExclusionReason::SpreadOutsideBracket { spread: s, low, high });
        }
        Ok(s)
    }
}

fn exclude(exclusions: &mut Vec<Exclusion>, row: &IndexConstituent, reason: ExclusionReason) {
    warn!(name = %row.name, %reason, "constituent excluded");
    exclusions.push(Exclusion {
        name: row.name.clone(),
        reason,
    });
}

fn weighted_mean<F>(constituents: &[ConstituentValuation], value: F) -> f64
where
    F: Fn(&ConstituentValuation) -> f64,
{
    let total_weight: f64 = constituents.iter().map(|c| c.weight).sum();
    constituents
        .iter()
        .map(|c| c.weight * value(c))
        .sum::<f64>()
        / total_weight
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pricer_core::market_data::MarketDataError;

    fn standard_params() -> ContractParameters<f64> {
        ContractParameters::builder().build().unwrap()
    }

    fn fair_for(params: &ContractParameters<f64>, rating: CreditRating) -> f64 {
        let q = DefaultProbabilityTable::standard().lookup(rating, 5).unwrap();
        value_from_default_probability(params, q).unwrap().fair_spread
    }

    // ========================================
    // Ratings Replication
    // ========================================

    #[test]
    fn test_single_name_index_equals_name() {
        let params = standard_params();
        let table = DefaultProbabilityTable::standard();
        let aggregator = IndexAggregator::new(&params, &table);

        let rows = vec![IndexConstituent::new("Alpha").with_rating("BBB").with_weight(2.5)];
        let result = aggregator.replicate_from_ratings(&rows).unwrap();

        assert_relative_eq!(
            result.index_flat_spread,
            0.0019158133679614362,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            result.index_be_spread,
            0.018084186632038562,
            max_relative = 1e-9
        );
        assert_relative_eq!(result.index_price, 103.80706366246493, max_relative = 1e-10);
        assert_eq!(result.included, 1);
        assert_eq!(result.excluded, 0);
    }

    #[test]
    fn test_index_flat_is_weighted_fair_spread() {
        let params = standard_params();
        let table = DefaultProbabilityTable::standard();
        let aggregator = IndexAggregator::new(&params, &table);

        let rows = vec![
            IndexConstituent::new("Alpha").with_rating("BBB").with_weight(60.0),
            IndexConstituent::new("Beta").with_rating("BB-").with_weight(40.0),
        ];
        let result = aggregator.replicate_from_ratings(&rows).unwrap();

        let expected = 0.6 * fair_for(&params, CreditRating::BBB)
            + 0.4 * fair_for(&params, CreditRating::BB);
        assert_relative_eq!(result.index_flat_spread, expected, max_relative = 1e-12);
        assert_relative_eq!(
            result.index_flat_spread,
            2.0 * params.coupon() - result.index_be_spread,
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_equal_weighting_ignores_weights() {
        let params = standard_params();
        let table = DefaultProbabilityTable::standard();
        let aggregator = IndexAggregator::new(&params, &table).with_weighting(Weighting::Equal);

        let rows = vec![
            IndexConstituent::new("Alpha").with_rating("A"),
            IndexConstituent::new("Beta").with_rating("B").with_weight(1e6),
        ];
        let result = aggregator.replicate_from_ratings(&rows).unwrap();

        let expected =
            0.5 * (fair_for(&params, CreditRating::A) + fair_for(&params, CreditRating::B));
        assert_relative_eq!(result.index_flat_spread, expected, max_relative = 1e-12);
        assert_eq!(result.included, 2);
    }

    #[test]
    fn test_exclusions_adjust_denominator() {
        let params = standard_params();
        let table = DefaultProbabilityTable::standard();
        let aggregator = IndexAggregator::new(&params, &table);

        let rows = vec![
            IndexConstituent::new("Alpha").with_rating("BBB").with_weight(1.0),
            IndexConstituent::new("NoRating").with_weight(1.0),
            IndexConstituent::new("Blank").with_rating("  ").with_weight(1.0),
            IndexConstituent::new("Junk").with_rating("XYZ").with_weight(1.0),
            IndexConstituent::new("NoWeight").with_rating("AA"),
            IndexConstituent::new("Negative").with_rating("AA").with_weight(-1.0),
        ];
        let result = aggregator.replicate_from_ratings(&rows).unwrap();

        assert_eq!(result.included, 1);
        assert_eq!(result.excluded, 5);
        assert_relative_eq!(
            result.index_flat_spread,
            fair_for(&params, CreditRating::BBB),
            max_relative = 1e-12
        );
        assert_eq!(result.exclusions[0].reason, ExclusionReason::MissingRating);
        assert_eq!(result.exclusions[1].reason, ExclusionReason::MissingRating);
        assert_eq!(
            result.exclusions[2].reason,
            ExclusionReason::UnknownRating("XYZ".to_string())
        );
        assert_eq!(result.exclusions[3].reason, ExclusionReason::MissingWeight);
        assert_eq!(result.exclusions[4].reason, ExclusionReason::InvalidWeight(-1.0));
    }

    #[test]
    fn test_all_excluded_is_degenerate() {
        let params = standard_params();
        let table = DefaultProbabilityTable::standard();
        let aggregator = IndexAggregator::new(&params, &table);

        let rows = vec![
            IndexConstituent::new("A").with_rating("WR").with_weight(1.0),
            IndexConstituent::new("B"),
        ];
        assert_eq!(
            aggregator.replicate_from_ratings(&rows),
            Err(CreditError::DegenerateAggregation { excluded: 2 })
        );
        assert_eq!(
            aggregator.replicate_from_ratings(&[]),
            Err(CreditError::DegenerateAggregation { excluded: 0 })
        );
    }

    #[test]
    fn test_untabulated_horizon_propagates() {
        let params = ContractParameters::<f64>::builder()
            .maturity(6.0)
            .build()
            .unwrap();
        let table = DefaultProbabilityTable::standard();
        let aggregator = IndexAggregator::new(&params, &table);

        let rows = vec![IndexConstituent::new("A").with_rating("BBB").with_weight(1.0)];
        assert_eq!(
            aggregator.replicate_from_ratings(&rows),
            Err(CreditError::MarketData(MarketDataError::UnknownHorizon {
                years: 6
            }))
        );
    }

    // ========================================
    // Market-Quote Calibration
    // ========================================

    #[test]
    fn test_uniform_quotes_recover_the_quote() {
        let params = standard_params();
        let table = DefaultProbabilityTable::standard();
        let aggregator = IndexAggregator::new(&params, &table);

        let rows: Vec<_> = (0..4)
            .map(|i| {
                IndexConstituent::new(format!("N{}", i))
                    .with_weight(1.0 + i as f64)
                    .with_market_spread(0.0125)
            })
            .collect();
        let result = aggregator.calibrate_from_quotes(&rows).unwrap();

        let solved = result.solved_spread.unwrap();
        assert_relative_eq!(solved, 0.0125, max_relative = 1e-7);
        assert_eq!(result.index_flat_spread, solved);
        assert_relative_eq!(
            result.index_be_spread,
            2.0 * params.coupon() - solved,
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_quoted_index_between_extremes() {
        let params = standard_params();
        let table = DefaultProbabilityTable::standard();
        let aggregator = IndexAggregator::new(&params, &table).with_weighting(Weighting::Equal);

        let rows = vec![
            IndexConstituent::new("Tight").with_market_spread(0.004),
            IndexConstituent::new("Wide").with_market_spread(0.030),
        ];
        let result = aggregator.calibrate_from_quotes(&rows).unwrap();
        let solved = result.solved_spread.unwrap();

        assert!(solved > 0.004 && solved < 0.030);
        let calibrator = SpreadCalibrator::new(&params);
        let expected_price = 0.5
            * (calibrator.quoted_price(0.004).unwrap() + calibrator.quoted_price(0.030).unwrap());
        assert_relative_eq!(result.index_price, expected_price, max_relative = 1e-12);
    }

    #[test]
    fn test_quote_exclusions() {
        let params = standard_params();
        let table = DefaultProbabilityTable::standard();
        let aggregator = IndexAggregator::new(&params, &table);

        let rows = vec![
            IndexConstituent::new("Good").with_weight(1.0).with_market_spread(0.01),
            IndexConstituent::new("NoQuote").with_weight(1.0),
            IndexConstituent::new("NaN").with_weight(1.0).with_market_spread(f64::NAN),
        ];
        let result = aggregator.calibrate_from_quotes(&rows).unwrap();

        assert_eq!(result.included, 1);
        assert_eq!(result.excluded, 2);
        assert_eq!(result.exclusions[0].reason, ExclusionReason::MissingSpread);
        assert!(matches!(
            result.exclusions[1].reason,
            ExclusionReason::InvalidSpread(_)
        ));
        assert_relative_eq!(result.solved_spread.unwrap(), 0.01, max_relative = 1e-7);
    }

    #[test]
    fn test_quotes_outside_bracket_excluded() {
        let params = standard_params();
        let table = DefaultProbabilityTable::standard();
        let aggregator = IndexAggregator::new(&params, &table);

        let rows = vec![
            IndexConstituent::new("Tight").with_weight(1.0).with_market_spread(0.00005),
            IndexConstituent::new("Zero").with_weight(1.0).with_market_spread(0.0),
            IndexConstituent::new("Wide").with_weight(1.0).with_market_spread(1.5),
            IndexConstituent::new("Inside").with_weight(1.0).with_market_spread(0.0002),
        ];
        let result = aggregator.calibrate_from_quotes(&rows).unwrap();

        assert_eq!(result.included, 1);
        assert_eq!(result.constituents[0].name, "Inside");
        assert_eq!(result.excluded, 3);
        assert_eq!(
            result.exclusions[0].reason,
            ExclusionReason::SpreadOutsideBracket { spread: 0.00005, low: 0.0001, high: 1.0 }
        );
        assert_relative_eq!(result.solved_spread.unwrap(), 0.0002, epsilon = 1e-8);
    }

    #[test]
    fn test_sub_basis_point_basket_is_degenerate() {
        let params = standard_params();
        let table = DefaultProbabilityTable::standard();
        let aggregator = IndexAggregator::new(&params, &table);

        let rows = vec![
            IndexConstituent::new("A").with_weight(1.0).with_market_spread(0.00002),
            IndexConstituent::new("B").with_weight(1.0).with_market_spread(0.00008),
        ];
        assert_eq!(
            aggregator.calibrate_from_quotes(&rows),
            Err(CreditError::DegenerateAggregation { excluded: 2 })
        );
    }

    #[test]
    fn test_quotes_all_excluded() {
        let params = standard_params();
        let table = DefaultProbabilityTable::standard();
        let aggregator = IndexAggregator::new(&params, &table);

        let rows = vec![IndexConstituent::new("NoQuote").with_weight(1.0)];
        assert_eq!(
            aggregator.calibrate_from_quotes(&rows),
            Err(CreditError::DegenerateAggregation { excluded: 1 })
        );
    }

    // ========================================
    // Buckets and Basis
    // ========================================

    #[test]
    fn test_spreads_by_rating() {
        let params = standard_params();
        let table = DefaultProbabilityTable::standard();
        let aggregator = IndexAggregator::new(&params, &table);

        let rows = vec![
            IndexConstituent::new("A1").with_rating("BB+").with_weight(1.0),
            IndexConstituent::new("A2").with_rating("AAA").with_weight(2.0),
            IndexConstituent::new("A3").with_rating("BB-").with_weight(3.0),
            IndexConstituent::new("A4").with_rating("??").with_weight(3.0),
        ];
        let buckets = aggregator.spreads_by_rating(&rows).unwrap();

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].rating, CreditRating::AAA);
        assert_eq!(buckets[1].rating, CreditRating::BB);
        assert_eq!(buckets[1].count, 2);
        assert_relative_eq!(buckets[1].total_weight, 4.0);
        assert_relative_eq!(
            buckets[1].fair_spread,
            fair_for(&params, CreditRating::BB),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_basis() {
        let basis = IndexBasis::new(0.0040, 0.0050);
        assert_relative_eq!(basis.basis, -0.0010, epsilon = 1e-15);
        assert_relative_eq!(basis.basis_bp(), -10.0, epsilon = 1e-9);
        assert_relative_eq!(basis.relative().unwrap(), -0.2, epsilon = 1e-12);
        assert!(IndexBasis::new(0.01, 0.0).relative().is_none());
    }
}
