//! Credit ratings and the rating-implied default-probability table.
//!
//! This module provides:
//! - [`CreditRating`]: Coarse rating grades used for default-probability lookup
//! - [`normalize_rating`]: Collapse agency notches ("BB+", " bbb- ") to a coarse grade
//! - [`DefaultProbabilityTable`]: Cumulative default probabilities by grade and horizon
//!
//! # Lookup Semantics
//!
//! Lookups distinguish "not found" from "zero probability": an AAA name at
//! one year genuinely has a tabulated PD of 0.0, which is different from a
//! horizon that is not tabulated. [`DefaultProbabilityTable::get`] returns
//! `None` for the latter; [`DefaultProbabilityTable::lookup`] turns it into
//! [`MarketDataError::UnknownHorizon`].
//!
//! # Example
//!
//! ```
//! use pricer_core::market_data::ratings::{normalize_rating, CreditRating, DefaultProbabilityTable};
//!
//! let table = DefaultProbabilityTable::standard();
//!
//! let rating = normalize_rating(" bbb- ").unwrap();
//! assert_eq!(rating, CreditRating::BBB);
//!
//! let q = table.lookup(rating, 5).unwrap();
//! assert!((q - 0.0158).abs() < 1e-12);
//!
//! assert!(table.get(rating, 6).is_none());
//! ```

use std::fmt;
use std::str::FromStr;

use super::error::MarketDataError;

/// Tabulated horizons in years.
pub const HORIZONS: [u32; 8] = [1, 2, 3, 4, 5, 7, 10, 15];

/// Coarse credit rating grade.
///
/// Agency notches and the near-default grades are collapsed onto these seven
/// buckets by [`normalize_rating`]; CC, C and D all map to [`CreditRating::CCC`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CreditRating {
    /// Highest quality (prime)
    AAA,
    /// High quality
    AA,
    /// Upper medium grade
    A,
    /// Lower medium grade (investment grade threshold)
    BBB,
    /// Non-investment grade speculative
    BB,
    /// Highly speculative
    B,
    /// Substantial risks, including CC/C/D
    CCC,
}

impl CreditRating {
    /// All grades from best to worst.
    pub const ALL: [CreditRating; 7] = [
        CreditRating::AAA,
        CreditRating::AA,
        CreditRating::A,
        CreditRating::BBB,
        CreditRating::BB,
        CreditRating::B,
        CreditRating::CCC,
    ];

    /// Returns the grade code, e.g. `"BBB"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditRating::AAA => "AAA",
            CreditRating::AA => "AA",
            CreditRating::A => "A",
            CreditRating::BBB => "BBB",
            CreditRating::BB => "BB",
            CreditRating::B => "B",
            CreditRating::CCC => "CCC",
        }
    }

    /// Returns whether this rating is investment grade (BBB or better).
    #[inline]
    pub fn is_investment_grade(&self) -> bool {
        matches!(
            self,
            CreditRating::AAA | CreditRating::AA | CreditRating::A | CreditRating::BBB
        )
    }

    #[inline]
    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for CreditRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreditRating {
    type Err = MarketDataError;

    /// Parse a raw rating, failing with `UnknownRating` when it does not
    /// normalise to a coarse grade.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_rating(s).ok_or_else(|| MarketDataError::UnknownRating { raw: s.to_string() })
    }
}

/// Normalise a raw agency rating to its coarse grade.
///
/// Trims surrounding whitespace and case-folds before matching against the
/// fixed grade set `AAA, AA±, A±, BBB±, BB±, B±, CCC±, CC, C, D`. Anything
/// else, including the empty string and "NR", yields `None`.
///
/// # Examples
///
/// ```
/// use pricer_core::market_data::ratings::{normalize_rating, CreditRating};
///
/// assert_eq!(normalize_rating("AA+"), Some(CreditRating::AA));
/// assert_eq!(normalize_rating("d"), Some(CreditRating::CCC));
/// assert_eq!(normalize_rating("NR"), None);
/// assert_eq!(normalize_rating("   "), None);
/// ```
pub fn normalize_rating(raw: &str) -> Option<CreditRating> {
    let code = raw.trim().to_ascii_uppercase();
    let rating = match code.as_str() {
        "AAA" => CreditRating::AAA,
        "AA+" | "AA" | "AA-" => CreditRating::AA,
        "A+" | "A" | "A-" => CreditRating::A,
        "BBB+" | "BBB" | "BBB-" => CreditRating::BBB,
        "BB+" | "BB" | "BB-" => CreditRating::BB,
        "B+" | "B" | "B-" => CreditRating::B,
        "CCC+" | "CCC" | "CCC-" | "CC" | "C" | "D" => CreditRating::CCC,
        _ => return None,
    };
    Some(rating)
}

/// Position of a horizon in [`HORIZONS`].
#[inline]
fn horizon_index(years: u32) -> Option<usize> {
    HORIZONS.iter().position(|&h| h == years)
}

/// Cumulative default probabilities by coarse rating and horizon.
///
/// Immutable once built. Construct it once per process and pass it by
/// reference to whatever needs lookups.
///
/// # Invariants
///
/// - Every (rating, horizon) cell is present
/// - Every value lies in [0, 1)
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultProbabilityTable {
    values: [[f64; HORIZONS.len()]; 7],
}

impl DefaultProbabilityTable {
    /// Average cumulative default rates (Hull, Table 24.1), in decimal.
    ///
    /// Rows follow [`CreditRating::ALL`], columns follow [`HORIZONS`].
    ///
    /// The published AAA row sits above AA at 3, 4, 5 and 7 years, so
    /// default probabilities are monotone in rating only from AA down.
    /// The values are kept as published.
    pub fn standard() -> Self {
        Self {
            values: [
                [0.0000, 0.0003, 0.0013, 0.0024, 0.0035, 0.0051, 0.0070, 0.0091],
                [0.0002, 0.0006, 0.0012, 0.0021, 0.0031, 0.0050, 0.0072, 0.0102],
                [0.0005, 0.0014, 0.0023, 0.0035, 0.0047, 0.0079, 0.0124, 0.0189],
                [0.0016, 0.0045, 0.0078, 0.0117, 0.0158, 0.0233, 0.0332, 0.0469],
                [0.0061, 0.0192, 0.0348, 0.0505, 0.0652, 0.0901, 0.1178, 0.1467],
                [0.0333, 0.0771, 0.1155, 0.1458, 0.1693, 0.2036, 0.2374, 0.2712],
                [0.2708, 0.3664, 0.4141, 0.4410, 0.4619, 0.4826, 0.5038, 0.5259],
            ],
        }
    }

    /// Build a table from `(rating, horizon, probability)` entries.
    ///
    /// Later entries overwrite earlier ones for the same cell.
    ///
    /// # Errors
    ///
    /// - `UnknownHorizon` if an entry uses a horizon outside [`HORIZONS`]
    /// - `InvalidDefaultProbability` if a value is outside [0, 1)
    /// - `IncompleteTable` if any cell is left empty
    ///
    /// # Example
    ///
    /// ```
    /// use pricer_core::market_data::ratings::{CreditRating, DefaultProbabilityTable, HORIZONS};
    ///
    /// let entries: Vec<_> = CreditRating::ALL
    ///     .iter()
    ///     .flat_map(|&r| HORIZONS.iter().map(move |&h| (r, h, 0.01)))
    ///     .collect();
    /// let table = DefaultProbabilityTable::from_entries(entries).unwrap();
    /// assert_eq!(table.get(CreditRating::A, 7), Some(0.01));
    /// ```
    pub fn from_entries<I>(entries: I) -> Result<Self, MarketDataError>
    where
        I: IntoIterator<Item = (CreditRating, u32, f64)>,
    {
        let mut cells: [[Option<f64>; HORIZONS.len()]; 7] = [[None; HORIZONS.len()]; 7];
        for (rating, years, q) in entries {
            let col = horizon_index(years).ok_or(MarketDataError::UnknownHorizon { years })?;
            if !(0.0..1.0).contains(&q) {
                return Err(MarketDataError::InvalidDefaultProbability { q });
            }
            cells[rating.index()][col] = Some(q);
        }

        let mut values = [[0.0; HORIZONS.len()]; 7];
        for rating in CreditRating::ALL {
            for (col, &years) in HORIZONS.iter().enumerate() {
                values[rating.index()][col] =
                    cells[rating.index()][col].ok_or_else(|| MarketDataError::IncompleteTable {
                        rating: rating.to_string(),
                        years,
                    })?;
            }
        }
        Ok(Self { values })
    }

    /// Cumulative default probability, or `None` when the horizon is not tabulated.
    #[inline]
    pub fn get(&self, rating: CreditRating, years: u32) -> Option<f64> {
        horizon_index(years).map(|col| self.values[rating.index()][col])
    }

    /// Cumulative default probability for a tabulated horizon.
    ///
    /// # Errors
    ///
    /// `MarketDataError::UnknownHorizon` when `years` is not in [`HORIZONS`].
    pub fn lookup(&self, rating: CreditRating, years: u32) -> Result<f64, MarketDataError> {
        self.get(rating, years)
            .ok_or(MarketDataError::UnknownHorizon { years })
    }

    /// Normalise a raw rating and look it up in one step.
    ///
    /// Returns `Ok(None)` when the rating does not normalise, so callers can
    /// drop the record; an untabulated horizon is still an error.
    pub fn lookup_raw(&self, raw: &str, years: u32) -> Result<Option<f64>, MarketDataError> {
        let col = horizon_index(years).ok_or(MarketDataError::UnknownHorizon { years })?;
        Ok(normalize_rating(raw).map(|rating| self.values[rating.index()][col]))
    }
}

impl Default for DefaultProbabilityTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Convert a maturity in years to a tabulated horizon.
///
/// Only whole-year maturities that appear in [`HORIZONS`] are accepted; the
/// table is never interpolated.
pub fn horizon_from_maturity(maturity: f64) -> Result<u32, MarketDataError> {
    if !(maturity > 0.0) || maturity.fract() != 0.0 || maturity > u32::MAX as f64 {
        return Err(MarketDataError::InvalidMaturity { t: maturity });
    }
    let years = maturity as u32;
    horizon_index(years)
        .map(|_| years)
        .ok_or(MarketDataError::UnknownHorizon { years })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ========================================
    // Normalisation Tests
    // ========================================

    #[test]
    fn test_normalize_coarse_grades() {
        for rating in CreditRating::ALL {
            assert_eq!(normalize_rating(rating.as_str()), Some(rating));
        }
    }

    #[test]
    fn test_normalize_notches() {
        assert_eq!(normalize_rating("AA-"), Some(CreditRating::AA));
        assert_eq!(normalize_rating("A+"), Some(CreditRating::A));
        assert_eq!(normalize_rating("BBB-"), Some(CreditRating::BBB));
        assert_eq!(normalize_rating("BB+"), Some(CreditRating::BB));
        assert_eq!(normalize_rating("B-"), Some(CreditRating::B));
        assert_eq!(normalize_rating("CCC+"), Some(CreditRating::CCC));
    }

    #[test]
    fn test_normalize_near_default_grades_collapse_to_ccc() {
        for raw in ["CC", "C", "D"] {
            assert_eq!(normalize_rating(raw), Some(CreditRating::CCC));
        }
    }

    #[test]
    fn test_normalize_trims_and_case_folds() {
        assert_eq!(normalize_rating("  bbb+\t"), Some(CreditRating::BBB));
        assert_eq!(normalize_rating("aA"), Some(CreditRating::AA));
    }

    #[test]
    fn test_normalize_rejects_unknown() {
        for raw in ["", "   ", "NR", "WR", "Baa1", "BBB+-", "AAAA", "A A"] {
            assert_eq!(normalize_rating(raw), None, "raw = {:?}", raw);
        }
    }

    #[test]
    fn test_from_str_unknown_rating_error() {
        let err = "Baa2".parse::<CreditRating>().unwrap_err();
        assert_eq!(
            err,
            MarketDataError::UnknownRating {
                raw: "Baa2".to_string()
            }
        );
        assert_eq!("bb-".parse::<CreditRating>().unwrap(), CreditRating::BB);
    }

    #[test]
    fn test_investment_grade() {
        assert!(CreditRating::BBB.is_investment_grade());
        assert!(!CreditRating::BB.is_investment_grade());
    }

    // ========================================
    // Table Tests
    // ========================================

    #[test]
    fn test_standard_table_values() {
        let table = DefaultProbabilityTable::standard();
        assert_eq!(table.get(CreditRating::AAA, 1), Some(0.0));
        assert_eq!(table.get(CreditRating::BBB, 5), Some(0.0158));
        assert_eq!(table.get(CreditRating::BB, 5), Some(0.0652));
        assert_eq!(table.get(CreditRating::CCC, 15), Some(0.5259));
    }

    #[test]
    fn test_all_values_in_unit_interval() {
        let table = DefaultProbabilityTable::standard();
        for rating in CreditRating::ALL {
            for years in HORIZONS {
                let q = table.lookup(rating, years).unwrap();
                assert!((0.0..1.0).contains(&q), "{} {}y = {}", rating, years, q);
            }
        }
    }

    #[test]
    fn test_monotone_across_ratings() {
        let table = DefaultProbabilityTable::standard();
        for years in HORIZONS {
            for pair in CreditRating::ALL[1..].windows(2) {
                let better = table.lookup(pair[0], years).unwrap();
                let worse = table.lookup(pair[1], years).unwrap();
                assert!(better <= worse, "{} vs {} at {}y", pair[0], pair[1], years);
            }
        }
    }

    #[test]
    fn test_aaa_aa_crossing() {
        let table = DefaultProbabilityTable::standard();
        let crossed: Vec<u32> = HORIZONS
            .iter()
            .copied()
            .filter(|&years| {
                table.lookup(CreditRating::AAA, years).unwrap()
                    > table.lookup(CreditRating::AA, years).unwrap()
            })
            .collect();
        assert_eq!(crossed, vec![3, 4, 5, 7]);
    }

    #[test]
    fn test_monotone_across_horizons() {
        let table = DefaultProbabilityTable::standard();
        for rating in CreditRating::ALL {
            for pair in HORIZONS.windows(2) {
                assert!(table.lookup(rating, pair[0]).unwrap() <= table.lookup(rating, pair[1]).unwrap());
            }
        }
    }

    #[test]
    fn test_untabulated_horizon() {
        let table = DefaultProbabilityTable::standard();
        assert_eq!(table.get(CreditRating::A, 6), None);
        assert_eq!(
            table.lookup(CreditRating::A, 6),
            Err(MarketDataError::UnknownHorizon { years: 6 })
        );
        assert_eq!(table.get(CreditRating::A, 0), None);
    }

    #[test]
    fn test_lookup_raw() {
        let table = DefaultProbabilityTable::standard();
        assert_eq!(table.lookup_raw("BBB+", 5).unwrap(), Some(0.0158));
        assert_eq!(table.lookup_raw("NR", 5).unwrap(), None);
        assert!(table.lookup_raw("BBB", 8).is_err());
    }

    #[test]
    fn test_from_entries_incomplete() {
        let err = DefaultProbabilityTable::from_entries(vec![(CreditRating::AAA, 1, 0.0)]).unwrap_err();
        assert!(matches!(err, MarketDataError::IncompleteTable { .. }));
    }

    #[test]
    fn test_from_entries_rejects_probability_of_one() {
        let err = DefaultProbabilityTable::from_entries(vec![(CreditRating::CCC, 15, 1.0)]).unwrap_err();
        assert_eq!(err, MarketDataError::InvalidDefaultProbability { q: 1.0 });
    }

    #[test]
    fn test_from_entries_round_trips_standard() {
        let standard = DefaultProbabilityTable::standard();
        let entries: Vec<_> = CreditRating::ALL
            .iter()
            .flat_map(|&r| {
                let standard = &standard;
                HORIZONS
                    .iter()
                    .map(move |&h| (r, h, standard.get(r, h).unwrap_or(0.0)))
            })
            .collect();
        let rebuilt = DefaultProbabilityTable::from_entries(entries).unwrap();
        assert_eq!(rebuilt, standard);
    }

    #[test]
    fn test_horizon_from_maturity() {
        assert_eq!(horizon_from_maturity(5.0), Ok(5));
        assert_eq!(
            horizon_from_maturity(6.0),
            Err(MarketDataError::UnknownHorizon { years: 6 })
        );
        assert!(matches!(
            horizon_from_maturity(2.5),
            Err(MarketDataError::InvalidMaturity { .. })
        ));
        assert!(horizon_from_maturity(-1.0).is_err());
    }

    // ========================================
    // Property-based Tests
    // ========================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn test_normalize_never_panics(raw in "\\PC{0,8}") {
            let _ = normalize_rating(&raw);
        }

        #[test]
        fn test_normalize_ignores_padding(
            idx in 0usize..7,
            left in "[ \t]{0,3}",
            right in "[ \t]{0,3}",
        ) {
            let rating = CreditRating::ALL[idx];
            let raw = format!("{}{}{}", left, rating.as_str().to_lowercase(), right);
            prop_assert_eq!(normalize_rating(&raw), Some(rating));
        }
    }
}
