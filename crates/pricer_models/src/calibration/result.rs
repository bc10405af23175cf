//! Calibration result types.

/// Outcome of a converged spread calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpreadCalibration {
    /// Flat spread reproducing the target price (midpoint of the final bracket).
    pub solved_spread: f64,
    /// Price the calibration was asked to match, per 100 notional.
    pub target_price: f64,
    /// Number of bisection halvings performed.
    pub iterations: usize,
    /// Final bracket `(low, high)`.
    pub bracket: (f64, f64),
}

impl SpreadCalibration {
    /// Solved spread in basis points.
    #[inline]
    pub fn solved_spread_bp(&self) -> f64 {
        self.solved_spread * 10_000.0
    }

    /// Width of the final bracket.
    #[inline]
    pub fn bracket_width(&self) -> f64 {
        self.bracket.1 - self.bracket.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_accessors() {
        let result = SpreadCalibration {
            solved_spread: 0.0125,
            target_price: 99.0,
            iterations: 34,
            bracket: (0.0124, 0.0126),
        };
        assert_relative_eq!(result.solved_spread_bp(), 125.0, epsilon = 1e-9);
        assert_relative_eq!(result.bracket_width(), 0.0002, epsilon = 1e-15);
    }
}
