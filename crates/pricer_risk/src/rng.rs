//! Seeded random number generation for the copula factor.
//!
//! [`PricerRng`] wraps `rand::StdRng` so every simulation is reproducible
//! from a single `u64` seed. Normal variates come from
//! `rand_distr::StandardNormal` (Ziggurat).

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

/// Seeded PRNG for factor draws.
///
/// # Examples
///
/// ```rust
/// use pricer_risk::rng::PricerRng;
///
/// let mut rng1 = PricerRng::from_seed(12345);
/// let mut rng2 = PricerRng::from_seed(12345);
///
/// // Same seed produces identical sequences
/// assert_eq!(rng1.gen_normal(), rng2.gen_normal());
/// ```
pub struct PricerRng {
    inner: StdRng,
    seed: u64,
}

impl PricerRng {
    /// Creates a new RNG initialised with the given seed.
    #[inline]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Returns the seed used for initialisation.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generates a single standard normal variate.
    #[inline]
    pub fn gen_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.inner)
    }

    /// Fills the buffer with standard normal variates, in order.
    ///
    /// Empty buffers are a no-op.
    #[inline]
    pub fn fill_normal(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = StandardNormal.sample(&mut self.inner);
        }
    }

    /// Draws `n` standard normal variates into a new vector.
    pub fn normal_draws(&mut self, n: usize) -> Vec<f64> {
        let mut draws = vec![0.0; n];
        self.fill_normal(&mut draws);
        draws
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_reproducibility() {
        let a = PricerRng::from_seed(42).normal_draws(1_000);
        let b = PricerRng::from_seed(42).normal_draws(1_000);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = PricerRng::from_seed(1).normal_draws(16);
        let b = PricerRng::from_seed(2).normal_draws(16);
        assert_ne!(a, b);
    }

    #[test]
    fn test_fill_matches_single_draws() {
        let mut single = PricerRng::from_seed(9);
        let expected: Vec<f64> = (0..32).map(|_| single.gen_normal()).collect();

        let mut batch = PricerRng::from_seed(9);
        let mut buffer = vec![0.0; 32];
        batch.fill_normal(&mut buffer);
        assert_eq!(buffer, expected);
    }

    #[test]
    fn test_moments() {
        let draws = PricerRng::from_seed(42).normal_draws(100_000);
        let n = draws.len() as f64;
        let mean = draws.iter().sum::<f64>() / n;
        let var = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        assert!(mean.abs() < 0.02, "mean = {}", mean);
        assert!((var - 1.0).abs() < 0.02, "var = {}", var);
    }

    #[test]
    fn test_empty_buffer() {
        let mut rng = PricerRng::from_seed(0);
        let mut buffer: Vec<f64> = Vec::new();
        rng.fill_normal(&mut buffer);
        assert!(buffer.is_empty());
        assert_eq!(rng.seed(), 0);
    }
}
