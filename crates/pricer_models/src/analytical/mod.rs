//! Analytical building blocks.
//!
//! - [`distributions`]: Standard normal CDF and inverse CDF

pub mod distributions;

pub use distributions::{norm_cdf, norm_inv};
