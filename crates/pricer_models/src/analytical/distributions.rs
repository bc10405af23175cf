//! Standard normal distribution functions.
//!
//! This module provides double-precision implementations of:
//! - `norm_cdf`: Cumulative distribution function Φ
//! - `norm_inv`: Inverse CDF (quantile function) Φ⁻¹
//!
//! Φ goes through `libm`'s complementary error function, which is accurate
//! to within an ulp over the whole line. Φ⁻¹ starts from `statrs`' inverse
//! error function and takes one Halley step against that Φ.

use statrs::function::erf::erfc_inv;

/// Square root of 2.
const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// Square root of 2π.
const SQRT_2PI: f64 = 2.506_628_274_631_000_5;

/// Standard normal cumulative distribution function.
///
/// ```text
/// Φ(x) = ½ erfc(-x / √2)
/// ```
///
/// # Examples
///
/// ```
/// use pricer_models::analytical::norm_cdf;
///
/// assert!((norm_cdf(0.0) - 0.5).abs() < 1e-15);
/// assert!((norm_cdf(1.959963984540054) - 0.975).abs() < 1e-14);
/// ```
#[inline]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * libm::erfc(-x / SQRT_2)
}

/// Inverse of the standard normal CDF.
///
/// ```text
/// Φ⁻¹(p) = -√2 erfc⁻¹(2p)
/// ```
///
/// Returns `-∞` at `p = 0`, `+∞` at `p = 1` and NaN outside [0, 1].
///
/// # Examples
///
/// ```
/// use pricer_models::analytical::{norm_cdf, norm_inv};
///
/// let k = norm_inv(0.0158);
/// assert!((norm_cdf(k) - 0.0158).abs() < 1e-14);
/// assert_eq!(norm_inv(0.0), f64::NEG_INFINITY);
/// ```
#[inline]
pub fn norm_inv(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }
    let x = -SQRT_2 * erfc_inv(2.0 * p);
    if !x.is_finite() {
        return x;
    }

    // Halley refinement on Φ(x) - p
    let e = norm_cdf(x) - p;
    let u = e * SQRT_2PI * (0.5 * x * x).exp();
    x - u / (1.0 + 0.5 * x * u)
}
