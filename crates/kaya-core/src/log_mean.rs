//! Logarithmic mean weights.
//!
//! The logarithmic mean is what makes LMDI exact: weighting each driver's
//! log change by $L(E_0, E_T)$ makes the driver contributions telescope to
//! $E_T - E_0$ with no residual.
//!
//! $$ L(a, b) = \frac{b - a}{\ln b - \ln a}, \qquad L(a, a) = a $$

use num::Float;

/// Logarithmic mean of two non-negative values.
///
/// Degenerate cases:
///
/// - `a == b` returns `a` (the limit of the formula as `b -> a`)
/// - a non-positive argument returns zero (the limit as either value -> 0)
pub fn log_mean<T: Float>(a: T, b: T) -> T {
    if a <= T::zero() || b <= T::zero() {
        T::zero()
    } else if a == b {
        a
    } else {
        (b - a) / (b.ln() - a.ln())
    }
}

/// Log change `ln(end / start)` of a driver over one interval.
pub fn log_ratio<T: Float>(end: T, start: T) -> T {
    (end / start).ln()
}
