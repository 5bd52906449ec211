//! Finite-difference helpers for validating derivative rules in tests.

#![cfg(any(test, feature = "test-utils"))]

use crate::core::types::Real;

/// Central difference `(f(x + h) - f(x - h)) / 2h`.
pub fn central_difference<F>(f: F, x: Real, h: Real) -> Real
where
    F: Fn(Real) -> Real,
{
    (f(x + h) - f(x - h)) / (2.0 * h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_central_difference() {
        let d = central_difference(|x| x * x * x, 2.0, 1e-5);
        assert_relative_eq!(d, 12.0, epsilon = 1e-6);
    }
}
