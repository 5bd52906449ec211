//! Finite-difference utilities for validating analytical derivatives.

use crate::core::error::Result;
use crate::core::types::Real;

/// Central-difference gradient of a fallible multivariable function.
///
/// # Arguments
/// * `f` - Function to differentiate
/// * `point` - Point at which to differentiate
/// * `h` - Step size
///
/// # Errors
///
/// The first error returned by `f` at a shifted point.
pub fn numerical_gradient<F>(f: F, point: &[Real], h: Real) -> Result<Vec<Real>>
where
    F: Fn(&[Real]) -> Result<Real>,
{
    let mut shifted = point.to_vec();
    let mut grad = Vec::with_capacity(point.len());
    for i in 0..point.len() {
        shifted[i] = point[i] + h;
        let plus = f(&shifted)?;
        shifted[i] = point[i] - h;
        let minus = f(&shifted)?;
        shifted[i] = point[i];
        grad.push((plus - minus) / (2.0 * h));
    }
    Ok(grad)
}

/// Relative error with the denominator clamped away from zero.
pub fn relative_error(a: Real, b: Real) -> Real {
    (a - b).abs() / a.abs().max(b.abs()).max(1e-8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AdError;
    use approx::assert_relative_eq;

    #[test]
    fn test_numerical_gradient() {
        let grad = numerical_gradient(|x| Ok(x[0] * x[0] + 3.0 * x[1]), &[1.0, 2.0], 1e-6).unwrap();
        assert_relative_eq!(grad[0], 2.0, epsilon = 1e-6);
        assert_relative_eq!(grad[1], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_numerical_gradient_propagates_errors() {
        let result = numerical_gradient(
            |x| {
                if x[0] > 0.0 {
                    Ok(x[0].ln())
                } else {
                    Err(AdError::domain("ln", x[0], "argument must be positive"))
                }
            },
            &[0.0],
            1e-6,
        );
        assert!(result.unwrap_err().is_domain_error());
    }

    #[test]
    fn test_relative_error() {
        assert_eq!(relative_error(1.0, 1.0), 0.0);
        assert_relative_eq!(relative_error(2.0, 1.0), 0.5);
        assert!(relative_error(0.0, 0.0) < 1e-12);
    }
}
