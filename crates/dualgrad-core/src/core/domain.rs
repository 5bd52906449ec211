//! Domain checks shared by every differentiable operation.
//!
//! Each check returns the validated value on success so it can be chained
//! with `?` inside the derivative rules.

use super::error::{AdError, Result};
use super::types::Real;

/// Requires `x > 0`.
pub fn positive(operation: &str, x: Real) -> Result<Real> {
    if x > 0.0 {
        Ok(x)
    } else {
        Err(AdError::domain(operation, x, "argument must be strictly positive"))
    }
}

/// Requires `x != 0`.
pub fn nonzero(operation: &str, x: Real) -> Result<Real> {
    if x != 0.0 {
        Ok(x)
    } else {
        Err(AdError::domain(operation, x, "division by zero"))
    }
}

/// Requires `-1 < x < 1`.
pub fn open_unit_interval(operation: &str, x: Real) -> Result<Real> {
    if x.abs() < 1.0 {
        Ok(x)
    } else {
        Err(AdError::domain(
            operation,
            x,
            "argument must lie strictly between -1 and 1",
        ))
    }
}

/// Requires the computed `value` of `operation` at `x` to be finite.
pub fn finite(operation: &str, x: Real, value: Real) -> Result<Real> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AdError::domain(
            operation,
            x,
            format!("result {value} is not finite"),
        ))
    }
}
