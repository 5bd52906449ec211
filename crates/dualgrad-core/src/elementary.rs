//! Elementary functions written once against [`Numeric`].
//!
//! The primitive transcendentals forward to the engine's own derivative
//! rules; the remaining functions (`csc`, `sec`, `cot`, arbitrary-base
//! logarithms and exponentials, sigmoids) are compositions of primitives, so
//! their derivatives follow from the chain rule in either engine.
//!
//! # Example
//!
//! ```
//! use dualgrad_core::elementary::{exp, log_base, E};
//! use dualgrad_core::prelude::*;
//!
//! // log_2(x) + e^x - e
//! fn f<T: Numeric>(x: &T) -> Result<T> {
//!     Ok(log_base(x, 2.0)? + exp(x)? - E)
//! }
//! ```

use crate::core::domain;
use crate::core::error::{AdError, Result};
use crate::core::numeric::Numeric;
use crate::core::types::Real;

pub use crate::core::types::constants::E;

pub fn exp<T: Numeric>(x: &T) -> Result<T> {
    x.exp()
}

/// Natural logarithm.
pub fn ln<T: Numeric>(x: &T) -> Result<T> {
    x.ln()
}

/// Logarithm with a constant base: `ln(x) / ln(base)`.
pub fn log_base<T: Numeric>(x: &T, base: Real) -> Result<T> {
    let ln_base = domain::positive("log_base", base)?.ln();
    if ln_base == 0.0 {
        return Err(AdError::domain("log_base", base, "base must not be 1"));
    }
    Ok(x.ln()? * ln_base.recip())
}

/// Logarithm with a differentiable base.
pub fn log<T: Numeric>(x: &T, base: &T) -> Result<T> {
    let ln_base = base.ln()?;
    if ln_base.primal() == 0.0 {
        return Err(AdError::domain("log", base.primal(), "base must not be 1"));
    }
    x.ln()?.try_div(&ln_base)
}

/// `base^x` for a constant positive base.
pub fn exp_base<T: Numeric>(base: Real, x: &T) -> Result<T> {
    let ln_base = domain::positive("exp_base", base)?.ln();
    (x.clone() * ln_base).exp()
}

pub fn sqrt<T: Numeric>(x: &T) -> Result<T> {
    x.sqrt()
}

pub fn powi<T: Numeric>(x: &T, n: i32) -> Result<T> {
    x.powi(n)
}

pub fn powf<T: Numeric>(x: &T, p: Real) -> Result<T> {
    x.powf(p)
}

pub fn pow<T: Numeric>(x: &T, exponent: &T) -> Result<T> {
    x.pow(exponent)
}

pub fn sin<T: Numeric>(x: &T) -> T {
    x.sin()
}

pub fn cos<T: Numeric>(x: &T) -> T {
    x.cos()
}

pub fn tan<T: Numeric>(x: &T) -> Result<T> {
    x.tan()
}

/// Cosecant, `1 / sin(x)`.
pub fn csc<T: Numeric>(x: &T) -> Result<T> {
    x.sin().recip()
}

/// Secant, `1 / cos(x)`.
pub fn sec<T: Numeric>(x: &T) -> Result<T> {
    x.cos().recip()
}

/// Cotangent, `cos(x) / sin(x)`.
pub fn cot<T: Numeric>(x: &T) -> Result<T> {
    x.cos().try_div(&x.sin())
}

pub fn asin<T: Numeric>(x: &T) -> Result<T> {
    x.asin()
}

pub fn acos<T: Numeric>(x: &T) -> Result<T> {
    x.acos()
}

pub fn atan<T: Numeric>(x: &T) -> T {
    x.atan()
}

pub fn sinh<T: Numeric>(x: &T) -> Result<T> {
    x.sinh()
}

pub fn cosh<T: Numeric>(x: &T) -> Result<T> {
    x.cosh()
}

pub fn tanh<T: Numeric>(x: &T) -> T {
    x.tanh()
}

/// Standard logistic sigmoid, `1 / (1 + e^-x)`.
pub fn sigmoid<T: Numeric>(x: &T) -> Result<T> {
    logistic(x, 1.0, 1.0, 0.0)
}

/// Generalised logistic curve `l / (1 + e^(-k (x - x0)))`.
///
/// Only non-positive exponents are ever passed to `exp`, so the curve and
/// its derivative stay finite far out in either tail.
pub fn logistic<T: Numeric>(x: &T, l: Real, k: Real, x0: Real) -> Result<T> {
    let z = (x.clone() - x0) * k;
    if z.primal() >= 0.0 {
        let decay = (-z).exp()?;
        Ok((decay + 1.0).recip()? * l)
    } else {
        // e^z / (1 + e^z)
        let growth = z.exp()?;
        Ok(growth.clone() * (growth + 1.0).recip()? * l)
    }
}
