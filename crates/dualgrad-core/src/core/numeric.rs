//! The arithmetic contract shared by both differentiation engines.
//!
//! User functions and the elementary-function library are written once
//! against [`Numeric`]; the forward kernel's dual numbers and the reverse
//! engine's graph variables both implement it, so the same body can be
//! evaluated in either mode.

use super::error::Result;
use super::types::Real;
use std::fmt::Debug;
use std::ops::{Add, Mul, Neg, Sub};

/// A differentiable scalar.
///
/// Infallible operations are expressed through the standard operator traits.
/// Everything that has a restricted domain returns [`Result`] and fails with
/// [`AdError::DomainError`](super::error::AdError::DomainError) instead of
/// producing NaN or infinity.
///
/// # Example
///
/// ```
/// use dualgrad_core::prelude::*;
///
/// // f(x) = (5x + 50) / (2x^2), usable with any engine
/// fn f<T: Numeric>(x: &T) -> Result<T> {
///     let num = x.clone() * 5.0 + 50.0;
///     let den = x.powi(2)? * 2.0;
///     num.try_div(&den)
/// }
/// ```
pub trait Numeric:
    Clone
    + Debug
    + Sized
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + Add<Real, Output = Self>
    + Sub<Real, Output = Self>
    + Mul<Real, Output = Self>
{
    /// The primal value.
    fn primal(&self) -> Real;

    /// A constant in the same evaluation context as `self`.
    fn lift(&self, value: Real) -> Self;

    /// `self / rhs`.
    fn try_div(&self, rhs: &Self) -> Result<Self>;

    /// `1 / self`.
    fn recip(&self) -> Result<Self>;

    /// `self^n` for an integer exponent.
    fn powi(&self, n: i32) -> Result<Self>;

    /// `self^p` for a constant real exponent.
    fn powf(&self, p: Real) -> Result<Self>;

    /// `self^exponent` where both base and exponent are differentiable.
    fn pow(&self, exponent: &Self) -> Result<Self>;

    /// `e^self`.
    fn exp(&self) -> Result<Self>;

    /// Natural logarithm.
    fn ln(&self) -> Result<Self>;

    /// Square root.
    fn sqrt(&self) -> Result<Self>;

    fn sin(&self) -> Self;

    fn cos(&self) -> Self;

    fn tan(&self) -> Result<Self>;

    fn asin(&self) -> Result<Self>;

    fn acos(&self) -> Result<Self>;

    fn atan(&self) -> Self;

    fn sinh(&self) -> Result<Self>;

    fn cosh(&self) -> Result<Self>;

    fn tanh(&self) -> Self;

    /// `self / c` for a constant divisor.
    fn div_real(&self, c: Real) -> Result<Self> {
        self.try_div(&self.lift(c))
    }

    /// `c - self` for a constant minuend.
    fn rsub_real(&self, c: Real) -> Self {
        -self.clone() + c
    }
}
