//! Dual numbers for forward-mode automatic differentiation.
//!
//! A dual number carries a primal value and a tangent. Every operation
//! produces a new dual whose tangent is the exact directional derivative of
//! the operation, obtained by contracting the local partials from
//! [`ops`](crate::ops) with the input tangents:
//!
//! - `(a, a') + (b, b') = (a + b, a' + b')`
//! - `(a, a') * (b, b') = (ab, a'b + ab')`
//! - `f((a, a')) = (f(a), f'(a) a')`
//!
//! A full Jacobian row for `n` variables takes `n` passes, each seeding
//! exactly one coordinate's tangent to 1 ("one-hot" seeding).
//!
//! # Example
//!
//! ```
//! use dualgrad_autodiff::Dual;
//!
//! // f(x) = 4x + 3 at x = 2
//! let x = Dual::variable(2.0);
//! let y = x * 4.0 + 3.0;
//!
//! assert_eq!(y.primal, 11.0);
//! assert_eq!(y.tangent, 4.0);
//! ```

use crate::ops::{BinaryOp, UnaryOp};
use dualgrad_core::{AdError, Numeric, Real, Result};
use num_traits::{One, Zero};
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A dual number `primal + tangent·ε` with `ε² = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dual {
    /// The primal value
    pub primal: Real,
    /// The directional derivative (tangent)
    pub tangent: Real,
}

impl Dual {
    /// Create a dual number with an explicit tangent.
    pub fn new(primal: Real, tangent: Real) -> Self {
        Self { primal, tangent }
    }

    /// Create a constant (tangent = 0).
    pub fn constant(primal: Real) -> Self {
        Self::new(primal, 0.0)
    }

    /// Create the variable being differentiated (tangent = 1).
    pub fn variable(primal: Real) -> Self {
        Self::new(primal, 1.0)
    }

    /// Seeds `point` so that only coordinate `active` carries a unit tangent.
    ///
    /// # Example
    ///
    /// ```
    /// use dualgrad_autodiff::Dual;
    ///
    /// let seeds = Dual::one_hot(&[1.0, 2.0, 3.0], 1);
    /// assert_eq!(seeds[0].tangent, 0.0);
    /// assert_eq!(seeds[1].tangent, 1.0);
    /// assert_eq!(seeds[2].tangent, 0.0);
    /// ```
    pub fn one_hot(point: &[Real], active: usize) -> Vec<Self> {
        point
            .iter()
            .enumerate()
            .map(|(i, &x)| Self::new(x, if i == active { 1.0 } else { 0.0 }))
            .collect()
    }

    fn unary(self, op: UnaryOp) -> Result<Self> {
        let rule = op.apply(self.primal)?;
        Ok(Self::new(rule.value, rule.partial * self.tangent))
    }

    fn unary_total(self, op: UnaryOp) -> Self {
        let rule = op.eval(self.primal);
        Self::new(rule.value, rule.partial * self.tangent)
    }

    fn binary(self, rhs: Self, op: BinaryOp) -> Result<Self> {
        let rule = op.apply(self.primal, rhs.primal)?;
        Ok(Self::new(
            rule.value,
            rule.lhs * self.tangent + rule.rhs * rhs.tangent,
        ))
    }

    fn binary_total(self, rhs: Self, op: BinaryOp) -> Self {
        let rule = op.eval(self.primal, rhs.primal);
        Self::new(rule.value, rule.lhs * self.tangent + rule.rhs * rhs.tangent)
    }
}

impl From<Real> for Dual {
    fn from(primal: Real) -> Self {
        Self::constant(primal)
    }
}

impl Numeric for Dual {
    fn primal(&self) -> Real {
        self.primal
    }

    fn lift(&self, value: Real) -> Self {
        Self::constant(value)
    }

    fn try_div(&self, rhs: &Self) -> Result<Self> {
        self.binary(*rhs, BinaryOp::Divide)
    }

    fn recip(&self) -> Result<Self> {
        self.unary(UnaryOp::Recip)
    }

    fn powi(&self, n: i32) -> Result<Self> {
        self.unary(UnaryOp::Powi(n))
    }

    fn powf(&self, p: Real) -> Result<Self> {
        self.unary(UnaryOp::Powf(p))
    }

    fn pow(&self, exponent: &Self) -> Result<Self> {
        self.binary(*exponent, BinaryOp::Pow)
    }

    fn exp(&self) -> Result<Self> {
        self.unary(UnaryOp::Exp)
    }

    fn ln(&self) -> Result<Self> {
        self.unary(UnaryOp::Ln)
    }

    fn sqrt(&self) -> Result<Self> {
        self.unary(UnaryOp::Sqrt)
    }

    fn sin(&self) -> Self {
        self.unary_total(UnaryOp::Sin)
    }

    fn cos(&self) -> Self {
        self.unary_total(UnaryOp::Cos)
    }

    fn tan(&self) -> Result<Self> {
        self.unary(UnaryOp::Tan)
    }

    fn asin(&self) -> Result<Self> {
        self.unary(UnaryOp::Asin)
    }

    fn acos(&self) -> Result<Self> {
        self.unary(UnaryOp::Acos)
    }

    fn atan(&self) -> Self {
        self.unary_total(UnaryOp::Atan)
    }

    fn sinh(&self) -> Result<Self> {
        self.unary(UnaryOp::Sinh)
    }

    fn cosh(&self) -> Result<Self> {
        self.unary(UnaryOp::Cosh)
    }

    fn tanh(&self) -> Self {
        self.unary_total(UnaryOp::Tanh)
    }
}

// --- Arithmetic: Dual op Dual ---

impl Add for Dual {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        self.binary_total(rhs, BinaryOp::Add)
    }
}

impl Sub for Dual {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self.binary_total(rhs, BinaryOp::Subtract)
    }
}

impl Mul for Dual {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        self.binary_total(rhs, BinaryOp::Multiply)
    }
}

impl Div for Dual {
    type Output = Result<Self>;
    fn div(self, rhs: Self) -> Result<Self> {
        self.try_div(&rhs)
    }
}

impl Neg for Dual {
    type Output = Self;
    fn neg(self) -> Self {
        self.unary_total(UnaryOp::Negate)
    }
}

// --- Arithmetic: Dual op Real ---

impl Add<Real> for Dual {
    type Output = Self;
    fn add(self, c: Real) -> Self {
        self.unary_total(UnaryOp::Offset(c))
    }
}

impl Sub<Real> for Dual {
    type Output = Self;
    fn sub(self, c: Real) -> Self {
        self.unary_total(UnaryOp::Offset(-c))
    }
}

impl Mul<Real> for Dual {
    type Output = Self;
    fn mul(self, c: Real) -> Self {
        self.unary_total(UnaryOp::Scale(c))
    }
}

impl Div<Real> for Dual {
    type Output = Result<Self>;
    fn div(self, c: Real) -> Result<Self> {
        self.binary(Self::constant(c), BinaryOp::Divide)
    }
}

// --- Arithmetic: Real op Dual ---

impl Add<Dual> for Real {
    type Output = Dual;
    fn add(self, x: Dual) -> Dual {
        x + self
    }
}

impl Sub<Dual> for Real {
    type Output = Dual;
    fn sub(self, x: Dual) -> Dual {
        x.rsub_real(self)
    }
}

impl Mul<Dual> for Real {
    type Output = Dual;
    fn mul(self, x: Dual) -> Dual {
        x * self
    }
}

impl Div<Dual> for Real {
    type Output = Result<Dual>;
    fn div(self, x: Dual) -> Result<Dual> {
        Ok(x.recip()? * self)
    }
}

impl Zero for Dual {
    fn zero() -> Self {
        Self::constant(0.0)
    }

    fn is_zero(&self) -> bool {
        self.primal == 0.0 && self.tangent == 0.0
    }
}

impl One for Dual {
    fn one() -> Self {
        Self::constant(1.0)
    }
}

impl Sum for Dual {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, x| acc + x)
    }
}

/// Computes the value and derivative of a single-variable function in one
/// forward pass.
///
/// # Example
///
/// ```
/// use dualgrad_autodiff::{forward_diff, Dual};
/// use dualgrad_core::prelude::*;
///
/// let (value, deriv) = forward_diff(|x: Dual| x.powi(2), 3.0).unwrap();
/// assert_eq!(value, 9.0);
/// assert_eq!(deriv, 6.0);
/// ```
pub fn forward_diff<F>(f: F, x: Real) -> Result<(Real, Real)>
where
    F: FnOnce(Dual) -> Result<Dual>,
{
    let y = f(Dual::variable(x))?;
    Ok((y.primal, y.tangent))
}

/// Computes the value and gradient of `f: ℝⁿ → ℝ` with `n` one-hot forward
/// passes.
///
/// # Example
///
/// ```
/// use dualgrad_autodiff::{forward_gradient, Dual};
///
/// // f(x) = x0^2 + 3 x1 + 5 at (1, 2)
/// let f = |x: &[Dual]| Ok(x[0] * x[0] + x[1] * 3.0 + 5.0);
/// let (value, grad) = forward_gradient(f, &[1.0, 2.0]).unwrap();
/// assert_eq!(value, 12.0);
/// assert_eq!(grad, vec![2.0, 3.0]);
/// ```
pub fn forward_gradient<F>(f: F, point: &[Real]) -> Result<(Real, Vec<Real>)>
where
    F: Fn(&[Dual]) -> Result<Dual>,
{
    if point.is_empty() {
        return Err(AdError::shape("at least one variable", "0 variables"));
    }

    let constants: Vec<Dual> = point.iter().copied().map(Dual::constant).collect();
    let value = f(&constants)?.primal;

    let mut grad = Vec::with_capacity(point.len());
    for i in 0..point.len() {
        let seeds = Dual::one_hot(point, i);
        grad.push(f(&seeds)?.tangent);
    }
    Ok((value, grad))
}
