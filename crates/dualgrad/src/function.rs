//! User-function traits and the evaluation input.
//!
//! A differentiable function is written once, generically over
//! [`Numeric`], by implementing [`Function`]. The drivers then call it with
//! forward-mode [`Dual`] values or reverse-mode [`Var`] nodes. Because a
//! generic method cannot be called through a trait object, every
//! `Function + Send + Sync` type also implements the object-safe
//! [`Differentiable`] trait, which is what the drivers accept. Functions of
//! different types can therefore share one slice.
//!
//! # Example
//!
//! ```
//! use dualgrad::prelude::*;
//!
//! /// f(x) = x0^2 + 3 x1 + 5
//! struct Quadratic;
//!
//! impl Function for Quadratic {
//!     fn eval<T: Numeric>(&self, x: &Input<'_, T>) -> Result<T> {
//!         let (x0, x1) = (x.at(0)?, x.at(1)?);
//!         Ok(x0.clone() * x0 + x1 * 3.0 + 5.0)
//!     }
//! }
//!
//! let functions: [&dyn Differentiable; 1] = [&Quadratic];
//! let ad = ForwardAD::new(&functions, &[1.0, 2.0]).unwrap();
//! assert_eq!(ad.primal()[0], 12.0);
//! assert_eq!(ad.jacobian()[(0, 1)], 3.0);
//! ```

use dualgrad_autodiff::{Dual, Var};
use dualgrad_core::{AdError, Numeric, Result};

/// The argument passed to a user function.
///
/// The driver picks the variant from the number of variables: one variable
/// gives `Single`, more give `Multi`. A function written for one variable
/// calls [`scalar`](Self::scalar); one written for several indexes with
/// [`at`](Self::at).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input<'a, T> {
    /// Single-variable evaluation
    Single(T),
    /// Multi-variable evaluation
    Multi(&'a [T]),
}

impl<'a, T: Clone> Input<'a, T> {
    /// Wraps `values`, choosing `Single` when there is exactly one.
    pub fn from_slice(values: &'a [T]) -> Self {
        match values {
            [only] => Input::Single(only.clone()),
            _ => Input::Multi(values),
        }
    }

    /// The value of a single-variable input.
    ///
    /// # Errors
    ///
    /// [`AdError::ShapeError`] if the input holds more than one variable.
    pub fn scalar(&self) -> Result<T> {
        match self {
            Input::Single(x) => Ok(x.clone()),
            Input::Multi(values) => Err(AdError::shape(
                "a single variable",
                format!("{} variables", values.len()),
            )),
        }
    }

    /// The `i`-th variable. `at(0)` also reads a single-variable input.
    ///
    /// # Errors
    ///
    /// [`AdError::ShapeError`] if `i` is out of range.
    pub fn at(&self, i: usize) -> Result<T> {
        self.as_slice().get(i).cloned().ok_or_else(|| {
            AdError::shape(
                format!("at least {} variables", i + 1),
                format!("{} variables", self.len()),
            )
        })
    }

    /// All variables as a slice.
    pub fn as_slice(&self) -> &[T] {
        match self {
            Input::Single(x) => std::slice::from_ref(x),
            Input::Multi(values) => values,
        }
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// True for a multi-variable input with no variables.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True for single-variable evaluation.
    pub fn is_single(&self) -> bool {
        matches!(self, Input::Single(_))
    }
}

/// A function ℝⁿ → ℝ written once for every differentiation engine.
pub trait Function {
    /// Evaluates the function at `x`.
    fn eval<T: Numeric>(&self, x: &Input<'_, T>) -> Result<T>;
}

impl<F: Function + ?Sized> Function for &F {
    fn eval<T: Numeric>(&self, x: &Input<'_, T>) -> Result<T> {
        (**self).eval(x)
    }
}

/// Object-safe view of a [`Function`], one method per engine.
///
/// Implemented for every `Function` that is `Send + Sync`; there is no need
/// to implement it by hand.
pub trait Differentiable: Send + Sync {
    /// Forward-mode evaluation.
    fn eval_dual(&self, x: &Input<'_, Dual>) -> Result<Dual>;

    /// Reverse-mode evaluation, recording into the graph `x` belongs to.
    fn eval_var<'g>(&self, x: &Input<'_, Var<'g>>) -> Result<Var<'g>>;
}

impl<F: Function + Send + Sync> Differentiable for F {
    fn eval_dual(&self, x: &Input<'_, Dual>) -> Result<Dual> {
        self.eval(x)
    }

    fn eval_var<'g>(&self, x: &Input<'_, Var<'g>>) -> Result<Var<'g>> {
        self.eval(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dualgrad_core::elementary::{cos, sin};

    struct SinPlusCos;

    impl Function for SinPlusCos {
        fn eval<T: Numeric>(&self, x: &Input<'_, T>) -> Result<T> {
            Ok(sin(&x.at(0)?) + cos(&x.at(1)?))
        }
    }

    #[test]
    fn test_from_slice_picks_variant() {
        let one = [2.0];
        let two = [1.0, 2.0];
        assert_eq!(Input::from_slice(&one), Input::Single(2.0));
        assert_eq!(Input::from_slice(&two), Input::Multi(&two[..]));
        assert!(Input::from_slice(&one).is_single());
    }

    #[test]
    fn test_scalar_and_at() {
        let single = Input::Single(4.0);
        assert_eq!(single.scalar().unwrap(), 4.0);
        assert_eq!(single.at(0).unwrap(), 4.0);
        assert!(single.at(1).unwrap_err().is_shape_error());
        assert_eq!(single.len(), 1);

        let values = [1.0, 2.0, 3.0];
        let multi = Input::Multi(&values[..]);
        assert!(multi.scalar().unwrap_err().is_shape_error());
        assert_eq!(multi.at(2).unwrap(), 3.0);
        assert!(multi.at(3).is_err());
        assert_eq!(multi.as_slice(), &values[..]);
    }

    #[test]
    fn test_empty_multi() {
        let empty: Input<'_, f64> = Input::Multi(&[]);
        assert!(empty.is_empty());
        assert!(empty.at(0).is_err());
    }

    #[test]
    fn test_trait_object_dispatch() {
        let f: &dyn Differentiable = &SinPlusCos;
        let seeds = Dual::one_hot(&[1.0, 2.0], 1);
        let y = f.eval_dual(&Input::from_slice(&seeds)).unwrap();
        assert!((y.primal - (1.0f64.sin() + 2.0f64.cos())).abs() < 1e-15);
        assert!((y.tangent + 2.0f64.sin()).abs() < 1e-15);
    }
}
