//! # dualgrad
//!
//! Automatic differentiation in forward and reverse mode, with drivers that
//! assemble the Jacobian of a list of functions.
//!
//! This crate re-exports the engines from `dualgrad-autodiff` and the shared
//! types from `dualgrad-core`, and adds the user-facing layer:
//!
//! - [`Function`]: a function written once, generically over [`Numeric`]
//! - [`Input`]: single- or multi-variable argument chosen by the driver
//! - [`ForwardAD`] / [`ReverseAD`]: eager Jacobian drivers
//! - [`jacobian`]: the same computation driven by an [`EvalConfig`]
//!
//! ## Quick Start
//!
//! ```
//! use dualgrad::prelude::*;
//!
//! /// f(x) = log_2(x) + e^x - e
//! struct Curve;
//!
//! impl Function for Curve {
//!     fn eval<T: Numeric>(&self, x: &Input<'_, T>) -> Result<T> {
//!         let x = x.scalar()?;
//!         Ok(elementary::log_base(&x, 2.0)? + elementary::exp(&x)? - elementary::E)
//!     }
//! }
//!
//! let forward = ForwardAD::new(&[&Curve], &[2.0])?;
//! let reverse = ReverseAD::new(&[&Curve], &[2.0])?;
//! assert!((forward.primal()[0] - 5.6707742704).abs() < 1e-9);
//! assert!((forward.jacobian()[(0, 0)] - reverse.jacobian()[(0, 0)]).abs() < 1e-12);
//! # Ok::<(), AdError>(())
//! ```
//!
//! ## Features
//!
//! - `parallel` (default): evaluate Jacobian rows on the rayon pool
//! - `serde`: serialization of [`EvalConfig`], [`Mode`] and [`JacobianResult`]

pub mod driver;
pub mod function;
pub mod jacobian;

pub use driver::{ForwardAD, ReverseAD};
pub use function::{Differentiable, Function, Input};
pub use jacobian::{jacobian, JacobianResult};

// Re-export the engines and the shared types
pub use dualgrad_autodiff::{
    backward, check_gradients, forward_diff, forward_gradient, reverse_diff, reverse_gradient,
    Dual, Graph, NodeId, Var,
};
pub use dualgrad_core::config::{default_config, EvalConfig, EvalConfigBuilder, Mode};
pub use dualgrad_core::{constants, elementary, AdError, DMatrix, DVector, Numeric, Real, Result};

// Re-export key dependencies
pub use nalgebra;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::driver::{ForwardAD, ReverseAD};
    pub use crate::function::{Differentiable, Function, Input};
    pub use crate::jacobian::{jacobian, JacobianResult};
    pub use dualgrad_autodiff::prelude::*;
}
