//! Drivers that differentiate a list of functions at a point.
//!
//! [`ForwardAD`] and [`ReverseAD`] compute eagerly on construction and then
//! expose the values and the Jacobian through getters. They differ only in
//! the engine they force; the parallelism settings come from the
//! [`EvalConfig`] passed to `with_config`, or from the process-wide default.

use crate::function::Differentiable;
use crate::jacobian::{jacobian, JacobianResult};
use dualgrad_core::config::{default_config, EvalConfig, Mode};
use dualgrad_core::{DMatrix, DVector, Real, Result};

fn with_mode(config: &EvalConfig, mode: Mode) -> EvalConfig {
    EvalConfig {
        mode,
        ..config.clone()
    }
}

/// Forward-mode differentiation of a list of functions.
///
/// Each function costs one forward pass per variable.
///
/// # Example
///
/// ```
/// use dualgrad::prelude::*;
///
/// /// f(x) = 4x + 3
/// struct Line;
///
/// impl Function for Line {
///     fn eval<T: Numeric>(&self, x: &Input<'_, T>) -> Result<T> {
///         Ok(x.scalar()? * 4.0 + 3.0)
///     }
/// }
///
/// let ad = ForwardAD::new(&[&Line], &[2.0]).unwrap();
/// assert_eq!(ad.primal()[0], 11.0);
/// assert_eq!(ad.jacobian()[(0, 0)], 4.0);
/// ```
#[derive(Debug, Clone)]
pub struct ForwardAD {
    point: Vec<Real>,
    result: JacobianResult,
}

impl ForwardAD {
    /// Differentiates `functions` at `point` with the default configuration.
    pub fn new(functions: &[&dyn Differentiable], point: &[Real]) -> Result<Self> {
        Self::with_config(functions, point, default_config())
    }

    /// Differentiates `functions` at `point`; `config.mode` is ignored.
    pub fn with_config(
        functions: &[&dyn Differentiable],
        point: &[Real],
        config: &EvalConfig,
    ) -> Result<Self> {
        let result = jacobian(functions, point, &with_mode(config, Mode::Forward))?;
        Ok(Self {
            point: point.to_vec(),
            result,
        })
    }

    /// Function values at the point.
    pub fn primal(&self) -> &DVector {
        &self.result.primal
    }

    /// The Jacobian, one row per function.
    pub fn jacobian(&self) -> &DMatrix {
        &self.result.jacobian
    }

    /// The point the functions were differentiated at.
    pub fn point(&self) -> &[Real] {
        &self.point
    }

    pub fn num_functions(&self) -> usize {
        self.result.nrows()
    }

    pub fn num_variables(&self) -> usize {
        self.point.len()
    }

    pub fn result(&self) -> &JacobianResult {
        &self.result
    }

    pub fn into_result(self) -> JacobianResult {
        self.result
    }
}

/// Reverse-mode differentiation of a list of functions.
///
/// Each function costs one evaluation and one backward pass, whatever the
/// number of variables.
///
/// # Example
///
/// ```
/// use dualgrad::prelude::*;
///
/// /// f(x) = (5 x0 + 50) / (2 x1^2)
/// struct Ratio;
///
/// impl Function for Ratio {
///     fn eval<T: Numeric>(&self, x: &Input<'_, T>) -> Result<T> {
///         let (x0, x1) = (x.at(0)?, x.at(1)?);
///         (x0 * 5.0 + 50.0).try_div(&(x1.clone() * x1 * 2.0))
///     }
/// }
///
/// /// f(x) = 10 + 2 x1
/// struct Line;
///
/// impl Function for Line {
///     fn eval<T: Numeric>(&self, x: &Input<'_, T>) -> Result<T> {
///         Ok(x.at(1)? * 2.0 + 10.0)
///     }
/// }
///
/// let ad = ReverseAD::new(&[&Ratio, &Line], &[1.0, 2.0]).unwrap();
/// assert_eq!(ad.flattened_jacobian(), vec![0.625, -6.875, 0.0, 2.0]);
/// ```
#[derive(Debug, Clone)]
pub struct ReverseAD {
    point: Vec<Real>,
    result: JacobianResult,
}

impl ReverseAD {
    /// Differentiates `functions` at `point` with the default configuration.
    pub fn new(functions: &[&dyn Differentiable], point: &[Real]) -> Result<Self> {
        Self::with_config(functions, point, default_config())
    }

    /// Differentiates `functions` at `point`; `config.mode` is ignored.
    pub fn with_config(
        functions: &[&dyn Differentiable],
        point: &[Real],
        config: &EvalConfig,
    ) -> Result<Self> {
        let result = jacobian(functions, point, &with_mode(config, Mode::Reverse))?;
        Ok(Self {
            point: point.to_vec(),
            result,
        })
    }

    /// Function values at the point.
    pub fn primal(&self) -> &DVector {
        &self.result.primal
    }

    /// The Jacobian, one row per function.
    pub fn jacobian(&self) -> &DMatrix {
        &self.result.jacobian
    }

    /// The Jacobian in row-major order.
    pub fn flattened_jacobian(&self) -> Vec<Real> {
        self.result.flattened()
    }

    /// The point the functions were differentiated at.
    pub fn point(&self) -> &[Real] {
        &self.point
    }

    pub fn num_functions(&self) -> usize {
        self.result.nrows()
    }

    pub fn num_variables(&self) -> usize {
        self.point.len()
    }

    pub fn result(&self) -> &JacobianResult {
        &self.result
    }

    pub fn into_result(self) -> JacobianResult {
        self.result
    }
}
