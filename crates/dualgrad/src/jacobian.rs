//! Jacobian assembly for a list of functions at one point.
//!
//! Each function contributes one row. Forward mode fills a row with one
//! one-hot pass per variable; reverse mode fills it with a single backward
//! pass. Rows are independent, so with the `parallel` feature they may be
//! evaluated on the rayon pool, each reverse-mode row in its own [`Graph`].
//! Sequential reverse mode reuses one graph: the seed variables are created
//! once and the graph is reset after every function.

use crate::function::{Differentiable, Input};
use dualgrad_autodiff::{gradients, Dual, Graph, NodeId};
use dualgrad_core::config::{EvalConfig, Mode};
use dualgrad_core::{AdError, DMatrix, DVector, Real, Result};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Value and gradient of one function.
type Row = (Real, Vec<Real>);

/// Primal values and Jacobian of a list of functions.
///
/// Row `i` of `jacobian` is the gradient of function `i`; column `j` is the
/// derivative with respect to variable `j`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JacobianResult {
    /// Function values at the point
    pub primal: DVector,
    /// `num_functions × num_variables` matrix of partial derivatives
    pub jacobian: DMatrix,
}

impl JacobianResult {
    fn from_rows(rows: Vec<Row>, ncols: usize) -> Self {
        let nrows = rows.len();
        let mut primal = Vec::with_capacity(nrows);
        let mut entries = Vec::with_capacity(nrows * ncols);
        for (value, gradient) in rows {
            primal.push(value);
            entries.extend(gradient);
        }

        Self {
            primal: DVector::from_vec(primal),
            jacobian: DMatrix::from_row_slice(nrows, ncols, &entries),
        }
    }

    /// Number of functions.
    pub fn nrows(&self) -> usize {
        self.jacobian.nrows()
    }

    /// Number of variables.
    pub fn ncols(&self) -> usize {
        self.jacobian.ncols()
    }

    /// The Jacobian in row-major order.
    pub fn flattened(&self) -> Vec<Real> {
        self.jacobian.transpose().as_slice().to_vec()
    }

    /// The gradient of function `i`, if there is one.
    pub fn row(&self, i: usize) -> Option<Vec<Real>> {
        (i < self.nrows()).then(|| self.jacobian.row(i).iter().copied().collect())
    }
}

/// Computes the values and Jacobian of `functions` at `point`.
///
/// The engine is chosen by `config.mode`; rows are evaluated in parallel
/// when `config.use_parallel` allows it and the `parallel` feature is on.
///
/// # Errors
///
/// - [`AdError::ShapeError`] if `functions` or `point` is empty
/// - [`AdError::DomainError`] if a coordinate of `point` is not finite, or a
///   function leaves the domain of one of its operations
pub fn jacobian(
    functions: &[&dyn Differentiable],
    point: &[Real],
    config: &EvalConfig,
) -> Result<JacobianResult> {
    validate(functions, point)?;

    log::debug!(
        "evaluating {}x{} Jacobian in {} mode",
        functions.len(),
        point.len(),
        config.mode
    );

    let rows = evaluate_rows(functions, point, config)?;
    Ok(JacobianResult::from_rows(rows, point.len()))
}

fn validate(functions: &[&dyn Differentiable], point: &[Real]) -> Result<()> {
    if functions.is_empty() {
        return Err(AdError::shape("at least one function", "0 functions"));
    }
    if point.is_empty() {
        return Err(AdError::shape("at least one variable", "0 variables"));
    }
    if let Some(&x) = point.iter().find(|x| !x.is_finite()) {
        return Err(AdError::domain("jacobian", x, "evaluation point must be finite"));
    }
    Ok(())
}

fn evaluate_rows(
    functions: &[&dyn Differentiable],
    point: &[Real],
    config: &EvalConfig,
) -> Result<Vec<Row>> {
    #[cfg(feature = "parallel")]
    if config.use_parallel(functions.len()) {
        log::debug!("evaluating {} rows on the rayon pool", functions.len());
        return functions
            .par_iter()
            .enumerate()
            .map(|(i, f)| {
                let row = match config.mode {
                    Mode::Forward => forward_row(*f, point),
                    Mode::Reverse => reverse_row(*f, point),
                }?;
                log::debug!("row {i}: value {}", row.0);
                Ok(row)
            })
            .collect();
    }

    match config.mode {
        Mode::Forward => functions
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let row = forward_row(*f, point)?;
                log::debug!("row {i}: value {}", row.0);
                Ok(row)
            })
            .collect(),
        Mode::Reverse => reverse_rows_shared(functions, point),
    }
}

/// One forward pass per variable, each seeding a single tangent.
fn forward_row(f: &dyn Differentiable, point: &[Real]) -> Result<Row> {
    let mut value = 0.0;
    let mut gradient = Vec::with_capacity(point.len());
    for i in 0..point.len() {
        let seeds = Dual::one_hot(point, i);
        let y = f.eval_dual(&Input::from_slice(&seeds))?;
        value = y.primal;
        gradient.push(y.tangent);
    }
    Ok((value, gradient))
}

/// A reverse-mode row in a graph of its own.
fn reverse_row(f: &dyn Differentiable, point: &[Real]) -> Result<Row> {
    let graph = Graph::with_capacity(point.len() * 16);
    let seeds: Vec<NodeId> = graph.variables(point).iter().map(|v| v.id()).collect();
    reverse_row_in(&graph, &seeds, f)
}

/// Every reverse-mode row through one graph, reset between functions.
fn reverse_rows_shared(functions: &[&dyn Differentiable], point: &[Real]) -> Result<Vec<Row>> {
    let mut graph = Graph::with_capacity(point.len() * 16);
    let seeds: Vec<NodeId> = graph.variables(point).iter().map(|v| v.id()).collect();
    reverse_rows_in(&mut graph, &seeds, functions)
}

/// Evaluates each function against `seeds`, leaving only the seeds behind.
fn reverse_rows_in(
    graph: &mut Graph,
    seeds: &[NodeId],
    functions: &[&dyn Differentiable],
) -> Result<Vec<Row>> {
    let mut rows = Vec::with_capacity(functions.len());
    for (i, f) in functions.iter().enumerate() {
        let row = reverse_row_in(graph, seeds, *f)?;
        log::debug!("row {i}: value {} ({} nodes recorded)", row.0, graph.len());
        rows.push(row);
        graph.reset();
    }
    Ok(rows)
}

fn reverse_row_in(graph: &Graph, seeds: &[NodeId], f: &dyn Differentiable) -> Result<Row> {
    let inputs = seeds
        .iter()
        .map(|&id| graph.var(id))
        .collect::<Result<Vec<_>>>()?;
    let output = f.eval_var(&Input::from_slice(&inputs))?;
    output.seed();
    Ok((output.value(), gradients(graph, seeds)?))
}
