//! Backward pass implementation for reverse-mode differentiation.
//!
//! The gradient of the seeded root with respect to a node `N` is
//!
//! ```text
//! dRoot/dN = Σ over edges (local, child) of local · dRoot/dchild
//! ```
//!
//! Every node's gradient is computed at most once and cached in the arena,
//! so a node reached through several paths (fan-in) is neither recomputed
//! nor double counted, and the total work is linear in the number of edges.
//! The traversal uses an explicit stack: a node is resolved only after all
//! of its children are, which is the topological order the sum requires.

use crate::graph::{Graph, NodeId, Var};
use dualgrad_core::core::types::constants;
use dualgrad_core::numerical::{numerical_gradient, relative_error};
use dualgrad_core::{AdError, Real, Result};
use std::collections::HashMap;

/// Type alias for gradient storage.
pub type GradientMap = HashMap<NodeId, Real>;

/// dRoot/dNode for the root seeded on `graph`.
///
/// Nodes with no path to the root have gradient 0.
///
/// # Errors
///
/// [`AdError::Unseeded`] if no root has been seeded, [`AdError::StaleNode`]
/// if `node` did not come from the current generation of `graph`.
pub fn grad(graph: &Graph, node: NodeId) -> Result<Real> {
    graph.validate(node)?;
    if graph.root.get().is_none() {
        return Err(AdError::Unseeded);
    }

    let mut nodes = graph.nodes.borrow_mut();
    if let Some(g) = nodes[node.index()].gradient {
        return Ok(g);
    }

    let mut resolved = 0usize;
    let mut stack: Vec<(usize, bool)> = vec![(node.index(), false)];

    while let Some((index, expanded)) = stack.pop() {
        if nodes[index].gradient.is_some() {
            continue;
        }

        if expanded {
            // Children are resolved; sum in recording order.
            let g = nodes[index]
                .edges
                .iter()
                .fold(0.0, |acc, edge| {
                    acc + edge.local * nodes[edge.child.index()].gradient.unwrap_or(0.0)
                });
            nodes[index].gradient = Some(g);
            resolved += 1;
        } else {
            stack.push((index, true));
            for edge in nodes[index].edges.iter().rev() {
                let child = edge.child.index();
                if nodes[child].gradient.is_none() {
                    stack.push((child, false));
                }
            }
        }
    }

    log::trace!("backward from {node}: resolved {resolved} nodes");

    Ok(nodes[node.index()].gradient.unwrap_or(0.0))
}

/// Gradients of the seeded root with respect to each of `nodes`.
pub fn gradients(graph: &Graph, nodes: &[NodeId]) -> Result<Vec<Real>> {
    nodes.iter().map(|&id| grad(graph, id)).collect()
}

/// Seeds `output` and returns the gradient of every node in the graph.
pub fn backward(graph: &Graph, output: NodeId) -> Result<GradientMap> {
    graph.seed(output)?;

    let ids: Vec<NodeId> = {
        let nodes = graph.nodes.borrow();
        nodes
            .iter()
            .enumerate()
            .map(|(index, record)| NodeId::new(index, record.generation))
            .collect()
    };

    let mut map = GradientMap::with_capacity(ids.len());
    for id in ids {
        map.insert(id, grad(graph, id)?);
    }
    Ok(map)
}

/// Computes the value and derivative of a single-variable function with
/// one backward pass.
///
/// # Example
///
/// ```
/// use dualgrad_autodiff::reverse_diff;
///
/// // f(x) = (x + 1)(x - 1)
/// let (value, deriv) = reverse_diff(|x| Ok((x + 1.0) * (x - 1.0)), 3.0).unwrap();
/// assert_eq!(value, 8.0);
/// assert_eq!(deriv, 6.0);
/// ```
pub fn reverse_diff<F>(f: F, x: Real) -> Result<(Real, Real)>
where
    F: for<'g> FnOnce(Var<'g>) -> Result<Var<'g>>,
{
    let graph = Graph::new();
    let input = graph.variable(x);
    let output = f(input)?;
    output.seed();
    Ok((output.value(), input.grad()?))
}

/// Computes the value and gradient of `f: ℝⁿ → ℝ` with one backward pass.
///
/// # Example
///
/// ```
/// use dualgrad_autodiff::reverse_gradient;
///
/// // f(x, y) = x^2 + xy at (3, 4)
/// let (value, grad) = reverse_gradient(|v| Ok(v[0] * v[0] + v[0] * v[1]), &[3.0, 4.0]).unwrap();
/// assert_eq!(value, 21.0);
/// assert_eq!(grad, vec![10.0, 3.0]);
/// ```
pub fn reverse_gradient<F>(f: F, point: &[Real]) -> Result<(Real, Vec<Real>)>
where
    F: for<'g> FnOnce(&[Var<'g>]) -> Result<Var<'g>>,
{
    if point.is_empty() {
        return Err(AdError::shape("at least one variable", "0 variables"));
    }

    let graph = Graph::with_capacity(point.len() * 8);
    let inputs = graph.variables(point);
    let output = f(&inputs)?;
    output.seed();

    let grads = inputs
        .iter()
        .map(|v| v.grad())
        .collect::<Result<Vec<_>>>()?;
    Ok((output.value(), grads))
}

/// Checks reverse-mode gradients against central finite differences.
///
/// # Returns
/// The maximum relative error over all coordinates of `point`.
pub fn check_gradients<F>(f: F, point: &[Real], epsilon: Real) -> Result<Real>
where
    F: for<'g> Fn(&[Var<'g>]) -> Result<Var<'g>>,
{
    let (_, analytical) = reverse_gradient(&f, point)?;

    let value_at = |p: &[Real]| -> Result<Real> {
        let graph = Graph::new();
        let inputs = graph.variables(p);
        Ok(f(&inputs)?.value())
    };
    let numerical = numerical_gradient(value_at, point, epsilon)?;

    let max_error = analytical
        .iter()
        .zip(&numerical)
        .map(|(&a, &n)| relative_error(a, n))
        .fold(0.0, Real::max);

    Ok(max_error)
}

/// [`check_gradients`] with the default finite-difference step.
pub fn check_gradients_default<F>(f: F, point: &[Real]) -> Result<Real>
where
    F: for<'g> Fn(&[Var<'g>]) -> Result<Var<'g>>,
{
    check_gradients(f, point, constants::FINITE_DIFFERENCE_STEP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dualgrad_core::Numeric;

    #[test]
    fn test_backward_single_node() {
        let graph = Graph::new();
        let x = graph.variable(3.0);
        x.seed();
        assert_eq!(x.grad().unwrap(), 1.0);
    }

    #[test]
    fn test_unseeded_graph() {
        let graph = Graph::new();
        let x = graph.variable(3.0);
        let _y = x * 2.0;
        assert_eq!(x.grad(), Err(AdError::Unseeded));
    }

    #[test]
    fn test_disconnected_node_has_zero_gradient() {
        let graph = Graph::new();
        let x = graph.variable(1.0);
        let y = graph.variable(2.0);
        let z = y * 2.0 + 10.0;
        z.seed();
        assert_eq!(x.grad().unwrap(), 0.0);
        assert_eq!(y.grad().unwrap(), 2.0);
    }

    #[test]
    fn test_backward_multiply() {
        let graph = Graph::new();
        let x = graph.variable(2.0);
        let y = graph.variable(3.0);
        let z = x * y;
        z.seed();
        assert_eq!(x.grad().unwrap(), 3.0);
        assert_eq!(y.grad().unwrap(), 2.0);
    }

    #[test]
    fn test_backward_chain() {
        // (x + y) * 2
        let graph = Graph::new();
        let x = graph.variable(3.0);
        let y = graph.variable(4.0);
        let prod = (x + y) * 2.0;
        assert_eq!(prod.value(), 14.0);

        prod.seed();
        assert_eq!(x.grad().unwrap(), 2.0);
        assert_eq!(y.grad().unwrap(), 2.0);
    }

    #[test]
    fn test_gradient_accumulation() {
        let graph = Graph::new();
        let x = graph.variable(5.0);
        let z = x + x;
        z.seed();
        assert_eq!(x.grad().unwrap(), 2.0);
    }

    #[test]
    fn test_diamond_counts_both_paths_once() {
        // a feeds b and c, both feed d: d = sin(a) * a^2
        let graph = Graph::new();
        let a = graph.variable(0.8);
        let b = a.sin();
        let c = a.powi(2).unwrap();
        let d = b * c;
        d.seed();

        let expected = 0.8_f64.cos() * 0.64 + 0.8_f64.sin() * 1.6;
        assert_relative_eq!(a.grad().unwrap(), expected, epsilon = 1e-12);
        // b and c are shared descendants of a; each resolved exactly once
        assert_relative_eq!(b.grad().unwrap(), 0.64);
        assert_relative_eq!(c.grad().unwrap(), 0.8_f64.sin());
    }

    #[test]
    fn test_deep_shared_chain_is_linear() {
        // x_{k+1} = x_k + x_k doubles the number of paths at every level.
        // Without memoisation this would visit 2^60 paths.
        let graph = Graph::new();
        let x = graph.variable(1.0);
        let mut y = x;
        for _ in 0..60 {
            y = y + y;
        }
        y.seed();
        assert_eq!(x.grad().unwrap(), 2.0_f64.powi(60));
    }

    #[test]
    fn test_reseeding_discards_cached_gradients() {
        let graph = Graph::new();
        let x = graph.variable(2.0);
        let f = x * 3.0;
        let g = x * x;

        f.seed();
        assert_eq!(x.grad().unwrap(), 3.0);

        g.seed();
        assert_eq!(x.grad().unwrap(), 4.0);
    }

    #[test]
    fn test_reset_prevents_contamination() {
        let mut graph = Graph::new();
        let x = graph.variable(2.0).id();

        {
            let xv = graph.var(x).unwrap();
            (xv * 7.0).seed();
        }
        assert_eq!(graph.grad(x).unwrap(), 7.0);

        graph.reset();
        assert_eq!(graph.grad(x), Err(AdError::Unseeded));

        {
            let xv = graph.var(x).unwrap();
            (xv * xv).seed();
        }
        assert_eq!(graph.grad(x).unwrap(), 4.0);
        assert_eq!(graph.edges(x).unwrap().len(), 2);
    }

    #[test]
    fn test_backward_map() {
        let graph = Graph::new();
        let x = graph.variable(2.0);
        let y = graph.variable(3.0);
        let z = x * y + 1.0;

        let map = backward(&graph, z.id()).unwrap();
        assert_eq!(map.len(), graph.len());
        assert_eq!(map[&x.id()], 3.0);
        assert_eq!(map[&y.id()], 2.0);
        assert_eq!(map[&z.id()], 1.0);
    }

    #[test]
    fn test_gradients_batch() {
        let graph = Graph::new();
        let v = graph.variables(&[1.0, 2.0]);
        let z = v[0] * v[0] + v[1] * 3.0 + 5.0;
        z.seed();
        let ids: Vec<NodeId> = v.iter().map(|x| x.id()).collect();
        assert_eq!(gradients(&graph, &ids).unwrap(), vec![2.0, 3.0]);
    }

    #[test]
    fn test_reverse_diff_quotient() {
        let (value, deriv) = reverse_diff(|x| (x * 5.0 + 50.0) / (x * x * 2.0), 5.0).unwrap();
        assert_relative_eq!(value, 1.5);
        assert_relative_eq!(deriv, -0.5);
    }

    #[test]
    fn test_reverse_gradient_propagates_domain_error() {
        let err = reverse_gradient(|v| v[0].ln(), &[0.0]).unwrap_err();
        assert!(err.is_domain_error());
        let err = reverse_gradient(|v| v[0].ln(), &[]).unwrap_err();
        assert!(err.is_shape_error());
    }

    #[test]
    fn test_check_gradients() {
        let error = check_gradients_default(
            |v| {
                let s = v[0].sin() * v[1];
                Ok(s + v[1].exp()?)
            },
            &[0.7, -0.3],
        )
        .unwrap();
        assert!(error < 1e-6, "max relative error {error}");
    }
}
