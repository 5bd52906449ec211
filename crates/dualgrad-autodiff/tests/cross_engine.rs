//! Consistency laws between the forward and reverse engines.

use approx::assert_relative_eq;
use dualgrad_autodiff::prelude::*;
use dualgrad_autodiff::{check_gradients_default, gradients};
use dualgrad_core::elementary::{cos, exp, ln, logistic, sin, sqrt, tanh};
use proptest::prelude::*;

/// A function exercising every kind of node: shared subexpressions,
/// constants on both sides, fallible and total transcendentals.
fn mixed<T: Numeric>(x: &[T]) -> Result<T> {
    let a = x[0].clone();
    let b = x[1].clone();
    let shared = a.clone() * b.clone();
    let left = sin(&shared) + exp(&(b.clone() * 0.5))?;
    let right = sqrt(&(a.clone() * a.clone() + 1.0))? * tanh(&shared);
    let ratio = left.try_div(&(cos(&a) * cos(&a) + 2.0))?;
    Ok(ratio - right + ln(&(b.clone() * b + 3.0))? * 2.0)
}

fn quadratic<T: Numeric>(x: &[T]) -> Result<T> {
    Ok(x[0].clone() * x[0].clone() + x[1].clone() * 3.0 + 5.0)
}

fn sigmoidal<T: Numeric>(x: &[T]) -> Result<T> {
    logistic(&(x[0].clone() - x[1].clone()), 2.0, 1.5, 0.25)
}

proptest! {
    #[test]
    fn forward_tangent_equals_reverse_gradient(a in -3.0..3.0f64, b in -3.0..3.0f64) {
        let (fv, fg) = forward_gradient(mixed::<Dual>, &[a, b]).unwrap();
        let (rv, rg) = reverse_gradient(|v| mixed(v), &[a, b]).unwrap();

        prop_assert!((fv - rv).abs() <= 1e-12 * fv.abs().max(1.0));
        for (f, r) in fg.iter().zip(&rg) {
            prop_assert!((f - r).abs() <= 1e-10 * f.abs().max(1.0), "forward {} vs reverse {}", f, r);
        }
    }

    #[test]
    fn gradient_is_linear(a in -2.0..2.0f64, b in -2.0..2.0f64, ca in -5.0..5.0f64, cb in -5.0..5.0f64) {
        let (_, gf) = reverse_gradient(|v| quadratic(v), &[a, b]).unwrap();
        let (_, gg) = reverse_gradient(|v| sigmoidal(v), &[a, b]).unwrap();
        let (_, combined) = reverse_gradient(
            |v| Ok(quadratic(v)? * ca + sigmoidal(v)? * cb),
            &[a, b],
        )
        .unwrap();

        for i in 0..2 {
            let expected = ca * gf[i] + cb * gg[i];
            prop_assert!((combined[i] - expected).abs() <= 1e-9 * expected.abs().max(1.0));
        }
    }

    #[test]
    fn repeated_evaluation_is_idempotent(a in -3.0..3.0f64, b in -3.0..3.0f64) {
        let first = reverse_gradient(|v| mixed(v), &[a, b]).unwrap();
        // an unrelated evaluation in between must not leak into the next one
        let _ = reverse_gradient(|v| quadratic(v), &[b, a]).unwrap();
        let second = reverse_gradient(|v| mixed(v), &[a, b]).unwrap();
        prop_assert_eq!(first, second);

        let first = forward_gradient(mixed::<Dual>, &[a, b]).unwrap();
        let _ = forward_gradient(quadratic::<Dual>, &[b, a]).unwrap();
        let second = forward_gradient(mixed::<Dual>, &[a, b]).unwrap();
        prop_assert_eq!(first, second);
    }
}

#[test]
fn test_shared_graph_reused_across_functions() {
    let mut graph = Graph::new();
    let seeds: Vec<NodeId> = graph.variables(&[1.0, 2.0]).iter().map(|v| v.id()).collect();

    let mut rows = Vec::new();
    for pass in 0..2 {
        for which in 0..2 {
            {
                let vars: Vec<Var<'_>> = seeds.iter().map(|&id| graph.var(id).unwrap()).collect();
                let out = if which == 0 {
                    quadratic(&vars).unwrap()
                } else {
                    mixed(&vars).unwrap()
                };
                out.seed();
            }
            let row = gradients(&graph, &seeds).unwrap();
            if pass == 0 {
                rows.push(row);
            } else {
                assert_eq!(rows[which], row, "row {which} changed after reuse");
            }
            graph.reset();
        }
    }

    let (_, expected) = forward_gradient(mixed::<Dual>, &[1.0, 2.0]).unwrap();
    assert_relative_eq!(rows[1][0], expected[0], epsilon = 1e-12);
    assert_relative_eq!(rows[1][1], expected[1], epsilon = 1e-12);
}

#[test]
fn test_reverse_matches_finite_differences() {
    let error = check_gradients_default(|v| mixed(v), &[0.4, -1.1]).unwrap();
    assert!(error < 1e-6, "max relative error {error}");
}

#[test]
fn test_domain_errors_agree() {
    let f = |x: &[Dual]| x[0].ln();
    let forward = forward_gradient(f, &[-1.0]).unwrap_err();
    let reverse = reverse_gradient(|v| v[0].ln(), &[-1.0]).unwrap_err();
    assert_eq!(forward, reverse);
}
