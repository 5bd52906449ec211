//! Benchmarks comparing forward and reverse Jacobian evaluation
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dualgrad::elementary::{exp, ln, sin, tanh};
use dualgrad::prelude::*;

/// Σ sin(x_i) · x_{i+1} + ln(1 + x_i^2) + tanh(x_i) · e^{x_i / n}
#[derive(Debug)]
struct Chain;

impl Function for Chain {
    fn eval<T: Numeric>(&self, x: &Input<'_, T>) -> Result<T> {
        let xs = x.as_slice();
        let n = xs.len() as Real;
        let mut acc = xs[0].lift(0.0);
        for (i, xi) in xs.iter().enumerate() {
            let next = xs[(i + 1) % xs.len()].clone();
            acc = acc + sin(xi) * next;
            acc = acc + ln(&(xi.clone() * xi.clone() + 1.0))?;
            acc = acc + tanh(xi) * exp(&(xi.clone() * (1.0 / n)))?;
        }
        Ok(acc)
    }
}

fn point(n: usize) -> Vec<Real> {
    (0..n).map(|i| 0.1 * (i as Real) - 0.5).collect()
}

fn benchmark_single_function(c: &mut Criterion) {
    let mut group = c.benchmark_group("gradient");

    for &n in &[2, 8, 32, 128] {
        let x = point(n);
        for mode in [Mode::Forward, Mode::Reverse] {
            let config = EvalConfigBuilder::new()
                .mode(mode)
                .parallel(false)
                .build()
                .unwrap();
            group.bench_with_input(BenchmarkId::new(mode.to_string(), n), &n, |b, _| {
                b.iter(|| jacobian(&[&Chain], black_box(&x), &config))
            });
        }
    }

    group.finish();
}

fn benchmark_many_functions(c: &mut Criterion) {
    let mut group = c.benchmark_group("jacobian_rows");
    let x = point(16);

    for &m in &[4, 16, 64] {
        let functions: Vec<&dyn Differentiable> = vec![&Chain as &dyn Differentiable; m];
        for parallel in [false, true] {
            let config = EvalConfigBuilder::new()
                .mode(Mode::Reverse)
                .parallel(parallel)
                .parallel_threshold(1)
                .build()
                .unwrap();
            let label = if parallel { "parallel" } else { "sequential" };
            group.bench_with_input(BenchmarkId::new(label, m), &m, |b, _| {
                b.iter(|| jacobian(black_box(&functions), &x, &config))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, benchmark_single_function, benchmark_many_functions);
criterion_main!(benches);
