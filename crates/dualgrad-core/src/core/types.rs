//! Type definitions and aliases for automatic differentiation.
//!
//! Both engines carry `f64` primals and derivatives; the aliases here keep
//! that choice in one place and expose the nalgebra containers used for
//! Jacobian results.

/// Scalar type carried by both differentiation engines.
pub type Real = f64;

/// Dynamic column vector, used for primal outputs and evaluation points.
pub type DVector = nalgebra::DVector<Real>;

/// Dynamic matrix, used for Jacobians (one row per function).
pub type DMatrix = nalgebra::DMatrix<Real>;

/// Numerical constants.
pub mod constants {
    use super::Real;

    /// Euler's number.
    pub const E: Real = std::f64::consts::E;

    /// Default step for central finite differences.
    pub const FINITE_DIFFERENCE_STEP: Real = 1e-6;

    /// Default relative tolerance when comparing derivatives.
    pub const DEFAULT_TOLERANCE: Real = 1e-8;

    /// Default number of functions before rows are evaluated in parallel.
    pub const DEFAULT_PARALLEL_THRESHOLD: usize = 8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_aliases() {
        let v = DVector::from_vec(vec![1.0, 2.0]);
        let m = DMatrix::from_row_slice(1, 2, &[3.0, 4.0]);
        assert_eq!(v.len(), 2);
        assert_eq!(m[(0, 1)], 4.0);
    }
}
