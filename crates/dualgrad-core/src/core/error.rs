//! Error types for automatic differentiation.
//!
//! This module defines the error taxonomy shared by both differentiation
//! engines and the driver layer built on top of them.

use thiserror::Error;

/// Errors that can occur while evaluating or differentiating a function.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdError {
    /// An operation was applied outside its mathematical domain.
    ///
    /// This error occurs for inputs such as the logarithm of a non-positive
    /// value, division by exact zero, or any operation whose value or local
    /// derivative would not be finite.
    #[error("Domain error in {operation} at {value}: {reason}")]
    DomainError {
        /// Name of the failing operation
        operation: String,
        /// Primal value of the offending input
        value: f64,
        /// Description of the violated constraint
        reason: String,
    },

    /// Function or variable count does not match what was expected.
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeError {
        /// Expected shape
        expected: String,
        /// Actual shape
        actual: String,
    },

    /// A gradient was requested before any output node was seeded.
    #[error("No output node has been seeded; call seed() before requesting gradients")]
    Unseeded,

    /// A node handle was used after the graph that issued it was reset.
    #[error("Stale node handle #{index} (generation {generation}, graph is at generation {current})")]
    StaleNode {
        /// Arena index of the handle
        index: usize,
        /// Generation the handle was issued in
        generation: u32,
        /// Current generation of the graph
        current: u32,
    },

    /// Invalid evaluation configuration.
    #[error("Invalid configuration for {parameter}: {reason}")]
    InvalidConfiguration {
        /// Name of the invalid parameter
        parameter: String,
        /// Description of the configuration error
        reason: String,
    },
}

impl AdError {
    /// Create a DomainError for `operation` evaluated at `value`.
    pub fn domain<S1, S2>(operation: S1, value: f64, reason: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self::DomainError {
            operation: operation.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Create a ShapeError.
    pub fn shape<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::ShapeError {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a StaleNode error.
    pub fn stale_node(index: usize, generation: u32, current: u32) -> Self {
        Self::StaleNode {
            index,
            generation,
            current,
        }
    }

    /// Create an InvalidConfiguration error.
    pub fn invalid_configuration<S1, S2>(parameter: S1, reason: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self::InvalidConfiguration {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this is a DomainError.
    pub fn is_domain_error(&self) -> bool {
        matches!(self, Self::DomainError { .. })
    }

    /// Returns true if this is a ShapeError.
    pub fn is_shape_error(&self) -> bool {
        matches!(self, Self::ShapeError { .. })
    }
}

/// Result type alias for differentiation operations.
pub type Result<T> = std::result::Result<T, AdError>;
