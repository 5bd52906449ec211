//! Core traits and types for automatic differentiation.
//!
//! This crate provides the pieces shared by the forward and reverse
//! differentiation engines: the error taxonomy, the scalar and container
//! aliases, the [`Numeric`] operator contract both engines implement, the
//! elementary-function library written against that contract, and the
//! evaluation configuration consumed by the drivers.
//!
//! # Modules
//!
//! - [`core`]: errors, domain checks, `Numeric`, type aliases
//! - [`elementary`]: generic elementary functions (`exp`, `ln`, `csc`, ...)
//! - [`config`]: evaluation mode and parallelism settings
//! - [`numerical`]: finite-difference gradients for derivative checks

pub mod config;
pub mod core;
pub mod elementary;
pub mod numerical;
pub mod utils;

// Re-export commonly used items at the crate root
pub use crate::core::error::{AdError, Result};
pub use crate::core::numeric::Numeric;
pub use crate::core::types::{constants, DMatrix, DVector, Real};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use dualgrad_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{EvalConfig, EvalConfigBuilder, Mode};
    pub use crate::core::error::{AdError, Result};
    pub use crate::core::numeric::Numeric;
    pub use crate::core::types::{constants, DMatrix, DVector, Real};
}
