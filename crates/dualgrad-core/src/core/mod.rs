//! Core traits and types for automatic differentiation.

pub mod domain;
pub mod error;
pub mod numeric;
pub mod types;

// Re-export core types
pub use error::*;
pub use numeric::*;
pub use types::*;
