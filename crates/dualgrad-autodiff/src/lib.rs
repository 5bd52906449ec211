//! Forward- and reverse-mode automatic differentiation engines.
//!
//! This crate provides the two differentiation kernels. Both implement
//! [`Numeric`](dualgrad_core::Numeric), so a function body written against
//! that trait runs unchanged in either mode.
//!
//! # Features
//!
//! - **Forward mode**: [`Dual`] numbers propagate a primal and a tangent in a
//!   single pass; no graph is built
//! - **Reverse mode**: [`Var`] values record a computation graph in a
//!   [`Graph`] arena; one backward pass yields every partial
//! - **Shared derivative rules**: both engines draw their local partials and
//!   domain checks from [`ops`], so they cannot disagree
//!
//! # Architecture
//!
//! 1. **Ops**: value and local partials of every operation
//! 2. **Dual**: forward kernel contracting partials with tangents
//! 3. **Graph**: arena of nodes with generation-checked handles
//! 4. **Backward**: memoised gradient accumulation from the seeded root

pub mod backward;
pub mod dual;
pub mod graph;
pub mod ops;

// Re-export key types
pub use backward::{
    backward, check_gradients, check_gradients_default, grad, gradients, reverse_diff,
    reverse_gradient, GradientMap,
};
pub use dual::{forward_diff, forward_gradient, Dual};
pub use graph::{Edge, Graph, NodeId, Var};
pub use ops::{BinaryOp, BinaryPartials, UnaryOp, UnaryPartials};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::backward::{reverse_diff, reverse_gradient, GradientMap};
    pub use crate::dual::{forward_diff, forward_gradient, Dual};
    pub use crate::graph::{Graph, NodeId, Var};
    pub use dualgrad_core::elementary;
    pub use dualgrad_core::prelude::*;
}
