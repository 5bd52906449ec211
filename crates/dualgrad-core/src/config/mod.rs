//! Configuration utilities for the differentiation drivers.

pub mod evaluation;

// Re-export key items
pub use evaluation::{default_config, EvalConfig, EvalConfigBuilder, Mode, DEFAULT_CONFIG};
