//! Evaluation configuration for the Jacobian drivers.
//!
//! A process-wide default is read once from the environment; callers that
//! need something else build their own [`EvalConfig`] with
//! [`EvalConfigBuilder`].

use crate::core::error::{AdError, Result};
use crate::core::types::constants;
use once_cell::sync::Lazy;
use std::env;
use std::fmt;
use std::str::FromStr;

/// Environment variable selecting the default differentiation mode.
pub const MODE_ENV: &str = "DUALGRAD_MODE";

/// Environment variable selecting the default parallel threshold.
pub const PARALLEL_THRESHOLD_ENV: &str = "DUALGRAD_PARALLEL_THRESHOLD";

/// Which engine a driver uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// Dual-number propagation, one pass per variable.
    #[default]
    Forward,
    /// Graph recording followed by one backward pass per function.
    Reverse,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Forward => write!(f, "forward"),
            Mode::Reverse => write!(f, "reverse"),
        }
    }
}

impl FromStr for Mode {
    type Err = AdError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" | "fwd" => Ok(Mode::Forward),
            "reverse" | "rev" => Ok(Mode::Reverse),
            other => Err(AdError::invalid_configuration(
                "mode",
                format!("unknown mode '{other}', expected 'forward' or 'reverse'"),
            )),
        }
    }
}

/// Configuration for a Jacobian evaluation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvalConfig {
    /// Engine used by [`jacobian`](../../dualgrad/fn.jacobian.html).
    pub mode: Mode,
    /// Whether rows may be evaluated in parallel.
    pub parallel: bool,
    /// Minimum number of functions before rows are evaluated in parallel.
    pub parallel_threshold: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Forward,
            parallel: true,
            parallel_threshold: constants::DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl EvalConfig {
    /// Reads the configuration from the environment, falling back to the
    /// defaults for any variable that is missing or malformed.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = env::var(MODE_ENV) {
            match raw.parse::<Mode>() {
                Ok(mode) => config.mode = mode,
                Err(err) => log::warn!("ignoring {MODE_ENV}: {err}"),
            }
        }

        if let Ok(raw) = env::var(PARALLEL_THRESHOLD_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(threshold) if threshold >= 1 => config.parallel_threshold = threshold,
                _ => log::warn!("ignoring {PARALLEL_THRESHOLD_ENV}: '{raw}' is not a positive integer"),
            }
        }

        config
    }

    /// Whether `num_functions` rows should be evaluated in parallel.
    pub fn use_parallel(&self, num_functions: usize) -> bool {
        self.parallel && num_functions >= self.parallel_threshold
    }
}

/// Global default configuration, read from the environment on first use.
pub static DEFAULT_CONFIG: Lazy<EvalConfig> = Lazy::new(EvalConfig::from_env);

/// Get the default evaluation configuration.
pub fn default_config() -> &'static EvalConfig {
    &DEFAULT_CONFIG
}

/// Builder for creating a custom evaluation configuration.
pub struct EvalConfigBuilder {
    config: EvalConfig,
}

impl EvalConfigBuilder {
    /// Create a new builder starting from the built-in defaults.
    pub fn new() -> Self {
        Self {
            config: EvalConfig::default(),
        }
    }

    /// Set the differentiation mode.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Enable or disable parallel row evaluation.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Set the minimum function count for parallel evaluation.
    pub fn parallel_threshold(mut self, threshold: usize) -> Self {
        self.config.parallel_threshold = threshold;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<EvalConfig> {
        if self.config.parallel_threshold == 0 {
            return Err(AdError::invalid_configuration(
                "parallel_threshold",
                "must be at least 1",
            ));
        }
        Ok(self.config)
    }
}

impl Default for EvalConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
