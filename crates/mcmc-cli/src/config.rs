// SPDX-License-Identifier: Apache-2.0
//! JSON run configuration, loaded from an optional file and overridden by
//! CLI flags.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error loading or parsing a run configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("io error reading {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file's contents were not valid JSON for `RunConfig`.
    #[error("invalid config JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Tunable parameters for a single-chain run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of burn-in generations, auto-tuning every `tuning_interval`.
    pub burnin_generations: u64,
    /// Interval, in generations, between auto-tune adjustments.
    pub tuning_interval: u64,
    /// Number of steady-state generations to run after burn-in.
    pub generations: u64,
    /// Initial `ScaleMove` tuning parameter.
    pub initial_lambda: f64,
    /// Tempering heat for the single chain this binary runs.
    pub chain_heat: f64,
    /// Interval, in generations, between monitor samples.
    pub monitor_interval: u64,
    /// PRNG seed, for reproducible runs.
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            burnin_generations: 1_000,
            tuning_interval: 100,
            generations: 10_000,
            initial_lambda: 1.0,
            chain_heat: 1.0,
            monitor_interval: 100,
            seed: 42,
        }
    }
}

impl RunConfig {
    /// Loads a `RunConfig` from a JSON file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Serde`] if its contents are not valid `RunConfig` JSON.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }
}
