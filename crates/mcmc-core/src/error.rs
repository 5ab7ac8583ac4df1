// SPDX-License-Identifier: Apache-2.0
//! Error kinds surfaced to the host.
//!
//! `MoveError` is deliberately not part of this enum: it is treated as an
//! immediate rejection by the move itself, not propagated to the driver, so
//! it is a move-local concern, not a driver-level one.

use thiserror::Error;

/// No starting state with a finite joint log-probability was found within
/// [`crate::driver::MAX_INIT_TRIES`] attempts. Fatal: the driver cannot run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unable to find a starting state with computable probability after {tries} tries")]
pub struct InitializationError {
    /// Number of redraw attempts made before giving up.
    pub tries: usize,
}

/// A cloned move or monitor references a node by name that either does not
/// exist in the cloned model, or is anonymous. Fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RebindingError {
    /// The original reference had no name to rebind by.
    #[error("cannot rebind an anonymous node reference")]
    AnonymousReference,
    /// No node with this name exists in the cloned model.
    #[error("no node named {0:?} in the cloned model")]
    UnknownName(String),
}

/// A node's `lnProbability` was not a computable number.
///
/// During initialization this is recoverable (the driver retries with a
/// fresh redraw); this variant is what initialization logs before retrying.
/// During steady state, only the debug-build consistency check (drift >
/// 1e-8) produces the `Drift` variant, which is fatal.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NumericError {
    /// A node's density was NaN or infinite.
    #[error("node {name:?} produced a non-computable ln-probability: {value}")]
    NonComputable {
        /// Name of the offending node (empty if anonymous).
        name: String,
        /// The non-finite value that was produced.
        value: String,
    },
    /// The incrementally-maintained joint log-probability drifted from a
    /// fresh re-sum by more than the 1e-8 tolerance.
    #[error("ln-probability drift {drift} exceeds tolerance (cached {cached}, recomputed {recomputed})")]
    Drift {
        /// Absolute difference between cached and recomputed values.
        drift: f64,
        /// The incrementally-maintained cache value.
        cached: f64,
        /// The freshly recomputed value.
        recomputed: f64,
    },
}

/// Top-level error returned by the driver's public API.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum McmcError {
    /// See [`InitializationError`].
    #[error(transparent)]
    Initialization(#[from] InitializationError),
    /// See [`RebindingError`].
    #[error(transparent)]
    Rebinding(#[from] RebindingError),
    /// See [`NumericError`]. Only the `Drift` variant reaches here; the
    /// `NonComputable` variant is logged and retried internally.
    #[error(transparent)]
    Numeric(#[from] NumericError),
}
