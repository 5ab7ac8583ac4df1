// SPDX-License-Identifier: Apache-2.0
//! Scalar values carried by DAG nodes.

use std::fmt;

/// The value carried by a constant, deterministic, or stochastic node.
///
/// This core models only real-valued scalar random variables; richer
/// value types (vectors, trees, discrete categories) are a language-layer
/// concern outside this crate's scope.
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug, Default)]
pub struct NodeValue(pub f64);

impl NodeValue {
    /// Returns the underlying `f64`.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl From<f64> for NodeValue {
    fn from(v: f64) -> Self {
        Self(v)
    }
}

impl fmt::Display for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
