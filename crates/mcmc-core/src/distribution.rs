// SPDX-License-Identifier: Apache-2.0
//! The contract a stochastic node's density must honor.
//!
//! Concrete distributions (`Uniform`, `Normal`, ...) are an external
//! collaborator; this module only fixes the trait boundary they must honor.

use std::fmt::Debug;

use rand::RngCore;

use crate::value::NodeValue;

/// A stochastic node's prior/likelihood density, parameterized by its
/// parents' current values.
pub trait Distribution: Debug + DistributionClone {
    /// Returns `ln(density(value | parents))`.
    ///
    /// Must return a finite value whenever `value` is within the
    /// distribution's support and the parent values are themselves valid;
    /// non-finite results are treated by the driver as a [`NumericError`](crate::error::NumericError)
    /// during initialization.
    fn ln_probability(&self, value: NodeValue, parents: &[NodeValue]) -> f64;

    /// Draws a fresh value from the prior, conditioned on `parents`.
    ///
    /// Used by chain initialization (`initializeChain`) to redraw unclamped
    /// stochastic nodes, and available to moves that implement Gibbs steps.
    fn redraw(&self, rng: &mut dyn RngCore, parents: &[NodeValue]) -> NodeValue;
}

/// Object-safe cloning for `Box<dyn Distribution>`, needed because
/// [`Model`](crate::model::Model) cloning clones the whole
/// [`crate::dag::Dag`] arena, boxed trait objects included.
pub trait DistributionClone {
    /// Clones this distribution into a fresh box.
    fn clone_distribution(&self) -> Box<dyn Distribution>;
}

impl<T> DistributionClone for T
where
    T: 'static + Distribution + Clone,
{
    fn clone_distribution(&self) -> Box<dyn Distribution> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Distribution> {
    fn clone(&self) -> Self {
        self.clone_distribution()
    }
}
