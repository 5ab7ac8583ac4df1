// SPDX-License-Identifier: Apache-2.0
//! The contract a deterministic node's recompute function must honor.

use std::fmt::Debug;

use crate::value::NodeValue;

/// A deterministic node's value as a pure function of its parents.
///
/// A deterministic node's value is recomputed lazily on read when `dirty`.
/// The function itself must be total and side-effect free over its declared
/// parent list.
pub trait Transform: Debug + TransformClone {
    /// Computes this node's value from its parents' current values, in the
    /// same order the node's parent list was constructed with.
    fn compute(&self, parents: &[NodeValue]) -> NodeValue;
}

/// Object-safe cloning for `Box<dyn Transform>`, needed because
/// [`Model`](crate::model::Model) cloning clones the whole
/// [`crate::dag::Dag`] arena, boxed trait objects included.
pub trait TransformClone {
    /// Clones this transform into a fresh box.
    fn clone_transform(&self) -> Box<dyn Transform>;
}

impl<T> TransformClone for T
where
    T: 'static + Transform + Clone,
{
    fn clone_transform(&self) -> Box<dyn Transform> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Transform> {
    fn clone(&self) -> Self {
        self.clone_transform()
    }
}
