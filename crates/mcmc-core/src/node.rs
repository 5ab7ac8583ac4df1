// SPDX-License-Identifier: Apache-2.0
//! The DAG node substrate.

use std::fmt;

use crate::distribution::Distribution;
use crate::ident::NodeId;
use crate::transform::Transform;
use crate::value::NodeValue;

/// The per-kind payload of a [`DagNode`].
///
/// A closed, tagged variant rather than an inheritance chain: every node
/// kind collapses to one enum rather than a class hierarchy.
#[derive(Clone)]
pub enum NodeKind {
    /// Created once, never mutated, destroyed with the model.
    Constant,
    /// Recomputes lazily on value read when `dirty`.
    Deterministic(Box<dyn Transform>),
    /// Mutated by moves (`setValue`) and by `keep`/`restore`.
    Stochastic(Box<dyn Distribution>),
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant => f.write_str("Constant"),
            Self::Deterministic(_) => f.write_str("Deterministic(..)"),
            Self::Stochastic(_) => f.write_str("Stochastic(..)"),
        }
    }
}

/// A vertex of the probabilistic graphical model.
///
/// Parent and child sets are stored as [`NodeId`] indices into the owning
/// [`crate::dag::Dag`] arena, never as owning handles.
#[derive(Debug, Clone)]
pub struct DagNode {
    /// Unique textual name. May be empty for anonymous intermediates; a
    /// non-empty name is required for any node referenced across a model
    /// clone.
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) parents: Vec<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) value: NodeValue,
    pub(crate) stored_value: NodeValue,
    /// Cached density (stochastic nodes only; `0.0` and unused otherwise).
    pub(crate) ln_probability: f64,
    pub(crate) stored_ln_probability: f64,
    /// Value or a parent's value changed since the last `keep`.
    pub(crate) dirty: bool,
    /// Observed: value fixed, density still contributes. Only stochastic
    /// nodes may be clamped.
    pub(crate) clamped: bool,
}

impl DagNode {
    pub(crate) fn new(name: String, kind: NodeKind, value: NodeValue) -> Self {
        Self {
            name,
            kind,
            parents: Vec::new(),
            children: Vec::new(),
            value,
            stored_value: value,
            ln_probability: 0.0,
            stored_ln_probability: 0.0,
            dirty: true,
            clamped: false,
        }
    }

    /// Returns this node's name (possibly empty).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns this node's parents.
    #[must_use]
    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    /// Returns this node's children.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// `true` if this node's value is observed and fixed.
    #[must_use]
    pub const fn is_clamped(&self) -> bool {
        self.clamped
    }

    /// `true` if this node holds a random variable.
    #[must_use]
    pub const fn is_stochastic(&self) -> bool {
        matches!(self.kind, NodeKind::Stochastic(_))
    }

    /// `true` if this node is a constant.
    #[must_use]
    pub const fn is_constant(&self) -> bool {
        matches!(self.kind, NodeKind::Constant)
    }

    /// `true` if this node recomputes from its parents.
    #[must_use]
    pub const fn is_deterministic(&self) -> bool {
        matches!(self.kind, NodeKind::Deterministic(_))
    }

    /// `true` if this node's value or a parent's value changed since the
    /// last `keep`.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the node's current value without forcing recomputation.
    ///
    /// Callers that need an up-to-date value for a dirty deterministic node
    /// should go through [`crate::dag::Dag::value_of`] instead.
    #[must_use]
    pub const fn raw_value(&self) -> NodeValue {
        self.value
    }

    /// Returns the cached density without forcing recomputation.
    ///
    /// Callers that need an up-to-date density for a dirty stochastic node
    /// should go through [`crate::dag::Dag::ln_probability_of`] instead.
    #[must_use]
    pub const fn raw_ln_probability(&self) -> f64 {
        self.ln_probability
    }
}
