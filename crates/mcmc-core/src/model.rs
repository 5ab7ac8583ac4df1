// SPDX-License-Identifier: Apache-2.0
//! Detached model cloning and name-based rebinding.

use crate::dag::Dag;
use crate::error::RebindingError;
use crate::ident::NodeId;

/// A detached, name-addressable copy of a [`Dag`].
///
/// Because [`Dag`]'s arena indices are assigned densely in insertion order
/// and never reused, a structural [`Clone`] of the arena preserves every
/// [`NodeId`] exactly: node `k` in the clone is the clone of node `k` in the
/// source, with no pointer-graph rewrite needed beyond the clone itself.
///
/// References held by moves and monitors are still rebound by name, not by
/// reusing the numerically-identical index, because the index coincidence
/// is an implementation detail of this arena design rather than a property
/// the Move/Monitor protocol is allowed to assume.
#[derive(Debug, Clone)]
pub struct Model {
    dag: Dag,
}

impl Model {
    /// Produces a detached copy of `source`.
    #[must_use]
    pub fn from_dag(source: &Dag) -> Self {
        Self {
            dag: source.clone(),
        }
    }

    /// Shared access to the underlying arena.
    #[must_use]
    pub const fn dag(&self) -> &Dag {
        &self.dag
    }

    /// Exclusive access to the underlying arena.
    pub fn dag_mut(&mut self) -> &mut Dag {
        &mut self.dag
    }

    /// Resolves `original_id`, a node id valid in `original`, to its
    /// counterpart in this clone by looking up `original`'s name for that
    /// node in this model's name index.
    ///
    /// # Errors
    ///
    /// Returns [`RebindingError::AnonymousReference`] if the original node
    /// has no name, or [`RebindingError::UnknownName`] if no node with that
    /// name exists in this clone.
    pub fn rebind(&self, original: &Dag, original_id: NodeId) -> Result<NodeId, RebindingError> {
        let name = original.node(original_id).name();
        if name.is_empty() {
            return Err(RebindingError::AnonymousReference);
        }
        self.dag
            .by_name(name)
            .ok_or_else(|| RebindingError::UnknownName(name.to_string()))
    }
}
