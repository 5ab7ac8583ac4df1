// SPDX-License-Identifier: Apache-2.0
//! Stable index-based identifiers for DAG nodes.
//!
//! The DAG is a flat arena of nodes addressed by index, and parent/child
//! sets store indices rather than owning handles. `NodeId` is the index
//! type.

/// Stable identifier for a node inside a [`crate::dag::Dag`] arena.
///
/// A `NodeId` is only meaningful relative to the arena that produced it;
/// indices from one [`crate::dag::Dag`] or [`crate::model::Model`] must never
/// be used to index into another.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the raw arena index backing this id.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}
