// SPDX-License-Identifier: Apache-2.0
//! The DAG substrate: a flat arena of [`DagNode`]s with the `touch` / `keep`
//! / `restore` change-tracking protocol.

use std::collections::{HashMap, HashSet};

use rand::RngCore;

use crate::distribution::Distribution;
use crate::ident::NodeId;
use crate::node::{DagNode, NodeKind};
use crate::transform::Transform;
use crate::value::NodeValue;

/// A flat, index-addressed directed acyclic graph of [`DagNode`]s.
///
/// Parent and child links are [`NodeId`] indices rather than owning handles,
/// which replaces raw-pointer bidirectional graphs and makes clone/swap
/// operations O(1) per edge rewrite.
#[derive(Debug, Clone, Default)]
pub struct Dag {
    nodes: Vec<DagNode>,
    name_index: HashMap<String, NodeId>,
}

impl Dag {
    /// Creates an empty DAG.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` if the arena holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns an iterator over every node id in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Returns a shared reference to a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &DagNode {
        &self.nodes[id.0]
    }

    /// Looks up a node by name. Anonymous (empty-named) nodes are never
    /// indexed: a non-empty name is required for any node referenced across
    /// a model clone.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<NodeId> {
        self.name_index.get(name).copied()
    }

    fn register_name(&mut self, name: &str, id: NodeId) {
        if name.is_empty() {
            return;
        }
        self.name_index.insert(name.to_string(), id);
    }

    fn push_node(&mut self, name: String, kind: NodeKind, value: NodeValue) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.register_name(&name, id);
        self.nodes.push(DagNode::new(name, kind, value));
        id
    }

    /// Adds a constant node, never mutated after construction.
    pub fn add_constant(&mut self, name: impl Into<String>, value: NodeValue) -> NodeId {
        self.push_node(name.into(), NodeKind::Constant, value)
    }

    /// Adds a deterministic node computed from `parents` by `transform`.
    ///
    /// Wires the bidirectional parent/child relation (`b ∈ parents(a) ⇔ a ∈
    /// children(b)`) and leaves the node dirty so its value is computed
    /// lazily on first read.
    pub fn add_deterministic(
        &mut self,
        name: impl Into<String>,
        transform: Box<dyn Transform>,
        parents: &[NodeId],
    ) -> NodeId {
        let id = self.push_node(
            name.into(),
            NodeKind::Deterministic(transform),
            NodeValue::default(),
        );
        self.wire_parents(id, parents);
        id
    }

    /// Adds a stochastic node with density `distribution`, initial value
    /// `initial_value`, and parents `parents`.
    pub fn add_stochastic(
        &mut self,
        name: impl Into<String>,
        distribution: Box<dyn Distribution>,
        parents: &[NodeId],
        initial_value: NodeValue,
    ) -> NodeId {
        let id = self.push_node(
            name.into(),
            NodeKind::Stochastic(distribution),
            initial_value,
        );
        self.wire_parents(id, parents);
        id
    }

    fn wire_parents(&mut self, id: NodeId, parents: &[NodeId]) {
        for &p in parents {
            self.nodes[id.0].parents.push(p);
            self.nodes[p.0].children.push(id);
        }
    }

    /// Clamps a stochastic node to an observed `value`. The node still
    /// contributes density but is never proposed upon.
    ///
    /// Returns the affected set from the implicit `touch` this causes, or an
    /// empty vector if `id` is not stochastic.
    pub fn clamp(&mut self, id: NodeId, value: NodeValue) -> Vec<NodeId> {
        if !self.nodes[id.0].is_stochastic() {
            return Vec::new();
        }
        self.nodes[id.0].clamped = true;
        self.nodes[id.0].value = value;
        self.touch(id)
    }

    /// Forces `id`'s value up to date, recursing lazily into dirty
    /// deterministic parents, and returns it.
    pub fn value_of(&mut self, id: NodeId) -> NodeValue {
        if self.nodes[id.0].dirty && self.nodes[id.0].is_deterministic() {
            let parent_values = self.collect_parent_values(id);
            if let NodeKind::Deterministic(transform) = &self.nodes[id.0].kind {
                let recomputed = transform.compute(&parent_values);
                self.nodes[id.0].value = recomputed;
            }
        }
        self.nodes[id.0].value
    }

    /// Forces `id`'s cached density up to date and returns it. Returns `0.0`
    /// for non-stochastic nodes: only stochastic nodes carry a density.
    pub fn ln_probability_of(&mut self, id: NodeId) -> f64 {
        if self.nodes[id.0].dirty && self.nodes[id.0].is_stochastic() {
            let parent_values = self.collect_parent_values(id);
            let value = self.nodes[id.0].value;
            if let NodeKind::Stochastic(distribution) = &self.nodes[id.0].kind {
                let ln_p = distribution.ln_probability(value, &parent_values);
                self.nodes[id.0].ln_probability = ln_p;
            }
        }
        self.nodes[id.0].ln_probability
    }

    fn collect_parent_values(&mut self, id: NodeId) -> Vec<NodeValue> {
        let parents = self.nodes[id.0].parents.clone();
        parents.into_iter().map(|p| self.value_of(p)).collect()
    }

    /// Sets a stochastic node's value and touches it, returning the
    /// affected set.
    ///
    /// No-op (returns an empty affected set) if `id` is clamped or not
    /// stochastic: clamped values are fixed observations, and only
    /// stochastic nodes are directly assignable.
    pub fn set_value(&mut self, id: NodeId, new_value: NodeValue) -> Vec<NodeId> {
        if !self.nodes[id.0].is_stochastic() || self.nodes[id.0].clamped {
            return Vec::new();
        }
        self.nodes[id.0].value = new_value;
        self.touch(id)
    }

    /// Draws a fresh value from `id`'s prior and sets it, returning the
    /// affected set. No-op on non-stochastic or clamped nodes.
    pub fn redraw(&mut self, id: NodeId, rng: &mut dyn RngCore) -> Vec<NodeId> {
        if !self.nodes[id.0].is_stochastic() || self.nodes[id.0].clamped {
            return Vec::new();
        }
        let parent_values = self.collect_parent_values(id);
        let new_value = match &self.nodes[id.0].kind {
            NodeKind::Stochastic(distribution) => distribution.redraw(rng, &parent_values),
            NodeKind::Constant | NodeKind::Deterministic(_) => return Vec::new(),
        };
        self.set_value(id, new_value)
    }

    /// Re-initializes a clamped node's density evaluation. Some engines
    /// allow a concrete clamped-node re-initialization hook; this core has no
    /// such hook, so the operation degrades to a `touch`.
    pub fn reinitialize_clamped(&mut self, id: NodeId) -> Vec<NodeId> {
        if !self.nodes[id.0].clamped {
            return Vec::new();
        }
        self.touch(id)
    }

    /// Declares that `id`'s value or a parent's value changed. Sets
    /// `dirty(id)`, recurses into deterministic children (their value must
    /// recompute) and stochastic children (their density is stale but their
    /// value is untouched), and returns the affected stochastic set.
    pub fn touch(&mut self, id: NodeId) -> Vec<NodeId> {
        let mut visited = HashSet::new();
        let mut affected = Vec::new();
        self.touch_recursive(id, &mut affected, &mut visited);
        affected
    }

    fn touch_recursive(&mut self, id: NodeId, affected: &mut Vec<NodeId>, visited: &mut HashSet<NodeId>) {
        if !visited.insert(id) {
            return;
        }
        self.nodes[id.0].dirty = true;
        if self.nodes[id.0].is_stochastic() {
            affected.push(id);
        }
        let children = self.nodes[id.0].children.clone();
        for child in children {
            if visited.contains(&child) {
                continue;
            }
            if self.nodes[child.0].is_deterministic() {
                self.touch_recursive(child, affected, visited);
            } else if self.nodes[child.0].is_stochastic() {
                visited.insert(child);
                self.nodes[child.0].dirty = true;
                affected.push(child);
            }
        }
    }

    /// Commits `id`'s current tentative state as authoritative, recursing
    /// the same way `touch` did, and clears `dirty` along the way. A no-op
    /// on an already-clean node.
    pub fn keep(&mut self, id: NodeId) {
        let mut visited = HashSet::new();
        self.keep_recursive(id, &mut visited);
    }

    fn keep_recursive(&mut self, id: NodeId, visited: &mut HashSet<NodeId>) {
        if !visited.insert(id) {
            return;
        }
        match self.nodes[id.0].kind {
            NodeKind::Constant => {
                self.nodes[id.0].dirty = false;
            }
            NodeKind::Deterministic(_) => {
                let value = self.value_of(id);
                self.nodes[id.0].stored_value = value;
                self.nodes[id.0].dirty = false;
            }
            NodeKind::Stochastic(_) => {
                let ln_p = self.ln_probability_of(id);
                self.nodes[id.0].stored_ln_probability = ln_p;
                self.nodes[id.0].stored_value = self.nodes[id.0].value;
                self.nodes[id.0].dirty = false;
            }
        }
        let children = self.nodes[id.0].children.clone();
        for child in children {
            if visited.contains(&child) {
                continue;
            }
            if self.nodes[child.0].is_deterministic() {
                self.keep_recursive(child, visited);
            } else if self.nodes[child.0].is_stochastic() {
                visited.insert(child);
                let ln_p = self.ln_probability_of(child);
                self.nodes[child.0].stored_ln_probability = ln_p;
                self.nodes[child.0].stored_value = self.nodes[child.0].value;
                self.nodes[child.0].dirty = false;
            }
        }
    }

    /// Rolls `id` and its affected descendants back to their pre-`touch`
    /// values: deterministic descendants discard the tentative recompute,
    /// stochastic descendants discard the tentative density.
    pub fn restore(&mut self, id: NodeId) {
        let mut visited = HashSet::new();
        self.restore_recursive(id, &mut visited);
    }

    fn restore_recursive(&mut self, id: NodeId, visited: &mut HashSet<NodeId>) {
        if !visited.insert(id) {
            return;
        }
        match self.nodes[id.0].kind {
            NodeKind::Constant => {}
            NodeKind::Deterministic(_) => {
                self.nodes[id.0].value = self.nodes[id.0].stored_value;
            }
            NodeKind::Stochastic(_) => {
                self.nodes[id.0].value = self.nodes[id.0].stored_value;
                self.nodes[id.0].ln_probability = self.nodes[id.0].stored_ln_probability;
            }
        }
        self.nodes[id.0].dirty = false;
        let children = self.nodes[id.0].children.clone();
        for child in children {
            if visited.contains(&child) {
                continue;
            }
            if self.nodes[child.0].is_deterministic() {
                self.restore_recursive(child, visited);
            } else if self.nodes[child.0].is_stochastic() {
                visited.insert(child);
                self.nodes[child.0].ln_probability = self.nodes[child.0].stored_ln_probability;
                self.nodes[child.0].dirty = false;
            }
        }
    }

    /// The stochastic descendants whose density depends on `id` through any
    /// (possibly deterministic) path — a read-only query with the same
    /// traversal shape as `touch`, but without marking anything dirty.
    #[must_use]
    pub fn affected_set(&self, id: NodeId) -> Vec<NodeId> {
        let mut visited = HashSet::new();
        let mut affected = Vec::new();
        self.affected_set_recursive(id, &mut affected, &mut visited);
        affected
    }

    fn affected_set_recursive(&self, id: NodeId, affected: &mut Vec<NodeId>, visited: &mut HashSet<NodeId>) {
        if !visited.insert(id) {
            return;
        }
        if self.nodes[id.0].is_stochastic() {
            affected.push(id);
        }
        for &child in &self.nodes[id.0].children {
            if visited.contains(&child) {
                continue;
            }
            if self.nodes[child.0].is_deterministic() {
                self.affected_set_recursive(child, affected, visited);
            } else if self.nodes[child.0].is_stochastic() {
                visited.insert(child);
                affected.push(child);
            }
        }
    }

    /// Stochastic nodes in source-to-sink order, computed by depth-first
    /// traversal from `entry`: on first visit, recurse into parents first;
    /// if the node is stochastic, append it after its parents; then recurse
    /// into children.
    #[must_use]
    pub fn topological_stochastic_order(&self, entry: NodeId) -> Vec<NodeId> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        self.topo_visit(entry, &mut order, &mut visited);
        order
    }

    fn topo_visit(&self, id: NodeId, order: &mut Vec<NodeId>, visited: &mut HashSet<NodeId>) {
        if !visited.insert(id) {
            return;
        }
        for &parent in &self.nodes[id.0].parents {
            self.topo_visit(parent, order, visited);
        }
        if self.nodes[id.0].is_stochastic() {
            order.push(id);
        }
        for &child in &self.nodes[id.0].children {
            self.topo_visit(child, order, visited);
        }
    }

    /// Sum of `lnProbability` over every node, forcing a fresh recompute of
    /// any dirty stochastic node. This is the uncached re-sum used by
    /// [`crate::driver::Mcmc::model_ln_probability`] (`getModelLnProbability`),
    /// independent of any incrementally maintained cache.
    #[must_use = "computing the joint ln-probability has no effect unless you use the result"]
    // node_ids() borrows self immutably; ln_probability_of needs &mut self, so
    // the ids must be collected before the recompute loop runs.
    #[allow(clippy::needless_collect)]
    pub fn sum_ln_probability(&mut self) -> f64 {
        let ids: Vec<NodeId> = self.node_ids().collect();
        ids.into_iter().map(|id| self.ln_probability_of(id)).sum()
    }
}
