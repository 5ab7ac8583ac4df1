// SPDX-License-Identifier: Apache-2.0
//! The Move protocol: proposal kernels that perturb stochastic nodes.

use std::fmt::Debug;

use rand::RngCore;

use crate::dag::Dag;
use crate::ident::NodeId;

/// Accept/reject/tuning bookkeeping shared by every concrete move.
///
/// `RevBayes` tracks this on a common `AbstractMove` base; without
/// inheritance, concrete moves embed this helper and delegate to it instead
/// of re-implementing the counters each time.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveStats {
    tried: u64,
    accepted: u64,
}

impl MoveStats {
    /// A fresh, zeroed counter pair.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tried: 0,
            accepted: 0,
        }
    }

    /// Records an accepted proposal.
    pub fn record_accept(&mut self) {
        self.tried += 1;
        self.accepted += 1;
    }

    /// Records a rejected proposal.
    pub fn record_reject(&mut self) {
        self.tried += 1;
    }

    /// Zeroes both counters.
    pub fn reset(&mut self) {
        self.tried = 0;
        self.accepted = 0;
    }

    /// Total number of proposals tried.
    #[must_use]
    pub const fn num_tried(&self) -> u64 {
        self.tried
    }

    /// Total number of proposals accepted.
    #[must_use]
    pub const fn num_accepted(&self) -> u64 {
        self.accepted
    }

    /// Fraction of tried proposals accepted, or `0.0` before any attempt.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn acceptance_rate(&self) -> f64 {
        if self.tried == 0 {
            0.0
        } else {
            self.accepted as f64 / self.tried as f64
        }
    }
}

/// A proposal kernel that perturbs one or more stochastic nodes of a
/// [`Dag`] and reports the log Hastings ratio of the move it made.
///
/// `perform` is expected to mutate its target node(s) via
/// [`Dag::set_value`] or [`Dag::redraw`] (which `touch`es them) and to leave
/// the affected subgraph dirty; the driver computes the prior-ratio term
/// from the affected set before calling [`Dag::keep`] or [`Dag::restore`]
/// based on the acceptance decision.
pub trait Move: Debug + MoveClone {
    /// A human-readable label, used in operator summaries.
    fn name(&self) -> &str;

    /// Relative proposal frequency within a [`crate::schedule::Schedule`].
    fn weight(&self) -> f64;

    /// `true` if this move always accepts (its own conditional draw), in
    /// which case the driver calls [`Move::perform_gibbs`] instead of
    /// [`Move::perform`].
    fn is_gibbs(&self) -> bool {
        false
    }

    /// The stochastic nodes this move currently targets, used by the driver
    /// to resolve the affected set and to enumerate references for
    /// model-clone rebinding.
    fn target_nodes(&self) -> Vec<NodeId>;

    /// Rebinds a target reference from `old` to `new`, used when this move
    /// is cloned alongside a [`crate::model::Model`] clone.
    fn swap_node(&mut self, old: NodeId, new: NodeId);

    /// Proposes a new state for this move's target node(s) and returns the
    /// log Hastings ratio `ln(q(old|new) / q(new|old))`.
    fn perform(&mut self, dag: &mut Dag, rng: &mut dyn RngCore) -> f64;

    /// Performs a Gibbs update: draws directly from the exact conditional
    /// posterior and applies it. Always accepted; never calls
    /// [`Move::accept`]/[`Move::reject`]. Only called when [`Move::is_gibbs`]
    /// returns `true`.
    fn perform_gibbs(&mut self, dag: &mut Dag, rng: &mut dyn RngCore) {
        let _ = (dag, rng);
    }

    /// Records that the driver accepted this move's most recent proposal.
    fn accept(&mut self);

    /// Records that the driver rejected this move's most recent proposal.
    fn reject(&mut self);

    /// Adjusts this move's tuning parameter toward a target acceptance
    /// rate, using whatever history it has accumulated since the last call
    /// since the last call.
    fn auto_tune(&mut self);

    /// Zeroes this move's accept/reject counters (called at burn-in start).
    fn reset_counters(&mut self);

    /// Total proposals tried since the last [`Move::reset_counters`].
    fn num_tried(&self) -> u64;

    /// Total proposals accepted since the last [`Move::reset_counters`].
    fn num_accepted(&self) -> u64;

    /// The current value of this move's tuning parameter, if it has one.
    fn tuning_parameter(&self) -> Option<f64> {
        None
    }
}

/// Object-safe cloning for `Box<dyn Move>`, needed because the driver clones
/// a host-supplied move per chain and rebinds the clone.
pub trait MoveClone {
    /// Clones this move into a fresh box.
    fn clone_move(&self) -> Box<dyn Move>;
}

impl<T> MoveClone for T
where
    T: 'static + Move + Clone,
{
    fn clone_move(&self) -> Box<dyn Move> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Move> {
    fn clone(&self) -> Self {
        self.clone_move()
    }
}
