// SPDX-License-Identifier: Apache-2.0
//! Reference `Move` implementation: `ScaleMove`.

use mcmc_core::{Dag, MoveStats, NodeId, NodeValue};
use rand::{Rng, RngCore};

/// Proposes `x' = x * exp(lambda * (u - 0.5))` for a uniform draw `u`, with
/// Hastings ratio `ln(x' / x)` (the canonical scale move).
#[derive(Debug, Clone)]
pub struct ScaleMove {
    name: String,
    target: NodeId,
    lambda: f64,
    weight: f64,
    stats: MoveStats,
}

/// Target acceptance rate `auto_tune` steers this move toward.
const TARGET_ACCEPTANCE: f64 = 0.44;

impl ScaleMove {
    /// Creates a scale move on `target` with initial tuning parameter
    /// `lambda` and scheduling `weight`.
    #[must_use]
    pub fn new(name: impl Into<String>, target: NodeId, lambda: f64, weight: f64) -> Self {
        Self {
            name: name.into(),
            target,
            lambda,
            weight,
            stats: MoveStats::new(),
        }
    }
}

impl mcmc_core::Move for ScaleMove {
    fn name(&self) -> &str {
        &self.name
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn target_nodes(&self) -> Vec<NodeId> {
        vec![self.target]
    }

    fn swap_node(&mut self, old: NodeId, new: NodeId) {
        if self.target == old {
            self.target = new;
        }
    }

    fn perform(&mut self, dag: &mut Dag, rng: &mut dyn RngCore) -> f64 {
        let u: f64 = rng.gen();
        let current = dag.value_of(self.target).get();
        let candidate = current * (self.lambda * (u - 0.5)).exp();
        dag.set_value(self.target, NodeValue::from(candidate));
        (candidate / current).ln()
    }

    fn accept(&mut self) {
        self.stats.record_accept();
    }

    fn reject(&mut self) {
        self.stats.record_reject();
    }

    fn auto_tune(&mut self) {
        if self.stats.num_tried() == 0 {
            return;
        }
        let rate = self.stats.acceptance_rate();
        if rate > TARGET_ACCEPTANCE {
            self.lambda *= 1.0 + (rate - TARGET_ACCEPTANCE) / (1.0 - TARGET_ACCEPTANCE);
        } else {
            self.lambda /= 2.0 - rate / TARGET_ACCEPTANCE;
        }
        self.lambda = self.lambda.clamp(1e-6, 1e6);
    }

    fn reset_counters(&mut self) {
        self.stats.reset();
    }

    fn num_tried(&self) -> u64 {
        self.stats.num_tried()
    }

    fn num_accepted(&self) -> u64 {
        self.stats.num_accepted()
    }

    fn tuning_parameter(&self) -> Option<f64> {
        Some(self.lambda)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mcmc_core::{Distribution, Move};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[derive(Debug, Clone)]
    struct Flat;

    impl Distribution for Flat {
        fn ln_probability(&self, _value: NodeValue, _parents: &[NodeValue]) -> f64 {
            0.0
        }

        fn redraw(&self, rng: &mut dyn RngCore, _parents: &[NodeValue]) -> NodeValue {
            NodeValue::from(f64::from(rng.next_u32()))
        }
    }

    fn two_node_dag() -> (Dag, NodeId, NodeId) {
        let mut dag = Dag::new();
        let a = dag.add_stochastic("a", Box::new(Flat), &[], NodeValue::from(2.0));
        let b = dag.add_stochastic("b", Box::new(Flat), &[], NodeValue::from(5.0));
        (dag, a, b)
    }

    #[test]
    fn perform_reports_the_log_ratio_of_proposed_over_current() {
        let (mut dag, target, _other) = two_node_dag();
        let mut mv = ScaleMove::new("scale", target, 1.0, 1.0);
        let mut rng = StdRng::seed_from_u64(3);
        let before = dag.value_of(target).get();
        let hastings = mv.perform(&mut dag, &mut rng);
        let after = dag.value_of(target).get();
        assert!((hastings - (after / before).ln()).abs() < 1e-12);
    }

    #[test]
    fn swap_node_rebinds_only_a_matching_target() {
        let (_dag, target, other) = two_node_dag();
        let mut mv = ScaleMove::new("scale", target, 1.0, 1.0);
        mv.swap_node(target, other);
        assert_eq!(mv.target_nodes(), vec![other]);
        // Swapping a non-matching id is a no-op.
        mv.swap_node(target, other);
        assert_eq!(mv.target_nodes(), vec![other]);
    }

    #[test]
    fn auto_tune_shrinks_lambda_when_acceptance_is_too_low() {
        let (_dag, target, _other) = two_node_dag();
        let mut mv = ScaleMove::new("scale", target, 1.0, 1.0);
        for _ in 0..9 {
            mv.reject();
        }
        mv.accept();
        let before = mv.tuning_parameter().unwrap();
        mv.auto_tune();
        let after = mv.tuning_parameter().unwrap();
        assert!(after < before, "low acceptance should shrink lambda: {before} -> {after}");
    }

    #[test]
    fn auto_tune_grows_lambda_when_acceptance_is_too_high() {
        let (_dag, target, _other) = two_node_dag();
        let mut mv = ScaleMove::new("scale", target, 1.0, 1.0);
        for _ in 0..9 {
            mv.accept();
        }
        mv.reject();
        let before = mv.tuning_parameter().unwrap();
        mv.auto_tune();
        let after = mv.tuning_parameter().unwrap();
        assert!(after > before, "high acceptance should grow lambda: {before} -> {after}");
    }

    #[test]
    fn reset_counters_zeroes_tried_and_accepted() {
        let (_dag, target, _other) = two_node_dag();
        let mut mv = ScaleMove::new("scale", target, 1.0, 1.0);
        mv.accept();
        mv.reject();
        mv.reset_counters();
        assert_eq!(mv.num_tried(), 0);
        assert_eq!(mv.num_accepted(), 0);
    }
}
