// SPDX-License-Identifier: Apache-2.0
#![allow(
    missing_docs,
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::cast_precision_loss,
    clippy::cargo_common_metadata,
    clippy::unnecessary_literal_bound,
    clippy::panic
)]

use mcmc_core::{ChainConfig, Dag, Distribution, Mcmc, Move, NodeId, NodeValue, RandomSchedule};
use mcmc_demo::{Normal, ScaleMove, Uniform};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::RngCore;
use rand::SeedableRng;

fn chain(dag: &Dag, moves: Vec<Box<dyn Move>>, chain_heat: f64, seed: u64) -> Mcmc {
    Mcmc::new(
        dag,
        moves,
        Vec::new(),
        Box::new(RandomSchedule::new()),
        ChainConfig {
            chain_heat,
            chain_idx: 0,
            chain_active: true,
            rng: Box::new(StdRng::seed_from_u64(seed)),
        },
    )
    .unwrap()
}

/// Always proposes a fixed jump and reports a fixed Hastings ratio, so a
/// test can drive `ln_r` to an exact boundary value.
#[derive(Debug, Clone)]
struct FixedJump {
    target: NodeId,
    jump_to: f64,
    ln_hastings: f64,
}

impl Move for FixedJump {
    fn name(&self) -> &str {
        "fixed-jump"
    }
    fn weight(&self) -> f64 {
        1.0
    }
    fn target_nodes(&self) -> Vec<NodeId> {
        vec![self.target]
    }
    fn swap_node(&mut self, old: NodeId, new: NodeId) {
        if self.target == old {
            self.target = new;
        }
    }
    fn perform(&mut self, dag: &mut Dag, _rng: &mut dyn RngCore) -> f64 {
        dag.set_value(self.target, NodeValue::from(self.jump_to));
        self.ln_hastings
    }
    fn accept(&mut self) {}
    fn reject(&mut self) {}
    fn auto_tune(&mut self) {}
    fn reset_counters(&mut self) {}
    fn num_tried(&self) -> u64 {
        0
    }
    fn num_accepted(&self) -> u64 {
        0
    }
}

#[derive(Debug, Clone)]
struct Flat;

impl Distribution for Flat {
    fn ln_probability(&self, _value: NodeValue, _parents: &[NodeValue]) -> f64 {
        0.0
    }
    fn redraw(&self, _rng: &mut dyn RngCore, _parents: &[NodeValue]) -> NodeValue {
        NodeValue::from(0.0)
    }
}

proptest! {
    /// A proposal whose `ln_r` lands at or above zero is always accepted,
    /// regardless of how that boundary value is reached.
    #[test]
    fn ln_r_at_or_above_zero_always_accepts(ln_hastings in 0.0f64..50.0) {
        let mut dag = Dag::new();
        let x = dag.add_stochastic("x", Box::new(Flat), &[], NodeValue::from(1.0));
        let moves: Vec<Box<dyn Move>> = vec![Box::new(FixedJump { target: x, jump_to: 7.0, ln_hastings })];
        let mut mcmc = chain(&dag, moves, 1.0, 1);
        mcmc.initialize_chain().unwrap();
        mcmc.next_cycle(true).unwrap();
        prop_assert_eq!(mcmc.model().dag().node(x).raw_value().get(), 7.0);
    }

    /// A proposal whose `ln_r` falls below the reject floor is always
    /// rejected outright, without drawing from the RNG.
    #[test]
    fn ln_r_below_reject_floor_always_rejects(ln_hastings in -10_000.0f64..-300.1) {
        let mut dag = Dag::new();
        let x = dag.add_stochastic("x", Box::new(Flat), &[], NodeValue::from(1.0));
        let moves: Vec<Box<dyn Move>> = vec![Box::new(FixedJump { target: x, jump_to: 7.0, ln_hastings })];
        let mut mcmc = chain(&dag, moves, 1.0, 1);
        mcmc.initialize_chain().unwrap();
        mcmc.next_cycle(true).unwrap();
        prop_assert_eq!(mcmc.model().dag().node(x).raw_value().get(), 1.0);
    }

    /// Restoring an unaccepted scale-move proposal always returns the
    /// target to its pre-proposal value, whatever lambda and seed produced
    /// the proposal.
    #[test]
    fn restore_always_recovers_the_pre_proposal_value(
        lambda in 0.01f64..100.0,
        seed in any::<u64>(),
        start in 0.1f64..9.9,
    ) {
        let mut dag = Dag::new();
        let x = dag.add_stochastic("x", Box::new(Uniform::new(0.0, 10.0)), &[], NodeValue::from(start));
        let moves: Vec<Box<dyn Move>> = vec![Box::new(ScaleMove::new("scale", x, lambda, 1.0))];
        let mut mcmc = chain(&dag, moves, 1.0, seed);
        mcmc.initialize_chain().unwrap();
        let before = mcmc.model().dag().node(x).raw_value().get();
        mcmc.next_cycle(true).unwrap();
        let after = mcmc.model().dag().node(x).raw_value().get();
        let accepted = mcmc.operator_summary()[0].num_accepted == 1;
        if !accepted {
            prop_assert_eq!(after, before);
        }
    }

    /// The joint log-probability the driver maintains incrementally never
    /// drifts from a fresh re-sum beyond the documented tolerance, across
    /// arbitrary scale-move parameters.
    #[test]
    fn incremental_ln_probability_never_drifts_from_a_fresh_resum(
        lambda in 0.01f64..20.0,
        seed in any::<u64>(),
    ) {
        let mut dag = Dag::new();
        let mean = dag.add_constant("mean", NodeValue::from(0.0));
        let sd = dag.add_constant("sd", NodeValue::from(2.0));
        let x = dag.add_stochastic("x", Box::new(Normal::new()), &[mean, sd], NodeValue::from(1.0));
        let moves: Vec<Box<dyn Move>> = vec![Box::new(ScaleMove::new("scale", x, lambda, 1.0))];
        let mut mcmc = chain(&dag, moves, 1.0, seed);
        mcmc.initialize_chain().unwrap();
        for _ in 0..50 {
            // `next_cycle` itself performs this consistency check in debug
            // builds and returns a `Drift` error if it is ever violated.
            mcmc.next_cycle(true).unwrap();
        }
    }
}

#[test]
fn a_gibbs_move_is_always_accepted_and_never_touches_the_reject_counter() {
    #[derive(Debug, Clone)]
    struct AlwaysGibbs {
        target: NodeId,
        tried: u64,
    }

    impl Move for AlwaysGibbs {
        fn name(&self) -> &str {
            "gibbs"
        }
        fn weight(&self) -> f64 {
            1.0
        }
        fn is_gibbs(&self) -> bool {
            true
        }
        fn target_nodes(&self) -> Vec<NodeId> {
            vec![self.target]
        }
        fn swap_node(&mut self, old: NodeId, new: NodeId) {
            if self.target == old {
                self.target = new;
            }
        }
        fn perform(&mut self, _dag: &mut Dag, _rng: &mut dyn RngCore) -> f64 {
            unreachable!("the driver must call perform_gibbs instead of perform");
        }
        fn perform_gibbs(&mut self, dag: &mut Dag, _rng: &mut dyn RngCore) {
            self.tried += 1;
            dag.set_value(self.target, NodeValue::from(3.0));
        }
        fn accept(&mut self) {
            panic!("a Gibbs move must never be passed through accept/reject");
        }
        fn reject(&mut self) {
            panic!("a Gibbs move must never be passed through accept/reject");
        }
        fn auto_tune(&mut self) {}
        fn reset_counters(&mut self) {
            self.tried = 0;
        }
        fn num_tried(&self) -> u64 {
            self.tried
        }
        fn num_accepted(&self) -> u64 {
            self.tried
        }
    }

    let mut dag = Dag::new();
    let x = dag.add_stochastic("x", Box::new(Flat), &[], NodeValue::from(0.0));
    let moves: Vec<Box<dyn Move>> = vec![Box::new(AlwaysGibbs { target: x, tried: 0 })];
    let mut mcmc = chain(&dag, moves, 1.0, 9);
    mcmc.initialize_chain().unwrap();
    for _ in 0..10 {
        mcmc.next_cycle(true).unwrap();
    }
    assert_eq!(mcmc.model().dag().node(x).raw_value().get(), 3.0);
    assert_eq!(mcmc.operator_summary()[0].num_tried, 10);
    assert_eq!(mcmc.operator_summary()[0].num_accepted, 10);
}

#[test]
fn initialization_gives_up_after_exactly_max_init_tries() {
    #[derive(Debug, Clone)]
    struct NeverFinite;

    impl Distribution for NeverFinite {
        fn ln_probability(&self, _value: NodeValue, _parents: &[NodeValue]) -> f64 {
            f64::NEG_INFINITY
        }
        fn redraw(&self, _rng: &mut dyn RngCore, _parents: &[NodeValue]) -> NodeValue {
            NodeValue::from(0.0)
        }
    }

    let mut dag = Dag::new();
    dag.add_stochastic("impossible", Box::new(NeverFinite), &[], NodeValue::from(0.0));
    let mut mcmc = chain(&dag, Vec::new(), 1.0, 1);
    let err = mcmc.initialize_chain().unwrap_err();
    assert!(matches!(err, mcmc_core::McmcError::Initialization(e) if e.tries == mcmc_core::MAX_INIT_TRIES));
}
