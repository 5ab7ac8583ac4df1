// SPDX-License-Identifier: Apache-2.0
//! The Metropolis-Hastings chain driver.

use std::collections::HashSet;

use rand::{Rng, RngCore};

use crate::dag::Dag;
use crate::error::{InitializationError, McmcError, NumericError};
use crate::ident::NodeId;
use crate::model::Model;
use crate::monitor::Monitor;
use crate::moves::Move;
use crate::schedule::Schedule;

/// Upper bound on redraw attempts while searching for a starting state with
/// a finite joint log-probability.
pub const MAX_INIT_TRIES: usize = 100;

/// Below this log-acceptance-ratio a proposal is rejected outright, without
/// drawing a uniform, to avoid underflow in `exp`.
pub const LN_R_REJECT_FLOOR: f64 = -300.0;

/// Tolerance for the debug-build consistency check between the
/// incrementally-maintained joint log-probability and a fresh re-sum
/// re-sum.
pub const DRIFT_TOLERANCE: f64 = 1e-8;

/// Per-move summary statistics, as reported by [`Mcmc::operator_summary`].
#[derive(Debug, Clone)]
pub struct OperatorStat {
    /// The move's display name.
    pub name: String,
    /// The move's scheduling weight.
    pub weight: f64,
    /// Proposals tried since the last counter reset.
    pub num_tried: u64,
    /// Proposals accepted since the last counter reset.
    pub num_accepted: u64,
    /// Current tuning parameter value, if the move has one.
    pub tuning_parameter: Option<f64>,
}

/// Per-chain parameters that don't come from the model.
///
/// Covers tempering heat, position within a parallel-tempering ensemble,
/// whether the chain starts already initialized, and its RNG. Bundled so
/// [`Mcmc::new`] takes one struct instead of four loose scalars.
pub struct ChainConfig {
    /// Tempering heat (`1.0` for the cold chain).
    pub chain_heat: f64,
    /// Index within a parallel-tempering ensemble.
    pub chain_idx: usize,
    /// Whether this chain already has a valid starting state.
    pub chain_active: bool,
    /// Source of randomness for proposals and redraws.
    pub rng: Box<dyn RngCore>,
}

/// A single Metropolis-Hastings chain: a [`Model`] clone, its own rebound
/// moves, monitors, and schedule, a heat, and an RNG.
pub struct Mcmc {
    model: Model,
    moves: Vec<Box<dyn Move>>,
    monitors: Vec<Box<dyn Monitor>>,
    schedule: Box<dyn Schedule>,
    chain_heat: f64,
    chain_idx: usize,
    chain_active: bool,
    generation: u64,
    rng: Box<dyn RngCore>,
}

impl std::fmt::Debug for Mcmc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mcmc")
            .field("model", &self.model)
            .field("moves", &self.moves)
            .field("monitors", &self.monitors)
            .field("schedule", &self.schedule)
            .field("chain_heat", &self.chain_heat)
            .field("chain_idx", &self.chain_idx)
            .field("chain_active", &self.chain_active)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl Mcmc {
    /// Builds a chain by cloning `source` into a detached [`Model`] and
    /// rebinding `moves` and `monitors` (constructed against `source`) to
    /// the clone by name.
    ///
    /// # Errors
    ///
    /// Returns [`McmcError::Rebinding`] if any move or monitor references an
    /// anonymous node, or a name absent from the cloned model.
    pub fn new(
        source: &Dag,
        mut moves: Vec<Box<dyn Move>>,
        mut monitors: Vec<Box<dyn Monitor>>,
        schedule: Box<dyn Schedule>,
        config: ChainConfig,
    ) -> Result<Self, McmcError> {
        let model = Model::from_dag(source);
        for mv in &mut moves {
            for old in mv.target_nodes() {
                let new = model.rebind(source, old)?;
                mv.swap_node(old, new);
            }
        }
        for mon in &mut monitors {
            for old in mon.observed_nodes() {
                let new = model.rebind(source, old)?;
                mon.swap_node(old, new);
            }
        }
        Ok(Self {
            model,
            moves,
            monitors,
            schedule,
            chain_heat: config.chain_heat,
            chain_idx: config.chain_idx,
            chain_active: config.chain_active,
            generation: 0,
            rng: config.rng,
        })
    }

    /// This chain's current generation counter.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// This chain's tempering heat (`1.0` for the cold chain).
    #[must_use]
    pub const fn chain_heat(&self) -> f64 {
        self.chain_heat
    }

    /// This chain's index within a parallel-tempering ensemble.
    #[must_use]
    pub const fn chain_idx(&self) -> usize {
        self.chain_idx
    }

    /// `true` if this chain is active (its likelihood contributes).
    /// Inactive chains are used for prior-only exploration.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.chain_active
    }

    /// Shared access to this chain's model clone.
    #[must_use]
    pub const fn model(&self) -> &Model {
        &self.model
    }

    /// The joint log-probability, freshly re-summed over every node
    /// (`getModelLnProbability`), independent of any per-node
    /// cache.
    pub fn model_ln_probability(&mut self) -> f64 {
        self.model.dag_mut().sum_ln_probability()
    }

    fn cached_joint_ln_probability(&self) -> f64 {
        self.model
            .dag()
            .node_ids()
            .map(|id| self.model.dag().node(id).raw_ln_probability())
            .sum()
    }

    /// Finds a starting state with a finite joint log-probability.
    ///
    /// Resets the schedule, then touches every node; if the chain is
    /// inactive, redraws unclamped stochastic nodes from their priors
    /// (clamped nodes are only touched). Then retries up to
    /// [`MAX_INIT_TRIES`] times: touch everything, sum `lnProbability` in
    /// topological order, and stop at the first finite sum. Resets
    /// `generation` to `0` on success.
    ///
    /// # Errors
    ///
    /// Returns [`McmcError::Initialization`] if no finite starting state is
    /// found within [`MAX_INIT_TRIES`] attempts.
    pub fn initialize_chain(&mut self) -> Result<(), McmcError> {
        self.schedule.reset();
        let ids: Vec<NodeId> = self.model.dag().node_ids().collect();
        if ids.is_empty() {
            self.generation = 0;
            return Ok(());
        }
        for &id in &ids {
            self.model.dag_mut().touch(id);
        }
        if !self.chain_active {
            for &id in &ids {
                let node = self.model.dag().node(id);
                if node.is_stochastic() {
                    if node.is_clamped() {
                        self.model.dag_mut().touch(id);
                    } else {
                        self.model.dag_mut().redraw(id, &mut *self.rng);
                    }
                }
            }
        }
        let order = self.model.dag().topological_stochastic_order(ids[0]);
        for attempt in 1..=MAX_INIT_TRIES {
            for &id in &ids {
                if self.model.dag().node(id).is_clamped() {
                    self.model.dag_mut().reinitialize_clamped(id);
                } else {
                    self.model.dag_mut().touch(id);
                }
            }
            let mut all_finite = true;
            for &id in &order {
                let lp = self.model.dag_mut().ln_probability_of(id);
                if !lp.is_finite() {
                    all_finite = false;
                    let name = self.model.dag().node(id).name().to_string();
                    let error = NumericError::NonComputable {
                        name,
                        value: lp.to_string(),
                    };
                    tracing::debug!(attempt, %error, "retrying initialization");
                    break;
                }
            }
            if all_finite {
                for &id in &ids {
                    self.model.dag_mut().keep(id);
                }
                self.generation = 0;
                let initial_ln_probability = self.model.dag_mut().sum_ln_probability();
                tracing::info!(attempt, initial_ln_probability, "chain initialized");
                return Ok(());
            }
            for &id in &ids {
                let node = self.model.dag().node(id);
                if node.is_stochastic() && !node.is_clamped() {
                    self.model.dag_mut().redraw(id, &mut *self.rng);
                }
            }
        }
        Err(InitializationError {
            tries: MAX_INIT_TRIES,
        }
        .into())
    }

    /// Runs one cycle of [`Schedule::proposals_per_cycle`] proposals,
    /// advancing `generation` when `advance_generation` is set (burn-in
    /// passes `false`; steady-state running passes `true`).
    ///
    /// # Errors
    ///
    /// Returns [`McmcError::Numeric`] with the `Drift` variant if a
    /// debug-build consistency check detects the incrementally-maintained
    /// joint log-probability has drifted from a fresh re-sum beyond
    /// [`DRIFT_TOLERANCE`].
    pub fn next_cycle(&mut self, advance_generation: bool) -> Result<(), McmcError> {
        let n = self.schedule.proposals_per_cycle(&self.moves);
        for _ in 0..n {
            self.propose_once()?;
        }
        if advance_generation {
            self.generation += 1;
        }
        Ok(())
    }

    fn propose_once(&mut self) -> Result<(), McmcError> {
        if self.moves.is_empty() {
            return Ok(());
        }
        let idx = self.schedule.next_move(&self.moves, &mut *self.rng);
        if self.moves[idx].is_gibbs() {
            self.moves[idx].perform_gibbs(self.model.dag_mut(), &mut *self.rng);
            return Ok(());
        }

        let targets = self.moves[idx].target_nodes();
        let affected = dedup_ids(
            targets
                .iter()
                .flat_map(|&t| self.model.dag().affected_set(t))
                .collect(),
        );

        let pre_sum: f64 = affected
            .iter()
            .map(|&id| self.model.dag_mut().ln_probability_of(id))
            .sum();

        let ln_hastings_ratio = self.moves[idx].perform(self.model.dag_mut(), &mut *self.rng);

        let post_sum: f64 = affected
            .iter()
            .map(|&id| self.model.dag_mut().ln_probability_of(id))
            .sum();

        let ln_prior_ratio = post_sum - pre_sum;
        let ln_r = self.chain_heat.mul_add(ln_prior_ratio, ln_hastings_ratio);

        let accept = if ln_r >= 0.0 {
            true
        } else if ln_r < LN_R_REJECT_FLOOR {
            false
        } else {
            self.rng.gen::<f64>() < ln_r.exp()
        };

        if accept {
            for &t in &targets {
                self.model.dag_mut().keep(t);
            }
            self.moves[idx].accept();
        } else {
            for &t in &targets {
                self.model.dag_mut().restore(t);
            }
            self.moves[idx].reject();
        }

        if cfg!(debug_assertions) {
            let cached = self.cached_joint_ln_probability();
            let recomputed = self.model_ln_probability();
            let drift = (cached - recomputed).abs();
            if drift > DRIFT_TOLERANCE {
                return Err(NumericError::Drift {
                    drift,
                    cached,
                    recomputed,
                }
                .into());
            }
        }
        Ok(())
    }

    fn reset_move_counters(&mut self) {
        for m in &mut self.moves {
            m.reset_counters();
        }
    }

    fn start_monitors(&mut self) {
        let chain_active = self.chain_active;
        for m in &mut self.monitors {
            if chain_active {
                m.print_header();
            }
            m.monitor(0, self.model.dag_mut());
        }
    }

    fn fire_monitors(&mut self) {
        let generation = self.generation;
        for m in &mut self.monitors {
            let interval = m.printing_interval().max(1);
            if generation.is_multiple_of(interval) {
                m.monitor(generation, self.model.dag_mut());
            }
        }
    }

    /// Initializes the chain (if not already at generation `0` with
    /// monitors started) and runs `generations` steady-state cycles,
    /// firing monitors after each one.
    ///
    /// # Errors
    ///
    /// See [`Mcmc::initialize_chain`] and [`Mcmc::next_cycle`].
    pub fn run(&mut self, generations: u64) -> Result<(), McmcError> {
        self.initialize_chain()?;
        if self.generation == 0 {
            self.start_monitors();
        }
        self.reset_move_counters();
        for _ in 0..generations {
            self.next_cycle(true)?;
            self.fire_monitors();
        }
        Ok(())
    }

    /// Initializes the chain and runs `generations` cycles without
    /// advancing the monitored generation counter or firing monitors,
    /// auto-tuning every `tuning_interval` generations.
    ///
    /// # Errors
    ///
    /// See [`Mcmc::initialize_chain`] and [`Mcmc::next_cycle`].
    pub fn burnin(&mut self, generations: u64, tuning_interval: u64) -> Result<(), McmcError> {
        self.initialize_chain()?;
        self.reset_move_counters();
        // One tick per 5% of progress, mirroring the 20-mark burn-in
        // progress bar; only active chains report it.
        let tick = (generations / 20).max(1);
        for gen in 1..=generations {
            self.next_cycle(false)?;
            if self.chain_active && gen.is_multiple_of(tick) {
                let percent = gen * 100 / generations;
                tracing::info!(percent, generation = gen, "burn-in progress");
            }
            if tuning_interval > 0 && gen % tuning_interval == 0 {
                for m in &mut self.moves {
                    m.auto_tune();
                }
            }
        }
        Ok(())
    }

    /// Per-move acceptance statistics, in move-registration order
    /// (`printOperatorSummary`). Rendering to a table is a
    /// presentation concern left to the caller.
    #[must_use]
    pub fn operator_summary(&self) -> Vec<OperatorStat> {
        self.moves
            .iter()
            .map(|m| OperatorStat {
                name: m.name().to_string(),
                weight: m.weight(),
                num_tried: m.num_tried(),
                num_accepted: m.num_accepted(),
                tuning_parameter: m.tuning_parameter(),
            })
            .collect()
    }
}

fn dedup_ids(ids: Vec<NodeId>) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
