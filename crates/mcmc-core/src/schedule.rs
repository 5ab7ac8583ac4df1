// SPDX-License-Identifier: Apache-2.0
//! Proposal scheduling: how a cycle's moves are drawn from the move set.

use std::fmt::Debug;

use rand::Rng;
use rand::RngCore;

use crate::moves::Move;

/// Picks which move fires next within a cycle.
///
/// A cycle runs [`Schedule::proposals_per_cycle`] proposals; each one is
/// resolved to a move index via [`Schedule::next_move`].
pub trait Schedule: Debug {
    /// Number of proposals to run in one cycle: `round(sum of weights)`,
    /// with at least one proposal per non-empty move set.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn proposals_per_cycle(&self, moves: &[Box<dyn Move>]) -> usize {
        let total: f64 = moves.iter().map(|m| m.weight()).sum();
        if moves.is_empty() {
            0
        } else {
            total.round().max(1.0) as usize
        }
    }

    /// Returns the index into `moves` of the next proposal to run, advancing
    /// any internal schedule state.
    fn next_move(&mut self, moves: &[Box<dyn Move>], rng: &mut dyn RngCore) -> usize;

    /// Resets any internal position so the next cycle starts fresh.
    ///
    /// Called whenever a chain is (re-)initialized. Stateless schedules
    /// (e.g. [`RandomSchedule`]) can leave this as a no-op.
    fn reset(&mut self) {}
}

/// Draws each proposal independently with probability proportional to its
/// move's weight.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSchedule;

impl RandomSchedule {
    /// Creates a new weighted-random schedule.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Schedule for RandomSchedule {
    fn next_move(&mut self, moves: &[Box<dyn Move>], rng: &mut dyn RngCore) -> usize {
        assert!(!moves.is_empty(), "cannot schedule from an empty move set");
        let total: f64 = moves.iter().map(|m| m.weight()).sum();
        let mut draw = rng.gen_range(0.0..total);
        for (i, m) in moves.iter().enumerate() {
            draw -= m.weight();
            if draw <= 0.0 {
                return i;
            }
        }
        moves.len() - 1
    }
}

/// Cycles deterministically through moves: each move `i` appears
/// `round(weight_i)` times (at least once) in move order, and the resulting
/// sequence repeats indefinitely across cycles.
#[derive(Debug, Clone, Default)]
pub struct SequentialSchedule {
    position: usize,
}

impl SequentialSchedule {
    /// Creates a new sequential schedule, starting at the first move.
    #[must_use]
    pub const fn new() -> Self {
        Self { position: 0 }
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn expanded_sequence(moves: &[Box<dyn Move>]) -> Vec<usize> {
        let mut sequence = Vec::new();
        for (i, m) in moves.iter().enumerate() {
            let repeats = (m.weight().round() as usize).max(1);
            sequence.extend(std::iter::repeat_n(i, repeats));
        }
        sequence
    }
}

impl Schedule for SequentialSchedule {
    fn next_move(&mut self, moves: &[Box<dyn Move>], _rng: &mut dyn RngCore) -> usize {
        assert!(!moves.is_empty(), "cannot schedule from an empty move set");
        let sequence = Self::expanded_sequence(moves);
        let index = sequence[self.position % sequence.len()];
        self.position = self.position.wrapping_add(1);
        index
    }

    fn reset(&mut self) {
        self.position = 0;
    }
}
