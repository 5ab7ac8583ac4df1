// SPDX-License-Identifier: Apache-2.0
//! Reference `Distribution` implementations: `Uniform` and `Normal`.

use mcmc_core::{Distribution, NodeValue};
use rand::Rng;
use rand::RngCore;
use rand_distr::StandardNormal;

/// Continuous uniform prior over `[low, high)`, with no parents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniform {
    low: f64,
    high: f64,
}

impl Uniform {
    /// Creates a uniform distribution over `[low, high)`.
    #[must_use]
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

impl Distribution for Uniform {
    fn ln_probability(&self, value: NodeValue, _parents: &[NodeValue]) -> f64 {
        let x = value.get();
        if x < self.low || x >= self.high {
            f64::NEG_INFINITY
        } else {
            -(self.high - self.low).ln()
        }
    }

    fn redraw(&self, rng: &mut dyn RngCore, _parents: &[NodeValue]) -> NodeValue {
        NodeValue::from(rng.gen_range(self.low..self.high))
    }
}

/// Normal density parameterized by its first two parents: `parents[0]` is
/// the mean, `parents[1]` is the standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Normal;

impl Normal {
    /// Creates a parent-parameterized normal distribution.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Distribution for Normal {
    fn ln_probability(&self, value: NodeValue, parents: &[NodeValue]) -> f64 {
        let mean = parents[0].get();
        let sd = parents[1].get();
        if sd <= 0.0 {
            return f64::NEG_INFINITY;
        }
        let z = (value.get() - mean) / sd;
        -0.5 * (std::f64::consts::TAU * sd * sd).ln() - 0.5 * z * z
    }

    fn redraw(&self, rng: &mut dyn RngCore, parents: &[NodeValue]) -> NodeValue {
        let mean = parents[0].get();
        let sd = parents[1].get();
        let z: f64 = rng.sample(StandardNormal);
        NodeValue::from(mean + sd * z)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp, clippy::cast_precision_loss)]
mod tests {
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    proptest! {
        /// A uniform redraw always lands back inside its own support,
        /// whatever that support is.
        #[test]
        fn uniform_redraw_always_lands_within_its_own_support(
            low in -1_000.0f64..1_000.0,
            width in 0.001f64..1_000.0,
            seed in any::<u64>(),
        ) {
            let u = Uniform::new(low, low + width);
            let mut rng = StdRng::seed_from_u64(seed);
            let draw = u.redraw(&mut rng, &[]).get();
            prop_assert!(draw >= low && draw < low + width);
        }

        /// A normal's density is always higher at its mean than at any
        /// point strictly further from the mean along the same direction.
        #[test]
        fn normal_density_strictly_decreases_with_distance_from_the_mean(
            mean in -100.0f64..100.0,
            sd in 0.01f64..50.0,
            offset in 0.01f64..50.0,
        ) {
            let n = Normal::new();
            let parents = [NodeValue::from(mean), NodeValue::from(sd)];
            let at_mean = n.ln_probability(NodeValue::from(mean), &parents);
            let off_mean = n.ln_probability(NodeValue::from(mean + offset), &parents);
            let further = n.ln_probability(NodeValue::from(mean + 2.0 * offset), &parents);
            prop_assert!(at_mean > off_mean);
            prop_assert!(off_mean > further);
        }
    }

    #[test]
    fn uniform_density_is_flat_inside_support_and_zero_outside() {
        let u = Uniform::new(2.0, 4.0);
        assert!((u.ln_probability(NodeValue::from(3.0), &[]) - (-2.0f64.ln())).abs() < 1e-12);
        assert_eq!(u.ln_probability(NodeValue::from(1.0), &[]), f64::NEG_INFINITY);
        assert_eq!(u.ln_probability(NodeValue::from(4.0), &[]), f64::NEG_INFINITY);
    }

    #[test]
    fn uniform_redraw_stays_within_support() {
        let u = Uniform::new(-1.0, 1.0);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let draw = u.redraw(&mut rng, &[]).get();
            assert!((-1.0..1.0).contains(&draw));
        }
    }

    #[test]
    fn normal_density_peaks_at_the_mean() {
        let n = Normal::new();
        let parents = [NodeValue::from(0.0), NodeValue::from(1.0)];
        let at_mean = n.ln_probability(NodeValue::from(0.0), &parents);
        let off_mean = n.ln_probability(NodeValue::from(1.0), &parents);
        assert!(at_mean > off_mean);
    }

    #[test]
    fn normal_density_rejects_nonpositive_scale() {
        let n = Normal::new();
        let parents = [NodeValue::from(0.0), NodeValue::from(0.0)];
        assert_eq!(
            n.ln_probability(NodeValue::from(0.0), &parents),
            f64::NEG_INFINITY
        );
    }

    #[test]
    fn normal_redraw_is_centered_near_the_mean_over_many_draws() {
        let n = Normal::new();
        let parents = [NodeValue::from(5.0), NodeValue::from(1.0)];
        let mut rng = StdRng::seed_from_u64(42);
        let samples: Vec<f64> = (0..5000).map(|_| n.redraw(&mut rng, &parents).get()).collect();
        let mean: f64 = samples.iter().sum::<f64>() / samples.len() as f64;
        assert!((mean - 5.0).abs() < 0.1, "sample mean {mean} too far from 5.0");
    }
}
