//! Injectable randomness used by systems that pick templates, regions and drops.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniform random draws consumed by spawning and loot systems.
///
/// Systems never reach for a global generator; they receive a source at
/// construction so replays and tests can supply scripted sequences.
pub trait RandomSource {
    /// Returns an index drawn uniformly from `0..len`.
    ///
    /// Callers guarantee that `len` is non-zero.
    fn index(&mut self, len: usize) -> usize;

    /// Returns a value drawn uniformly from the closed range `min..=max`.
    ///
    /// Non-finite or reversed bounds yield `min`.
    fn between(&mut self, min: f32, max: f32) -> f32;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn index(&mut self, len: usize) -> usize {
        (**self).index(len)
    }

    fn between(&mut self, min: f32, max: f32) -> f32 {
        (**self).between(min, max)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn index(&mut self, len: usize) -> usize {
        (**self).index(len)
    }

    fn between(&mut self, min: f32, max: f32) -> f32 {
        (**self).between(min, max)
    }
}

/// ChaCha8-backed random source seeded from a single 64-bit value.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Creates a new source whose sequence is fully determined by `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "index requires a non-empty range");
        self.rng.gen_range(0..len.max(1))
    }

    fn between(&mut self, min: f32, max: f32) -> f32 {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return min;
        }
        // The span of two finite f32 bounds can overflow f32 but never f64.
        let (low, high) = (f64::from(min), f64::from(max));
        let value = low + (high - low) * self.rng.gen::<f64>();
        value.clamp(low, high) as f32
    }
}
