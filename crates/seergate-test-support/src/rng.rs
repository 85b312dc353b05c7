//! Deterministic randomness for tests.

use seergate_core::rng::{DeterministicRng, RandomSource};

/// A generator that replays a predetermined sequence of unit-interval draws.
/// Panics if the sequence is exhausted. Used where a test needs specific,
/// repeatable outcomes (e.g. forcing a card reversed).
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<f64>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given draws.
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, index: 0 }
    }
}

impl DeterministicRng for SequenceRng {
    fn next_f64(&mut self) -> f64 {
        let value = self.values[self.index];
        self.index += 1;
        value
    }
}

/// A random source that fills buffers by cycling a fixed byte pattern, so
/// session codes generated in tests are stable.
#[derive(Debug, Clone)]
pub struct FixedRandomSource(pub Vec<u8>);

impl RandomSource for FixedRandomSource {
    fn fill_bytes(&self, dest: &mut [u8]) {
        for (i, byte) in dest.iter_mut().enumerate() {
            *byte = self.0[i % self.0.len()];
        }
    }
}
