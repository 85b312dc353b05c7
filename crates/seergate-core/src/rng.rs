//! Random number generation abstractions.
//!
//! The draw generator consumes `DeterministicRng` so that identical seeds
//! replay to identical spreads across sessions; session-code generation
//! consumes `RandomSource` so the core stays free of ambient entropy.

use rand::Rng as _;

/// Abstraction over a reproducible stream of uniform draws.
pub trait DeterministicRng: Send {
    /// Generate a uniform `f64` in `[0.0, 1.0)`.
    fn next_f64(&mut self) -> f64;
}

/// The mulberry32 mix function: a 32-bit seeded generator whose output stream
/// is stable across platforms. Stored spread seeds must replay to the same
/// card sequence forever, so the exact bit-level recipe is load-bearing.
#[derive(Debug, Clone, Copy)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    /// Creates a generator from an integer seed.
    #[must_use]
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }
}

impl DeterministicRng for Mulberry32 {
    #[allow(clippy::cast_lossless)]
    fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let a = self.state;
        let mut t = (a ^ (a >> 15)).wrapping_mul(a | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        f64::from(t ^ (t >> 14)) / 4_294_967_296.0
    }
}

/// Abstraction over non-deterministic entropy (session codes).
pub trait RandomSource: Send + Sync {
    /// Fills `dest` with random bytes.
    fn fill_bytes(&self, dest: &mut [u8]);
}

/// Production random source backed by the thread-local OS-seeded generator.
#[derive(Debug, Clone, Copy)]
pub struct OsRandomSource;

impl RandomSource for OsRandomSource {
    fn fill_bytes(&self, dest: &mut [u8]) {
        rand::rng().fill(dest);
    }
}
