//! Deterministic random number generation for battle resolution.
//!
//! Every chance-based rule in the engine - accuracy draws, critical hits,
//! ranged damage magnitudes, deck shuffles, resource regeneration routing
//! and the automated opponent - draws from a `BattleRng`, so an entire
//! session replays identically from one seed.
//!
//! The router holds a root `BattleRng` and forks one independent stream
//! per session, keeping concurrent sessions deterministic in isolation.
//!
//! ```
//! use vril_arena::core::BattleRng;
//!
//! let mut rng = BattleRng::new(42);
//! let mut session_rng = rng.fork();
//!
//! // Root and fork produce different sequences
//! assert_ne!(rng.gen_unit(), session_rng.gen_unit());
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded, forkable RNG.
///
/// Uses ChaCha8 for speed while maintaining high-quality randomness.
#[derive(Clone, Debug)]
pub struct BattleRng {
    inner: ChaCha8Rng,
    seed: u64,
    fork_counter: u64,
}

impl BattleRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            fork_counter: 0,
        }
    }

    /// Create an RNG seeded from the OS entropy source.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Fork this RNG to create an independent stream.
    ///
    /// Each fork produces a different but deterministic sequence; used to
    /// give every session its own stream off the router's root RNG.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        self.fork_counter += 1;
        let fork_seed = self
            .seed
            .wrapping_add(self.fork_counter.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        Self {
            inner: ChaCha8Rng::seed_from_u64(fork_seed),
            seed: fork_seed,
            fork_counter: 0,
        }
    }

    /// Uniform draw in `[0, 1)`.
    ///
    /// The accuracy and critical checks compare against this draw.
    pub fn gen_unit(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Uniform draw in `[low, high)` (ranged damage magnitudes).
    pub fn gen_range_f64(&mut self, low: f64, high: f64) -> f64 {
        if low == high {
            return low;
        }
        low + self.inner.gen::<f64>() * (high - low)
    }

    /// Generate a random usize in the given range.
    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Generate a random boolean with given probability of true.
    pub fn gen_bool(&mut self, probability: f64) -> bool {
        self.inner.gen_bool(probability.clamp(0.0, 1.0))
    }

    /// Shuffle a slice in place (uniform Fisher-Yates).
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }
}
