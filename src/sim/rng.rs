//! src/sim/rng.rs
//!
//! The pseudo-random stream the simulator injects into the core in place
//! of a global pseudo-random singleton. The core never reaches for a
//! thread rng directly — every draw goes through this trait, so a test
//! can swap in a seeded, deterministic stream.

use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng};

/// `uniform_integer(lo, hi_exclusive)` from the simulator contract in 
pub trait Rng {
    /// Returns a value in `[lo, hi_exclusive)`. Panics if `hi_exclusive <= lo`,
    /// mirroring the simulator contract's assumption that callers only ask
    /// for a range known to be non-empty.
    fn uniform_integer(&mut self, lo: u32, hi_exclusive: u32) -> u32;
}

/// The default, production `Rng`: a seedable `rand::rngs::StdRng`, matching
/// the Design Notes' requirement that the stream be an injected dependency
/// so tests can make runs deterministic.
pub struct SimRng(StdRng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl Rng for SimRng {
    fn uniform_integer(&mut self, lo: u32, hi_exclusive: u32) -> u32 {
        assert!(hi_exclusive > lo, "empty range [{lo}, {hi_exclusive})");
        self.0.gen_range(lo..hi_exclusive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_stream_is_reproducible() {
        let mut a = SimRng::seeded(42);
        let mut b = SimRng::seeded(42);
        let draws_a: Vec<u32> = (0..20).map(|_| a.uniform_integer(0, 1000)).collect();
        let draws_b: Vec<u32> = (0..20).map(|_| b.uniform_integer(0, 1000)).collect();
        assert_eq!(draws_a, draws_b);
        assert!(draws_a.iter().all(|v| *v < 1000));
    }
}
