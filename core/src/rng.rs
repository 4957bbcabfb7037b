//! Deterministic randomness for the draw engine.
//!
//! RULE: nothing in the engine calls a platform RNG. All randomness
//! flows through the single DrawRng owned by the engine, so a seeded
//! engine replays the same pick sequence over identical stores.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;
use std::collections::VecDeque;

pub struct DrawRng {
    inner: Pcg64Mcg,
    /// Pre-queued rolls consumed before the PRNG. Test hook standing
    /// in for mocking the random source; empty in production.
    script: VecDeque<u64>,
}

impl DrawRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
            script: VecDeque::new(),
        }
    }

    /// An rng that plays back `rolls` (reduced mod n on use) before
    /// falling through to a zero-seeded stream.
    pub fn scripted(rolls: impl IntoIterator<Item = u64>) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(0),
            script: rolls.into_iter().collect(),
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        if let Some(v) = self.script.pop_front() {
            return v;
        }
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n). Panics if n == 0.
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.next_u64() % n
    }

    /// Uniform pick from a slice; None when the slice is empty.
    pub fn choose<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        if items.is_empty() {
            None
        } else {
            let idx = self.next_u64_below(items.len() as u64) as usize;
            Some(items[idx])
        }
    }
}
