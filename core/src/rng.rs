//! Deterministic random number generation.
//!
//! RULE: Nothing on the dashboard path may call any platform RNG.
//! All randomness flows through DashRng handles derived from the
//! single master seed carried by the session.
//!
//! Each portfolio refresh gets its own RNG stream, seeded
//! deterministically from (master_seed XOR refresh_index). This means:
//!   - Replaying a session seed reproduces every refresh, not just the first.
//!   - Two refreshes in the same session never share a stream.

use crate::types::RefreshIndex;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A deterministic RNG handle for a single portfolio refresh.
pub struct DashRng {
    pub refresh: RefreshIndex,
    inner: Pcg64Mcg,
}

impl DashRng {
    /// Create a refresh RNG from the master seed and the refresh
    /// ordinal. The derivation constant must never change.
    pub fn new(master_seed: u64, refresh: RefreshIndex) -> Self {
        let derived_seed = master_seed ^ (refresh.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            refresh,
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll a float uniformly in [lo, hi).
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// Per-session factory for refresh RNG streams.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_refresh(&self, refresh: RefreshIndex) -> DashRng {
        DashRng::new(self.master_seed, refresh)
    }
}
