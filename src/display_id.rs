//! Cosmetic prediction labels such as `#MEO-4821`.
//!
//! Purely decorative. Kept behind [`IdSource`] so everything that renders
//! a result stays deterministic under test.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::Domain;

const SUFFIX_MIN: u16 = 1000;
const SUFFIX_MAX: u16 = 9999;

pub trait IdSource {
    /// Four-digit suffix in `1000..=9999`.
    fn next_suffix(&mut self) -> u16;
}

pub struct RandomIdSource {
    rng: StdRng,
}

impl RandomIdSource {
    pub fn new() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Default for RandomIdSource {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for RandomIdSource {
    fn next_suffix(&mut self) -> u16 {
        self.rng.gen_range(SUFFIX_MIN..=SUFFIX_MAX)
    }
}

/// Always yields the same suffix.
#[derive(Debug, Clone, Copy)]
pub struct FixedIdSource(pub u16);

impl IdSource for FixedIdSource {
    fn next_suffix(&mut self) -> u16 {
        self.0
    }
}

pub fn display_id(domain: Domain, source: &mut dyn IdSource) -> String {
    let suffix = source.next_suffix().clamp(SUFFIX_MIN, SUFFIX_MAX);
    format!("#{}-{}", domain.label(), suffix)
}
