//! Injectable random source for world generation
//!
//! Production runs seed a PCG stream from the clock, so every visit to a
//! chunk coordinate looks different. Tests pin the seed or script the draws.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Source of uniform draws used by chunk and prop generation
pub trait RandomSource {
    /// Uniform sample in [0, 1)
    fn next_unit(&mut self) -> f32;

    /// Uniform sample in [min, max)
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_unit()
    }

    /// True with probability `p`
    fn chance(&mut self, p: f32) -> bool {
        self.next_unit() < p
    }
}

/// PCG32-backed random source
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: Pcg32,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f32 {
        self.rng.random::<f32>()
    }
}

/// Replays a fixed list of draws, then repeats `fallback`
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct ScriptedRandom {
    draws: std::collections::VecDeque<f32>,
    fallback: f32,
}

#[cfg(test)]
impl ScriptedRandom {
    pub(crate) fn new(draws: &[f32], fallback: f32) -> Self {
        Self {
            draws: draws.iter().copied().collect(),
            fallback,
        }
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f32 {
        self.draws.pop_front().unwrap_or(self.fallback)
    }
}
