//! Score and difficulty curve
//!
//! Score is whole units of forward distance. Difficulty steps up every
//! `score_per_level` points and gates obstacle count and pattern variety;
//! density grows continuously and only scales decoration.

use super::generate::GenerationParams;
use super::state::RunState;
use crate::settings::DifficultySettings;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyCurve {
    score_per_level: u64,
    density_score_scale: f32,
}

impl DifficultyCurve {
    pub fn new(settings: &DifficultySettings) -> Self {
        Self {
            score_per_level: settings.score_per_level.max(1),
            density_score_scale: settings.density_score_scale,
        }
    }

    /// Whole units travelled; negative (behind the start line) counts as zero
    pub fn score_from_distance(z: f32) -> u64 {
        z.max(0.0).floor() as u64
    }

    #[inline]
    pub fn level(&self, score: u64) -> u32 {
        u32::try_from(score / self.score_per_level).unwrap_or(u32::MAX)
    }

    #[inline]
    pub fn density(&self, score: u64) -> f32 {
        1.0 + score as f32 / self.density_score_scale
    }

    /// Fold the player's forward distance into the run; score never goes down
    pub fn observe(&self, run: &mut RunState, z: f32) {
        run.score = run.score.max(Self::score_from_distance(z));
        run.difficulty_level = self.level(run.score);
        run.obstacle_density = self.density(run.score);
    }

    /// Parameters for the next chunks to be generated
    pub fn params(run: &RunState) -> GenerationParams {
        GenerationParams {
            difficulty_level: run.difficulty_level,
            obstacle_density: run.obstacle_density,
        }
    }
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        Self::new(&DifficultySettings::default())
    }
}
