//! HUD collaborator
//!
//! One-way: the runner pushes score and perk state out, and never reads
//! anything back. The wasm build renders this into DOM elements.

use crate::sim::state::{PlayerState, RunState};

/// Everything the HUD shows during a run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HudSnapshot {
    pub score: u64,
    pub high_score: u64,
    pub skip_charges: u32,
    pub slow_time_active: bool,
}

impl HudSnapshot {
    pub fn capture(player: &PlayerState, run: &RunState, time: f32) -> Self {
        Self {
            score: run.score,
            high_score: run.high_score,
            skip_charges: player.skip_charges,
            slow_time_active: player.slow_time.is_active(time),
        }
    }

    pub fn collision_perk_active(&self) -> bool {
        self.skip_charges > 0
    }

    pub fn collision_perk_label(&self) -> String {
        collision_perk_label(self.skip_charges)
    }
}

/// Indicator text: remaining charges, or the full grant when empty
pub fn collision_perk_label(charges: u32) -> String {
    if charges > 0 {
        format!("{}x", charges)
    } else {
        format!("{}x", crate::consts::SKIP_CHARGES)
    }
}

/// Run-over overlay text
pub fn run_over_message(score: u64) -> String {
    format!("You ran {} meters!", score)
}

pub trait HudSink {
    fn run_started(&mut self) {}

    fn update(&mut self, hud: &HudSnapshot);

    fn run_over(&mut self, score: u64, high_score: u64);
}

/// HUD that discards everything (headless runs)
#[derive(Debug, Default)]
pub struct NullHud;

impl HudSink for NullHud {
    fn update(&mut self, _hud: &HudSnapshot) {}

    fn run_over(&mut self, _score: u64, _high_score: u64) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::PlayerSettings;

    #[test]
    fn test_collision_perk_label() {
        assert_eq!(collision_perk_label(0), "3x");
        assert_eq!(collision_perk_label(2), "2x");
        assert_eq!(collision_perk_label(3), "3x");
    }

    #[test]
    fn test_capture_reflects_perks() {
        let mut player = PlayerState::new(&PlayerSettings::default());
        player.skip_charges = 1;
        player.slow_time.activate(4.0, 5.0);
        let mut run = RunState::new(900);
        run.score = 120;

        let hud = HudSnapshot::capture(&player, &run, 6.0);
        assert_eq!(hud.score, 120);
        assert_eq!(hud.high_score, 900);
        assert!(hud.collision_perk_active());
        assert!(hud.slow_time_active);
        assert!(!HudSnapshot::capture(&player, &run, 9.0).slow_time_active);
    }

    #[test]
    fn test_run_over_message() {
        assert_eq!(run_over_message(1532), "You ran 1532 meters!");
    }
}
