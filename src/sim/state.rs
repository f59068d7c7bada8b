//! Player and run state
//!
//! `PlayerState` is mutated by kinematics and the collision engine every tick;
//! `RunState` by the difficulty controller. Both are plain data.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use crate::settings::PlayerSettings;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the player to start
    #[default]
    Ready,
    /// Active gameplay
    Running,
    /// Run ended; terminal until a new run starts
    Over,
}

/// Collectible perk types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerkKind {
    /// Grants charges that absorb blocking collisions
    CollisionSkip,
    /// Halves movement for a while
    SlowTime,
}

/// An effect that is active from activation until a fixed expiry time
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimedEffect {
    pub active: bool,
    pub expires_at: f32,
}

impl TimedEffect {
    /// Start (or restart) the window; an existing expiry is overwritten, not extended
    pub fn activate(&mut self, now: f32, duration: f32) {
        self.active = true;
        self.expires_at = now + duration;
    }

    #[inline]
    pub fn is_active(&self, now: f32) -> bool {
        self.active && now < self.expires_at
    }

    /// Drop the flag once the window has passed; returns true if it just expired
    pub fn expire(&mut self, now: f32) -> bool {
        if self.active && now >= self.expires_at {
            self.active = false;
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// The runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    /// x lateral, y eye height, z forward distance
    pub position: Vec3,
    pub vertical_velocity: f32,
    pub jumping: bool,
    pub crouching: bool,
    /// Forward speed before the slow-time multiplier
    pub speed: f32,
    /// -1 left, 0 none, +1 right (last resolved input)
    pub lateral_intent: f32,
    pub invincibility: TimedEffect,
    pub skip_charges: u32,
    pub slow_time: TimedEffect,
    /// Recomputed every tick from position and posture
    pub hitbox: Aabb,
}

impl PlayerState {
    pub fn new(tuning: &PlayerSettings) -> Self {
        let mut player = Self {
            position: Vec3::new(0.0, tuning.standing_height, tuning.start_z),
            vertical_velocity: 0.0,
            jumping: false,
            crouching: false,
            speed: tuning.start_speed,
            lateral_intent: 0.0,
            invincibility: TimedEffect::default(),
            skip_charges: 0,
            slow_time: TimedEffect::default(),
            hitbox: Aabb::new(Vec3::ZERO, Vec3::ZERO),
        };
        player.update_hitbox(tuning);
        player
    }

    /// Height the camera rests at in the current posture
    #[inline]
    pub fn resting_height(&self, tuning: &PlayerSettings) -> f32 {
        if self.crouching {
            tuning.crouch_height
        } else {
            tuning.standing_height
        }
    }

    /// Airborne players pass over jump-required obstacles
    #[inline]
    pub fn is_airborne(&self) -> bool {
        self.jumping
    }

    /// Rebuild the hitbox: feet at `position.y - resting height`, shorter when crouched
    pub fn update_hitbox(&mut self, tuning: &PlayerSettings) {
        let height = if self.crouching {
            tuning.standing_height * 0.5
        } else {
            tuning.standing_height * 0.8
        };
        let feet = self.position.y - self.resting_height(tuning);
        let center = Vec3::new(self.position.x, feet + height / 2.0, self.position.z);
        self.hitbox = Aabb::from_center_size(
            center,
            Vec3::new(tuning.hitbox_width, height, tuning.hitbox_width),
        );
    }

    /// Forward/lateral multiplier from slow time
    pub fn speed_multiplier(&self, now: f32, slow_multiplier: f32) -> f32 {
        if self.slow_time.is_active(now) {
            slow_multiplier
        } else {
            1.0
        }
    }
}

/// Score, difficulty and the process-lifetime high score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub phase: GamePhase,
    /// Never decreases within a run
    pub score: u64,
    pub difficulty_level: u32,
    /// Decoration density, >= 1.0
    pub obstacle_density: f32,
    pub high_score: u64,
}

impl RunState {
    pub fn new(high_score: u64) -> Self {
        Self {
            phase: GamePhase::Ready,
            score: 0,
            difficulty_level: 0,
            obstacle_density: 1.0,
            high_score,
        }
    }

    /// Fresh run keeping the high score
    pub fn restart(&mut self) {
        *self = Self {
            phase: GamePhase::Running,
            ..Self::new(self.high_score)
        };
    }
}

/// Notable things that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    RunStarted,
    PerkCollected(PerkKind),
    /// A skip charge absorbed a collision
    CollisionAbsorbed { charges_left: u32 },
    SlowTimeEnded,
    NewHighScore(u64),
    RunOver { score: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_effect_overwrites_expiry() {
        let mut effect = TimedEffect::default();
        effect.activate(10.0, 5.0);
        assert_eq!(effect.expires_at, 15.0);
        effect.activate(11.0, 5.0);
        assert_eq!(effect.expires_at, 16.0);
        assert!(effect.is_active(15.5));
        assert!(!effect.is_active(16.0));
    }

    #[test]
    fn test_timed_effect_expire_reports_once() {
        let mut effect = TimedEffect::default();
        effect.activate(0.0, 0.5);
        assert!(!effect.expire(0.25));
        assert!(effect.expire(0.5));
        assert!(!effect.expire(0.75));
        assert!(!effect.active);
    }

    #[test]
    fn test_hitbox_standing_and_crouched() {
        let tuning = PlayerSettings::default();
        let mut player = PlayerState::new(&tuning);
        assert_eq!(player.position, Vec3::new(0.0, 5.0, -10.0));
        assert!((player.hitbox.min.y - 0.0).abs() < 1e-5);
        assert!((player.hitbox.max.y - 4.0).abs() < 1e-5);
        assert!((player.hitbox.size().x - 1.5).abs() < 1e-5);

        player.crouching = true;
        player.position.y = tuning.crouch_height;
        player.update_hitbox(&tuning);
        assert!((player.hitbox.min.y - 0.0).abs() < 1e-5);
        assert!((player.hitbox.max.y - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_restart_keeps_high_score() {
        let mut run = RunState::new(120);
        run.score = 900;
        run.difficulty_level = 2;
        run.phase = GamePhase::Over;
        run.restart();
        assert_eq!(run.phase, GamePhase::Running);
        assert_eq!(run.score, 0);
        assert_eq!(run.difficulty_level, 0);
        assert_eq!(run.high_score, 120);
    }
}
