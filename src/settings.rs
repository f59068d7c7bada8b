//! Game settings and tuning
//!
//! Read from LocalStorage as JSON at startup. Missing fields fall back to the
//! defaults in `crate::consts`, so partial overrides keep loading.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{GameError, Result};

/// World streaming tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    /// Side length of a chunk
    pub chunk_size: f32,
    /// Chunks materialized in each direction around the player
    pub render_radius: u32,
    /// Lateral position clamp (±)
    pub lateral_limit: f32,
    /// Grass blades per chunk
    pub grass_blades: u32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            render_radius: RENDER_RADIUS,
            lateral_limit: LATERAL_LIMIT,
            grass_blades: GRASS_BLADES,
        }
    }
}

/// Player movement tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub start_speed: f32,
    pub acceleration: f32,
    pub lateral_speed: f32,
    pub jump_velocity: f32,
    /// Vertical acceleration while airborne (negative is down)
    pub gravity: f32,
    pub standing_height: f32,
    pub crouch_height: f32,
    pub hitbox_width: f32,
    pub start_z: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            start_speed: START_SPEED,
            acceleration: ACCELERATION,
            lateral_speed: LATERAL_SPEED,
            jump_velocity: JUMP_VELOCITY,
            gravity: GRAVITY,
            standing_height: STANDING_HEIGHT,
            crouch_height: CROUCH_HEIGHT,
            hitbox_width: HITBOX_WIDTH,
            start_z: START_Z,
        }
    }
}

/// Perk effect tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerkSettings {
    /// Charges granted by a collision-skip perk (resets, never stacks)
    pub skip_charges: u32,
    /// Grace window after a charge absorbs a hit
    pub invincibility_secs: f32,
    pub slow_time_secs: f32,
    pub slow_time_multiplier: f32,
    pub spawn_chance: f32,
}

impl Default for PerkSettings {
    fn default() -> Self {
        Self {
            skip_charges: SKIP_CHARGES,
            invincibility_secs: INVINCIBILITY_SECS,
            slow_time_secs: SLOW_TIME_SECS,
            slow_time_multiplier: SLOW_TIME_MULTIPLIER,
            spawn_chance: PERK_SPAWN_CHANCE,
        }
    }
}

/// Score-to-difficulty curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultySettings {
    pub score_per_level: u64,
    /// Score at which decoration density doubles
    pub density_score_scale: f32,
}

impl Default for DifficultySettings {
    fn default() -> Self {
        Self {
            score_per_level: SCORE_PER_LEVEL,
            density_score_scale: DENSITY_SCORE_SCALE,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub world: WorldSettings,
    pub player: PlayerSettings,
    pub perks: PerkSettings,
    pub difficulty: DifficultySettings,

    // === Audio ===
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            world: WorldSettings::default(),
            player: PlayerSettings::default(),
            perks: PerkSettings::default(),
            difficulty: DifficultySettings::default(),
            music_volume: 0.7,
            muted: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "forest_runner_settings";

    /// Reject tuning that would break streaming or kinematics
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(GameError::InvalidSettings(msg.to_string()));

        if !(self.world.chunk_size.is_finite() && self.world.chunk_size > 0.0) {
            return invalid("chunk_size must be positive");
        }
        if self.world.render_radius == 0 {
            return invalid("render_radius must be at least 1");
        }
        if !(self.world.lateral_limit >= 0.0) {
            return invalid("lateral_limit must be non-negative");
        }
        let p = &self.player;
        if !(p.start_speed >= 0.0 && p.acceleration >= 0.0 && p.lateral_speed >= 0.0) {
            return invalid("player speeds must be non-negative");
        }
        if !(p.gravity < 0.0 && p.jump_velocity > 0.0) {
            return invalid("jumping needs positive jump_velocity and negative gravity");
        }
        if !(p.crouch_height > 0.0 && p.crouch_height <= p.standing_height) {
            return invalid("crouch_height must be in (0, standing_height]");
        }
        if !(p.hitbox_width > 0.0) {
            return invalid("hitbox_width must be positive");
        }
        let k = &self.perks;
        if !(k.invincibility_secs > 0.0 && k.slow_time_secs > 0.0) {
            return invalid("perk durations must be positive");
        }
        if !(k.slow_time_multiplier > 0.0 && k.slow_time_multiplier <= 1.0) {
            return invalid("slow_time_multiplier must be in (0, 1]");
        }
        if !(0.0..=1.0).contains(&k.spawn_chance) {
            return invalid("spawn_chance must be a probability");
        }
        if self.difficulty.score_per_level == 0 {
            return invalid("score_per_level must be positive");
        }
        if !(self.difficulty.density_score_scale > 0.0) {
            return invalid("density_score_scale must be positive");
        }
        Ok(())
    }

    /// Effective music volume (respects mute)
    pub fn effective_music_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.music_volume.clamp(0.0, 1.0)
        }
    }

    /// Parse settings, keeping defaults for any missing field
    pub fn from_json(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Some(settings) if settings.validate().is_ok() => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    _ => log::warn!("Stored settings unusable, falling back to defaults"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native builds always use the defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
