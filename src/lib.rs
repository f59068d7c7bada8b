//! Forest Runner - An endless first-person runner through a streamed forest
//!
//! Core modules:
//! - `sim`: Gameplay core (world streaming, kinematics, collisions, scoring)
//! - `renderer`: Procedural props and GPU instance packing
//! - `platform`: Browser input mapping and storage
//! - `persistence`: High score key-value store
//! - `settings`: Data-driven tuning and preferences

pub mod audio;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod ui;

pub use error::{GameError, Result};
pub use highscores::HighScore;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Side length of a square world chunk (world units)
    pub const CHUNK_SIZE: f32 = 50.0;
    /// Chunks kept materialized in each direction around the player
    pub const RENDER_RADIUS: u32 = 3;
    /// Lateral movement is clamped to ±this many units
    pub const LATERAL_LIMIT: f32 = 20.0;
    /// Grass blades scattered per chunk (purely visual)
    pub const GRASS_BLADES: u32 = 150;

    /// Player defaults
    pub const START_SPEED: f32 = 28.0;
    /// Forward acceleration (units/s²), scaled by the slow-time multiplier
    pub const ACCELERATION: f32 = 0.1;
    pub const LATERAL_SPEED: f32 = 22.0;
    pub const JUMP_VELOCITY: f32 = 15.0;
    pub const GRAVITY: f32 = -50.0;
    /// Camera height when standing (eye level)
    pub const STANDING_HEIGHT: f32 = 5.0;
    /// Camera height when crouched
    pub const CROUCH_HEIGHT: f32 = 2.5;
    pub const HITBOX_WIDTH: f32 = 1.5;
    /// Runs start slightly behind the origin chunk
    pub const START_Z: f32 = -10.0;

    /// Perk defaults
    pub const SKIP_CHARGES: u32 = 3;
    pub const INVINCIBILITY_SECS: f32 = 0.5;
    pub const SLOW_TIME_SECS: f32 = 5.0;
    pub const SLOW_TIME_MULTIPLIER: f32 = 0.5;
    /// Chance that a freshly generated chunk holds one perk
    pub const PERK_SPAWN_CHANCE: f32 = 0.1;

    /// Difficulty curve
    pub const SCORE_PER_LEVEL: u64 = 400;
    pub const DENSITY_SCORE_SCALE: f32 = 5000.0;
}

/// Map a world-space coordinate onto its chunk index (nearest chunk center)
#[inline]
pub fn chunk_index(world: f32, chunk_size: f32) -> i32 {
    (world / chunk_size).round() as i32
}

/// World-space center of the chunk with the given index
#[inline]
pub fn chunk_center(index: i32, chunk_size: f32) -> f32 {
    index as f32 * chunk_size
}
