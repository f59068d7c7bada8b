//! Collision and perk pickup
//!
//! Only the 3x3 block of chunks around the player is scanned; at any
//! reachable speed nothing further away can touch the hitbox within one
//! tick. Obstacles are scanned first and stop at the first blocking hit,
//! then every perk in the block is tested, then the hit (if any) is
//! resolved against the player's skip charges.

use super::chunk::ChunkCoord;
use super::scene::RenderSurface;
use super::state::{PerkKind, PlayerState};
use super::world::World;
use crate::settings::PerkSettings;

/// How a blocking collision was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    #[default]
    Clear,
    /// A skip charge absorbed the hit and opened a grace window
    Absorbed { charges_left: u32 },
    /// No charges left; the run is over
    RunOver,
}

/// Result of one collision pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    pub collided: bool,
    pub perks_collected: Vec<PerkKind>,
    pub resolution: Resolution,
}

/// Find the first blocking obstacle around the player, if any
pub fn find_blocking(player: &PlayerState, world: &World, center: ChunkCoord) -> bool {
    let airborne = player.is_airborne();
    for chunk in world.neighborhood(center) {
        for obstacle in &chunk.obstacles {
            let Some(bounds) = chunk.obstacle_bounds(obstacle) else {
                log::warn!(
                    "Obstacle {:?} in chunk {:?} has no usable bounds, skipped",
                    obstacle.object,
                    chunk.coord
                );
                continue;
            };
            if !player.hitbox.intersects(&bounds) {
                continue;
            }
            if obstacle.requires_jump && airborne {
                continue;
            }
            return true;
        }
    }
    false
}

/// Collect every perk touching the hitbox, applying effects as they are taken
pub fn collect_perks(
    player: &mut PlayerState,
    world: &mut World,
    center: ChunkCoord,
    tuning: &PerkSettings,
    time: f32,
    surface: &mut dyn RenderSurface,
) -> Vec<PerkKind> {
    let mut collected = Vec::new();
    for dz in -1..=1 {
        for dx in -1..=1 {
            let Some(chunk) = world.chunk_mut(center.offset(dx, dz)) else {
                continue;
            };
            let mut i = 0;
            while i < chunk.perks.len() {
                let bounds = chunk.perk_bounds(&chunk.perks[i]);
                if !player.hitbox.intersects(&bounds) {
                    i += 1;
                    continue;
                }
                if let Some(perk) = chunk.take_perk(i, surface) {
                    apply_perk(player, perk.kind, tuning, time);
                    collected.push(perk.kind);
                }
            }
        }
    }
    collected
}

/// Apply a perk's effect; both effects reset rather than stack
pub fn apply_perk(player: &mut PlayerState, kind: PerkKind, tuning: &PerkSettings, time: f32) {
    match kind {
        PerkKind::CollisionSkip => player.skip_charges = tuning.skip_charges,
        PerkKind::SlowTime => player.slow_time.activate(time, tuning.slow_time_secs),
    }
    log::debug!("Perk collected: {:?}", kind);
}

/// Spend a skip charge on a blocking hit, or end the run
pub fn resolve(player: &mut PlayerState, tuning: &PerkSettings, time: f32) -> Resolution {
    if player.skip_charges > 0 {
        player.skip_charges -= 1;
        player.invincibility.activate(time, tuning.invincibility_secs);
        Resolution::Absorbed {
            charges_left: player.skip_charges,
        }
    } else {
        Resolution::RunOver
    }
}

/// Full collision pass for one tick
pub fn check(
    player: &mut PlayerState,
    world: &mut World,
    tuning: &PerkSettings,
    time: f32,
    surface: &mut dyn RenderSurface,
) -> CollisionReport {
    let center = ChunkCoord::containing(player.position, world.chunk_size());

    // Grace window: no obstacle registers, perks still do
    let collided = !player.invincibility.is_active(time) && find_blocking(player, world, center);
    let perks_collected = collect_perks(player, world, center, tuning, time, surface);
    let resolution = if collided {
        resolve(player, tuning, time)
    } else {
        Resolution::Clear
    };

    CollisionReport {
        collided,
        perks_collected,
        resolution,
    }
}
