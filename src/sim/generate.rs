//! Procedural chunk generation
//!
//! Content is random on every call: leaving a chunk and coming back later
//! produces a fresh layout. Difficulty gates obstacle count and pattern
//! choice; density only scales decoration.

use glam::Vec3;

use super::chunk::{Chunk, ChunkCoord, Obstacle, Perk};
use super::random::RandomSource;
use super::scene::{ObjectId, Prop, PropFactory};
use super::state::PerkKind;
use crate::error::{GameError, Result};
use crate::settings::{PerkSettings, WorldSettings};

/// Lateral half-gap of a two-tree corridor
pub const CORRIDOR_OFFSET: f32 = 4.0;
/// Difficulty below which every obstacle is a single tree
pub const PATTERN_UNLOCK_LEVEL: u32 = 2;
/// Difficulty above which complex trees may appear
pub const COMPLEX_TREE_LEVEL: u32 = 3;

/// Inputs derived from the current score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub difficulty_level: u32,
    /// Decoration multiplier, >= 1.0
    pub obstacle_density: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            difficulty_level: 0,
            obstacle_density: 1.0,
        }
    }
}

/// Obstacle layout for one obstacle slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstaclePattern {
    SingleTree { complex: bool },
    /// Two trees either side of a gap the player must thread
    Corridor,
    /// A log that has to be jumped
    JumpLog,
}

/// Obstacles per chunk at a difficulty level
#[inline]
pub fn obstacle_count(difficulty_level: u32) -> u32 {
    1 + difficulty_level / 2
}

/// Pick a pattern from a uniform roll in [0, 1)
pub fn choose_pattern(
    difficulty_level: u32,
    roll: f32,
    rng: &mut dyn RandomSource,
) -> ObstaclePattern {
    if difficulty_level < PATTERN_UNLOCK_LEVEL || roll > 0.8 {
        let complex = difficulty_level > COMPLEX_TREE_LEVEL && rng.chance(0.5);
        ObstaclePattern::SingleTree { complex }
    } else if roll >= 0.4 {
        ObstaclePattern::Corridor
    } else {
        ObstaclePattern::JumpLog
    }
}

/// Builds chunks and hands out object ids
#[derive(Debug, Clone)]
pub struct ChunkGenerator {
    chunk_size: f32,
    grass_blades: u32,
    perk_chance: f32,
    next_id: u32,
}

impl ChunkGenerator {
    pub fn new(world: &WorldSettings, perks: &PerkSettings) -> Self {
        Self {
            chunk_size: world.chunk_size,
            grass_blades: world.grass_blades,
            perk_chance: perks.spawn_chance,
            next_id: 1,
        }
    }

    pub fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    fn next_object_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Uniform chunk-local ground position within the chunk's footprint
    fn random_spot(&self, rng: &mut dyn RandomSource) -> Vec3 {
        let half = self.chunk_size / 2.0;
        let x = rng.range(-half, half);
        let z = rng.range(-half, half);
        Vec3::new(x, 0.0, z)
    }

    /// Generate a fully populated chunk
    pub fn generate(
        &mut self,
        coord: ChunkCoord,
        params: GenerationParams,
        props: &mut dyn PropFactory,
        rng: &mut dyn RandomSource,
    ) -> Result<Chunk> {
        if !params.obstacle_density.is_finite() || params.obstacle_density < 1.0 {
            return Err(GameError::InvalidGeneration(format!(
                "obstacle density {} at {:?}",
                params.obstacle_density, coord
            )));
        }
        if !(self.chunk_size.is_finite() && self.chunk_size > 0.0) {
            return Err(GameError::InvalidGeneration(format!(
                "chunk size {}",
                self.chunk_size
            )));
        }

        let mut chunk = Chunk::new(coord, self.chunk_size);

        let ground = props.ground(self.next_object_id(), self.chunk_size);
        self.place_decoration(&mut chunk, ground);

        // Obstacles
        for _ in 0..obstacle_count(params.difficulty_level) {
            let spot = self.random_spot(rng);
            let roll = rng.next_unit();
            match choose_pattern(params.difficulty_level, roll, rng) {
                ObstaclePattern::SingleTree { complex } => {
                    let tree = props.tree(self.next_object_id(), spot, complex, rng);
                    self.place_obstacle(&mut chunk, tree, false);
                }
                ObstaclePattern::Corridor => {
                    for side in [-CORRIDOR_OFFSET, CORRIDOR_OFFSET] {
                        let at = spot + Vec3::new(side, 0.0, 0.0);
                        let tree = props.tree(self.next_object_id(), at, false, rng);
                        self.place_obstacle(&mut chunk, tree, false);
                    }
                }
                ObstaclePattern::JumpLog => {
                    let log = props.log(self.next_object_id(), spot);
                    self.place_obstacle(&mut chunk, log, true);
                }
            }
        }

        // Perks
        if rng.chance(self.perk_chance) {
            let kind = if rng.chance(0.5) {
                PerkKind::CollisionSkip
            } else {
                PerkKind::SlowTime
            };
            let spot = self.random_spot(rng);
            let perk = props.perk(self.next_object_id(), spot, kind);
            self.place_perk(&mut chunk, perk, kind);
        }

        // Decoration
        let decorations = (rng.range(4.0, 8.0) * params.obstacle_density).floor() as u32;
        for _ in 0..decorations {
            let bush = rng.chance(0.6);
            let spot = self.random_spot(rng);
            let id = self.next_object_id();
            let prop = if bush {
                props.bush(id, spot, rng)
            } else {
                props.rock(id, spot, rng)
            };
            self.place_decoration(&mut chunk, prop);
        }

        let grass = props.grass(
            self.next_object_id(),
            self.grass_blades,
            self.chunk_size / 2.0,
            rng,
        );
        self.place_decoration(&mut chunk, grass);

        Ok(chunk)
    }

    /// Move a prop built at a chunk-local spot into world space
    fn anchor(chunk: &Chunk, prop: &mut Prop) -> Vec3 {
        let local = prop.object.position;
        prop.object.position = chunk.origin + local;
        local
    }

    fn place_decoration(&self, chunk: &mut Chunk, mut prop: Prop) {
        Self::anchor(chunk, &mut prop);
        chunk.props.push(prop);
    }

    fn place_obstacle(&self, chunk: &mut Chunk, mut prop: Prop, requires_jump: bool) {
        let local = Self::anchor(chunk, &mut prop);
        if prop.colliders.is_empty() {
            // Keep the prop collidable in name only; the collision engine skips it
            chunk.obstacles.push(Obstacle {
                object: prop.object.id,
                local_bounds: None,
                requires_jump,
            });
        }
        for collider in &prop.colliders {
            chunk.obstacles.push(Obstacle {
                object: prop.object.id,
                local_bounds: Some(collider.translated(local)),
                requires_jump,
            });
        }
        chunk.props.push(prop);
    }

    fn place_perk(&self, chunk: &mut Chunk, mut prop: Prop, kind: PerkKind) {
        let local = Self::anchor(chunk, &mut prop);
        let bounds = prop.colliders.first().copied().or_else(|| {
            let corners: Vec<_> = prop
                .object
                .meshes
                .iter()
                .flat_map(|m| m.bounds().corners())
                .collect();
            super::aabb::Aabb::from_points(&corners)
        });
        match bounds {
            Some(bounds) => {
                chunk.perks.push(Perk {
                    object: prop.object.id,
                    kind,
                    local_bounds: bounds.translated(local),
                });
                chunk.props.push(prop);
            }
            None => log::warn!("Perk prop {:?} has no geometry, dropped", prop.object.id),
        }
    }
}
