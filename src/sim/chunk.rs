//! World chunks and their contents

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::scene::{ObjectId, Prop, RenderSurface};
use super::state::PerkKind;

/// Integer chunk address on the XZ plane
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing a world position
    pub fn containing(position: Vec3, chunk_size: f32) -> Self {
        Self {
            x: crate::chunk_index(position.x, chunk_size),
            z: crate::chunk_index(position.z, chunk_size),
        }
    }

    /// World position of the chunk's center (its fixed offset)
    pub fn origin(&self, chunk_size: f32) -> Vec3 {
        Vec3::new(
            crate::chunk_center(self.x, chunk_size),
            0.0,
            crate::chunk_center(self.z, chunk_size),
        )
    }

    #[inline]
    pub fn offset(&self, dx: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }

    /// Chebyshev distance along each axis
    #[inline]
    pub fn axis_distance(&self, other: ChunkCoord) -> (u32, u32) {
        (self.x.abs_diff(other.x), self.z.abs_diff(other.z))
    }
}

/// Something the player must not run into
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub object: ObjectId,
    /// Chunk-relative bounds; None when the prop reported no usable volume
    pub local_bounds: Option<Aabb>,
    /// Passable only while airborne
    pub requires_jump: bool,
}

/// A collectible waiting in a chunk
#[derive(Debug, Clone, PartialEq)]
pub struct Perk {
    pub object: ObjectId,
    pub kind: PerkKind,
    /// Chunk-relative bounds
    pub local_bounds: Aabb,
}

/// A materialized tile of the world
#[derive(Debug)]
pub struct Chunk {
    pub coord: ChunkCoord,
    /// World offset applied to every chunk-relative volume
    pub origin: Vec3,
    pub obstacles: Vec<Obstacle>,
    pub perks: Vec<Perk>,
    /// Every renderable in the chunk, each with its update/dispose hooks
    pub props: Vec<Prop>,
}

impl Chunk {
    pub fn new(coord: ChunkCoord, chunk_size: f32) -> Self {
        Self {
            coord,
            origin: coord.origin(chunk_size),
            obstacles: Vec::new(),
            perks: Vec::new(),
            props: Vec::new(),
        }
    }

    /// Obstacle volume in world space (None when unusable)
    pub fn obstacle_bounds(&self, obstacle: &Obstacle) -> Option<Aabb> {
        obstacle
            .local_bounds
            .filter(Aabb::is_valid)
            .map(|b| b.translated(self.origin))
    }

    pub fn perk_bounds(&self, perk: &Perk) -> Aabb {
        perk.local_bounds.translated(self.origin)
    }

    /// Hand every prop to the render surface
    pub fn show(&self, surface: &mut dyn RenderSurface) {
        for prop in &self.props {
            surface.add(&prop.object);
        }
    }

    /// Run per-frame hooks; only props that changed are refreshed
    pub fn animate(&mut self, delta: f32, time: f32, surface: &mut dyn RenderSurface) {
        for prop in &mut self.props {
            if prop.hooks.update(&mut prop.object, delta, time) {
                surface.refresh(&prop.object);
            }
        }
    }

    /// Take a collected perk (and its prop) out of the world
    pub fn take_perk(&mut self, index: usize, surface: &mut dyn RenderSurface) -> Option<Perk> {
        if index >= self.perks.len() {
            return None;
        }
        let perk = self.perks.remove(index);
        if let Some(pos) = self.props.iter().position(|p| p.object.id == perk.object) {
            let mut prop = self.props.remove(pos);
            prop.hooks.dispose(&mut prop.object);
            surface.remove(perk.object);
        }
        Some(perk)
    }

    /// Dispose every prop and remove it from the surface
    pub fn teardown(mut self, surface: &mut dyn RenderSurface) {
        for mut prop in self.props.drain(..) {
            prop.hooks.dispose(&mut prop.object);
            surface.remove(prop.object.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::InstanceBuffer;
    use crate::sim::scene::{Animated, PropKind, SceneObject};
    use crate::sim::state::PerkKind;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountDispose(Rc<Cell<u32>>);

    impl Animated for CountDispose {
        fn update(&mut self, _object: &mut SceneObject, _delta: f32, _time: f32) -> bool {
            false
        }

        fn dispose(&mut self, _object: &mut SceneObject) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn counted(id: u32, kind: PropKind, disposed: &Rc<Cell<u32>>) -> Prop {
        let object = SceneObject {
            id: ObjectId(id),
            kind,
            position: Vec3::ZERO,
            meshes: Vec::new(),
        };
        Prop::new(object, Box::new(CountDispose(disposed.clone())))
    }

    #[test]
    fn test_take_perk_disposes_only_its_prop() {
        let disposed = Rc::new(Cell::new(0));
        let mut surface = InstanceBuffer::new();
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0), 50.0);
        chunk.props.push(counted(1, PropKind::Rock, &disposed));
        chunk.props.push(counted(2, PropKind::Perk(PerkKind::SlowTime), &disposed));
        chunk.perks.push(Perk {
            object: ObjectId(2),
            kind: PerkKind::SlowTime,
            local_bounds: Aabb::new(Vec3::ZERO, Vec3::ONE),
        });
        chunk.show(&mut surface);
        assert_eq!(surface.object_count(), 2);

        let taken = chunk.take_perk(0, &mut surface);
        assert_eq!(taken.map(|p| p.kind), Some(PerkKind::SlowTime));
        assert_eq!(disposed.get(), 1);
        assert!(!surface.contains(ObjectId(2)));
        assert!(surface.contains(ObjectId(1)));
        assert!(chunk.take_perk(0, &mut surface).is_none());

        chunk.teardown(&mut surface);
        assert_eq!(disposed.get(), 2);
        assert_eq!(surface.object_count(), 0);
    }

    #[test]
    fn test_coord_from_position_rounds() {
        assert_eq!(ChunkCoord::containing(Vec3::new(0.0, 5.0, -10.0), 50.0), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::containing(Vec3::new(20.0, 5.0, 25.0), 50.0), ChunkCoord::new(0, 1));
        assert_eq!(ChunkCoord::containing(Vec3::new(-26.0, 0.0, 74.0), 50.0), ChunkCoord::new(-1, 1));
        assert_eq!(ChunkCoord::containing(Vec3::new(0.0, 0.0, 75.0), 50.0), ChunkCoord::new(0, 2));
    }

    #[test]
    fn test_obstacle_bounds_skip_degenerate() {
        let chunk = Chunk::new(ChunkCoord::new(1, 2), 50.0);
        let good = Obstacle {
            object: ObjectId(1),
            local_bounds: Some(Aabb::new(Vec3::ZERO, Vec3::ONE)),
            requires_jump: false,
        };
        let missing = Obstacle {
            local_bounds: None,
            ..good.clone()
        };
        let inverted = Obstacle {
            local_bounds: Some(Aabb::new(Vec3::ONE, Vec3::ZERO)),
            ..good.clone()
        };

        let world = chunk.obstacle_bounds(&good).unwrap();
        assert_eq!(world.min, Vec3::new(50.0, 0.0, 100.0));
        assert!(chunk.obstacle_bounds(&missing).is_none());
        assert!(chunk.obstacle_bounds(&inverted).is_none());
    }
}
