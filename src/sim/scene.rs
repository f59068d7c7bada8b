//! Render contract between the gameplay core and presentation
//!
//! The core never touches a rendering back end. It hands `SceneObject`s to a
//! `RenderSurface` when chunks materialize and takes them back when chunks
//! are evicted or perks are collected. Props are built by a `PropFactory`,
//! which also reports each prop's collision volumes from its local geometry.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

use super::aabb::Aabb;
use super::random::RandomSource;
use super::state::PerkKind;

/// Stable handle for an object handed to the render surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

/// What a scene object depicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropKind {
    Ground,
    Tree,
    Log,
    Perk(PerkKind),
    Bush,
    Rock,
    Grass,
}

/// Primitive geometry, centered on its local origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Flat quad in the XZ plane
    Plane { width: f32, depth: f32 },
    /// Upright cylinder (or cone frustum) along Y
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
    },
    Icosahedron { radius: f32 },
    Octahedron { radius: f32 },
    /// Ring in the XY plane
    Torus { radius: f32, tube: f32 },
    /// Single grass blade, base at the origin
    Blade { width: f32, height: f32 },
}

impl Shape {
    /// Local-space bounds of the untransformed geometry
    pub fn local_bounds(&self) -> Aabb {
        match *self {
            Shape::Plane { width, depth } => {
                Aabb::from_center_size(Vec3::ZERO, Vec3::new(width, 0.0, depth))
            }
            Shape::Cylinder {
                radius_top,
                radius_bottom,
                height,
            } => {
                let r = radius_top.max(radius_bottom);
                Aabb::from_center_size(Vec3::ZERO, Vec3::new(r * 2.0, height, r * 2.0))
            }
            Shape::Icosahedron { radius } | Shape::Octahedron { radius } => {
                Aabb::from_center_size(Vec3::ZERO, Vec3::splat(radius * 2.0))
            }
            Shape::Torus { radius, tube } => {
                let outer = radius + tube;
                Aabb::from_center_size(Vec3::ZERO, Vec3::new(outer * 2.0, outer * 2.0, tube * 2.0))
            }
            Shape::Blade { width, height } => Aabb::new(
                Vec3::new(-width / 2.0, 0.0, 0.0),
                Vec3::new(width / 2.0, height, 0.0),
            ),
        }
    }

    /// Numeric tag shared with the instance buffer
    pub fn id(&self) -> u32 {
        match self {
            Shape::Plane { .. } => 0,
            Shape::Cylinder { .. } => 1,
            Shape::Icosahedron { .. } => 2,
            Shape::Octahedron { .. } => 3,
            Shape::Torus { .. } => 4,
            Shape::Blade { .. } => 5,
        }
    }
}

/// One piece of geometry placed within a scene object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub shape: Shape,
    /// Offset from the owning object's position
    pub offset: Vec3,
    pub rotation: Quat,
    pub scale: f32,
    /// 0xRRGGBB
    pub color: u32,
}

impl Mesh {
    pub fn new(shape: Shape, offset: Vec3, color: u32) -> Self {
        Self {
            shape,
            offset,
            rotation: Quat::IDENTITY,
            scale: 1.0,
            color,
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Bounds in the owning object's frame
    pub fn bounds(&self) -> Aabb {
        let local = self.shape.local_bounds();
        let scaled = Aabb::new(local.min * self.scale, local.max * self.scale);
        scaled.rotated(self.rotation).translated(self.offset)
    }
}

/// A renderable object handed to the render surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: ObjectId,
    pub kind: PropKind,
    /// World position once the owning chunk is materialized
    pub position: Vec3,
    pub meshes: Vec<Mesh>,
}

/// Per-frame update and teardown hooks every prop carries
pub trait Animated {
    /// Returns true when the object changed and needs redrawing
    fn update(&mut self, object: &mut SceneObject, delta: f32, time: f32) -> bool;
    /// Release whatever the prop holds; called exactly once when it leaves the world
    fn dispose(&mut self, object: &mut SceneObject);
}

/// Hooks for props with nothing to animate
#[derive(Debug, Default)]
pub struct StaticProp;

impl Animated for StaticProp {
    fn update(&mut self, _object: &mut SceneObject, _delta: f32, _time: f32) -> bool {
        false
    }

    fn dispose(&mut self, object: &mut SceneObject) {
        object.meshes.clear();
    }
}

/// A built prop: its renderable, its collision volumes and its hooks
pub struct Prop {
    pub object: SceneObject,
    /// Obstacle volumes in the object's local frame (empty for decoration)
    pub colliders: Vec<Aabb>,
    pub hooks: Box<dyn Animated>,
}

impl Prop {
    pub fn new(object: SceneObject, hooks: Box<dyn Animated>) -> Self {
        Self {
            object,
            colliders: Vec::new(),
            hooks,
        }
    }

    pub fn with_colliders(mut self, colliders: Vec<Aabb>) -> Self {
        self.colliders = colliders;
        self
    }
}

impl std::fmt::Debug for Prop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prop")
            .field("object", &self.object.id)
            .field("kind", &self.object.kind)
            .field("colliders", &self.colliders)
            .finish()
    }
}

/// Builds props at a chunk-local position
///
/// Each builder draws whatever randomness it needs from `rng`.
pub trait PropFactory {
    fn ground(&mut self, id: ObjectId, size: f32) -> Prop;
    fn tree(&mut self, id: ObjectId, at: Vec3, complex: bool, rng: &mut dyn RandomSource) -> Prop;
    /// A fallen log lying across the lane; must be jumped
    fn log(&mut self, id: ObjectId, at: Vec3) -> Prop;
    fn perk(&mut self, id: ObjectId, at: Vec3, kind: PerkKind) -> Prop;
    fn bush(&mut self, id: ObjectId, at: Vec3, rng: &mut dyn RandomSource) -> Prop;
    fn rock(&mut self, id: ObjectId, at: Vec3, rng: &mut dyn RandomSource) -> Prop;
    fn grass(&mut self, id: ObjectId, blades: u32, radius: f32, rng: &mut dyn RandomSource) -> Prop;
}

/// Presentation collaborator that shows and hides scene objects
pub trait RenderSurface {
    fn add(&mut self, object: &SceneObject);
    fn remove(&mut self, id: ObjectId);
    /// Called after an object's hooks changed it this frame
    fn refresh(&mut self, _object: &SceneObject) {}
}

/// Shared surfaces: the frame loop keeps a handle to read back what the core drew
impl<T: RenderSurface> RenderSurface for Rc<RefCell<T>> {
    fn add(&mut self, object: &SceneObject) {
        self.borrow_mut().add(object);
    }

    fn remove(&mut self, id: ObjectId) {
        self.borrow_mut().remove(id);
    }

    fn refresh(&mut self, object: &SceneObject) {
        self.borrow_mut().refresh(object);
    }
}
