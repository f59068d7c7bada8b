//! Procedural forest props
//!
//! Low-poly trees, logs, perks and ground clutter built from primitive shapes.
//! Obstacle volumes come straight from the mesh geometry, so what the player
//! sees is what they collide with.

use glam::{EulerRot, Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use crate::sim::random::RandomSource;
use crate::sim::scene::{
    Animated, Mesh, ObjectId, Prop, PropFactory, PropKind, SceneObject, Shape, StaticProp,
};
use crate::sim::state::PerkKind;

/// Colors for props
pub mod colors {
    pub const GROUND: u32 = 0x556B2F;
    pub const BUSH: u32 = 0x6B8E23;
    pub const ROCK: u32 = 0x696969;
    pub const GRASS: u32 = 0x3F5D2B;
    pub const PERK_SKIP: u32 = 0x00FF00;
    pub const PERK_SLOW: u32 = 0x4444FF;

    /// (trunk, leaves) palettes: common green, autumn red, birch
    pub const TREE_PALETTES: [(u32, u32); 3] = [
        (0x8B4513, 0x228B22),
        (0x6E472D, 0xCD5C5C),
        (0xF5F5DC, 0x9ACD32),
    ];
}

/// Perks hover at this height above the ground
pub const PERK_HEIGHT: f32 = 1.5;

/// Leaf sway for trees; every mesh after the trunk sways around its rest pose
#[derive(Debug)]
pub struct TreeSway {
    rest: Vec<Quat>,
}

impl TreeSway {
    pub fn new(object: &SceneObject) -> Self {
        Self {
            rest: object.meshes.iter().map(|m| m.rotation).collect(),
        }
    }
}

impl Animated for TreeSway {
    fn update(&mut self, object: &mut SceneObject, _delta: f32, time: f32) -> bool {
        if self.rest.len() < 2 {
            return false;
        }
        for (i, (mesh, rest)) in object.meshes.iter_mut().zip(&self.rest).enumerate().skip(1) {
            let phase = (i - 1) as f32 * 0.5;
            let sway_y = (time * 0.8 + phase).sin() * 0.08;
            let sway_x = (time * 0.6 + phase).cos() * 0.05;
            mesh.rotation = *rest * Quat::from_euler(EulerRot::YXZ, sway_y, sway_x, 0.0);
        }
        true
    }

    fn dispose(&mut self, object: &mut SceneObject) {
        object.meshes.clear();
        self.rest.clear();
    }
}

/// Default prop factory
#[derive(Debug, Default)]
pub struct ProceduralProps;

impl ProceduralProps {
    fn object(id: ObjectId, kind: PropKind, at: Vec3, meshes: Vec<Mesh>) -> SceneObject {
        SceneObject {
            id,
            kind,
            position: at,
            meshes,
        }
    }

    fn palette(rng: &mut dyn RandomSource) -> (u32, u32) {
        let roll = rng.next_unit();
        let index = if roll < 0.6 {
            0
        } else if roll < 0.85 {
            1
        } else {
            2
        };
        colors::TREE_PALETTES[index]
    }

    /// Icosahedron resting on the ground
    fn boulder(id: ObjectId, kind: PropKind, at: Vec3, size: f32, color: u32) -> Prop {
        let mesh = Mesh::new(
            Shape::Icosahedron { radius: size },
            Vec3::new(0.0, size / 2.0, 0.0),
            color,
        );
        Prop::new(Self::object(id, kind, at, vec![mesh]), Box::new(StaticProp))
    }
}

impl PropFactory for ProceduralProps {
    fn ground(&mut self, id: ObjectId, size: f32) -> Prop {
        let plane = Mesh::new(
            Shape::Plane {
                width: size,
                depth: size,
            },
            Vec3::ZERO,
            colors::GROUND,
        );
        Prop::new(
            Self::object(id, PropKind::Ground, Vec3::ZERO, vec![plane]),
            Box::new(StaticProp),
        )
    }

    fn tree(&mut self, id: ObjectId, at: Vec3, complex: bool, rng: &mut dyn RandomSource) -> Prop {
        let (trunk_color, leaf_color) = Self::palette(rng);
        let height = rng.range(10.0, 18.0);
        let girth = if complex { 1.5 } else { 1.0 };
        let trunk_radius = girth * rng.range(0.4, 0.7);
        let leaf_radius = rng.range(0.0, 2.0) + if complex { 4.0 } else { 3.0 };

        let trunk = Mesh::new(
            Shape::Cylinder {
                radius_top: trunk_radius * 0.7,
                radius_bottom: trunk_radius,
                height,
            },
            Vec3::new(0.0, height / 2.0, 0.0),
            trunk_color,
        );
        let leaves = Mesh::new(
            Shape::Icosahedron {
                radius: leaf_radius,
            },
            Vec3::new(0.0, height, 0.0),
            leaf_color,
        );

        let mut colliders = vec![trunk.bounds()];
        let mut meshes = vec![trunk, leaves];

        if complex && rng.chance(0.5) {
            let branch = Mesh::new(
                Shape::Cylinder {
                    radius_top: 0.2,
                    radius_bottom: 0.3,
                    height: 5.0,
                },
                Vec3::new(trunk_radius, height * 0.6, 0.0),
                trunk_color,
            )
            .with_rotation(Quat::from_rotation_z(FRAC_PI_4));
            colliders.push(branch.bounds());
            meshes.push(branch);
        }

        let object = Self::object(id, PropKind::Tree, at, meshes);
        let sway = TreeSway::new(&object);
        Prop::new(object, Box::new(sway)).with_colliders(colliders)
    }

    fn log(&mut self, id: ObjectId, at: Vec3) -> Prop {
        let log = Mesh::new(
            Shape::Cylinder {
                radius_top: 0.5,
                radius_bottom: 0.5,
                height: 4.0,
            },
            Vec3::new(0.0, 0.5, 0.0),
            colors::TREE_PALETTES[0].0,
        )
        .with_rotation(Quat::from_rotation_z(FRAC_PI_2));
        let colliders = vec![log.bounds()];
        Prop::new(
            Self::object(id, PropKind::Log, at, vec![log]),
            Box::new(StaticProp),
        )
        .with_colliders(colliders)
    }

    fn perk(&mut self, id: ObjectId, at: Vec3, kind: PerkKind) -> Prop {
        let (shape, color) = match kind {
            PerkKind::CollisionSkip => (Shape::Octahedron { radius: 1.0 }, colors::PERK_SKIP),
            PerkKind::SlowTime => (
                Shape::Torus {
                    radius: 0.8,
                    tube: 0.3,
                },
                colors::PERK_SLOW,
            ),
        };
        let gem = Mesh::new(shape, Vec3::new(0.0, PERK_HEIGHT, 0.0), color);
        let colliders = vec![gem.bounds()];
        Prop::new(
            Self::object(id, PropKind::Perk(kind), at, vec![gem]),
            Box::new(StaticProp),
        )
        .with_colliders(colliders)
    }

    fn bush(&mut self, id: ObjectId, at: Vec3, rng: &mut dyn RandomSource) -> Prop {
        let size = rng.range(0.5, 2.0);
        Self::boulder(id, PropKind::Bush, at, size, colors::BUSH)
    }

    fn rock(&mut self, id: ObjectId, at: Vec3, rng: &mut dyn RandomSource) -> Prop {
        let size = rng.range(0.2, 0.7);
        Self::boulder(id, PropKind::Rock, at, size, colors::ROCK)
    }

    fn grass(&mut self, id: ObjectId, blades: u32, radius: f32, rng: &mut dyn RandomSource) -> Prop {
        let meshes = (0..blades)
            .map(|_| {
                let angle = rng.range(0.0, TAU);
                let r = rng.range(0.0, radius);
                let turn = rng.range(0.0, std::f32::consts::PI);
                let scale = rng.range(0.7, 1.5);
                Mesh::new(
                    Shape::Blade {
                        width: 0.18,
                        height: 0.8,
                    },
                    Vec3::new(angle.cos() * r, 0.0, angle.sin() * r),
                    colors::GRASS,
                )
                .with_rotation(Quat::from_rotation_y(turn))
                .with_scale(scale)
            })
            .collect();
        Prop::new(
            Self::object(id, PropKind::Grass, Vec3::ZERO, meshes),
            Box::new(StaticProp),
        )
    }
}
