//! GPU instance packing for scene objects
//!
//! The host renderer draws one instanced batch per shape. This surface keeps
//! the live scene as flat `InstanceRaw` records that can be uploaded as-is.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use std::collections::BTreeMap;

use crate::sim::scene::{Mesh, ObjectId, RenderSurface, SceneObject, Shape};

/// One mesh instance, laid out for a vertex buffer with instance step mode
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// Shape-specific parameters (radii, height, ...)
    pub params: [f32; 4],
    pub shape: u32,
    pub object: u32,
    pub _pad: [u32; 2],
}

impl InstanceRaw {
    pub fn new(object: &SceneObject, mesh: &Mesh) -> Self {
        let model = Mat4::from_translation(object.position)
            * Mat4::from_scale_rotation_translation(Vec3::splat(mesh.scale), mesh.rotation, mesh.offset);
        Self {
            model: model.to_cols_array_2d(),
            color: unpack_color(mesh.color),
            params: shape_params(&mesh.shape),
            shape: mesh.shape.id(),
            object: object.id.0,
            _pad: [0; 2],
        }
    }
}

/// 0xRRGGBB to linear-ish RGBA floats
pub fn unpack_color(rgb: u32) -> [f32; 4] {
    let r = ((rgb >> 16) & 0xFF) as f32 / 255.0;
    let g = ((rgb >> 8) & 0xFF) as f32 / 255.0;
    let b = (rgb & 0xFF) as f32 / 255.0;
    [r, g, b, 1.0]
}

fn shape_params(shape: &Shape) -> [f32; 4] {
    match *shape {
        Shape::Plane { width, depth } => [width, depth, 0.0, 0.0],
        Shape::Cylinder {
            radius_top,
            radius_bottom,
            height,
        } => [radius_top, radius_bottom, height, 0.0],
        Shape::Icosahedron { radius } | Shape::Octahedron { radius } => [radius, 0.0, 0.0, 0.0],
        Shape::Torus { radius, tube } => [radius, tube, 0.0, 0.0],
        Shape::Blade { width, height } => [width, height, 0.0, 0.0],
    }
}

/// Render surface that mirrors the live scene as instance records
#[derive(Debug, Default)]
pub struct InstanceBuffer {
    objects: BTreeMap<ObjectId, Vec<InstanceRaw>>,
    dirty: bool,
}

impl InstanceBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn instance_count(&self) -> usize {
        self.objects.values().map(Vec::len).sum()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Instances for one object, if it is live
    pub fn instances_of(&self, id: ObjectId) -> Option<&[InstanceRaw]> {
        self.objects.get(&id).map(Vec::as_slice)
    }

    /// All live instances in object-id order
    pub fn pack(&self) -> Vec<InstanceRaw> {
        self.objects.values().flatten().copied().collect()
    }

    /// Raw bytes ready for a buffer upload; clears the dirty flag
    pub fn take_upload(&mut self) -> Option<Vec<u8>> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        let packed = self.pack();
        Some(bytemuck::cast_slice(&packed).to_vec())
    }

    fn record(&mut self, object: &SceneObject) {
        let instances = object
            .meshes
            .iter()
            .map(|mesh| InstanceRaw::new(object, mesh))
            .collect();
        self.objects.insert(object.id, instances);
        self.dirty = true;
    }
}

impl RenderSurface for InstanceBuffer {
    fn add(&mut self, object: &SceneObject) {
        self.record(object);
    }

    fn remove(&mut self, id: ObjectId) {
        if self.objects.remove(&id).is_some() {
            self.dirty = true;
        }
    }

    fn refresh(&mut self, object: &SceneObject) {
        // Only live objects; a refresh never resurrects a removed one
        if self.objects.contains_key(&object.id) {
            self.record(object);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::scene::PropKind;

    fn rock(id: u32, at: Vec3) -> SceneObject {
        SceneObject {
            id: ObjectId(id),
            kind: PropKind::Rock,
            position: at,
            meshes: vec![Mesh::new(
                Shape::Icosahedron { radius: 0.5 },
                Vec3::new(0.0, 0.25, 0.0),
                0x696969,
            )],
        }
    }

    #[test]
    fn test_instance_layout_is_aligned() {
        assert_eq!(std::mem::size_of::<InstanceRaw>() % 16, 0);
    }

    #[test]
    fn test_add_remove_tracks_live_objects() {
        let mut buffer = InstanceBuffer::new();
        buffer.add(&rock(1, Vec3::ZERO));
        buffer.add(&rock(2, Vec3::new(50.0, 0.0, 0.0)));
        assert_eq!(buffer.object_count(), 2);
        assert_eq!(buffer.instance_count(), 2);

        buffer.remove(ObjectId(1));
        assert!(!buffer.contains(ObjectId(1)));
        assert_eq!(buffer.pack().len(), 1);
    }

    #[test]
    fn test_model_matrix_includes_object_and_mesh_offset() {
        let mut buffer = InstanceBuffer::new();
        buffer.add(&rock(7, Vec3::new(10.0, 0.0, 100.0)));
        let inst = buffer.instances_of(ObjectId(7)).unwrap()[0];
        let translation = inst.model[3];
        assert_eq!(&translation[..3], &[10.0, 0.25, 100.0]);
        assert_eq!(inst.shape, 2);
        assert_eq!(inst.object, 7);
    }

    #[test]
    fn test_upload_only_when_dirty() {
        let mut buffer = InstanceBuffer::new();
        assert!(buffer.take_upload().is_none());
        buffer.add(&rock(1, Vec3::ZERO));
        let bytes = buffer.take_upload().unwrap();
        assert_eq!(bytes.len(), std::mem::size_of::<InstanceRaw>());
        assert!(buffer.take_upload().is_none());
    }

    #[test]
    fn test_refresh_ignores_removed_objects() {
        let mut buffer = InstanceBuffer::new();
        let obj = rock(3, Vec3::ZERO);
        buffer.refresh(&obj);
        assert!(!buffer.contains(ObjectId(3)));
    }

    #[test]
    fn test_unpack_color() {
        assert_eq!(unpack_color(0xFF0000), [1.0, 0.0, 0.0, 1.0]);
    }
}
