//! The rotating node that owns every part of the globe.

use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3};
use terra_materials::{Material, SpriteMaterial, StandardMaterial};

use crate::MeshData;

/// Child name of the opaque body sphere.
pub const BODY: &str = "body";
/// Child name of the cloud shell.
pub const CLOUDS: &str = "clouds";
/// Child name of the atmosphere shell.
pub const ATMOSPHERE: &str = "atmosphere";

/// Renderable content of a node.
#[derive(Debug, Clone)]
pub enum SceneObject {
    Mesh {
        geometry: Arc<MeshData>,
        material: Material,
    },
    /// Camera-facing quad of `size` world units.
    Sprite { material: SpriteMaterial, size: Vec2 },
}

/// A child of the rotation group, positioned in the group's local frame.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub position: Vec3,
    pub object: SceneObject,
}

impl SceneNode {
    pub fn mesh(name: impl Into<String>, geometry: Arc<MeshData>, material: Material) -> Self {
        Self {
            name: name.into(),
            position: Vec3::ZERO,
            object: SceneObject::Mesh { geometry, material },
        }
    }

    pub fn sprite(
        name: impl Into<String>,
        position: Vec3,
        material: SpriteMaterial,
        size: Vec2,
    ) -> Self {
        Self {
            name: name.into(),
            position,
            object: SceneObject::Sprite { material, size },
        }
    }

    pub fn material(&self) -> Option<&Material> {
        match &self.object {
            SceneObject::Mesh { material, .. } => Some(material),
            SceneObject::Sprite { .. } => None,
        }
    }

    pub fn material_mut(&mut self) -> Option<&mut Material> {
        match &mut self.object {
            SceneObject::Mesh { material, .. } => Some(material),
            SceneObject::Sprite { .. } => None,
        }
    }
}

/// Scene node with a fixed tilt, a fixed initial yaw, and an accumulated spin.
///
/// The spin is only ever advanced by adding to it and is never wrapped.
/// Children inherit the group's transform.
#[derive(Debug, Clone)]
pub struct RotationGroup {
    tilt: f64,
    initial_yaw: f64,
    spin: f64,
    children: Vec<SceneNode>,
}

impl RotationGroup {
    /// `tilt` rotates the spin axis about Z, `initial_yaw` is the starting
    /// angle about that axis. Both in radians.
    pub fn new(tilt: f64, initial_yaw: f64) -> Self {
        Self {
            tilt,
            initial_yaw,
            spin: 0.0,
            children: Vec::new(),
        }
    }

    pub fn tilt(&self) -> f64 {
        self.tilt
    }

    pub fn initial_yaw(&self) -> f64 {
        self.initial_yaw
    }

    /// Rotation accumulated since construction.
    pub fn spin(&self) -> f64 {
        self.spin
    }

    /// Current angle about the spin axis.
    pub fn yaw(&self) -> f64 {
        self.initial_yaw + self.spin
    }

    pub fn rotate_yaw(&mut self, delta: f64) {
        self.spin += delta;
    }

    /// Local-to-world transform: tilt applied after the yaw.
    pub fn matrix(&self) -> Mat4 {
        let yaw = self.yaw().rem_euclid(std::f64::consts::TAU) as f32;
        Mat4::from_rotation_z(self.tilt as f32) * Mat4::from_rotation_y(yaw)
    }

    /// World transform of a child.
    pub fn world_matrix(&self, child: &SceneNode) -> Mat4 {
        self.matrix() * Mat4::from_translation(child.position)
    }

    pub fn add(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [SceneNode] {
        &mut self.children
    }

    pub fn child(&self, name: &str) -> Option<&SceneNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// The body's material, if the group has a standard-material body.
    pub fn body_material(&self) -> Option<&StandardMaterial> {
        self.child(BODY)?.material()?.as_standard()
    }

    pub fn body_material_mut(&mut self) -> Option<&mut StandardMaterial> {
        self.child_mut(BODY)?.material_mut()?.as_standard_mut()
    }

    /// Sprite children in insertion order.
    pub fn sprites(&self) -> impl Iterator<Item = &SceneNode> {
        self.children
            .iter()
            .filter(|c| matches!(c.object, SceneObject::Sprite { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_assets::TextureResource;

    fn marker(name: &str, position: Vec3) -> SceneNode {
        let pin = Arc::new(TextureResource::solid("pin", [255; 4]));
        SceneNode::sprite(name, position, SpriteMaterial::new(pin), Vec2::splat(0.4))
    }

    #[test]
    fn test_yaw_accumulates_without_wrapping() {
        let mut group = RotationGroup::new(0.0, -0.3);
        for _ in 0..10 {
            group.rotate_yaw(1.0);
        }
        assert_eq!(group.spin(), 10.0);
        assert_eq!(group.yaw(), -0.3 + 10.0);
    }

    #[test]
    fn test_children_follow_group_rotation() {
        let mut group = RotationGroup::new(0.0, 0.0);
        group.add(marker("east", Vec3::new(1.0, 0.0, 0.0)));
        group.rotate_yaw(std::f64::consts::FRAC_PI_2);

        let child = &group.children()[0];
        let world = group.world_matrix(child).transform_point3(Vec3::ZERO);
        // +X rotated a quarter turn about +Y lands on -Z.
        assert!((world - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_tilt_rotates_spin_axis() {
        let tilt = 23.5_f64.to_radians();
        let group = RotationGroup::new(tilt, 0.0);
        let pole = group.matrix().transform_point3(Vec3::Y);
        assert!((pole.x + (tilt as f32).sin()).abs() < 1e-5);
        assert!((pole.y - (tilt as f32).cos()).abs() < 1e-5);
    }

    #[test]
    fn test_large_spin_matrix_stays_accurate() {
        let mut small = RotationGroup::new(0.0, 0.0);
        small.rotate_yaw(0.25);
        let mut large = RotationGroup::new(0.0, 0.0);
        large.rotate_yaw(0.25 + std::f64::consts::TAU * 1.0e4);
        let a = small.matrix().transform_point3(Vec3::X);
        let b = large.matrix().transform_point3(Vec3::X);
        assert!((a - b).length() < 1e-4);
    }

    #[test]
    fn test_child_lookup() {
        let mut group = RotationGroup::new(0.0, 0.0);
        group.add(marker("a", Vec3::X));
        group.add(marker("b", Vec3::Y));
        assert_eq!(group.len(), 2);
        assert_eq!(group.child("b").unwrap().position, Vec3::Y);
        assert!(group.child("c").is_none());
        assert!(group.body_material().is_none());
        assert_eq!(group.sprites().count(), 2);
    }
}
