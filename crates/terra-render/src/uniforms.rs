//! GPU-side uniform layouts matching the material shaders.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use static_assertions::assert_eq_size;
use terra_materials::{AtmosphereMaterial, SpriteMaterial, StandardMaterial};
use terra_scene::Scene;

use crate::Camera;

/// `FrameUniforms` at group 0, binding 0.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub inv_view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub ambient: [f32; 4],
    /// Direction the sunlight travels.
    pub sun_direction: [f32; 4],
    pub sun_color: [f32; 4],
    pub exposure: [f32; 4],
}

assert_eq_size!(FrameUniforms, [u8; 336]);

impl FrameUniforms {
    pub fn new(camera: &Camera, scene: &Scene, exposure: f32) -> Self {
        let view = camera.view_matrix();
        let projection = camera.projection_matrix();
        let view_proj = projection * view;
        let ambient = scene.ambient.color * scene.ambient.intensity;
        let (sun_direction, sun_color) = match scene.sun {
            Some(sun) => (-sun.direction(), sun.color * sun.intensity),
            None => (Vec3::NEG_Y, Vec3::ZERO),
        };

        Self {
            view_proj: view_proj.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
            camera_position: camera.position.extend(1.0).to_array(),
            ambient: ambient.extend(1.0).to_array(),
            sun_direction: sun_direction.extend(0.0).to_array(),
            sun_color: sun_color.extend(1.0).to_array(),
            exposure: [exposure, 0.0, 0.0, 0.0],
        }
    }
}

/// Model and normal matrices shared by mesh shaders.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
}

assert_eq_size!(ObjectUniforms, [u8; 128]);

impl ObjectUniforms {
    pub fn new(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct StandardUniforms {
    pub color: [f32; 4],
    pub emissive: [f32; 4],
    pub roughness: f32,
    pub metalness: f32,
    pub bump_scale: f32,
    pub opacity: f32,
}

assert_eq_size!(StandardUniforms, [u8; 48]);

impl From<&StandardMaterial> for StandardUniforms {
    fn from(material: &StandardMaterial) -> Self {
        Self {
            color: material.color.to_array(),
            emissive: material.emissive.extend(1.0).to_array(),
            roughness: material.roughness,
            metalness: material.metalness,
            bump_scale: material.bump_scale,
            opacity: material.opacity,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct AtmosphereUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    /// x = opacity, y = power factor, z = multiplier.
    pub params: [f32; 4],
}

assert_eq_size!(AtmosphereUniforms, [u8; 144]);

impl AtmosphereUniforms {
    pub fn new(model: Mat4, material: &AtmosphereMaterial) -> Self {
        let object = ObjectUniforms::new(model);
        Self {
            model: object.model,
            normal_matrix: object.normal_matrix,
            params: [
                material.opacity,
                material.power_factor,
                material.multiplier,
                0.0,
            ],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SpriteUniforms {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// xy = world-space size.
    pub scale: [f32; 4],
}

assert_eq_size!(SpriteUniforms, [u8; 96]);

impl SpriteUniforms {
    pub fn new(model: Mat4, material: &SpriteMaterial, size: glam::Vec2) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: material.color.to_array(),
            scale: [size.x, size.y, 1.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_scene::{DirectionalLight, RotationGroup};

    #[test]
    fn test_frame_uniforms_light_terms() {
        let mut scene = Scene::new(RotationGroup::new(0.0, 0.0));
        scene.sun = Some(DirectionalLight::sun(2.0));
        let camera = crate::create_camera(45.0, 1.0, 1000.0, Vec3::new(0.0, 0.0, 30.0));
        let frame = FrameUniforms::new(&camera, &scene, 1.5);

        assert!((frame.ambient[0] - 1.1).abs() < 1e-6);
        assert_eq!(frame.sun_color[..3], [2.0, 2.0, 2.0]);
        // Sunlight travels from (-50, 0, 30) toward the origin.
        assert!(frame.sun_direction[0] > 0.0 && frame.sun_direction[2] < 0.0);
        assert_eq!(frame.exposure[0], 1.5);
        assert_eq!(frame.camera_position[..3], [0.0, 0.0, 30.0]);
    }

    #[test]
    fn test_no_sun_means_no_direct_light() {
        let scene = Scene::new(RotationGroup::new(0.0, 0.0));
        let frame = FrameUniforms::new(&crate::Camera::default(), &scene, 1.0);
        assert_eq!(frame.sun_color[..3], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_normal_matrix_for_rotation_is_rotation() {
        let model = Mat4::from_rotation_y(0.7);
        let object = ObjectUniforms::new(model);
        let normal = Mat4::from_cols_array_2d(&object.normal_matrix);
        assert!(normal.abs_diff_eq(model, 1e-5));
    }

    #[test]
    fn test_atmosphere_params_packing() {
        let material = AtmosphereMaterial::new(0.7, 4.1, 9.5);
        let uniforms = AtmosphereUniforms::new(Mat4::IDENTITY, &material);
        assert_eq!(uniforms.params, [0.7, 4.1, 9.5, 0.0]);
    }
}
