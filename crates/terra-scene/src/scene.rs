//! The composed scene: the rotating globe group, lights, and background.

use std::sync::Arc;

use glam::Vec3;
use terra_assets::TextureResource;
use terra_config::GlobeParams;
use terra_materials::ShaderError;
use tracing::{debug, instrument};

use crate::{ATMOSPHERE, BODY, RotationGroup, SceneObject};

/// Uniform light applied to every lit surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    /// Linear RGB.
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 1.1,
        }
    }
}

/// Light shining from `position` toward the world origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
}

impl DirectionalLight {
    pub fn sun(intensity: f32) -> Self {
        Self {
            color: Vec3::ONE,
            intensity,
            position: Vec3::new(-50.0, 0.0, 30.0),
        }
    }

    /// Unit vector pointing from the surface toward the light.
    pub fn direction(&self) -> Vec3 {
        self.position.normalize_or(Vec3::Z)
    }
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub group: RotationGroup,
    /// Equirectangular environment drawn behind everything.
    pub background: Option<Arc<TextureResource>>,
    pub ambient: AmbientLight,
    pub sun: Option<DirectionalLight>,
}

impl Scene {
    pub fn new(group: RotationGroup) -> Self {
        Self {
            group,
            background: None,
            ambient: AmbientLight::default(),
            sun: None,
        }
    }

    /// Compile every material in the group. Already-compiled materials are
    /// left untouched, so hooks never run twice.
    #[instrument(skip_all, fields(children = self.group.len()))]
    pub fn compile_materials(&mut self) -> Result<(), ShaderError> {
        for node in self.group.children_mut() {
            let compiled = match &mut node.object {
                SceneObject::Mesh { material, .. } => material.compile()?,
                SceneObject::Sprite { material, .. } => material.compile()?,
            };
            debug!(node = %node.name, shader = %compiled.label, "material ready");
        }
        Ok(())
    }

    /// Push live parameter values into the lights and materials.
    ///
    /// The rotation speed is read by the animation step each frame and is
    /// not stored here.
    pub fn apply_params(&mut self, params: &GlobeParams) {
        if let Some(sun) = self.sun.as_mut() {
            sun.intensity = params.sun_intensity;
        }
        if let Some(body) = self.group.body_material_mut() {
            body.metalness = params.metalness;
        }
        if let Some(atmosphere) = self
            .group
            .child_mut(ATMOSPHERE)
            .and_then(|node| node.material_mut())
            .and_then(|material| material.as_atmosphere_mut())
        {
            atmosphere.opacity = params.atmosphere.opacity;
            atmosphere.power_factor = params.atmosphere.power_factor;
            atmosphere.multiplier = params.atmosphere.multiplier;
        }
        debug!(sun = params.sun_intensity, metalness = params.metalness, "parameters applied");
    }

    pub fn has_body(&self) -> bool {
        self.group.child(BODY).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PlanetaryBodyComposer, SceneNode};
    use terra_assets::GlobeTextures;
    use terra_materials::{AtmosphereMaterial, Material};

    fn textures() -> GlobeTextures {
        let solid = |label: &str| Arc::new(TextureResource::solid(label, [128, 128, 128, 255]));
        GlobeTextures {
            albedo: solid("albedo"),
            bump: solid("bump"),
            clouds: solid("clouds"),
            ocean: solid("ocean"),
            night_lights: solid("night"),
            environment: solid("env"),
        }
    }

    #[test]
    fn test_sun_points_from_position() {
        let sun = DirectionalLight::sun(1.3);
        let dir = sun.direction();
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!(dir.x < 0.0 && dir.z > 0.0);
    }

    #[test]
    fn test_apply_params_updates_materials() {
        let params = GlobeParams::default();
        let group = PlanetaryBodyComposer::default().build(&textures(), &params);
        let mut scene = Scene::new(group);
        scene.sun = Some(DirectionalLight::sun(1.0));

        let mut changed = params.clone();
        changed.sun_intensity = 2.5;
        changed.metalness = 0.4;
        changed.atmosphere.multiplier = 3.0;
        scene.apply_params(&changed);

        assert_eq!(scene.sun.unwrap().intensity, 2.5);
        assert_eq!(scene.group.body_material().unwrap().metalness, 0.4);
        let atmosphere = scene
            .group
            .child(ATMOSPHERE)
            .and_then(|n| n.material())
            .and_then(|m| m.as_atmosphere())
            .unwrap();
        assert_eq!(atmosphere.multiplier, 3.0);
    }

    #[test]
    fn test_compile_materials_is_idempotent() {
        let params = GlobeParams::default();
        let mut scene = Scene::new(PlanetaryBodyComposer::default().build(&textures(), &params));
        scene.compile_materials().unwrap();
        let first = scene.group.body_material().unwrap().compiled().unwrap().clone();
        scene.compile_materials().unwrap();
        let second = scene.group.body_material().unwrap().compiled().unwrap();
        assert_eq!(&first, second);
    }

    #[test]
    fn test_compile_covers_every_child() {
        let mut group = RotationGroup::new(0.0, 0.0);
        let sphere = Arc::new(crate::sphere(1.0, 8, 8));
        group.add(SceneNode::mesh(
            "halo",
            sphere,
            Material::Atmosphere(AtmosphereMaterial::new(0.7, 4.1, 9.5)),
        ));
        let mut scene = Scene::new(group);
        scene.compile_materials().unwrap();
        assert!(scene.group.children()[0].material().unwrap().compiled().is_some());
        assert!(!scene.has_body());
    }
}
