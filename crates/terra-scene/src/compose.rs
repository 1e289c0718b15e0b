//! Layered globe construction.

use std::sync::Arc;

use terra_assets::GlobeTextures;
use terra_config::GlobeParams;
use terra_coords::Location;
use terra_materials::{AtmosphereMaterial, CloudShadowPatch, Material, StandardMaterial};
use tracing::{info, instrument};

use crate::{
    ATMOSPHERE, BODY, CLOUDS, DirectionalLight, MarkerPlacer, RotationGroup, Scene, SceneNode,
    sphere,
};

/// Builds the body, cloud and atmosphere spheres under one [`RotationGroup`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetaryBodyComposer {
    pub segments: u32,
    pub body_radius: f32,
    pub cloud_radius: f32,
    pub atmosphere_radius: f32,
    pub bump_scale: f32,
    /// Axial tilt about Z, radians.
    pub tilt: f64,
    /// Yaw applied once at construction, radians.
    pub initial_yaw: f64,
}

impl Default for PlanetaryBodyComposer {
    fn default() -> Self {
        Self {
            segments: 64,
            body_radius: 10.0,
            cloud_radius: 10.05,
            atmosphere_radius: 12.5,
            bump_scale: 0.03,
            tilt: 0.0,
            initial_yaw: -0.3,
        }
    }
}

impl PlanetaryBodyComposer {
    #[instrument(skip_all, fields(segments = self.segments))]
    pub fn build(&self, textures: &GlobeTextures, params: &GlobeParams) -> RotationGroup {
        let mut group = RotationGroup::new(self.tilt, self.initial_yaw);

        let mut body = StandardMaterial::default();
        body.map = Some(textures.albedo.clone());
        body.bump_map = Some(textures.bump.clone());
        body.bump_scale = self.bump_scale;
        body.roughness_map = Some(textures.ocean.clone());
        body.metalness_map = Some(textures.ocean.clone());
        body.metalness = params.metalness;
        body.on_before_compile(CloudShadowPatch::new(textures.clouds.clone()));
        group.add(SceneNode::mesh(
            BODY,
            Arc::new(sphere(self.body_radius, self.segments, self.segments)),
            Material::Standard(body),
        ));

        let mut clouds = StandardMaterial::default();
        clouds.alpha_map = Some(textures.clouds.clone());
        clouds.transparent = true;
        group.add(SceneNode::mesh(
            CLOUDS,
            Arc::new(sphere(self.cloud_radius, self.segments, self.segments)),
            Material::Standard(clouds),
        ));

        let atmosphere = AtmosphereMaterial::new(
            params.atmosphere.opacity,
            params.atmosphere.power_factor,
            params.atmosphere.multiplier,
        );
        group.add(SceneNode::mesh(
            ATMOSPHERE,
            Arc::new(sphere(self.atmosphere_radius, self.segments, self.segments)),
            Material::Atmosphere(atmosphere),
        ));

        info!(
            body = self.body_radius,
            clouds = self.cloud_radius,
            atmosphere = self.atmosphere_radius,
            "globe layers built"
        );
        group
    }
}

/// Build the complete scene from resolved textures.
///
/// Only call this once every texture has loaded; nothing here can fail.
pub fn compose_scene(
    composer: &PlanetaryBodyComposer,
    textures: &GlobeTextures,
    params: &GlobeParams,
    locations: &[Location],
    markers: &MarkerPlacer,
) -> Scene {
    let mut group = composer.build(textures, params);
    markers.place(locations, &mut group, MarkerPlacer::DEFAULT_RADIUS);

    let mut scene = Scene::new(group);
    scene.background = Some(textures.environment.clone());
    scene.sun = Some(DirectionalLight::sun(params.sun_intensity));
    scene
}
