//! The six maps that make up the globe, in load order.

use std::path::PathBuf;
use std::sync::Arc;

use crate::{AssetError, TextureRequest, TextureResource};

/// Loaded globe textures, shared read-only by the scene.
#[derive(Debug, Clone)]
pub struct GlobeTextures {
    /// Surface color (sRGB).
    pub albedo: Arc<TextureResource>,
    /// Height perturbation.
    pub bump: Arc<TextureResource>,
    /// Cloud coverage, used as an alpha mask and for cloud shadows.
    pub clouds: Arc<TextureResource>,
    /// Land/ocean mask, used for roughness and metalness.
    pub ocean: Arc<TextureResource>,
    /// City lights. Loaded but not wired into shading.
    pub night_lights: Arc<TextureResource>,
    /// Equirectangular star field used as the background.
    pub environment: Arc<TextureResource>,
}

impl GlobeTextures {
    pub const COUNT: usize = 6;

    /// Requests for the six maps in load order: albedo, bump, clouds, ocean,
    /// night lights, environment.
    pub fn requests(paths: [PathBuf; 6]) -> Vec<TextureRequest> {
        let [albedo, bump, clouds, ocean, night_lights, environment] = paths;
        vec![
            TextureRequest::new(albedo).srgb(),
            TextureRequest::new(bump),
            TextureRequest::new(clouds),
            TextureRequest::new(ocean),
            TextureRequest::new(night_lights),
            TextureRequest::new(environment).equirectangular(),
        ]
    }

    /// Name the loaded textures. They must be in the order of [`Self::requests`].
    pub fn from_loaded(textures: Vec<TextureResource>) -> Result<Self, AssetError> {
        let actual = textures.len();
        let Ok([albedo, bump, clouds, ocean, night_lights, environment]) =
            <[TextureResource; 6]>::try_from(textures)
        else {
            return Err(AssetError::CountMismatch {
                expected: Self::COUNT,
                actual,
            });
        };
        Ok(Self {
            albedo: Arc::new(albedo),
            bump: Arc::new(bump),
            clouds: Arc::new(clouds),
            ocean: Arc::new(ocean),
            night_lights: Arc::new(night_lights),
            environment: Arc::new(environment),
        })
    }
}
