//! Billboard markers pinned to geographic locations.

use std::sync::Arc;

use glam::{Vec2, Vec4};
use terra_assets::{ColorSpace, TextureMapping, TextureResource};
use terra_coords::Location;
use terra_materials::SpriteMaterial;
use tracing::debug;

use crate::{RotationGroup, SceneNode};

/// Attaches one sprite per location to a rotation group.
///
/// Every marker shares the same texture. Placement is one-shot: markers
/// follow the group's rotation and are never moved afterwards.
#[derive(Debug, Clone)]
pub struct MarkerPlacer {
    pub texture: Arc<TextureResource>,
    /// World-space sprite size.
    pub size: Vec2,
    pub color: Vec4,
}

impl MarkerPlacer {
    /// Slightly above the body surface so markers are not clipped by it.
    pub const DEFAULT_RADIUS: f64 = 10.2;

    pub fn new(texture: Arc<TextureResource>) -> Self {
        Self {
            texture,
            size: Vec2::splat(0.4),
            color: Vec4::ONE,
        }
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    pub fn place(&self, locations: &[Location], parent: &mut RotationGroup, radius: f64) {
        for location in locations {
            let position = location.position(radius).as_vec3();
            let mut material = SpriteMaterial::new(self.texture.clone());
            material.color = self.color;
            parent.add(SceneNode::sprite(location.name, position, material, self.size));
            debug!(name = location.name, lat = location.lat, lon = location.lon, "marker placed");
        }
    }
}

/// A `size`×`size` map-pin icon: a red teardrop with a white dot, pointing down.
pub fn pin_texture(size: u32) -> TextureResource {
    let size = size.max(4);
    let s = size as f32;
    let center = Vec2::new(0.5 * s, 0.38 * s);
    let head = 0.3 * s;
    let hole = 0.12 * s;
    let tip_y = 0.95 * s;

    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let dist = p.distance(center);
            let in_tail = p.y > center.y
                && p.y < tip_y
                && (p.x - center.x).abs() < head * (tip_y - p.y) / (tip_y - center.y);
            let texel = if dist < hole {
                [255, 255, 255, 255]
            } else if dist < head || in_tail {
                [220, 40, 40, 255]
            } else {
                [0, 0, 0, 0]
            };
            pixels.extend_from_slice(&texel);
        }
    }

    TextureResource {
        label: "marker-pin".to_owned(),
        width: size,
        height: size,
        pixels,
        color_space: ColorSpace::Srgb,
        mapping: TextureMapping::Uv,
    }
}
