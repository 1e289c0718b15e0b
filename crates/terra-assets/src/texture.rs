//! CPU-side texture resources and load requests.

use std::path::PathBuf;

use crate::AssetError;

/// How texel values should be interpreted when uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorSpace {
    /// Color data stored with the sRGB transfer curve (albedo).
    Srgb,
    /// Raw data (height, roughness, masks).
    #[default]
    Linear,
}

/// How a texture is projected when sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureMapping {
    /// Sampled with mesh UVs.
    #[default]
    Uv,
    /// Sampled by view direction as an equirectangular panorama.
    Equirectangular,
}

/// A request to load one texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureRequest {
    pub path: PathBuf,
    pub color_space: ColorSpace,
    pub mapping: TextureMapping,
}

impl TextureRequest {
    /// A linear, UV-mapped texture at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            color_space: ColorSpace::Linear,
            mapping: TextureMapping::Uv,
        }
    }

    pub fn srgb(mut self) -> Self {
        self.color_space = ColorSpace::Srgb;
        self
    }

    pub fn equirectangular(mut self) -> Self {
        self.mapping = TextureMapping::Equirectangular;
        self
    }

    /// Label derived from the file name, used as the GPU cache key.
    pub fn label(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Decoded RGBA8 pixels plus the sampling metadata attached at load time.
///
/// Shared read-only after load.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureResource {
    pub label: String,
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 rows, top row first.
    pub pixels: Vec<u8>,
    pub color_space: ColorSpace,
    pub mapping: TextureMapping,
}

impl TextureResource {
    /// Wrap RGBA8 pixel data, validating dimensions and length.
    pub fn from_rgba8(
        label: impl Into<String>,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Result<Self, AssetError> {
        let label = label.into();
        if width == 0 || height == 0 {
            return Err(AssetError::InvalidTexture {
                label,
                reason: format!("dimensions must be non-zero, got {width}x{height}"),
            });
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(AssetError::InvalidTexture {
                label,
                reason: format!("expected {expected} bytes, got {}", pixels.len()),
            });
        }
        Ok(Self {
            label,
            width,
            height,
            pixels,
            color_space: ColorSpace::Linear,
            mapping: TextureMapping::Uv,
        })
    }

    /// A 1x1 texture of a single color.
    pub fn solid(label: impl Into<String>, rgba: [u8; 4]) -> Self {
        Self {
            label: label.into(),
            width: 1,
            height: 1,
            pixels: rgba.to_vec(),
            color_space: ColorSpace::Linear,
            mapping: TextureMapping::Uv,
        }
    }

    pub fn with_color_space(mut self, color_space: ColorSpace) -> Self {
        self.color_space = color_space;
        self
    }

    pub fn with_mapping(mut self, mapping: TextureMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// RGBA value of the texel at `(x, y)`.
    pub fn texel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.pixels[offset..offset + 4];
        Some([px[0], px[1], px[2], px[3]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba8_rejects_zero_dimensions() {
        let err = TextureResource::from_rgba8("empty", 0, 4, Vec::new()).unwrap_err();
        assert!(matches!(err, AssetError::InvalidTexture { .. }));
    }

    #[test]
    fn test_from_rgba8_rejects_wrong_length() {
        let err = TextureResource::from_rgba8("short", 2, 2, vec![0; 15]).unwrap_err();
        assert!(err.to_string().contains("expected 16 bytes"));
    }

    #[test]
    fn test_texel_lookup() {
        let pixels = vec![
            1, 2, 3, 4, //
            5, 6, 7, 8,
        ];
        let tex = TextureResource::from_rgba8("row", 2, 1, pixels).unwrap();
        assert_eq!(tex.texel(1, 0), Some([5, 6, 7, 8]));
        assert_eq!(tex.texel(2, 0), None);
    }

    #[test]
    fn test_request_builders_and_label() {
        let req = TextureRequest::new("assets/maps/Albedo.jpg").srgb();
        assert_eq!(req.color_space, ColorSpace::Srgb);
        assert_eq!(req.mapping, TextureMapping::Uv);
        assert_eq!(req.label(), "Albedo.jpg");

        let env = TextureRequest::new("sky.png").equirectangular();
        assert_eq!(env.mapping, TextureMapping::Equirectangular);
        assert_eq!(env.color_space, ColorSpace::Linear);
    }
}
