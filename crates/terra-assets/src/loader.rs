//! The texture loading seam and its image-file implementation.

use std::future::Future;

use crate::{AssetError, TextureRequest, TextureResource};

/// Asynchronously produces one decoded texture per request.
pub trait TextureLoader {
    fn load(
        &self,
        request: &TextureRequest,
    ) -> impl Future<Output = Result<TextureResource, AssetError>>;
}

/// Reads PNG/JPEG files from disk and decodes them to RGBA8 with the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFileLoader;

impl TextureLoader for ImageFileLoader {
    async fn load(&self, request: &TextureRequest) -> Result<TextureResource, AssetError> {
        let bytes = std::fs::read(&request.path).map_err(|source| AssetError::Io {
            path: request.path.clone(),
            source,
        })?;

        let image = image::load_from_memory(&bytes)
            .map_err(|source| AssetError::Decode {
                path: request.path.clone(),
                source,
            })?
            .to_rgba8();

        let (width, height) = image.dimensions();
        Ok(
            TextureResource::from_rgba8(request.label(), width, height, image.into_raw())?
                .with_color_space(request.color_space)
                .with_mapping(request.mapping),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColorSpace, TextureMapping};

    fn write_png(dir: &std::path::Path, name: &str) -> std::path::PathBuf {
        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, image::Rgba([0, 0, 255, 128]));
        let path = dir.join(name);
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_loads_png_as_rgba8() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "Clouds.png");

        let request = TextureRequest::new(&path).srgb();
        let tex = pollster::block_on(ImageFileLoader.load(&request)).unwrap();
        assert_eq!(tex.label, "Clouds.png");
        assert_eq!((tex.width, tex.height), (2, 1));
        assert_eq!(tex.texel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(tex.texel(1, 0), Some([0, 0, 255, 128]));
        assert_eq!(tex.color_space, ColorSpace::Srgb);
        assert_eq!(tex.mapping, TextureMapping::Uv);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let request = TextureRequest::new(dir.path().join("missing.png"));
        let err = pollster::block_on(ImageFileLoader.load(&request)).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn test_garbage_bytes_are_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not an image").unwrap();
        let err = pollster::block_on(ImageFileLoader.load(&TextureRequest::new(path))).unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }
}
