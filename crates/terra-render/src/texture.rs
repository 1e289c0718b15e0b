//! GPU texture upload and caching.
//!
//! [`TextureCache`] uploads each [`TextureResource`] once, keyed by its label,
//! fills its mip chain, and hands out [`Arc<GpuTexture>`]s.

use std::collections::HashMap;
use std::sync::Arc;

use terra_assets::{ColorSpace, TextureResource};
use terra_materials::WrapMode;

use crate::mipmap::MipChain;

/// An uploaded texture plus the single-texture bind group sprites and
/// backgrounds draw with.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    /// Binding 0 is the texture, binding 1 the clamped sampler.
    pub bind_group: wgpu::BindGroup,
    pub dimensions: (u32, u32),
    pub format: wgpu::TextureFormat,
    pub mip_level_count: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("texture '{label}' has no texels ({width}x{height})")]
    Empty {
        label: String,
        width: u32,
        height: u32,
    },

    #[error("texture '{label}' carries {actual} bytes of pixel data, {expected} needed")]
    PixelBytes {
        label: String,
        actual: usize,
        expected: usize,
    },
}

/// Number of mip levels down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// GPU format for a texture's color space.
pub fn texture_format(color_space: ColorSpace) -> wgpu::TextureFormat {
    match color_space {
        ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
    }
}

fn linear_sampler(device: &wgpu::Device, label: &str, wrap_u: WrapMode) -> wgpu::Sampler {
    let address_mode_u = match wrap_u {
        WrapMode::Clamp => wgpu::AddressMode::ClampToEdge,
        WrapMode::Repeat => wgpu::AddressMode::Repeat,
    };
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Linear,
        ..Default::default()
    })
}

pub struct TextureCache {
    by_label: HashMap<String, Arc<GpuTexture>>,
    clamp: wgpu::Sampler,
    wrap_u: wgpu::Sampler,
    single_layout: wgpu::BindGroupLayout,
    mips: MipChain,
}

impl TextureCache {
    pub fn new(device: &wgpu::Device) -> Self {
        let single_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("single-texture"),
            entries: &[texture_entry(0), sampler_entry(1)],
        });
        let mips = MipChain::new(device, &single_layout);
        Self {
            by_label: HashMap::new(),
            clamp: linear_sampler(device, "linear-clamp", WrapMode::Clamp),
            wrap_u: linear_sampler(device, "linear-wrap-u", WrapMode::Repeat),
            single_layout,
            mips,
        }
    }

    /// Upload `resource` unless a texture with the same label is cached.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        resource: &TextureResource,
    ) -> Result<Arc<GpuTexture>, TextureError> {
        if let Some(cached) = self.by_label.get(&resource.label) {
            return Ok(Arc::clone(cached));
        }

        let format = texture_format(resource.color_space);
        let texel_size = check_pixels(resource, format)?;
        let (width, height) = (resource.width, resource.height);
        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let mip_levels = mip_level_count(width, height);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&resource.label),
            size: extent,
            mip_level_count: mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        queue.write_texture(
            texture.as_image_copy(),
            &resource.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * texel_size),
                rows_per_image: Some(height),
            },
            extent,
        );
        self.mips
            .generate(device, queue, &texture, &self.single_layout, &self.clamp);

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.single_bind_group(device, &resource.label, &view);
        let gpu = Arc::new(GpuTexture {
            texture,
            view,
            bind_group,
            dimensions: (width, height),
            format,
            mip_level_count: mip_levels,
        });
        self.by_label
            .insert(resource.label.clone(), Arc::clone(&gpu));
        log::info!(
            "Uploaded texture '{}' ({width}x{height}, {format:?}, {mip_levels} mips)",
            resource.label
        );
        Ok(gpu)
    }

    fn single_bind_group(
        &self,
        device: &wgpu::Device,
        label: &str,
        view: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.single_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.clamp),
                },
            ],
        })
    }

    /// 1x1 white texture bound to unused material slots.
    pub fn fallback(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Arc<GpuTexture>, TextureError> {
        self.upload(
            device,
            queue,
            &TextureResource::solid("fallback-white", [255, 255, 255, 255]),
        )
    }

    pub fn get(&self, label: &str) -> Option<Arc<GpuTexture>> {
        self.by_label.get(label).cloned()
    }

    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }

    /// Layout of [`GpuTexture::bind_group`].
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.single_layout
    }

    pub fn sampler(&self, wrap_u: WrapMode) -> &wgpu::Sampler {
        match wrap_u {
            WrapMode::Clamp => &self.clamp,
            WrapMode::Repeat => &self.wrap_u,
        }
    }
}

/// Fragment-visible filterable 2D texture binding.
pub(crate) fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

pub(crate) fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

/// Returns the texel size in bytes once the resource's pixels fit its size.
fn check_pixels(
    resource: &TextureResource,
    format: wgpu::TextureFormat,
) -> Result<u32, TextureError> {
    let (width, height) = (resource.width, resource.height);
    if width == 0 || height == 0 {
        return Err(TextureError::Empty {
            label: resource.label.clone(),
            width,
            height,
        });
    }
    let texel_size = format.block_copy_size(None).unwrap_or(4);
    let expected = width as usize * height as usize * texel_size as usize;
    if resource.pixels.len() != expected {
        return Err(TextureError::PixelBytes {
            label: resource.label.clone(),
            actual: resource.pixels.len(),
            expected,
        });
    }
    Ok(texel_size)
}

/// Headless device for GPU-backed tests, `None` without an adapter.
#[cfg(test)]
pub(crate) fn create_test_device_queue() -> Option<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter =
        pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))
            .ok()?;
    pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default())).ok()
}
