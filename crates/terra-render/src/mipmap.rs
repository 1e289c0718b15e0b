//! Mip chain generation for uploaded textures.
//!
//! Each level is rendered from the one above it with a fullscreen triangle
//! and a bilinear sample, so a level halves the texel count of its parent.

use std::collections::HashMap;

const DOWNSAMPLE_WGSL: &str = r#"
@group(0) @binding(0) var level_above: texture_2d<f32>;
@group(0) @binding(1) var bilinear: sampler;

struct Fullscreen {
    @builtin(position) clip: vec4<f32>,
    @location(0) texcoord: vec2<f32>,
};

@vertex
fn vs_fullscreen(@builtin(vertex_index) index: u32) -> Fullscreen {
    var corners = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    let corner = corners[index];
    var out: Fullscreen;
    out.clip = vec4<f32>(corner, 0.0, 1.0);
    out.texcoord = vec2<f32>(0.5 + 0.5 * corner.x, 0.5 - 0.5 * corner.y);
    return out;
}

@fragment
fn fs_downsample(in: Fullscreen) -> @location(0) vec4<f32> {
    return textureSampleLevel(level_above, bilinear, in.texcoord, 0.0);
}
"#;

/// Downsampling pipelines, one per target format.
pub(crate) struct MipChain {
    module: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<wgpu::TextureFormat, wgpu::RenderPipeline>,
}

impl MipChain {
    /// `source_layout` binds the level above as texture 0 and sampler 1.
    pub(crate) fn new(device: &wgpu::Device, source_layout: &wgpu::BindGroupLayout) -> Self {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mip-downsample"),
            source: wgpu::ShaderSource::Wgsl(DOWNSAMPLE_WGSL.into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mip-downsample-layout"),
            bind_group_layouts: &[source_layout],
            immediate_size: 0,
        });
        Self {
            module,
            pipeline_layout,
            pipelines: HashMap::new(),
        }
    }

    fn pipeline(
        &mut self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> &wgpu::RenderPipeline {
        let module = &self.module;
        let layout = &self.pipeline_layout;
        self.pipelines.entry(format).or_insert_with(|| {
            log::debug!("Creating mip downsample pipeline for {format:?}");
            let targets = [Some(wgpu::ColorTargetState::from(format))];
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("mip-downsample"),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module,
                    entry_point: Some("vs_fullscreen"),
                    buffers: &[],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module,
                    entry_point: Some("fs_downsample"),
                    targets: &targets,
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        })
    }

    /// Fill levels `1..` of `texture` from level 0 and submit the work.
    pub(crate) fn generate(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &wgpu::Texture,
        source_layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
    ) {
        let levels = texture.mip_level_count();
        if levels < 2 {
            return;
        }
        let pipeline = self.pipeline(device, texture.format());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("mip-chain"),
        });

        let mut above = level_view(texture, 0);
        for level in 1..levels {
            let target = level_view(texture, level);
            let source = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("mip-source"),
                layout: source_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&above),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
            });
            {
                let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("mip-level"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &target,
                        resolve_target: None,
                        depth_slice: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    ..Default::default()
                });
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &source, &[]);
                pass.draw(0..3, 0..1);
            }
            above = target;
        }

        queue.submit([encoder.finish()]);
    }
}

fn level_view(texture: &wgpu::Texture, level: u32) -> wgpu::TextureView {
    texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some("mip-level-view"),
        base_mip_level: level,
        mip_level_count: Some(1),
        ..Default::default()
    })
}
