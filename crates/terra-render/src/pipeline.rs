//! Bind group layouts and render pipelines for compiled materials.

use std::num::NonZeroU64;

use terra_materials::{BlendMode, RenderState, Side, Uniforms};

use crate::DepthBuffer;
use crate::buffer::mesh_vertex_layout;
use crate::texture::{sampler_entry, texture_entry};
use crate::uniforms::{
    AtmosphereUniforms, FrameUniforms, ObjectUniforms, SpriteUniforms, StandardUniforms,
};

/// Additive blending, `src * src_alpha + dst`.
pub const ADDITIVE_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

pub fn blend_state(blend: BlendMode) -> Option<wgpu::BlendState> {
    match blend {
        BlendMode::Opaque => None,
        BlendMode::Normal => Some(wgpu::BlendState::ALPHA_BLENDING),
        BlendMode::Additive => Some(ADDITIVE_BLENDING),
    }
}

/// Faces culled for a side. Spheres are wound counter-clockwise from outside.
pub fn cull_mode(side: Side) -> Option<wgpu::Face> {
    match side {
        Side::Front => Some(wgpu::Face::Back),
        Side::Back => Some(wgpu::Face::Front),
        Side::Double => None,
    }
}

fn uniform_entry(binding: u32, size: usize) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(size as u64),
        },
        count: None,
    }
}

/// Fixed bind group layouts for the frame and each material kind.
pub struct MaterialLayouts {
    /// Group 0 for every shader.
    pub frame: wgpu::BindGroupLayout,
    pub standard: wgpu::BindGroupLayout,
    pub atmosphere: wgpu::BindGroupLayout,
    pub sprite: wgpu::BindGroupLayout,
}

impl MaterialLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let frame = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame-bind-group-layout"),
            entries: &[uniform_entry(0, size_of::<FrameUniforms>())],
        });

        let mut standard_entries = vec![
            uniform_entry(0, size_of::<ObjectUniforms>()),
            uniform_entry(1, size_of::<StandardUniforms>()),
        ];
        standard_entries.extend((2..8).map(texture_entry));
        standard_entries.push(sampler_entry(8));
        let standard = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("standard-bind-group-layout"),
            entries: &standard_entries,
        });

        let atmosphere = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("atmosphere-bind-group-layout"),
            entries: &[uniform_entry(0, size_of::<AtmosphereUniforms>())],
        });

        let sprite = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sprite-bind-group-layout"),
            entries: &[
                uniform_entry(0, size_of::<SpriteUniforms>()),
                texture_entry(1),
                sampler_entry(2),
            ],
        });

        Self {
            frame,
            standard,
            atmosphere,
            sprite,
        }
    }
}

/// Layout entries for the custom group declared by shader hooks.
pub fn custom_layout_entries(uniforms: &Uniforms) -> Vec<wgpu::BindGroupLayoutEntry> {
    let mut entries = vec![uniform_entry(0, uniforms.float_block().len() * 4)];
    for k in 0..uniforms.textures().count() as u32 {
        entries.push(texture_entry(1 + 2 * k));
        entries.push(sampler_entry(2 + 2 * k));
    }
    entries
}

/// Everything needed to build one pipeline.
pub struct PipelineDesc<'a> {
    pub label: &'a str,
    pub source: &'a str,
    pub bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    pub state: RenderState,
    /// Meshes read vertex buffers; sprites and fullscreen passes use `vertex_index`.
    pub mesh_vertices: bool,
    /// `None` disables depth testing.
    pub depth_compare: Option<wgpu::CompareFunction>,
}

pub fn create_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    desc: &PipelineDesc<'_>,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(desc.label),
        source: wgpu::ShaderSource::Wgsl(desc.source.into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{}-pipeline-layout", desc.label)),
        bind_group_layouts: desc.bind_group_layouts,
        immediate_size: 0,
    });

    let vertex_buffers = if desc.mesh_vertices {
        vec![mesh_vertex_layout()]
    } else {
        Vec::new()
    };

    let depth_stencil = wgpu::DepthStencilState {
        depth_compare: desc
            .depth_compare
            .unwrap_or(wgpu::CompareFunction::Always),
        ..DepthBuffer::stencil_state(desc.state.depth_write)
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &vertex_buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: cull_mode(desc.state.side),
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(depth_stencil),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: blend_state(desc.state.blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}
