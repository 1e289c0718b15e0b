//! Equirectangular environment drawn behind the scene.

use terra_materials::{BlendMode, Defines, RenderState, ShaderError, ShaderSource, Side, chunk};

use crate::GpuTexture;
use crate::pipeline::{PipelineDesc, create_pipeline};

const BACKGROUND_TEMPLATE: &str = r#"#include <frame>

@group(1) @binding(0) var t_environment: texture_2d<f32>;
@group(1) @binding(1) var s_environment: sampler;

const RECIPROCAL_PI: f32 = 0.3183098861837907;
const RECIPROCAL_PI2: f32 = 0.15915494309189535;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) ndc: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    let uv = vec2<f32>(f32((vertex_index << 1u) & 2u), f32(vertex_index & 2u));
    let ndc = uv * 2.0 - 1.0;
    var out: VertexOutput;
    out.clip_position = vec4<f32>(ndc, 0.0, 1.0);
    out.ndc = ndc;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    // Depth 0 is the far plane.
    let far_point = frame.inv_view_proj * vec4<f32>(in.ndc, 0.0, 1.0);
    let direction = normalize(far_point.xyz / far_point.w - frame.camera_position.xyz);
    let u = atan2(direction.z, direction.x) * RECIPROCAL_PI2 + 0.5;
    let v = 0.5 - asin(clamp(direction.y, -1.0, 1.0)) * RECIPROCAL_PI;
    return textureSampleLevel(t_environment, s_environment, vec2<f32>(u, v), 0.0);
}
"#;

/// WGSL for the background pass.
pub fn background_shader() -> Result<String, ShaderError> {
    let defines = Defines::new();
    ShaderSource::parse("background", BACKGROUND_TEMPLATE).resolve(|name| chunk(name, &defines))
}

pub struct BackgroundPass {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
}

impl BackgroundPass {
    /// `texture_layout` is the texture cache's texture + sampler layout.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        frame_layout: &wgpu::BindGroupLayout,
        texture_layout: &wgpu::BindGroupLayout,
        environment: &GpuTexture,
    ) -> Result<Self, ShaderError> {
        let source = background_shader()?;
        let pipeline = create_pipeline(
            device,
            surface_format,
            &PipelineDesc {
                label: "background",
                source: &source,
                bind_group_layouts: &[frame_layout, texture_layout],
                state: RenderState {
                    blend: BlendMode::Opaque,
                    side: Side::Double,
                    depth_write: false,
                    transparent: false,
                },
                mesh_vertices: false,
                depth_compare: None,
            },
        );

        Ok(Self {
            pipeline,
            bind_group: environment.bind_group.clone(),
        })
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, frame: &wgpu::BindGroup) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, frame, &[]);
        render_pass.set_bind_group(1, &self.bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}
