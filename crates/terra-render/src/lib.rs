//! wgpu renderer for the globe scene: surface management, material pipelines,
//! texture uploads, and per-frame drawing.

mod background;
mod buffer;
mod camera;
mod depth;
mod gpu;
mod mipmap;
mod pass;
mod pipeline;
mod renderer;
mod texture;
mod uniforms;

pub use background::{BackgroundPass, background_shader};
pub use buffer::{MeshBuffer, mesh_vertex_layout};
pub use camera::{Camera, create_camera};
pub use depth::DepthBuffer;
pub use gpu::{
    RenderContext, RenderContextError, RendererOptions, SurfaceError,
    init_render_context_blocking,
};
pub use pass::{FrameEncoder, RenderPassBuilder};
pub use pipeline::{
    ADDITIVE_BLENDING, MaterialLayouts, PipelineDesc, blend_state, create_pipeline, cull_mode,
};
pub use renderer::{GlobeRenderer, RenderError, create_renderer};
pub use texture::{GpuTexture, TextureCache, TextureError, mip_level_count, texture_format};
pub use uniforms::{
    AtmosphereUniforms, FrameUniforms, ObjectUniforms, SpriteUniforms, StandardUniforms,
};
