//! Materials and WGSL shader templates for the globe.
//!
//! Templates are WGSL files containing `#include <name>` lines. Each include is
//! a named insertion point: a [`ShaderHook`] registered on a material can
//! insert code next to it, replace it, or remove it before the remaining
//! includes are expanded from the chunk library. Editing a point that the
//! template does not contain is a [`ShaderError`], never a silent no-op.

mod chunks;
mod error;
mod material;
mod patch;
mod template;
mod uniforms;

pub use chunks::{Defines, chunk};
pub use error::ShaderError;
pub use material::{
    AtmosphereMaterial, BlendMode, CompiledShader, Material, RenderState, Side, SpriteMaterial,
    StandardMaterial,
};
pub use patch::{CLOUD_SHADOW_UNIFORM, CloudShadowPatch, ShaderBuild, ShaderHook, UV_X_OFFSET};
pub use template::ShaderSource;
pub use uniforms::{CUSTOM_UNIFORM_GROUP, UniformValue, Uniforms, WrapMode};
