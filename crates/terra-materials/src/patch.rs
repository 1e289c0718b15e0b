//! Compile-time shader hooks and the cloud-shadow patch for the globe body.

use std::fmt;
use std::sync::Arc;

use terra_assets::TextureResource;

use crate::{CUSTOM_UNIFORM_GROUP, Defines, ShaderError, ShaderSource, UniformValue, Uniforms, WrapMode};

/// Name of the custom float that shifts cloud-shadow sampling along u.
pub const UV_X_OFFSET: &str = "uv_x_offset";

/// Name of the custom texture holding cloud coverage.
pub const CLOUD_SHADOW_UNIFORM: &str = "clouds";

/// Everything a hook may change before a material's shader is finalized.
#[derive(Debug, Clone)]
pub struct ShaderBuild {
    pub source: ShaderSource,
    pub uniforms: Uniforms,
    pub defines: Defines,
}

/// Runs once each time a material compiles its shader, before chunk expansion.
pub trait ShaderHook: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn before_compile(&self, build: &mut ShaderBuild) -> Result<(), ShaderError>;
}

const CLOUD_SHADOW_FRAGMENT: &str = r#"    let cloud_cover = textureSample(t_clouds, s_clouds, vec2<f32>(in.uv.x - custom.uv_x_offset, in.uv.y)).r;
    diffuse_color = vec4<f32>(diffuse_color.rgb * max(1.0 - cloud_cover, 0.2), diffuse_color.a);"#;

// The ocean mask is bright over water, which is where the surface should be smooth.
const INVERTED_ROUGHNESS_FRAGMENT: &str = r#"    var roughness_factor = material.roughness;
    let texel_roughness = vec4<f32>(1.0) - textureSample(t_roughness, s_material, in.uv);
    roughness_factor = roughness_factor * clamp(texel_roughness.g, 0.5, 1.0);"#;

/// Adds cloud shadows to the globe body and adapts it to the ocean mask.
///
/// Edits, in order:
/// 1. declares the cloud texture and [`UV_X_OFFSET`] in the `common` block,
/// 2. darkens the albedo where clouds sampled at `(u - offset, v)` are dense,
/// 3. replaces roughness sampling with the inverted G channel clamped to `[0.5, 1]`,
/// 4. removes the emissive map contribution.
#[derive(Debug, Clone)]
pub struct CloudShadowPatch {
    clouds: Arc<TextureResource>,
}

impl CloudShadowPatch {
    pub fn new(clouds: Arc<TextureResource>) -> Self {
        Self { clouds }
    }
}

impl ShaderHook for CloudShadowPatch {
    fn name(&self) -> &str {
        "cloud-shadow"
    }

    fn before_compile(&self, build: &mut ShaderBuild) -> Result<(), ShaderError> {
        build.uniforms.insert(
            CLOUD_SHADOW_UNIFORM,
            UniformValue::Texture {
                texture: Arc::clone(&self.clouds),
                wrap_u: WrapMode::Repeat,
            },
        )?;
        build.uniforms.insert(UV_X_OFFSET, UniformValue::Float(0.0))?;

        let declarations = build.uniforms.declarations(CUSTOM_UNIFORM_GROUP);
        build.source.insert_after("common", &declarations)?;
        build.source.insert_after("map_fragment", CLOUD_SHADOW_FRAGMENT)?;
        build
            .source
            .replace("roughnessmap_fragment", INVERTED_ROUGHNESS_FRAGMENT)?;
        build.source.remove("emissivemap_fragment")?;
        Ok(())
    }
}
