//! Material types and their shader compilation.

use std::sync::Arc;

use glam::{Vec3, Vec4};
use terra_assets::TextureResource;
use tracing::{debug, info};

use crate::chunks::{
    ATMOSPHERE_TEMPLATE, SPRITE_TEMPLATE, STANDARD_TEMPLATE, USE_ALPHAMAP, USE_BUMPMAP,
    USE_EMISSIVEMAP, USE_MAP, USE_METALNESSMAP, USE_ROUGHNESSMAP,
};
use crate::{Defines, ShaderBuild, ShaderError, ShaderHook, ShaderSource, Uniforms, chunk};

// ---------------------------------------------------------------------------
// Render state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMode {
    Opaque,
    /// Standard alpha blending.
    Normal,
    /// `src * src_alpha + dst`.
    Additive,
}

/// Which faces are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Front,
    Back,
    Double,
}

/// Fixed-function state a material asks the renderer for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderState {
    pub blend: BlendMode,
    pub side: Side,
    pub depth_write: bool,
    /// Drawn after all opaque objects.
    pub transparent: bool,
}

/// Final WGSL for a material plus the custom uniforms its hooks declared.
///
/// Stored on the material after the first compile. Writing uniform values
/// through [`CompiledShader::uniforms`] never triggers a recompile.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledShader {
    pub label: String,
    pub source: String,
    pub uniforms: Uniforms,
    pub defines: Defines,
}

fn compile_template(
    template: &str,
    source: &str,
    defines: Defines,
    hook: Option<&dyn ShaderHook>,
) -> Result<CompiledShader, ShaderError> {
    let mut build = ShaderBuild {
        source: ShaderSource::parse(template, source),
        uniforms: Uniforms::new(),
        defines,
    };

    let label = match hook {
        Some(hook) => {
            hook.before_compile(&mut build)?;
            debug!(template, hook = hook.name(), "applied shader hook");
            format!("{template}+{}", hook.name())
        }
        None => template.to_string(),
    };

    let source = build.source.resolve(|name| chunk(name, &build.defines))?;
    info!(%label, bytes = source.len(), "compiled material shader");
    Ok(CompiledShader {
        label,
        source,
        uniforms: build.uniforms,
        defines: build.defines,
    })
}

// ---------------------------------------------------------------------------
// StandardMaterial
// ---------------------------------------------------------------------------

/// Metallic-roughness lit material.
#[derive(Debug, Clone)]
pub struct StandardMaterial {
    /// Linear RGBA base color, multiplied with `map`.
    pub color: Vec4,
    pub map: Option<Arc<TextureResource>>,
    pub bump_map: Option<Arc<TextureResource>>,
    pub bump_scale: f32,
    pub roughness: f32,
    /// G channel scales `roughness`.
    pub roughness_map: Option<Arc<TextureResource>>,
    pub metalness: f32,
    /// B channel scales `metalness`.
    pub metalness_map: Option<Arc<TextureResource>>,
    /// G channel scales opacity.
    pub alpha_map: Option<Arc<TextureResource>>,
    pub emissive: Vec3,
    pub emissive_map: Option<Arc<TextureResource>>,
    pub opacity: f32,
    pub transparent: bool,
    hook: Option<Arc<dyn ShaderHook>>,
    compiled: Option<CompiledShader>,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            map: None,
            bump_map: None,
            bump_scale: 1.0,
            roughness: 1.0,
            roughness_map: None,
            metalness: 0.0,
            metalness_map: None,
            alpha_map: None,
            emissive: Vec3::ZERO,
            emissive_map: None,
            opacity: 1.0,
            transparent: false,
            hook: None,
            compiled: None,
        }
    }
}

impl StandardMaterial {
    /// Register the hook that runs when the shader is compiled.
    pub fn on_before_compile(&mut self, hook: impl ShaderHook + 'static) {
        self.hook = Some(Arc::new(hook));
    }

    pub fn hook(&self) -> Option<&dyn ShaderHook> {
        self.hook.as_deref()
    }

    /// Chunk variants selected by the maps that are set.
    pub fn defines(&self) -> Defines {
        [
            (USE_MAP, self.map.is_some()),
            (USE_BUMPMAP, self.bump_map.is_some()),
            (USE_ROUGHNESSMAP, self.roughness_map.is_some()),
            (USE_METALNESSMAP, self.metalness_map.is_some()),
            (USE_ALPHAMAP, self.alpha_map.is_some()),
            (USE_EMISSIVEMAP, self.emissive_map.is_some()),
        ]
        .into_iter()
        .filter_map(|(define, used)| used.then_some(define))
        .collect()
    }

    /// Texture slots in binding order: map, bump, roughness, metalness, alpha, emissive.
    pub fn texture_slots(&self) -> [Option<&Arc<TextureResource>>; 6] {
        [
            self.map.as_ref(),
            self.bump_map.as_ref(),
            self.roughness_map.as_ref(),
            self.metalness_map.as_ref(),
            self.alpha_map.as_ref(),
            self.emissive_map.as_ref(),
        ]
    }

    /// Compile the shader on first use, running the hook exactly once.
    pub fn compile(&mut self) -> Result<&CompiledShader, ShaderError> {
        let compiled = match self.compiled.take() {
            Some(compiled) => compiled,
            None => compile_template(
                "standard",
                STANDARD_TEMPLATE,
                self.defines(),
                self.hook.as_deref(),
            )?,
        };
        Ok(self.compiled.insert(compiled))
    }

    pub fn compiled(&self) -> Option<&CompiledShader> {
        self.compiled.as_ref()
    }

    pub fn compiled_mut(&mut self) -> Option<&mut CompiledShader> {
        self.compiled.as_mut()
    }

    pub fn render_state(&self) -> RenderState {
        RenderState {
            blend: if self.transparent {
                BlendMode::Normal
            } else {
                BlendMode::Opaque
            },
            side: Side::Front,
            depth_write: true,
            transparent: self.transparent,
        }
    }
}

// ---------------------------------------------------------------------------
// AtmosphereMaterial
// ---------------------------------------------------------------------------

/// Additive halo drawn on the back faces of an oversized sphere.
#[derive(Debug, Clone)]
pub struct AtmosphereMaterial {
    pub opacity: f32,
    pub power_factor: f32,
    pub multiplier: f32,
    compiled: Option<CompiledShader>,
}

impl AtmosphereMaterial {
    pub fn new(opacity: f32, power_factor: f32, multiplier: f32) -> Self {
        Self {
            opacity,
            power_factor,
            multiplier,
            compiled: None,
        }
    }

    pub fn compile(&mut self) -> Result<&CompiledShader, ShaderError> {
        let compiled = match self.compiled.take() {
            Some(compiled) => compiled,
            None => compile_template("atmosphere", ATMOSPHERE_TEMPLATE, Defines::new(), None)?,
        };
        Ok(self.compiled.insert(compiled))
    }

    pub fn compiled(&self) -> Option<&CompiledShader> {
        self.compiled.as_ref()
    }

    pub fn render_state(&self) -> RenderState {
        RenderState {
            blend: BlendMode::Additive,
            side: Side::Back,
            depth_write: false,
            transparent: true,
        }
    }
}

// ---------------------------------------------------------------------------
// SpriteMaterial
// ---------------------------------------------------------------------------

/// Camera-facing textured quad.
#[derive(Debug, Clone)]
pub struct SpriteMaterial {
    pub map: Arc<TextureResource>,
    /// Linear RGBA tint.
    pub color: Vec4,
    compiled: Option<CompiledShader>,
}

impl SpriteMaterial {
    pub fn new(map: Arc<TextureResource>) -> Self {
        Self {
            map,
            color: Vec4::ONE,
            compiled: None,
        }
    }

    pub fn compile(&mut self) -> Result<&CompiledShader, ShaderError> {
        let compiled = match self.compiled.take() {
            Some(compiled) => compiled,
            None => compile_template("sprite", SPRITE_TEMPLATE, Defines::new(), None)?,
        };
        Ok(self.compiled.insert(compiled))
    }

    pub fn compiled(&self) -> Option<&CompiledShader> {
        self.compiled.as_ref()
    }

    pub fn render_state(&self) -> RenderState {
        RenderState {
            blend: BlendMode::Normal,
            side: Side::Double,
            depth_write: false,
            transparent: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Material
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Material {
    Standard(StandardMaterial),
    Atmosphere(AtmosphereMaterial),
    Sprite(SpriteMaterial),
}

impl Material {
    pub fn compile(&mut self) -> Result<&CompiledShader, ShaderError> {
        match self {
            Material::Standard(m) => m.compile(),
            Material::Atmosphere(m) => m.compile(),
            Material::Sprite(m) => m.compile(),
        }
    }

    pub fn compiled(&self) -> Option<&CompiledShader> {
        match self {
            Material::Standard(m) => m.compiled(),
            Material::Atmosphere(m) => m.compiled(),
            Material::Sprite(m) => m.compiled(),
        }
    }

    pub fn render_state(&self) -> RenderState {
        match self {
            Material::Standard(m) => m.render_state(),
            Material::Atmosphere(m) => m.render_state(),
            Material::Sprite(m) => m.render_state(),
        }
    }

    pub fn as_standard(&self) -> Option<&StandardMaterial> {
        match self {
            Material::Standard(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_standard_mut(&mut self) -> Option<&mut StandardMaterial> {
        match self {
            Material::Standard(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_atmosphere(&self) -> Option<&AtmosphereMaterial> {
        match self {
            Material::Atmosphere(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_atmosphere_mut(&mut self) -> Option<&mut AtmosphereMaterial> {
        match self {
            Material::Atmosphere(m) => Some(m),
            _ => None,
        }
    }
}
