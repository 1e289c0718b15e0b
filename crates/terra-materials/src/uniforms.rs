//! Custom uniforms declared by shader hooks.
//!
//! Custom uniforms live in bind group [`CUSTOM_UNIFORM_GROUP`]. Binding 0 is a
//! uniform buffer holding every float in declaration order, padded to a
//! multiple of four. Texture `k` (in declaration order) is bound at
//! `1 + 2k` with its sampler at `2 + 2k`.

use std::fmt::Write;
use std::sync::Arc;

use terra_assets::TextureResource;

use crate::ShaderError;

/// Bind group index reserved for custom uniforms.
pub const CUSTOM_UNIFORM_GROUP: u32 = 2;

/// Horizontal addressing mode of a custom texture's sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WrapMode {
    #[default]
    Clamp,
    Repeat,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Texture {
        texture: Arc<TextureResource>,
        wrap_u: WrapMode,
    },
}

/// An ordered set of named custom uniforms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Uniforms {
    entries: Vec<(String, UniformValue)>,
}

impl Uniforms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Declare a new uniform. Names must be unique.
    pub fn insert(&mut self, name: &str, value: UniformValue) -> Result<(), ShaderError> {
        if self.get(name).is_some() {
            return Err(ShaderError::DuplicateUniform(name.to_string()));
        }
        self.entries.push((name.to_string(), value));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, value)| value)
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            UniformValue::Float(value) => Some(*value),
            UniformValue::Texture { .. } => None,
        }
    }

    /// Overwrite the value of an existing float uniform.
    pub fn set_float(&mut self, name: &str, value: f32) -> Result<(), ShaderError> {
        let slot = self
            .entries
            .iter_mut()
            .find_map(|(entry, slot)| match slot {
                UniformValue::Float(current) if *entry == name => Some(current),
                _ => None,
            })
            .ok_or_else(|| ShaderError::UnknownUniform {
                name: name.to_string(),
                expected: "float",
            })?;
        *slot = value;
        Ok(())
    }

    /// Float uniforms in declaration order.
    pub fn floats(&self) -> impl Iterator<Item = (&str, f32)> {
        self.entries.iter().filter_map(|(name, value)| match value {
            UniformValue::Float(v) => Some((name.as_str(), *v)),
            UniformValue::Texture { .. } => None,
        })
    }

    /// Texture uniforms in declaration order.
    pub fn textures(&self) -> impl Iterator<Item = (&str, &Arc<TextureResource>, WrapMode)> {
        self.entries.iter().filter_map(|(name, value)| match value {
            UniformValue::Texture { texture, wrap_u } => Some((name.as_str(), texture, *wrap_u)),
            UniformValue::Float(_) => None,
        })
    }

    /// Contents of the float block at binding 0, padded to a multiple of four.
    pub fn float_block(&self) -> Vec<f32> {
        let mut block: Vec<f32> = self.floats().map(|(_, value)| value).collect();
        let padded = block.len().div_ceil(4).max(1) * 4;
        block.resize(padded, 0.0);
        block
    }

    /// WGSL declarations for this set, matching [`Uniforms::float_block`]
    /// and the texture binding order.
    pub fn declarations(&self, group: u32) -> String {
        let mut wgsl = String::from("struct CustomUniforms {\n");
        let mut count = 0;
        for (name, _) in self.floats() {
            let _ = writeln!(wgsl, "    {name}: f32,");
            count += 1;
        }
        let padded = self.float_block().len();
        for pad in 0..padded - count {
            let _ = writeln!(wgsl, "    _pad{pad}: f32,");
        }
        wgsl.push_str("};\n");
        let _ = writeln!(
            wgsl,
            "@group({group}) @binding(0) var<uniform> custom: CustomUniforms;"
        );
        for (k, (name, _, _)) in self.textures().enumerate() {
            let texture_binding = 1 + 2 * k;
            let sampler_binding = texture_binding + 1;
            let _ = writeln!(
                wgsl,
                "@group({group}) @binding({texture_binding}) var t_{name}: texture_2d<f32>;"
            );
            let _ = writeln!(
                wgsl,
                "@group({group}) @binding({sampler_binding}) var s_{name}: sampler;"
            );
        }
        wgsl
    }
}
