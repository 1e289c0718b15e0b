//! The chunk library that expands insertion points left after hooks run.

use std::collections::BTreeSet;

/// Feature flags that select chunk variants, e.g. `USE_ROUGHNESSMAP`.
pub type Defines = BTreeSet<&'static str>;

pub const USE_MAP: &str = "USE_MAP";
pub const USE_BUMPMAP: &str = "USE_BUMPMAP";
pub const USE_ROUGHNESSMAP: &str = "USE_ROUGHNESSMAP";
pub const USE_METALNESSMAP: &str = "USE_METALNESSMAP";
pub const USE_ALPHAMAP: &str = "USE_ALPHAMAP";
pub const USE_EMISSIVEMAP: &str = "USE_EMISSIVEMAP";

pub(crate) const FRAME: &str = include_str!("shaders/frame.wgsl");
pub(crate) const STANDARD_TEMPLATE: &str = include_str!("shaders/standard.wgsl");
pub(crate) const ATMOSPHERE_TEMPLATE: &str = include_str!("shaders/atmosphere.wgsl");
pub(crate) const SPRITE_TEMPLATE: &str = include_str!("shaders/sprite.wgsl");
const STANDARD_COMMON: &str = include_str!("shaders/standard_common.wgsl");

const MAP_FRAGMENT: &str =
    "    diffuse_color = diffuse_color * textureSample(t_map, s_material, in.uv);";

const ALPHAMAP_FRAGMENT: &str =
    "    diffuse_color.a = diffuse_color.a * textureSample(t_alpha, s_material, in.uv).g;";

const ROUGHNESS_BASE: &str = "    var roughness_factor = material.roughness;";
const ROUGHNESSMAP_FRAGMENT: &str = "    roughness_factor = roughness_factor * textureSample(t_roughness, s_material, in.uv).g;";

const METALNESS_BASE: &str = "    var metalness_factor = material.metalness;";
const METALNESSMAP_FRAGMENT: &str = "    metalness_factor = metalness_factor * textureSample(t_metalness, s_material, in.uv).b;";

const NORMAL_BASE: &str = "    var normal = normalize(in.world_normal) * face;";
const BUMPMAP_FRAGMENT: &str =
    "    normal = perturb_normal(in.world_position, normal, bump_derivatives(in.uv), face);";

const EMISSIVEMAP_FRAGMENT: &str =
    "    total_emissive = total_emissive * textureSample(t_emissive, s_material, in.uv).rgb;";

const LIGHTS_FRAGMENT: &str = r#"    let view_dir = normalize(frame.camera_position.xyz - in.world_position);
    let diffuse = diffuse_color.rgb * (1.0 - metalness_factor);
    let f0 = mix(vec3<f32>(0.04), diffuse_color.rgb, metalness_factor);
    let alpha = max(roughness_factor * roughness_factor, 0.0525);
    var outgoing = frame.ambient.rgb * diffuse * RECIPROCAL_PI;
    let light_dir = normalize(-frame.sun_direction.xyz);
    let half_dir = normalize(light_dir + view_dir);
    let n_dot_l = saturate(dot(normal, light_dir));
    let n_dot_v = max(saturate(dot(normal, view_dir)), EPSILON);
    let n_dot_h = saturate(dot(normal, half_dir));
    let v_dot_h = saturate(dot(view_dir, half_dir));
    let specular = fresnel_schlick(f0, v_dot_h)
        * visibility_smith(alpha, n_dot_l, n_dot_v)
        * distribution_ggx(alpha, n_dot_h);
    outgoing = outgoing + frame.sun_color.rgb * n_dot_l * (diffuse * RECIPROCAL_PI + specular);"#;

const OUTPUT_FRAGMENT: &str =
    "    return vec4<f32>((outgoing + total_emissive) * frame.exposure.x, diffuse_color.a);";

fn gated(define: &str, defines: &Defines, code: &str) -> String {
    if defines.contains(define) {
        code.to_string()
    } else {
        String::new()
    }
}

fn with_optional(base: &str, define: &str, defines: &Defines, code: &str) -> String {
    if defines.contains(define) {
        format!("{base}\n{code}")
    } else {
        base.to_string()
    }
}

/// Expand the chunk `name` for a material with `defines`.
pub fn chunk(name: &str, defines: &Defines) -> Option<String> {
    let code = match name {
        "frame" => FRAME.to_string(),
        "common" => STANDARD_COMMON.to_string(),
        "map_fragment" => gated(USE_MAP, defines, MAP_FRAGMENT),
        "alphamap_fragment" => gated(USE_ALPHAMAP, defines, ALPHAMAP_FRAGMENT),
        "roughnessmap_fragment" => {
            with_optional(ROUGHNESS_BASE, USE_ROUGHNESSMAP, defines, ROUGHNESSMAP_FRAGMENT)
        }
        "metalnessmap_fragment" => {
            with_optional(METALNESS_BASE, USE_METALNESSMAP, defines, METALNESSMAP_FRAGMENT)
        }
        "normal_fragment" => with_optional(NORMAL_BASE, USE_BUMPMAP, defines, BUMPMAP_FRAGMENT),
        "emissivemap_fragment" => gated(USE_EMISSIVEMAP, defines, EMISSIVEMAP_FRAGMENT),
        "lights_fragment" => LIGHTS_FRAGMENT.to_string(),
        "output_fragment" => OUTPUT_FRAGMENT.to_string(),
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ShaderSource;

    #[test]
    fn test_every_standard_point_has_a_chunk() {
        let source = ShaderSource::parse("standard", STANDARD_TEMPLATE);
        let defines = Defines::new();
        for point in source.points() {
            assert!(chunk(point, &defines).is_some(), "no chunk for {point}");
        }
    }

    #[test]
    fn test_roughness_chunk_variants() {
        let mut defines = Defines::new();
        let plain = chunk("roughnessmap_fragment", &defines).unwrap();
        assert!(plain.contains("material.roughness"));
        assert!(!plain.contains("t_roughness"));

        defines.insert(USE_ROUGHNESSMAP);
        let mapped = chunk("roughnessmap_fragment", &defines).unwrap();
        assert!(mapped.contains("textureSample(t_roughness, s_material, in.uv).g"));
    }

    #[test]
    fn test_gated_chunks_are_empty_without_define() {
        let defines = Defines::new();
        assert_eq!(chunk("map_fragment", &defines).unwrap(), "");
        assert_eq!(chunk("emissivemap_fragment", &defines).unwrap(), "");
    }

    #[test]
    fn test_unknown_chunk() {
        assert!(chunk("tonemapping_fragment", &Defines::new()).is_none());
    }
}
