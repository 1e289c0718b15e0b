//! UV sphere generation.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Vertex with position, normal, and texture coordinates.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Indexed triangle list.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub label: String,
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Generate a UV sphere of `radius`.
///
/// `u` runs from longitude -180° to +180° and `v` from the north pole (0) to
/// the south pole (1), so an equirectangular image maps onto the surface the
/// same way `terra_coords::geo_to_cartesian` places points. Triangles wind
/// counter-clockwise seen from outside.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);

    let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
    let mut grid = Vec::with_capacity(height_segments as usize + 1);

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let mut row = Vec::with_capacity(width_segments as usize + 1);
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let (sin_theta, cos_theta) = (u * std::f32::consts::TAU).sin_cos();
            let (sin_phi, cos_phi) = (v * std::f32::consts::PI).sin_cos();

            let normal = Vec3::new(-cos_theta * sin_phi, cos_phi, sin_theta * sin_phi);
            let position = normal * radius;

            row.push(vertices.len() as u32);
            vertices.push(MeshVertex {
                position: position.to_array(),
                normal: normal.normalize_or_zero().to_array(),
                uv: [u, v],
            });
        }
        grid.push(row);
    }

    let mut indices = Vec::with_capacity((width_segments * height_segments * 6) as usize);
    for iy in 0..height_segments as usize {
        for ix in 0..width_segments as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];

            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments as usize - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    MeshData {
        label: format!("sphere-r{radius}"),
        vertices,
        indices,
    }
}
