use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::Serialize;

/// One vertex record as laid out in the GPU vertex buffer.
///
/// `[px, py, pz, nx, ny, nz, u, v]`, 32 bytes, no padding.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable, Serialize)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const FLOATS: usize = 3 + 3 + 2;
    pub const STRIDE: u64 = std::mem::size_of::<Vertex>() as u64;
    pub const NORMAL_OFFSET: u64 = 3 * 4;
    pub const UV_OFFSET: u64 = (3 + 3) * 4;
}

/// Largest vertex count [`generate_plane`] will produce (512 MiB of vertex data).
pub const MAX_VERTICES: u32 = 1 << 24;

/// Non-indexed triangle list, 6 vertices per grid cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
}

impl Mesh {
    /// Saturates at `u32::MAX`; generated meshes stay within [`MAX_VERTICES`].
    pub fn vertex_count(&self) -> u32 {
        u32::try_from(self.vertices.len()).unwrap_or(u32::MAX)
    }

    /// Raw bytes for a vertex buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Axis-aligned bounds of all positions, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.vertices.iter().map(|v| Vec3::from(v.position));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Generates a `width × height` plane in the XY plane, centered on the origin,
/// facing +Z, subdivided into `segments_x × segments_y` cells.
///
/// Each cell emits two counter-clockwise triangles (as seen from +Z).
/// UVs span `[0, 1]` with V flipped so the top row of a bitmap maps to +Y.
pub fn generate_plane(
    segments_x: u32,
    segments_y: u32,
    width: f32,
    height: f32,
) -> Result<Mesh, MeshError> {
    if segments_x == 0 || segments_y == 0 {
        return Err(MeshError::InvalidParameter(format!(
            "segment counts must be at least 1, got {segments_x}x{segments_y}"
        )));
    }
    if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
        return Err(MeshError::InvalidParameter(format!(
            "plane size must be positive and finite, got {width}x{height}"
        )));
    }

    let vertex_count = u64::from(segments_x)
        .checked_mul(u64::from(segments_y))
        .and_then(|cells| cells.checked_mul(6))
        .filter(|&count| count <= u64::from(MAX_VERTICES))
        .ok_or_else(|| {
            MeshError::InvalidParameter(format!(
                "{segments_x}x{segments_y} segments exceed the limit of {MAX_VERTICES} vertices"
            ))
        })?;

    let normal = [0.0, 0.0, 1.0];
    let half_w = width / 2.0;
    let half_h = height / 2.0;

    let vertex_at = |ix: u32, iy: u32| {
        let fx = ix as f32 / segments_x as f32;
        let fy = iy as f32 / segments_y as f32;
        Vertex {
            position: [fx * width - half_w, fy * height - half_h, 0.0],
            normal,
            uv: [fx, 1.0 - fy],
        }
    };

    let mut vertices = Vec::with_capacity(vertex_count as usize);

    for ix in 0..segments_x {
        for iy in 0..segments_y {
            let v00 = vertex_at(ix, iy);
            let v10 = vertex_at(ix + 1, iy);
            let v01 = vertex_at(ix, iy + 1);
            let v11 = vertex_at(ix + 1, iy + 1);

            vertices.extend_from_slice(&[v00, v10, v01, v01, v10, v11]);
        }
    }

    Ok(Mesh { vertices })
}
