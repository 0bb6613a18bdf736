//! Host-side mirrors of the WGSL uniform blocks.
//!
//! Per-object block (one buffer per plane, 256 bytes allocated):
//! ```text
//! [  0,  64)  transform   translate * rotate * scale, column-major
//! [ 64, 128)  rotate      rotate only, column-major
//! [128, 256)  unused (uniform offset alignment)
//! ```
//! Shared camera block: one view-projection matrix (64 bytes).
//! Shared light block: vec3 position padded to 16 bytes.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use planefield_common::Transform;

pub const MATRIX_SIZE: u64 = 4 * 16;
pub const TRANSFORM_OFFSET: u64 = 0;
pub const ROTATE_OFFSET: u64 = MATRIX_SIZE;
/// Allocation size of a per-object uniform buffer.
pub const OBJECT_UNIFORM_SIZE: u64 = 256;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub transform: [[f32; 4]; 4],
    pub rotate: [[f32; 4]; 4],
}

impl ObjectUniforms {
    pub const SIZE: u64 = std::mem::size_of::<ObjectUniforms>() as u64;

    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            transform: transform.matrix().to_cols_array_2d(),
            rotate: transform.rotation_matrix().to_cols_array_2d(),
        }
    }
}

impl Default for ObjectUniforms {
    fn default() -> Self {
        Self::from_transform(&Transform::default())
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub const SIZE: u64 = std::mem::size_of::<CameraUniform>() as u64;

    pub fn new(view_proj: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LightUniform {
    pub position: [f32; 3],
    pub _pad: f32, // vec3 occupies 16 bytes in a uniform block
}

impl LightUniform {
    pub const SIZE: u64 = std::mem::size_of::<LightUniform>() as u64;

    pub fn new(position: Vec3) -> Self {
        Self {
            position: position.to_array(),
            _pad: 0.0,
        }
    }
}

/// Queues `bytes` into `buffer` at `offset`, refusing writes past its end.
pub(crate) fn checked_write(queue: &wgpu::Queue, buffer: &wgpu::Buffer, offset: u64, bytes: &[u8]) {
    assert!(
        write_fits(buffer.size(), offset, bytes.len() as u64),
        "uniform write of {} bytes at offset {offset} overflows {}-byte buffer",
        bytes.len(),
        buffer.size()
    );
    queue.write_buffer(buffer, offset, bytes);
}

pub(crate) fn write_fits(buffer_size: u64, offset: u64, len: u64) -> bool {
    offset
        .checked_add(len)
        .is_some_and(|end| end <= buffer_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn block_sizes() {
        assert_eq!(ObjectUniforms::SIZE, 128);
        assert_eq!(CameraUniform::SIZE, MATRIX_SIZE);
        assert_eq!(LightUniform::SIZE, 16);
        assert!(ObjectUniforms::SIZE <= OBJECT_UNIFORM_SIZE);
        assert_eq!(OBJECT_UNIFORM_SIZE % 256, 0);
    }

    #[test]
    fn rotate_matrix_sits_at_offset_64() {
        let t = Transform {
            position: glam::Vec3::new(1.0, 2.0, 3.0),
            rotation: glam::Vec3::new(FRAC_PI_2, 0.0, 0.0),
            ..Transform::default()
        };
        let u = ObjectUniforms::from_transform(&t);
        let bytes = bytemuck::bytes_of(&u);
        let rotate: &[f32] = bytemuck::cast_slice(&bytes[ROTATE_OFFSET as usize..128]);
        let expected = Mat4::from_rotation_x(FRAC_PI_2).to_cols_array();
        for (a, b) in rotate.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
        // translation is column 3 of the transform matrix
        let transform: &[f32] = bytemuck::cast_slice(&bytes[..ROTATE_OFFSET as usize]);
        assert_eq!(&transform[12..15], &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn write_bounds() {
        assert!(write_fits(256, 0, 64));
        assert!(write_fits(256, 64, 64));
        assert!(write_fits(256, 128, 128));
        assert!(!write_fits(256, 200, 64));
        assert!(!write_fits(16, 0, 17));
        assert!(!write_fits(256, u64::MAX, 1));
    }
}
