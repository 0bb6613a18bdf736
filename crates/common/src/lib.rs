//! Shared plain-data types used by every planefield crate.
//!
//! # Invariants
//! - Rotation is stored as Euler angles in radians and applied X, then Y, then Z.
//! - Matrices are column-major (glam convention), matching WGSL `mat4x4<f32>`.

mod bitmap;
mod types;

pub use bitmap::Bitmap;
pub use types::{PlaneConfig, Transform};

pub fn crate_info() -> &'static str {
    concat!("planefield-common v", env!("CARGO_PKG_VERSION"))
}
