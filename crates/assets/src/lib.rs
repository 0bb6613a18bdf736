//! CPU-side assets for the planefield renderer.
//!
//! Nothing in this crate touches the GPU. The render backend consumes meshes
//! and bitmaps produced here and owns their GPU copies.
//!
//! # Invariants
//! - A generated mesh always holds `6 * segments_x * segments_y` vertices.
//! - Bitmaps handed out by this crate are RGBA8 and dimension-consistent.

mod bitmap;
mod mesh;
mod scene;

pub use bitmap::{checkerboard, load_bitmap, radial_height_map};
pub use mesh::{MAX_VERTICES, Mesh, MeshError, Vertex, generate_plane};
pub use scene::{BitmapSource, PlaneDescription, ProceduralBitmap, SceneDescription};

/// Errors from asset loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid bitmap: {0}")]
    InvalidBitmap(String),
}

pub fn crate_info() -> &'static str {
    concat!("planefield-assets v", env!("CARGO_PKG_VERSION"))
}
