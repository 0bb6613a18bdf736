//! wgpu render backend for planefield scenes.
//!
//! Renders textured planes, optionally displaced by a height map in the vertex
//! stage and lit by a single point light, under one orbit camera.
//!
//! # Invariants
//! - Device, queue and the shared camera/light buffers live in one
//!   [`GpuContext`] passed by reference; there is no global GPU state.
//! - Per frame, camera and light uniforms are written before any object's
//!   uniforms and before any draw; all draws go out in one submission.
//! - Every buffer write is bounds-checked before it is queued.

mod error;
mod gpu;
mod plane;
mod renderer;
mod shaders;
mod texture;
mod uniforms;

pub use error::RenderError;
pub use gpu::{DEPTH_FORMAT, DepthAttachment, GpuContext, SurfaceSize};
pub use plane::{Plane, PlaneVariant};
pub use renderer::{Renderer, RendererSettings};
pub use texture::GpuTexture;
pub use uniforms::{
    CameraUniform, LightUniform, MATRIX_SIZE, OBJECT_UNIFORM_SIZE, ObjectUniforms,
    ROTATE_OFFSET, TRANSFORM_OFFSET,
};

pub fn crate_info() -> &'static str {
    concat!("planefield-render-wgpu v", env!("CARGO_PKG_VERSION"))
}
