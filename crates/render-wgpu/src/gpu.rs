use glam::Vec3;
use planefield_render::Camera;

use crate::RenderError;
use crate::shaders;
use crate::uniforms::{CameraUniform, LightUniform, checked_write};

/// Depth-stencil format shared by the depth attachment and every pipeline.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// Drawable size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Texture extent; zero dimensions (minimized window) are raised to 1.
    pub fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width.max(1),
            height: self.height.max(1),
            depth_or_array_layers: 1,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

/// Depth-stencil texture sized to the surface.
pub struct DepthAttachment {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthAttachment {
    pub fn new(device: &wgpu::Device, size: SurfaceSize) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: size.extent(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&Default::default());
        Self { texture, view }
    }

    /// Replaces the texture with one of the new size.
    pub fn resize(&mut self, device: &wgpu::Device, size: SurfaceSize) {
        *self = Self::new(device, size);
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.texture.width(), self.texture.height())
    }
}

/// Device, queue and the resources every plane shares.
///
/// One camera buffer and one light buffer exist per context; every plane's
/// bind group references them, so a single write per frame updates all
/// objects.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    camera_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
    lit_shader: wgpu::ShaderModule,
    displaced_shader: wgpu::ShaderModule,
}

impl GpuContext {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("camera_uniform_buffer"),
            size: CameraUniform::SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("light_uniform_buffer"),
            size: LightUniform::SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("plane_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let lit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("plane_lit_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::PLANE_LIT_SHADER.into()),
        });
        let displaced_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("plane_displaced_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::PLANE_DISPLACED_SHADER.into()),
        });

        Self {
            device,
            queue,
            surface_format,
            camera_buffer,
            light_buffer,
            sampler,
            lit_shader,
            displaced_shader,
        }
    }

    /// Context without a presentation surface, for tools and tests.
    ///
    /// Fails with [`RenderError::UnsupportedPlatform`] when the machine has no
    /// usable adapter.
    pub async fn headless(format: wgpu::TextureFormat) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| RenderError::UnsupportedPlatform("no GPU adapter".into()))?;
        let (device, queue) = request_device(&adapter).await?;
        Ok(Self::new(device, queue, format))
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn camera_buffer(&self) -> &wgpu::Buffer {
        &self.camera_buffer
    }

    pub fn light_buffer(&self) -> &wgpu::Buffer {
        &self.light_buffer
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub(crate) fn lit_shader(&self) -> &wgpu::ShaderModule {
        &self.lit_shader
    }

    pub(crate) fn displaced_shader(&self) -> &wgpu::ShaderModule {
        &self.displaced_shader
    }

    /// Writes the camera's current view-projection matrix.
    pub fn write_camera(&self, camera: &Camera) {
        let uniform = CameraUniform::new(camera.view_projection());
        checked_write(&self.queue, &self.camera_buffer, 0, bytemuck::bytes_of(&uniform));
    }

    pub fn write_light(&self, position: Vec3) {
        let uniform = LightUniform::new(position);
        checked_write(&self.queue, &self.light_buffer, 0, bytemuck::bytes_of(&uniform));
    }
}

pub(crate) async fn request_device(
    adapter: &wgpu::Adapter,
) -> Result<(wgpu::Device, wgpu::Queue), RenderError> {
    adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("planefield_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
                memory_hints: Default::default(),
            },
            None,
        )
        .await
        .map_err(|e| RenderError::UnsupportedPlatform(format!("device request failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headless() -> Option<GpuContext> {
        pollster::block_on(GpuContext::headless(wgpu::TextureFormat::Rgba8UnormSrgb)).ok()
    }

    #[test]
    fn extent_never_zero() {
        let e = SurfaceSize::new(0, 0).extent();
        assert_eq!((e.width, e.height, e.depth_or_array_layers), (1, 1, 1));
        let e = SurfaceSize::new(1280, 720).extent();
        assert_eq!((e.width, e.height), (1280, 720));
        assert!((SurfaceSize::new(1280, 720).aspect() - 16.0 / 9.0).abs() < 1e-6);
        assert_eq!(SurfaceSize::new(10, 0).aspect(), 10.0);
    }

    #[test]
    fn depth_resize_is_idempotent() {
        let Some(gpu) = headless() else { return };
        let size = SurfaceSize::new(320, 200);
        let mut depth = DepthAttachment::new(&gpu.device, SurfaceSize::new(64, 64));
        depth.resize(&gpu.device, size);
        let first = depth.size();
        depth.resize(&gpu.device, size);
        assert_eq!(first, depth.size());
        assert_eq!(first, size);
    }

    #[test]
    fn shared_buffer_sizes() {
        let Some(gpu) = headless() else { return };
        assert_eq!(gpu.camera_buffer().size(), 64);
        assert_eq!(gpu.light_buffer().size(), 16);
        gpu.write_camera(&Camera::default());
        gpu.write_light(Vec3::new(0.0, 2.0, 2.0));
        gpu.queue.submit(std::iter::empty());
    }
}
