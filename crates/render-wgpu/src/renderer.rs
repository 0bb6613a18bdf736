use planefield_render::{Camera, Scene};

use crate::RenderError;
use crate::gpu::{DepthAttachment, GpuContext, SurfaceSize, request_device};
use crate::plane::Plane;

/// Startup choices for [`Renderer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererSettings {
    pub clear_color: wgpu::Color,
    /// Used when the surface supports it, otherwise `Fifo`.
    pub present_mode: wgpu::PresentMode,
    pub power_preference: wgpu::PowerPreference,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            clear_color: wgpu::Color::BLACK,
            present_mode: wgpu::PresentMode::AutoVsync,
            power_preference: wgpu::PowerPreference::HighPerformance,
        }
    }
}

struct ReadyState {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    gpu: GpuContext,
    depth: DepthAttachment,
}

/// Owns the surface, device and depth buffer and draws a [`Scene`] of planes.
///
/// Starts uninitialized. [`Renderer::init`] either brings up everything or
/// nothing; until it succeeds, [`Renderer::update`] and [`Renderer::frame`]
/// are silent no-ops.
#[derive(Default)]
pub struct Renderer {
    settings: RendererSettings,
    state: Option<ReadyState>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: RendererSettings) -> Self {
        Self {
            settings,
            state: None,
        }
    }

    /// Acquires adapter and device and configures the surface.
    ///
    /// Returns `false` (and logs why) when no GPU is usable. The renderer
    /// then stays uninitialized.
    pub async fn init(
        &mut self,
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        size: SurfaceSize,
    ) -> bool {
        match self.try_init(target, size).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("renderer init failed: {err}");
                false
            }
        }
    }

    /// Like [`Renderer::init`] but reports the cause.
    pub async fn try_init(
        &mut self,
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        size: SurfaceSize,
    ) -> Result<(), RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(target)
            .map_err(|e| RenderError::UnsupportedPlatform(format!("surface creation failed: {e}")))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: self.settings.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| RenderError::UnsupportedPlatform("no compatible GPU adapter".into()))?;
        let (device, queue) = request_device(&adapter).await?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps.formats.first().copied().ok_or_else(|| {
            RenderError::UnsupportedPlatform("surface reports no supported formats".into())
        })?;
        let extent = size.extent();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: extent.width,
            height: extent.height,
            present_mode: resolve_present_mode(self.settings.present_mode, &caps.present_modes),
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth = DepthAttachment::new(&device, size);
        let gpu = GpuContext::new(device, queue, format);

        let info = adapter.get_info();
        tracing::info!(
            adapter = %info.name,
            backend = info.backend.to_str(),
            ?format,
            width = extent.width,
            height = extent.height,
            "renderer initialized"
        );

        self.state = Some(ReadyState {
            surface,
            config,
            gpu,
            depth,
        });
        Ok(())
    }

    /// Follows a surface resize.
    ///
    /// Reconfigures the surface and reallocates the depth attachment; shared
    /// buffers and every plane's resources are left alone.
    pub fn update(&mut self, size: SurfaceSize) {
        let Some(state) = &mut self.state else {
            return;
        };
        let extent = size.extent();
        state.config.width = extent.width;
        state.config.height = extent.height;
        state.surface.configure(&state.gpu.device, &state.config);
        state.depth.resize(&state.gpu.device, size);
        tracing::debug!(width = extent.width, height = extent.height, "surface resized");
    }

    /// Draws every plane of `scene` in insertion order and presents.
    ///
    /// Camera and light uniforms are written first, then the surface texture
    /// is acquired, then all planes are recorded into one pass and submitted
    /// together. A frame whose surface texture cannot be acquired is skipped
    /// and the cause returned; `Lost` and `Outdated` also reconfigure the
    /// surface for the next frame.
    pub fn frame(&self, camera: &Camera, scene: &Scene<Plane>) -> Result<(), RenderError> {
        let Some(state) = &self.state else {
            return Ok(());
        };
        let gpu = &state.gpu;

        gpu.write_camera(camera);
        gpu.write_light(scene.light_position);

        let output = match state.surface.get_current_texture() {
            Ok(output) => output,
            Err(err @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                state.surface.configure(&gpu.device, &state.config);
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.settings.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: state.depth.view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(0),
                        store: wgpu::StoreOp::Store,
                    }),
                }),
                ..Default::default()
            });

            for plane in scene.objects() {
                plane.draw(gpu, &mut pass);
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_some()
    }

    /// GPU context for building planes; `None` until initialized.
    pub fn context(&self) -> Option<&GpuContext> {
        self.state.as_ref().map(|s| &s.gpu)
    }

    pub fn depth_size(&self) -> Option<SurfaceSize> {
        self.state.as_ref().map(|s| s.depth.size())
    }
}

/// Auto modes always resolve on the device; explicit modes must be listed.
fn resolve_present_mode(
    requested: wgpu::PresentMode,
    supported: &[wgpu::PresentMode],
) -> wgpu::PresentMode {
    match requested {
        wgpu::PresentMode::AutoVsync | wgpu::PresentMode::AutoNoVsync => requested,
        mode if supported.contains(&mode) => mode,
        _ => wgpu::PresentMode::Fifo,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn frame_before_init_is_a_no_op() {
        let renderer = Renderer::new();
        let mut scene: Scene<Plane> = Scene::new();
        scene.light_position = Vec3::new(10.0, 2.0, 2.0);
        assert!(!renderer.is_ready());
        assert!(renderer.frame(&Camera::default(), &scene).is_ok());
        assert!(renderer.context().is_none());
    }

    #[test]
    fn update_before_init_is_a_no_op() {
        let mut renderer = Renderer::new();
        renderer.update(SurfaceSize::new(800, 600));
        renderer.update(SurfaceSize::new(800, 600));
        assert!(!renderer.is_ready());
        assert_eq!(renderer.depth_size(), None);
    }

    #[test]
    fn default_settings() {
        let settings = RendererSettings::default();
        assert_eq!(settings.clear_color, wgpu::Color::BLACK);
        assert_eq!(settings.present_mode, wgpu::PresentMode::AutoVsync);
        assert_eq!(settings.power_preference, wgpu::PowerPreference::HighPerformance);
        assert_eq!(Renderer::new().settings(), &settings);
    }

    #[test]
    fn present_mode_falls_back_to_fifo() {
        use wgpu::PresentMode::*;
        assert_eq!(resolve_present_mode(AutoVsync, &[]), AutoVsync);
        assert_eq!(resolve_present_mode(Mailbox, &[Fifo, Mailbox]), Mailbox);
        assert_eq!(resolve_present_mode(Immediate, &[Fifo]), Fifo);
    }
}
