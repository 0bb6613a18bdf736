use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec3;
use planefield_assets::SceneDescription;
use planefield_render::{Camera, Scene};
use planefield_render_wgpu::{GpuContext, Plane, Renderer, SurfaceSize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "planefield-desktop", about = "Planefield scene viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON scene file; the built-in demo scene is shown when omitted
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Initial window width in pixels
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value = "720")]
    height: u32,
}

/// Pixels of drag per radian of rotation.
const DRAG_PIXELS_PER_RADIAN: f32 = 100.0;
/// Pixels of smooth scrolling per unit of zoom.
const SCROLL_PIXELS_PER_UNIT: f32 = 100.0;

/// Mouse drag tracking.
#[derive(Default)]
struct DragState {
    active: bool,
    last: Option<PhysicalPosition<f64>>,
}

impl DragState {
    /// Returns `(d_pitch, d_yaw)` for a cursor move while dragging.
    fn motion(&mut self, position: PhysicalPosition<f64>) -> Option<(f32, f32)> {
        let last = self.last.replace(position);
        if !self.active {
            return None;
        }
        let last = last?;
        let dx = (position.x - last.x) as f32;
        let dy = (position.y - last.y) as f32;
        Some((dy / DRAG_PIXELS_PER_RADIAN, dx / DRAG_PIXELS_PER_RADIAN))
    }
}

/// Wheel up moves the camera toward the origin.
fn wheel_zoom(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y,
        MouseScrollDelta::PixelDelta(p) => -(p.y as f32) / SCROLL_PIXELS_PER_UNIT,
    }
}

/// Light sweeps along X over time.
fn animated_light(seconds: f32) -> Vec3 {
    Vec3::new(seconds.cos() * 10.0, 2.0, 2.0)
}

/// Builds one GPU plane per description entry; any failure aborts the scene.
fn build_scene(
    gpu: &GpuContext,
    description: &SceneDescription,
    base_dir: &Path,
) -> Result<Scene<Plane>> {
    let mut scene = Scene::new();
    if let Some(light) = description.light_position {
        scene.light_position = light;
    }
    for (index, entry) in description.planes.iter().enumerate() {
        let (color, height) = entry
            .bitmaps(base_dir)
            .with_context(|| format!("loading bitmaps for plane {index}"))?;
        let plane = Plane::new(gpu, &entry.config, &color, height.as_ref())
            .with_context(|| format!("creating plane {index}"))?;
        scene.add(plane);
    }
    tracing::info!(planes = scene.len(), "scene built");
    Ok(scene)
}

struct App {
    description: SceneDescription,
    base_dir: PathBuf,
    initial_size: PhysicalSize<u32>,
    window: Option<Arc<Window>>,
    renderer: Renderer,
    scene: Scene<Plane>,
    camera: Camera,
    drag: DragState,
    started: Instant,
    failure: Option<anyhow::Error>,
}

impl App {
    fn new(description: SceneDescription, base_dir: PathBuf, initial_size: PhysicalSize<u32>) -> Self {
        Self {
            description,
            base_dir,
            initial_size,
            window: None,
            renderer: Renderer::new(),
            scene: Scene::new(),
            camera: Camera::new(initial_size.width as f32 / initial_size.height.max(1) as f32),
            drag: DragState::default(),
            started: Instant::now(),
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        tracing::error!("{err:#}");
        self.failure = Some(err);
        event_loop.exit();
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Planefield")
            .with_inner_size(self.initial_size);
        let window = Arc::new(event_loop.create_window(attrs).context("creating window")?);

        let size = window.inner_size();
        let surface_size = SurfaceSize::new(size.width, size.height);
        if !pollster::block_on(self.renderer.init(window.clone(), surface_size)) {
            anyhow::bail!("no usable GPU; see the log for details");
        }
        self.camera.aspect = surface_size.aspect();

        let gpu = self
            .renderer
            .context()
            .context("renderer reported ready without a GPU context")?;
        self.scene = build_scene(gpu, &self.description, &self.base_dir)?;
        self.window = Some(window);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if self.description.light_position.is_none() {
            self.scene.light_position = animated_light(self.started.elapsed().as_secs_f32());
        }
        match self.renderer.frame(&self.camera, &self.scene) {
            Ok(()) => {}
            Err(err) if err.is_fatal() => {
                self.fail(event_loop, anyhow::Error::new(err).context("rendering stopped"));
                return;
            }
            Err(err) => tracing::warn!("frame skipped: {err}"),
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.start(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                let size = SurfaceSize::new(new_size.width, new_size.height);
                self.camera.aspect = size.aspect();
                self.renderer.update(size);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.camera.zoom(wheel_zoom(delta));
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.drag.active = state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some((d_pitch, d_yaw)) = self.drag.motion(position) {
                    self.camera.rotate(d_pitch, d_yaw);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    tracing::info!("planefield-desktop starting");

    let (description, base_dir) = match &cli.scene {
        Some(path) => {
            let description = SceneDescription::load(path)
                .with_context(|| format!("reading scene {}", path.display()))?;
            let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
            (description, base)
        }
        None => (SceneDescription::demo(), PathBuf::from(".")),
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(
        description,
        base_dir,
        PhysicalSize::new(cli.width.max(1), cli.height.max(1)),
    );
    event_loop.run_app(&mut app)?;

    match app.failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_needs_button_and_previous_position() {
        let mut drag = DragState::default();
        assert_eq!(drag.motion(PhysicalPosition::new(10.0, 10.0)), None);
        drag.active = true;
        let (d_pitch, d_yaw) = drag.motion(PhysicalPosition::new(110.0, 60.0)).unwrap();
        assert!((d_pitch - 0.5).abs() < 1e-6);
        assert!((d_yaw - 1.0).abs() < 1e-6);
    }

    #[test]
    fn first_move_after_press_has_no_delta() {
        let mut drag = DragState {
            active: true,
            last: None,
        };
        assert_eq!(drag.motion(PhysicalPosition::new(5.0, 5.0)), None);
        assert!(drag.motion(PhysicalPosition::new(6.0, 5.0)).is_some());
    }

    #[test]
    fn wheel_up_zooms_in() {
        assert_eq!(wheel_zoom(MouseScrollDelta::LineDelta(0.0, 1.0)), -1.0);
        let pixels = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -250.0));
        assert!((wheel_zoom(pixels) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn light_sweeps_along_x() {
        assert_eq!(animated_light(0.0), Vec3::new(10.0, 2.0, 2.0));
        let p = animated_light(std::f32::consts::PI);
        assert!((p.x + 10.0).abs() < 1e-4);
        assert_eq!((p.y, p.z), (2.0, 2.0));
    }
}
