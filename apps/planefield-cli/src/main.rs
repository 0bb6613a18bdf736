use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec3;
use planefield_assets::{SceneDescription, Vertex, generate_plane};
use planefield_render::{Camera, Scene};
use planefield_render_wgpu::{
    CameraUniform, GpuContext, LightUniform, OBJECT_UNIFORM_SIZE, Plane, ROTATE_OFFSET,
    TRANSFORM_OFFSET,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "planefield-cli", about = "CLI tool for planefield scenes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions and GPU data layouts
    Info,
    /// Generate a plane mesh and report its size and bounds
    Mesh {
        #[arg(long, default_value = "1")]
        segments_x: u32,
        #[arg(long, default_value = "1")]
        segments_y: u32,
        #[arg(long, default_value = "1.0")]
        width: f32,
        #[arg(long, default_value = "1.0")]
        height: f32,
        /// Dump every vertex as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the view-projection matrix for an orbit state
    Camera {
        /// Pitch in radians
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        pitch: f32,
        /// Yaw in radians
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        yaw: f32,
        /// Zoom applied to the default position (positive moves away)
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        zoom: f32,
        #[arg(long, default_value = "1.7777778")]
        aspect: f32,
    },
    /// Parse and validate a scene file
    Scene {
        path: PathBuf,
        /// Also build every plane on a headless GPU
        #[arg(long)]
        gpu: bool,
    },
}

/// Per-plane validation result.
#[derive(Debug, PartialEq)]
struct PlaneReport {
    vertices: u32,
    displaced: bool,
    texture: (u32, u32),
}

/// Resolves bitmaps and meshes for every plane without touching the GPU.
fn validate_scene(description: &SceneDescription, base_dir: &Path) -> Result<Vec<PlaneReport>> {
    description
        .planes
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let (color, height) = entry
                .bitmaps(base_dir)
                .with_context(|| format!("plane {index}: bitmaps"))?;
            let size = entry.config.resolved_size();
            let segments = entry.config.resolved_segments();
            let mesh = generate_plane(segments.x, segments.y, size.x, size.y)
                .with_context(|| format!("plane {index}: mesh"))?;
            Ok(PlaneReport {
                vertices: mesh.vertex_count(),
                displaced: height.is_some(),
                texture: (color.width, color.height),
            })
        })
        .collect()
}

fn build_on_gpu(description: &SceneDescription, base_dir: &Path) -> Result<usize> {
    let gpu = pollster::block_on(GpuContext::headless(wgpu::TextureFormat::Rgba8UnormSrgb))?;
    let mut scene = Scene::new();
    for (index, entry) in description.planes.iter().enumerate() {
        let (color, height) = entry.bitmaps(base_dir)?;
        let plane = Plane::new(&gpu, &entry.config, &color, height.as_ref())
            .with_context(|| format!("plane {index}: GPU resources"))?;
        scene.add(plane);
    }
    Ok(scene.len())
}

/// `RUST_LOG` wins when it parses; otherwise `--verbose` picks the level.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let fallback = if verbose { "debug" } else { "info" };
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose, std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    match cli.command {
        Commands::Info => {
            println!("planefield-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", planefield_common::crate_info());
            println!("assets: {}", planefield_assets::crate_info());
            println!("render: {}", planefield_render::crate_info());
            println!("render-wgpu: {}", planefield_render_wgpu::crate_info());
            println!(
                "vertex: stride={} normal@{} uv@{}",
                Vertex::STRIDE,
                Vertex::NORMAL_OFFSET,
                Vertex::UV_OFFSET
            );
            println!(
                "object uniforms: {OBJECT_UNIFORM_SIZE} bytes, transform@{TRANSFORM_OFFSET} rotate@{ROTATE_OFFSET}"
            );
            println!(
                "camera uniform: {} bytes, light uniform: {} bytes",
                CameraUniform::SIZE,
                LightUniform::SIZE
            );
        }
        Commands::Mesh {
            segments_x,
            segments_y,
            width,
            height,
            json,
        } => {
            let mesh = generate_plane(segments_x, segments_y, width, height)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&mesh)?);
            } else {
                println!("vertices: {}", mesh.vertex_count());
                if let Some((min, max)) = mesh.bounds() {
                    println!("bounds: min={min} max={max}");
                }
            }
        }
        Commands::Camera {
            pitch,
            yaw,
            zoom,
            aspect,
        } => {
            let mut camera = Camera::new(aspect);
            camera.rotate(pitch, yaw);
            camera.zoom(zoom);
            println!("position: {} (distance {:.3})", camera.position, camera.distance());
            let m = camera.view_projection();
            for row in 0..4 {
                let r = m.row(row);
                println!("[{:>10.4} {:>10.4} {:>10.4} {:>10.4}]", r.x, r.y, r.z, r.w);
            }
            let origin = m * glam::Vec4::W;
            println!("origin ndc: {}", Vec3::new(origin.x, origin.y, origin.z) / origin.w);
        }
        Commands::Scene { path, gpu } => {
            let description = SceneDescription::load(&path)
                .with_context(|| format!("reading scene {}", path.display()))?;
            let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            tracing::debug!(planes = description.planes.len(), "scene file parsed");
            let reports = validate_scene(&description, &base_dir)?;
            match description.light_position {
                Some(light) => println!("light: {light}"),
                None => println!("light: animated"),
            }
            for (index, report) in reports.iter().enumerate() {
                println!(
                    "plane {index}: {} vertices, {}, texture {}x{}",
                    report.vertices,
                    if report.displaced { "displaced" } else { "lit" },
                    report.texture.0,
                    report.texture.1
                );
            }
            if gpu {
                let built = build_on_gpu(&description, &base_dir)?;
                println!("gpu: built {built} planes");
            }
        }
    }

    Ok(())
}
