use planefield_assets::{Mesh, Vertex, generate_plane};
use planefield_common::{Bitmap, PlaneConfig, Transform};
use wgpu::util::DeviceExt;

use crate::RenderError;
use crate::gpu::{DEPTH_FORMAT, GpuContext};
use crate::shaders::{FRAGMENT_ENTRY, VERTEX_ENTRY};
use crate::texture::GpuTexture;
use crate::uniforms::{
    MATRIX_SIZE, OBJECT_UNIFORM_SIZE, ObjectUniforms, ROTATE_OFFSET, TRANSFORM_OFFSET,
    checked_write,
};

/// Which shader program a plane is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneVariant {
    /// Color texture lit by the scene's point light.
    Lit,
    /// Vertices displaced by a height map; binding 2 holds the height texture
    /// instead of the light.
    Displaced,
}

impl PlaneVariant {
    pub fn label(self) -> &'static str {
        match self {
            Self::Lit => "lit",
            Self::Displaced => "displaced",
        }
    }
}

/// A textured plane with its own vertex buffer, uniform buffer and pipeline.
///
/// Only `transform` changes after construction; [`Plane::draw`] rebuilds both
/// matrices from it every call.
pub struct Plane {
    pub transform: Transform,
    variant: PlaneVariant,
    mesh: Mesh,
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    _color: GpuTexture,
    _height: Option<GpuTexture>,
}

impl Plane {
    /// Builds every GPU resource the plane needs.
    ///
    /// Supplying `height_map` selects [`PlaneVariant::Displaced`]. Any
    /// validation or allocation failure reported by the device is returned as
    /// [`RenderError::ResourceCreation`]; no half-built plane is handed out.
    pub fn new(
        gpu: &GpuContext,
        config: &PlaneConfig,
        color: &Bitmap,
        height_map: Option<&Bitmap>,
    ) -> Result<Self, RenderError> {
        let size = config.resolved_size();
        let segments = config.resolved_segments();
        let mesh = generate_plane(segments.x, segments.y, size.x, size.y)?;
        let variant = if height_map.is_some() {
            PlaneVariant::Displaced
        } else {
            PlaneVariant::Lit
        };

        gpu.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let built = Self::build(gpu, config.transform(), variant, mesh, color, height_map);
        let validation = pollster::block_on(gpu.device.pop_error_scope());
        let out_of_memory = pollster::block_on(gpu.device.pop_error_scope());

        let plane = built?;
        if let Some(err) = validation.or(out_of_memory) {
            return Err(RenderError::ResourceCreation(format!(
                "{} plane: {err}",
                variant.label()
            )));
        }

        tracing::debug!(
            variant = variant.label(),
            vertices = plane.vertex_count(),
            "plane created"
        );
        Ok(plane)
    }

    fn build(
        gpu: &GpuContext,
        transform: Transform,
        variant: PlaneVariant,
        mesh: Mesh,
        color: &Bitmap,
        height_map: Option<&Bitmap>,
    ) -> Result<Self, RenderError> {
        let device = &gpu.device;
        check_buffer_size(mesh.as_bytes().len() as u64, device.limits().max_buffer_size)?;

        let color = GpuTexture::from_bitmap(
            gpu,
            color,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            "plane_color_texture",
        )?;
        // Heights are raw intensities, read with textureLoad.
        let height = height_map
            .map(|bitmap| {
                GpuTexture::from_bitmap(
                    gpu,
                    bitmap,
                    wgpu::TextureFormat::Rgba8Unorm,
                    "plane_height_texture",
                )
            })
            .transpose()?;

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("plane_vertex_buffer"),
            contents: mesh.as_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("plane_uniform_buffer"),
            size: OBJECT_UNIFORM_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("plane_bind_group_layout"),
            entries: &layout_entries(variant),
        });

        let object_binding = wgpu::BindingResource::Buffer(wgpu::BufferBinding {
            buffer: &uniform_buffer,
            offset: 0,
            size: wgpu::BufferSize::new(ObjectUniforms::SIZE),
        });
        let slot_two = match &height {
            Some(height) => wgpu::BindingResource::TextureView(height.view()),
            None => gpu.light_buffer().as_entire_binding(),
        };
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("plane_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: object_binding,
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: gpu.camera_buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: slot_two,
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(gpu.sampler()),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(color.view()),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("plane_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = match variant {
            PlaneVariant::Lit => gpu.lit_shader(),
            PlaneVariant::Displaced => gpu.displaced_shader(),
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("plane_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some(VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &[vertex_layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some(FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.surface_format(),
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            transform,
            variant,
            mesh,
            vertex_buffer,
            uniform_buffer,
            pipeline,
            bind_group,
            _color: color,
            _height: height,
        })
    }

    /// Writes the current matrices and records one non-indexed draw.
    ///
    /// Allocates nothing; the uniform buffer is rewritten in place.
    pub fn draw(&self, gpu: &GpuContext, pass: &mut wgpu::RenderPass<'_>) {
        let uniforms = ObjectUniforms::from_transform(&self.transform);
        checked_write(
            &gpu.queue,
            &self.uniform_buffer,
            TRANSFORM_OFFSET,
            bytemuck::bytes_of(&uniforms.transform),
        );
        checked_write(
            &gpu.queue,
            &self.uniform_buffer,
            ROTATE_OFFSET,
            bytemuck::bytes_of(&uniforms.rotate),
        );

        pass.set_pipeline(&self.pipeline);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..self.vertex_count(), 0..1);
    }

    pub fn variant(&self) -> PlaneVariant {
        self.variant
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn vertex_count(&self) -> u32 {
        self.mesh.vertex_count()
    }
}

/// `[position, normal, uv]`, 32-byte stride.
pub(crate) fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: 0,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: Vertex::NORMAL_OFFSET,
            shader_location: 1,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: Vertex::UV_OFFSET,
            shader_location: 2,
        },
    ];
    wgpu::VertexBufferLayout {
        array_stride: Vertex::STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}

fn layout_entries(variant: PlaneVariant) -> [wgpu::BindGroupLayoutEntry; 5] {
    let uniform = |binding, visibility, size| wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(size),
        },
        count: None,
    };
    let texture = |binding, visibility, filterable| wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    };

    let slot_two = match variant {
        PlaneVariant::Lit => uniform(2, wgpu::ShaderStages::FRAGMENT, 16),
        PlaneVariant::Displaced => texture(2, wgpu::ShaderStages::VERTEX, false),
    };
    [
        uniform(0, wgpu::ShaderStages::VERTEX_FRAGMENT, 2 * MATRIX_SIZE),
        uniform(1, wgpu::ShaderStages::VERTEX, MATRIX_SIZE),
        slot_two,
        wgpu::BindGroupLayoutEntry {
            binding: 3,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        },
        texture(4, wgpu::ShaderStages::FRAGMENT, true),
    ]
}

/// `create_buffer_init` maps at creation and panics past the device limit.
fn check_buffer_size(bytes: u64, max_buffer_size: u64) -> Result<(), RenderError> {
    if bytes > max_buffer_size {
        return Err(RenderError::ResourceCreation(format!(
            "vertex data of {bytes} bytes exceeds the device buffer limit of {max_buffer_size}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headless() -> Option<GpuContext> {
        pollster::block_on(GpuContext::headless(wgpu::TextureFormat::Rgba8UnormSrgb)).ok()
    }

    #[test]
    fn vertex_layout_matches_vertex_record() {
        let layout = vertex_layout();
        assert_eq!(layout.array_stride, 32);
        let offsets: Vec<_> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, [0, 12, 24]);
        let locations: Vec<_> = layout.attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, [0, 1, 2]);
    }

    #[test]
    fn binding_two_depends_on_variant() {
        let lit = layout_entries(PlaneVariant::Lit);
        assert!(matches!(lit[2].ty, wgpu::BindingType::Buffer { .. }));
        assert_eq!(lit[2].visibility, wgpu::ShaderStages::FRAGMENT);

        let displaced = layout_entries(PlaneVariant::Displaced);
        assert!(matches!(displaced[2].ty, wgpu::BindingType::Texture { .. }));
        assert_eq!(displaced[2].visibility, wgpu::ShaderStages::VERTEX);

        for entries in [lit, displaced] {
            let bindings: Vec<_> = entries.iter().map(|e| e.binding).collect();
            assert_eq!(bindings, [0, 1, 2, 3, 4]);
        }
    }

    #[test]
    fn unit_plane_has_six_vertices() {
        let Some(gpu) = headless() else { return };
        let plane = Plane::new(
            &gpu,
            &PlaneConfig::default(),
            &Bitmap::solid(2, 2, [255; 4]),
            None,
        )
        .unwrap();
        assert_eq!(plane.vertex_count(), 6);
        assert_eq!(plane.variant(), PlaneVariant::Lit);
        let (min, max) = plane.mesh().bounds().unwrap();
        assert_eq!(min, glam::Vec3::new(-0.5, -0.5, 0.0));
        assert_eq!(max, glam::Vec3::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn height_map_selects_displacement() {
        let Some(gpu) = headless() else { return };
        let config = PlaneConfig::default().with_segments(4, 4);
        let height = Bitmap::solid(8, 8, [128, 128, 128, 255]);
        let plane =
            Plane::new(&gpu, &config, &Bitmap::solid(2, 2, [255; 4]), Some(&height)).unwrap();
        assert_eq!(plane.variant(), PlaneVariant::Displaced);
        assert_eq!(plane.vertex_count(), 96);
    }

    #[test]
    fn mismatched_bitmap_is_resource_error() {
        let Some(gpu) = headless() else { return };
        let broken = Bitmap::new(4, 4, vec![0; 7]);
        let err = Plane::new(&gpu, &PlaneConfig::default(), &broken, None)
            .err()
            .unwrap();
        assert!(matches!(err, RenderError::ResourceCreation(_)));
    }

    #[test]
    fn buffer_size_limit_is_inclusive() {
        assert!(check_buffer_size(256, 256).is_ok());
        assert!(matches!(
            check_buffer_size(257, 256),
            Err(RenderError::ResourceCreation(_))
        ));
    }

    #[test]
    fn oversized_plane_is_resource_error() {
        let Some(gpu) = headless() else { return };
        let max = gpu.device.limits().max_buffer_size;
        let cells = max / Vertex::STRIDE / 6 + 1;
        if cells * 6 > u64::from(planefield_assets::MAX_VERTICES) {
            return;
        }
        let config = PlaneConfig::default().with_segments(cells as u32, 1);
        let err = Plane::new(&gpu, &config, &Bitmap::solid(1, 1, [0; 4]), None)
            .err()
            .unwrap();
        assert!(matches!(err, RenderError::ResourceCreation(_)));
    }

    #[test]
    fn zero_segments_is_invalid_parameter() {
        let Some(gpu) = headless() else { return };
        let config = PlaneConfig::default().with_segments(0, 3);
        let err = Plane::new(&gpu, &config, &Bitmap::solid(1, 1, [0; 4]), None)
            .err()
            .unwrap();
        assert!(matches!(err, RenderError::InvalidParameter(_)));
    }

    #[test]
    fn draw_records_into_pass() {
        let Some(gpu) = headless() else { return };
        let mut plane = Plane::new(
            &gpu,
            &PlaneConfig::default(),
            &Bitmap::solid(1, 1, [255; 4]),
            None,
        )
        .unwrap();
        plane.transform.position.x = 3.0;

        let size = crate::SurfaceSize::new(16, 16);
        let target = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("test_target"),
            size: size.extent(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: gpu.surface_format(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = target.create_view(&Default::default());
        let depth = crate::DepthAttachment::new(&gpu.device, size);

        gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("test_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations::default(),
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth.view(),
                    depth_ops: Some(wgpu::Operations::default()),
                    stencil_ops: Some(wgpu::Operations::default()),
                }),
                ..Default::default()
            });
            plane.draw(&gpu, &mut pass);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        assert!(pollster::block_on(gpu.device.pop_error_scope()).is_none());
    }
}
