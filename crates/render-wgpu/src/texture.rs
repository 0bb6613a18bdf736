use planefield_common::Bitmap;
use wgpu::util::DeviceExt;

use crate::{GpuContext, RenderError};

/// A sampled 2D texture uploaded from a [`Bitmap`].
pub struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl GpuTexture {
    /// Uploads `bitmap` as a single-mip RGBA8 texture in `format`.
    ///
    /// A bitmap whose pixel data does not match its declared dimensions, or
    /// that exceeds the device's 2D texture limit, is rejected before any GPU
    /// allocation.
    pub fn from_bitmap(
        gpu: &GpuContext,
        bitmap: &Bitmap,
        format: wgpu::TextureFormat,
        label: &str,
    ) -> Result<Self, RenderError> {
        validate(bitmap, gpu.device.limits().max_texture_dimension_2d)?;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: bitmap.width,
                    height: bitmap.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &bitmap.pixels,
        );
        let view = texture.create_view(&Default::default());
        Ok(Self { texture, view })
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }
}

fn validate(bitmap: &Bitmap, max_dimension: u32) -> Result<(), RenderError> {
    if !bitmap.is_consistent() {
        return Err(RenderError::ResourceCreation(format!(
            "bitmap declares {}x{} ({} bytes) but holds {} bytes",
            bitmap.width,
            bitmap.height,
            bitmap.expected_len(),
            bitmap.pixels.len()
        )));
    }
    if bitmap.width > max_dimension || bitmap.height > max_dimension {
        return Err(RenderError::ResourceCreation(format!(
            "bitmap {}x{} exceeds the device limit of {max_dimension}",
            bitmap.width, bitmap.height
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inconsistent_bitmaps() {
        let short = Bitmap::new(4, 4, vec![0; 12]);
        assert!(matches!(
            validate(&short, 8192),
            Err(RenderError::ResourceCreation(_))
        ));
        let empty = Bitmap::new(0, 0, Vec::new());
        assert!(validate(&empty, 8192).is_err());
    }

    #[test]
    fn rejects_oversized_bitmaps() {
        let wide = Bitmap::solid(16, 1, [0; 4]);
        assert!(validate(&wide, 16).is_ok());
        assert!(matches!(
            validate(&wide, 8),
            Err(RenderError::ResourceCreation(_))
        ));
    }

    #[test]
    fn upload_keeps_dimensions() {
        let Ok(gpu) = pollster::block_on(GpuContext::headless(
            wgpu::TextureFormat::Rgba8UnormSrgb,
        )) else {
            return;
        };
        let bitmap = Bitmap::solid(5, 3, [10, 20, 30, 255]);
        let tex = GpuTexture::from_bitmap(
            &gpu,
            &bitmap,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            "test_texture",
        )
        .unwrap();
        assert_eq!(tex.size(), (5, 3));
    }
}
