use std::path::Path;

use planefield_common::Bitmap;

use crate::AssetError;

/// Decodes an image file (PNG or JPEG) into an RGBA8 bitmap.
pub fn load_bitmap(path: impl AsRef<Path>) -> Result<Bitmap, AssetError> {
    let path = path.as_ref();
    let rgba = image::open(path)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(AssetError::InvalidBitmap(format!(
            "{} has zero size",
            path.display()
        )));
    }
    tracing::debug!("decoded {} ({width}x{height})", path.display());
    Ok(Bitmap::new(width, height, rgba.into_raw()))
}

/// Two-color checkerboard, `cells` squares per side.
pub fn checkerboard(size: u32, cells: u32, a: [u8; 4], b: [u8; 4]) -> Bitmap {
    let size = size.max(1);
    let cell = (size / cells.max(1)).max(1);
    let mut pixels = Vec::with_capacity(size as usize * size as usize * 4);
    for y in 0..size {
        for x in 0..size {
            let even = ((x / cell) + (y / cell)) % 2 == 0;
            pixels.extend_from_slice(if even { &a } else { &b });
        }
    }
    Bitmap::new(size, size, pixels)
}

/// Grayscale dome: white at the center fading to black at the edge.
pub fn radial_height_map(size: u32) -> Bitmap {
    let size = size.max(1);
    let center = (size as f32 - 1.0) / 2.0;
    let radius = center.max(1.0);
    let mut pixels = Vec::with_capacity(size as usize * size as usize * 4);
    for y in 0..size {
        for x in 0..size {
            let dx = (x as f32 - center) / radius;
            let dy = (y as f32 - center) / radius;
            let falloff = (1.0 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
            let h = (falloff * falloff * 255.0).round() as u8;
            pixels.extend_from_slice(&[h, h, h, 255]);
        }
    }
    Bitmap::new(size, size, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkerboard_alternates() {
        let b = checkerboard(4, 2, [255, 0, 0, 255], [0, 0, 255, 255]);
        assert!(b.is_consistent());
        assert_eq!(&b.pixels[0..4], &[255, 0, 0, 255]);
        // x = 2 starts the second cell on the first row
        assert_eq!(&b.pixels[8..12], &[0, 0, 255, 255]);
    }

    #[test]
    fn height_map_peaks_in_center() {
        let b = radial_height_map(33);
        assert!(b.is_consistent());
        let at = |x: usize, y: usize| b.pixels[(y * 33 + x) * 4];
        assert_eq!(at(16, 16), 255);
        assert_eq!(at(0, 0), 0);
        assert!(at(16, 8) > at(16, 2));
    }

    #[test]
    fn load_png_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tex.png");
        let img = image::RgbaImage::from_pixel(3, 5, image::Rgba([10, 20, 30, 255]));
        img.save(&path).unwrap();

        let b = load_bitmap(&path).unwrap();
        assert_eq!((b.width, b.height), (3, 5));
        assert!(b.is_consistent());
        assert_eq!(&b.pixels[0..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_bitmap(dir.path().join("nope.png")).is_err());
    }
}
