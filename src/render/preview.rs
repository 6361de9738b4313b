//! PNG export of a [`FrameBuffer`], for checking a graph without paper.

use std::path::Path;

use image::{GrayImage, ImageEncoder, Luma};

use crate::error::PressplotError;

use super::FrameBuffer;

/// Convert the framebuffer to an 8-bit grayscale image (black dots = 0).
pub fn to_image(fb: &FrameBuffer) -> GrayImage {
    let (width, height) = (fb.width() as u32, fb.height() as u32);
    let mut img = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let color = if fb.get_pixel(x as i32, y as i32) { 0u8 } else { 255u8 };
            img.put_pixel(x, y, Luma([color]));
        }
    }
    img
}

/// Encode the framebuffer as PNG bytes.
pub fn to_png(fb: &FrameBuffer) -> Result<Vec<u8>, PressplotError> {
    let img = to_image(fb);

    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::L8,
        )
        .map_err(|e| PressplotError::Image(format!("Failed to encode PNG: {}", e)))?;

    Ok(png_bytes)
}

/// Write the framebuffer to `path` as PNG.
pub fn save_png(fb: &FrameBuffer, path: &Path) -> Result<(), PressplotError> {
    to_image(fb)
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| PressplotError::Image(format!("Failed to save PNG: {}", e)))?;

    log::info!("Saved {}x{} preview to {}", fb.width(), fb.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_matches_pixels() {
        let mut fb = FrameBuffer::new(16, 4).unwrap();
        fb.set_pixel(3, 1);

        let img = to_image(&fb);
        assert_eq!(img.dimensions(), (16, 4));
        assert_eq!(img.get_pixel(3, 1).0, [0]);
        assert_eq!(img.get_pixel(4, 1).0, [255]);
    }

    #[test]
    fn test_png_signature() {
        let fb = FrameBuffer::new(8, 8).unwrap();
        let png = to_png(&fb).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
