//! PNG snapshots of the framebuffer.

use std::path::Path;

use image::error::{ImageError, ParameterError, ParameterErrorKind};
use image::RgbaImage;
use tracing::info;

use rdpview_core::Framebuffer;

/// Copy the framebuffer into an image buffer.
pub fn to_image(fb: &Framebuffer) -> Result<RgbaImage, ImageError> {
    RgbaImage::from_raw(fb.width(), fb.height(), fb.as_bytes().to_vec()).ok_or_else(|| {
        ImageError::Parameter(ParameterError::from_kind(
            ParameterErrorKind::DimensionMismatch,
        ))
    })
}

/// Write the framebuffer to `path` as PNG.
pub fn write_png(fb: &Framebuffer, path: &Path) -> Result<(), ImageError> {
    to_image(fb)?.save_with_format(path, image::ImageFormat::Png)?;
    info!(
        "wrote {}x{} snapshot to {}",
        fb.width(),
        fb.height(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdpview_core::{FrameCompositor, PixelCodec, ScanlineOrienter, Tile};

    fn painted() -> FrameCompositor {
        let mut compositor = FrameCompositor::new(
            Framebuffer::new(8, 6),
            PixelCodec::default(),
            ScanlineOrienter::default(),
        );
        compositor
            .update(&Tile {
                dest_left: 2,
                dest_top: 1,
                dest_right: 3,
                dest_bottom: 2,
                width: 2,
                height: 2,
                bits_per_pixel: 32,
                is_compressed: false,
                data: [0x00, 0x80, 0xFF, 0xFF].repeat(4),
            })
            .unwrap();
        compositor
    }

    #[test]
    fn image_matches_framebuffer() {
        let compositor = painted();
        let img = to_image(compositor.framebuffer()).unwrap();

        assert_eq!(img.dimensions(), (8, 6));
        assert_eq!(img.get_pixel(2, 1).0, [0x00, 0x80, 0xFF, 0xFF]);
        assert_eq!(img.get_pixel(3, 2).0, [0x00, 0x80, 0xFF, 0xFF]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn png_is_readable() {
        let compositor = painted();
        let path = std::env::temp_dir().join(format!("rdpview-snapshot-{}.png", std::process::id()));

        write_png(compositor.framebuffer(), &path).unwrap();
        let back = image::open(&path).unwrap().to_rgba8();
        let _ = std::fs::remove_file(&path);

        assert_eq!(back.dimensions(), (8, 6));
        assert_eq!(back.get_pixel(3, 1).0, [0x00, 0x80, 0xFF, 0xFF]);
    }
}
