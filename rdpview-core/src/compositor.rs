//! Applies bitmap updates to the framebuffer.
//!
//! Compressed tiles go through the [`PixelCodec`], raw tiles through the
//! [`ScanlineOrienter`]; either way the resulting RGBA block overwrites
//! the framebuffer at `(dest_left, dest_top)`. Tiles are applied in the
//! order `update` is called.

use tracing::debug;

use crate::codec::PixelCodec;
use crate::error::CompositorError;
use crate::framebuffer::Framebuffer;
use crate::orient::ScanlineOrienter;
use crate::tile::{BitDepth, Damage, DecodedTile, Tile};

/// Sole writer of the session's [`Framebuffer`].
pub struct FrameCompositor {
    framebuffer: Framebuffer,
    codec: PixelCodec,
    orienter: ScanlineOrienter,
}

impl FrameCompositor {
    pub fn new(framebuffer: Framebuffer, codec: PixelCodec, orienter: ScanlineOrienter) -> Self {
        Self {
            framebuffer,
            codec,
            orienter,
        }
    }

    /// Read access to the composited surface.
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Decode `tile` and composite it.
    ///
    /// On error the framebuffer is left untouched.
    pub fn update(&mut self, tile: &Tile) -> Result<Damage, CompositorError> {
        let decoded = self.decode(tile)?;
        let damage = self.framebuffer.blit(tile.dest_left, tile.dest_top, &decoded)?;
        debug!(
            "composited {}x{} at ({},{})",
            damage.width, damage.height, damage.x, damage.y
        );
        Ok(damage)
    }

    fn decode(&self, tile: &Tile) -> Result<DecodedTile, CompositorError> {
        if tile.is_compressed {
            // The output covers the destination rectangle; refuse it before
            // paying for the decode.
            if let (Some(w), Some(h)) = (tile.dest_width(), tile.dest_height()) {
                self.framebuffer
                    .check_bounds(tile.dest_left, tile.dest_top, w, h)?;
            }
            return Ok(self.codec.decode(tile)?);
        }

        let depth = BitDepth::try_from(tile.bits_per_pixel)?;
        self.framebuffer
            .check_bounds(tile.dest_left, tile.dest_top, tile.width, tile.height)?;

        let expected = tile.expected_raw_len(depth);
        if tile.data.len() != expected {
            return Err(CompositorError::LengthMismatch {
                expected,
                actual: tile.data.len(),
            });
        }

        Ok(self.orienter.reorient(tile, depth))
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{DecodeKernel, KernelFault, KernelJob, UnavailableKernel};
    use crate::error::CodecError;
    use crate::orient::Orientation;

    const RED: [u8; 4] = [0xFF, 0x00, 0x00, 0xFF];

    /// Fills the output with a fixed colour.
    struct FillKernel([u8; 4]);

    impl DecodeKernel for FillKernel {
        fn decompress(&self, _depth: BitDepth, job: KernelJob<'_>) -> Result<(), KernelFault> {
            for px in job.output.chunks_exact_mut(4) {
                px.copy_from_slice(&self.0);
            }
            Ok(())
        }
    }

    fn compositor(kernel: Box<dyn DecodeKernel>, orientation: Orientation) -> FrameCompositor {
        FrameCompositor::new(
            Framebuffer::new(64, 64),
            PixelCodec::new(kernel),
            ScanlineOrienter::new(orientation),
        )
    }

    fn raw_red_tile() -> Tile {
        Tile {
            dest_left: 10,
            dest_top: 10,
            dest_right: 19,
            dest_bottom: 19,
            width: 10,
            height: 10,
            bits_per_pixel: 32,
            is_compressed: false,
            data: RED.repeat(100),
        }
    }

    fn assert_block(fb: &Framebuffer, x0: u32, y0: u32, w: u32, h: u32, rgba: [u8; 4]) {
        for y in 0..fb.height() {
            for x in 0..fb.width() {
                let inside = (x0..x0 + w).contains(&x) && (y0..y0 + h).contains(&y);
                let expected = if inside { rgba } else { [0; 4] };
                assert_eq!(fb.pixel(x, y).unwrap(), expected, "pixel ({x},{y})");
            }
        }
    }

    #[test]
    fn solid_red_raw_tile() {
        let mut comp = compositor(Box::new(UnavailableKernel), Orientation::BottomUp);
        let damage = comp.update(&raw_red_tile()).unwrap();
        assert_eq!(damage, Damage { x: 10, y: 10, width: 10, height: 10 });
        assert_block(comp.framebuffer(), 10, 10, 10, 10, RED);
    }

    #[test]
    fn raw_rows_land_flipped() {
        let mut comp = compositor(Box::new(UnavailableKernel), Orientation::BottomUp);
        let mut tile = raw_red_tile();
        // Wire row 0 (bottom on screen) is white.
        tile.data[..40].fill(0xFF);
        comp.update(&tile).unwrap();

        let fb = comp.framebuffer();
        assert_eq!(fb.pixel(10, 19), Some([0xFF; 4]));
        assert_eq!(fb.pixel(10, 10), Some(RED));
    }

    #[test]
    fn compositing_twice_is_idempotent() {
        let mut once = compositor(Box::new(UnavailableKernel), Orientation::BottomUp);
        once.update(&raw_red_tile()).unwrap();

        let mut twice = compositor(Box::new(UnavailableKernel), Orientation::BottomUp);
        twice.update(&raw_red_tile()).unwrap();
        twice.update(&raw_red_tile()).unwrap();

        assert_eq!(once.framebuffer().as_bytes(), twice.framebuffer().as_bytes());
    }

    #[test]
    fn compressed_tile_uses_dest_rect() {
        let blue = [0x00, 0x00, 0xFF, 0xFF];
        let mut comp = compositor(Box::new(FillKernel(blue)), Orientation::BottomUp);
        let tile = Tile {
            dest_left: 0,
            dest_top: 0,
            dest_right: 4,
            dest_bottom: 2,
            width: 64,
            height: 64,
            bits_per_pixel: 16,
            is_compressed: true,
            data: vec![0; 12],
        };
        let damage = comp.update(&tile).unwrap();
        assert_eq!((damage.width, damage.height), (5, 3));
        assert_block(comp.framebuffer(), 0, 0, 5, 3, blue);
    }

    #[test]
    fn later_tiles_overwrite_earlier() {
        let green = [0x00, 0xFF, 0x00, 0xFF];
        let mut comp = compositor(Box::new(FillKernel(green)), Orientation::TopDown);
        comp.update(&raw_red_tile()).unwrap();

        let overlap = Tile {
            dest_left: 15,
            dest_top: 15,
            dest_right: 24,
            dest_bottom: 24,
            width: 10,
            height: 10,
            bits_per_pixel: 32,
            is_compressed: true,
            data: vec![0; 4],
        };
        comp.update(&overlap).unwrap();

        let fb = comp.framebuffer();
        assert_eq!(fb.pixel(12, 12), Some(RED));
        assert_eq!(fb.pixel(15, 15), Some(green));
        assert_eq!(fb.pixel(24, 24), Some(green));
    }

    #[test]
    fn out_of_bounds_tile_dropped() {
        let mut comp = compositor(Box::new(UnavailableKernel), Orientation::BottomUp);
        let mut tile = raw_red_tile();
        tile.dest_left = 60;
        let err = comp.update(&tile).unwrap_err();
        assert!(matches!(err, CompositorError::OutOfBounds { .. }));
        assert!(comp.framebuffer().as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn compressed_out_of_bounds_skips_decode() {
        let mut comp = compositor(Box::new(UnavailableKernel), Orientation::BottomUp);
        let tile = Tile {
            dest_left: 60,
            dest_top: 0,
            dest_right: 69,
            dest_bottom: 9,
            width: 10,
            height: 10,
            bits_per_pixel: 16,
            is_compressed: true,
            data: vec![0; 4],
        };
        // Would be KernelUnavailable if the codec had been reached.
        assert!(matches!(
            comp.update(&tile),
            Err(CompositorError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn short_raw_tile_rejected() {
        let mut comp = compositor(Box::new(UnavailableKernel), Orientation::BottomUp);
        let mut tile = raw_red_tile();
        tile.data.truncate(399);
        assert_eq!(
            comp.update(&tile),
            Err(CompositorError::LengthMismatch { expected: 400, actual: 399 })
        );
    }

    #[test]
    fn raw_tile_with_bad_depth() {
        let mut comp = compositor(Box::new(UnavailableKernel), Orientation::BottomUp);
        let mut tile = raw_red_tile();
        tile.bits_per_pixel = 8;
        assert_eq!(
            comp.update(&tile),
            Err(CompositorError::Codec(CodecError::UnsupportedDepth(8)))
        );
    }
}
