//! The persistent RGBA surface mirroring the remote screen.

use crate::error::CompositorError;
use crate::tile::{Damage, DecodedTile};

/// Top-down RGBA pixel surface, `width * height * 4` bytes.
///
/// Only [`FrameCompositor`](crate::compositor::FrameCompositor) writes to
/// it; everyone else gets read access through the compositor.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Framebuffer {
    /// Allocate a surface filled with transparent black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The RGBA value at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let off = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[off],
            self.data[off + 1],
            self.data[off + 2],
            self.data[off + 3],
        ])
    }

    /// Check that a `width x height` block at `(x, y)` fits entirely.
    pub fn check_bounds(&self, x: u32, y: u32, width: u32, height: u32) -> Result<(), CompositorError> {
        let fits_x = x.checked_add(width).is_some_and(|r| r <= self.width);
        let fits_y = y.checked_add(height).is_some_and(|b| b <= self.height);
        if fits_x && fits_y {
            Ok(())
        } else {
            Err(CompositorError::OutOfBounds {
                x,
                y,
                width,
                height,
                fb_width: self.width,
                fb_height: self.height,
            })
        }
    }

    /// Overwrite the block at `(x, y)` with `tile`. No blending.
    pub(crate) fn blit(&mut self, x: u32, y: u32, tile: &DecodedTile) -> Result<Damage, CompositorError> {
        self.check_bounds(x, y, tile.width, tile.height)?;

        let row_stride = self.width as usize * 4;
        let tile_stride = tile.stride();
        let dst_x = x as usize * 4;

        for row in 0..tile.height as usize {
            let dst_start = (y as usize + row) * row_stride + dst_x;
            let src_start = row * tile_stride;
            self.data[dst_start..dst_start + tile_stride]
                .copy_from_slice(&tile.data[src_start..src_start + tile_stride]);
        }

        Ok(Damage {
            x,
            y,
            width: tile.width,
            height: tile.height,
        })
    }
}
