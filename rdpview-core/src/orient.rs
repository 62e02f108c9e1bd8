//! Scanline orientation for uncompressed tiles.
//!
//! Raw bitmap rows arrive bottom-up; the framebuffer is top-down. The
//! orienter copies the rows into a fresh RGBA buffer in display order,
//! expanding 15/16/24-bit samples on the way. Which order the wire uses
//! is configurable so it can be checked against captured tiles.

use serde::{Deserialize, Serialize};

use crate::tile::{BitDepth, DecodedTile, Tile};

// ── Orientation ──────────────────────────────────────────────────

/// Row order of uncompressed tiles as delivered on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// First row on the wire is the bottom row on screen (flip).
    #[default]
    BottomUp,
    /// Rows are already in display order (copy as-is).
    TopDown,
}

// ── ScanlineOrienter ─────────────────────────────────────────────

/// Produces display-ordered RGBA tiles from raw scanlines.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanlineOrienter {
    orientation: Orientation,
}

impl ScanlineOrienter {
    pub fn new(orientation: Orientation) -> Self {
        Self { orientation }
    }

    /// Reorder an uncompressed tile into a new, independently owned
    /// [`DecodedTile`] of `width x height` RGBA pixels.
    ///
    /// The caller guarantees `tile.data.len() == width * height * bpp`.
    pub fn reorient(&self, tile: &Tile, depth: BitDepth) -> DecodedTile {
        let width = tile.width as usize;
        let height = tile.height as usize;
        let src_stride = width * depth.bytes_per_pixel();
        let mut data = Vec::with_capacity(width * height * 4);

        for y in 0..height {
            let src_y = match self.orientation {
                Orientation::BottomUp => height - 1 - y,
                Orientation::TopDown => y,
            };
            let row = &tile.data[src_y * src_stride..(src_y + 1) * src_stride];
            expand_row(depth, row, &mut data);
        }

        DecodedTile {
            width: tile.width,
            height: tile.height,
            data,
        }
    }
}

// ── Pixel expansion ──────────────────────────────────────────────

/// Append one source row to `out` as RGBA.
fn expand_row(depth: BitDepth, row: &[u8], out: &mut Vec<u8>) {
    match depth {
        BitDepth::Bpp32 => out.extend_from_slice(row),
        BitDepth::Bpp24 => {
            for px in row.chunks_exact(3) {
                out.extend_from_slice(&[px[2], px[1], px[0], 0xFF]);
            }
        }
        BitDepth::Bpp16 => {
            for px in row.chunks_exact(2) {
                let v = u16::from_le_bytes([px[0], px[1]]);
                let r = ((v >> 11) & 0x1F) as u8;
                let g = ((v >> 5) & 0x3F) as u8;
                let b = (v & 0x1F) as u8;
                out.extend_from_slice(&[
                    (r << 3) | (r >> 2),
                    (g << 2) | (g >> 4),
                    (b << 3) | (b >> 2),
                    0xFF,
                ]);
            }
        }
        BitDepth::Bpp15 => {
            for px in row.chunks_exact(2) {
                let v = u16::from_le_bytes([px[0], px[1]]);
                let r = ((v >> 10) & 0x1F) as u8;
                let g = ((v >> 5) & 0x1F) as u8;
                let b = (v & 0x1F) as u8;
                out.extend_from_slice(&[
                    (r << 3) | (r >> 2),
                    (g << 3) | (g >> 2),
                    (b << 3) | (b >> 2),
                    0xFF,
                ]);
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
