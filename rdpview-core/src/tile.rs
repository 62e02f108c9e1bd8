//! Tile types shared by the bitmap update pipeline.
//!
//! A [`Tile`] is the wire representation of a bitmap update as delivered
//! by the gateway. A [`DecodedTile`] is the RGBA result of either the
//! codec (compressed tiles) or the scanline orienter (raw tiles), ready
//! to be composited.

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

// ── BitDepth ─────────────────────────────────────────────────────

/// Colour depths a tile may be encoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitDepth {
    /// RGB555, 2 bytes per pixel.
    Bpp15,
    /// RGB565, 2 bytes per pixel.
    Bpp16,
    /// BGR, 3 bytes per pixel.
    Bpp24,
    /// 4 bytes per pixel.
    Bpp32,
}

impl BitDepth {
    /// Bytes a single source sample occupies on the wire.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            BitDepth::Bpp15 | BitDepth::Bpp16 => 2,
            BitDepth::Bpp24 => 3,
            BitDepth::Bpp32 => 4,
        }
    }

    /// The numeric depth as carried in the tile header.
    pub const fn bits(self) -> u8 {
        match self {
            BitDepth::Bpp15 => 15,
            BitDepth::Bpp16 => 16,
            BitDepth::Bpp24 => 24,
            BitDepth::Bpp32 => 32,
        }
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = CodecError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            15 => Ok(BitDepth::Bpp15),
            16 => Ok(BitDepth::Bpp16),
            24 => Ok(BitDepth::Bpp24),
            32 => Ok(BitDepth::Bpp32),
            other => Err(CodecError::UnsupportedDepth(other)),
        }
    }
}

impl std::fmt::Display for BitDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}bpp", self.bits())
    }
}

// ── Tile ─────────────────────────────────────────────────────────

/// A rectangular bitmap update received from the session link.
///
/// The destination bounds are inclusive. `width`/`height` describe the
/// source bitmap as encoded and may be larger than the destination
/// rectangle for compressed tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub dest_left: u32,
    pub dest_top: u32,
    pub dest_right: u32,
    pub dest_bottom: u32,
    /// Source width in pixels.
    pub width: u32,
    /// Source height in pixels.
    pub height: u32,
    /// Raw depth from the wire; validated by the codec.
    pub bits_per_pixel: u8,
    pub is_compressed: bool,
    /// RLE stream when compressed, raw scanlines otherwise.
    pub data: Vec<u8>,
}

impl Tile {
    /// Width of the inclusive destination rectangle.
    ///
    /// Returns `None` when `dest_right < dest_left`.
    pub fn dest_width(&self) -> Option<u32> {
        self.dest_right
            .checked_sub(self.dest_left)
            .and_then(|d| d.checked_add(1))
    }

    /// Height of the inclusive destination rectangle.
    ///
    /// Returns `None` when `dest_bottom < dest_top`.
    pub fn dest_height(&self) -> Option<u32> {
        self.dest_bottom
            .checked_sub(self.dest_top)
            .and_then(|d| d.checked_add(1))
    }

    /// Byte length an uncompressed tile of this depth must carry.
    pub fn expected_raw_len(&self, depth: BitDepth) -> usize {
        self.width as usize * self.height as usize * depth.bytes_per_pixel()
    }
}

// ── DecodedTile ──────────────────────────────────────────────────

/// An RGBA tile (8 bits per channel) ready for compositing.
///
/// `data` always holds exactly `width * height * 4` bytes and owns its
/// storage independently of the tile it was produced from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTile {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl DecodedTile {
    /// Bytes in one RGBA row.
    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }

    /// Returns the RGBA row at `y`.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride();
        &self.data[start..start + self.stride()]
    }
}

// ── Damage ───────────────────────────────────────────────────────

/// The framebuffer region touched by a composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Damage {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

// ── Tests ────────────────────────────────────────────────────────
