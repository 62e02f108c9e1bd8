//! Compressed tile decoding.
//!
//! [`PixelCodec`] validates a compressed [`Tile`], sizes the output
//! buffer from the destination rectangle and hands both buffers to a
//! [`DecodeKernel`]. The kernel itself (the RLE decompressor) is a black
//! box: anything implementing the trait can be plugged in.
//!
//! ```text
//! Tile ──► depth dispatch ──► size guard ──► kernel(out, in) ──► DecodedTile
//!          (15/16/24/32)      (>0, ≤ max)     (RGBA output)
//! ```

#[cfg(feature = "native-kernel")]
pub mod native;

use tracing::debug;

use crate::error::CodecError;
use crate::tile::{BitDepth, DecodedTile, Tile};

/// Default upper bound for any tile edge, in pixels.
pub const DEFAULT_MAX_TILE_EDGE: u32 = 4096;

/// Hard ceiling for the configurable edge bound (256 MiB of RGBA output).
pub const MAX_TILE_EDGE_CEILING: u32 = 8192;

// ── Kernel contract ──────────────────────────────────────────────

/// Buffers and dimensions handed to a decode kernel for one tile.
///
/// `output` is exactly `out_width * out_height * 4` bytes; the kernel
/// writes RGBA samples into it, expanding 15/16/24-bit input as needed.
pub struct KernelJob<'a> {
    pub output: &'a mut [u8],
    pub out_width: u32,
    pub out_height: u32,
    pub src_width: u32,
    pub src_height: u32,
    pub input: &'a [u8],
}

/// Why a kernel refused a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelFault {
    /// The kernel returned a failure status for the input stream.
    Status(i32),
    /// No kernel is present in this build.
    Unavailable,
}

/// A run-length decoder for one tile at a time.
///
/// Implementations must not read outside `job.input` or write outside
/// `job.output`.
pub trait DecodeKernel: Send + Sync {
    fn decompress(&self, depth: BitDepth, job: KernelJob<'_>) -> Result<(), KernelFault>;
}

/// Kernel used when no native decoder is linked in.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableKernel;

impl DecodeKernel for UnavailableKernel {
    fn decompress(&self, _depth: BitDepth, _job: KernelJob<'_>) -> Result<(), KernelFault> {
        Err(KernelFault::Unavailable)
    }
}

/// The kernel this build ships with: the native RLE decoder when the
/// `native-kernel` feature is enabled, [`UnavailableKernel`] otherwise.
pub fn default_kernel() -> Box<dyn DecodeKernel> {
    #[cfg(feature = "native-kernel")]
    {
        Box::new(native::NativeKernel)
    }
    #[cfg(not(feature = "native-kernel"))]
    {
        Box::new(UnavailableKernel)
    }
}

// ── PixelCodec ───────────────────────────────────────────────────

/// Decodes compressed tiles to RGBA through a pluggable kernel.
pub struct PixelCodec {
    kernel: Box<dyn DecodeKernel>,
    max_edge: u32,
}

impl PixelCodec {
    /// Create a codec with the default allocation guard.
    pub fn new(kernel: Box<dyn DecodeKernel>) -> Self {
        Self {
            kernel,
            max_edge: DEFAULT_MAX_TILE_EDGE,
        }
    }

    /// Set the largest edge (source or output) a tile may declare,
    /// clamped to `1..=MAX_TILE_EDGE_CEILING`.
    pub fn with_max_edge(mut self, max_edge: u32) -> Self {
        self.max_edge = max_edge.clamp(1, MAX_TILE_EDGE_CEILING);
        self
    }

    /// Decode a compressed tile.
    ///
    /// The output covers the destination rectangle, not the source
    /// bitmap: `(dest_right - dest_left + 1) x (dest_bottom - dest_top + 1)`.
    /// Nothing is allocated until the depth and both rectangles have been
    /// validated.
    pub fn decode(&self, tile: &Tile) -> Result<DecodedTile, CodecError> {
        let depth = BitDepth::try_from(tile.bits_per_pixel)?;

        let (out_width, out_height) = match (tile.dest_width(), tile.dest_height()) {
            (Some(w), Some(h)) => (w, h),
            _ => {
                return Err(CodecError::InvertedRect {
                    left: tile.dest_left,
                    top: tile.dest_top,
                    right: tile.dest_right,
                    bottom: tile.dest_bottom,
                });
            }
        };
        self.check_dimensions(out_width, out_height)?;
        self.check_dimensions(tile.width, tile.height)?;

        let len = rgba_len(out_width, out_height).ok_or(CodecError::TileTooLarge {
            width: out_width,
            height: out_height,
            max: self.max_edge,
        })?;
        let mut output = vec![0u8; len];
        let job = KernelJob {
            output: &mut output,
            out_width,
            out_height,
            src_width: tile.width,
            src_height: tile.height,
            input: &tile.data,
        };

        self.kernel.decompress(depth, job).map_err(|fault| match fault {
            KernelFault::Status(status) => CodecError::MalformedStream { depth, status },
            KernelFault::Unavailable => CodecError::KernelUnavailable,
        })?;

        debug!(
            "decoded {depth} tile {}x{} -> {out_width}x{out_height}",
            tile.width, tile.height
        );

        Ok(DecodedTile {
            width: out_width,
            height: out_height,
            data: output,
        })
    }

    fn check_dimensions(&self, width: u32, height: u32) -> Result<(), CodecError> {
        if width == 0 || height == 0 {
            return Err(CodecError::InvalidDimensions { width, height });
        }
        if width > self.max_edge || height > self.max_edge {
            return Err(CodecError::TileTooLarge {
                width,
                height,
                max: self.max_edge,
            });
        }
        Ok(())
    }
}

/// Bytes of RGBA output for a `width x height` block, if it fits in `usize`.
pub(crate) fn rgba_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(4))
}

impl Default for PixelCodec {
    fn default() -> Self {
        Self::new(default_kernel())
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every call and fills the output with the depth's bit count.
    #[derive(Default, Clone)]
    struct RecordingKernel {
        calls: Arc<Mutex<Vec<(BitDepth, u32, u32, u32, u32, usize)>>>,
    }

    impl DecodeKernel for RecordingKernel {
        fn decompress(&self, depth: BitDepth, job: KernelJob<'_>) -> Result<(), KernelFault> {
            self.calls.lock().unwrap().push((
                depth,
                job.out_width,
                job.out_height,
                job.src_width,
                job.src_height,
                job.output.len(),
            ));
            job.output.fill(depth.bits());
            Ok(())
        }
    }

    struct FailingKernel;

    impl DecodeKernel for FailingKernel {
        fn decompress(&self, _depth: BitDepth, _job: KernelJob<'_>) -> Result<(), KernelFault> {
            Err(KernelFault::Status(0))
        }
    }

    fn compressed(bpp: u8, left: u32, top: u32, right: u32, bottom: u32) -> Tile {
        Tile {
            dest_left: left,
            dest_top: top,
            dest_right: right,
            dest_bottom: bottom,
            width: 64,
            height: 64,
            bits_per_pixel: bpp,
            is_compressed: true,
            data: vec![0xAA; 32],
        }
    }

    #[test]
    fn dispatches_on_depth() {
        let kernel = RecordingKernel::default();
        let codec = PixelCodec::new(Box::new(kernel.clone()));

        for (bpp, depth) in [
            (15, BitDepth::Bpp15),
            (16, BitDepth::Bpp16),
            (24, BitDepth::Bpp24),
            (32, BitDepth::Bpp32),
        ] {
            let out = codec.decode(&compressed(bpp, 0, 0, 63, 63)).unwrap();
            assert!(out.data.iter().all(|&b| b == bpp));
            assert_eq!(kernel.calls.lock().unwrap().last().unwrap().0, depth);
        }
        assert_eq!(kernel.calls.lock().unwrap().len(), 4);
    }

    #[test]
    fn unsupported_depth_never_reaches_kernel() {
        let kernel = RecordingKernel::default();
        let codec = PixelCodec::new(Box::new(kernel.clone()));

        for bpp in [0, 1, 8, 17, 31, 33, 255] {
            assert_eq!(
                codec.decode(&compressed(bpp, 0, 0, 7, 7)),
                Err(CodecError::UnsupportedDepth(bpp))
            );
        }
        assert!(kernel.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn output_sized_from_destination_rect() {
        let kernel = RecordingKernel::default();
        let codec = PixelCodec::new(Box::new(kernel.clone()));

        // 64x64 source, only 50x30 lands on screen.
        let out = codec.decode(&compressed(16, 100, 200, 149, 229)).unwrap();
        assert_eq!((out.width, out.height), (50, 30));
        assert_eq!(out.data.len(), 50 * 30 * 4);

        let call = kernel.calls.lock().unwrap()[0];
        assert_eq!(call, (BitDepth::Bpp16, 50, 30, 64, 64, 50 * 30 * 4));
    }

    #[test]
    fn single_pixel_rect() {
        let codec = PixelCodec::new(Box::new(RecordingKernel::default()));
        let out = codec.decode(&compressed(32, 5, 5, 5, 5)).unwrap();
        assert_eq!(out.data.len(), 4);
    }

    #[test]
    fn inverted_rect_rejected() {
        let kernel = RecordingKernel::default();
        let codec = PixelCodec::new(Box::new(kernel.clone()));
        assert_eq!(
            codec.decode(&compressed(16, 10, 0, 9, 0)),
            Err(CodecError::InvertedRect { left: 10, top: 0, right: 9, bottom: 0 })
        );
        assert!(kernel.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn zero_source_dimension_rejected() {
        let codec = PixelCodec::new(Box::new(RecordingKernel::default()));
        let mut tile = compressed(16, 0, 0, 7, 7);
        tile.height = 0;
        assert_eq!(
            codec.decode(&tile),
            Err(CodecError::InvalidDimensions { width: 64, height: 0 })
        );
    }

    #[test]
    fn oversized_rect_rejected_before_allocation() {
        let kernel = RecordingKernel::default();
        let codec = PixelCodec::new(Box::new(kernel.clone())).with_max_edge(256);
        let err = codec.decode(&compressed(16, 0, 0, u32::MAX - 1, 10)).unwrap_err();
        assert!(matches!(err, CodecError::TileTooLarge { max: 256, .. }));
        assert!(kernel.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn edge_bound_has_a_ceiling() {
        let kernel = RecordingKernel::default();
        let codec = PixelCodec::new(Box::new(kernel.clone())).with_max_edge(u32::MAX);

        let err = codec
            .decode(&compressed(32, 0, 0, u32::MAX - 1, u32::MAX - 1))
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::TileTooLarge {
                width: u32::MAX,
                height: u32::MAX,
                max: MAX_TILE_EDGE_CEILING
            }
        );
        assert!(kernel.calls.lock().unwrap().is_empty());

        let err = PixelCodec::new(Box::new(UnavailableKernel))
            .with_max_edge(0)
            .decode(&compressed(32, 0, 0, 1, 1))
            .unwrap_err();
        assert!(matches!(err, CodecError::TileTooLarge { max: 1, .. }));
    }

    #[test]
    fn rgba_len_reports_overflow() {
        assert_eq!(rgba_len(50, 30), Some(50 * 30 * 4));
        assert_eq!(rgba_len(0, 7), Some(0));
        assert_eq!(rgba_len(u32::MAX, u32::MAX), None);
    }

    #[test]
    fn kernel_failure_is_malformed_stream() {
        let codec = PixelCodec::new(Box::new(FailingKernel));
        assert_eq!(
            codec.decode(&compressed(24, 0, 0, 3, 3)),
            Err(CodecError::MalformedStream {
                depth: BitDepth::Bpp24,
                status: 0
            })
        );
    }

    #[test]
    fn missing_kernel_reported() {
        let codec = PixelCodec::new(Box::new(UnavailableKernel));
        assert_eq!(
            codec.decode(&compressed(16, 0, 0, 3, 3)),
            Err(CodecError::KernelUnavailable)
        );
    }
}
