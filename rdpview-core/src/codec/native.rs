//! Binding to the native RLE decoder (`librle`).
//!
//! The library exports one entry point per colour depth, each writing
//! RGBA into a caller-allocated output buffer and returning non-zero on
//! success. Link it by putting `librle` on the linker search path, e.g.
//! `RUSTFLAGS="-L /path/to/lib"`.

use std::ffi::c_int;

use super::{DecodeKernel, KernelFault, KernelJob, rgba_len};
use crate::tile::BitDepth;

type RawDecompress = unsafe extern "C" fn(
    output: *mut u8,
    output_width: c_int,
    output_height: c_int,
    input_width: c_int,
    input_height: c_int,
    input: *const u8,
    size: c_int,
) -> c_int;

#[link(name = "rle")]
unsafe extern "C" {
    fn bitmap_decompress_15(
        output: *mut u8,
        output_width: c_int,
        output_height: c_int,
        input_width: c_int,
        input_height: c_int,
        input: *const u8,
        size: c_int,
    ) -> c_int;
    fn bitmap_decompress_16(
        output: *mut u8,
        output_width: c_int,
        output_height: c_int,
        input_width: c_int,
        input_height: c_int,
        input: *const u8,
        size: c_int,
    ) -> c_int;
    fn bitmap_decompress_24(
        output: *mut u8,
        output_width: c_int,
        output_height: c_int,
        input_width: c_int,
        input_height: c_int,
        input: *const u8,
        size: c_int,
    ) -> c_int;
    fn bitmap_decompress_32(
        output: *mut u8,
        output_width: c_int,
        output_height: c_int,
        input_width: c_int,
        input_height: c_int,
        input: *const u8,
        size: c_int,
    ) -> c_int;
}

/// Entry point for each depth.
const DISPATCH: [(BitDepth, RawDecompress); 4] = [
    (BitDepth::Bpp15, bitmap_decompress_15),
    (BitDepth::Bpp16, bitmap_decompress_16),
    (BitDepth::Bpp24, bitmap_decompress_24),
    (BitDepth::Bpp32, bitmap_decompress_32),
];

/// [`DecodeKernel`] backed by `librle`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeKernel;

impl DecodeKernel for NativeKernel {
    fn decompress(&self, depth: BitDepth, job: KernelJob<'_>) -> Result<(), KernelFault> {
        let entry = DISPATCH
            .iter()
            .find(|(d, _)| *d == depth)
            .map(|(_, f)| *f)
            .ok_or(KernelFault::Unavailable)?;

        let expected = rgba_len(job.out_width, job.out_height).ok_or(KernelFault::Status(-1))?;
        if job.output.len() != expected {
            return Err(KernelFault::Status(-1));
        }
        let as_int = |v: u32| c_int::try_from(v).map_err(|_| KernelFault::Status(-1));
        let size = c_int::try_from(job.input.len()).map_err(|_| KernelFault::Status(-1))?;

        // SAFETY: `output` holds exactly out_width*out_height*4 bytes and
        // `input` is `size` bytes; the kernel stays within both.
        let status = unsafe {
            entry(
                job.output.as_mut_ptr(),
                as_int(job.out_width)?,
                as_int(job.out_height)?,
                as_int(job.src_width)?,
                as_int(job.src_height)?,
                job.input.as_ptr(),
                size,
            )
        };

        if status == 0 {
            Err(KernelFault::Status(status))
        } else {
            Ok(())
        }
    }
}
