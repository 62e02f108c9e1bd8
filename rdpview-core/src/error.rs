//! Domain-specific error types for the viewer pipeline.
//!
//! Tile-level failures ([`CodecError`], [`CompositorError`]) are local:
//! the offending tile is dropped and the session carries on. Session-level
//! failures ([`SessionError`]) are terminal and surface once through the
//! completion callback.

use thiserror::Error;

use crate::tile::BitDepth;

// ── CodecError ───────────────────────────────────────────────────

/// Failure to turn a compressed tile into RGBA pixels.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The tile's colour depth is not one of 15/16/24/32.
    #[error("unsupported bit depth: {0}")]
    UnsupportedDepth(u8),

    /// A destination or source dimension is zero.
    #[error("invalid tile dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The destination rectangle has right < left or bottom < top.
    #[error("inverted destination rect: ({left},{top})-({right},{bottom})")]
    InvertedRect {
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
    },

    /// A dimension exceeds the configured allocation guard.
    #[error("tile too large: {width}x{height} (max edge {max})")]
    TileTooLarge { width: u32, height: u32, max: u32 },

    /// The decode kernel rejected the compressed stream.
    #[error("malformed {depth} stream (kernel status {status})")]
    MalformedStream { depth: BitDepth, status: i32 },

    /// No decode kernel is linked into this build.
    #[error("no RLE decode kernel available")]
    KernelUnavailable,
}

// ── CompositorError ──────────────────────────────────────────────

/// Failure to apply a tile to the framebuffer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompositorError {
    /// The tile's footprint extends past the framebuffer.
    #[error(
        "tile {width}x{height} at ({x},{y}) exceeds framebuffer {fb_width}x{fb_height}"
    )]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        fb_width: u32,
        fb_height: u32,
    },

    /// An uncompressed tile carries the wrong number of bytes.
    #[error("raw tile length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// The codec failed to decode a compressed tile.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

// ── LinkError ────────────────────────────────────────────────────

/// Errors raised by a [`SessionLink`](crate::link::SessionLink).
#[derive(Debug, Error)]
pub enum LinkError {
    /// The TCP/IO layer reported an error.
    #[error("link i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame exceeded the codec limit.
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// Encoding or decoding of a frame payload failed.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The peer side of the link has gone away.
    #[error("link closed")]
    Closed,
}

impl From<Box<bincode::ErrorKind>> for LinkError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        LinkError::Encoding(e.to_string())
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for LinkError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        LinkError::Closed
    }
}

// ── SessionError ─────────────────────────────────────────────────

/// Terminal session failures.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The gateway reported an error for the remote session.
    #[error("remote error {code}: {message}")]
    Remote { code: String, message: String },

    /// A lifecycle call arrived in a phase that does not allow it.
    #[error("invalid session transition: {0}")]
    InvalidTransition(&'static str),

    /// The connection request could not be sent; carries the link error.
    #[error("connection request not delivered: {0}")]
    ConnectFailed(String),

    /// The link failed underneath the session.
    #[error("link error: {0}")]
    Link(#[from] LinkError),
}
