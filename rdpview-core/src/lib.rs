//! # rdpview-core
//!
//! Presentation layer of a remote desktop viewer: bitmap updates in,
//! input messages out.
//!
//! This crate contains:
//! - **Tiles**: `Tile`, `DecodedTile`, `BitDepth`, `Damage`
//! - **Codec**: `PixelCodec` dispatching compressed tiles to a `DecodeKernel`
//! - **Orientation**: `ScanlineOrienter` for raw, bottom-up scanlines
//! - **Compositing**: `Framebuffer` and its single writer `FrameCompositor`
//! - **Input**: `InputTranslator` mapping pointer/keyboard events to `WireMessage`s
//! - **Link**: `SessionLink` contract, `LinkCodec` framing, TCP and channel links
//! - **Session**: `Session` tying one link, compositor and translator together
//! - **Error**: `thiserror`-based `CodecError`, `CompositorError`, `LinkError`, `SessionError`
//!
//! ```text
//! Inbound tile ──► PixelCodec | ScanlineOrienter ──► FrameCompositor ──► Framebuffer
//! Raw input ─────► InputTranslator ──► SessionLink
//! ```

pub mod codec;
pub mod compositor;
pub mod error;
pub mod framebuffer;
pub mod input;
pub mod link;
pub mod orient;
pub mod session;
pub mod tile;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use codec::{DecodeKernel, KernelFault, KernelJob, PixelCodec, UnavailableKernel};
pub use compositor::FrameCompositor;
pub use error::{CodecError, CompositorError, LinkError, SessionError};
pub use framebuffer::Framebuffer;
pub use input::{
    FixedOrigin, InputEvent, InputTranslator, RawScancodes, ScancodeMapper, SurfaceGeometry,
    WheelDelta, WireMessage,
};
pub use link::{ChannelLink, ConnectionRequest, Inbound, Outbound, SessionLink, TcpLink};
pub use orient::{Orientation, ScanlineOrienter};
pub use session::{Disposition, Session, SessionPhase, SessionStats};
pub use tile::{BitDepth, Damage, DecodedTile, Tile};
