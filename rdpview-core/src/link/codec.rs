//! Length-prefixed bincode framing for link frames.
//!
//! ```text
//! length:   u32 LE  (4)
//! payload:  [u8]    (length bytes, bincode)
//! ```
//!
//! The same codec serves both ends: [`ViewerCodec`] decodes
//! [`Inbound`] and encodes [`Outbound`]; [`GatewayCodec`] is the mirror.

use std::marker::PhantomData;

use bytes::{Buf, BufMut, BytesMut};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::codec::{Decoder, Encoder};

use super::{Inbound, Outbound};
use crate::error::LinkError;

/// Largest payload accepted in either direction.
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

const LENGTH_PREFIX: usize = 4;

/// Decodes `D` frames and encodes `E` frames.
#[derive(Debug)]
pub struct LinkCodec<D, E> {
    max_frame: usize,
    _frames: PhantomData<fn(E) -> D>,
}

/// Viewer side: reads gateway frames, writes viewer frames.
pub type ViewerCodec = LinkCodec<Inbound, Outbound>;

/// Gateway side: reads viewer frames, writes gateway frames.
pub type GatewayCodec = LinkCodec<Outbound, Inbound>;

impl<D, E> LinkCodec<D, E> {
    pub fn new() -> Self {
        Self::with_max_frame(MAX_FRAME_SIZE)
    }

    pub fn with_max_frame(max_frame: usize) -> Self {
        Self {
            max_frame,
            _frames: PhantomData,
        }
    }
}

impl<D, E> Default for LinkCodec<D, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: DeserializeOwned, E> Decoder for LinkCodec<D, E> {
    type Item = D;
    type Error = LinkError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < LENGTH_PREFIX {
            return Ok(None);
        }

        let mut prefix = [0u8; LENGTH_PREFIX];
        prefix.copy_from_slice(&src[..LENGTH_PREFIX]);
        let len = u32::from_le_bytes(prefix) as usize;

        if len > self.max_frame {
            return Err(LinkError::FrameTooLarge {
                size: len,
                max: self.max_frame,
            });
        }

        if src.len() < LENGTH_PREFIX + len {
            src.reserve(LENGTH_PREFIX + len - src.len());
            return Ok(None);
        }

        src.advance(LENGTH_PREFIX);
        let payload = src.split_to(len);
        let frame = bincode::deserialize(&payload)?;
        Ok(Some(frame))
    }
}

impl<D, E: Serialize> Encoder<E> for LinkCodec<D, E> {
    type Error = LinkError;

    fn encode(&mut self, item: E, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload = bincode::serialize(&item)?;
        if payload.len() > self.max_frame {
            return Err(LinkError::FrameTooLarge {
                size: payload.len(),
                max: self.max_frame,
            });
        }

        dst.reserve(LENGTH_PREFIX + payload.len());
        dst.put_u32_le(payload.len() as u32);
        dst.extend_from_slice(&payload);
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────
