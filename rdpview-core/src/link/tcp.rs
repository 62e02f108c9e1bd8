//! Stream-backed [`SessionLink`] using [`ViewerCodec`] framing.

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::info;

use super::codec::ViewerCodec;
use super::{Inbound, Outbound, SessionLink};
use crate::error::LinkError;

/// A link over any byte stream.
pub struct FramedLink<T> {
    framed: Framed<T, ViewerCodec>,
}

/// A link over TCP to the gateway.
pub type TcpLink = FramedLink<TcpStream>;

impl<T> FramedLink<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: T) -> Self {
        Self {
            framed: Framed::new(stream, ViewerCodec::new()),
        }
    }
}

impl TcpLink {
    /// Connect to the gateway at `addr`, giving up after `timeout`.
    pub async fn connect(addr: &str, timeout: Duration) -> Result<Self, LinkError> {
        info!("connecting to gateway at {addr}");
        let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| {
                LinkError::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("gateway connect timed out after {timeout:?}"),
                ))
            })??;
        stream.set_nodelay(true)?;
        Ok(Self::new(stream))
    }
}

#[async_trait]
impl<T> SessionLink for FramedLink<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, frame: Outbound) -> Result<(), LinkError> {
        self.framed.send(frame).await
    }

    async fn recv(&mut self) -> Option<Result<Inbound, LinkError>> {
        self.framed.next().await
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::WireMessage;
    use crate::link::GatewayCodec;
    use bytes::BytesMut;
    use tokio_util::codec::Encoder;

    fn encoded(frames: Vec<Inbound>) -> Vec<u8> {
        let mut buf = BytesMut::new();
        let mut codec = GatewayCodec::new();
        for frame in frames {
            codec.encode(frame, &mut buf).unwrap();
        }
        buf.to_vec()
    }

    fn encoded_outbound(frame: Outbound) -> Vec<u8> {
        let mut buf = BytesMut::new();
        ViewerCodec::new().encode(frame, &mut buf).unwrap();
        buf.to_vec()
    }

    #[tokio::test]
    async fn reads_frames_from_stream() {
        let mock = tokio_test::io::Builder::new()
            .read(&encoded(vec![Inbound::Established, Inbound::Close]))
            .build();
        let mut link = FramedLink::new(mock);

        assert!(matches!(link.recv().await, Some(Ok(Inbound::Established))));
        assert!(matches!(link.recv().await, Some(Ok(Inbound::Close))));
        assert!(link.recv().await.is_none());
    }

    #[tokio::test]
    async fn writes_length_prefixed_frames() {
        let frame = Outbound::Input(WireMessage::Wheel {
            x: 3,
            y: 4,
            step: 30,
            positive: true,
            horizontal: false,
        });
        let mock = tokio_test::io::Builder::new()
            .write(&encoded_outbound(frame.clone()))
            .build();
        let mut link = FramedLink::new(mock);

        link.send(frame).await.unwrap();
    }
}
