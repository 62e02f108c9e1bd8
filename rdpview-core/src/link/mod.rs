//! The bidirectional channel between the viewer and the RDP gateway.
//!
//! # Wire Protocol
//!
//! ```text
//! Viewer ──[Connect(ConnectionRequest)]──────► Gateway   (once)
//! Gateway ──[Established]────────────────────► Viewer    (may repeat)
//! Gateway ──[Bitmap(Tile)]───────────────────► Viewer    (repeated)
//! Viewer ──[Input(WireMessage)]──────────────► Gateway   (repeated)
//! Gateway ──[Close] | [Error{code,message}]──► Viewer    (terminal)
//! ```
//!
//! Frames are bincode payloads behind a u32 length prefix, see
//! [`LinkCodec`].

pub mod codec;
pub mod tcp;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::LinkError;
use crate::input::WireMessage;
use crate::tile::Tile;

pub use codec::{GatewayCodec, LinkCodec, MAX_FRAME_SIZE, ViewerCodec};
pub use tcp::{FramedLink, TcpLink};

/// Default RDP port of the target host.
pub const DEFAULT_RDP_PORT: u16 = 3389;

// ── Connection Request ───────────────────────────────────────────

/// Parameters of the remote session, sent once when connecting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRequest {
    pub target_host: String,
    pub target_port: u16,
    pub screen_width: u32,
    pub screen_height: u32,
    pub domain: String,
    pub username: String,
    pub password: String,
    pub locale: String,
}

impl ConnectionRequest {
    /// Request for `host` on the default port with an empty identity.
    pub fn new(target_host: impl Into<String>, screen_width: u32, screen_height: u32) -> Self {
        Self {
            target_host: target_host.into(),
            target_port: DEFAULT_RDP_PORT,
            screen_width,
            screen_height,
            domain: String::new(),
            username: String::new(),
            password: String::new(),
            locale: "en".into(),
        }
    }

    pub fn with_credentials(
        mut self,
        domain: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.domain = domain.into();
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.target_port = port;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }
}

// ── Frames ───────────────────────────────────────────────────────

/// Gateway → viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Inbound {
    /// The remote session is up.
    Established,
    /// A bitmap update.
    Bitmap(Tile),
    /// The remote session ended normally.
    Close,
    /// The remote session failed.
    Error { code: String, message: String },
}

/// Viewer → gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outbound {
    Connect(ConnectionRequest),
    Input(WireMessage),
}

// ── SessionLink ──────────────────────────────────────────────────

/// Transport carrying [`Outbound`] and [`Inbound`] frames.
#[async_trait]
pub trait SessionLink: Send {
    /// Deliver one frame to the gateway.
    async fn send(&mut self, frame: Outbound) -> Result<(), LinkError>;

    /// Next frame from the gateway; `None` once the link is gone.
    async fn recv(&mut self) -> Option<Result<Inbound, LinkError>>;
}

// ── ChannelLink ──────────────────────────────────────────────────

/// In-process link over a pair of mpsc channels.
pub struct ChannelLink {
    tx: mpsc::Sender<Outbound>,
    rx: mpsc::Receiver<Inbound>,
}

/// The gateway's half of a [`ChannelLink`].
pub struct ChannelPeer {
    pub tx: mpsc::Sender<Inbound>,
    pub rx: mpsc::Receiver<Outbound>,
}

impl ChannelLink {
    /// Create a connected viewer/gateway pair with `capacity` slots per direction.
    pub fn pair(capacity: usize) -> (ChannelLink, ChannelPeer) {
        let (out_tx, out_rx) = mpsc::channel(capacity);
        let (in_tx, in_rx) = mpsc::channel(capacity);
        (
            ChannelLink { tx: out_tx, rx: in_rx },
            ChannelPeer { tx: in_tx, rx: out_rx },
        )
    }
}

#[async_trait]
impl SessionLink for ChannelLink {
    async fn send(&mut self, frame: Outbound) -> Result<(), LinkError> {
        self.tx.send(frame).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<Inbound, LinkError>> {
        self.rx.recv().await.map(Ok)
    }
}

// ── Tests ────────────────────────────────────────────────────────
