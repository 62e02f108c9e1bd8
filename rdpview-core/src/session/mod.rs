//! One viewer session: a link, a compositor and an input translator.
//!
//! A [`Session`] is built once per connection and processes gateway
//! frames and local input strictly one at a time on a single task.
//! Tiles are composited in arrival order; lifecycle frames drive the
//! [`SessionPhase`] machine; translated input goes back over the link.

pub mod state;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::compositor::FrameCompositor;
use crate::error::{LinkError, SessionError};
use crate::input::{InputEvent, InputTranslator};
use crate::link::{ConnectionRequest, Inbound, Outbound, SessionLink};
use crate::tile::{Damage, Tile};

pub use state::{Completion, CompletionCallback, SessionPhase, Transition};

// ── SessionStats ─────────────────────────────────────────────────

/// Counters exposed to the embedding application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub phase: SessionPhase,
    /// Tiles composited successfully.
    pub tiles_applied: u64,
    /// Tiles dropped because of codec or compositor errors.
    pub tiles_dropped: u64,
    /// Input messages sent to the gateway.
    pub messages_sent: u64,
}

/// What the caller should do with the raw event it passed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// A message was sent; suppress the platform's default handling.
    Consumed,
    /// Nothing was sent; let the platform handle the event.
    PassThrough,
}

enum Step {
    Link(Option<Result<Inbound, LinkError>>),
    Input(Option<InputEvent>),
}

// ── Session ──────────────────────────────────────────────────────

pub struct Session<L> {
    link: L,
    compositor: FrameCompositor,
    translator: InputTranslator,
    completion: Completion,
    stats: SessionStats,
    stats_tx: watch::Sender<SessionStats>,
    damage_tx: Option<mpsc::UnboundedSender<Damage>>,
}

impl<L: SessionLink> Session<L> {
    pub fn new(link: L, compositor: FrameCompositor, translator: InputTranslator) -> Self {
        let stats = SessionStats {
            phase: translator.phase(),
            ..Default::default()
        };
        let (stats_tx, _) = watch::channel(stats.clone());
        Self {
            link,
            compositor,
            translator,
            completion: Completion::default(),
            stats,
            stats_tx,
            damage_tx: None,
        }
    }

    /// Register the callback invoked once when the session closes or fails.
    pub fn on_complete(mut self, callback: CompletionCallback) -> Self {
        self.completion = Completion::new(callback);
        self
    }

    /// Receive the damage rectangle of every successful composite.
    pub fn with_damage_sink(mut self, sink: mpsc::UnboundedSender<Damage>) -> Self {
        self.damage_tx = Some(sink);
        self
    }

    /// A `watch::Receiver` that sees the latest [`SessionStats`].
    pub fn stats_receiver(&self) -> watch::Receiver<SessionStats> {
        self.stats_tx.subscribe()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn phase(&self) -> SessionPhase {
        self.translator.phase()
    }

    pub fn compositor(&self) -> &FrameCompositor {
        &self.compositor
    }

    /// Send the connection request and enter `Connecting`.
    pub async fn connect(&mut self, request: ConnectionRequest) -> Result<(), SessionError> {
        self.translator.phase_mut().begin_connect()?;
        self.publish();

        info!(
            "requesting session on {}:{} ({}x{})",
            request.target_host, request.target_port, request.screen_width, request.screen_height
        );
        if let Err(e) = self.link.send(Outbound::Connect(request)).await {
            error!("failed to send connection request: {e}");
            let cause = e.to_string();
            self.fail(e.into());
            self.publish();
            return Err(SessionError::ConnectFailed(cause));
        }
        Ok(())
    }

    /// Apply one frame received from the gateway.
    pub fn handle_inbound(&mut self, frame: Inbound) {
        match frame {
            Inbound::Established => match self.translator.on_established() {
                Transition::Changed => info!("session established"),
                Transition::Unchanged => debug!("duplicate established notification"),
                Transition::Ignored => {
                    warn!("established notification in phase {}", self.phase())
                }
            },
            Inbound::Bitmap(tile) => self.apply_tile(&tile),
            Inbound::Close => {
                if self.translator.phase_mut().close() == Transition::Changed {
                    info!("session closed");
                    self.completion.complete(None);
                }
            }
            Inbound::Error { code, message } => {
                error!("session error: {code} ({message})");
                self.fail(SessionError::Remote { code, message });
            }
        }
        self.publish();
    }

    /// Translate a local input event and forward it.
    pub async fn handle_input(&mut self, event: &InputEvent) -> Disposition {
        let Some(message) = self.translator.translate(event) else {
            return Disposition::PassThrough;
        };

        match self.link.send(Outbound::Input(message)).await {
            Ok(()) => {
                self.stats.messages_sent += 1;
            }
            Err(e) => {
                error!("failed to send input: {e}");
                self.fail(e.into());
            }
        }
        self.publish();
        Disposition::Consumed
    }

    /// Drive the session until the link ends.
    ///
    /// Frames that arrive after `close`/`error` are still composited.
    /// Returns the final statistics.
    pub async fn run(&mut self, mut input: mpsc::Receiver<InputEvent>) -> SessionStats {
        let mut input_open = true;

        loop {
            let step = tokio::select! {
                frame = self.link.recv() => Step::Link(frame),
                event = input.recv(), if input_open => Step::Input(event),
            };

            match step {
                Step::Link(Some(Ok(frame))) => self.handle_inbound(frame),
                Step::Link(Some(Err(e))) => {
                    error!("link error: {e}");
                    self.fail(e.into());
                    break;
                }
                Step::Link(None) => {
                    if !self.phase().is_terminal() {
                        self.fail(LinkError::Closed.into());
                    }
                    break;
                }
                Step::Input(Some(event)) => {
                    self.handle_input(&event).await;
                }
                Step::Input(None) => input_open = false,
            }
        }

        self.publish();
        info!(
            "session finished: {} tiles applied, {} dropped, {} input messages",
            self.stats.tiles_applied, self.stats.tiles_dropped, self.stats.messages_sent
        );
        self.stats.clone()
    }

    // ── Internal ─────────────────────────────────────────────────

    fn apply_tile(&mut self, tile: &Tile) {
        match self.compositor.update(tile) {
            Ok(damage) => {
                self.stats.tiles_applied += 1;
                if let Some(sink) = &self.damage_tx {
                    let _ = sink.send(damage);
                }
            }
            Err(e) => {
                self.stats.tiles_dropped += 1;
                warn!(
                    "dropping {}bpp tile at ({},{}): {e}",
                    tile.bits_per_pixel, tile.dest_left, tile.dest_top
                );
            }
        }
    }

    fn fail(&mut self, err: SessionError) {
        if self.translator.phase_mut().fail() == Transition::Changed {
            self.completion.complete(Some(err));
        }
    }

    fn publish(&mut self) {
        self.stats.phase = self.translator.phase();
        self.stats_tx.send_replace(self.stats.clone());
    }
}

// ── Tests ────────────────────────────────────────────────────────
