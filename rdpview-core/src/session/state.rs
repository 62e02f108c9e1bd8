//! Session lifecycle state machine.
//!
//! ```text
//!   Idle ──connect──► Connecting ──established──► Active ◄─┐
//!                          │                        │  └───┘ established (no-op)
//!                          │ close / error          │ close / error
//!                          ▼                        ▼
//!                   Closed │ Errored  ◄─────────────┘   (terminal)
//! ```
//!
//! Input is only forwarded while `Active`.

use crate::error::SessionError;

// ── SessionPhase ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No link yet.
    #[default]
    Idle,
    /// Connection request sent, waiting for `established`.
    Connecting,
    /// Remote session is up; input flows.
    Active,
    /// Closed by the remote side. Terminal.
    Closed,
    /// Failed. Terminal.
    Errored,
}

/// Outcome of feeding a notification to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The phase changed.
    Changed,
    /// Already in the target phase; nothing happened.
    Unchanged,
    /// The notification does not apply in the current phase.
    Ignored,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Active => write!(f, "Active"),
            Self::Closed => write!(f, "Closed"),
            Self::Errored => write!(f, "Errored"),
        }
    }
}

impl SessionPhase {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// `Closed` or `Errored`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Errored)
    }

    // ── Transitions ──────────────────────────────────────────────

    /// Transition to `Connecting`.
    ///
    /// Valid from: `Idle`. A session connects once.
    pub fn begin_connect(&mut self) -> Result<(), SessionError> {
        match self {
            Self::Idle => {
                *self = Self::Connecting;
                Ok(())
            }
            _ => Err(SessionError::InvalidTransition(
                "cannot connect: session already started",
            )),
        }
    }

    /// Handle an `established` notification.
    ///
    /// The gateway may announce the session twice; a repeat while
    /// `Active` is a no-op.
    pub fn establish(&mut self) -> Transition {
        match self {
            Self::Connecting => {
                *self = Self::Active;
                Transition::Changed
            }
            Self::Active => Transition::Unchanged,
            _ => Transition::Ignored,
        }
    }

    /// Handle a `close` notification.
    ///
    /// Valid from: `Connecting`, `Active`.
    pub fn close(&mut self) -> Transition {
        match self {
            Self::Connecting | Self::Active => {
                *self = Self::Closed;
                Transition::Changed
            }
            Self::Closed => Transition::Unchanged,
            _ => Transition::Ignored,
        }
    }

    /// Handle an `error` notification.
    ///
    /// Valid from: `Connecting`, `Active`.
    pub fn fail(&mut self) -> Transition {
        match self {
            Self::Connecting | Self::Active => {
                *self = Self::Errored;
                Transition::Changed
            }
            Self::Errored => Transition::Unchanged,
            _ => Transition::Ignored,
        }
    }
}

// ── Completion ───────────────────────────────────────────────────

/// Invoked once when the session ends: `None` on close, the error otherwise.
pub type CompletionCallback = Box<dyn FnOnce(Option<SessionError>) + Send>;

/// Holds the completion callback and guarantees it fires at most once.
#[derive(Default)]
pub struct Completion {
    callback: Option<CompletionCallback>,
    delivered: bool,
}

impl Completion {
    pub fn new(callback: CompletionCallback) -> Self {
        Self {
            callback: Some(callback),
            delivered: false,
        }
    }

    /// Deliver the outcome. Later calls are dropped.
    pub fn complete(&mut self, outcome: Option<SessionError>) {
        if self.delivered {
            return;
        }
        self.delivered = true;
        if let Some(callback) = self.callback.take() {
            callback(outcome);
        }
    }

    pub fn is_delivered(&self) -> bool {
        self.delivered
    }
}

// ── Tests ────────────────────────────────────────────────────────
