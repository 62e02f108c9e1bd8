//! Local input capture → wire message translation.
//!
//! Raw pointer and keyboard events from the display layer are mapped to
//! the three outbound message kinds the gateway understands (`mouse`,
//! `wheel`, `scancode`). Nothing is produced unless the session is
//! [`Active`](SessionPhase::Active).

use serde::{Deserialize, Serialize};

use crate::session::state::{SessionPhase, Transition};

// ── Raw input ────────────────────────────────────────────────────

/// Wheel movement as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelDelta {
    /// Line-based wheel (vertical only).
    Discrete(f64),
    /// Two-axis wheel/trackpad deltas.
    Pixels { dx: f64, dy: f64 },
}

/// A raw event in local client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMove { x: i32, y: i32 },
    /// `button` uses platform numbering: 0 primary, 1 middle, 2 secondary.
    PointerButton { x: i32, y: i32, button: u8, pressed: bool },
    Wheel { x: i32, y: i32, delta: WheelDelta },
    /// `code` is the platform key code, mapped through a [`ScancodeMapper`].
    Key { code: u32, pressed: bool },
}

// ── Wire messages ────────────────────────────────────────────────

/// Outbound input message in remote framebuffer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireMessage {
    /// `button`: 0 none/other, 1 left, 2 right.
    Mouse { x: i32, y: i32, button: u8, pressed: bool },
    Wheel { x: i32, y: i32, step: u32, positive: bool, horizontal: bool },
    Scancode { code: u16, pressed: bool },
}

/// Remote button codes.
pub mod button_codes {
    pub const NONE: u8 = 0;
    pub const LEFT: u8 = 1;
    pub const RIGHT: u8 = 2;
}

/// Map a platform button number to its remote code.
pub const fn translate_button(button: u8) -> u8 {
    match button {
        0 => button_codes::LEFT,
        2 => button_codes::RIGHT,
        _ => button_codes::NONE,
    }
}

/// Remote wheel step for a raw delta: `round(|delta| * 15 / 8)`.
pub fn wheel_step(delta: f64) -> u32 {
    (delta.abs() * 15.0 / 8.0).round() as u32
}

// ── Collaborators ────────────────────────────────────────────────

/// Where the rendering surface currently sits in client coordinates.
///
/// Queried on every event; the surface may move between events.
pub trait SurfaceGeometry: Send {
    fn origin(&self) -> (i32, i32);
}

impl<F> SurfaceGeometry for F
where
    F: Fn() -> (i32, i32) + Send,
{
    fn origin(&self) -> (i32, i32) {
        self()
    }
}

/// Surface that never moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedOrigin(pub i32, pub i32);

impl SurfaceGeometry for FixedOrigin {
    fn origin(&self) -> (i32, i32) {
        (self.0, self.1)
    }
}

/// Maps platform key codes to hardware scancodes.
pub trait ScancodeMapper: Send {
    fn scancode(&self, code: u32) -> u16;
}

/// For platforms that already report scancodes.
///
/// Codes that do not fit a scancode map to 0 (no key).
#[derive(Debug, Clone, Copy, Default)]
pub struct RawScancodes;

impl ScancodeMapper for RawScancodes {
    fn scancode(&self, code: u32) -> u16 {
        u16::try_from(code).unwrap_or(0)
    }
}

// ── InputTranslator ──────────────────────────────────────────────

/// Converts raw input into wire messages for the current session.
pub struct InputTranslator {
    phase: SessionPhase,
    surface: Box<dyn SurfaceGeometry>,
    keymap: Box<dyn ScancodeMapper>,
}

impl InputTranslator {
    pub fn new(surface: Box<dyn SurfaceGeometry>, keymap: Box<dyn ScancodeMapper>) -> Self {
        Self {
            phase: SessionPhase::Idle,
            surface,
            keymap,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub(crate) fn phase_mut(&mut self) -> &mut SessionPhase {
        &mut self.phase
    }

    /// Translate one raw event.
    ///
    /// Returns `None` outside the `Active` phase. A `Some` result means the
    /// event has been claimed and its default handling must be suppressed.
    pub fn translate(&self, event: &InputEvent) -> Option<WireMessage> {
        if !self.phase.is_active() {
            return None;
        }

        let message = match *event {
            InputEvent::PointerMove { x, y } => {
                let (x, y) = self.to_surface(x, y);
                WireMessage::Mouse {
                    x,
                    y,
                    button: button_codes::NONE,
                    pressed: false,
                }
            }
            InputEvent::PointerButton { x, y, button, pressed } => {
                let (x, y) = self.to_surface(x, y);
                WireMessage::Mouse {
                    x,
                    y,
                    button: translate_button(button),
                    pressed,
                }
            }
            InputEvent::Wheel { x, y, delta } => {
                let (x, y) = self.to_surface(x, y);
                let (delta, horizontal) = match delta {
                    WheelDelta::Discrete(d) => (d, false),
                    WheelDelta::Pixels { dx, dy } => {
                        if dx.abs() > dy.abs() {
                            (dx, true)
                        } else {
                            (dy, false)
                        }
                    }
                };
                WireMessage::Wheel {
                    x,
                    y,
                    step: wheel_step(delta),
                    positive: delta > 0.0,
                    horizontal,
                }
            }
            InputEvent::Key { code, pressed } => WireMessage::Scancode {
                code: self.keymap.scancode(code),
                pressed,
            },
        };

        Some(message)
    }

    /// Feed an `established` notification.
    pub fn on_established(&mut self) -> Transition {
        self.phase.establish()
    }

    fn to_surface(&self, x: i32, y: i32) -> (i32, i32) {
        let (left, top) = self.surface.origin();
        (x.saturating_sub(left), y.saturating_sub(top))
    }
}

impl Default for InputTranslator {
    fn default() -> Self {
        Self::new(Box::new(FixedOrigin::default()), Box::new(RawScancodes))
    }
}

// ── Tests ────────────────────────────────────────────────────────
