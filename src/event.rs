//! Event surface
//!
//! Decoded input is delivered as [`InputEvent`] values. The decoder pushes
//! them into a caller-supplied vector; [`Terminal`](crate::terminal::Terminal)
//! dispatches them through a [`Handlers`] registry.
//!
//! `Interrupt` is a mandatory event: if it fires with no handler registered,
//! the terminal restores its modes and terminates the process rather than
//! silently dropping an interrupt request.

use serde::{Deserialize, Serialize};

use crate::decoder::{Modifiers, SpecialKey};
use crate::tty::WindowSize;

/// A decoded input event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    /// A literal character or fully assembled multi-byte grapheme
    Keypress(String),
    /// A named special key with its modifier set
    Special { key: SpecialKey, mods: Modifiers },
    /// Cursor-position report; row and column kept verbatim as decimal text
    Position { row: String, col: String },
    /// Device-status report payload, passed through untouched
    Status(String),
    /// The terminal window changed size
    Resize(WindowSize),
    /// Interrupt request (Ctrl-C); must never go unheard
    Interrupt,
    /// A syntactically complete sequence the decoder could not resolve
    Unrecognized(String),
}

impl InputEvent {
    /// Check if this is a literal keypress.
    pub fn is_keypress(&self) -> bool {
        matches!(self, InputEvent::Keypress(_))
    }

    /// Check if this is a special-key event.
    pub fn is_special(&self) -> bool {
        matches!(self, InputEvent::Special { .. })
    }
}

/// Callback registry for decoded events.
///
/// Every slot is optional; events without a handler are dropped, except
/// `Interrupt` (see module docs). Built with chained setters:
///
/// ```no_run
/// use ansikey::Handlers;
///
/// let handlers = Handlers::new()
///     .on_keypress(|text| println!("key: {text:?}"))
///     .on_interrupt(|| std::process::exit(0));
/// ```
#[derive(Default)]
pub struct Handlers {
    pub(crate) keypress: Option<Box<dyn FnMut(&str)>>,
    pub(crate) special: Option<Box<dyn FnMut(SpecialKey, Modifiers)>>,
    pub(crate) position: Option<Box<dyn FnMut(&str, &str)>>,
    pub(crate) status: Option<Box<dyn FnMut(&str)>>,
    pub(crate) resize: Option<Box<dyn FnMut(WindowSize)>>,
    pub(crate) interrupt: Option<Box<dyn FnMut()>>,
    pub(crate) unrecognized: Option<Box<dyn FnMut(&str)>>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_keypress(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.keypress = Some(Box::new(f));
        self
    }

    pub fn on_special(mut self, f: impl FnMut(SpecialKey, Modifiers) + 'static) -> Self {
        self.special = Some(Box::new(f));
        self
    }

    pub fn on_position(mut self, f: impl FnMut(&str, &str) + 'static) -> Self {
        self.position = Some(Box::new(f));
        self
    }

    pub fn on_status(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.status = Some(Box::new(f));
        self
    }

    pub fn on_resize(mut self, f: impl FnMut(WindowSize) + 'static) -> Self {
        self.resize = Some(Box::new(f));
        self
    }

    pub fn on_interrupt(mut self, f: impl FnMut() + 'static) -> Self {
        self.interrupt = Some(Box::new(f));
        self
    }

    pub fn on_unrecognized(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.unrecognized = Some(Box::new(f));
        self
    }
}
