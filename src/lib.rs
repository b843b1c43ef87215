//! Ansikey Terminal Input Library
//!
//! An incremental decoder that turns the raw byte stream of an interactive
//! terminal into structured input events. This crate provides:
//!
//! - `decoder`: the table-driven decoding state machine (keypresses, special
//!   keys with modifiers, cursor-position and device-status reports)
//! - `event`: the typed event surface and handler registry
//! - `tty`: raw-mode setup, resize signal wiring, and size queries
//! - `terminal`: the driving event loop tying the pieces together
//! - `output`: stateless one-shot escape-sequence formatters
//! - `linedraw`: box/line-drawing glyph sets for different terminal modes

pub mod decoder;
pub mod event;
pub mod linedraw;
pub mod output;
pub mod terminal;
pub mod tty;

pub use decoder::{Decoder, Modifiers, SpecialKey};
pub use event::{Handlers, InputEvent};
pub use terminal::Terminal;
pub use tty::WindowSize;
