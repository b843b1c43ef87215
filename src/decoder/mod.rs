//! Terminal input decoder
//!
//! A stateful, table-driven decoder that converts bytes arriving from a
//! terminal into input events. The transition table maps (state, byte) to an
//! ordered action list; the engine consumes one byte per step, so a large
//! burst of input never monopolises the caller's loop.

mod engine;
mod keys;
mod store;
mod table;

pub use engine::Decoder;
pub use keys::{lookup_key_code, Modifiers, SpecialKey};
pub use table::ESCAPE_TIMEOUT;
