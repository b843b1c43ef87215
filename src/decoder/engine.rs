//! Decoding engine
//!
//! Drives byte-by-byte consumption of the input accumulator against the
//! transition table. The engine owns all mutable decoding state: the current
//! state, the sequence store, the scan position, and the single-slot
//! disambiguation timer. One engine instance decodes one stream; nothing here
//! is shared or synchronised.
//!
//! Scheduling is cooperative: [`Decoder::step`] consumes exactly one byte and
//! returns, so a large burst of input cannot starve the caller's loop. The
//! disambiguation timer is a monotonic deadline the driving loop re-checks
//! via [`Decoder::poll_timeout`]; processing any byte cancels it before the
//! byte's rule executes, so the timer-fire and byte paths never interleave.

use std::time::Instant;

use tracing::{debug, trace, warn};

use super::keys::{lookup_key_code, trailing_modifiers, Modifiers, SpecialKey};
use super::store::SeqStore;
use super::table::{table, Action, EmitEvent, Routine, State};
use crate::event::InputEvent;

#[derive(Debug, Clone, Copy)]
struct PendingTimeout {
    deadline: Instant,
    key: SpecialKey,
}

/// The terminal input decoder.
#[derive(Debug)]
pub struct Decoder {
    state: State,
    /// Input accumulator and scan position
    buf: Vec<u8>,
    pos: usize,
    store: SeqStore,
    pending: Option<PendingTimeout>,
    /// Set when the current byte must be reprocessed from `Rest` (the
    /// one-byte rollback after dumping an invalid multi-byte sequence)
    replay: bool,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Create a new decoder in the rest state.
    pub fn new() -> Self {
        Self {
            state: State::Rest,
            buf: Vec::with_capacity(256),
            pos: 0,
            store: SeqStore::new(),
            pending: None,
            replay: false,
        }
    }

    /// Append bytes to the input accumulator without decoding them.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append bytes and decode everything buffered, returning the events.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<InputEvent> {
        let mut events = Vec::new();
        self.push(bytes);
        while self.step(&mut events) {}
        events
    }

    /// Number of buffered bytes not yet consumed.
    pub fn pending_bytes(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Consume one byte from the accumulator, executing its rule's actions.
    ///
    /// Returns `true` while unconsumed input remains. This is the unit of
    /// cooperative scheduling: call it once per turn and events for that byte
    /// land in `out`.
    pub fn step(&mut self, out: &mut Vec<InputEvent>) -> bool {
        if self.pos >= self.buf.len() {
            self.buf.clear();
            self.pos = 0;
            return false;
        }

        // A new byte always wins the race against the disambiguation window.
        self.pending = None;

        let byte = self.buf[self.pos];
        trace!(byte, state = ?self.state, "step");
        let rule = table().lookup(self.state, byte);
        for act in &rule.acts {
            self.execute(*act, byte, out);
        }

        if self.replay {
            // Rollback: the offending byte is reprocessed from Rest
            self.replay = false;
        } else {
            self.pos += 1;
        }

        if self.pos >= self.buf.len() {
            self.buf.clear();
            self.pos = 0;
            false
        } else {
            true
        }
    }

    /// The armed disambiguation deadline, if any. Driving loops use this to
    /// bound their poll timeout.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }

    /// Fire the disambiguation timer if its deadline has passed.
    ///
    /// Returns `true` if it fired; the armed key is emitted and the decoder
    /// returns to the rest state.
    pub fn poll_timeout(&mut self, now: Instant, out: &mut Vec<InputEvent>) -> bool {
        match self.pending {
            Some(PendingTimeout { deadline, key }) if now >= deadline => {
                self.pending = None;
                debug!(key = key.name(), "disambiguation window elapsed");
                out.push(InputEvent::Special {
                    key,
                    mods: Modifiers::default(),
                });
                self.state = State::Rest;
                true
            }
            _ => false,
        }
    }

    /// Abandon any in-flight sequence and buffered input.
    pub fn reset(&mut self) {
        self.state = State::Rest;
        self.buf.clear();
        self.pos = 0;
        self.store.clear();
        self.pending = None;
        self.replay = false;
    }

    fn execute(&mut self, act: Action, byte: u8, out: &mut Vec<InputEvent>) {
        match act {
            Action::ConsumeLiteral => {
                // Bytes outside ASCII decode as their Latin-1 character, the
                // same fallback used when dumping an invalid sequence
                out.push(InputEvent::Keypress(char::from(byte).to_string()));
            }
            Action::BeginMultiByte(next) => {
                self.store.push(byte);
                self.state = next;
            }
            Action::ContinueMultiByte { next, emit } => {
                if byte & 0xC0 != 0x80 {
                    self.dump_invalid(out);
                    return;
                }
                self.store.push(byte);
                if emit {
                    out.push(InputEvent::Keypress(self.store.take_string()));
                }
                self.state = next;
            }
            Action::ChangeState(next) => {
                debug!(from = ?self.state, to = ?next, "state");
                self.state = next;
            }
            Action::ArmTimer { delay, key } => {
                self.pending = Some(PendingTimeout {
                    deadline: Instant::now() + delay,
                    key,
                });
            }
            Action::Emit { event, mandatory } => {
                trace!(?event, mandatory, "emit");
                out.push(match event {
                    EmitEvent::Interrupt => InputEvent::Interrupt,
                    EmitEvent::Special(key) => InputEvent::Special {
                        key,
                        mods: Modifiers::default(),
                    },
                });
            }
            Action::Store => self.store.push_lossy(byte),
            Action::ClearStore => self.store.clear(),
            Action::Invoke(routine) => self.invoke(routine, out),
        }
    }

    /// Flush every stored byte as an individual literal keypress, roll the
    /// scan position back over the offending byte, and resynchronise at Rest.
    fn dump_invalid(&mut self, out: &mut Vec<InputEvent>) {
        if !self.store.is_empty() {
            debug!(len = self.store.len(), "dumping invalid multi-byte sequence");
        }
        for b in self.store.take() {
            out.push(InputEvent::Keypress(char::from(b).to_string()));
        }
        self.replay = true;
        self.state = State::Rest;
    }

    fn invoke(&mut self, routine: Routine, out: &mut Vec<InputEvent>) {
        match routine {
            Routine::NamedKey(key) => {
                let payload = self.store.take_string();
                let mods = trailing_modifiers(&payload);
                out.push(InputEvent::Special { key, mods });
            }
            Routine::CodedKey => {
                let payload = self.store.take_string();
                let mut fields = payload.split(';');
                let code = fields.next().unwrap_or("");
                match lookup_key_code(code) {
                    Some(key) => {
                        let mods = Modifiers::from_fields(fields);
                        out.push(InputEvent::Special { key, mods });
                    }
                    None => {
                        warn!(sequence = %payload, "unrecognized input key sequence");
                        out.push(InputEvent::Unrecognized(payload));
                    }
                }
            }
            Routine::CursorPos => {
                let payload = self.store.take_string();
                let mut fields = payload.split(';');
                let row = fields.next().unwrap_or("").to_string();
                let col = fields.next().unwrap_or("").to_string();
                debug!(%row, %col, "cursor position report");
                out.push(InputEvent::Position { row, col });
            }
            Routine::DeviceStatus => {
                let status = self.store.take_string();
                debug!(%status, "device status report");
                out.push(InputEvent::Status(status));
            }
        }
    }
}
