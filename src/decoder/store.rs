//! Sequence store
//!
//! A small fixed-capacity buffer that accumulates the in-progress payload of
//! a multi-byte sequence: UTF-8 continuation bytes or CSI numeric parameters.
//! UTF-8 assembly is bounded by table design, so overflow there is a defect
//! and panics; parameter accumulation is bounded only by the far end of the
//! line and drops bytes past capacity instead.

/// Maximum payload length any authored sequence can accumulate.
pub(crate) const STORE_CAPACITY: usize = 64;

#[derive(Debug)]
pub(crate) struct SeqStore {
    buf: [u8; STORE_CAPACITY],
    len: usize,
}

impl SeqStore {
    pub fn new() -> Self {
        Self {
            buf: [0; STORE_CAPACITY],
            len: 0,
        }
    }

    /// Append a byte to the store.
    ///
    /// # Panics
    /// Panics on overflow; a correctly authored transition table clears or
    /// takes the store before any sequence can grow this long.
    pub fn push(&mut self, byte: u8) {
        assert!(
            self.len < STORE_CAPACITY,
            "sequence store overflow: transition table defect"
        );
        self.buf[self.len] = byte;
        self.len += 1;
    }

    /// Append a byte, silently dropping it if the store is full.
    ///
    /// Used for parameter accumulation, where the sequence length is chosen
    /// by whatever is on the other end of the line.
    pub fn push_lossy(&mut self, byte: u8) {
        if self.len < STORE_CAPACITY {
            self.buf[self.len] = byte;
            self.len += 1;
        }
    }

    /// Return the accumulated bytes and clear the store.
    pub fn take(&mut self) -> Vec<u8> {
        let bytes = self.buf[..self.len].to_vec();
        self.len = 0;
        bytes
    }

    /// Return the accumulated bytes as a string and clear the store.
    ///
    /// Shape-valid but semantically invalid UTF-8 (overlong forms, surrogate
    /// codepoints) decodes to U+FFFD.
    pub fn take_string(&mut self) -> String {
        let s = String::from_utf8_lossy(&self.buf[..self.len]).into_owned();
        self.len = 0;
        s
    }

    /// Discard the accumulated bytes without returning them.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
