//! TTY handling
//!
//! Raw-mode setup for the process's own controlling terminal, resize-signal
//! wiring, size queries, and the poll/read plumbing that supplies bytes to
//! the decoder. All checks that can fail happen in [`Tty::open`], before any
//! terminal mode is touched, so a failed construction needs no cleanup.

#[cfg(unix)]
mod unix;

#[cfg(unix)]
pub use unix::{take_resize, Tty};

use serde::{Deserialize, Serialize};

/// Error type for TTY operations
#[derive(Debug, thiserror::Error)]
pub enum TtyError {
    #[error("stdin and stdout must both be interactive terminals")]
    NotATty,

    #[error("TERM is not set")]
    TermUnset,

    #[error("terminal type {0:?} is too limited")]
    DumbTerminal(String),

    #[error("Failed to query terminal: {0}")]
    Query(#[source] nix::Error),

    #[error("Failed to change terminal attributes: {0}")]
    Attrs(#[source] nix::Error),

    #[error("Failed to install resize handler: {0}")]
    Sigaction(#[source] nix::Error),

    #[error("Failed to read from terminal: {0}")]
    Read(#[source] nix::Error),

    #[error("Failed to write to terminal: {0}")]
    Write(#[source] nix::Error),

    #[error("Failed to poll: {0}")]
    Poll(#[source] nix::Error),

    #[error("Failed to get window size: {0}")]
    Winsize(#[source] nix::Error),
}

/// Result type for TTY operations
pub type TtyResult<T> = Result<T, TtyError>;

/// Terminal window size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub rows: u16,
    pub cols: u16,
}

impl WindowSize {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self { rows, cols }
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_size() {
        let size = WindowSize::new(80, 24);
        assert_eq!(size.cols, 80);
        assert_eq!(size.rows, 24);
        assert_eq!(WindowSize::default(), size);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            TtyError::NotATty.to_string(),
            "stdin and stdout must both be interactive terminals"
        );
        assert_eq!(
            TtyError::DumbTerminal("dumb".to_string()).to_string(),
            "terminal type \"dumb\" is too limited"
        );
    }
}
