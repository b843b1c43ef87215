//! Unix TTY implementation
//!
//! Puts a terminal descriptor into raw mode using POSIX termios, with an RAII
//! guard that restores the saved attributes on drop. [`Tty::open`] wires up
//! the process's own stdin/stdout; [`Tty::from_fds`] takes caller-supplied
//! descriptors, e.g. the slave side of a pty pair.

use std::os::fd::{BorrowedFd, RawFd};
use std::sync::atomic::{AtomicBool, Ordering};

use nix::errno::Errno;
use nix::libc::{self, STDIN_FILENO, STDOUT_FILENO};
use nix::poll::{poll, PollFd, PollFlags};
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::sys::termios::{cfmakeraw, tcgetattr, tcsetattr, SetArg, Termios};
use nix::unistd::{isatty, read, write};

use super::{TtyError, TtyResult, WindowSize};

/// Set by the SIGWINCH handler; resize notifications bypass the byte state
/// machine entirely.
static RESIZED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigwinch(_: libc::c_int) {
    RESIZED.store(true, Ordering::Relaxed);
}

/// Take and clear the pending resize notification.
pub fn take_resize() -> bool {
    RESIZED.swap(false, Ordering::Relaxed)
}

fn borrow(fd: RawFd) -> BorrowedFd<'static> {
    // SAFETY: the descriptor stays open for the life of the Tty (the
    // from_fds contract; stdin/stdout live as long as the process)
    unsafe { BorrowedFd::borrow_raw(fd) }
}

/// A terminal in raw mode.
pub struct Tty {
    input: RawFd,
    output: RawFd,
    /// Attributes to restore on drop
    saved: Termios,
}

impl Tty {
    /// Verify the controlling terminal is usable, enable raw mode on it, and
    /// install the resize-signal handler.
    ///
    /// Fails before any mode change if stdin or stdout is not a terminal, or
    /// if `TERM` is unset or names a terminal too limited to send the
    /// sequences this crate decodes.
    pub fn open() -> TtyResult<Self> {
        if !isatty(STDIN_FILENO).map_err(TtyError::Query)?
            || !isatty(STDOUT_FILENO).map_err(TtyError::Query)?
        {
            return Err(TtyError::NotATty);
        }
        match std::env::var("TERM") {
            Err(_) => return Err(TtyError::TermUnset),
            Ok(term) if term == "dumb" => return Err(TtyError::DumbTerminal(term)),
            Ok(_) => {}
        }

        Self::from_fds(STDIN_FILENO, STDOUT_FILENO)
    }

    /// Enable raw mode on caller-supplied descriptors.
    ///
    /// Skips the terminal-type checks [`Tty::open`] performs; `input` must
    /// still be a terminal for the termios calls to succeed. Both descriptors
    /// must stay open for the lifetime of the returned guard.
    pub fn from_fds(input: RawFd, output: RawFd) -> TtyResult<Self> {
        let saved = tcgetattr(borrow(input)).map_err(TtyError::Attrs)?;
        let mut raw = saved.clone();
        cfmakeraw(&mut raw);
        tcsetattr(borrow(input), SetArg::TCSANOW, &raw).map_err(TtyError::Attrs)?;

        let action = SigAction::new(
            SigHandler::Handler(on_sigwinch),
            SaFlags::SA_RESTART,
            SigSet::empty(),
        );
        // SAFETY: the handler only stores to an atomic flag
        unsafe { sigaction(Signal::SIGWINCH, &action) }.map_err(TtyError::Sigaction)?;

        tracing::debug!(input, output, "raw mode enabled");
        Ok(Self {
            input,
            output,
            saved,
        })
    }

    /// Poll for input available to read.
    ///
    /// Returns true if a read would not block, false if the timeout expired
    /// or a signal interrupted the wait (the caller's loop re-checks the
    /// resize flag either way).
    pub fn poll_input(&self, timeout_ms: i32) -> TtyResult<bool> {
        let fd = borrow(self.input);
        let mut fds = [PollFd::new(&fd, PollFlags::POLLIN)];
        let n = match poll(&mut fds, timeout_ms) {
            Ok(n) => n,
            // Linux never restarts poll(2) after a signal, SA_RESTART or not
            Err(Errno::EINTR) => return Ok(false),
            Err(e) => return Err(TtyError::Poll(e)),
        };
        // Hangup and error conditions must reach read so it observes EOF
        // instead of the loop re-polling forever
        let ready = PollFlags::POLLIN | PollFlags::POLLHUP | PollFlags::POLLERR;
        Ok(n > 0 && fds[0].revents().is_some_and(|r| r.intersects(ready)))
    }

    /// Read available bytes from the terminal. Returns 0 at end of input.
    pub fn read(&self, buf: &mut [u8]) -> TtyResult<usize> {
        loop {
            match read(self.input, buf) {
                Ok(n) => return Ok(n),
                Err(Errno::EINTR) => continue,
                // A hung-up terminal reports EIO; surface it as end of input
                Err(Errno::EIO) => return Ok(0),
                Err(e) => return Err(TtyError::Read(e)),
            }
        }
    }

    /// Write all bytes to the terminal.
    pub fn write_all(&self, mut data: &[u8]) -> TtyResult<()> {
        while !data.is_empty() {
            match write(self.output, data) {
                Ok(n) => data = &data[n..],
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(TtyError::Write(e)),
            }
        }
        Ok(())
    }

    /// Put the saved terminal attributes back without waiting for drop.
    ///
    /// Needed on paths that end in `process::exit`, which skips destructors.
    pub fn restore(&self) -> TtyResult<()> {
        tcsetattr(borrow(self.input), SetArg::TCSANOW, &self.saved).map_err(TtyError::Attrs)
    }

    /// Query the current window size.
    pub fn size(&self) -> TtyResult<WindowSize> {
        let mut ws = libc::winsize {
            ws_row: 0,
            ws_col: 0,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };

        // SAFETY: TIOCGWINSZ is a valid ioctl for querying window size
        let result = unsafe { libc::ioctl(self.output, libc::TIOCGWINSZ, &mut ws) };

        if result < 0 {
            Err(TtyError::Winsize(Errno::last()))
        } else {
            Ok(WindowSize {
                rows: ws.ws_row,
                cols: ws.ws_col,
            })
        }
    }
}

impl Drop for Tty {
    fn drop(&mut self) {
        // Best effort; there is nowhere to report a failure during teardown
        let _ = tcsetattr(borrow(self.input), SetArg::TCSANOW, &self.saved);
    }
}
