//! Terminal event loop
//!
//! [`Terminal`] ties the pieces together: it owns the raw-mode TTY, the
//! decoder, and the handler registry, and drives the poll/read/decode cycle.
//! It also exposes the output helpers (cursor movement, clearing, attributes,
//! box drawing) that write through the same TTY.

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::decoder::Decoder;
use crate::event::{Handlers, InputEvent};
use crate::linedraw::{self, Glyphs};
use crate::output;
use crate::tty::{self, Tty, TtyResult, WindowSize};

/// Poll granularity when no disambiguation deadline is armed.
const IDLE_POLL_MS: i32 = 100;

/// An interactive terminal: raw-mode input decoded into events, plus the
/// output escape-sequence helpers.
pub struct Terminal {
    tty: Tty,
    decoder: Decoder,
    handlers: Handlers,
    glyphs: Glyphs,
    linedraw_depth: u32,
    stop: Arc<AtomicBool>,
}

impl Terminal {
    /// Open the controlling terminal and enter raw mode.
    ///
    /// Fails fast (before any mode change) when stdin/stdout is not a
    /// terminal or `TERM` is unset or names a non-capable terminal.
    pub fn new(handlers: Handlers) -> TtyResult<Self> {
        Ok(Self::with_tty(Tty::open()?, handlers))
    }

    /// Build a terminal over an already-opened TTY, e.g. one side of a pty
    /// pair.
    pub fn with_tty(tty: Tty, handlers: Handlers) -> Self {
        Self {
            tty,
            decoder: Decoder::new(),
            handlers,
            glyphs: linedraw::VT100,
            linedraw_depth: 0,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Use a different line-drawing glyph set.
    pub fn set_glyphs(&mut self, glyphs: Glyphs) {
        self.glyphs = glyphs;
    }

    /// A flag that stops [`Terminal::run`] when set from a handler.
    pub fn stopper(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Share a stop flag created before the terminal, so handlers built
    /// ahead of [`Terminal::new`] can capture it.
    pub fn set_stopper(&mut self, stop: Arc<AtomicBool>) {
        self.stop = stop;
    }

    /// Current window size.
    pub fn size(&self) -> TtyResult<WindowSize> {
        self.tty.size()
    }

    /// Poll, read, decode, and dispatch until stopped or the input stream
    /// closes.
    ///
    /// The decoder consumes one byte per turn, with resize delivery and the
    /// stop flag checked between turns, so event handlers stay responsive
    /// under bursty input. The poll timeout is bounded by the armed
    /// disambiguation deadline, if any.
    pub fn run(&mut self) -> TtyResult<()> {
        let mut events = Vec::new();
        let mut chunk = [0u8; 1024];

        while !self.stop.load(Ordering::Relaxed) {
            self.deliver_resize()?;

            let timeout_ms = match self.decoder.deadline() {
                Some(deadline) => deadline
                    .saturating_duration_since(Instant::now())
                    .as_millis()
                    .min(IDLE_POLL_MS as u128) as i32,
                None => IDLE_POLL_MS,
            };

            if self.tty.poll_input(timeout_ms)? {
                let n = self.tty.read(&mut chunk)?;
                if n == 0 {
                    debug!("input stream closed");
                    break;
                }
                self.decoder.push(&chunk[..n]);
                loop {
                    let more = self.decoder.step(&mut events);
                    for event in events.drain(..) {
                        self.dispatch(event);
                    }
                    self.deliver_resize()?;
                    if !more || self.stop.load(Ordering::Relaxed) {
                        break;
                    }
                }
            }

            if self.decoder.poll_timeout(Instant::now(), &mut events) {
                for event in events.drain(..) {
                    self.dispatch(event);
                }
            }
        }
        Ok(())
    }

    /// Restore cursor visibility, replace mode, and default attributes.
    pub fn soft_reset(&mut self) -> TtyResult<()> {
        self.cursor(true)?;
        self.replace_mode()?;
        self.reset_attributes()
    }

    fn deliver_resize(&mut self) -> TtyResult<()> {
        if tty::take_resize() {
            let size = self.tty.size()?;
            self.dispatch(InputEvent::Resize(size));
        }
        Ok(())
    }

    fn dispatch(&mut self, event: InputEvent) {
        match event {
            InputEvent::Keypress(text) => {
                if let Some(f) = self.handlers.keypress.as_mut() {
                    f(&text);
                }
            }
            InputEvent::Special { key, mods } => {
                if let Some(f) = self.handlers.special.as_mut() {
                    f(key, mods);
                }
            }
            InputEvent::Position { row, col } => {
                if let Some(f) = self.handlers.position.as_mut() {
                    f(&row, &col);
                }
            }
            InputEvent::Status(status) => {
                if let Some(f) = self.handlers.status.as_mut() {
                    f(&status);
                }
            }
            InputEvent::Resize(size) => {
                if let Some(f) = self.handlers.resize.as_mut() {
                    f(size);
                }
            }
            InputEvent::Unrecognized(sequence) => {
                if let Some(f) = self.handlers.unrecognized.as_mut() {
                    f(&sequence);
                }
            }
            InputEvent::Interrupt => match self.handlers.interrupt.take() {
                Some(mut f) => {
                    f();
                    self.handlers.interrupt = Some(f);
                }
                None => self.interrupt_unheard(),
            },
        }
    }

    /// An interrupt request arrived with nobody listening. Dropping it
    /// silently would leave the user unable to stop the program, so restore
    /// the terminal and terminate instead.
    fn interrupt_unheard(&mut self) -> ! {
        let _ = self.clear();
        let _ = self.move_to(1, 1);
        let _ = self.write("terminated (interrupt)\r\n");
        let _ = self.soft_reset();
        let _ = self.tty.restore();
        process::exit(1);
    }

    /// Write raw text to the terminal.
    pub fn write(&mut self, text: &str) -> TtyResult<()> {
        self.tty.write_all(text.as_bytes())
    }

    /// Clear the whole screen.
    pub fn clear(&mut self) -> TtyResult<()> {
        self.write(&output::clear())
    }

    /// Move the cursor to 1-based (x, y). Negative coordinates count back
    /// from the far edge: -1 is the last column or row.
    pub fn move_to(&mut self, x: i32, y: i32) -> TtyResult<()> {
        let size = self.tty.size()?;
        let x = if x < 0 { size.cols as i32 + x + 1 } else { x };
        let y = if y < 0 { size.rows as i32 + y + 1 } else { y };
        self.write(&output::goto(x, y))
    }

    /// Show or hide the cursor.
    pub fn cursor(&mut self, show: bool) -> TtyResult<()> {
        self.write(&output::cursor(show))
    }

    pub fn bold(&mut self) -> TtyResult<()> {
        self.write(&output::bold())
    }

    pub fn reverse(&mut self) -> TtyResult<()> {
        self.write(&output::reverse())
    }

    /// Select a colour from the 256-colour palette.
    pub fn colour256(&mut self, num: u8, bg: bool) -> TtyResult<()> {
        self.write(&output::colour256(num, bg))
    }

    /// Reset all character attributes.
    pub fn reset_attributes(&mut self) -> TtyResult<()> {
        self.write(&output::reset_attributes())
    }

    pub fn erase_line(&mut self) -> TtyResult<()> {
        self.write(&output::erase_line())
    }

    pub fn erase_start_of_line(&mut self) -> TtyResult<()> {
        self.write(&output::erase_start_of_line())
    }

    pub fn erase_end_of_line(&mut self) -> TtyResult<()> {
        self.write(&output::erase_end_of_line())
    }

    pub fn insert_mode(&mut self) -> TtyResult<()> {
        self.write(&output::insert_mode())
    }

    pub fn replace_mode(&mut self) -> TtyResult<()> {
        self.write(&output::replace_mode())
    }

    /// Write `text` as a double-height line occupying rows `y` and `y + 1`.
    pub fn double_height(&mut self, x: i32, y: i32, text: &str) -> TtyResult<()> {
        self.move_to(x, y)?;
        self.write(&output::double_height_top(text))?;
        self.move_to(x, y + 1)?;
        self.write(&output::double_height_bottom(text))
    }

    /// Enter line-drawing mode. Calls nest; only the outermost switches the
    /// character set.
    pub fn enable_linedraw(&mut self) -> TtyResult<()> {
        if self.linedraw_depth == 0 {
            let on = self.glyphs.on;
            self.write(on)?;
        }
        self.linedraw_depth += 1;
        Ok(())
    }

    /// Leave line-drawing mode; the character set switches back when the
    /// outermost call unwinds.
    pub fn disable_linedraw(&mut self) -> TtyResult<()> {
        if self.linedraw_depth == 0 {
            return Ok(());
        }
        self.linedraw_depth -= 1;
        if self.linedraw_depth == 0 {
            let off = self.glyphs.off;
            self.write(off)?;
        }
        Ok(())
    }

    /// Draw a horizontal line on row `y` from `xfrom` to `xto` (defaulting
    /// to the last column).
    pub fn draw_horizontal_line(&mut self, y: i32, xfrom: i32, xto: Option<i32>) -> TtyResult<()> {
        let xto = match xto {
            Some(x) => x,
            None => self.tty.size()?.cols as i32,
        };
        self.move_to(xfrom, y)?;
        self.enable_linedraw()?;
        let mut line = String::new();
        for _ in 0..=(xto - xfrom) {
            line.push_str(self.glyphs.horiz);
        }
        self.write(&line)?;
        self.disable_linedraw()
    }

    /// Draw a vertical line in column `x` from `yfrom` to `yto` (defaulting
    /// to the full height).
    pub fn draw_vertical_line(
        &mut self,
        x: i32,
        yfrom: Option<i32>,
        yto: Option<i32>,
    ) -> TtyResult<()> {
        let yfrom = yfrom.unwrap_or(1);
        let yto = match yto {
            Some(y) => y,
            None => self.tty.size()?.rows as i32,
        };
        self.move_to(x, yfrom)?;
        self.enable_linedraw()?;
        for _ in yfrom..=yto {
            // Draw vertical, move down, return to the column
            let step = format!("{}{}{}", self.glyphs.verti, output::cursor_down(), output::column(x));
            self.write(&step)?;
        }
        self.disable_linedraw()
    }

    /// Draw a box with corners (x1, y1) and (x2, y2), defaulting to the full
    /// screen.
    pub fn draw_box(
        &mut self,
        x1: i32,
        y1: i32,
        x2: Option<i32>,
        y2: Option<i32>,
    ) -> TtyResult<()> {
        let size = self.tty.size()?;
        let x2 = x2.unwrap_or(size.cols as i32);
        let y2 = y2.unwrap_or(size.rows as i32);

        let mut horiz = String::new();
        for _ in (x1 + 1)..=(x2 - 1) {
            horiz.push_str(self.glyphs.horiz);
        }

        self.enable_linedraw()?;
        self.move_to(x1, y1)?;
        let top = format!("{}{}{}", self.glyphs.topleft, horiz, self.glyphs.topright);
        self.write(&top)?;
        self.move_to(x1, y2)?;
        let bottom = format!("{}{}{}", self.glyphs.bottomleft, horiz, self.glyphs.bottomright);
        self.write(&bottom)?;
        self.draw_vertical_line(x1, Some(y1 + 1), Some(y2 - 1))?;
        self.draw_vertical_line(x2, Some(y1 + 1), Some(y2 - 1))?;
        self.disable_linedraw()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        // Restore modes before the raw-mode guard puts the saved termios back
        let _ = self.soft_reset();
    }
}
