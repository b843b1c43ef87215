//! Output escape-sequence formatters
//!
//! Stateless one-shot formatters for the sequences the crate writes: cursor
//! movement, clearing, attributes, 256-colour selection, and mode toggles.
//! They hold no decoding logic and no terminal state; each returns the bytes
//! to write as a `String`.

pub const ESC: &str = "\x1b";
pub const CSI: &str = "\x1b[";

/// Clear the whole screen.
pub fn clear() -> String {
    format!("{CSI}2J")
}

/// Move the cursor to 1-based column `x`, row `y`.
pub fn goto(x: i32, y: i32) -> String {
    format!("{CSI}{y};{x}f")
}

/// Show or hide the cursor.
pub fn cursor(show: bool) -> String {
    format!("{CSI}?25{}", if show { 'h' } else { 'l' })
}

pub fn bold() -> String {
    format!("{CSI}1m")
}

pub fn reverse() -> String {
    format!("{CSI}7m")
}

/// Select a colour from the 256-colour palette, foreground or background.
pub fn colour256(num: u8, bg: bool) -> String {
    format!("{CSI}{};5;{num}m", if bg { 48 } else { 38 })
}

/// Reset all character attributes.
pub fn reset_attributes() -> String {
    format!("{CSI}m")
}

/// Erase the whole current line.
pub fn erase_line() -> String {
    format!("{CSI}2K")
}

/// Erase from the start of the line to the cursor.
pub fn erase_start_of_line() -> String {
    format!("{CSI}1K")
}

/// Erase from the cursor to the end of the line.
pub fn erase_end_of_line() -> String {
    format!("{CSI}K")
}

pub fn insert_mode() -> String {
    format!("{CSI}4h")
}

pub fn replace_mode() -> String {
    format!("{CSI}4l")
}

/// Top half of a double-height line.
pub fn double_height_top(text: &str) -> String {
    format!("{ESC}#3{text}")
}

/// Bottom half of a double-height line.
pub fn double_height_bottom(text: &str) -> String {
    format!("{ESC}#4{text}")
}

/// Move the cursor down one row.
pub fn cursor_down() -> String {
    format!("{CSI}B")
}

/// Move the cursor to 1-based column `x` in the current row.
pub fn column(x: i32) -> String {
    format!("{CSI}{x}G")
}
