//! Special key names and modifier decoding
//!
//! CSI sequences carry their key as a numeric code (`ESC [ 15 ~` is F5) and
//! may append a modifier code after a semicolon (`ESC [ 1 ; 5 A` is
//! Control+Up). This module resolves both.

use serde::{Deserialize, Serialize};

/// Named keys that arrive as escape sequences rather than literal bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialKey {
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    Insert,
    Delete,
    End,
    PageUp,
    PageDown,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
}

impl SpecialKey {
    /// Conventional lowercase name, with the VT nomenclature "prior"/"next"
    /// for the paging keys.
    pub fn name(&self) -> &'static str {
        match self {
            SpecialKey::Escape => "escape",
            SpecialKey::Up => "up",
            SpecialKey::Down => "down",
            SpecialKey::Left => "left",
            SpecialKey::Right => "right",
            SpecialKey::Home => "home",
            SpecialKey::Insert => "insert",
            SpecialKey::Delete => "delete",
            SpecialKey::End => "end",
            SpecialKey::PageUp => "prior",
            SpecialKey::PageDown => "next",
            SpecialKey::F1 => "F1",
            SpecialKey::F2 => "F2",
            SpecialKey::F3 => "F3",
            SpecialKey::F4 => "F4",
            SpecialKey::F5 => "F5",
            SpecialKey::F6 => "F6",
            SpecialKey::F7 => "F7",
            SpecialKey::F8 => "F8",
            SpecialKey::F9 => "F9",
            SpecialKey::F10 => "F10",
            SpecialKey::F11 => "F11",
            SpecialKey::F12 => "F12",
            SpecialKey::F13 => "F13",
            SpecialKey::F14 => "F14",
            SpecialKey::F15 => "F15",
            SpecialKey::F16 => "F16",
            SpecialKey::F17 => "F17",
            SpecialKey::F18 => "F18",
            SpecialKey::F19 => "F19",
            SpecialKey::F20 => "F20",
        }
    }
}

/// Resolve the numeric key code of a `~`-terminated CSI sequence.
///
/// The code arrives as the decimal text of the first parameter field. The
/// xterm code space has gaps (no 7-10, 16, 22, 27, 30); codes outside the
/// table are decode failures the caller must surface.
pub fn lookup_key_code(code: &str) -> Option<SpecialKey> {
    let key = match code {
        "1" => SpecialKey::Home,
        "2" => SpecialKey::Insert,
        "3" => SpecialKey::Delete,
        "4" => SpecialKey::End,
        "5" => SpecialKey::PageUp,
        "6" => SpecialKey::PageDown,
        "11" => SpecialKey::F1,
        "12" => SpecialKey::F2,
        "13" => SpecialKey::F3,
        "14" => SpecialKey::F4,
        "15" => SpecialKey::F5,
        "17" => SpecialKey::F6,
        "18" => SpecialKey::F7,
        "19" => SpecialKey::F8,
        "20" => SpecialKey::F9,
        "21" => SpecialKey::F10,
        "23" => SpecialKey::F11,
        "24" => SpecialKey::F12,
        "25" => SpecialKey::F13,
        "26" => SpecialKey::F14,
        "28" => SpecialKey::F15,
        "29" => SpecialKey::F16,
        "31" => SpecialKey::F17,
        "32" => SpecialKey::F18,
        "33" => SpecialKey::F19,
        "34" => SpecialKey::F20,
        _ => return None,
    };
    Some(key)
}

/// Keyboard modifiers held during a keypress.
///
/// CSI sequences encode modifiers as a single parameter in the range 2-16.
/// Subtracting 1 turns the code into a bitmask: bit 0 shift, bit 1 alt,
/// bit 2 control, bit 3 meta. Code 5 is therefore Control, 6 Shift+Control,
/// and 16 all four at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub control: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Merge in one modifier parameter field. Values outside 2-16, or text
    /// that is not a number, set nothing; that is not an error.
    pub fn apply_code(&mut self, field: &str) {
        let Ok(n) = field.parse::<u32>() else {
            return;
        };
        if !(2..=16).contains(&n) {
            return;
        }
        let n = n - 1;
        if n & 1 != 0 {
            self.shift = true;
        }
        if n & 2 != 0 {
            self.alt = true;
        }
        if n & 4 != 0 {
            self.control = true;
        }
        if n & 8 != 0 {
            self.meta = true;
        }
    }

    /// Decode a set of modifier parameter fields.
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        let mut mods = Modifiers::default();
        for field in fields {
            mods.apply_code(field);
        }
        mods
    }

    /// Check if any modifier is set.
    pub fn any(&self) -> bool {
        self.shift || self.alt || self.control || self.meta
    }
}

/// Decode the modifier fields of a semicolon-delimited payload, skipping the
/// leading key-code field.
pub(crate) fn trailing_modifiers(payload: &str) -> Modifiers {
    Modifiers::from_fields(payload.split(';').skip(1))
}
