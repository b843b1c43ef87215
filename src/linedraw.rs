//! Box/line-drawing glyph sets for different terminal modes.

/// One set of line-drawing glyphs, plus the sequences (if any) that switch
/// the terminal into and out of the mode that renders them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyphs {
    pub on: &'static str,
    pub off: &'static str,
    pub horiz: &'static str,
    pub verti: &'static str,
    pub topleft: &'static str,
    pub topright: &'static str,
    pub bottomright: &'static str,
    pub bottomleft: &'static str,
}

/// Unicode heavy box-drawing characters; no mode switch needed.
pub const UTF8: Glyphs = Glyphs {
    on: "",
    off: "",
    horiz: "\u{2501}",
    verti: "\u{2503}",
    topleft: "\u{250f}",
    topright: "\u{2513}",
    bottomright: "\u{251b}",
    bottomleft: "\u{2517}",
};

/// The VT100 alternate character set, selected with `ESC ( 0`.
pub const VT100: Glyphs = Glyphs {
    on: "\x1b(0",
    off: "\x1b(B",
    horiz: "q",
    verti: "x",
    topleft: "l",
    topright: "k",
    bottomright: "j",
    bottomleft: "m",
};

/// Plain ASCII fallback.
pub const ASCII: Glyphs = Glyphs {
    on: "",
    off: "",
    horiz: "-",
    verti: "|",
    topleft: "+",
    topright: "+",
    bottomright: "+",
    bottomleft: "+",
};
