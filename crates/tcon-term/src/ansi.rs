// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state
// and no decisions about when to emit; `AnsiTerminal` owns those. This
// module only knows the byte-level encoding of each command.
//
// Positions are 0-indexed in our API and converted to the 1-indexed form
// the terminal expects through `Coord::to_one_based`; a position with no
// 1-based form is an `InvalidInput` error rather than a wrapped number.
//
// Apart from that range check, errors are the writer's. Writing into
// `OutputBuffer` (a Vec) never fails.

use std::io::{self, Write};

use crate::color::{Attribute, Palette};
use crate::geometry::{Coord, Size};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `pos` (CUP).
///
/// # Errors
///
/// `InvalidInput` if `pos` has a `u16::MAX` coordinate, otherwise the
/// writer's error.
#[inline]
pub fn cursor_to(w: &mut impl Write, pos: Coord) -> io::Result<()> {
    let (row, col) = pos
        .to_one_based()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    write!(w, "\x1b[{row};{col}H")
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Cursor Shape ───────────────────────────────────────────────────────────

/// Terminal cursor shape (DECSCUSR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    /// Whatever the user configured.
    #[default]
    Default,
    SteadyBlock,
    SteadyUnderline,
    SteadyBar,
}

impl CursorShape {
    /// The closest shape for a cursor filling `percent` of its cell.
    ///
    /// A terminal cannot draw arbitrary thickness: up to a quarter of the
    /// cell reads as an underline, up to half as a bar, anything more as a
    /// block.
    #[must_use]
    pub const fn for_size(percent: u8) -> Self {
        match percent {
            0..=25 => Self::SteadyUnderline,
            26..=50 => Self::SteadyBar,
            _ => Self::SteadyBlock,
        }
    }
}

/// Set the cursor shape.
#[inline]
pub fn set_cursor_shape(w: &mut impl Write, shape: CursorShape) -> io::Result<()> {
    let n: u8 = match shape {
        CursorShape::Default => 0,
        CursorShape::SteadyBlock => 2,
        CursorShape::SteadyUnderline => 4,
        CursorShape::SteadyBar => 6,
    };
    write!(w, "\x1b[{n} q")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Reset all SGR attributes to terminal defaults (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

/// Ask the terminal to resize its text area (xterm window op 8).
///
/// Honoured by xterm and a few others when allowed; ignored elsewhere.
#[inline]
pub fn resize_window(w: &mut impl Write, size: Size) -> io::Result<()> {
    write!(w, "\x1b[8;{};{}t", size.rows, size.cols)
}

// ─── Color ───────────────────────────────────────────────────────────────────

/// SGR foreground code for a palette entry: 30–37, bright 90–97.
#[must_use]
pub const fn fg_code(color: Palette) -> u8 {
    let idx = color.ansi_index();
    if idx < 8 { 30 + idx } else { 90 + idx - 8 }
}

/// SGR background code for a palette entry: 40–47, bright 100–107.
#[must_use]
pub const fn bg_code(color: Palette) -> u8 {
    let idx = color.ansi_index();
    if idx < 8 { 40 + idx } else { 100 + idx - 8 }
}

/// Set both colors of `attr` as one SGR sequence.
///
/// Starts with `0` so nothing left over from earlier output (bold,
/// underline, a 256-color background) survives.
#[inline]
pub fn attribute(w: &mut impl Write, attr: Attribute) -> io::Result<()> {
    write!(
        w,
        "\x1b[0;{};{}m",
        fg_code(attr.foreground()),
        bg_code(attr.background())
    )
}

// ─── Synchronized Output ─────────────────────────────────────────────────────

/// Begin synchronized output (DEC private mode 2026).
///
/// The terminal holds rendering until [`end_sync`], so a multi-row repaint
/// appears at once. Terminals without support ignore it.
#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

/// End synchronized output.
#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

// ─── Alternate Screen ───────────────────────────────────────────────────────

/// Enter the alternate screen (DEC private mode 1049).
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Leave the alternate screen, restoring the original content.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── Kitty Keyboard Protocol ────────────────────────────────────────────────

/// Disambiguate escape codes.
pub const KITTY_DISAMBIGUATE: u8 = 1;
/// Report press / repeat / release.
pub const KITTY_EVENT_TYPES: u8 = 2;
/// Report alternate keys.
pub const KITTY_ALTERNATE_KEYS: u8 = 4;
/// Report every key, modifiers included, as an escape code.
pub const KITTY_ALL_KEYS: u8 = 8;

/// Push Kitty keyboard enhancement `flags` onto the terminal's stack.
#[inline]
pub fn enable_kitty_keyboard(w: &mut impl Write, flags: u8) -> io::Result<()> {
    write!(w, "\x1b[>{flags}u")
}

/// Pop the enhancement pushed by [`enable_kitty_keyboard`].
#[inline]
pub fn disable_kitty_keyboard(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[<u")
}

/// Ask which Kitty flags are active; the reply is `CSI ? flags u`.
///
/// Terminals without the protocol stay silent.
#[inline]
pub fn query_kitty_keyboard(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?u")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn emit<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    // ── Cursor ──────────────────────────────────────────────────────────

    #[test]
    fn cursor_to_origin() {
        assert_eq!(emit(|w| cursor_to(w, Coord::ORIGIN)), "\x1b[1;1H");
    }

    #[test]
    fn cursor_to_position() {
        assert_eq!(emit(|w| cursor_to(w, Coord::new(10, 20))), "\x1b[21;11H");
    }

    #[test]
    fn cursor_to_largest_representable() {
        let last = u16::MAX - 1;
        assert_eq!(
            emit(|w| cursor_to(w, Coord::new(last, last))),
            "\x1b[65535;65535H"
        );
    }

    #[test]
    fn cursor_to_max_is_invalid_input() {
        let mut buf = Vec::new();
        let err = cursor_to(&mut buf, Coord::new(u16::MAX, 0)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(buf.is_empty());
    }

    #[test]
    fn cursor_visibility() {
        assert_eq!(emit(|w| cursor_hide(w)), "\x1b[?25l");
        assert_eq!(emit(|w| cursor_show(w)), "\x1b[?25h");
    }

    #[test]
    fn cursor_shape_by_size() {
        assert_eq!(CursorShape::for_size(1), CursorShape::SteadyUnderline);
        assert_eq!(CursorShape::for_size(25), CursorShape::SteadyUnderline);
        assert_eq!(CursorShape::for_size(26), CursorShape::SteadyBar);
        assert_eq!(CursorShape::for_size(50), CursorShape::SteadyBar);
        assert_eq!(CursorShape::for_size(100), CursorShape::SteadyBlock);
    }

    #[test]
    fn cursor_shape_sequences() {
        assert_eq!(emit(|w| set_cursor_shape(w, CursorShape::Default)), "\x1b[0 q");
        assert_eq!(emit(|w| set_cursor_shape(w, CursorShape::SteadyBlock)), "\x1b[2 q");
        assert_eq!(emit(|w| set_cursor_shape(w, CursorShape::SteadyBar)), "\x1b[6 q");
    }

    // ── Screen ──────────────────────────────────────────────────────────

    #[test]
    fn screen_sequences() {
        assert_eq!(emit(|w| clear_screen(w)), "\x1b[2J");
        assert_eq!(emit(|w| reset(w)), "\x1b[0m");
        assert_eq!(emit(|w| resize_window(w, Size::new(80, 25))), "\x1b[8;25;80t");
    }

    // ── Color ───────────────────────────────────────────────────────────

    #[test]
    fn console_blue_is_ansi_blue() {
        assert_eq!(fg_code(Palette::BLUE), 34);
        assert_eq!(fg_code(Palette::RED), 31);
        assert_eq!(bg_code(Palette::BLUE), 44);
    }

    #[test]
    fn composites_and_intensity() {
        assert_eq!(fg_code(Palette::BLACK), 30);
        assert_eq!(fg_code(Palette::GREY), 37);
        assert_eq!(fg_code(Palette::WHITE), 97);
        assert_eq!(fg_code(Palette::YELLOW), 33);
        assert_eq!(fg_code(Palette::CYAN | Palette::INTENSITY), 96);
        assert_eq!(bg_code(Palette::PURPLE | Palette::INTENSITY), 105);
    }

    #[test]
    fn attribute_is_one_sequence() {
        assert_eq!(emit(|w| attribute(w, Attribute::DEFAULT)), "\x1b[0;37;40m");
        assert_eq!(
            emit(|w| attribute(w, Attribute::from_bits(0x1F))),
            "\x1b[0;97;44m"
        );
    }

    // ── Modes ───────────────────────────────────────────────────────────

    #[test]
    fn alt_screen_and_sync() {
        assert_eq!(emit(|w| enter_alt_screen(w)), "\x1b[?1049h");
        assert_eq!(emit(|w| exit_alt_screen(w)), "\x1b[?1049l");
        assert_eq!(emit(|w| begin_sync(w)), "\x1b[?2026h");
        assert_eq!(emit(|w| end_sync(w)), "\x1b[?2026l");
    }

    #[test]
    fn kitty_keyboard() {
        let flags = KITTY_DISAMBIGUATE | KITTY_EVENT_TYPES | KITTY_ALL_KEYS;
        assert_eq!(emit(|w| enable_kitty_keyboard(w, flags)), "\x1b[>11u");
        assert_eq!(emit(|w| disable_kitty_keyboard(w)), "\x1b[<u");
        assert_eq!(emit(|w| query_kitty_keyboard(w)), "\x1b[?u");
    }
}
