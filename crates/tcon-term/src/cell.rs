// SPDX-License-Identifier: MIT
//
// Cell — one character position of the surface buffer.
//
// A cell is a single byte plus the packed attribute it was written with.
// The byte is what the caller asked for; how it reaches the wire is
// decided by `display_char`, which keeps printable ASCII and replaces the
// rest. Wide characters and grapheme clusters are out of scope.

use crate::color::Attribute;

/// Character shown for bytes that have no printable ASCII form.
const REPLACEMENT: char = '?';

/// A single buffer cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// The stored character byte.
    pub ch: u8,
    /// The packed color attribute.
    pub attr: Attribute,
}

impl Cell {
    /// A space in grey on black: what a cleared console holds.
    pub const BLANK: Self = Self {
        ch: b' ',
        attr: Attribute::DEFAULT,
    };

    /// Create a cell.
    #[inline]
    #[must_use]
    pub const fn new(ch: u8, attr: Attribute) -> Self {
        Self { ch, attr }
    }

    /// Same attribute, different character.
    #[inline]
    #[must_use]
    pub const fn with_char(self, ch: u8) -> Self {
        Self { ch, ..self }
    }

    /// Same character, different attribute.
    #[inline]
    #[must_use]
    pub const fn with_attr(self, attr: Attribute) -> Self {
        Self { attr, ..self }
    }

    /// The character as it is sent to the terminal.
    #[inline]
    #[must_use]
    pub const fn display_char(self) -> char {
        display_char(self.ch)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}

/// Map a stored byte to the character written on the wire.
#[inline]
#[must_use]
pub const fn display_char(byte: u8) -> char {
    if byte.is_ascii_graphic() || byte == b' ' {
        byte as char
    } else {
        REPLACEMENT
    }
}

/// Map a written character to the byte a cell stores.
#[inline]
#[must_use]
pub const fn store_byte(ch: char) -> u8 {
    if ch.is_ascii() { ch as u8 } else { REPLACEMENT as u8 }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
