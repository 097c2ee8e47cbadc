// SPDX-License-Identifier: MIT
//
// Console color system — a 16-entry palette and the packed attribute.
//
// Colors here are the classic console nibbles, not ANSI indices:
//
//   bit 0 → blue, bit 1 → green, bit 2 → red, bit 3 → intensity
//
// An attribute packs two of them into one word, background in the high
// nibble, foreground in the low one. The numeric values are part of the
// public contract; callers persist and exchange them.
//
// ANSI orders the primaries the other way round (red = 1, blue = 4), so
// emitting a palette entry as SGR swaps bits 0 and 2. That mapping lives in
// `Palette::ansi_index` and nowhere else.

use std::fmt;

use crate::error::Result;
use crate::modifier::{Applying, Modifier};
use crate::surface::Surface;

// ─── Palette ─────────────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// A 4-bit console color code.
    ///
    /// Primaries combine with `|`, and any of them can be brightened with
    /// [`INTENSITY`](Palette::INTENSITY):
    ///
    /// ```
    /// use tcon_term::color::Palette;
    ///
    /// let bright_cyan = Palette::CYAN | Palette::INTENSITY;
    /// assert_eq!(bright_cyan.bits(), 0x0B);
    /// assert_eq!(Palette::GREY | Palette::INTENSITY, Palette::WHITE);
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Palette: u8 {
        const BLUE      = 0x01;
        const GREEN     = 0x02;
        const RED       = 0x04;
        const INTENSITY = 0x08;

        const CYAN   = Self::BLUE.bits() | Self::GREEN.bits();
        const PURPLE = Self::BLUE.bits() | Self::RED.bits();
        const YELLOW = Self::GREEN.bits() | Self::RED.bits();
        const GREY   = Self::BLUE.bits() | Self::GREEN.bits() | Self::RED.bits();
        const WHITE  = Self::GREY.bits() | Self::INTENSITY.bits();
    }
}

impl Palette {
    /// No primaries, no intensity.
    pub const BLACK: Self = Self::empty();

    /// Build from a raw code, keeping only the low nibble.
    #[inline]
    #[must_use]
    pub const fn from_nibble(code: u8) -> Self {
        Self::from_bits_truncate(code & 0x0F)
    }

    /// The ANSI 16-color index for this entry (0–7 normal, 8–15 bright).
    #[inline]
    #[must_use]
    pub const fn ansi_index(self) -> u8 {
        let c = self.bits();
        ((c & 0x01) << 2) | (c & 0x02) | ((c & 0x04) >> 2) | (c & 0x08)
    }
}

// ─── Attribute ───────────────────────────────────────────────────────────────

/// A packed foreground/background pair: `(bg << 4) | fg`.
///
/// Only the low byte is meaningful. Attributes read back from a surface
/// may carry higher bits if they were built with [`from_bits`](Self::from_bits);
/// [`foreground`](Self::foreground) and [`background`](Self::background)
/// ignore them.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Attribute(u16);

impl Attribute {
    /// Grey on black, the state a fresh console starts in.
    pub const DEFAULT: Self = Self(0x07);

    /// Pack a foreground and background color.
    #[inline]
    #[must_use]
    pub const fn new(fg: Palette, bg: Palette) -> Self {
        Self(pack(fg.bits(), bg.bits()))
    }

    /// Wrap a raw attribute word.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// The raw attribute word.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Foreground color (low nibble).
    #[inline]
    #[must_use]
    pub const fn foreground(self) -> Palette {
        Palette::from_bits_truncate((self.0 & 0x0F) as u8)
    }

    /// Background color (second nibble).
    #[inline]
    #[must_use]
    pub const fn background(self) -> Palette {
        Palette::from_bits_truncate(((self.0 >> 4) & 0x0F) as u8)
    }
}

impl Default for Attribute {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Attribute({:#04x})", self.0)
    }
}

/// Pack two raw color codes: `((bg & 0xF) << 4) | (fg & 0xF)`.
#[inline]
#[must_use]
pub const fn pack(fg: u8, bg: u8) -> u16 {
    (((bg & 0x0F) as u16) << 4) | (fg & 0x0F) as u16
}

/// Split a packed attribute into `(fg, bg)` raw codes.
#[inline]
#[must_use]
pub const fn unpack(packed: u16) -> (u8, u8) {
    ((packed & 0x0F) as u8, ((packed >> 4) & 0x0F) as u8)
}

// ─── Color modifier ──────────────────────────────────────────────────────────

/// Sets the sticky output attribute.
///
/// Everything written after this modifier is applied uses its colors,
/// until another `Color` replaces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    attr: Attribute,
}

impl Color {
    /// Foreground text color on a background color.
    #[must_use]
    pub const fn new(fg: Palette, bg: Palette) -> Self {
        Self {
            attr: Attribute::new(fg, bg),
        }
    }

    /// Foreground on black.
    #[must_use]
    pub const fn fg(fg: Palette) -> Self {
        Self::new(fg, Palette::BLACK)
    }

    /// Use a pre-packed attribute verbatim.
    #[must_use]
    pub const fn from_attribute(attr: Attribute) -> Self {
        Self { attr }
    }

    /// The packed attribute this modifier sets.
    #[must_use]
    pub const fn attribute(&self) -> Attribute {
        self.attr
    }
}

impl Modifier for Color {
    fn apply(&self, surface: &mut dyn Surface, _: Applying) -> Result<()> {
        surface.set_attribute(self.attr)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
