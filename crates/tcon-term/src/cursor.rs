// SPDX-License-Identifier: MIT
//
// Cursor — a trackable position that can be committed to a surface.
//
// Everything except `apply` is local arithmetic on the value. A caller
// can hold one across frames, nudge it with `move_by`, compare it with
// the previous frame's, and only touch the terminal when it is applied.
// Coordinates are plain u16 and wrap at the boundary.

use crate::error::Result;
use crate::geometry::Coord;
use crate::modifier::{Applying, Modifier};
use crate::surface::Surface;

/// An absolute cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cursor {
    x: u16,
    y: u16,
}

impl Cursor {
    /// A cursor at column `x`, row `y`.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Back to `(0, 0)`.
    pub const fn reset(&mut self) {
        self.x = 0;
        self.y = 0;
    }

    /// Jump to `(x, y)`.
    pub const fn set(&mut self, x: u16, y: u16) {
        self.x = x;
        self.y = y;
    }

    /// Offset by `(dx, dy)`, wrapping on overflow in either direction.
    ///
    /// ```
    /// use tcon_term::cursor::Cursor;
    ///
    /// let mut c = Cursor::new(u16::MAX, 3);
    /// c.move_by(1, -4);
    /// assert_eq!((c.x(), c.y()), (0, u16::MAX));
    /// ```
    pub const fn move_by(&mut self, dx: i16, dy: i16) {
        self.x = self.x.wrapping_add_signed(dx);
        self.y = self.y.wrapping_add_signed(dy);
    }

    /// Column.
    #[must_use]
    pub const fn x(&self) -> u16 {
        self.x
    }

    /// Row.
    #[must_use]
    pub const fn y(&self) -> u16 {
        self.y
    }

    /// The position as a buffer coordinate.
    #[must_use]
    pub const fn position(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}

impl From<Coord> for Cursor {
    fn from(c: Coord) -> Self {
        Self::new(c.x, c.y)
    }
}

impl Modifier for Cursor {
    fn apply(&self, surface: &mut dyn Surface, _: Applying) -> Result<()> {
        surface.set_cursor_position(self.position())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
