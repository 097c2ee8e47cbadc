// SPDX-License-Identifier: MIT
//
// Geometry — sizes, coordinates, and window rectangles.
//
// Every conversion between our types and what the terminal wants on the
// wire is an explicit, checked function. Coordinates are 0-indexed here;
// ANSI addressing is 1-indexed, and `u16::MAX` has no 1-based counterpart,
// so that conversion can fail.

use crate::error::{Error, Result};

// ─── Size ───────────────────────────────────────────────────────────────────

/// Dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

impl Size {
    /// Create a size from columns and rows.
    #[inline]
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    /// Total number of cells (`cols × rows`).
    #[inline]
    #[must_use]
    pub const fn area(self) -> u32 {
        self.cols as u32 * self.rows as u32
    }

    /// Whether either extent is zero.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.cols == 0 || self.rows == 0
    }

    /// Per-axis minimum of two sizes.
    #[inline]
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self {
            cols: self.cols.min(other.cols),
            rows: self.rows.min(other.rows),
        }
    }

    /// Whether `self` fits inside `outer` on both axes.
    #[inline]
    #[must_use]
    pub const fn fits_in(self, outer: Self) -> bool {
        self.cols <= outer.cols && self.rows <= outer.rows
    }

    /// Reject zero extents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if either extent is zero.
    pub fn validate(self) -> Result<Self> {
        if self.is_empty() {
            Err(Error::InvalidDimension {
                width: self.cols,
                height: self.rows,
            })
        } else {
            Ok(self)
        }
    }
}

// ─── Coord ──────────────────────────────────────────────────────────────────

/// A 0-indexed cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Coord {
    /// Column.
    pub x: u16,
    /// Row.
    pub y: u16,
}

impl Coord {
    /// The top-left cell.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Create a coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Whether this position lies inside a grid of `size`.
    #[inline]
    #[must_use]
    pub const fn within(self, size: Size) -> bool {
        self.x < size.cols && self.y < size.rows
    }

    /// Row-major offset of this position in a grid `width` columns wide.
    #[inline]
    #[must_use]
    pub const fn offset(self, width: u16) -> usize {
        self.y as usize * width as usize + self.x as usize
    }

    /// Convert to the 1-based `(row, column)` pair used by CUP.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlatformRejected`] if either coordinate is
    /// `u16::MAX`, which has no 1-based representation.
    pub fn to_one_based(self) -> Result<(u16, u16)> {
        match (self.y.checked_add(1), self.x.checked_add(1)) {
            (Some(row), Some(col)) => Ok((row, col)),
            _ => Err(Error::rejected(
                "set_cursor_position",
                format!("({}, {}) has no 1-based form", self.x, self.y),
            )),
        }
    }
}

// ─── WindowRect ─────────────────────────────────────────────────────────────

/// The visible region of the buffer, with inclusive edges.
///
/// A window `left..=right × top..=bottom`, the same convention consoles use
/// for their small-rect type, which is why a `w × h` window anchored at the
/// origin has `right = w - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowRect {
    /// Left column (inclusive).
    pub left: u16,
    /// Top row (inclusive).
    pub top: u16,
    /// Right column (inclusive).
    pub right: u16,
    /// Bottom row (inclusive).
    pub bottom: u16,
}

impl WindowRect {
    /// A `width × height` window anchored at `(0, 0)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if either extent is zero.
    pub fn anchored(width: u16, height: u16) -> Result<Self> {
        Size::new(width, height).validate()?;
        Ok(Self {
            left: 0,
            top: 0,
            right: width - 1,
            bottom: height - 1,
        })
    }

    /// Width in columns.
    #[inline]
    #[must_use]
    pub const fn width(self) -> u16 {
        self.right.saturating_sub(self.left).saturating_add(1)
    }

    /// Height in rows.
    #[inline]
    #[must_use]
    pub const fn height(self) -> u16 {
        self.bottom.saturating_sub(self.top).saturating_add(1)
    }

    /// Extent as a [`Size`].
    #[inline]
    #[must_use]
    pub const fn size(self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Whether the rectangle is anchored at the origin.
    #[inline]
    #[must_use]
    pub const fn is_anchored(self) -> bool {
        self.left == 0 && self.top == 0
    }

    /// Whether the edges are ordered (`left <= right`, `top <= bottom`).
    #[inline]
    #[must_use]
    pub const fn is_well_formed(self) -> bool {
        self.left <= self.right && self.top <= self.bottom
    }

    /// Whether every cell of the window lies inside a buffer of `size`.
    #[inline]
    #[must_use]
    pub const fn fits_in(self, size: Size) -> bool {
        self.is_well_formed() && self.right < size.cols && self.bottom < size.rows
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
