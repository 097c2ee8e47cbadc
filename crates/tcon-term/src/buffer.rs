// SPDX-License-Identifier: MIT
//
// ScreenBuffer — the full character/attribute grid behind a surface.
//
// The buffer may be larger than the visible window; everything a surface
// knows about cell contents lives here. Layout is a flat `Vec<Cell>` with
// row-major indexing, so a fill over `(start, len)` is one contiguous slice
// operation regardless of how many rows it spans.

use crate::cell::Cell;
use crate::geometry::{Coord, Size};

/// A 2D grid of [`Cell`]s.
///
/// # Examples
///
/// ```
/// use tcon_term::buffer::ScreenBuffer;
/// use tcon_term::cell::Cell;
/// use tcon_term::geometry::{Coord, Size};
///
/// let mut buf = ScreenBuffer::new(Size::new(80, 25));
/// buf.set(Coord::new(5, 3), Cell::BLANK.with_char(b'X'));
/// assert_eq!(buf.get(Coord::new(5, 3)).map(|c| c.ch), Some(b'X'));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenBuffer {
    size: Size,
    cells: Vec<Cell>,
}

impl ScreenBuffer {
    // ─── Construction ────────────────────────────────────────────────────

    /// Create a buffer filled with [`Cell::BLANK`].
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size,
            cells: vec![Cell::BLANK; size.area() as usize],
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    /// Current dimensions.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.size.cols
    }

    /// Height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.size.rows
    }

    /// All cells, row-major.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The cell at `pos`, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, pos: Coord) -> Option<&Cell> {
        if pos.within(self.size) {
            self.cells.get(pos.offset(self.size.cols))
        } else {
            None
        }
    }

    /// Overwrite the cell at `pos`. Returns `false` if out of bounds.
    pub fn set(&mut self, pos: Coord, cell: Cell) -> bool {
        if !pos.within(self.size) {
            return false;
        }
        let idx = pos.offset(self.size.cols);
        self.cells[idx] = cell;
        true
    }

    /// One row of cells, or `None` if `y` is out of bounds.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y >= self.size.rows {
            return None;
        }
        let w = usize::from(self.size.cols);
        let start = usize::from(y) * w;
        Some(&self.cells[start..start + w])
    }

    /// The characters of row `y` as a string (see [`Cell::display_char`]).
    #[must_use]
    pub fn row_text(&self, y: u16) -> Option<String> {
        self.row(y)
            .map(|row| row.iter().map(|c| c.display_char()).collect())
    }

    /// Count the cells matching `pred`.
    #[must_use]
    pub fn count(&self, pred: impl Fn(&Cell) -> bool) -> usize {
        self.cells.iter().filter(|c| pred(c)).count()
    }

    // ─── Mutation ────────────────────────────────────────────────────────

    /// Resize, keeping the overlapping top-left region.
    ///
    /// New cells are [`Cell::BLANK`]. Resizing to the current size is a no-op.
    pub fn resize(&mut self, size: Size) {
        if size == self.size {
            return;
        }

        let mut cells = vec![Cell::BLANK; size.area() as usize];
        let keep_cols = usize::from(self.size.cols.min(size.cols));
        let keep_rows = self.size.rows.min(size.rows);
        let old_w = usize::from(self.size.cols);
        let new_w = usize::from(size.cols);

        for y in 0..usize::from(keep_rows) {
            let src = y * old_w;
            let dst = y * new_w;
            cells[dst..dst + keep_cols].copy_from_slice(&self.cells[src..src + keep_cols]);
        }

        self.size = size;
        self.cells = cells;
    }

    /// Apply `f` to up to `len` cells starting at `start`, row-major,
    /// stopping at the end of the buffer.
    ///
    /// Returns the number of cells touched. A `start` outside the buffer
    /// touches nothing.
    pub fn fill_from(&mut self, start: Coord, len: u32, f: impl Fn(&mut Cell)) -> u32 {
        if !start.within(self.size) {
            return 0;
        }
        let first = start.offset(self.size.cols);
        let end = first
            .saturating_add(len as usize)
            .min(self.cells.len());
        self.cells[first..end].iter_mut().for_each(f);
        // `end - first` is bounded by `len`.
        u32::try_from(end - first).unwrap_or(len)
    }

    /// Shift every row up by one and blank the last row with `blank`.
    pub fn scroll_up(&mut self, blank: Cell) {
        let w = usize::from(self.size.cols);
        if w == 0 || self.size.rows == 0 {
            return;
        }
        self.cells.copy_within(w.., 0);
        let last = self.cells.len() - w;
        self.cells[last..].fill(blank);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
