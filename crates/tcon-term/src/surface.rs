// SPDX-License-Identifier: MIT
//
// Surface — the terminal handle contract.
//
// A surface is whatever the modifiers mutate: a real terminal, or an
// in-memory double in tests. It is passed explicitly to every operation;
// there is no process-global handle to reach for.
//
// `SurfaceState` is the I/O-free model both implementations share. It owns
// the buffer, window, cursor, and sticky attribute, and it is where the
// platform rules are enforced:
//
//   - the window always fits inside the buffer, at every step
//   - zero extents are a dimension error, never clamped
//   - the cursor always sits inside the buffer
//
// A real terminal applies a change to `SurfaceState` first and only then
// renders the result, so a rejected call leaves both untouched.

use std::fmt;

use crate::buffer::ScreenBuffer;
use crate::cell::{store_byte, Cell};
use crate::color::Attribute;
use crate::error::{Error, Result};
use crate::geometry::{Coord, Size, WindowRect};

// ─── CursorInfo ─────────────────────────────────────────────────────────────

/// Cursor visibility and thickness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CursorInfo {
    /// Percentage of the cell the cursor fills, `1..=100`.
    pub size: u8,
    /// Whether the cursor is shown.
    pub visible: bool,
}

impl CursorInfo {
    /// Thickness used when a modifier only cares about visibility.
    pub const FULL: u8 = 100;

    /// A full-cell cursor with the given visibility.
    #[must_use]
    pub const fn full(visible: bool) -> Self {
        Self {
            size: Self::FULL,
            visible,
        }
    }
}

impl Default for CursorInfo {
    fn default() -> Self {
        Self {
            size: 25,
            visible: true,
        }
    }
}

// ─── Surface ────────────────────────────────────────────────────────────────

/// A character-grid output surface.
///
/// Every method is one synchronous call; effects land in call order.
/// Implementations provide no locking. Sharing one across threads is the
/// caller's problem.
pub trait Surface {
    /// Live buffer dimensions.
    ///
    /// # Errors
    ///
    /// [`Error::SurfaceUnavailable`] if the surface is gone.
    fn buffer_size(&self) -> Result<Size>;

    /// The visible window.
    ///
    /// # Errors
    ///
    /// [`Error::SurfaceUnavailable`] if the surface is gone.
    fn window(&self) -> Result<WindowRect>;

    /// Current cursor position.
    ///
    /// # Errors
    ///
    /// [`Error::SurfaceUnavailable`] if the surface is gone.
    fn cursor_position(&self) -> Result<Coord>;

    /// Largest window the surface can show, if it has a limit.
    ///
    /// # Errors
    ///
    /// [`Error::SurfaceUnavailable`] if the surface is gone.
    fn max_window(&self) -> Result<Option<Size>>;

    /// Move and resize the visible window.
    ///
    /// # Errors
    ///
    /// [`Error::PlatformRejected`] if the window would not fit the buffer,
    /// [`Error::InvalidDimension`] if it exceeds the surface maximum.
    fn set_window(&mut self, rect: WindowRect) -> Result<()>;

    /// Resize the backing buffer.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimension`] for a zero extent,
    /// [`Error::PlatformRejected`] if the buffer would be smaller than
    /// the window.
    fn set_buffer_size(&mut self, size: Size) -> Result<()>;

    /// Set cursor thickness and visibility.
    ///
    /// # Errors
    ///
    /// [`Error::PlatformRejected`] if `size` is outside `1..=100`.
    fn set_cursor_info(&mut self, info: CursorInfo) -> Result<()>;

    /// Set the sticky attribute used by subsequent writes.
    ///
    /// # Errors
    ///
    /// [`Error::SurfaceUnavailable`] if the surface is gone.
    fn set_attribute(&mut self, attr: Attribute) -> Result<()>;

    /// Move the cursor to an absolute buffer position.
    ///
    /// # Errors
    ///
    /// [`Error::PlatformRejected`] if `pos` is outside the buffer.
    fn set_cursor_position(&mut self, pos: Coord) -> Result<()>;

    /// Write `ch` into `len` cells from `start`, row-major, clipped at the
    /// end of the buffer. Leaves attributes, cursor, and the sticky
    /// attribute alone. Returns the number of cells written.
    ///
    /// # Errors
    ///
    /// [`Error::PlatformRejected`] if `start` is outside the buffer.
    fn fill_characters(&mut self, start: Coord, len: u32, ch: u8) -> Result<u32>;

    /// Write `attr` into `len` cells from `start`; see
    /// [`fill_characters`](Self::fill_characters).
    ///
    /// # Errors
    ///
    /// [`Error::PlatformRejected`] if `start` is outside the buffer.
    fn fill_attributes(&mut self, start: Coord, len: u32, attr: Attribute) -> Result<u32>;

    /// Write text at the cursor with the sticky attribute.
    ///
    /// `\n` moves to the start of the next row, `\r` to the start of the
    /// current one. The cursor wraps at the right edge; past the last row
    /// the buffer scrolls up by one.
    ///
    /// # Errors
    ///
    /// [`Error::SurfaceUnavailable`] if the surface is gone.
    fn write_text(&mut self, text: &str) -> Result<()>;
}

// ─── SurfaceState ───────────────────────────────────────────────────────────

/// Rows touched by a [`SurfaceState::write_text`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextDamage {
    /// First row written (after any scrolling).
    pub first_row: u16,
    /// Last row written (inclusive).
    pub last_row: u16,
    /// Whether the buffer scrolled; if so every row moved.
    pub scrolled: bool,
}

/// The shared model behind every surface implementation.
#[derive(Clone, PartialEq, Eq)]
pub struct SurfaceState {
    buffer: ScreenBuffer,
    window: WindowRect,
    cursor: Coord,
    cursor_info: CursorInfo,
    attr: Attribute,
    max_window: Option<Size>,
}

impl SurfaceState {
    /// A blank surface whose window covers the whole buffer.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimension`] for a zero extent.
    pub fn new(size: Size) -> Result<Self> {
        let size = size.validate()?;
        Ok(Self {
            buffer: ScreenBuffer::new(size),
            window: WindowRect::anchored(size.cols, size.rows)?,
            cursor: Coord::ORIGIN,
            cursor_info: CursorInfo::default(),
            attr: Attribute::DEFAULT,
            max_window: None,
        })
    }

    /// Cap the window size, as a physical display would.
    #[must_use]
    pub fn with_max_window(mut self, max: Size) -> Self {
        self.max_window = Some(max);
        self
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    /// The backing buffer.
    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &ScreenBuffer {
        &self.buffer
    }

    /// Buffer dimensions.
    #[inline]
    #[must_use]
    pub const fn buffer_size(&self) -> Size {
        self.buffer.size()
    }

    /// The visible window.
    #[inline]
    #[must_use]
    pub const fn window(&self) -> WindowRect {
        self.window
    }

    /// The window size cap, if any.
    #[inline]
    #[must_use]
    pub const fn max_window(&self) -> Option<Size> {
        self.max_window
    }

    /// Cursor position.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Coord {
        self.cursor
    }

    /// Cursor thickness and visibility.
    #[inline]
    #[must_use]
    pub const fn cursor_info(&self) -> CursorInfo {
        self.cursor_info
    }

    /// The sticky attribute.
    #[inline]
    #[must_use]
    pub const fn attribute(&self) -> Attribute {
        self.attr
    }

    // ─── Validated mutation ──────────────────────────────────────────────

    /// See [`Surface::set_window`].
    ///
    /// # Errors
    ///
    /// As [`Surface::set_window`].
    pub fn set_window(&mut self, rect: WindowRect) -> Result<()> {
        if !rect.is_well_formed() {
            return Err(Error::rejected(
                "set_window",
                format!("inverted rectangle {rect:?}"),
            ));
        }
        let size = rect.size();
        if let Some(max) = self.max_window {
            if !size.fits_in(max) {
                return Err(Error::InvalidDimension {
                    width: size.cols,
                    height: size.rows,
                });
            }
        }
        if !rect.fits_in(self.buffer.size()) {
            let b = self.buffer.size();
            return Err(Error::rejected(
                "set_window",
                format!(
                    "{}x{} window at ({}, {}) exceeds {}x{} buffer",
                    size.cols, size.rows, rect.left, rect.top, b.cols, b.rows
                ),
            ));
        }
        self.window = rect;
        Ok(())
    }

    /// See [`Surface::set_buffer_size`].
    ///
    /// # Errors
    ///
    /// As [`Surface::set_buffer_size`].
    pub fn set_buffer_size(&mut self, size: Size) -> Result<()> {
        let size = size.validate()?;
        if !self.window.fits_in(size) {
            let w = self.window.size();
            return Err(Error::rejected(
                "set_buffer_size",
                format!(
                    "{}x{} buffer cannot hold {}x{} window",
                    size.cols, size.rows, w.cols, w.rows
                ),
            ));
        }
        self.buffer.resize(size);
        self.cursor = Coord::new(
            self.cursor.x.min(size.cols - 1),
            self.cursor.y.min(size.rows - 1),
        );
        Ok(())
    }

    /// See [`Surface::set_cursor_info`].
    ///
    /// # Errors
    ///
    /// As [`Surface::set_cursor_info`].
    pub fn set_cursor_info(&mut self, info: CursorInfo) -> Result<()> {
        if !(1..=CursorInfo::FULL).contains(&info.size) {
            return Err(Error::rejected(
                "set_cursor_info",
                format!("cursor size {} outside 1..=100", info.size),
            ));
        }
        self.cursor_info = info;
        Ok(())
    }

    /// See [`Surface::set_attribute`].
    pub const fn set_attribute(&mut self, attr: Attribute) {
        self.attr = attr;
    }

    /// See [`Surface::set_cursor_position`].
    ///
    /// # Errors
    ///
    /// As [`Surface::set_cursor_position`].
    pub fn set_cursor_position(&mut self, pos: Coord) -> Result<()> {
        if !pos.within(self.buffer.size()) {
            return Err(out_of_buffer("set_cursor_position", pos, self.buffer.size()));
        }
        self.cursor = pos;
        Ok(())
    }

    /// See [`Surface::fill_characters`].
    ///
    /// # Errors
    ///
    /// As [`Surface::fill_characters`].
    pub fn fill_characters(&mut self, start: Coord, len: u32, ch: u8) -> Result<u32> {
        if !start.within(self.buffer.size()) {
            return Err(out_of_buffer("fill_characters", start, self.buffer.size()));
        }
        Ok(self.buffer.fill_from(start, len, |c| c.ch = ch))
    }

    /// See [`Surface::fill_attributes`].
    ///
    /// # Errors
    ///
    /// As [`Surface::fill_attributes`].
    pub fn fill_attributes(&mut self, start: Coord, len: u32, attr: Attribute) -> Result<u32> {
        if !start.within(self.buffer.size()) {
            return Err(out_of_buffer("fill_attributes", start, self.buffer.size()));
        }
        Ok(self.buffer.fill_from(start, len, |c| c.attr = attr))
    }

    /// See [`Surface::write_text`]. Returns which rows changed.
    pub fn write_text(&mut self, text: &str) -> TextDamage {
        let size = self.buffer.size();
        let mut first_row = self.cursor.y;
        let mut last_row = self.cursor.y;
        let mut scrolled = false;

        for ch in text.chars() {
            match ch {
                '\r' => self.cursor.x = 0,
                '\n' => {
                    self.cursor.x = 0;
                    scrolled |= self.next_row();
                }
                _ => {
                    self.buffer
                        .set(self.cursor, Cell::new(store_byte(ch), self.attr));
                    last_row = last_row.max(self.cursor.y);
                    if self.cursor.x + 1 < size.cols {
                        self.cursor.x += 1;
                    } else {
                        self.cursor.x = 0;
                        scrolled |= self.next_row();
                    }
                }
            }
            first_row = first_row.min(self.cursor.y);
        }

        if scrolled {
            first_row = 0;
            last_row = size.rows - 1;
        }

        TextDamage {
            first_row,
            last_row,
            scrolled,
        }
    }

    /// Advance the cursor one row, scrolling at the bottom. Returns
    /// whether a scroll happened.
    fn next_row(&mut self) -> bool {
        if self.cursor.y + 1 < self.buffer.height() {
            self.cursor.y += 1;
            false
        } else {
            self.buffer.scroll_up(Cell::BLANK.with_attr(self.attr));
            true
        }
    }
}

impl fmt::Debug for SurfaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceState")
            .field("buffer", &self.buffer.size())
            .field("window", &self.window)
            .field("cursor", &self.cursor)
            .field("cursor_info", &self.cursor_info)
            .field("attr", &self.attr)
            .finish_non_exhaustive()
    }
}

fn out_of_buffer(op: &'static str, pos: Coord, size: Size) -> Error {
    Error::rejected(
        op,
        format!(
            "({}, {}) outside {}x{} buffer",
            pos.x, pos.y, size.cols, size.rows
        ),
    )
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Palette;
    use pretty_assertions::assert_eq;

    fn state(cols: u16, rows: u16) -> SurfaceState {
        SurfaceState::new(Size::new(cols, rows)).unwrap()
    }

    // ── Construction ──────────────────────────────────────────────────

    #[test]
    fn new_window_covers_buffer() {
        let s = state(80, 25);
        assert_eq!(s.window(), WindowRect::anchored(80, 25).unwrap());
        assert_eq!(s.cursor(), Coord::ORIGIN);
        assert_eq!(s.attribute(), Attribute::DEFAULT);
    }

    #[test]
    fn new_rejects_zero() {
        assert!(matches!(
            SurfaceState::new(Size::new(0, 10)),
            Err(Error::InvalidDimension { .. })
        ));
    }

    // ── Window / buffer ordering rules ────────────────────────────────

    #[test]
    fn window_larger_than_buffer_is_rejected() {
        let mut s = state(80, 25);
        let err = s.set_window(WindowRect::anchored(100, 25).unwrap()).unwrap_err();
        assert!(matches!(err, Error::PlatformRejected { op: "set_window", .. }));
        assert_eq!(s.window().size(), Size::new(80, 25));
    }

    #[test]
    fn buffer_smaller_than_window_is_rejected() {
        let mut s = state(80, 25);
        let err = s.set_buffer_size(Size::new(40, 25)).unwrap_err();
        assert!(matches!(err, Error::PlatformRejected { op: "set_buffer_size", .. }));
        assert_eq!(s.buffer_size(), Size::new(80, 25));
    }

    #[test]
    fn shrink_window_then_buffer_succeeds() {
        let mut s = state(80, 25);
        s.set_window(WindowRect::anchored(40, 20).unwrap()).unwrap();
        s.set_buffer_size(Size::new(40, 20)).unwrap();
        assert_eq!(s.buffer_size(), Size::new(40, 20));
    }

    #[test]
    fn max_window_is_a_dimension_error() {
        let mut s = state(200, 100).with_max_window(Size::new(120, 50));
        assert!(matches!(
            s.set_window(WindowRect::anchored(121, 50).unwrap()),
            Err(Error::InvalidDimension { width: 121, height: 50 })
        ));
        assert!(s.set_window(WindowRect::anchored(120, 50).unwrap()).is_ok());
    }

    #[test]
    fn inverted_window_is_rejected() {
        let mut s = state(10, 10);
        let rect = WindowRect {
            left: 5,
            top: 0,
            right: 2,
            bottom: 3,
        };
        assert!(s.set_window(rect).is_err());
    }

    #[test]
    fn buffer_shrink_clamps_cursor() {
        let mut s = state(80, 25);
        s.set_cursor_position(Coord::new(79, 24)).unwrap();
        s.set_window(WindowRect::anchored(10, 5).unwrap()).unwrap();
        s.set_buffer_size(Size::new(10, 5)).unwrap();
        assert_eq!(s.cursor(), Coord::new(9, 4));
    }

    // ── Cursor ────────────────────────────────────────────────────────

    #[test]
    fn cursor_outside_buffer_is_rejected() {
        let mut s = state(80, 25);
        assert!(s.set_cursor_position(Coord::new(80, 0)).is_err());
        assert_eq!(s.cursor(), Coord::ORIGIN);
    }

    #[test]
    fn cursor_info_size_bounds() {
        let mut s = state(10, 10);
        assert!(s.set_cursor_info(CursorInfo { size: 0, visible: true }).is_err());
        assert!(s.set_cursor_info(CursorInfo { size: 101, visible: true }).is_err());
        s.set_cursor_info(CursorInfo::full(false)).unwrap();
        assert!(!s.cursor_info().visible);
    }

    // ── Fills ─────────────────────────────────────────────────────────

    #[test]
    fn fills_leave_cursor_and_sticky_attribute() {
        let mut s = state(4, 2);
        s.set_cursor_position(Coord::new(2, 1)).unwrap();
        let attr = Attribute::new(Palette::RED, Palette::BLUE);
        s.set_attribute(attr);
        assert_eq!(s.fill_characters(Coord::ORIGIN, 8, b'.').unwrap(), 8);
        assert_eq!(s.fill_attributes(Coord::ORIGIN, 8, Attribute::DEFAULT).unwrap(), 8);
        assert_eq!(s.cursor(), Coord::new(2, 1));
        assert_eq!(s.attribute(), attr);
    }

    #[test]
    fn fill_from_outside_is_rejected() {
        let mut s = state(4, 2);
        assert!(s.fill_characters(Coord::new(0, 2), 1, b'x').is_err());
    }

    // ── Text ──────────────────────────────────────────────────────────

    #[test]
    fn write_text_uses_sticky_attribute() {
        let mut s = state(10, 3);
        let attr = Attribute::new(Palette::WHITE, Palette::BLACK);
        s.set_attribute(attr);
        let damage = s.write_text("hi");
        assert_eq!(s.buffer().row_text(0).unwrap(), "hi        ");
        assert_eq!(s.buffer().get(Coord::new(1, 0)).unwrap().attr, attr);
        assert_eq!(s.cursor(), Coord::new(2, 0));
        assert_eq!(
            damage,
            TextDamage {
                first_row: 0,
                last_row: 0,
                scrolled: false
            }
        );
    }

    #[test]
    fn write_text_wraps_at_right_edge() {
        let mut s = state(3, 3);
        s.write_text("abcd");
        assert_eq!(s.buffer().row_text(0).unwrap(), "abc");
        assert_eq!(s.buffer().row_text(1).unwrap(), "d  ");
        assert_eq!(s.cursor(), Coord::new(1, 1));
    }

    #[test]
    fn write_text_newline_and_return() {
        let mut s = state(5, 3);
        s.write_text("ab\ncd\rX");
        assert_eq!(s.buffer().row_text(0).unwrap(), "ab   ");
        assert_eq!(s.buffer().row_text(1).unwrap(), "Xd   ");
    }

    #[test]
    fn write_text_scrolls_at_bottom() {
        let mut s = state(4, 2);
        let damage = s.write_text("aaa\nbbb\nc");
        assert!(damage.scrolled);
        assert_eq!(s.buffer().row_text(0).unwrap(), "bbb ");
        assert_eq!(s.buffer().row_text(1).unwrap(), "c   ");
        assert_eq!((damage.first_row, damage.last_row), (0, 1));
    }

    #[test]
    fn write_text_exact_width_then_newline_leaves_blank_row() {
        let mut s = state(3, 3);
        s.write_text("abc\nd");
        assert_eq!(s.buffer().row_text(1).unwrap(), "   ");
        assert_eq!(s.buffer().row_text(2).unwrap(), "d  ");
    }

    #[test]
    fn write_text_non_ascii_stored_as_replacement() {
        let mut s = state(4, 1);
        s.write_text("é");
        assert_eq!(s.buffer().get(Coord::ORIGIN).unwrap().ch, b'?');
    }
}
