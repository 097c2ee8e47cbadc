// SPDX-License-Identifier: MIT
//
// Dimension — resize the window and buffer, toggle the cursor.
//
// The surface refuses any state where the window is larger than the buffer,
// so the order of the two resizes matters. Setting the window first
// (what a naive implementation does) fails whenever the target is larger
// than the current buffer; setting the buffer first fails whenever the
// target is smaller than the current window.
//
// We take three steps instead, each of which is valid on its own:
//
//   1. shrink the window to min(current, target) on each axis
//   2. set the buffer to exactly the target
//   3. grow the window to the target
//
// After step 1 the window fits both the old and the new buffer, so step 2
// cannot be rejected for ordering reasons, and after step 2 the target
// window fits by construction. Steps that would not change anything are
// skipped. A target over the surface's window limit is refused before
// step 1, so a failed Dimension leaves the surface as it found it.

use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::{Size, WindowRect};
use crate::modifier::{Applying, Modifier};
use crate::surface::{CursorInfo, Surface};

/// Resizes window and buffer to `width × height` and sets cursor visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimension {
    size: Size,
    hide_cursor: bool,
}

impl Dimension {
    /// A `width × height` surface, optionally with the cursor hidden.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimension`](crate::Error::InvalidDimension) if either
    /// extent is zero.
    pub fn new(width: u16, height: u16, hide_cursor: bool) -> Result<Self> {
        let size = Size::new(width, height).validate()?;
        Ok(Self { size, hide_cursor })
    }

    /// Width in columns.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.size.cols
    }

    /// Height in rows.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.size.rows
    }

    /// Whether applying this modifier hides the cursor.
    #[must_use]
    pub const fn hides_cursor(&self) -> bool {
        self.hide_cursor
    }
}

impl Modifier for Dimension {
    fn apply(&self, surface: &mut dyn Surface, _: Applying) -> Result<()> {
        if let Some(max) = surface.max_window()? {
            if !self.size.fits_in(max) {
                return Err(Error::InvalidDimension {
                    width: self.size.cols,
                    height: self.size.rows,
                });
            }
        }

        let current = surface.window()?;
        let target = WindowRect::anchored(self.size.cols, self.size.rows)?;

        let interim = current.size().min(self.size);
        if !current.is_anchored() || interim != current.size() {
            debug!(?interim, "shrinking window before buffer resize");
            surface.set_window(WindowRect::anchored(interim.cols, interim.rows)?)?;
        }

        if surface.buffer_size()? != self.size {
            surface.set_buffer_size(self.size)?;
        }

        if surface.window()? != target {
            surface.set_window(target)?;
        }

        surface.set_cursor_info(CursorInfo::full(!self.hide_cursor))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
