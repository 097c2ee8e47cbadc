// SPDX-License-Identifier: MIT
//
// Output buffering and row rendering.
//
//   OutputBuffer — accumulates every escape sequence and character an
//   operation produces, so each surface call reaches the terminal as one
//   write. The call's effect is then visible atomically and in order.
//
//   RowWriter — paints buffer rows into the visible window, remembering
//   the last attribute it emitted so a run of same-colored cells costs one
//   SGR sequence instead of one per cell.

use std::io::{self, Write};
use std::ops::RangeInclusive;

use crate::ansi;
use crate::buffer::ScreenBuffer;
use crate::cell::display_char;
use crate::color::Attribute;
use crate::geometry::{Coord, WindowRect};

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// Pending terminal output for a single `write()`.
#[derive(Debug)]
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// An empty buffer with 16 KB reserved.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append a cell byte in its on-the-wire form.
    #[inline]
    pub fn push_cell_byte(&mut self, byte: u8) {
        let ch = display_char(byte);
        // `display_char` only yields ASCII.
        self.buf.push(ch as u8);
    }

    /// Drop pending output, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write everything to `w`, flush it, and empty the buffer.
    ///
    /// # Errors
    ///
    /// Whatever `w` reports. The buffer is left intact on failure.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // No-op; `flush_to` does the real write.
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── RowWriter ───────────────────────────────────────────────────────────────

/// Paints buffer rows through a window, skipping redundant SGR.
#[derive(Debug, Default)]
pub struct RowWriter {
    last_attr: Option<Attribute>,
}

impl RowWriter {
    #[must_use]
    pub const fn new() -> Self {
        Self { last_attr: None }
    }

    /// Forget the tracked attribute. Needed after anything else emitted SGR.
    pub const fn invalidate(&mut self) {
        self.last_attr = None;
    }

    /// The attribute the terminal is currently drawing with, if known.
    #[must_use]
    pub const fn last_attr(&self) -> Option<Attribute> {
        self.last_attr
    }

    /// Repaint buffer rows `rows` (buffer coordinates) that fall inside
    /// `window`. Rows outside the window are skipped; each painted row is
    /// clipped to the window's columns.
    pub fn paint_rows(
        &mut self,
        out: &mut OutputBuffer,
        buffer: &ScreenBuffer,
        window: WindowRect,
        rows: RangeInclusive<u16>,
    ) {
        let first = (*rows.start()).max(window.top);
        let last = (*rows.end()).min(window.bottom);
        if first > last {
            return;
        }

        let left = usize::from(window.left);
        let right = usize::from(window.right);

        for y in first..=last {
            let Some(row) = buffer.row(y) else { break };
            if left >= row.len() {
                continue;
            }
            ansi::cursor_to(out, Coord::new(0, y - window.top)).ok();
            for cell in &row[left..=right.min(row.len() - 1)] {
                if self.last_attr != Some(cell.attr) {
                    ansi::attribute(out, cell.attr).ok();
                    self.last_attr = Some(cell.attr);
                }
                out.push_cell_byte(cell.ch);
            }
        }
    }

    /// Make the terminal draw with `attr` again, emitting only on change.
    pub fn restore_attr(&mut self, out: &mut OutputBuffer, attr: Attribute) {
        if self.last_attr != Some(attr) {
            ansi::attribute(out, attr).ok();
            self.last_attr = Some(attr);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
