// SPDX-License-Identifier: MIT
//
// MemorySurface — an in-memory surface and keyboard.
//
// Wraps `SurfaceState` and records every mutation that succeeded, so tests
// can assert both the resulting state and the exact sequence of platform
// calls a modifier made. Rejected calls are not recorded. Key state is set
// by hand with `press` / `release`.

use std::collections::HashSet;

use crate::buffer::ScreenBuffer;
use crate::color::Attribute;
use crate::error::{Error, Result};
use crate::geometry::{Coord, Size, WindowRect};
use crate::keyboard::{Keyboard, VirtualKey};
use crate::surface::{CursorInfo, Surface, SurfaceState};

/// One successful mutating call on a [`MemorySurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceOp {
    SetWindow(WindowRect),
    SetBufferSize(Size),
    SetCursorInfo(CursorInfo),
    SetAttribute(Attribute),
    SetCursorPosition(Coord),
    FillCharacters { start: Coord, len: u32, ch: u8 },
    FillAttributes { start: Coord, len: u32, attr: Attribute },
    WriteText(String),
}

/// A surface with no terminal behind it.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    state: SurfaceState,
    ops: Vec<SurfaceOp>,
    pressed: HashSet<VirtualKey>,
    detached: bool,
}

impl MemorySurface {
    /// A blank `size` surface with the window covering the buffer.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimension`] for a zero extent.
    pub fn new(size: Size) -> Result<Self> {
        Ok(Self {
            state: SurfaceState::new(size)?,
            ops: Vec::new(),
            pressed: HashSet::new(),
            detached: false,
        })
    }

    /// Cap the window size, as a physical display would.
    #[must_use]
    pub fn with_max_window(mut self, max: Size) -> Self {
        self.state = self.state.with_max_window(max);
        self
    }

    /// Make every subsequent call fail with [`Error::SurfaceUnavailable`].
    pub fn detach(&mut self) {
        self.detached = true;
    }

    /// Successful mutations, oldest first.
    #[must_use]
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    #[must_use]
    pub const fn state(&self) -> &SurfaceState {
        &self.state
    }

    #[must_use]
    pub const fn buffer(&self) -> &ScreenBuffer {
        self.state.buffer()
    }

    #[must_use]
    pub const fn window_rect(&self) -> WindowRect {
        self.state.window()
    }

    #[must_use]
    pub const fn cursor(&self) -> Coord {
        self.state.cursor()
    }

    #[must_use]
    pub const fn cursor_info(&self) -> CursorInfo {
        self.state.cursor_info()
    }

    #[must_use]
    pub const fn attribute(&self) -> Attribute {
        self.state.attribute()
    }

    // ─── Keys ────────────────────────────────────────────────────────────

    /// Mark `key` as held down.
    pub fn press(&mut self, key: VirtualKey) {
        self.pressed.insert(key);
    }

    /// Mark `key` as released.
    pub fn release(&mut self, key: VirtualKey) {
        self.pressed.remove(&key);
    }

    // ─── Internal ────────────────────────────────────────────────────────

    fn live(&self) -> Result<()> {
        if self.detached {
            Err(Error::SurfaceUnavailable("memory surface detached".into()))
        } else {
            Ok(())
        }
    }

    fn record<T>(&mut self, op: SurfaceOp, result: Result<T>) -> Result<T> {
        if result.is_ok() {
            self.ops.push(op);
        }
        result
    }
}

impl Surface for MemorySurface {
    fn buffer_size(&self) -> Result<Size> {
        self.live()?;
        Ok(self.state.buffer_size())
    }

    fn window(&self) -> Result<WindowRect> {
        self.live()?;
        Ok(self.state.window())
    }

    fn max_window(&self) -> Result<Option<Size>> {
        self.live()?;
        Ok(self.state.max_window())
    }

    fn cursor_position(&self) -> Result<Coord> {
        self.live()?;
        Ok(self.state.cursor())
    }

    fn set_window(&mut self, rect: WindowRect) -> Result<()> {
        self.live()?;
        let result = self.state.set_window(rect);
        self.record(SurfaceOp::SetWindow(rect), result)
    }

    fn set_buffer_size(&mut self, size: Size) -> Result<()> {
        self.live()?;
        let result = self.state.set_buffer_size(size);
        self.record(SurfaceOp::SetBufferSize(size), result)
    }

    fn set_cursor_info(&mut self, info: CursorInfo) -> Result<()> {
        self.live()?;
        let result = self.state.set_cursor_info(info);
        self.record(SurfaceOp::SetCursorInfo(info), result)
    }

    fn set_attribute(&mut self, attr: Attribute) -> Result<()> {
        self.live()?;
        self.state.set_attribute(attr);
        self.record(SurfaceOp::SetAttribute(attr), Ok(()))
    }

    fn set_cursor_position(&mut self, pos: Coord) -> Result<()> {
        self.live()?;
        let result = self.state.set_cursor_position(pos);
        self.record(SurfaceOp::SetCursorPosition(pos), result)
    }

    fn fill_characters(&mut self, start: Coord, len: u32, ch: u8) -> Result<u32> {
        self.live()?;
        let result = self.state.fill_characters(start, len, ch);
        self.record(SurfaceOp::FillCharacters { start, len, ch }, result)
    }

    fn fill_attributes(&mut self, start: Coord, len: u32, attr: Attribute) -> Result<u32> {
        self.live()?;
        let result = self.state.fill_attributes(start, len, attr);
        self.record(SurfaceOp::FillAttributes { start, len, attr }, result)
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.live()?;
        self.state.write_text(text);
        self.record(SurfaceOp::WriteText(text.to_owned()), Ok(()))
    }
}

impl Keyboard for MemorySurface {
    fn key_down(&mut self, key: VirtualKey) -> Result<bool> {
        self.live()?;
        Ok(self.pressed.contains(&key))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn surface() -> MemorySurface {
        MemorySurface::new(Size::new(10, 4)).unwrap()
    }

    #[test]
    fn rejected_calls_are_not_recorded() {
        let mut s = surface();
        assert!(s.set_cursor_position(Coord::new(10, 0)).is_err());
        assert!(s.set_buffer_size(Size::new(5, 4)).is_err());
        assert!(s.ops().is_empty());
    }

    #[test]
    fn successful_calls_are_recorded_in_order() {
        let mut s = surface();
        s.set_cursor_position(Coord::new(1, 1)).unwrap();
        s.write_text("ok").unwrap();
        assert_eq!(
            s.ops(),
            &[
                SurfaceOp::SetCursorPosition(Coord::new(1, 1)),
                SurfaceOp::WriteText("ok".into()),
            ]
        );
        assert_eq!(s.buffer().row_text(1).unwrap(), " ok       ");
    }

    #[test]
    fn detached_fails_every_call() {
        let mut s = surface();
        s.detach();
        assert!(matches!(s.buffer_size(), Err(Error::SurfaceUnavailable(_))));
        assert!(matches!(
            s.set_attribute(Attribute::DEFAULT),
            Err(Error::SurfaceUnavailable(_))
        ));
        assert!(matches!(
            s.key_down(VirtualKey::ESCAPE),
            Err(Error::SurfaceUnavailable(_))
        ));
        assert!(s.ops().is_empty());
    }

    #[test]
    fn press_and_release() {
        let mut s = surface();
        assert!(!s.key_down(VirtualKey::SPACE).unwrap());
        s.press(VirtualKey::SPACE);
        assert!(s.key_down(VirtualKey::SPACE).unwrap());
        assert!(!s.key_down(VirtualKey::RETURN).unwrap());
        s.release(VirtualKey::SPACE);
        assert!(!s.key_down(VirtualKey::SPACE).unwrap());
    }

    #[test]
    fn fill_records_requested_length() {
        let mut s = surface();
        assert_eq!(s.fill_characters(Coord::new(0, 3), 100, b'#').unwrap(), 10);
        assert_eq!(
            s.ops(),
            &[SurfaceOp::FillCharacters {
                start: Coord::new(0, 3),
                len: 100,
                ch: b'#'
            }]
        );
    }
}
