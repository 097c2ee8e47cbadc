// SPDX-License-Identifier: MIT
//
// Clear — fill the whole buffer with one character and attribute.
//
// The extent is read from the surface when the modifier is applied, never
// stored, so a Clear built before a Dimension still covers the resized
// buffer. The fill is two batched calls (characters, then attributes)
// rather than a per-cell loop. The cursor and sticky attribute are left
// where they were.

use crate::color::Attribute;
use crate::error::Result;
use crate::geometry::Coord;
use crate::modifier::{Applying, Modifier};
use crate::surface::Surface;

/// Whole-buffer fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Clear {
    fill: u8,
    attr: Attribute,
}

impl Clear {
    /// Fill every cell with `fill` drawn in `attr`.
    #[must_use]
    pub const fn new(fill: u8, attr: Attribute) -> Self {
        Self { fill, attr }
    }

    /// The fill character.
    #[must_use]
    pub const fn fill(&self) -> u8 {
        self.fill
    }

    /// The fill attribute.
    #[must_use]
    pub const fn attribute(&self) -> Attribute {
        self.attr
    }
}

impl Default for Clear {
    /// Spaces in grey on black.
    fn default() -> Self {
        Self::new(b' ', Attribute::DEFAULT)
    }
}

impl Modifier for Clear {
    fn apply(&self, surface: &mut dyn Surface, _: Applying) -> Result<()> {
        let cells = surface.buffer_size()?.area();
        surface.fill_characters(Coord::ORIGIN, cells, self.fill)?;
        surface.fill_attributes(Coord::ORIGIN, cells, self.attr)?;
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::color::Palette;
    use crate::dimension::Dimension;
    use crate::geometry::Size;
    use crate::memory::{MemorySurface, SurfaceOp};
    use crate::modifier::compose;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn surface(cols: u16, rows: u16) -> MemorySurface {
        MemorySurface::new(Size::new(cols, rows)).unwrap()
    }

    #[test]
    fn default_is_space_on_grey() {
        let c = Clear::default();
        assert_eq!((c.fill(), c.attribute().bits()), (b' ', 0x07));
    }

    #[test]
    fn covers_every_cell() {
        let mut s = surface(80, 25);
        s.write_text("junk").unwrap();
        compose(&mut s, &Clear::new(b'#', Attribute::from_bits(0x1F))).unwrap();
        let want = Cell::new(b'#', Attribute::from_bits(0x1F));
        assert_eq!(s.buffer().count(|c| *c == want), 2000);
    }

    #[test]
    fn exactly_two_batched_fills() {
        let mut s = surface(80, 25);
        compose(&mut s, &Clear::default()).unwrap();
        assert_eq!(
            s.ops(),
            &[
                SurfaceOp::FillCharacters {
                    start: Coord::ORIGIN,
                    len: 2000,
                    ch: b' '
                },
                SurfaceOp::FillAttributes {
                    start: Coord::ORIGIN,
                    len: 2000,
                    attr: Attribute::DEFAULT
                },
            ]
        );
    }

    #[test]
    fn extent_is_read_at_apply_time() {
        let mut s = surface(80, 25);
        let clear = Clear::new(b'.', Attribute::DEFAULT);
        compose(&mut s, &Dimension::new(100, 40, false).unwrap()).unwrap();
        compose(&mut s, &clear).unwrap();
        assert_eq!(s.buffer().count(|c| c.ch == b'.'), 4000);
    }

    #[test]
    fn covers_buffer_beyond_window() {
        let mut s = surface(100, 50);
        s.set_window(crate::geometry::WindowRect::anchored(20, 10).unwrap())
            .unwrap();
        compose(&mut s, &Clear::new(b'x', Attribute::DEFAULT)).unwrap();
        assert_eq!(s.buffer().count(|c| c.ch == b'x'), 5000);
    }

    #[test]
    fn leaves_cursor_and_sticky_attribute() {
        let mut s = surface(10, 5);
        s.set_cursor_position(Coord::new(4, 2)).unwrap();
        let attr = Attribute::new(Palette::YELLOW, Palette::BLUE);
        s.set_attribute(attr).unwrap();
        compose(&mut s, &Clear::default()).unwrap();
        assert_eq!(s.cursor(), Coord::new(4, 2));
        assert_eq!(s.attribute(), attr);
    }

    proptest! {
        #[test]
        fn idempotent(fill in 0x20u8..0x7F, attr: u8, cols in 1u16..40, rows in 1u16..20) {
            let clear = Clear::new(fill, Attribute::from_bits(u16::from(attr)));
            let mut s = surface(cols, rows);
            compose(&mut s, &clear).unwrap();
            let once = s.buffer().clone();
            compose(&mut s, &clear).unwrap();
            prop_assert_eq!(s.buffer(), &once);
        }
    }
}
