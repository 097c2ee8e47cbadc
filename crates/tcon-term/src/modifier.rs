// SPDX-License-Identifier: MIT
//
// Modifiers — value objects that each perform one surface mutation.
//
// A modifier owns all of its state and exposes a single `apply`. Callers
// cannot invoke `apply` themselves: it takes an `Applying` token that only
// `compose` can build. `compose` applies the modifier and hands the surface
// back so calls can be chained:
//
//   compose(compose(&mut term, &Dimension::new(80, 25, false)?)?, &Clear::default())?;
//
// or, with the extension trait,
//
//   term.with(&dim)?.with(&Color::fg(Palette::WHITE))?.with(&Cursor::new(0, 0))?;
//
// Effects land in exactly the order `compose` is called. There is no
// batching and no reordering; a failure stops the chain at that modifier.

use std::fmt::Debug;

use crate::clear::Clear;
use crate::color::Color;
use crate::cursor::Cursor;
use crate::dimension::Dimension;
use crate::error::Result;
use crate::surface::Surface;

// ─── Modifier ────────────────────────────────────────────────────────────────

/// Capability to run [`Modifier::apply`].
///
/// Only [`compose`] constructs one, so every application goes through it.
/// A modifier that delegates to others forwards the token it was given.
///
/// ```compile_fail
/// use tcon_term::modifier::Applying;
///
/// let forged = Applying(());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Applying(());

/// One terminal-state mutation.
///
/// Object safe: heterogeneous modifiers can be held as `&dyn Modifier` and
/// applied in sequence. New modifiers are added by implementing this trait.
pub trait Modifier: Debug {
    /// Perform the mutation against `surface`.
    ///
    /// # Errors
    ///
    /// Whatever the underlying surface call reports.
    fn apply(&self, surface: &mut dyn Surface, token: Applying) -> Result<()>;
}

impl<M: Modifier + ?Sized> Modifier for &M {
    fn apply(&self, surface: &mut dyn Surface, token: Applying) -> Result<()> {
        (**self).apply(surface, token)
    }
}

impl<M: Modifier + ?Sized> Modifier for Box<M> {
    fn apply(&self, surface: &mut dyn Surface, token: Applying) -> Result<()> {
        (**self).apply(surface, token)
    }
}

// ─── Composition ─────────────────────────────────────────────────────────────

/// Apply `modifier` to `dest` and return `dest` for chaining.
///
/// This is the only way to run a modifier.
///
/// # Errors
///
/// Propagates the modifier's failure; `dest` is not returned in that case.
pub fn compose<'s, S, M>(dest: &'s mut S, modifier: &M) -> Result<&'s mut S>
where
    S: Surface,
    M: Modifier + ?Sized,
{
    tracing::trace!(?modifier, "apply");
    modifier.apply(&mut *dest, Applying(()))?;
    Ok(dest)
}

/// Apply each modifier in slice order, stopping at the first failure.
///
/// # Errors
///
/// The first modifier failure; modifiers after it are not applied.
pub fn compose_all<'s, S: Surface>(
    dest: &'s mut S,
    modifiers: &[&dyn Modifier],
) -> Result<&'s mut S> {
    modifiers.iter().try_fold(dest, |dest, m| compose(dest, *m))
}

/// Method-call form of [`compose`].
pub trait SurfaceExt: Surface + Sized {
    /// Apply `modifier` via [`compose`] and return `self`.
    ///
    /// # Errors
    ///
    /// As [`compose`].
    fn with<M: Modifier + ?Sized>(&mut self, modifier: &M) -> Result<&mut Self> {
        compose(self, modifier)
    }
}

impl<S: Surface> SurfaceExt for S {}

// ─── AnyModifier ─────────────────────────────────────────────────────────────

/// The built-in modifiers as one closed enum.
///
/// Handy for storing a script of mutations in a `Vec` without boxing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnyModifier {
    /// Window/buffer size and cursor visibility.
    Dimension(Dimension),
    /// Sticky attribute.
    Color(Color),
    /// Absolute cursor position.
    Cursor(Cursor),
    /// Whole-buffer fill.
    Clear(Clear),
}

impl Modifier for AnyModifier {
    fn apply(&self, surface: &mut dyn Surface, token: Applying) -> Result<()> {
        match self {
            Self::Dimension(m) => m.apply(surface, token),
            Self::Color(m) => m.apply(surface, token),
            Self::Cursor(m) => m.apply(surface, token),
            Self::Clear(m) => m.apply(surface, token),
        }
    }
}

impl From<Dimension> for AnyModifier {
    fn from(m: Dimension) -> Self {
        Self::Dimension(m)
    }
}

impl From<Color> for AnyModifier {
    fn from(m: Color) -> Self {
        Self::Color(m)
    }
}

impl From<Cursor> for AnyModifier {
    fn from(m: Cursor) -> Self {
        Self::Cursor(m)
    }
}

impl From<Clear> for AnyModifier {
    fn from(m: Clear) -> Self {
        Self::Clear(m)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Attribute, Palette};
    use crate::error::Error;
    use crate::geometry::{Coord, Size};
    use crate::memory::{MemorySurface, SurfaceOp};
    use pretty_assertions::assert_eq;

    fn surface() -> MemorySurface {
        MemorySurface::new(Size::new(80, 25)).unwrap()
    }

    #[test]
    fn compose_returns_same_destination() {
        let mut s = surface();
        let ptr: *const MemorySurface = &s;
        let back = compose(&mut s, &Color::fg(Palette::RED)).unwrap();
        assert!(std::ptr::eq(ptr, back));
    }

    #[test]
    fn compose_chains_left_to_right() {
        let mut s = surface();
        let red = Color::fg(Palette::RED);
        let blue = Color::fg(Palette::BLUE);
        compose(compose(&mut s, &red).unwrap(), &blue).unwrap();
        assert_eq!(s.attribute(), blue.attribute());
        assert_eq!(
            s.ops(),
            &[
                SurfaceOp::SetAttribute(red.attribute()),
                SurfaceOp::SetAttribute(blue.attribute()),
            ]
        );
    }

    #[test]
    fn with_is_compose() {
        let mut s = surface();
        s.with(&Cursor::new(3, 4))
            .unwrap()
            .with(&Color::fg(Palette::GREEN))
            .unwrap();
        assert_eq!(s.cursor(), Coord::new(3, 4));
        assert_eq!(s.attribute().bits(), 0x02);
    }

    #[test]
    fn compose_all_applies_in_order() {
        let mut s = surface();
        let a = Cursor::new(1, 1);
        let b = Cursor::new(2, 2);
        compose_all(&mut s, &[&a, &b]).unwrap();
        assert_eq!(s.cursor(), Coord::new(2, 2));
    }

    #[test]
    fn compose_all_stops_at_first_failure() {
        let mut s = surface();
        let good = Color::fg(Palette::RED);
        let bad = Cursor::new(500, 0);
        let never = Color::fg(Palette::BLUE);
        let err = compose_all(&mut s, &[&good, &bad, &never]).unwrap_err();
        assert!(matches!(err, Error::PlatformRejected { .. }));
        assert_eq!(s.attribute(), good.attribute());
        assert_eq!(s.ops().len(), 1);
    }

    #[test]
    fn any_modifier_dispatches() {
        let mut s = surface();
        let script: Vec<AnyModifier> = vec![
            Color::from_attribute(Attribute::from_bits(0x1E)).into(),
            Cursor::new(5, 5).into(),
            Clear::new(b'.', Attribute::DEFAULT).into(),
        ];
        for m in &script {
            compose(&mut s, m).unwrap();
        }
        assert_eq!(s.attribute().bits(), 0x1E);
        assert_eq!(s.cursor(), Coord::new(5, 5));
        assert_eq!(s.buffer().count(|c| c.ch == b'.'), 2000);
    }

    #[test]
    fn boxed_modifiers_compose() {
        let mut s = surface();
        let boxed: Vec<Box<dyn Modifier>> = vec![
            Box::new(Color::fg(Palette::YELLOW)),
            Box::new(Cursor::new(7, 0)),
        ];
        for m in &boxed {
            compose(&mut s, m).unwrap();
        }
        assert_eq!(s.attribute().bits(), 0x06);
        assert_eq!(s.cursor(), Coord::new(7, 0));
    }

    /// Draws a framed title by forwarding its token to the built-ins.
    #[derive(Debug)]
    struct Banner {
        at: Cursor,
        color: Color,
    }

    impl Modifier for Banner {
        fn apply(&self, surface: &mut dyn Surface, token: Applying) -> Result<()> {
            self.color.apply(surface, token)?;
            self.at.apply(surface, token)?;
            surface.write_text("[*]")
        }
    }

    #[test]
    fn user_modifier_forwards_token() {
        let mut s = surface();
        let banner = Banner {
            at: Cursor::new(2, 1),
            color: Color::fg(Palette::CYAN),
        };
        s.with(&banner).unwrap();
        assert_eq!(s.buffer().row_text(1).unwrap().trim_end(), "  [*]");
        assert_eq!(s.attribute().bits(), 0x03);
        assert_eq!(
            &s.ops()[..2],
            &[
                SurfaceOp::SetAttribute(Color::fg(Palette::CYAN).attribute()),
                SurfaceOp::SetCursorPosition(Coord::new(2, 1)),
            ]
        );
    }
}
