// SPDX-License-Identifier: MIT
//
// tcon-term — composable control of a character-grid terminal.
//
// A caller builds small modifier values (Dimension, Color, Cursor, Clear)
// and applies each to a surface through `compose`. Effects land in call
// order, one synchronous surface call at a time. The surface is an
// explicit handle: `AnsiTerminal` for the real terminal, `MemorySurface`
// for tests. Both share `SurfaceState`, so the rules a real console
// enforces (the window fits in the buffer, extents are never zero) hold
// the same way in each.
//
// Alongside the modifiers: a non-blocking key-state query (`Keyboard`)
// and a wrapping millisecond clock for frame pacing.
//
// Text is single-byte. Unicode layout is out of scope; anything outside
// printable ASCII is drawn as '?'.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod clear;
pub mod clock;
pub mod color;
pub mod cursor;
pub mod dimension;
pub mod error;
pub mod geometry;
pub mod input;
pub mod keyboard;
pub mod memory;
pub mod modifier;
pub mod output;
pub mod reader;
pub mod surface;
pub mod terminal;
pub mod tty;

pub use clear::Clear;
pub use color::{Attribute, Color, Palette};
pub use cursor::Cursor;
pub use dimension::Dimension;
pub use error::{Error, Result};
pub use geometry::{Coord, Size, WindowRect};
pub use keyboard::{KeyTracker, Keyboard, VirtualKey};
pub use memory::{MemorySurface, SurfaceOp};
pub use modifier::{AnyModifier, Applying, Modifier, SurfaceExt, compose, compose_all};
pub use surface::{CursorInfo, Surface, SurfaceState};
pub use terminal::{AnsiSurface, AnsiTerminal, TerminalOptions};
