// SPDX-License-Identifier: MIT
//
// The real terminal surface.
//
// `AnsiSurface` renders `SurfaceState` changes as ANSI escape sequences
// into any `Write` sink. Every surface call validates against the state
// first, then emits only what that call changed, then flushes once. A
// rejected call emits nothing.
//
// `AnsiTerminal` wraps an `AnsiSurface` over stdout with the process-level
// plumbing: raw mode, the alternate screen, the Kitty keyboard protocol,
// non-blocking input for the key-state query, and RAII restore on drop.
// Only one may be open per process, mirroring a console's single screen.
//
// The window is always anchored at the buffer origin. A terminal cannot
// scroll its view over an off-screen buffer, so a window that starts
// anywhere else is refused rather than faked.

use std::io::{self, Write};
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::ansi::{self, CursorShape};
use crate::color::Attribute;
use crate::error::{Error, Result};
use crate::geometry::{Coord, Size, WindowRect};
use crate::input::Parser;
use crate::keyboard::{DEFAULT_HOLD_WINDOW, KeyTracker, Keyboard, VirtualKey};
use crate::output::{OutputBuffer, RowWriter};
use crate::reader::InputDrain;
use crate::surface::{CursorInfo, Surface, SurfaceState};
use crate::tty::{self, RawMode};

// ─── AnsiSurface ────────────────────────────────────────────────────────────

/// A [`Surface`] that renders to an ANSI terminal through `W`.
#[derive(Debug)]
pub struct AnsiSurface<W: Write> {
    state: SurfaceState,
    out: OutputBuffer,
    rows: RowWriter,
    sink: W,
}

impl<W: Write> AnsiSurface<W> {
    /// Render `state` changes into `sink`.
    ///
    /// Nothing is emitted up front; the caller decides whether the sink
    /// already shows `state` (a freshly cleared screen) or needs a
    /// [`redraw`](Self::redraw).
    #[must_use]
    pub fn new(state: SurfaceState, sink: W) -> Self {
        Self {
            state,
            out: OutputBuffer::new(),
            rows: RowWriter::new(),
            sink,
        }
    }

    /// The model this surface renders.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> &SurfaceState {
        &self.state
    }

    /// The output sink.
    #[inline]
    #[must_use]
    pub const fn sink(&self) -> &W {
        &self.sink
    }

    /// Mutable access to the output sink.
    #[inline]
    pub const fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Repaint every visible row and restore cursor and attribute.
    ///
    /// # Errors
    ///
    /// The sink's failure, classified by [`Error::from_io`].
    pub fn redraw(&mut self) -> Result<()> {
        self.rows.invalidate();
        let window = self.state.window();
        self.repaint(window.top..=window.bottom);
        self.flush("redraw")
    }

    /// Append raw bytes outside the surface model and flush them.
    pub(crate) fn emit(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&mut OutputBuffer) -> io::Result<()>,
    ) -> Result<()> {
        f(&mut self.out).map_err(|e| Error::from_io(op, &e))?;
        // Anything written here may have changed the terminal's SGR.
        self.rows.invalidate();
        self.flush(op)
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Paint `rows` (buffer coordinates) inside one synchronized update,
    /// then put the cursor and sticky attribute back.
    fn repaint(&mut self, rows: RangeInclusive<u16>) {
        ansi::begin_sync(&mut self.out).ok();
        self.rows
            .paint_rows(&mut self.out, self.state.buffer(), self.state.window(), rows);
        self.rows.restore_attr(&mut self.out, self.state.attribute());
        self.place_cursor();
        ansi::end_sync(&mut self.out).ok();
    }

    /// Move the terminal cursor to the model cursor if it is visible
    /// through the window. Outside the window it stays where it is.
    fn place_cursor(&mut self) {
        let cursor = self.state.cursor();
        let window = self.state.window();
        if cursor.within(Size::new(window.right + 1, window.bottom + 1)) {
            ansi::cursor_to(&mut self.out, cursor).ok();
        }
    }

    fn flush(&mut self, op: &'static str) -> Result<()> {
        trace!(op, bytes = self.out.len(), "flush");
        self.out
            .flush_to(&mut self.sink)
            .map_err(|e| Error::from_io(op, &e))
    }

    /// Last buffer row touched by `len` cells written from `start`.
    fn last_row_of_fill(&self, start: Coord, len: u32) -> u16 {
        let size = self.state.buffer_size();
        let len = usize::try_from(len.saturating_sub(1)).unwrap_or(usize::MAX);
        let last = start.offset(size.cols).saturating_add(len);
        let row = last / usize::from(size.cols);
        u16::try_from(row).map_or(size.rows - 1, |r| r.min(size.rows - 1))
    }
}

impl<W: Write> Surface for AnsiSurface<W> {
    fn buffer_size(&self) -> Result<Size> {
        Ok(self.state.buffer_size())
    }

    fn window(&self) -> Result<WindowRect> {
        Ok(self.state.window())
    }

    fn max_window(&self) -> Result<Option<Size>> {
        Ok(self.state.max_window())
    }

    fn cursor_position(&self) -> Result<Coord> {
        Ok(self.state.cursor())
    }

    fn set_window(&mut self, rect: WindowRect) -> Result<()> {
        if !rect.is_anchored() {
            return Err(Error::rejected(
                "set_window",
                format!(
                    "window at ({}, {}): terminal windows start at the origin",
                    rect.left, rect.top
                ),
            ));
        }
        let before = self.state.window();
        self.state.set_window(rect)?;
        if before == rect {
            return Ok(());
        }

        debug!(cols = rect.width(), rows = rect.height(), "resize window");
        ansi::resize_window(&mut self.out, rect.size()).ok();
        self.rows.invalidate();
        ansi::attribute(&mut self.out, self.state.attribute()).ok();
        ansi::clear_screen(&mut self.out).ok();
        self.repaint(rect.top..=rect.bottom);
        self.flush("set_window")
    }

    fn set_buffer_size(&mut self, size: Size) -> Result<()> {
        let cursor = self.state.cursor();
        self.state.set_buffer_size(size)?;
        // The window is unchanged, so only a clamped cursor can show.
        if self.state.cursor() != cursor {
            self.place_cursor();
        }
        self.flush("set_buffer_size")
    }

    fn set_cursor_info(&mut self, info: CursorInfo) -> Result<()> {
        self.state.set_cursor_info(info)?;
        if info.visible {
            ansi::set_cursor_shape(&mut self.out, CursorShape::for_size(info.size)).ok();
            ansi::cursor_show(&mut self.out).ok();
        } else {
            ansi::cursor_hide(&mut self.out).ok();
        }
        self.flush("set_cursor_info")
    }

    fn set_attribute(&mut self, attr: Attribute) -> Result<()> {
        self.state.set_attribute(attr);
        self.rows.restore_attr(&mut self.out, attr);
        self.flush("set_attribute")
    }

    fn set_cursor_position(&mut self, pos: Coord) -> Result<()> {
        self.state.set_cursor_position(pos)?;
        self.place_cursor();
        self.flush("set_cursor_position")
    }

    fn fill_characters(&mut self, start: Coord, len: u32, ch: u8) -> Result<u32> {
        let written = self.state.fill_characters(start, len, ch)?;
        if written > 0 {
            let last = self.last_row_of_fill(start, written);
            self.repaint(start.y..=last);
        }
        self.flush("fill_characters")?;
        Ok(written)
    }

    fn fill_attributes(&mut self, start: Coord, len: u32, attr: Attribute) -> Result<u32> {
        let written = self.state.fill_attributes(start, len, attr)?;
        if written > 0 {
            let last = self.last_row_of_fill(start, written);
            self.repaint(start.y..=last);
        }
        self.flush("fill_attributes")?;
        Ok(written)
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        let damage = self.state.write_text(text);
        self.repaint(damage.first_row..=damage.last_row);
        self.flush("write_text")
    }
}

// ─── TerminalOptions ────────────────────────────────────────────────────────

/// How [`AnsiTerminal::open`] sets the terminal up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalOptions {
    alternate_screen: bool,
    keyboard_flags: u8,
    legacy_hold: Duration,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self {
            alternate_screen: true,
            keyboard_flags: ansi::KITTY_DISAMBIGUATE | ansi::KITTY_EVENT_TYPES | ansi::KITTY_ALL_KEYS,
            legacy_hold: DEFAULT_HOLD_WINDOW,
        }
    }
}

impl TerminalOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw on the alternate screen, leaving the shell's scrollback alone.
    #[must_use]
    pub const fn alternate_screen(mut self, on: bool) -> Self {
        self.alternate_screen = on;
        self
    }

    /// Kitty keyboard flags to request; `0` leaves the protocol off and
    /// key state falls back to the hold window.
    #[must_use]
    pub const fn keyboard_flags(mut self, flags: u8) -> Self {
        self.keyboard_flags = flags;
        self
    }

    /// How long a press counts as held when the terminal does not report
    /// releases.
    #[must_use]
    pub const fn legacy_hold(mut self, hold: Duration) -> Self {
        self.legacy_hold = hold;
        self
    }

    #[must_use]
    pub const fn uses_alternate_screen(&self) -> bool {
        self.alternate_screen
    }

    #[must_use]
    pub const fn requested_keyboard_flags(&self) -> u8 {
        self.keyboard_flags
    }

    #[must_use]
    pub const fn hold_window(&self) -> Duration {
        self.legacy_hold
    }
}

// ─── Handle Claim ───────────────────────────────────────────────────────────

static CLAIMED: AtomicBool = AtomicBool::new(false);

/// Proof that this process holds the one terminal handle.
#[derive(Debug)]
struct HandleClaim(());

impl HandleClaim {
    fn acquire() -> Result<Self> {
        CLAIMED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(()))
            .map_err(|_| Error::SurfaceUnavailable("terminal already open in this process".into()))
    }
}

impl Drop for HandleClaim {
    fn drop(&mut self) {
        CLAIMED.store(false, Ordering::Release);
    }
}

// ─── AnsiTerminal ───────────────────────────────────────────────────────────

/// A lone ESC older than this is the Escape key, not the start of a
/// sequence.
const ESCAPE_TIMEOUT: Duration = Duration::from_millis(25);

/// The process's terminal, as a [`Surface`] and a [`Keyboard`].
///
/// Restores the terminal on drop, and from the panic hook if the process
/// panics first.
///
/// ```no_run
/// use tcon_term::{AnsiTerminal, Dimension, SurfaceExt, TerminalOptions};
///
/// let mut term = AnsiTerminal::open(TerminalOptions::default())?;
/// term.with(&Dimension::new(80, 25, true)?)?;
/// # Ok::<(), tcon_term::Error>(())
/// ```
#[derive(Debug)]
pub struct AnsiTerminal {
    surface: AnsiSurface<io::Stdout>,
    input: InputDrain,
    parser: Parser,
    keys: KeyTracker,
    /// When the parser first held an incomplete sequence.
    pending_since: Option<Instant>,
    options: TerminalOptions,
    // Dropped after `Drop::drop` has written the leave sequence.
    _raw: RawMode,
    _claim: HandleClaim,
}

impl AnsiTerminal {
    /// Take over the controlling terminal.
    ///
    /// # Errors
    ///
    /// [`Error::SurfaceUnavailable`] if stdin or stdout is not a terminal,
    /// the size cannot be read, or another handle is already open.
    /// Failures to enter raw mode or write the setup sequence are
    /// classified by [`Error::from_io`].
    pub fn open(options: TerminalOptions) -> Result<Self> {
        if !tty::is_tty(tty::STDIN) || !tty::is_tty(tty::STDOUT) {
            return Err(Error::SurfaceUnavailable(
                "stdin and stdout must both be terminals".into(),
            ));
        }
        let claim = HandleClaim::acquire()?;
        let size = tty::window_size()
            .ok_or_else(|| Error::SurfaceUnavailable("terminal did not report its size".into()))?;

        tty::install_panic_hook();
        let raw = RawMode::enable(tty::STDIN).map_err(|e| Error::from_io("open", &e))?;
        debug!(cols = size.cols, rows = size.rows, ?options, "terminal open");

        let mut term = Self {
            surface: AnsiSurface::new(SurfaceState::new(size)?, io::stdout()),
            input: InputDrain::new(tty::STDIN),
            parser: Parser::new(),
            keys: KeyTracker::new().with_hold_window(options.legacy_hold),
            pending_since: None,
            options,
            _raw: raw,
            _claim: claim,
        };
        term.enter()?;
        Ok(term)
    }

    /// The model of what is on screen.
    #[must_use]
    pub const fn state(&self) -> &SurfaceState {
        self.surface.state()
    }

    #[must_use]
    pub const fn options(&self) -> &TerminalOptions {
        &self.options
    }

    /// Whether the terminal confirmed it reports key releases.
    #[must_use]
    pub const fn reports_releases(&self) -> bool {
        self.keys.reports_releases()
    }

    /// Repaint the whole window, e.g. after something else wrote to the
    /// terminal.
    ///
    /// # Errors
    ///
    /// As [`AnsiSurface::redraw`].
    pub fn redraw(&mut self) -> Result<()> {
        self.surface.redraw()
    }

    fn enter(&mut self) -> Result<()> {
        let options = self.options;
        let attr = self.surface.state().attribute();
        self.surface.emit("open", |out| {
            if options.alternate_screen {
                ansi::enter_alt_screen(out)?;
            }
            if options.keyboard_flags != 0 {
                ansi::enable_kitty_keyboard(out, options.keyboard_flags)?;
                ansi::query_kitty_keyboard(out)?;
            }
            ansi::attribute(out, attr)?;
            ansi::clear_screen(out)?;
            ansi::cursor_to(out, Coord::ORIGIN)?;
            ansi::cursor_show(out)
        })
    }

    fn leave(&mut self) -> Result<()> {
        let options = self.options;
        self.surface.emit("close", |out| {
            ansi::end_sync(out)?;
            if options.keyboard_flags != 0 {
                ansi::disable_kitty_keyboard(out)?;
            }
            ansi::reset(out)?;
            ansi::set_cursor_shape(out, CursorShape::Default)?;
            ansi::cursor_show(out)?;
            if options.alternate_screen {
                ansi::exit_alt_screen(out)?;
            }
            Ok(())
        })
    }

    /// Feed all pending input through the parser into the key tracker.
    fn pump(&mut self, now: Instant) -> Result<()> {
        let bytes = self
            .input
            .read_available()
            .map_err(|e| Error::from_io("key_down", &e))?;
        let mut events = self.parser.advance(bytes);

        if self.parser.has_pending() {
            let since = *self.pending_since.get_or_insert(now);
            if now.saturating_duration_since(since) >= ESCAPE_TIMEOUT {
                events.extend(self.parser.flush());
                self.pending_since = None;
            }
        } else {
            self.pending_since = None;
        }

        for event in &events {
            trace!(?event, "input");
            self.keys.handle(event, now);
        }
        Ok(())
    }
}

impl Surface for AnsiTerminal {
    fn buffer_size(&self) -> Result<Size> {
        self.surface.buffer_size()
    }

    fn window(&self) -> Result<WindowRect> {
        self.surface.window()
    }

    fn max_window(&self) -> Result<Option<Size>> {
        self.surface.max_window()
    }

    fn cursor_position(&self) -> Result<Coord> {
        self.surface.cursor_position()
    }

    fn set_window(&mut self, rect: WindowRect) -> Result<()> {
        self.surface.set_window(rect)
    }

    fn set_buffer_size(&mut self, size: Size) -> Result<()> {
        self.surface.set_buffer_size(size)
    }

    fn set_cursor_info(&mut self, info: CursorInfo) -> Result<()> {
        self.surface.set_cursor_info(info)
    }

    fn set_attribute(&mut self, attr: Attribute) -> Result<()> {
        self.surface.set_attribute(attr)
    }

    fn set_cursor_position(&mut self, pos: Coord) -> Result<()> {
        self.surface.set_cursor_position(pos)
    }

    fn fill_characters(&mut self, start: Coord, len: u32, ch: u8) -> Result<u32> {
        self.surface.fill_characters(start, len, ch)
    }

    fn fill_attributes(&mut self, start: Coord, len: u32, attr: Attribute) -> Result<u32> {
        self.surface.fill_attributes(start, len, attr)
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.surface.write_text(text)
    }
}

impl Keyboard for AnsiTerminal {
    fn key_down(&mut self, key: VirtualKey) -> Result<bool> {
        let now = Instant::now();
        self.pump(now)?;
        Ok(self.keys.is_down(key, now))
    }
}

impl Drop for AnsiTerminal {
    fn drop(&mut self) {
        if let Err(err) = self.leave() {
            warn!(%err, "failed to restore terminal");
        }
        debug!("terminal closed");
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
