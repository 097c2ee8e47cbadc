// SPDX-License-Identifier: MIT
//
// Keyboard — "is this key down right now?"
//
// Callers name keys by virtual-key number: the RETURN/SHIFT/ESCAPE/arrow
// constants below keep the numeric values game-style code already uses,
// and any other number passes straight through `VirtualKey::from_raw`.
//
// A terminal does not expose physical key state, only a stream of key
// events. `KeyTracker` folds that stream into a down-set:
//
//   - With the Kitty protocol's event types, a key is down from its press
//     until its release.
//   - Without them (legacy terminals) there is no release, so a key counts
//     as down for `hold_window` after its last press or auto-repeat. The
//     window has to exceed the terminal's initial repeat delay or a held
//     key would flicker up between the first press and the first repeat.
//
// The tracker takes `now` explicitly so it is testable without sleeping.
//
// Translation from parsed key codes to virtual keys (see `virtual_key`):
//
//   Enter → RETURN        Tab → TAB           Backspace → BACK
//   Escape → ESCAPE       Delete → DELETE     Insert → INSERT
//   arrows → LEFT/UP/RIGHT/DOWN               Home/End → HOME/END
//   PageUp → PRIOR        PageDown → NEXT     F1-F24 → 0x70-0x87
//   Shift → SHIFT         Control → CONTROL   Alt → MENU
//   Super → LWIN          Menu → APPS         CapsLock → CAPITAL
//   a-z, A-Z → 0x41-0x5A  0-9 → 0x30-0x39     space → SPACE
//   ; = , - . / ` [ \ ] ' → the US-layout OEM codes (0xBA-0xDE)

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::input::{Event, KeyCode, KeyEvent, KeyEventKind, Modifiers};

// ─── VirtualKey ─────────────────────────────────────────────────────────────

/// A virtual-key number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtualKey(u16);

impl VirtualKey {
    pub const BACK: Self = Self(0x08);
    pub const TAB: Self = Self(0x09);
    pub const RETURN: Self = Self(0x0D);
    pub const SHIFT: Self = Self(0x10);
    pub const CONTROL: Self = Self(0x11);
    /// Alt.
    pub const MENU: Self = Self(0x12);
    pub const PAUSE: Self = Self(0x13);
    pub const CAPITAL: Self = Self(0x14);
    pub const ESCAPE: Self = Self(0x1B);
    pub const SPACE: Self = Self(0x20);
    /// Page Up.
    pub const PRIOR: Self = Self(0x21);
    /// Page Down.
    pub const NEXT: Self = Self(0x22);
    pub const END: Self = Self(0x23);
    pub const HOME: Self = Self(0x24);
    pub const LEFT: Self = Self(0x25);
    pub const UP: Self = Self(0x26);
    pub const RIGHT: Self = Self(0x27);
    pub const DOWN: Self = Self(0x28);
    pub const SNAPSHOT: Self = Self(0x2C);
    pub const INSERT: Self = Self(0x2D);
    pub const DELETE: Self = Self(0x2E);
    pub const LWIN: Self = Self(0x5B);
    pub const APPS: Self = Self(0x5D);
    pub const NUMLOCK: Self = Self(0x90);
    pub const SCROLL: Self = Self(0x91);

    /// Any platform key number, unchecked.
    #[must_use]
    pub const fn from_raw(code: u16) -> Self {
        Self(code)
    }

    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// The key for an ASCII letter, either case.
    #[must_use]
    pub const fn letter(c: char) -> Option<Self> {
        if c.is_ascii_alphabetic() {
            Some(Self(c.to_ascii_uppercase() as u16))
        } else {
            None
        }
    }

    /// The main-row key for a decimal digit `0..=9`.
    #[must_use]
    pub const fn digit(d: u8) -> Option<Self> {
        if d <= 9 {
            Some(Self(0x30 + d as u16))
        } else {
            None
        }
    }

    /// F1 through F24.
    #[must_use]
    pub const fn function(n: u8) -> Option<Self> {
        if matches!(n, 1..=24) {
            Some(Self(0x70 + (n as u16 - 1)))
        } else {
            None
        }
    }
}

impl From<VirtualKey> for u16 {
    fn from(key: VirtualKey) -> Self {
        key.0
    }
}

/// Translate a parsed key code to its virtual key, if it has one.
#[must_use]
pub fn virtual_key(code: KeyCode) -> Option<VirtualKey> {
    let key = match code {
        KeyCode::Char(c) => return char_key(c),
        KeyCode::Enter => VirtualKey::RETURN,
        KeyCode::Tab => VirtualKey::TAB,
        KeyCode::Backspace => VirtualKey::BACK,
        KeyCode::Escape => VirtualKey::ESCAPE,
        KeyCode::Delete => VirtualKey::DELETE,
        KeyCode::Insert => VirtualKey::INSERT,
        KeyCode::Up => VirtualKey::UP,
        KeyCode::Down => VirtualKey::DOWN,
        KeyCode::Left => VirtualKey::LEFT,
        KeyCode::Right => VirtualKey::RIGHT,
        KeyCode::Home => VirtualKey::HOME,
        KeyCode::End => VirtualKey::END,
        KeyCode::PageUp => VirtualKey::PRIOR,
        KeyCode::PageDown => VirtualKey::NEXT,
        KeyCode::F(n) => return VirtualKey::function(n),
        KeyCode::Shift => VirtualKey::SHIFT,
        KeyCode::Control => VirtualKey::CONTROL,
        KeyCode::Alt => VirtualKey::MENU,
        KeyCode::Super => VirtualKey::LWIN,
        KeyCode::CapsLock => VirtualKey::CAPITAL,
        KeyCode::ScrollLock => VirtualKey::SCROLL,
        KeyCode::NumLock => VirtualKey::NUMLOCK,
        KeyCode::PrintScreen => VirtualKey::SNAPSHOT,
        KeyCode::Pause => VirtualKey::PAUSE,
        KeyCode::Menu => VirtualKey::APPS,
    };
    Some(key)
}

fn char_key(c: char) -> Option<VirtualKey> {
    if let Some(key) = VirtualKey::letter(c) {
        return Some(key);
    }
    if let Some(d) = c.to_digit(10) {
        return u8::try_from(d).ok().and_then(VirtualKey::digit);
    }
    let raw = match c {
        ' ' => 0x20,
        ';' => 0xBA,
        '=' => 0xBB,
        ',' => 0xBC,
        '-' => 0xBD,
        '.' => 0xBE,
        '/' => 0xBF,
        '`' => 0xC0,
        '[' => 0xDB,
        '\\' => 0xDC,
        ']' => 0xDD,
        '\'' => 0xDE,
        _ => return None,
    };
    Some(VirtualKey(raw))
}

// ─── Keyboard ───────────────────────────────────────────────────────────────

/// Non-blocking physical key-state query.
pub trait Keyboard {
    /// Whether `key` is held down right now.
    ///
    /// Reads whatever input is pending before answering; never waits for
    /// more. `&mut self` because reading consumes that input.
    ///
    /// # Errors
    ///
    /// [`Error::SurfaceUnavailable`](crate::Error::SurfaceUnavailable) if
    /// the input source is gone.
    fn key_down(&mut self, key: VirtualKey) -> Result<bool>;
}

// ─── KeyTracker ─────────────────────────────────────────────────────────────

/// How long a press counts as "down" when releases are not reported.
pub const DEFAULT_HOLD_WINDOW: Duration = Duration::from_millis(500);

/// Folds key events into a set of keys currently held.
#[derive(Debug, Clone)]
pub struct KeyTracker {
    /// Key → time of its last press or repeat.
    down: HashMap<VirtualKey, Instant>,
    reports_releases: bool,
    hold_window: Duration,
}

impl Default for KeyTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            down: HashMap::new(),
            reports_releases: false,
            hold_window: DEFAULT_HOLD_WINDOW,
        }
    }

    #[must_use]
    pub fn with_hold_window(mut self, window: Duration) -> Self {
        self.hold_window = window;
        self
    }

    #[must_use]
    pub const fn hold_window(&self) -> Duration {
        self.hold_window
    }

    /// Whether release events are expected from the terminal.
    #[must_use]
    pub const fn reports_releases(&self) -> bool {
        self.reports_releases
    }

    pub const fn set_reports_releases(&mut self, on: bool) {
        self.reports_releases = on;
    }

    /// Forget every held key.
    pub fn clear(&mut self) {
        self.down.clear();
    }

    /// Fold one parsed input event in.
    pub fn handle(&mut self, event: &Event, now: Instant) {
        match *event {
            Event::KeyboardFlags(flags) => {
                self.reports_releases = flags & 0b10 != 0;
            }
            Event::Key(key) => self.handle_key(key, now),
        }
    }

    /// Whether `key` is held at `now`.
    #[must_use]
    pub fn is_down(&self, key: VirtualKey, now: Instant) -> bool {
        self.down.get(&key).is_some_and(|&seen| {
            self.reports_releases || now.saturating_duration_since(seen) < self.hold_window
        })
    }

    fn handle_key(&mut self, event: KeyEvent, now: Instant) {
        let Some(key) = virtual_key(event.code) else {
            return;
        };

        match event.kind {
            KeyEventKind::Release => {
                // Only terminals that report releases send one.
                self.reports_releases = true;
                self.down.remove(&key);
            }
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.down.insert(key, now);
                if !self.reports_releases {
                    self.imply_modifiers(event, now);
                }
            }
        }
    }

    /// Legacy terminals never report modifier keys on their own; infer
    /// them from the keys they were held with.
    fn imply_modifiers(&mut self, event: KeyEvent, now: Instant) {
        let shifted_letter = matches!(event.code, KeyCode::Char(c) if c.is_ascii_uppercase());
        if event.modifiers.contains(Modifiers::SHIFT) || shifted_letter {
            self.down.insert(VirtualKey::SHIFT, now);
        }
        if event.modifiers.contains(Modifiers::CTRL) {
            self.down.insert(VirtualKey::CONTROL, now);
        }
        if event.modifiers.contains(Modifiers::ALT) {
            self.down.insert(VirtualKey::MENU, now);
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
