// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into key events for the key-state tracker.
// Understands what a terminal sends once `terminal.rs` has enabled the
// Kitty keyboard protocol, plus the legacy encodings older terminals fall
// back to:
//
// - Legacy CSI sequences (arrows, editing keys, function keys)
// - SS3 sequences (F1-F4 and arrows in application mode)
// - Kitty `CSI codepoint ; mods:event u` with press / repeat / release
// - Event types on legacy-form sequences (`CSI 1;1:3 A` is Up released)
// - Modifier keys reported on their own (Kitty "report all keys")
// - Kitty flag query replies (`CSI ? flags u`)
// - Alt+key (ESC followed by a printable character)
// - UTF-8 multi-byte characters
//
// Escape sequences can span reads, so the parser keeps the unconsumed
// tail between `advance` calls. A lone ESC stays pending until `flush`.

use bitflags::bitflags;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A parsed terminal input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A key press, repeat, or release.
    Key(KeyEvent),
    /// Reply to a Kitty keyboard flags query: the flags currently active.
    ///
    /// A terminal that answers supports the protocol; bit 2 (`0b10`)
    /// means release events will be reported.
    KeyboardFlags(u8),
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

/// Press, repeat, or release.
///
/// Only terminals speaking the Kitty protocol with event types enabled
/// report `Repeat` and `Release`; everything else is `Press`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

/// Logical key identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A character key. Letters arrive in the case that was typed.
    Char(char),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    // ── Function keys ───────────────────────────────────────────
    F(u8),
    // ── Modifier keys on their own (Kitty protocol) ─────────────
    Shift,
    Control,
    Alt,
    Super,
    // ── Lock and misc keys (Kitty protocol) ─────────────────────
    CapsLock,
    ScrollLock,
    NumLock,
    PrintScreen,
    Pause,
    Menu,
}

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
        const SUPER = 0b0000_1000;
        const HYPER = 0b0001_0000;
        const META  = 0b0010_0000;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Incremental input parser.
///
/// Feed raw bytes via [`advance`](Parser::advance); incomplete sequences
/// are buffered and resumed on the next call.
///
/// # Escape vs escape-sequence ambiguity
///
/// A lone `ESC` (0x1B) may be the Escape key or the start of a sequence.
/// The parser leaves it pending; once no more bytes are waiting the caller
/// should [`flush`](Parser::flush) to turn it into an Escape press.
#[derive(Debug, Default)]
pub struct Parser {
    buf: Vec<u8>,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
        }
    }

    /// Feed raw bytes and return every event that can be parsed so far.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Event> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Event(event, consumed) => {
                    events.push(event);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        if pos > 0 {
            self.buf.drain(..pos);
        }
        events
    }

    /// Are there unconsumed bytes that might complete with more data?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Emit pending bytes as literal key presses.
    ///
    /// A lone ESC becomes [`KeyCode::Escape`]; other leftovers become
    /// `Char` presses, control bytes with [`Modifiers::CTRL`].
    pub fn flush(&mut self) -> Vec<Event> {
        let events = self
            .buf
            .iter()
            .filter_map(|&byte| {
                let code = match byte {
                    0x1B => KeyCode::Escape,
                    0x00 => KeyCode::Char('@'),
                    b @ 0x01..=0x1A => KeyCode::Char((b + b'a' - 1) as char),
                    0x7F => KeyCode::Backspace,
                    b @ 0x20..=0x7E => KeyCode::Char(b as char),
                    _ => return None,
                };
                let modifiers = if byte <= 0x1A {
                    Modifiers::CTRL
                } else {
                    Modifiers::empty()
                };
                Some(key_with(code, modifiers))
            })
            .collect();
        self.buf.clear();
        events
    }
}

// ─── Stateless Parsing Functions ────────────────────────────────────────────

enum Parsed {
    /// An event and the number of bytes it consumed.
    Event(Event, usize),
    /// Need more bytes.
    Incomplete,
    /// Unrecognized; skip this many bytes.
    Skip(usize),
}

fn try_parse(buf: &[u8]) -> Parsed {
    let Some(&lead) = buf.first() else {
        return Parsed::Skip(0);
    };

    match lead {
        0x1B => parse_escape(buf),
        0x00 => Parsed::Event(key_with(KeyCode::Char('@'), Modifiers::CTRL), 1),
        0x08 | 0x7F => Parsed::Event(press(KeyCode::Backspace), 1),
        0x09 => Parsed::Event(press(KeyCode::Tab), 1),
        0x0A | 0x0D => Parsed::Event(press(KeyCode::Enter), 1),
        b @ 0x01..=0x1A => Parsed::Event(
            key_with(KeyCode::Char((b + b'a' - 1) as char), Modifiers::CTRL),
            1,
        ),
        b @ 0x20..=0x7E => Parsed::Event(press(KeyCode::Char(b as char)), 1),
        0xC0..=0xFF => parse_utf8(buf),
        _ => Parsed::Skip(1),
    }
}

// ── Escape sequences ────────────────────────────────────────────────────────

fn parse_escape(buf: &[u8]) -> Parsed {
    let Some(&second) = buf.get(1) else {
        return Parsed::Incomplete;
    };

    match second {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        0x1B => Parsed::Event(key_with(KeyCode::Escape, Modifiers::ALT), 2),
        b @ 0x20..=0x7E => Parsed::Event(key_with(KeyCode::Char(b as char), Modifiers::ALT), 2),
        b @ 0x01..=0x1A => Parsed::Event(
            key_with(
                KeyCode::Char((b + b'a' - 1) as char),
                Modifiers::ALT | Modifiers::CTRL,
            ),
            2,
        ),
        _ => Parsed::Event(press(KeyCode::Escape), 1),
    }
}

// ── CSI ─────────────────────────────────────────────────────────────────────

fn parse_csi(buf: &[u8]) -> Parsed {
    if buf.len() < 3 {
        return Parsed::Incomplete;
    }

    // Parameter bytes are 0x30..=0x3F, intermediates 0x20..=0x2F, and the
    // final byte is 0x40..=0x7E.
    let mut end = 2;
    while let Some(&b) = buf.get(end) {
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }
    if end >= buf.len() {
        return Parsed::Incomplete;
    }

    let final_byte = buf[end];
    let params_raw = &buf[2..end];
    let consumed = end + 1;

    // Kitty flags reply: CSI ? flags u
    if let Some(rest) = params_raw.strip_prefix(b"?") {
        if final_byte == b'u' {
            let flags = u8::try_from(parse_u32_at(rest, 0).0).unwrap_or(u8::MAX);
            return Parsed::Event(Event::KeyboardFlags(flags), consumed);
        }
        return Parsed::Skip(consumed);
    }

    let params = parse_csi_params(params_raw);

    if final_byte == b'u' {
        return parse_kitty_key(&params, consumed);
    }

    let (modifiers, kind) = params
        .get(1)
        .map_or((Modifiers::empty(), KeyEventKind::Press), |p| {
            (decode_modifiers(p.0), decode_kind(p.1))
        });

    let code = if final_byte == b'~' {
        match params.first().map_or(0, |p| p.0) {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            n @ 11..=15 => KeyCode::F(fkey(n - 10)),
            n @ 17..=21 => KeyCode::F(fkey(n - 11)),
            n @ 23..=26 => KeyCode::F(fkey(n - 12)),
            n @ 28..=29 => KeyCode::F(fkey(n - 13)),
            n @ 31..=34 => KeyCode::F(fkey(n - 14)),
            _ => return Parsed::Skip(consumed),
        }
    } else {
        match final_byte {
            b'A' => KeyCode::Up,
            b'B' => KeyCode::Down,
            b'C' => KeyCode::Right,
            b'D' => KeyCode::Left,
            b'H' => KeyCode::Home,
            b'F' => KeyCode::End,
            b'P' => KeyCode::F(1),
            b'Q' => KeyCode::F(2),
            b'R' => KeyCode::F(3),
            b'S' => KeyCode::F(4),
            b'Z' => {
                return Parsed::Event(key_with(KeyCode::Tab, Modifiers::SHIFT), consumed);
            }
            _ => return Parsed::Skip(consumed),
        }
    };

    Parsed::Event(Event::Key(KeyEvent { code, modifiers, kind }), consumed)
}

// ── SS3 ─────────────────────────────────────────────────────────────────────

fn parse_ss3(buf: &[u8]) -> Parsed {
    let Some(&b) = buf.get(2) else {
        return Parsed::Incomplete;
    };

    let code = match b {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'M' => KeyCode::Enter,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return Parsed::Skip(3),
    };
    Parsed::Event(press(code), 3)
}

// ── Kitty Keyboard Protocol ────────────────────────────────────────────────

fn parse_kitty_key(params: &[CsiParam], consumed: usize) -> Parsed {
    // CSI codepoint[:alternates] [; modifiers[:event_type]] u
    let codepoint = params.first().map_or(0, |p| p.0);
    let (modifiers, kind) = params
        .get(1)
        .map_or((Modifiers::empty(), KeyEventKind::Press), |p| {
            (decode_modifiers(p.0), decode_kind(p.1))
        });

    kitty_codepoint_to_keycode(codepoint).map_or(Parsed::Skip(consumed), |code| {
        Parsed::Event(Event::Key(KeyEvent { code, modifiers, kind }), consumed)
    })
}

// ── UTF-8 ──────────────────────────────────────────────────────────────────

fn parse_utf8(buf: &[u8]) -> Parsed {
    let expected = utf8_char_len(buf[0]);
    if expected == 0 {
        return Parsed::Skip(1);
    }
    if buf.len() < expected {
        return Parsed::Incomplete;
    }
    std::str::from_utf8(&buf[..expected])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Parsed::Skip(1), |ch| {
            Parsed::Event(press(KeyCode::Char(ch)), expected)
        })
}

// ─── Helpers ────────────────────────────────────────────────────────────────

const fn press(code: KeyCode) -> Event {
    key_with(code, Modifiers::empty())
}

const fn key_with(code: KeyCode, modifiers: Modifiers) -> Event {
    Event::Key(KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
    })
}

/// CSI parameter: `(main_value, colon_sub_parameter)`.
#[derive(Debug, PartialEq, Eq)]
struct CsiParam(u32, u32);

/// Parse `;`-separated CSI parameters with optional `:` sub-parameters.
/// Only the first sub-parameter is kept.
///
/// - `1;2` → `[(1,0), (2,0)]`
/// - `97;5:3` → `[(97,0), (5,3)]`
fn parse_csi_params(raw: &[u8]) -> Vec<CsiParam> {
    if raw.is_empty() {
        return Vec::new();
    }

    let mut params = Vec::with_capacity(4);
    let mut pos = 0;
    loop {
        let (main, next) = parse_u32_at(raw, pos);
        pos = next;

        let mut sub = 0;
        let mut first_sub = true;
        while raw.get(pos) == Some(&b':') {
            let (v, n) = parse_u32_at(raw, pos + 1);
            if first_sub {
                sub = v;
                first_sub = false;
            }
            pos = n;
        }
        params.push(CsiParam(main, sub));

        if raw.get(pos) == Some(&b';') {
            pos += 1;
        } else {
            break;
        }
    }
    params
}

/// Parse a decimal number at `start`, saturating. Returns
/// `(value, next_position)`.
fn parse_u32_at(buf: &[u8], start: usize) -> (u32, usize) {
    let mut val: u32 = 0;
    let mut pos = start;
    while let Some(d) = buf.get(pos).filter(|b| b.is_ascii_digit()) {
        val = val.saturating_mul(10).saturating_add(u32::from(d - b'0'));
        pos += 1;
    }
    (val, pos)
}

/// Decode the `1 + bitmask` modifier encoding shared by xterm and Kitty.
/// Only the low six bits carry flags we know about.
fn decode_modifiers(param: u32) -> Modifiers {
    let bits = param.saturating_sub(1) & 0x3F;
    Modifiers::from_bits_truncate(u8::try_from(bits).unwrap_or(0))
}

const fn decode_kind(event_type: u32) -> KeyEventKind {
    match event_type {
        2 => KeyEventKind::Repeat,
        3 => KeyEventKind::Release,
        _ => KeyEventKind::Press,
    }
}

fn fkey(n: u32) -> u8 {
    u8::try_from(n).unwrap_or(0)
}

/// Map a Kitty codepoint to a [`KeyCode`].
///
/// Plain Unicode codepoints become `Char`; functional keys live in the
/// private use area from 57344. Codepoints we have no key for (keypad,
/// media keys, ISO level shifts) yield `None`.
fn kitty_codepoint_to_keycode(cp: u32) -> Option<KeyCode> {
    let code = match cp {
        27 | 57344 => KeyCode::Escape,
        13 | 57345 => KeyCode::Enter,
        9 | 57346 => KeyCode::Tab,
        127 | 57347 => KeyCode::Backspace,
        57348 => KeyCode::Insert,
        57349 => KeyCode::Delete,
        57350 => KeyCode::Left,
        57351 => KeyCode::Right,
        57352 => KeyCode::Up,
        57353 => KeyCode::Down,
        57354 => KeyCode::PageUp,
        57355 => KeyCode::PageDown,
        57356 => KeyCode::Home,
        57357 => KeyCode::End,
        57358 => KeyCode::CapsLock,
        57359 => KeyCode::ScrollLock,
        57360 => KeyCode::NumLock,
        57361 => KeyCode::PrintScreen,
        57362 => KeyCode::Pause,
        57363 => KeyCode::Menu,
        cp @ 57364..=57398 => KeyCode::F(fkey(cp - 57364 + 1)),
        // Left and right variants of each modifier.
        57441 | 57447 => KeyCode::Shift,
        57442 | 57448 => KeyCode::Control,
        57443 | 57449 => KeyCode::Alt,
        57444 | 57450 => KeyCode::Super,
        57344..=63743 => return None,
        cp => KeyCode::Char(char::from_u32(cp)?),
    };
    Some(code)
}

/// Expected byte length of a UTF-8 character from its lead byte, or 0 for
/// an invalid lead.
const fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(data: &[u8]) -> Vec<Event> {
        Parser::new().advance(data)
    }

    fn parse_one(data: &[u8]) -> Event {
        let events = parse(data);
        assert_eq!(events.len(), 1, "expected 1 event, got {events:?}");
        events[0]
    }

    fn key(code: KeyCode) -> Event {
        press(code)
    }

    fn key_kind(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: Modifiers::empty(),
            kind,
        })
    }

    // ── ASCII / control ─────────────────────────────────────────────────

    #[test]
    fn ascii_chars() {
        assert_eq!(
            parse(b"ab "),
            vec![
                key(KeyCode::Char('a')),
                key(KeyCode::Char('b')),
                key(KeyCode::Char(' '))
            ]
        );
    }

    #[test]
    fn ctrl_c() {
        assert_eq!(
            parse_one(b"\x03"),
            key_with(KeyCode::Char('c'), Modifiers::CTRL)
        );
    }

    #[test]
    fn enter_tab_backspace() {
        assert_eq!(parse_one(b"\r"), key(KeyCode::Enter));
        assert_eq!(parse_one(b"\n"), key(KeyCode::Enter));
        assert_eq!(parse_one(b"\t"), key(KeyCode::Tab));
        assert_eq!(parse_one(b"\x7f"), key(KeyCode::Backspace));
    }

    // ── Legacy CSI / SS3 ────────────────────────────────────────────────

    #[test]
    fn arrows() {
        assert_eq!(parse_one(b"\x1b[A"), key(KeyCode::Up));
        assert_eq!(parse_one(b"\x1b[B"), key(KeyCode::Down));
        assert_eq!(parse_one(b"\x1b[C"), key(KeyCode::Right));
        assert_eq!(parse_one(b"\x1b[D"), key(KeyCode::Left));
    }

    #[test]
    fn arrow_with_modifiers() {
        assert_eq!(
            parse_one(b"\x1b[1;5C"),
            key_with(KeyCode::Right, Modifiers::CTRL)
        );
        assert_eq!(
            parse_one(b"\x1b[1;4D"),
            key_with(KeyCode::Left, Modifiers::SHIFT | Modifiers::ALT)
        );
    }

    #[test]
    fn ss3_arrows_and_f1() {
        assert_eq!(parse_one(b"\x1bOA"), key(KeyCode::Up));
        assert_eq!(parse_one(b"\x1bOP"), key(KeyCode::F(1)));
    }

    #[test]
    fn tilde_keys() {
        assert_eq!(parse_one(b"\x1b[2~"), key(KeyCode::Insert));
        assert_eq!(parse_one(b"\x1b[3~"), key(KeyCode::Delete));
        assert_eq!(parse_one(b"\x1b[5~"), key(KeyCode::PageUp));
        assert_eq!(parse_one(b"\x1b[6~"), key(KeyCode::PageDown));
        assert_eq!(parse_one(b"\x1b[1~"), key(KeyCode::Home));
        assert_eq!(parse_one(b"\x1b[4~"), key(KeyCode::End));
    }

    #[test]
    fn function_keys_tilde() {
        assert_eq!(parse_one(b"\x1b[15~"), key(KeyCode::F(5)));
        assert_eq!(parse_one(b"\x1b[17~"), key(KeyCode::F(6)));
        assert_eq!(parse_one(b"\x1b[21~"), key(KeyCode::F(10)));
        assert_eq!(parse_one(b"\x1b[24~"), key(KeyCode::F(12)));
        assert_eq!(parse_one(b"\x1b[34~"), key(KeyCode::F(20)));
    }

    #[test]
    fn shift_tab() {
        assert_eq!(
            parse_one(b"\x1b[Z"),
            key_with(KeyCode::Tab, Modifiers::SHIFT)
        );
    }

    #[test]
    fn unknown_csi_is_skipped() {
        assert_eq!(parse(b"\x1b[99xq"), vec![key(KeyCode::Char('q'))]);
    }

    // ── Alt prefix ──────────────────────────────────────────────────────

    #[test]
    fn alt_letter() {
        assert_eq!(
            parse_one(b"\x1bx"),
            key_with(KeyCode::Char('x'), Modifiers::ALT)
        );
    }

    #[test]
    fn alt_escape() {
        assert_eq!(
            parse_one(b"\x1b\x1b"),
            key_with(KeyCode::Escape, Modifiers::ALT)
        );
    }

    // ── Kitty ───────────────────────────────────────────────────────────

    #[test]
    fn kitty_plain_char() {
        assert_eq!(parse_one(b"\x1b[97u"), key(KeyCode::Char('a')));
    }

    #[test]
    fn kitty_escape_and_enter() {
        assert_eq!(parse_one(b"\x1b[27u"), key(KeyCode::Escape));
        assert_eq!(parse_one(b"\x1b[13u"), key(KeyCode::Enter));
    }

    #[test]
    fn kitty_release() {
        assert_eq!(
            parse_one(b"\x1b[32;1:3u"),
            key_kind(KeyCode::Char(' '), KeyEventKind::Release)
        );
    }

    #[test]
    fn kitty_repeat() {
        assert_eq!(
            parse_one(b"\x1b[97;1:2u"),
            key_kind(KeyCode::Char('a'), KeyEventKind::Repeat)
        );
    }

    #[test]
    fn kitty_ctrl_shift() {
        assert_eq!(
            parse_one(b"\x1b[97;6u"),
            key_with(KeyCode::Char('a'), Modifiers::CTRL | Modifiers::SHIFT)
        );
    }

    #[test]
    fn kitty_alternate_keys_ignored() {
        assert_eq!(
            parse_one(b"\x1b[97:65;2u"),
            key_with(KeyCode::Char('a'), Modifiers::SHIFT)
        );
    }

    #[test]
    fn kitty_arrow_release_in_legacy_form() {
        assert_eq!(
            parse_one(b"\x1b[1;1:3A"),
            key_kind(KeyCode::Up, KeyEventKind::Release)
        );
        assert_eq!(
            parse_one(b"\x1b[3;1:3~"),
            key_kind(KeyCode::Delete, KeyEventKind::Release)
        );
    }

    #[test]
    fn kitty_modifier_keys() {
        assert_eq!(
            parse_one(b"\x1b[57441;2u"),
            key_with(KeyCode::Shift, Modifiers::SHIFT)
        );
        assert_eq!(
            parse_one(b"\x1b[57448;1:3u"),
            key_kind(KeyCode::Control, KeyEventKind::Release)
        );
        assert_eq!(
            parse_one(b"\x1b[57443;3u"),
            key_with(KeyCode::Alt, Modifiers::ALT)
        );
    }

    #[test]
    fn kitty_functional_keys() {
        assert_eq!(parse_one(b"\x1b[57352u"), key(KeyCode::Up));
        assert_eq!(parse_one(b"\x1b[57364u"), key(KeyCode::F(1)));
        assert_eq!(parse_one(b"\x1b[57375u"), key(KeyCode::F(12)));
    }

    #[test]
    fn kitty_unmapped_private_use_is_skipped() {
        // Keypad 0.
        assert!(parse(b"\x1b[57399u").is_empty());
    }

    #[test]
    fn kitty_flags_reply() {
        assert_eq!(parse_one(b"\x1b[?11u"), Event::KeyboardFlags(11));
        assert_eq!(parse_one(b"\x1b[?0u"), Event::KeyboardFlags(0));
    }

    // ── UTF-8 ───────────────────────────────────────────────────────────

    #[test]
    fn utf8_multibyte() {
        assert_eq!(parse_one("é".as_bytes()), key(KeyCode::Char('é')));
        assert_eq!(parse_one("中".as_bytes()), key(KeyCode::Char('中')));
    }

    #[test]
    fn utf8_incomplete_waits() {
        let mut p = Parser::new();
        let bytes = "中".as_bytes();
        assert!(p.advance(&bytes[..2]).is_empty());
        assert!(p.has_pending());
        assert_eq!(p.advance(&bytes[2..]), vec![key(KeyCode::Char('中'))]);
    }

    // ── Escape ambiguity / incremental ──────────────────────────────────

    #[test]
    fn lone_escape_pending_then_flushed() {
        let mut p = Parser::new();
        assert!(p.advance(b"\x1b").is_empty());
        assert!(p.has_pending());
        assert_eq!(p.flush(), vec![key(KeyCode::Escape)]);
        assert!(!p.has_pending());
    }

    #[test]
    fn split_sequence_resumes() {
        let mut p = Parser::new();
        assert!(p.advance(b"\x1b[1;").is_empty());
        assert_eq!(p.advance(b"1:3C"), vec![key_kind(KeyCode::Right, KeyEventKind::Release)]);
    }

    #[test]
    fn rapid_mixed_input() {
        let events = parse(b"\x1b[A\x1b[97;1:3uz");
        assert_eq!(
            events,
            vec![
                key(KeyCode::Up),
                key_kind(KeyCode::Char('a'), KeyEventKind::Release),
                key(KeyCode::Char('z')),
            ]
        );
    }

    // ── Number / parameter parsing ──────────────────────────────────────

    #[test]
    fn csi_params() {
        assert_eq!(parse_csi_params(b""), vec![]);
        assert_eq!(parse_csi_params(b"1;2"), vec![CsiParam(1, 0), CsiParam(2, 0)]);
        assert_eq!(
            parse_csi_params(b"97;5:3"),
            vec![CsiParam(97, 0), CsiParam(5, 3)]
        );
        assert_eq!(parse_csi_params(b";5"), vec![CsiParam(0, 0), CsiParam(5, 0)]);
    }

    #[test]
    fn number_saturates() {
        assert_eq!(parse_u32_at(b"99999999999", 0).0, u32::MAX);
        assert_eq!(parse_u32_at(b"12x", 0), (12, 2));
    }

    #[test]
    fn modifier_decoding() {
        assert_eq!(decode_modifiers(0), Modifiers::empty());
        assert_eq!(decode_modifiers(1), Modifiers::empty());
        assert_eq!(decode_modifiers(2), Modifiers::SHIFT);
        assert_eq!(decode_modifiers(5), Modifiers::CTRL);
        assert_eq!(decode_modifiers(9), Modifiers::SUPER);
    }
}
