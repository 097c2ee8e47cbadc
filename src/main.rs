// SPDX-License-Identifier: MIT
//
// tcon — drive tcon-term against the live terminal.
//
// Sizes the terminal with a Dimension modifier, clears it, draws a border,
// and lets the arrow keys walk an '@' around inside it. Escape quits.
// Every screen change goes through the modifiers or the Surface calls
// they are built on; key state comes from Keyboard::key_down, polled once
// per frame, and frames are paced with the tick clock.
//
//   tcon [--width N] [--height N] [--fps N]
//
// Logging goes to stderr, filtered by TCON_LOG (default "warn").

use std::env;
use std::io;
use std::process;
use std::thread;
use std::time::Duration;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tcon_term::clock;
use tcon_term::{
    AnsiTerminal, Attribute, Clear, Color, Coord, Cursor, Dimension, Keyboard, Palette, Result,
    Size, Surface, SurfaceExt, TerminalOptions, VirtualKey,
};

// ─── Configuration ──────────────────────────────────────────────────────────

const USAGE: &str = "\
usage: tcon [options]

  -w, --width N    surface width in columns (default 60, min 10)
  -h, --height N   surface height in rows (default 20, min 5)
      --fps N      frames per second (default 30, 1..=240)
      --help       show this message

Arrow keys move, Escape quits. TCON_LOG sets the log filter.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Config {
    width: u16,
    height: u16,
    fps: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 60,
            height: 20,
            fps: 30,
        }
    }
}

impl Config {
    /// Parse command-line arguments (without the program name).
    ///
    /// `Ok(None)` means `--help` was asked for.
    fn from_args(args: impl IntoIterator<Item = String>) -> std::result::Result<Option<Self>, String> {
        let mut config = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--help" => return Ok(None),
                "-w" | "--width" => config.width = number(&arg, args.next())?,
                "-h" | "--height" => config.height = number(&arg, args.next())?,
                "--fps" => config.fps = number(&arg, args.next())?,
                other => return Err(format!("unknown argument '{other}'")),
            }
        }

        if config.width < 10 || config.height < 5 {
            return Err(format!(
                "{}x{} is too small; the minimum is 10x5",
                config.width, config.height
            ));
        }
        if !(1..=240).contains(&config.fps) {
            return Err(format!("--fps {} is outside 1..=240", config.fps));
        }
        Ok(Some(config))
    }

    fn frame_ms(&self) -> u32 {
        1000 / self.fps
    }
}

fn number<T: std::str::FromStr>(flag: &str, value: Option<String>) -> std::result::Result<T, String> {
    let value = value.ok_or_else(|| format!("{flag} needs a value"))?;
    value
        .parse()
        .map_err(|_| format!("{flag}: '{value}' is not a valid number"))
}

// ─── Scene ──────────────────────────────────────────────────────────────────

/// Minimum time between two steps of the '@', in milliseconds.
const MOVE_INTERVAL: u32 = 60;

const BORDER: Attribute = Attribute::new(Palette::CYAN, Palette::BLACK);
const TITLE: Color = Color::new(Palette::WHITE, Palette::BLUE);
const PLAYER: Color = Color::new(Palette::YELLOW, Palette::BLACK);
const FLOOR: Color = Color::new(Palette::GREY, Palette::BLACK);

/// The bordered room and the '@' walking around in it.
#[derive(Debug)]
struct Scene {
    size: Size,
    player: Cursor,
    last_move: u32,
}

impl Scene {
    fn new(size: Size) -> Self {
        Self {
            size,
            player: Cursor::new(size.cols / 2, size.rows / 2),
            last_move: 0,
        }
    }

    /// Size the surface and draw everything once.
    fn setup(&self, s: &mut impl Surface) -> Result<()> {
        s.with(&Dimension::new(self.size.cols, self.size.rows, true)?)?
            .with(&Clear::default())?;
        self.draw_border(s)?;
        s.with(&TITLE)?.with(&Cursor::new(2, 0))?.write_text(" tcon ")?;
        self.draw_player(s)
    }

    /// The border goes in with fills: writing the bottom-right cell would
    /// wrap the cursor and scroll the buffer.
    fn draw_border(&self, s: &mut impl Surface) -> Result<()> {
        let (w, h) = (self.size.cols, self.size.rows);
        for y in [0, h - 1] {
            s.fill_characters(Coord::new(0, y), u32::from(w), b'-')?;
            s.fill_attributes(Coord::new(0, y), u32::from(w), BORDER)?;
        }
        for y in 0..h {
            let ch = if y == 0 || y == h - 1 { b'+' } else { b'|' };
            for x in [0, w - 1] {
                s.fill_characters(Coord::new(x, y), 1, ch)?;
                s.fill_attributes(Coord::new(x, y), 1, BORDER)?;
            }
        }
        Ok(())
    }

    fn draw_player(&self, s: &mut impl Surface) -> Result<()> {
        s.with(&PLAYER)?.with(&self.player)?.write_text("@")
    }

    fn erase_player(&self, s: &mut impl Surface) -> Result<()> {
        s.with(&FLOOR)?.with(&self.player)?.write_text(" ")
    }

    /// Whether `c` is strictly inside the border.
    const fn is_floor(&self, c: Cursor) -> bool {
        c.x() > 0 && c.y() > 0 && c.x() < self.size.cols - 1 && c.y() < self.size.rows - 1
    }

    /// Read the arrows and move one cell if any is held. Returns whether
    /// the '@' moved.
    fn step<S: Surface + Keyboard>(&mut self, s: &mut S, now: u32) -> Result<bool> {
        if clock::span(self.last_move, now) < MOVE_INTERVAL {
            return Ok(false);
        }

        let mut dx = 0i16;
        let mut dy = 0i16;
        if s.key_down(VirtualKey::LEFT)? {
            dx -= 1;
        }
        if s.key_down(VirtualKey::RIGHT)? {
            dx += 1;
        }
        if s.key_down(VirtualKey::UP)? {
            dy -= 1;
        }
        if s.key_down(VirtualKey::DOWN)? {
            dy += 1;
        }

        let mut next = self.player;
        next.move_by(dx, dy);
        if next == self.player || !self.is_floor(next) {
            return Ok(false);
        }

        self.erase_player(s)?;
        self.player = next;
        self.draw_player(s)?;
        self.last_move = now;
        Ok(true)
    }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn run(config: Config) -> Result<()> {
    let mut term = AnsiTerminal::open(TerminalOptions::default())?;
    let mut scene = Scene::new(Size::new(config.width, config.height));
    scene.setup(&mut term)?;
    info!(?config, releases = term.reports_releases(), "running");

    loop {
        let start = clock::ticks();
        if term.key_down(VirtualKey::ESCAPE)? {
            debug!("escape");
            break;
        }
        scene.step(&mut term, start)?;

        let spent = clock::elapsed(start);
        if spent < config.frame_ms() {
            thread::sleep(Duration::from_millis(u64::from(config.frame_ms() - spent)));
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("TCON_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = match Config::from_args(env::args().skip(1)) {
        Ok(Some(config)) => config,
        Ok(None) => {
            println!("{USAGE}");
            return;
        }
        Err(msg) => {
            eprintln!("tcon: {msg}\n\n{USAGE}");
            process::exit(2);
        }
    };

    if let Err(e) = run(config) {
        eprintln!("tcon: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
