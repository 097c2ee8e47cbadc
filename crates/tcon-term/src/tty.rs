// SPDX-License-Identifier: MIT
//
// TTY plumbing — raw mode, size query, and panic-safe restore.
//
// Safety: termios (tcgetattr, tcsetattr), ioctl (TIOCGWINSZ), isatty, and
// the raw fd write in the panic hook are POSIX calls with no safe wrapper
// in std. Each unsafe block is one call on a plain-old-data argument.
#![allow(unsafe_code)]
//
// The panic hook bypasses Rust's stdout lock and writes a pre-built restore
// sequence straight to fd 1. A panic raised while the lock is held (during
// a flush, say) would otherwise deadlock the hook. After the bytes go out
// and termios is restored, the original hook prints the message to a
// working terminal.

use std::io;
#[cfg(unix)]
use std::sync::Mutex;
use std::sync::Once;

use tracing::warn;

use crate::geometry::Size;

// ─── Queries ────────────────────────────────────────────────────────────────

/// Whether `fd` is a terminal.
#[cfg(unix)]
#[must_use]
pub fn is_tty(fd: i32) -> bool {
    unsafe { libc::isatty(fd) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub const fn is_tty(_fd: i32) -> bool {
    false
}

/// Terminal size from `ioctl(TIOCGWINSZ)` on stdout, or `None` if stdout
/// is not a terminal or reports a zero extent.
#[cfg(unix)]
#[must_use]
pub fn window_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    (result == 0 && ws.ws_col > 0 && ws.ws_row > 0).then(|| Size::new(ws.ws_col, ws.ws_row))
}

#[cfg(not(unix))]
#[must_use]
pub const fn window_size() -> Option<Size> {
    None
}

pub const STDIN: i32 = 0;
pub const STDOUT: i32 = 1;

// ─── Panic-Safe Restore ─────────────────────────────────────────────────────

/// Copy of the original termios for the panic hook, which cannot reach
/// the `RawMode` guard.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<(i32, libc::termios)>> = Mutex::new(None);

/// Everything `AnsiTerminal` may have turned on, switched back off.
///
/// End synchronized output, pop the Kitty keyboard flags, reset SGR, reset
/// the cursor shape, show the cursor, leave the alternate screen. The
/// alternate screen goes last so the shell's content reappears clean.
#[rustfmt::skip]
pub const EMERGENCY_RESTORE: &[u8] = b"\
    \x1b[?2026l\
    \x1b[<u\
    \x1b[0m\
    \x1b[0 q\
    \x1b[?25h\
    \x1b[?1049l";

static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install (once per process) a panic hook that restores the terminal
/// before the original hook runs.
pub fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();
            restore_termios_from_backup();
            original(info);
        }));
    });
}

fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        use std::io::Write;
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

fn restore_termios_from_backup() {
    #[cfg(unix)]
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some((fd, ref original)) = *guard {
            unsafe {
                let _ = libc::tcsetattr(fd, libc::TCSANOW, original);
            }
        }
    }
}

// ─── Raw Mode ───────────────────────────────────────────────────────────────

/// Raw mode on a terminal fd, restored on drop.
#[derive(Debug)]
pub struct RawMode {
    #[cfg(unix)]
    fd: i32,
    #[cfg(unix)]
    original: libc::termios,
}

impl RawMode {
    /// Put `fd` into raw mode: no echo, no line buffering, no signal keys,
    /// no output post-processing. Reads return whatever is available.
    ///
    /// # Errors
    ///
    /// The OS error from `tcgetattr` / `tcsetattr`.
    #[cfg(unix)]
    pub fn enable(fd: i32) -> io::Result<Self> {
        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }
            let original = termios;

            // cfmakeraw equivalent.
            termios.c_iflag &= !(libc::IGNBRK
                | libc::BRKINT
                | libc::PARMRK
                | libc::ISTRIP
                | libc::INLCR
                | libc::IGNCR
                | libc::ICRNL
                | libc::IXON);
            termios.c_oflag &= !libc::OPOST;
            termios.c_lflag &=
                !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
            termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
            termios.c_cflag |= libc::CS8;

            // Reads never block; input is drained with poll().
            termios.c_cc[libc::VMIN] = 0;
            termios.c_cc[libc::VTIME] = 0;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some((fd, original));
            }

            Ok(Self { fd, original })
        }
    }

    #[cfg(not(unix))]
    pub fn enable(_fd: i32) -> io::Result<Self> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "raw mode needs a POSIX terminal",
        ))
    }

    #[cfg(unix)]
    fn restore(&self) -> io::Result<()> {
        unsafe {
            if libc::tcsetattr(self.fd, libc::TCSAFLUSH, &raw const self.original) != 0 {
                return Err(io::Error::last_os_error());
            }
        }
        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = None;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    #[allow(clippy::unused_self, clippy::unnecessary_wraps)]
    const fn restore(&self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            warn!(%err, "failed to restore terminal mode");
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_do_not_panic() {
        let _ = is_tty(STDIN);
        let _ = window_size();
    }

    #[test]
    fn window_size_is_never_zero() {
        if let Some(size) = window_size() {
            assert!(!size.is_empty());
        }
    }

    #[cfg(unix)]
    #[test]
    fn raw_mode_on_non_tty_fails() {
        // A pipe is not a terminal.
        let mut fds = [0i32; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        assert!(RawMode::enable(fds[0]).is_err());
        unsafe {
            libc::close(fds[0]);
            libc::close(fds[1]);
        }
    }

    #[test]
    fn emergency_restore_leaves_alt_screen_last() {
        let s = std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
        assert!(s.ends_with("\x1b[?1049l"));
    }

    #[test]
    fn emergency_restore_undoes_every_mode() {
        let s = std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
        assert!(s.contains("\x1b[?2026l"), "must end sync output");
        assert!(s.contains("\x1b[<u"), "must pop kitty keyboard flags");
        assert!(s.contains("\x1b[0m"), "must reset SGR");
        assert!(s.contains("\x1b[0 q"), "must reset cursor shape");
        assert!(s.contains("\x1b[?25h"), "must show cursor");
    }
}
