// SPDX-License-Identifier: MIT
//
// Error taxonomy for surface operations.
//
// Three kinds, and only three. Construction-time validation (zero extents)
// fails with `InvalidDimension` before anything touches the terminal.
// Runtime failures split on whether the terminal is there at all
// (`SurfaceUnavailable`) or refused the request (`PlatformRejected`).

use std::io;

use thiserror::Error;

/// Errors raised by surfaces, modifiers, and the keyboard query.
#[derive(Debug, Error)]
pub enum Error {
    /// A width or height is zero, or a window exceeds the surface maximum.
    #[error("invalid dimension {width}x{height}")]
    InvalidDimension {
        /// Requested width in cells.
        width: u16,
        /// Requested height in cells.
        height: u16,
    },

    /// No usable terminal: output is redirected, the process is headless,
    /// or the handle has been detached.
    #[error("terminal surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// The surface refused the call for a reason opaque to this layer.
    #[error("{op} rejected: {reason}")]
    PlatformRejected {
        /// Name of the surface operation that failed.
        op: &'static str,
        /// Human-readable cause.
        reason: String,
    },
}

impl Error {
    /// Shorthand for [`Error::PlatformRejected`].
    pub fn rejected(op: &'static str, reason: impl Into<String>) -> Self {
        Self::PlatformRejected {
            op,
            reason: reason.into(),
        }
    }

    /// Classify an I/O failure raised while performing `op`.
    ///
    /// A pipe or descriptor that is gone means there is no terminal to talk
    /// to; everything else is the terminal saying no.
    #[must_use]
    pub fn from_io(op: &'static str, err: &io::Error) -> Self {
        if is_detached(err) {
            Self::SurfaceUnavailable(format!("{op}: {err}"))
        } else {
            Self::rejected(op, err.to_string())
        }
    }
}

fn is_detached(err: &io::Error) -> bool {
    if matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe | io::ErrorKind::NotConnected | io::ErrorKind::UnexpectedEof
    ) {
        return true;
    }

    #[cfg(unix)]
    if let Some(code) = err.raw_os_error() {
        return code == libc::ENOTTY || code == libc::EBADF || code == libc::ENXIO;
    }

    false
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_dimension_message() {
        let e = Error::InvalidDimension { width: 0, height: 25 };
        assert_eq!(e.to_string(), "invalid dimension 0x25");
    }

    #[test]
    fn rejected_message_names_op() {
        let e = Error::rejected("set_window", "window exceeds buffer");
        assert_eq!(e.to_string(), "set_window rejected: window exceeds buffer");
    }

    #[test]
    fn broken_pipe_is_unavailable() {
        let io = io::Error::from(io::ErrorKind::BrokenPipe);
        assert!(matches!(
            Error::from_io("flush", &io),
            Error::SurfaceUnavailable(_)
        ));
    }

    #[test]
    fn other_io_is_rejected() {
        let io = io::Error::other("boom");
        match Error::from_io("flush", &io) {
            Error::PlatformRejected { op, reason } => {
                assert_eq!(op, "flush");
                assert!(reason.contains("boom"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn enotty_is_unavailable() {
        let io = io::Error::from_raw_os_error(libc::ENOTTY);
        assert!(matches!(
            Error::from_io("tcgetattr", &io),
            Error::SurfaceUnavailable(_)
        ));
    }
}
