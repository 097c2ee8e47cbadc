// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Non-blocking input drain.
//
// The key-state query must never wait, so there is no reader thread and
// no channel: each query polls the input fd with a zero timeout and reads
// until nothing more is ready. Whatever arrived since the last query comes
// back as one slice for the parser.

use std::io;

/// Chunk size for each `read()`. A keypress is a few bytes; a burst of
/// auto-repeat or a held modifier stream rarely exceeds a few hundred.
const READ_CHUNK: usize = 4096;

/// Drains whatever input is pending on a file descriptor.
#[derive(Debug)]
pub struct InputDrain {
    fd: i32,
    buf: Vec<u8>,
}

impl InputDrain {
    #[must_use]
    pub fn new(fd: i32) -> Self {
        Self {
            fd,
            buf: Vec::with_capacity(READ_CHUNK),
        }
    }

    /// Read every byte available right now, without blocking.
    ///
    /// Returns an empty slice when nothing is pending.
    ///
    /// # Errors
    ///
    /// [`io::ErrorKind::UnexpectedEof`] once the other end has closed, or
    /// the OS error from `poll` / `read`.
    #[cfg(unix)]
    pub fn read_available(&mut self) -> io::Result<&[u8]> {
        self.buf.clear();
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            let mut pfd = libc::pollfd {
                fd: self.fd,
                events: libc::POLLIN,
                revents: 0,
            };
            let ready = unsafe { libc::poll(&raw mut pfd, 1, 0) };
            if ready < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }
            if ready == 0 {
                break;
            }
            if pfd.revents & libc::POLLNVAL != 0 {
                return Err(io::Error::from_raw_os_error(libc::EBADF));
            }

            let n = unsafe { libc::read(self.fd, chunk.as_mut_ptr().cast(), chunk.len()) };
            match n {
                0 => return Err(io::ErrorKind::UnexpectedEof.into()),
                n if n < 0 => {
                    let err = io::Error::last_os_error();
                    match err.kind() {
                        io::ErrorKind::Interrupted => {}
                        io::ErrorKind::WouldBlock => break,
                        _ => return Err(err),
                    }
                }
                n => {
                    let n = usize::try_from(n).unwrap_or(0);
                    self.buf.extend_from_slice(&chunk[..n]);
                }
            }
        }

        Ok(&self.buf)
    }

    #[cfg(not(unix))]
    pub fn read_available(&mut self) -> io::Result<&[u8]> {
        self.buf.clear();
        Ok(&self.buf)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
