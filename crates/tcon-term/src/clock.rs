// SPDX-License-Identifier: MIT
//
// Millisecond tick counter for frame pacing.
//
// The epoch is the first call in the process. Ticks are a u32 and wrap
// after about 49.7 days, so durations must be computed with `elapsed` /
// `span` (wrapping subtraction), never by comparing two tick values.

use std::sync::OnceLock;
use std::time::Instant;

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Milliseconds since the process epoch, wrapping at `u32::MAX`.
#[must_use]
pub fn ticks() -> u32 {
    let epoch = *EPOCH.get_or_init(Instant::now);
    truncate(epoch.elapsed().as_millis())
}

/// Milliseconds from `since` to now, correct across one wrap.
#[must_use]
pub fn elapsed(since: u32) -> u32 {
    span(since, ticks())
}

/// Milliseconds from `start` to `end`, correct across one wrap.
#[must_use]
pub const fn span(start: u32, end: u32) -> u32 {
    end.wrapping_sub(start)
}

fn truncate(ms: u128) -> u32 {
    u32::try_from(ms % (1u128 << 32)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn ticks_advance() {
        let a = ticks();
        thread::sleep(Duration::from_millis(15));
        assert!(elapsed(a) >= 10);
    }

    #[test]
    fn span_across_wrap() {
        assert_eq!(span(u32::MAX - 4, 5), 10);
        assert_eq!(span(100, 250), 150);
    }

    #[test]
    fn truncate_wraps() {
        assert_eq!(truncate(u128::from(u32::MAX)), u32::MAX);
        assert_eq!(truncate(u128::from(u32::MAX) + 1), 0);
        assert_eq!(truncate(u128::from(u32::MAX) + 11), 10);
    }
}
