//! Shared pausable monotonic clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

const RUNNING: u64 = 1;

/// Packs a signed nanosecond base and the running flag into one word.
/// The low bit is the flag; the remaining 63 bits hold the base, so a
/// single atomic load always yields a consistent snapshot.
fn pack(nanos: i64, running: bool) -> u64 {
    ((nanos << 1) as u64) | running as u64
}

fn unpack(state: u64) -> (i64, bool) {
    ((state as i64) >> 1, state & RUNNING == RUNNING)
}

/// A monotonically increasing, pausable, offsettable time source.
///
/// `OffsetStopwatch` is the single source of truth for timeline-relative
/// time: interactives and crossfade policy read it instead of wall-clock
/// time, so pausing the stopwatch freezes everything bound to it.
///
/// The entire state lives in one `AtomicU64`: while running it holds the
/// rebase epoch, while paused it holds the frozen offset. Reads are
/// lock-free and safe from any thread; `pause`/`resume`/`set_offset` are
/// reserved for the owning controller.
///
/// Pausing captures the current reading and resuming rebases the epoch to
/// the present raw reading, so consumers never observe a discontinuity
/// across a pause/resume pair.
pub struct OffsetStopwatch {
    origin: Instant,
    state: AtomicU64,
}

impl OffsetStopwatch {
    /// Creates a running stopwatch at time zero.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            state: AtomicU64::new(pack(0, true)),
        }
    }

    fn raw_nanos(&self) -> i64 {
        self.origin.elapsed().as_nanos() as i64
    }

    /// Current timeline position in seconds. Never blocks.
    pub fn current_time(&self) -> f64 {
        let (base, running) = unpack(self.state.load(Ordering::Acquire));
        let nanos = if running {
            self.raw_nanos() - base
        } else {
            base
        };
        nanos as f64 / 1e9
    }

    pub fn is_running(&self) -> bool {
        unpack(self.state.load(Ordering::Acquire)).1
    }

    /// Freezes the timeline at its current reading. Idempotent.
    pub fn pause(&self) {
        let (base, running) = unpack(self.state.load(Ordering::Acquire));
        if !running {
            return;
        }
        let frozen = self.raw_nanos() - base;
        self.state.store(pack(frozen, false), Ordering::Release);
        log::debug!("stopwatch paused at {:.6}s", frozen as f64 / 1e9);
    }

    /// Resumes from the frozen reading without a visible jump. Idempotent.
    pub fn resume(&self) {
        let (frozen, running) = unpack(self.state.load(Ordering::Acquire));
        if running {
            return;
        }
        self.state
            .store(pack(self.raw_nanos() - frozen, true), Ordering::Release);
        log::debug!("stopwatch resumed at {:.6}s", frozen as f64 / 1e9);
    }

    /// Force-rebases the timeline to `seconds`. Works both while running
    /// and while paused; any finite value is accepted, clamping is caller
    /// policy. A non-finite value is a caller error and is ignored — the
    /// packed representation has no meaningful encoding for it.
    pub fn set_offset(&self, seconds: f64) {
        if !seconds.is_finite() {
            log::warn!("ignoring non-finite timeline offset {}", seconds);
            return;
        }
        let nanos = (seconds * 1e9) as i64;
        let (_, running) = unpack(self.state.load(Ordering::Acquire));
        let base = if running {
            self.raw_nanos() - nanos
        } else {
            nanos
        };
        self.state.store(pack(base, running), Ordering::Release);
    }
}

impl Default for OffsetStopwatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn starts_running_at_zero() {
        let clock = OffsetStopwatch::new();
        assert!(clock.is_running());
        assert!(clock.current_time() >= 0.0);
        assert!(clock.current_time() < 0.5);
    }

    #[test]
    fn pause_freezes_and_is_idempotent() {
        let clock = OffsetStopwatch::new();
        thread::sleep(Duration::from_millis(20));
        clock.pause();
        let frozen = clock.current_time();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(clock.current_time(), frozen);
        clock.pause();
        assert_eq!(clock.current_time(), frozen);
    }

    #[test]
    fn resume_has_no_discontinuity() {
        let clock = OffsetStopwatch::new();
        thread::sleep(Duration::from_millis(20));
        clock.pause();
        let before = clock.current_time();
        thread::sleep(Duration::from_millis(20));
        clock.resume();
        let after = clock.current_time();
        assert!(after >= before);
        assert!(after - before < 0.005, "jump of {}s across resume", after - before);
    }

    #[test]
    fn set_offset_rebases_while_paused() {
        let clock = OffsetStopwatch::new();
        clock.pause();
        clock.set_offset(42.0);
        assert_eq!(clock.current_time(), 42.0);
        clock.set_offset(-3.0);
        assert_eq!(clock.current_time(), -3.0);
    }

    #[test]
    fn set_offset_ignores_non_finite_values() {
        let clock = OffsetStopwatch::new();
        clock.pause();
        clock.set_offset(5.0);
        clock.set_offset(f64::NAN);
        assert_eq!(clock.current_time(), 5.0);
        clock.set_offset(f64::INFINITY);
        assert_eq!(clock.current_time(), 5.0);
        clock.set_offset(f64::NEG_INFINITY);
        assert_eq!(clock.current_time(), 5.0);
    }

    #[test]
    fn set_offset_rebases_while_running() {
        let clock = OffsetStopwatch::new();
        clock.set_offset(100.0);
        let t = clock.current_time();
        assert!(t >= 100.0 && t < 100.5);
        thread::sleep(Duration::from_millis(20));
        assert!(clock.current_time() > t);
    }
}
