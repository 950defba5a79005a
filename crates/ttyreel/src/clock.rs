//! Millisecond clocks for measuring inter-chunk delays.
//!
//! Recording only ever needs differences between two readings, so both clocks
//! report milliseconds from an arbitrary origin rather than wall-clock time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of monotonic millisecond timestamps.
pub trait ClockSource: Send + Sync + std::fmt::Debug {
    /// Milliseconds elapsed since the clock's origin.
    fn now_ms(&self) -> u64;
}

/// Shared clock handle, cloned into the PTY reader thread
pub type Clock = Arc<dyn ClockSource>;

/// Monotonic clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is now
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Create a shared handle
    #[must_use]
    pub fn shared() -> Clock {
        Arc::new(Self::new())
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-driven clock for deterministic recording tests.
///
/// Time only moves when [`ManualClock::advance`] or [`ManualClock::set`] is
/// called.
#[derive(Debug, Default)]
pub struct ManualClock {
    current_ms: AtomicU64,
}

impl ManualClock {
    /// Create a clock at time zero
    #[must_use]
    pub fn new() -> Self {
        Self::at(0)
    }

    /// Create a clock at a given time
    #[must_use]
    pub fn at(time_ms: u64) -> Self {
        Self {
            current_ms: AtomicU64::new(time_ms),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, time_ms: u64) {
        self.current_ms.store(time_ms, Ordering::SeqCst);
    }

    /// Move time forward
    pub fn advance(&self, duration: Duration) {
        self.advance_ms(duration.as_millis() as u64);
    }

    /// Move time forward by milliseconds
    pub fn advance_ms(&self, ms: u64) {
        self.current_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clone for ManualClock {
    fn clone(&self) -> Self {
        Self::at(self.current_ms.load(Ordering::SeqCst))
    }
}

impl ClockSource for ManualClock {
    fn now_ms(&self) -> u64 {
        self.current_ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod system_clock_tests {
        use super::*;

        #[test]
        fn test_starts_near_zero() {
            let clock = SystemClock::new();
            assert!(clock.now_ms() < 1000);
        }

        #[test]
        fn test_is_monotonic() {
            let clock = SystemClock::new();
            let a = clock.now_ms();
            std::thread::sleep(Duration::from_millis(2));
            let b = clock.now_ms();
            assert!(b >= a);
        }
    }

    mod manual_clock_tests {
        use super::*;

        #[test]
        fn test_does_not_move_on_its_own() {
            let clock = ManualClock::at(40);
            std::thread::sleep(Duration::from_millis(2));
            assert_eq!(clock.now_ms(), 40);
        }

        #[test]
        fn test_advance_and_set() {
            let clock = ManualClock::new();
            clock.advance_ms(7);
            clock.advance(Duration::from_millis(3));
            assert_eq!(clock.now_ms(), 10);
            clock.set(2);
            assert_eq!(clock.now_ms(), 2);
        }

        #[test]
        fn test_clone_snapshots_time() {
            let clock = ManualClock::at(5);
            let copy = clock.clone();
            clock.advance_ms(5);
            assert_eq!(copy.now_ms(), 5);
            assert_eq!(clock.now_ms(), 10);
        }

        #[test]
        fn test_usable_as_shared_clock() {
            let manual = Arc::new(ManualClock::at(100));
            let shared: Clock = manual.clone();
            manual.advance_ms(1);
            assert_eq!(shared.now_ms(), 101);
        }
    }
}
