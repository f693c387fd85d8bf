//! Simulated time.
//!
//! Every sleep in the simulation goes through [`Clock::advance`], measured in
//! simulated seconds. [`RealClock`] turns that into a real sleep; [`VirtualClock`]
//! only counts, so tests run without waiting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

pub trait Clock: Send + Sync {
    /// Blocks the calling worker for `seconds` of simulated time.
    fn advance(&self, seconds: u64);
}

/// Sleeps `tick` of real time per simulated second.
#[derive(Debug, Clone, Copy)]
pub struct RealClock {
    tick: Duration,
}

impl RealClock {
    pub fn new(tick: Duration) -> Self {
        Self { tick }
    }
}

impl Clock for RealClock {
    fn advance(&self, seconds: u64) {
        if seconds == 0 || self.tick.is_zero() {
            return;
        }
        let seconds = u32::try_from(seconds).unwrap_or(u32::MAX);
        thread::sleep(self.tick.saturating_mul(seconds));
    }
}

/// Returns immediately and records how much simulated time was requested.
#[derive(Debug, Default)]
pub struct VirtualClock {
    elapsed: AtomicU64,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total simulated seconds advanced so far, across all callers.
    pub fn elapsed(&self) -> u64 {
        self.elapsed.load(Ordering::SeqCst)
    }
}

impl Clock for VirtualClock {
    fn advance(&self, seconds: u64) {
        self.elapsed.fetch_add(seconds, Ordering::SeqCst);
        // Let other workers make progress between virtual ticks.
        thread::yield_now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn virtual_clock_accumulates() {
        let clock = VirtualClock::new();
        clock.advance(3);
        clock.advance(0);
        clock.advance(7);
        assert_eq!(clock.elapsed(), 10);
    }

    #[test]
    fn real_clock_sleeps_per_second() {
        let clock = RealClock::new(Duration::from_millis(5));
        let start = Instant::now();
        clock.advance(4);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn sub_millisecond_ticks_still_sleep() {
        let clock = RealClock::new(Duration::from_micros(500));
        let start = Instant::now();
        clock.advance(10);
        assert!(start.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn zero_tick_never_sleeps() {
        let clock = RealClock::new(Duration::ZERO);
        let start = Instant::now();
        clock.advance(1_000_000);
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
