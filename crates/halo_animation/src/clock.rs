//! Frame clocks for self-driven animation loops.
//!
//! The manager itself only consumes timestamps. A [`Clock`] supplies them
//! when the manager drives its own loop via
//! [`AnimationManager::run`](crate::AnimationManager::run): the system clock
//! for real time, or a manual clock for deterministic headless runs.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A monotonic millisecond time source
pub trait Clock {
    /// Current time in milliseconds
    fn now_ms(&self) -> f64;

    /// Let `ms` milliseconds pass before the next frame
    fn wait(&self, ms: f64);
}

/// Wall-clock time measured from creation
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn wait(&self, ms: f64) {
        if ms > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(ms / 1000.0));
        }
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can hold one copy while the loop
/// drives another. Waiting advances time instantly.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms.max(0.0));
    }

    /// Jump to an absolute time; earlier times are ignored to stay monotonic
    pub fn set(&self, ms: f64) {
        if ms > self.now.get() {
            self.now.set(ms);
        }
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }

    fn wait(&self, ms: f64) {
        self.advance(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_is_shared_and_monotonic() {
        let clock = ManualClock::new(100.0);
        let other = clock.clone();

        clock.advance(16.0);
        assert_eq!(other.now_ms(), 116.0);

        other.wait(4.0);
        assert_eq!(clock.now_ms(), 120.0);

        clock.set(50.0);
        assert_eq!(clock.now_ms(), 120.0);
        clock.advance(-10.0);
        assert_eq!(clock.now_ms(), 120.0);

        clock.set(500.0);
        assert_eq!(other.now_ms(), 500.0);
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock::new();
        let a = clock.now_ms();
        clock.wait(1.0);
        let b = clock.now_ms();
        assert!(b > a);
    }
}
