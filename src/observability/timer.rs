//! Monotonic timing for units of work.

use std::time::{Duration, Instant};

/// A started stopwatch on the monotonic clock.
///
/// Backed by [`Instant`], so it is immune to wall-clock adjustments and has
/// sub-millisecond precision.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time elapsed since [`Timer::start`].
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time elapsed since [`Timer::start`], in fractional seconds.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_timer_measures_sleep() {
        let timer = Timer::start();
        thread::sleep(Duration::from_millis(10));
        let elapsed = timer.elapsed_seconds();
        assert!(elapsed >= 0.010);
        assert!(elapsed < 5.0);
    }

    #[test]
    fn test_timer_is_monotonic() {
        let timer = Timer::start();
        let first = timer.elapsed_seconds();
        let second = timer.elapsed_seconds();
        assert!(first >= 0.0);
        assert!(second >= first);
    }
}
