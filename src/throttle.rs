//! Sliding-interval send throttle. The venue rate-limits; losing the
//! window is cheaper than losing the connection, so every outbound write
//! path goes through one of these.

use std::thread;
use std::time::{Duration, Instant};

pub struct Throttle {
    interval: Duration,
    max_per_interval: u32,
    last_sent: Instant,
    count_in_interval: u32,
}

impl Throttle {
    pub fn new(interval: Duration, max_per_interval: u32) -> Self {
        Throttle {
            interval,
            max_per_interval,
            last_sent: Instant::now(),
            count_in_interval: 0,
        }
    }

    /// Attempts to reserve room for `n` messages in the current window.
    /// Succeeds (and reserves) if the window still has capacity, or if the
    /// wall clock has crossed into a fresh window (which resets the count
    /// to `n`). Non-blocking: callers that want to wait use `force_send`.
    pub fn try_send(&mut self, n: u32) -> bool {
        let next_allowed = self.last_sent + self.interval;
        if self.count_in_interval <= self.max_per_interval.saturating_sub(n) {
            self.count_in_interval += n;
            true
        } else if Instant::now() >= next_allowed {
            self.last_sent = Instant::now();
            self.count_in_interval = n;
            true
        } else {
            false
        }
    }

    /// Busy-waits with a CPU pause intrinsic until `try_send` succeeds.
    /// Predictable latency at the cost of a spinning core — the intended
    /// tradeoff on the trading thread.
    pub fn force_send(&mut self, n: u32) {
        while !self.try_send(n) {
            std::hint::spin_loop();
        }
    }
}

/// Yields the thread briefly; used by non-hot-path backoff loops (the
/// logger's dedicated thread) where a full CPU spin would be wasteful.
pub fn yield_briefly() {
    thread::yield_now();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_window_capacity() {
        let mut throttle = Throttle::new(Duration::from_secs(1), 5);
        for _ in 0..5 {
            assert!(throttle.try_send(1));
        }
        assert!(!throttle.try_send(1), "sixth send within the window must be denied");
    }

    #[test]
    fn resets_window_after_interval_elapses() {
        let mut throttle = Throttle::new(Duration::from_millis(10), 1);
        assert!(throttle.try_send(1));
        assert!(!throttle.try_send(1));
        std::thread::sleep(Duration::from_millis(15));
        assert!(throttle.try_send(1));
    }

    #[test]
    fn force_send_eventually_succeeds() {
        let mut throttle = Throttle::new(Duration::from_millis(5), 1);
        throttle.try_send(1);
        throttle.force_send(1);
    }
}
