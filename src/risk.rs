//! One-shot fatal latch plus the convergence strategy's running position
//! accumulators. Every strategy shares the latch; only convergence gates
//! outbound quotes on a position check.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Set once, observed by the session loop at the top of every iteration.
/// A `FATAL` log entry sets it directly. Once set there is no path back
/// to running — teardown is immediate and irrecoverable.
#[derive(Clone, Default)]
pub struct AbortLatch {
    flag: Arc<AtomicBool>,
}

impl AbortLatch {
    pub fn new() -> Self {
        AbortLatch {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Running long/short position accumulators, backing the convergence
/// strategy's pre-send risk gate.
pub struct PositionRisk {
    abort: AbortLatch,
    long_position: f64,
    short_position: f64,
}

impl PositionRisk {
    pub fn new(abort: AbortLatch) -> Self {
        PositionRisk {
            abort,
            long_position: 0.0,
            short_position: 0.0,
        }
    }

    /// Pre-send gate: denies once the latch is set, no log on denial —
    /// the FATAL that set it already logged the reason.
    pub fn check(&self) -> bool {
        !self.abort.is_set()
    }

    pub fn update_position(&mut self, delta: f64, side: crate::orders::Side) {
        match side {
            crate::orders::Side::Bid => self.long_position += delta,
            crate::orders::Side::Ask => self.short_position += delta,
        }
    }

    pub fn long_position(&self) -> f64 {
        self.long_position
    }

    pub fn short_position(&self) -> f64 {
        self.short_position
    }

    pub fn abort_latch(&self) -> AbortLatch {
        self.abort.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::Side;

    #[test]
    fn latch_is_sticky_once_set() {
        let latch = AbortLatch::new();
        assert!(!latch.is_set());
        latch.set();
        assert!(latch.is_set());
    }

    #[test]
    fn position_risk_denies_after_abort() {
        let latch = AbortLatch::new();
        let risk = PositionRisk::new(latch.clone());
        assert!(risk.check());
        latch.set();
        assert!(!risk.check());
    }

    #[test]
    fn update_position_tracks_side_separately() {
        let mut risk = PositionRisk::new(AbortLatch::new());
        risk.update_position(10.0, Side::Bid);
        risk.update_position(4.0, Side::Ask);
        assert_eq!(risk.long_position(), 10.0);
        assert_eq!(risk.short_position(), 4.0);
    }
}
