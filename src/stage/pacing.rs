//! Animation speed and the per-thread pacing delay.

use parking_lot::RwLock;
use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

/// Animated operations per millisecond, kept as a fraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Speed {
    ops: u32,
    per_ms: u32,
}

impl Speed {
    /// No delay at all.
    pub const UNPACED: Speed = Speed { ops: 0, per_ms: 1 };

    /// `ops` animated operations every `per_ms` milliseconds.
    pub fn new(ops: u32, per_ms: u32) -> Self {
        Self {
            ops,
            per_ms: per_ms.max(1),
        }
    }

    /// Scales the default speed; `2.0` runs twice as fast.
    pub fn from_multiplier(multiplier: f64) -> Self {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Self::default();
        }
        let ops = (multiplier * 1000.0).round().clamp(1.0, u32::MAX as f64) as u32;
        Self::new(ops, 2000)
    }

    pub fn is_unpaced(&self) -> bool {
        self.ops == 0
    }

    /// Delay owed per operation, in milliseconds.
    pub fn millis_per_op(&self) -> f64 {
        if self.is_unpaced() {
            0.0
        } else {
            self.per_ms as f64 / self.ops as f64
        }
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self::new(1, 2)
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unpaced() {
            write!(f, "unpaced")
        } else {
            write!(f, "{}/{} ops/ms", self.ops, self.per_ms)
        }
    }
}

static NEXT_PACER: AtomicU64 = AtomicU64::new(1);

thread_local! {
    // (pacer id, speed generation, owed delay in 1/ops ms)
    static OWED: Cell<(u64, u64, u64)> = const { Cell::new((0, 0, 0)) };
}

/// Sleeps each calling thread long enough to honour the current [`Speed`].
///
/// The fractional remainder is carried per thread, so a thread that calls
/// at one operation per 0.4 ms sleeps 0, 0, 1, 0, 1, ... milliseconds.
/// Changing the speed discards every thread's remainder.
#[derive(Debug)]
pub struct Pacer {
    id: u64,
    speed: RwLock<(Speed, u64)>,
}

impl Pacer {
    pub fn new(speed: Speed) -> Self {
        Self {
            id: NEXT_PACER.fetch_add(1, Ordering::Relaxed),
            speed: RwLock::new((speed, 0)),
        }
    }

    pub fn speed(&self) -> Speed {
        self.speed.read().0
    }

    pub fn set_speed(&self, speed: Speed) {
        let mut slot = self.speed.write();
        slot.0 = speed;
        slot.1 += 1;
    }

    /// Milliseconds the calling thread should sleep for one operation.
    pub fn owe(&self) -> u64 {
        let (speed, generation) = *self.speed.read();
        if speed.is_unpaced() {
            return 0;
        }
        OWED.with(|cell| {
            let (id, seen, mut owed) = cell.get();
            if id != self.id || seen != generation {
                owed = 0;
            }
            owed += speed.per_ms as u64;
            let ms = owed / speed.ops as u64;
            cell.set((self.id, generation, owed % speed.ops as u64));
            ms
        })
    }

    pub fn pace(&self) {
        let ms = self.owe();
        if ms > 0 {
            thread::sleep(Duration::from_millis(ms));
        }
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(Speed::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_two_ms_per_op() {
        let pacer = Pacer::default();
        assert_eq!(pacer.owe(), 2);
        assert_eq!(pacer.owe(), 2);
        assert_eq!(Speed::default().millis_per_op(), 2.0);
    }

    #[test]
    fn test_remainder_carries_between_calls() {
        // 5 ops every 2 ms
        let pacer = Pacer::new(Speed::new(5, 2));
        let owed: Vec<u64> = (0..5).map(|_| pacer.owe()).collect();
        assert_eq!(owed, vec![0, 0, 1, 0, 1]);
    }

    #[test]
    fn test_speed_change_resets_remainder() {
        let pacer = Pacer::new(Speed::new(3, 2));
        assert_eq!(pacer.owe(), 0);
        pacer.set_speed(Speed::new(3, 2));
        assert_eq!(pacer.owe(), 0);
        assert_eq!(pacer.owe(), 1);
    }

    #[test]
    fn test_unpaced_and_multiplier() {
        let pacer = Pacer::new(Speed::UNPACED);
        assert_eq!(pacer.owe(), 0);
        assert_eq!(Speed::from_multiplier(2.0).millis_per_op(), 1.0);
        assert_eq!(Speed::from_multiplier(-1.0), Speed::default());
    }
}
