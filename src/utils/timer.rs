//! Wall-clock timing for the baseline pass.
//!
//! - Optional CPU core pinning (feature `pin_baseline`)
//! - Repeated runs on identical copies, median reported
//! - Microsecond resolution

use std::hint::black_box;
use std::time::{Duration, Instant};

pub use super::cpu_affinity::CpuPinGuard;
use crate::error::SortResult;

// ============================================================================
// Configuration
// ============================================================================

/// CPU pinning strategy during measurements
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PinStrategy {
    /// Never pin
    Off,
    /// Pin once around all runs
    Global,
    /// Pin/unpin around each run
    #[default]
    PerExecution,
}

/// Configuration for the baseline measurement
#[derive(Clone, Debug)]
pub struct TimingConfig {
    /// Number of timed runs; the median is reported (default: 1)
    pub baseline_runs: usize,
    /// CPU pinning strategy (default: PerExecution)
    pub pin_strategy: PinStrategy,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            baseline_runs: 1,
            pin_strategy: PinStrategy::default(),
        }
    }
}

fn pin_guard(wanted: bool) -> CpuPinGuard {
    if wanted && cfg!(feature = "pin_baseline") {
        CpuPinGuard::new()
    } else {
        CpuPinGuard::disabled()
    }
}

/// Times `sort` on fresh copies of `input` and returns the median.
///
/// Every run sorts its own copy, so each one starts from the same order.
/// The result is truncated to whole microseconds and is never zero.
pub fn time_baseline<F>(input: &[i32], config: &TimingConfig, mut sort: F) -> SortResult<Duration>
where
    F: FnMut(&mut [i32]) -> SortResult<()>,
{
    let runs = config.baseline_runs.max(1);
    let mut times = Vec::with_capacity(runs);
    let _global_pin = pin_guard(config.pin_strategy == PinStrategy::Global);
    for _ in 0..runs {
        let mut data = input.to_vec();
        let _per_exec_pin = pin_guard(config.pin_strategy == PinStrategy::PerExecution);
        let start = Instant::now();
        sort(black_box(data.as_mut_slice()))?;
        times.push(start.elapsed());
        black_box(&data);
    }
    let median = calculate_median(&times);
    Ok(Duration::from_micros((median.as_micros() as u64).max(1)))
}

/// Calculate median from a slice of durations.
pub fn calculate_median(times: &[Duration]) -> Duration {
    if times.is_empty() {
        return Duration::ZERO;
    }
    let mut sorted: Vec<_> = times.to_vec();
    sorted.sort();
    sorted[sorted.len() / 2]
}
