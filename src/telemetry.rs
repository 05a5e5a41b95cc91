//! Throttled elapsed-time / progress reporting for the animated pass.

use crate::counters::{OpCounters, OpSnapshot};
use crate::stage::PauseControl;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Estimated position within the pass, derived from the counting total.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    /// Baseline time corresponding to the steps done so far.
    pub estimated: Duration,
    /// Baseline time of the whole sort.
    pub total: Duration,
    /// Percentage in tenths, capped at 1000.
    pub permille: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Telemetry {
    /// Animated wall-clock time minus time spent paused.
    pub elapsed: Duration,
    /// Absent for nondeterministic algorithms.
    pub progress: Option<Progress>,
    pub counters: OpSnapshot,
}

impl fmt::Display for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "elapsed {:.3}s", self.elapsed.as_secs_f64())?;
        if let Some(p) = &self.progress {
            write!(
                f,
                " | estimated {}us / {}us ({}.{}%)",
                p.estimated.as_micros(),
                p.total.as_micros(),
                p.permille / 10,
                p.permille % 10
            )?;
        }
        write!(
            f,
            " | compares {} reads {} writes {}",
            self.counters.compares, self.counters.reads, self.counters.writes
        )
    }
}

/// Receiver for telemetry and user-facing alerts.
pub trait StatusSink: Send + Sync {
    fn telemetry(&self, telemetry: &Telemetry);

    /// Messages shown to the user, e.g. rejected sizes or pass failures.
    fn alert(&self, _messages: &[String]) {}
}

/// Forwards everything to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl StatusSink for LogSink {
    fn telemetry(&self, telemetry: &Telemetry) {
        info!(target: "visual_sort::telemetry", "{}", telemetry);
    }

    fn alert(&self, messages: &[String]) {
        for message in messages {
            warn!("{}", message);
        }
    }
}

/// Collects everything it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub frames: Mutex<Vec<Telemetry>>,
    pub alerts: Mutex<Vec<String>>,
}

impl StatusSink for RecordingSink {
    fn telemetry(&self, telemetry: &Telemetry) {
        self.frames.lock().push(*telemetry);
    }

    fn alert(&self, messages: &[String]) {
        self.alerts.lock().extend(messages.iter().cloned());
    }
}

impl<S: StatusSink + ?Sized> StatusSink for Arc<S> {
    fn telemetry(&self, telemetry: &Telemetry) {
        (**self).telemetry(telemetry)
    }

    fn alert(&self, messages: &[String]) {
        (**self).alert(messages)
    }
}

/// Turns the animation step count into elapsed/progress frames.
///
/// [`tick`](Self::tick) is cheap and is meant to run on every animated
/// operation; it publishes one frame every `gap × active threads` ticks.
pub struct ProgressEstimator {
    baseline: Duration,
    counted_total: u64,
    nondeterministic: bool,
    gap: u64,
    pending: AtomicU64,
    started: Instant,
    /// Paused time already on the control when the estimator started.
    paused_before: Duration,
    control: Arc<PauseControl>,
    counters: Arc<OpCounters>,
    sink: Arc<dyn StatusSink>,
}

impl ProgressEstimator {
    pub fn new(
        baseline: Duration,
        counted_total: u64,
        nondeterministic: bool,
        gap: u64,
        control: Arc<PauseControl>,
        counters: Arc<OpCounters>,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            baseline,
            counted_total,
            nondeterministic,
            gap: gap.max(1),
            pending: AtomicU64::new(0),
            started: Instant::now(),
            paused_before: control.paused_total(),
            control,
            counters,
            sink,
        }
    }

    pub fn tick(&self) {
        let limit = self.gap * self.control.active_threads() as u64;
        let seen = self.pending.fetch_add(1, Ordering::AcqRel) + 1;
        if seen >= limit
            && self
                .pending
                .compare_exchange(seen, 0, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        {
            self.sink.telemetry(&self.snapshot());
        }
    }

    /// Wall-clock time since construction minus the pauses taken since then.
    pub fn elapsed(&self) -> Duration {
        let paused = self
            .control
            .paused_total()
            .saturating_sub(self.paused_before);
        self.started.elapsed().saturating_sub(paused)
    }

    pub fn snapshot(&self) -> Telemetry {
        let counters = self.counters.snapshot();
        Telemetry {
            elapsed: self.elapsed(),
            progress: self.progress(counters.steps),
            counters,
        }
    }

    fn progress(&self, steps: u64) -> Option<Progress> {
        if self.nondeterministic {
            return None;
        }
        if self.counted_total == 0 {
            return Some(Progress {
                estimated: self.baseline,
                total: self.baseline,
                permille: 1000,
            });
        }
        let steps = steps.min(self.counted_total) as u128;
        let total = self.counted_total as u128;
        let micros = self.baseline.as_micros() * steps / total;
        Some(Progress {
            estimated: Duration::from_micros(micros.min(u64::MAX as u128) as u64),
            total: self.baseline,
            permille: (steps * 1000 / total) as u32,
        })
    }

    /// Publishes the closing frame and returns it.
    pub fn finish(&self) -> Telemetry {
        let last = self.snapshot();
        self.sink.telemetry(&last);
        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::Access;

    fn estimator(
        nondeterministic: bool,
        total: u64,
    ) -> (ProgressEstimator, Arc<OpCounters>, Arc<RecordingSink>) {
        let counters = Arc::new(OpCounters::new());
        let sink = Arc::new(RecordingSink::default());
        let control = Arc::new(PauseControl::default());
        control.begin_pass(false);
        let est = ProgressEstimator::new(
            Duration::from_micros(500),
            total,
            nondeterministic,
            10,
            control,
            Arc::clone(&counters),
            sink.clone(),
        );
        (est, counters, sink)
    }

    #[test]
    fn test_throttled_and_monotonic() {
        let (est, counters, sink) = estimator(false, 100);
        for _ in 0..100 {
            counters.record(Access::CompareTwo);
            est.tick();
        }
        let last = est.finish();
        let frames = sink.frames.lock();
        assert_eq!(frames.len(), 10 + 1);
        let percents: Vec<u32> = frames
            .iter()
            .map(|t| t.progress.map_or(0, |p| p.permille))
            .collect();
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(percents[0], 100);
        let p = last.progress.unwrap();
        assert_eq!(p.permille, 1000);
        assert_eq!(p.estimated, Duration::from_micros(500));
    }

    #[test]
    fn test_pause_before_start_is_not_subtracted() {
        let control = Arc::new(PauseControl::new(Duration::from_millis(1)));
        control.begin_pass(false);
        control.pause();
        let resumer = {
            let c = Arc::clone(&control);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(40));
                c.resume();
            })
        };
        control.checkpoint().unwrap();
        resumer.join().unwrap();
        assert!(control.paused_total() >= Duration::from_millis(30));

        let est = ProgressEstimator::new(
            Duration::from_micros(500),
            10,
            false,
            10,
            Arc::clone(&control),
            Arc::new(OpCounters::new()),
            Arc::new(RecordingSink::default()),
        );
        std::thread::sleep(Duration::from_millis(10));
        assert!(est.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_nondeterministic_has_no_percentage() {
        let (est, counters, _sink) = estimator(true, 100);
        counters.record(Access::LoadOne);
        assert_eq!(est.snapshot().progress, None);
    }

    #[test]
    fn test_display() {
        let t = Telemetry {
            elapsed: Duration::from_millis(1500),
            progress: Some(Progress {
                estimated: Duration::from_micros(250),
                total: Duration::from_micros(500),
                permille: 500,
            }),
            counters: OpSnapshot {
                compares: 1,
                reads: 2,
                writes: 3,
                steps: 4,
            },
        };
        assert_eq!(
            t.to_string(),
            "elapsed 1.500s | estimated 250us / 500us (50.0%) | compares 1 reads 2 writes 3"
        );
    }
}
