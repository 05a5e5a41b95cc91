//! # Execution controller
//!
//! Runs one catalog entry three times on the same seeded shuffle of the
//! source data:
//!
//! 1. **baseline**: plain `i32`, timed
//! 2. **counting**: [`Counted`], yields the step total used as the progress denominator
//! 3. **animated**: [`Bar`], paced, pausable, cancellable, with telemetry
//!
//! and then checks the animated result against a stable sort of the source.

use crate::counters::{OpCounters, OpSnapshot};
use crate::error::{HarnessError, SortError, SortResult, Violation};
use crate::proxy::{Bar, Counted, Element};
use crate::registry::{SortCatalog, SortDescriptor};
use crate::sorts::SortEnv;
use crate::stage::canvas::{MATCH_COLOR, MISMATCH_COLOR};
use crate::stage::{Canvas, Geometry, Pacer, PauseControl, SharedCanvas, Speed, Stage, Wiring};
use crate::telemetry::{ProgressEstimator, StatusSink};
use crate::utils::bench::{ascending, shuffle, time_seed};
use crate::utils::timer::{time_baseline, TimingConfig};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

// ============================================================================
// Configuration
// ============================================================================

#[derive(Clone, Debug)]
pub struct HarnessConfig {
    /// Animate the shuffle before the animated pass (default: false)
    pub show_shuffle: bool,
    /// Initial animation speed (default: 1 op / 2 ms)
    pub speed: Speed,
    /// Polling interval while paused (default: 10 ms)
    pub poll_interval: Duration,
    /// Publish telemetry every `gap × active threads` operations (default: 10)
    pub telemetry_gap: u64,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Poll intervals to hold before and after an animated shuffle (default: 100)
    pub shuffle_hold_polls: u32,
    /// Fixed shuffle seed; a time-based seed is drawn per run when `None`
    pub seed: Option<u64>,
    pub timing: TimingConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            show_shuffle: false,
            speed: Speed::default(),
            poll_interval: Duration::from_millis(10),
            telemetry_gap: 10,
            canvas_width: 1280,
            canvas_height: 720,
            shuffle_hold_polls: 100,
            seed: None,
            timing: TimingConfig::default(),
        }
    }
}

// ============================================================================
// Report
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    Baseline,
    Counting,
    Animated,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pass::Baseline => "baseline",
            Pass::Counting => "counting",
            Pass::Animated => "animated",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The size failed one or more constraints; no pass ran.
    Rejected(Vec<Violation>),
    /// A domain error aborted the run.
    Failed { pass: Pass, error: SortError },
    /// The animated pass was cancelled; there is no correctness result.
    Cancelled,
    Verified { correct: bool, mismatches: usize },
}

#[derive(Clone, Debug)]
pub struct SortReport {
    pub name: &'static str,
    pub size: usize,
    pub seed: Option<u64>,
    pub baseline: Option<Duration>,
    pub counted: Option<OpSnapshot>,
    pub animated: Option<OpSnapshot>,
    /// Animated wall-clock time with pauses subtracted.
    pub animated_elapsed: Option<Duration>,
    /// Final animated order; empty unless the run was verified.
    pub final_values: Vec<i32>,
    pub outcome: Outcome,
}

impl SortReport {
    fn new(name: &'static str, size: usize) -> Self {
        Self {
            name,
            size,
            seed: None,
            baseline: None,
            counted: None,
            animated: None,
            animated_elapsed: None,
            final_values: Vec::new(),
            outcome: Outcome::Cancelled,
        }
    }

    pub fn size_accepted(&self) -> bool {
        !matches!(self.outcome, Outcome::Rejected(_))
    }

    /// `Some(correct)` when the run got as far as the check pass.
    pub fn is_correct(&self) -> Option<bool> {
        match self.outcome {
            Outcome::Verified { correct, .. } => Some(correct),
            _ => None,
        }
    }
}

struct PassFailure {
    pass: Pass,
    error: SortError,
}

trait InPass<T> {
    fn in_pass(self, pass: Pass) -> Result<T, PassFailure>;
}

impl<T> InPass<T> for SortResult<T> {
    fn in_pass(self, pass: Pass) -> Result<T, PassFailure> {
        self.map_err(|error| PassFailure { pass, error })
    }
}

/// Source data generator: `size -> values`.
pub type Generator = Box<dyn Fn(usize) -> Vec<i32> + Send + Sync>;

// ============================================================================
// Visualizer
// ============================================================================

pub struct Visualizer {
    catalog: SortCatalog,
    config: HarnessConfig,
    generator: Generator,
    canvas: Arc<SharedCanvas>,
    control: Arc<PauseControl>,
    pacer: Arc<Pacer>,
    counters: Arc<OpCounters>,
    sink: Arc<dyn StatusSink>,
}

impl Visualizer {
    pub fn new<C: Canvas + 'static>(
        catalog: SortCatalog,
        config: HarnessConfig,
        canvas: C,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            catalog,
            control: Arc::new(PauseControl::new(config.poll_interval)),
            pacer: Arc::new(Pacer::new(config.speed)),
            config,
            generator: Box::new(ascending),
            canvas: Arc::new(SharedCanvas::new(canvas)),
            counters: Arc::new(OpCounters::new()),
            sink,
        }
    }

    /// Pause/exit flags, to be toggled from the UI thread.
    pub fn controls(&self) -> Arc<PauseControl> {
        Arc::clone(&self.control)
    }

    /// Speed control, adjustable while a pass runs.
    pub fn pacer(&self) -> Arc<Pacer> {
        Arc::clone(&self.pacer)
    }

    pub fn set_generator(&mut self, generator: impl Fn(usize) -> Vec<i32> + Send + Sync + 'static) {
        self.generator = Box::new(generator);
    }

    pub fn catalog(&self) -> &SortCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut SortCatalog {
        &mut self.catalog
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Runs one sample; returns whether the size satisfied every constraint.
    pub fn run_sort(&self, index: usize, size: usize) -> Result<bool, HarnessError> {
        Ok(self.run(index, size)?.size_accepted())
    }

    /// Runs one sample and returns everything it measured.
    pub fn run(&self, index: usize, size: usize) -> Result<SortReport, HarnessError> {
        let sort = self.catalog.get(index)?;
        let mut report = SortReport::new(sort.name(), size);

        let violations = sort.check_size(size);
        if !violations.is_empty() {
            let messages: Vec<String> = violations.iter().map(ToString::to_string).collect();
            warn!(sort = sort.name(), size, "rejected: {}", messages.join("; "));
            self.sink.alert(&messages);
            report.outcome = Outcome::Rejected(violations);
            return Ok(report);
        }

        let source = (self.generator)(size);
        let seed = self.config.seed.unwrap_or_else(time_seed);
        report.seed = Some(seed);
        info!(sort = sort.name(), size = source.len(), seed, "starting sample");

        report.outcome = match self.execute(sort, &source, &SortEnv::new(seed), &mut report) {
            Ok(outcome) => outcome,
            Err(failure) if failure.error.is_cancellation() => {
                info!(sort = sort.name(), "sort ended prematurely");
                Outcome::Cancelled
            }
            Err(PassFailure { pass, error }) => {
                warn!(sort = sort.name(), %pass, "pass failed: {}", error);
                self.sink
                    .alert(&[format!("{} failed during the {} pass: {}", sort.name(), pass, error)]);
                Outcome::Failed { pass, error }
            }
        };
        Ok(report)
    }

    fn execute(
        &self,
        sort: &SortDescriptor,
        source: &[i32],
        env: &SortEnv,
        report: &mut SortReport,
    ) -> Result<Outcome, PassFailure> {
        let mut shuffled = source.to_vec();
        shuffle(&mut shuffled, env.seed).in_pass(Pass::Baseline)?;
        let baseline = time_baseline(&shuffled, &self.config.timing, |data| {
            sort.run_plain(data, env)
        })
        .in_pass(Pass::Baseline)?;
        report.baseline = Some(baseline);
        debug!(sort = sort.name(), micros = baseline.as_micros() as u64, "baseline pass done");

        let mut counted = Counted::live_from(source, &self.counters);
        shuffle(&mut counted, env.seed).in_pass(Pass::Counting)?;
        self.counters.reset();
        sort.run_counted(&mut counted, env).in_pass(Pass::Counting)?;
        let total = self.counters.snapshot();
        report.counted = Some(total);
        debug!(sort = sort.name(), steps = total.steps, "counting pass done");

        let (min, max) = bounds(source);
        let geometry = Geometry::new(
            self.config.canvas_width,
            self.config.canvas_height,
            source.len(),
            min,
            max,
        );
        let stage = Stage::new(self.wiring(), geometry);
        self.control.begin_pass(sort.is_multi_threaded());
        let animated = self.animate(sort, source, env, &stage, baseline, total.steps, report);
        stage.settle();
        self.control.end_pass();
        let bars = animated.in_pass(Pass::Animated)?;

        if self.control.exit_requested() {
            // multi-threaded passes ignore the request; their result is dropped here
            return Err(PassFailure {
                pass: Pass::Animated,
                error: SortError::Cancelled,
            });
        }

        Ok(self.check(&bars, source, report))
    }

    #[allow(clippy::too_many_arguments)]
    fn animate(
        &self,
        sort: &SortDescriptor,
        source: &[i32],
        env: &SortEnv,
        stage: &Arc<Stage>,
        baseline: Duration,
        counted_steps: u64,
        report: &mut SortReport,
    ) -> SortResult<Vec<Bar>> {
        let mut bars = if self.config.show_shuffle {
            let mut bars = Bar::layout(source, stage);
            Bar::render(&bars, stage);
            self.control.hold(self.config.shuffle_hold_polls)?;
            shuffle(&mut bars, env.seed)?;
            stage.settle();
            self.control.hold(self.config.shuffle_hold_polls)?;
            bars
        } else {
            let mut order = source.to_vec();
            shuffle(&mut order, env.seed)?;
            let bars = Bar::layout(&order, stage);
            Bar::render(&bars, stage);
            bars
        };

        self.counters.reset();
        let estimator = Arc::new(ProgressEstimator::new(
            baseline,
            counted_steps,
            sort.is_nondeterministic(),
            self.config.telemetry_gap,
            Arc::clone(&self.control),
            Arc::clone(&self.counters),
            Arc::clone(&self.sink),
        ));
        let ticker = Arc::clone(&estimator);
        stage.set_telemetry(Some(Arc::new(move || ticker.tick())));
        info!(sort = sort.name(), "animated pass started");

        let result = sort.run_animated(&mut bars, env);

        stage.set_telemetry(None);
        stage.settle();
        let last = estimator.finish();
        report.animated = Some(last.counters);
        report.animated_elapsed = Some(last.elapsed);
        result.map(|()| bars)
    }

    /// Recolours every slot green or red against a stable sort of the source.
    fn check(&self, bars: &[Bar], source: &[i32], report: &mut SortReport) -> Outcome {
        let mut reference = source.to_vec();
        reference.sort();
        let mut mismatches = 0;
        let mut drawing = true;
        for (bar, &expected) in bars.iter().zip(&reference) {
            let matched = bar.peek() == expected;
            if !matched {
                mismatches += 1;
            }
            if drawing {
                let color = if matched { MATCH_COLOR } else { MISMATCH_COLOR };
                // an exit request only stops the recolouring
                drawing = bar.show_verdict(color).is_ok();
            }
        }
        report.final_values = bars.iter().map(Element::peek).collect();
        let correct = mismatches == 0 && bars.len() == reference.len();
        info!(sort = report.name, correct, mismatches, "check pass done");
        Outcome::Verified {
            correct,
            mismatches,
        }
    }

    fn wiring(&self) -> Wiring {
        Wiring {
            canvas: Arc::clone(&self.canvas),
            control: Arc::clone(&self.control),
            pacer: Arc::clone(&self.pacer),
            counters: Arc::clone(&self.counters),
        }
    }
}

fn bounds(values: &[i32]) -> (i32, i32) {
    let min = values.iter().copied().min().unwrap_or(0);
    let max = values.iter().copied().max().unwrap_or(0);
    (min, max)
}
