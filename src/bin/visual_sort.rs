//! Command-line front end.
//!
//! Usage:
//!   visual-sort list                       # List the catalog
//!   visual-sort run quick --size 512       # Run one session
//!   visual-sort run 3 --size 64 --speed 4  # By index, four times faster
//!
//! While a session runs, type `p` + Enter to pause/resume, `q` to exit,
//! `+`/`-` to double/halve the speed.

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use tracing_subscriber::EnvFilter;
use visual_sort::controller::{HarnessConfig, Outcome, Visualizer};
use visual_sort::registry::build_catalog;
use visual_sort::stage::{MemoryCanvas, NullCanvas, PauseControl, Pacer, Speed};
use visual_sort::telemetry::{StatusSink, Telemetry};
use visual_sort::tui;

#[derive(Parser)]
#[command(name = "visual-sort", about = "Instrumented sorting algorithm harness", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every sort with its index and limits
    List,
    /// Run one sort through the baseline, counting and animated passes
    Run {
        /// Sort name or catalog index
        sort: String,
        /// Number of elements
        #[arg(long, short)]
        size: usize,
        /// Speed multiplier; 1.0 is 500 operations per second, 0 disables pacing
        #[arg(long, default_value_t = 1.0)]
        speed: f64,
        /// Shuffle seed (default: time-based)
        #[arg(long)]
        seed: Option<u64>,
        /// Animate the shuffle before sorting
        #[arg(long)]
        show_shuffle: bool,
        #[arg(long, default_value_t = 1280)]
        width: u32,
        #[arg(long, default_value_t = 720)]
        height: u32,
        /// Repeat the baseline pass and report the median
        #[arg(long, default_value_t = 1)]
        baseline_runs: usize,
        /// Discard drawing instead of keeping an in-memory frame
        #[arg(long)]
        headless: bool,
    },
}

/// Streams telemetry on one stderr line.
struct ConsoleSink;

impl StatusSink for ConsoleSink {
    fn telemetry(&self, telemetry: &Telemetry) {
        let mut err = io::stderr().lock();
        let _ = write!(err, "\r\x1b[2K{}", telemetry);
        let _ = err.flush();
    }

    fn alert(&self, messages: &[String]) {
        for message in messages {
            eprintln!("\r\x1b[2K{}", message);
        }
    }
}

fn speed_of(multiplier: f64) -> Speed {
    if multiplier <= 0.0 {
        Speed::UNPACED
    } else {
        Speed::from_multiplier(multiplier)
    }
}

/// Reads single-letter commands from stdin until it closes.
fn spawn_keyboard(control: Arc<PauseControl>, pacer: Arc<Pacer>, mut multiplier: f64) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match line.trim() {
                "p" => {
                    let paused = control.toggle_pause();
                    eprintln!("\r\x1b[2K{}", if paused { "paused" } else { "resumed" });
                }
                "q" => {
                    if !control.request_exit() {
                        eprintln!("\r\x1b[2Kmulti-threaded sort: result will be discarded");
                    }
                }
                "+" | "-" if multiplier > 0.0 => {
                    multiplier *= if line.trim() == "+" { 2.0 } else { 0.5 };
                    pacer.set_speed(speed_of(multiplier));
                }
                _ => {}
            }
        }
    });
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("visual_sort=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let catalog = build_catalog();

    let Commands::Run {
        sort,
        size,
        speed,
        seed,
        show_shuffle,
        width,
        height,
        baseline_runs,
        headless,
    } = cli.command
    else {
        tui::print_catalog(&catalog);
        return ExitCode::SUCCESS;
    };

    let index = match sort.parse::<usize>() {
        Ok(index) => index,
        Err(_) => match catalog.find(&sort) {
            Ok(index) => index,
            Err(e) => {
                eprintln!("{}", e);
                eprintln!("Available: {:?}", catalog.list_names());
                return ExitCode::FAILURE;
            }
        },
    };

    let mut config = HarnessConfig {
        show_shuffle,
        speed: speed_of(speed),
        canvas_width: width,
        canvas_height: height,
        seed,
        ..HarnessConfig::default()
    };
    config.timing.baseline_runs = baseline_runs;

    let sink = Arc::new(ConsoleSink);
    let vis = if headless {
        Visualizer::new(catalog, config, NullCanvas, sink)
    } else {
        Visualizer::new(catalog, config, MemoryCanvas::new(), sink)
    };

    tui::print_header();
    match vis.catalog().get(index) {
        Ok(descriptor) => tui::print_sort_info_box(descriptor),
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    }
    spawn_keyboard(vis.controls(), vis.pacer(), speed);

    let report = match vis.run(index, size) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    eprintln!();
    tui::print_report(&report);

    match report.outcome {
        Outcome::Verified { correct: true, .. } | Outcome::Cancelled => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
