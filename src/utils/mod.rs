//! Utility modules for data preparation, baseline timing and CLI output.

pub mod bench;
pub mod cpu_affinity;
pub mod timer;
pub mod tui;

// Re-export commonly used items
pub use bench::{ascending, format_duration, shuffle, shuffle_with_rng, time_seed};
pub use cpu_affinity::CpuPinGuard;
pub use timer::{calculate_median, time_baseline, PinStrategy, TimingConfig};
