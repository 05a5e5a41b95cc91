//! # Visual Sort
//!
//! An instrumented, pausable execution harness for sorting algorithms.
//!
//! Every algorithm is written once, generically over [`proxy::Element`],
//! and instantiated three times: on plain integers for a timing baseline,
//! on counting proxies for an exact operation tally, and on animated bars
//! that draw every access, honour pause/exit requests and pace themselves.

pub mod controller;
pub mod counters;
pub mod error;
pub mod proxy;
pub mod registry;
pub mod sorts;
pub mod stage;
pub mod telemetry;
pub mod utils;

/// Re-export tui from utils
pub use utils::tui;

/// Re-export commonly used items
pub mod prelude {
    pub use crate::controller::{HarnessConfig, Outcome, Pass, SortReport, Visualizer};
    pub use crate::error::{HarnessError, SortError, SortResult, Violation};
    pub use crate::proxy::{Bar, Counted, Element};
    pub use crate::registry::{build_catalog, SortCatalog, SortDescriptor, SizeRequirement};
    pub use crate::stage::{Canvas, MemoryCanvas, NullCanvas, PauseControl, Speed};
    pub use crate::telemetry::{LogSink, StatusSink, Telemetry};
}

#[cfg(test)]
mod tests {
    use crate::registry::build_catalog;

    #[test]
    fn test_all_algorithms_registry_verify() {
        let catalog = build_catalog();
        let sorts = catalog.all();

        println!("Verifying {} sorts...", sorts.len());

        for sort in sorts {
            println!("Verifying sort: {}", sort.name());
            match sort.verify() {
                Ok(_) => println!("  ✅ Sort '{}' passed verification", sort.name()),
                Err(e) => panic!("  ❌ Sort '{}' failed verification: {}", sort.name(), e),
            }
        }
    }
}
