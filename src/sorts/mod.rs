//! # Sorting algorithms
//!
//! Every algorithm is a generic function over [`Element`](crate::proxy::Element)
//! with the signature [`SortFn`](crate::registry::SortFn). Algorithms only
//! touch elements through the trait, so the plain, counting and animated
//! instantiations execute the same operations in the same order.

pub mod distribution;
pub mod exchange;
pub mod insertion;
pub mod merge;
pub mod selection;

#[cfg(test)]
pub mod test;

use std::thread;

/// Builder for the worker thread with the given index.
pub(crate) type Spawner = dyn Fn(usize) -> thread::Builder + Sync;

pub(crate) fn worker_thread(index: usize) -> thread::Builder {
    thread::Builder::new().name(format!("sort-worker-{index}"))
}

/// Per-run inputs besides the data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SortEnv {
    /// Seed for algorithms that make random choices; identical in every pass.
    pub seed: u64,
}

impl SortEnv {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}
