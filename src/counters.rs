//! Operation counters shared by every thread of one pass.
//!
//! Counters only ever grow during a pass; [`OpCounters::reset`] is called by
//! the controller at the start of the counting and animated passes.

use std::sync::atomic::{AtomicU64, Ordering};

/// Classification of one logical operation on live operands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Compare a live element against a transient or a plain integer.
    CompareOne,
    /// Compare two live elements.
    CompareTwo,
    /// Read one live element into an integer or a temporary.
    LoadOne,
    /// Read two live elements into an integer result.
    LoadTwo,
    /// Write an integer or a temporary into one live element.
    StoreOne,
    /// Copy one live element into another.
    CopyTwo,
    /// Exchange two live elements.
    SwapTwo,
}

impl Access {
    /// (compares, reads, writes) contributed by this access.
    pub const fn weights(self) -> (u64, u64, u64) {
        match self {
            Access::CompareOne => (1, 1, 0),
            Access::CompareTwo => (1, 2, 0),
            Access::LoadOne => (0, 1, 0),
            Access::LoadTwo => (0, 2, 0),
            Access::StoreOne => (0, 1, 1),
            Access::CopyTwo => (0, 2, 1),
            Access::SwapTwo => (0, 4, 2),
        }
    }
}

#[derive(Debug, Default)]
pub struct OpCounters {
    compares: AtomicU64,
    reads: AtomicU64,
    writes: AtomicU64,
    steps: AtomicU64,
}

/// Point-in-time copy of [`OpCounters`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpSnapshot {
    pub compares: u64,
    pub reads: u64,
    pub writes: u64,
    pub steps: u64,
}

impl OpCounters {
    pub const fn new() -> Self {
        Self {
            compares: AtomicU64::new(0),
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            steps: AtomicU64::new(0),
        }
    }

    pub fn reset(&self) {
        self.compares.store(0, Ordering::Release);
        self.reads.store(0, Ordering::Release);
        self.writes.store(0, Ordering::Release);
        self.steps.store(0, Ordering::Release);
    }

    #[inline]
    pub fn record(&self, access: Access) {
        let (compares, reads, writes) = access.weights();
        if compares != 0 {
            self.compares.fetch_add(compares, Ordering::Relaxed);
        }
        self.reads.fetch_add(reads, Ordering::Relaxed);
        if writes != 0 {
            self.writes.fetch_add(writes, Ordering::Relaxed);
        }
        self.steps.fetch_add(1, Ordering::Relaxed);
    }

    /// Adds steps for work that happens outside element operations.
    pub fn credit_steps(&self, steps: u64) {
        self.steps.fetch_add(steps, Ordering::Relaxed);
    }

    pub fn steps(&self) -> u64 {
        self.steps.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> OpSnapshot {
        OpSnapshot {
            compares: self.compares.load(Ordering::Acquire),
            reads: self.reads.load(Ordering::Acquire),
            writes: self.writes.load(Ordering::Acquire),
            steps: self.steps.load(Ordering::Acquire),
        }
    }
}
