//! Error types shared by the proxies, the algorithms and the controller.

use thiserror::Error;

/// Failure raised inside a single pass.
///
/// Every variant except [`SortError::Cancelled`] is a domain error that is
/// reported to the user. `Cancelled` is the silent "no result" signal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    #[error("sort ended prematurely")]
    Cancelled,
    #[error("division by zero")]
    DivideByZero,
    #[error("arithmetic overflow")]
    Overflow,
    #[error("{algorithm}: value range {min}..={max} is too wide (limit {limit})")]
    RangeTooWide {
        algorithm: &'static str,
        min: i32,
        max: i32,
        limit: i64,
    },
    #[error("{algorithm} gave up after {attempts} attempts")]
    RetryBudgetExhausted {
        algorithm: &'static str,
        attempts: u64,
    },
    #[error("{algorithm} cannot start {requested} workers (limit {limit})")]
    TooManyWorkers {
        algorithm: &'static str,
        requested: usize,
        limit: usize,
    },
    #[error("{algorithm}: a worker thread could not be joined")]
    WorkerLost { algorithm: &'static str },
    #[error("{algorithm} requires {requirement}, got {size} elements")]
    UnsupportedSize {
        algorithm: &'static str,
        requirement: &'static str,
        size: usize,
    },
}

impl SortError {
    /// True for the cooperative-cancellation signal.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, SortError::Cancelled)
    }
}

pub type SortResult<T> = Result<T, SortError>;

/// A sample size rejected before any pass runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("sample size must be at least 1")]
    Empty,
    #[error("sample size {size} exceeds the maximum of {max}")]
    TooLarge { size: usize, max: usize },
    #[error("{0}")]
    Requirement(String),
}

/// Programmer errors at the orchestration boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarnessError {
    #[error("no sort at catalog index {index} (catalog holds {len})")]
    UnknownSort { index: usize, len: usize },
    #[error("no sort named `{0}`")]
    UnknownName(String),
}
