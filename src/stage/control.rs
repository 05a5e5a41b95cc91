//! Cooperative pause/cancel protocol and the per-pass thread registry.
//!
//! The two flags are toggled by the user from any thread. Threads running
//! the animated pass poll them at instrumented operations via
//! [`PauseControl::checkpoint`]. Only the designated main thread measures
//! paused time and only it raises [`SortError::Cancelled`], and never while
//! a multi-threaded algorithm is running.

use crate::error::{SortError, SortResult};
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

/// Default polling interval while paused.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug)]
pub struct PauseControl {
    stopped: AtomicBool,
    exit: AtomicBool,
    multi_threaded: AtomicBool,
    poll: Duration,
    /// Thread driving the current pass; read on every checkpoint.
    main: RwLock<Option<ThreadId>>,
    threads: Mutex<HashSet<ThreadId>>,
    /// Mirror of `threads.len()` for the telemetry hot path.
    active: AtomicUsize,
    paused: Mutex<Duration>,
}

impl PauseControl {
    pub fn new(poll: Duration) -> Self {
        Self {
            stopped: AtomicBool::new(false),
            exit: AtomicBool::new(false),
            multi_threaded: AtomicBool::new(false),
            poll,
            main: RwLock::new(None),
            threads: Mutex::new(HashSet::new()),
            active: AtomicUsize::new(0),
            paused: Mutex::new(Duration::ZERO),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll
    }

    /// Resets the protocol for a new animated pass driven by the calling thread.
    pub fn begin_pass(&self, multi_threaded: bool) {
        self.stopped.store(false, Ordering::Release);
        self.exit.store(false, Ordering::Release);
        self.multi_threaded.store(multi_threaded, Ordering::Release);
        let me = thread::current().id();
        *self.main.write() = Some(me);
        self.keep_only(Some(me));
        *self.paused.lock() = Duration::ZERO;
    }

    /// Forgets every thread except the main one once the pass has returned.
    pub fn end_pass(&self) {
        let main = *self.main.read();
        self.keep_only(main);
    }

    fn keep_only(&self, main: Option<ThreadId>) {
        let mut threads = self.threads.lock();
        threads.retain(|id| Some(*id) == main);
        self.active.store(threads.len(), Ordering::Release);
    }

    pub fn pause(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn resume(&self) {
        self.stopped.store(false, Ordering::Release);
    }

    /// Flips the pause flag and returns the new state.
    pub fn toggle_pause(&self) -> bool {
        !self.stopped.fetch_xor(true, Ordering::AcqRel)
    }

    pub fn is_paused(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Requests cancellation.
    ///
    /// Returns whether the request will stop the pass at its next
    /// instrumented operation; a multi-threaded pass keeps running to
    /// completion and its result is discarded instead.
    pub fn request_exit(&self) -> bool {
        self.exit.store(true, Ordering::Release);
        self.can_cancel()
    }

    pub fn exit_requested(&self) -> bool {
        self.exit.load(Ordering::Acquire)
    }

    pub fn is_multi_threaded(&self) -> bool {
        self.multi_threaded.load(Ordering::Acquire)
    }

    /// Whether an "abort" control should be offered for the running pass.
    pub fn can_cancel(&self) -> bool {
        !self.is_multi_threaded()
    }

    fn cancel_pending(&self) -> bool {
        self.exit_requested() && !self.is_multi_threaded()
    }

    fn is_main(&self, id: ThreadId) -> bool {
        *self.main.read() == Some(id)
    }

    /// Blocks while paused; on the main thread, raises a pending cancellation.
    pub fn checkpoint(&self) -> SortResult<()> {
        if !self.is_main(thread::current().id()) {
            while self.is_paused() {
                thread::sleep(self.poll);
            }
            return Ok(());
        }

        let began = Instant::now();
        let mut waited = false;
        let result = loop {
            if !self.is_paused() {
                break Ok(());
            }
            if self.cancel_pending() {
                break Err(SortError::Cancelled);
            }
            thread::sleep(self.poll);
            waited = true;
        };
        if waited {
            *self.paused.lock() += began.elapsed();
        }
        result?;
        if self.cancel_pending() {
            return Err(SortError::Cancelled);
        }
        Ok(())
    }

    /// Waits `polls` poll intervals, honouring pause and cancel throughout.
    pub fn hold(&self, polls: u32) -> SortResult<()> {
        for _ in 0..polls {
            loop {
                if self.cancel_pending() {
                    return Err(SortError::Cancelled);
                }
                thread::sleep(self.poll);
                if !self.is_paused() {
                    break;
                }
            }
        }
        Ok(())
    }

    pub fn register(&self, id: ThreadId) {
        let mut threads = self.threads.lock();
        threads.insert(id);
        self.active.store(threads.len(), Ordering::Release);
    }

    pub fn deregister(&self, id: ThreadId) {
        let mut threads = self.threads.lock();
        threads.remove(&id);
        self.active.store(threads.len(), Ordering::Release);
    }

    /// Number of registered threads, never less than one. Lock-free.
    pub fn active_threads(&self) -> usize {
        self.active.load(Ordering::Acquire).max(1)
    }

    pub fn is_registered(&self, id: ThreadId) -> bool {
        self.threads.lock().contains(&id)
    }

    /// Total time the main thread spent paused during this pass.
    pub fn paused_total(&self) -> Duration {
        *self.paused.lock()
    }
}

impl Default for PauseControl {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn fast() -> PauseControl {
        PauseControl::new(Duration::from_millis(1))
    }

    #[test]
    fn test_exit_cancels_single_threaded_main() {
        let control = fast();
        control.begin_pass(false);
        assert_eq!(control.checkpoint(), Ok(()));
        assert!(control.request_exit());
        assert_eq!(control.checkpoint(), Err(SortError::Cancelled));
    }

    #[test]
    fn test_exit_ignored_for_multi_threaded() {
        let control = fast();
        control.begin_pass(true);
        assert!(!control.request_exit());
        assert!(control.exit_requested());
        assert_eq!(control.checkpoint(), Ok(()));
    }

    #[test]
    fn test_workers_never_cancel() {
        let control = Arc::new(fast());
        control.begin_pass(false);
        control.request_exit();
        let c = Arc::clone(&control);
        let worker = thread::spawn(move || c.checkpoint());
        assert_eq!(worker.join().unwrap(), Ok(()));
    }

    #[test]
    fn test_pause_is_measured_on_main_only() {
        let control = Arc::new(fast());
        control.begin_pass(false);
        control.pause();
        let c = Arc::clone(&control);
        let resumer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            c.resume();
        });
        assert_eq!(control.checkpoint(), Ok(()));
        resumer.join().unwrap();
        assert!(control.paused_total() >= Duration::from_millis(20));
    }

    #[test]
    fn test_exit_while_paused_unblocks_main() {
        let control = fast();
        control.begin_pass(false);
        control.pause();
        control.request_exit();
        assert_eq!(control.checkpoint(), Err(SortError::Cancelled));
    }

    #[test]
    fn test_toggle_and_registry() {
        let control = fast();
        control.begin_pass(false);
        assert!(control.toggle_pause());
        assert!(!control.toggle_pause());
        let me = thread::current().id();
        let other = thread::spawn(|| thread::current().id()).join().unwrap();
        control.register(me);
        control.register(other);
        assert_eq!(control.active_threads(), 2);
        control.end_pass();
        assert_eq!(control.active_threads(), 1);
        assert!(control.is_registered(me));
        assert!(!control.is_registered(other));
    }

    #[test]
    fn test_main_thread_moves_with_begin_pass() {
        let control = Arc::new(fast());
        control.begin_pass(false);
        control.request_exit();
        assert_eq!(control.checkpoint(), Err(SortError::Cancelled));

        let c = Arc::clone(&control);
        let gate = thread::spawn(move || {
            c.begin_pass(false);
            c.request_exit();
            c.checkpoint()
        })
        .join()
        .unwrap();
        assert_eq!(gate, Err(SortError::Cancelled));
        // the old driver is an ordinary worker now
        assert_eq!(control.checkpoint(), Ok(()));
    }

    #[test]
    fn test_active_count_tracks_registry() {
        let control = fast();
        control.begin_pass(false);
        let me = thread::current().id();
        let other = thread::spawn(|| thread::current().id()).join().unwrap();
        control.register(me);
        control.register(other);
        control.register(other);
        assert_eq!(control.active_threads(), 2);
        control.deregister(other);
        assert_eq!(control.active_threads(), 1);
        control.deregister(me);
        assert_eq!(control.active_threads(), 1);
        assert!(!control.is_registered(me));
    }

    #[test]
    fn test_hold_honours_cancel() {
        let control = fast();
        control.begin_pass(false);
        assert_eq!(control.hold(3), Ok(()));
        control.request_exit();
        assert_eq!(control.hold(3), Err(SortError::Cancelled));
    }
}
