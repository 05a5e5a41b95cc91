//! CPU pinning for the baseline timing pass.
//!
//! Linux pins through `sched_setaffinity`; other platforms fall back to a
//! no-op guard that reports itself as unpinned.

// ============================================================================
// Linux implementation using libc
// ============================================================================

#[cfg(target_os = "linux")]
mod platform {
    use std::cell::RefCell;

    thread_local! {
        static ORIGINAL_AFFINITY: RefCell<Option<libc::cpu_set_t>> = const { RefCell::new(None) };
    }

    pub fn current_cpu() -> Option<usize> {
        // SAFETY: sched_getcpu has no preconditions.
        let cpu = unsafe { libc::sched_getcpu() };
        (cpu >= 0).then_some(cpu as usize)
    }

    pub fn pin(core: usize) -> bool {
        // SAFETY: cpu_set_t is plain data; the pointers refer to live locals.
        unsafe {
            let mut original: libc::cpu_set_t = std::mem::zeroed();
            let size = std::mem::size_of::<libc::cpu_set_t>();
            if libc::sched_getaffinity(0, size, &mut original) != 0 {
                return false;
            }
            let mut set: libc::cpu_set_t = std::mem::zeroed();
            libc::CPU_ZERO(&mut set);
            libc::CPU_SET(core, &mut set);
            if libc::sched_setaffinity(0, size, &set) != 0 {
                return false;
            }
            ORIGINAL_AFFINITY.with(|cell| *cell.borrow_mut() = Some(original));
            true
        }
    }

    pub fn restore() -> bool {
        ORIGINAL_AFFINITY.with(|cell| match cell.borrow_mut().take() {
            // SAFETY: `set` is a mask previously returned by sched_getaffinity.
            Some(set) => unsafe {
                libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set) == 0
            },
            None => false,
        })
    }
}

#[cfg(not(target_os = "linux"))]
mod platform {
    pub fn current_cpu() -> Option<usize> {
        None
    }
    pub fn pin(_core: usize) -> bool {
        false
    }
    pub fn restore() -> bool {
        true
    }
}

/// RAII guard for CPU pinning - pins on creation, unpins on drop.
#[derive(Debug)]
pub struct CpuPinGuard {
    pinned_core: Option<usize>,
}

impl CpuPinGuard {
    /// Pins the calling thread to the core it is running on.
    pub fn new() -> Self {
        let pinned_core = platform::current_cpu().filter(|&core| platform::pin(core));
        Self { pinned_core }
    }

    /// A guard that pins nothing.
    pub fn disabled() -> Self {
        Self { pinned_core: None }
    }

    pub fn core_id(&self) -> Option<usize> {
        self.pinned_core
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned_core.is_some()
    }
}

impl Drop for CpuPinGuard {
    fn drop(&mut self) {
        if self.pinned_core.is_some() {
            platform::restore();
        }
    }
}

impl Default for CpuPinGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_guard() {
        let guard = CpuPinGuard::new();
        if guard.is_pinned() {
            assert!(guard.core_id().is_some());
        }
        drop(guard);
        assert!(!CpuPinGuard::disabled().is_pinned());
    }
}
