//! # Stage
//!
//! Everything an animated element needs to show one operation: the shared
//! canvas, the pause/cancel protocol, the pacer, the pass counters and the
//! slot geometry.
//!
//! One instrumented operation runs, in this order on the calling thread:
//!
//! 1. enlist the thread in the registry (first draw only)
//! 2. clear the affected column(s), fill the highlight, flush
//! 3. flush the columns touched by the thread's previous operation
//! 4. telemetry hook
//! 5. pause/cancel checkpoint
//! 6. pacing delay
//! 7. refill the column(s) in their resting colour, unflushed
//!
//! The resting colour reaches the screen at step 3 of the next operation, or
//! when the thread leaves the pass, or at [`Stage::settle`].

pub mod canvas;
pub mod control;
pub mod pacing;

pub use canvas::{Canvas, MemoryCanvas, NullCanvas, Region, Rgb, SharedCanvas};
pub use control::PauseControl;
pub use pacing::{Pacer, Speed};

use crate::counters::OpCounters;
use crate::error::SortResult;
use parking_lot::RwLock;
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

/// Hook invoked once per instrumented operation.
pub type TelemetryHook = Arc<dyn Fn() + Send + Sync>;

/// Session-wide collaborators shared by every stage.
#[derive(Clone)]
pub struct Wiring {
    pub canvas: Arc<SharedCanvas>,
    pub control: Arc<PauseControl>,
    pub pacer: Arc<Pacer>,
    pub counters: Arc<OpCounters>,
}

// ============================================================================
// Geometry
// ============================================================================

/// Screen layout of one dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub width: i32,
    pub height: i32,
    /// First row of the bar area; rows above it hold telemetry text.
    pub strip_top: i32,
    pub min: i32,
    pub max: i32,
    slots: usize,
}

impl Geometry {
    /// The width is widened to one pixel per slot when needed.
    pub fn new(width: u32, height: u32, slots: usize, min: i32, max: i32) -> Self {
        let width = (width as usize).max(slots).min(i32::MAX as usize) as i32;
        let height = height.clamp(9, i32::MAX as u32) as i32;
        Self {
            width,
            height,
            strip_top: height * 2 / 9,
            min: min.min(max),
            max: max.max(min),
            slots: slots.max(1),
        }
    }

    /// Horizontal extent of slot `index`.
    pub fn slot(&self, index: usize) -> (i32, i32) {
        let w = self.width as i64;
        let n = self.slots as i64;
        let i = index as i64;
        ((i * w / n) as i32, ((i + 1) * w / n) as i32)
    }

    pub fn top_for(&self, value: i32) -> i32 {
        let span = self.max as i64 - self.min as i64 + 1;
        let value = value.clamp(self.min, self.max) as i64;
        let area = (self.height - self.strip_top) as i64;
        let bar = area * (value - self.min as i64 + 1) / span;
        self.height - bar as i32
    }

    /// Resting colour: grey at the minimum, white at the maximum.
    pub fn color_for(&self, value: i32) -> Rgb {
        let span = self.max as i64 - self.min as i64;
        if span == 0 {
            return Rgb::WHITE;
        }
        let offset = value.clamp(self.min, self.max) as i64 - self.min as i64;
        let base = Rgb::GREY.r as i64;
        let level = base + (Rgb::WHITE.r as i64 - base) * offset / span;
        let c = level as u8;
        Rgb::new(c, c, c)
    }

    /// Whole column of a slot, bar area only.
    pub fn column(&self, left: i32, right: i32) -> Region {
        Region::new(left, self.strip_top, right, self.height)
    }

    pub fn bar(&self, left: i32, right: i32, top: i32) -> Region {
        Region::new(left, top, right, self.height)
    }

    pub fn bounds(&self) -> Region {
        Region::new(0, 0, self.width, self.height)
    }
}

/// One slot to flash and then restore.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mark {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub flash: Rgb,
    pub rest: Rgb,
}

// ============================================================================
// Thread trace
// ============================================================================

/// Registry entry of one thread drawing on one stage.
///
/// Dropped when the thread exits or enlists on another stage; the drop
/// deregisters the thread and presents whatever it last drew.
struct ThreadTrace {
    stage: Weak<Stage>,
    stage_id: u64,
    thread: ThreadId,
    pending: Vec<Region>,
}

impl Drop for ThreadTrace {
    fn drop(&mut self) {
        if let Some(stage) = self.stage.upgrade() {
            stage.wiring.control.deregister(self.thread);
            for region in self.pending.drain(..) {
                stage.wiring.canvas.flush(region);
            }
        }
    }
}

thread_local! {
    static TRACE: RefCell<Option<ThreadTrace>> = const { RefCell::new(None) };
}

static NEXT_STAGE: AtomicU64 = AtomicU64::new(1);

// ============================================================================
// Stage
// ============================================================================

pub struct Stage {
    id: u64,
    me: Weak<Stage>,
    wiring: Wiring,
    geometry: Geometry,
    telemetry: RwLock<Option<TelemetryHook>>,
}

impl Stage {
    pub fn new(wiring: Wiring, geometry: Geometry) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            id: NEXT_STAGE.fetch_add(1, Ordering::Relaxed),
            me: me.clone(),
            wiring,
            geometry,
            telemetry: RwLock::new(None),
        })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn counters(&self) -> &Arc<OpCounters> {
        &self.wiring.counters
    }

    pub fn control(&self) -> &Arc<PauseControl> {
        &self.wiring.control
    }

    pub fn set_telemetry(&self, hook: Option<TelemetryHook>) {
        *self.telemetry.write() = hook;
    }

    /// Registers the calling thread and takes the regions it left unflushed.
    fn enlist(&self) -> Vec<Region> {
        let fresh = TRACE.with(|slot| {
            let mut slot = slot.borrow_mut();
            match slot.as_mut() {
                Some(trace) if trace.stage_id == self.id => {
                    return Some(std::mem::take(&mut trace.pending));
                }
                _ => {}
            }
            let thread = thread::current().id();
            // replacing an old trace deregisters it from its own stage
            *slot = Some(ThreadTrace {
                stage: self.me.clone(),
                stage_id: self.id,
                thread,
                pending: Vec::new(),
            });
            self.wiring.control.register(thread);
            None
        });
        fresh.unwrap_or_default()
    }

    fn remember(&self, regions: Vec<Region>) {
        TRACE.with(|slot| {
            if let Some(trace) = slot.borrow_mut().as_mut() {
                if trace.stage_id == self.id {
                    trace.pending = regions;
                }
            }
        });
    }

    /// Shows one instrumented operation touching one or two slots.
    pub fn draw(&self, marks: &[Mark]) -> SortResult<()> {
        let previous = self.enlist();
        let canvas = &self.wiring.canvas;
        let geometry = &self.geometry;

        canvas.batch(|c| {
            for mark in marks {
                let column = geometry.column(mark.left, mark.right);
                c.clear(column);
                c.fill(geometry.bar(mark.left, mark.right, mark.top), mark.flash);
                c.flush(column);
            }
            for region in &previous {
                c.flush(*region);
            }
        });

        let hook = self.telemetry.read().clone();
        if let Some(hook) = hook {
            hook();
        }

        let gate = self.wiring.control.checkpoint();
        if gate.is_ok() {
            self.wiring.pacer.pace();
        }

        let touched = canvas.batch(|c| {
            marks
                .iter()
                .map(|mark| {
                    let column = geometry.column(mark.left, mark.right);
                    c.clear(column);
                    c.fill(geometry.bar(mark.left, mark.right, mark.top), mark.rest);
                    column
                })
                .collect::<Vec<_>>()
        });
        self.remember(touched);
        gate
    }

    /// Paints every slot in its resting colour and presents the whole area.
    pub fn render_all(&self, slots: &[(i32, i32, i32, Rgb)]) {
        let geometry = &self.geometry;
        self.wiring.canvas.batch(|c| {
            c.clear(geometry.column(0, geometry.width));
            for &(left, right, top, color) in slots {
                c.fill(geometry.bar(left, right, top), color);
            }
            c.flush(geometry.bounds());
        });
    }

    /// Recolours one slot during the check pass.
    pub fn draw_verdict(&self, left: i32, right: i32, top: i32, color: Rgb) -> SortResult<()> {
        let geometry = &self.geometry;
        self.wiring.canvas.batch(|c| {
            let column = geometry.column(left, right);
            c.clear(column);
            c.fill(geometry.bar(left, right, top), color);
            c.flush(column);
        });
        self.wiring.control.checkpoint()?;
        self.wiring.pacer.pace();
        Ok(())
    }

    /// Presents everything still pending in the back buffer.
    pub fn settle(&self) {
        TRACE.with(|slot| {
            if let Some(trace) = slot.borrow_mut().as_mut() {
                if trace.stage_id == self.id {
                    trace.pending.clear();
                }
            }
        });
        self.wiring.canvas.flush(self.geometry.bounds());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SortError;
    use std::time::Duration;

    fn wiring(memory: &Arc<MemoryCanvas>) -> Wiring {
        Wiring {
            canvas: Arc::new(SharedCanvas::new(Arc::clone(memory))),
            control: Arc::new(PauseControl::new(Duration::from_millis(1))),
            pacer: Arc::new(Pacer::new(Speed::UNPACED)),
            counters: Arc::new(OpCounters::new()),
        }
    }

    fn mark(geometry: &Geometry, index: usize, value: i32, flash: Rgb) -> Mark {
        let (left, right) = geometry.slot(index);
        Mark {
            left,
            right,
            top: geometry.top_for(value),
            flash,
            rest: geometry.color_for(value),
        }
    }

    #[test]
    fn test_geometry() {
        let g = Geometry::new(100, 90, 4, 1, 4);
        assert_eq!(g.strip_top, 20);
        assert_eq!(g.slot(0), (0, 25));
        assert_eq!(g.slot(3), (75, 100));
        assert_eq!(g.top_for(4), 20);
        assert_eq!(g.top_for(1), 90 - 70 / 4);
        assert_eq!(g.color_for(1), Rgb::GREY);
        assert_eq!(g.color_for(4), Rgb::WHITE);
        let narrow = Geometry::new(10, 90, 40, 1, 40);
        assert_eq!(narrow.width, 40);
        assert!(narrow.slot(39).0 < narrow.slot(39).1);
    }

    #[test]
    fn test_highlight_then_deferred_rest() {
        let memory = Arc::new(MemoryCanvas::new());
        let stage = Stage::new(wiring(&memory), Geometry::new(40, 90, 4, 1, 4));
        let g = *stage.geometry();
        stage.draw(&[mark(&g, 1, 3, Rgb::RED)]).unwrap();
        assert_eq!(memory.shown(10), Some(Rgb::RED));
        stage.draw(&[mark(&g, 2, 2, Rgb::LIGHT_BLUE)]).unwrap();
        assert_eq!(memory.shown(10), Some(g.color_for(3)));
        assert_eq!(memory.shown(20), Some(Rgb::LIGHT_BLUE));
        stage.settle();
        assert_eq!(memory.shown(20), Some(g.color_for(2)));
    }

    #[test]
    fn test_worker_exit_deregisters_and_flushes() {
        let memory = Arc::new(MemoryCanvas::new());
        let w = wiring(&memory);
        w.control.begin_pass(true);
        let stage = Stage::new(w.clone(), Geometry::new(40, 90, 4, 1, 4));
        let g = *stage.geometry();
        let s = Arc::clone(&stage);
        thread::spawn(move || s.draw(&[mark(&g, 0, 1, Rgb::RED)]))
            .join()
            .unwrap()
            .unwrap();
        assert_eq!(memory.shown(0), Some(g.color_for(1)));
        assert_eq!(w.control.active_threads(), 1);
    }

    #[test]
    fn test_cancelled_draw_leaves_no_highlight() {
        let memory = Arc::new(MemoryCanvas::new());
        let w = wiring(&memory);
        w.control.begin_pass(false);
        let stage = Stage::new(w.clone(), Geometry::new(40, 90, 4, 1, 4));
        let g = *stage.geometry();
        w.control.request_exit();
        assert_eq!(
            stage.draw(&[mark(&g, 3, 4, Rgb::RED)]),
            Err(SortError::Cancelled)
        );
        stage.settle();
        assert_eq!(memory.shown(30), Some(Rgb::WHITE));
    }
}
