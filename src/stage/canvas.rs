//! Drawing backend seam.
//!
//! The backend is not reentrant-safe, so every primitive goes through
//! [`SharedCanvas`], which serializes them behind one recursive lock. A
//! batch holds the lock across several primitives that also lock
//! individually.

use parking_lot::{Mutex, ReentrantMutex};
use std::collections::BTreeMap;

/// 8-bit RGB colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const GREY: Rgb = Rgb::new(0x88, 0x88, 0x88);
    pub const LIGHT_BLUE: Rgb = Rgb::new(0x55, 0x55, 0xFF);
    pub const RED: Rgb = Rgb::new(0xAA, 0x00, 0x00);
    pub const GREEN: Rgb = Rgb::new(0x00, 0xAA, 0x00);
}

/// Highlight for reads and comparisons.
pub const READ_COLOR: Rgb = Rgb::LIGHT_BLUE;
/// Highlight for writes.
pub const WRITE_COLOR: Rgb = Rgb::RED;
pub const MATCH_COLOR: Rgb = Rgb::GREEN;
pub const MISMATCH_COLOR: Rgb = Rgb::RED;

/// Axis-aligned screen rectangle, right and bottom exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Region {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// Primitive drawing operations supplied by the rendering layer.
pub trait Canvas: Send + Sync {
    /// Paints one filled region into the back buffer.
    fn fill(&self, region: Region, color: Rgb);

    /// Erases a region of the back buffer.
    fn clear(&self, region: Region);

    /// Presents a region of the back buffer.
    fn flush(&self, region: Region);
}

/// Serializes all access to a [`Canvas`].
pub struct SharedCanvas {
    inner: Box<dyn Canvas>,
    lock: ReentrantMutex<()>,
}

impl SharedCanvas {
    pub fn new<C: Canvas + 'static>(canvas: C) -> Self {
        Self {
            inner: Box::new(canvas),
            lock: ReentrantMutex::new(()),
        }
    }

    pub fn fill(&self, region: Region, color: Rgb) {
        let _guard = self.lock.lock();
        self.inner.fill(region, color);
    }

    pub fn clear(&self, region: Region) {
        let _guard = self.lock.lock();
        self.inner.clear(region);
    }

    pub fn flush(&self, region: Region) {
        let _guard = self.lock.lock();
        self.inner.flush(region);
    }

    /// Runs `f` with the backend held, so its primitives land atomically.
    pub fn batch<R>(&self, f: impl FnOnce(&Self) -> R) -> R {
        let _guard = self.lock.lock();
        f(self)
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullCanvas;

impl Canvas for NullCanvas {
    fn fill(&self, _region: Region, _color: Rgb) {}
    fn clear(&self, _region: Region) {}
    fn flush(&self, _region: Region) {}
}

/// Double-buffered in-memory canvas keyed by slot column.
///
/// Slots never overlap horizontally, so a fill is stored under its left
/// edge. `flush` copies the columns inside the flushed range from the back
/// buffer to the front buffer.
#[derive(Debug, Default)]
pub struct MemoryCanvas {
    state: Mutex<Buffers>,
}

#[derive(Debug, Default)]
struct Buffers {
    back: BTreeMap<i32, (Region, Rgb)>,
    front: BTreeMap<i32, (Region, Rgb)>,
    flushes: u64,
}

impl MemoryCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Presented colour of the slot whose left edge is `left`.
    pub fn shown(&self, left: i32) -> Option<Rgb> {
        self.state.lock().front.get(&left).map(|(_, c)| *c)
    }

    /// Presented region of the slot whose left edge is `left`.
    pub fn shown_region(&self, left: i32) -> Option<Region> {
        self.state.lock().front.get(&left).map(|(r, _)| *r)
    }

    /// Every presented slot, left to right.
    pub fn shown_all(&self) -> Vec<(Region, Rgb)> {
        self.state.lock().front.values().copied().collect()
    }

    pub fn flush_count(&self) -> u64 {
        self.state.lock().flushes
    }
}

impl Canvas for MemoryCanvas {
    fn fill(&self, region: Region, color: Rgb) {
        self.state.lock().back.insert(region.left, (region, color));
    }

    fn clear(&self, region: Region) {
        let mut state = self.state.lock();
        let doomed: Vec<i32> = state
            .back
            .range(region.left..region.right.max(region.left))
            .map(|(k, _)| *k)
            .collect();
        for key in doomed {
            state.back.remove(&key);
        }
    }

    fn flush(&self, region: Region) {
        let mut state = self.state.lock();
        let range = region.left..region.right.max(region.left);
        let stale: Vec<i32> = state.front.range(range.clone()).map(|(k, _)| *k).collect();
        for key in stale {
            state.front.remove(&key);
        }
        let fresh: Vec<(i32, (Region, Rgb))> =
            state.back.range(range).map(|(k, v)| (*k, *v)).collect();
        state.front.extend(fresh);
        state.flushes += 1;
    }
}

impl<C: Canvas + ?Sized> Canvas for std::sync::Arc<C> {
    fn fill(&self, region: Region, color: Rgb) {
        (**self).fill(region, color)
    }

    fn clear(&self, region: Region) {
        (**self).clear(region)
    }

    fn flush(&self, region: Region) {
        (**self).flush(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_memory_canvas_needs_flush() {
        let canvas = MemoryCanvas::new();
        let slot = Region::new(10, 50, 20, 100);
        canvas.fill(slot, Rgb::RED);
        assert_eq!(canvas.shown(10), None);
        canvas.flush(Region::new(10, 0, 20, 100));
        assert_eq!(canvas.shown(10), Some(Rgb::RED));
        canvas.clear(slot);
        canvas.flush(slot);
        assert_eq!(canvas.shown(10), None);
    }

    #[test]
    fn test_batch_is_reentrant() {
        let memory = Arc::new(MemoryCanvas::new());
        let shared = SharedCanvas::new(Arc::clone(&memory));
        let slot = Region::new(0, 0, 5, 5);
        shared.batch(|c| {
            c.clear(slot);
            c.fill(slot, Rgb::GREEN);
            c.flush(slot);
        });
        assert_eq!(memory.shown(0), Some(Rgb::GREEN));
        assert_eq!(memory.flush_count(), 1);
    }
}
