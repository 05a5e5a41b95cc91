//! Animated instantiation.
//!
//! A live `Bar` owns a fixed slot on a [`Stage`]. Its value decides the bar
//! height and resting colour; both are refreshed whenever the value changes.
//! Every operation records the same [`Access`] as [`Counted`](super::Counted)
//! and then flashes the live operand(s) through [`Stage::draw`].

use super::{Arith, Element, ProxyKind};
use crate::counters::Access;
use crate::error::SortResult;
use crate::stage::canvas::{READ_COLOR, WRITE_COLOR};
use crate::stage::{Mark, Rgb, Stage};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

pub struct Bar {
    value: i32,
    left: i32,
    right: i32,
    top: i32,
    color: Rgb,
    stage: Option<Arc<Stage>>,
}

impl Bar {
    /// Builds the live array for an animated pass, one slot per value.
    pub fn layout(values: &[i32], stage: &Arc<Stage>) -> Vec<Self> {
        let geometry = stage.geometry();
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let (left, right) = geometry.slot(i);
                Self {
                    value,
                    left,
                    right,
                    top: geometry.top_for(value),
                    color: geometry.color_for(value),
                    stage: Some(Arc::clone(stage)),
                }
            })
            .collect()
    }

    /// Paints a whole array in its resting colours.
    pub fn render(bars: &[Bar], stage: &Stage) {
        let slots: Vec<_> = bars
            .iter()
            .map(|b| (b.left, b.right, b.top, b.color))
            .collect();
        stage.render_all(&slots);
    }

    pub fn slot(&self) -> (i32, i32) {
        (self.left, self.right)
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Recolours the slot for the check pass.
    pub fn show_verdict(&self, color: Rgb) -> SortResult<()> {
        match &self.stage {
            Some(stage) => stage.draw_verdict(self.left, self.right, self.top, color),
            None => Ok(()),
        }
    }

    fn refresh(&mut self) {
        if let Some(stage) = &self.stage {
            let geometry = stage.geometry();
            self.top = geometry.top_for(self.value);
            self.color = geometry.color_for(self.value);
        }
    }

    fn mark(&self, flash: Rgb) -> Mark {
        Mark {
            left: self.left,
            right: self.right,
            top: self.top,
            flash,
            rest: self.color,
        }
    }

    fn show(&self, access: Access, flash: Rgb) -> SortResult<()> {
        match &self.stage {
            Some(stage) => {
                stage.counters().record(access);
                stage.draw(&[self.mark(flash)])
            }
            None => Ok(()),
        }
    }

    /// Two-operand event; both slots flash and restore together.
    fn show_pair(&self, other: &Self, access: Access, mine: Rgb, theirs: Rgb) -> SortResult<()> {
        match &self.stage {
            Some(stage) => {
                stage.counters().record(access);
                stage.draw(&[self.mark(mine), other.mark(theirs)])
            }
            None => Ok(()),
        }
    }

    /// Read-shaped event: every live operand flashes the read colour.
    fn show_reads(&self, other: &Self, single: Access, double: Access) -> SortResult<()> {
        match (self.is_live(), other.is_live()) {
            (true, true) => self.show_pair(other, double, READ_COLOR, READ_COLOR),
            (true, false) => self.show(single, READ_COLOR),
            (false, true) => other.show(single, READ_COLOR),
            (false, false) => Ok(()),
        }
    }

    /// Assignment-shaped event: `self` was just written from `other`.
    fn show_write_from(&self, other: &Self) -> SortResult<()> {
        match (self.is_live(), other.is_live()) {
            (true, true) => self.show_pair(other, Access::CopyTwo, WRITE_COLOR, READ_COLOR),
            (true, false) => self.show(Access::StoreOne, WRITE_COLOR),
            (false, true) => other.show(Access::LoadOne, READ_COLOR),
            (false, false) => Ok(()),
        }
    }
}

impl Clone for Bar {
    /// Language-level copy: the result has no slot and never draws.
    fn clone(&self) -> Self {
        Self::transient(self.value)
    }
}

impl fmt::Debug for Bar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bar")
            .field("value", &self.value)
            .field("slot", &(self.left, self.right))
            .field("top", &self.top)
            .field("live", &self.stage.is_some())
            .finish()
    }
}

impl Element for Bar {
    const KIND: ProxyKind = ProxyKind::Animated;

    fn transient(value: i32) -> Self {
        Self {
            value,
            left: -1,
            right: -1,
            top: 0,
            color: Rgb::BLACK,
            stage: None,
        }
    }

    fn peek(&self) -> i32 {
        self.value
    }

    fn is_live(&self) -> bool {
        self.stage.is_some()
    }

    fn load(&self) -> SortResult<Self> {
        self.show(Access::LoadOne, READ_COLOR)?;
        Ok(Self::transient(self.value))
    }

    fn get(&self) -> SortResult<i32> {
        self.show(Access::LoadOne, READ_COLOR)?;
        Ok(self.value)
    }

    fn compare(&self, other: &Self) -> SortResult<Ordering> {
        self.show_reads(other, Access::CompareOne, Access::CompareTwo)?;
        Ok(self.value.cmp(&other.value))
    }

    fn compare_value(&self, value: i32) -> SortResult<Ordering> {
        self.show(Access::CompareOne, READ_COLOR)?;
        Ok(self.value.cmp(&value))
    }

    fn set(&mut self, other: &Self) -> SortResult<()> {
        self.value = other.value;
        self.refresh();
        self.show_write_from(other)
    }

    fn set_value(&mut self, value: i32) -> SortResult<()> {
        self.value = value;
        self.refresh();
        self.show(Access::StoreOne, WRITE_COLOR)
    }

    fn update(&mut self, op: Arith, other: &Self) -> SortResult<()> {
        self.value = op.eval(self.value, other.value)?;
        self.refresh();
        self.show_write_from(other)
    }

    fn update_value(&mut self, op: Arith, value: i32) -> SortResult<()> {
        self.value = op.eval(self.value, value)?;
        self.refresh();
        self.show(Access::StoreOne, WRITE_COLOR)
    }

    fn combine(&self, op: Arith, other: &Self) -> SortResult<i32> {
        let result = op.eval(self.value, other.value)?;
        self.show_reads(other, Access::LoadOne, Access::LoadTwo)?;
        Ok(result)
    }

    fn combine_value(&self, op: Arith, value: i32) -> SortResult<i32> {
        let result = op.eval(self.value, value)?;
        self.show(Access::LoadOne, READ_COLOR)?;
        Ok(result)
    }

    fn swap_with(&mut self, other: &mut Self) -> SortResult<()> {
        std::mem::swap(&mut self.value, &mut other.value);
        self.refresh();
        other.refresh();
        match (self.is_live(), other.is_live()) {
            (true, true) => self.show_pair(other, Access::SwapTwo, WRITE_COLOR, WRITE_COLOR),
            (true, false) => self.show(Access::CopyTwo, WRITE_COLOR),
            (false, true) => other.show(Access::CopyTwo, WRITE_COLOR),
            (false, false) => Ok(()),
        }
    }

    fn exchange(&mut self, value: &mut i32) -> SortResult<()> {
        std::mem::swap(&mut self.value, value);
        self.refresh();
        self.show(Access::CopyTwo, WRITE_COLOR)
    }

    fn credit(&self, steps: u64) {
        if let Some(stage) = &self.stage {
            stage.counters().credit_steps(steps);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::{OpCounters, OpSnapshot};
    use crate::proxy::{swap_at, Counted};
    use crate::stage::{Geometry, MemoryCanvas, Pacer, PauseControl, SharedCanvas, Speed, Wiring};
    use std::time::Duration;

    fn stage_for(values: &[i32], memory: &Arc<MemoryCanvas>) -> Arc<Stage> {
        let wiring = Wiring {
            canvas: Arc::new(SharedCanvas::new(Arc::clone(memory))),
            control: Arc::new(PauseControl::new(Duration::from_millis(1))),
            pacer: Arc::new(Pacer::new(Speed::UNPACED)),
            counters: Arc::new(OpCounters::new()),
        };
        let min = values.iter().copied().min().unwrap_or(0);
        let max = values.iter().copied().max().unwrap_or(0);
        Stage::new(wiring, Geometry::new(40, 90, values.len(), min, max))
    }

    #[test]
    fn test_swap_moves_values_not_slots() {
        let memory = Arc::new(MemoryCanvas::new());
        let stage = stage_for(&[1, 2, 3, 4], &memory);
        let mut bars = Bar::layout(&[4, 2, 3, 1], &stage);
        let before = bars[0].slot();
        let tall = bars[0].top();
        swap_at(&mut bars, 0, 3).unwrap();
        assert_eq!(bars[0].slot(), before);
        assert_eq!(bars[0].peek(), 1);
        assert_eq!(bars[3].top(), tall);
        assert_eq!(bars[0].color(), Rgb::GREY);
    }

    #[test]
    fn test_clone_is_transient() {
        let memory = Arc::new(MemoryCanvas::new());
        let stage = stage_for(&[1, 2], &memory);
        let bars = Bar::layout(&[2, 1], &stage);
        let copy = bars[0].clone();
        assert!(!copy.is_live());
        assert_eq!(copy.slot(), (-1, -1));
        assert_eq!(stage.counters().snapshot(), OpSnapshot::default());
        assert_eq!(memory.flush_count(), 0);
    }

    #[test]
    fn test_counts_match_counting_proxy() {
        let values = [5, 3, 8, 1];
        let memory = Arc::new(MemoryCanvas::new());
        let stage = stage_for(&values, &memory);
        let mut bars = Bar::layout(&values, &stage);
        let tally = Arc::new(OpCounters::new());
        let mut counted = Counted::live_from(&values, &tally);

        fn script<T: Element>(v: &mut [T]) -> SortResult<()> {
            let tmp = v[0].load()?;
            if v[1].less(&tmp)? {
                swap_at(v, 0, 1)?;
            }
            v[2].update_value(Arith::Sub, 1)?;
            let sum = v[2].combine(Arith::Add, &v[3])?;
            v[3].set_value(sum)?;
            Ok(())
        }

        script(&mut bars).unwrap();
        script(&mut counted).unwrap();
        assert_eq!(stage.counters().snapshot(), tally.snapshot());
        let shown: Vec<i32> = bars.iter().map(Bar::peek).collect();
        assert_eq!(shown, vec![3, 5, 7, 8]);
    }

    #[test]
    fn test_write_leaves_resting_colour_after_settle() {
        let memory = Arc::new(MemoryCanvas::new());
        let stage = stage_for(&[1, 2, 3, 4], &memory);
        let mut bars = Bar::layout(&[1, 2, 3, 4], &stage);
        bars[2].set_value(4).unwrap();
        assert_eq!(memory.shown(20), Some(WRITE_COLOR));
        stage.settle();
        assert_eq!(memory.shown(20), Some(Rgb::WHITE));
    }
}
