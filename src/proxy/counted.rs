//! Counting instantiation.
//!
//! A live `Counted` carries a handle to the pass counters; a transient one
//! carries none. Every operation with at least one live operand records
//! exactly one [`Access`].

use super::{Arith, Element, ProxyKind};
use crate::counters::{Access, OpCounters};
use crate::error::SortResult;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

pub struct Counted {
    value: i32,
    tally: Option<Arc<OpCounters>>,
}

impl Counted {
    pub fn live(value: i32, tally: &Arc<OpCounters>) -> Self {
        Self {
            value,
            tally: Some(Arc::clone(tally)),
        }
    }

    /// Builds the live array for a counting pass.
    pub fn live_from(values: &[i32], tally: &Arc<OpCounters>) -> Vec<Self> {
        values.iter().map(|&v| Self::live(v, tally)).collect()
    }

    #[inline]
    fn note(&self, access: Access) {
        if let Some(tally) = &self.tally {
            tally.record(access);
        }
    }

    #[inline]
    fn note_pair(&self, other: &Self, single: Access, double: Access) {
        match (&self.tally, &other.tally) {
            (Some(tally), Some(_)) => tally.record(double),
            (Some(tally), None) | (None, Some(tally)) => tally.record(single),
            (None, None) => {}
        }
    }

    /// Assignment-shaped event: `self` written from `other`.
    #[inline]
    fn note_write_from(&self, other: &Self) {
        match (&self.tally, &other.tally) {
            (Some(tally), Some(_)) => tally.record(Access::CopyTwo),
            (Some(tally), None) => tally.record(Access::StoreOne),
            (None, Some(tally)) => tally.record(Access::LoadOne),
            (None, None) => {}
        }
    }
}

impl Clone for Counted {
    /// Language-level copy: the result is transient and nothing is counted.
    fn clone(&self) -> Self {
        Self {
            value: self.value,
            tally: None,
        }
    }
}

impl fmt::Debug for Counted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Counted")
            .field("value", &self.value)
            .field("live", &self.tally.is_some())
            .finish()
    }
}

impl Element for Counted {
    const KIND: ProxyKind = ProxyKind::Counted;

    fn transient(value: i32) -> Self {
        Self { value, tally: None }
    }

    fn peek(&self) -> i32 {
        self.value
    }

    fn is_live(&self) -> bool {
        self.tally.is_some()
    }

    fn load(&self) -> SortResult<Self> {
        self.note(Access::LoadOne);
        Ok(Self::transient(self.value))
    }

    fn get(&self) -> SortResult<i32> {
        self.note(Access::LoadOne);
        Ok(self.value)
    }

    fn compare(&self, other: &Self) -> SortResult<Ordering> {
        self.note_pair(other, Access::CompareOne, Access::CompareTwo);
        Ok(self.value.cmp(&other.value))
    }

    fn compare_value(&self, value: i32) -> SortResult<Ordering> {
        self.note(Access::CompareOne);
        Ok(self.value.cmp(&value))
    }

    fn set(&mut self, other: &Self) -> SortResult<()> {
        self.value = other.value;
        self.note_write_from(other);
        Ok(())
    }

    fn set_value(&mut self, value: i32) -> SortResult<()> {
        self.value = value;
        self.note(Access::StoreOne);
        Ok(())
    }

    fn update(&mut self, op: Arith, other: &Self) -> SortResult<()> {
        self.value = op.eval(self.value, other.value)?;
        self.note_write_from(other);
        Ok(())
    }

    fn update_value(&mut self, op: Arith, value: i32) -> SortResult<()> {
        self.value = op.eval(self.value, value)?;
        self.note(Access::StoreOne);
        Ok(())
    }

    fn combine(&self, op: Arith, other: &Self) -> SortResult<i32> {
        let result = op.eval(self.value, other.value)?;
        self.note_pair(other, Access::LoadOne, Access::LoadTwo);
        Ok(result)
    }

    fn combine_value(&self, op: Arith, value: i32) -> SortResult<i32> {
        let result = op.eval(self.value, value)?;
        self.note(Access::LoadOne);
        Ok(result)
    }

    fn swap_with(&mut self, other: &mut Self) -> SortResult<()> {
        std::mem::swap(&mut self.value, &mut other.value);
        self.note_pair(other, Access::CopyTwo, Access::SwapTwo);
        Ok(())
    }

    fn exchange(&mut self, value: &mut i32) -> SortResult<()> {
        std::mem::swap(&mut self.value, value);
        self.note(Access::CopyTwo);
        Ok(())
    }

    fn credit(&self, steps: u64) {
        if let Some(tally) = &self.tally {
            tally.credit_steps(steps);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::OpSnapshot;
    use crate::error::SortError;
    use crate::proxy::swap_at;
    use proptest::prelude::*;

    fn tally() -> Arc<OpCounters> {
        Arc::new(OpCounters::new())
    }

    #[test]
    fn test_live_pair_is_one_two_operand_event() {
        let t = tally();
        let a = Counted::live(3, &t);
        let b = Counted::live(5, &t);
        assert!(a.less(&b).unwrap());
        let snap = t.snapshot();
        assert_eq!((snap.compares, snap.reads, snap.steps), (1, 2, 1));
    }

    #[test]
    fn test_mixed_pair_is_single_operand_event() {
        let t = tally();
        let a = Counted::live(3, &t);
        let tmp = a.load().unwrap();
        assert!(!tmp.is_live());
        assert!(tmp.equals(&a).unwrap());
        let snap = t.snapshot();
        // load + compare
        assert_eq!((snap.compares, snap.reads, snap.steps), (1, 2, 2));
    }

    #[test]
    fn test_clone_is_silent_and_transient() {
        let t = tally();
        let a = Counted::live(7, &t);
        let copy = a.clone();
        assert!(!copy.is_live());
        assert_eq!(copy.peek(), 7);
        assert_eq!(t.snapshot(), OpSnapshot::default());
    }

    #[test]
    fn test_swap_classification() {
        let t = tally();
        let mut v = Counted::live_from(&[2, 1], &t);
        swap_at(&mut v, 0, 1).unwrap();
        let mut tmp = Counted::transient(9);
        v[0].swap_with(&mut tmp).unwrap();
        let snap = t.snapshot();
        assert_eq!(snap.writes, 2 + 1);
        assert_eq!(snap.steps, 2);
        assert_eq!(v[0].peek(), 9);
        assert_eq!(tmp.peek(), 1);
    }

    #[test]
    fn test_division_by_zero_proxy_is_domain_error() {
        let t = tally();
        let mut a = Counted::live(10, &t);
        let zero = Counted::live(0, &t);
        assert_eq!(a.update(Arith::Div, &zero), Err(SortError::DivideByZero));
        assert_eq!(a.combine(Arith::Rem, &zero), Err(SortError::DivideByZero));
        assert_eq!(a.peek(), 10);
        assert_eq!(t.steps(), 0);
    }

    proptest! {
        #[test]
        fn prop_transients_never_count(values in proptest::collection::vec(-1000i32..1000, 1..64)) {
            let t = tally();
            let live = Counted::live_from(&values, &t);
            let before = t.snapshot();
            let mut temps: Vec<Counted> = live.iter().map(Counted::clone).collect();
            for pair in temps.chunks_mut(2) {
                if let [a, b] = pair {
                    a.compare(b).unwrap();
                    a.swap_with(b).unwrap();
                    let c = a.clone();
                    a.set(&c).unwrap();
                }
            }
            let extra: Vec<Counted> = values.iter().map(|&v| Counted::transient(v)).collect();
            drop(extra);
            prop_assert_eq!(t.snapshot(), before);
        }
    }
}
