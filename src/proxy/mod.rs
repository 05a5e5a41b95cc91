//! # Value proxies
//!
//! Sorting algorithms in this crate are written once, generically over
//! [`Element`], and instantiated three times:
//!
//! - `i32` ([`plain`]): passthrough used by the timing pass
//! - [`Counted`]: records every logical operation into [`OpCounters`](crate::counters::OpCounters)
//! - [`Bar`]: additionally draws, paces and honours pause/cancel
//!
//! ## Liveness
//!
//! Only elements built as "the array's real elements" are *live*. Values made
//! with [`Element::transient`], [`Element::load`] or `Clone` are transient and
//! never count or draw. An operation between a live and a transient operand
//! is a single-operand event; between two live operands it is a two-operand
//! event.

pub mod bar;
pub mod counted;
pub mod plain;

pub use bar::Bar;
pub use counted::Counted;

use crate::error::{SortError, SortResult};
use std::cmp::Ordering;

/// Which instantiation an algorithm is running against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProxyKind {
    Plain,
    Counted,
    Animated,
}

/// Integer arithmetic available on elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arith {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl Arith {
    /// Checked evaluation: zero divisors and overflow are domain errors.
    pub fn eval(self, lhs: i32, rhs: i32) -> SortResult<i32> {
        let result = match self {
            Arith::Add => lhs.checked_add(rhs),
            Arith::Sub => lhs.checked_sub(rhs),
            Arith::Mul => lhs.checked_mul(rhs),
            Arith::Div | Arith::Rem if rhs == 0 => return Err(SortError::DivideByZero),
            Arith::Div => lhs.checked_div(rhs),
            Arith::Rem => lhs.checked_rem(rhs),
        };
        result.ok_or(SortError::Overflow)
    }
}

/// The operation surface every algorithm is written against.
///
/// Each method is one logical operation. Fallible because animated elements
/// may observe a cancellation request and because arithmetic can hit a zero
/// divisor.
pub trait Element: Clone + Send + Sync + 'static {
    const KIND: ProxyKind;

    /// A non-live value.
    fn transient(value: i32) -> Self;

    /// Reads the value without counting or drawing.
    fn peek(&self) -> i32;

    fn is_live(&self) -> bool;

    /// Algorithmic copy into a temporary (one read of a live source).
    fn load(&self) -> SortResult<Self>;

    /// Conversion to a plain integer.
    fn get(&self) -> SortResult<i32>;

    fn compare(&self, other: &Self) -> SortResult<Ordering>;

    fn compare_value(&self, value: i32) -> SortResult<Ordering>;

    fn set(&mut self, other: &Self) -> SortResult<()>;

    fn set_value(&mut self, value: i32) -> SortResult<()>;

    /// Compound assignment, `self op= other`.
    fn update(&mut self, op: Arith, other: &Self) -> SortResult<()>;

    fn update_value(&mut self, op: Arith, value: i32) -> SortResult<()>;

    /// Binary arithmetic producing a plain integer.
    fn combine(&self, op: Arith, other: &Self) -> SortResult<i32>;

    fn combine_value(&self, op: Arith, value: i32) -> SortResult<i32>;

    fn swap_with(&mut self, other: &mut Self) -> SortResult<()>;

    /// Swaps the element's value with a plain integer.
    fn exchange(&mut self, value: &mut i32) -> SortResult<()>;

    /// Adds progress steps for work done outside element operations.
    fn credit(&self, _steps: u64) {}

    fn less(&self, other: &Self) -> SortResult<bool> {
        Ok(self.compare(other)? == Ordering::Less)
    }

    fn greater(&self, other: &Self) -> SortResult<bool> {
        Ok(self.compare(other)? == Ordering::Greater)
    }

    fn not_greater(&self, other: &Self) -> SortResult<bool> {
        Ok(self.compare(other)? != Ordering::Greater)
    }

    fn not_less(&self, other: &Self) -> SortResult<bool> {
        Ok(self.compare(other)? != Ordering::Less)
    }

    fn equals(&self, other: &Self) -> SortResult<bool> {
        Ok(self.compare(other)? == Ordering::Equal)
    }

    fn less_value(&self, value: i32) -> SortResult<bool> {
        Ok(self.compare_value(value)? == Ordering::Less)
    }

    fn greater_value(&self, value: i32) -> SortResult<bool> {
        Ok(self.compare_value(value)? == Ordering::Greater)
    }

    fn increment(&mut self) -> SortResult<()> {
        self.update_value(Arith::Add, 1)
    }

    fn decrement(&mut self) -> SortResult<()> {
        self.update_value(Arith::Sub, 1)
    }
}

/// Two distinct mutable elements of one slice.
///
/// # Panics
/// If `a == b` or either index is out of bounds.
pub fn pair_mut<T>(data: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    assert_ne!(a, b, "pair_mut needs two distinct indices");
    if a < b {
        let (head, tail) = data.split_at_mut(b);
        (&mut head[a], &mut tail[0])
    } else {
        let (head, tail) = data.split_at_mut(a);
        (&mut tail[0], &mut head[b])
    }
}

/// Swaps `data[a]` and `data[b]`. Swapping a slot with itself is a no-op.
pub fn swap_at<T: Element>(data: &mut [T], a: usize, b: usize) -> SortResult<()> {
    if a == b {
        return Ok(());
    }
    let (x, y) = pair_mut(data, a, b);
    x.swap_with(y)
}

/// `data[dst] = data[src]`.
pub fn copy_at<T: Element>(data: &mut [T], dst: usize, src: usize) -> SortResult<()> {
    if dst == src {
        return Ok(());
    }
    let (d, s) = pair_mut(data, dst, src);
    d.set(s)
}

/// Minimum and maximum of a non-empty slice, read through the proxy.
pub fn value_range<T: Element>(data: &[T]) -> SortResult<(i32, i32)> {
    let Some(first) = data.first() else {
        return Ok((0, 0));
    };
    let mut min = first.get()?;
    let mut max = min;
    for item in &data[1..] {
        if item.greater_value(max)? {
            max = item.get()?;
        } else if item.less_value(min)? {
            min = item.get()?;
        }
    }
    Ok((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arith_checked() {
        assert_eq!(Arith::Add.eval(2, 3), Ok(5));
        assert_eq!(Arith::Rem.eval(7, 3), Ok(1));
        assert_eq!(Arith::Div.eval(1, 0), Err(SortError::DivideByZero));
        assert_eq!(Arith::Rem.eval(1, 0), Err(SortError::DivideByZero));
        assert_eq!(Arith::Add.eval(i32::MAX, 1), Err(SortError::Overflow));
        assert_eq!(Arith::Div.eval(i32::MIN, -1), Err(SortError::Overflow));
    }

    #[test]
    fn test_pair_mut_both_orders() {
        let mut v = vec![1, 2, 3, 4];
        let (a, b) = pair_mut(&mut v, 3, 1);
        std::mem::swap(a, b);
        assert_eq!(v, vec![1, 4, 3, 2]);
    }

    #[test]
    fn test_slice_helpers_on_plain() {
        let mut v = vec![5, 1, 9, 3];
        swap_at(&mut v, 0, 1).unwrap();
        copy_at(&mut v, 3, 2).unwrap();
        swap_at(&mut v, 2, 2).unwrap();
        assert_eq!(v, vec![1, 5, 9, 9]);
        assert_eq!(value_range(&v), Ok((1, 9)));
    }
}
