//! Baseline instantiation: `i32` itself, with no side effects.

use super::{Arith, Element, ProxyKind};
use crate::error::SortResult;
use std::cmp::Ordering;

impl Element for i32 {
    const KIND: ProxyKind = ProxyKind::Plain;

    #[inline(always)]
    fn transient(value: i32) -> Self {
        value
    }

    #[inline(always)]
    fn peek(&self) -> i32 {
        *self
    }

    #[inline(always)]
    fn is_live(&self) -> bool {
        false
    }

    #[inline(always)]
    fn load(&self) -> SortResult<Self> {
        Ok(*self)
    }

    #[inline(always)]
    fn get(&self) -> SortResult<i32> {
        Ok(*self)
    }

    #[inline(always)]
    fn compare(&self, other: &Self) -> SortResult<Ordering> {
        Ok(Ord::cmp(self, other))
    }

    #[inline(always)]
    fn compare_value(&self, value: i32) -> SortResult<Ordering> {
        Ok(Ord::cmp(self, &value))
    }

    #[inline(always)]
    fn set(&mut self, other: &Self) -> SortResult<()> {
        *self = *other;
        Ok(())
    }

    #[inline(always)]
    fn set_value(&mut self, value: i32) -> SortResult<()> {
        *self = value;
        Ok(())
    }

    #[inline(always)]
    fn update(&mut self, op: Arith, other: &Self) -> SortResult<()> {
        *self = op.eval(*self, *other)?;
        Ok(())
    }

    #[inline(always)]
    fn update_value(&mut self, op: Arith, value: i32) -> SortResult<()> {
        *self = op.eval(*self, value)?;
        Ok(())
    }

    #[inline(always)]
    fn combine(&self, op: Arith, other: &Self) -> SortResult<i32> {
        op.eval(*self, *other)
    }

    #[inline(always)]
    fn combine_value(&self, op: Arith, value: i32) -> SortResult<i32> {
        op.eval(*self, value)
    }

    #[inline(always)]
    fn swap_with(&mut self, other: &mut Self) -> SortResult<()> {
        std::mem::swap(self, other);
        Ok(())
    }

    #[inline(always)]
    fn exchange(&mut self, value: &mut i32) -> SortResult<()> {
        std::mem::swap(self, value);
        Ok(())
    }
}
