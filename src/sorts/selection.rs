//! Selection sorts: selection, double selection, cycle and heap.

use super::SortEnv;
use crate::error::SortResult;
use crate::proxy::{swap_at, Element};

pub fn selection<T: Element>(data: &mut [T], _env: &SortEnv) -> SortResult<()> {
    let n = data.len();
    for i in 0..n {
        let mut min = i;
        for j in i + 1..n {
            if data[j].less(&data[min])? {
                min = j;
            }
        }
        swap_at(data, i, min)?;
    }
    Ok(())
}

/// Places both the minimum and the maximum on each sweep.
pub fn double_selection<T: Element>(data: &mut [T], _env: &SortEnv) -> SortResult<()> {
    let mut lo = 0;
    let mut hi = data.len();
    while hi - lo > 1 {
        let mut min = lo;
        let mut max = lo;
        for j in lo + 1..hi {
            if data[j].less(&data[min])? {
                min = j;
            } else if data[j].greater(&data[max])? {
                max = j;
            }
        }
        swap_at(data, lo, min)?;
        // the maximum may just have been moved out of `lo`
        if max == lo {
            max = min;
        }
        swap_at(data, hi - 1, max)?;
        lo += 1;
        hi -= 1;
    }
    Ok(())
}

/// Number of elements after `start` that are smaller than `item`.
fn rank<T: Element>(data: &[T], start: usize, item: &T) -> SortResult<usize> {
    let mut pos = start;
    for other in &data[start + 1..] {
        if other.less(item)? {
            pos += 1;
        }
    }
    Ok(pos)
}

/// Cycle sort: every element is written at most once, straight to its slot.
pub fn cycle<T: Element>(data: &mut [T], _env: &SortEnv) -> SortResult<()> {
    let n = data.len();
    for start in 0..n.saturating_sub(1) {
        let mut item = data[start].load()?;
        let mut pos = rank(data, start, &item)?;
        if pos == start {
            continue;
        }
        while item.equals(&data[pos])? {
            pos += 1;
        }
        data[pos].swap_with(&mut item)?;
        while pos != start {
            pos = rank(data, start, &item)?;
            while item.equals(&data[pos])? {
                pos += 1;
            }
            data[pos].swap_with(&mut item)?;
        }
    }
    Ok(())
}

fn sift_down<T: Element>(data: &mut [T], mut root: usize, end: usize) -> SortResult<()> {
    loop {
        let mut child = 2 * root + 1;
        if child >= end {
            return Ok(());
        }
        if child + 1 < end && data[child].less(&data[child + 1])? {
            child += 1;
        }
        if !data[root].less(&data[child])? {
            return Ok(());
        }
        swap_at(data, root, child)?;
        root = child;
    }
}

pub fn heap<T: Element>(data: &mut [T], _env: &SortEnv) -> SortResult<()> {
    let n = data.len();
    for start in (0..n / 2).rev() {
        sift_down(data, start, n)?;
    }
    for end in (1..n).rev() {
        swap_at(data, 0, end)?;
        sift_down(data, 0, end)?;
    }
    Ok(())
}
