//! Exchange sorts: bubble family, comb, quick, stooge and bogo.

use super::SortEnv;
use crate::error::{SortError, SortResult};
use crate::proxy::{swap_at, Element};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Shuffles bogo sort gets before it gives up.
pub const BOGO_RETRY_BUDGET: u64 = 1_000_000;

pub fn bubble<T: Element>(data: &mut [T], _env: &SortEnv) -> SortResult<()> {
    for end in (1..data.len()).rev() {
        let mut swapped = false;
        for i in 0..end {
            if data[i].greater(&data[i + 1])? {
                swap_at(data, i, i + 1)?;
                swapped = true;
            }
        }
        if !swapped {
            break;
        }
    }
    Ok(())
}

/// Bidirectional bubble sort.
pub fn cocktail<T: Element>(data: &mut [T], _env: &SortEnv) -> SortResult<()> {
    let mut lo = 0;
    let mut hi = data.len().saturating_sub(1);
    let mut swapped = true;
    while swapped && lo < hi {
        swapped = false;
        for i in lo..hi {
            if data[i].greater(&data[i + 1])? {
                swap_at(data, i, i + 1)?;
                swapped = true;
            }
        }
        hi -= 1;
        for i in (lo..hi).rev() {
            if data[i].greater(&data[i + 1])? {
                swap_at(data, i, i + 1)?;
                swapped = true;
            }
        }
        lo += 1;
    }
    Ok(())
}

pub fn odd_even<T: Element>(data: &mut [T], _env: &SortEnv) -> SortResult<()> {
    let n = data.len();
    let mut sorted = false;
    while !sorted {
        sorted = true;
        for start in [1, 0] {
            let mut i = start;
            while i + 1 < n {
                if data[i].greater(&data[i + 1])? {
                    swap_at(data, i, i + 1)?;
                    sorted = false;
                }
                i += 2;
            }
        }
    }
    Ok(())
}

/// Comb sort with shrink factor 1.3.
pub fn comb<T: Element>(data: &mut [T], _env: &SortEnv) -> SortResult<()> {
    let n = data.len();
    let mut gap = n;
    let mut swapped = true;
    while gap > 1 || swapped {
        gap = (gap * 10 / 13).max(1);
        swapped = false;
        let mut i = 0;
        while i + gap < n {
            if data[i].greater(&data[i + gap])? {
                swap_at(data, i, i + gap)?;
                swapped = true;
            }
            i += 1;
        }
    }
    Ok(())
}

/// Lomuto partition around the middle element; returns the pivot's final index.
fn partition<T: Element>(data: &mut [T], lo: usize, hi: usize) -> SortResult<usize> {
    swap_at(data, lo + (hi - lo) / 2, hi)?;
    let mut store = lo;
    for i in lo..hi {
        if data[i].less(&data[hi])? {
            swap_at(data, i, store)?;
            store += 1;
        }
    }
    swap_at(data, store, hi)?;
    Ok(store)
}

pub fn quick<T: Element>(data: &mut [T], _env: &SortEnv) -> SortResult<()> {
    if data.len() < 2 {
        return Ok(());
    }
    let mut stack = vec![(0, data.len() - 1)];
    while let Some((lo, hi)) = stack.pop() {
        if lo >= hi {
            continue;
        }
        let p = partition(data, lo, hi)?;
        if p > lo + 1 {
            stack.push((lo, p - 1));
        }
        if p + 1 < hi {
            stack.push((p + 1, hi));
        }
    }
    Ok(())
}

pub fn stooge<T: Element>(data: &mut [T], _env: &SortEnv) -> SortResult<()> {
    if data.len() < 2 {
        return Ok(());
    }
    let mut stack = vec![(0, data.len() - 1)];
    while let Some((i, j)) = stack.pop() {
        if data[j].less(&data[i])? {
            swap_at(data, i, j)?;
        }
        let len = j - i + 1;
        if len > 2 {
            let third = len / 3;
            // first two thirds, last two thirds, first two thirds again
            stack.push((i, j - third));
            stack.push((i + third, j));
            stack.push((i, j - third));
        }
    }
    Ok(())
}

fn is_sorted<T: Element>(data: &[T]) -> SortResult<bool> {
    for i in 1..data.len() {
        if data[i].less(&data[i - 1])? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Shuffles until sorted; gives up after [`BOGO_RETRY_BUDGET`] shuffles.
pub fn bogo<T: Element>(data: &mut [T], env: &SortEnv) -> SortResult<()> {
    let mut rng = StdRng::seed_from_u64(env.seed);
    let mut attempts = 0;
    while !is_sorted(data)? {
        if attempts == BOGO_RETRY_BUDGET {
            return Err(SortError::RetryBudgetExhausted {
                algorithm: "bogo",
                attempts,
            });
        }
        for i in (1..data.len()).rev() {
            let j = rng.random_range(0..=i);
            swap_at(data, i, j)?;
        }
        attempts += 1;
    }
    Ok(())
}
