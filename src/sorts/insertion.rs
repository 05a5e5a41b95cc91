//! Insertion and shell sort.

use super::SortEnv;
use crate::error::SortResult;
use crate::proxy::{copy_at, Element};

/// Ciura's gap sequence, extended by ×2.25 for larger inputs.
const CIURA_GAPS: [usize; 8] = [1, 4, 10, 23, 57, 132, 301, 701];

/// Gapped insertion pass; `gap == 1` is plain insertion sort.
fn gapped_insertion<T: Element>(data: &mut [T], gap: usize) -> SortResult<()> {
    for i in gap..data.len() {
        let key = data[i].load()?;
        let mut j = i;
        while j >= gap && data[j - gap].greater(&key)? {
            copy_at(data, j, j - gap)?;
            j -= gap;
        }
        if j != i {
            data[j].set(&key)?;
        }
    }
    Ok(())
}

pub fn insertion<T: Element>(data: &mut [T], _env: &SortEnv) -> SortResult<()> {
    gapped_insertion(data, 1)
}

pub(crate) fn shell_gaps(n: usize) -> Vec<usize> {
    let mut gaps: Vec<usize> = CIURA_GAPS.iter().copied().filter(|&g| g < n).collect();
    let mut next = CIURA_GAPS[CIURA_GAPS.len() - 1] * 9 / 4;
    if gaps.len() == CIURA_GAPS.len() {
        while next < n {
            gaps.push(next);
            next = next * 9 / 4;
        }
    }
    gaps
}

pub fn shell<T: Element>(data: &mut [T], _env: &SortEnv) -> SortResult<()> {
    for gap in shell_gaps(data.len()).into_iter().rev() {
        gapped_insertion(data, gap)?;
    }
    Ok(())
}
