//! Merge sorts: bottom-up merge, bitonic network, parallel merge.

use super::{worker_thread, SortEnv, Spawner};
use crate::error::{SortError, SortResult};
use crate::proxy::{copy_at, swap_at, Element};
use std::thread;

/// Slices at or below this length are never split across threads.
const PARALLEL_CUTOFF: usize = 32;
/// Cap on the split depth, i.e. at most 2^4 concurrent workers.
const MAX_SPLIT_DEPTH: u32 = 4;

/// Merges the sorted runs `data[lo..mid]` and `data[mid..hi]`.
///
/// The left run is loaded into `buffer`; ties take the left element, so the
/// merge is stable.
fn merge_runs<T: Element>(
    data: &mut [T],
    lo: usize,
    mid: usize,
    hi: usize,
    buffer: &mut Vec<T>,
) -> SortResult<()> {
    buffer.clear();
    for item in &data[lo..mid] {
        buffer.push(item.load()?);
    }
    let (mut i, mut j, mut k) = (0, mid, lo);
    while i < buffer.len() && j < hi {
        if data[j].less(&buffer[i])? {
            copy_at(data, k, j)?;
            j += 1;
        } else {
            data[k].set(&buffer[i])?;
            i += 1;
        }
        k += 1;
    }
    while i < buffer.len() {
        data[k].set(&buffer[i])?;
        i += 1;
        k += 1;
    }
    Ok(())
}

fn merge_passes<T: Element>(data: &mut [T]) -> SortResult<()> {
    let n = data.len();
    let mut buffer = Vec::with_capacity(n / 2 + 1);
    let mut width = 1;
    while width < n {
        let mut lo = 0;
        while lo < n {
            let mid = (lo + width).min(n);
            let hi = (lo + 2 * width).min(n);
            if mid < hi {
                merge_runs(data, lo, mid, hi, &mut buffer)?;
            }
            lo += 2 * width;
        }
        width *= 2;
    }
    Ok(())
}

pub fn merge<T: Element>(data: &mut [T], _env: &SortEnv) -> SortResult<()> {
    merge_passes(data)
}

/// Bitonic sorting network. Only defined for power-of-two lengths.
pub fn bitonic<T: Element>(data: &mut [T], _env: &SortEnv) -> SortResult<()> {
    let n = data.len();
    if n < 2 {
        return Ok(());
    }
    if !n.is_power_of_two() {
        return Err(SortError::UnsupportedSize {
            algorithm: "bitonic",
            requirement: "a power-of-two size",
            size: n,
        });
    }
    let mut k = 2;
    while k <= n {
        let mut j = k / 2;
        while j > 0 {
            for i in 0..n {
                let partner = i ^ j;
                if partner <= i {
                    continue;
                }
                let out_of_order = if i & k == 0 {
                    data[i].greater(&data[partner])?
                } else {
                    data[i].less(&data[partner])?
                };
                if out_of_order {
                    swap_at(data, i, partner)?;
                }
            }
            j /= 2;
        }
        k *= 2;
    }
    Ok(())
}

fn split_depth() -> u32 {
    let workers = thread::available_parallelism().map_or(1, |p| p.get());
    workers
        .next_power_of_two()
        .trailing_zeros()
        .min(MAX_SPLIT_DEPTH)
}

/// Merge sort split `depth` times across threads built by `spawner`.
pub(crate) fn split_merge<T: Element>(
    data: &mut [T],
    depth: u32,
    spawner: &Spawner,
) -> SortResult<()> {
    let n = data.len();
    if depth == 0 || n <= PARALLEL_CUTOFF {
        return merge_passes(data);
    }
    let lost = || SortError::WorkerLost {
        algorithm: "parallel merge",
    };
    let mid = n / 2;
    let (left, right) = data.split_at_mut(mid);
    let (left_done, right_done) = thread::scope(|s| {
        let worker = spawner(depth as usize)
            .spawn_scoped(s, move || split_merge(left, depth - 1, spawner));
        let right_done = split_merge(right, depth - 1, spawner);
        let left_done = match worker {
            Ok(worker) => worker.join().unwrap_or_else(|_| Err(lost())),
            Err(_) => Err(lost()),
        };
        (left_done, right_done)
    });
    left_done?;
    right_done?;
    merge_runs(data, 0, mid, n, &mut Vec::with_capacity(mid))
}

/// Merge sort whose halves are sorted on scoped worker threads.
///
/// Every worker is joined before the final merge; a worker that cannot be
/// started or that panicked is reported as [`SortError::WorkerLost`].
pub fn parallel_merge<T: Element>(data: &mut [T], _env: &SortEnv) -> SortResult<()> {
    split_merge(data, split_depth(), &worker_thread)
}

