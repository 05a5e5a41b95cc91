//! Distribution sorts: counting, radix and sleep sort.

use super::insertion::insertion;
use super::{worker_thread, SortEnv, Spawner};
use crate::error::{SortError, SortResult};
use crate::proxy::{value_range, Element, ProxyKind};
use parking_lot::{Condvar, Mutex};
use std::thread;
use std::time::Duration;

pub const COUNTING_RANGE_LIMIT: i64 = 10_000_000;
pub const BEAD_RANGE_LIMIT: i64 = 10_000_000;
pub const SLEEP_MAX_WORKERS: usize = 300;
pub const SLEEP_RANGE_LIMIT: i64 = 100_000;
/// Animation steps a sleep-sort worker stands for.
pub const SLEEP_WORKER_STEPS: u64 = 1000;
const RADIX_BITS: u32 = 4;

pub fn counting<T: Element>(data: &mut [T], _env: &SortEnv) -> SortResult<()> {
    if data.len() < 2 {
        return Ok(());
    }
    let (min, max) = value_range(data)?;
    let span = max as i64 - min as i64 + 1;
    if span > COUNTING_RANGE_LIMIT {
        return Err(SortError::RangeTooWide {
            algorithm: "counting",
            min,
            max,
            limit: COUNTING_RANGE_LIMIT,
        });
    }
    let mut counts = vec![0usize; span as usize];
    for item in data.iter() {
        counts[(item.get()? as i64 - min as i64) as usize] += 1;
    }
    let mut k = 0;
    for (offset, &count) in counts.iter().enumerate() {
        let value = (min as i64 + offset as i64) as i32;
        for _ in 0..count {
            data[k].set_value(value)?;
            k += 1;
        }
    }
    Ok(())
}

/// LSD radix sort in base 16 over `value - min`.
pub fn radix<T: Element>(data: &mut [T], _env: &SortEnv) -> SortResult<()> {
    if data.len() < 2 {
        return Ok(());
    }
    let (min, max) = value_range(data)?;
    let widest = (max as i64 - min as i64) as u64;
    let mut buckets: Vec<Vec<i32>> = vec![Vec::new(); 1 << RADIX_BITS];
    let mut shift = 0;
    loop {
        for item in data.iter() {
            let value = item.get()?;
            let key = ((value as i64 - min as i64) as u64 >> shift) & ((1 << RADIX_BITS) - 1);
            buckets[key as usize].push(value);
        }
        let mut k = 0;
        for bucket in buckets.iter_mut() {
            for value in bucket.drain(..) {
                data[k].set_value(value)?;
                k += 1;
            }
        }
        shift += RADIX_BITS;
        if shift >= u64::BITS || widest >> shift == 0 {
            return Ok(());
        }
    }
}

/// Gravity sort: one rod per value level, beads fall to the lowest rows.
///
/// Scanning a rod is not an element operation, so each scan is credited as
/// one step to keep the animated and counted totals in line.
pub fn bead<T: Element>(data: &mut [T], _env: &SortEnv) -> SortResult<()> {
    let n = data.len();
    if n < 2 {
        return Ok(());
    }
    let (min, max) = value_range(data)?;
    let span = max as i64 - min as i64;
    if span == 0 {
        return Ok(());
    }
    if span > BEAD_RANGE_LIMIT {
        return Err(SortError::RangeTooWide {
            algorithm: "bead",
            min,
            max,
            limit: BEAD_RANGE_LIMIT,
        });
    }
    // rods[j]: number of values standing higher than j above the minimum
    let mut rods = vec![0usize; span as usize];
    for item in data.iter() {
        let height = (item.get()? as i64 - min as i64) as usize;
        for rod in &mut rods[..height] {
            *rod += 1;
        }
    }
    // ascending row i carries a bead on every rod holding at least n - i
    let mut level = 0;
    for (i, item) in data.iter_mut().enumerate() {
        let mut scanned = 0;
        while level < rods.len() && rods[level] >= n - i {
            level += 1;
            scanned += 1;
        }
        item.credit(scanned);
        item.set_value((min as i64 + level as i64) as i32)?;
    }
    Ok(())
}

/// Holds workers back until all of them exist. `false` tells them to quit.
struct StartGate {
    state: Mutex<Option<bool>>,
    changed: Condvar,
}

impl StartGate {
    fn new() -> Self {
        Self {
            state: Mutex::new(None),
            changed: Condvar::new(),
        }
    }

    fn release(&self, go: bool) {
        *self.state.lock() = Some(go);
        self.changed.notify_all();
    }

    fn wait(&self) -> bool {
        let mut state = self.state.lock();
        loop {
            if let Some(go) = *state {
                return go;
            }
            self.changed.wait(&mut state);
        }
    }
}

/// Each value wakes a worker after a delay proportional to it; workers write
/// in wake-up order and an insertion pass repairs any late wake-ups.
pub fn sleep<T: Element>(data: &mut [T], env: &SortEnv) -> SortResult<()> {
    sleep_on(data, env, &worker_thread)
}

pub(crate) fn sleep_on<T: Element>(
    data: &mut [T],
    env: &SortEnv,
    spawner: &Spawner,
) -> SortResult<()> {
    let n = data.len();
    if n < 2 {
        return Ok(());
    }
    if n > SLEEP_MAX_WORKERS {
        return Err(SortError::TooManyWorkers {
            algorithm: "sleep",
            requested: n,
            limit: SLEEP_MAX_WORKERS,
        });
    }
    let (min, max) = value_range(data)?;
    let span = max as i64 - min as i64;
    if span == 0 {
        return Ok(());
    }
    if span > SLEEP_RANGE_LIMIT {
        return Err(SortError::RangeTooWide {
            algorithm: "sleep",
            min,
            max,
            limit: SLEEP_RANGE_LIMIT,
        });
    }

    let delays = data
        .iter()
        .map(|item| Ok((item.get()? as i64 - min as i64) as u32))
        .collect::<SortResult<Vec<u32>>>()?;
    let unit = match T::KIND {
        ProxyKind::Animated => Duration::from_millis(100),
        _ => Duration::from_micros(1),
    };
    let lost = SortError::WorkerLost { algorithm: "sleep" };

    let gate = StartGate::new();
    let results = Mutex::new((0usize, &mut *data));
    let joined = thread::scope(|s| {
        let mut workers = Vec::with_capacity(n);
        for (index, &delay) in delays.iter().enumerate() {
            let gate = &gate;
            let results = &results;
            let spawned = spawner(index).spawn_scoped(s, move || -> SortResult<()> {
                if !gate.wait() {
                    return Ok(());
                }
                thread::sleep(unit * delay);
                let mut guard = results.lock();
                let (next, slots) = &mut *guard;
                let slot = &mut slots[*next];
                *next += 1;
                slot.credit(SLEEP_WORKER_STEPS);
                slot.set_value((min as i64 + delay as i64) as i32)
            });
            match spawned {
                Ok(worker) => workers.push(worker),
                Err(_) => {
                    // the scope still joins the workers already waiting
                    gate.release(false);
                    return Err(lost.clone());
                }
            }
        }
        gate.release(true);
        Ok(workers
            .into_iter()
            .map(|worker| worker.join())
            .collect::<Vec<_>>())
    });
    for outcome in joined? {
        outcome.map_err(|_| lost.clone())??;
    }
    drop(results);

    insertion(data, env)
}
