//! Data preparation shared by every pass.

use crate::error::SortResult;
use crate::proxy::{swap_at, Element};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Fisher-Yates shuffle driven by a seeded `StdRng`.
///
/// Goes through [`swap_at`], so shuffling live animated elements draws every
/// swap. Identical seeds give identical permutations for every element type.
pub fn shuffle<T: Element>(data: &mut [T], seed: u64) -> SortResult<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    shuffle_with_rng(data, &mut rng)
}

/// Shuffle using an existing RNG (allows sequential shuffles with state preserved)
pub fn shuffle_with_rng<T: Element>(data: &mut [T], rng: &mut StdRng) -> SortResult<()> {
    for i in (1..data.len()).rev() {
        let j = rng.random_range(0..=i);
        swap_at(data, i, j)?;
    }
    Ok(())
}

/// Get a seed from current time for randomization
pub fn time_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x12345678)
}

/// Default source data: `1..=n`.
pub fn ascending(n: usize) -> Vec<i32> {
    (1..=n).map(|v| v.min(i32::MAX as usize) as i32).collect()
}

/// Human-readable duration with a unit that keeps 1-4 integer digits.
pub fn format_duration(d: Duration) -> String {
    let micros = d.as_micros();
    if micros < 10_000 {
        format!("{} us", micros)
    } else if micros < 10_000_000 {
        format!("{:.2} ms", micros as f64 / 1e3)
    } else {
        format!("{:.2} s", d.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::OpCounters;
    use crate::proxy::Counted;
    use std::sync::Arc;

    #[test]
    fn test_same_seed_same_permutation_across_proxies() {
        let source = ascending(64);
        let mut plain = source.clone();
        shuffle(&mut plain, 2024).unwrap();
        let tally = Arc::new(OpCounters::new());
        let mut counted = Counted::live_from(&source, &tally);
        shuffle(&mut counted, 2024).unwrap();
        let counted: Vec<i32> = counted.iter().map(Element::peek).collect();
        assert_eq!(plain, counted);
        assert_ne!(plain, source);
        let mut sorted = plain.clone();
        sorted.sort();
        assert_eq!(sorted, source);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_micros(42)), "42 us");
        assert_eq!(format_duration(Duration::from_micros(12_500)), "12.50 ms");
        assert_eq!(format_duration(Duration::from_secs(12)), "12.00 s");
    }
}
