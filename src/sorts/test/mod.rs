//! Tests for the sorting algorithms across all three instantiations.

#[cfg(test)]
mod tests {
    use crate::counters::OpCounters;
    use crate::error::SortError;
    use crate::proxy::{Counted, Element};
    use crate::sorts::distribution::*;
    use crate::sorts::exchange::*;
    use crate::sorts::insertion::*;
    use crate::sorts::merge::*;
    use crate::sorts::selection::*;
    use crate::sorts::{worker_thread, SortEnv};
    use crate::utils::bench::shuffle;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    type Plain = fn(&mut [i32], &SortEnv) -> Result<(), SortError>;

    const ENV: SortEnv = SortEnv { seed: 7 };

    type CountedSort = fn(&mut [Counted], &SortEnv) -> Result<(), SortError>;

    fn general() -> [(&'static str, Plain); 18] {
        [
            ("bubble", bubble::<i32>),
            ("cocktail", cocktail::<i32>),
            ("odd_even", odd_even::<i32>),
            ("comb", comb::<i32>),
            ("quick", quick::<i32>),
            ("stooge", stooge::<i32>),
            ("selection", selection::<i32>),
            ("double_selection", double_selection::<i32>),
            ("cycle", cycle::<i32>),
            ("heap", heap::<i32>),
            ("insertion", insertion::<i32>),
            ("shell", shell::<i32>),
            ("merge", merge::<i32>),
            ("parallel_merge", parallel_merge::<i32>),
            ("counting", counting::<i32>),
            ("bead", bead::<i32>),
            ("radix", radix::<i32>),
            ("sleep", sleep::<i32>),
        ]
    }

    fn check(name: &str, sort: Plain, input: &[i32]) {
        let mut data = input.to_vec();
        let mut expected = input.to_vec();
        expected.sort();
        sort(&mut data, &ENV).unwrap_or_else(|e| panic!("{name} failed: {e}"));
        assert_eq!(data, expected, "{name} on {input:?}");
    }

    #[test]
    fn test_trivial_inputs() {
        for (name, sort) in general() {
            check(name, sort, &[]);
            check(name, sort, &[42]);
            check(name, sort, &[2, 1]);
        }
    }

    #[test]
    fn test_duplicates_and_negatives() {
        let input: Vec<i32> = (0..37).map(|i| (i * 7 % 11) - 5).collect();
        for (name, sort) in general() {
            check(name, sort, &input);
        }
    }

    #[test]
    fn test_reversed_and_shuffled() {
        let reversed: Vec<i32> = (1..=100).rev().collect();
        let mut shuffled: Vec<i32> = (1..=100).collect();
        shuffle(&mut shuffled, 99).unwrap();
        for (name, sort) in general() {
            check(name, sort, &reversed);
            check(name, sort, &shuffled);
        }
    }

    #[test]
    fn test_bitonic_power_of_two() {
        let mut data: Vec<i32> = (1..=64).rev().collect();
        bitonic(&mut data, &ENV).unwrap();
        assert_eq!(data, (1..=64).collect::<Vec<_>>());
        let mut odd = vec![3, 1, 2];
        assert_eq!(
            bitonic(&mut odd, &ENV),
            Err(SortError::UnsupportedSize {
                algorithm: "bitonic",
                requirement: "a power-of-two size",
                size: 3
            })
        );
    }

    #[test]
    fn test_bogo_small_input() {
        let mut data = vec![4, 2, 5, 1, 3];
        bogo(&mut data, &ENV).unwrap();
        assert_eq!(data, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_counting_range_too_wide() {
        let mut data = vec![0, 20_000_000];
        assert!(matches!(
            counting(&mut data, &ENV),
            Err(SortError::RangeTooWide { algorithm: "counting", .. })
        ));
    }

    #[test]
    fn test_bead_range_and_credits() {
        let mut wide = vec![0, 20_000_000];
        assert!(matches!(
            bead(&mut wide, &ENV),
            Err(SortError::RangeTooWide { algorithm: "bead", .. })
        ));

        let tally = Arc::new(OpCounters::new());
        let mut data = Counted::live_from(&[3, 1, 2, 3], &tally);
        bead(&mut data, &ENV).unwrap();
        let values: Vec<i32> = data.iter().map(Counted::peek).collect();
        assert_eq!(values, vec![1, 2, 3, 3]);
        // every access here reads once; the rest are the two rods scanned
        let snap = tally.snapshot();
        assert_eq!(snap.writes, 4);
        assert_eq!(snap.steps - snap.reads, 2);
    }

    /// A builder whose stack can never be mapped, so the spawn is refused.
    #[cfg(all(target_os = "linux", target_pointer_width = "64"))]
    fn unmappable(index: usize) -> thread::Builder {
        worker_thread(index).stack_size(1 << 62)
    }

    #[cfg(all(target_os = "linux", target_pointer_width = "64"))]
    #[test]
    fn test_sleep_refused_spawn_releases_started_workers() {
        let refuse_third = |index: usize| {
            if index == 2 {
                unmappable(index)
            } else {
                worker_thread(index)
            }
        };
        let mut data = vec![5, 3, 1, 4, 2];
        assert_eq!(
            sleep_on(&mut data, &ENV, &refuse_third),
            Err(SortError::WorkerLost { algorithm: "sleep" })
        );
        // the two started workers quit without writing
        assert_eq!(data, vec![5, 3, 1, 4, 2]);
    }

    #[cfg(all(target_os = "linux", target_pointer_width = "64"))]
    #[test]
    fn test_parallel_merge_refused_spawn_is_worker_lost() {
        let mut data: Vec<i32> = (0..100).rev().collect();
        assert_eq!(
            split_merge(&mut data, 2, &unmappable),
            Err(SortError::WorkerLost {
                algorithm: "parallel merge"
            })
        );
    }

    #[test]
    fn test_parallel_merge_with_explicit_depth() {
        let mut data: Vec<i32> = (0..300).map(|i| (i * 37) % 101).collect();
        let mut expected = data.clone();
        expected.sort();
        split_merge(&mut data, 3, &worker_thread).unwrap();
        assert_eq!(data, expected);
    }

    #[test]
    fn test_sleep_limits() {
        let mut many: Vec<i32> = (0..301).collect();
        assert!(matches!(
            sleep(&mut many, &ENV),
            Err(SortError::TooManyWorkers { requested: 301, limit: 300, .. })
        ));
        let mut wide = vec![0, 200_000];
        assert!(matches!(
            sleep(&mut wide, &ENV),
            Err(SortError::RangeTooWide { algorithm: "sleep", .. })
        ));
    }

    #[test]
    fn test_sleep_credits_steps_per_worker() {
        let tally = Arc::new(OpCounters::new());
        let mut data = Counted::live_from(&[3, 1, 2], &tally);
        sleep(&mut data, &ENV).unwrap();
        let values: Vec<i32> = data.iter().map(Counted::peek).collect();
        assert_eq!(values, vec![1, 2, 3]);
        assert!(tally.steps() >= 3 * SLEEP_WORKER_STEPS);
    }

    #[test]
    fn test_shell_gaps() {
        assert_eq!(shell_gaps(2), vec![1]);
        assert_eq!(shell_gaps(100), vec![1, 4, 10, 23, 57]);
        assert_eq!(*shell_gaps(8192).last().unwrap(), 7983);
    }

    #[test]
    fn test_merge_is_stable_in_operation_count() {
        let input: Vec<i32> = (0..50).map(|i| (i * 13) % 17).collect();
        let counts: Vec<u64> = (0..3)
            .map(|_| {
                let tally = Arc::new(OpCounters::new());
                let mut data = Counted::live_from(&input, &tally);
                merge(&mut data, &ENV).unwrap();
                tally.snapshot().steps
            })
            .collect();
        assert!(counts.windows(2).all(|w| w[0] == w[1]));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_counted_matches_plain_and_counts_reproducibly(
            input in proptest::collection::vec(-500i32..500, 0..80)
        ) {
            let sorts: [(&str, CountedSort); 5] = [
                ("quick", quick::<Counted>),
                ("heap", heap::<Counted>),
                ("shell", shell::<Counted>),
                ("cycle", cycle::<Counted>),
                ("radix", radix::<Counted>),
            ];
            for (name, sort) in sorts {
                let mut runs = Vec::new();
                for _ in 0..2 {
                    let tally = Arc::new(OpCounters::new());
                    let mut data = Counted::live_from(&input, &tally);
                    sort(&mut data, &ENV).unwrap();
                    let values: Vec<i32> = data.iter().map(Counted::peek).collect();
                    runs.push((values, tally.snapshot()));
                }
                let mut expected = input.clone();
                expected.sort();
                prop_assert_eq!(&runs[0].0, &expected, "{} sorted wrong", name);
                prop_assert_eq!(runs[0].1, runs[1].1, "{} counted differently", name);
            }
        }
    }
}
