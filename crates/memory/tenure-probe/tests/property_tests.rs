//! Property-based tests for the search and its building blocks

mod common;

use std::collections::BTreeMap;

use proptest::prelude::*;

use common::{ScriptedRuntime, buffers};
use tenure_probe::{
    CollectorSnapshot, GenerationalHeap, HeapConfig, ManagedAllocator, ProbeConfig, Prober,
    detector, workload,
};

proptest! {
    /// Property: each size is exactly twice the previous one, and only the
    /// last round reaches the capacity
    #[test]
    fn prop_sizes_double_until_capacity(
        capacity in 1usize..(1 << 20),
        initial in 1usize..(1 << 12),
    ) {
        let runtime = ScriptedRuntime::new(capacity);
        let mut prober = Prober::new(&runtime, ProbeConfig::with_initial_size(initial), buffers()).unwrap();
        let report = prober.run().unwrap();

        let sizes: Vec<usize> = report.rounds.iter().map(|r| r.size).collect();
        prop_assert_eq!(sizes[0], initial);
        for pair in sizes.windows(2) {
            prop_assert_eq!(pair[1], pair[0] * 2);
        }

        let (last, earlier) = sizes.split_last().unwrap();
        prop_assert!(*last >= capacity);
        prop_assert!(earlier.iter().all(|s| *s < capacity));
        prop_assert_eq!(report.final_size, *last);
        prop_assert_eq!(report.final_capacity, capacity);
        prop_assert_eq!(runtime.allocations(), sizes);
    }

    /// Property: the search ends within one round per bit of the capacity
    #[test]
    fn prop_search_terminates(capacity in 1usize..(1 << 20)) {
        let runtime = ScriptedRuntime::new(capacity);
        let mut prober = Prober::new(&runtime, ProbeConfig::with_initial_size(1), buffers()).unwrap();
        let report = prober.run().unwrap();

        let bits = (usize::BITS - capacity.leading_zeros()) as usize;
        prop_assert!(report.rounds.len() <= bits + 1);
    }

    /// Property: a snapshot never reports a collection against itself
    #[test]
    fn prop_occurred_is_reflexive_false(
        counts in proptest::collection::btree_map("[a-z ]{1,12}", any::<u64>(), 0..8)
    ) {
        let counts: BTreeMap<String, u64> = counts;
        let snapshot = CollectorSnapshot::from_counts(counts);
        prop_assert!(!detector::occurred(&snapshot, &snapshot));
    }

    /// Property: a bumped count is always detected
    #[test]
    fn prop_bumped_count_is_detected(
        counts in proptest::collection::btree_map("[a-z]{1,8}", 0u64..1_000_000, 1..8),
        pick in any::<prop::sample::Index>(),
    ) {
        let bumped = pick.get(&counts.keys().cloned().collect::<Vec<_>>()).clone();
        let before = CollectorSnapshot::from_counts(counts.clone());
        let after = CollectorSnapshot::from_counts(
            counts.into_iter().map(|(k, v)| if k == bumped { (k, v + 1) } else { (k, v) }),
        );
        prop_assert!(detector::occurred(&before, &after));
        prop_assert_eq!(
            detector::advanced_collector(&before, &after).map(|id| id.as_str().to_string()),
            Some(bumped)
        );
    }

    /// Property: freshly allocated blocks are zero-filled
    #[test]
    fn prop_fresh_blocks_checksum_to_zero(size in 0usize..(256 * 1024)) {
        let heap = GenerationalHeap::new(HeapConfig::default()).unwrap();
        prop_assert!(workload::allocate(&heap, size).is_ok());

        let block = heap.allocate_bytes(size).unwrap();
        prop_assert_eq!(block.len(), size);
        prop_assert_eq!(workload::checksum(&block), 0);
    }
}
