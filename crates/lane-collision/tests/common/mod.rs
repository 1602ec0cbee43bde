//! Shared helpers for the lane falsification suites.

#![allow(dead_code)]

use lane_collision::GroupSize;

/// Every valid group size, smallest first.
pub fn all_group_sizes() -> Vec<GroupSize> {
    [1, 2, 4, 8, 16, 32, 64]
        .into_iter()
        .map(|n| GroupSize::new(n).unwrap())
        .collect()
}

/// `n` distinct values with a stride that scatters them across lanes.
pub fn distinct_values(n: usize) -> Vec<i64> {
    (0..n as i64).map(|i| (i * 7919) % 10_007 - 5_000).collect()
}

/// Asserts the slice is in non-decreasing order.
pub fn assert_ascending<T: PartialOrd + std::fmt::Debug>(slice: &[T]) {
    for (i, pair) in slice.windows(2).enumerate() {
        assert!(
            pair[0] <= pair[1],
            "Lanes [{i}] and [{}] out of order: {:?} > {:?}",
            i + 1,
            pair[0],
            pair[1]
        );
    }
}

/// Sorted copy, for permutation checks.
pub fn sorted_copy<T: Ord + Clone>(slice: &[T]) -> Vec<T> {
    let mut v = slice.to_vec();
    v.sort();
    v
}
