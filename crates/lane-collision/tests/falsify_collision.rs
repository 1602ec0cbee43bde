//! Falsification tests for the lane network, collision predicate and
//! collision mask, driven through the public dispatch entry points.
//!
//! Each test targets an invariant that a common bug class would break:
//! a wrong direction bit, a lane 0 self-match, a missing tie-breaker, a
//! padding lane leaking into the result.

mod common;

use lane_collision::compare::SortOrder;
use lane_collision::oracle::{
    colliding_lanes, count_duplicated_values, expand_mask, expected_mask, has_duplicates,
    mask_is_sound,
};
use lane_collision::{check_duplicates, collision_mask, has_collision, sort_lanes};
use lane_collision::{Backend, GroupSize};
use proptest::prelude::*;

// ============================================================================
// Network (FALSIFY-SORT-001 through FALSIFY-SORT-003)
// ============================================================================

proptest! {
    /// FALSIFY-SORT-001: Ordering
    /// Prediction: ascending output is non-decreasing for any padded input
    /// If fails: direction bit or partner mask is wrong for some stage
    #[test]
    fn falsify_sort_001_ordering(
        v in proptest::collection::vec(-50i64..50, 1..=32)
    ) {
        let sorted = sort_lanes(&v, GroupSize::WARP, Backend::Scalar, SortOrder::Ascending).unwrap();
        common::assert_ascending(&sorted);
    }

    /// FALSIFY-SORT-002: Permutation
    /// Prediction: output holds exactly the input multiset, sentinels dropped
    /// If fails: both pair members adopted the same item, or padding leaked
    #[test]
    fn falsify_sort_002_permutation(
        v in proptest::collection::vec(0u16..20, 1..=16)
    ) {
        let size = GroupSize::new(16).unwrap();
        let sorted = sort_lanes(&v, size, Backend::Scalar, SortOrder::Descending).unwrap();
        prop_assert_eq!(common::sorted_copy(&sorted), common::sorted_copy(&v));
        prop_assert!(sorted.windows(2).all(|w| w[0] >= w[1]));
    }
}

/// FALSIFY-SORT-003: Every group size
/// Prediction: a reversed run sorts correctly on each supported width
/// If fails: the stage generator is only right for 32 lanes
#[test]
fn falsify_sort_003_every_group_size() {
    for size in common::all_group_sizes() {
        let v: Vec<i64> = (0..size.lanes() as i64).rev().collect();
        let sorted = sort_lanes(&v, size, Backend::Scalar, SortOrder::Ascending).unwrap();
        let expected: Vec<i64> = (0..size.lanes() as i64).collect();
        assert_eq!(sorted, expected, "FALSIFY-SORT-003 failed at {size} lanes");
    }
}

// ============================================================================
// Predicate (FALSIFY-COL-001 through FALSIFY-COL-003)
// ============================================================================

proptest! {
    /// FALSIFY-COL-001: Brute-force agreement
    /// Prediction: predicate equals the O(N^2) pairwise check
    /// If fails: adjacency check misses a pair or lane 0 matches itself
    #[test]
    fn falsify_col_001_bruteforce(
        v in proptest::collection::vec(0u8..40, 1..=32)
    ) {
        let got = has_collision(&v, GroupSize::WARP, Backend::Scalar).unwrap();
        prop_assert_eq!(got, has_duplicates(&v));
    }

    /// FALSIFY-COL-002: Broadcast
    /// Prediction: every real lane observes the same answer
    /// If fails: reduction is not group-wide
    #[test]
    fn falsify_col_002_broadcast(
        v in proptest::collection::vec(0i32..10, 1..=8)
    ) {
        let size = GroupSize::new(8).unwrap();
        let views = check_duplicates(&v, size, Backend::Threaded).unwrap();
        prop_assert_eq!(views.len(), v.len());
        prop_assert!(views.iter().all(|&d| d == has_duplicates(&v)));
    }
}

/// FALSIFY-COL-003: Distinct full warp
/// Prediction: 32 distinct values never collide on either backend
/// If fails: the first lane compares against itself
#[test]
fn falsify_col_003_distinct_warp() {
    let v = common::distinct_values(32);
    for backend in [Backend::Scalar, Backend::Threaded] {
        assert!(
            !has_collision(&v, GroupSize::WARP, backend).unwrap(),
            "FALSIFY-COL-003 failed on {backend}"
        );
    }
}

// ============================================================================
// Mask (FALSIFY-MASK-001 through FALSIFY-MASK-006)
// ============================================================================

proptest! {
    /// FALSIFY-MASK-001: Soundness
    /// Prediction: each set bit collides with a lane whose bit is clear
    /// If fails: a whole group was flagged, leaving no representative
    #[test]
    fn falsify_mask_001_soundness(
        v in proptest::collection::vec(0u8..12, 1..=32)
    ) {
        let mask = collision_mask(&v, GroupSize::WARP, Backend::Scalar).unwrap();
        prop_assert!(mask_is_sound(&v, mask), "mask {:#x} unsound for {:?}", mask, v);
    }

    /// FALSIFY-MASK-002: Lowest lane representative
    /// Prediction: mask is every colliding lane except the lowest of its group
    /// If fails: first-pass ties are not broken by origin lane
    #[test]
    fn falsify_mask_002_lowest_representative(
        v in proptest::collection::vec(0u8..12, 1..=32)
    ) {
        let mask = collision_mask(&v, GroupSize::WARP, Backend::Scalar).unwrap();
        prop_assert_eq!(mask, expected_mask(&v));
    }

    /// FALSIFY-MASK-003: Flag count
    /// Prediction: popcount(mask) = colliding lanes - duplicated values
    /// If fails: flags are routed to the wrong origin lane
    #[test]
    fn falsify_mask_003_flag_count(
        v in proptest::collection::vec(0u8..8, 1..=16)
    ) {
        let mask = collision_mask(&v, GroupSize::new(16).unwrap(), Backend::Scalar).unwrap();
        let members = colliding_lanes(&v).count_ones() as usize;
        prop_assert_eq!(mask.count_ones() as usize, members - count_duplicated_values(&v));
    }

    /// FALSIFY-MASK-006: Permutation invariance
    /// Prediction: moving values between lanes keeps the predicate and popcount(mask)
    /// If fails: the mask depends on lane placement beyond the choice of representative
    #[test]
    fn falsify_mask_006_permutation_invariance(
        v in proptest::collection::vec(0u8..10, 16),
        shift in 0usize..16
    ) {
        let size = GroupSize::new(16).unwrap();
        let mut rotated = v.clone();
        rotated.rotate_left(shift);
        let a = collision_mask(&v, size, Backend::Scalar).unwrap();
        let b = collision_mask(&rotated, size, Backend::Scalar).unwrap();
        prop_assert_eq!(a.count_ones(), b.count_ones());
        prop_assert_eq!(
            has_collision(&v, size, Backend::Scalar).unwrap(),
            has_collision(&rotated, size, Backend::Scalar).unwrap()
        );
    }

    /// FALSIFY-MASK-004: Backend parity
    /// Prediction: the threaded substrate builds the scalar mask
    /// If fails: exchange or shift collective misroutes a value
    #[test]
    fn falsify_mask_004_backend_parity(
        v in proptest::collection::vec(0i64..6, 1..=8)
    ) {
        let size = GroupSize::new(8).unwrap();
        let scalar = collision_mask(&v, size, Backend::Scalar).unwrap();
        let threaded = collision_mask(&v, size, Backend::Threaded).unwrap();
        prop_assert_eq!(scalar, threaded);
    }
}

/// FALSIFY-MASK-005: Expansion gap
/// Prediction: expand_mask is exact for contiguous groups and not otherwise
/// If fails: the documented limitation of the expansion changed
#[test]
fn falsify_mask_005_expansion_gap() {
    let mut contiguous = common::distinct_values(32);
    contiguous[5] = contiguous[4];
    contiguous[6] = contiguous[4];
    let mask = collision_mask(&contiguous, GroupSize::WARP, Backend::Scalar).unwrap();
    assert_eq!(expand_mask(mask), colliding_lanes(&contiguous));

    let mut scattered = common::distinct_values(32);
    scattered[20] = scattered[3];
    let mask = collision_mask(&scattered, GroupSize::WARP, Backend::Scalar).unwrap();
    assert_eq!(mask, 1 << 20);
    assert_ne!(expand_mask(mask), colliding_lanes(&scattered));
}
