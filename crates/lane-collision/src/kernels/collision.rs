//! Collision predicate: do any two lanes hold equal values?
//!
//! Sort ascending, compare each lane with its sorted lower neighbor, OR the
//! per-lane flags across the group. Equal values are adjacent in any total
//! order, so the adjacent check is both necessary and sufficient.

use super::bitonic::{bitonic_sort_scalar, warp_bitonic_sort};
use super::ptx::{declare_registers, KeyRegs, PtxBuilder, RegType};
use crate::compare::LessThan;
use crate::lanes::{LaneGroup, LaneValue};

// ────────────────────────────────────────────────────────────────────────────
// Scalar implementation
// ────────────────────────────────────────────────────────────────────────────

/// Per-lane duplicate flags over already sorted lanes.
///
/// Lane `k` reads lane `k - 1`; lane 0 reads itself and is excluded, since
/// its self-comparison would always match. A duplicated lane-0 value is
/// picked up by lane 1.
pub fn lower_neighbor_flags<T: PartialEq>(sorted: &[T]) -> Vec<bool> {
    (0..sorted.len())
        .map(|k| {
            let lower = &sorted[k.saturating_sub(1)];
            *lower == sorted[k] && k != 0
        })
        .collect()
}

/// Scalar reference of the collision predicate.
///
/// # Panics
///
/// Panics if `values.len()` is not a power of two in `1..=64`.
pub fn has_collision_scalar<T: Copy + PartialOrd>(values: &[T]) -> bool {
    let mut lanes = values.to_vec();
    bitonic_sort_scalar::<T, LessThan>(&mut lanes);
    lower_neighbor_flags(&lanes).into_iter().any(|dup| dup)
}

// ────────────────────────────────────────────────────────────────────────────
// Per-lane implementation
// ────────────────────────────────────────────────────────────────────────────

/// Per-lane collision predicate. Every lane returns the same answer.
pub fn warp_has_collision<T, L>(lane: &L, value: T) -> bool
where
    T: LaneValue + PartialOrd,
    L: LaneGroup,
{
    let sorted = warp_bitonic_sort::<T, LessThan, L>(lane, value);
    let lower = lane.shift_from_lower_neighbor(sorted);
    let dup = lower == sorted && lane.lane_id() != 0;
    lane.any(dup)
}

// ────────────────────────────────────────────────────────────────────────────
// PTX implementation
// ────────────────────────────────────────────────────────────────────────────

/// PTX assembly for the 32-lane collision predicate over `s32` values.
///
/// Lane `i` loads `values[i]` and writes the warp-wide answer (0 or 1) to
/// `has_duplicate[i]`. Sorting uses `shfl.sync.bfly.b32`, the neighbor read
/// `shfl.sync.up.b32`, and the reduction `vote.sync.any.pred`.
pub fn collision_ptx() -> String {
    let mut b = PtxBuilder::kernel(
        "warp_has_collision_kernel",
        &["values_ptr", "has_duplicate_ptr"],
    );
    declare_registers(&mut b);
    b.load_lane_value("values_ptr", "%k");
    b.sort_network(KeyRegs {
        regs: &[("%k", RegType::S32)],
    });
    b.lower_neighbor_duplicate("%k");
    b.comment("any lane with a duplicate makes the whole warp report one")
        .line("vote.sync.any.pred %pany, %pdup, 0xffffffff;")
        .line("selp.u32 %res, 1, 0, %pany;")
        .line("ld.param.u64 %rd_out, [has_duplicate_ptr];")
        .line("add.u64 %rd_addr, %rd_out, %rd_off;")
        .line("st.global.u32 [%rd_addr], %res;");
    b.finish()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GroupSize;
    use crate::lanes::threaded::launch;
    use proptest::prelude::*;

    fn distinct_warp() -> Vec<i32> {
        (0..32).map(|i| i * 37 - 500).collect()
    }

    // ── Scalar known-answer tests ────────────────────────────────────────

    #[test]
    fn test_all_distinct() {
        assert!(!has_collision_scalar(&distinct_warp()));
    }

    #[test]
    fn test_all_equal() {
        assert!(has_collision_scalar(&[9u32; 32]));
    }

    #[test]
    fn test_last_equals_first() {
        let mut v = distinct_warp();
        v[31] = v[0];
        assert!(has_collision_scalar(&v));
    }

    #[test]
    fn test_duplicate_of_smallest_value() {
        // the smallest value sorts to lane 0; lane 1 must catch the repeat
        let mut v = distinct_warp();
        let min = *v.iter().min().unwrap();
        v[20] = min;
        assert!(has_collision_scalar(&v));
    }

    #[test]
    fn test_single_lane_never_collides() {
        assert!(!has_collision_scalar(&[1i8]));
    }

    #[test]
    fn test_lower_neighbor_flags_exclude_lane_zero() {
        assert_eq!(
            lower_neighbor_flags(&[4, 4, 5, 6, 6, 6]),
            vec![false, true, false, false, true, true]
        );
    }

    #[test]
    fn test_float_values() {
        assert!(has_collision_scalar(&[0.5f32, -1.0, 0.5, 2.0]));
        assert!(!has_collision_scalar(&[0.5f32, -1.0, 0.25, 2.0]));
    }

    #[test]
    fn test_nan_breaks_adjacency() {
        // lanes 0 and 1 both take the NaN in the first step; the 1.0 pair is lost
        assert!(!has_collision_scalar(&[1.0f32, f32::NAN, 1.0, 2.0]));
    }

    // ── Property-based tests ─────────────────────────────────────────────

    proptest! {
        #[test]
        fn prop_collision_matches_bruteforce(
            v in proptest::collection::vec(0u8..40, 32)
        ) {
            let brute = (0..v.len()).any(|i| (i + 1..v.len()).any(|j| v[i] == v[j]));
            prop_assert_eq!(has_collision_scalar(&v), brute);
        }

        #[test]
        fn prop_collision_invariant_under_rotation(
            v in proptest::collection::vec(0u16..100, 16),
            shift in 0usize..16
        ) {
            let mut rotated = v.clone();
            rotated.rotate_left(shift);
            prop_assert_eq!(has_collision_scalar(&v), has_collision_scalar(&rotated));
        }
    }

    // ── Per-lane parity tests ────────────────────────────────────────────

    #[test]
    fn test_warp_collision_is_broadcast() {
        let mut v = distinct_warp();
        let none = launch(GroupSize::WARP, &v, |lane, x| warp_has_collision(lane, x)).unwrap();
        assert!(none.iter().all(|&r| !r));

        v[13] = v[2];
        let some = launch(GroupSize::WARP, &v, |lane, x| warp_has_collision(lane, x)).unwrap();
        assert!(some.iter().all(|&r| r));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_warp_collision_parity(
            v in proptest::collection::vec(0i32..12, 8)
        ) {
            let size = GroupSize::new(8).unwrap();
            let got = launch(size, &v, |lane, x| warp_has_collision(lane, x)).unwrap();
            let expected = has_collision_scalar(&v);
            prop_assert!(got.iter().all(|&r| r == expected));
        }
    }

    // ── PTX structural tests ─────────────────────────────────────────────

    #[test]
    fn test_collision_ptx_entry() {
        let ptx = collision_ptx();
        assert!(ptx.contains(".entry warp_has_collision_kernel"));
        assert!(ptx.contains(".param .u64 has_duplicate_ptr"));
    }

    #[test]
    fn test_collision_ptx_neighbor_and_vote() {
        let ptx = collision_ptx();
        assert!(ptx.contains("shfl.sync.up.b32 %lower, %k, 1, 0, 0xffffffff;"));
        assert!(ptx.contains("setp.ne.u32 %plane, %lid, 0;"));
        assert!(ptx.contains("vote.sync.any.pred"));
    }

    #[test]
    fn test_collision_ptx_balanced_braces() {
        let ptx = collision_ptx();
        assert_eq!(ptx.matches('{').count(), ptx.matches('}').count());
        assert!(ptx.contains("ret;"));
    }
}
