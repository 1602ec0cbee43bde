//! Collision mask: which lanes collide with a lane that stays unflagged.
//!
//! Two passes of the same network. The first sorts `(value, lane)` pairs so
//! equal values become adjacent while still remembering where they came
//! from; each sorted lane flags a match with its lower neighbor. The second
//! sorts `(origin lane, flag)` pairs, which routes every flag back to the
//! lane that produced the value. A final OR-fold turns the flags into bits.
//!
//! Ties in the first pass break by origin lane, so within every group of
//! equal values the lowest lane id is the unflagged representative and all
//! other members of the group are flagged. Any set bit therefore collides
//! with a clear bit, which is enough to serialize conflicting lanes.

use super::bitonic::{bitonic_sort_scalar, warp_bitonic_sort};
use super::collision::lower_neighbor_flags;
use super::ptx::{declare_registers, KeyRegs, PtxBuilder, RegType};
use crate::compare::{KeyRank, LessThan};
use crate::group::LaneMask;
use crate::lanes::{LaneGroup, LaneValue};

// ────────────────────────────────────────────────────────────────────────────
// Scalar implementation
// ────────────────────────────────────────────────────────────────────────────

/// Scalar reference of the two-pass protocol, stopping before the fold.
///
/// Entry `i` is the duplicate flag routed back to original lane `i`.
///
/// # Panics
///
/// Panics if `values.len()` is not a power of two in `1..=64`.
pub fn origin_duplicate_flags_scalar<T: Copy + PartialOrd>(values: &[T]) -> Vec<bool> {
    let mut pairs: Vec<KeyRank<T, usize>> = values
        .iter()
        .enumerate()
        .map(|(lane, &v)| KeyRank::new(v, lane))
        .collect();
    bitonic_sort_scalar::<_, LessThan>(&mut pairs);

    let keys: Vec<T> = pairs.iter().map(|p| p.key).collect();
    let mut routed: Vec<(usize, bool)> = pairs
        .iter()
        .zip(lower_neighbor_flags(&keys))
        .map(|(p, dup)| (p.rank, dup))
        .collect();
    bitonic_sort_scalar::<_, LessThan>(&mut routed);

    debug_assert!(routed.iter().enumerate().all(|(lane, &(origin, _))| origin == lane));
    routed.into_iter().map(|(_, dup)| dup).collect()
}

/// Scalar reference of the collision mask.
///
/// # Panics
///
/// Panics if `values.len()` is not a power of two in `1..=64`.
pub fn collision_mask_scalar<T: Copy + PartialOrd>(values: &[T]) -> LaneMask {
    origin_duplicate_flags_scalar(values)
        .into_iter()
        .enumerate()
        .fold(0, |mask, (lane, dup)| if dup { mask | 1 << lane } else { mask })
}

// ────────────────────────────────────────────────────────────────────────────
// Per-lane implementation
// ────────────────────────────────────────────────────────────────────────────

/// Per-lane collision mask. Every lane returns the same mask.
pub fn warp_collision_mask<T, L>(lane: &L, value: T) -> LaneMask
where
    T: LaneValue + PartialOrd,
    L: LaneGroup,
{
    let id = lane.lane_id();

    let sorted = warp_bitonic_sort::<_, LessThan, L>(lane, KeyRank::new(value, id));
    let lower = lane.shift_from_lower_neighbor(sorted.key);
    let dup = lower == sorted.key && id != 0;

    // second pass: origin lane ids are distinct, so lane `id` receives its own flag
    let (origin, own_dup) = warp_bitonic_sort::<_, LessThan, L>(lane, (sorted.rank, dup));
    debug_assert_eq!(origin, id);

    lane.reduce_or(if own_dup { 1 << id } else { 0 })
}

// ────────────────────────────────────────────────────────────────────────────
// PTX implementation
// ────────────────────────────────────────────────────────────────────────────

/// PTX assembly for the 32-lane collision mask over `s32` values.
///
/// Two unrolled networks: `(value, lane)` then `(origin, flag)`, each a
/// pair of `shfl.sync.bfly.b32` per step with a lexicographic compare. The
/// fold is a single `redux.sync.or.b32`; lane 0 writes `*duplicate_mask`.
pub fn collision_mask_ptx() -> String {
    let mut b = PtxBuilder::kernel(
        "warp_collision_mask_kernel",
        &["values_ptr", "duplicate_mask_ptr"],
    );
    declare_registers(&mut b);
    b.load_lane_value("values_ptr", "%k");
    b.line("mov.u32 %r, %lid;");

    b.comment("pass 1: sort (value, origin lane)");
    b.sort_network(KeyRegs {
        regs: &[("%k", RegType::S32), ("%r", RegType::U32)],
    });
    b.lower_neighbor_duplicate("%k");
    b.line("selp.u32 %d, 1, 0, %pdup;");

    b.comment("pass 2: sort (origin lane, flag) back to the origin");
    b.sort_network(KeyRegs {
        regs: &[("%r", RegType::U32), ("%d", RegType::U32)],
    });

    b.comment("fold flags into the mask, lane 0 stores it")
        .line("mov.u32 %one, 1;")
        .line("shl.b32 %bit, %one, %lid;")
        .line("setp.ne.u32 %pdup, %d, 0;")
        .line("selp.b32 %bit, %bit, 0, %pdup;")
        .line("redux.sync.or.b32 %m, %bit, 0xffffffff;")
        .line("ld.param.u64 %rd_out, [duplicate_mask_ptr];")
        .line("setp.eq.u32 %plane, %lid, 0;")
        .line("@%plane st.global.u32 [%rd_out], %m;");
    b.finish()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GroupSize;
    use crate::kernels::collision::has_collision_scalar;
    use crate::lanes::threaded::launch;
    use proptest::prelude::*;

    fn distinct_warp() -> Vec<i32> {
        (0..32).map(|i| 1_000 - i * 13).collect()
    }

    // ── Scalar known-answer tests ────────────────────────────────────────

    #[test]
    fn test_mask_all_distinct() {
        assert_eq!(collision_mask_scalar(&distinct_warp()), 0);
    }

    #[test]
    fn test_mask_last_equals_first() {
        let mut v = distinct_warp();
        v[31] = v[0];
        assert_eq!(collision_mask_scalar(&v), 1 << 31);
    }

    #[test]
    fn test_mask_all_equal() {
        let mask = collision_mask_scalar(&[-7i64; 32]);
        assert_eq!(mask, 0xFFFF_FFFE);
        assert_eq!(mask.count_ones(), 31);
    }

    #[test]
    fn test_mask_tail_duplicates_pattern() {
        for num_dups in 1..32usize {
            let mut v = distinct_warp();
            for lane in 32 - num_dups..32 {
                v[lane] = v[0];
            }
            let expected = (0xFFFF_FFFFu64 << (32 - num_dups)) & 0xFFFF_FFFF;
            assert_eq!(collision_mask_scalar(&v), expected, "num_dups={num_dups}");
        }
    }

    #[test]
    fn test_mask_disjoint_pairs() {
        let mut v = distinct_warp();
        v[10] = v[3];
        v[20] = v[5];
        assert_eq!(collision_mask_scalar(&v), (1 << 10) | (1 << 20));
    }

    #[test]
    fn test_mask_representative_is_lowest_lane() {
        let v = [5, 1, 5, 1, 5, 2, 3, 4];
        let flags = origin_duplicate_flags_scalar(&v);
        assert_eq!(
            flags,
            vec![false, false, true, true, true, false, false, false]
        );
    }

    // ── Property-based tests ─────────────────────────────────────────────

    proptest! {
        #[test]
        fn prop_mask_bits_collide_with_clear_bits(
            v in proptest::collection::vec(0u8..24, 32)
        ) {
            let mask = collision_mask_scalar(&v);
            for i in 0..32 {
                if mask >> i & 1 == 1 {
                    let witness = (0..32).any(|j| mask >> j & 1 == 0 && v[j] == v[i]);
                    prop_assert!(witness, "lane {i} set without a clear colliding lane");
                }
            }
        }

        #[test]
        fn prop_mask_agrees_with_predicate(
            v in proptest::collection::vec(0u8..48, 32)
        ) {
            prop_assert_eq!(collision_mask_scalar(&v) != 0, has_collision_scalar(&v));
        }

        #[test]
        fn prop_mask_flags_all_but_lowest_lane_of_each_group(
            v in proptest::collection::vec(0i16..10, 16)
        ) {
            let mask = collision_mask_scalar(&v);
            for i in 0..v.len() {
                let has_lower_twin = (0..i).any(|j| v[j] == v[i]);
                prop_assert_eq!(mask >> i & 1 == 1, has_lower_twin, "lane {}", i);
            }
        }
    }

    // ── Per-lane parity tests ────────────────────────────────────────────

    #[test]
    fn test_warp_mask_matches_scalar() {
        let mut v = distinct_warp();
        v[7] = v[30];
        v[8] = v[30];
        v[1] = v[2];
        let expected = collision_mask_scalar(&v);
        let got = launch(GroupSize::WARP, &v, |lane, x| warp_collision_mask(lane, x)).unwrap();
        assert!(got.iter().all(|&m| m == expected));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_warp_mask_parity(
            v in proptest::collection::vec(0u32..6, 16)
        ) {
            let size = GroupSize::new(16).unwrap();
            let got = launch(size, &v, |lane, x| warp_collision_mask(lane, x)).unwrap();
            let expected = collision_mask_scalar(&v);
            prop_assert!(got.iter().all(|&m| m == expected));
        }
    }

    // ── PTX structural tests ─────────────────────────────────────────────

    #[test]
    fn test_mask_ptx_entry() {
        let ptx = collision_mask_ptx();
        assert!(ptx.contains(".entry warp_collision_mask_kernel"));
        assert!(ptx.contains(".param .u64 duplicate_mask_ptr"));
    }

    #[test]
    fn test_mask_ptx_two_networks() {
        let ptx = collision_mask_ptx();
        // two passes of 15 steps, two registers exchanged per step
        assert_eq!(ptx.matches("shfl.sync.bfly.b32").count(), 60);
    }

    #[test]
    fn test_mask_ptx_reduction_and_store() {
        let ptx = collision_mask_ptx();
        assert!(ptx.contains("redux.sync.or.b32"));
        assert!(ptx.contains("@%plane st.global.u32"));
    }

    #[test]
    fn test_mask_ptx_balanced_braces() {
        let ptx = collision_mask_ptx();
        assert_eq!(ptx.matches('{').count(), ptx.matches('}').count());
    }
}
