//! Kani bounded proof harnesses for the lane kernels.
//!
//! The proptest suites sample; these harnesses cover every input of a small
//! group. All code here is behind `#[cfg(kani)]` and invisible to normal
//! builds.

use super::bitonic;
use super::collision;
use super::collision_mask;
use crate::compare::{GreaterThan, LessThan};

// ════════════════════════════════════════════════════════════════════════════
// Network
// ════════════════════════════════════════════════════════════════════════════

/// KANI-SORT-001: the network sorts any 4 lanes ascending.
/// Strategy: exhaustive
/// Bound: 4 lanes
#[kani::proof]
#[kani::unwind(5)]
fn verify_sort_ascending() {
    const N: usize = 4;
    let mut lanes: [u8; N] = kani::any();
    bitonic::bitonic_sort_scalar::<u8, LessThan>(&mut lanes);

    for i in 1..N {
        assert!(
            lanes[i - 1] <= lanes[i],
            "KANI-SORT-001: lanes[{}] > lanes[{}]",
            i - 1,
            i
        );
    }
}

/// KANI-SORT-002: the network output is a permutation of its input.
/// Strategy: exhaustive
/// Bound: 4 lanes
#[kani::proof]
#[kani::unwind(5)]
fn verify_sort_permutation() {
    const N: usize = 4;
    let input: [u8; N] = kani::any();
    let mut lanes = input;
    bitonic::bitonic_sort_scalar::<u8, GreaterThan>(&mut lanes);

    for i in 0..N {
        let before = input.iter().filter(|&&x| x == input[i]).count();
        let after = lanes.iter().filter(|&&x| x == input[i]).count();
        assert!(before == after, "KANI-SORT-002: multiplicity of lane {} changed", i);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Predicate and mask
// ════════════════════════════════════════════════════════════════════════════

/// KANI-COL-001: the predicate equals the pairwise brute-force check.
/// Strategy: exhaustive
/// Bound: 4 lanes
#[kani::proof]
#[kani::unwind(5)]
fn verify_collision_matches_pairwise() {
    const N: usize = 4;
    let lanes: [u8; N] = kani::any();

    let mut brute = false;
    for i in 0..N {
        for j in i + 1..N {
            brute |= lanes[i] == lanes[j];
        }
    }
    assert!(
        collision::has_collision_scalar(&lanes) == brute,
        "KANI-COL-001: predicate disagrees with pairwise check"
    );
}

/// KANI-MASK-001: every set bit collides with some clear bit.
/// Strategy: exhaustive
/// Bound: 4 lanes
#[kani::proof]
#[kani::unwind(5)]
fn verify_mask_sound() {
    const N: usize = 4;
    let lanes: [u8; N] = kani::any();
    let mask = collision_mask::collision_mask_scalar(&lanes);

    assert!(mask >> N == 0, "KANI-MASK-001: bit outside the group");
    for i in 0..N {
        if mask >> i & 1 == 1 {
            let witness = (0..N).any(|j| mask >> j & 1 == 0 && lanes[j] == lanes[i]);
            assert!(witness, "KANI-MASK-001: lane {} has no clear partner", i);
        }
    }
}

/// KANI-MASK-002: the mask is non-zero exactly when the predicate fires.
/// Strategy: exhaustive
/// Bound: 4 lanes
#[kani::proof]
#[kani::unwind(5)]
fn verify_mask_agrees_with_predicate() {
    const N: usize = 4;
    let lanes: [u8; N] = kani::any();
    assert!(
        (collision_mask::collision_mask_scalar(&lanes) != 0)
            == collision::has_collision_scalar(&lanes),
        "KANI-MASK-002: mask and predicate disagree"
    );
}
