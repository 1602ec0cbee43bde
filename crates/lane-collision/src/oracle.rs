//! Brute-force O(N²) reference for duplicate detection.
//!
//! Used as the test oracle and by the self-test. Nothing here touches the
//! lane network.

use crate::group::LaneMask;

/// `flags[i]` is true iff some other lane holds a value equal to lane `i`'s.
pub fn duplicate_flags<T: PartialEq>(values: &[T]) -> Vec<bool> {
    (0..values.len())
        .map(|i| (0..values.len()).any(|j| j != i && values[j] == values[i]))
        .collect()
}

pub fn has_duplicates<T: PartialEq>(values: &[T]) -> bool {
    duplicate_flags(values).into_iter().any(|d| d)
}

/// Every lane that collides with at least one other lane.
pub fn colliding_lanes<T: PartialEq>(values: &[T]) -> LaneMask {
    to_mask(&duplicate_flags(values))
}

/// The mask the two-pass protocol must produce: every colliding lane except
/// the lowest lane id of its group of equal values.
pub fn expected_mask<T: PartialEq>(values: &[T]) -> LaneMask {
    let flags: Vec<bool> = (0..values.len())
        .map(|i| (0..i).any(|j| values[j] == values[i]))
        .collect();
    to_mask(&flags)
}

/// Number of distinct values that appear on more than one lane.
pub fn count_duplicated_values<T: PartialEq>(values: &[T]) -> usize {
    (0..values.len())
        .filter(|&i| {
            let first = (0..i).all(|j| values[j] != values[i]);
            first && (i + 1..values.len()).any(|j| values[j] == values[i])
        })
        .count()
}

/// Every set bit collides with some lane whose bit is clear, and no bit is
/// set outside the input.
pub fn mask_is_sound<T: PartialEq>(values: &[T], mask: LaneMask) -> bool {
    let n = values.len();
    if n < LaneMask::BITS as usize && mask >> n != 0 {
        return false;
    }
    (0..n).filter(|&i| bit(mask, i)).all(|i| {
        (0..n).any(|j| !bit(mask, j) && values[j] == values[i])
    })
}

/// `mask | (mask >> 1)`: the set of mutually colliding lanes, exact when
/// each group of equal values occupies a contiguous run of lane ids.
pub fn expand_mask(mask: LaneMask) -> LaneMask {
    mask | (mask >> 1)
}

fn bit(mask: LaneMask, lane: usize) -> bool {
    (mask >> lane) & 1 == 1
}

fn to_mask(flags: &[bool]) -> LaneMask {
    flags
        .iter()
        .enumerate()
        .filter(|(_, &f)| f)
        .fold(0, |mask, (lane, _)| mask | 1 << lane)
}
