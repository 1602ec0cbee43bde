//! Comparator strategies and composite sort keys for the ordering network.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LaneError;

/// Strict ordering predicate used by the compare-exchange step.
///
/// `compare(lhs, rhs)` is true when `lhs` belongs strictly before `rhs`.
/// The network requires a strict weak order. With incomparable values
/// (NaN) the two lanes of a pair can both keep or both adopt the same
/// item, so the output is neither sorted nor a permutation, and a repeated
/// non-NaN value separated by a NaN can go undetected. The entry points in
/// [`crate::dispatch`] therefore require `Ord`.
pub trait Comparator<T: ?Sized> {
    fn compare(lhs: &T, rhs: &T) -> bool;
}

/// Ascending order: lane 0 ends up holding the smallest value.
#[derive(Debug, Clone, Copy, Default)]
pub struct LessThan;

/// Descending order: lane 0 ends up holding the largest value.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreaterThan;

impl<T: PartialOrd + ?Sized> Comparator<T> for LessThan {
    #[inline]
    fn compare(lhs: &T, rhs: &T) -> bool {
        lhs < rhs
    }
}

impl<T: PartialOrd + ?Sized> Comparator<T> for GreaterThan {
    #[inline]
    fn compare(lhs: &T, rhs: &T) -> bool {
        lhs > rhs
    }
}

/// A value carried together with a secondary rank.
///
/// Ordered lexicographically: by `key`, then by `rank`. With distinct ranks
/// the order is total even when keys repeat, which makes the network's
/// output permutation deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyRank<K, R> {
    pub key: K,
    pub rank: R,
}

impl<K, R> KeyRank<K, R> {
    pub fn new(key: K, rank: R) -> Self {
        Self { key, rank }
    }
}

/// A lane value, or a padding sentinel that orders above every value.
///
/// Lets a partially filled group run the full power-of-two network: the
/// sentinels sort to the top lanes. Each sentinel carries the lane it pads,
/// so sentinels never collide with each other or with a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Padded<T> {
    Lane(T),
    Sentinel(usize),
}

impl<T> Padded<T> {
    pub fn into_lane(self) -> Option<T> {
        match self {
            Padded::Lane(v) => Some(v),
            Padded::Sentinel(_) => None,
        }
    }
}

/// Host-facing choice of comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = LaneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascending" | "asc" => Ok(Self::Ascending),
            "descending" | "desc" => Ok(Self::Descending),
            other => Err(LaneError::UnknownSortOrder(other.to_string())),
        }
    }
}
