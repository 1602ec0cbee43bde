//! Group sizes, lane masks and lane-id bit helpers.

use serde::{Deserialize, Serialize};

use crate::error::LaneError;

/// Lanes in a hardware warp.
pub const WARP_SIZE: usize = 32;

/// Largest group a [`LaneMask`] can describe.
pub const MAX_GROUP_SIZE: usize = LaneMask::BITS as usize;

/// One bit per lane, indexed by original lane id.
pub type LaneMask = u64;

/// A validated lane-group cardinality: a power of two in `1..=64`.
///
/// Construction is the only place group sizes are checked; every kernel and
/// substrate downstream trusts the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct GroupSize(usize);

impl GroupSize {
    /// The canonical 32-lane warp.
    pub const WARP: Self = Self(WARP_SIZE);

    /// Validate a lane count.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError::InvalidGroupSize`] unless `lanes` is a power of
    /// two no larger than [`MAX_GROUP_SIZE`].
    pub fn new(lanes: usize) -> Result<Self, LaneError> {
        if lanes.is_power_of_two() && lanes <= MAX_GROUP_SIZE {
            Ok(Self(lanes))
        } else {
            Err(LaneError::InvalidGroupSize {
                lanes,
                max: MAX_GROUP_SIZE,
            })
        }
    }

    pub fn lanes(self) -> usize {
        self.0
    }

    /// Number of bitonic stages, `log2(lanes)`.
    pub fn log2(self) -> u32 {
        self.0.trailing_zeros()
    }

    /// Mask with one bit set for every lane in the group.
    pub fn full_mask(self) -> LaneMask {
        if self.0 == MAX_GROUP_SIZE {
            LaneMask::MAX
        } else {
            (1 << self.0) - 1
        }
    }
}

impl Default for GroupSize {
    fn default() -> Self {
        Self::WARP
    }
}

impl TryFrom<usize> for GroupSize {
    type Error = LaneError;

    fn try_from(lanes: usize) -> Result<Self, Self::Error> {
        Self::new(lanes)
    }
}

impl From<GroupSize> for usize {
    fn from(size: GroupSize) -> Self {
        size.0
    }
}

impl std::fmt::Display for GroupSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Extract bit `pos` of a lane id.
#[inline]
pub fn get_bit(value: usize, pos: u32) -> bool {
    (value >> pos) & 1 == 1
}

/// Mask with the low `count` lane bits set.
#[inline]
pub fn low_lanes(count: usize) -> LaneMask {
    if count >= MAX_GROUP_SIZE {
        LaneMask::MAX
    } else {
        (1 << count) - 1
    }
}
