//! Lane-group primitives.
//!
//! A lane group is a fixed set of lanes executing the same program in
//! lockstep. The kernels only ever talk to each other through the
//! collectives below; a substrate provides them either natively (a GPU
//! warp) or by emulation ([`threaded`]).
//!
//! Every method is collective: all lanes of the group must call it, in the
//! same program order, with the same value type. A lane that skips a
//! collective leaves the others blocked.

use crate::group::{GroupSize, LaneMask};

pub mod threaded;

/// Register-sized data a lane can hand to another lane.
pub trait LaneValue: Copy + Send + 'static {}

impl<T: Copy + Send + 'static> LaneValue for T {}

/// The per-lane view of a lane group.
pub trait LaneGroup {
    /// This lane's rank, `0..group_size`. Stable for the whole launch.
    fn lane_id(&self) -> usize;

    fn group_size(&self) -> GroupSize;

    /// Butterfly exchange: send `value` to lane `lane_id ^ lane_mask` and
    /// return the value that lane sent back.
    ///
    /// `lane_mask` must be below the group size so every lane has a partner.
    fn exchange_xor<T: LaneValue>(&self, value: T, lane_mask: usize) -> T;

    /// Receive the value held by lane `lane_id - 1`. Lane 0 gets its own.
    fn shift_from_lower_neighbor<T: LaneValue>(&self, value: T) -> T;

    /// Group-wide OR of a predicate; every lane sees the same result.
    fn any(&self, predicate: bool) -> bool;

    /// Group-wide bitwise OR; every lane sees the same result.
    fn reduce_or(&self, contribution: LaneMask) -> LaneMask;
}
