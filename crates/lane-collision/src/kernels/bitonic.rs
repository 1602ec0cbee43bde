//! Bitonic sorting network over a lane group.
//!
//! A group of N lanes is sorted in `log2(N)` stages of block sizes
//! 2, 4, ..., N. Stage `k` runs `k` compare-exchange steps with partner
//! masks `2^(k-1)` down to 1. Both lanes of a pair derive complementary
//! decisions from their own lane id, so the butterfly exchange is the only
//! communication a step needs.

use log::trace;

use super::ptx::{declare_registers, KeyRegs, PtxBuilder, RegType};
use crate::compare::Comparator;
use crate::group::{get_bit, GroupSize};
use crate::lanes::{LaneGroup, LaneValue};

// ────────────────────────────────────────────────────────────────────────────
// Stage generator
// ────────────────────────────────────────────────────────────────────────────

/// One compare-exchange step of the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortStep {
    /// XOR distance to the partner lane.
    pub lane_mask: usize,
    /// Lane-id bit that selects the ascending or descending half of a block.
    pub block_bit: u32,
    /// Lane-id bit that selects the lower or upper member of the pair.
    pub pair_bit: u32,
}

impl SortStep {
    /// Direction bit for `lane`: the lane adopts its partner's item exactly
    /// when `compare(own, partner)` equals this bit.
    #[inline]
    pub fn direction(&self, lane: usize) -> bool {
        get_bit(lane, self.block_bit) ^ get_bit(lane, self.pair_bit)
    }
}

/// All steps of the network for `size`, in execution order.
///
/// For the 32-lane warp this yields the 15 steps
/// `0x01 | 0x02 0x01 | 0x04 0x02 0x01 | 0x08 .. 0x01 | 0x10 .. 0x01`.
/// In the last stage `block_bit == log2(N)`, a bit no lane id has set, so
/// the direction reduces to the pair bit alone.
pub fn network_steps(size: GroupSize) -> impl Iterator<Item = SortStep> {
    (1..=size.log2()).flat_map(|block_bit| {
        (0..block_bit).rev().map(move |pair_bit| SortStep {
            lane_mask: 1 << pair_bit,
            block_bit,
            pair_bit,
        })
    })
}

/// Number of compare-exchange steps, `k(k+1)/2` for `k = log2(N)`.
pub fn step_count(size: GroupSize) -> usize {
    let k = size.log2() as usize;
    k * (k + 1) / 2
}

/// Keep `own` or adopt `partner` for one step.
#[inline]
pub fn compare_exchange<T, C: Comparator<T>>(own: T, partner: T, direction: bool) -> T {
    if C::compare(&own, &partner) == direction {
        partner
    } else {
        own
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scalar implementation
// ────────────────────────────────────────────────────────────────────────────

/// Lockstep reference: advance every lane of `lanes` through the network.
///
/// After the call `lanes[k]` holds the item that belongs at rank `k` under
/// `C`. The slice is only permuted.
///
/// # Panics
///
/// Panics if `lanes.len()` is not a power of two in `1..=64`.
pub fn bitonic_sort_scalar<T: Copy, C: Comparator<T>>(lanes: &mut [T]) {
    let size = super::lane_group_of(lanes);
    let mut registers = lanes.to_vec();

    for step in network_steps(size) {
        registers.copy_from_slice(lanes);
        for (lane, slot) in lanes.iter_mut().enumerate() {
            let partner = registers[lane ^ step.lane_mask];
            *slot = compare_exchange::<T, C>(registers[lane], partner, step.direction(lane));
        }
        trace!(
            "bitonic step: block {} mask {:#x}",
            1u32 << step.block_bit,
            step.lane_mask
        );
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Per-lane implementation
// ────────────────────────────────────────────────────────────────────────────

/// Per-lane bitonic sort: returns the item this lane holds after the
/// network runs across the whole group.
///
/// Every lane of the group must call this with the same `C`.
pub fn warp_bitonic_sort<T, C, L>(lane: &L, mut value: T) -> T
where
    T: LaneValue,
    C: Comparator<T>,
    L: LaneGroup,
{
    let id = lane.lane_id();
    for step in network_steps(lane.group_size()) {
        let partner = lane.exchange_xor(value, step.lane_mask);
        value = compare_exchange::<T, C>(value, partner, step.direction(id));
    }
    value
}

// ────────────────────────────────────────────────────────────────────────────
// PTX implementation
// ────────────────────────────────────────────────────────────────────────────

/// PTX assembly for an ascending 32-lane warp sort of `s32` values.
///
/// One warp per launch; lane `i` loads `values[i]` and stores the `i`-th
/// smallest value to `sorted[i]`. Uses `shfl.sync.bfly.b32` for every
/// compare-exchange, no shared memory and no barriers.
pub fn bitonic_sort_ptx() -> String {
    let mut b = PtxBuilder::kernel("warp_bitonic_sort_kernel", &["values_ptr", "sorted_ptr"]);
    declare_registers(&mut b);
    b.load_lane_value("values_ptr", "%k");
    b.sort_network(KeyRegs {
        regs: &[("%k", RegType::S32)],
    });
    b.comment("store the sorted value at this lane's rank")
        .line("ld.param.u64 %rd_out, [sorted_ptr];")
        .line("add.u64 %rd_addr, %rd_out, %rd_off;")
        .line("st.global.s32 [%rd_addr], %k;");
    b.finish()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
