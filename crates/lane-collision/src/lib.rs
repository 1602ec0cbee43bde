//! # lane-collision
//!
//! Duplicate detection across a fixed-size group of lockstep lanes.
//!
//! Given one value per lane, the kernels decide whether any two lanes hold
//! equal values and build a bitmask of lanes that provably collide with
//! another lane, suitable for serializing conflicting work. Everything is
//! built from pairwise butterfly exchanges: a bitonic sorting network,
//! a lower-neighbor comparison and a group-wide reduction.
//!
//! ## Modules
//!
//! - [`group`] — Validated group sizes, lane masks and bit helpers
//! - [`compare`] — Comparators and composite sort keys
//! - [`lanes`] — Lane-group primitives and the threaded barrier substrate
//! - [`kernels`] — Bitonic network, collision predicate, collision mask, PTX
//! - [`dispatch`] — Host-side entry points with padding and backend selection
//! - [`oracle`] — Brute-force reference used by tests and the self-test
//! - [`selftest`] — Seeded self-test over every duplicate count
//! - [`config`] — YAML launch configuration
//! - [`error`] — Error and violation types

pub mod compare;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod group;
pub mod kernels;
pub mod lanes;
pub mod oracle;
pub mod selftest;

pub use dispatch::{check_duplicates, collision_mask, has_collision, sort_lanes};
pub use error::LaneError;
pub use group::{GroupSize, LaneMask, WARP_SIZE};
pub use kernels::Backend;
