//! Kernel implementations: scalar reference, per-lane program, and CUDA PTX.
//!
//! Each submodule provides three variants of its kernel:
//! - `fn {name}_scalar(...)` — lockstep reference over a slice of lanes (ground truth)
//! - `fn warp_{name}(lane, value)` — per-lane program over any [`LaneGroup`](crate::lanes::LaneGroup)
//! - `fn {name}_ptx() -> String` — PTX source for a 32-lane hardware warp

// Lane-id arithmetic is naturally terse (k, j, x, y) and PTX is emitted
// through long format strings.
#![allow(
    clippy::many_single_char_names,
    clippy::similar_names,
    clippy::needless_range_loop,
    clippy::too_many_lines,
    clippy::doc_markdown
)]

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LaneError;
use crate::group::GroupSize;

pub mod bitonic;
pub mod collision;
pub mod collision_mask;
pub mod ptx;

#[cfg(kani)]
mod kani_proofs;

/// Backend selector for kernel dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Lockstep scalar reference implementation.
    Scalar,
    /// One OS thread per lane, collectives over a barrier-protected buffer.
    #[default]
    Threaded,
    /// CUDA PTX kernel (returned as assembly source string).
    Ptx,
}

impl Backend {
    pub fn name(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Threaded => "threaded",
            Self::Ptx => "ptx",
        }
    }
}

impl FromStr for Backend {
    type Err = LaneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scalar" => Ok(Self::Scalar),
            "threaded" => Ok(Self::Threaded),
            "ptx" => Ok(Self::Ptx),
            other => Err(LaneError::UnknownBackend(other.to_string())),
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Group size of a slice that holds one item per lane.
///
/// # Panics
///
/// Panics if the slice length is not a power of two in `1..=64`.
pub(crate) fn lane_group_of<T>(lanes: &[T]) -> GroupSize {
    match GroupSize::new(lanes.len()) {
        Ok(size) => size,
        Err(e) => panic!("{e}"),
    }
}
