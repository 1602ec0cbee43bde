//! Host-side entry points: one value per lane in, collective result out.
//!
//! Inputs shorter than the group are padded with [`Padded::Sentinel`]
//! lanes, which sort above every value and never collide, so the kernels
//! run unchanged over a full power-of-two group. Results are reported for
//! the real lanes only.
//!
//! Values must be totally ordered. Under a partial order such as `f32`
//! with NaN the network may drop or repeat items, so equal values need not
//! end up adjacent. The kernels in [`crate::kernels`] accept such types;
//! this layer does not.

use log::debug;

use crate::compare::{Comparator, GreaterThan, LessThan, Padded, SortOrder};
use crate::error::LaneError;
use crate::group::{low_lanes, GroupSize, LaneMask};
use crate::kernels::bitonic::{bitonic_sort_scalar, warp_bitonic_sort};
use crate::kernels::collision::{has_collision_scalar, warp_has_collision};
use crate::kernels::collision_mask::{collision_mask_scalar, warp_collision_mask};
use crate::kernels::Backend;
use crate::lanes::threaded::launch;
use crate::lanes::LaneValue;

fn pad<T: Copy>(values: &[T], size: GroupSize) -> Result<Vec<Padded<T>>, LaneError> {
    if values.len() > size.lanes() {
        return Err(LaneError::TooManyValues {
            lanes: size.lanes(),
            actual: values.len(),
        });
    }
    let lanes = values
        .iter()
        .map(|&v| Padded::Lane(v))
        .chain((values.len()..size.lanes()).map(Padded::Sentinel))
        .collect();
    Ok(lanes)
}

fn unavailable(backend: Backend) -> LaneError {
    LaneError::BackendUnavailable(backend.name().to_string())
}

/// Run the collision predicate and return every real lane's view of it.
///
/// All entries are equal; the per-lane form mirrors what each lane of the
/// group observes. Empty input yields an empty vector.
///
/// # Errors
///
/// Returns [`LaneError::TooManyValues`] if `values` exceeds the group,
/// [`LaneError::BackendUnavailable`] for [`Backend::Ptx`], or a substrate
/// error from the threaded launch.
pub fn check_duplicates<T>(
    values: &[T],
    size: GroupSize,
    backend: Backend,
) -> Result<Vec<bool>, LaneError>
where
    T: LaneValue + Ord,
{
    if values.is_empty() {
        return Ok(Vec::new());
    }
    let lanes = pad(values, size)?;
    debug!(
        "check_duplicates: {} values on {size} lanes via {backend}",
        values.len()
    );

    let mut views = match backend {
        Backend::Scalar => vec![has_collision_scalar(&lanes); size.lanes()],
        Backend::Threaded => launch(size, &lanes, |lane, v| warp_has_collision(lane, v))?,
        Backend::Ptx => return Err(unavailable(backend)),
    };
    views.truncate(values.len());
    Ok(views)
}

/// Does any pair of lanes hold equal values?
///
/// Floating-point lanes do not compile:
///
/// ```compile_fail
/// use lane_collision::{has_collision, Backend, GroupSize};
///
/// let _ = has_collision(&[1.0f32, f32::NAN, 1.0], GroupSize::WARP, Backend::Scalar);
/// ```
///
/// # Errors
///
/// Same as [`check_duplicates`].
pub fn has_collision<T>(values: &[T], size: GroupSize, backend: Backend) -> Result<bool, LaneError>
where
    T: LaneValue + Ord,
{
    Ok(check_duplicates(values, size, backend)?
        .into_iter()
        .any(|dup| dup))
}

/// Build the collision mask: bit `i` set means lane `i` collides with a
/// lane whose bit is clear.
///
/// The mask is sound, not complete: in every group of equal values the
/// lowest lane stays clear as the group's representative.
///
/// # Errors
///
/// Same as [`check_duplicates`].
pub fn collision_mask<T>(values: &[T], size: GroupSize, backend: Backend) -> Result<LaneMask, LaneError>
where
    T: LaneValue + Ord,
{
    if values.is_empty() {
        return Ok(0);
    }
    let lanes = pad(values, size)?;
    debug!(
        "collision_mask: {} values on {size} lanes via {backend}",
        values.len()
    );

    let mask = match backend {
        Backend::Scalar => collision_mask_scalar(&lanes),
        Backend::Threaded => {
            let views = launch(size, &lanes, |lane, v| warp_collision_mask(lane, v))?;
            views.first().copied().unwrap_or(0)
        }
        Backend::Ptx => return Err(unavailable(backend)),
    };
    debug_assert_eq!(mask & !low_lanes(values.len()), 0, "padding lane flagged");
    Ok(mask)
}

/// Order the values with the lane network.
///
/// # Errors
///
/// Same as [`check_duplicates`].
pub fn sort_lanes<T>(
    values: &[T],
    size: GroupSize,
    backend: Backend,
    order: SortOrder,
) -> Result<Vec<T>, LaneError>
where
    T: LaneValue + Ord,
{
    if values.is_empty() {
        return Ok(Vec::new());
    }
    let lanes = pad(values, size)?;
    debug!(
        "sort_lanes: {} values on {size} lanes via {backend}, {order:?}",
        values.len()
    );

    let sorted = match order {
        SortOrder::Ascending => sort_with::<_, LessThan>(lanes, size, backend)?,
        SortOrder::Descending => sort_with::<_, GreaterThan>(lanes, size, backend)?,
    };
    Ok(sorted.into_iter().filter_map(Padded::into_lane).collect())
}

fn sort_with<T, C>(
    mut lanes: Vec<Padded<T>>,
    size: GroupSize,
    backend: Backend,
) -> Result<Vec<Padded<T>>, LaneError>
where
    T: LaneValue + Ord,
    C: Comparator<Padded<T>>,
{
    match backend {
        Backend::Scalar => {
            bitonic_sort_scalar::<_, C>(&mut lanes);
            Ok(lanes)
        }
        Backend::Threaded => launch(size, &lanes, |lane, v| warp_bitonic_sort::<_, C, _>(lane, v)),
        Backend::Ptx => Err(unavailable(backend)),
    }
}
