//! Lane-group emulation with one OS thread per lane.
//!
//! Each collective is a publish/barrier/read/barrier round over a shared
//! slot buffer indexed by lane id. The second barrier keeps a fast lane from
//! overwriting its slot for the next collective while a partner is still
//! reading the previous one.
//!
//! A lane that unwinds aborts the group barrier, so the lanes still waiting
//! at a collective unwind too instead of blocking forever.

use std::any::Any;
use std::panic;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use log::debug;

use super::{LaneGroup, LaneValue};
use crate::error::LaneError;
use crate::group::{GroupSize, LaneMask};

type Slot = Mutex<Option<Box<dyn Any + Send>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Unwind payload of a lane released from a barrier by another lane's panic.
struct GroupAborted;

struct BarrierState {
    arrived: usize,
    generation: u64,
    aborted_by: Option<usize>,
}

/// Reusable barrier that can be torn down by a failing lane.
struct LaneBarrier {
    lanes: usize,
    state: Mutex<BarrierState>,
    released: Condvar,
}

impl LaneBarrier {
    fn new(lanes: usize) -> Self {
        Self {
            lanes,
            state: Mutex::new(BarrierState {
                arrived: 0,
                generation: 0,
                aborted_by: None,
            }),
            released: Condvar::new(),
        }
    }

    /// Block until every lane arrives. Unwinds with [`GroupAborted`] if the
    /// group was aborted before this generation completed.
    fn wait(&self) {
        let mut state = lock(&self.state);
        if state.aborted_by.is_none() {
            let generation = state.generation;
            state.arrived += 1;
            if state.arrived == self.lanes {
                state.arrived = 0;
                state.generation += 1;
                self.released.notify_all();
                return;
            }
            while state.generation == generation && state.aborted_by.is_none() {
                state = self
                    .released
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            if state.generation != generation {
                return;
            }
        }
        drop(state);
        panic::resume_unwind(Box::new(GroupAborted));
    }

    /// Record the first failing lane and release every waiter.
    fn abort(&self, lane: usize) {
        let mut state = lock(&self.state);
        state.aborted_by.get_or_insert(lane);
        self.released.notify_all();
    }

    fn aborted_by(&self) -> Option<usize> {
        lock(&self.state).aborted_by
    }
}

/// Aborts the group barrier if the owning lane unwinds.
struct AbortOnUnwind<'g> {
    barrier: &'g LaneBarrier,
    lane: usize,
}

impl Drop for AbortOnUnwind<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.barrier.abort(self.lane);
        }
    }
}

struct SharedState {
    size: GroupSize,
    barrier: LaneBarrier,
    slots: Vec<Slot>,
}

impl SharedState {
    fn new(size: GroupSize) -> Self {
        Self {
            size,
            barrier: LaneBarrier::new(size.lanes()),
            slots: (0..size.lanes()).map(|_| Mutex::new(None)).collect(),
        }
    }
}

/// One lane's handle into a running threaded group.
pub struct ThreadedLane<'g> {
    shared: &'g SharedState,
    lane_id: usize,
}

impl ThreadedLane<'_> {
    fn publish<T: LaneValue>(&self, value: T) {
        let mut slot = lock(&self.shared.slots[self.lane_id]);
        *slot = Some(Box::new(value));
    }

    fn read<T: LaneValue>(&self, lane: usize) -> T {
        let slot = lock(&self.shared.slots[lane]);
        match slot.as_ref().and_then(|v| v.downcast_ref::<T>()) {
            Some(v) => *v,
            None => panic!(
                "lane {} read a mismatched collective from lane {lane}",
                self.lane_id
            ),
        }
    }

    /// Publish `value`, wait for the group, read, wait again.
    fn round<T: LaneValue, Out>(&self, value: T, read: impl FnOnce(&Self) -> Out) -> Out {
        self.publish(value);
        self.shared.barrier.wait();
        let out = read(self);
        self.shared.barrier.wait();
        out
    }
}

impl LaneGroup for ThreadedLane<'_> {
    fn lane_id(&self) -> usize {
        self.lane_id
    }

    fn group_size(&self) -> GroupSize {
        self.shared.size
    }

    fn exchange_xor<T: LaneValue>(&self, value: T, lane_mask: usize) -> T {
        debug_assert!(lane_mask < self.shared.size.lanes());
        let partner = self.lane_id ^ lane_mask;
        self.round(value, |lane| lane.read(partner))
    }

    fn shift_from_lower_neighbor<T: LaneValue>(&self, value: T) -> T {
        let source = self.lane_id.saturating_sub(1);
        self.round(value, |lane| lane.read(source))
    }

    fn any(&self, predicate: bool) -> bool {
        let lanes = self.shared.size.lanes();
        self.round(predicate, |lane| (0..lanes).any(|i| lane.read::<bool>(i)))
    }

    fn reduce_or(&self, contribution: LaneMask) -> LaneMask {
        let lanes = self.shared.size.lanes();
        self.round(contribution, |lane| {
            (0..lanes).fold(0, |acc, i| acc | lane.read::<LaneMask>(i))
        })
    }
}

/// Run `kernel` once per lane, each lane on its own thread, and collect the
/// per-lane results in lane order.
///
/// The group lives only for this call. Every lane receives
/// `inputs[lane_id]`, so the whole group always participates.
///
/// # Errors
///
/// Returns [`LaneError::LaneCountMismatch`] if `inputs` does not hold exactly
/// one value per lane, or [`LaneError::LanePanicked`] naming the first lane
/// that panicked. Lanes blocked at a collective are released and unwound.
pub fn launch<T, R, F>(size: GroupSize, inputs: &[T], kernel: F) -> Result<Vec<R>, LaneError>
where
    T: LaneValue,
    R: Send,
    F: Fn(&ThreadedLane<'_>, T) -> R + Sync,
{
    if inputs.len() != size.lanes() {
        return Err(LaneError::LaneCountMismatch {
            expected: size.lanes(),
            actual: inputs.len(),
        });
    }

    debug!("launching threaded lane group ({size} lanes)");
    let shared = SharedState::new(size);
    let kernel = &kernel;

    std::thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .copied()
            .enumerate()
            .map(|(lane_id, value)| {
                let lane = ThreadedLane {
                    shared: &shared,
                    lane_id,
                };
                scope.spawn(move || {
                    let _guard = AbortOnUnwind {
                        barrier: &lane.shared.barrier,
                        lane: lane.lane_id,
                    };
                    kernel(&lane, value)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join()).collect();
        if let Some(lane) = shared.barrier.aborted_by() {
            debug!("threaded lane group aborted by lane {lane}");
            return Err(LaneError::LanePanicked { lane });
        }
        results
            .into_iter()
            .enumerate()
            .map(|(lane, r)| r.map_err(|_| LaneError::LanePanicked { lane }))
            .collect()
    })
}
