//! Seeded self-test of the collision kernels.
//!
//! For every `num_dups` in `0..N` the group holds `N - num_dups` distinct
//! random values followed by `num_dups` copies of lane 0's value. The
//! predicate must fire exactly when `num_dups > 0` and the mask must flag
//! exactly the trailing copies. A second layout with two unrelated
//! colliding pairs measures how far [`expand_mask`] recovers the full set of
//! colliding lanes.
//!
//! Findings are collected as [`Violation`]s instead of panicking, so one
//! run reports every failing case.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::compare::SortOrder;
use crate::dispatch::{check_duplicates, collision_mask, sort_lanes};
use crate::error::{LaneError, Severity, Violation};
use crate::group::{GroupSize, LaneMask};
use crate::kernels::Backend;
use crate::oracle::{colliding_lanes, expand_mask, expected_mask, mask_is_sound};

/// Seed used when none is given.
pub const DEFAULT_SEED: u64 = 123;

/// Outcome of [`run_selftest`].
#[derive(Debug, Clone, Serialize)]
pub struct SelfTestReport {
    pub group_size: usize,
    pub backend: Backend,
    pub seed: u64,
    pub checks: usize,
    pub violations: Vec<Violation>,
}

impl SelfTestReport {
    /// True when no violation has error severity.
    pub fn passed(&self) -> bool {
        self.error_count() == 0
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    }
}

struct Checker {
    checks: usize,
    violations: Vec<Violation>,
}

impl Checker {
    fn check(&mut self, ok: bool, severity: Severity, rule: &str, message: String, location: &str) {
        self.checks += 1;
        if !ok {
            self.violations
                .push(Violation::new(severity, rule, message, location));
        }
    }
}

/// `count` pairwise distinct values drawn from `rng`.
fn distinct_values(rng: &mut StdRng, count: usize) -> Vec<i32> {
    let mut values = Vec::with_capacity(count);
    while values.len() < count {
        let v = rng.gen_range(0..i32::MAX);
        if !values.contains(&v) {
            values.push(v);
        }
    }
    values
}

/// Distinct values with the last `num_dups` lanes overwritten by lane 0's.
pub fn tail_duplicates(rng: &mut StdRng, size: GroupSize, num_dups: usize) -> Vec<i32> {
    let n = size.lanes();
    let mut values = distinct_values(rng, n);
    for lane in n - num_dups.min(n - 1)..n {
        values[lane] = values[0];
    }
    values
}

/// The mask the tail layout must produce: its top `num_dups` lanes.
pub fn tail_mask(size: GroupSize, num_dups: usize) -> LaneMask {
    if num_dups == 0 {
        0
    } else {
        (size.full_mask() << (size.lanes() - num_dups)) & size.full_mask()
    }
}

/// Run the self-test on one group size and backend.
///
/// # Errors
///
/// Returns a [`LaneError`] if the backend cannot run on the host or the
/// substrate fails; kernel misbehavior is reported as violations.
pub fn run_selftest(
    size: GroupSize,
    backend: Backend,
    seed: u64,
) -> Result<SelfTestReport, LaneError> {
    let n = size.lanes();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut checker = Checker {
        checks: 0,
        violations: Vec::new(),
    };
    debug!("selftest: {n} lanes via {backend}, seed {seed}");

    for num_dups in 0..n {
        let values = tail_duplicates(&mut rng, size, num_dups);
        let location = format!("num_dups={num_dups}");
        check_layout(&mut checker, &values, size, backend, &location)?;

        let mask = collision_mask(&values, size, backend)?;
        let expected = tail_mask(size, num_dups);
        checker.check(
            mask == expected,
            Severity::Error,
            "MASK-001",
            format!("mask {mask:#x} differs from tail pattern {expected:#x}"),
            &location,
        );
    }

    if n >= 4 {
        let mut values = distinct_values(&mut rng, n);
        values[n / 2] = values[0];
        values[n - 1] = values[1];
        let location = "disjoint pairs";
        check_layout(&mut checker, &values, size, backend, location)?;

        let mask = collision_mask(&values, size, backend)?;
        let colliding = colliding_lanes(&values);
        checker.check(
            expand_mask(mask) == colliding,
            Severity::Warning,
            "MASK-004",
            format!(
                "expanded mask {:#x} does not cover colliding lanes {colliding:#x}",
                expand_mask(mask)
            ),
            location,
        );
    }

    debug!(
        "selftest: {} checks, {} violations",
        checker.checks,
        checker.violations.len()
    );
    Ok(SelfTestReport {
        group_size: n,
        backend,
        seed,
        checks: checker.checks,
        violations: checker.violations,
    })
}

/// Checks shared by every layout: sort, per-lane predicate, mask soundness.
fn check_layout(
    checker: &mut Checker,
    values: &[i32],
    size: GroupSize,
    backend: Backend,
    location: &str,
) -> Result<(), LaneError> {
    let expected_dup = colliding_lanes(values) != 0;

    let sorted = sort_lanes(values, size, backend, SortOrder::Ascending)?;
    let mut reference = values.to_vec();
    reference.sort_unstable();
    checker.check(
        sorted == reference,
        Severity::Error,
        "SORT-001",
        "network output is not the ascending permutation of its input".to_string(),
        location,
    );

    let views = check_duplicates(values, size, backend)?;
    for (lane, &view) in views.iter().enumerate() {
        checker.check(
            view == expected_dup,
            Severity::Error,
            "COLLISION-001",
            format!("lane {lane} reports {view}, expected {expected_dup}"),
            location,
        );
    }

    let mask = collision_mask(values, size, backend)?;
    checker.check(
        mask_is_sound(values, mask),
        Severity::Error,
        "MASK-002",
        format!("mask {mask:#x} flags a lane with no clear colliding partner"),
        location,
    );
    checker.check(
        (mask != 0) == expected_dup,
        Severity::Error,
        "MASK-003",
        format!("mask {mask:#x} disagrees with predicate {expected_dup}"),
        location,
    );
    checker.check(
        mask == expected_mask(values),
        Severity::Error,
        "MASK-005",
        format!(
            "mask {mask:#x} is not every colliding lane but the lowest, {:#x}",
            expected_mask(values)
        ),
        location,
    );
    Ok(())
}
