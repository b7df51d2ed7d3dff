//! Ladner–Fischer Network
//!
//! The odd/even construction: a Sklansky network runs over the odd
//! positions only, then one closing stage resolves each even position
//! `i >= 2` from `i - 1`. Roughly half of Sklansky's operators and half its
//! fan-out, for one extra level.

use crate::ceil_log2;
use crate::schedule::{MergeStep, Schedule};

/// Ladner–Fischer schedule for `width` bits
pub fn schedule(width: usize) -> Schedule {
    let mut schedule = Schedule::new(width);

    for level in 0..ceil_log2(width) {
        let d = 1 << level;
        let mut steps = Vec::new();
        for start in (0..width).step_by(2 * d) {
            let pivot = start + d - 1;
            steps.extend(
                (start + d..(start + 2 * d).min(width))
                    .filter(|target| target % 2 == 1)
                    .map(|target| MergeStep::new(target, pivot)),
            );
        }
        schedule.push_stage(steps);
    }

    if width > 2 {
        schedule.push_stage((2..width).step_by(2).map(|target| MergeStep::new(target, target - 1)).collect());
    }

    schedule
}
