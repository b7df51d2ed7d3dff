//! Sklansky Network
//!
//! Divide and conquer. At stride `d` the positions are cut into blocks of
//! `2d`; the upper half of each block merges with the last position of the
//! lower half. Minimum depth with `W/2` operators per stage, at the price of
//! fan-out `d` on the block pivots.

use crate::ceil_log2;
use crate::schedule::{MergeStep, Schedule};

/// Sklansky schedule for `width` bits
pub fn schedule(width: usize) -> Schedule {
    let mut schedule = Schedule::new(width);
    for level in 0..ceil_log2(width) {
        let d = 1 << level;
        let mut steps = Vec::new();
        for start in (0..width).step_by(2 * d) {
            let pivot = start + d - 1;
            steps.extend((start + d..(start + 2 * d).min(width)).map(|target| MergeStep::new(target, pivot)));
        }
        schedule.push_stage(steps);
    }
    schedule
}
