//! Kogge–Stone Network
//!
//! Every position `i >= 2^(s-1)` merges with `i - 2^(s-1)` at stage `s`.
//! Minimum depth, fan-out 1, the largest operator count of the family.

use crate::ceil_log2;
use crate::schedule::{MergeStep, Schedule};

/// Kogge–Stone schedule for `width` bits
pub fn schedule(width: usize) -> Schedule {
    let mut schedule = Schedule::new(width);
    for level in 0..ceil_log2(width) {
        let d = 1 << level;
        schedule.push_stage((d..width).map(|target| MergeStep::new(target, target - d)).collect());
    }
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_and_operator_counts() {
        assert_eq!(schedule(1).stage_count(), 0);
        assert_eq!(schedule(4).stage_count(), 2);
        assert_eq!(schedule(5).stage_count(), 3);
        assert_eq!(schedule(8).merge_count(), 7 + 6 + 4);
        assert_eq!(schedule(16).merge_count(), 49);
        assert_eq!(schedule(16).max_fanout(), 1);
    }

    #[test]
    fn test_stage_strides() {
        let s = schedule(8);
        for (level, stage) in s.stages().iter().enumerate() {
            let d = 1 << level;
            assert_eq!(stage.steps.len(), 8 - d);
            assert!(stage.steps.iter().all(|step| step.target - step.source == d));
        }
    }
}
