//! Brent–Kung Network
//!
//! Two passes over power-of-two strides. The up-sweep builds group
//! prefixes at positions `2d-1, 4d-1, ...`; the down-sweep fills every
//! remaining position from its nearest resolved predecessor. `2L - 1`
//! stages for `L = ceil(log2 W)`, about `2W` operators, fan-out 1.
//!
//! [`split_schedule`] is the alternative approximate formulation: a ripple
//! chain over the K least significant bits next to an exact tree over the
//! rest. Its merges are all exact; the approximation is structural (the
//! LSB carry-out reaches bit K only and is never propagated further).

use crate::ceil_log2;
use crate::schedule::{MergeStep, Schedule};

/// Brent–Kung schedule for `width` bits
pub fn schedule(width: usize) -> Schedule {
    let levels = ceil_log2(width);
    let mut schedule = Schedule::new(width);

    // Up-sweep
    for level in 0..levels {
        let d = 1 << level;
        let steps = (2 * d - 1..width)
            .step_by(2 * d)
            .map(|target| MergeStep::new(target, target - d))
            .collect();
        schedule.push_stage(steps);
    }

    // Down-sweep
    for level in (0..levels.saturating_sub(1)).rev() {
        let d = 1 << level;
        let steps = (3 * d - 1..width)
            .step_by(2 * d)
            .map(|target| MergeStep::new(target, target - d))
            .collect();
        schedule.push_stage(steps);
    }

    schedule
}

/// Ripple chain over `[0, lsb_bits)` beside a Brent–Kung tree over
/// `[lsb_bits, width)`, both running from stage 1
pub fn split_schedule(width: usize, lsb_bits: usize) -> Schedule {
    debug_assert!(lsb_bits <= width);
    let tree = schedule(width - lsb_bits);
    let ripple_stages = lsb_bits.saturating_sub(1);
    let stage_count = ripple_stages.max(tree.stage_count());

    let mut schedule = Schedule::new(width);
    for stage in 0..stage_count {
        let mut steps = Vec::new();
        if stage < ripple_stages {
            steps.push(MergeStep::new(stage + 1, stage));
        }
        if let Some(level) = tree.stages().get(stage) {
            steps.extend(level.steps.iter().map(|step| step.offset(lsb_bits)));
        }
        schedule.push_stage(steps);
    }
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adder::{Design, PrefixAdder};

    #[test]
    fn test_stage_count() {
        assert_eq!(schedule(1).stage_count(), 0);
        assert_eq!(schedule(2).stage_count(), 1);
        assert_eq!(schedule(4).stage_count(), 3);
        assert_eq!(schedule(8).stage_count(), 5);
        assert_eq!(schedule(16).stage_count(), 7);
        assert_eq!(schedule(12).stage_count(), 7);
    }

    #[test]
    fn test_operator_count_and_fanout() {
        assert_eq!(schedule(8).merge_count(), 11);
        assert_eq!(schedule(16).merge_count(), 26);
        assert_eq!(schedule(16).max_fanout(), 1);
    }

    #[test]
    fn test_eight_bit_layout() {
        let s = schedule(8);
        let targets: Vec<Vec<usize>> = s
            .stages()
            .iter()
            .map(|stage| stage.steps.iter().map(|step| step.target).collect())
            .collect();
        assert_eq!(
            targets,
            vec![vec![1, 3, 5, 7], vec![3, 7], vec![7], vec![5], vec![2, 4, 6]]
        );
    }

    #[test]
    fn test_exact_for_odd_widths() {
        for width in [3, 5, 6, 7, 9, 12] {
            let adder = PrefixAdder::exact(Design::BrentKung, width).unwrap();
            let max = 1u64 << width;
            for a in (0..max).step_by(3) {
                for b in (0..max).step_by(5) {
                    assert_eq!(adder.add(a, b).unwrap(), (a + b) % max, "W={width} {a}+{b}");
                }
            }
        }
    }

    #[test]
    fn test_split_schedule_layout() {
        let s = split_schedule(8, 3);
        // Ripple 1<-0, 2<-1 runs beside a 5-bit tree shifted up by 3.
        assert_eq!(s.stage_count(), 5);
        assert!(s.stages()[0].steps.contains(&MergeStep::new(1, 0)));
        assert!(s.stages()[0].steps.contains(&MergeStep::new(4, 3)));
        assert!(s.stages()[1].steps.contains(&MergeStep::new(2, 1)));
        assert!(s.has_distinct_targets());
        assert_eq!(split_schedule(8, 0), schedule(8));
    }

    #[test]
    fn test_split_edges_are_exact() {
        for k in [0, 4] {
            let adder = PrefixAdder::new(Design::SplitBrentKung, 4, k).unwrap();
            for a in 0..16 {
                for b in 0..16 {
                    assert_eq!(adder.add(a, b).unwrap(), (a + b) % 16);
                }
            }
        }
    }

    #[test]
    fn test_split_drops_carry_past_boundary() {
        // 1111 + 0001 with a 1-bit ripple: c[1] = 1 lands on bit 1 only.
        let adder = PrefixAdder::new(Design::SplitBrentKung, 4, 1).unwrap();
        assert_eq!(adder.add(15, 1).unwrap(), 12);
        let adder = PrefixAdder::new(Design::SplitBrentKung, 4, 2).unwrap();
        assert_eq!(adder.add(15, 1).unwrap(), 8);
    }
}
