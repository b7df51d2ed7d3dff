//! Merge Schedules and the Stage Executor
//!
//! A topology is described by *what* it merges at each stage, not by how the
//! merges are evaluated. Every topology module produces a [`Schedule`]: an
//! ordered list of stages, each a set of `(target, source)` merge steps with
//! distinct targets. One executor runs any schedule:
//!
//! - stage `s` starts as a copy of stage `s - 1`
//! - every step overwrites its target with `op(prev[source], prev[target])`
//! - `op` is chosen per target by the [`ApproxBoundary`]
//!
//! Because every read goes to the previous row, steps within a stage are
//! independent of each other, exactly as the gates of one hardware level.

use serde::{Deserialize, Serialize};

use crate::bits::BitVector;
use crate::prefix::{ApproxBoundary, GpSignal, MergeOp};

/// One prefix merge: `target <- op(source, target)`, with `source < target`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MergeStep {
    pub target: usize,
    pub source: usize,
}

impl MergeStep {
    pub fn new(target: usize, source: usize) -> Self {
        debug_assert!(source < target, "merge source must be less significant");
        MergeStep { target, source }
    }

    /// Same step moved up by `offset` bit positions
    pub fn offset(self, offset: usize) -> Self {
        MergeStep {
            target: self.target + offset,
            source: self.source + offset,
        }
    }
}

/// One level of the prefix network
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub steps: Vec<MergeStep>,
}

impl Stage {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Largest number of steps in this stage reading the same source
    pub fn max_fanout(&self, width: usize) -> usize {
        let mut readers = vec![0usize; width];
        for step in &self.steps {
            readers[step.source] += 1;
        }
        readers.into_iter().max().unwrap_or(0)
    }
}

/// Exact/approximate split of a schedule's merge steps for one boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorCounts {
    pub exact: usize,
    pub approximate: usize,
}

impl OperatorCounts {
    pub fn total(&self) -> usize {
        self.exact + self.approximate
    }
}

/// Ordered merge stages of a prefix network for a fixed width
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule {
    width: usize,
    stages: Vec<Stage>,
}

impl Schedule {
    pub fn new(width: usize) -> Self {
        Schedule {
            width,
            stages: Vec::new(),
        }
    }

    /// Append a stage. Empty stages are kept so stage numbering follows the
    /// topology's nominal level count.
    pub fn push_stage(&mut self, steps: Vec<MergeStep>) {
        debug_assert!(steps.iter().all(|s| s.target < self.width));
        self.stages.push(Stage { steps });
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Nominal number of merge stages
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Logical depth: stages that contain at least one merge
    pub fn depth(&self) -> usize {
        self.stages.iter().filter(|s| !s.is_empty()).count()
    }

    /// Total number of prefix operators
    pub fn merge_count(&self) -> usize {
        self.stages.iter().map(|s| s.steps.len()).sum()
    }

    pub fn max_fanout(&self) -> usize {
        self.stages
            .iter()
            .map(|s| s.max_fanout(self.width))
            .max()
            .unwrap_or(0)
    }

    /// How many steps use each operator under `boundary`
    pub fn operator_counts(&self, boundary: ApproxBoundary) -> OperatorCounts {
        let mut counts = OperatorCounts::default();
        for step in self.stages.iter().flat_map(|s| &s.steps) {
            match boundary.operator_for(step.target) {
                MergeOp::Exact => counts.exact += 1,
                MergeOp::Approximate => counts.approximate += 1,
            }
        }
        counts
    }

    /// True when no stage writes the same target twice
    pub fn has_distinct_targets(&self) -> bool {
        self.stages.iter().all(|stage| {
            let mut seen = vec![false; self.width];
            stage.steps.iter().all(|step| !std::mem::replace(&mut seen[step.target], true))
        })
    }

    /// Run the schedule over `initial` signals
    pub fn evaluate(&self, initial: &[GpSignal], boundary: ApproxBoundary) -> StageBuffer {
        debug_assert_eq!(initial.len(), self.width);
        let mut buffer = StageBuffer::new(initial, self.stages.len());

        for (index, stage) in self.stages.iter().enumerate() {
            let (prev, next) = buffer.advance(index + 1);
            for step in &stage.steps {
                let op = boundary.operator_for(step.target);
                next[step.target] = op.apply(prev[step.source], prev[step.target]);
            }
        }

        buffer
    }

    /// Run the schedule keeping only two rows. `current` holds the initial
    /// signals on entry and the final stage on return; `next` is scratch.
    pub fn resolve(&self, current: &mut Vec<GpSignal>, next: &mut Vec<GpSignal>, boundary: ApproxBoundary) {
        debug_assert_eq!(current.len(), self.width);
        for stage in &self.stages {
            next.clear();
            next.extend_from_slice(current);
            for step in &stage.steps {
                let op = boundary.operator_for(step.target);
                next[step.target] = op.apply(current[step.source], current[step.target]);
            }
            std::mem::swap(current, next);
        }
    }
}

/// Arena of `(stages + 1) x width` signals; row 0 holds the initial signals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageBuffer {
    width: usize,
    rows: usize,
    cells: Vec<GpSignal>,
}

impl StageBuffer {
    fn new(initial: &[GpSignal], stages: usize) -> Self {
        let width = initial.len();
        let rows = stages + 1;
        let mut cells = vec![GpSignal::default(); rows * width];
        cells[..width].copy_from_slice(initial);
        StageBuffer { width, rows, cells }
    }

    /// Copy row `stage - 1` forward and hand out (previous, current)
    fn advance(&mut self, stage: usize) -> (&[GpSignal], &mut [GpSignal]) {
        let w = self.width;
        let (head, tail) = self.cells.split_at_mut(stage * w);
        let prev = &head[(stage - 1) * w..];
        let next = &mut tail[..w];
        next.copy_from_slice(prev);
        (prev, next)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of merge stages (rows minus the initial row)
    pub fn stage_count(&self) -> usize {
        self.rows - 1
    }

    pub fn row(&self, stage: usize) -> &[GpSignal] {
        &self.cells[stage * self.width..(stage + 1) * self.width]
    }

    pub fn initial(&self) -> &[GpSignal] {
        self.row(0)
    }

    pub fn final_row(&self) -> &[GpSignal] {
        self.row(self.rows - 1)
    }

    pub fn carries(&self) -> CarryVector {
        CarryVector::from_final_stage(self.final_row())
    }

    /// Stage-by-stage table, MSB on the left, each cell `GP`
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("stage │");
        for position in (0..self.width).rev() {
            out.push_str(&format!(" {:>2}", position));
        }
        out.push('\n');
        out.push_str("──────┼");
        out.push_str(&"───".repeat(self.width));
        out.push('\n');
        for stage in 0..self.rows {
            out.push_str(&format!("{:>5} │", stage));
            for signal in self.row(stage).iter().rev() {
                out.push_str(&format!(
                    " {}{}",
                    signal.generate as u8,
                    signal.propagate as u8
                ));
            }
            out.push('\n');
        }
        out
    }
}

/// Carry into every position plus the carry out: `c[0] = 0`, `c[i+1] = G[i]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarryVector {
    carries: Vec<bool>,
}

impl CarryVector {
    pub fn from_final_stage(signals: &[GpSignal]) -> Self {
        let mut carries = Vec::with_capacity(signals.len() + 1);
        carries.push(false);
        carries.extend(signals.iter().map(|s| s.generate));
        CarryVector { carries }
    }

    /// Carry into position `index` (`index == width` gives the carry out)
    pub fn get(&self, index: usize) -> bool {
        self.carries[index]
    }

    pub fn len(&self) -> usize {
        self.carries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carries.is_empty()
    }

    pub fn carry_out(&self) -> bool {
        self.carries[self.carries.len() - 1]
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.carries
    }

    /// `sum[i] = p[i] ^ c[i]`, using the stage-0 propagate signals
    pub fn sum(&self, initial: &[GpSignal]) -> BitVector {
        debug_assert_eq!(initial.len() + 1, self.carries.len());
        BitVector::from_raw(
            initial
                .iter()
                .zip(&self.carries)
                .map(|(signal, &carry)| signal.propagate ^ carry)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::to_bits;
    use crate::prefix::gp_signals;

    fn ripple(width: usize) -> Schedule {
        let mut schedule = Schedule::new(width);
        for target in 1..width {
            schedule.push_stage(vec![MergeStep::new(target, target - 1)]);
        }
        schedule
    }

    #[test]
    fn test_ripple_schedule_adds() {
        let schedule = ripple(4);
        let a = to_bits(7, 4).unwrap();
        let b = to_bits(1, 4).unwrap();
        let initial = gp_signals(&a, &b).unwrap();
        let buffer = schedule.evaluate(&initial, ApproxBoundary::exact());
        let carries = buffer.carries();
        assert_eq!(carries.len(), 5);
        assert!(!carries.get(0));
        assert_eq!(carries.sum(&initial).to_value(), 8);
    }

    #[test]
    fn test_stage_reads_previous_row_only() {
        // Two chained steps in one stage must not see each other's writes.
        let mut schedule = Schedule::new(3);
        schedule.push_stage(vec![MergeStep::new(1, 0), MergeStep::new(2, 1)]);
        let initial = vec![
            GpSignal::new(true, false),
            GpSignal::new(false, true),
            GpSignal::new(false, true),
        ];
        let buffer = schedule.evaluate(&initial, ApproxBoundary::exact());
        assert!(buffer.row(1)[1].generate);
        assert!(!buffer.row(1)[2].generate);
        assert_eq!(buffer.row(0), &initial[..]);
    }

    #[test]
    fn test_resolve_matches_full_evaluation() {
        let mut schedule = Schedule::new(4);
        schedule.push_stage(vec![MergeStep::new(1, 0), MergeStep::new(3, 2)]);
        schedule.push_stage(vec![MergeStep::new(2, 1), MergeStep::new(3, 1)]);
        let initial = gp_signals(&to_bits(0b0111, 4).unwrap(), &to_bits(0b0101, 4).unwrap()).unwrap();

        for boundary in [ApproxBoundary::exact(), ApproxBoundary::new(3, 4).unwrap()] {
            let buffer = schedule.evaluate(&initial, boundary);
            let (mut current, mut next) = (initial.clone(), Vec::new());
            schedule.resolve(&mut current, &mut next, boundary);
            assert_eq!(current, buffer.final_row());
        }
    }

    #[test]
    fn test_operator_counts_follow_boundary() {
        let schedule = ripple(8);
        let counts = schedule.operator_counts(ApproxBoundary::new(3, 8).unwrap());
        assert_eq!(counts.approximate, 2);
        assert_eq!(counts.exact, 5);
        assert_eq!(counts.total(), schedule.merge_count());
    }

    #[test]
    fn test_structure_metrics() {
        let mut schedule = Schedule::new(4);
        schedule.push_stage(vec![MergeStep::new(2, 1), MergeStep::new(3, 1)]);
        schedule.push_stage(Vec::new());
        assert_eq!(schedule.stage_count(), 2);
        assert_eq!(schedule.depth(), 1);
        assert_eq!(schedule.max_fanout(), 2);
        assert!(schedule.has_distinct_targets());

        schedule.push_stage(vec![MergeStep::new(3, 0), MergeStep::new(3, 2)]);
        assert!(!schedule.has_distinct_targets());
    }

    #[test]
    fn test_render_has_one_line_per_row() {
        let schedule = ripple(4);
        let initial = gp_signals(&to_bits(5, 4).unwrap(), &to_bits(3, 4).unwrap()).unwrap();
        let rendered = schedule.evaluate(&initial, ApproxBoundary::exact()).render();
        assert_eq!(rendered.lines().count(), 2 + 4);
    }
}
