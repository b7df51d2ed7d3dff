//! Design Space Explorer
//!
//! Sweeps (design, width, K) combinations and keeps the trade-off between
//! accuracy and hardware: an approximate adder is only interesting if no
//! other point is both more accurate and cheaper.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::adder::{Design, PrefixAdder};
use crate::config::DesignSpace;
use crate::error::{AdderError, Result};
use crate::metrics::ErrorMetrics;
use crate::simulation::evaluate_vectors;
use crate::workloads::{TestVectors, WorkloadConfig};

/// A single point in the design space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignPoint {
    pub design: Design,
    pub width: usize,
    pub approx_bits: usize,
    pub metrics: DesignMetrics,
}

/// Metrics for evaluating a design
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignMetrics {
    pub error: ErrorMetrics,

    // Cost proxies
    pub exact_ops: usize,
    pub approx_ops: usize,
    pub depth: usize,
    pub max_fanout: usize,
}

impl DesignMetrics {
    pub fn total_ops(&self) -> usize {
        self.exact_ops + self.approx_ops
    }
}

/// Pareto frontier of optimal designs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParetoFrontier {
    pub points: Vec<DesignPoint>,
    pub dominated: Vec<DesignPoint>,
}

impl ParetoFrontier {
    /// A dominates B if it is no worse in MRED, exact operators and depth,
    /// and strictly better in at least one
    fn dominates(a: &DesignMetrics, b: &DesignMetrics) -> bool {
        let all_better_or_equal = a.error.mred <= b.error.mred
            && a.exact_ops <= b.exact_ops
            && a.depth <= b.depth;

        let strictly_better = a.error.mred < b.error.mred
            || a.exact_ops < b.exact_ops
            || a.depth < b.depth;

        all_better_or_equal && strictly_better
    }

    /// Compute Pareto frontier from a set of design points
    pub fn compute(points: Vec<DesignPoint>) -> Self {
        let mut frontier: Vec<DesignPoint> = Vec::new();
        let mut dominated = Vec::new();

        for point in points {
            let dominated_by_frontier = frontier
                .iter()
                .any(|f| Self::dominates(&f.metrics, &point.metrics));

            if !dominated_by_frontier {
                let (beaten, kept): (Vec<_>, Vec<_>) = frontier
                    .into_iter()
                    .partition(|f| Self::dominates(&point.metrics, &f.metrics));
                frontier = kept;
                dominated.extend(beaten);
                frontier.push(point);
            } else {
                dominated.push(point);
            }
        }

        frontier.sort_by(|a, b| {
            a.metrics
                .exact_ops
                .cmp(&b.metrics.exact_ops)
                .then(a.metrics.error.mred.total_cmp(&b.metrics.error.mred))
        });
        ParetoFrontier { points: frontier, dominated }
    }

    pub fn report(&self) -> String {
        let mut report = String::new();
        report.push_str("╔══════════════════════════════════════════════════════════════════════════╗\n");
        report.push_str(&format!(
            "║ PARETO FRONTIER: {:>3} optimal of {:>4} points                              ║\n",
            self.points.len(),
            self.points.len() + self.dominated.len()
        ));
        report.push_str("╠══════════════════════════════════════════════════════════════════════════╣\n");
        report.push_str("║ Design                  │  W │  K │ Exact ops │ Depth │       MRED │  WCE  ║\n");
        report.push_str("╠══════════════════════════════════════════════════════════════════════════╣\n");
        for p in &self.points {
            report.push_str(&format!(
                "║ {:23} │ {:2} │ {:2} │ {:9} │ {:5} │ {:10.6} │ {:>5} ║\n",
                p.design.name(),
                p.width,
                p.approx_bits,
                p.metrics.exact_ops,
                p.metrics.depth,
                p.metrics.error.mred,
                p.metrics.error.wce,
            ));
        }
        report.push_str("╚══════════════════════════════════════════════════════════════════════════╝\n");
        report
    }
}

/// Design space exploration engine
pub struct DesignExplorer {
    pub space: DesignSpace,
    pub workload: WorkloadConfig,
}

impl DesignExplorer {
    pub fn new(space: DesignSpace, workload: WorkloadConfig) -> Self {
        DesignExplorer { space, workload }
    }

    /// Explore the full design space (parallel)
    pub fn explore(&self) -> Result<Vec<DesignPoint>> {
        self.explore_with_progress(|_, _| {})
    }

    /// Explore with progress callback
    pub fn explore_with_progress<F>(&self, callback: F) -> Result<Vec<DesignPoint>>
    where
        F: Fn(usize, usize) + Sync,
    {
        let combos = self.space.enumerate();
        let total = combos.len();
        let counter = AtomicUsize::new(0);
        log::info!("exploring {} design points", total);

        // One vector batch per width, shared by every design at that width.
        let mut widths = self.space.widths.clone();
        widths.sort_unstable();
        widths.dedup();
        let batches = widths
            .iter()
            .map(|&width| TestVectors::generate(&self.workload, width))
            .collect::<Result<Vec<_>>>()?;

        combos
            .par_iter()
            .map(|&(design, width, approx_bits)| {
                let result = match batches.iter().find(|v| v.width == width) {
                    Some(vectors) => Self::evaluate_point(design, approx_bits, vectors),
                    None => Err(AdderError::invalid_width(width)),
                };
                let count = counter.fetch_add(1, Ordering::SeqCst);
                callback(count + 1, total);
                result
            })
            .collect()
    }

    /// Evaluate a single configuration
    fn evaluate_point(design: Design, approx_bits: usize, vectors: &TestVectors) -> Result<DesignPoint> {
        let width = vectors.width;
        let adder = PrefixAdder::new(design, width, approx_bits)?;
        let error = evaluate_vectors(&adder, vectors)?;

        let operators = adder.operator_counts();
        Ok(DesignPoint {
            design,
            width,
            approx_bits,
            metrics: DesignMetrics {
                error,
                exact_ops: operators.exact,
                approx_ops: operators.approximate,
                depth: adder.schedule().depth(),
                max_fanout: adder.schedule().max_fanout(),
            },
        })
    }

    /// Find best point for a specific objective
    pub fn find_best<'a>(&self, points: &'a [DesignPoint], objective: Objective) -> Option<&'a DesignPoint> {
        points.iter().max_by(|a, b| {
            let score_a = objective.score(&a.metrics);
            let score_b = objective.score(&b.metrics);
            score_a.total_cmp(&score_b)
        })
    }
}

/// Optimization objectives; higher scores are better
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Objective {
    MinError,
    MinLogic,
    MinDepth,
    Balanced,
}

impl Objective {
    pub fn score(&self, metrics: &DesignMetrics) -> f64 {
        match self {
            Objective::MinError => -metrics.error.mred,
            Objective::MinLogic => -(metrics.exact_ops as f64),
            Objective::MinDepth => -(metrics.depth as f64),
            Objective::Balanced => {
                // Accuracy times inverse cost, each roughly in (0, 1]
                let accuracy = 1.0 / (1.0 + 100.0 * metrics.error.mred);
                let logic = 1.0 / (1.0 + metrics.exact_ops as f64);
                let depth = 1.0 / (1.0 + metrics.depth as f64);
                (accuracy * logic * depth).cbrt()
            }
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Objective::MinError => "min-error",
            Objective::MinLogic => "min-logic",
            Objective::MinDepth => "min-depth",
            Objective::Balanced => "balanced",
        })
    }
}

impl FromStr for Objective {
    type Err = AdderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min-error" | "error" => Ok(Objective::MinError),
            "min-logic" | "logic" | "area" => Ok(Objective::MinLogic),
            "min-depth" | "depth" => Ok(Objective::MinDepth),
            "balanced" => Ok(Objective::Balanced),
            _ => Err(AdderError::UnknownName {
                kind: "objective",
                name: s.to_string(),
                expected: "min-error, min-logic, min-depth, balanced",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workloads::WorkloadKind;

    fn small_explorer() -> DesignExplorer {
        let space = DesignSpace {
            widths: vec![6],
            designs: vec![Design::BrentKung, Design::KoggeStone, Design::SplitBrentKung],
            approx_bits: None,
        };
        let workload = WorkloadConfig {
            kind: WorkloadKind::Exhaustive,
            ..Default::default()
        };
        DesignExplorer::new(space, workload)
    }

    #[test]
    fn test_design_exploration() {
        let explorer = small_explorer();
        let points = explorer.explore().unwrap();
        assert_eq!(points.len(), 3 * 7);
        assert!(points.iter().all(|p| p.metrics.error.samples == 4096));

        let frontier = ParetoFrontier::compute(points.clone());
        println!("{}", frontier.report());
        assert_eq!(frontier.points.len() + frontier.dominated.len(), points.len());
        // Some exact design always survives: nothing beats MRED 0 on accuracy.
        assert!(frontier.points.iter().any(|p| p.metrics.error.is_exact()));
        for kept in &frontier.points {
            for other in &points {
                assert!(!ParetoFrontier::dominates(&other.metrics, &kept.metrics));
            }
        }
    }

    #[test]
    fn test_objectives() {
        let explorer = small_explorer();
        let points = explorer.explore().unwrap();

        let accurate = explorer.find_best(&points, Objective::MinError).unwrap();
        assert!(accurate.metrics.error.is_exact());

        let cheapest = explorer.find_best(&points, Objective::MinLogic).unwrap();
        let fewest = points.iter().map(|p| p.metrics.exact_ops).min().unwrap();
        assert_eq!(cheapest.metrics.exact_ops, fewest);

        let shallow = explorer.find_best(&points, Objective::MinDepth).unwrap();
        let least = points.iter().map(|p| p.metrics.depth).min().unwrap();
        assert_eq!(shallow.metrics.depth, least);
        assert!(explorer.find_best(&points, Objective::Balanced).is_some());
    }

    #[test]
    fn test_parse_objective() {
        assert_eq!("depth".parse::<Objective>().unwrap(), Objective::MinDepth);
        assert_eq!(Objective::MinLogic.to_string().parse::<Objective>().unwrap(), Objective::MinLogic);
        let err = "fastest".parse::<Objective>().unwrap_err();
        assert!(matches!(err, AdderError::UnknownName { kind: "objective", .. }));
        assert!(err.to_string().starts_with("unknown objective \"fastest\""));
    }

    #[test]
    fn test_progress_callback() {
        let explorer = small_explorer();
        let calls = AtomicUsize::new(0);
        explorer
            .explore_with_progress(|_, total| {
                assert_eq!(total, 21);
                calls.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 21);
    }
}
