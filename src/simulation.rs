//! Approximation Sweep Engine
//!
//! Drives every configured design across the configured range of
//! approximation boundaries with one shared batch of test vectors and
//! collects error metrics per (design, K). Vectors are folded in parallel;
//! each adder is immutable so the workers share it without locking.

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::adder::{exact_sum, AddBuffers, Design, PrefixAdder};
use crate::config::SimulationConfig;
use crate::error::Result;
use crate::metrics::{ErrorAccumulator, ErrorMetrics, Metric};
use crate::schedule::OperatorCounts;
use crate::workloads::{TestVectors, WorkloadStats};

/// The sweep engine
pub struct SimulationEngine {
    pub config: SimulationConfig,
    pub vectors: TestVectors,
}

impl SimulationEngine {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let vectors = TestVectors::generate(&config.workload, config.adder.width)?;
        Ok(SimulationEngine { config, vectors })
    }

    /// Evaluate one adder over the engine's vectors
    pub fn evaluate(&self, adder: &PrefixAdder) -> Result<ErrorMetrics> {
        evaluate_vectors(adder, &self.vectors)
    }

    /// Run the full sweep
    pub fn run(&self) -> Result<SimulationReport> {
        let width = self.config.adder.width;
        let mut results = Vec::with_capacity(self.config.adder.designs.len());

        for &design in &self.config.adder.designs {
            log::info!("sweeping {} over K = {:?}", design, self.config.approx_bits_range());
            let mut points = Vec::new();
            for approx_bits in self.config.approx_bits_range() {
                let adder = PrefixAdder::new(design, width, approx_bits)?;
                let metrics = self.evaluate(&adder)?;
                log::debug!(
                    "{} K={} mae={:.3} mred={:.5} wce={}",
                    design, approx_bits, metrics.mae, metrics.mred, metrics.wce
                );
                points.push(SweepPoint {
                    approx_bits,
                    operators: adder.operator_counts(),
                    metrics,
                });
            }
            results.push(DesignResult { design, points });
        }

        Ok(SimulationReport {
            width,
            workload: WorkloadStats::analyze(&self.vectors),
            results,
        })
    }
}

/// Error metrics of `adder` over `vectors`, folded in parallel
pub fn evaluate_vectors(adder: &PrefixAdder, vectors: &TestVectors) -> Result<ErrorMetrics> {
    let width = adder.width();
    let acc = vectors
        .pairs
        .par_iter()
        .try_fold(
            || (ErrorAccumulator::new(), AddBuffers::default()),
            |(mut acc, mut buffers), &(a, b)| -> Result<(ErrorAccumulator, AddBuffers)> {
                acc.record(exact_sum(a, b, width), adder.add_with(a, b, &mut buffers)?);
                Ok((acc, buffers))
            },
        )
        .map(|folded| folded.map(|(acc, _)| acc))
        .try_reduce(ErrorAccumulator::new, |left, right| Ok(left.merge(right)))?;
    Ok(acc.finish())
}

/// Metrics for one boundary value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepPoint {
    pub approx_bits: usize,
    pub operators: OperatorCounts,
    pub metrics: ErrorMetrics,
}

/// All boundary values for one design
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignResult {
    pub design: Design,
    pub points: Vec<SweepPoint>,
}

/// A named, K-indexed series of one statistic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSeries {
    pub name: String,
    pub metric: Metric,
    pub points: Vec<(usize, f64)>,
}

/// Summary report from a sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub width: usize,
    pub workload: WorkloadStats,
    pub results: Vec<DesignResult>,
}

impl SimulationReport {
    /// One series per design for the chosen metric
    pub fn series(&self, metric: Metric) -> Vec<MetricSeries> {
        self.results
            .iter()
            .map(|result| MetricSeries {
                name: result.design.name().to_string(),
                metric,
                points: result
                    .points
                    .iter()
                    .map(|p| (p.approx_bits, metric.value(&p.metrics)))
                    .collect(),
            })
            .collect()
    }

    pub fn result(&self, design: Design) -> Option<&DesignResult> {
        self.results.iter().find(|r| r.design == design)
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "╔════════════════════════════════════════════════════════════════════════════╗")?;
        writeln!(f, "║            Approximate Prefix Adder Sweep ({:>2}-bit operands)               ║", self.width)?;
        writeln!(f, "╠════════════════════════════════════════════════════════════════════════════╣")?;
        writeln!(f, "║ Vectors: {:>8}   mean propagate run: {:>5.2}   carry-out: {:>6.2}%        ║",
                 self.workload.vectors, self.workload.mean_propagate_run,
                 self.workload.carry_out_fraction * 100.0)?;

        for result in &self.results {
            writeln!(f, "╠════════════════════════════════════════════════════════════════════════════╣")?;
            writeln!(f, "║ {:<74} ║", result.design.name())?;
            writeln!(f, "║   K │ exact ops │ approx ops │        MAE │       MRED │        WCE │ err%  ║")?;
            writeln!(f, "║ ────┼───────────┼────────────┼────────────┼────────────┼────────────┼────── ║")?;
            for point in &result.points {
                writeln!(
                    f,
                    "║ {:>3} │ {:>9} │ {:>10} │ {:>10.3} │ {:>10.6} │ {:>10} │ {:>5.1} ║",
                    point.approx_bits,
                    point.operators.exact,
                    point.operators.approximate,
                    point.metrics.mae,
                    point.metrics.mred,
                    point.metrics.wce,
                    point.metrics.error_rate * 100.0,
                )?;
            }
        }
        writeln!(f, "╚════════════════════════════════════════════════════════════════════════════╝")?;
        Ok(())
    }
}
