//! Workload Generators
//!
//! Produces the operand pairs the adders are driven with:
//! - Uniform random pairs (seeded, reproducible)
//! - Exhaustive enumeration for small widths
//! - Carry-chain stress pairs with long propagate runs

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::bits::{width_mask, MAX_WIDTH};
use crate::error::{AdderError, Result};

/// Widest operand for which every pair is enumerated (2^24 pairs)
pub const MAX_EXHAUSTIVE_WIDTH: usize = 12;

/// How operand pairs are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkloadKind {
    /// Independent uniform operands in `[0, 2^W)`
    #[default]
    Uniform,
    /// Every pair in `[0, 2^W)^2`; ignores the vector count
    Exhaustive,
    /// A generate bit followed by a run of propagate bits
    CarryChain,
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WorkloadKind::Uniform => "uniform",
            WorkloadKind::Exhaustive => "exhaustive",
            WorkloadKind::CarryChain => "carry-chain",
        })
    }
}

impl FromStr for WorkloadKind {
    type Err = AdderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" | "random" => Ok(WorkloadKind::Uniform),
            "exhaustive" | "all" => Ok(WorkloadKind::Exhaustive),
            "carry-chain" | "carry" => Ok(WorkloadKind::CarryChain),
            _ => Err(AdderError::UnknownName {
                kind: "workload",
                name: s.to_string(),
                expected: "uniform, exhaustive, carry-chain",
            }),
        }
    }
}

/// Workload configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadConfig {
    pub kind: WorkloadKind,
    /// Number of operand pairs (unused for exhaustive workloads)
    pub vectors: usize,
    /// RNG seed so sweeps are reproducible
    pub seed: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        WorkloadConfig {
            kind: WorkloadKind::Uniform,
            vectors: 1000,
            seed: 42,
        }
    }
}

/// A batch of operand pairs for one width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestVectors {
    pub width: usize,
    pub pairs: Vec<(u64, u64)>,
}

impl TestVectors {
    pub fn generate(config: &WorkloadConfig, width: usize) -> Result<Self> {
        if width == 0 || width > MAX_WIDTH {
            return Err(AdderError::invalid_width(width));
        }
        let pairs = match config.kind {
            WorkloadKind::Uniform => Self::uniform(width, config.vectors, config.seed),
            WorkloadKind::Exhaustive => Self::exhaustive(width)?,
            WorkloadKind::CarryChain => Self::carry_chain(width, config.vectors, config.seed),
        };
        log::debug!("generated {} {} vectors for width {}", pairs.len(), config.kind, width);
        Ok(TestVectors { width, pairs })
    }

    fn uniform(width: usize, count: usize, seed: u64) -> Vec<(u64, u64)> {
        let mask = width_mask(width);
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| (rng.gen_range(0..=mask), rng.gen_range(0..=mask)))
            .collect()
    }

    fn exhaustive(width: usize) -> Result<Vec<(u64, u64)>> {
        if width > MAX_EXHAUSTIVE_WIDTH {
            return Err(AdderError::WorkloadTooLarge {
                width,
                max: MAX_EXHAUSTIVE_WIDTH,
            });
        }
        let max = 1u64 << width;
        Ok((0..max).flat_map(|a| (0..max).map(move |b| (a, b))).collect())
    }

    fn carry_chain(width: usize, count: usize, seed: u64) -> Vec<(u64, u64)> {
        let mask = width_mask(width);
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                let mut a = rng.gen_range(0..=mask);
                // Complement: every position propagates.
                let mut b = !a & mask;

                let start = rng.gen_range(0..width);
                a |= 1 << start;
                b |= 1 << start;

                let end = rng.gen_range(start + 1..=width);
                if end < width {
                    a &= !(1 << end);
                    b &= !(1 << end);
                }
                (a, b)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Longest run of consecutive propagate positions in `a + b`
pub fn longest_propagate_run(a: u64, b: u64, width: usize) -> usize {
    let mut p = (a ^ b) & width_mask(width);
    let mut longest = 0;
    while p != 0 {
        longest += 1;
        p &= p << 1;
    }
    longest
}

/// Statistics about a batch of vectors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadStats {
    pub vectors: usize,
    pub mean_propagate_run: f64,
    pub max_propagate_run: usize,
    /// Fraction of pairs whose exact sum overflows the width
    pub carry_out_fraction: f64,
}

impl WorkloadStats {
    pub fn analyze(vectors: &TestVectors) -> Self {
        let n = vectors.len().max(1) as f64;
        let runs: Vec<usize> = vectors
            .pairs
            .iter()
            .map(|&(a, b)| longest_propagate_run(a, b, vectors.width))
            .collect();
        let overflows = vectors
            .pairs
            .iter()
            .filter(|&&(a, b)| (a as u128 + b as u128) >> vectors.width != 0)
            .count();

        WorkloadStats {
            vectors: vectors.len(),
            mean_propagate_run: runs.iter().sum::<usize>() as f64 / n,
            max_propagate_run: runs.into_iter().max().unwrap_or(0),
            carry_out_fraction: overflows as f64 / n,
        }
    }
}
