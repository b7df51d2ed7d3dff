//! Approximate Parallel-Prefix Adder Simulator
//!
//! A bit-level simulator for parallel-prefix adders and their approximate
//! variants. It serves as a testbed for accuracy/hardware trade-offs,
//! allowing a carry network to be evaluated before it is synthesised.
//!
//! # Overview
//!
//! Every adder runs the same pipeline:
//! - operands become per-bit generate/propagate signals
//! - a topology's merge schedule combines them stage by stage
//! - the final generate signals are the carries, and `sum = p ^ c`
//!
//! Approximation replaces the prefix operator with a pass-through for the
//! K least significant positions, cutting carry logic at the cost of error.
//!
//! # Key Features
//!
//! - **Four topologies**: Brent–Kung, Kogge–Stone, Sklansky, Ladner–Fischer
//! - **Split Brent–Kung**: ripple LSBs next to an exact tree
//! - **Stage traces** of every intermediate (G, P) pair
//! - **Error sweeps** over K with MAE, MRED, worst-case error and error rate
//! - **Design space exploration** with a Pareto frontier
//!
//! # Quick Start
//!
//! ```rust
//! use prefix_adder_sim::prelude::*;
//!
//! let a = to_bits(7, 4).unwrap();
//! let b = to_bits(1, 4).unwrap();
//! let sum = add(Topology::KoggeStone, &a, &b, 0).unwrap();
//! assert_eq!(from_bits(&sum), 8);
//!
//! // Approximate all four positions: the carry chain is severed.
//! let adder = PrefixAdder::new(Design::Sklansky, 4, 4).unwrap();
//! assert_eq!(adder.add(15, 1).unwrap(), 12);
//! ```
//!
//! # Sweeps
//!
//! ```rust,no_run
//! use prefix_adder_sim::prelude::*;
//!
//! let engine = SimulationEngine::new(SimulationConfig::default()).unwrap();
//! let report = engine.run().unwrap();
//! println!("{}", report);
//!
//! let explorer = DesignExplorer::new(DesignSpace::default(), WorkloadConfig::default());
//! let frontier = ParetoFrontier::compute(explorer.explore().unwrap());
//! println!("{}", frontier.report());
//! ```

pub mod adder;
pub mod bits;
pub mod comparison;
pub mod config;
pub mod error;
pub mod explorer;
pub mod metrics;
pub mod prefix;
pub mod profiling;
pub mod schedule;
pub mod simulation;
pub mod topology;
pub mod workloads;

pub use adder::add;
pub use bits::{from_bits, to_bits, BitVector};
pub use error::{AdderError, Result};
pub use prefix::generate_and_propagate;

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::adder::{add, exact_sum, AddBuffers, Design, PrefixAdder};
    pub use crate::bits::{from_bits, to_bits, BitVector, MAX_WIDTH};
    pub use crate::comparison::{TopologyComparison, TopologyMetrics};
    pub use crate::config::{AdderConfig, DesignSpace, SimulationConfig, SweepConfig};
    pub use crate::error::AdderError;
    pub use crate::explorer::{DesignExplorer, DesignMetrics, DesignPoint, Objective, ParetoFrontier};
    pub use crate::metrics::{ErrorAccumulator, ErrorMetrics, Metric};
    pub use crate::prefix::{generate_and_propagate, ApproxBoundary, GpSignal, MergeOp};
    pub use crate::profiling::{AdderProfiler, DesignProfile};
    pub use crate::schedule::{CarryVector, MergeStep, OperatorCounts, Schedule, StageBuffer};
    pub use crate::simulation::{MetricSeries, SimulationEngine, SimulationReport, SweepPoint};
    pub use crate::topology::Topology;
    pub use crate::workloads::{TestVectors, WorkloadConfig, WorkloadKind, WorkloadStats};
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `ceil(log2 n)`, with 0 for `n <= 1`
pub fn ceil_log2(n: usize) -> usize {
    if n <= 1 {
        0
    } else {
        (usize::BITS - (n - 1).leading_zeros()) as usize
    }
}
