//! Adder Front End
//!
//! Ties the pieces together: operands are encoded, turned into G/P signals,
//! pushed through a topology's schedule and read back as sum bits.
//!
//! [`add`] is the one-shot entry point over [`BitVector`]s. [`PrefixAdder`]
//! validates width and boundary once and keeps the schedule, which is what
//! the sweep harness uses for millions of additions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bits::{width_mask, BitVector, MAX_WIDTH};
use crate::error::{AdderError, Result};
use crate::prefix::{gp_signals, ApproxBoundary, GpSignal};
use crate::schedule::{CarryVector, OperatorCounts, Schedule, StageBuffer};
use crate::topology::{brent_kung, Topology};

/// A simulated adder: one of the four prefix topologies with the in-tree
/// approximation rule, or the split ripple/tree Brent–Kung formulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Design {
    BrentKung,
    KoggeStone,
    Sklansky,
    LadnerFischer,
    /// Ripple chain over the K LSBs next to an exact Brent–Kung tree
    SplitBrentKung,
}

impl Design {
    pub const ALL: [Design; 5] = [
        Design::BrentKung,
        Design::KoggeStone,
        Design::Sklansky,
        Design::LadnerFischer,
        Design::SplitBrentKung,
    ];

    /// Underlying carry-network topology
    pub fn topology(&self) -> Topology {
        match self {
            Design::BrentKung | Design::SplitBrentKung => Topology::BrentKung,
            Design::KoggeStone => Topology::KoggeStone,
            Design::Sklansky => Topology::Sklansky,
            Design::LadnerFischer => Topology::LadnerFischer,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Design::SplitBrentKung => "Brent-Kung (split LSB)",
            other => other.topology().name(),
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Design::SplitBrentKung => "bk-split",
            other => other.topology().short_name(),
        }
    }

    /// Schedule for `width` bits with `approx_bits` approximated LSBs
    pub fn schedule(&self, width: usize, approx_bits: usize) -> Schedule {
        match self {
            Design::SplitBrentKung => brent_kung::split_schedule(width, approx_bits),
            other => other.topology().schedule(width),
        }
    }

    /// Boundary handed to the executor. The split design approximates by
    /// structure, so all of its merges stay exact.
    fn executor_boundary(&self, boundary: ApproxBoundary) -> ApproxBoundary {
        match self {
            Design::SplitBrentKung => ApproxBoundary::exact(),
            _ => boundary,
        }
    }
}

impl From<Topology> for Design {
    fn from(topology: Topology) -> Self {
        match topology {
            Topology::BrentKung => Design::BrentKung,
            Topology::KoggeStone => Design::KoggeStone,
            Topology::Sklansky => Design::Sklansky,
            Topology::LadnerFischer => Design::LadnerFischer,
        }
    }
}

impl fmt::Display for Design {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Design {
    type Err = AdderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "bk-split" | "split-brent-kung" | "brent-kung-split" => Ok(Design::SplitBrentKung),
            _ => s.parse::<Topology>().map(Design::from),
        }
    }
}

/// Reusable rows for [`PrefixAdder::add_with`]. One set per worker keeps
/// repeated additions free of allocation.
#[derive(Debug, Clone, Default)]
pub struct AddBuffers {
    current: Vec<GpSignal>,
    next: Vec<GpSignal>,
}

/// A validated adder instance with its schedule built once.
///
/// [`trace`](Self::trace) and [`add_bits`](Self::add_bits) keep every stage
/// in a `(stages + 1) x width` arena. [`add`](Self::add) and
/// [`add_with`](Self::add_with) only keep two rows.
#[derive(Debug, Clone)]
pub struct PrefixAdder {
    design: Design,
    width: usize,
    boundary: ApproxBoundary,
    schedule: Schedule,
}

impl PrefixAdder {
    pub fn new(design: Design, width: usize, approx_bits: usize) -> Result<Self> {
        if width == 0 || width > MAX_WIDTH {
            return Err(AdderError::invalid_width(width));
        }
        let boundary = ApproxBoundary::new(approx_bits, width)?;
        Ok(PrefixAdder {
            design,
            width,
            boundary,
            schedule: design.schedule(width, approx_bits),
        })
    }

    /// Adder with no approximation
    pub fn exact(design: Design, width: usize) -> Result<Self> {
        Self::new(design, width, 0)
    }

    pub fn design(&self) -> Design {
        self.design
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn approx_bits(&self) -> usize {
        self.boundary.get()
    }

    pub fn boundary(&self) -> ApproxBoundary {
        self.boundary
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Exact vs approximate operators this adder instantiates
    pub fn operator_counts(&self) -> OperatorCounts {
        self.schedule.operator_counts(self.design.executor_boundary(self.boundary))
    }

    /// Full stage-by-stage evaluation for two operands
    pub fn trace(&self, a: &BitVector, b: &BitVector) -> Result<StageBuffer> {
        self.check_operand(a)?;
        let initial = gp_signals(a, b)?;
        Ok(self.schedule.evaluate(&initial, self.design.executor_boundary(self.boundary)))
    }

    /// Final carry vector for two operands
    pub fn carries(&self, a: &BitVector, b: &BitVector) -> Result<CarryVector> {
        Ok(self.trace(a, b)?.carries())
    }

    /// Sum bits for two operands of this adder's width
    pub fn add_bits(&self, a: &BitVector, b: &BitVector) -> Result<BitVector> {
        let buffer = self.trace(a, b)?;
        Ok(buffer.carries().sum(buffer.initial()))
    }

    /// Sum of two integers, modulo `2^width` (plus any approximation error)
    pub fn add(&self, a: u64, b: u64) -> Result<u64> {
        self.add_with(a, b, &mut AddBuffers::default())
    }

    /// [`add`](Self::add) evaluated in caller-owned rows
    pub fn add_with(&self, a: u64, b: u64, buffers: &mut AddBuffers) -> Result<u64> {
        let mask = width_mask(self.width);
        for value in [a, b] {
            if value & !mask != 0 {
                return Err(AdderError::OperandOutOfRange { value, width: self.width });
            }
        }

        let AddBuffers { current, next } = buffers;
        current.clear();
        current.extend((0..self.width).map(|i| GpSignal::from_bits((a >> i) & 1 == 1, (b >> i) & 1 == 1)));
        self.schedule
            .resolve(current, next, self.design.executor_boundary(self.boundary));

        // c[i + 1] = G[i]; the carry out falls off the top.
        let generate = current
            .iter()
            .enumerate()
            .fold(0u64, |acc, (i, signal)| acc | ((signal.generate as u64) << i));
        Ok((a ^ b ^ (generate << 1)) & mask)
    }

    fn check_operand(&self, bits: &BitVector) -> Result<()> {
        if bits.width() != self.width {
            return Err(AdderError::WidthMismatch {
                left: self.width,
                right: bits.width(),
            });
        }
        Ok(())
    }
}

/// `add`: sum bits of `a + b` through `topology`, approximating `approx_bits` LSBs
pub fn add(topology: Topology, a: &BitVector, b: &BitVector, approx_bits: usize) -> Result<BitVector> {
    if a.width() != b.width() {
        return Err(AdderError::WidthMismatch {
            left: a.width(),
            right: b.width(),
        });
    }
    PrefixAdder::new(topology.into(), a.width(), approx_bits)?.add_bits(a, b)
}

/// Reference result: `(a + b) mod 2^width`
pub fn exact_sum(a: u64, b: u64, width: usize) -> u64 {
    a.wrapping_add(b) & width_mask(width)
}
