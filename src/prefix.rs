//! Generate/Propagate Stage and Prefix Operators
//!
//! The prefix operator combines two adjacent (G, P) spans into one. It is
//! associative but not commutative: the `right` operand is the more
//! significant span. The approximate operator drops the `left` operand, so a
//! carry arriving from less significant positions never reaches the target.
//!
//! Which operator a merge uses is decided by its *target* position alone:
//! targets inside the approximate region (`index < K`) use
//! [`approx_merge`], everything else uses the exact [`merge`].

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::bits::BitVector;
use crate::error::{AdderError, Result};

/// Generate/propagate pair attached to one bit position (or a span of them)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct GpSignal {
    pub generate: bool,
    pub propagate: bool,
}

impl GpSignal {
    pub fn new(generate: bool, propagate: bool) -> Self {
        GpSignal { generate, propagate }
    }

    /// Local signal for one operand bit pair
    pub fn from_bits(a: bool, b: bool) -> Self {
        GpSignal {
            generate: a & b,
            propagate: a ^ b,
        }
    }
}

/// Exact prefix operator: `G = Gr | (Pr & Gl)`, `P = Pr & Pl`
#[inline]
pub fn merge(left: GpSignal, right: GpSignal) -> GpSignal {
    GpSignal {
        generate: right.generate | (right.propagate & left.generate),
        propagate: right.propagate & left.propagate,
    }
}

/// Approximate prefix operator: keeps the right span, discards the left
#[inline]
pub fn approx_merge(_left: GpSignal, right: GpSignal) -> GpSignal {
    right
}

/// Which prefix operator a merge step applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MergeOp {
    Exact,
    Approximate,
}

impl MergeOp {
    #[inline]
    pub fn apply(self, left: GpSignal, right: GpSignal) -> GpSignal {
        match self {
            MergeOp::Exact => merge(left, right),
            MergeOp::Approximate => approx_merge(left, right),
        }
    }
}

/// Number of least-significant positions governed by the approximate operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ApproxBoundary {
    approx_bits: usize,
}

impl ApproxBoundary {
    /// Boundary `K` for a `width`-bit adder; `K` must lie in `[0, width]`
    pub fn new(approx_bits: usize, width: usize) -> Result<Self> {
        if approx_bits > width {
            return Err(AdderError::InvalidApproxBoundary { approx_bits, width });
        }
        Ok(ApproxBoundary { approx_bits })
    }

    /// Boundary that approximates nothing
    pub fn exact() -> Self {
        ApproxBoundary { approx_bits: 0 }
    }

    pub fn get(&self) -> usize {
        self.approx_bits
    }

    pub fn is_exact(&self) -> bool {
        self.approx_bits == 0
    }

    /// Whether position `index` lies in the approximate region
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        index < self.approx_bits
    }

    /// The approximate region as a range of bit positions
    pub fn region(&self) -> Range<usize> {
        0..self.approx_bits
    }

    /// Operator for a merge writing position `target`
    #[inline]
    pub fn operator_for(&self, target: usize) -> MergeOp {
        if self.contains(target) {
            MergeOp::Approximate
        } else {
            MergeOp::Exact
        }
    }
}

/// Per-position signals for two equal-width operands
pub fn gp_signals(a: &BitVector, b: &BitVector) -> Result<Vec<GpSignal>> {
    if a.width() != b.width() {
        return Err(AdderError::WidthMismatch {
            left: a.width(),
            right: b.width(),
        });
    }
    Ok(a.iter().zip(b.iter()).map(|(x, y)| GpSignal::from_bits(x, y)).collect())
}

/// `generateAndPropagate`: split the signals into G and P vectors
pub fn generate_and_propagate(a: &BitVector, b: &BitVector) -> Result<(BitVector, BitVector)> {
    let signals = gp_signals(a, b)?;
    let generate = signals.iter().map(|s| s.generate).collect();
    let propagate = signals.iter().map(|s| s.propagate).collect();
    Ok((BitVector::from_raw(generate), BitVector::from_raw(propagate)))
}
