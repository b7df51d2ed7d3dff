//! Error types
//!
//! Every failure is a caller mistake (bad width, bad boundary, operand too
//! wide) reported synchronously. Divergence of an approximate sum from the
//! exact one is an intended result and never surfaces here.

use crate::bits::MAX_WIDTH;

/// Errors raised by the adder core and the simulation harness
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdderError {
    /// Width is zero or wider than the codec supports
    #[error("invalid width {width}: must be between 1 and {max}")]
    InvalidWidth {
        width: usize,
        max: usize,
    },

    /// The two operands do not have the same width
    #[error("operand widths differ: {left} vs {right}")]
    WidthMismatch {
        left: usize,
        right: usize,
    },

    /// Approximation boundary outside `[0, width]`
    #[error("approximation boundary {approx_bits} outside [0, {width}]")]
    InvalidApproxBoundary {
        approx_bits: usize,
        width: usize,
    },

    /// Integer operand does not fit in the requested width
    #[error("operand {value} does not fit in {width} bits")]
    OperandOutOfRange {
        value: u64,
        width: usize,
    },

    /// Text could not be parsed as an MSB-first bit string
    #[error("invalid bit string {input:?}")]
    InvalidBitString {
        input: String,
    },

    /// Unrecognised topology or design name
    #[error("unknown adder design {name:?} (expected one of: bk, ks, sk, lf, bk-split)")]
    UnknownDesign {
        name: String,
    },

    /// Unrecognised workload, metric or objective name
    #[error("unknown {kind} {name:?} (expected one of: {expected})")]
    UnknownName {
        kind: &'static str,
        name: String,
        expected: &'static str,
    },

    /// Exhaustive workload requested for a width that would not finish
    #[error("exhaustive workload for width {width} is too large (max {max})")]
    WorkloadTooLarge {
        width: usize,
        max: usize,
    },
}

impl AdderError {
    /// Width error for a zero or oversized width
    pub fn invalid_width(width: usize) -> Self {
        Self::InvalidWidth { width, max: MAX_WIDTH }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, AdderError>;
