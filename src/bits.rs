//! Bit Codec
//!
//! Converts fixed-width unsigned integers to and from least-significant-bit
//! first boolean vectors. Index 0 of a [`BitVector`] is always bit 0 of the
//! integer. The text form used by `Display`/`FromStr` is written the way
//! humans read binary: most significant bit first.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AdderError, Result};

/// Widest operand the codec can round-trip through a `u64`
pub const MAX_WIDTH: usize = 64;

/// Ordered sequence of W bits, index 0 = least significant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<bool>", into = "Vec<bool>")]
pub struct BitVector {
    bits: Vec<bool>,
}

impl BitVector {
    /// Encode the low `width` bits of `value`, rejecting values that need more
    pub fn from_value(value: u64, width: usize) -> Result<Self> {
        check_width(width)?;
        if width < MAX_WIDTH && value >> width != 0 {
            return Err(AdderError::OperandOutOfRange { value, width });
        }
        Ok(BitVector {
            bits: (0..width).map(|i| (value >> i) & 1 == 1).collect(),
        })
    }

    /// Build from LSB-first bits
    pub fn from_bools(bits: Vec<bool>) -> Result<Self> {
        check_width(bits.len())?;
        Ok(BitVector { bits })
    }

    /// All-zero vector of the given width
    pub fn zeros(width: usize) -> Result<Self> {
        check_width(width)?;
        Ok(BitVector { bits: vec![false; width] })
    }

    /// Callers guarantee `1 <= bits.len() <= MAX_WIDTH`
    pub(crate) fn from_raw(bits: Vec<bool>) -> Self {
        debug_assert!(!bits.is_empty() && bits.len() <= MAX_WIDTH);
        BitVector { bits }
    }

    /// Decode back to an integer
    pub fn to_value(&self) -> u64 {
        self.bits
            .iter()
            .enumerate()
            .fold(0u64, |acc, (i, &bit)| acc | ((bit as u64) << i))
    }

    pub fn width(&self) -> usize {
        self.bits.len()
    }

    /// Bit at position `index` (0 = LSB)
    pub fn get(&self, index: usize) -> bool {
        self.bits[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// Positions where `self` and `other` differ
    pub fn diff_positions(&self, other: &BitVector) -> Vec<usize> {
        self.bits
            .iter()
            .zip(&other.bits)
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, _)| i)
            .collect()
    }
}

impl TryFrom<Vec<bool>> for BitVector {
    type Error = AdderError;

    fn try_from(bits: Vec<bool>) -> Result<Self> {
        Self::from_bools(bits)
    }
}

impl From<BitVector> for Vec<bool> {
    fn from(bits: BitVector) -> Self {
        bits.bits
    }
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits: String = self.bits.iter().rev().map(|&bit| if bit { '1' } else { '0' }).collect();
        f.pad(&digits)
    }
}

impl FromStr for BitVector {
    type Err = AdderError;

    /// Parse MSB-first digits, e.g. `0111`, `0b0111` or `1000_0001`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || AdderError::InvalidBitString { input: s.to_string() };
        let digits = s.trim();
        let digits = digits.strip_prefix("0b").unwrap_or(digits);

        let mut bits = Vec::with_capacity(digits.len());
        for ch in digits.chars().rev() {
            match ch {
                '0' => bits.push(false),
                '1' => bits.push(true),
                '_' => {}
                _ => return Err(invalid()),
            }
        }
        if bits.is_empty() {
            return Err(invalid());
        }
        Self::from_bools(bits)
    }
}

fn check_width(width: usize) -> Result<()> {
    if width == 0 || width > MAX_WIDTH {
        return Err(AdderError::invalid_width(width));
    }
    Ok(())
}

/// `toBits`: encode `value` as a W-bit LSB-first vector
pub fn to_bits(value: u64, width: usize) -> Result<BitVector> {
    BitVector::from_value(value, width)
}

/// `fromBits`: decode an LSB-first vector
pub fn from_bits(bits: &BitVector) -> u64 {
    bits.to_value()
}

/// Mask selecting the low `width` bits
pub fn width_mask(width: usize) -> u64 {
    if width >= MAX_WIDTH {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lsb_first_encoding() {
        let bits = to_bits(6, 4).unwrap();
        assert_eq!(bits.as_slice(), &[false, true, true, false]);
        assert_eq!(from_bits(&bits), 6);
    }

    #[test]
    fn test_full_width_values() {
        let bits = to_bits(u64::MAX, 64).unwrap();
        assert!(bits.iter().all(|b| b));
        assert_eq!(bits.to_value(), u64::MAX);
    }

    #[test]
    fn test_rejects_bad_widths() {
        assert_eq!(to_bits(0, 0), Err(AdderError::invalid_width(0)));
        assert_eq!(to_bits(0, 65), Err(AdderError::invalid_width(65)));
        assert_eq!(
            to_bits(16, 4),
            Err(AdderError::OperandOutOfRange { value: 16, width: 4 })
        );
    }

    #[test]
    fn test_text_form_is_msb_first() {
        let bits: BitVector = "0111".parse().unwrap();
        assert_eq!(bits.to_value(), 7);
        assert_eq!(bits.width(), 4);
        assert_eq!(bits.to_string(), "0111");

        let bits: BitVector = "0b1000_0001".parse().unwrap();
        assert_eq!(bits.to_value(), 129);
        assert_eq!(bits.width(), 8);

        assert!("01a1".parse::<BitVector>().is_err());
        assert!("".parse::<BitVector>().is_err());
    }

    #[test]
    fn test_deserialize_checks_width() {
        let bits: BitVector = serde_json::from_str("[false, true, true]").unwrap();
        assert_eq!(bits.to_value(), 6);
        assert_eq!(serde_json::to_string(&bits).unwrap(), "[false,true,true]");

        assert!(serde_json::from_str::<BitVector>("[]").is_err());
        let wide = serde_json::to_string(&vec![true; 65]).unwrap();
        assert!(serde_json::from_str::<BitVector>(&wide).is_err());
    }

    #[test]
    fn test_diff_positions() {
        let a = to_bits(0b1010, 4).unwrap();
        let b = to_bits(0b0011, 4).unwrap();
        assert_eq!(a.diff_positions(&b), vec![0, 3]);
    }

    #[test]
    fn test_width_mask() {
        assert_eq!(width_mask(4), 0xF);
        assert_eq!(width_mask(64), u64::MAX);
    }
}
