//! Simulation Configuration Module
//!
//! Everything a sweep needs: operand width, which adder designs to run,
//! the range of approximation boundaries, and how test vectors are drawn.
//! Configurations round-trip through TOML so a sweep can be rerun exactly.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::adder::Design;
use crate::bits::MAX_WIDTH;
use crate::error::{AdderError, Result};
use crate::workloads::{WorkloadConfig, WorkloadKind};

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub adder: AdderConfig,
    pub sweep: SweepConfig,
    pub workload: WorkloadConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdderConfig {
    /// Operand width W in bits (1..=64)
    pub width: usize,
    /// Designs to simulate
    pub designs: Vec<Design>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Smallest approximation boundary K
    pub min_approx_bits: usize,
    /// Largest K; defaults to the width
    pub max_approx_bits: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            adder: AdderConfig {
                width: 16,
                designs: Design::ALL.to_vec(),
            },
            sweep: SweepConfig {
                min_approx_bits: 0,
                max_approx_bits: None,
            },
            workload: WorkloadConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Small exhaustive configuration, fast enough for tests
    pub fn small() -> Self {
        SimulationConfig {
            adder: AdderConfig {
                width: 4,
                designs: Design::ALL.to_vec(),
            },
            workload: WorkloadConfig {
                kind: WorkloadKind::Exhaustive,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// 16-bit sweep of the split Brent–Kung design alone
    pub fn split_brent_kung() -> Self {
        SimulationConfig {
            adder: AdderConfig {
                width: 16,
                designs: vec![Design::SplitBrentKung],
            },
            ..Default::default()
        }
    }

    /// Largest K in the sweep
    pub fn max_approx_bits(&self) -> usize {
        self.sweep.max_approx_bits.unwrap_or(self.adder.width)
    }

    pub fn approx_bits_range(&self) -> RangeInclusive<usize> {
        self.sweep.min_approx_bits..=self.max_approx_bits()
    }

    /// Reject configurations the adders would refuse mid-sweep
    pub fn validate(&self) -> Result<()> {
        let width = self.adder.width;
        if width == 0 || width > MAX_WIDTH {
            return Err(AdderError::invalid_width(width));
        }
        let max = self.max_approx_bits();
        if max > width {
            return Err(AdderError::InvalidApproxBoundary { approx_bits: max, width });
        }
        if self.sweep.min_approx_bits > max {
            return Err(AdderError::InvalidApproxBoundary {
                approx_bits: self.sweep.min_approx_bits,
                width: max,
            });
        }
        Ok(())
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, toml_str)
    }

    /// Load configuration from TOML file
    pub fn load(path: &str) -> std::io::Result<Self> {
        let toml_str = std::fs::read_to_string(path)?;
        toml::from_str(&toml_str)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

/// Design space exploration - parameter ranges
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignSpace {
    pub widths: Vec<usize>,
    pub designs: Vec<Design>,
    /// Boundaries to try; `None` means every K in `0..=W`
    pub approx_bits: Option<Vec<usize>>,
}

impl Default for DesignSpace {
    fn default() -> Self {
        DesignSpace {
            widths: vec![8, 16],
            designs: Design::ALL.to_vec(),
            approx_bits: None,
        }
    }
}

impl DesignSpace {
    /// All (design, width, K) combinations; boundaries wider than a width are skipped
    pub fn enumerate(&self) -> Vec<(Design, usize, usize)> {
        let mut points = Vec::new();
        for &width in &self.widths {
            let ks: Vec<usize> = match &self.approx_bits {
                Some(ks) => ks.iter().copied().filter(|&k| k <= width).collect(),
                None => (0..=width).collect(),
            };
            for &design in &self.designs {
                for &k in &ks {
                    points.push((design, width, k));
                }
            }
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_range_covers_width() {
        let config = SimulationConfig::default();
        assert_eq!(config.approx_bits_range(), 0..=16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut config = SimulationConfig::small();
        config.sweep.max_approx_bits = Some(5);
        assert!(matches!(
            config.validate(),
            Err(AdderError::InvalidApproxBoundary { approx_bits: 5, width: 4 })
        ));

        let mut config = SimulationConfig::small();
        config.adder.width = 0;
        assert_eq!(config.validate(), Err(AdderError::invalid_width(0)));
    }

    #[test]
    fn test_config_serialization() {
        let config = SimulationConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let recovered: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, recovered);

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("split-brent-kung"));
        let recovered: SimulationConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, recovered);
    }

    #[test]
    fn test_design_space_enumeration() {
        let space = DesignSpace {
            widths: vec![4, 8],
            designs: vec![Design::KoggeStone, Design::Sklansky],
            approx_bits: Some(vec![0, 2, 6]),
        };
        let points = space.enumerate();
        // Width 4 drops K = 6.
        assert_eq!(points.len(), 2 * 2 + 2 * 3);
        assert!(points.contains(&(Design::Sklansky, 8, 6)));
    }
}
