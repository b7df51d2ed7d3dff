//! Topology Comparison Module
//!
//! Side-by-side structure of the prefix networks for one width:
//! - Nominal stages and logical depth
//! - Operator count (area proxy)
//! - Worst single-stage fan-out (wiring/load proxy)
//! - Exactness check of the K = 0 adder

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::adder::{exact_sum, AddBuffers, Design, PrefixAdder};
use crate::bits::width_mask;
use crate::error::Result;

/// Widest adder whose every operand pair is checked (4096 pairs)
const VERIFY_EXHAUSTIVE_WIDTH: usize = 6;

/// Random pairs checked when a width is too wide to enumerate
const VERIFY_SAMPLES: usize = 4096;

/// Structure comparison across designs at one width
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyComparison {
    pub width: usize,
    pub designs: Vec<TopologyMetrics>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyMetrics {
    pub design: Design,
    pub stages: usize,
    pub depth: usize,
    pub merge_ops: usize,
    pub max_fanout: usize,
    /// The K = 0 adder matched `(a + b) mod 2^W` on every checked pair
    pub verified_exact: bool,
}

impl TopologyComparison {
    /// Compare the four topologies at `width`
    pub fn run(width: usize) -> Result<Self> {
        let designs = [
            Design::BrentKung,
            Design::KoggeStone,
            Design::Sklansky,
            Design::LadnerFischer,
        ];
        Self::run_designs(width, &designs)
    }

    pub fn run_designs(width: usize, designs: &[Design]) -> Result<Self> {
        let designs = designs
            .iter()
            .map(|&design| Self::measure(design, width))
            .collect::<Result<Vec<_>>>()?;
        Ok(TopologyComparison { width, designs })
    }

    fn measure(design: Design, width: usize) -> Result<TopologyMetrics> {
        let adder = PrefixAdder::exact(design, width)?;
        let schedule = adder.schedule();
        let verified_exact = verify_exact(&adder)?;
        log::debug!("{} at {} bits: exact = {}", design, width, verified_exact);

        Ok(TopologyMetrics {
            design,
            stages: schedule.stage_count(),
            depth: schedule.depth(),
            merge_ops: schedule.merge_count(),
            max_fanout: schedule.max_fanout(),
            verified_exact,
        })
    }

    pub fn get(&self, design: Design) -> Option<&TopologyMetrics> {
        self.designs.iter().find(|m| m.design == design)
    }

    /// Generate comparison report
    pub fn report(&self) -> String {
        let mut report = String::new();

        report.push_str("╔════════════════════════════════════════════════════════════════════════╗\n");
        report.push_str(&format!(
            "║                 PREFIX NETWORK COMPARISON ({:>2}-bit)                      ║\n",
            self.width
        ));
        report.push_str("╠════════════════════════════════════════════════════════════════════════╣\n");
        report.push_str("║ Design                  │ Stages │ Depth │ Operators │ Fan-out │ Exact  ║\n");
        report.push_str("╠════════════════════════════════════════════════════════════════════════╣\n");

        for m in &self.designs {
            report.push_str(&format!(
                "║ {:23} │ {:6} │ {:5} │ {:9} │ {:7} │ {:6} ║\n",
                m.design.name(),
                m.stages,
                m.depth,
                m.merge_ops,
                m.max_fanout,
                if m.verified_exact { "yes" } else { "NO" },
            ));
        }

        report.push_str("╚════════════════════════════════════════════════════════════════════════╝\n");

        report.push_str("\nKEY INSIGHTS:\n");
        report.push_str("─────────────\n");

        if let Some(fewest) = self.designs.iter().min_by_key(|m| m.merge_ops) {
            report.push_str(&format!(
                "• Fewest operators: {} ({})\n",
                fewest.design, fewest.merge_ops
            ));
        }
        if let Some(shallowest) = self.designs.iter().min_by_key(|m| (m.depth, m.max_fanout)) {
            report.push_str(&format!(
                "• Shallowest: {} ({} levels, fan-out {})\n",
                shallowest.design, shallowest.depth, shallowest.max_fanout
            ));
        }
        if let (Some(ks), Some(bk)) = (self.get(Design::KoggeStone), self.get(Design::BrentKung)) {
            report.push_str(&format!(
                "• Kogge-Stone vs Brent-Kung operators: {:.1}x\n",
                ks.merge_ops as f64 / bk.merge_ops.max(1) as f64
            ));
        }

        report
    }
}

/// Check the adder against integer addition: every pair for small
/// widths, a fixed-seed sample otherwise
fn verify_exact(adder: &PrefixAdder) -> Result<bool> {
    let width = adder.width();
    let mut buffers = AddBuffers::default();
    let mut add = |a, b| adder.add_with(a, b, &mut buffers);
    if width <= VERIFY_EXHAUSTIVE_WIDTH {
        let max = 1u64 << width;
        for a in 0..max {
            for b in 0..max {
                if add(a, b)? != exact_sum(a, b, width) {
                    return Ok(false);
                }
            }
        }
        return Ok(true);
    }

    let mask = width_mask(width);
    let mut rng = StdRng::seed_from_u64(width as u64);
    for _ in 0..VERIFY_SAMPLES {
        let (a, b) = (rng.gen_range(0..=mask), rng.gen_range(0..=mask));
        if add(a, b)? != exact_sum(a, b, width) {
            return Ok(false);
        }
    }
    // All-propagate plus one: the longest possible carry chain.
    Ok(add(mask, 1)? == exact_sum(mask, 1, width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topology_comparison() {
        let comparison = TopologyComparison::run(16).unwrap();
        println!("{}", comparison.report());

        assert_eq!(comparison.designs.len(), 4);
        assert!(comparison.designs.iter().all(|m| m.verified_exact));

        let bk = comparison.get(Design::BrentKung).unwrap();
        let ks = comparison.get(Design::KoggeStone).unwrap();
        let sk = comparison.get(Design::Sklansky).unwrap();
        let lf = comparison.get(Design::LadnerFischer).unwrap();

        assert_eq!((bk.stages, bk.merge_ops), (7, 26));
        assert_eq!((ks.stages, ks.merge_ops), (4, 49));
        assert_eq!((sk.stages, sk.merge_ops, sk.max_fanout), (4, 32, 8));
        assert_eq!((lf.stages, lf.merge_ops), (5, 27));
        assert_eq!(ks.max_fanout, 1);
    }

    #[test]
    fn test_small_width_is_checked_exhaustively() {
        let comparison = TopologyComparison::run_designs(5, &Design::ALL).unwrap();
        assert!(comparison.designs.iter().all(|m| m.verified_exact));
        assert_eq!(comparison.get(Design::Sklansky).unwrap().merge_ops, 5);
    }

    #[test]
    fn test_verify_catches_approximate_adders() {
        // Widths on both sides of the exhaustive cutoff
        for width in [VERIFY_EXHAUSTIVE_WIDTH, VERIFY_EXHAUSTIVE_WIDTH + 1] {
            let exact = PrefixAdder::exact(Design::KoggeStone, width).unwrap();
            assert!(verify_exact(&exact).unwrap());
            let approx = PrefixAdder::new(Design::KoggeStone, width, width).unwrap();
            assert!(!verify_exact(&approx).unwrap(), "width {width}");
        }
    }

    #[test]
    fn test_invalid_width() {
        assert!(TopologyComparison::run(0).is_err());
        assert!(TopologyComparison::run(65).is_err());
    }
}
