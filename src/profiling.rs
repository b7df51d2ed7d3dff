//! Adder Throughput Profiling
//!
//! Measures how fast the simulator itself runs each design:
//! - Additions per second through [`PrefixAdder::add_with`]
//! - Time per merge operator, so wide and narrow networks compare fairly
//!
//! Usage:
//!   let mut profiler = AdderProfiler::new(16, 100_000);
//!   profiler.profile_all()?;
//!   println!("{}", profiler.report());

use std::hint::black_box;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::adder::{AddBuffers, Design, PrefixAdder};
use crate::bits::width_mask;
use crate::error::Result;

/// Timing of one design
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignProfile {
    pub design: Design,
    pub approx_bits: usize,
    pub additions: u64,
    pub merge_ops: usize,
    pub elapsed: Duration,
}

impl DesignProfile {
    pub fn additions_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.additions as f64 / secs
        } else {
            0.0
        }
    }

    /// Wall time per simulated merge operator
    pub fn ns_per_merge(&self) -> f64 {
        let merges = self.additions as f64 * self.merge_ops.max(1) as f64;
        if merges > 0.0 {
            self.elapsed.as_nanos() as f64 / merges
        } else {
            0.0
        }
    }
}

/// Throughput profiler over a fixed batch of random operands
#[derive(Debug)]
pub struct AdderProfiler {
    pub width: usize,
    pub approx_bits: usize,
    pub profiles: Vec<DesignProfile>,
    pub total_time: Duration,
    operands: Vec<(u64, u64)>,
}

impl AdderProfiler {
    pub fn new(width: usize, additions: usize) -> Self {
        let mask = width_mask(width);
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let operands = (0..additions)
            .map(|_| (rng.gen_range(0..=mask), rng.gen_range(0..=mask)))
            .collect();
        AdderProfiler {
            width,
            approx_bits: 0,
            profiles: Vec::new(),
            total_time: Duration::ZERO,
            operands,
        }
    }

    /// Profile adders with `approx_bits` approximated LSBs instead of exact ones
    pub fn with_approx_bits(mut self, approx_bits: usize) -> Self {
        self.approx_bits = approx_bits;
        self
    }

    /// Time one design over the whole operand batch
    pub fn profile(&mut self, design: Design) -> Result<&DesignProfile> {
        let adder = PrefixAdder::new(design, self.width, self.approx_bits)?;

        let mut buffers = AddBuffers::default();
        let start = Instant::now();
        for &(a, b) in &self.operands {
            black_box(adder.add_with(black_box(a), black_box(b), &mut buffers)?);
        }
        let elapsed = start.elapsed();

        self.total_time += elapsed;
        log::debug!("{}: {} additions in {:?}", design, self.operands.len(), elapsed);

        let idx = self.profiles.len();
        self.profiles.push(DesignProfile {
            design,
            approx_bits: self.approx_bits,
            additions: self.operands.len() as u64,
            merge_ops: adder.schedule().merge_count(),
            elapsed,
        });
        Ok(&self.profiles[idx])
    }

    pub fn profile_all(&mut self) -> Result<()> {
        for design in Design::ALL {
            self.profile(design)?;
        }
        Ok(())
    }

    pub fn fastest(&self) -> Option<&DesignProfile> {
        self.profiles
            .iter()
            .max_by(|a, b| a.additions_per_second().total_cmp(&b.additions_per_second()))
    }

    /// Generate detailed report
    pub fn report(&self) -> String {
        let total_secs = self.total_time.as_secs_f64();
        let mut report = String::new();

        report.push_str("╔══════════════════════════════════════════════════════════════════════════╗\n");
        report.push_str("║                    ADDER SIMULATION THROUGHPUT                           ║\n");
        report.push_str("╠══════════════════════════════════════════════════════════════════════════╣\n");
        report.push_str(&format!(
            "║ Width: {:>2} bits   K: {:>2}   Additions per design: {:>10}               ║\n",
            self.width,
            self.approx_bits,
            self.operands.len()
        ));
        report.push_str("╠──────────────────────────────────────────────────────────────────────────╣\n");

        for profile in &self.profiles {
            let percent = if total_secs > 0.0 {
                profile.elapsed.as_secs_f64() / total_secs * 100.0
            } else {
                0.0
            };
            let bar_len = (percent / 4.0) as usize;
            let bar: String = "█".repeat(bar_len.min(20));
            report.push_str(&format!(
                "║ {:23} {:>10.0} add/s {:>6.1} ns/op {:>5.1}% │{:<20}│\n",
                profile.design.name(),
                profile.additions_per_second(),
                profile.ns_per_merge(),
                percent,
                bar
            ));
        }

        report.push_str("╠══════════════════════════════════════════════════════════════════════════╣\n");
        match self.fastest() {
            Some(fastest) => report.push_str(&format!(
                "║ Fastest: {:23} ({:.2e} additions/sec)                  ║\n",
                fastest.design.name(),
                fastest.additions_per_second()
            )),
            None => report.push_str("║ No designs profiled                                                      ║\n"),
        }
        report.push_str("╚══════════════════════════════════════════════════════════════════════════╝\n");

        report
    }
}

/// Quick profiling utilities
pub mod quick {
    use super::*;

    /// Time a closure and return (result, duration)
    pub fn timed<F, R>(f: F) -> (R, Duration)
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        (result, start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiler_basic() {
        let mut profiler = AdderProfiler::new(16, 2000);
        profiler.profile_all().unwrap();

        assert_eq!(profiler.profiles.len(), Design::ALL.len());
        assert!(profiler.profiles.iter().all(|p| p.additions == 2000));
        assert!(profiler.fastest().is_some());

        let ks = &profiler.profiles[1];
        assert_eq!(ks.design, Design::KoggeStone);
        assert_eq!(ks.merge_ops, 49);

        println!("{}", profiler.report());
    }

    #[test]
    fn test_approximate_profile() {
        let mut profiler = AdderProfiler::new(8, 100).with_approx_bits(4);
        let profile = profiler.profile(Design::Sklansky).unwrap();
        assert_eq!(profile.approx_bits, 4);
        assert!(AdderProfiler::new(8, 1).with_approx_bits(9).profile(Design::Sklansky).is_err());
    }

    #[test]
    fn test_empty_profile_is_zero() {
        let profile = DesignProfile {
            design: Design::BrentKung,
            approx_bits: 0,
            additions: 0,
            merge_ops: 11,
            elapsed: Duration::ZERO,
        };
        assert_eq!(profile.additions_per_second(), 0.0);
        assert_eq!(profile.ns_per_merge(), 0.0);
    }

    #[test]
    fn test_timed() {
        let (value, elapsed) = quick::timed(|| (0..100u64).sum::<u64>());
        assert_eq!(value, 4950);
        assert!(elapsed < Duration::from_secs(5));
    }
}
