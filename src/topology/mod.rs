//! Prefix Network Topologies
//!
//! Each topology is a pure schedule generator: given a width it returns the
//! stages of merges its network performs. Exact and approximate variants
//! share the schedule; only the operator chosen per target changes.

pub mod brent_kung;
pub mod kogge_stone;
pub mod ladner_fischer;
pub mod sklansky;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AdderError;
use crate::schedule::Schedule;

/// Carry-network topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    /// Up-sweep/down-sweep tree, `2 log W - 1` levels, ~2W operators
    BrentKung,
    /// Full fan-in at every level, `log W` levels, ~W log W operators
    KoggeStone,
    /// Block divide and conquer, `log W` levels, high pivot fan-out
    Sklansky,
    /// Sklansky over odd positions plus an even fix-up level
    LadnerFischer,
}

impl Topology {
    pub const ALL: [Topology; 4] = [
        Topology::BrentKung,
        Topology::KoggeStone,
        Topology::Sklansky,
        Topology::LadnerFischer,
    ];

    /// Merge schedule of this topology for `width` bits
    pub fn schedule(&self, width: usize) -> Schedule {
        match self {
            Topology::BrentKung => brent_kung::schedule(width),
            Topology::KoggeStone => kogge_stone::schedule(width),
            Topology::Sklansky => sklansky::schedule(width),
            Topology::LadnerFischer => ladner_fischer::schedule(width),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Topology::BrentKung => "Brent-Kung",
            Topology::KoggeStone => "Kogge-Stone",
            Topology::Sklansky => "Sklansky",
            Topology::LadnerFischer => "Ladner-Fischer",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Topology::BrentKung => "bk",
            Topology::KoggeStone => "ks",
            Topology::Sklansky => "sk",
            Topology::LadnerFischer => "lf",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Topology {
    type Err = AdderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "bk" | "brent-kung" => Ok(Topology::BrentKung),
            "ks" | "kogge-stone" => Ok(Topology::KoggeStone),
            "sk" | "sklansky" => Ok(Topology::Sklansky),
            "lf" | "ladner-fischer" => Ok(Topology::LadnerFischer),
            _ => Err(AdderError::UnknownDesign { name: s.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("ks".parse::<Topology>().unwrap(), Topology::KoggeStone);
        assert_eq!("Brent-Kung".parse::<Topology>().unwrap(), Topology::BrentKung);
        assert_eq!("ladner_fischer".parse::<Topology>().unwrap(), Topology::LadnerFischer);
        assert!("ripple".parse::<Topology>().is_err());
    }

    #[test]
    fn test_every_schedule_is_well_formed() {
        for topology in Topology::ALL {
            for width in 1..=64 {
                let schedule = topology.schedule(width);
                assert_eq!(schedule.width(), width);
                assert!(schedule.has_distinct_targets(), "{topology} W={width}");
                let steps = schedule.stages().iter().flat_map(|s| &s.steps);
                assert!(steps.into_iter().all(|s| s.source < s.target && s.target < width));
            }
        }
    }

    #[test]
    fn test_log_depth_topologies() {
        for width in [4, 8, 16, 32, 64] {
            let levels = crate::ceil_log2(width);
            assert_eq!(Topology::KoggeStone.schedule(width).stage_count(), levels);
            assert_eq!(Topology::Sklansky.schedule(width).stage_count(), levels);
            assert_eq!(Topology::BrentKung.schedule(width).stage_count(), 2 * levels - 1);
        }
    }
}
