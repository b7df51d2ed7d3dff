//! End-to-end scenarios and exhaustive checks through the public API.

use prefix_adder_sim::prelude::*;

#[test]
fn seven_plus_one_is_eight_everywhere() {
    let a = to_bits(7, 4).unwrap();
    let b = to_bits(1, 4).unwrap();
    for topology in Topology::ALL {
        let sum = add(topology, &a, &b, 0).unwrap();
        assert_eq!(sum.to_string(), "1000", "{topology}");
        assert_eq!(from_bits(&sum), 8);
    }
}

#[test]
fn full_approximation_severs_the_carry_chain() {
    let a = to_bits(15, 4).unwrap();
    let b = to_bits(1, 4).unwrap();
    let exact = to_bits(exact_sum(15, 1, 4), 4).unwrap();
    for topology in Topology::ALL {
        let sum = add(topology, &a, &b, 4).unwrap();
        assert_eq!(from_bits(&sum), 12, "{topology}");
        assert_eq!(exact.diff_positions(&sum), vec![2, 3]);
    }
}

#[test]
fn fifteen_plus_one_by_boundary() {
    // Kogge-Stone keeps the stage-2 span into bit 2 exact until K = 3.
    let expected = [
        (Topology::KoggeStone, [0, 0, 4, 12, 12]),
        (Topology::BrentKung, [0, 0, 12, 12, 12]),
        (Topology::Sklansky, [0, 0, 12, 12, 12]),
        (Topology::LadnerFischer, [0, 0, 12, 12, 12]),
    ];
    for (topology, sums) in expected {
        for (k, &sum) in sums.iter().enumerate() {
            let adder = PrefixAdder::new(topology.into(), 4, k).unwrap();
            assert_eq!(adder.add(15, 1).unwrap(), sum, "{topology} K={k}");
        }
    }

    let split: Vec<u64> = (0..=4)
        .map(|k| PrefixAdder::new(Design::SplitBrentKung, 4, k).unwrap().add(15, 1).unwrap())
        .collect();
    assert_eq!(split, vec![0, 12, 8, 0, 0]);
}

#[test]
fn exhaustive_four_bit_every_boundary() {
    for design in Design::ALL {
        for k in 0..=4 {
            let adder = PrefixAdder::new(design, 4, k).unwrap();
            for a in 0..16u64 {
                for b in 0..16u64 {
                    let sum = adder.add(a, b).unwrap();
                    assert!(sum < 16);
                    if k == 0 {
                        assert_eq!(sum, (a + b) % 16, "{design} {a}+{b}");
                    }
                }
            }
        }
    }
}

#[test]
fn exhaustive_eight_bit_exact() {
    let workload = WorkloadConfig {
        kind: WorkloadKind::Exhaustive,
        ..Default::default()
    };
    let vectors = TestVectors::generate(&workload, 8).unwrap();
    assert_eq!(vectors.len(), 65536);
    for design in Design::ALL {
        let adder = PrefixAdder::exact(design, 8).unwrap();
        let metrics = prefix_adder_sim::simulation::evaluate_vectors(&adder, &vectors).unwrap();
        assert!(metrics.is_exact(), "{design}: {metrics:?}");
        assert_eq!(metrics.samples, 65536);
    }
}

#[test]
fn error_grows_with_boundary() {
    let mut config = SimulationConfig::default();
    config.adder.width = 8;
    config.adder.designs = vec![Design::KoggeStone, Design::BrentKung];
    config.workload.kind = WorkloadKind::Exhaustive;
    let report = SimulationEngine::new(config).unwrap().run().unwrap();

    for series in report.series(Metric::Wce) {
        assert_eq!(series.points.first().unwrap().1, 0.0);
        let last = series.points.last().unwrap().1;
        assert!(last > 0.0, "{}", series.name);
        // Worst-case error is bounded by the carries an 8-bit region can lose.
        assert!(last < 256.0);
    }
}

#[test]
fn comparison_and_config_round_trip() {
    let comparison = TopologyComparison::run(32).unwrap();
    let merges: Vec<usize> = comparison.designs.iter().map(|m| m.merge_ops).collect();
    assert_eq!(merges, vec![57, 129, 80, 63]);

    let path = std::env::temp_dir().join(format!("ppa-sim-{}.toml", std::process::id()));
    let path = path.to_string_lossy().to_string();
    let config = SimulationConfig::split_brent_kung();
    config.save(&path).unwrap();
    let loaded = SimulationConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(config, loaded);
}
