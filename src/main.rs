//! Approximate Prefix Adder Simulator - Command Line Interface
//!
//! Usage:
//!   ppa-sim add A B [OPTIONS]        Add two operands, exact vs approximate
//!   ppa-sim trace A B [OPTIONS]      Show every stage of the prefix network
//!   ppa-sim simulate [OPTIONS]       Sweep K and report error metrics
//!   ppa-sim compare [OPTIONS]        Compare network structure
//!   ppa-sim explore [OPTIONS]        Design space exploration
//!   ppa-sim verify [OPTIONS]         Exhaustive exactness check
//!   ppa-sim profile [OPTIONS]        Measure simulation throughput
//!   ppa-sim init-config [OPTIONS]    Write a sweep configuration file

use std::io::Write;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use serde::Serialize;

use prefix_adder_sim::prelude::*;
use prefix_adder_sim::workloads::MAX_EXHAUSTIVE_WIDTH;

#[derive(Parser)]
#[command(name = "ppa-sim")]
#[command(about = "Approximate Parallel-Prefix Adder Simulator - accuracy vs hardware trade-offs")]
#[command(version)]
struct Cli {
    /// Output results in JSON format (for machine parsing)
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add two operands with one design
    Add {
        /// First operand: decimal, 0x hex, or 0b bit string
        a: String,

        /// Second operand
        b: String,

        /// Operand width in bits
        #[arg(short, long, default_value = "16")]
        width: usize,

        /// Adder design (bk, ks, sk, lf, bk-split)
        #[arg(short, long, default_value = "ks")]
        design: Design,

        /// Number of approximated least significant bits (K)
        #[arg(short = 'k', long, default_value = "0")]
        approx_bits: usize,
    },

    /// Print the (G, P) signals after every stage
    Trace {
        a: String,

        b: String,

        #[arg(short, long, default_value = "8")]
        width: usize,

        #[arg(short, long, default_value = "bk")]
        design: Design,

        #[arg(short = 'k', long, default_value = "0")]
        approx_bits: usize,
    },

    /// Sweep the approximation boundary and report error metrics
    Simulate {
        /// TOML configuration file (see init-config); flags below are ignored
        #[arg(short, long)]
        config: Option<String>,

        #[arg(short, long, default_value = "16")]
        width: usize,

        /// Designs to sweep, comma separated
        #[arg(short, long, value_delimiter = ',')]
        designs: Vec<Design>,

        /// Workload (uniform, exhaustive, carry-chain)
        #[arg(long, default_value = "uniform")]
        workload: WorkloadKind,

        /// Number of operand pairs
        #[arg(short, long, default_value = "10000")]
        vectors: usize,

        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Print one metric as K-indexed series instead of the full table
        #[arg(short, long)]
        metric: Option<Metric>,
    },

    /// Compare stages, operators and fan-out of the prefix networks
    Compare {
        #[arg(short, long, default_value = "16")]
        width: usize,
    },

    /// Explore (design, width, K) combinations
    Explore {
        /// Widths to explore, comma separated
        #[arg(long, value_delimiter = ',', default_value = "8,16")]
        widths: Vec<usize>,

        #[arg(short, long, value_delimiter = ',')]
        designs: Vec<Design>,

        #[arg(short, long, default_value = "2000")]
        vectors: usize,

        /// Report the best point for this objective
        #[arg(short, long, default_value = "balanced")]
        objective: Objective,

        /// Output Pareto frontier only
        #[arg(short, long)]
        pareto_only: bool,
    },

    /// Check every exact design against integer addition on all operand pairs
    Verify {
        /// Largest width to check
        #[arg(short, long, default_value = "8")]
        max_width: usize,
    },

    /// Profile simulator throughput per design
    Profile {
        #[arg(short, long, default_value = "32")]
        width: usize,

        #[arg(short, long, default_value = "100000")]
        additions: usize,

        #[arg(short = 'k', long, default_value = "0")]
        approx_bits: usize,
    },

    /// Write a configuration file for `simulate --config`
    InitConfig {
        #[arg(short, long, default_value = "ppa-sim.toml")]
        output: String,

        /// Preset (default, small, split-brent-kung)
        #[arg(short, long, default_value = "default")]
        preset: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let json_output = cli.json;

    match cli.command {
        Commands::Add { a, b, width, design, approx_bits } => {
            run_add(&a, &b, width, design, approx_bits, json_output)
        }
        Commands::Trace { a, b, width, design, approx_bits } => {
            run_trace(&a, &b, width, design, approx_bits, json_output)
        }
        Commands::Simulate { config, width, designs, workload, vectors, seed, metric } => {
            let config = match config {
                Some(path) => SimulationConfig::load(&path)
                    .with_context(|| format!("failed to load configuration {path}"))?,
                None => {
                    let mut config = SimulationConfig::default();
                    config.adder.width = width;
                    if !designs.is_empty() {
                        config.adder.designs = designs;
                    }
                    config.workload = WorkloadConfig { kind: workload, vectors, seed };
                    config
                }
            };
            run_simulation(config, metric, json_output)
        }
        Commands::Compare { width } => run_comparison(width, json_output),
        Commands::Explore { widths, designs, vectors, objective, pareto_only } => {
            run_exploration(widths, designs, vectors, objective, pareto_only, json_output)
        }
        Commands::Verify { max_width } => run_verify(max_width, json_output),
        Commands::Profile { width, additions, approx_bits } => {
            run_profiling(width, additions, approx_bits, json_output)
        }
        Commands::InitConfig { output, preset } => write_config(&output, &preset),
    }
}

fn banner(title: &str) {
    println!("{}", "╔══════════════════════════════════════════════════════════════╗".cyan());
    println!("{}", format!("║ {:^60} ║", title).cyan());
    println!("{}", "╚══════════════════════════════════════════════════════════════╝".cyan());
    println!();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Decimal, `0x` hex, or `0b` bit string, checked against `width`
fn parse_operand(input: &str, width: usize) -> Result<BitVector> {
    let input = input.trim();
    if input.starts_with("0b") {
        let bits: BitVector = input.parse()?;
        if bits.width() != width {
            bail!("operand {input} has {} bits, expected {width}", bits.width());
        }
        return Ok(bits);
    }
    let value = match input.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => input.replace('_', "").parse::<u64>(),
    }
    .with_context(|| format!("invalid operand {input:?}"))?;
    Ok(to_bits(value, width)?)
}

/// JSON output structure for a single addition
#[derive(Serialize)]
struct AddOutput {
    design: Design,
    width: usize,
    approx_bits: usize,
    a: u64,
    b: u64,
    exact: u64,
    approximate: u64,
    sum_bits: String,
    error: u64,
    differing_bits: Vec<usize>,
    carry_out: bool,
}

fn run_add(a: &str, b: &str, width: usize, design: Design, approx_bits: usize, json_output: bool) -> Result<()> {
    let adder = PrefixAdder::new(design, width, approx_bits)?;
    let a = parse_operand(a, width)?;
    let b = parse_operand(b, width)?;

    let sum = adder.add_bits(&a, &b)?;
    let carries = adder.carries(&a, &b)?;
    let exact_bits = to_bits(exact_sum(a.to_value(), b.to_value(), width), width)?;

    let output = AddOutput {
        design,
        width,
        approx_bits,
        a: a.to_value(),
        b: b.to_value(),
        exact: exact_bits.to_value(),
        approximate: sum.to_value(),
        sum_bits: sum.to_string(),
        error: exact_bits.to_value().abs_diff(sum.to_value()),
        differing_bits: exact_bits.diff_positions(&sum),
        carry_out: carries.carry_out(),
    };

    if json_output {
        return print_json(&output);
    }

    println!("{} (W = {}, K = {})", design.name().bold(), width, approx_bits);
    println!("  a           = {:>w$}  ({})", a, output.a, w = width);
    println!("  b           = {:>w$}  ({})", b, output.b, w = width);
    println!("  exact       = {:>w$}  ({})", exact_bits, output.exact, w = width);
    let line = format!("  approximate = {:>w$}  ({})", sum, output.approximate, w = width);
    if output.error == 0 {
        println!("{}", line.green());
    } else {
        println!("{}", line.yellow());
        println!(
            "  error {} at bit positions {:?}",
            output.error.to_string().red(),
            output.differing_bits
        );
    }
    println!("  carry out   = {}", output.carry_out as u8);
    Ok(())
}

fn run_trace(a: &str, b: &str, width: usize, design: Design, approx_bits: usize, json_output: bool) -> Result<()> {
    let adder = PrefixAdder::new(design, width, approx_bits)?;
    let a = parse_operand(a, width)?;
    let b = parse_operand(b, width)?;
    let buffer = adder.trace(&a, &b)?;
    let sum = buffer.carries().sum(buffer.initial());

    if json_output {
        #[derive(Serialize)]
        struct TraceOutput {
            design: Design,
            approx_bits: usize,
            schedule: Schedule,
            stages: Vec<Vec<GpSignal>>,
            carries: CarryVector,
            sum: String,
        }
        let stages = (0..=buffer.stage_count()).map(|s| buffer.row(s).to_vec()).collect();
        return print_json(&TraceOutput {
            design,
            approx_bits,
            schedule: adder.schedule().clone(),
            stages,
            carries: buffer.carries(),
            sum: sum.to_string(),
        });
    }

    banner(&format!("{} trace, W = {}, K = {}", design.name(), width, approx_bits));
    let counts = adder.operator_counts();
    println!(
        "Stages: {}  Operators: {} exact, {} approximate",
        buffer.stage_count(),
        counts.exact,
        counts.approximate
    );
    for (index, stage) in adder.schedule().stages().iter().enumerate() {
        let steps: Vec<String> = stage
            .steps
            .iter()
            .map(|s| {
                let step = format!("{}←{}", s.target, s.source);
                if adder.boundary().contains(s.target) && design != Design::SplitBrentKung {
                    step.yellow().to_string()
                } else {
                    step
                }
            })
            .collect();
        println!("  stage {:>2}: {}", index + 1, steps.join(" "));
    }
    println!();
    println!("{}", buffer.render());
    println!("sum = {} ({})", sum.to_string().bold(), sum.to_value());
    Ok(())
}

fn run_simulation(config: SimulationConfig, metric: Option<Metric>, json_output: bool) -> Result<()> {
    if !json_output {
        banner("Approximate Prefix Adder Sweep");
        println!("Configuration:");
        println!("  • Width: {} bits", config.adder.width);
        println!("  • Designs: {}", config.adder.designs.len());
        println!("  • K range: {:?}", config.approx_bits_range());
        println!("  • Workload: {} ({} vectors, seed {})",
                 config.workload.kind, config.workload.vectors, config.workload.seed);
        println!();
        println!("{}", "Running sweep...".yellow());
    }

    let engine = SimulationEngine::new(config).context("invalid sweep configuration")?;
    let start = std::time::Instant::now();
    let report = engine.run()?;
    let elapsed = start.elapsed();

    match (json_output, metric) {
        (true, Some(metric)) => print_json(&report.series(metric))?,
        (true, None) => print_json(&report)?,
        (false, Some(metric)) => {
            println!("{}", metric.label().green());
            for series in report.series(metric) {
                let values: Vec<String> = series
                    .points
                    .iter()
                    .map(|(k, v)| format!("{k}:{v:.4}"))
                    .collect();
                println!("  {:23} {}", series.name, values.join(" "));
            }
        }
        (false, None) => {
            println!("{}", "Sweep complete!".green());
            println!();
            println!("{}", report);
        }
    }
    if !json_output {
        println!("Wall-clock time: {:.3}s", elapsed.as_secs_f64());
    }
    Ok(())
}

fn run_comparison(width: usize, json_output: bool) -> Result<()> {
    let comparison = TopologyComparison::run(width)?;
    if json_output {
        return print_json(&comparison);
    }
    banner("Prefix Network Comparison");
    println!("{}", comparison.report());
    Ok(())
}

fn run_exploration(
    widths: Vec<usize>,
    designs: Vec<Design>,
    vectors: usize,
    objective: Objective,
    pareto_only: bool,
    json_output: bool,
) -> Result<()> {
    let mut space = DesignSpace {
        widths,
        ..Default::default()
    };
    if !designs.is_empty() {
        space.designs = designs;
    }
    let workload = WorkloadConfig {
        vectors,
        ..Default::default()
    };

    if !json_output {
        banner("Design Space Exploration");
        println!("Exploring {} configurations...", space.enumerate().len());
        println!();
    }

    let explorer = DesignExplorer::new(space, workload);
    let points = if json_output {
        explorer.explore()?
    } else {
        let points = explorer.explore_with_progress(|current, total| {
            print!("\rProgress: {}/{} ({:.1}%)", current, total,
                   100.0 * current as f64 / total as f64);
            let _ = std::io::stdout().flush();
        })?;
        println!();
        points
    };

    let best = explorer.find_best(&points, objective).cloned();
    let frontier = ParetoFrontier::compute(points);

    if json_output {
        #[derive(Serialize)]
        struct ExploreOutput {
            objective: Objective,
            best: Option<DesignPoint>,
            frontier: ParetoFrontier,
        }
        return print_json(&ExploreOutput { objective, best, frontier });
    }

    println!();
    println!("{}", "PARETO-OPTIMAL DESIGNS".green());
    println!("{}", frontier.report());

    if !pareto_only && !frontier.dominated.is_empty() {
        println!("{}", "DOMINATED DESIGNS (first 10)".yellow());
        println!("──────────────────────────────────────────────────────────────────────");
        for point in frontier.dominated.iter().take(10) {
            println!("  {:23} W={:<2} K={:<2} exact ops {:>4}  depth {:>2}  MRED {:.6}",
                     point.design.name(), point.width, point.approx_bits,
                     point.metrics.exact_ops, point.metrics.depth, point.metrics.error.mred);
        }
        println!();
    }

    if let Some(best) = best {
        println!("Best for {}: {} W={} K={} (MRED {:.6}, {} exact operators, depth {})",
                 objective.to_string().bold(), best.design, best.width, best.approx_bits,
                 best.metrics.error.mred, best.metrics.exact_ops, best.metrics.depth);
    }
    Ok(())
}

#[derive(Serialize)]
struct VerifyResult {
    design: Design,
    width: usize,
    pairs: usize,
    exact: bool,
}

fn run_verify(max_width: usize, json_output: bool) -> Result<()> {
    if max_width == 0 || max_width > MAX_EXHAUSTIVE_WIDTH {
        bail!("--max-width must be between 1 and {MAX_EXHAUSTIVE_WIDTH}");
    }
    if !json_output {
        banner("Exhaustive Exactness Check");
    }

    let workload = WorkloadConfig {
        kind: WorkloadKind::Exhaustive,
        ..Default::default()
    };
    let mut results = Vec::new();
    for width in 1..=max_width {
        let vectors = TestVectors::generate(&workload, width)?;
        for design in Design::ALL {
            let adder = PrefixAdder::exact(design, width)?;
            let metrics = prefix_adder_sim::simulation::evaluate_vectors(&adder, &vectors)?;
            let result = VerifyResult {
                design,
                width,
                pairs: vectors.len(),
                exact: metrics.is_exact(),
            };
            if !json_output {
                let status = if result.exact { "ok".green() } else { "MISMATCH".red() };
                println!("  {:2}-bit {:23} {:>8} pairs  {}", width, design.name(), result.pairs, status);
            }
            results.push(result);
        }
    }

    let failures = results.iter().filter(|r| !r.exact).count();
    if json_output {
        print_json(&results)?;
    } else if failures == 0 {
        println!();
        println!("{}", format!("All {} adders exact.", results.len()).green());
    }
    if failures > 0 {
        bail!("{failures} adders disagree with integer addition");
    }
    Ok(())
}

fn run_profiling(width: usize, additions: usize, approx_bits: usize, json_output: bool) -> Result<()> {
    if !json_output {
        banner("Adder Throughput Profile");
        println!("{}", "Profiling designs...".yellow());
    }
    let mut profiler = AdderProfiler::new(width, additions).with_approx_bits(approx_bits);
    profiler.profile_all()?;

    if json_output {
        print_json(&profiler.profiles)
    } else {
        println!("{}", profiler.report());
        Ok(())
    }
}

fn write_config(output: &str, preset: &str) -> Result<()> {
    let config = match preset {
        "default" => SimulationConfig::default(),
        "small" => SimulationConfig::small(),
        "split-brent-kung" | "bk-split" => SimulationConfig::split_brent_kung(),
        other => bail!("unknown preset {other:?} (default, small, split-brent-kung)"),
    };
    config
        .save(output)
        .with_context(|| format!("failed to write {output}"))?;
    println!("{} {}", "Wrote".green(), output);
    Ok(())
}
