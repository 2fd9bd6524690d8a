//! christofides-bench: CLI harness for comparing tour strategies.
//!
//! Loads every `*.txt` distance matrix from a samples directory, runs
//! each selected strategy on each sample, and prints the wall time and
//! whether the tour matches the cost encoded in the sample's file name.
//! Every run is also appended to a CSV log. Useful for:
//!
//! - Comparing Christofides against the double-tree and 2-opt heuristics
//! - Measuring the cost of exact versus greedy matching
//! - Inspecting per-stage timings of the Christofides pipeline
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin christofides-bench -- [OPTIONS] <SAMPLES_DIR>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod error;
mod logging;
mod samples;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use christofides_export::{RunRecord, format_path, to_csv};
use christofides_pipeline::diagnostics::{Clock, process_staged_with_diagnostics};
use christofides_pipeline::{MatchingKind, Sample, Tour, TourConfig, TourStrategyKind, build_tour};
use clap::{Parser, ValueEnum};

use crate::error::{BenchError, Result};
use crate::logging::LogLevel;

/// Absolute cost difference still graded as a correct tour.
const EPSILON: f64 = 1e-9;

/// Time tour strategies on sample distance matrices.
///
/// Sample files are whitespace-separated square matrices named
/// `tsp<id>_<cost>.txt`, where `<cost>` is the optimal tour cost.
#[derive(Parser)]
#[command(name = "christofides-bench", version)]
struct Cli {
    /// Directory holding the `*.txt` samples.
    samples_dir: PathBuf,

    /// Strategy to run (repeatable). Defaults to every strategy.
    #[arg(long, value_enum)]
    strategy: Vec<Strategy>,

    /// Perfect matching engine used by Christofides.
    #[arg(long, value_enum, default_value_t = CLI_DEFAULT_MATCHING)]
    matching: Matching,

    /// Maximum number of improvement passes for 2-opt.
    #[arg(long, default_value_t = TourConfig::DEFAULT_TWO_OPT_MAX_PASSES, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    two_opt_max_passes: usize,

    /// Number of timed runs per strategy and sample.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Where to write the CSV run log. Defaults to `<SAMPLES_DIR>/log.csv`.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Print per-stage diagnostics of Christofides runs as JSON.
    #[arg(long)]
    json: bool,

    /// Print per-stage diagnostics of Christofides runs as a text report.
    #[arg(long, conflicts_with = "json")]
    report: bool,

    /// Full tour config as a JSON string.
    ///
    /// When provided, `--strategy`, `--matching` and
    /// `--two-opt-max-passes` are ignored. The JSON must be a valid
    /// `TourConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Append a random Euclidean sample with this many vertices.
    #[arg(long)]
    random: Option<usize>,

    /// Seed for `--random`.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Log verbosity on stderr.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    /// Prefix log lines with a millisecond timestamp.
    #[arg(long)]
    log_timestamp: bool,
}

/// Tour strategy selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Strategy {
    /// MST, perfect matching on odd vertices, Euler circuit, shortcut.
    Christofides,
    /// Preorder walk of the minimum spanning tree.
    DoubleTree,
    /// Local search with segment reversals.
    TwoOpt,
}

impl From<Strategy> for TourStrategyKind {
    fn from(s: Strategy) -> Self {
        match s {
            Strategy::Christofides => Self::Christofides,
            Strategy::DoubleTree => Self::DoubleTree,
            Strategy::TwoOpt => Self::TwoOpt,
        }
    }
}

/// Perfect matching engine selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Matching {
    /// Cheapest partner first. Fast, no approximation bound.
    Greedy,
    /// Minimum-weight perfect matching (blossom).
    Exact,
}

/// Maps a [`MatchingKind`] to the local CLI [`Matching`] enum.
const fn matching_from_pipeline(kind: MatchingKind) -> Matching {
    match kind {
        MatchingKind::Greedy => Matching::Greedy,
        MatchingKind::Exact => Matching::Exact,
    }
}

/// The CLI default matching, derived from [`TourConfig::DEFAULT_MATCHING`]
/// so the two cannot silently diverge.
const CLI_DEFAULT_MATCHING: Matching = matching_from_pipeline(TourConfig::DEFAULT_MATCHING);

/// Build one [`TourConfig`] per selected strategy.
///
/// If `--config-json` is provided, the JSON is parsed directly and
/// yields the only config. Strategies are deduplicated and ordered
/// alphabetically.
fn configs_from_cli(cli: &Cli) -> Result<Vec<TourConfig>> {
    if let Some(ref json) = cli.config_json {
        let config: TourConfig = serde_json::from_str(json).map_err(BenchError::ConfigJson)?;
        config.validate()?;
        return Ok(vec![config]);
    }

    let mut strategies: Vec<TourStrategyKind> = if cli.strategy.is_empty() {
        TourStrategyKind::ALL.to_vec()
    } else {
        cli.strategy.iter().copied().map(Into::into).collect()
    };
    strategies.sort_by_cached_key(ToString::to_string);
    strategies.dedup();

    let matching = match cli.matching {
        Matching::Greedy => MatchingKind::Greedy,
        Matching::Exact => MatchingKind::Exact,
    };

    strategies
        .into_iter()
        .map(|strategy| -> Result<TourConfig> {
            let config = TourConfig {
                strategy,
                matching,
                two_opt_max_passes: cli.two_opt_max_passes,
            };
            config.validate()?;
            Ok(config)
        })
        .collect()
}

/// Label written to the `Algorithm` column.
fn algorithm_label(config: &TourConfig) -> String {
    match config.strategy {
        TourStrategyKind::Christofides => format!("christofides-{}", config.matching),
        other => other.to_string(),
    }
}

fn record_run(sample: &Sample, algorithm: &str, execution_time: Duration, tour: Tour) -> RunRecord {
    let cost = tour.cost(&sample.matrix);
    RunRecord {
        sample: sample.name.clone(),
        algorithm: algorithm.to_string(),
        vertex_count: sample.vertex_count(),
        execution_time,
        tour,
        cost,
        expected: sample.expected_cost,
        delta: sample.expected_cost.map(|expected| cost - expected),
    }
}

/// Build and time one tour.
///
/// A failing build is logged and yields `None` so the remaining samples
/// still run and the CSV is still written.
fn time_run<C: Clock>(
    sample: &Sample,
    config: &TourConfig,
    label: &str,
    clock: &C,
) -> Option<RunRecord> {
    let start = clock.now();
    match build_tour(&sample.matrix, config) {
        Ok(tour) => Some(record_run(sample, label, clock.elapsed(&start), tour)),
        Err(e) => {
            log::error!("{label} on {}: {e}; skipping sample", sample.name);
            None
        }
    }
}

/// How a run's cost compares to the sample's known optimum.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Verdict {
    Right,
    Wrong { delta: f64, ratio: Option<f64> },
    Ungraded,
}

fn verdict(record: &RunRecord) -> Verdict {
    match record.delta {
        Some(delta) if delta.abs() <= EPSILON => Verdict::Right,
        Some(delta) => Verdict::Wrong {
            delta,
            ratio: record.ratio(),
        },
        None => Verdict::Ungraded,
    }
}

fn print_run(record: &RunRecord) {
    println!(
        "\t{}: {}s",
        record.sample,
        record.execution_time.as_secs_f64()
    );
    match verdict(record) {
        Verdict::Right => println!("\tRight Cost/Path"),
        Verdict::Wrong { delta, ratio } => {
            let ratio = ratio.map_or_else(|| "n/a".to_string(), |r| r.to_string());
            println!("\tWrong by: {delta} ({ratio}) (out - expected)\n");
        }
        Verdict::Ungraded => println!("\tCost: {} (no expected cost)", record.cost),
    }
    log::debug!("{} path: {}", record.sample, format_path(&record.tour));
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logger(cli.log_level, cli.log_timestamp) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let configs = configs_from_cli(cli)?;

    let mut samples = samples::load_samples(&cli.samples_dir)?;
    if let Some(n) = cli.random {
        samples.push(samples::random_sample(n, cli.seed));
    }
    if samples.is_empty() {
        return Err(BenchError::NoSamples(cli.samples_dir.clone()));
    }

    eprintln!(
        "Samples: {} from {}",
        samples.len(),
        cli.samples_dir.display()
    );
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let clock = StdClock;
    let mut records = Vec::with_capacity(configs.len() * samples.len() * cli.runs);
    let mut timings = Vec::with_capacity(configs.len());

    for config in &configs {
        let label = algorithm_label(config);
        println!("{label}:");

        let mut durations = Vec::with_capacity(samples.len() * cli.runs);
        for sample in &samples {
            for run in 0..cli.runs {
                // A failing sample fails every run the same way.
                let Some(record) = time_run(sample, config, &label, &clock) else {
                    break;
                };
                print_run(&record);

                if run == 0
                    && (cli.json || cli.report)
                    && config.strategy == TourStrategyKind::Christofides
                {
                    match process_staged_with_diagnostics(&sample.matrix, config.matching, &clock) {
                        Ok((_, diagnostics)) if cli.json => {
                            println!("{}", serde_json::to_string_pretty(&diagnostics)?);
                        }
                        Ok((_, diagnostics)) => println!("{}", diagnostics.report()),
                        Err(e) => log::error!("{label} diagnostics on {}: {e}", sample.name),
                    }
                }

                durations.push(record.execution_time);
                records.push(record);
            }
        }
        println!();
        timings.push((label, durations));
    }

    let csv_path = cli
        .csv
        .clone()
        .unwrap_or_else(|| cli.samples_dir.join("log.csv"));
    let csv = to_csv(&records);
    std::fs::write(&csv_path, &csv).map_err(|e| BenchError::io(&csv_path, e))?;
    eprintln!(
        "CSV written to {} ({} rows)",
        csv_path.display(),
        records.len()
    );

    if cli.runs > 1 {
        print_multi_run_summary(&timings, cli.runs);
    }

    Ok(())
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Min, mean and max in milliseconds. `None` for no durations.
#[allow(clippy::cast_precision_loss)]
fn millis_stats(durations: &[Duration]) -> Option<(f64, f64, f64)> {
    if durations.is_empty() {
        return None;
    }
    let ms: Vec<f64> = durations
        .iter()
        .map(|d| d.as_secs_f64() * 1000.0)
        .collect();
    let min = ms.iter().copied().reduce(f64::min)?;
    let max = ms.iter().copied().reduce(f64::max)?;
    let mean = ms.iter().sum::<f64>() / ms.len() as f64;
    Some((min, mean, max))
}

/// Print aggregated timings per strategy across all runs.
fn print_multi_run_summary(timings: &[(String, Vec<Duration>)], runs: usize) {
    println!("Summary ({runs} runs per sample)\n{}", "=".repeat(60));
    println!(
        "{:<24} {:>10} {:>10} {:>10}",
        "Strategy", "Min (ms)", "Mean (ms)", "Max (ms)"
    );
    println!("{}", "-".repeat(60));

    for (label, durations) in timings {
        if let Some((min, mean, max)) = millis_stats(durations) {
            println!("{label:<24} {min:>10.3} {mean:>10.3} {max:>10.3}");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("christofides-bench").chain(args.iter().copied()))
            .unwrap()
    }

    fn four_cycle_sample() -> Sample {
        Sample::parse("tsp4_4.txt", "0 1 2 1\n1 0 1 2\n2 1 0 1\n1 2 1 0").unwrap()
    }

    #[test]
    fn default_matching_follows_config() {
        assert_eq!(CLI_DEFAULT_MATCHING, Matching::Exact);
    }

    #[test]
    fn defaults_run_every_strategy_alphabetically() {
        let configs = configs_from_cli(&cli(&["samples"])).unwrap();
        let strategies: Vec<TourStrategyKind> = configs.iter().map(|c| c.strategy).collect();
        assert_eq!(
            strategies,
            vec![
                TourStrategyKind::Christofides,
                TourStrategyKind::DoubleTree,
                TourStrategyKind::TwoOpt,
            ]
        );
        assert!(configs.iter().all(|c| c.matching == MatchingKind::Exact));
    }

    #[test]
    fn repeated_strategies_are_deduplicated() {
        let configs = configs_from_cli(&cli(&[
            "samples",
            "--strategy",
            "two-opt",
            "--strategy",
            "double-tree",
            "--strategy",
            "two-opt",
            "--matching",
            "greedy",
            "--two-opt-max-passes",
            "5",
        ]))
        .unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].strategy, TourStrategyKind::DoubleTree);
        assert_eq!(configs[1].strategy, TourStrategyKind::TwoOpt);
        assert_eq!(configs[1].two_opt_max_passes, 5);
        assert_eq!(configs[1].matching, MatchingKind::Greedy);
    }

    #[test]
    fn zero_runs_rejected_by_parser() {
        assert!(
            Cli::try_parse_from(["christofides-bench", "samples", "--runs", "0"]).is_err()
        );
    }

    #[test]
    fn config_json_overrides_flags() {
        let configs = configs_from_cli(&cli(&[
            "samples",
            "--strategy",
            "christofides",
            "--config-json",
            r#"{"strategy":"two-opt","two_opt_max_passes":3}"#,
        ]))
        .unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].strategy, TourStrategyKind::TwoOpt);
        assert_eq!(configs[0].two_opt_max_passes, 3);
    }

    #[test]
    fn invalid_config_json_is_reported() {
        let err = configs_from_cli(&cli(&["samples", "--config-json", "{"])).unwrap_err();
        assert!(matches!(err, BenchError::ConfigJson(_)));

        let err = configs_from_cli(&cli(&[
            "samples",
            "--config-json",
            r#"{"two_opt_max_passes":0}"#,
        ]))
        .unwrap_err();
        assert!(matches!(err, BenchError::Tour(_)));
    }

    #[test]
    fn christofides_label_names_the_matching() {
        let config = TourConfig {
            matching: MatchingKind::Greedy,
            ..TourConfig::default()
        };
        assert_eq!(algorithm_label(&config), "christofides-greedy");
        let config = TourConfig {
            strategy: TourStrategyKind::TwoOpt,
            ..TourConfig::default()
        };
        assert_eq!(algorithm_label(&config), "two-opt");
    }

    #[test]
    fn optimal_tour_is_right() {
        let sample = four_cycle_sample();
        let record = record_run(
            &sample,
            "christofides-exact",
            Duration::ZERO,
            Tour::new(vec![0, 3, 2, 1]),
        );
        assert_eq!(record.delta, Some(0.0));
        assert_eq!(verdict(&record), Verdict::Right);
    }

    #[test]
    fn suboptimal_tour_is_wrong_by_delta() {
        let sample = four_cycle_sample();
        let record = record_run(&sample, "two-opt", Duration::ZERO, Tour::new(vec![0, 2, 1, 3]));
        assert_eq!(record.cost, 6.0);
        assert_eq!(
            verdict(&record),
            Verdict::Wrong {
                delta: 2.0,
                ratio: Some(1.5)
            }
        );
    }

    #[test]
    fn failing_sample_is_skipped() {
        // Vertex 3 is joined to everything by NaN, so it and vertex 2 end
        // up as odd tree vertices joined by a non-finite weight.
        let sample = Sample::parse(
            "tsp4_4.txt",
            "0 1 2 NaN\n1 0 1 NaN\n2 1 0 NaN\nNaN NaN NaN 0",
        )
        .unwrap();
        let config = TourConfig::default();
        assert!(time_run(&sample, &config, "christofides-exact", &StdClock).is_none());

        let record = time_run(&four_cycle_sample(), &config, "christofides-exact", &StdClock)
            .unwrap();
        assert_eq!(record.cost, 4.0);
    }

    #[test]
    fn random_sample_is_ungraded() {
        let sample = samples::random_sample(5, 1);
        let tour = build_tour(&sample.matrix, &TourConfig::default()).unwrap();
        let record = record_run(&sample, "christofides-exact", Duration::ZERO, tour);
        assert_eq!(verdict(&record), Verdict::Ungraded);
    }

    #[test]
    fn millis_stats_over_runs() {
        let durations = [
            Duration::from_millis(2),
            Duration::from_millis(4),
            Duration::from_millis(9),
        ];
        let (min, mean, max) = millis_stats(&durations).unwrap();
        assert!((min - 2.0).abs() < 1e-9);
        assert!((mean - 5.0).abs() < 1e-9);
        assert!((max - 9.0).abs() < 1e-9);
        assert_eq!(millis_stats(&[]), None);
    }
}
