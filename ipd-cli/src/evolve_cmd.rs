//! Evolve command - generations of tournament, culling and cloning
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_evolution_config(), run_evolution(), save_report()
//! - Level 4: formatting utilities

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use ipd_core::{PayoffMatrix, Population, StrategyKind};
use ipd_evolve::{EvolutionConfig, EvolutionEngine, GenerationReport, GenerationSnapshot};

use crate::settings::{create_rng, SimulationSettings};

/// Upper bound on the history buffer reserved before the run starts
const MAX_PREALLOCATED_GENERATIONS: u64 = 1024;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct EvolveArgs {
    /// Initial population as kind=count pairs, e.g. "tft=5,alld=5,grudge=5"
    #[arg(long)]
    pub population: Option<String>,

    /// Number of generations to run
    #[arg(long, default_value = "50")]
    pub generations: u64,

    /// Agents culled and cloned per generation [default: 5, at most half the population]
    #[arg(long)]
    pub elimination: Option<usize>,

    /// Rounds per match [default: 10]
    #[arg(long)]
    pub turns: Option<u32>,

    /// Probability (0-1) that each move is flipped [default: 0.05]
    #[arg(long)]
    pub noise: Option<f64>,

    /// Write the full run report (JSON) here, plus a CSV history next to it
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Per-generation line of the run history
#[derive(Clone, Debug, Serialize)]
struct GenerationSummary {
    generation: u64,
    best_score: f64,
    mean_score: f64,
    census: BTreeMap<StrategyKind, usize>,
}

impl From<&GenerationReport> for GenerationSummary {
    fn from(report: &GenerationReport) -> Self {
        Self {
            generation: report.generation,
            best_score: report.best_score().unwrap_or(0.0),
            mean_score: report.mean_score(),
            census: report.census.clone(),
        }
    }
}

/// Everything needed to reproduce and inspect a run
#[derive(Clone, Debug, Serialize)]
struct EvolutionReport {
    generated_at: DateTime<Utc>,
    seed: u64,
    config: EvolutionConfig,
    payoffs: PayoffMatrix,
    initial_census: BTreeMap<StrategyKind, usize>,
    history: Vec<GenerationSummary>,
    final_population: GenerationSnapshot,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run evolution command
///
/// 1. Build the initial population and configuration
/// 2. Run the requested number of generations
/// 3. Save and print the results
pub fn run(args: EvolveArgs, settings: &SimulationSettings, seed: Option<u64>) -> Result<()> {
    // Always run from a concrete seed so the report can reproduce the run
    let seed = seed.unwrap_or_else(rand::random);

    let distribution = settings.distribution(args.population.as_deref())?;
    let population = Population::from_distribution(&distribution);
    let config = build_evolution_config(&args, settings, population.len());

    tracing::info!(
        "Starting evolution: pop={}, gen={}, elimination={}, turns={}, noise={}, seed={}",
        config.population_size,
        args.generations,
        config.elimination_count,
        config.turns,
        config.noise,
        seed
    );

    let report = run_evolution(population, config, settings.payoffs, seed, &args)?;

    if let Some(path) = &args.output {
        save_report(&report, path)?;
    }

    if args.json {
        print_json_results(&report)?;
    } else {
        print_summary(&report);
    }

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Build evolution configuration from flags, settings file and population size
fn build_evolution_config(
    args: &EvolveArgs,
    settings: &SimulationSettings,
    population_size: usize,
) -> EvolutionConfig {
    let defaults = EvolutionConfig::default();
    let default_elimination = defaults.elimination_count.min(population_size / 2);

    EvolutionConfig::new(
        population_size,
        settings.elimination(args.elimination, default_elimination),
    )
    .with_turns(settings.turns(args.turns, defaults.turns))
    .with_noise(settings.noise(args.noise, defaults.noise))
}

/// Run the evolution loop with a progress bar
fn run_evolution(
    population: Population,
    config: EvolutionConfig,
    payoffs: PayoffMatrix,
    seed: u64,
    args: &EvolveArgs,
) -> Result<EvolutionReport> {
    let initial_census = population.census();
    let mut engine = EvolutionEngine::new(population, config, payoffs, create_rng(Some(seed)))
        .context("Invalid evolution configuration")?;

    let progress = create_progress_bar(args.generations, args.json)?;
    let mut history = Vec::with_capacity(history_capacity(args.generations));

    engine.run_generations(args.generations, |report| {
        let summary = GenerationSummary::from(report);
        progress.suspend(|| {
            tracing::info!(
                "Generation {}: best={:.1}, avg={:.2}, census={}",
                summary.generation,
                summary.best_score,
                summary.mean_score,
                format_census(&summary.census)
            );
        });
        progress.inc(1);
        history.push(summary);
    })?;

    progress.finish_and_clear();

    Ok(EvolutionReport {
        generated_at: Utc::now(),
        seed,
        config,
        payoffs,
        initial_census,
        history,
        final_population: engine.snapshot(),
    })
}

/// Write the JSON report and a CSV history beside it
fn save_report(report: &EvolutionReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context("Failed to create output directory")?;
    }

    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).context("Failed to write evolution report")?;
    tracing::info!("Saved evolution report to {}", path.display());

    let csv_path = path.with_extension("csv");
    std::fs::write(&csv_path, history_csv(report)).context("Failed to write census history")?;
    tracing::info!("Saved census history to {}", csv_path.display());

    Ok(())
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Generations to preallocate history for; long runs grow the buffer instead
fn history_capacity(generations: u64) -> usize {
    generations.min(MAX_PREALLOCATED_GENERATIONS) as usize
}

fn create_progress_bar(generations: u64, hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }

    let bar = ProgressBar::new(generations);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} generations")?,
    );
    Ok(bar)
}

/// One row per generation, one column per kind in catalog order
fn history_csv(report: &EvolutionReport) -> String {
    let mut content = String::from("generation,best_score,mean_score");
    for kind in StrategyKind::ALL {
        content.push(',');
        content.push_str(kind.identifier());
    }
    content.push('\n');

    for summary in &report.history {
        content.push_str(&format!(
            "{},{:.4},{:.4}",
            summary.generation, summary.best_score, summary.mean_score
        ));
        for kind in StrategyKind::ALL {
            let count = summary.census.get(&kind).copied().unwrap_or(0);
            content.push_str(&format!(",{}", count));
        }
        content.push('\n');
    }

    content
}

fn format_census(census: &BTreeMap<StrategyKind, usize>) -> String {
    census
        .iter()
        .map(|(kind, count)| format!("{}={}", kind.identifier(), count))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Print JSON results to stdout
fn print_json_results(report: &EvolutionReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

/// Print summary to console
fn print_summary(report: &EvolutionReport) {
    println!("\n=== Evolution Complete ===");
    println!("Generations: {}", report.history.len());
    println!("Seed:        {}", report.seed);

    if let Some(last) = report.history.last() {
        println!("Last best score: {:.1}", last.best_score);
        println!("Last avg score:  {:.2}", last.mean_score);
    }

    println!("\nCensus (initial -> final):");
    let final_census = report
        .history
        .last()
        .map(|s| s.census.clone())
        .unwrap_or_else(|| report.initial_census.clone());
    for kind in StrategyKind::ALL {
        let before = report.initial_census.get(&kind).copied().unwrap_or(0);
        let after = final_census.get(&kind).copied().unwrap_or(0);
        if before > 0 || after > 0 {
            println!("  {:<18} {:>3} -> {:>3}", kind.name(), before, after);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(population: &str, generations: u64) -> EvolveArgs {
        EvolveArgs {
            population: Some(population.to_string()),
            generations,
            elimination: None,
            turns: None,
            noise: None,
            output: None,
            json: true,
        }
    }

    #[test]
    fn test_default_elimination_fits_small_population() {
        let config = build_evolution_config(&args("tft=2,alld=2", 1), &SimulationSettings::default(), 4);
        assert_eq!(config.elimination_count, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_history_capacity_is_bounded() {
        assert_eq!(history_capacity(50), 50);
        assert_eq!(history_capacity(u64::MAX), MAX_PREALLOCATED_GENERATIONS as usize);
    }

    #[test]
    fn test_run_evolution_records_every_generation() {
        let a = args("tft=3,alld=3", 4);
        let population = Population::from_distribution(
            &Population::parse_distribution("tft=3,alld=3").unwrap(),
        );
        let config = EvolutionConfig::new(6, 1).with_noise(0.0);

        let report = run_evolution(population, config, PayoffMatrix::default(), 42, &a).unwrap();

        assert_eq!(report.history.len(), 4);
        assert_eq!(report.final_population.generation, 4);
        assert_eq!(report.final_population.agents.len(), 6);
        for summary in &report.history {
            assert_eq!(summary.census.values().sum::<usize>(), 6);
        }

        let csv = history_csv(&report);
        assert_eq!(csv.lines().count(), 5);
        assert!(csv.starts_with("generation,best_score,mean_score,TIT_FOR_TAT"));
    }
}
