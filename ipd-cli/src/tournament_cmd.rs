//! Tournament command - one round-robin over a population
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_population(), run_tournament()
//! - Level 4: formatting utilities

use anyhow::{bail, Context, Result};
use clap::Args;

use ipd_core::{Population, StrategyKind};
use ipd_tournament::{compare_scores_desc, play_one_tournament, MatchConfig, TournamentResult};

use crate::settings::{create_rng, SimulationSettings};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct TournamentArgs {
    /// Population as kind=count pairs, e.g. "tft=3,alld=2,grudge"
    #[arg(long)]
    pub population: Option<String>,

    /// Rounds per match [default: 10]
    #[arg(long)]
    pub turns: Option<u32>,

    /// Probability (0-1) that each move is flipped [default: 0]
    #[arg(long)]
    pub noise: Option<f64>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run tournament command
pub fn run(args: TournamentArgs, settings: &SimulationSettings, seed: Option<u64>) -> Result<()> {
    let defaults = MatchConfig::default();
    let config = MatchConfig::try_new(
        settings.turns(args.turns, defaults.turns),
        settings.noise(args.noise, defaults.noise),
    )
    .context("Invalid tournament configuration")?;

    let mut population = build_population(&args, settings)?;
    tracing::info!(
        "Tournament: {} agents, turns={}, noise={}",
        population.len(),
        config.turns,
        config.noise
    );

    let result = run_tournament(&mut population, &config, settings, seed)?;

    if args.json {
        print_json_results(&result)?;
    } else {
        print_text_results(&population, &result);
    }

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_population(args: &TournamentArgs, settings: &SimulationSettings) -> Result<Population> {
    let distribution = settings.distribution(args.population.as_deref())?;
    let population = Population::from_distribution(&distribution);

    if population.len() < 2 {
        bail!("A tournament needs at least 2 agents, got {}", population.len());
    }

    Ok(population)
}

fn run_tournament(
    population: &mut Population,
    config: &MatchConfig,
    settings: &SimulationSettings,
    seed: Option<u64>,
) -> Result<TournamentResult> {
    let mut rng = create_rng(seed);
    population.reset_all();

    play_one_tournament(population.agents_mut(), config, &settings.payoffs, &mut rng)
        .context("Tournament failed")
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Print results as JSON
fn print_json_results(result: &TournamentResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{}", json);
    Ok(())
}

/// Print results as text
fn print_text_results(population: &Population, result: &TournamentResult) {
    println!("\n=== Tournament Results ===");
    println!("Agents:   {}", population.len());
    println!("Pairings: {}", result.pairings.len());
    println!();
    println!("{:>4}  {:>6}  {:<18}  {:>10}", "rank", "agent", "strategy", "score");

    for s in &result.standings {
        println!(
            "{:>4}  {:>6}  {:<18}  {:>10.1}",
            s.rank + 1,
            s.id.to_string(),
            s.kind.name(),
            s.score
        );
    }

    println!("\nMean score by strategy:");
    for (kind, mean) in mean_by_kind(result) {
        println!("  {:<18} {:>10.2}", kind.name(), mean);
    }
}

/// Average score per kind, best first
fn mean_by_kind(result: &TournamentResult) -> Vec<(StrategyKind, f64)> {
    let mut totals: std::collections::BTreeMap<StrategyKind, (f64, usize)> = Default::default();
    for s in &result.standings {
        let entry = totals.entry(s.kind).or_insert((0.0, 0));
        entry.0 += s.score;
        entry.1 += 1;
    }

    let mut means: Vec<(StrategyKind, f64)> = totals
        .into_iter()
        .map(|(kind, (total, n))| (kind, total / n as f64))
        .collect();
    means.sort_by(|a, b| compare_scores_desc(a.1, b.1));
    means
}
