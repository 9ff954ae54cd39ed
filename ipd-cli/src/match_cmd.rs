//! Match command - play one repeated game between two strategies
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_match_config(), play_match()
//! - Level 4: formatting utilities

use anyhow::{Context, Result};
use clap::Args;

use ipd_core::{Agent, AgentId, StrategyKind};
use ipd_tournament::{play_repeated_game, MatchConfig, MatchResult};

use crate::settings::{create_rng, SimulationSettings};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// First strategy (e.g. tft, alld, grudge, prober)
    #[arg(long)]
    pub a: StrategyKind,

    /// Second strategy
    #[arg(long)]
    pub b: StrategyKind,

    /// Rounds to play [default: 10]
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

/// Run match command
pub fn run(args: MatchArgs, settings: &SimulationSettings, seed: Option<u64>) -> Result<()> {
    let config = build_match_config(&args, settings)?;

    tracing::info!(
        "Match: {} vs {}, turns={}, noise={}",
        args.a,
        args.b,
        config.turns,
        config.noise
    );

    let result = play_match(&args, &config, settings, seed)?;

    if args.json {
        print_json_results(&args, &result)?;
    } else {
        print_text_results(&args, &result);
    }

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_match_config(args: &MatchArgs, settings: &SimulationSettings) -> Result<MatchConfig> {
    let defaults = MatchConfig::default();
    MatchConfig::try_new(
        settings.turns(args.turns, defaults.turns),
        settings.noise(args.noise, defaults.noise),
    )
    .context("Invalid match configuration")
}

fn play_match(
    args: &MatchArgs,
    config: &MatchConfig,
    settings: &SimulationSettings,
    seed: Option<u64>,
) -> Result<MatchResult> {
    let mut rng = create_rng(seed);
    let mut a = Agent::new(AgentId(0), args.a);
    let mut b = Agent::new(AgentId(1), args.b);

    play_repeated_game(&mut a, &mut b, config, &settings.payoffs, &mut rng)
        .context("Match failed")
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Print results as JSON
fn print_json_results(args: &MatchArgs, result: &MatchResult) -> Result<()> {
    #[derive(serde::Serialize)]
    struct JsonOutput<'a> {
        a: StrategyKind,
        b: StrategyKind,
        flips: usize,
        #[serde(flatten)]
        result: &'a MatchResult,
    }

    let output = JsonOutput {
        a: args.a,
        b: args.b,
        flips: result.flips(),
        result,
    };

    let json = serde_json::to_string_pretty(&output)?;
    println!("{}", json);

    Ok(())
}

/// Print results as text
fn print_text_results(args: &MatchArgs, result: &MatchResult) {
    println!("\n=== {} vs {} ===", args.a.name(), args.b.name());
    println!("{:>5}  {:^5}  {:>8}  {:>8}", "round", "moves", "total A", "total B");

    for r in &result.rounds {
        println!(
            "{:>5}  {}{} {}{}  {:>8.1}  {:>8.1}",
            r.round + 1,
            r.move_a,
            if r.flipped_a { "*" } else { " " },
            r.move_b,
            if r.flipped_b { "*" } else { " " },
            r.cumulative_a,
            r.cumulative_b
        );
    }

    println!("\nFinal: {} {:.1} - {:.1} {}", args.a, result.total_score_a, result.total_score_b, args.b);
    if result.flips() > 0 {
        println!("Moves flipped by noise: {} (marked *)", result.flips());
    }
}
