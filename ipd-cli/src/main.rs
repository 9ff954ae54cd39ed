//! IPD CLI - Command-line host for the Prisoner's Dilemma engine
//!
//! Commands:
//! - match: Play one repeated game between two strategies
//! - tournament: Run a round-robin tournament over a population
//! - evolve: Run generations of selection and reproduction
//! - strategies: List the strategy catalog

mod evolve_cmd;
mod match_cmd;
mod settings;
mod tournament_cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ipd_core::StrategyKind;

use crate::settings::SimulationSettings;

#[derive(Parser)]
#[command(name = "ipd")]
#[command(about = "Iterated Prisoner's Dilemma tournaments and evolution")]
struct Cli {
    /// Random seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// JSON settings file (payoffs, population, turns, noise, elimination)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one repeated game between two strategies
    Match(match_cmd::MatchArgs),
    /// Run a round-robin tournament
    Tournament(tournament_cmd::TournamentArgs),
    /// Run evolutionary selection over generations
    Evolve(evolve_cmd::EvolveArgs),
    /// List available strategies
    Strategies,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = match &cli.config {
        Some(path) => SimulationSettings::load(path)?,
        None => SimulationSettings::default(),
    };
    let seed = cli.seed.or(settings.seed);

    match cli.command {
        Commands::Match(args) => match_cmd::run(args, &settings, seed),
        Commands::Tournament(args) => tournament_cmd::run(args, &settings, seed),
        Commands::Evolve(args) => evolve_cmd::run(args, &settings, seed),
        Commands::Strategies => {
            print_strategies();
            Ok(())
        }
    }
}

/// RUST_LOG wins over -v when set
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_strategies() {
    for kind in StrategyKind::ALL {
        println!("{:<18} {:<18} {}", kind.identifier(), kind.name(), kind.description());
    }
}
