//! IPD Tournament - the game engine
//!
//! This crate plays the Prisoner's Dilemma at three granularities:
//! - A single round between two agents
//! - A repeated game (match) with optional noise
//! - A round-robin tournament over a population
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: play_one_tournament (orchestration)
//! - Level 2: play_repeated_game (phases)
//! - Level 3: play_one_round (steps)
//! - Level 4: configuration, pairing and ranking utilities

mod config;
mod match_play;
mod round;
mod tournament;

pub use config::{validate_noise, MatchConfig};
pub use match_play::{play_repeated_game, MatchResult, RoundRecord};
pub use round::{play_one_round, RoundResult};
pub use tournament::{
    compare_scores_desc, compute_standings, pair_mut, play_one_tournament, rank_by_score, round_robin_pairings,
    PairingRecord, Standing, TournamentResult,
};
