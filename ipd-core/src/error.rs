//! Error taxonomy
//!
//! Configuration errors are reported where the configuration is made.
//! Invariant violations indicate caller misuse and are never recovered from.

use crate::strategy::StrategyKind;

/// Invalid configuration supplied by the host
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown strategy kind: {0}")]
    UnknownStrategy(String),

    #[error("Unknown payoff key: {0} (expected one of P, S, R, T)")]
    UnknownPayoffKey(String),

    #[error("Noise must be within [0, 1], got {0}")]
    InvalidNoise(f64),

    #[error("Population has {actual} agents but population_size is {expected}")]
    PopulationSizeMismatch { expected: usize, actual: usize },

    #[error("Cannot eliminate {elimination_count} of {population_size} agents and refill from survivors")]
    EliminationTooLarge {
        elimination_count: usize,
        population_size: usize,
    },

    #[error("Malformed population entry: {0}")]
    MalformedDistribution(String),

    #[error("Duplicate count for {0} in population distribution")]
    DuplicateDistributionEntry(StrategyKind),
}

/// Caller misuse of the game engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("Agent {0} cannot be paired with itself")]
    SelfPairing(usize),

    #[error("Pairing ({a}, {b}) out of range for population of {len}")]
    PairingOutOfRange { a: usize, b: usize, len: usize },
}

/// Any error raised by the engine
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IpdError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

pub type Result<T> = std::result::Result<T, IpdError>;
