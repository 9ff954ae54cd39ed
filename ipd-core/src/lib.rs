//! IPD Core - Prisoner's Dilemma primitives
//!
//! This crate provides the building blocks shared by the game and
//! evolution engines:
//! - Moves and the payoff matrix
//! - The strategy catalog (closed set of decision rules)
//! - Agents with per-match memory and a running score
//! - Populations with stable agent identities
//! - The error taxonomy

pub mod moves;
pub mod payoff;
pub mod strategy;
pub mod agent;
pub mod population;
pub mod error;

// Re-exports for convenient access
pub use moves::Move;
pub use payoff::{PayoffKey, PayoffMatrix};
pub use strategy::{StrategyKind, StrategyMemory, StrategyRule};
pub use agent::{Agent, AgentId};
pub use population::{AgentSnapshot, Population};
pub use error::{ConfigError, InvariantViolation, IpdError, Result};
