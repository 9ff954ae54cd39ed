//! IPD Evolution - selection and reproduction over generations
//!
//! This crate drives a population through generations:
//! - Tournament scoring (via ipd-tournament)
//! - Truncation selection (cull the worst, clone the best)
//! - A two-phase step state machine the host can call on its own timer

mod config;
mod engine;
mod selection;

pub use config::EvolutionConfig;
pub use engine::{EvolutionEngine, GenerationReport, GenerationSnapshot, Phase, StepOutcome};
pub use selection::{reproduce, select, select_culled, select_elite, Selection};
