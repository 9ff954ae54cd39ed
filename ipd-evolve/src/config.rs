//! Evolution configuration

use ipd_core::ConfigError;
use ipd_tournament::{validate_noise, MatchConfig};
use serde::{Deserialize, Serialize};

/// Evolution configuration
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    /// Agents removed (and best agents cloned) per generation
    pub elimination_count: usize,
    /// Rounds per match
    pub turns: u32,
    /// Probability (0-1) that a resolved move is flipped
    pub noise: f64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 25,
            elimination_count: 5,
            turns: 10,
            noise: 0.05,
        }
    }
}

impl EvolutionConfig {
    pub fn new(population_size: usize, elimination_count: usize) -> Self {
        Self {
            population_size,
            elimination_count,
            ..Default::default()
        }
    }

    pub fn with_turns(mut self, turns: u32) -> Self {
        self.turns = turns;
        self
    }

    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    /// Match settings used by each generation's tournament
    pub fn match_config(&self) -> MatchConfig {
        MatchConfig::new(self.turns).with_noise(self.noise)
    }

    /// Check noise and that culled agents can be refilled from survivors
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_noise(self.noise)?;

        if self.elimination_count * 2 > self.population_size {
            return Err(ConfigError::EliminationTooLarge {
                elimination_count: self.elimination_count,
                population_size: self.population_size,
            });
        }

        Ok(())
    }

    /// Check that a population of `actual` agents matches `population_size`
    pub fn validate_population(&self, actual: usize) -> Result<(), ConfigError> {
        if actual != self.population_size {
            return Err(ConfigError::PopulationSizeMismatch {
                expected: self.population_size,
                actual,
            });
        }
        Ok(())
    }
}
