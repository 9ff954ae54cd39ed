//! Configuration types for match play
//!
//! Level 4 - Utilities and configuration

use ipd_core::ConfigError;
use serde::{Deserialize, Serialize};

/// Settings shared by every match of a tournament
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Rounds per match
    pub turns: u32,
    /// Probability (0-1) that a resolved move is flipped
    pub noise: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            turns: 10,
            noise: 0.0,
        }
    }
}

impl MatchConfig {
    /// Noise-free config with the given number of turns
    pub fn new(turns: u32) -> Self {
        Self { turns, noise: 0.0 }
    }

    /// Config with noise, rejected up front if `noise` is not a probability
    pub fn try_new(turns: u32, noise: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            turns,
            noise: validate_noise(noise)?,
        })
    }

    /// Set noise probability.
    ///
    /// Not checked here; matches and tournaments call `validate` before
    /// touching any agent. Use `try_new` to reject bad noise immediately.
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_noise(self.noise).map(|_| ())
    }
}

/// Check that `noise` is a probability
pub fn validate_noise(noise: f64) -> Result<f64, ConfigError> {
    if (0.0..=1.0).contains(&noise) {
        Ok(noise)
    } else {
        Err(ConfigError::InvalidNoise(noise))
    }
}
