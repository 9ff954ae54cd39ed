//! Simulation settings - optional JSON file merged with command-line flags
//!
//! Flags always win over the file; the file wins over built-in defaults.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use ipd_core::{PayoffMatrix, Population, StrategyKind};

/// Default number of agents per kind when no population is given
const DEFAULT_AGENTS_PER_KIND: usize = 5;

/// Kinds in the default population
const DEFAULT_KINDS: [StrategyKind; 5] = [
    StrategyKind::TitForTat,
    StrategyKind::AlwaysDefect,
    StrategyKind::AlwaysCooperate,
    StrategyKind::Grudge,
    StrategyKind::Prober,
];

/// Contents of a `--config` file
///
/// ```json
/// {
///   "payoffs": { "P": 0, "S": -1, "R": 2, "T": 3 },
///   "population": { "TIT_FOR_TAT": 5, "ALWAYS_DEFECT": 5 },
///   "turns": 10,
///   "noise": 0.05,
///   "elimination": 5
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub payoffs: PayoffMatrix,
    pub population: BTreeMap<StrategyKind, usize>,
    pub turns: Option<u32>,
    pub noise: Option<f64>,
    pub elimination: Option<usize>,
    pub seed: Option<u64>,
}

impl SimulationSettings {
    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid settings file {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse settings JSON")
    }

    /// Resolve the population distribution: flag, then file, then default
    pub fn distribution(&self, flag: Option<&str>) -> Result<Vec<(StrategyKind, usize)>> {
        if let Some(spec) = flag {
            return Population::parse_distribution(spec)
                .with_context(|| format!("Invalid population '{}'", spec));
        }

        if !self.population.is_empty() {
            return Ok(self.population.iter().map(|(&k, &n)| (k, n)).collect());
        }

        Ok(DEFAULT_KINDS
            .iter()
            .map(|&kind| (kind, DEFAULT_AGENTS_PER_KIND))
            .collect())
    }

    pub fn turns(&self, flag: Option<u32>, default: u32) -> u32 {
        flag.or(self.turns).unwrap_or(default)
    }

    pub fn noise(&self, flag: Option<f64>, default: f64) -> f64 {
        flag.or(self.noise).unwrap_or(default)
    }

    pub fn elimination(&self, flag: Option<usize>, default: usize) -> usize {
        flag.or(self.elimination).unwrap_or(default)
    }
}

/// Create RNG from seed or random
pub fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = SimulationSettings::from_json("{}").unwrap();
        assert_eq!(settings, SimulationSettings::default());
        assert_eq!(settings.payoffs, PayoffMatrix::default());
    }

    #[test]
    fn test_parse_full_settings() {
        let json = r#"{
            "payoffs": { "P": 1, "S": 0, "R": 3, "T": 5 },
            "population": { "TIT_FOR_TAT": 4, "ALWAYS_DEFECT": 2 },
            "turns": 20,
            "noise": 0.1,
            "elimination": 2,
            "seed": 7
        }"#;
        let settings = SimulationSettings::from_json(json).unwrap();

        assert_eq!(settings.payoffs.t, 5.0);
        assert_eq!(settings.payoffs.s, 0.0);
        assert_eq!(settings.population[&StrategyKind::TitForTat], 4);
        assert_eq!(settings.turns, Some(20));
        assert_eq!(settings.noise, Some(0.1));
        assert_eq!(settings.elimination, Some(2));
        assert_eq!(settings.seed, Some(7));
    }

    #[test]
    fn test_partial_payoffs_keep_defaults() {
        let settings = SimulationSettings::from_json(r#"{ "payoffs": { "T": 10 } }"#).unwrap();
        assert_eq!(settings.payoffs.t, 10.0);
        assert_eq!(settings.payoffs.r, PayoffMatrix::DEFAULT_R);
    }

    #[test]
    fn test_unknown_strategy_in_file_is_rejected() {
        let json = r#"{ "population": { "NICE_GUY": 3 } }"#;
        assert!(SimulationSettings::from_json(json).is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let settings = SimulationSettings {
            turns: Some(20),
            noise: Some(0.2),
            elimination: Some(3),
            ..Default::default()
        };

        assert_eq!(settings.turns(Some(5), 10), 5);
        assert_eq!(settings.turns(None, 10), 20);
        assert_eq!(settings.noise(None, 0.0), 0.2);
        assert_eq!(settings.elimination(Some(1), 5), 1);
        assert_eq!(SimulationSettings::default().turns(None, 10), 10);
    }

    #[test]
    fn test_distribution_resolution_order() {
        let mut settings = SimulationSettings::default();

        let default = settings.distribution(None).unwrap();
        assert_eq!(default.len(), 5);
        assert!(default.iter().all(|&(_, n)| n == 5));

        settings.population.insert(StrategyKind::Pavlov, 3);
        assert_eq!(
            settings.distribution(None).unwrap(),
            vec![(StrategyKind::Pavlov, 3)]
        );

        assert_eq!(
            settings.distribution(Some("tft=2,alld")).unwrap(),
            vec![(StrategyKind::TitForTat, 2), (StrategyKind::AlwaysDefect, 1)]
        );
        assert!(settings.distribution(Some("tft=x")).is_err());
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let mut a = create_rng(Some(42));
        let mut b = create_rng(Some(42));
        assert_eq!(a.next_u64(), b.next_u64());
    }
}
