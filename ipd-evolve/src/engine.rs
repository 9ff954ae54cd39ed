//! Evolution engine - a two-phase state machine over generations
//!
//! Each generation is two calls to `step()`:
//! `Idle` -> tournament -> `Scored` -> selection + reproduction -> `Idle`.
//! There is no internal timer and no terminal state; the host decides when
//! to call `step()` and when to stop.

use std::collections::BTreeMap;

use ipd_core::{
    AgentId, AgentSnapshot, ConfigError, IpdError, PayoffMatrix, Population, StrategyKind,
};
use ipd_tournament::{compute_standings, play_one_tournament, Standing, TournamentResult};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::EvolutionConfig;
use crate::selection::{reproduce, select};

/// Where the current generation stands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Population exists, no tournament run yet this generation
    Idle,
    /// Tournament complete, scores available
    Scored,
}

/// What happened during a reproduction step
#[derive(Clone, Debug, Serialize)]
pub struct GenerationReport {
    /// Generation counter after the step
    pub generation: u64,
    /// Tournament standings that drove selection
    pub standings: Vec<Standing>,
    /// Removed agents, worst first
    pub culled: Vec<AgentSnapshot>,
    /// Cloned agents, best first
    pub parents: Vec<AgentSnapshot>,
    /// Ids of the new clones, in population order
    pub offspring: Vec<AgentId>,
    /// Agents per kind in the new generation
    pub census: BTreeMap<StrategyKind, usize>,
}

impl GenerationReport {
    pub fn best_score(&self) -> Option<f64> {
        self.standings.first().map(|s| s.score)
    }

    pub fn mean_score(&self) -> f64 {
        if self.standings.is_empty() {
            0.0
        } else {
            self.standings.iter().map(|s| s.score).sum::<f64>() / self.standings.len() as f64
        }
    }
}

/// Result of one `step()`
#[derive(Clone, Debug, Serialize)]
pub enum StepOutcome {
    Scored(TournamentResult),
    Reproduced(GenerationReport),
}

/// Observable population state for the host
#[derive(Clone, Debug, Serialize)]
pub struct GenerationSnapshot {
    pub generation: u64,
    pub phase: Phase,
    pub agents: Vec<AgentSnapshot>,
}

/// Drives a population through tournaments and selection.
///
/// All operations take `&mut self` and run to completion, so two steps can
/// never overlap on the same population.
pub struct EvolutionEngine<R = ChaCha8Rng> {
    population: Population,
    payoffs: PayoffMatrix,
    config: EvolutionConfig,
    rng: R,
    generation: u64,
    phase: Phase,
    last_tournament: Option<TournamentResult>,
}

impl EvolutionEngine<ChaCha8Rng> {
    /// Engine with default payoffs and a seeded ChaCha8 random source
    pub fn seeded(
        population: Population,
        config: EvolutionConfig,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::new(
            population,
            config,
            PayoffMatrix::default(),
            ChaCha8Rng::seed_from_u64(seed),
        )
    }
}

impl<R: RngCore> EvolutionEngine<R> {
    pub fn new(
        population: Population,
        config: EvolutionConfig,
        payoffs: PayoffMatrix,
        rng: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        config.validate_population(population.len())?;

        Ok(Self {
            population,
            payoffs,
            config,
            rng,
            generation: 0,
            phase: Phase::Idle,
            last_tournament: None,
        })
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Advance the state machine by one phase
    pub fn step(&mut self) -> Result<StepOutcome, IpdError> {
        match self.phase {
            Phase::Idle => self.run_tournament().map(StepOutcome::Scored),
            Phase::Scored => self.next_generation().map(StepOutcome::Reproduced),
        }
    }

    /// Complete `generations` full generations, calling `on_generation` after each
    pub fn run_generations<F>(&mut self, generations: u64, mut on_generation: F) -> Result<(), IpdError>
    where
        F: FnMut(&GenerationReport),
    {
        let target = self.generation.saturating_add(generations);
        while self.generation < target {
            if let StepOutcome::Reproduced(report) = self.step()? {
                on_generation(&report);
            }
        }
        Ok(())
    }

    /// Idle -> Scored: fresh scores, then one round-robin tournament
    fn run_tournament(&mut self) -> Result<TournamentResult, IpdError> {
        self.population.reset_all();

        let result = play_one_tournament(
            self.population.agents_mut(),
            &self.config.match_config(),
            &self.payoffs,
            &mut self.rng,
        )?;

        tracing::debug!(
            "Generation {}: tournament complete, best={:?}",
            self.generation,
            result.winner().map(|s| (s.kind, s.score))
        );

        self.last_tournament = Some(result.clone());
        self.phase = Phase::Scored;
        Ok(result)
    }

    /// Scored -> Idle: cull the worst, clone the best, bump the generation
    fn next_generation(&mut self) -> Result<GenerationReport, IpdError> {
        let standings = match self.last_tournament.take() {
            Some(result) => result.standings,
            None => compute_standings(self.population.agents()),
        };

        let scores: Vec<f64> = self.population.agents().iter().map(|a| a.score()).collect();
        let selection = select(&scores, self.config.elimination_count);

        let snapshot_of = |indices: &[usize]| -> Vec<AgentSnapshot> {
            indices
                .iter()
                .map(|&i| AgentSnapshot::from(&self.population.agents()[i]))
                .collect()
        };
        let culled = snapshot_of(&selection.culled);
        let parents = snapshot_of(&selection.parents);

        let offspring = reproduce(&mut self.population, &selection);
        self.config.validate_population(self.population.len())?;

        self.generation += 1;
        self.phase = Phase::Idle;

        let census = self.population.census();
        tracing::debug!("Generation {}: census {:?}", self.generation, census);

        Ok(GenerationReport {
            generation: self.generation,
            standings,
            culled,
            parents,
            offspring,
            census,
        })
    }

    // ========================================================================
    // Host-facing state
    // ========================================================================

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn payoffs(&self) -> &PayoffMatrix {
        &self.payoffs
    }

    /// Payoff edits take effect from the next tournament
    pub fn payoffs_mut(&mut self) -> &mut PayoffMatrix {
        &mut self.payoffs
    }

    /// Result of the tournament of the current generation, if it has been played
    pub fn last_tournament(&self) -> Option<&TournamentResult> {
        self.last_tournament.as_ref()
    }

    /// Replace the configuration; the current population must still fit it
    pub fn reconfigure(&mut self, config: EvolutionConfig) -> Result<(), ConfigError> {
        config.validate()?;
        config.validate_population(self.population.len())?;
        self.config = config;
        Ok(())
    }

    /// Start over with a new population at generation 0
    pub fn reset(&mut self, population: Population) -> Result<(), ConfigError> {
        self.config.validate_population(population.len())?;
        self.population = population;
        self.generation = 0;
        self.phase = Phase::Idle;
        self.last_tournament = None;
        Ok(())
    }

    pub fn census(&self) -> BTreeMap<StrategyKind, usize> {
        self.population.census()
    }

    pub fn snapshot(&self) -> GenerationSnapshot {
        GenerationSnapshot {
            generation: self.generation,
            phase: self.phase,
            agents: self.population.snapshot(),
        }
    }
}
