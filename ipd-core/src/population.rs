//! Population - an ordered set of agents with stable identities
//!
//! Order only matters for display adjacency and for breaking score ties
//! (earlier index wins). It never affects game outcomes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::agent::{Agent, AgentId};
use crate::error::ConfigError;
use crate::strategy::StrategyKind;

/// Observable state of one agent
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub kind: StrategyKind,
    pub score: f64,
}

impl From<&Agent> for AgentSnapshot {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent.id(),
            kind: agent.kind(),
            score: agent.score(),
        }
    }
}

/// Ordered collection of agents
#[derive(Clone, Debug, Default)]
pub struct Population {
    agents: Vec<Agent>,
    next_id: u64,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    /// One agent per kind, in the given order
    pub fn from_kinds<I>(kinds: I) -> Self
    where
        I: IntoIterator<Item = StrategyKind>,
    {
        let mut population = Self::new();
        for kind in kinds {
            population.spawn(kind);
        }
        population
    }

    /// `count` agents of each kind, grouped by kind in the given order
    pub fn from_distribution(distribution: &[(StrategyKind, usize)]) -> Self {
        Self::from_kinds(
            distribution
                .iter()
                .flat_map(|&(kind, count)| std::iter::repeat(kind).take(count)),
        )
    }

    /// Parse a distribution like `"tft=3,alld=2"`.
    ///
    /// A kind without a count (`"grudge"`) means one agent.
    pub fn parse_distribution(spec: &str) -> Result<Vec<(StrategyKind, usize)>, ConfigError> {
        let mut distribution: Vec<(StrategyKind, usize)> = Vec::new();

        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (kind, count) = match entry.split_once('=') {
                Some((kind, count)) => {
                    let count = count
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| ConfigError::MalformedDistribution(entry.to_string()))?;
                    (kind.parse::<StrategyKind>()?, count)
                }
                None => (entry.parse::<StrategyKind>()?, 1),
            };

            if distribution.iter().any(|&(k, _)| k == kind) {
                return Err(ConfigError::DuplicateDistributionEntry(kind));
            }
            distribution.push((kind, count));
        }

        Ok(distribution)
    }

    /// Allocate the next agent identity
    pub fn next_id(&mut self) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append a fresh agent of `kind`
    pub fn spawn(&mut self, kind: StrategyKind) -> AgentId {
        let id = self.next_id();
        self.agents.push(Agent::new(id, kind));
        id
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub fn get(&self, index: usize) -> Option<&Agent> {
        self.agents.get(index)
    }

    pub fn index_of(&self, id: AgentId) -> Option<usize> {
        self.agents.iter().position(|a| a.id() == id)
    }

    /// Move the agents out, leaving the population empty (ids keep counting)
    pub fn take_agents(&mut self) -> Vec<Agent> {
        std::mem::take(&mut self.agents)
    }

    /// Replace the agent list, keeping the id counter
    pub fn replace_agents(&mut self, agents: Vec<Agent>) {
        self.agents = agents;
    }

    /// Clear every agent's score, histories and memory
    pub fn reset_all(&mut self) {
        for agent in &mut self.agents {
            agent.reset_all();
        }
    }

    /// Number of agents per kind, in catalog order
    pub fn census(&self) -> BTreeMap<StrategyKind, usize> {
        let mut counts = BTreeMap::new();
        for agent in &self.agents {
            *counts.entry(agent.kind()).or_insert(0) += 1;
        }
        counts
    }

    pub fn snapshot(&self) -> Vec<AgentSnapshot> {
        self.agents.iter().map(AgentSnapshot::from).collect()
    }
}
