//! Round-robin tournament over a population
//!
//! Level 1 - Orchestration and Level 4 - pairing/ranking utilities

use std::cmp::Ordering;

use ipd_core::{Agent, AgentId, InvariantViolation, IpdError, PayoffMatrix, StrategyKind};
use rand::RngCore;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::config::MatchConfig;
use crate::match_play::play_repeated_game;

/// Rank of one agent after a tournament
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Standing {
    /// 0 for the winner
    pub rank: usize,
    /// Index of the agent in the population
    pub index: usize,
    pub id: AgentId,
    pub kind: StrategyKind,
    /// Cumulative score across all pairings
    pub score: f64,
}

/// Totals of one pairing, from both agents' perspective
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PairingRecord {
    pub a: usize,
    pub b: usize,
    pub id_a: AgentId,
    pub id_b: AgentId,
    pub score_a: f64,
    pub score_b: f64,
}

/// Result of a tournament
#[derive(Clone, Debug, Serialize)]
pub struct TournamentResult {
    /// Standings sorted by score (descending), ties by population index
    pub standings: Vec<Standing>,
    /// Every pairing played, in play order
    pub pairings: Vec<PairingRecord>,
    #[serde(skip)]
    scores: FxHashMap<AgentId, f64>,
}

impl TournamentResult {
    /// Get winner (top standing)
    pub fn winner(&self) -> Option<&Standing> {
        self.standings.first()
    }

    /// Get top N performers
    pub fn top_n(&self, n: usize) -> &[Standing] {
        let n = n.min(self.standings.len());
        &self.standings[..n]
    }

    /// Get standing for a specific agent
    pub fn standing_for(&self, id: AgentId) -> Option<&Standing> {
        self.standings.iter().find(|s| s.id == id)
    }

    pub fn score_of(&self, id: AgentId) -> Option<f64> {
        self.scores.get(&id).copied()
    }

    /// Population indices from best to worst
    pub fn ranking(&self) -> Vec<usize> {
        self.standings.iter().map(|s| s.index).collect()
    }
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

/// Play every unordered pair of distinct agents once (Level 1 orchestration)
///
/// Each pairing starts from cleared match state, and its payoffs accumulate
/// into the agents' persistent scores. Scores are not reset first: call
/// `Agent::reset_all` beforehand for a fresh tournament.
///
/// # Arguments
/// * `agents` - Participants, in population order
/// * `config` - Turns and noise for every match
/// * `payoffs` - Payoff matrix
/// * `rng` - Random source for Random agents and noise
pub fn play_one_tournament<R: RngCore>(
    agents: &mut [Agent],
    config: &MatchConfig,
    payoffs: &PayoffMatrix,
    rng: &mut R,
) -> Result<TournamentResult, IpdError> {
    config.validate()?;

    let pairings = round_robin_pairings(agents.len());
    tracing::debug!(
        "Tournament: {} agents, {} pairings, turns={}, noise={}",
        agents.len(),
        pairings.len(),
        config.turns,
        config.noise
    );

    let mut records = Vec::with_capacity(pairings.len());
    for (i, j) in pairings {
        let (a, b) = pair_mut(agents, i, j)?;
        a.reset_match_state();
        b.reset_match_state();

        let result = play_repeated_game(a, b, config, payoffs, rng)?;
        tracing::trace!(
            "{} {} vs {} {}: {} - {}",
            a.kind(),
            a.id(),
            b.kind(),
            b.id(),
            result.total_score_a,
            result.total_score_b
        );

        records.push(PairingRecord {
            a: i,
            b: j,
            id_a: a.id(),
            id_b: b.id(),
            score_a: result.total_score_a,
            score_b: result.total_score_b,
        });
    }

    let scores = agents.iter().map(|a| (a.id(), a.score())).collect();

    Ok(TournamentResult {
        standings: compute_standings(agents),
        pairings: records,
        scores,
    })
}

// ============================================================================
// Level 4 - Utilities
// ============================================================================

/// All pairs `(i, j)` with `i < j < n`, i.e. C(n, 2) pairings
pub fn round_robin_pairings(n: usize) -> Vec<(usize, usize)> {
    let mut pairings = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            pairings.push((i, j));
        }
    }
    pairings
}

/// Borrow two distinct agents mutably
pub fn pair_mut(
    agents: &mut [Agent],
    a: usize,
    b: usize,
) -> Result<(&mut Agent, &mut Agent), InvariantViolation> {
    let len = agents.len();
    if a == b {
        return Err(InvariantViolation::SelfPairing(a));
    }
    if a >= len || b >= len {
        return Err(InvariantViolation::PairingOutOfRange { a, b, len });
    }

    if a < b {
        let (left, right) = agents.split_at_mut(b);
        Ok((&mut left[a], &mut right[0]))
    } else {
        let (left, right) = agents.split_at_mut(a);
        Ok((&mut right[0], &mut left[b]))
    }
}

/// Descending score order with NaN after every number.
///
/// Unlike `partial_cmp`, this is a total order, so sorting never panics even
/// when infinite payoffs produce NaN scores. `-0.0` and `0.0` compare equal.
pub fn compare_scores_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) if a > b => Ordering::Less,
        (false, false) if a < b => Ordering::Greater,
        (false, false) => Ordering::Equal,
    }
}

/// Indices sorted by score (descending); equal scores keep index order
pub fn rank_by_score(scores: &[f64]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| compare_scores_desc(scores[a], scores[b]).then_with(|| a.cmp(&b)));
    indices
}

/// Standings from the agents' current scores
pub fn compute_standings(agents: &[Agent]) -> Vec<Standing> {
    let scores: Vec<f64> = agents.iter().map(|a| a.score()).collect();

    rank_by_score(&scores)
        .into_iter()
        .enumerate()
        .map(|(rank, index)| {
            let agent = &agents[index];
            Standing {
                rank,
                index,
                id: agent.id(),
                kind: agent.kind(),
                score: agent.score(),
            }
        })
        .collect()
}
