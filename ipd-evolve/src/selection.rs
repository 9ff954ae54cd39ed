//! Truncation selection and reproduction
//!
//! Agents are ranked by score (descending); ties go to the earlier
//! population index. The lowest `n` are culled and the highest `n` are
//! cloned, so the population size never changes.

use ipd_core::{AgentId, Population};
use ipd_tournament::rank_by_score;

/// Outcome of ranking a scored population
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Indices to remove, worst first
    pub culled: Vec<usize>,
    /// Indices to clone, best first
    pub parents: Vec<usize>,
}

/// Select the top N individuals by score (elitism).
///
/// Returns indices of the best individuals, sorted by score (descending).
pub fn select_elite(scores: &[f64], n: usize) -> Vec<usize> {
    let mut indices = rank_by_score(scores);
    indices.truncate(n);
    indices
}

/// Select the bottom N individuals, worst first.
///
/// Among equal scores the later index is culled first.
pub fn select_culled(scores: &[f64], n: usize) -> Vec<usize> {
    rank_by_score(scores).into_iter().rev().take(n).collect()
}

/// Rank once and pick both ends
pub fn select(scores: &[f64], elimination_count: usize) -> Selection {
    Selection {
        culled: select_culled(scores, elimination_count),
        parents: select_elite(scores, elimination_count),
    }
}

/// Remove culled agents and insert one fresh clone right after each parent.
///
/// Clones inherit the strategy kind only. Returns the new agents' ids in
/// population order.
pub fn reproduce(population: &mut Population, selection: &Selection) -> Vec<AgentId> {
    let old = population.take_agents();
    let mut next = Vec::with_capacity(old.len());
    let mut offspring = Vec::with_capacity(selection.parents.len());

    for (index, agent) in old.into_iter().enumerate() {
        let child = if selection.parents.contains(&index) {
            Some(agent.offspring(population.next_id()))
        } else {
            None
        };

        if !selection.culled.contains(&index) {
            next.push(agent);
        }
        if let Some(child) = child {
            offspring.push(child.id());
            next.push(child);
        }
    }

    population.replace_agents(next);
    offspring
}
