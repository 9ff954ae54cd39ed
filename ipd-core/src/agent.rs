//! Agent - a strategy instance with its match history and running score

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::moves::Move;
use crate::payoff::PayoffMatrix;
use crate::strategy::{StrategyKind, StrategyMemory};

/// Stable identity of an agent within a population
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A strategy-bearing player.
///
/// The agent exclusively owns its histories and memory; the game engine only
/// reads and appends through `play` and `remember`, and never changes `kind`.
#[derive(Clone, Debug)]
pub struct Agent {
    id: AgentId,
    kind: StrategyKind,
    own_history: Vec<Move>,
    opponent_history: Vec<Move>,
    score: f64,
    memory: StrategyMemory,
}

impl Agent {
    pub fn new(id: AgentId, kind: StrategyKind) -> Self {
        Self {
            id,
            kind,
            own_history: Vec::new(),
            opponent_history: Vec::new(),
            score: 0.0,
            memory: StrategyMemory::initial(kind),
        }
    }

    /// A fresh agent of the same kind: no score, no history
    pub fn offspring(&self, id: AgentId) -> Self {
        Self::new(id, self.kind)
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn own_history(&self) -> &[Move] {
        &self.own_history
    }

    pub fn opponent_history(&self) -> &[Move] {
        &self.opponent_history
    }

    pub fn memory(&self) -> &StrategyMemory {
        &self.memory
    }

    /// Decide the next move from the current histories and memory
    pub fn play<R: RngCore>(&self, rng: &mut R) -> Move {
        let rule = self.kind.rule();
        (rule.decide)(&self.own_history, &self.opponent_history, &self.memory, rng)
    }

    /// Record a finished round and add its payoff to the score.
    ///
    /// Returns the payoff earned this round.
    pub fn remember(&mut self, own_move: Move, other_move: Move, payoffs: &PayoffMatrix) -> f64 {
        let payoff = payoffs.score(own_move, other_move);
        self.own_history.push(own_move);
        self.opponent_history.push(other_move);
        (self.kind.rule().remember)(own_move, other_move, &mut self.memory);
        self.score += payoff;
        payoff
    }

    /// Clear histories and memory before a new pairing. Keeps the score.
    pub fn reset_match_state(&mut self) {
        self.own_history.clear();
        self.opponent_history.clear();
        self.memory = StrategyMemory::initial(self.kind);
    }

    /// Clear histories, memory and score
    pub fn reset_all(&mut self) {
        self.reset_match_state();
        self.score = 0.0;
    }

    /// Overwrite the running score
    pub fn set_score(&mut self, score: f64) {
        self.score = score;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use Move::{Cooperate as C, Defect as D};

    #[test]
    fn test_play_uses_histories() {
        let payoffs = PayoffMatrix::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut agent = Agent::new(AgentId(0), StrategyKind::TitForTat);

        assert_eq!(agent.play(&mut rng), C);
        agent.remember(C, D, &payoffs);
        assert_eq!(agent.play(&mut rng), D);
    }

    #[test]
    fn test_remember_appends_and_scores() {
        let payoffs = PayoffMatrix::default();
        let mut agent = Agent::new(AgentId(7), StrategyKind::Grudge);

        assert_eq!(agent.remember(C, D, &payoffs), -1.0);
        assert_eq!(agent.remember(D, C, &payoffs), 3.0);

        assert_eq!(agent.own_history(), &[C, D]);
        assert_eq!(agent.opponent_history(), &[D, C]);
        assert_eq!(agent.score(), 2.0);
        assert_eq!(agent.memory(), &StrategyMemory::Grudge { betrayed: true });
    }

    #[test]
    fn test_reset_match_state_keeps_score() {
        let payoffs = PayoffMatrix::default();
        let mut agent = Agent::new(AgentId(1), StrategyKind::Grudge);
        agent.remember(D, D, &payoffs);
        agent.remember(D, C, &payoffs);

        agent.reset_match_state();

        assert!(agent.own_history().is_empty());
        assert!(agent.opponent_history().is_empty());
        assert_eq!(agent.memory(), &StrategyMemory::Grudge { betrayed: false });
        assert_eq!(agent.score(), 3.0);
    }

    #[test]
    fn test_reset_all_clears_score() {
        let payoffs = PayoffMatrix::default();
        let mut agent = Agent::new(AgentId(1), StrategyKind::AlwaysDefect);
        agent.remember(D, C, &payoffs);

        agent.reset_all();

        assert_eq!(agent.score(), 0.0);
        assert!(agent.own_history().is_empty());
    }

    #[test]
    fn test_offspring_inherits_kind_only() {
        let payoffs = PayoffMatrix::default();
        let mut parent = Agent::new(AgentId(3), StrategyKind::Prober);
        parent.remember(C, D, &payoffs);
        parent.remember(D, D, &payoffs);

        let child = parent.offspring(AgentId(9));

        assert_eq!(child.id(), AgentId(9));
        assert_eq!(child.kind(), StrategyKind::Prober);
        assert_eq!(child.score(), 0.0);
        assert!(child.own_history().is_empty());
        assert_eq!(child.memory(), &StrategyMemory::initial(StrategyKind::Prober));
    }
}
