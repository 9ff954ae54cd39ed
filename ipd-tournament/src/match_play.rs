//! Repeated game - a fixed number of rounds between two agents
//!
//! Level 2 - Phase-level implementation

use ipd_core::{Agent, ConfigError, Move, PayoffMatrix};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::config::MatchConfig;
use crate::round::play_noisy_round;

/// One round of a match, with running totals for animation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Round number (0-indexed)
    pub round: u32,
    pub move_a: Move,
    pub move_b: Move,
    pub flipped_a: bool,
    pub flipped_b: bool,
    pub score_a: f64,
    pub score_b: f64,
    pub cumulative_a: f64,
    pub cumulative_b: f64,
}

/// Result of a repeated game
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub rounds: Vec<RoundRecord>,
    pub total_score_a: f64,
    pub total_score_b: f64,
}

impl MatchResult {
    /// Number of rounds played
    pub fn turns(&self) -> usize {
        self.rounds.len()
    }

    /// Move pairs in play order
    pub fn moves(&self) -> Vec<(Move, Move)> {
        self.rounds.iter().map(|r| (r.move_a, r.move_b)).collect()
    }

    /// Number of moves flipped by noise, over both agents
    pub fn flips(&self) -> usize {
        self.rounds
            .iter()
            .map(|r| r.flipped_a as usize + r.flipped_b as usize)
            .sum()
    }
}

/// Play `config.turns` rounds between `a` and `b` (Level 2 phase)
///
/// Histories persist across the whole game; callers reset them with
/// `Agent::reset_match_state` before a fresh pairing. Each round's payoff is
/// also added to the agents' persistent scores.
///
/// # Returns
/// The per-round log and both agents' totals for this game only
pub fn play_repeated_game<R: RngCore>(
    a: &mut Agent,
    b: &mut Agent,
    config: &MatchConfig,
    payoffs: &PayoffMatrix,
    rng: &mut R,
) -> Result<MatchResult, ConfigError> {
    config.validate()?;

    let mut rounds = Vec::with_capacity(config.turns as usize);
    let mut total_a = 0.0;
    let mut total_b = 0.0;

    for round in 0..config.turns {
        let result = play_noisy_round(a, b, payoffs, config.noise, rng);
        total_a += result.score_a;
        total_b += result.score_b;

        rounds.push(RoundRecord {
            round,
            move_a: result.move_a,
            move_b: result.move_b,
            flipped_a: result.flipped_a,
            flipped_b: result.flipped_b,
            score_a: result.score_a,
            score_b: result.score_b,
            cumulative_a: total_a,
            cumulative_b: total_b,
        });
    }

    Ok(MatchResult {
        rounds,
        total_score_a: total_a,
        total_score_b: total_b,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipd_core::{AgentId, StrategyKind};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use Move::{Cooperate as C, Defect as D};

    fn play(kind_a: StrategyKind, kind_b: StrategyKind, config: MatchConfig, seed: u64) -> MatchResult {
        let payoffs = PayoffMatrix::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut a = Agent::new(AgentId(0), kind_a);
        let mut b = Agent::new(AgentId(1), kind_b);
        play_repeated_game(&mut a, &mut b, &config, &payoffs, &mut rng).unwrap()
    }

    #[test]
    fn test_tft_vs_always_defect() {
        let result = play(StrategyKind::TitForTat, StrategyKind::AlwaysDefect, MatchConfig::new(5), 42);

        assert_eq!(result.moves(), vec![(C, D), (D, D), (D, D), (D, D), (D, D)]);
        assert_eq!(result.total_score_a, -1.0);
        assert_eq!(result.total_score_b, 3.0);
    }

    #[test]
    fn test_cooperate_vs_cooperate() {
        let result = play(StrategyKind::AlwaysCooperate, StrategyKind::AlwaysCooperate, MatchConfig::new(3), 42);

        for round in &result.rounds {
            assert_eq!((round.score_a, round.score_b), (2.0, 2.0));
        }
        assert_eq!(result.total_score_a, 6.0);
        assert_eq!(result.total_score_b, 6.0);
    }

    #[test]
    fn test_match_determinism() {
        let config = MatchConfig::new(50);
        let first = play(StrategyKind::Pavlov, StrategyKind::Random, config, 1234);
        let second = play(StrategyKind::Pavlov, StrategyKind::Random, config, 1234);
        assert_eq!(first, second);
    }

    #[test]
    fn test_noisy_match_determinism() {
        let config = MatchConfig::new(50).with_noise(0.2);
        let first = play(StrategyKind::Grudge, StrategyKind::TitForTat, config, 9);
        let second = play(StrategyKind::Grudge, StrategyKind::TitForTat, config, 9);
        assert_eq!(first, second);
    }

    #[test]
    fn test_noise_breaks_mutual_cooperation() {
        let config = MatchConfig::new(200).with_noise(0.1);
        let result = play(StrategyKind::TitForTat, StrategyKind::TitForTat, config, 42);

        assert!(result.flips() > 0);
        assert!(result.moves().iter().any(|&(a, b)| a == D || b == D));
    }

    #[test]
    fn test_cumulative_scores() {
        let result = play(StrategyKind::Prober, StrategyKind::TitForTwoTats, MatchConfig::new(12), 42);

        let mut expected_a = 0.0;
        let mut expected_b = 0.0;
        for round in &result.rounds {
            expected_a += round.score_a;
            expected_b += round.score_b;
            assert_eq!(round.cumulative_a, expected_a);
            assert_eq!(round.cumulative_b, expected_b);
        }
        assert_eq!(result.total_score_a, expected_a);
        assert_eq!(result.turns(), 12);
    }

    #[test]
    fn test_histories_persist_across_rounds() {
        let payoffs = PayoffMatrix::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut a = Agent::new(AgentId(0), StrategyKind::Grudge);
        let mut b = Agent::new(AgentId(1), StrategyKind::AlwaysDefect);

        play_repeated_game(&mut a, &mut b, &MatchConfig::new(4), &payoffs, &mut rng).unwrap();

        assert_eq!(a.own_history(), &[C, D, D, D]);
        assert_eq!(b.opponent_history(), &[C, D, D, D]);
        assert_eq!(a.score(), -1.0);
    }

    #[test]
    fn test_invalid_noise_is_rejected() {
        let payoffs = PayoffMatrix::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut a = Agent::new(AgentId(0), StrategyKind::TitForTat);
        let mut b = Agent::new(AgentId(1), StrategyKind::TitForTat);
        let config = MatchConfig::new(3).with_noise(2.0);

        let err = play_repeated_game(&mut a, &mut b, &config, &payoffs, &mut rng).unwrap_err();

        assert_eq!(err, ConfigError::InvalidNoise(2.0));
        assert!(a.own_history().is_empty());
    }

    #[test]
    fn test_zero_turns() {
        let result = play(StrategyKind::TitForTat, StrategyKind::AlwaysDefect, MatchConfig::new(0), 42);
        assert!(result.rounds.is_empty());
        assert_eq!(result.total_score_a, 0.0);
    }
}
