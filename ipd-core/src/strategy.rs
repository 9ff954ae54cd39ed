//! Strategy catalog
//!
//! The strategy set is closed: every [`StrategyKind`] maps to one entry of a
//! lookup table holding its decision rule and its memory update. Per-match
//! scratch state lives in a [`StrategyMemory`] owned by the agent.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::moves::Move;

/// Identifier of a strategy in the catalog
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyKind {
    TitForTat,
    AlwaysDefect,
    AlwaysCooperate,
    Grudge,
    Prober,
    TitForTwoTats,
    Pavlov,
    Random,
}

impl StrategyKind {
    /// Every kind, in catalog order
    pub const ALL: [StrategyKind; 8] = [
        StrategyKind::TitForTat,
        StrategyKind::AlwaysDefect,
        StrategyKind::AlwaysCooperate,
        StrategyKind::Grudge,
        StrategyKind::Prober,
        StrategyKind::TitForTwoTats,
        StrategyKind::Pavlov,
        StrategyKind::Random,
    ];

    /// Catalog entry for this kind
    pub fn rule(self) -> &'static StrategyRule {
        &CATALOG[self as usize]
    }

    /// Identifier as used in configuration ("TIT_FOR_TAT")
    pub fn identifier(self) -> &'static str {
        match self {
            StrategyKind::TitForTat => "TIT_FOR_TAT",
            StrategyKind::AlwaysDefect => "ALWAYS_DEFECT",
            StrategyKind::AlwaysCooperate => "ALWAYS_COOPERATE",
            StrategyKind::Grudge => "GRUDGE",
            StrategyKind::Prober => "PROBER",
            StrategyKind::TitForTwoTats => "TIT_FOR_TWO_TATS",
            StrategyKind::Pavlov => "PAVLOV",
            StrategyKind::Random => "RANDOM",
        }
    }

    pub fn name(self) -> &'static str {
        self.rule().name
    }

    pub fn description(self) -> &'static str {
        self.rule().description
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for StrategyKind {
    type Err = ConfigError;

    /// Accepts identifiers in any case with `_`, `-` or spaces as separators,
    /// plus the usual short names (tft, alld, allc, tf2t).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();

        let kind = match normalized.as_str() {
            "TIT_FOR_TAT" | "TFT" => StrategyKind::TitForTat,
            "ALWAYS_DEFECT" | "ALLD" => StrategyKind::AlwaysDefect,
            "ALWAYS_COOPERATE" | "ALLC" => StrategyKind::AlwaysCooperate,
            "GRUDGE" => StrategyKind::Grudge,
            "PROBER" => StrategyKind::Prober,
            "TIT_FOR_TWO_TATS" | "TF2T" => StrategyKind::TitForTwoTats,
            "PAVLOV" => StrategyKind::Pavlov,
            "RANDOM" => StrategyKind::Random,
            _ => return Err(ConfigError::UnknownStrategy(s.to_string())),
        };
        Ok(kind)
    }
}

/// Per-match scratch state of a strategy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyMemory {
    #[default]
    Stateless,
    Grudge {
        betrayed: bool,
    },
    Prober {
        rounds_seen: u32,
        saw_retaliation: bool,
    },
}

impl StrategyMemory {
    /// Fresh memory for the start of a match
    pub fn initial(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::Grudge => StrategyMemory::Grudge { betrayed: false },
            StrategyKind::Prober => StrategyMemory::Prober {
                rounds_seen: 0,
                saw_retaliation: false,
            },
            _ => StrategyMemory::Stateless,
        }
    }
}

/// Decision rule: `(own_history, opponent_history, memory, rng) -> Move`
pub type DecideFn = fn(&[Move], &[Move], &StrategyMemory, &mut dyn RngCore) -> Move;

/// Memory update after a round: `(own_move, opponent_move, memory)`
pub type RememberFn = fn(Move, Move, &mut StrategyMemory);

/// One entry of the strategy catalog
pub struct StrategyRule {
    pub kind: StrategyKind,
    pub name: &'static str,
    pub description: &'static str,
    pub decide: DecideFn,
    pub remember: RememberFn,
}

impl fmt::Debug for StrategyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRule")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .finish()
    }
}

/// Indexed by `StrategyKind as usize`
static CATALOG: [StrategyRule; 8] = [
    StrategyRule {
        kind: StrategyKind::TitForTat,
        name: "Tit for Tat",
        description: "Copies opponent's last move. Starts by cooperating.",
        decide: decide_tit_for_tat,
        remember: remember_nothing,
    },
    StrategyRule {
        kind: StrategyKind::AlwaysDefect,
        name: "Always Defect",
        description: "Never cooperates. Always defects.",
        decide: decide_always_defect,
        remember: remember_nothing,
    },
    StrategyRule {
        kind: StrategyKind::AlwaysCooperate,
        name: "Always Cooperate",
        description: "Never defects. Always cooperates.",
        decide: decide_always_cooperate,
        remember: remember_nothing,
    },
    StrategyRule {
        kind: StrategyKind::Grudge,
        name: "Grudge",
        description: "Cooperates until betrayed once, then defects for the rest of the match.",
        decide: decide_grudge,
        remember: remember_grudge,
    },
    StrategyRule {
        kind: StrategyKind::Prober,
        name: "Prober",
        description: "Opens with C, D, C, C. Defects forever if the opponent struck back, else plays Tit for Tat.",
        decide: decide_prober,
        remember: remember_prober,
    },
    StrategyRule {
        kind: StrategyKind::TitForTwoTats,
        name: "Tit for Two Tats",
        description: "Only retaliates after two consecutive defections.",
        decide: decide_tit_for_two_tats,
        remember: remember_nothing,
    },
    StrategyRule {
        kind: StrategyKind::Pavlov,
        name: "Pavlov",
        description: "Repeats its move if the opponent cooperated, switches otherwise.",
        decide: decide_pavlov,
        remember: remember_nothing,
    },
    StrategyRule {
        kind: StrategyKind::Random,
        name: "Random",
        description: "Randomly cooperates or defects each round.",
        decide: decide_random,
        remember: remember_nothing,
    },
];

/// Prober's fixed opening, rounds 1-4
const PROBER_OPENING: [Move; 4] = [Move::Cooperate, Move::Defect, Move::Cooperate, Move::Cooperate];

// ============================================================================
// Decision rules
// ============================================================================

fn decide_tit_for_tat(
    _own: &[Move],
    opponent: &[Move],
    _memory: &StrategyMemory,
    _rng: &mut dyn RngCore,
) -> Move {
    opponent.last().copied().unwrap_or(Move::Cooperate)
}

fn decide_always_defect(
    _own: &[Move],
    _opponent: &[Move],
    _memory: &StrategyMemory,
    _rng: &mut dyn RngCore,
) -> Move {
    Move::Defect
}

fn decide_always_cooperate(
    _own: &[Move],
    _opponent: &[Move],
    _memory: &StrategyMemory,
    _rng: &mut dyn RngCore,
) -> Move {
    Move::Cooperate
}

fn decide_grudge(
    _own: &[Move],
    _opponent: &[Move],
    memory: &StrategyMemory,
    _rng: &mut dyn RngCore,
) -> Move {
    match memory {
        StrategyMemory::Grudge { betrayed: true } => Move::Defect,
        _ => Move::Cooperate,
    }
}

fn decide_prober(
    own: &[Move],
    opponent: &[Move],
    memory: &StrategyMemory,
    _rng: &mut dyn RngCore,
) -> Move {
    if let Some(&opening) = PROBER_OPENING.get(own.len()) {
        return opening;
    }

    match memory {
        StrategyMemory::Prober { saw_retaliation: true, .. } => Move::Defect,
        _ => opponent.last().copied().unwrap_or(Move::Cooperate),
    }
}

fn decide_tit_for_two_tats(
    _own: &[Move],
    opponent: &[Move],
    _memory: &StrategyMemory,
    _rng: &mut dyn RngCore,
) -> Move {
    match opponent {
        [.., Move::Defect, Move::Defect] => Move::Defect,
        _ => Move::Cooperate,
    }
}

/// Win-stay, lose-shift. A round went well when the opponent cooperated.
fn decide_pavlov(
    own: &[Move],
    opponent: &[Move],
    _memory: &StrategyMemory,
    _rng: &mut dyn RngCore,
) -> Move {
    match (own.last(), opponent.last()) {
        (Some(&mine), Some(&Move::Cooperate)) => mine,
        (Some(&mine), Some(&Move::Defect)) => mine.opposite(),
        _ => Move::Cooperate,
    }
}

fn decide_random(
    _own: &[Move],
    _opponent: &[Move],
    _memory: &StrategyMemory,
    rng: &mut dyn RngCore,
) -> Move {
    if rng.gen_bool(0.5) {
        Move::Cooperate
    } else {
        Move::Defect
    }
}

// ============================================================================
// Memory updates
// ============================================================================

fn remember_nothing(_own: Move, _opponent: Move, _memory: &mut StrategyMemory) {}

fn remember_grudge(_own: Move, opponent: Move, memory: &mut StrategyMemory) {
    if let StrategyMemory::Grudge { betrayed } = memory {
        *betrayed |= opponent.is_defect();
    }
}

/// Rounds 2-4 are the probing window (zero-based rounds 1..=3)
fn remember_prober(_own: Move, opponent: Move, memory: &mut StrategyMemory) {
    if let StrategyMemory::Prober { rounds_seen, saw_retaliation } = memory {
        if (1..=3).contains(&*rounds_seen) && opponent.is_defect() {
            *saw_retaliation = true;
        }
        *rounds_seen += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use Move::{Cooperate as C, Defect as D};

    fn make_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn decide(kind: StrategyKind, own: &[Move], opponent: &[Move], memory: &StrategyMemory) -> Move {
        let mut rng = make_rng();
        (kind.rule().decide)(own, opponent, memory, &mut rng)
    }

    /// Replays a match against a fixed opponent script, returning the strategy's moves
    fn replay(kind: StrategyKind, opponent_script: &[Move]) -> Vec<Move> {
        let rule = kind.rule();
        let mut rng = make_rng();
        let mut memory = StrategyMemory::initial(kind);
        let mut own = Vec::new();
        let mut opponent = Vec::new();

        for &theirs in opponent_script {
            let mine = (rule.decide)(&own, &opponent, &memory, &mut rng);
            (rule.remember)(mine, theirs, &mut memory);
            own.push(mine);
            opponent.push(theirs);
        }
        own
    }

    #[test]
    fn test_catalog_is_indexed_by_kind() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.rule().kind, kind);
        }
    }

    #[test]
    fn test_every_strategy_has_a_first_move() {
        for kind in StrategyKind::ALL {
            let m = decide(kind, &[], &[], &StrategyMemory::initial(kind));
            assert!(m == C || m == D);
        }
    }

    #[test]
    fn test_tit_for_tat() {
        assert_eq!(decide(StrategyKind::TitForTat, &[], &[], &StrategyMemory::Stateless), C);
        assert_eq!(replay(StrategyKind::TitForTat, &[D, C, D, D]), vec![C, D, C, D]);
    }

    #[test]
    fn test_constant_strategies() {
        assert_eq!(replay(StrategyKind::AlwaysDefect, &[C, C, C]), vec![D, D, D]);
        assert_eq!(replay(StrategyKind::AlwaysCooperate, &[D, D, D]), vec![C, C, C]);
    }

    #[test]
    fn test_grudge_never_forgives() {
        assert_eq!(
            replay(StrategyKind::Grudge, &[C, C, D, C, C, C]),
            vec![C, C, C, D, D, D]
        );
    }

    #[test]
    fn test_grudge_memory_flag() {
        let mut memory = StrategyMemory::initial(StrategyKind::Grudge);
        (StrategyKind::Grudge.rule().remember)(C, C, &mut memory);
        assert_eq!(memory, StrategyMemory::Grudge { betrayed: false });
        (StrategyKind::Grudge.rule().remember)(C, D, &mut memory);
        (StrategyKind::Grudge.rule().remember)(D, C, &mut memory);
        assert_eq!(memory, StrategyMemory::Grudge { betrayed: true });
    }

    #[test]
    fn test_prober_opening() {
        assert_eq!(replay(StrategyKind::Prober, &[C, C, C, C]), vec![C, D, C, C]);
    }

    #[test]
    fn test_prober_plays_tit_for_tat_when_unprovoked() {
        // Opponent never defects in rounds 2-4: Tit for Tat from round 5
        let moves = replay(StrategyKind::Prober, &[C, C, C, C, D, C, C]);
        assert_eq!(moves, vec![C, D, C, C, C, D, C]);
    }

    #[test]
    fn test_prober_defects_after_retaliation() {
        // Opponent strikes back in round 3 (after prober's round 2 defection)
        let moves = replay(StrategyKind::Prober, &[C, C, D, C, C, C, C]);
        assert_eq!(moves, vec![C, D, C, C, D, D, D]);
    }

    #[test]
    fn test_prober_ignores_round_one_defection() {
        // A defection in round 1 is outside the probing window
        let moves = replay(StrategyKind::Prober, &[D, C, C, C, C, C]);
        assert_eq!(moves, vec![C, D, C, C, C, C]);
    }

    #[test]
    fn test_tit_for_two_tats() {
        assert_eq!(decide(StrategyKind::TitForTwoTats, &[], &[D], &StrategyMemory::Stateless), C);
        assert_eq!(decide(StrategyKind::TitForTwoTats, &[], &[C, D], &StrategyMemory::Stateless), C);
        assert_eq!(decide(StrategyKind::TitForTwoTats, &[], &[D, D], &StrategyMemory::Stateless), D);
        assert_eq!(decide(StrategyKind::TitForTwoTats, &[], &[D, D, C], &StrategyMemory::Stateless), C);
    }

    #[test]
    fn test_pavlov_win_stay() {
        // Both cooperated - stay
        assert_eq!(decide(StrategyKind::Pavlov, &[C], &[C], &StrategyMemory::Stateless), C);
        // Defected against a cooperator - stay
        assert_eq!(decide(StrategyKind::Pavlov, &[D], &[C], &StrategyMemory::Stateless), D);
    }

    #[test]
    fn test_pavlov_lose_shift() {
        // Suckered - switch to defect
        assert_eq!(decide(StrategyKind::Pavlov, &[C], &[D], &StrategyMemory::Stateless), D);
        // Both defected - switch to cooperate
        assert_eq!(decide(StrategyKind::Pavlov, &[D], &[D], &StrategyMemory::Stateless), C);
    }

    #[test]
    fn test_random_is_reproducible_and_mixed() {
        let script = [C; 64];
        let first = replay(StrategyKind::Random, &script);
        let second = replay(StrategyKind::Random, &script);
        assert_eq!(first, second);
        assert!(first.contains(&C));
        assert!(first.contains(&D));
    }

    #[test]
    fn test_parse_kinds() {
        assert_eq!("TIT_FOR_TAT".parse::<StrategyKind>().unwrap(), StrategyKind::TitForTat);
        assert_eq!("tit-for-two-tats".parse::<StrategyKind>().unwrap(), StrategyKind::TitForTwoTats);
        assert_eq!("alld".parse::<StrategyKind>().unwrap(), StrategyKind::AlwaysDefect);
        assert_eq!("Pavlov".parse::<StrategyKind>().unwrap(), StrategyKind::Pavlov);
        for kind in StrategyKind::ALL {
            assert_eq!(kind.to_string().parse::<StrategyKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_is_config_error() {
        assert_eq!(
            "copykitten".parse::<StrategyKind>(),
            Err(ConfigError::UnknownStrategy("copykitten".to_string()))
        );
    }
}
