//! Move - a single choice in one round

use serde::{Deserialize, Serialize};
use std::fmt;

/// A move in the Prisoner's Dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Cooperate,
    Defect,
}

impl Move {
    /// The other move
    pub fn opposite(self) -> Move {
        match self {
            Move::Cooperate => Move::Defect,
            Move::Defect => Move::Cooperate,
        }
    }

    pub fn is_cooperate(self) -> bool {
        self == Move::Cooperate
    }

    pub fn is_defect(self) -> bool {
        self == Move::Defect
    }

    /// Single-letter form used in round logs ("C" / "D")
    pub fn symbol(self) -> char {
        match self {
            Move::Cooperate => 'C',
            Move::Defect => 'D',
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
