//! Payoff matrix for the Prisoner's Dilemma
//!
//! The four outcome values are named after the classic literature:
//! `P` (punishment, both defect), `S` (sucker), `R` (reward, both cooperate)
//! and `T` (temptation).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::moves::Move;

/// One of the four payoff values
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayoffKey {
    /// Both defect
    P,
    /// Self cooperates, other defects
    S,
    /// Both cooperate
    R,
    /// Self defects, other cooperates
    T,
}

impl PayoffKey {
    pub const ALL: [PayoffKey; 4] = [PayoffKey::P, PayoffKey::S, PayoffKey::R, PayoffKey::T];
}

impl FromStr for PayoffKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "P" => Ok(PayoffKey::P),
            "S" => Ok(PayoffKey::S),
            "R" => Ok(PayoffKey::R),
            "T" => Ok(PayoffKey::T),
            _ => Err(ConfigError::UnknownPayoffKey(s.to_string())),
        }
    }
}

impl fmt::Display for PayoffKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            PayoffKey::P => "P",
            PayoffKey::S => "S",
            PayoffKey::R => "R",
            PayoffKey::T => "T",
        };
        f.write_str(key)
    }
}

/// Payoff values for every outcome of a round.
///
/// The canonical ordering `T > R > P > S` is not enforced: a host may
/// configure any values, which only changes which strategies do well.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoffMatrix {
    #[serde(rename = "P")]
    pub p: f64,
    #[serde(rename = "S")]
    pub s: f64,
    #[serde(rename = "R")]
    pub r: f64,
    #[serde(rename = "T")]
    pub t: f64,
}

impl PayoffMatrix {
    pub const DEFAULT_P: f64 = 0.0;
    pub const DEFAULT_S: f64 = -1.0;
    pub const DEFAULT_R: f64 = 2.0;
    pub const DEFAULT_T: f64 = 3.0;

    /// Score for `self_move` against `other_move`, from the first player's perspective
    pub fn score(&self, self_move: Move, other_move: Move) -> f64 {
        match (self_move, other_move) {
            (Move::Cooperate, Move::Cooperate) => self.r,
            (Move::Cooperate, Move::Defect) => self.s,
            (Move::Defect, Move::Cooperate) => self.t,
            (Move::Defect, Move::Defect) => self.p,
        }
    }

    /// Scores for both players of a round as `(score_a, score_b)`
    pub fn score_pair(&self, move_a: Move, move_b: Move) -> (f64, f64) {
        (self.score(move_a, move_b), self.score(move_b, move_a))
    }

    pub fn get(&self, key: PayoffKey) -> f64 {
        match key {
            PayoffKey::P => self.p,
            PayoffKey::S => self.s,
            PayoffKey::R => self.r,
            PayoffKey::T => self.t,
        }
    }

    /// Overwrite one value. No range validation.
    pub fn set_value(&mut self, key: PayoffKey, value: f64) {
        match key {
            PayoffKey::P => self.p = value,
            PayoffKey::S => self.s = value,
            PayoffKey::R => self.r = value,
            PayoffKey::T => self.t = value,
        }
    }

    pub fn reset_to_default(&mut self) {
        *self = Self::default();
    }

    /// Whether `T > R > P > S` holds
    pub fn is_canonical(&self) -> bool {
        self.t > self.r && self.r > self.p && self.p > self.s
    }
}

impl Default for PayoffMatrix {
    fn default() -> Self {
        Self {
            p: Self::DEFAULT_P,
            s: Self::DEFAULT_S,
            r: Self::DEFAULT_R,
            t: Self::DEFAULT_T,
        }
    }
}
