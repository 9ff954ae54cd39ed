//! Single round between two agents
//!
//! Level 3 - Step-level implementation

use ipd_core::{Agent, Move, PayoffMatrix};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// Outcome of one round, from both perspectives
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub move_a: Move,
    pub move_b: Move,
    pub score_a: f64,
    pub score_b: f64,
    /// Whether noise flipped A's intended move
    pub flipped_a: bool,
    /// Whether noise flipped B's intended move
    pub flipped_b: bool,
}

/// Play one noise-free round: both agents decide, both get scored and remember.
pub fn play_one_round<R: RngCore>(
    a: &mut Agent,
    b: &mut Agent,
    payoffs: &PayoffMatrix,
    rng: &mut R,
) -> RoundResult {
    play_noisy_round(a, b, payoffs, 0.0, rng)
}

/// Play one round where each resolved move may be flipped with probability `noise`.
///
/// The flipped move replaces the intended one everywhere: it is scored,
/// recorded in the actor's own history and seen by the opponent.
/// `noise` must already be validated to lie in [0, 1].
pub(crate) fn play_noisy_round<R: RngCore>(
    a: &mut Agent,
    b: &mut Agent,
    payoffs: &PayoffMatrix,
    noise: f64,
    rng: &mut R,
) -> RoundResult {
    let intended_a = a.play(rng);
    let intended_b = b.play(rng);

    let (move_a, flipped_a) = apply_noise(intended_a, noise, rng);
    let (move_b, flipped_b) = apply_noise(intended_b, noise, rng);

    let score_a = a.remember(move_a, move_b, payoffs);
    let score_b = b.remember(move_b, move_a, payoffs);

    RoundResult {
        move_a,
        move_b,
        score_a,
        score_b,
        flipped_a,
        flipped_b,
    }
}

/// No random draw happens when noise is zero
fn apply_noise<R: RngCore>(intended: Move, noise: f64, rng: &mut R) -> (Move, bool) {
    if noise > 0.0 && rng.gen_bool(noise) {
        (intended.opposite(), true)
    } else {
        (intended, false)
    }
}
