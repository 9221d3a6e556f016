//! Seeding: validate the entrant count and pair a uniform shuffle into round 1.

use crate::models::{BracketError, GameMatch, Participant, TournamentId, TournamentUpdate};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// Round-1 matches to create, plus the tournament directive that goes with them.
#[derive(Clone, Debug, Serialize)]
pub struct SeedResult {
    pub matches: Vec<GameMatch>,
    pub tournament_update: TournamentUpdate,
}

/// A bracket can be built from `count` entrants: a power of two, at least 2. No byes.
pub fn is_seedable(count: usize) -> bool {
    count > 1 && count.is_power_of_two()
}

/// Seed round 1 using the thread RNG.
///
/// Not idempotent: every call draws a new pairing. Callers check `bracket_generated` first.
pub fn seed(
    tournament_id: TournamentId,
    participants: &[Participant],
) -> Result<SeedResult, BracketError> {
    seed_with_rng(tournament_id, participants, &mut rand::thread_rng())
}

/// Seed round 1 with a caller-supplied RNG.
///
/// 1. Reject counts that are not a power of two >= 2.
/// 2. Fisher-Yates shuffle of the entrants.
/// 3. Pair `(0,1), (2,3), ...` into matches `1, 2, ...`, all `Pending`.
pub fn seed_with_rng<R: Rng + ?Sized>(
    tournament_id: TournamentId,
    participants: &[Participant],
    rng: &mut R,
) -> Result<SeedResult, BracketError> {
    if !is_seedable(participants.len()) {
        return Err(BracketError::InvalidParticipantCount {
            count: participants.len(),
        });
    }
    let mut order = participants.to_vec();
    order.shuffle(rng);

    Ok(SeedResult {
        matches: pair_round(tournament_id, 1, &order),
        tournament_update: TournamentUpdate::BracketGenerated,
    })
}

/// Pair entrants consecutively into the matches of `round`, numbered from 1.
/// Callers pass an even count.
pub(crate) fn pair_round(
    tournament_id: TournamentId,
    round: u32,
    entrants: &[Participant],
) -> Vec<GameMatch> {
    entrants
        .chunks_exact(2)
        .zip(1..)
        .map(|(pair, match_number)| {
            GameMatch::new(tournament_id, round, match_number, &pair[0], &pair[1])
        })
        .collect()
}
