//! Progression: apply a match result, and when its round is done, build the next round
//! or crown the champion.

use crate::logic::rounds::check_round_integrity;
use crate::logic::seeding::pair_round;
use crate::models::{
    BracketError, GameMatch, InvalidResultReason, MatchId, MatchUpdate, Participant,
    ParticipantId, TournamentUpdate,
};
use serde::Serialize;

/// What the caller persists after a result: the match update first, then `new_matches`
/// as one batch, then `tournament_update` if present.
#[derive(Clone, Debug, Serialize)]
pub struct AdvanceResult {
    pub match_update: MatchUpdate,
    pub new_matches: Vec<GameMatch>,
    pub tournament_update: Option<TournamentUpdate>,
}

impl AdvanceResult {
    /// The result completed a round but the bracket continues.
    pub fn advanced(&self) -> bool {
        !self.new_matches.is_empty()
    }

    /// The result decided the final.
    pub fn finalized(&self) -> bool {
        matches!(self.tournament_update, Some(TournamentUpdate::Completed { .. }))
    }
}

fn invalid(match_id: MatchId, reason: InvalidResultReason) -> BracketError {
    BracketError::InvalidResult { match_id, reason }
}

/// Find a match that can still change.
fn open_match(all_matches: &[GameMatch], match_id: MatchId) -> Result<&GameMatch, BracketError> {
    let m = all_matches
        .iter()
        .find(|m| m.id == match_id)
        .ok_or_else(|| invalid(match_id, InvalidResultReason::MatchNotFound))?;
    if m.is_completed() {
        return Err(invalid(match_id, InvalidResultReason::AlreadyCompleted));
    }
    Ok(m)
}

/// Mark a match as being played. Advisory; starting an in-progress match is a no-op.
pub fn start_match(
    all_matches: &[GameMatch],
    match_id: MatchId,
) -> Result<MatchUpdate, BracketError> {
    let m = open_match(all_matches, match_id)?;
    Ok(MatchUpdate::started(m.id))
}

/// Record `winner_id` as the winner of `match_id`.
///
/// 1. Validate: the match exists, is not completed, and the winner plays in it.
/// 2. Merge the result into the match's round. If any match there is still open, stop.
/// 3. Otherwise collect winners by ascending match number. One winner finalizes the
///    tournament; more are paired consecutively into the next round.
///
/// On error nothing is produced, so the caller has nothing to persist.
pub fn record_result(
    all_matches: &[GameMatch],
    match_id: MatchId,
    winner_id: ParticipantId,
    winner_name: &str,
) -> Result<AdvanceResult, BracketError> {
    let target = open_match(all_matches, match_id)?;
    if !target.has_player(winner_id) {
        return Err(invalid(
            match_id,
            InvalidResultReason::WinnerNotInMatch(winner_id),
        ));
    }
    let round = target.round;
    check_round_integrity(all_matches, round)?;

    let match_update = MatchUpdate::completed(match_id, winner_id, winner_name);

    let mut layer: Vec<GameMatch> = all_matches
        .iter()
        .filter(|m| m.round == round)
        .cloned()
        .collect();
    for m in &mut layer {
        m.apply(&match_update);
    }
    if layer.iter().any(|m| !m.is_completed()) {
        return Ok(AdvanceResult {
            match_update,
            new_matches: Vec::new(),
            tournament_update: None,
        });
    }

    layer.sort_by_key(|m| m.match_number);
    let winners: Vec<Participant> = layer
        .iter()
        .map(|m| {
            m.winner().ok_or_else(|| BracketError::RoundIntegrityViolation {
                round,
                detail: format!("match {} has no winner", m.match_number),
            })
        })
        .collect::<Result<_, _>>()?;

    if let [champion] = winners.as_slice() {
        return Ok(AdvanceResult {
            match_update,
            new_matches: Vec::new(),
            tournament_update: Some(TournamentUpdate::Completed {
                winner_id: champion.id,
                winner_name: champion.display_name.clone(),
            }),
        });
    }

    Ok(AdvanceResult {
        match_update,
        new_matches: pair_round(target.tournament_id, round + 1, &winners),
        tournament_update: None,
    })
}
