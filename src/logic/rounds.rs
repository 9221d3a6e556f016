//! Round-level views of a bracket: integrity checks, grouping and display names.

use crate::models::{BracketError, GameMatch};
use serde::Serialize;
use std::collections::BTreeMap;

/// One layer of the bracket, for rendering.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BracketRound {
    pub round: u32,
    pub name: String,
    /// Ordered by match number.
    pub matches: Vec<GameMatch>,
}

/// Rounds needed to crown a champion from `participant_count` entrants.
pub fn total_rounds(participant_count: usize) -> u32 {
    if participant_count < 2 {
        return 0;
    }
    participant_count.next_power_of_two().trailing_zeros()
}

/// Display label for `round` in a bracket of `total_rounds` rounds. Cosmetic only.
pub fn round_name(round: u32, total_rounds: u32) -> String {
    if round == 0 || round > total_rounds {
        return format!("Round {}", round);
    }
    match total_rounds - round + 1 {
        1 => "Final".to_string(),
        2 => "Semifinals".to_string(),
        3 => "Quarterfinals".to_string(),
        remaining => match 1u64.checked_shl(remaining) {
            Some(players) => format!("Round of {}", players),
            None => format!("Round {}", round),
        },
    }
}

/// Group matches by round, each ordered by match number.
pub fn group_rounds(all_matches: &[GameMatch]) -> Vec<BracketRound> {
    let mut by_round: BTreeMap<u32, Vec<GameMatch>> = BTreeMap::new();
    for m in all_matches {
        by_round.entry(m.round).or_default().push(m.clone());
    }
    let first_round = by_round.get(&1).map_or(0, Vec::len);
    let total = total_rounds(first_round * 2);

    by_round
        .into_iter()
        .map(|(round, mut matches)| {
            matches.sort_by_key(|m| m.match_number);
            BracketRound {
                round,
                name: round_name(round, total),
                matches,
            }
        })
        .collect()
}

/// Verify the stored matches of `round` form a valid layer before acting on it.
///
/// Checks: match numbers are exactly `1..=k`, `k` is a power of two and half the
/// previous layer (by round 1's size), all matches belong to one tournament, completed
/// matches have a winner who played, and no later round exists while this one is open.
/// Every earlier round must pass the same checks, be fully completed, and have fed its
/// winners into this round in match-number order.
pub fn check_round_integrity(all_matches: &[GameMatch], round: u32) -> Result<(), BracketError> {
    let violation = |detail: String| BracketError::RoundIntegrityViolation { round, detail };

    let layer: Vec<&GameMatch> = all_matches.iter().filter(|m| m.round == round).collect();
    if layer.is_empty() {
        return Err(violation("no matches".to_string()));
    }

    let mut numbers: Vec<u32> = layer.iter().map(|m| m.match_number).collect();
    numbers.sort_unstable();
    if numbers.iter().zip(1..).any(|(&n, expected)| n != expected) {
        return Err(violation(format!(
            "match numbers {:?} are not 1..{}",
            numbers,
            numbers.len()
        )));
    }

    let count = layer.len();
    if !count.is_power_of_two() {
        return Err(violation(format!("{} matches is not a power of two", count)));
    }

    let first_round = all_matches.iter().filter(|m| m.round == 1).count();
    let expected = round
        .checked_sub(1)
        .and_then(|shift| first_round.checked_shr(shift))
        .unwrap_or(0);
    if expected != count {
        return Err(violation(format!(
            "expected {} matches from a first round of {}, found {}",
            expected, first_round, count
        )));
    }

    let tournament_id = layer[0].tournament_id;
    if layer.iter().any(|m| m.tournament_id != tournament_id) {
        return Err(violation("matches from more than one tournament".to_string()));
    }

    for m in &layer {
        if m.is_completed() && !m.winner_id.map_or(false, |w| m.has_player(w)) {
            return Err(violation(format!(
                "match {} is completed without a valid winner",
                m.match_number
            )));
        }
    }

    let open = layer.iter().any(|m| !m.is_completed());
    if open && all_matches.iter().any(|m| m.round > round) {
        return Err(violation(format!(
            "round {} exists while round {} is unfinished",
            round + 1,
            round
        )));
    }

    if round > 1 {
        check_fed_by_previous(all_matches, round, &layer)?;
    }

    Ok(())
}

/// Round `round - 1` is intact, finished, and its winners are exactly the players of
/// `layer`: winners of matches `2k-1` and `2k` meet in match `k`.
fn check_fed_by_previous(
    all_matches: &[GameMatch],
    round: u32,
    layer: &[&GameMatch],
) -> Result<(), BracketError> {
    let previous = round - 1;
    check_round_integrity(all_matches, previous)?;

    let mut feeders: Vec<&GameMatch> = all_matches
        .iter()
        .filter(|m| m.round == previous)
        .collect();
    feeders.sort_by_key(|m| m.match_number);
    if let Some(open) = feeders.iter().find(|m| !m.is_completed()) {
        return Err(BracketError::RoundIntegrityViolation {
            round,
            detail: format!("round {} match {} is unfinished", previous, open.match_number),
        });
    }

    let mut layer = layer.to_vec();
    layer.sort_by_key(|m| m.match_number);
    for (m, pair) in layer.iter().zip(feeders.chunks_exact(2)) {
        let fed = m.tournament_id == pair[0].tournament_id
            && Some(m.player1_id) == pair[0].winner_id
            && m.player2_id == pair[1].winner_id;
        if !fed {
            return Err(BracketError::RoundIntegrityViolation {
                round,
                detail: format!(
                    "match {} does not pair the winners of round {} matches {} and {}",
                    m.match_number, previous, pair[0].match_number, pair[1].match_number
                ),
            });
        }
    }
    Ok(())
}
