//! In-memory record store: tournaments, participants and matches keyed by tournament.
//!
//! Plain data, no locking; `TournamentService` owns the locks.

use crate::logic::AdvanceResult;
use crate::models::{
    GameMatch, MatchUpdate, Participant, ParticipantId, Tournament, TournamentError,
    TournamentId, TournamentStatus, TournamentUpdate,
};
use chrono::Utc;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct RecordStore {
    tournaments: HashMap<TournamentId, Tournament>,
    participants: HashMap<TournamentId, Vec<Participant>>,
    matches: HashMap<TournamentId, Vec<GameMatch>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_tournament(&mut self, tournament: Tournament) {
        self.tournaments.insert(tournament.id, tournament);
    }

    pub fn tournament(&self, id: TournamentId) -> Result<&Tournament, TournamentError> {
        self.tournaments.get(&id).ok_or(TournamentError::NotFound)
    }

    pub fn tournament_mut(&mut self, id: TournamentId) -> Result<&mut Tournament, TournamentError> {
        self.tournaments.get_mut(&id).ok_or(TournamentError::NotFound)
    }

    /// All tournaments, oldest first, optionally filtered by status.
    pub fn list_tournaments(&self, status: Option<TournamentStatus>) -> Vec<Tournament> {
        let mut list: Vec<Tournament> = self
            .tournaments
            .values()
            .filter(|t| status.map_or(true, |s| t.status == s))
            .cloned()
            .collect();
        list.sort_by_key(|t| t.created_at);
        list
    }

    /// Registration order.
    pub fn participants(&self, id: TournamentId) -> &[Participant] {
        self.participants.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn add_participants(
        &mut self,
        id: TournamentId,
        new: impl IntoIterator<Item = Participant>,
    ) {
        self.participants.entry(id).or_default().extend(new);
    }

    pub fn remove_participant(
        &mut self,
        id: TournamentId,
        participant_id: ParticipantId,
    ) -> Result<Participant, TournamentError> {
        let list = self
            .participants
            .get_mut(&id)
            .ok_or(TournamentError::ParticipantNotFound(participant_id))?;
        let idx = list
            .iter()
            .position(|p| p.id == participant_id)
            .ok_or(TournamentError::ParticipantNotFound(participant_id))?;
        Ok(list.remove(idx))
    }

    pub fn matches(&self, id: TournamentId) -> &[GameMatch] {
        self.matches.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Apply an update to one match. Completed matches are never touched again.
    pub fn update_match(
        &mut self,
        id: TournamentId,
        update: &MatchUpdate,
    ) -> Result<GameMatch, TournamentError> {
        let m = self
            .matches
            .get_mut(&id)
            .and_then(|list| list.iter_mut().find(|m| m.id == update.match_id))
            .ok_or(TournamentError::MatchNotFound(update.match_id))?;
        if m.is_completed() {
            return Err(TournamentError::InvalidState);
        }
        m.apply(update);
        if m.is_completed() {
            m.completed_at = Some(Utc::now());
        }
        Ok(m.clone())
    }

    /// Round of a batch, if it is non-empty and uniform for tournament `id`.
    fn batch_round(id: TournamentId, batch: &[GameMatch]) -> Result<Option<u32>, TournamentError> {
        let Some(first) = batch.first() else {
            return Ok(None);
        };
        if batch
            .iter()
            .any(|m| m.tournament_id != id || m.round != first.round)
        {
            return Err(TournamentError::InvalidState);
        }
        Ok(Some(first.round))
    }

    fn ensure_round_free(&self, id: TournamentId, round: u32) -> Result<(), TournamentError> {
        if self.matches(id).iter().any(|m| m.round == round) {
            return Err(TournamentError::RoundAlreadyExists { round });
        }
        Ok(())
    }

    /// Insert all matches of one round at once. Rejected without writing anything if
    /// the round already has matches, so repeating a creation is harmless.
    pub fn create_round(
        &mut self,
        id: TournamentId,
        batch: Vec<GameMatch>,
    ) -> Result<(), TournamentError> {
        let Some(round) = Self::batch_round(id, &batch)? else {
            return Ok(());
        };
        self.ensure_round_free(id, round)?;
        self.matches.entry(id).or_default().extend(batch);
        Ok(())
    }

    pub fn apply_tournament_update(
        &mut self,
        id: TournamentId,
        update: &TournamentUpdate,
    ) -> Result<Tournament, TournamentError> {
        let t = self.tournament_mut(id)?;
        t.apply(update);
        Ok(t.clone())
    }

    /// Persist an engine result in order: match update, next round, tournament update.
    /// Everything is validated before the first write.
    pub fn commit_advance(
        &mut self,
        id: TournamentId,
        result: &AdvanceResult,
    ) -> Result<(), TournamentError> {
        self.tournament(id)?;
        let target = self
            .matches(id)
            .iter()
            .find(|m| m.id == result.match_update.match_id)
            .ok_or(TournamentError::MatchNotFound(result.match_update.match_id))?;
        if target.is_completed() {
            return Err(TournamentError::InvalidState);
        }
        if let Some(round) = Self::batch_round(id, &result.new_matches)? {
            self.ensure_round_free(id, round)?;
        }

        self.update_match(id, &result.match_update)?;
        self.create_round(id, result.new_matches.clone())?;
        if let Some(update) = &result.tournament_update {
            self.apply_tournament_update(id, update)?;
        }
        Ok(())
    }

    /// Remove every match of a tournament. Returns how many were removed.
    pub fn clear_matches(&mut self, id: TournamentId) -> usize {
        self.matches.remove(&id).map_or(0, |list| list.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchStatus, Participant};

    fn store_with_round() -> (RecordStore, TournamentId, Vec<GameMatch>) {
        let mut store = RecordStore::new();
        let t = Tournament::new("Cup");
        let id = t.id;
        store.insert_tournament(t);
        let a = Participant::new("A");
        let b = Participant::new("B");
        let round = vec![GameMatch::new(id, 1, 1, &a, &b)];
        store.create_round(id, round.clone()).unwrap();
        (store, id, round)
    }

    #[test]
    fn create_round_is_rejected_when_round_exists() {
        let (mut store, id, round) = store_with_round();
        let again: Vec<GameMatch> = round
            .iter()
            .map(|m| GameMatch { id: uuid::Uuid::new_v4(), ..m.clone() })
            .collect();
        assert_eq!(
            store.create_round(id, again),
            Err(TournamentError::RoundAlreadyExists { round: 1 })
        );
        assert_eq!(store.matches(id).len(), 1);
    }

    #[test]
    fn completed_match_gets_timestamp_and_is_frozen() {
        let (mut store, id, round) = store_with_round();
        let m = &round[0];
        let update = MatchUpdate::completed(m.id, m.player1_id, m.player1_name.clone());
        let stored = store.update_match(id, &update).unwrap();
        assert_eq!(stored.status, MatchStatus::Completed);
        assert!(stored.completed_at.is_some());
        assert_eq!(
            store.update_match(id, &MatchUpdate::started(m.id)),
            Err(TournamentError::InvalidState)
        );
    }
}
