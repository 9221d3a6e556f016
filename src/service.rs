//! Tournament service: the only caller of the bracket engine.
//!
//! Reads records from the store, asks the engine what to change, and persists the answer.
//! Every mutation of a tournament runs under that tournament's lease, so two results
//! reported for the same round at once are applied one after the other and the next
//! round is created exactly once. The store lock is only held to take a snapshot and to
//! commit; the engine runs with no store lock held, so other tournaments are not blocked.
//!
//! Leases exist only for tournaments in the store and are dropped once a tournament is
//! completed or cancelled. Those states are final, so a task still queued on a dropped
//! lease can only see the final state and is rejected.

use crate::import::read_participant_names;
use crate::logic::{self, AdvanceResult, BracketRound};
use crate::models::{
    BracketError, GameMatch, MatchId, Participant, ParticipantId, Tournament, TournamentError,
    TournamentId, TournamentStatus,
};
use crate::store::RecordStore;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Everything needed to render a bracket.
#[derive(Clone, Debug, Serialize)]
pub struct BracketView {
    pub tournament: Tournament,
    pub participants: Vec<Participant>,
    pub rounds: Vec<BracketRound>,
}

#[derive(Debug, Default)]
pub struct TournamentService {
    store: RwLock<RecordStore>,
    leases: Mutex<HashMap<TournamentId, Arc<AsyncMutex<()>>>>,
}

impl TournamentService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive use of one tournament's records.
    async fn lease(&self, id: TournamentId) -> Result<OwnedMutexGuard<()>, TournamentError> {
        self.read(|s| s.tournament(id).map(|_| ()))?;
        let lock = {
            let mut leases = self.leases.lock().unwrap_or_else(PoisonError::into_inner);
            leases.entry(id).or_default().clone()
        };
        Ok(lock.lock_owned().await)
    }

    fn release_lease(&self, id: TournamentId) {
        let mut leases = self.leases.lock().unwrap_or_else(PoisonError::into_inner);
        leases.remove(&id);
    }

    #[cfg(test)]
    fn lease_count(&self) -> usize {
        self.leases.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn read<T>(&self, f: impl FnOnce(&RecordStore) -> T) -> T {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        f(&store)
    }

    fn write<T>(&self, f: impl FnOnce(&mut RecordStore) -> T) -> T {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut store)
    }

    /// Matches of a tournament that is currently being played.
    fn matches_in_progress(&self, id: TournamentId) -> Result<Vec<GameMatch>, TournamentError> {
        self.read(|s| {
            if s.tournament(id)?.status != TournamentStatus::InProgress {
                return Err(TournamentError::InvalidState);
            }
            Ok(s.matches(id).to_vec())
        })
    }

    pub fn tournament(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        self.read(|s| s.tournament(id).cloned())
    }

    pub fn list_tournaments(&self, status: Option<TournamentStatus>) -> Vec<Tournament> {
        self.read(|s| s.list_tournaments(status))
    }

    pub fn participants(&self, id: TournamentId) -> Result<Vec<Participant>, TournamentError> {
        self.read(|s| {
            s.tournament(id)?;
            Ok(s.participants(id).to_vec())
        })
    }

    pub fn matches(&self, id: TournamentId) -> Result<Vec<GameMatch>, TournamentError> {
        self.read(|s| {
            s.tournament(id)?;
            Ok(s.matches(id).to_vec())
        })
    }

    pub fn bracket(&self, id: TournamentId) -> Result<BracketView, TournamentError> {
        self.read(|s| {
            let tournament = s.tournament(id)?.clone();
            Ok(BracketView {
                tournament,
                participants: s.participants(id).to_vec(),
                rounds: logic::group_rounds(s.matches(id)),
            })
        })
    }

    /// New tournament in Upcoming state.
    pub fn create_tournament(&self, name: &str) -> Result<Tournament, TournamentError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::EmptyName);
        }
        let tournament = Tournament::new(name);
        self.write(|s| s.insert_tournament(tournament.clone()));
        log::info!("Created tournament '{}' ({})", tournament.name, tournament.id);
        Ok(tournament)
    }

    pub async fn open_registration(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        let _lease = self.lease(id).await?;
        self.write(|s| {
            let t = s.tournament_mut(id)?;
            t.open_registration()?;
            Ok(t.clone())
        })
    }

    pub async fn register_participant(
        &self,
        id: TournamentId,
        display_name: &str,
    ) -> Result<Participant, TournamentError> {
        let mut added = self.import_participants(id, vec![display_name.to_string()]).await?;
        added.pop().ok_or(TournamentError::EmptyName)
    }

    /// Register several participants at once. All names are validated before any is added.
    pub async fn import_participants(
        &self,
        id: TournamentId,
        names: Vec<String>,
    ) -> Result<Vec<Participant>, TournamentError> {
        let _lease = self.lease(id).await?;
        let mut taken: HashSet<String> = self.read(|s| {
            if !s.tournament(id)?.accepts_registrations() {
                return Err(TournamentError::InvalidState);
            }
            Ok(s.participants(id)
                .iter()
                .map(|p| p.display_name.to_lowercase())
                .collect())
        })?;
        let mut added = Vec::with_capacity(names.len());
        for name in &names {
            let name = name.trim();
            if name.is_empty() {
                return Err(TournamentError::EmptyName);
            }
            if !taken.insert(name.to_lowercase()) {
                return Err(TournamentError::DuplicateParticipantName(name.to_string()));
            }
            added.push(Participant::new(name));
        }
        self.write(|s| s.add_participants(id, added.iter().cloned()));
        log::debug!("Registered {} participant(s) for {}", added.len(), id);
        Ok(added)
    }

    /// Bulk registration from CSV with a `display_name` (or `name`) column.
    pub async fn import_participants_csv<R: Read>(
        &self,
        id: TournamentId,
        reader: R,
    ) -> Result<Vec<Participant>, TournamentError> {
        let names = read_participant_names(reader)?;
        self.import_participants(id, names).await
    }

    pub async fn remove_participant(
        &self,
        id: TournamentId,
        participant_id: ParticipantId,
    ) -> Result<Participant, TournamentError> {
        let _lease = self.lease(id).await?;
        self.write(|s| {
            if !s.tournament(id)?.accepts_registrations() {
                return Err(TournamentError::InvalidState);
            }
            s.remove_participant(id, participant_id)
        })
    }

    /// Seed round 1 from the registered participants.
    pub async fn generate_bracket(
        &self,
        id: TournamentId,
    ) -> Result<Vec<GameMatch>, TournamentError> {
        let _lease = self.lease(id).await?;
        let participants = self.read(|s| {
            let tournament = s.tournament(id)?;
            if tournament.bracket_generated {
                return Err(TournamentError::BracketAlreadyGenerated);
            }
            if tournament.status != TournamentStatus::RegistrationOpen {
                return Err(TournamentError::InvalidState);
            }
            Ok(s.participants(id).to_vec())
        })?;

        let seeded = logic::seed(id, &participants)?;
        self.write(|s| {
            s.create_round(id, seeded.matches.clone())?;
            s.apply_tournament_update(id, &seeded.tournament_update)
        })?;
        log::info!(
            "Generated bracket for {}: {} matches in round 1",
            id,
            seeded.matches.len()
        );
        Ok(seeded.matches)
    }

    /// Mark a match as being played.
    pub async fn start_match(
        &self,
        id: TournamentId,
        match_id: MatchId,
    ) -> Result<GameMatch, TournamentError> {
        let _lease = self.lease(id).await?;
        let matches = self.matches_in_progress(id)?;
        let update = logic::start_match(&matches, match_id)?;
        self.write(|s| s.update_match(id, &update))
    }

    /// Record the winner of a match and advance the bracket if its round is done.
    /// The winner's display name comes from the stored match.
    pub async fn report_result(
        &self,
        id: TournamentId,
        match_id: MatchId,
        winner_id: ParticipantId,
    ) -> Result<AdvanceResult, TournamentError> {
        let _lease = self.lease(id).await?;
        let matches = self.matches_in_progress(id)?;
        let winner_name = matches
            .iter()
            .find(|m| m.id == match_id)
            .and_then(|m| m.player_name(winner_id))
            .unwrap_or_default()
            .to_string();

        let result = logic::record_result(&matches, match_id, winner_id, &winner_name)
            .map_err(|e| {
                if let BracketError::RoundIntegrityViolation { .. } = e {
                    log::warn!("Bracket of {} needs attention: {}", id, e);
                }
                e
            })?;
        if let Err(e) = self.write(|s| s.commit_advance(id, &result)) {
            log::warn!("Could not persist result of match {} in {}: {}", match_id, id, e);
            return Err(e);
        }

        log::debug!("Match {} in {} won by {}", match_id, id, winner_name);
        if let Some(next) = result.new_matches.first() {
            log::info!(
                "Round {} of {} complete; created {} match(es) for round {}",
                next.round - 1,
                id,
                result.new_matches.len(),
                next.round
            );
        }
        if result.finalized() {
            log::info!("Tournament {} won by {}", id, winner_name);
            self.release_lease(id);
        }
        Ok(result)
    }

    /// Admin escape hatch for a stuck bracket: drop all matches and reopen registration.
    pub async fn clear_bracket(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        let _lease = self.lease(id).await?;
        self.write(|s| {
            let t = s.tournament_mut(id)?;
            t.reset_bracket()?;
            let t = t.clone();
            let removed = s.clear_matches(id);
            log::info!("Cleared bracket of {} ({} matches removed)", id, removed);
            Ok(t)
        })
    }

    pub async fn cancel(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        let _lease = self.lease(id).await?;
        let cancelled = self.write(|s| {
            let t = s.tournament_mut(id)?;
            t.cancel()?;
            Ok::<Tournament, TournamentError>(t.clone())
        })?;
        log::info!("Cancelled tournament {}", id);
        self.release_lease(id);
        Ok(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_tournaments_get_no_lease() {
        let service = TournamentService::new();
        for _ in 0..50 {
            let id = uuid::Uuid::new_v4();
            assert_eq!(
                service.register_participant(id, "Ghost").await.unwrap_err(),
                TournamentError::NotFound
            );
            assert_eq!(service.cancel(id).await.unwrap_err(), TournamentError::NotFound);
        }
        assert_eq!(service.lease_count(), 0);
    }

    #[tokio::test]
    async fn lease_is_dropped_when_tournament_is_cancelled() {
        let service = TournamentService::new();
        let t = service.create_tournament("Cup").unwrap();
        service.open_registration(t.id).await.unwrap();
        assert_eq!(service.lease_count(), 1);

        service.cancel(t.id).await.unwrap();
        assert_eq!(service.lease_count(), 0);
        assert_eq!(service.cancel(t.id).await.unwrap_err(), TournamentError::InvalidState);
    }

    #[tokio::test]
    async fn lease_is_dropped_when_tournament_is_completed() {
        let service = TournamentService::new();
        let t = service.create_tournament("Cup").unwrap();
        service.open_registration(t.id).await.unwrap();
        service.register_participant(t.id, "A").await.unwrap();
        service.register_participant(t.id, "B").await.unwrap();
        let round = service.generate_bracket(t.id).await.unwrap();
        assert_eq!(service.lease_count(), 1);

        let result = service
            .report_result(t.id, round[0].id, round[0].player1_id)
            .await
            .unwrap();
        assert!(result.finalized());
        assert_eq!(service.lease_count(), 0);
    }
}
