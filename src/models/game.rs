//! Bracket match records and the updates applied to them.

use crate::models::participant::{Participant, ParticipantId};
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Progress of a single match. Only ever moves forward.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    /// Advisory, for display. A result may be reported straight from `Pending`.
    InProgress,
    Completed,
}

impl MatchStatus {
    fn rank(self) -> u8 {
        match self {
            MatchStatus::Pending => 0,
            MatchStatus::InProgress => 1,
            MatchStatus::Completed => 2,
        }
    }
}

/// One pairing in the bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    /// 1-based, contiguous across the bracket.
    pub round: u32,
    /// 1-based, unique within the round.
    pub match_number: u32,
    pub player1_id: ParticipantId,
    pub player1_name: String,
    pub player2_id: Option<ParticipantId>,
    pub player2_name: Option<String>,
    pub status: MatchStatus,
    pub winner_id: Option<ParticipantId>,
    pub winner_name: Option<String>,
    /// Set by the store when the result is persisted.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl GameMatch {
    /// A pending match between two participants.
    pub fn new(
        tournament_id: TournamentId,
        round: u32,
        match_number: u32,
        player1: &Participant,
        player2: &Participant,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            round,
            match_number,
            player1_id: player1.id,
            player1_name: player1.display_name.clone(),
            player2_id: Some(player2.id),
            player2_name: Some(player2.display_name.clone()),
            status: MatchStatus::Pending,
            winner_id: None,
            winner_name: None,
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Whether `id` plays in this match.
    pub fn has_player(&self, id: ParticipantId) -> bool {
        self.player1_id == id || self.player2_id == Some(id)
    }

    /// Display name of one of this match's players.
    pub fn player_name(&self, id: ParticipantId) -> Option<&str> {
        if self.player1_id == id {
            Some(&self.player1_name)
        } else if self.player2_id == Some(id) {
            self.player2_name.as_deref()
        } else {
            None
        }
    }

    /// The winner as a participant, once the match is decided.
    pub fn winner(&self) -> Option<Participant> {
        match (self.winner_id, &self.winner_name) {
            (Some(id), Some(name)) => Some(Participant {
                id,
                display_name: name.clone(),
            }),
            _ => None,
        }
    }

    /// Merge an update into this record. Status never moves backwards.
    pub fn apply(&mut self, update: &MatchUpdate) {
        if update.match_id != self.id || update.status.rank() < self.status.rank() {
            return;
        }
        self.status = update.status;
        if update.winner_id.is_some() {
            self.winner_id = update.winner_id;
            self.winner_name = update.winner_name.clone();
        }
    }
}

/// Fields of a match the caller must persist.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchUpdate {
    pub match_id: MatchId,
    pub status: MatchStatus,
    pub winner_id: Option<ParticipantId>,
    pub winner_name: Option<String>,
}

impl MatchUpdate {
    pub fn started(match_id: MatchId) -> Self {
        Self {
            match_id,
            status: MatchStatus::InProgress,
            winner_id: None,
            winner_name: None,
        }
    }

    pub fn completed(
        match_id: MatchId,
        winner_id: ParticipantId,
        winner_name: impl Into<String>,
    ) -> Self {
        Self {
            match_id,
            status: MatchStatus::Completed,
            winner_id: Some(winner_id),
            winner_name: Some(winner_name.into()),
        }
    }
}
