//! Tournament and TournamentStatus.

use crate::models::error::TournamentError;
use crate::models::participant::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Lifecycle of a tournament.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Announced; registration not yet open.
    #[default]
    Upcoming,
    RegistrationOpen,
    /// Round 1 exists; results are being reported.
    InProgress,
    /// The final match has been decided.
    Completed,
    /// Stopped by an admin before completion.
    Cancelled,
}

/// Tournament fields changed by the bracket engine.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TournamentUpdate {
    /// Round 1 was created: `bracket_generated = true`, status `InProgress`.
    BracketGenerated,
    /// The final resolved.
    Completed {
        winner_id: ParticipantId,
        winner_name: String,
    },
}

/// A tournament record (engine-relevant fields plus display metadata).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub status: TournamentStatus,
    /// Flips to true exactly once per bracket, when round 1 is created.
    pub bracket_generated: bool,
    pub winner_id: Option<ParticipantId>,
    pub winner_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Tournament {
    /// Create a new tournament in Upcoming state.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            status: TournamentStatus::Upcoming,
            bracket_generated: false,
            winner_id: None,
            winner_name: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Participants may still join or leave.
    pub fn accepts_registrations(&self) -> bool {
        !self.bracket_generated
            && matches!(
                self.status,
                TournamentStatus::Upcoming | TournamentStatus::RegistrationOpen
            )
    }

    /// Upcoming -> RegistrationOpen.
    pub fn open_registration(&mut self) -> Result<(), TournamentError> {
        if self.status != TournamentStatus::Upcoming {
            return Err(TournamentError::InvalidState);
        }
        self.status = TournamentStatus::RegistrationOpen;
        Ok(())
    }

    /// Any state before Completed -> Cancelled.
    pub fn cancel(&mut self) -> Result<(), TournamentError> {
        if matches!(
            self.status,
            TournamentStatus::Completed | TournamentStatus::Cancelled
        ) {
            return Err(TournamentError::InvalidState);
        }
        self.status = TournamentStatus::Cancelled;
        Ok(())
    }

    /// Back to RegistrationOpen with no bracket, for a manual clear-and-regenerate.
    /// Only a tournament with open registration or a bracket in play can be reset.
    pub fn reset_bracket(&mut self) -> Result<(), TournamentError> {
        let resettable = match self.status {
            TournamentStatus::RegistrationOpen | TournamentStatus::InProgress => true,
            TournamentStatus::Upcoming => self.bracket_generated,
            TournamentStatus::Completed | TournamentStatus::Cancelled => false,
        };
        if !resettable {
            return Err(TournamentError::InvalidState);
        }
        self.status = TournamentStatus::RegistrationOpen;
        self.bracket_generated = false;
        self.winner_id = None;
        self.winner_name = None;
        Ok(())
    }

    /// Apply an engine directive.
    pub fn apply(&mut self, update: &TournamentUpdate) {
        match update {
            TournamentUpdate::BracketGenerated => {
                self.bracket_generated = true;
                self.status = TournamentStatus::InProgress;
            }
            TournamentUpdate::Completed {
                winner_id,
                winner_name,
            } => {
                self.status = TournamentStatus::Completed;
                self.winner_id = Some(*winner_id);
                self.winner_name = Some(winner_name.clone());
                self.completed_at = Some(Utc::now());
            }
        }
    }
}
