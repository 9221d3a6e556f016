//! Errors from the bracket engine and from tournament operations built on it.

use crate::models::game::MatchId;
use crate::models::participant::ParticipantId;
use std::fmt;

/// Why a reported result was rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InvalidResultReason {
    MatchNotFound,
    AlreadyCompleted,
    WinnerNotInMatch(ParticipantId),
}

/// Errors returned by the bracket engine. All are plain values; nothing here is fatal.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketError {
    /// Seeding needs a power of two, at least 2. Carries the count that was supplied.
    InvalidParticipantCount { count: usize },
    /// A result (or start) could not be applied to the match. Caller bug, not retryable.
    InvalidResult {
        match_id: MatchId,
        reason: InvalidResultReason,
    },
    /// Stored matches of a round do not form a valid bracket layer. Refetch and recompute.
    RoundIntegrityViolation { round: u32, detail: String },
}

impl fmt::Display for BracketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketError::InvalidParticipantCount { count } => write!(
                f,
                "A bracket needs a power of two participants (2, 4, 8, ...); got {}",
                count
            ),
            BracketError::InvalidResult { match_id, reason } => match reason {
                InvalidResultReason::MatchNotFound => write!(f, "Match {} not found", match_id),
                InvalidResultReason::AlreadyCompleted => {
                    write!(f, "Match {} is already completed", match_id)
                }
                InvalidResultReason::WinnerNotInMatch(winner) => {
                    write!(f, "Participant {} does not play in match {}", winner, match_id)
                }
            },
            BracketError::RoundIntegrityViolation { round, detail } => {
                write!(f, "Round {} is inconsistent: {}", round, detail)
            }
        }
    }
}

impl std::error::Error for BracketError {}

/// Errors from tournament operations (store + service).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// No tournament with this id.
    NotFound,
    /// Tournament is not in a state that allows this action.
    InvalidState,
    /// Round 1 already exists; clear the bracket first.
    BracketAlreadyGenerated,
    /// A participant with this name already exists (names are unique, case-insensitive).
    DuplicateParticipantName(String),
    /// Participant names must not be blank.
    EmptyName,
    ParticipantNotFound(ParticipantId),
    MatchNotFound(MatchId),
    /// Matches for this round were already created.
    RoundAlreadyExists { round: u32 },
    /// Bulk import could not be read.
    Import(String),
    Bracket(BracketError),
}

impl fmt::Display for TournamentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TournamentError::NotFound => write!(f, "No tournament"),
            TournamentError::InvalidState => write!(f, "Invalid state for this action"),
            TournamentError::BracketAlreadyGenerated => {
                write!(f, "The bracket has already been generated")
            }
            TournamentError::DuplicateParticipantName(name) => {
                write!(f, "A participant named '{}' already exists", name)
            }
            TournamentError::EmptyName => write!(f, "Participant name must not be empty"),
            TournamentError::ParticipantNotFound(_) => write!(f, "Participant not found"),
            TournamentError::MatchNotFound(_) => write!(f, "Match not found"),
            TournamentError::RoundAlreadyExists { round } => {
                write!(f, "Matches for round {} already exist", round)
            }
            TournamentError::Import(msg) => write!(f, "Could not import participants: {}", msg),
            TournamentError::Bracket(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for TournamentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TournamentError::Bracket(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BracketError> for TournamentError {
    fn from(e: BracketError) -> Self {
        TournamentError::Bracket(e)
    }
}
