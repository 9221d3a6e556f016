//! Data structures for the bracket: participants, matches, tournament state, errors.

mod error;
mod game;
mod participant;
mod tournament;

pub use error::{BracketError, InvalidResultReason, TournamentError};
pub use game::{GameMatch, MatchId, MatchStatus, MatchUpdate};
pub use participant::{Participant, ParticipantId};
pub use tournament::{Tournament, TournamentId, TournamentStatus, TournamentUpdate};
