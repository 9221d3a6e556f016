//! HTTP mapping for tournament errors.

use crate::models::{BracketError, TournamentError};
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl ResponseError for TournamentError {
    fn status_code(&self) -> StatusCode {
        match self {
            TournamentError::NotFound
            | TournamentError::ParticipantNotFound(_)
            | TournamentError::MatchNotFound(_) => StatusCode::NOT_FOUND,
            // The request clashes with records that already exist.
            TournamentError::BracketAlreadyGenerated
            | TournamentError::RoundAlreadyExists { .. }
            | TournamentError::Bracket(BracketError::RoundIntegrityViolation { .. }) => {
                StatusCode::CONFLICT
            }
            TournamentError::InvalidState
            | TournamentError::DuplicateParticipantName(_)
            | TournamentError::EmptyName
            | TournamentError::Import(_)
            | TournamentError::Bracket(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InvalidResultReason;
    use uuid::Uuid;

    #[test]
    fn clashes_with_existing_records_are_conflicts() {
        for e in [
            TournamentError::BracketAlreadyGenerated,
            TournamentError::RoundAlreadyExists { round: 2 },
            TournamentError::Bracket(BracketError::RoundIntegrityViolation {
                round: 2,
                detail: "gap".to_string(),
            }),
        ] {
            assert_eq!(e.status_code(), StatusCode::CONFLICT, "{}", e);
        }
    }

    #[test]
    fn missing_records_and_bad_input() {
        assert_eq!(TournamentError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            TournamentError::MatchNotFound(Uuid::new_v4()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(TournamentError::InvalidState.status_code(), StatusCode::BAD_REQUEST);
        let bad_result = TournamentError::Bracket(BracketError::InvalidResult {
            match_id: Uuid::new_v4(),
            reason: InvalidResultReason::AlreadyCompleted,
        });
        assert_eq!(bad_result.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn error_body_carries_status() {
        let resp = TournamentError::BracketAlreadyGenerated.error_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }
}
