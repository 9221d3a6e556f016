//! Participant: one entrant of a tournament.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a participant (used in matches and lookups).
pub type ParticipantId = Uuid;

/// A registered entrant. Immutable once created.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: String,
}

impl Participant {
    /// Create a participant with a fresh id.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.into(),
        }
    }
}
