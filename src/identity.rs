//! The acting user, as supplied by the identity provider (the web session here).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Member,
}

/// Who is making a request. Passed explicitly to whatever needs it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            role,
        }
    }

    /// Admins seed brackets, report results and manage tournaments.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Compare a presented admin token with the configured one. Both are hashed first so the
/// comparison always covers 32 bytes, and every byte is inspected whatever the inputs.
pub fn admin_token_matches(expected: &str, given: &str) -> bool {
    let expected = Sha256::digest(expected.as_bytes());
    let given = Sha256::digest(given.as_bytes());
    expected
        .iter()
        .zip(given.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_token_must_match_exactly() {
        assert!(admin_token_matches("s3cret-token", "s3cret-token"));
        assert!(!admin_token_matches("s3cret-token", "s3cret-tokeN"));
        assert!(!admin_token_matches("s3cret-token", "s3cret"));
        assert!(!admin_token_matches("s3cret-token", ""));
    }
}
