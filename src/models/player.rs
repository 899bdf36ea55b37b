//! Registered player model.

use serde::{Deserialize, Serialize};

use super::{PlayerId, ValidationError};

/// A registered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Row id
    pub id: PlayerId,

    /// Display name, unique across the roster
    pub name: String,

    /// Display emoji, assigned once at registration
    pub emoji: String,
}

impl Player {
    /// Create a player value.
    pub fn new(id: PlayerId, name: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            emoji: emoji.into(),
        }
    }

    /// Name with the emoji prefixed, as shown on the leaderboard.
    pub fn label(&self) -> String {
        if self.emoji.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.emoji, self.name)
        }
    }
}

/// Trim a submitted player name, rejecting blank input.
///
/// All-digit names are rejected so a name can never be mistaken for an id.
pub fn normalize_player_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::NumericName(name.to_string()));
    }
    Ok(name.to_string())
}
