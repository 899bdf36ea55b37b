//! Game model: one recorded result with its participants.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{GameId, PlayerId, ValidationError};

/// How a participant finished in a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Winner,
    Second,
    /// Took part but did not place
    Unplaced,
}

/// A recorded game. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    /// Row id (insertion order)
    pub id: GameId,

    /// Day the game was played
    pub played_at: NaiveDate,

    /// Winning player
    pub winner: PlayerId,

    /// 2nd place player (never the winner)
    pub second: PlayerId,

    /// Everyone who played, deduplicated, in submitted order
    pub participants: Vec<PlayerId>,

    /// Who recorded the game
    pub created_by: Option<String>,
}

impl Game {
    /// Check if a player took part in this game.
    pub fn includes(&self, player: PlayerId) -> bool {
        self.participants.contains(&player)
    }

    /// Placement of a player, or None if they are not a participant.
    ///
    /// A winner or 2nd place missing from the participant list (legacy rows)
    /// counts as not having played.
    pub fn placement_of(&self, player: PlayerId) -> Option<Placement> {
        if !self.includes(player) {
            None
        } else if player == self.winner {
            Some(Placement::Winner)
        } else if player == self.second {
            Some(Placement::Second)
        } else {
            Some(Placement::Unplaced)
        }
    }

    /// Position of this game in the log: by day, then by insertion.
    pub fn log_position(&self) -> (NaiveDate, GameId) {
        (self.played_at, self.id)
    }

    /// Participants with the winner first, then 2nd place, then the rest.
    pub fn ordered_participants(&self) -> Vec<PlayerId> {
        let mut ordered = vec![self.winner, self.second];
        ordered.extend(
            self.participants
                .iter()
                .copied()
                .filter(|p| *p != self.winner && *p != self.second),
        );
        ordered
    }
}

/// A game submitted for recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGame {
    pub played_at: NaiveDate,
    pub participants: Vec<PlayerId>,
    pub winner: PlayerId,
    pub second: PlayerId,
    pub created_by: Option<String>,
}

impl NewGame {
    /// Create a new submission. Participants are deduplicated.
    pub fn new(
        played_at: NaiveDate,
        participants: Vec<PlayerId>,
        winner: PlayerId,
        second: PlayerId,
    ) -> Self {
        Self {
            played_at,
            participants: dedupe(&participants),
            winner,
            second,
            created_by: None,
        }
    }

    /// Builder method to set the attribution. Blank names are dropped.
    pub fn with_created_by(mut self, created_by: impl AsRef<str>) -> Self {
        let trimmed = created_by.as_ref().trim();
        self.created_by = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Check the placement rules. Does not check that players exist.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.participants.is_empty() {
            return Err(ValidationError::NoParticipants);
        }
        if self.winner == self.second {
            return Err(ValidationError::SamePlacement);
        }
        if !self.participants.contains(&self.winner) {
            return Err(ValidationError::WinnerNotParticipant(self.winner));
        }
        if !self.participants.contains(&self.second) {
            return Err(ValidationError::SecondNotParticipant(self.second));
        }
        Ok(())
    }
}

/// Remove duplicate ids, keeping the first occurrence.
pub fn dedupe(ids: &[PlayerId]) -> Vec<PlayerId> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
