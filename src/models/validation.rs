//! Input validation errors.

use thiserror::Error;

use super::PlayerId;

/// Rejected input. The caller must fix the request; nothing was written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("player name must not be empty")]
    EmptyName,

    #[error("player name {0:?} must not be only digits")]
    NumericName(String),

    #[error("a player named {0:?} already exists")]
    DuplicateName(String),

    #[error("a game needs at least one participant")]
    NoParticipants,

    #[error("winner and 2nd place must be different players")]
    SamePlacement,

    #[error("winner {0} is not part of the game")]
    WinnerNotParticipant(PlayerId),

    #[error("2nd place {0} is not part of the game")]
    SecondNotParticipant(PlayerId),

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("head-to-head needs two different players, got {0} twice")]
    SamePlayer(PlayerId),

    #[error("invalid date {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),
}
