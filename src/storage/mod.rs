//! Persistent storage.
//!
//! The game log and player roster live in a single SQLite database:
//! - `players`: roster with display emoji
//! - `games`: one row per recorded game
//! - `game_players`: participants of each game

mod sqlite;

pub use sqlite::Store;

use std::path::PathBuf;
use thiserror::Error;

use crate::calculate::EmojiError;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Emoji assignment failed: {0}")]
    Emoji(#[from] EmojiError),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub database_path: PathBuf,
}

impl StorageConfig {
    pub fn new(database_path: PathBuf) -> Self {
        Self { database_path }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./league.db"))
    }
}
