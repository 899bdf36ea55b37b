//! # League Tracker
//!
//! Results tracking and leaderboard for a small game league.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (players, games, stats rows)
//! - **calculate**: Standings, rank history, head-to-head and emoji assignment
//! - **storage**: SQLite roster and game log
//! - **league**: Service combining storage reads with the engine
//! - **config**: Configuration loading and validation

pub mod calculate;
pub mod config;
pub mod league;
pub mod models;
pub mod storage;

pub use models::*;

use chrono::NaiveDate;

/// Parse a played-on date (`YYYY-MM-DD`). Blank input means `today`.
pub fn parse_played_at(raw: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(today);
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}
