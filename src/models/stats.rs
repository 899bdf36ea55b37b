//! Derived statistics models. Computed from the game log on every read.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Game, GameId, Placement, Player};

/// Points for a win.
pub const WIN_POINTS: u32 = 3;

/// Points for a 2nd place.
pub const SECOND_POINTS: u32 = 1;

/// Totals for one player over some set of games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Games played
    pub games: u32,

    /// First places
    pub wins: u32,

    /// 2nd places
    pub seconds: u32,

    /// `wins * 3 + seconds`
    pub points: u32,

    /// Points per game (0.0 when no games)
    pub ppg: f64,
}

impl PlayerStats {
    /// Create stats from raw counts, deriving points and PPG.
    pub fn new(games: u32, wins: u32, seconds: u32) -> Self {
        let points = wins * WIN_POINTS + seconds * SECOND_POINTS;
        Self {
            games,
            wins,
            seconds,
            points,
            ppg: points_per_game(points, games),
        }
    }

    /// Fold one more game into the totals.
    pub fn record(&mut self, placement: Placement) {
        let (wins, seconds) = match placement {
            Placement::Winner => (self.wins + 1, self.seconds),
            Placement::Second => (self.wins, self.seconds + 1),
            Placement::Unplaced => (self.wins, self.seconds),
        };
        *self = Self::new(self.games + 1, wins, seconds);
    }
}

/// PPG with zero games defined as 0.
pub fn points_per_game(points: u32, games: u32) -> f64 {
    if games == 0 {
        0.0
    } else {
        points as f64 / games as f64
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsEntry {
    /// 1-based position in the full leaderboard
    pub rank: u32,

    pub player: Player,

    #[serde(flatten)]
    pub stats: PlayerStats,
}

/// A player's running totals after one of their games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameHistoryEntry {
    pub game_id: GameId,
    pub played_at: NaiveDate,

    /// Points earned in this game
    pub points: u32,

    /// Running points including this game
    pub total_points: u32,

    /// Running game count including this game
    pub games: u32,

    /// Running PPG including this game
    pub ppg: f64,
}

/// A player's leaderboard rank right after one of their games.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankHistoryEntry {
    pub game_id: GameId,
    pub played_at: NaiveDate,
    pub rank: u32,
}

/// Head-to-head comparison restricted to the games two players shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct H2HStats {
    pub player1: Player,
    pub player2: Player,

    /// Number of games both players took part in
    pub shared_games: u32,

    pub player1_stats: PlayerStats,
    pub player2_stats: PlayerStats,

    /// The shared games, most recent first
    pub games: Vec<Game>,
}
